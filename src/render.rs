// Rendering of catalog views into display fragments
// Everything here is pure; a display surface decides how fragments are shown.

use crate::catalog::{lowest_price, CatalogView};
use crate::config::BookingConfig;
use crate::listing::{Amenity, HostelListing};
use serde::Serialize;

pub const MAX_STARS: u8 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StarIcon {
    Full,
    Half,
    Empty,
}

/// Star breakdown of a rating. `full + half + empty` is always 5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StarRating {
    pub full: u8,
    pub half: u8,
    pub empty: u8,
}

impl StarRating {
    pub fn from_rating(rating: f32) -> Self {
        let rating = if rating.is_finite() {
            rating.clamp(0.0, f32::from(MAX_STARS))
        } else {
            0.0
        };
        let full = rating.floor() as u8;
        let half = u8::from(rating.fract() != 0.0);
        Self {
            full,
            half,
            empty: MAX_STARS - full - half,
        }
    }

    pub fn icons(&self) -> Vec<StarIcon> {
        std::iter::repeat(StarIcon::Full)
            .take(usize::from(self.full))
            .chain(std::iter::repeat(StarIcon::Half).take(usize::from(self.half)))
            .chain(std::iter::repeat(StarIcon::Empty).take(usize::from(self.empty)))
            .collect()
    }
}

/// Formats an amount with en-US digit grouping, e.g. `GHS 3,000`.
pub fn format_price(amount: u32, currency: &str) -> String {
    let digits = amount.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{} {}", currency, grouped)
}

pub fn amenity_label(amenity: &Amenity) -> &str {
    match amenity {
        Amenity::Wifi => "Free WiFi",
        Amenity::Breakfast => "Free Breakfast",
        Amenity::Kitchen => "Kitchen",
        Amenity::Laundry => "Laundry",
        other => other.tag(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookAction {
    pub listing_id: u32,
    pub label: String,
}

// One hostel card
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListingCard {
    pub id: u32,
    pub name: String,
    pub location: String,
    pub description: String,
    pub image_ref: String,
    pub badge: String,
    pub stars: StarRating,
    pub rating_text: String,
    pub price_text: String,
    pub price_caption: String,
    pub amenities: Vec<String>,
    pub book: BookAction,
}

impl ListingCard {
    pub fn from_listing(listing: &HostelListing, config: &BookingConfig) -> Self {
        Self {
            id: listing.id(),
            name: listing.name().to_string(),
            location: listing.location().to_string(),
            description: listing.description().to_string(),
            image_ref: listing.image_ref().to_string(),
            badge: config.availability_badge.clone(),
            stars: StarRating::from_rating(listing.rating()),
            rating_text: format!("{} ({} reviews)", listing.rating(), listing.review_count()),
            price_text: format_price(lowest_price(listing), &config.currency),
            price_caption: config.price_caption.clone(),
            amenities: listing
                .amenities()
                .iter()
                .map(|amenity| amenity_label(amenity).to_string())
                .collect(),
            book: BookAction {
                listing_id: listing.id(),
                label: "Book Now".to_string(),
            },
        }
    }
}

pub fn render(view: &CatalogView, config: &BookingConfig) -> Vec<ListingCard> {
    view.iter()
        .map(|listing| ListingCard::from_listing(listing, config))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{load_catalog, SortKey};
    use std::sync::Arc;
    use test_case::test_case;

    #[test_case(5.0, 5, 0, 0; "#1 Perfect rating")]
    #[test_case(4.5, 4, 1, 0; "#2 Half star")]
    #[test_case(0.0, 0, 0, 5; "#3 Zero rating")]
    #[test_case(4.8, 4, 1, 0; "#4 Any fraction gives a half star")]
    #[test_case(3.0, 3, 0, 2; "#5 Whole rating")]
    #[test_case(0.2, 0, 1, 4; "#6 Small fraction")]
    fn test_star_rating(rating: f32, full: u8, half: u8, empty: u8) {
        let stars = StarRating::from_rating(rating);
        assert_eq!(stars, StarRating { full, half, empty });
        assert_eq!(stars.full + stars.half + stars.empty, MAX_STARS);
    }

    #[test]
    fn test_star_icons_order() {
        let icons = StarRating::from_rating(3.5).icons();
        assert_eq!(
            icons,
            vec![
                StarIcon::Full,
                StarIcon::Full,
                StarIcon::Full,
                StarIcon::Half,
                StarIcon::Empty
            ]
        );
    }

    #[test_case(0, "GHS 0")]
    #[test_case(999, "GHS 999")]
    #[test_case(3000, "GHS 3,000")]
    #[test_case(1234567, "GHS 1,234,567")]
    fn test_format_price(amount: u32, expected: &str) {
        assert_eq!(format_price(amount, "GHS"), expected);
    }

    #[test]
    fn test_amenity_labels_pass_unknown_tags_through() {
        assert_eq!(amenity_label(&Amenity::Wifi), "Free WiFi");
        assert_eq!(amenity_label(&Amenity::Breakfast), "Free Breakfast");
        assert_eq!(amenity_label(&Amenity::StudyDesk), "study_desk");
        assert_eq!(amenity_label(&Amenity::Other("pool".to_string())), "pool");
    }

    #[test]
    fn test_render_one_card_per_listing_in_view_order() {
        let view = CatalogView::new(load_catalog().unwrap().into_iter().map(Arc::new).collect())
            .sort(SortKey::PriceAscending);
        let cards = render(&view, &BookingConfig::default());

        assert_eq!(cards.len(), 3);
        let first = &cards[0];
        assert_eq!(first.id, 3);
        assert_eq!(first.price_text, "GHS 2,800");
        assert_eq!(first.rating_text, "4.9 (156 reviews)");
        assert_eq!(first.book.listing_id, 3);
        assert_eq!(
            first.amenities,
            vec!["Free WiFi", "study_desk", "shared_bathroom"]
        );
        assert_eq!(first.price_caption, "per academic year");
    }

    #[test]
    fn test_card_serializes_for_display_surfaces() {
        let listing = &load_catalog().unwrap()[0];
        let card = ListingCard::from_listing(listing, &BookingConfig::default());
        let json = serde_json::to_value(&card).unwrap();
        assert_eq!(json["stars"]["full"], 4);
        assert_eq!(json["book"]["listing_id"], 1);
    }
}
