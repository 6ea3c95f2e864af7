// Hostel listing data model
// Listings are only constructed through `ListingRecord`, so every `HostelListing`
// in memory satisfies the room type / price invariants.

use crate::error::CatalogError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;

/// Room type tag such as `4-person`, unique within a listing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomType(String);

impl RoomType {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RoomType {
    fn from(tag: &str) -> Self {
        Self::new(tag)
    }
}

impl fmt::Display for RoomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Amenity vocabulary. Tags outside the vocabulary are kept as `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Amenity {
    Wifi,
    Breakfast,
    Kitchen,
    Laundry,
    StudyDesk,
    SharedBathroom,
    Other(String),
}

impl Amenity {
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "wifi" => Amenity::Wifi,
            "breakfast" => Amenity::Breakfast,
            "kitchen" => Amenity::Kitchen,
            "laundry" => Amenity::Laundry,
            "study_desk" => Amenity::StudyDesk,
            "shared_bathroom" => Amenity::SharedBathroom,
            other => Amenity::Other(other.to_string()),
        }
    }

    pub fn tag(&self) -> &str {
        match self {
            Amenity::Wifi => "wifi",
            Amenity::Breakfast => "breakfast",
            Amenity::Kitchen => "kitchen",
            Amenity::Laundry => "laundry",
            Amenity::StudyDesk => "study_desk",
            Amenity::SharedBathroom => "shared_bathroom",
            Amenity::Other(tag) => tag,
        }
    }
}

impl From<String> for Amenity {
    fn from(tag: String) -> Self {
        match Amenity::from_tag(&tag) {
            Amenity::Other(_) => Amenity::Other(tag),
            known => known,
        }
    }
}

impl From<Amenity> for String {
    fn from(amenity: Amenity) -> Self {
        amenity.tag().to_string()
    }
}

// Unchecked listing data as supplied by a catalog source
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingRecord {
    pub id: u32,
    pub name: String,
    pub location: String,
    pub description: String,
    pub rating: f32,
    #[serde(rename = "reviews")]
    pub review_count: u32,
    #[serde(rename = "image")]
    pub image_ref: String,
    pub amenities: Vec<Amenity>,
    pub room_types: Vec<RoomType>,
    #[serde(rename = "pricing")]
    pub price_per_room_type: BTreeMap<RoomType, i64>,
}

/// One entry of the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ListingRecord", into = "ListingRecord")]
pub struct HostelListing {
    id: u32,
    name: String,
    location: String,
    description: String,
    rating: f32,
    review_count: u32,
    image_ref: String,
    amenities: Vec<Amenity>,
    room_types: Vec<RoomType>,
    prices: BTreeMap<RoomType, u32>,
    lowest_price: u32,
}

impl HostelListing {
    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn rating(&self) -> f32 {
        self.rating
    }

    pub fn review_count(&self) -> u32 {
        self.review_count
    }

    pub fn image_ref(&self) -> &str {
        &self.image_ref
    }

    pub fn amenities(&self) -> &[Amenity] {
        &self.amenities
    }

    pub fn room_types(&self) -> &[RoomType] {
        &self.room_types
    }

    pub fn has_room_type(&self, room_type: &RoomType) -> bool {
        self.prices.contains_key(room_type)
    }

    pub fn price_for(&self, room_type: &RoomType) -> Option<u32> {
        self.prices.get(room_type).copied()
    }

    // Prices in declared room type order
    pub fn prices(&self) -> impl Iterator<Item = (&RoomType, u32)> + '_ {
        self.room_types
            .iter()
            .filter_map(|room_type| self.price_for(room_type).map(|price| (room_type, price)))
    }

    /// Cheapest room price. Always defined since a listing has at least one room type.
    pub fn lowest_price(&self) -> u32 {
        self.lowest_price
    }
}

impl TryFrom<ListingRecord> for HostelListing {
    type Error = CatalogError;

    fn try_from(record: ListingRecord) -> Result<Self, Self::Error> {
        let id = record.id;
        if id == 0 {
            return Err(CatalogError::ZeroId);
        }

        if !record.rating.is_finite() || !(0.0..=5.0).contains(&record.rating) {
            return Err(CatalogError::RatingOutOfRange {
                id,
                rating: record.rating,
            });
        }

        if record.room_types.is_empty() {
            return Err(CatalogError::NoRoomTypes(id));
        }

        let mut seen = HashSet::new();
        for room_type in &record.room_types {
            if !seen.insert(room_type) {
                return Err(CatalogError::DuplicateRoomType {
                    id,
                    room_type: room_type.to_string(),
                });
            }
            if !record.price_per_room_type.contains_key(room_type) {
                return Err(CatalogError::MissingPrice {
                    id,
                    room_type: room_type.to_string(),
                });
            }
        }

        let mut prices = BTreeMap::new();
        for (room_type, price) in record.price_per_room_type {
            if !seen.contains(&room_type) {
                return Err(CatalogError::UndeclaredPrice {
                    id,
                    room_type: room_type.to_string(),
                });
            }
            let price = u32::try_from(price)
                .ok()
                .filter(|p| *p > 0)
                .ok_or_else(|| CatalogError::NonPositivePrice {
                    id,
                    room_type: room_type.to_string(),
                })?;
            prices.insert(room_type, price);
        }

        let lowest_price = prices
            .values()
            .copied()
            .min()
            .ok_or(CatalogError::NoRoomTypes(id))?;

        let mut amenities: Vec<Amenity> = Vec::with_capacity(record.amenities.len());
        for amenity in record.amenities {
            if !amenities.contains(&amenity) {
                amenities.push(amenity);
            }
        }

        Ok(HostelListing {
            id,
            name: record.name,
            location: record.location,
            description: record.description,
            rating: record.rating,
            review_count: record.review_count,
            image_ref: record.image_ref,
            amenities,
            room_types: record.room_types,
            prices,
            lowest_price,
        })
    }
}

impl From<HostelListing> for ListingRecord {
    fn from(listing: HostelListing) -> Self {
        ListingRecord {
            id: listing.id,
            name: listing.name,
            location: listing.location,
            description: listing.description,
            rating: listing.rating,
            review_count: listing.review_count,
            image_ref: listing.image_ref,
            amenities: listing.amenities,
            room_types: listing.room_types,
            price_per_room_type: listing
                .prices
                .into_iter()
                .map(|(room_type, price)| (room_type, i64::from(price)))
                .collect(),
        }
    }
}
