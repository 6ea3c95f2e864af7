// Hostel catalog, derived views, filtering and sorting

use crate::error::{CatalogError, ValidationError};
use crate::listing::{Amenity, HostelListing, ListingRecord, RoomType};
use async_trait::async_trait;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

/// Cheapest room price of a listing, used for filtering and price ordering.
pub fn lowest_price(listing: &HostelListing) -> u32 {
    listing.lowest_price()
}

// Price bounds; a missing bound is unbounded
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PriceRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl PriceRange {
    pub fn new(min: Option<f64>, max: Option<f64>) -> Self {
        Self { min, max }
    }

    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Parses user-entered bounds. Empty or unparseable input is treated as unbounded.
    pub fn parse(min: Option<&str>, max: Option<&str>) -> Self {
        Self {
            min: min.and_then(parse_bound),
            max: max.and_then(parse_bound),
        }
    }

    pub fn contains(&self, price: u32) -> bool {
        let price = f64::from(price);
        self.min.map_or(true, |min| price >= min) && self.max.map_or(true, |max| price <= max)
    }
}

fn parse_bound(input: &str) -> Option<f64> {
    input
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    PriceAscending,
    PriceDescending,
    RatingDescending,
    #[default]
    None,
}

impl SortKey {
    // Values used by the sort selector on the page
    pub fn as_value(&self) -> &'static str {
        match self {
            SortKey::PriceAscending => "price-low",
            SortKey::PriceDescending => "price-high",
            SortKey::RatingDescending => "rating",
            SortKey::None => "",
        }
    }
}

impl From<&str> for SortKey {
    fn from(value: &str) -> Self {
        match value.trim() {
            "price-low" => SortKey::PriceAscending,
            "price-high" => SortKey::PriceDescending,
            "rating" => SortKey::RatingDescending,
            _ => SortKey::None,
        }
    }
}

/// Reordered or reduced sequence of shared listings. Never mutates the catalog.
#[derive(Debug, Clone, Default)]
pub struct CatalogView {
    listings: Vec<Arc<HostelListing>>,
}

impl CatalogView {
    pub fn new(listings: Vec<Arc<HostelListing>>) -> Self {
        Self { listings }
    }

    pub fn listings(&self) -> &[Arc<HostelListing>] {
        &self.listings
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<HostelListing>> {
        self.listings.iter()
    }

    pub fn len(&self) -> usize {
        self.listings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }

    pub fn ids(&self) -> Vec<u32> {
        self.listings.iter().map(|listing| listing.id()).collect()
    }

    // Keeps listings whose lowest price falls inside the range, preserving order
    pub fn filter(&self, range: PriceRange) -> CatalogView {
        let listings = self
            .listings
            .iter()
            .filter(|listing| range.contains(lowest_price(listing)))
            .cloned()
            .collect();
        CatalogView { listings }
    }

    // Stable: listings with equal keys keep their relative order
    pub fn sort(&self, key: SortKey) -> CatalogView {
        let mut listings = self.listings.clone();
        match key {
            SortKey::PriceAscending => listings.sort_by_key(|listing| lowest_price(listing)),
            SortKey::PriceDescending => {
                listings.sort_by(|a, b| lowest_price(b).cmp(&lowest_price(a)))
            }
            SortKey::RatingDescending => {
                listings.sort_by(|a, b| b.rating().total_cmp(&a.rating()))
            }
            SortKey::None => {}
        }
        CatalogView { listings }
    }
}

impl<'a> IntoIterator for &'a CatalogView {
    type Item = &'a Arc<HostelListing>;
    type IntoIter = std::slice::Iter<'a, Arc<HostelListing>>;

    fn into_iter(self) -> Self::IntoIter {
        self.listings.iter()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchCriteria {
    pub destination: String,
    pub price_min: Option<String>,
    pub price_max: Option<String>,
    pub sort: SortKey,
}

// Supplies the listings once at startup
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn fetch(&self) -> Result<Vec<HostelListing>, CatalogError>;

    fn source_name(&self) -> &'static str;
}

/// The compiled-in listing set.
#[derive(Debug, Default, Clone, Copy)]
pub struct StaticCatalog;

#[async_trait]
impl CatalogSource for StaticCatalog {
    async fn fetch(&self) -> Result<Vec<HostelListing>, CatalogError> {
        load_catalog()
    }

    fn source_name(&self) -> &'static str {
        "static"
    }
}

/// Listings read from a JSON array, either inline or from a file.
#[derive(Debug, Clone)]
pub enum JsonCatalog {
    Inline(String),
    File(PathBuf),
}

#[async_trait]
impl CatalogSource for JsonCatalog {
    async fn fetch(&self) -> Result<Vec<HostelListing>, CatalogError> {
        let json = match self {
            JsonCatalog::Inline(json) => json.clone(),
            JsonCatalog::File(path) => tokio::fs::read_to_string(path).await?,
        };
        let listings: Vec<HostelListing> = serde_json::from_str(&json)?;
        Ok(listings)
    }

    fn source_name(&self) -> &'static str {
        "json"
    }
}

/// Catalog store: the full listing set plus the currently displayed view.
#[derive(Debug, Clone)]
pub struct Catalog {
    listings: Vec<Arc<HostelListing>>,
    view: CatalogView,
    range: PriceRange,
    sort_key: SortKey,
}

impl Catalog {
    pub fn new(listings: Vec<HostelListing>) -> Result<Self, CatalogError> {
        let mut ids = HashSet::new();
        for listing in &listings {
            if !ids.insert(listing.id()) {
                return Err(CatalogError::DuplicateId(listing.id()));
            }
        }

        let listings: Vec<Arc<HostelListing>> = listings.into_iter().map(Arc::new).collect();
        let view = CatalogView::new(listings.clone());
        Ok(Self {
            listings,
            view,
            range: PriceRange::unbounded(),
            sort_key: SortKey::None,
        })
    }

    pub async fn load(source: &dyn CatalogSource) -> Result<Self, CatalogError> {
        let listings = source.fetch().await?;
        info!(
            source = source.source_name(),
            count = listings.len(),
            "Loaded hostel catalog"
        );
        Self::new(listings)
    }

    pub fn find(&self, id: u32) -> Option<Arc<HostelListing>> {
        self.listings.iter().find(|listing| listing.id() == id).cloned()
    }

    pub fn listings(&self) -> &[Arc<HostelListing>] {
        &self.listings
    }

    pub fn view(&self) -> &CatalogView {
        &self.view
    }

    pub fn sort_key(&self) -> SortKey {
        self.sort_key
    }

    // Filters the full catalog; the active sort order is kept
    pub fn apply_filter(&mut self, range: PriceRange) -> &CatalogView {
        self.range = range;
        self.rebuild_view();
        debug!(?range, shown = self.view.len(), "Applied price filter");
        &self.view
    }

    pub fn apply_sort(&mut self, key: SortKey) -> &CatalogView {
        self.sort_key = key;
        self.view = self.view.sort(key);
        debug!(?key, "Sorted catalog view");
        &self.view
    }

    pub fn reset_view(&mut self) {
        self.range = PriceRange::unbounded();
        self.sort_key = SortKey::None;
        self.view = CatalogView::new(self.listings.clone());
    }

    pub fn search(&mut self, criteria: &SearchCriteria) -> Result<&CatalogView, ValidationError> {
        if criteria.destination.trim().is_empty() {
            return Err(ValidationError::general("Please enter a destination"));
        }

        self.range = PriceRange::parse(criteria.price_min.as_deref(), criteria.price_max.as_deref());
        self.sort_key = criteria.sort;
        self.rebuild_view();
        info!(
            destination = %criteria.destination.trim(),
            shown = self.view.len(),
            "Catalog search"
        );
        Ok(&self.view)
    }

    fn rebuild_view(&mut self) {
        self.view = CatalogView::new(self.listings.clone())
            .filter(self.range)
            .sort(self.sort_key);
    }
}

/// The fixed hostel listing set shown on the booking page.
pub fn load_catalog() -> Result<Vec<HostelListing>, CatalogError> {
    let shared_amenities = vec![Amenity::Wifi, Amenity::StudyDesk, Amenity::SharedBathroom];

    let records = vec![
        ListingRecord {
            id: 1,
            name: "University Hall 1".to_string(),
            location: "On Campus".to_string(),
            description:
                "On-campus accommodation with 4-person rooms. Perfect for academic focus."
                    .to_string(),
            rating: 4.8,
            review_count: 120,
            image_ref: "image/uenr.Hall1.jpg".to_string(),
            amenities: shared_amenities.clone(),
            room_types: vec![RoomType::from("4-person")],
            price_per_room_type: [(RoomType::from("4-person"), 3000)].into_iter().collect(),
        },
        ListingRecord {
            id: 2,
            name: "University Hall 2".to_string(),
            location: "On Campus".to_string(),
            description: "On-campus residence with flexible room options and excellent study facilities."
                .to_string(),
            rating: 4.6,
            review_count: 89,
            image_ref: "image/hall2.jpg".to_string(),
            amenities: shared_amenities.clone(),
            room_types: vec![RoomType::from("4-person"), RoomType::from("2-person")],
            price_per_room_type: [
                (RoomType::from("4-person"), 3500),
                (RoomType::from("2-person"), 4000),
            ]
            .into_iter()
            .collect(),
        },
        ListingRecord {
            id: 3,
            name: "Credit Union Hostel".to_string(),
            location: "Off Campus".to_string(),
            description: "Off-campus hostel with flexible room options: 2 or 3-person rooms."
                .to_string(),
            rating: 4.9,
            review_count: 156,
            image_ref: "image/credit.webp".to_string(),
            amenities: shared_amenities,
            room_types: vec![RoomType::from("3-person"), RoomType::from("2-person")],
            price_per_room_type: [
                (RoomType::from("3-person"), 2800),
                (RoomType::from("2-person"), 3000),
            ]
            .into_iter()
            .collect(),
        },
    ];

    records.into_iter().map(HostelListing::try_from).collect()
}
