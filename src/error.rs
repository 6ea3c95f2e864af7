// Error types for the booking core
use crate::validation::FormField;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, BookingError>;

// A required field is missing or malformed. Reported to the user, never changes dialog state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ValidationError {
    pub field: Option<FormField>,
    pub message: String,
}

impl ValidationError {
    pub fn field(field: FormField, message: impl Into<String>) -> Self {
        Self {
            field: Some(field),
            message: message.into(),
        }
    }

    pub fn general(message: impl Into<String>) -> Self {
        Self {
            field: None,
            message: message.into(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("No hostel listing with id {0}")]
pub struct LookupError(pub u32);

// Raised while loading listings; a catalog that fails these checks is never exposed
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Listing id must be positive")]
    ZeroId,

    #[error("Duplicate listing id {0}")]
    DuplicateId(u32),

    #[error("Listing {0} has no room types")]
    NoRoomTypes(u32),

    #[error("Listing {id} declares room type '{room_type}' more than once")]
    DuplicateRoomType { id: u32, room_type: String },

    #[error("Listing {id} has no price for room type '{room_type}'")]
    MissingPrice { id: u32, room_type: String },

    #[error("Listing {id} prices undeclared room type '{room_type}'")]
    UndeclaredPrice { id: u32, room_type: String },

    #[error("Listing {id} has a non-positive price for room type '{room_type}'")]
    NonPositivePrice { id: u32, room_type: String },

    #[error("Listing {id} has rating {rating} outside [0, 5]")]
    RatingOutOfRange { id: u32, rating: f32 },

    #[error("JSON parse error: {0}")]
    JsonParseError(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmissionError {
    #[error("Booking rejected: {0}")]
    Rejected(String),

    #[error("Booking service unavailable: {0}")]
    Unavailable(String),
}

#[derive(Error, Debug)]
pub enum BookingError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Submission(#[from] SubmissionError),

    #[error("A booking is already being processed")]
    SubmissionInProgress,

    #[error("No booking dialog is open")]
    DialogClosed,

    #[error("Configuration error: {0}")]
    ConfigError(String),
}
