// Headless core of the hostel booking page: catalog, rendering and the booking dialog

pub mod app;
pub mod catalog;
pub mod config;
pub mod dialog;
pub mod error;
pub mod listing;
pub mod notify;
pub mod render;
pub mod submission;
pub mod summary;
pub mod validation;

// Re-export key types for convenience
pub use app::{DisplaySurface, HostelApp, RecordingSurface, RenderInstruction, UiEvent};
pub use catalog::{
    load_catalog, lowest_price, Catalog, CatalogSource, CatalogView, JsonCatalog, PriceRange,
    SearchCriteria, SortKey, StaticCatalog,
};
pub use config::BookingConfig;
pub use dialog::{BookingDialog, BookingDraft, DialogState, DialogView, SubmissionResolution};
pub use error::{
    BookingError, CatalogError, LookupError, Result, SubmissionError, ValidationError,
};
pub use listing::{Amenity, HostelListing, ListingRecord, RoomType};
pub use notify::{Notification, Notifier, RecordingNotifier, Severity, TracingNotifier};
pub use render::{amenity_label, format_price, render, ListingCard, StarRating};
pub use submission::{
    BookingConfirmation, CancelHandle, CompletedSubmission, PendingSubmission, SimulatedBackend,
    SubmissionBackend, SubmissionOutcome,
};
pub use summary::{compute_summary, BookingSummary};
pub use validation::{validate, validate_submission, BookingForm, BookingSubmission, FormField};
