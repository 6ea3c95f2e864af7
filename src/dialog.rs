// Booking dialog controller
// Closed -> Open(draft) -> Submitting(draft) -> Closed. Opening a new draft or
// closing the dialog cancels whatever submission is still pending.

use crate::catalog::Catalog;
use crate::config::BookingConfig;
use crate::error::{BookingError, LookupError, SubmissionError, ValidationError};
use crate::listing::{HostelListing, RoomType};
use crate::render::{format_price, StarRating};
use crate::submission::{
    BookingConfirmation, CancelHandle, CompletedSubmission, PendingSubmission, SubmissionBackend,
    SubmissionOutcome,
};
use crate::summary::{compute_summary, humanize_room_type, BookingSummary};
use crate::validation::{validate_submission, BookingForm, FormField};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Transient selection state for one listing.
#[derive(Debug, Clone, PartialEq)]
pub struct BookingDraft {
    listing: Arc<HostelListing>,
    selected_room_type: Option<RoomType>,
    selected_term: Option<String>,
}

impl BookingDraft {
    pub fn new(listing: Arc<HostelListing>) -> Self {
        Self {
            listing,
            selected_room_type: None,
            selected_term: None,
        }
    }

    pub fn listing(&self) -> &HostelListing {
        &self.listing
    }

    pub fn selected_room_type(&self) -> Option<&RoomType> {
        self.selected_room_type.as_ref()
    }

    pub fn selected_term(&self) -> Option<&str> {
        self.selected_term.as_deref()
    }

    // An empty tag clears the selection. Room types the listing does not offer are rejected.
    pub fn select_room_type(&mut self, tag: &str) -> Result<(), ValidationError> {
        let tag = tag.trim();
        if tag.is_empty() {
            self.selected_room_type = None;
            return Ok(());
        }

        let room_type = RoomType::new(tag);
        if !self.listing.has_room_type(&room_type) {
            return Err(ValidationError::field(
                FormField::RoomType,
                format!("{} does not offer room type '{}'", self.listing.name(), room_type),
            ));
        }
        self.selected_room_type = Some(room_type);
        Ok(())
    }

    pub fn select_term(&mut self, tag: &str) {
        let tag = tag.trim();
        self.selected_term = (!tag.is_empty()).then(|| tag.to_string());
    }

    pub fn summary_price(&self) -> Option<u32> {
        self.selected_room_type
            .as_ref()
            .and_then(|room_type| self.listing.price_for(room_type))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DialogHeader {
    pub listing_id: u32,
    pub name: String,
    pub location: String,
    pub image_ref: String,
    pub stars: StarRating,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoomOption {
    pub value: String,
    pub label: String,
}

// Everything the display needs when the dialog opens
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DialogView {
    pub header: DialogHeader,
    pub room_options: Vec<RoomOption>,
    pub summary: BookingSummary,
}

#[derive(Debug)]
pub enum DialogState {
    Closed,
    Open(BookingDraft),
    Submitting {
        draft: BookingDraft,
        cancel: CancelHandle,
    },
}

impl DialogState {
    pub fn draft(&self) -> Option<&BookingDraft> {
        match self {
            DialogState::Closed => None,
            DialogState::Open(draft) | DialogState::Submitting { draft, .. } => Some(draft),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionResolution {
    Confirmed(BookingConfirmation),
    Failed(SubmissionError),
}

pub struct BookingDialog {
    state: DialogState,
    next_ticket: u64,
    config: BookingConfig,
    backend: Arc<dyn SubmissionBackend>,
}

impl BookingDialog {
    pub fn new(config: BookingConfig, backend: Arc<dyn SubmissionBackend>) -> Self {
        Self {
            state: DialogState::Closed,
            next_ticket: 1,
            config,
            backend,
        }
    }

    pub fn state(&self) -> &DialogState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        !matches!(self.state, DialogState::Closed)
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self.state, DialogState::Submitting { .. })
    }

    pub fn draft(&self) -> Option<&BookingDraft> {
        self.state.draft()
    }

    pub fn summary(&self) -> Option<BookingSummary> {
        self.draft()
            .map(|draft| compute_summary(draft, &self.config))
    }

    pub fn open(&mut self, catalog: &Catalog, listing_id: u32) -> Result<DialogView, LookupError> {
        let listing = catalog.find(listing_id).ok_or_else(|| {
            debug!(listing_id, "Ignoring booking request for unknown listing");
            LookupError(listing_id)
        })?;

        self.discard();
        let draft = BookingDraft::new(listing);
        let view = self.dialog_view(&draft);
        info!(listing_id, "Opened booking dialog");
        self.state = DialogState::Open(draft);
        Ok(view)
    }

    // None while no draft is editable. A rejected tag leaves the draft unchanged.
    pub fn select_room_type(
        &mut self,
        tag: &str,
    ) -> Result<Option<BookingSummary>, ValidationError> {
        let Some(draft) = self.draft_mut() else {
            return Ok(None);
        };
        if let Err(err) = draft.select_room_type(tag) {
            warn!(room_type = tag, %err, "Rejected room type not offered by listing");
            return Err(err);
        }
        Ok(self.summary())
    }

    pub fn select_term(&mut self, tag: &str) -> Option<BookingSummary> {
        self.draft_mut()?.select_term(tag);
        self.summary()
    }

    /// Returns whether a dialog was open.
    pub fn close(&mut self) -> bool {
        let was_open = self.is_open();
        self.discard();
        if was_open {
            debug!("Closed booking dialog");
        }
        was_open
    }

    pub fn submit(&mut self, form: &BookingForm) -> Result<PendingSubmission, BookingError> {
        let draft = match &self.state {
            DialogState::Closed => return Err(BookingError::DialogClosed),
            DialogState::Submitting { .. } => return Err(BookingError::SubmissionInProgress),
            DialogState::Open(draft) => draft,
        };

        let submission = validate_submission(draft.listing(), form)?;

        let ticket = self.next_ticket;
        self.next_ticket += 1;
        let (pending, cancel) = PendingSubmission::start(ticket, self.backend.clone(), submission);

        if let DialogState::Open(draft) = std::mem::replace(&mut self.state, DialogState::Closed) {
            self.state = DialogState::Submitting { draft, cancel };
        }
        info!(ticket, "Booking submission started");
        Ok(pending)
    }

    /// Applies a finished submission. Returns None when the result belongs to a
    /// submission that was cancelled or superseded.
    pub fn complete(&mut self, completed: CompletedSubmission) -> Option<SubmissionResolution> {
        let current = match &self.state {
            DialogState::Submitting { cancel, .. } => cancel.ticket(),
            _ => {
                debug!(ticket = completed.ticket, "Dropping stale submission result");
                return None;
            }
        };
        if current != completed.ticket {
            debug!(
                ticket = completed.ticket,
                current, "Dropping stale submission result"
            );
            return None;
        }

        let draft = match std::mem::replace(&mut self.state, DialogState::Closed) {
            DialogState::Submitting { draft, .. } => draft,
            other => {
                self.state = other;
                return None;
            }
        };

        match completed.outcome {
            SubmissionOutcome::Confirmed(confirmation) => {
                info!(
                    booking_id = %confirmation.booking_id,
                    listing_id = confirmation.listing_id,
                    "Booking confirmed"
                );
                Some(SubmissionResolution::Confirmed(confirmation))
            }
            SubmissionOutcome::Failed(err) => {
                warn!(%err, "Booking submission failed");
                self.state = DialogState::Open(draft);
                Some(SubmissionResolution::Failed(err))
            }
            SubmissionOutcome::Cancelled => {
                self.state = DialogState::Open(draft);
                None
            }
        }
    }

    // Selections are frozen once the submission has been sent
    fn draft_mut(&mut self) -> Option<&mut BookingDraft> {
        match &mut self.state {
            DialogState::Open(draft) => Some(draft),
            DialogState::Submitting { .. } => {
                debug!("Ignoring selection while submitting");
                None
            }
            DialogState::Closed => None,
        }
    }

    fn discard(&mut self) {
        if let DialogState::Submitting { cancel, .. } = &self.state {
            debug!(ticket = cancel.ticket(), "Cancelling pending submission");
            cancel.cancel();
        }
        self.state = DialogState::Closed;
    }

    fn dialog_view(&self, draft: &BookingDraft) -> DialogView {
        let listing = draft.listing();
        DialogView {
            header: DialogHeader {
                listing_id: listing.id(),
                name: listing.name().to_string(),
                location: listing.location().to_string(),
                image_ref: listing.image_ref().to_string(),
                stars: StarRating::from_rating(listing.rating()),
            },
            room_options: listing
                .prices()
                .map(|(room_type, price)| RoomOption {
                    value: room_type.to_string(),
                    label: format!(
                        "{} - {}",
                        humanize_room_type(room_type),
                        format_price(price, &self.config.currency)
                    ),
                })
                .collect(),
            summary: BookingSummary::unset(&self.config.unset_placeholder),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::load_catalog;
    use crate::submission::mock_backend::MockBackend;
    use crate::submission::SimulatedBackend;
    use crate::validation::fixtures::complete_form;
    use std::time::Duration;

    fn catalog() -> Catalog {
        Catalog::new(load_catalog().unwrap()).unwrap()
    }

    fn dialog_with(backend: Arc<dyn SubmissionBackend>) -> BookingDialog {
        BookingDialog::new(BookingConfig::default(), backend)
    }

    fn dialog() -> BookingDialog {
        dialog_with(Arc::new(MockBackend::new()))
    }

    #[test]
    fn test_open_unknown_listing_stays_closed() {
        let mut dialog = dialog();
        let err = dialog.open(&catalog(), 42).unwrap_err();
        assert_eq!(err, LookupError(42));
        assert!(matches!(dialog.state(), DialogState::Closed));
    }

    #[test]
    fn test_open_unknown_listing_keeps_current_draft() {
        let catalog = catalog();
        let mut dialog = dialog();
        dialog.open(&catalog, 2).unwrap();
        assert!(dialog.open(&catalog, 42).is_err());
        assert_eq!(dialog.draft().unwrap().listing().id(), 2);
    }

    #[test]
    fn test_open_populates_room_options_and_resets_summary() {
        let mut dialog = dialog();
        let view = dialog.open(&catalog(), 2).unwrap();

        assert_eq!(view.header.name, "University Hall 2");
        assert_eq!(view.header.stars, StarRating::from_rating(4.6));
        assert_eq!(
            view.room_options,
            vec![
                RoomOption {
                    value: "4-person".to_string(),
                    label: "4 Person - GHS 3,500".to_string(),
                },
                RoomOption {
                    value: "2-person".to_string(),
                    label: "2 Person - GHS 4,000".to_string(),
                },
            ]
        );
        assert_eq!(view.summary, BookingSummary::unset("-"));
        assert!(dialog.is_open());
    }

    #[test]
    fn test_selection_recomputes_summary() {
        let mut dialog = dialog();
        dialog.open(&catalog(), 3).unwrap();

        let summary = dialog.select_room_type("3-person").unwrap().unwrap();
        assert_eq!(summary.room_type_label, "3 Person");
        assert_eq!(summary.price, "GHS 2,800");
        assert_eq!(summary.total, "GHS 2,800");

        let summary = dialog.select_term("2025-2026").unwrap();
        assert_eq!(summary.duration, "2025/2026");

        let summary = dialog.select_room_type("").unwrap().unwrap();
        assert_eq!(summary.price, "-");
        assert_eq!(summary.duration, "2025/2026");
    }

    #[test]
    fn test_unknown_room_type_is_rejected() {
        let mut dialog = dialog();
        dialog.open(&catalog(), 3).unwrap();
        dialog.select_room_type("3-person").unwrap();

        let err = dialog.select_room_type("8-person").unwrap_err();
        assert_eq!(err.field, Some(FormField::RoomType));
        assert_eq!(
            dialog.draft().unwrap().selected_room_type(),
            Some(&RoomType::from("3-person"))
        );
        assert_eq!(dialog.summary().unwrap().price, "GHS 2,800");
    }

    #[test]
    fn test_selection_without_dialog_is_noop() {
        let mut dialog = dialog();
        assert_eq!(dialog.select_room_type("4-person"), Ok(None));
        assert!(dialog.select_term("2024-2025").is_none());
        assert!(!dialog.close());
    }

    #[tokio::test]
    async fn test_selection_is_frozen_while_submitting() {
        let backend = Arc::new(SimulatedBackend::new(Duration::from_secs(30)));
        let mut dialog = dialog_with(backend);
        dialog.open(&catalog(), 3).unwrap();
        dialog.select_room_type("3-person").unwrap();
        dialog.select_term("2024-2025");

        let _pending = dialog.submit(&complete_form("3-person")).unwrap();
        assert_eq!(dialog.select_room_type("2-person"), Ok(None));
        assert!(dialog.select_term("2025-2026").is_none());

        let draft = dialog.draft().unwrap();
        assert_eq!(draft.selected_room_type(), Some(&RoomType::from("3-person")));
        assert_eq!(draft.selected_term(), Some("2024-2025"));
        assert!(dialog.close());
    }

    #[test]
    fn test_reopen_discards_prior_draft() {
        let catalog = catalog();
        let mut dialog = dialog();
        dialog.open(&catalog, 2).unwrap();
        dialog.select_room_type("2-person").unwrap();

        dialog.open(&catalog, 1).unwrap();
        let draft = dialog.draft().unwrap();
        assert_eq!(draft.listing().id(), 1);
        assert!(draft.selected_room_type().is_none());
    }

    #[test]
    fn test_submit_validation_failure_keeps_dialog_open() {
        let mut dialog = dialog();
        dialog.open(&catalog(), 1).unwrap();

        let mut form = complete_form("4-person");
        form.index_number = "AB 12".to_string();

        match dialog.submit(&form) {
            Err(BookingError::Validation(err)) => {
                assert_eq!(err.field, Some(FormField::IndexNumber))
            }
            other => panic!("Expected validation error, got {:?}", other),
        }
        assert!(matches!(dialog.state(), DialogState::Open(_)));
    }

    #[test]
    fn test_submit_requires_open_dialog() {
        let mut dialog = dialog();
        let result = dialog.submit(&complete_form("4-person"));
        assert!(matches!(result, Err(BookingError::DialogClosed)));
    }

    #[tokio::test]
    async fn test_successful_submission_closes_dialog() {
        let backend = Arc::new(SimulatedBackend::new(Duration::from_millis(10)));
        let mut dialog = dialog_with(backend.clone());
        dialog.open(&catalog(), 1).unwrap();

        let pending = dialog.submit(&complete_form("4-person")).unwrap();
        assert!(dialog.is_submitting());
        assert!(matches!(
            dialog.submit(&complete_form("4-person")),
            Err(BookingError::SubmissionInProgress)
        ));

        let resolution = dialog.complete(pending.wait().await);
        match resolution {
            Some(SubmissionResolution::Confirmed(confirmation)) => {
                assert_eq!(confirmation.listing_id, 1)
            }
            other => panic!("Expected confirmation, got {:?}", other),
        }
        assert!(matches!(dialog.state(), DialogState::Closed));
        assert_eq!(backend.submitted_count(), 1);
    }

    #[tokio::test]
    async fn test_backend_failure_returns_to_open() {
        let backend = Arc::new(MockBackend::new());
        backend.fail_next_requests(1);
        let mut dialog = dialog_with(backend);
        dialog.open(&catalog(), 3).unwrap();
        dialog.select_room_type("2-person").unwrap();

        let pending = dialog.submit(&complete_form("2-person")).unwrap();
        let resolution = dialog.complete(pending.wait().await);
        assert!(matches!(
            resolution,
            Some(SubmissionResolution::Failed(SubmissionError::Unavailable(_)))
        ));

        let draft = dialog.draft().unwrap();
        assert!(matches!(dialog.state(), DialogState::Open(_)));
        assert_eq!(draft.summary_price(), Some(3000));
    }

    #[tokio::test]
    async fn test_close_cancels_pending_submission() {
        let backend = Arc::new(SimulatedBackend::new(Duration::from_secs(30)));
        let mut dialog = dialog_with(backend.clone());
        dialog.open(&catalog(), 1).unwrap();

        let pending = dialog.submit(&complete_form("4-person")).unwrap();
        assert!(dialog.close());

        let completed = pending.wait().await;
        assert_eq!(completed.outcome, SubmissionOutcome::Cancelled);
        assert!(dialog.complete(completed).is_none());
        assert!(matches!(dialog.state(), DialogState::Closed));
        assert_eq!(backend.submitted_count(), 0);
    }

    #[tokio::test]
    async fn test_stale_result_does_not_touch_reopened_dialog() {
        let catalog = catalog();
        let backend = Arc::new(MockBackend::new());
        backend.set_delay(Duration::from_millis(10));
        let mut dialog = dialog_with(backend);

        dialog.open(&catalog, 1).unwrap();
        let first = dialog.submit(&complete_form("4-person")).unwrap();

        dialog.open(&catalog, 2).unwrap();
        let second = dialog.submit(&complete_form("2-person")).unwrap();
        assert_ne!(first.ticket(), second.ticket());

        // A result carrying the superseded ticket is ignored
        let stale = CompletedSubmission {
            ticket: first.ticket(),
            outcome: SubmissionOutcome::Confirmed(BookingConfirmation {
                booking_id: "booking_old".to_string(),
                listing_id: 1,
                confirmed_at: chrono::Utc::now(),
            }),
        };
        assert!(dialog.complete(stale).is_none());
        assert!(dialog.is_submitting());
        assert_eq!(first.wait().await.outcome, SubmissionOutcome::Cancelled);

        let resolution = dialog.complete(second.wait().await);
        assert!(matches!(
            resolution,
            Some(SubmissionResolution::Confirmed(BookingConfirmation { listing_id: 2, .. }))
        ));
    }
}
