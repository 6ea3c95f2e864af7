// Application state for the booking page
// Routes user events to the catalog and the booking dialog and tells the
// display surface what to show.

use crate::catalog::{Catalog, CatalogSource, PriceRange, SearchCriteria, SortKey};
use crate::config::BookingConfig;
use crate::dialog::{BookingDialog, DialogView, SubmissionResolution};
use crate::error::BookingError;
use crate::notify::{Notification, Notifier};
use crate::render::{render, ListingCard};
use crate::submission::{CompletedSubmission, PendingSubmission, SubmissionBackend};
use crate::summary::BookingSummary;
use crate::validation::{BookingForm, FormField};
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

pub const BOOKING_CONFIRMED_MESSAGE: &str =
    "Booking confirmed! You will receive a confirmation email shortly.";

#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    Search(SearchCriteria),
    FilterPrice {
        min: Option<String>,
        max: Option<String>,
    },
    Sort(SortKey),
    Book(u32),
    SelectRoomType(String),
    SelectTerm(String),
    UpdateField { field: FormField, value: String },
    Submit,
    Close,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "payload", rename_all = "snake_case")]
pub enum RenderInstruction {
    ShowListings(Vec<ListingCard>),
    ShowDialog(DialogView),
    UpdateSummary(BookingSummary),
    SetProcessing(bool),
    HideDialog,
    ResetForm,
}

pub trait DisplaySurface {
    fn apply(&mut self, instruction: RenderInstruction);
}

/// Collects instructions instead of drawing them.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    instructions: Vec<RenderInstruction>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn instructions(&self) -> &[RenderInstruction] {
        &self.instructions
    }

    pub fn take(&mut self) -> Vec<RenderInstruction> {
        std::mem::take(&mut self.instructions)
    }
}

impl DisplaySurface for RecordingSurface {
    fn apply(&mut self, instruction: RenderInstruction) {
        self.instructions.push(instruction);
    }
}

pub struct HostelApp<D: DisplaySurface> {
    catalog: Catalog,
    dialog: BookingDialog,
    form: BookingForm,
    config: BookingConfig,
    notifier: Arc<dyn Notifier>,
    display: D,
}

impl<D: DisplaySurface> HostelApp<D> {
    pub fn new(
        catalog: Catalog,
        config: BookingConfig,
        backend: Arc<dyn SubmissionBackend>,
        notifier: Arc<dyn Notifier>,
        display: D,
    ) -> Self {
        let mut app = Self {
            catalog,
            dialog: BookingDialog::new(config.clone(), backend),
            form: BookingForm::default(),
            config,
            notifier,
            display,
        };
        app.show_listings();
        app
    }

    pub async fn start(
        source: &dyn CatalogSource,
        config: BookingConfig,
        backend: Arc<dyn SubmissionBackend>,
        notifier: Arc<dyn Notifier>,
        display: D,
    ) -> Result<Self, BookingError> {
        config.validate()?;
        let catalog = Catalog::load(source).await?;
        Ok(Self::new(catalog, config, backend, notifier, display))
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn dialog(&self) -> &BookingDialog {
        &self.dialog
    }

    pub fn form(&self) -> &BookingForm {
        &self.form
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }

    /// Applies one user event. A submit that passes validation returns the
    /// pending submission, which the caller drives to completion.
    pub fn handle(&mut self, event: UiEvent) -> Option<PendingSubmission> {
        match event {
            UiEvent::Search(criteria) => {
                match self.catalog.search(&criteria).map(|view| view.len()) {
                    Ok(shown) => {
                        debug!(shown, "Search applied");
                        self.show_listings()
                    }
                    Err(err) => self.notify_error(err.message),
                }
                None
            }
            UiEvent::FilterPrice { min, max } => {
                self.catalog
                    .apply_filter(PriceRange::parse(min.as_deref(), max.as_deref()));
                self.show_listings();
                None
            }
            UiEvent::Sort(key) => {
                self.catalog.apply_sort(key);
                self.show_listings();
                None
            }
            UiEvent::Book(listing_id) => {
                // Unknown ids are ignored
                let was_submitting = self.dialog.is_submitting();
                if let Ok(view) = self.dialog.open(&self.catalog, listing_id) {
                    if was_submitting {
                        self.display.apply(RenderInstruction::SetProcessing(false));
                    }
                    self.form.room_type.clear();
                    self.form.term.clear();
                    self.display.apply(RenderInstruction::ShowDialog(view));
                }
                None
            }
            UiEvent::SelectRoomType(tag) => {
                self.select_room_type(tag);
                None
            }
            UiEvent::SelectTerm(tag) => {
                self.select_term(tag);
                None
            }
            UiEvent::UpdateField { field, value } => {
                match field {
                    FormField::RoomType => self.select_room_type(value),
                    FormField::Term => self.select_term(value),
                    _ => self.form.set(field, value),
                }
                None
            }
            UiEvent::Submit => self.submit(),
            UiEvent::Close => {
                let was_submitting = self.dialog.is_submitting();
                if self.dialog.close() {
                    if was_submitting {
                        self.display.apply(RenderInstruction::SetProcessing(false));
                    }
                    self.display.apply(RenderInstruction::HideDialog);
                }
                None
            }
        }
    }

    pub async fn finish_submission(
        &mut self,
        pending: PendingSubmission,
    ) -> Option<SubmissionResolution> {
        let completed = pending.wait().await;
        self.apply_completion(completed)
    }

    // Stale or cancelled results leave the page untouched
    pub fn apply_completion(
        &mut self,
        completed: CompletedSubmission,
    ) -> Option<SubmissionResolution> {
        let resolution = self.dialog.complete(completed)?;
        self.display.apply(RenderInstruction::SetProcessing(false));

        match &resolution {
            SubmissionResolution::Confirmed(_) => {
                self.notifier.notify(Notification::success(
                    BOOKING_CONFIRMED_MESSAGE,
                    self.config.notification_duration(),
                ));
                self.display.apply(RenderInstruction::HideDialog);
                self.form.reset();
                self.display.apply(RenderInstruction::ResetForm);
            }
            SubmissionResolution::Failed(err) => self.notify_error(err.to_string()),
        }
        Some(resolution)
    }

    fn submit(&mut self) -> Option<PendingSubmission> {
        match self.dialog.submit(&self.form) {
            Ok(pending) => {
                self.display.apply(RenderInstruction::SetProcessing(true));
                Some(pending)
            }
            Err(BookingError::Validation(err)) => {
                self.notify_error(err.message);
                None
            }
            Err(err) => {
                debug!(%err, "Ignoring submit");
                None
            }
        }
    }

    fn select_room_type(&mut self, tag: String) {
        match self.dialog.select_room_type(&tag) {
            Ok(Some(summary)) => {
                self.form.room_type = tag;
                self.display.apply(RenderInstruction::UpdateSummary(summary));
            }
            Ok(None) => {}
            Err(err) => self.notify_error(err.message),
        }
    }

    fn select_term(&mut self, tag: String) {
        if let Some(summary) = self.dialog.select_term(&tag) {
            self.form.term = tag;
            self.display.apply(RenderInstruction::UpdateSummary(summary));
        }
    }

    fn show_listings(&mut self) {
        let cards = render(self.catalog.view(), &self.config);
        self.display.apply(RenderInstruction::ShowListings(cards));
    }

    fn notify_error(&self, message: String) {
        self.notifier.notify(Notification::error(
            message,
            self.config.notification_duration(),
        ));
    }
}
