// Booking submission backends and cancellable pending submissions

use crate::config::BookingConfig;
use crate::error::SubmissionError;
use crate::validation::BookingSubmission;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::future::{AbortHandle, Abortable, Aborted, BoxFuture};
use futures::FutureExt;
use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookingConfirmation {
    pub booking_id: String,
    pub listing_id: u32,
    pub confirmed_at: DateTime<Utc>,
}

// Accepts a validated booking and resolves after an unspecified latency
#[async_trait]
pub trait SubmissionBackend: Send + Sync + 'static {
    async fn submit(
        &self,
        submission: BookingSubmission,
    ) -> Result<BookingConfirmation, SubmissionError>;
}

/// Stand-in backend: waits a fixed delay and always confirms.
#[derive(Debug)]
pub struct SimulatedBackend {
    delay: Duration,
    submitted: AtomicUsize,
}

impl SimulatedBackend {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            submitted: AtomicUsize::new(0),
        }
    }

    pub fn from_config(config: &BookingConfig) -> Self {
        Self::new(config.submission_delay())
    }

    // Number of submissions that ran to completion
    pub fn submitted_count(&self) -> usize {
        self.submitted.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SubmissionBackend for SimulatedBackend {
    async fn submit(
        &self,
        submission: BookingSubmission,
    ) -> Result<BookingConfirmation, SubmissionError> {
        debug!(listing_id = submission.listing_id, "Simulating booking submission");
        sleep(self.delay).await;
        self.submitted.fetch_add(1, Ordering::SeqCst);

        Ok(BookingConfirmation {
            booking_id: format!("booking_{}", rand::random::<u32>()),
            listing_id: submission.listing_id,
            confirmed_at: Utc::now(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    Confirmed(BookingConfirmation),
    Failed(SubmissionError),
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedSubmission {
    pub ticket: u64,
    pub outcome: SubmissionOutcome,
}

/// Cancels the submission with the same ticket.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    ticket: u64,
    abort: AbortHandle,
}

impl CancelHandle {
    pub fn ticket(&self) -> u64 {
        self.ticket
    }

    pub fn cancel(&self) {
        self.abort.abort();
    }

    pub fn is_cancelled(&self) -> bool {
        self.abort.is_aborted()
    }
}

/// A submission in flight. Nothing runs until it is awaited with `wait`.
pub struct PendingSubmission {
    ticket: u64,
    future: Abortable<BoxFuture<'static, Result<BookingConfirmation, SubmissionError>>>,
}

impl PendingSubmission {
    pub fn start(
        ticket: u64,
        backend: Arc<dyn SubmissionBackend>,
        submission: BookingSubmission,
    ) -> (Self, CancelHandle) {
        let (abort, registration) = AbortHandle::new_pair();
        let future = async move { backend.submit(submission).await }.boxed();
        let pending = Self {
            ticket,
            future: Abortable::new(future, registration),
        };
        (pending, CancelHandle { ticket, abort })
    }

    pub fn ticket(&self) -> u64 {
        self.ticket
    }

    pub async fn wait(self) -> CompletedSubmission {
        let outcome = match self.future.await {
            Ok(Ok(confirmation)) => SubmissionOutcome::Confirmed(confirmation),
            Ok(Err(err)) => SubmissionOutcome::Failed(err),
            Err(Aborted) => SubmissionOutcome::Cancelled,
        };
        CompletedSubmission {
            ticket: self.ticket,
            outcome,
        }
    }
}

impl std::fmt::Debug for PendingSubmission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingSubmission")
            .field("ticket", &self.ticket)
            .finish_non_exhaustive()
    }
}


#[cfg(test)]
mod tests {
    use super::mock_backend::MockBackend;
    use super::*;
    use crate::listing::RoomType;
    use std::time::Instant;

    fn submission() -> BookingSubmission {
        BookingSubmission {
            listing_id: 3,
            guest_name: "Kofi Boateng".to_string(),
            email: "kofi@example.com".to_string(),
            phone: "0200000000".to_string(),
            index_number: "UEB0001".to_string(),
            room_type: RoomType::from("3-person"),
            term: "2024-2025".to_string(),
        }
    }

    #[tokio::test]
    async fn test_simulated_backend_confirms_after_delay() {
        let backend = Arc::new(SimulatedBackend::new(Duration::from_millis(20)));
        let start = Instant::now();

        let (pending, _cancel) = PendingSubmission::start(1, backend.clone(), submission());
        let completed = pending.wait().await;

        assert!(start.elapsed() >= Duration::from_millis(20));
        assert_eq!(completed.ticket, 1);
        match completed.outcome {
            SubmissionOutcome::Confirmed(confirmation) => {
                assert_eq!(confirmation.listing_id, 3);
                assert!(confirmation.booking_id.starts_with("booking_"));
            }
            other => panic!("Expected confirmation, got {:?}", other),
        }
        assert_eq!(backend.submitted_count(), 1);
    }

    #[tokio::test]
    async fn test_cancel_before_wait() {
        let backend = Arc::new(SimulatedBackend::new(Duration::from_millis(20)));
        let (pending, cancel) = PendingSubmission::start(7, backend.clone(), submission());

        cancel.cancel();
        assert!(cancel.is_cancelled());

        let completed = pending.wait().await;
        assert_eq!(completed.outcome, SubmissionOutcome::Cancelled);
        assert_eq!(backend.submitted_count(), 0);
    }

    #[tokio::test]
    async fn test_cancel_while_in_flight() {
        let backend = Arc::new(SimulatedBackend::new(Duration::from_secs(30)));
        let (pending, cancel) = PendingSubmission::start(2, backend.clone(), submission());

        let task = tokio::spawn(pending.wait());
        tokio::time::sleep(Duration::from_millis(10)).await;
        cancel.cancel();

        let completed = task.await.unwrap();
        assert_eq!(completed.outcome, SubmissionOutcome::Cancelled);
        assert_eq!(backend.submitted_count(), 0);
    }

    #[tokio::test]
    async fn test_backend_failure_is_reported() {
        let backend = Arc::new(MockBackend::new());
        backend.fail_next_requests(1);

        let (pending, _) = PendingSubmission::start(1, backend.clone(), submission());
        let completed = pending.wait().await;
        assert!(matches!(
            completed.outcome,
            SubmissionOutcome::Failed(SubmissionError::Unavailable(_))
        ));

        let (pending, _) = PendingSubmission::start(2, backend.clone(), submission());
        assert!(matches!(
            pending.wait().await.outcome,
            SubmissionOutcome::Confirmed(_)
        ));
        assert_eq!(backend.received().len(), 2);
    }
}
