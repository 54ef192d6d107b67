//! Mailing-list signup: form state, message decoding, and the submission
//! pipeline in front of the list transport.

pub mod form;
pub mod message;
pub mod transport;

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use metrics::counter;
use tokio::sync::mpsc;
use tracing::{debug, info};

pub use form::{COMMIT_KEY, EMPTY_EMAIL_ERROR, RemoteStatus, StatusView, SubscribeForm};
pub use message::decode_display_message;
pub use transport::{
    GDPR_CONSENT_FIELD_ID, ListTransport, StatusUpdate, SubscribeHandle, SubscribePayload,
};

const METRIC_NEWSLETTER_SUBMISSIONS: &str = "vetrina_newsletter_submissions_total";

/// Monotonic submission tickets. Updates are admitted only for the most
/// recently issued ticket, so when submissions overlap the last one
/// submitted owns the form regardless of resolution order.
#[derive(Debug, Default)]
pub struct SubmissionSequencer {
    issued: AtomicU64,
}

impl SubmissionSequencer {
    pub fn begin(&self) -> SubmissionTicket {
        SubmissionTicket(self.issued.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn admits(&self, ticket: SubmissionTicket) -> bool {
        ticket.0 == self.issued.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmissionTicket(u64);

impl SubmissionTicket {
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// Outcome of one submission attempt.
#[derive(Debug)]
pub enum SubmitOutcome {
    /// Validation failed before the transport was contacted.
    RejectedLocally,
    /// The transport was contacted and the submission is in flight.
    Dispatched(ActiveSubmission),
}

impl SubmitOutcome {
    /// Advisory composite signal: the address contains `@` and the transport
    /// accepted the dispatch. Distinct from the status updates, which carry
    /// the authoritative resolution; the two can disagree.
    pub fn looks_accepted(&self) -> bool {
        matches!(self, Self::Dispatched(submission) if submission.looks_accepted)
    }
}

/// An in-flight submission and the update stream that resolves it.
#[derive(Debug)]
pub struct ActiveSubmission {
    pub looks_accepted: bool,
    pub ticket: SubmissionTicket,
    pub updates: mpsc::Receiver<StatusUpdate>,
}

/// Reaction to a key press in the email field.
#[derive(Debug)]
pub enum KeyEventOutcome {
    /// The commit key: its default action is cancelled and a submission ran.
    Committed(SubmitOutcome),
    /// Any other key.
    Ignored,
}

#[derive(Clone)]
pub struct NewsletterService {
    transport: Arc<dyn ListTransport>,
    sequencer: Arc<SubmissionSequencer>,
}

impl NewsletterService {
    pub fn new(transport: Arc<dyn ListTransport>) -> Self {
        Self {
            transport,
            sequencer: Arc::new(SubmissionSequencer::default()),
        }
    }

    /// Run one submission attempt against the form.
    ///
    /// An empty address fails validation locally and the transport is never
    /// contacted. Otherwise the payload is dispatched and the caller applies
    /// the returned update stream as reports arrive.
    pub async fn submit(&self, form: &mut SubscribeForm) -> SubmitOutcome {
        form.clear_local_error();

        let Some(payload) = form.subscription_payload() else {
            form.fail_validation();
            counter!(METRIC_NEWSLETTER_SUBMISSIONS, "accepted" => "false").increment(1);
            return SubmitOutcome::RejectedLocally;
        };

        let ticket = self.sequencer.begin();
        let address_plausible = payload.email.contains('@');
        let handle = self.transport.subscribe(payload).await;
        let looks_accepted = address_plausible && handle.accepted;

        counter!(
            METRIC_NEWSLETTER_SUBMISSIONS,
            "accepted" => if looks_accepted { "true" } else { "false" }
        )
        .increment(1);
        info!(
            target = "vetrina::newsletter",
            transport_accepted = handle.accepted,
            looks_accepted,
            ticket = ticket.value(),
            "Subscription dispatched"
        );

        SubmitOutcome::Dispatched(ActiveSubmission {
            looks_accepted,
            ticket,
            updates: handle.updates,
        })
    }

    /// React to a key press in the email field. Every key dismisses the
    /// local error; the commit key additionally drives a submission.
    pub async fn handle_key_event(&self, form: &mut SubscribeForm, key: &str) -> KeyEventOutcome {
        form.note_key_press();
        if key == COMMIT_KEY {
            KeyEventOutcome::Committed(self.submit(form).await)
        } else {
            KeyEventOutcome::Ignored
        }
    }

    /// Project a status report onto the form unless a newer submission has
    /// been issued since `ticket`. Returns whether the report was applied.
    pub fn apply_update(
        &self,
        form: &mut SubscribeForm,
        ticket: SubmissionTicket,
        update: StatusUpdate,
    ) -> bool {
        if !self.sequencer.admits(ticket) {
            debug!(
                target = "vetrina::newsletter",
                ticket = ticket.value(),
                status = update.status.as_str(),
                "Dropped stale status update"
            );
            return false;
        }
        form.apply_update(update);
        true
    }
}
