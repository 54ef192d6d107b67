use super::message::decode_display_message;
use super::transport::{StatusUpdate, SubscribePayload};

/// Shown when submission is attempted without an email address.
pub const EMPTY_EMAIL_ERROR: &str = "Please enter a valid email address";

/// Key that commits the form from the email field.
pub const COMMIT_KEY: &str = "Enter";

/// Lifecycle of one remotely-resolved submission. `sending` re-enters from
/// either terminal state on resubmission; `idle` only exists before the
/// first submit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RemoteStatus {
    #[default]
    Idle,
    Sending,
    Success,
    Error,
}

impl RemoteStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Sending => "sending",
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

/// Signup form state. One instance per rendered form; the remote fields
/// change only through status updates from the list transport.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SubscribeForm {
    email: String,
    consent: bool,
    local_error: Option<String>,
    remote_status: RemoteStatus,
    remote_message: Option<String>,
}

impl SubscribeForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the candidate address. Editing dismisses the local error;
    /// format checks wait until submission.
    pub fn set_email(&mut self, value: impl Into<String>) {
        self.email = value.into();
        self.local_error = None;
    }

    /// Store the consent flag verbatim.
    pub fn set_consent(&mut self, checked: bool) {
        self.consent = checked;
    }

    /// Any key press in the email field dismisses the local error.
    pub fn note_key_press(&mut self) {
        self.local_error = None;
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn consent(&self) -> bool {
        self.consent
    }

    pub fn local_error(&self) -> Option<&str> {
        self.local_error.as_deref()
    }

    pub fn remote_status(&self) -> RemoteStatus {
        self.remote_status
    }

    pub fn remote_message(&self) -> Option<&str> {
        self.remote_message.as_deref()
    }

    pub(crate) fn clear_local_error(&mut self) {
        self.local_error = None;
    }

    pub(crate) fn fail_validation(&mut self) {
        self.local_error = Some(EMPTY_EMAIL_ERROR.to_owned());
    }

    /// Build the transport payload, or `None` when no address was entered.
    pub fn subscription_payload(&self) -> Option<SubscribePayload> {
        if self.email.is_empty() {
            return None;
        }
        Some(SubscribePayload::new(self.email.as_str(), self.consent))
    }

    /// Project a transport status report onto the form. The raw message is
    /// stored as received and decoded at view time.
    pub fn apply_update(&mut self, update: StatusUpdate) {
        self.remote_status = update.status;
        self.remote_message = update.message;
    }

    /// The single rendering decision for the status region.
    pub fn status_view(&self) -> StatusView {
        match (&self.local_error, self.remote_status) {
            (_, RemoteStatus::Sending) => StatusView::Sending,
            (Some(text), _) => StatusView::LocalError { text: text.clone() },
            (None, RemoteStatus::Error) => StatusView::RemoteError {
                markup: decode_display_message(self.remote_message.as_deref()),
            },
            (None, RemoteStatus::Success) => StatusView::Confirmed {
                markup: decode_display_message(self.remote_message.as_deref()),
            },
            (None, RemoteStatus::Idle) => StatusView::Idle,
        }
    }
}

/// What the status region shows. `LocalError` text is plain text; the decoded
/// remote variants are trusted markup supplied by the list service, and
/// embedders must keep or re-establish that trust boundary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StatusView {
    Idle,
    Sending,
    LocalError { text: String },
    RemoteError { markup: Option<String> },
    Confirmed { markup: Option<String> },
}
