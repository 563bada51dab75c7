//! Record-editing views.
//!
//! Each view is bound to one patient and owns its slice of remote data.
//! Reads land in a `Remote<T>` (inline error on failure); mutations are
//! validated locally, submitted, and spliced into the local copy on
//! success. Validation and mutation failures go through the `Prompter`
//! as a blocking alert, and any 401 drops the session.

use std::sync::Arc;

use crate::api::ApiClient;
use crate::error::PortalError;
use crate::session::SessionStore;

pub mod collection;
pub mod details;
pub mod diagnosis;
pub mod search;
pub mod vitals;

pub use collection::{AllergiesView, CollectionView, HistoriesView, PrescriptionsView};
pub use details::PatientDetailsView;
pub use diagnosis::{DiagnosisCard, FOLLOW_UP_DAYS};
pub use search::{PatientSearch, SearchState};
pub use vitals::VitalsView;

/// Blocking user interaction: a yes/no question or an acknowledgement.
pub trait Prompter: Send + Sync {
    fn confirm(&self, message: &str) -> bool;
    fn alert(&self, message: &str);
}

/// What every view needs from its dashboard.
#[derive(Clone)]
pub struct ViewContext {
    session: Arc<SessionStore>,
    prompter: Arc<dyn Prompter>,
}

impl ViewContext {
    pub fn new(session: Arc<SessionStore>, prompter: Arc<dyn Prompter>) -> Self {
        Self { session, prompter }
    }

    pub fn client(&self) -> &ApiClient {
        self.session.client()
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn confirm(&self, message: &str) -> bool {
        self.prompter.confirm(message)
    }

    pub fn alert(&self, message: &str) {
        self.prompter.alert(message);
    }

    /// Record a failed request: a rejected token ends the session.
    pub(crate) fn notice(&self, err: &PortalError) {
        self.session.handle_rejection(err);
    }

    /// Alert for a failed mutation; validation text is shown verbatim,
    /// anything else prefers the server message over `fallback`.
    pub(crate) fn fail(&self, err: &PortalError, fallback: &str) {
        if !err.is_validation() {
            tracing::warn!(error = %err, "Mutation failed");
            self.notice(err);
        }
        self.alert(&err.user_message(fallback));
    }
}
