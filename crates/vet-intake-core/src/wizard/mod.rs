//! Wizard state machine: owns the session and moves it between pages.
//!
//! `next`/`back` are pure lookups; [`IntakeWizard`] adds validation and the
//! reducer on top, and reports what happened so the caller can notify
//! analytics after a successful transition.

mod events;
mod transitions;
mod validation;

pub use events::*;
pub use transitions::*;
pub use validation::*;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::models::{IntakeSession, Page};

/// Outcome of a "next" action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Advance {
    Moved { from: Page, to: Page },
    /// Validation failed; the session stays on its page
    Blocked(ValidationErrors),
    /// The page is final and valid; the caller should submit
    ReadyToSubmit,
}

/// Receives page transitions (analytics, screen tracking).
pub trait IntakeNotifier: Send + Sync {
    fn page_viewed(&self, from: Page, to: Page);
}

/// Reports transitions as tracing events.
pub struct TracingNotifier;

impl IntakeNotifier for TracingNotifier {
    fn page_viewed(&self, from: Page, to: Page) {
        info!(from = %from, to = %to, "page viewed");
    }
}

/// Exclusive owner of one [`IntakeSession`].
#[derive(Debug, Clone)]
pub struct IntakeWizard {
    session: IntakeSession,
}

impl IntakeWizard {
    pub fn new(authenticated: bool) -> Self {
        Self::from_session(IntakeSession::new(authenticated))
    }

    pub fn from_session(session: IntakeSession) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &IntakeSession {
        &self.session
    }

    pub fn into_session(self) -> IntakeSession {
        self.session
    }

    pub fn page(&self) -> Page {
        self.session.current_page
    }

    /// Run an event through the reducer.
    pub fn apply(&mut self, event: IntakeEvent) {
        let session = std::mem::replace(&mut self.session, IntakeSession::new(false));
        self.session = reduce(session, event);
    }

    /// Validate the current page and move forward if it passes.
    pub fn advance(&mut self) -> Result<Advance, NavigationError> {
        let from = self.session.current_page;
        if from == Page::Success {
            return Err(NavigationError::Finished);
        }
        let errors = validate(from, &self.session);
        self.session.validation_errors = errors.clone();
        if !errors.is_empty() {
            return Ok(Advance::Blocked(errors));
        }
        match next(&self.session)? {
            Step::Submit => Ok(Advance::ReadyToSubmit),
            Step::Page(to) => {
                self.session.current_page = to;
                self.session.submission_error = None;
                Ok(Advance::Moved { from, to })
            }
        }
    }

    /// Move to the predecessor page. Errors from the page being left are
    /// cleared.
    pub fn back(&mut self) -> Result<Page, NavigationError> {
        let to = back(&self.session)?;
        self.session.current_page = to;
        self.session.validation_errors = ValidationErrors::new();
        self.session.submission_error = None;
        Ok(to)
    }

    /// Advance and forward a successful move to `notifier`.
    pub fn advance_and_notify(
        &mut self,
        notifier: &dyn IntakeNotifier,
    ) -> Result<Advance, NavigationError> {
        let outcome = self.advance()?;
        if let Advance::Moved { from, to } = outcome {
            notifier.page_viewed(from, to);
        }
        Ok(outcome)
    }

    pub fn set_validation_errors(&mut self, errors: ValidationErrors) {
        self.session.validation_errors = errors;
    }

    /// Submission accepted.
    pub fn mark_submitted(&mut self) {
        self.session.submission_error = None;
        self.session.validation_errors = ValidationErrors::new();
        self.session.current_page = Page::Success;
    }

    /// Submission rejected; stay on the page so the client can retry.
    pub fn record_submission_failure(&mut self, message: impl Into<String>) {
        self.session.submission_error = Some(message.into());
    }
}
