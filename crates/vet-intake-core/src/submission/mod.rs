//! Final submission: payload building and the submit round-trip.

mod payload;

pub use payload::*;

use std::time::Duration;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{info, warn};

use crate::models::Page;
use crate::services::{with_timeout, ServiceError, SubmissionSink};
use crate::wizard::{validate, IntakeWizard, ValidationErrors};

/// Shown when the collaborator gives no message of its own.
pub const GENERIC_SUBMISSION_MESSAGE: &str = "We couldn't submit your request. Please try again.";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SubmissionError {
    /// Only final pages submit
    #[error("{0} is not a final page")]
    NotFinalPage(Page),

    #[error("the final page has {} unanswered or invalid fields", .0.len())]
    Invalid(ValidationErrors),

    #[error("failed to encode the request: {0}")]
    Encode(String),

    /// The practice API rejected or never received the request
    #[error("{message}")]
    Rejected { message: String },
}

impl SubmissionError {
    /// Collaborator message if present, else the generic retry message.
    pub fn from_service(error: &ServiceError) -> Self {
        let message = error
            .user_message()
            .map(str::to_string)
            .unwrap_or_else(|| GENERIC_SUBMISSION_MESSAGE.to_string());
        SubmissionError::Rejected { message }
    }

    /// Message to show on the page.
    pub fn user_message(&self) -> String {
        match self {
            SubmissionError::Rejected { message } => message.clone(),
            _ => GENERIC_SUBMISSION_MESSAGE.to_string(),
        }
    }
}

pub type SubmissionResult<T> = Result<T, SubmissionError>;

/// Validate the final page, post the payload, and move to `Success`.
///
/// On any failure the wizard stays on its page with the error recorded so
/// the client can resubmit.
pub async fn submit(
    wizard: &mut IntakeWizard,
    sink: &dyn SubmissionSink,
    practice_id: &str,
    submitted_at: DateTime<Utc>,
    timeout: Duration,
) -> SubmissionResult<()> {
    let page = wizard.page();
    if !page.is_final() {
        return Err(SubmissionError::NotFinalPage(page));
    }
    let errors = validate(page, wizard.session());
    if !errors.is_empty() {
        wizard.set_validation_errors(errors.clone());
        return Err(SubmissionError::Invalid(errors));
    }

    let body = build(wizard.session(), practice_id, submitted_at)
        .to_json()
        .map_err(|e| SubmissionError::Encode(e.to_string()));
    let body = match body {
        Ok(body) => body,
        Err(e) => {
            wizard.record_submission_failure(e.user_message());
            return Err(e);
        }
    };

    match with_timeout(timeout, sink.submit(&body)).await {
        Ok(()) => {
            info!(page = %page, "appointment request submitted");
            wizard.mark_submitted();
            Ok(())
        }
        Err(e) => {
            warn!(error = %e, "appointment request submission failed");
            let error = SubmissionError::from_service(&e);
            wizard.record_submission_failure(error.user_message());
            Err(error)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{IntakeSession, NO_PREFERENCE};
    use async_trait::async_trait;
    use serde_json::Value;
    use std::sync::Mutex;

    struct FakeSink {
        result: Result<(), ServiceError>,
        received: Mutex<Vec<Value>>,
    }

    impl FakeSink {
        fn new(result: Result<(), ServiceError>) -> Self {
            Self {
                result,
                received: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl SubmissionSink for FakeSink {
        async fn submit(&self, payload: &Value) -> Result<(), ServiceError> {
            self.received.lock().unwrap().push(payload.clone());
            self.result.clone()
        }
    }

    fn ready_wizard() -> IntakeWizard {
        let mut session = IntakeSession::new(false);
        session.current_page = Page::EuthanasiaContinued;
        session.urgency = Some(crate::models::Urgency::Soon);
        session.preferred_doctor_text = Some(NO_PREFERENCE.into());
        session.time_preference_text = Some("Any afternoon".into());
        session.new_client_euthanasia = Some(crate::models::YesNo::Yes);
        IntakeWizard::from_session(session)
    }

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-06-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[tokio::test]
    async fn test_submit_success_moves_to_success() {
        let mut wizard = ready_wizard();
        let sink = FakeSink::new(Ok(()));
        submit(&mut wizard, &sink, "1", now(), Duration::from_secs(5))
            .await
            .unwrap();

        assert_eq!(wizard.page(), Page::Success);
        let received = sink.received.lock().unwrap();
        assert_eq!(received[0]["isEuthanasia"], Value::Bool(true));
        assert_eq!(received[0]["metadata"]["formFlow"], "euthanasia");
    }

    #[tokio::test]
    async fn test_submit_failure_surfaces_service_message() {
        let mut wizard = ready_wizard();
        let sink = FakeSink::new(Err(ServiceError::Status {
            status: 422,
            message: "Phone number is invalid".into(),
        }));
        let err = submit(&mut wizard, &sink, "1", now(), Duration::from_secs(5))
            .await
            .unwrap_err();

        assert_eq!(err.user_message(), "Phone number is invalid");
        assert_eq!(wizard.page(), Page::EuthanasiaContinued);
        assert_eq!(
            wizard.session().submission_error.as_deref(),
            Some("Phone number is invalid")
        );
    }

    #[tokio::test]
    async fn test_submit_failure_generic_message() {
        let mut wizard = ready_wizard();
        let sink = FakeSink::new(Err(ServiceError::Transport("connection reset".into())));
        submit(&mut wizard, &sink, "1", now(), Duration::from_secs(5))
            .await
            .unwrap_err();
        assert_eq!(
            wizard.session().submission_error.as_deref(),
            Some(GENERIC_SUBMISSION_MESSAGE)
        );
    }

    #[tokio::test]
    async fn test_submit_not_found_with_body_message() {
        let mut wizard = ready_wizard();
        let sink = FakeSink::new(Err(ServiceError::NotFound {
            resource: "/public/appointments/form".into(),
            message: Some("Practice is not accepting requests".into()),
        }));
        submit(&mut wizard, &sink, "1", now(), Duration::from_secs(5))
            .await
            .unwrap_err();
        assert_eq!(
            wizard.session().submission_error.as_deref(),
            Some("Practice is not accepting requests")
        );
    }

    #[tokio::test]
    async fn test_submit_rejects_invalid_page() {
        let mut wizard = ready_wizard();
        wizard.apply(crate::wizard::IntakeEvent::TimePreferenceChanged { text: None });
        let sink = FakeSink::new(Ok(()));
        let err = submit(&mut wizard, &sink, "1", now(), Duration::from_secs(5))
            .await
            .unwrap_err();

        assert!(matches!(err, SubmissionError::Invalid(ref e) if e.contains("time_preference_text")));
        assert!(sink.received.lock().unwrap().is_empty());

        let mut intro = IntakeWizard::new(false);
        let err = submit(&mut intro, &sink, "1", now(), Duration::from_secs(5))
            .await
            .unwrap_err();
        assert_eq!(err, SubmissionError::NotFinalPage(Page::Intro));
    }
}
