//! Vet-Intake Core Library
//!
//! Appointment intake orchestration for a mobile veterinary practice: a
//! branching wizard that collects a visit request and proposes up to three
//! candidate visit times.
//!
//! # Architecture
//!
//! ```text
//!   UI shell ── IntakeEvent ──► reduce(Session, Event) ─► Session
//!                                        │
//!                       "next" ──► validate(page) ──► next(session)
//!                                        │
//!             ┌──────────────────────────┼───────────────────────────┐
//!             ▼                          ▼                           ▼
//!     Zone lookup (debounced)    Provider directory          Slot recommendation
//!             │                    │  eligibility              window → fetch →
//!             │                    │  name resolver            normalize → filter →
//!             │                    ▼                           round → ≤3 slots
//!             └──────────► results checked against request generation
//!                                        │
//!                                        ▼
//!                          SubmissionPayload ──► practice API
//! ```
//!
//! # Core Principle
//!
//! **Enrichment never blocks the client.** Only validation errors and an
//! out-of-area address stop the wizard; every other failure degrades to an
//! empty default.
//!
//! # Modules
//!
//! - [`models`]: Session aggregate and domain types
//! - [`catalog`]: Appointment-type classifier and veterinarian eligibility
//! - [`resolver`]: Preferred-doctor name resolution
//! - [`scheduling`]: Slot recommendation engine
//! - [`wizard`]: Page state machine, validation and the session reducer
//! - [`services`]: Collaborator contracts
//! - [`enrichment`]: Async lookups with staleness discard
//! - [`submission`]: Submission payload and submit flow
//! - [`config`] / [`telemetry`]: Environment configuration and tracing setup

pub mod catalog;
pub mod config;
pub mod enrichment;
pub mod models;
pub mod resolver;
pub mod scheduling;
pub mod services;
pub mod submission;
pub mod telemetry;
pub mod wizard;

// Re-export commonly used types
pub use config::{ConfigError, IntakeConfig};
pub use enrichment::{Collaborators, IntakeOrchestrator};
pub use models::{
    Address, AppointmentTypeDef, CandidateSlot, IntakeSession, Page, PetRecord, Provider, Urgency,
};
pub use scheduling::{SlotRecommendationEngine, SearchWindow};
pub use submission::{SubmissionError, SubmissionPayload};
pub use wizard::{Advance, IntakeEvent, IntakeWizard, NavigationError, ValidationErrors};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::sync::{Arc, Mutex};

use chrono::{DateTime, NaiveDate, Utc};

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum IntakeError {
    #[error("Navigation error: {0}")]
    NavigationError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Submission error: {0}")]
    SubmissionError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Lock poisoned: {0}")]
    LockError(String),
}

impl From<NavigationError> for IntakeError {
    fn from(e: NavigationError) -> Self {
        IntakeError::NavigationError(e.to_string())
    }
}

impl From<serde_json::Error> for IntakeError {
    fn from(e: serde_json::Error) -> Self {
        IntakeError::SerializationError(e.to_string())
    }
}

impl From<SubmissionError> for IntakeError {
    fn from(e: SubmissionError) -> Self {
        IntakeError::SubmissionError(e.user_message())
    }
}

impl From<ConfigError> for IntakeError {
    fn from(e: ConfigError) -> Self {
        IntakeError::ConfigError(e.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for IntakeError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        IntakeError::LockError(e.to_string())
    }
}

// =========================================================================
// Factory and Stateless Functions (exported to FFI)
// =========================================================================

/// Start a form-fill.
#[uniffi::export]
pub fn create_session(authenticated: bool) -> Arc<IntakeCore> {
    Arc::new(IntakeCore {
        wizard: Mutex::new(IntakeWizard::new(authenticated)),
        practice_id: IntakeConfig::default().practice_id,
    })
}

/// Start a form-fill with configuration read from the environment.
#[uniffi::export]
pub fn create_session_from_env(authenticated: bool) -> Result<Arc<IntakeCore>, IntakeError> {
    let config = IntakeConfig::load()?;
    Ok(Arc::new(IntakeCore {
        wizard: Mutex::new(IntakeWizard::new(authenticated)),
        practice_id: config.practice_id,
    }))
}

/// Search window for an urgency literal, or `None` when slots are arranged
/// by staff.
#[uniffi::export]
pub fn search_window(urgency: String, today: String) -> Result<Option<FfiSearchWindow>, IntakeError> {
    let urgency = parse_urgency(&urgency)?;
    let today = parse_date(&today)?;
    Ok(scheduling::window_for(Some(urgency)).map(|window| FfiSearchWindow {
        start_date: window.start_date(today).to_string(),
        length_days: window.length_days,
    }))
}

/// Estimated visit length for a number of pets.
#[uniffi::export]
pub fn service_minutes(pet_count: u32) -> u32 {
    scheduling::service_minutes(pet_count as usize)
}

/// Normalize a raw availability answer into at most three slots.
#[uniffi::export]
pub fn normalize_availability(response_json: String) -> Result<Vec<FfiCandidateSlot>, IntakeError> {
    let response: services::AvailabilityResponse = serde_json::from_str(&response_json)?;
    Ok(scheduling::normalize(response)
        .into_iter()
        .map(FfiCandidateSlot::from)
        .collect())
}

fn parse_urgency(label: &str) -> Result<Urgency, IntakeError> {
    Urgency::from_label(label)
        .ok_or_else(|| IntakeError::InvalidInput(format!("unknown urgency: {label}")))
}

fn parse_date(value: &str) -> Result<NaiveDate, IntakeError> {
    value
        .parse::<NaiveDate>()
        .map_err(|e| IntakeError::InvalidInput(format!("invalid date '{value}': {e}")))
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe wizard wrapper for FFI. The host shell performs network
/// calls and feeds results back as events.
#[derive(uniffi::Object)]
pub struct IntakeCore {
    wizard: Mutex<IntakeWizard>,
    practice_id: String,
}

#[uniffi::export]
impl IntakeCore {
    // =========================================================================
    // Session State
    // =========================================================================

    /// Apply a JSON-encoded [`IntakeEvent`].
    pub fn apply_event(&self, event_json: String) -> Result<(), IntakeError> {
        let event: IntakeEvent = serde_json::from_str(&event_json)?;
        self.wizard.lock()?.apply(event);
        Ok(())
    }

    /// Current page identifier.
    pub fn current_page(&self) -> Result<String, IntakeError> {
        Ok(self.wizard.lock()?.page().as_str().to_string())
    }

    /// Whether the current page offers "Previous".
    pub fn has_previous(&self) -> Result<bool, IntakeError> {
        Ok(self.wizard.lock()?.page().has_previous())
    }

    /// Field errors from the last "next" attempt.
    pub fn validation_errors(&self) -> Result<Vec<FfiFieldError>, IntakeError> {
        let wizard = self.wizard.lock()?;
        Ok(field_errors(&wizard.session().validation_errors))
    }

    /// Whether the free-text time preference must be filled in.
    pub fn time_preference_required(&self) -> Result<bool, IntakeError> {
        Ok(wizard::time_preference_required(self.wizard.lock()?.session()))
    }

    /// Full session as JSON.
    pub fn session_json(&self) -> Result<String, IntakeError> {
        let wizard = self.wizard.lock()?;
        Ok(serde_json::to_string(wizard.session())?)
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// Validate the current page and move forward.
    pub fn advance(&self) -> Result<FfiAdvance, IntakeError> {
        let mut wizard = self.wizard.lock()?;
        let outcome = wizard.advance()?;
        Ok(FfiAdvance::new(outcome, wizard.page()))
    }

    /// Move to the previous page.
    pub fn back(&self) -> Result<String, IntakeError> {
        let page = self.wizard.lock()?.back()?;
        Ok(page.as_str().to_string())
    }

    // =========================================================================
    // Catalog and Providers
    // =========================================================================

    /// Appointment types the client may choose, euthanasia last.
    pub fn appointment_type_options(&self) -> Result<Vec<FfiAppointmentType>, IntakeError> {
        let wizard = self.wizard.lock()?;
        let session = wizard.session();
        let options = catalog::intake_options(&session.appointment_types, !session.is_existing_client());
        Ok(options.into_iter().map(FfiAppointmentType::from).collect())
    }

    /// Providers accepting every type chosen across the selected pets.
    pub fn eligible_providers(&self) -> Result<Vec<FfiProvider>, IntakeError> {
        let wizard = self.wizard.lock()?;
        let session = wizard.session();
        let selected = catalog::selected_type_names(session);
        Ok(catalog::eligible_providers(&session.providers, &selected)
            .into_iter()
            .map(FfiProvider::from)
            .collect())
    }

    /// Resolve preferred-doctor text against the loaded providers.
    pub fn resolve_provider(&self, free_text: String) -> Result<Option<FfiProvider>, IntakeError> {
        let wizard = self.wizard.lock()?;
        Ok(resolver::resolve(&free_text, &wizard.session().providers)
            .cloned()
            .map(FfiProvider::from))
    }

    /// "Did you mean" candidates for unresolved doctor text.
    pub fn suggest_providers(&self, free_text: String) -> Result<Vec<FfiProvider>, IntakeError> {
        let wizard = self.wizard.lock()?;
        Ok(resolver::suggest(&free_text, &wizard.session().providers)
            .into_iter()
            .cloned()
            .map(FfiProvider::from)
            .collect())
    }

    // =========================================================================
    // Scheduling
    // =========================================================================

    /// The availability request the current answers call for, as JSON, or
    /// `None` when no automatic search should run.
    pub fn slot_request_json(&self, today: String) -> Result<Option<String>, IntakeError> {
        let today = parse_date(&today)?;
        let wizard = self.wizard.lock()?;
        let inputs = scheduling::SlotInputs::from_session(wizard.session(), &self.practice_id);
        let json = match scheduling::plan(&inputs, today) {
            scheduling::SlotPlan::Skip(_) => None,
            scheduling::SlotPlan::Search(scheduling::AvailabilityQuery::Routing(request)) => {
                Some(serde_json::to_string(&request)?)
            }
            scheduling::SlotPlan::Search(scheduling::AvailabilityQuery::Public(request)) => {
                Some(serde_json::to_string(&request)?)
            }
        };
        Ok(json)
    }

    /// Normalize an availability answer and replace the recommended slots.
    pub fn accept_availability(&self, response_json: String) -> Result<Vec<FfiCandidateSlot>, IntakeError> {
        let response: services::AvailabilityResponse = serde_json::from_str(&response_json)?;
        let slots = scheduling::normalize(response);
        self.wizard.lock()?.apply(IntakeEvent::SlotsRecommended {
            slots: slots.clone(),
        });
        Ok(slots.into_iter().map(FfiCandidateSlot::from).collect())
    }

    // =========================================================================
    // Submission
    // =========================================================================

    /// Submission body for the current answers, nulls stripped.
    pub fn build_submission_json(&self, submitted_at: String) -> Result<String, IntakeError> {
        let submitted_at = DateTime::parse_from_rfc3339(&submitted_at)
            .map_err(|e| IntakeError::InvalidInput(format!("invalid timestamp: {e}")))?
            .with_timezone(&Utc);
        let wizard = self.wizard.lock()?;
        let payload = submission::build(wizard.session(), &self.practice_id, submitted_at);
        Ok(serde_json::to_string(&payload.to_json()?)?)
    }

    /// The practice API accepted the request.
    pub fn mark_submitted(&self) -> Result<(), IntakeError> {
        self.wizard.lock()?.mark_submitted();
        Ok(())
    }

    /// The practice API rejected the request; `message` is its error text,
    /// if any.
    pub fn record_submission_failure(&self, message: Option<String>) -> Result<String, IntakeError> {
        let message = message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| submission::GENERIC_SUBMISSION_MESSAGE.to_string());
        self.wizard.lock()?.record_submission_failure(message.clone());
        Ok(message)
    }
}

fn field_errors(errors: &ValidationErrors) -> Vec<FfiFieldError> {
    errors
        .iter()
        .map(|(field, message)| FfiFieldError {
            field: field.to_string(),
            message: message.to_string(),
        })
        .collect()
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe search window.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct FfiSearchWindow {
    /// ISO date (YYYY-MM-DD)
    pub start_date: String,
    pub length_days: u32,
}

/// FFI-safe candidate slot.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct FfiCandidateSlot {
    pub iso: String,
    pub display: String,
}

impl From<CandidateSlot> for FfiCandidateSlot {
    fn from(slot: CandidateSlot) -> Self {
        Self {
            iso: slot.iso,
            display: slot.display,
        }
    }
}

/// FFI-safe field error.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct FfiFieldError {
    pub field: String,
    pub message: String,
}

/// FFI-safe advance outcome.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct FfiAdvance {
    /// "moved", "blocked" or "ready_to_submit"
    pub outcome: String,
    /// Page after the action
    pub page: String,
    pub errors: Vec<FfiFieldError>,
}

impl FfiAdvance {
    fn new(outcome: Advance, page: Page) -> Self {
        let (outcome, errors) = match outcome {
            Advance::Moved { .. } => ("moved", Vec::new()),
            Advance::Blocked(errors) => ("blocked", field_errors(&errors)),
            Advance::ReadyToSubmit => ("ready_to_submit", Vec::new()),
        };
        Self {
            outcome: outcome.to_string(),
            page: page.as_str().to_string(),
            errors,
        }
    }
}

/// FFI-safe appointment type.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct FfiAppointmentType {
    pub name: String,
    pub pretty_name: String,
    pub is_euthanasia: bool,
    pub requires_detail: bool,
}

impl From<AppointmentTypeDef> for FfiAppointmentType {
    fn from(def: AppointmentTypeDef) -> Self {
        Self {
            is_euthanasia: def.is_euthanasia(),
            requires_detail: def.requires_detail(),
            name: def.name,
            pretty_name: def.pretty_name,
        }
    }
}

/// FFI-safe provider.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct FfiProvider {
    pub id: String,
    pub pims_id: Option<String>,
    pub name: String,
    pub display_name: String,
}

impl From<Provider> for FfiProvider {
    fn from(provider: Provider) -> Self {
        Self {
            display_name: provider.display_name(),
            id: provider.id,
            pims_id: provider.pims_id,
            name: provider.name,
        }
    }
}
