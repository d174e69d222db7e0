//! Contracts of the external collaborators the intake core consumes.
//!
//! Each contract is an async trait so the core can be driven by the HTTP
//! adapter in production and by in-memory fakes in tests. None of these are
//! reimplemented here.

mod wire;

pub use wire::*;

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Failure of a collaborator call.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ServiceError {
    /// HTTP 404. For zone lookup this means "not serviced". `message` is
    /// set only when the response body carried one.
    #[error("Not found: {resource}")]
    NotFound {
        resource: String,
        message: Option<String>,
    },

    #[error("Service returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Malformed response: {0}")]
    Decode(String),
}

impl ServiceError {
    /// Message suitable for showing to the client, if the service sent one.
    pub fn user_message(&self) -> Option<&str> {
        match self {
            ServiceError::Status { message, .. } if !message.trim().is_empty() => Some(message),
            ServiceError::NotFound {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => Some(message),
            _ => None,
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Run a collaborator call under a deadline; expiry is a generic failure.
pub async fn with_timeout<T, F>(limit: Duration, call: F) -> ServiceResult<T>
where
    F: std::future::Future<Output = ServiceResult<T>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(ServiceError::Timeout(limit)),
    }
}

/// Email pre-lookup.
#[async_trait]
pub trait ClientDirectory: Send + Sync {
    async fn check_email(&self, email: &str, practice_id: &str) -> ServiceResult<EmailCheck>;
}

/// Appointment-type catalog.
#[async_trait]
pub trait AppointmentTypeDirectory: Send + Sync {
    async fn fetch_appointment_types(
        &self,
        query: &AppointmentTypeQuery,
    ) -> ServiceResult<Vec<RawAppointmentType>>;
}

/// Provider directories: the authenticated employee directory and the
/// anonymous public one.
#[async_trait]
pub trait ProviderDirectory: Send + Sync {
    async fn fetch_employees(&self, practice_id: &str) -> ServiceResult<Vec<RawProvider>>;

    async fn fetch_public_providers(&self, practice_id: &str) -> ServiceResult<Vec<RawProvider>>;
}

/// `GET /find-zone-by-address`. A [`ServiceError::NotFound`] means the
/// address is outside every service zone.
#[async_trait]
pub trait ZoneLookup: Send + Sync {
    async fn find_zone_by_address(&self, address: &str) -> ServiceResult<ZoneMatch>;
}

/// Candidate visit times.
#[async_trait]
pub trait AvailabilityService: Send + Sync {
    /// Authenticated clients: `POST /routing/v2`.
    async fn route(&self, request: &RoutingRequest) -> ServiceResult<AvailabilityResponse>;

    /// Anonymous clients: public availability.
    async fn public_availability(
        &self,
        request: &PublicAvailabilityRequest,
    ) -> ServiceResult<AvailabilityResponse>;
}

/// Species and breed reference data.
#[async_trait]
pub trait SpeciesCatalog: Send + Sync {
    async fn species_breeds(
        &self,
        practice_id: &str,
        species_id: Option<&str>,
    ) -> ServiceResult<Vec<SpeciesBreeds>>;
}

/// Alerts on file for an existing patient (e.g., "muzzle required").
#[async_trait]
pub trait PatientAlerts: Send + Sync {
    async fn alerts_for(&self, pet_id: &str) -> ServiceResult<Vec<String>>;
}

/// `POST /public/appointments/form`.
#[async_trait]
pub trait SubmissionSink: Send + Sync {
    async fn submit(&self, payload: &Value) -> ServiceResult<()>;
}
