//! HTTP adapters for the practice API.
//!
//! [`HttpIntakeClient`] implements every collaborator contract the intake
//! core consumes, so one client can back a whole
//! [`vet_intake_core::Collaborators`] set.

mod errors;

pub use errors::*;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;
use vet_intake_core::services::{
    AppointmentTypeDirectory, AppointmentTypeQuery, AvailabilityResponse, AvailabilityService,
    ClientDirectory, EmailCheck, PatientAlerts, ProviderDirectory, PublicAvailabilityRequest,
    RawAppointmentType, RawProvider, RoutingRequest, ServiceError, ServiceResult, SpeciesBreeds, SpeciesCatalog,
    SubmissionSink, ZoneLookup, ZoneMatch,
};
use vet_intake_core::{Collaborators, IntakeConfig};

/// reqwest-backed practice API client.
#[derive(Clone)]
pub struct HttpIntakeClient {
    client: Client,
    base_url: String,
    timeout: Duration,
    bearer_token: Option<String>,
}

impl HttpIntakeClient {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
            bearer_token: None,
        })
    }

    pub fn from_config(config: &IntakeConfig) -> anyhow::Result<Self> {
        Self::new(&config.api_base_url, config.fetch_timeout)
            .with_context(|| format!("practice API client for {}", config.api_base_url))
    }

    /// Authenticate requests as a signed-in client.
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    /// Collaborator set backed by this client.
    pub fn into_collaborators(self) -> Collaborators {
        Collaborators::from_client(Arc::new(self))
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.authorize(self.client.get(self.url(path)))
    }

    fn post(&self, path: &str) -> RequestBuilder {
        self.authorize(self.client.post(self.url(path)))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.bearer_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Send and read the body, mapping non-2xx statuses.
    async fn send(&self, path: &str, request: RequestBuilder) -> ServiceResult<String> {
        let response = request
            .send()
            .await
            .map_err(|e| transport_error(e, self.timeout))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| transport_error(e, self.timeout))?;
        debug!(path, status = status.as_u16(), "practice API response");
        if status.is_success() {
            Ok(body)
        } else {
            Err(status_error(status, path, &body))
        }
    }

    async fn send_json<T: DeserializeOwned + Send>(&self, path: &str, request: RequestBuilder) -> ServiceResult<T> {
        let body = self.send(path, request).await?;
        decode(&body)
    }
}

/// Parse a JSON body; malformed bodies are [`ServiceError::Decode`].
pub fn decode<T: DeserializeOwned>(body: &str) -> ServiceResult<T> {
    serde_json::from_str(body).map_err(|e| ServiceError::Decode(e.to_string()))
}

/// Patient alert entry: plain text or an object carrying it.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawAlert {
    Text(String),
    Object {
        #[serde(alias = "text", alias = "message")]
        description: String,
    },
}

impl RawAlert {
    fn into_text(self) -> String {
        match self {
            RawAlert::Text(text) => text,
            RawAlert::Object { description } => description,
        }
    }
}

const CHECK_EMAIL: &str = "/public/clients/check-email";
const APPOINTMENT_TYPES: &str = "/public/appointment-types";
const EMPLOYEES: &str = "/employees";
const PUBLIC_PROVIDERS: &str = "/public/providers";
const FIND_ZONE: &str = "/find-zone-by-address";
const ROUTING: &str = "/routing/v2";
const PUBLIC_AVAILABILITY: &str = "/public/appointments/availability";
const SPECIES_BREEDS: &str = "/public/species-breeds";
const SUBMIT_FORM: &str = "/public/appointments/form";

#[async_trait]
impl ClientDirectory for HttpIntakeClient {
    async fn check_email(&self, email: &str, practice_id: &str) -> ServiceResult<EmailCheck> {
        let request = self
            .get(CHECK_EMAIL)
            .query(&[("email", email), ("practiceId", practice_id)]);
        self.send_json(CHECK_EMAIL, request).await
    }
}

#[async_trait]
impl AppointmentTypeDirectory for HttpIntakeClient {
    async fn fetch_appointment_types(
        &self,
        query: &AppointmentTypeQuery,
    ) -> ServiceResult<Vec<RawAppointmentType>> {
        let request = self.get(APPOINTMENT_TYPES).query(query);
        self.send_json(APPOINTMENT_TYPES, request).await
    }
}

#[async_trait]
impl ProviderDirectory for HttpIntakeClient {
    async fn fetch_employees(&self, practice_id: &str) -> ServiceResult<Vec<RawProvider>> {
        let request = self.get(EMPLOYEES).query(&[("practiceId", practice_id)]);
        self.send_json(EMPLOYEES, request).await
    }

    async fn fetch_public_providers(&self, practice_id: &str) -> ServiceResult<Vec<RawProvider>> {
        let request = self.get(PUBLIC_PROVIDERS).query(&[("practiceId", practice_id)]);
        self.send_json(PUBLIC_PROVIDERS, request).await
    }
}

#[async_trait]
impl ZoneLookup for HttpIntakeClient {
    async fn find_zone_by_address(&self, address: &str) -> ServiceResult<ZoneMatch> {
        let request = self.get(FIND_ZONE).query(&[("address", address)]);
        self.send_json(FIND_ZONE, request).await
    }
}

#[async_trait]
impl AvailabilityService for HttpIntakeClient {
    async fn route(&self, request: &RoutingRequest) -> ServiceResult<AvailabilityResponse> {
        self.send_json(ROUTING, self.post(ROUTING).json(request)).await
    }

    async fn public_availability(
        &self,
        request: &PublicAvailabilityRequest,
    ) -> ServiceResult<AvailabilityResponse> {
        self.send_json(PUBLIC_AVAILABILITY, self.post(PUBLIC_AVAILABILITY).json(request))
            .await
    }
}

#[async_trait]
impl SpeciesCatalog for HttpIntakeClient {
    async fn species_breeds(
        &self,
        practice_id: &str,
        species_id: Option<&str>,
    ) -> ServiceResult<Vec<SpeciesBreeds>> {
        let mut params = vec![("practiceId", practice_id)];
        if let Some(species_id) = species_id {
            params.push(("speciesId", species_id));
        }
        let request = self.get(SPECIES_BREEDS).query(&params);
        self.send_json(SPECIES_BREEDS, request).await
    }
}

#[async_trait]
impl PatientAlerts for HttpIntakeClient {
    async fn alerts_for(&self, pet_id: &str) -> ServiceResult<Vec<String>> {
        let path = format!("/patients/{pet_id}/alerts");
        let alerts: Vec<RawAlert> = self.send_json(&path, self.get(&path)).await?;
        Ok(alerts.into_iter().map(RawAlert::into_text).collect())
    }
}

#[async_trait]
impl SubmissionSink for HttpIntakeClient {
    async fn submit(&self, payload: &Value) -> ServiceResult<()> {
        self.send(SUBMIT_FORM, self.post(SUBMIT_FORM).json(payload))
            .await
            .map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joins_without_double_slash() {
        let client = HttpIntakeClient::new("https://api.example.com/", Duration::from_secs(5)).unwrap();
        assert_eq!(client.url(ROUTING), "https://api.example.com/routing/v2");
    }

    #[test]
    fn test_from_config() {
        let client = HttpIntakeClient::from_config(&IntakeConfig::default()).unwrap();
        assert_eq!(client.url(FIND_ZONE), "http://localhost:3000/find-zone-by-address");
    }

    #[test]
    fn test_decode_failure_is_decode_error() {
        let result: ServiceResult<ZoneMatch> = decode("not json");
        assert!(matches!(result, Err(ServiceError::Decode(_))));
    }

    #[test]
    fn test_alert_shapes() {
        let alerts: Vec<RawAlert> =
            decode(r#"["Muzzle required", {"text": "Fear aggressive"}, {"description": "Diabetic"}]"#)
                .unwrap();
        let texts: Vec<String> = alerts.into_iter().map(RawAlert::into_text).collect();
        assert_eq!(texts, vec!["Muzzle required", "Fear aggressive", "Diabetic"]);
    }

    #[test]
    fn test_availability_shapes_decode() {
        let routed: AvailabilityResponse =
            decode(r#"{"winner": {"start": "2024-06-03T09:00:00Z", "score": 120}, "alternates": []}"#)
                .unwrap();
        assert!(routed.slots.is_none());
        assert!(routed.winner.is_some());
    }

    #[tokio::test]
    async fn test_unreachable_api_is_transport_failure() {
        // Port 1 is reserved and never listening locally
        let client = HttpIntakeClient::new("http://127.0.0.1:1", Duration::from_secs(2)).unwrap();
        let result = client.find_zone_by_address("12 Harbor Rd, Portland, ME 04101").await;
        assert!(matches!(
            result,
            Err(ServiceError::Transport(_)) | Err(ServiceError::Timeout(_))
        ));
    }
}
