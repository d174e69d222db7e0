//! Records exchanged with the practice API.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{AppointmentTypeDef, Provider};

/// Query for the appointment-type catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentTypeQuery {
    pub practice_id: String,
    pub show_in_intake_form: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_patient_allowed: Option<bool>,
    pub is_authenticated: bool,
}

/// Catalog entry as returned by the directory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RawAppointmentType {
    pub name: String,
    #[serde(default)]
    pub pretty_name: Option<String>,
    #[serde(default = "default_true")]
    pub new_patient_allowed: bool,
    #[serde(default = "default_true")]
    pub show_in_intake_form: bool,
}

fn default_true() -> bool {
    true
}

impl From<RawAppointmentType> for AppointmentTypeDef {
    fn from(raw: RawAppointmentType) -> Self {
        let pretty_name = raw
            .pretty_name
            .filter(|p| !p.trim().is_empty())
            .unwrap_or_else(|| raw.name.clone());
        AppointmentTypeDef {
            name: raw.name,
            pretty_name,
            new_patient_allowed: raw.new_patient_allowed,
            show_in_intake_form: raw.show_in_intake_form,
        }
    }
}

/// Appointment-type reference inside a provider record: either a bare name
/// or an object carrying one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum RawAppointmentTypeRef {
    Name(String),
    Object { name: String },
}

impl RawAppointmentTypeRef {
    pub fn name(&self) -> &str {
        match self {
            RawAppointmentTypeRef::Name(name) => name,
            RawAppointmentTypeRef::Object { name } => name,
        }
    }
}

/// Provider record from either directory variant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RawProvider {
    #[serde(deserialize_with = "id_as_string")]
    pub id: String,
    #[serde(default)]
    pub pims_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub appointment_types: Vec<RawAppointmentTypeRef>,
}

impl From<RawProvider> for Provider {
    fn from(raw: RawProvider) -> Self {
        let name = raw
            .name
            .map(|n| n.trim().trim_start_matches("Dr. ").trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| {
                format!(
                    "{} {}",
                    raw.first_name.as_deref().unwrap_or("").trim(),
                    raw.last_name.as_deref().unwrap_or("").trim()
                )
                .trim()
                .to_string()
            });
        Provider {
            id: raw.id,
            pims_id: raw.pims_id,
            name,
            accepted_appointment_types: raw
                .appointment_types
                .iter()
                .map(|t| t.name().to_string())
                .collect(),
        }
    }
}

/// Accept numeric or string IDs.
fn id_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(i64),
    }
    Ok(match Id::deserialize(deserializer)? {
        Id::Text(text) => text,
        Id::Number(number) => number.to_string(),
    })
}

/// Answer of the email pre-lookup.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EmailCheck {
    pub exists: bool,
    pub has_account: bool,
}

/// Zone serving an address.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ZoneMatch {
    #[serde(default)]
    pub zone_id: Option<String>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
}

/// Species with its breeds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SpeciesBreeds {
    #[serde(deserialize_with = "id_as_string")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub breeds: Vec<Breed>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Breed {
    #[serde(deserialize_with = "id_as_string")]
    pub id: String,
    pub name: String,
}

/// Visit being routed for an authenticated client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewAppointment {
    pub service_minutes: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lon: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// `POST /routing/v2` body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RoutingRequest {
    pub doctor_id: String,
    pub start_date: NaiveDate,
    pub num_days: u32,
    pub new_appt: NewAppointment,
}

/// Public availability body for anonymous clients.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PublicAvailabilityRequest {
    pub practice_id: String,
    pub start_date: NaiveDate,
    pub num_days: u32,
    pub service_minutes: u32,
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doctor_id: Option<String>,
    pub allow_other_doctors: bool,
}

/// One proposed time from the availability collaborator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RawCandidate {
    #[serde(alias = "iso", alias = "date", alias = "dateTime", alias = "time")]
    pub start: String,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub doctor_id: Option<String>,
}

/// Availability answer in whichever shape the collaborator used.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AvailabilityResponse {
    #[serde(default)]
    pub slots: Option<Vec<RawCandidate>>,
    #[serde(default)]
    pub winner: Option<RawCandidate>,
    #[serde(default)]
    pub alternates: Option<Vec<RawCandidate>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_provider_name_and_types() {
        let raw: RawProvider = serde_json::from_str(
            r#"{"id": 12, "firstName": "Jane", "lastName": "Smith",
                "appointmentTypes": ["Wellness", {"name": "Euthanasia"}]}"#,
        )
        .unwrap();
        let provider = Provider::from(raw);
        assert_eq!(provider.id, "12");
        assert_eq!(provider.name, "Jane Smith");
        assert!(provider.accepted_appointment_types.contains("Euthanasia"));
        assert!(provider.accepted_appointment_types.contains("Wellness"));
    }

    #[test]
    fn test_raw_provider_titled_name() {
        let raw: RawProvider =
            serde_json::from_str(r#"{"id": "p1", "name": "Dr. Ann Lee", "pimsId": "77"}"#).unwrap();
        let provider = Provider::from(raw);
        assert_eq!(provider.name, "Ann Lee");
        assert_eq!(provider.pims_id.as_deref(), Some("77"));
        assert!(provider.accepted_appointment_types.is_empty());
    }

    #[test]
    fn test_raw_appointment_type_defaults() {
        let raw: RawAppointmentType = serde_json::from_str(r#"{"name": "Wellness"}"#).unwrap();
        let def = AppointmentTypeDef::from(raw);
        assert_eq!(def.pretty_name, "Wellness");
        assert!(def.new_patient_allowed);
        assert!(def.show_in_intake_form);
    }

    #[test]
    fn test_routing_request_shape() {
        let request = RoutingRequest {
            doctor_id: "7".into(),
            start_date: NaiveDate::from_ymd_opt(2024, 6, 2).unwrap(),
            num_days: 7,
            new_appt: NewAppointment {
                service_minutes: 60,
                lat: None,
                lon: None,
                address: Some("1 Main St".into()),
            },
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["startDate"], "2024-06-02");
        assert_eq!(json["newAppt"]["serviceMinutes"], 60);
        assert!(json["newAppt"].get("lat").is_none());
    }

    #[test]
    fn test_candidate_aliases() {
        let raw: RawCandidate =
            serde_json::from_str(r#"{"date": "2024-06-03T09:00:00Z", "score": 12.5}"#).unwrap();
        assert_eq!(raw.start, "2024-06-03T09:00:00Z");
        assert_eq!(raw.score, Some(12.5));
    }
}
