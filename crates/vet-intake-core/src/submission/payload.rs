//! Canonical request body for `POST /public/appointments/form`.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::{
    Address, Aftercare, AlternativesInterest, EuthanasiaDetails, EuthanasiaLocation,
    IntakeSession, Page, PetRecord, Sex, YesNo,
};
use crate::resolver;

/// Which path through the wizard produced the request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum FormFlow {
    NewClient,
    ExistingClient,
    /// Legacy euthanasia pages
    Euthanasia,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClientPayload {
    pub client_id: Option<String>,
    pub is_existing_client: bool,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub phone: String,
    pub can_text: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EuthanasiaPayload {
    pub reason: Option<String>,
    pub recent_vet_visit: Option<String>,
    pub interested_in_alternatives: Option<AlternativesInterest>,
    pub aftercare: Option<Aftercare>,
}

impl From<&EuthanasiaDetails> for EuthanasiaPayload {
    fn from(details: &EuthanasiaDetails) -> Self {
        Self {
            reason: details.reason.clone(),
            recent_vet_visit: details.recent_vet_visit.clone(),
            interested_in_alternatives: details.interested_in_alternatives,
            aftercare: details.aftercare,
        }
    }
}

/// One selected pet with its intake.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PetPayload {
    pub id: String,
    pub is_new: bool,
    pub name: String,
    pub pims_id: Option<String>,
    pub species: Option<String>,
    pub species_id: Option<String>,
    pub breed: Option<String>,
    pub breed_id: Option<String>,
    pub age: Option<String>,
    pub sex: Option<Sex>,
    pub spayed_neutered: Option<bool>,
    pub weight: Option<String>,
    pub color: Option<String>,
    pub behavior_notes: Option<String>,
    pub needs_calming_medications: Option<bool>,
    pub has_calming_medications: Option<bool>,
    pub needs_special_handling: Option<bool>,
    pub handling_notes: Option<String>,
    pub alerts: Option<Vec<String>>,
    pub appointment_type: Option<String>,
    pub appointment_type_name: Option<String>,
    pub details: Option<String>,
    pub euthanasia: Option<EuthanasiaPayload>,
}

/// Legacy euthanasia pages' answers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LegacyEuthanasiaPayload {
    pub pet_names: Option<String>,
    pub service_area: Option<String>,
    pub location: Option<EuthanasiaLocation>,
    pub location_notes: Option<String>,
    #[serde(flatten)]
    pub details: EuthanasiaPayload,
}

/// A ranked visit time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DateTimePreference {
    pub preference: u32,
    pub date_time: String,
    pub display: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionMetadata {
    pub submitted_at: String,
    pub form_flow: FormFlow,
}

/// Everything the practice receives for one request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionPayload {
    pub practice_id: String,
    pub client: ClientPayload,
    /// Where the visit happens
    pub address: Option<Address>,
    pub mailing_address: Option<Address>,
    pub zone_id: Option<String>,
    pub pets: Vec<PetPayload>,
    /// Typed pet list from a self-declared existing client
    pub pet_list: Option<String>,
    pub how_soon: Option<String>,
    pub is_euthanasia: bool,
    pub euthanasia: Option<LegacyEuthanasiaPayload>,
    pub doctor_id: Option<String>,
    pub doctor_name: Option<String>,
    pub preferred_doctor: Option<String>,
    pub date_time_preferences: Vec<DateTimePreference>,
    pub none_of_these_work: bool,
    pub time_preference: Option<String>,
    pub additional_notes: Option<String>,
    pub metadata: SubmissionMetadata,
}

impl SubmissionPayload {
    /// JSON body with every null field removed.
    pub fn to_json(&self) -> serde_json::Result<Value> {
        Ok(strip_nulls(serde_json::to_value(self)?))
    }
}

/// Render the session into the canonical payload.
pub fn build(session: &IntakeSession, practice_id: &str, submitted_at: DateTime<Utc>) -> SubmissionPayload {
    let contact = &session.contact;
    let doctor = session
        .preferred_doctor_text
        .as_deref()
        .and_then(|text| resolver::resolve(text, &session.providers));
    let mailing_address = match session.mailing_same_as_physical {
        Some(YesNo::No) if !session.is_existing_client() => session.mailing_address.clone(),
        _ => None,
    };
    let zone_id = match &session.zone {
        crate::models::ZoneStatus::Serviced { zone_id, .. } => zone_id.clone(),
        _ => None,
    };

    SubmissionPayload {
        practice_id: practice_id.to_string(),
        client: ClientPayload {
            client_id: session.client_id.clone(),
            is_existing_client: session.is_existing_client(),
            email: contact.email.trim().to_string(),
            first_name: contact.first_name.trim().to_string(),
            last_name: contact.last_name.trim().to_string(),
            full_name: contact.full_name(),
            phone: contact.phone.trim().to_string(),
            can_text: contact.can_text.map(YesNo::is_yes),
        },
        address: session.meeting_address().cloned(),
        mailing_address,
        zone_id,
        pets: pets(session),
        pet_list: non_blank(&session.pet_list_text),
        how_soon: session.urgency.map(|u| u.label().to_string()),
        is_euthanasia: session.has_euthanasia_pet() || session.legacy_euthanasia_requested(),
        euthanasia: legacy_euthanasia(session),
        doctor_id: doctor.map(|p| p.id.clone()),
        doctor_name: doctor.map(|p| p.display_name()),
        preferred_doctor: non_blank(&session.preferred_doctor_text),
        date_time_preferences: date_time_preferences(session),
        none_of_these_work: session.none_of_these_work,
        time_preference: non_blank(&session.time_preference_text),
        additional_notes: non_blank(&session.additional_notes),
        metadata: SubmissionMetadata {
            submitted_at: submitted_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            form_flow: form_flow(session),
        },
    }
}

fn form_flow(session: &IntakeSession) -> FormFlow {
    if session.current_page == Page::EuthanasiaContinued {
        FormFlow::Euthanasia
    } else if session.is_existing_client() {
        FormFlow::ExistingClient
    } else {
        FormFlow::NewClient
    }
}

fn pets(session: &IntakeSession) -> Vec<PetPayload> {
    session
        .selected_pets()
        .map(|(id, record)| {
            let mut pet = match record {
                PetRecord::Existing(patient) => PetPayload {
                    id: id.clone(),
                    is_new: false,
                    name: patient.name.clone(),
                    pims_id: patient.pims_id.clone(),
                    species: patient.species.clone(),
                    breed: patient.breed.clone(),
                    alerts: session.pet_alerts.get(id).filter(|a| !a.is_empty()).cloned(),
                    ..Default::default()
                },
                PetRecord::New(new) => PetPayload {
                    id: id.clone(),
                    is_new: true,
                    name: new.name.trim().to_string(),
                    species: match &new.species {
                        Some(species) if species.is_other() => non_blank(&new.species_other),
                        Some(species) => Some(species.name.clone()),
                        None => None,
                    },
                    species_id: new.species.as_ref().map(|s| s.id.clone()),
                    breed_id: new.breed_id.clone(),
                    age: new.age.clone(),
                    sex: new.sex,
                    spayed_neutered: new.spayed_neutered.map(YesNo::is_yes),
                    weight: new.weight.clone(),
                    color: new.color.clone(),
                    behavior_notes: non_blank(&new.behavior_notes),
                    needs_calming_medications: new.needs_calming_medications.map(YesNo::is_yes),
                    has_calming_medications: new.has_calming_medications.map(YesNo::is_yes),
                    needs_special_handling: new.needs_special_handling.map(YesNo::is_yes),
                    handling_notes: non_blank(&new.handling_notes),
                    ..Default::default()
                },
            };
            if let Some(intake) = session.intake(id) {
                pet.appointment_type = intake.appointment_type.clone();
                pet.appointment_type_name = intake
                    .appointment_type
                    .as_deref()
                    .and_then(|name| session.appointment_type(name))
                    .map(|def| def.pretty_name.clone());
                pet.details = non_blank(&intake.details);
                pet.euthanasia = intake
                    .euthanasia
                    .as_ref()
                    .filter(|_| intake.is_euthanasia())
                    .map(EuthanasiaPayload::from);
            }
            pet
        })
        .collect()
}

fn legacy_euthanasia(session: &IntakeSession) -> Option<LegacyEuthanasiaPayload> {
    if !session.legacy_euthanasia_requested() {
        return None;
    }
    let legacy = &session.euthanasia;
    Some(LegacyEuthanasiaPayload {
        pet_names: non_blank(&legacy.pet_names),
        service_area: session.service_area.map(|a| a.label().to_string()),
        location: legacy.location,
        location_notes: non_blank(&legacy.location_notes),
        details: EuthanasiaPayload::from(&legacy.details),
    })
}

/// Ranked preferences, falling back to the ISO string when a slot is no
/// longer among the recommendations.
fn date_time_preferences(session: &IntakeSession) -> Vec<DateTimePreference> {
    session
        .slot_preferences
        .ordered()
        .into_iter()
        .map(|(preference, iso)| {
            let display = session
                .recommended_slots
                .iter()
                .find(|slot| slot.iso == iso)
                .map(|slot| slot.display.clone())
                .unwrap_or_else(|| iso.clone());
            DateTimePreference {
                preference,
                date_time: iso,
                display,
            }
        })
        .collect()
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Remove null-valued object members at every depth.
pub fn strip_nulls(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k, strip_nulls(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(strip_nulls).collect()),
        other => other,
    }
}
