//! Per-page validation. Never mutates the session; errors are data.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::{
    is_blank, Address, AppointmentTypeDef, IntakeSession, NewPet, Page, PetRecord, YesNo,
    ZoneStatus,
};
use crate::resolver;

const REQUIRED: &str = "This field is required.";
const NOT_SERVICED: &str = "We're sorry, this address is outside our service area.";

/// Field path → message, sorted by path.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, String>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_insert_with(|| message.into());
    }

    pub fn require(&mut self, field: impl Into<String>) {
        self.insert(field, REQUIRED);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn fields(&self) -> Vec<&str> {
        self.0.keys().map(String::as_str).collect()
    }
}

/// Validate the answers a page collects.
pub fn validate(page: Page, session: &IntakeSession) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    match page {
        Page::Intro => validate_intro(session, &mut errors),
        Page::NewClient => validate_new_client(session, &mut errors),
        Page::NewClientPetInfo => {
            if session.selected_pet_ids.is_empty() {
                errors.insert("pets", "Please add at least one pet.");
            }
            validate_pets(session, &mut errors);
            require_urgency(session, &mut errors);
        }
        Page::ExistingClient => validate_existing_client(session, &mut errors),
        Page::ExistingClientPets => {
            let typed_list = !session.authenticated && !is_blank(&session.pet_list_text);
            if session.selected_pet_ids.is_empty() && !typed_list {
                errors.insert("pets", "Please select at least one pet.");
            }
            validate_pets(session, &mut errors);
            require_urgency(session, &mut errors);
        }
        Page::EuthanasiaIntro => {
            let details = &session.euthanasia.details;
            if session.selected_pet_ids.is_empty() && is_blank(&session.euthanasia.pet_names) {
                errors.require("euthanasia.pet_names");
            }
            if is_blank(&details.reason) {
                errors.require("euthanasia.details.reason");
            }
            if is_blank(&details.recent_vet_visit) {
                errors.require("euthanasia.details.recent_vet_visit");
            }
            if details.interested_in_alternatives.is_none() {
                errors.require("euthanasia.details.interested_in_alternatives");
            }
        }
        Page::EuthanasiaServiceArea => {
            if session.service_area.is_none() {
                errors.insert("service_area", "Please choose where you are located.");
            }
        }
        Page::EuthanasiaPortland | Page::EuthanasiaHighPeaks => {
            if session.euthanasia.location.is_none() {
                errors.require("euthanasia.location");
            }
            if session.euthanasia.details.aftercare.is_none() {
                errors.require("euthanasia.details.aftercare");
            }
        }
        Page::EuthanasiaContinued => {
            require_urgency(session, &mut errors);
            require_doctor_choice(session, &mut errors);
            if is_blank(&session.time_preference_text) {
                errors.insert(
                    "time_preference_text",
                    "Please tell us which days and times work for you.",
                );
            }
        }
        Page::RequestVisitContinued => validate_request_visit(session, &mut errors),
        Page::Success => {}
    }
    errors
}

fn validate_intro(session: &IntakeSession, errors: &mut ValidationErrors) {
    if session.authenticated {
        return;
    }
    let contact = &session.contact;
    let email = contact.email.trim();
    if email.is_empty() {
        errors.require("contact.email");
    } else if !looks_like_email(email) {
        errors.insert("contact.email", "Please enter a valid email address.");
    }
    if contact.first_name.trim().is_empty() {
        errors.require("contact.first_name");
    }
    if contact.last_name.trim().is_empty() {
        errors.require("contact.last_name");
    }
    let digits = contact.phone.chars().filter(char::is_ascii_digit).count();
    if contact.phone.trim().is_empty() {
        errors.require("contact.phone");
    } else if digits < 10 {
        errors.insert("contact.phone", "Please enter a valid phone number.");
    }
    if contact.can_text.is_none() {
        errors.require("contact.can_text");
    }
    if session.has_used_services.is_none() {
        errors.require("has_used_services");
    }
}

fn looks_like_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.ends_with('.'),
        None => false,
    }
}

fn validate_new_client(session: &IntakeSession, errors: &mut ValidationErrors) {
    require_address("address", session.address.as_ref(), errors);
    if session.zone == ZoneStatus::NotServiced {
        errors.insert("address", NOT_SERVICED);
    }
    match session.mailing_same_as_physical {
        None => errors.require("mailing_same_as_physical"),
        Some(YesNo::No) => require_address("mailing_address", session.mailing_address.as_ref(), errors),
        Some(YesNo::Yes) => {}
    }
}

fn validate_existing_client(session: &IntakeSession, errors: &mut ValidationErrors) {
    if !session.authenticated {
        // Self-declared existing clients type their address like new clients
        require_address("address", session.address.as_ref(), errors);
        if session.zone == ZoneStatus::NotServiced {
            errors.insert("address", NOT_SERVICED);
        }
        return;
    }
    match session.meeting_at_different_address {
        None => errors.require("meeting_at_different_address"),
        Some(YesNo::Yes) => {
            require_address("new_address", session.new_address.as_ref(), errors);
            if session.zone == ZoneStatus::NotServiced {
                errors.insert("new_address", NOT_SERVICED);
            }
        }
        Some(YesNo::No) => {}
    }
}

fn validate_request_visit(session: &IntakeSession, errors: &mut ValidationErrors) {
    require_doctor_choice(session, errors);
    // The euthanasia sub-forms must be complete before anything is submitted
    validate_pets(session, errors);

    if time_preference_required(session) {
        if is_blank(&session.time_preference_text) {
            errors.insert(
                "time_preference_text",
                "Please tell us which days and times work for you.",
            );
        }
    } else if !session.recommended_slots.is_empty()
        && session.slot_preferences.is_empty()
        && !session.none_of_these_work
    {
        errors.insert(
            "slot_preferences",
            "Please choose at least one time, or let us know none of these work.",
        );
    }
}

/// Free-text time preferences are needed whenever automatic slots cannot be
/// offered or were declined.
pub fn time_preference_required(session: &IntakeSession) -> bool {
    session.recommended_slots.is_empty()
        || session.urgency.is_some_and(|u| u.is_manual())
        || session.has_euthanasia_pet()
        || session.none_of_these_work
}

fn require_urgency(session: &IntakeSession, errors: &mut ValidationErrors) {
    if session.urgency.is_none() {
        errors.insert("how_soon", "Please tell us how soon your pet needs to be seen.");
    }
}

fn require_doctor_choice(session: &IntakeSession, errors: &mut ValidationErrors) {
    let Some(text) = session.preferred_doctor_text.as_deref().filter(|t| !t.trim().is_empty()) else {
        errors.insert("preferred_doctor", "Please choose a doctor or select no preference.");
        return;
    };
    if resolver::is_no_preference(text) {
        return;
    }
    if resolver::resolve(text, &session.providers).is_none() {
        errors.insert(
            "preferred_doctor",
            "We couldn't find that doctor. Please choose from the list.",
        );
    }
}

fn require_address(prefix: &str, address: Option<&Address>, errors: &mut ValidationErrors) {
    let missing = match address {
        Some(address) => address.missing_parts(),
        None => vec!["line1", "city", "state", "zip"],
    };
    for part in missing {
        errors.require(format!("{prefix}.{part}"));
    }
}

/// Intake rules for every selected pet, plus the full profile of new pets.
fn validate_pets(session: &IntakeSession, errors: &mut ValidationErrors) {
    for (pet_id, record) in session.selected_pets() {
        if let PetRecord::New(pet) = record {
            validate_new_pet(pet_id, pet, errors);
        }
        validate_intake(session, pet_id, errors);
    }
}

fn validate_new_pet(pet_id: &str, pet: &NewPet, errors: &mut ValidationErrors) {
    let field = |name: &str| format!("pets.{pet_id}.{name}");

    if pet.name.trim().is_empty() {
        errors.require(field("name"));
    }
    match &pet.species {
        None => errors.require(field("species")),
        Some(species) if species.is_other() && is_blank(&pet.species_other) => {
            errors.insert(field("species_other"), "Please tell us what kind of animal this is.");
        }
        Some(_) => {}
    }
    if is_blank(&pet.breed_id) {
        errors.require(field("breed"));
    }
    if is_blank(&pet.age) {
        errors.require(field("age"));
    }
    if pet.sex.is_none() {
        errors.require(field("sex"));
    }
    if pet.spayed_neutered.is_none() {
        errors.require(field("spayed_neutered"));
    }
    if is_blank(&pet.color) {
        errors.require(field("color"));
    }
    if is_blank(&pet.weight) {
        errors.require(field("weight"));
    }
    match pet.needs_calming_medications {
        None => errors.require(field("needs_calming_medications")),
        Some(YesNo::Yes) if pet.has_calming_medications.is_none() => {
            errors.require(field("has_calming_medications"));
        }
        Some(_) => {}
    }
    if pet.needs_special_handling.is_none() {
        errors.require(field("needs_special_handling"));
    }
}

fn validate_intake(session: &IntakeSession, pet_id: &str, errors: &mut ValidationErrors) {
    let field = |name: &str| format!("intake.{pet_id}.{name}");
    let intake = session.intake(pet_id);

    let Some(type_name) = intake
        .and_then(|i| i.appointment_type.as_deref())
        .filter(|t| !t.trim().is_empty())
    else {
        errors.insert(field("appointment_type"), "Please choose a reason for the visit.");
        return;
    };

    if crate::models::is_euthanasia_type(type_name) {
        let details = intake.and_then(|i| i.euthanasia.clone()).unwrap_or_default();
        for missing in details.missing_fields() {
            errors.require(field(&format!("euthanasia.{missing}")));
        }
        return;
    }

    let requires_detail = session
        .appointment_type(type_name)
        .cloned()
        .unwrap_or_else(|| AppointmentTypeDef::new(type_name, type_name))
        .requires_detail();
    if requires_detail && intake.map_or(true, |i| is_blank(&i.details)) {
        errors.insert(field("details"), "Please tell us a little about the reason for the visit.");
    }
}
