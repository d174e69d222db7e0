//! Session reducer: `(IntakeSession, IntakeEvent) -> IntakeSession`.
//!
//! Every user answer and every enrichment result arrives as an event. The
//! reducer is pure; async work that produced an event is responsible for
//! checking it is still current before the event is dispatched.

use serde::{Deserialize, Serialize};

use crate::models::{
    Address, AppointmentTypeDef, CandidateSlot, ClientMode, ContactInfo, EuthanasiaDetails,
    ExistingPatient, IntakeSession, LegacyEuthanasia, NewPet, Page, PetId, PetIntake, PetRecord,
    Provider, ServiceArea, Urgency, YesNo, ZoneStatus,
};

/// Something that happened to the form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IntakeEvent {
    ContactChanged {
        contact: ContactInfo,
    },
    EmailChecked {
        exists: bool,
        has_account: bool,
    },
    HasUsedServicesAnswered {
        answer: YesNo,
    },
    /// Signed-in client's profile and pets arrived
    ProfileLoaded {
        client_id: String,
        contact: ContactInfo,
        address: Option<Address>,
        pets: Vec<ExistingPatient>,
    },
    AppointmentTypesLoaded {
        appointment_types: Vec<AppointmentTypeDef>,
    },
    ProvidersLoaded {
        providers: Vec<Provider>,
    },
    PetAlertsLoaded {
        pet_id: PetId,
        alerts: Vec<String>,
    },
    PetSelected {
        pet_id: PetId,
    },
    PetDeselected {
        pet_id: PetId,
    },
    NewPetAdded {
        pet_id: PetId,
        pet: NewPet,
    },
    NewPetUpdated {
        pet_id: PetId,
        pet: NewPet,
    },
    NewPetRemoved {
        pet_id: PetId,
    },
    PetListTextChanged {
        text: Option<String>,
    },
    AppointmentTypeChosen {
        pet_id: PetId,
        appointment_type: Option<String>,
    },
    IntakeDetailsChanged {
        pet_id: PetId,
        details: Option<String>,
    },
    EuthanasiaDetailsChanged {
        pet_id: PetId,
        details: EuthanasiaDetails,
    },
    UrgencyChosen {
        urgency: Option<Urgency>,
    },
    AddressChanged {
        address: Option<Address>,
    },
    NewAddressChanged {
        address: Option<Address>,
    },
    MailingAddressChanged {
        address: Option<Address>,
    },
    MailingSameAsPhysicalAnswered {
        answer: YesNo,
    },
    MeetingAtDifferentAddressAnswered {
        answer: YesNo,
    },
    ZoneResolved {
        status: ZoneStatus,
    },
    PreferredDoctorChanged {
        text: Option<String>,
    },
    SlotsRecommended {
        slots: Vec<CandidateSlot>,
    },
    SlotToggled {
        iso: String,
    },
    NoneOfTheseWorkChanged {
        value: bool,
    },
    TimePreferenceChanged {
        text: Option<String>,
    },
    NotesChanged {
        text: Option<String>,
    },
    LookingForEuthanasiaAnswered {
        answer: YesNo,
    },
    NewClientEuthanasiaAnswered {
        answer: YesNo,
    },
    ServiceAreaChosen {
        area: ServiceArea,
    },
    LegacyEuthanasiaChanged {
        euthanasia: LegacyEuthanasia,
    },
}

impl IntakeEvent {
    /// Whether the event may change the meeting address.
    pub fn touches_address(&self) -> bool {
        matches!(
            self,
            IntakeEvent::AddressChanged { .. }
                | IntakeEvent::NewAddressChanged { .. }
                | IntakeEvent::MeetingAtDifferentAddressAnswered { .. }
                | IntakeEvent::ProfileLoaded { .. }
        )
    }
}

/// Apply one event.
///
/// The zone status is reset only when an event changes the meeting address.
pub fn reduce(mut session: IntakeSession, event: IntakeEvent) -> IntakeSession {
    let meeting_before = event
        .touches_address()
        .then(|| session.meeting_address_line());
    match event {
        IntakeEvent::ContactChanged { contact } => session.contact = contact,
        IntakeEvent::EmailChecked {
            exists,
            has_account,
        } => {
            session.email_lookup = Some(crate::models::EmailLookup {
                exists,
                has_account,
            });
        }
        IntakeEvent::HasUsedServicesAnswered { answer } => {
            session.has_used_services = Some(answer);
            if !session.authenticated {
                session.client_mode = if answer.is_yes() {
                    ClientMode::ExistingClient
                } else {
                    ClientMode::NewClient
                };
            }
        }
        IntakeEvent::ProfileLoaded {
            client_id,
            contact,
            address,
            pets,
        } => {
            session.client_id = Some(client_id);
            session.contact = contact;
            session.address = address;
            for pet in pets {
                session
                    .pet_records
                    .insert(pet.id.clone(), PetRecord::Existing(pet));
            }
            session.profile_loaded = true;
            if session.authenticated && session.current_page == Page::Intro {
                session.client_mode = ClientMode::ExistingClient;
                session.current_page = Page::ExistingClient;
            }
        }
        IntakeEvent::AppointmentTypesLoaded { appointment_types } => {
            session.appointment_types = appointment_types;
        }
        IntakeEvent::ProvidersLoaded { providers } => session.providers = providers,
        IntakeEvent::PetAlertsLoaded { pet_id, alerts } => {
            session.pet_alerts.insert(pet_id, alerts);
        }
        IntakeEvent::PetSelected { pet_id } => select_pet(&mut session, pet_id),
        IntakeEvent::PetDeselected { pet_id } => {
            session.selected_pet_ids.retain(|id| *id != pet_id);
        }
        IntakeEvent::NewPetAdded { pet_id, pet } | IntakeEvent::NewPetUpdated { pet_id, pet } => {
            if !matches!(session.pet_records.get(&pet_id), Some(PetRecord::Existing(_))) {
                session.pet_records.insert(pet_id.clone(), PetRecord::New(pet));
                select_pet(&mut session, pet_id);
            }
        }
        IntakeEvent::NewPetRemoved { pet_id } => {
            if matches!(session.pet_records.get(&pet_id), Some(PetRecord::New(_))) {
                session.selected_pet_ids.retain(|id| *id != pet_id);
                session.pet_records.remove(&pet_id);
                session.pet_intake.remove(&pet_id);
            }
        }
        IntakeEvent::PetListTextChanged { text } => session.pet_list_text = text,
        IntakeEvent::AppointmentTypeChosen {
            pet_id,
            appointment_type,
        } => {
            if let Some(intake) = session.pet_intake.get_mut(&pet_id) {
                intake.appointment_type = appointment_type;
                if intake.is_euthanasia() {
                    intake.euthanasia.get_or_insert_with(EuthanasiaDetails::default);
                } else {
                    intake.euthanasia = None;
                }
            }
        }
        IntakeEvent::IntakeDetailsChanged { pet_id, details } => {
            if let Some(intake) = session.pet_intake.get_mut(&pet_id) {
                intake.details = details;
            }
        }
        IntakeEvent::EuthanasiaDetailsChanged { pet_id, details } => {
            if let Some(intake) = session.pet_intake.get_mut(&pet_id) {
                if intake.is_euthanasia() {
                    intake.euthanasia = Some(details);
                }
            }
        }
        IntakeEvent::UrgencyChosen { urgency } => session.urgency = urgency,
        IntakeEvent::AddressChanged { address } => session.address = address,
        IntakeEvent::NewAddressChanged { address } => session.new_address = address,
        IntakeEvent::MailingAddressChanged { address } => session.mailing_address = address,
        IntakeEvent::MailingSameAsPhysicalAnswered { answer } => {
            session.mailing_same_as_physical = Some(answer);
            if answer.is_yes() {
                session.mailing_address = None;
            }
        }
        IntakeEvent::MeetingAtDifferentAddressAnswered { answer } => {
            session.meeting_at_different_address = Some(answer);
        }
        IntakeEvent::ZoneResolved { status } => session.zone = status,
        IntakeEvent::PreferredDoctorChanged { text } => session.preferred_doctor_text = text,
        IntakeEvent::SlotsRecommended { slots } => session.replace_recommended_slots(slots),
        IntakeEvent::SlotToggled { iso } => {
            session.toggle_slot(&iso);
        }
        IntakeEvent::NoneOfTheseWorkChanged { value } => session.set_none_of_these_work(value),
        IntakeEvent::TimePreferenceChanged { text } => session.time_preference_text = text,
        IntakeEvent::NotesChanged { text } => session.additional_notes = text,
        IntakeEvent::LookingForEuthanasiaAnswered { answer } => {
            session.looking_for_euthanasia = Some(answer);
        }
        IntakeEvent::NewClientEuthanasiaAnswered { answer } => {
            session.new_client_euthanasia = Some(answer);
        }
        IntakeEvent::ServiceAreaChosen { area } => session.service_area = Some(area),
        IntakeEvent::LegacyEuthanasiaChanged { euthanasia } => session.euthanasia = euthanasia,
    }
    if let Some(before) = meeting_before {
        if session.meeting_address_line() != before {
            session.zone = ZoneStatus::Unchecked;
        }
    }
    session
}

/// Select a known pet, creating its intake entry.
fn select_pet(session: &mut IntakeSession, pet_id: PetId) {
    if !session.pet_records.contains_key(&pet_id) {
        return;
    }
    session
        .pet_intake
        .entry(pet_id.clone())
        .or_insert_with(PetIntake::default);
    if !session.selected_pet_ids.contains(&pet_id) {
        session.selected_pet_ids.push(pet_id);
    }
}

/// Fresh ID for a pet added on the form.
pub fn new_pet_id() -> PetId {
    format!("new-{}", uuid::Uuid::new_v4())
}
