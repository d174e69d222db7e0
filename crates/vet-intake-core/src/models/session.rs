//! The session aggregate for one form-fill.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::{
    Address, AppointmentTypeDef, CandidateSlot, EuthanasiaDetails, Page, PetId, PetIntake,
    PetRecord, Provider, SlotPreferences, Urgency, YesNo,
};
use crate::wizard::ValidationErrors;

/// Preferred-doctor literal meaning "any doctor".
pub const NO_PREFERENCE: &str = "I have no preference";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ClientMode {
    NewClient,
    ExistingClient,
}

/// Contact details collected on the intro page.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ContactInfo {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub can_text: Option<YesNo>,
}

impl ContactInfo {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_string()
    }
}

/// Result of the pre-lookup on the entered email.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct EmailLookup {
    pub exists: bool,
    pub has_account: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// Service-area outcome of the zone lookup for the meeting address.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub enum ZoneStatus {
    #[default]
    Unchecked,
    Serviced {
        zone_id: Option<String>,
        coordinates: Option<Coordinates>,
    },
    NotServiced,
}

/// Euthanasia service areas offered by the legacy euthanasia branch.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ServiceArea {
    Portland,
    HighPeaks,
}

impl ServiceArea {
    pub fn label(&self) -> &'static str {
        match self {
            ServiceArea::Portland => "Portland",
            ServiceArea::HighPeaks => "High Peaks",
        }
    }
}

/// Where a euthanasia visit should take place.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum EuthanasiaLocation {
    Home,
    Clinic,
    Outdoors,
}

/// Answers collected by the legacy euthanasia pages.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LegacyEuthanasia {
    /// Which pets the request is for, as typed by the client
    pub pet_names: Option<String>,
    pub details: EuthanasiaDetails,
    pub location: Option<EuthanasiaLocation>,
    /// Area-specific notes (parking, access, family present)
    pub location_notes: Option<String>,
}

/// Single mutable aggregate owned by the wizard for one form-fill.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IntakeSession {
    pub authenticated: bool,
    pub client_mode: ClientMode,
    pub current_page: Page,
    /// Set once an authenticated client's profile and pets have loaded
    pub profile_loaded: bool,

    pub contact: ContactInfo,
    pub email_lookup: Option<EmailLookup>,
    /// "Have you used our services before?"
    pub has_used_services: Option<YesNo>,
    /// Client ID on file, for authenticated clients
    pub client_id: Option<String>,

    /// Selected pets in display order, unique
    pub selected_pet_ids: Vec<PetId>,
    pub pet_records: BTreeMap<PetId, PetRecord>,
    pub pet_intake: BTreeMap<PetId, PetIntake>,
    /// Typed pet list for self-declared existing clients who are not signed in
    pub pet_list_text: Option<String>,
    pub pet_alerts: BTreeMap<PetId, Vec<String>>,

    pub urgency: Option<Urgency>,

    /// Entered address (new clients) or address on file (existing clients)
    pub address: Option<Address>,
    /// Different meeting address declared by an existing client
    pub new_address: Option<Address>,
    pub mailing_address: Option<Address>,
    pub mailing_same_as_physical: Option<YesNo>,
    pub meeting_at_different_address: Option<YesNo>,
    pub zone: ZoneStatus,

    /// Catalog and directory loaded for this session
    pub appointment_types: Vec<AppointmentTypeDef>,
    pub providers: Vec<Provider>,

    pub preferred_doctor_text: Option<String>,
    pub recommended_slots: Vec<CandidateSlot>,
    pub slot_preferences: SlotPreferences,
    pub none_of_these_work: bool,
    pub time_preference_text: Option<String>,
    pub additional_notes: Option<String>,

    /// Legacy existing-client "are you looking for euthanasia" flag
    pub looking_for_euthanasia: Option<YesNo>,
    /// Legacy new-client euthanasia flag
    pub new_client_euthanasia: Option<YesNo>,
    pub service_area: Option<ServiceArea>,
    pub euthanasia: LegacyEuthanasia,

    pub validation_errors: ValidationErrors,
    pub submission_error: Option<String>,
}

impl IntakeSession {
    /// Start a form-fill. Authenticated clients wait on `Intro` until their
    /// profile loads, then the wizard jumps to `ExistingClient`.
    pub fn new(authenticated: bool) -> Self {
        Self {
            authenticated,
            client_mode: if authenticated {
                ClientMode::ExistingClient
            } else {
                ClientMode::NewClient
            },
            current_page: Page::Intro,
            profile_loaded: false,
            contact: ContactInfo::default(),
            email_lookup: None,
            has_used_services: None,
            client_id: None,
            selected_pet_ids: Vec::new(),
            pet_records: BTreeMap::new(),
            pet_intake: BTreeMap::new(),
            pet_list_text: None,
            pet_alerts: BTreeMap::new(),
            urgency: None,
            address: None,
            new_address: None,
            mailing_address: None,
            mailing_same_as_physical: None,
            meeting_at_different_address: None,
            zone: ZoneStatus::Unchecked,
            appointment_types: Vec::new(),
            providers: Vec::new(),
            preferred_doctor_text: None,
            recommended_slots: Vec::new(),
            slot_preferences: SlotPreferences::new(),
            none_of_these_work: false,
            time_preference_text: None,
            additional_notes: None,
            looking_for_euthanasia: None,
            new_client_euthanasia: None,
            service_area: None,
            euthanasia: LegacyEuthanasia::default(),
            validation_errors: ValidationErrors::new(),
            submission_error: None,
        }
    }

    pub fn is_existing_client(&self) -> bool {
        self.client_mode == ClientMode::ExistingClient
    }

    /// Selected pets with their records, in display order.
    pub fn selected_pets(&self) -> impl Iterator<Item = (&PetId, &PetRecord)> {
        self.selected_pet_ids
            .iter()
            .filter_map(|id| self.pet_records.get_key_value(id))
    }

    /// Pets counted for visit length; never below one.
    pub fn pet_count(&self) -> usize {
        self.selected_pet_ids.len().max(1)
    }

    /// Intake of a selected pet.
    pub fn intake(&self, pet_id: &str) -> Option<&PetIntake> {
        self.pet_intake.get(pet_id)
    }

    /// Any selected pet booked for euthanasia.
    pub fn has_euthanasia_pet(&self) -> bool {
        self.selected_pet_ids
            .iter()
            .filter_map(|id| self.pet_intake.get(id))
            .any(PetIntake::is_euthanasia)
    }

    /// Internal names of the types chosen across all selected pets.
    pub fn selected_type_names(&self) -> BTreeSet<String> {
        self.selected_pet_ids
            .iter()
            .filter_map(|id| self.pet_intake.get(id))
            .filter_map(|intake| intake.appointment_type.as_deref())
            .filter(|name| !name.trim().is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Look up a catalog entry by internal name.
    pub fn appointment_type(&self, name: &str) -> Option<&AppointmentTypeDef> {
        self.appointment_types.iter().find(|t| t.name == name)
    }

    /// The address the visit happens at.
    pub fn meeting_address(&self) -> Option<&Address> {
        let declared_other = self
            .meeting_at_different_address
            .is_some_and(YesNo::is_yes);
        if self.is_existing_client() && declared_other {
            self.new_address.as_ref()
        } else {
            self.address.as_ref()
        }
    }

    /// Single-line meeting address; the key the zone status belongs to.
    pub fn meeting_address_line(&self) -> Option<String> {
        self.meeting_address().map(Address::one_line)
    }

    pub fn wants_no_preference(&self) -> bool {
        self.preferred_doctor_text
            .as_deref()
            .is_some_and(|t| t.trim().trim_end_matches('.') == NO_PREFERENCE)
    }

    /// Either legacy flag requests the euthanasia branch.
    pub fn legacy_euthanasia_requested(&self) -> bool {
        self.looking_for_euthanasia.is_some_and(YesNo::is_yes)
            || self.new_client_euthanasia.is_some_and(YesNo::is_yes)
    }

    /// Toggle a recommended slot. Unknown timestamps are ignored.
    /// Selecting any slot clears the "none of these work" flag.
    pub fn toggle_slot(&mut self, iso: &str) -> bool {
        if !self.recommended_slots.iter().any(|s| s.iso == iso) {
            return false;
        }
        let selected = self.slot_preferences.toggle(iso);
        if selected {
            self.none_of_these_work = false;
        }
        selected
    }

    pub fn set_none_of_these_work(&mut self, value: bool) {
        self.none_of_these_work = value;
        if value {
            self.slot_preferences.clear();
        }
    }

    /// Replace the recommendation wholesale, dropping ranks of slots that
    /// are no longer offered.
    pub fn replace_recommended_slots(&mut self, slots: Vec<CandidateSlot>) {
        self.slot_preferences
            .retain(|iso| slots.iter().any(|s| s.iso == iso));
        self.recommended_slots = slots;
    }
}
