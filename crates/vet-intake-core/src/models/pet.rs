//! Pet records and per-visit intake.

use serde::{Deserialize, Serialize};

/// Pet identifier. Existing patients use their directory ID, pets added on
/// the form get a generated `new-<uuid>` ID.
pub type PetId = String;

/// Answer to a yes/no question on the form.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum YesNo {
    Yes,
    No,
}

impl YesNo {
    pub fn is_yes(self) -> bool {
        matches!(self, YesNo::Yes)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Sex {
    Male,
    Female,
    Unknown,
}

/// Species reference entry chosen on the form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Species {
    pub id: String,
    pub name: String,
}

impl Species {
    /// The catch-all species that requires a typed-in name.
    pub fn is_other(&self) -> bool {
        self.name.trim().eq_ignore_ascii_case("other")
    }
}

/// A patient already on file (read-only on the form).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExistingPatient {
    pub id: String,
    pub pims_id: Option<String>,
    pub name: String,
    pub species: Option<String>,
    pub breed: Option<String>,
}

/// A pet described for the first time on this form.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NewPet {
    pub name: String,
    pub species: Option<Species>,
    /// Free-text species when `species` is "Other"
    pub species_other: Option<String>,
    pub breed_id: Option<String>,
    pub age: Option<String>,
    pub sex: Option<Sex>,
    pub spayed_neutered: Option<YesNo>,
    pub weight: Option<String>,
    pub color: Option<String>,
    pub behavior_notes: Option<String>,
    /// Does the pet need calming medication before visits
    pub needs_calming_medications: Option<YesNo>,
    /// Does the client already have that medication at home
    pub has_calming_medications: Option<YesNo>,
    /// Does the pet need special handling
    pub needs_special_handling: Option<YesNo>,
    pub handling_notes: Option<String>,
}

impl NewPet {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// A pet referenced by the session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum PetRecord {
    Existing(ExistingPatient),
    New(NewPet),
}

impl PetRecord {
    pub fn name(&self) -> &str {
        match self {
            PetRecord::Existing(p) => &p.name,
            PetRecord::New(p) => &p.name,
        }
    }

    pub fn is_new(&self) -> bool {
        matches!(self, PetRecord::New(_))
    }
}

/// Whether the client wants to hear about alternatives to euthanasia.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AlternativesInterest {
    Yes,
    No,
    Unsure,
}

/// Aftercare for the pet's body.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Aftercare {
    HomeBurial,
    CommunalCremation,
    PrivateCremation,
    Undecided,
}

/// Euthanasia sub-form, required when the intake type is euthanasia.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EuthanasiaDetails {
    pub reason: Option<String>,
    pub recent_vet_visit: Option<String>,
    pub interested_in_alternatives: Option<AlternativesInterest>,
    pub aftercare: Option<Aftercare>,
}

impl EuthanasiaDetails {
    /// Field suffixes that are still unanswered.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if is_blank(&self.reason) {
            missing.push("reason");
        }
        if is_blank(&self.recent_vet_visit) {
            missing.push("recent_vet_visit");
        }
        if self.interested_in_alternatives.is_none() {
            missing.push("interested_in_alternatives");
        }
        if self.aftercare.is_none() {
            missing.push("aftercare");
        }
        missing
    }

    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }
}

/// Per-visit intake for one pet.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PetIntake {
    /// Internal name of the chosen appointment type
    pub appointment_type: Option<String>,
    /// Free-text description of the visit reason
    pub details: Option<String>,
    /// Present only while the chosen type is euthanasia
    pub euthanasia: Option<EuthanasiaDetails>,
}

impl PetIntake {
    pub fn is_euthanasia(&self) -> bool {
        self.appointment_type
            .as_deref()
            .is_some_and(super::is_euthanasia_type)
    }
}

/// True when an optional text answer is missing or whitespace.
pub fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_euthanasia_details_missing() {
        let details = EuthanasiaDetails {
            reason: Some("Declining quality of life".into()),
            recent_vet_visit: Some("  ".into()),
            ..Default::default()
        };
        assert_eq!(
            details.missing_fields(),
            vec!["recent_vet_visit", "interested_in_alternatives", "aftercare"]
        );
        assert!(!details.is_complete());
    }

    #[test]
    fn test_intake_is_euthanasia() {
        let mut intake = PetIntake::default();
        assert!(!intake.is_euthanasia());
        intake.appointment_type = Some("Euthanasia".into());
        assert!(intake.is_euthanasia());
    }

    #[test]
    fn test_species_other() {
        let other = Species {
            id: "9".into(),
            name: "Other".into(),
        };
        assert!(other.is_other());
    }
}
