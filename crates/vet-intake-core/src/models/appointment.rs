//! Appointment type definitions and urgency categories.

use serde::{Deserialize, Serialize};

/// Reserved internal name of the euthanasia appointment type.
pub const EUTHANASIA_TYPE_NAME: &str = "Euthanasia";

/// Substrings (matched case-insensitively against the internal or display name)
/// marking appointment types whose intake needs a free-text description.
const DETAIL_REQUIRED_KEYWORDS: &[&str] = &[
    "wellness", "illness", "sick", "recheck", "follow", "behavior", "consult",
];

/// One entry of the practice's appointment-type catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppointmentTypeDef {
    /// Internal name, stable across display-name edits
    pub name: String,
    /// Display name shown to clients
    pub pretty_name: String,
    /// Whether clients who have never visited may book it
    pub new_patient_allowed: bool,
    /// Whether it is offered on the intake form at all
    pub show_in_intake_form: bool,
}

impl AppointmentTypeDef {
    /// Create a type that is offered to everyone.
    pub fn new(name: impl Into<String>, pretty_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pretty_name: pretty_name.into(),
            new_patient_allowed: true,
            show_in_intake_form: true,
        }
    }

    /// True only for the reserved euthanasia type.
    pub fn is_euthanasia(&self) -> bool {
        is_euthanasia_type(&self.name)
    }

    /// Whether choosing this type obliges the client to describe the visit.
    pub fn requires_detail(&self) -> bool {
        if self.is_euthanasia() {
            return false;
        }
        let name = self.name.to_lowercase();
        let pretty = self.pretty_name.to_lowercase();
        DETAIL_REQUIRED_KEYWORDS
            .iter()
            .any(|k| name.contains(k) || pretty.contains(k))
    }
}

/// Check an appointment-type name against the reserved euthanasia literal.
pub fn is_euthanasia_type(name: &str) -> bool {
    name == EUTHANASIA_TYPE_NAME
}

/// How soon the client needs to be seen ("howSoon").
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Urgency {
    Emergent,
    Urgent,
    Soon,
    ThreeToFourWeeks,
    Flexible,
    Routine,
    Planned,
    Future,
}

impl Urgency {
    /// All categories in ordinal order.
    pub const ALL: [Urgency; 8] = [
        Urgency::Emergent,
        Urgency::Urgent,
        Urgency::Soon,
        Urgency::ThreeToFourWeeks,
        Urgency::Flexible,
        Urgency::Routine,
        Urgency::Planned,
        Urgency::Future,
    ];

    /// The literal shown on the form and sent to the practice.
    pub fn label(&self) -> &'static str {
        match self {
            Urgency::Emergent => "Emergent – today",
            Urgency::Urgent => "Urgent – within 24–48 hours",
            Urgency::Soon => "Soon – sometime this week",
            Urgency::ThreeToFourWeeks => "In 3–4 weeks",
            Urgency::Flexible => "Flexible – within the next month",
            Urgency::Routine => "Routine – in about 3 months",
            Urgency::Planned => "Planned – in about 6 months",
            Urgency::Future => "Future – in about 12 months",
        }
    }

    /// Parse a form literal. Plain hyphens are accepted in place of en dashes.
    pub fn from_label(label: &str) -> Option<Self> {
        let wanted = label.trim().replace('-', "–");
        Self::ALL.into_iter().find(|u| u.label() == wanted)
    }

    /// Emergent and urgent requests are scheduled by staff, not by slot search.
    pub fn is_manual(&self) -> bool {
        matches!(self, Urgency::Emergent | Urgency::Urgent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_euthanasia_is_exact_name() {
        assert!(AppointmentTypeDef::new("Euthanasia", "Humane euthanasia").is_euthanasia());
        assert!(!AppointmentTypeDef::new("euthanasia", "Euthanasia").is_euthanasia());
        assert!(!AppointmentTypeDef::new("EuthanasiaConsult", "Quality of life").is_euthanasia());
    }

    #[test]
    fn test_requires_detail_matches_either_name() {
        assert!(AppointmentTypeDef::new("WellnessExam", "Annual visit").requires_detail());
        assert!(AppointmentTypeDef::new("Visit", "Sick pet visit").requires_detail());
        assert!(AppointmentTypeDef::new("RECHECK", "Progress").requires_detail());
        assert!(!AppointmentTypeDef::new("Vaccines", "Vaccines only").requires_detail());
        assert!(!AppointmentTypeDef::new("Euthanasia", "Euthanasia consult").requires_detail());
    }

    #[test]
    fn test_urgency_labels_round_trip() {
        for urgency in Urgency::ALL {
            assert_eq!(Urgency::from_label(urgency.label()), Some(urgency));
        }
        assert_eq!(
            Urgency::from_label("Soon - sometime this week"),
            Some(Urgency::Soon)
        );
        assert_eq!(Urgency::from_label("whenever"), None);
    }

    #[test]
    fn test_manual_urgencies() {
        let manual: Vec<_> = Urgency::ALL.into_iter().filter(|u| u.is_manual()).collect();
        assert_eq!(manual, vec![Urgency::Emergent, Urgency::Urgent]);
    }
}
