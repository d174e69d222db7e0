//! Provider (veterinarian) models.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// A veterinarian who can be requested for a visit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Provider {
    /// Directory ID
    pub id: String,
    /// Practice-management system ID, when the provider is synced
    pub pims_id: Option<String>,
    /// Full name without title (e.g., "Jane Smith")
    pub name: String,
    /// Internal names of the appointment types this provider accepts
    pub accepted_appointment_types: BTreeSet<String>,
}

impl Provider {
    /// Create a provider with no accepted types.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            pims_id: None,
            name: name.into(),
            accepted_appointment_types: BTreeSet::new(),
        }
    }

    /// Builder-style helper to set accepted types.
    pub fn accepting<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.accepted_appointment_types = types.into_iter().map(Into::into).collect();
        self
    }

    /// Name as shown to clients.
    pub fn display_name(&self) -> String {
        format!("Dr. {}", self.name)
    }

    /// Check whether every requested type is accepted.
    pub fn accepts_all(&self, type_names: &BTreeSet<String>) -> bool {
        type_names.is_subset(&self.accepted_appointment_types)
    }
}
