//! Wizard page identifiers.

use serde::{Deserialize, Serialize};

/// One page of the intake wizard.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Page {
    Intro,
    NewClient,
    NewClientPetInfo,
    ExistingClient,
    ExistingClientPets,
    EuthanasiaIntro,
    EuthanasiaServiceArea,
    EuthanasiaPortland,
    EuthanasiaHighPeaks,
    EuthanasiaContinued,
    RequestVisitContinued,
    Success,
}

impl Page {
    /// Whether the page offers a "Previous" action.
    pub fn has_previous(&self) -> bool {
        !matches!(self, Page::Intro | Page::Success)
    }

    /// Pages whose "next" action submits the request.
    pub fn is_final(&self) -> bool {
        matches!(self, Page::EuthanasiaContinued | Page::RequestVisitContinued)
    }

    /// Pages that display recommended visit times.
    pub fn shows_scheduling(&self) -> bool {
        matches!(self, Page::RequestVisitContinued)
    }

    /// Stable identifier used across the FFI boundary.
    pub fn as_str(&self) -> &'static str {
        match self {
            Page::Intro => "intro",
            Page::NewClient => "new_client",
            Page::NewClientPetInfo => "new_client_pet_info",
            Page::ExistingClient => "existing_client",
            Page::ExistingClientPets => "existing_client_pets",
            Page::EuthanasiaIntro => "euthanasia_intro",
            Page::EuthanasiaServiceArea => "euthanasia_service_area",
            Page::EuthanasiaPortland => "euthanasia_portland",
            Page::EuthanasiaHighPeaks => "euthanasia_high_peaks",
            Page::EuthanasiaContinued => "euthanasia_continued",
            Page::RequestVisitContinued => "request_visit_continued",
            Page::Success => "success",
        }
    }
}

impl std::fmt::Display for Page {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
