//! Urgency → search window table and visit-length estimate.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::Urgency;

/// Base visit length for the first pet, in minutes.
const BASE_SERVICE_MINUTES: u32 = 40;

/// Extra minutes for each additional pet.
const ADDITIONAL_PET_MINUTES: u32 = 20;

/// Window searched when the client has not said how soon.
pub const DEFAULT_WINDOW: SearchWindow = SearchWindow {
    start_offset_days: 1,
    length_days: 42,
};

/// Days from today to start searching, and how many days to search.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchWindow {
    pub start_offset_days: u32,
    pub length_days: u32,
}

impl SearchWindow {
    const fn new(start_offset_days: u32, length_days: u32) -> Self {
        Self {
            start_offset_days,
            length_days,
        }
    }

    /// First day searched, relative to `today`.
    pub fn start_date(&self, today: NaiveDate) -> NaiveDate {
        today
            .checked_add_days(Days::new(u64::from(self.start_offset_days)))
            .unwrap_or(NaiveDate::MAX)
    }
}

/// Search window for an urgency. `None` means no automatic search: emergent
/// and urgent requests are handled by staff from the client's own notes.
pub fn window_for(urgency: Option<Urgency>) -> Option<SearchWindow> {
    let Some(urgency) = urgency else {
        return Some(DEFAULT_WINDOW);
    };
    match urgency {
        Urgency::Emergent | Urgency::Urgent => None,
        Urgency::Soon => Some(SearchWindow::new(1, 7)),
        Urgency::ThreeToFourWeeks => Some(SearchWindow::new(21, 15)),
        Urgency::Flexible => Some(SearchWindow::new(4, 39)),
        Urgency::Routine => Some(SearchWindow::new(75, 31)),
        Urgency::Planned => Some(SearchWindow::new(135, 31)),
        Urgency::Future => Some(SearchWindow::new(345, 21)),
    }
}

/// Estimated visit length: 40 minutes plus 20 per additional pet.
/// Zero pets counts as one.
pub fn service_minutes(pet_count: usize) -> u32 {
    let extra = pet_count.saturating_sub(1) as u32;
    BASE_SERVICE_MINUTES + ADDITIONAL_PET_MINUTES * extra
}
