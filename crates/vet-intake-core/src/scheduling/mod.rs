//! Visit-time recommendation.
//!
//! Pipeline: urgency → search window → availability collaborator →
//! shape normalization → score filter → 5-minute rounding → ≤3 slots.
//!
//! Failures never block the wizard: they degrade to an empty
//! recommendation, which makes the free-text time preference required.

mod availability;
mod rounding;
mod window;

pub use availability::*;
pub use rounding::*;
pub use window::*;

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::models::{CandidateSlot, Coordinates, IntakeSession, Urgency};
use crate::resolver;
use crate::services::{
    with_timeout, AvailabilityResponse, AvailabilityService, NewAppointment,
    PublicAvailabilityRequest, RoutingRequest, ServiceResult,
};

/// Everything the recommendation depends on.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotInputs {
    pub practice_id: String,
    pub authenticated: bool,
    pub urgency: Option<Urgency>,
    pub pet_count: usize,
    pub has_euthanasia_pet: bool,
    /// Resolved provider ID; `None` for no preference or no match
    pub doctor_id: Option<String>,
    pub address: Option<String>,
    pub coordinates: Option<Coordinates>,
}

impl SlotInputs {
    /// Collect inputs from the session's current answers.
    pub fn from_session(session: &IntakeSession, practice_id: &str) -> Self {
        let doctor_id = session
            .preferred_doctor_text
            .as_deref()
            .and_then(|text| resolver::resolve(text, &session.providers))
            .map(|p| p.id.clone());
        let coordinates = match &session.zone {
            crate::models::ZoneStatus::Serviced { coordinates, .. } => *coordinates,
            _ => None,
        };
        Self {
            practice_id: practice_id.to_string(),
            authenticated: session.authenticated,
            urgency: session.urgency,
            pet_count: session.pet_count(),
            has_euthanasia_pet: session.has_euthanasia_pet(),
            doctor_id,
            address: session
                .meeting_address()
                .filter(|a| a.is_complete())
                .map(|a| a.one_line()),
            coordinates,
        }
    }
}

/// Why no automatic search runs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SkipReason {
    /// Emergent/urgent requests are scheduled by staff
    ManualUrgency,
    /// Euthanasia visits are always arranged by phone
    EuthanasiaRequested,
    /// Routing for signed-in clients needs a specific doctor
    DoctorRequired,
    /// Public availability needs a meeting address
    AddressRequired,
}

/// Request to the availability collaborator, by client type.
#[derive(Debug, Clone, PartialEq)]
pub enum AvailabilityQuery {
    Routing(RoutingRequest),
    Public(PublicAvailabilityRequest),
}

/// Outcome of planning a recommendation.
#[derive(Debug, Clone, PartialEq)]
pub enum SlotPlan {
    Skip(SkipReason),
    Search(AvailabilityQuery),
}

/// Decide whether and how to search, as a pure function of the inputs.
pub fn plan(inputs: &SlotInputs, today: NaiveDate) -> SlotPlan {
    if inputs.has_euthanasia_pet {
        return SlotPlan::Skip(SkipReason::EuthanasiaRequested);
    }
    let Some(window) = window_for(inputs.urgency) else {
        return SlotPlan::Skip(SkipReason::ManualUrgency);
    };
    let start_date = window.start_date(today);
    let minutes = service_minutes(inputs.pet_count);

    if inputs.authenticated {
        let Some(doctor_id) = inputs.doctor_id.clone() else {
            return SlotPlan::Skip(SkipReason::DoctorRequired);
        };
        SlotPlan::Search(AvailabilityQuery::Routing(RoutingRequest {
            doctor_id,
            start_date,
            num_days: window.length_days,
            new_appt: NewAppointment {
                service_minutes: minutes,
                lat: inputs.coordinates.map(|c| c.lat),
                lon: inputs.coordinates.map(|c| c.lon),
                address: inputs.address.clone(),
            },
        }))
    } else {
        let Some(address) = inputs.address.clone() else {
            return SlotPlan::Skip(SkipReason::AddressRequired);
        };
        SlotPlan::Search(AvailabilityQuery::Public(PublicAvailabilityRequest {
            practice_id: inputs.practice_id.clone(),
            start_date,
            num_days: window.length_days,
            service_minutes: minutes,
            address,
            doctor_id: inputs.doctor_id.clone(),
            allow_other_doctors: false,
        }))
    }
}

/// How a recommendation came about.
#[derive(Debug, Clone, PartialEq)]
pub enum RecommendationOutcome {
    Skipped(SkipReason),
    Found,
    /// The collaborator failed; the message is for logs only
    Degraded(String),
}

/// A recommendation: the slots plus how they were obtained.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotRecommendation {
    pub slots: Vec<CandidateSlot>,
    pub outcome: RecommendationOutcome,
}

impl SlotRecommendation {
    fn empty(outcome: RecommendationOutcome) -> Self {
        Self {
            slots: Vec::new(),
            outcome,
        }
    }
}

/// Recommends visit times through an availability collaborator.
pub struct SlotRecommendationEngine {
    availability: Arc<dyn AvailabilityService>,
    timeout: Duration,
}

impl SlotRecommendationEngine {
    pub fn new(availability: Arc<dyn AvailabilityService>, timeout: Duration) -> Self {
        Self {
            availability,
            timeout,
        }
    }

    /// Compute up to three candidate slots. Never fails.
    pub async fn recommend(&self, inputs: &SlotInputs, today: NaiveDate) -> SlotRecommendation {
        let query = match plan(inputs, today) {
            SlotPlan::Skip(reason) => {
                debug!(?reason, "skipping automatic slot search");
                return SlotRecommendation::empty(RecommendationOutcome::Skipped(reason));
            }
            SlotPlan::Search(query) => query,
        };

        match self.fetch(&query).await {
            Ok(response) => {
                let slots = normalize(response);
                info!(count = slots.len(), "recommended visit times");
                SlotRecommendation {
                    slots,
                    outcome: RecommendationOutcome::Found,
                }
            }
            Err(e) => {
                warn!(error = %e, "availability lookup failed, offering no slots");
                SlotRecommendation::empty(RecommendationOutcome::Degraded(e.to_string()))
            }
        }
    }

    async fn fetch(&self, query: &AvailabilityQuery) -> ServiceResult<AvailabilityResponse> {
        match query {
            AvailabilityQuery::Routing(request) => {
                with_timeout(self.timeout, self.availability.route(request)).await
            }
            AvailabilityQuery::Public(request) => {
                with_timeout(self.timeout, self.availability.public_availability(request)).await
            }
        }
    }
}
