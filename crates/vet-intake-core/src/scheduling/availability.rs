//! Normalization of the two availability answer shapes into candidate slots.

use std::collections::HashSet;

use tracing::debug;

use super::rounding::{parse_instant, to_candidate_slot};
use crate::models::CandidateSlot;
use crate::services::{AvailabilityResponse, RawCandidate};

/// Most slots ever recommended.
pub const MAX_CANDIDATES: usize = 3;

/// Routing candidates scoring above this are dropped. The scale belongs to
/// the routing service; the threshold is a business constant.
pub const MAX_ROUTING_SCORE: f64 = 160.0;

/// Availability answer, tagged by shape at the collaborator boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum AvailabilityAnswer {
    /// Slots already picked by the collaborator
    Preselected(Vec<RawCandidate>),
    /// Routing answer: a best candidate plus alternates, all scored
    Routed {
        winner: Option<RawCandidate>,
        alternates: Vec<RawCandidate>,
    },
}

impl From<AvailabilityResponse> for AvailabilityAnswer {
    fn from(response: AvailabilityResponse) -> Self {
        match response.slots {
            Some(slots) if !slots.is_empty() => AvailabilityAnswer::Preselected(slots),
            _ => AvailabilityAnswer::Routed {
                winner: response.winner,
                alternates: response.alternates.unwrap_or_default(),
            },
        }
    }
}

/// Whether a routing candidate survives the score filter. Unscored
/// candidates pass.
pub fn passes_score_filter(candidate: &RawCandidate) -> bool {
    candidate.score.map_or(true, |score| score <= MAX_ROUTING_SCORE)
}

impl AvailabilityAnswer {
    /// Candidates in preference order, before rounding.
    fn ordered_candidates(self) -> Vec<RawCandidate> {
        match self {
            AvailabilityAnswer::Preselected(slots) => slots,
            AvailabilityAnswer::Routed { winner, alternates } => winner
                .into_iter()
                .chain(alternates)
                .filter(passes_score_filter)
                .collect(),
        }
    }

    /// Up to three rounded slots in the order the collaborator gave them.
    /// Candidates that round to the same instant collapse into the first.
    pub fn into_slots(self) -> Vec<CandidateSlot> {
        let mut seen = HashSet::new();
        self.ordered_candidates()
            .into_iter()
            .filter_map(|candidate| match parse_instant(&candidate.start) {
                Some(instant) => Some(instant),
                None => {
                    debug!(start = %candidate.start, "dropping candidate with unreadable time");
                    None
                }
            })
            .map(to_candidate_slot)
            .filter(|slot| seen.insert(slot.iso.clone()))
            .take(MAX_CANDIDATES)
            .collect()
    }
}

/// Normalize a raw response in one step.
pub fn normalize(response: AvailabilityResponse) -> Vec<CandidateSlot> {
    AvailabilityAnswer::from(response).into_slots()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(start: &str, score: Option<f64>) -> RawCandidate {
        RawCandidate {
            start: start.into(),
            score,
            doctor_id: None,
        }
    }

    fn isos(slots: &[CandidateSlot]) -> Vec<&str> {
        slots.iter().map(|s| s.iso.as_str()).collect()
    }

    #[test]
    fn test_preselected_used_directly_and_capped() {
        let response = AvailabilityResponse {
            slots: Some(vec![
                candidate("2024-06-03T09:00:00Z", Some(500.0)),
                candidate("2024-06-03T10:00:00Z", None),
                candidate("2024-06-04T09:00:00Z", None),
                candidate("2024-06-05T09:00:00Z", None),
            ]),
            winner: Some(candidate("2024-06-09T09:00:00Z", None)),
            alternates: None,
        };
        let slots = normalize(response);
        // Preselected slots skip the score filter
        assert_eq!(
            isos(&slots),
            vec!["2024-06-03T09:00:00Z", "2024-06-03T10:00:00Z", "2024-06-04T09:00:00Z"]
        );
    }

    #[test]
    fn test_empty_slots_fall_back_to_routing_shape() {
        let response = AvailabilityResponse {
            slots: Some(vec![]),
            winner: Some(candidate("2024-06-03T09:01:00Z", Some(20.0))),
            alternates: Some(vec![candidate("2024-06-04T09:00:00Z", None)]),
        };
        let slots = normalize(response);
        assert_eq!(isos(&slots), vec!["2024-06-03T09:00:00Z", "2024-06-04T09:00:00Z"]);
    }

    #[test]
    fn test_same_rounded_instant_kept_once() {
        let response = AvailabilityResponse {
            slots: None,
            winner: Some(candidate("2024-06-03T09:01:00Z", Some(10.0))),
            alternates: Some(vec![
                candidate("2024-06-03T09:02:00Z", Some(12.0)),
                candidate("2024-06-03T11:00:00Z", None),
                candidate("2024-06-04T09:00:00Z", None),
                candidate("2024-06-05T09:00:00Z", None),
            ]),
        };
        let slots = normalize(response);
        assert_eq!(
            isos(&slots),
            vec!["2024-06-03T09:00:00Z", "2024-06-03T11:00:00Z", "2024-06-04T09:00:00Z"]
        );
    }

    #[test]
    fn test_score_threshold_boundary() {
        assert!(passes_score_filter(&candidate("x", Some(160.0))));
        assert!(!passes_score_filter(&candidate("x", Some(161.0))));
        assert!(passes_score_filter(&candidate("x", None)));
    }

    #[test]
    fn test_filter_then_take_three() {
        let response = AvailabilityResponse {
            slots: None,
            winner: Some(candidate("2024-06-03T09:00:00Z", Some(161.0))),
            alternates: Some(vec![
                candidate("2024-06-03T10:00:00Z", Some(160.0)),
                candidate("2024-06-03T11:00:00Z", Some(300.0)),
                candidate("2024-06-03T12:00:00Z", None),
                candidate("2024-06-03T13:00:00Z", Some(1.0)),
                candidate("2024-06-03T14:00:00Z", Some(2.0)),
            ]),
        };
        let slots = normalize(response);
        assert_eq!(
            isos(&slots),
            vec!["2024-06-03T10:00:00Z", "2024-06-03T12:00:00Z", "2024-06-03T13:00:00Z"]
        );
    }

    #[test]
    fn test_everything_empty() {
        assert!(normalize(AvailabilityResponse::default()).is_empty());
        let response = AvailabilityResponse {
            slots: Some(vec![]),
            winner: None,
            alternates: Some(vec![]),
        };
        assert!(normalize(response).is_empty());
    }

    #[test]
    fn test_unreadable_time_dropped() {
        let answer = AvailabilityAnswer::Preselected(vec![
            candidate("soon", None),
            candidate("2024-06-03T09:00:00Z", None),
        ]);
        assert_eq!(isos(&answer.into_slots()), vec!["2024-06-03T09:00:00Z"]);
    }
}
