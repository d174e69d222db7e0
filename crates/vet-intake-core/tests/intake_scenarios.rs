//! End-to-end intake scenarios driven through the public API.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;

use vet_intake_core::models::{
    Address, ExistingPatient, IntakeSession, NewPet, Page, Urgency, NO_PREFERENCE,
};
use vet_intake_core::scheduling::{
    normalize, plan, AvailabilityQuery, RecommendationOutcome, SkipReason, SlotInputs, SlotPlan,
    SlotRecommendationEngine,
};
use vet_intake_core::services::{
    AvailabilityResponse, AvailabilityService, PublicAvailabilityRequest, RoutingRequest,
    ServiceResult,
};
use vet_intake_core::wizard::{reduce, time_preference_required, validate, IntakeEvent};

#[derive(Default)]
struct CountingAvailability {
    calls: AtomicUsize,
}

#[async_trait]
impl AvailabilityService for CountingAvailability {
    async fn route(&self, _request: &RoutingRequest) -> ServiceResult<AvailabilityResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(AvailabilityResponse::default())
    }

    async fn public_availability(
        &self,
        _request: &PublicAvailabilityRequest,
    ) -> ServiceResult<AvailabilityResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(AvailabilityResponse::default())
    }
}

fn apply_all(session: IntakeSession, events: Vec<IntakeEvent>) -> IntakeSession {
    events.into_iter().fold(session, reduce)
}

fn home_address() -> Address {
    Address {
        line1: "12 Harbor Rd".into(),
        line2: None,
        city: "Portland".into(),
        state: "ME".into(),
        zip: "04101".into(),
        country: "US".into(),
    }
}

fn june_first() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
}

#[test]
fn test_anonymous_two_pets_soon_searches_public_availability() {
    let session = apply_all(
        IntakeSession::new(false),
        vec![
            IntakeEvent::NewPetAdded {
                pet_id: "new-a".into(),
                pet: NewPet::named("Biscuit"),
            },
            IntakeEvent::NewPetAdded {
                pet_id: "new-b".into(),
                pet: NewPet::named("Pepper"),
            },
            IntakeEvent::AddressChanged {
                address: Some(home_address()),
            },
            IntakeEvent::UrgencyChosen {
                urgency: Some(Urgency::Soon),
            },
            IntakeEvent::PreferredDoctorChanged {
                text: Some(NO_PREFERENCE.into()),
            },
        ],
    );

    let inputs = SlotInputs::from_session(&session, "1");
    assert_eq!(inputs.pet_count, 2);

    match plan(&inputs, june_first()) {
        SlotPlan::Search(AvailabilityQuery::Public(request)) => {
            assert_eq!(request.start_date, NaiveDate::from_ymd_opt(2024, 6, 2).unwrap());
            assert_eq!(request.num_days, 7);
            assert_eq!(request.service_minutes, 60);
            assert_eq!(request.address, "12 Harbor Rd, Portland, ME 04101, US");
            assert_eq!(request.doctor_id, None);
            assert_eq!(request.practice_id, "1");
        }
        other => panic!("expected a public search, got {other:?}"),
    }
}

#[tokio::test]
async fn test_existing_client_euthanasia_skips_search() {
    let mut session = apply_all(
        IntakeSession::new(true),
        vec![
            IntakeEvent::ProfileLoaded {
                client_id: "c-42".into(),
                contact: Default::default(),
                address: Some(home_address()),
                pets: vec![ExistingPatient {
                    id: "301".into(),
                    pims_id: None,
                    name: "Duke".into(),
                    species: Some("Canine".into()),
                    breed: None,
                }],
            },
            IntakeEvent::PetSelected {
                pet_id: "301".into(),
            },
            IntakeEvent::AppointmentTypeChosen {
                pet_id: "301".into(),
                appointment_type: Some("Euthanasia".into()),
            },
            IntakeEvent::UrgencyChosen {
                urgency: Some(Urgency::Soon),
            },
        ],
    );
    assert_eq!(session.current_page, Page::ExistingClient);
    assert!(session.has_euthanasia_pet());

    let availability = Arc::new(CountingAvailability::default());
    let engine = SlotRecommendationEngine::new(availability.clone(), Duration::from_secs(10));
    let inputs = SlotInputs::from_session(&session, "1");
    let recommendation = engine.recommend(&inputs, june_first()).await;

    assert!(recommendation.slots.is_empty());
    assert_eq!(
        recommendation.outcome,
        RecommendationOutcome::Skipped(SkipReason::EuthanasiaRequested)
    );
    assert_eq!(availability.calls.load(Ordering::SeqCst), 0);

    assert!(time_preference_required(&session));
    session.current_page = Page::RequestVisitContinued;
    let errors = validate(Page::RequestVisitContinued, &session);
    assert!(errors.contains("time_preference_text"));
}

#[test]
fn test_empty_availability_requires_time_preference() {
    let empty_slots: AvailabilityResponse = serde_json::from_str(r#"{"slots": []}"#).unwrap();
    let empty_routing: AvailabilityResponse =
        serde_json::from_str(r#"{"winner": null, "alternates": []}"#).unwrap();
    assert!(normalize(empty_slots).is_empty());
    assert!(normalize(empty_routing).is_empty());

    let session = apply_all(
        IntakeSession::new(false),
        vec![
            IntakeEvent::UrgencyChosen {
                urgency: Some(Urgency::Flexible),
            },
            IntakeEvent::PreferredDoctorChanged {
                text: Some(NO_PREFERENCE.into()),
            },
            IntakeEvent::SlotsRecommended { slots: Vec::new() },
        ],
    );
    assert!(time_preference_required(&session));
    let errors = validate(Page::RequestVisitContinued, &session);
    assert!(errors.contains("time_preference_text"));
    assert!(!errors.contains("slot_preferences"));

    let answered = reduce(
        session,
        IntakeEvent::TimePreferenceChanged {
            text: Some("Any weekday after 3pm".into()),
        },
    );
    assert!(validate(Page::RequestVisitContinued, &answered).is_empty());
}
