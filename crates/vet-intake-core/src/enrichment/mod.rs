//! Async enrichment around the wizard.
//!
//! The orchestrator owns the [`IntakeWizard`] and every collaborator. Each
//! lookup is split in three steps so lookups can overlap without sharing the
//! session:
//!
//! ```text
//! begin_*(&mut self) -> Task      capture inputs + ticket
//! Task::run(self).await -> Result  no access to the session
//! apply_*(&mut self, Result)       dropped if the ticket went stale
//! ```
//!
//! `refresh_*` helpers chain the three for callers that don't need overlap.

mod generation;
mod tasks;

pub use generation::*;
pub use tasks::*;

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, info};

use crate::catalog;
use crate::config::IntakeConfig;
use crate::models::{AppointmentTypeDef, IntakeSession, Page, PetRecord, Provider, ZoneStatus};
use crate::scheduling::{SlotInputs, SlotRecommendationEngine};
use crate::services::{
    AppointmentTypeDirectory, AppointmentTypeQuery, AvailabilityService, ClientDirectory,
    PatientAlerts, ProviderDirectory, SpeciesBreeds, SpeciesCatalog, SubmissionSink, ZoneLookup,
};
use crate::submission::{self, SubmissionResult};
use crate::wizard::{Advance, IntakeEvent, IntakeNotifier, IntakeWizard, NavigationError, TracingNotifier};

/// Handles to every external collaborator.
#[derive(Clone)]
pub struct Collaborators {
    pub clients: Arc<dyn ClientDirectory>,
    pub appointment_types: Arc<dyn AppointmentTypeDirectory>,
    pub providers: Arc<dyn ProviderDirectory>,
    pub zones: Arc<dyn ZoneLookup>,
    pub availability: Arc<dyn AvailabilityService>,
    pub species: Arc<dyn SpeciesCatalog>,
    pub alerts: Arc<dyn PatientAlerts>,
    pub submissions: Arc<dyn SubmissionSink>,
}

impl Collaborators {
    /// Use one client for every contract (e.g., the HTTP adapter).
    pub fn from_client<C>(client: Arc<C>) -> Self
    where
        C: ClientDirectory
            + AppointmentTypeDirectory
            + ProviderDirectory
            + ZoneLookup
            + AvailabilityService
            + SpeciesCatalog
            + PatientAlerts
            + SubmissionSink
            + 'static,
    {
        Self {
            clients: client.clone(),
            appointment_types: client.clone(),
            providers: client.clone(),
            zones: client.clone(),
            availability: client.clone(),
            species: client.clone(),
            alerts: client.clone(),
            submissions: client,
        }
    }
}

/// Everything a slot recommendation depends on.
#[derive(Debug, Clone, PartialEq)]
struct SlotKey {
    inputs: SlotInputs,
    type_names: BTreeSet<String>,
}

/// Drives one form-fill: wizard, enrichment and submission.
pub struct IntakeOrchestrator {
    wizard: IntakeWizard,
    services: Collaborators,
    config: IntakeConfig,
    notifier: Arc<dyn IntakeNotifier>,
    engine: Arc<SlotRecommendationEngine>,
    generations: RequestGenerations,
    /// Address and answer of the last zone lookup that produced one
    last_zone_check: Option<(String, ZoneStatus)>,
    last_slot_key: Option<SlotKey>,
    species: Vec<SpeciesBreeds>,
}

impl IntakeOrchestrator {
    pub fn new(authenticated: bool, services: Collaborators, config: IntakeConfig) -> Self {
        let engine = Arc::new(SlotRecommendationEngine::new(
            services.availability.clone(),
            config.fetch_timeout,
        ));
        Self {
            wizard: IntakeWizard::new(authenticated),
            services,
            config,
            notifier: Arc::new(TracingNotifier),
            engine,
            generations: RequestGenerations::new(),
            last_zone_check: None,
            last_slot_key: None,
            species: Vec::new(),
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn IntakeNotifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn session(&self) -> &IntakeSession {
        self.wizard.session()
    }

    pub fn wizard(&self) -> &IntakeWizard {
        &self.wizard
    }

    pub fn config(&self) -> &IntakeConfig {
        &self.config
    }

    /// Species/breed reference data loaded so far.
    pub fn species(&self) -> &[SpeciesBreeds] {
        &self.species
    }

    /// Appointment types the client may pick, euthanasia last.
    pub fn appointment_type_options(&self) -> Vec<AppointmentTypeDef> {
        let session = self.session();
        catalog::intake_options(&session.appointment_types, !session.is_existing_client())
    }

    /// Providers accepting every type chosen across the selected pets.
    pub fn eligible_providers(&self) -> Vec<Provider> {
        let session = self.session();
        catalog::eligible_providers(&session.providers, &catalog::selected_type_names(session))
    }

    /// Apply an answer. A changed meeting address invalidates in-flight
    /// address lookups.
    pub fn dispatch(&mut self, event: IntakeEvent) {
        let meeting_before = event
            .touches_address()
            .then(|| self.session().meeting_address_line());
        if matches!(event, IntakeEvent::ContactChanged { .. }) {
            self.generations.invalidate(Channel::EmailCheck);
        }
        self.wizard.apply(event);
        if let Some(before) = meeting_before {
            if self.session().meeting_address_line() != before {
                self.generations.invalidate(Channel::Zone);
                self.generations.invalidate(Channel::Providers);
            }
        }
    }

    /// Apply an answer, then re-run the slot recommendation if the current
    /// page shows visit times. Unchanged inputs make no request.
    pub async fn dispatch_and_refresh(&mut self, event: IntakeEvent, today: NaiveDate) {
        self.dispatch(event);
        if self.wizard.page().shows_scheduling() {
            self.refresh_slots(today).await;
        }
    }

    /// Initial loads, deferred one scheduler tick so the first page renders
    /// before any request goes out.
    pub async fn start(&mut self) {
        tokio::task::yield_now().await;
        let types = self.begin_appointment_type_load();
        let breeds = self.begin_breed_load(None);
        let (types, breeds) = tokio::join!(types.run(), breeds.run());
        self.apply_appointment_types(types);
        self.apply_breeds(breeds);

        if self.session().authenticated {
            self.refresh_providers().await;
        }
        self.refresh_zone().await;
    }

    /// Validate and move forward, notifying on a successful move. Entering
    /// a page that shows visit times refreshes them.
    pub async fn advance(&mut self, today: NaiveDate) -> Result<Advance, NavigationError> {
        let outcome = self.wizard.advance_and_notify(self.notifier.as_ref())?;
        if let Advance::Moved { to, .. } = outcome {
            match to {
                Page::ExistingClientPets => self.refresh_pet_alerts().await,
                page if page.shows_scheduling() => self.refresh_slots(today).await,
                _ => {}
            }
        }
        Ok(outcome)
    }

    pub fn back(&mut self) -> Result<Page, NavigationError> {
        let from = self.wizard.page();
        let to = self.wizard.back()?;
        self.notifier.page_viewed(from, to);
        Ok(to)
    }

    /// Submit from a final page.
    pub async fn submit(&mut self, submitted_at: DateTime<Utc>) -> SubmissionResult<()> {
        submission::submit(
            &mut self.wizard,
            self.services.submissions.as_ref(),
            &self.config.practice_id,
            submitted_at,
            self.config.fetch_timeout,
        )
        .await
    }

    // --- email pre-lookup ---

    pub fn begin_email_check(&mut self) -> Option<EmailTask> {
        let email = self.session().contact.email.trim().to_string();
        if !email.contains('@') {
            return None;
        }
        Some(EmailTask {
            ticket: self.generations.issue(Channel::EmailCheck),
            email,
            practice_id: self.config.practice_id.clone(),
            clients: self.services.clients.clone(),
            timeout: self.config.fetch_timeout,
        })
    }

    pub fn apply_email_check(&mut self, result: EmailLookupResult) -> bool {
        if !self.accept(&result.ticket) {
            return false;
        }
        let Some(check) = result.check else {
            return false;
        };
        self.wizard.apply(IntakeEvent::EmailChecked {
            exists: check.exists,
            has_account: check.has_account,
        });
        true
    }

    pub async fn refresh_email_check(&mut self) {
        if let Some(task) = self.begin_email_check() {
            let result = task.run().await;
            self.apply_email_check(result);
        }
    }

    // --- appointment types ---

    pub fn begin_appointment_type_load(&mut self) -> AppointmentTypeTask {
        let session = self.wizard.session();
        let query = AppointmentTypeQuery {
            practice_id: self.config.practice_id.clone(),
            show_in_intake_form: true,
            new_patient_allowed: (!session.is_existing_client()).then_some(true),
            is_authenticated: session.authenticated,
        };
        AppointmentTypeTask {
            ticket: self.generations.issue(Channel::AppointmentTypes),
            query,
            directory: self.services.appointment_types.clone(),
            timeout: self.config.fetch_timeout,
        }
    }

    pub fn apply_appointment_types(&mut self, load: AppointmentTypeLoad) -> bool {
        if !self.accept(&load.ticket) {
            return false;
        }
        self.wizard.apply(IntakeEvent::AppointmentTypesLoaded {
            appointment_types: load.appointment_types,
        });
        true
    }

    // --- zone + providers (address-driven) ---

    /// Start a zone lookup for the meeting address, unless the address is
    /// incomplete or was already checked. A previously checked address gets
    /// its recorded status back without a new lookup.
    pub fn begin_zone_check(&mut self) -> Option<ZoneTask> {
        let address = self
            .session()
            .meeting_address()
            .filter(|a| a.is_complete())
            .map(|a| a.one_line())?;
        let cached = self
            .last_zone_check
            .as_ref()
            .filter(|(checked, _)| *checked == address)
            .map(|(_, status)| status.clone());
        if let Some(status) = cached {
            debug!(address = %address, "zone already checked for this address");
            if self.session().zone == ZoneStatus::Unchecked {
                self.wizard.apply(IntakeEvent::ZoneResolved { status });
            }
            return None;
        }
        Some(ZoneTask {
            ticket: self.generations.issue(Channel::Zone),
            address,
            zones: self.services.zones.clone(),
            debounce: self.config.address_debounce,
            timeout: self.config.fetch_timeout,
        })
    }

    pub fn apply_zone_check(&mut self, check: ZoneCheck) -> bool {
        if !self.accept(&check.ticket) {
            return false;
        }
        let Some(status) = check.status else {
            return false;
        };
        if status == ZoneStatus::NotServiced {
            info!(address = %check.address, "address is outside every service zone");
        }
        self.last_zone_check = Some((check.address, status.clone()));
        self.wizard.apply(IntakeEvent::ZoneResolved { status });
        true
    }

    /// Provider fetch for the client's directory variant. Suppressed while
    /// the meeting address is known to be outside the service area.
    pub fn begin_provider_load(&mut self) -> Option<ProviderTask> {
        if self.session().zone == ZoneStatus::NotServiced {
            debug!("address not serviced, skipping provider fetch");
            return None;
        }
        let directory = if self.session().authenticated {
            Directory::Employees
        } else {
            Directory::Public
        };
        Some(ProviderTask {
            ticket: self.generations.issue(Channel::Providers),
            directory,
            practice_id: self.config.practice_id.clone(),
            providers: self.services.providers.clone(),
            timeout: self.config.fetch_timeout,
        })
    }

    pub fn apply_providers(&mut self, load: ProviderLoad) -> bool {
        if !self.accept(&load.ticket) {
            return false;
        }
        self.wizard.apply(IntakeEvent::ProvidersLoaded {
            providers: load.providers,
        });
        true
    }

    pub async fn refresh_providers(&mut self) {
        if let Some(task) = self.begin_provider_load() {
            let load = task.run().await;
            self.apply_providers(load);
        }
    }

    /// Debounced zone check, followed by the provider fetch it gates.
    pub async fn refresh_zone(&mut self) {
        let Some(task) = self.begin_zone_check() else {
            return;
        };
        let check = task.run().await;
        if self.apply_zone_check(check) {
            self.refresh_providers().await;
        }
    }

    // --- species / breeds ---

    pub fn begin_breed_load(&mut self, species_id: Option<String>) -> BreedTask {
        BreedTask {
            ticket: self.generations.issue(Channel::Breeds),
            practice_id: self.config.practice_id.clone(),
            species_id,
            catalog: self.services.species.clone(),
            timeout: self.config.fetch_timeout,
        }
    }

    /// A full load replaces the reference data; a per-species load replaces
    /// only that species.
    pub fn apply_breeds(&mut self, load: BreedLoad) -> bool {
        if !self.accept(&load.ticket) {
            return false;
        }
        match load.species_id {
            None => self.species = load.species,
            Some(species_id) => {
                self.species.retain(|s| s.id != species_id);
                self.species
                    .extend(load.species.into_iter().filter(|s| s.id == species_id));
            }
        }
        true
    }

    pub async fn refresh_breeds(&mut self, species_id: Option<String>) {
        let load = self.begin_breed_load(species_id).run().await;
        self.apply_breeds(load);
    }

    // --- patient alerts ---

    /// Alerts for selected existing patients that have none loaded yet.
    pub fn begin_alert_fetch(&mut self) -> Option<AlertTask> {
        let session = self.wizard.session();
        let pet_ids: Vec<_> = session
            .selected_pets()
            .filter(|(id, record)| {
                matches!(record, PetRecord::Existing(_)) && !session.pet_alerts.contains_key(*id)
            })
            .map(|(id, _)| id.clone())
            .collect();
        if pet_ids.is_empty() {
            return None;
        }
        Some(AlertTask {
            ticket: self.generations.issue(Channel::Alerts),
            pet_ids,
            alerts: self.services.alerts.clone(),
            timeout: self.config.fetch_timeout,
        })
    }

    /// Written per pet. A pet that already has alerts keeps them.
    pub fn apply_alerts(&mut self, load: AlertLoad) -> usize {
        let mut applied = 0;
        for (pet_id, alerts) in load.alerts {
            if self.session().pet_alerts.contains_key(&pet_id) {
                continue;
            }
            self.wizard.apply(IntakeEvent::PetAlertsLoaded { pet_id, alerts });
            applied += 1;
        }
        applied
    }

    pub async fn refresh_pet_alerts(&mut self) {
        if let Some(task) = self.begin_alert_fetch() {
            let load = task.run().await;
            self.apply_alerts(load);
        }
    }

    // --- recommended slots ---

    /// Start a recommendation if anything it depends on changed since the
    /// last one.
    pub fn begin_slot_refresh(&mut self, today: NaiveDate) -> Option<SlotTask> {
        let session = self.wizard.session();
        let key = SlotKey {
            inputs: SlotInputs::from_session(session, &self.config.practice_id),
            type_names: session.selected_type_names(),
        };
        if self.last_slot_key.as_ref() == Some(&key) {
            debug!("slot inputs unchanged, keeping current recommendation");
            return None;
        }
        let inputs = key.inputs.clone();
        self.last_slot_key = Some(key);
        Some(SlotTask {
            ticket: self.generations.issue(Channel::Slots),
            inputs,
            today,
            engine: self.engine.clone(),
        })
    }

    pub fn apply_slots(&mut self, refresh: SlotRefresh) -> bool {
        if !self.accept(&refresh.ticket) {
            return false;
        }
        self.wizard.apply(IntakeEvent::SlotsRecommended {
            slots: refresh.recommendation.slots,
        });
        true
    }

    pub async fn refresh_slots(&mut self, today: NaiveDate) {
        if let Some(task) = self.begin_slot_refresh(today) {
            let refresh = task.run().await;
            self.apply_slots(refresh);
        }
    }

    fn accept(&self, ticket: &Ticket) -> bool {
        if ticket.is_current() {
            return true;
        }
        debug!(
            channel = ?ticket.channel(),
            generation = ticket.generation(),
            "discarding stale enrichment result"
        );
        false
    }
}
