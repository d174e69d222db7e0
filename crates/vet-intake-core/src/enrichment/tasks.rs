//! Detached enrichment requests.
//!
//! A task owns its inputs, its collaborator handle and its [`Ticket`], so it
//! can run without borrowing the orchestrator. The orchestrator applies the
//! finished result only if the ticket is still current.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use futures::future::join_all;
use tracing::{debug, warn};

use super::generation::Ticket;
use crate::models::{AppointmentTypeDef, Coordinates, PetId, Provider, ZoneStatus};
use crate::scheduling::{SlotRecommendation, SlotInputs, SlotRecommendationEngine};
use crate::services::{
    with_timeout, AppointmentTypeDirectory, AppointmentTypeQuery, ClientDirectory, EmailCheck,
    PatientAlerts, ProviderDirectory, ServiceError, SpeciesBreeds, SpeciesCatalog, ZoneLookup,
};

/// Zone lookup for the meeting address, debounced.
pub struct ZoneTask {
    pub(crate) ticket: Ticket,
    pub(crate) address: String,
    pub(crate) zones: Arc<dyn ZoneLookup>,
    pub(crate) debounce: Duration,
    pub(crate) timeout: Duration,
}

/// Finished zone lookup. `status` is `None` when the request was superseded
/// during the debounce or failed.
pub struct ZoneCheck {
    pub ticket: Ticket,
    pub address: String,
    pub status: Option<ZoneStatus>,
}

impl ZoneTask {
    pub fn ticket(&self) -> &Ticket {
        &self.ticket
    }

    pub async fn run(self) -> ZoneCheck {
        tokio::time::sleep(self.debounce).await;
        if !self.ticket.is_current() {
            debug!(address = %self.address, "address edited again, skipping zone lookup");
            return ZoneCheck {
                ticket: self.ticket,
                address: self.address,
                status: None,
            };
        }

        let status = match with_timeout(self.timeout, self.zones.find_zone_by_address(&self.address)).await {
            Ok(zone) => Some(ZoneStatus::Serviced {
                zone_id: zone.zone_id,
                coordinates: zone.lat.zip(zone.lon).map(|(lat, lon)| Coordinates { lat, lon }),
            }),
            Err(ServiceError::NotFound { .. }) => Some(ZoneStatus::NotServiced),
            Err(e) => {
                warn!(error = %e, "zone lookup failed");
                None
            }
        };
        ZoneCheck {
            ticket: self.ticket,
            address: self.address,
            status,
        }
    }
}

/// Which provider directory to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directory {
    Employees,
    Public,
}

pub struct ProviderTask {
    pub(crate) ticket: Ticket,
    pub(crate) directory: Directory,
    pub(crate) practice_id: String,
    pub(crate) providers: Arc<dyn ProviderDirectory>,
    pub(crate) timeout: Duration,
}

pub struct ProviderLoad {
    pub ticket: Ticket,
    pub providers: Vec<Provider>,
}

impl ProviderTask {
    pub async fn run(self) -> ProviderLoad {
        let call = async {
            match self.directory {
                Directory::Employees => self.providers.fetch_employees(&self.practice_id).await,
                Directory::Public => self.providers.fetch_public_providers(&self.practice_id).await,
            }
        };
        let providers = match with_timeout(self.timeout, call).await {
            Ok(raw) => raw.into_iter().map(Provider::from).collect(),
            Err(e) => {
                warn!(error = %e, directory = ?self.directory, "provider directory unavailable");
                Vec::new()
            }
        };
        ProviderLoad {
            ticket: self.ticket,
            providers,
        }
    }
}

pub struct AppointmentTypeTask {
    pub(crate) ticket: Ticket,
    pub(crate) query: AppointmentTypeQuery,
    pub(crate) directory: Arc<dyn AppointmentTypeDirectory>,
    pub(crate) timeout: Duration,
}

pub struct AppointmentTypeLoad {
    pub ticket: Ticket,
    pub appointment_types: Vec<AppointmentTypeDef>,
}

impl AppointmentTypeTask {
    pub async fn run(self) -> AppointmentTypeLoad {
        let appointment_types =
            match with_timeout(self.timeout, self.directory.fetch_appointment_types(&self.query)).await {
                Ok(raw) => raw.into_iter().map(AppointmentTypeDef::from).collect(),
                Err(e) => {
                    warn!(error = %e, "appointment types unavailable");
                    Vec::new()
                }
            };
        AppointmentTypeLoad {
            ticket: self.ticket,
            appointment_types,
        }
    }
}

pub struct BreedTask {
    pub(crate) ticket: Ticket,
    pub(crate) practice_id: String,
    pub(crate) species_id: Option<String>,
    pub(crate) catalog: Arc<dyn SpeciesCatalog>,
    pub(crate) timeout: Duration,
}

pub struct BreedLoad {
    pub ticket: Ticket,
    pub species_id: Option<String>,
    pub species: Vec<SpeciesBreeds>,
}

impl BreedTask {
    pub async fn run(self) -> BreedLoad {
        let call = self
            .catalog
            .species_breeds(&self.practice_id, self.species_id.as_deref());
        let species = match with_timeout(self.timeout, call).await {
            Ok(species) => species,
            Err(e) => {
                warn!(error = %e, species_id = ?self.species_id, "species/breed reference unavailable");
                Vec::new()
            }
        };
        BreedLoad {
            ticket: self.ticket,
            species_id: self.species_id,
            species,
        }
    }
}

pub struct EmailTask {
    pub(crate) ticket: Ticket,
    pub(crate) email: String,
    pub(crate) practice_id: String,
    pub(crate) clients: Arc<dyn ClientDirectory>,
    pub(crate) timeout: Duration,
}

pub struct EmailLookupResult {
    pub ticket: Ticket,
    pub check: Option<EmailCheck>,
}

impl EmailTask {
    pub async fn run(self) -> EmailLookupResult {
        let check = match with_timeout(
            self.timeout,
            self.clients.check_email(&self.email, &self.practice_id),
        )
        .await
        {
            Ok(check) => Some(check),
            Err(e) => {
                warn!(error = %e, "email pre-lookup failed");
                None
            }
        };
        EmailLookupResult {
            ticket: self.ticket,
            check,
        }
    }
}

/// Alert fetch for several existing patients at once.
pub struct AlertTask {
    pub(crate) ticket: Ticket,
    pub(crate) pet_ids: Vec<PetId>,
    pub(crate) alerts: Arc<dyn PatientAlerts>,
    pub(crate) timeout: Duration,
}

pub struct AlertLoad {
    pub ticket: Ticket,
    pub alerts: Vec<(PetId, Vec<String>)>,
}

impl AlertTask {
    /// Fetch every pet's alerts in parallel; each pet fails independently.
    pub async fn run(self) -> AlertLoad {
        let service = &self.alerts;
        let timeout = self.timeout;
        let fetches = self.pet_ids.iter().map(|pet_id| async move {
            let alerts = match with_timeout(timeout, service.alerts_for(pet_id)).await {
                Ok(alerts) => alerts,
                Err(e) => {
                    warn!(error = %e, pet_id = %pet_id, "patient alerts unavailable");
                    Vec::new()
                }
            };
            (pet_id.clone(), alerts)
        });
        let alerts = join_all(fetches).await;
        AlertLoad {
            ticket: self.ticket,
            alerts,
        }
    }
}

pub struct SlotTask {
    pub(crate) ticket: Ticket,
    pub(crate) inputs: SlotInputs,
    pub(crate) today: NaiveDate,
    pub(crate) engine: Arc<SlotRecommendationEngine>,
}

pub struct SlotRefresh {
    pub ticket: Ticket,
    pub recommendation: SlotRecommendation,
}

impl SlotTask {
    pub fn inputs(&self) -> &SlotInputs {
        &self.inputs
    }

    pub async fn run(self) -> SlotRefresh {
        let recommendation = self.engine.recommend(&self.inputs, self.today).await;
        SlotRefresh {
            ticket: self.ticket,
            recommendation,
        }
    }
}
