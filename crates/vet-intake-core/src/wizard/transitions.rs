//! Forward and backward page tables.
//!
//! Back-edges are an explicit table, not a history stack: the wizard can be
//! entered past `Intro` (signed-in clients), so forward history and the
//! predecessor a page should offer can differ.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{IntakeSession, Page, ServiceArea, YesNo};

/// Navigation that has no defined target.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NavigationError {
    #[error("{0} has no previous page")]
    NoPrevious(Page),

    #[error("previous page of {0} is undetermined: no service area was chosen")]
    UndeterminedPredecessor(Page),

    #[error("no service area chosen")]
    MissingServiceArea,

    #[error("the request has already been submitted")]
    Finished,
}

/// Where "next" leads.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Step {
    Page(Page),
    /// The current page is final; "next" submits the request
    Submit,
}

fn service_area_page(area: ServiceArea) -> Page {
    match area {
        ServiceArea::Portland => Page::EuthanasiaPortland,
        ServiceArea::HighPeaks => Page::EuthanasiaHighPeaks,
    }
}

/// Forward target of the current page.
pub fn next(session: &IntakeSession) -> Result<Step, NavigationError> {
    let target = match session.current_page {
        Page::Intro if session.authenticated || session.is_existing_client() => Page::ExistingClient,
        Page::Intro => Page::NewClient,
        Page::NewClient => Page::NewClientPetInfo,
        Page::NewClientPetInfo => Page::RequestVisitContinued,
        Page::ExistingClient => Page::ExistingClientPets,
        Page::ExistingClientPets => {
            if session.looking_for_euthanasia == Some(YesNo::Yes) {
                Page::EuthanasiaIntro
            } else {
                Page::RequestVisitContinued
            }
        }
        Page::EuthanasiaIntro => Page::EuthanasiaServiceArea,
        Page::EuthanasiaServiceArea => session
            .service_area
            .map(service_area_page)
            .ok_or(NavigationError::MissingServiceArea)?,
        Page::EuthanasiaPortland | Page::EuthanasiaHighPeaks => Page::EuthanasiaContinued,
        Page::EuthanasiaContinued | Page::RequestVisitContinued => return Ok(Step::Submit),
        Page::Success => return Err(NavigationError::Finished),
    };
    Ok(Step::Page(target))
}

/// Backward target of the current page.
pub fn back(session: &IntakeSession) -> Result<Page, NavigationError> {
    let page = session.current_page;
    let existing = session.is_existing_client();
    match page {
        Page::Intro | Page::Success => Err(NavigationError::NoPrevious(page)),
        // Signed-in clients never see Intro
        Page::ExistingClient if session.authenticated => Err(NavigationError::NoPrevious(page)),
        Page::ExistingClient | Page::NewClient => Ok(Page::Intro),
        Page::NewClientPetInfo => Ok(Page::NewClient),
        Page::ExistingClientPets => Ok(Page::ExistingClient),
        Page::EuthanasiaIntro if existing => Ok(Page::ExistingClientPets),
        Page::EuthanasiaIntro => Ok(Page::NewClient),
        Page::EuthanasiaServiceArea => Ok(Page::EuthanasiaIntro),
        Page::EuthanasiaPortland | Page::EuthanasiaHighPeaks => Ok(Page::EuthanasiaServiceArea),
        Page::EuthanasiaContinued => session
            .service_area
            .map(service_area_page)
            .ok_or(NavigationError::UndeterminedPredecessor(page)),
        Page::RequestVisitContinued if existing => Ok(Page::ExistingClientPets),
        Page::RequestVisitContinued => Ok(Page::NewClientPetInfo),
    }
}
