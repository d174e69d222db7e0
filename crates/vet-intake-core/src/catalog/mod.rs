//! Appointment-type catalog rules and provider eligibility.
//!
//! Both are pure functions over data loaded from the practice directories:
//! - [`eligible_types`] / [`order_for_display`]: which appointment types a client may pick
//! - [`selected_type_names`] / [`eligible_providers`]: which doctors accept every picked type

mod classifier;
mod eligibility;

pub use classifier::*;
pub use eligibility::*;
