//! Appointment-type eligibility and display ordering.

use crate::models::AppointmentTypeDef;

/// Types a client may choose: shown on the intake form and, for new
/// patients, open to new patients.
pub fn eligible_types(catalog: &[AppointmentTypeDef], is_new_patient: bool) -> Vec<AppointmentTypeDef> {
    catalog
        .iter()
        .filter(|t| t.show_in_intake_form)
        .filter(|t| !is_new_patient || t.new_patient_allowed)
        .cloned()
        .collect()
}

/// Move the euthanasia type to the end, keeping everything else in order.
pub fn order_for_display(mut types: Vec<AppointmentTypeDef>) -> Vec<AppointmentTypeDef> {
    // sort_by_key is stable
    types.sort_by_key(AppointmentTypeDef::is_euthanasia);
    types
}

/// Eligible types in display order.
pub fn intake_options(catalog: &[AppointmentTypeDef], is_new_patient: bool) -> Vec<AppointmentTypeDef> {
    order_for_display(eligible_types(catalog, is_new_patient))
}
