//! Provider eligibility against the appointment types picked across pets.

use std::collections::BTreeSet;

use crate::models::{IntakeSession, Provider};

/// Union of the internal type names chosen for selected pets.
pub fn selected_type_names(session: &IntakeSession) -> BTreeSet<String> {
    session.selected_type_names()
}

/// Providers accepting every selected type. An empty selection passes all.
pub fn eligible_providers(providers: &[Provider], selected: &BTreeSet<String>) -> Vec<Provider> {
    providers
        .iter()
        .filter(|p| p.accepts_all(selected))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewPet, PetIntake, PetRecord};
    use proptest::prelude::*;

    fn providers() -> Vec<Provider> {
        vec![
            Provider::new("1", "Jane Smith").accepting(["Wellness", "Sick", "Recheck", "Euthanasia"]),
            Provider::new("2", "Ann Lee").accepting(["Wellness", "Sick", "Recheck"]),
            Provider::new("3", "Bo Park").accepting(["Wellness"]),
        ]
    }

    fn set(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn ids(providers: &[Provider]) -> Vec<&str> {
        providers.iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn test_empty_selection_passes_all() {
        assert_eq!(ids(&eligible_providers(&providers(), &BTreeSet::new())), vec!["1", "2", "3"]);
    }

    #[test]
    fn test_conjunctive_filter() {
        let picked = set(&["Wellness", "Sick", "Recheck", "Euthanasia"]);
        assert_eq!(ids(&eligible_providers(&providers(), &picked)), vec!["1"]);

        let picked = set(&["Wellness", "Sick"]);
        assert_eq!(ids(&eligible_providers(&providers(), &picked)), vec!["1", "2"]);
    }

    #[test]
    fn test_selected_type_names_union() {
        let mut session = IntakeSession::new(false);
        for (id, kind) in [("a", Some("Wellness")), ("b", Some("Sick")), ("c", Some("Wellness")), ("d", None)] {
            session.selected_pet_ids.push(id.to_string());
            session
                .pet_records
                .insert(id.to_string(), PetRecord::New(NewPet::named(id)));
            session.pet_intake.insert(
                id.to_string(),
                PetIntake {
                    appointment_type: kind.map(str::to_string),
                    ..Default::default()
                },
            );
        }

        assert_eq!(selected_type_names(&session), set(&["Sick", "Wellness"]));
    }

    fn type_set() -> impl Strategy<Value = BTreeSet<String>> {
        prop::collection::btree_set(
            prop::sample::select(vec!["Wellness", "Sick", "Recheck", "Euthanasia", "Vaccines"])
                .prop_map(str::to_string),
            0..5,
        )
    }

    proptest! {
        #[test]
        fn prop_eligible_iff_selection_is_subset(
            accepted in prop::collection::vec(type_set(), 0..8),
            selected in type_set(),
        ) {
            let providers: Vec<Provider> = accepted
                .iter()
                .enumerate()
                .map(|(i, types)| Provider::new(i.to_string(), format!("Dr {i}")).accepting(types.clone()))
                .collect();

            let eligible = eligible_providers(&providers, &selected);
            for provider in &providers {
                let included = eligible.iter().any(|p| p.id == provider.id);
                prop_assert_eq!(included, selected.is_subset(&provider.accepted_appointment_types));
            }

            let everyone = eligible_providers(&providers, &BTreeSet::new());
            prop_assert_eq!(everyone.len(), providers.len());
        }
    }
}
