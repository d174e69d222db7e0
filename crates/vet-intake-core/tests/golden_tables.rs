//! Golden tables for the urgency window and preferred-doctor resolution.

use vet_intake_core::models::{Provider, Urgency};
use vet_intake_core::resolver;
use vet_intake_core::scheduling::{service_minutes, window_for, SearchWindow};

struct WindowCase {
    label: &'static str,
    expected: Option<(u32, u32)>,
}

fn window_cases() -> Vec<WindowCase> {
    vec![
        WindowCase { label: "Emergent – today", expected: None },
        WindowCase { label: "Urgent – within 24–48 hours", expected: None },
        WindowCase { label: "Soon – sometime this week", expected: Some((1, 7)) },
        WindowCase { label: "In 3–4 weeks", expected: Some((21, 15)) },
        WindowCase { label: "Flexible – within the next month", expected: Some((4, 39)) },
        WindowCase { label: "Routine – in about 3 months", expected: Some((75, 31)) },
        WindowCase { label: "Planned – in about 6 months", expected: Some((135, 31)) },
        WindowCase { label: "Future – in about 12 months", expected: Some((345, 21)) },
    ]
}

#[test]
fn test_urgency_window_table() {
    for case in window_cases() {
        let urgency = Urgency::from_label(case.label)
            .unwrap_or_else(|| panic!("unknown label {}", case.label));
        let expected = case.expected.map(|(start_offset_days, length_days)| SearchWindow {
            start_offset_days,
            length_days,
        });
        assert_eq!(window_for(Some(urgency)), expected, "window for {}", case.label);
    }
}

#[test]
fn test_every_category_has_a_row() {
    assert_eq!(window_cases().len(), Urgency::ALL.len());
}

#[test]
fn test_service_minutes_table() {
    for (pets, minutes) in [(0, 40), (1, 40), (2, 60), (3, 80), (5, 120)] {
        assert_eq!(service_minutes(pets), minutes, "{pets} pets");
    }
}

struct ResolveCase {
    id: &'static str,
    input: &'static str,
    expected_id: Option<&'static str>,
}

fn providers() -> Vec<Provider> {
    vec![
        Provider::new("7", "Jane Smith"),
        Provider::new("8", "Ann Lee"),
    ]
}

fn resolve_cases() -> Vec<ResolveCase> {
    vec![
        ResolveCase { id: "titled-exact", input: "Dr. Jane Smith", expected_id: Some("7") },
        ResolveCase { id: "bare-exact", input: "Ann Lee", expected_id: Some("8") },
        ResolveCase { id: "no-preference", input: "I have no preference", expected_id: None },
        ResolveCase { id: "no-preference-period", input: "I have no preference.", expected_id: None },
        ResolveCase { id: "first-name-only", input: "jane", expected_id: Some("7") },
        ResolveCase { id: "titled-last-name", input: "Dr. Lee", expected_id: Some("8") },
        ResolveCase { id: "longer-than-name", input: "Dr. Jane Smith DVM", expected_id: Some("7") },
        ResolveCase { id: "unknown", input: "Bob Jones", expected_id: None },
        ResolveCase { id: "blank", input: "   ", expected_id: None },
    ]
}

#[test]
fn test_provider_resolution_golden() {
    let providers = providers();
    for case in resolve_cases() {
        let resolved = resolver::resolve(case.input, &providers).map(|p| p.id.as_str());
        assert_eq!(resolved, case.expected_id, "case {}", case.id);
    }
}

#[test]
fn test_suggestion_for_typo() {
    let providers = providers();
    assert!(resolver::resolve("Jnae Smtih", &providers).is_none());
    let suggestions = resolver::suggest("Jnae Smtih", &providers);
    assert_eq!(suggestions.first().map(|p| p.id.as_str()), Some("7"));
}
