//! Postal address value object.

use serde::{Deserialize, Serialize};

/// A postal address as entered on the form or held on file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Address {
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub country: String,
}

impl Address {
    /// Names of required parts that are blank, as field suffixes.
    pub fn missing_parts(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.line1.trim().is_empty() {
            missing.push("line1");
        }
        if self.city.trim().is_empty() {
            missing.push("city");
        }
        if self.state.trim().is_empty() {
            missing.push("state");
        }
        if self.zip.trim().is_empty() {
            missing.push("zip");
        }
        missing
    }

    pub fn is_complete(&self) -> bool {
        self.missing_parts().is_empty()
    }

    /// Single-line form used as the zone-lookup and routing key.
    pub fn one_line(&self) -> String {
        let mut parts: Vec<&str> = vec![self.line1.trim()];
        if let Some(line2) = self.line2.as_deref().map(str::trim) {
            if !line2.is_empty() {
                parts.push(line2);
            }
        }
        parts.push(self.city.trim());
        let state_zip = format!("{} {}", self.state.trim(), self.zip.trim());
        let mut line = parts
            .into_iter()
            .filter(|p| !p.is_empty())
            .collect::<Vec<_>>()
            .join(", ");
        if !state_zip.trim().is_empty() {
            line.push_str(", ");
            line.push_str(state_zip.trim());
        }
        if !self.country.trim().is_empty() {
            line.push_str(", ");
            line.push_str(self.country.trim());
        }
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn portland() -> Address {
        Address {
            line1: "123 Main St".into(),
            line2: Some("Apt 4".into()),
            city: "Portland".into(),
            state: "ME".into(),
            zip: "04101".into(),
            country: "US".into(),
        }
    }

    #[test]
    fn test_one_line() {
        assert_eq!(portland().one_line(), "123 Main St, Apt 4, Portland, ME 04101, US");

        let mut no_line2 = portland();
        no_line2.line2 = Some("  ".into());
        assert_eq!(no_line2.one_line(), "123 Main St, Portland, ME 04101, US");
    }

    #[test]
    fn test_missing_parts() {
        assert!(portland().is_complete());
        let partial = Address {
            line1: "123 Main St".into(),
            ..Default::default()
        };
        assert_eq!(partial.missing_parts(), vec!["city", "state", "zip"]);
    }
}
