//! Personnel sanitization: turn the model's name list into clean names.
//!
//! The model is asked for `"Name, Degree"` strings taken from the
//! attachment table. What comes back is untrusted: the signatory sneaks in,
//! role titles appear as names, entries can be numbers or `null`. Two
//! passes fix that:
//!
//! 1. **Filter** — drop non-strings, denylisted entries, and anything without
//!    a comma or too short to be a name plus a degree.
//! 2. **Strip degrees** — keep the text before the first comma.
//!
//! Order of first appearance is preserved and duplicates are kept.

use crate::config::DocumentRules;
use serde_json::Value;

/// Filter + degree-strip pass configured from [`DocumentRules`].
#[derive(Debug, Clone)]
pub struct PersonnelSanitizer {
    denylist: Vec<String>,
    min_len: usize,
}

impl PersonnelSanitizer {
    pub fn from_rules(rules: &DocumentRules) -> Self {
        Self {
            denylist: rules
                .personnel_denylist
                .iter()
                .map(|s| s.to_lowercase())
                .collect(),
            min_len: rules.min_personnel_len,
        }
    }

    /// Filter then degree-strip.
    pub fn sanitize(&self, names: &[Value]) -> Vec<String> {
        self.filter(names)
            .iter()
            .map(|name| remove_degrees(name))
            .collect()
    }

    /// Keep string entries that look like `"Name, Degree"` and are not
    /// denylisted. Survivors are trimmed.
    pub fn filter(&self, names: &[Value]) -> Vec<String> {
        names
            .iter()
            .filter_map(Value::as_str)
            .filter(|person| {
                let lower = person.trim().to_lowercase();
                !self.denylist.iter().any(|unwanted| lower.contains(unwanted))
            })
            .filter(|person| person.contains(',') && person.chars().count() > self.min_len)
            .map(|person| person.trim().to_string())
            .collect()
    }
}

impl Default for PersonnelSanitizer {
    fn default() -> Self {
        Self::from_rules(&DocumentRules::default())
    }
}

/// Drop academic and professional degrees: the trimmed text before the
/// first comma. Names without a comma come back trimmed.
///
/// ```rust
/// use spt_extract::pipeline::personnel::remove_degrees;
///
/// assert_eq!(remove_degrees("Kuswahyudi, S.Kom., M.M."), "Kuswahyudi");
/// assert_eq!(remove_degrees("Purwanto"), "Purwanto");
/// ```
pub fn remove_degrees(name: &str) -> String {
    name.split(',').next().unwrap_or(name).trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn names(v: Value) -> Vec<Value> {
        v.as_array().cloned().unwrap_or_default()
    }

    #[test]
    fn drops_signatory_roles_non_strings_and_short_entries() {
        let input = names(json!([
            "Supriadi, S.H., M.H.",
            "Agung Suryo Wibowo, S.Kom., M.T.",
            "Kepala Balai",
            123,
            "A,B"
        ]));
        let s = PersonnelSanitizer::default();
        assert_eq!(s.filter(&input), vec!["Agung Suryo Wibowo, S.Kom., M.T."]);
        assert_eq!(s.sanitize(&input), vec!["Agung Suryo Wibowo"]);
    }

    #[test]
    fn keeps_order_and_duplicates() {
        let input = names(json!([
            "Purwanto, S.E.",
            "Kuswahyudi, S.Kom., M.M.",
            "Purwanto, S.E."
        ]));
        assert_eq!(
            PersonnelSanitizer::default().sanitize(&input),
            vec!["Purwanto", "Kuswahyudi", "Purwanto"]
        );
    }

    #[test]
    fn entries_without_comma_are_dropped() {
        let input = names(json!(["Purwanto Hadi Saputra", null, {"nama": "x"}]));
        assert!(PersonnelSanitizer::default().sanitize(&input).is_empty());
    }

    #[test]
    fn denylist_is_case_insensitive_substring() {
        let input = names(json!(["Bpk. SUPRIADI, S.H.", "Plt. Kepala Seksi, S.T."]));
        assert!(PersonnelSanitizer::default().sanitize(&input).is_empty());
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        // Five characters including the comma: too short.
        let input = names(json!(["Éé, S", "Ani, S.E."]));
        assert_eq!(PersonnelSanitizer::default().sanitize(&input), vec!["Ani"]);
    }

    #[test]
    fn empty_input() {
        assert!(PersonnelSanitizer::default().sanitize(&[]).is_empty());
    }

    #[test]
    fn survivors_are_trimmed() {
        let input = names(json!(["  Dewi Lestari , S.T.  "]));
        assert_eq!(PersonnelSanitizer::default().sanitize(&input), vec!["Dewi Lestari"]);
    }

    #[test]
    fn remove_degrees_cases() {
        assert_eq!(remove_degrees("Agung Suryo Wibowo, S.Kom., M.T."), "Agung Suryo Wibowo");
        assert_eq!(remove_degrees("Purwanto"), "Purwanto");
        assert_eq!(remove_degrees(""), "");
        assert_eq!(remove_degrees(", S.T."), "");
    }

    #[test]
    fn custom_denylist() {
        let rules = DocumentRules {
            personnel_denylist: vec!["Budi Santoso".into()],
            ..DocumentRules::default()
        };
        let input = names(json!(["Budi Santoso, S.T.", "Kepala Seksi, S.T."]));
        assert_eq!(
            PersonnelSanitizer::from_rules(&rules).sanitize(&input),
            vec!["Kepala Seksi"]
        );
    }
}
