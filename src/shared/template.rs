//! Placeholder extraction and substitution for prompt text.
//!
//! Prompt content marks substitution points with `{{name}}` tokens. Names are
//! case- and whitespace-sensitive (`{{ Name }}` and `{{Name}}` are different
//! variables) and there is no escaping or nesting.

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use thiserror::Error;

lazy_static! {
    /// A `{{name}}` placeholder: a non-empty run of characters other than `}`
    /// between double braces.
    static ref PLACEHOLDER_REGEX: Regex = Regex::new(r"\{\{([^}]+)\}\}").unwrap();
}

/// Returned when placeholders remain after substitution. `missing` holds the
/// residual names, first occurrence first, without duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Missing required variables: {}", missing.join(", "))]
pub struct MissingVariables {
    pub missing: Vec<String>,
}

/// Extract the unique placeholder names from `text`, ordered by first
/// occurrence. Duplicate placeholders of the same name appear once.
pub fn extract_variables(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut names = Vec::new();
    for caps in PLACEHOLDER_REGEX.captures_iter(text) {
        let name = &caps[1];
        if seen.insert(name.to_string()) {
            names.push(name.to_string());
        }
    }
    names
}

/// Replace every `{{name}}` occurrence for each supplied variable. Names with
/// no supplied value are left intact so they can be reported as missing.
///
/// After substitution the text is re-scanned; any residual placeholder fails
/// the whole call with [`MissingVariables`]. This is the only validation gate
/// between an inbound request and the provider call.
pub fn substitute_variables(
    text: &str,
    values: &HashMap<String, String>,
) -> Result<String, MissingVariables> {
    let mut rendered = text.to_string();
    for (name, value) in values {
        let placeholder = format!("{{{{{name}}}}}");
        if rendered.contains(&placeholder) {
            rendered = rendered.replace(&placeholder, value);
        }
    }

    let missing = extract_variables(&rendered);
    if missing.is_empty() {
        Ok(rendered)
    } else {
        Err(MissingVariables { missing })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_extract_orders_by_first_occurrence() {
        let names = extract_variables("{{b}} then {{a}} then {{b}} again");
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn test_extract_is_idempotent() {
        let text = "{{x}} {{y}} {{x}}";
        assert_eq!(extract_variables(text), extract_variables(text));
    }

    #[test]
    fn test_extract_is_whitespace_sensitive() {
        let names = extract_variables("{{ Name }} vs {{Name}}");
        assert_eq!(names, vec![" Name ", "Name"]);
    }

    #[test]
    fn test_extract_ignores_unclosed_braces() {
        assert!(extract_variables("{{open but never closed").is_empty());
        assert!(extract_variables("no placeholders here").is_empty());
    }

    #[test]
    fn test_substitute_replaces_every_occurrence() {
        let result =
            substitute_variables("{{name}} and {{name}} again", &vars(&[("name", "Ada")])).unwrap();
        assert_eq!(result, "Ada and Ada again");
    }

    #[test]
    fn test_substitute_leaves_unknown_names_intact_and_fails() {
        let err = substitute_variables(
            "Hello {{name}}, your order {{id}} is {{status}}",
            &vars(&[("name", "Ada"), ("id", "42")]),
        )
        .unwrap_err();
        assert_eq!(err.missing, vec!["status"]);
    }

    #[test]
    fn test_substitute_reports_residuals_without_duplicates() {
        let err = substitute_variables("{{a}} {{b}} {{a}}", &vars(&[])).unwrap_err();
        assert_eq!(err.missing, vec!["a", "b"]);
    }

    #[test]
    fn test_substitute_full_map_succeeds() {
        let result = substitute_variables(
            "Hello {{name}}, your order {{id}} is {{status}}",
            &vars(&[("name", "Ada"), ("id", "42"), ("status", "shipped")]),
        )
        .unwrap();
        assert_eq!(result, "Hello Ada, your order 42 is shipped");
    }

    #[test]
    fn test_substitute_ignores_values_for_absent_placeholders() {
        let result = substitute_variables("plain text", &vars(&[("unused", "x")])).unwrap();
        assert_eq!(result, "plain text");
    }

    #[test]
    fn test_case_sensitive_names() {
        let err = substitute_variables("{{Name}}", &vars(&[("name", "ada")])).unwrap_err();
        assert_eq!(err.missing, vec!["Name"]);
    }
}
