//! Rule engine: evaluates a rule set against one page's raw metadata.
//!
//! The engine holds no mutable state; one instance is shared across all
//! concurrent per-file evaluations. `build_time` is captured once per build
//! session so `DateRange` rules are deterministic within a build.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;

use docset_model::{Diagnostic, RawMetadata};

use crate::lookup::{AliasDirectory, AllowListResolver};
use crate::rules::{RuleCheck, RuleSet};

/// Evaluates rules against metadata, producing diagnostics.
pub struct RuleEngine {
    build_time: DateTime<Utc>,
    allow_lists: Arc<dyn AllowListResolver>,
    directory: Arc<dyn AliasDirectory>,
}

impl RuleEngine {
    pub fn new(
        build_time: DateTime<Utc>,
        allow_lists: Arc<dyn AllowListResolver>,
        directory: Arc<dyn AliasDirectory>,
    ) -> Self {
        Self {
            build_time,
            allow_lists,
            directory,
        }
    }

    /// Evaluate every applicable rule against the metadata.
    ///
    /// A missing field is a valid input to every predicate: most kinds pass
    /// vacuously on absence, while `Either` and `Requires` explicitly test
    /// it. Disabled rules and rules scoped to other content types are
    /// skipped before dispatch.
    pub fn evaluate(&self, rule_set: &RuleSet, metadata: &RawMetadata) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        for (field, rules) in rule_set.iter() {
            let value = metadata.get(field);
            for rule in rules {
                if rule.envelope.disabled || !rule.envelope.applies_to(&metadata.content_type) {
                    continue;
                }
                if let Some(message) = self.check(field, value, &rule.check, metadata) {
                    diagnostics.push(rule.envelope.diagnostic(field, message));
                }
            }
        }
        diagnostics
    }

    /// Run one predicate. Returns the failure message, or `None` on success.
    fn check(
        &self,
        field: &str,
        value: Option<&Value>,
        check: &RuleCheck,
        metadata: &RawMetadata,
    ) -> Option<String> {
        match check {
            RuleCheck::DateFormat { format } => check_date_format(field, value?, format),
            RuleCheck::DateRange {
                relative_min,
                relative_max,
            } => self.check_date_range(field, value?, *relative_min, *relative_max),
            RuleCheck::Deprecated { replaced_by } => {
                value?;
                Some(match replaced_by {
                    Some(successor) => {
                        format!("Field '{field}' is deprecated, use '{successor}' instead.")
                    }
                    None => format!("Field '{field}' is deprecated."),
                })
            }
            RuleCheck::Either { name } => {
                if value.is_none() && metadata.get(name).is_none() {
                    Some(format!("One of '{field}' or '{name}' must be present."))
                } else {
                    None
                }
            }
            RuleCheck::Precludes { name } => {
                if value.is_some() && metadata.get(name).is_some() {
                    Some(format!(
                        "Fields '{field}' and '{name}' cannot both be present."
                    ))
                } else {
                    None
                }
            }
            RuleCheck::Requires { name } => {
                if value.is_some() && metadata.get(name).is_none() {
                    Some(format!("Field '{field}' requires '{name}' to be present."))
                } else {
                    None
                }
            }
            RuleCheck::Kind { multiple_values } => check_kind(field, value?, *multiple_values),
            RuleCheck::List { list } => self.check_list(field, value?, list),
            RuleCheck::Match { pattern } => {
                // A non-scalar value can never equal or match the expectation.
                let Some(text) = scalar_text(value?) else {
                    return Some(format!("Value of '{field}' must be a scalar."));
                };
                if pattern.matches(&text) {
                    None
                } else {
                    Some(format!(
                        "Value '{text}' of '{field}' does not match the expected {}.",
                        pattern.describe()
                    ))
                }
            }
            RuleCheck::MicrosoftAlias { allowed_dls } => {
                self.check_alias(field, value?, allowed_dls)
            }
        }
    }

    fn check_date_range(
        &self,
        field: &str,
        value: &Value,
        relative_min: Option<chrono::Duration>,
        relative_max: Option<chrono::Duration>,
    ) -> Option<String> {
        let Some(text) = scalar_text(value) else {
            return Some(format!("Value of '{field}' is not a valid date."));
        };
        let Some(date) = parse_date(&text) else {
            return Some(format!("Value '{text}' of '{field}' is not a valid date."));
        };

        if let Some(min) = relative_min
            && date < self.build_time + min
        {
            return Some(format!(
                "Value '{text}' of '{field}' is out of the allowed date range."
            ));
        }
        if let Some(max) = relative_max
            && date > self.build_time + max
        {
            return Some(format!(
                "Value '{text}' of '{field}' is out of the allowed date range."
            ));
        }
        None
    }

    fn check_list(&self, field: &str, value: &Value, list: &str) -> Option<String> {
        let Some(allowed) = self.allow_lists.resolve(list) else {
            // Lookup failure is still a diagnostic, not a panic.
            return Some(format!("Allow list '{list}' for field '{field}' is not defined."));
        };

        for element in elements(value) {
            let Some(text) = scalar_text(element) else {
                return Some(format!(
                    "Value of '{field}' must contain only scalar entries."
                ));
            };
            if !allowed.contains(&text) {
                return Some(format!(
                    "Value '{text}' of '{field}' is not in the allowed list '{list}'."
                ));
            }
        }
        None
    }

    fn check_alias(&self, field: &str, value: &Value, allowed_dls: &[String]) -> Option<String> {
        let Some(alias) = scalar_text(value) else {
            return Some(format!("Value of '{field}' must be an alias string."));
        };
        let Some(owner) = self.directory.owning_list(&alias) else {
            return Some(format!("Value '{alias}' of '{field}' is not a known alias."));
        };
        // Empty scope means any resolvable alias is acceptable.
        if allowed_dls.is_empty() || allowed_dls.iter().any(|dl| dl == &owner) {
            None
        } else {
            Some(format!(
                "Alias '{alias}' of '{field}' is not owned by an allowed distribution list."
            ))
        }
    }
}

fn check_date_format(field: &str, value: &Value, format: &str) -> Option<String> {
    let Some(text) = scalar_text(value) else {
        return Some(format!("Value of '{field}' must be a date string."));
    };
    let parses = NaiveDateTime::parse_from_str(&text, format).is_ok()
        || NaiveDate::parse_from_str(&text, format).is_ok();
    if parses {
        None
    } else {
        Some(format!(
            "Value '{text}' of '{field}' does not match the expected date format '{format}'."
        ))
    }
}

fn check_kind(field: &str, value: &Value, multiple_values: bool) -> Option<String> {
    if multiple_values {
        match value {
            Value::Array(_) => None,
            _ => Some(format!("Field '{field}' must contain multiple values.")),
        }
    } else {
        // A single-element sequence still carries one value.
        match value {
            Value::Array(items) if items.len() >= 2 => {
                Some(format!("Field '{field}' must contain a single value."))
            }
            _ => None,
        }
    }
}

/// A scalar value is treated as a singleton sequence.
fn elements(value: &Value) -> impl Iterator<Item = &Value> {
    match value {
        Value::Array(items) => items.iter(),
        other => std::slice::from_ref(other).iter(),
    }
}

/// Text form of a scalar value; `None` for arrays, objects, and null.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Array(_) | Value::Object(_) | Value::Null => None,
    }
}

/// Parse a metadata date value: RFC 3339 first, then a plain `YYYY-MM-DD`.
fn parse_date(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(date) = DateTime::parse_from_rfc3339(text) {
        return Some(date.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_text_covers_json_scalars() {
        assert_eq!(scalar_text(&Value::from("a")), Some("a".to_string()));
        assert_eq!(scalar_text(&Value::from(3)), Some("3".to_string()));
        assert_eq!(scalar_text(&Value::from(true)), Some("true".to_string()));
        assert_eq!(scalar_text(&Value::Null), None);
        assert_eq!(scalar_text(&serde_json::json!([1])), None);
    }

    #[test]
    fn dates_parse_both_supported_shapes() {
        assert!(parse_date("2026-08-01").is_some());
        assert!(parse_date("2026-08-01T12:30:00Z").is_some());
        assert!(parse_date("08/01/2026").is_none());
    }
}
