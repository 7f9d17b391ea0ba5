//! Loader for the flattened rule-union configuration.
//!
//! Configuration shape:
//!
//! ```json
//! {
//!   "rules": {
//!     "ms.author": [ { "kind": "MicrosoftAlias", "code": "...", ... } ]
//!   },
//!   "allowLists": {
//!     "devlangs": ["rust", "csharp"]
//!   }
//! }
//! ```
//!
//! Malformed rules are configuration errors reported here, once per rule,
//! before any file is processed. A rule carrying populated attributes that
//! belong to a different kind is accepted with a warning; the inactive
//! attributes are dropped during conversion.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::Path;

use chrono::Duration;
use serde::Deserialize;
use serde::de::{MapAccess, Visitor};
use thiserror::Error;
use tracing::warn;

use docset_model::Severity;

use super::schema::{MatchPattern, RawRule, Rule, RuleCheck, RuleEnvelope, RuleSet};
use crate::lookup::NamedAllowLists;

/// A single malformed rule in configuration. Fatal to the build.
#[derive(Debug, Error)]
pub enum RuleConfigError {
    #[error("rule for field '{field}' has no kind")]
    MissingKind { field: String },

    #[error("rule '{code}' for field '{field}': unknown kind '{kind}'")]
    UnknownKind {
        field: String,
        code: String,
        kind: String,
    },

    #[error("rule of kind '{kind}' for field '{field}' has no diagnostic code")]
    MissingCode { field: String, kind: String },

    #[error("rule '{code}' for field '{field}': unknown severity '{severity}'")]
    UnknownSeverity {
        field: String,
        code: String,
        severity: String,
    },

    #[error("rule '{code}' for field '{field}': kind '{kind}' requires attribute '{attribute}'")]
    MissingAttribute {
        field: String,
        code: String,
        kind: String,
        attribute: &'static str,
    },

    #[error("rule '{code}' for field '{field}': invalid match pattern: {source}")]
    InvalidPattern {
        field: String,
        code: String,
        #[source]
        source: regex::Error,
    },

    #[error("rule '{code}' for field '{field}': invalid time offset '{value}'")]
    InvalidOffset {
        field: String,
        code: String,
        value: String,
    },
}

/// Error loading a rule configuration file.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read rules file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse rules file: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Rule(#[from] RuleConfigError),
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RulesDocument {
    #[serde(default)]
    rules: RulesByField,
    #[serde(default)]
    allow_lists: BTreeMap<String, BTreeSet<String>>,
}

/// Rule arrays keyed by field, in document order.
///
/// Collecting into a map would re-sort the fields; evaluation order must
/// follow the order the configuration was written in, so entries are kept
/// as encountered.
#[derive(Debug, Default)]
struct RulesByField(Vec<(String, Vec<RawRule>)>);

impl<'de> Deserialize<'de> for RulesByField {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct RulesVisitor;

        impl<'de> Visitor<'de> for RulesVisitor {
            type Value = RulesByField;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of field names to rule arrays")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::new();
                while let Some(entry) = map.next_entry::<String, Vec<RawRule>>()? {
                    entries.push(entry);
                }
                Ok(RulesByField(entries))
            }
        }

        deserializer.deserialize_map(RulesVisitor)
    }
}

/// A resolved rule configuration: the rule set plus its named allow-lists.
#[derive(Debug, Default)]
pub struct RulesConfig {
    pub rule_set: RuleSet,
    pub allow_lists: NamedAllowLists,
}

/// Load and resolve a rule configuration file.
pub fn load_rules(path: &Path) -> Result<RulesConfig, LoadError> {
    let text = std::fs::read_to_string(path)?;
    parse_rules(&text)
}

/// Parse and resolve a rule configuration document.
///
/// Fields resolve in the order they appear in the document, so evaluation
/// and diagnostic ordering follow the configuration as written.
pub fn parse_rules(text: &str) -> Result<RulesConfig, LoadError> {
    let document: RulesDocument = serde_json::from_str(text)?;

    let mut rule_set = RuleSet::new();
    for (field, raw_rules) in document.rules.0 {
        let rules = raw_rules
            .into_iter()
            .map(|raw| convert(&field, raw))
            .collect::<Result<Vec<_>, _>>()?;
        rule_set.push(field, rules);
    }

    Ok(RulesConfig {
        rule_set,
        allow_lists: NamedAllowLists::new(document.allow_lists),
    })
}

/// Convert one authored rule into its resolved form.
fn convert(field: &str, raw: RawRule) -> Result<Rule, RuleConfigError> {
    let kind = raw
        .kind
        .clone()
        .ok_or_else(|| RuleConfigError::MissingKind {
            field: field.to_string(),
        })?;

    let code = raw.code.clone().ok_or_else(|| RuleConfigError::MissingCode {
        field: field.to_string(),
        kind: kind.clone(),
    })?;

    let severity = match &raw.severity {
        None => Severity::Warning,
        Some(text) => {
            Severity::parse(text).ok_or_else(|| RuleConfigError::UnknownSeverity {
                field: field.to_string(),
                code: code.clone(),
                severity: text.clone(),
            })?
        }
    };

    let check = convert_check(field, &code, &kind, &raw)?;
    warn_inactive_attributes(field, &code, &check, &raw);

    Ok(Rule {
        envelope: RuleEnvelope {
            code,
            severity,
            content_types: raw.content_types.iter().cloned().collect(),
            additional_message: raw.additional_message,
            disabled: raw.disabled,
        },
        check,
    })
}

fn convert_check(
    field: &str,
    code: &str,
    kind: &str,
    raw: &RawRule,
) -> Result<RuleCheck, RuleConfigError> {
    let require = |value: Option<String>, attribute: &'static str| {
        value.ok_or_else(|| RuleConfigError::MissingAttribute {
            field: field.to_string(),
            code: code.to_string(),
            kind: kind.to_string(),
            attribute,
        })
    };

    match kind {
        "DateFormat" => Ok(RuleCheck::DateFormat {
            format: require(raw.format.clone(), "format")?,
        }),
        "DateRange" => {
            if raw.relative_min.is_none() && raw.relative_max.is_none() {
                return Err(RuleConfigError::MissingAttribute {
                    field: field.to_string(),
                    code: code.to_string(),
                    kind: kind.to_string(),
                    attribute: "relativeMin or relativeMax",
                });
            }
            Ok(RuleCheck::DateRange {
                relative_min: parse_offset(field, code, raw.relative_min.as_deref())?,
                relative_max: parse_offset(field, code, raw.relative_max.as_deref())?,
            })
        }
        "Deprecated" => Ok(RuleCheck::Deprecated {
            replaced_by: raw.replaced_by.clone(),
        }),
        "Either" => Ok(RuleCheck::Either {
            name: require(raw.name.clone(), "name")?,
        }),
        "Precludes" => Ok(RuleCheck::Precludes {
            name: require(raw.name.clone(), "name")?,
        }),
        "Requires" => Ok(RuleCheck::Requires {
            name: require(raw.name.clone(), "name")?,
        }),
        "Kind" => {
            let multiple_values =
                raw.multiple_values
                    .ok_or_else(|| RuleConfigError::MissingAttribute {
                        field: field.to_string(),
                        code: code.to_string(),
                        kind: kind.to_string(),
                        attribute: "multipleValues",
                    })?;
            Ok(RuleCheck::Kind { multiple_values })
        }
        "List" => Ok(RuleCheck::List {
            list: require(raw.list.clone(), "list")?,
        }),
        "Match" => {
            let value = require(raw.value.clone(), "value")?;
            Ok(RuleCheck::Match {
                pattern: parse_pattern(field, code, &value)?,
            })
        }
        "MicrosoftAlias" => Ok(RuleCheck::MicrosoftAlias {
            allowed_dls: raw.allowed_dls.clone().unwrap_or_default(),
        }),
        _ => Err(RuleConfigError::UnknownKind {
            field: field.to_string(),
            code: code.to_string(),
            kind: kind.to_string(),
        }),
    }
}

/// A value wrapped in `/.../` is a regex; anything else matches verbatim.
fn parse_pattern(field: &str, code: &str, value: &str) -> Result<MatchPattern, RuleConfigError> {
    if value.len() >= 2 && value.starts_with('/') && value.ends_with('/') {
        let pattern = &value[1..value.len() - 1];
        let regex = regex::Regex::new(pattern).map_err(|source| RuleConfigError::InvalidPattern {
            field: field.to_string(),
            code: code.to_string(),
            source,
        })?;
        Ok(MatchPattern::Regex(regex))
    } else {
        Ok(MatchPattern::Literal(value.to_string()))
    }
}

/// Parse a signed `[-][d.]hh:mm[:ss]` offset into a duration.
fn parse_offset(
    field: &str,
    code: &str,
    value: Option<&str>,
) -> Result<Option<Duration>, RuleConfigError> {
    let Some(text) = value else {
        return Ok(None);
    };
    parse_offset_text(text)
        .map(Some)
        .ok_or_else(|| RuleConfigError::InvalidOffset {
            field: field.to_string(),
            code: code.to_string(),
            value: text.to_string(),
        })
}

fn parse_offset_text(text: &str) -> Option<Duration> {
    let trimmed = text.trim();
    let (negative, rest) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed),
    };

    let (days, clock) = match rest.split_once('.') {
        Some((days, clock)) => (days.parse::<i64>().ok()?, clock),
        None => (0, rest),
    };

    let parts: Vec<&str> = clock.split(':').collect();
    let (hours, minutes, seconds) = match parts.as_slice() {
        [h, m] => (h.parse::<i64>().ok()?, m.parse::<i64>().ok()?, 0),
        [h, m, s] => (
            h.parse::<i64>().ok()?,
            m.parse::<i64>().ok()?,
            s.parse::<i64>().ok()?,
        ),
        _ => return None,
    };
    if !(0..24).contains(&hours) || !(0..60).contains(&minutes) || !(0..60).contains(&seconds) {
        return None;
    }

    let total = Duration::days(days)
        + Duration::hours(hours)
        + Duration::minutes(minutes)
        + Duration::seconds(seconds);
    Some(if negative { -total } else { total })
}

/// Warn once per rule when attributes of an inactive kind carry values.
fn warn_inactive_attributes(field: &str, code: &str, check: &RuleCheck, raw: &RawRule) {
    let mut inactive: Vec<&str> = Vec::new();
    let kind = check.kind();

    if raw.format.is_some() && kind != "DateFormat" {
        inactive.push("format");
    }
    if (raw.relative_min.is_some() || raw.relative_max.is_some()) && kind != "DateRange" {
        inactive.push("relativeMin/relativeMax");
    }
    if raw.replaced_by.is_some() && kind != "Deprecated" {
        inactive.push("replacedBy");
    }
    if raw.name.is_some() && !matches!(kind, "Either" | "Precludes" | "Requires") {
        inactive.push("name");
    }
    if raw.multiple_values.is_some() && kind != "Kind" {
        inactive.push("multipleValues");
    }
    if raw.list.is_some() && kind != "List" {
        inactive.push("list");
    }
    if raw.value.is_some() && kind != "Match" {
        inactive.push("value");
    }
    if raw.allowed_dls.is_some() && kind != "MicrosoftAlias" {
        inactive.push("allowedDLs");
    }

    if !inactive.is_empty() {
        warn!(
            field,
            code,
            kind,
            attributes = inactive.join(", "),
            "rule carries attributes that do not belong to its kind; they are ignored"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_complete_document() {
        let config = parse_rules(
            r#"{
                "rules": {
                    "ms.date": [
                        {
                            "kind": "DateRange",
                            "code": "date-out-of-range",
                            "severity": "error",
                            "relativeMin": "-365.00:00",
                            "relativeMax": "30.00:00"
                        }
                    ],
                    "author": [
                        { "kind": "Requires", "code": "author-missing-owner", "name": "ms.author" }
                    ]
                },
                "allowLists": { "devlangs": ["rust", "csharp"] }
            }"#,
        )
        .expect("parse rules");

        assert_eq!(config.rule_set.field_count(), 2);
        assert_eq!(config.rule_set.rule_count(), 2);
        let fields: Vec<_> = config.rule_set.iter().map(|(field, _)| field).collect();
        assert_eq!(fields, vec!["ms.date", "author"]);
    }

    #[test]
    fn fields_resolve_in_authored_order() {
        // "zz" is written before "aa"; a sorted map would flip them.
        let config = parse_rules(
            r#"{"rules": {
                "zz": [{"kind": "Deprecated", "code": "z"}],
                "aa": [{"kind": "Deprecated", "code": "a"}],
                "mm": [{"kind": "Deprecated", "code": "m"}]
            }}"#,
        )
        .expect("parse rules");
        let fields: Vec<_> = config.rule_set.iter().map(|(field, _)| field).collect();
        assert_eq!(fields, vec!["zz", "aa", "mm"]);
    }

    #[test]
    fn unknown_kind_fails_fast() {
        let error = parse_rules(
            r#"{"rules": {"author": [{"kind": "Banana", "code": "c"}]}}"#,
        )
        .expect_err("unknown kind must fail");
        assert!(matches!(
            error,
            LoadError::Rule(RuleConfigError::UnknownKind { .. })
        ));
    }

    #[test]
    fn missing_kind_attribute_fails_fast() {
        let error = parse_rules(
            r#"{"rules": {"author": [{"kind": "Requires", "code": "c"}]}}"#,
        )
        .expect_err("missing name must fail");
        assert!(matches!(
            error,
            LoadError::Rule(RuleConfigError::MissingAttribute {
                attribute: "name",
                ..
            })
        ));
    }

    #[test]
    fn invalid_regex_fails_fast() {
        let error = parse_rules(
            r#"{"rules": {"author": [{"kind": "Match", "code": "c", "value": "/[unclosed/"}]}}"#,
        )
        .expect_err("bad regex must fail");
        assert!(matches!(
            error,
            LoadError::Rule(RuleConfigError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn cross_kind_attributes_load_with_a_warning() {
        // "format" belongs to DateFormat but the rule is Match; loader keeps
        // the rule and drops the inactive attribute.
        let config = parse_rules(
            r#"{"rules": {"author": [
                {"kind": "Match", "code": "c", "value": "x", "format": "yyyy-MM-dd"}
            ]}}"#,
        )
        .expect("rule should still load");
        assert_eq!(config.rule_set.rule_count(), 1);
    }

    #[test]
    fn offsets_parse_timespan_convention() {
        assert_eq!(
            parse_offset_text("-30.00:00:00"),
            Some(Duration::days(-30))
        );
        assert_eq!(
            parse_offset_text("1.02:30"),
            Some(Duration::days(1) + Duration::hours(2) + Duration::minutes(30))
        );
        assert_eq!(parse_offset_text("00:05:30"), Some(Duration::seconds(330)));
        assert_eq!(parse_offset_text("25:00"), None);
        assert_eq!(parse_offset_text("abc"), None);
    }

    #[test]
    fn severity_defaults_to_warning() {
        let config = parse_rules(
            r#"{"rules": {"author": [{"kind": "Deprecated", "code": "c"}]}}"#,
        )
        .expect("parse rules");
        let (_, rules) = config.rule_set.iter().next().expect("one field");
        assert_eq!(rules[0].envelope.severity, docset_model::Severity::Warning);
    }
}
