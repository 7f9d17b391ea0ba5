//! Rule schema: authored (wire) form and resolved form.

use std::collections::BTreeSet;

use chrono::Duration;
use regex::Regex;
use serde::Deserialize;

use docset_model::{Diagnostic, Severity};

/// A rule as authored in configuration.
///
/// One flat record per rule: the attributes of every kind are co-resident and
/// only the group selected by `kind` is meaningful. The loader converts this
/// into a [`Rule`] and rejects records whose active group is incomplete.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRule {
    /// Rule kind discriminant (e.g. "DateRange").
    pub kind: Option<String>,

    /// Document types the rule applies to; empty means all.
    #[serde(default)]
    pub content_types: Vec<String>,
    /// Diagnostic severity; defaults to warning.
    pub severity: Option<String>,
    /// Stable diagnostic code.
    pub code: Option<String>,
    /// Text appended to the generated message.
    pub additional_message: Option<String>,
    /// Disabled rules are never evaluated.
    #[serde(default)]
    pub disabled: bool,

    // DateFormat
    pub format: Option<String>,

    // DateRange, offsets in `[-][d.]hh:mm[:ss]` form
    pub relative_min: Option<String>,
    pub relative_max: Option<String>,

    // Deprecated
    pub replaced_by: Option<String>,

    // Either, Precludes, Requires
    pub name: Option<String>,

    // Kind
    pub multiple_values: Option<bool>,

    // List
    pub list: Option<String>,

    // Match
    pub value: Option<String>,

    // MicrosoftAlias
    #[serde(rename = "allowedDLs")]
    pub allowed_dls: Option<Vec<String>>,
}

/// Attributes common to every rule kind.
#[derive(Debug, Clone)]
pub struct RuleEnvelope {
    /// Stable diagnostic code.
    pub code: String,
    /// Severity of diagnostics emitted by this rule.
    pub severity: Severity,
    /// Document types the rule applies to; empty means all.
    pub content_types: BTreeSet<String>,
    /// Text appended to every generated message.
    pub additional_message: Option<String>,
    /// Disabled rules are never evaluated.
    pub disabled: bool,
}

impl RuleEnvelope {
    /// Whether the rule applies to a document of the given content type.
    pub fn applies_to(&self, content_type: &str) -> bool {
        self.content_types.is_empty() || self.content_types.contains(content_type)
    }

    /// Build the diagnostic for a predicate failure.
    pub fn diagnostic(&self, field: &str, message: String) -> Diagnostic {
        let message = match &self.additional_message {
            Some(extra) => format!("{message} {extra}"),
            None => message,
        };
        Diagnostic::new(&self.code, self.severity, field, message)
    }
}

/// Literal or pattern matching for the `Match` kind.
///
/// A configured value wrapped in `/.../` compiles to a regex at load time;
/// anything else is compared verbatim.
#[derive(Debug, Clone)]
pub enum MatchPattern {
    Literal(String),
    Regex(Regex),
}

impl MatchPattern {
    pub fn matches(&self, value: &str) -> bool {
        match self {
            Self::Literal(expected) => value == expected,
            Self::Regex(regex) => regex.is_match(value),
        }
    }

    /// The expectation as written in configuration, for messages.
    pub fn describe(&self) -> String {
        match self {
            Self::Literal(expected) => format!("'{expected}'"),
            Self::Regex(regex) => format!("pattern '/{}/'", regex.as_str()),
        }
    }
}

/// Kind-specific rule payload. One variant per rule kind, each carrying only
/// its own attributes, so dispatch is an exhaustive match.
#[derive(Debug, Clone)]
pub enum RuleCheck {
    /// Value must parse under the given chrono date format.
    DateFormat { format: String },
    /// Value must be a date within `build_time + min ..= build_time + max`.
    DateRange {
        relative_min: Option<Duration>,
        relative_max: Option<Duration>,
    },
    /// Presence of the field at all is deprecated usage.
    Deprecated { replaced_by: Option<String> },
    /// Fails iff both this field and `name` are absent.
    Either { name: String },
    /// Fails iff both this field and `name` are present.
    Precludes { name: String },
    /// Fails iff this field is present and `name` is absent.
    Requires { name: String },
    /// Value cardinality must agree: sequence when true, scalar when false.
    Kind { multiple_values: bool },
    /// Every element of the value must be in the named allow-list.
    List { list: String },
    /// Value must satisfy the literal or pattern.
    Match { pattern: MatchPattern },
    /// Alias value must be owned by one of the allowed distribution lists.
    MicrosoftAlias { allowed_dls: Vec<String> },
}

impl RuleCheck {
    /// The configuration discriminant for this kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::DateFormat { .. } => "DateFormat",
            Self::DateRange { .. } => "DateRange",
            Self::Deprecated { .. } => "Deprecated",
            Self::Either { .. } => "Either",
            Self::Precludes { .. } => "Precludes",
            Self::Requires { .. } => "Requires",
            Self::Kind { .. } => "Kind",
            Self::List { .. } => "List",
            Self::Match { .. } => "Match",
            Self::MicrosoftAlias { .. } => "MicrosoftAlias",
        }
    }
}

/// A fully resolved rule: shared envelope plus kind-specific payload.
#[derive(Debug, Clone)]
pub struct Rule {
    pub envelope: RuleEnvelope,
    pub check: RuleCheck,
}

/// Field name to ordered rules for that field.
///
/// Built once per build session, immutable afterwards, shared read-only
/// across all concurrent evaluations. Fields iterate in configuration order
/// so diagnostic ordering is deterministic across builds.
#[derive(Debug, Default)]
pub struct RuleSet {
    entries: Vec<(String, Vec<Rule>)>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the rule sequence for a field, preserving rule order.
    pub fn push(&mut self, field: impl Into<String>, rules: Vec<Rule>) {
        self.entries.push((field.into(), rules));
    }

    /// Iterate fields in the order the loader resolved them.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Rule])> {
        self.entries
            .iter()
            .map(|(field, rules)| (field.as_str(), rules.as_slice()))
    }

    /// Number of fields with at least one rule.
    pub fn field_count(&self) -> usize {
        self.entries.len()
    }

    /// Total number of rules across all fields.
    pub fn rule_count(&self) -> usize {
        self.entries.iter().map(|(_, rules)| rules.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_applies_to_all_when_unscoped() {
        let envelope = RuleEnvelope {
            code: "c".to_string(),
            severity: Severity::Warning,
            content_types: BTreeSet::new(),
            additional_message: None,
            disabled: false,
        };
        assert!(envelope.applies_to("conceptual"));
    }

    #[test]
    fn envelope_appends_additional_message() {
        let envelope = RuleEnvelope {
            code: "c".to_string(),
            severity: Severity::Error,
            content_types: BTreeSet::new(),
            additional_message: Some("See the metadata guide.".to_string()),
            disabled: false,
        };
        let diagnostic = envelope.diagnostic("author", "Bad value.".to_string());
        assert_eq!(diagnostic.message, "Bad value. See the metadata guide.");
    }

    #[test]
    fn match_pattern_literal_is_exact() {
        let pattern = MatchPattern::Literal("en-us".to_string());
        assert!(pattern.matches("en-us"));
        assert!(!pattern.matches("en-US"));
    }
}
