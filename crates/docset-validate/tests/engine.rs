//! Rule engine behavior tests.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use proptest::proptest;
use serde_json::{Value, json};

use docset_model::{Diagnostic, RawMetadata, Severity};
use docset_validate::{NamedAllowLists, RuleEngine, StaticAliasDirectory, parse_rules};

const BUILD_TIME: &str = "2026-08-29T00:00:00Z";

fn build_time() -> DateTime<Utc> {
    BUILD_TIME.parse().expect("valid build time")
}

fn engine() -> RuleEngine {
    let mut allow_lists = NamedAllowLists::default();
    allow_lists.insert("devlangs", ["rust".to_string(), "csharp".to_string()]);
    let mut directory = StaticAliasDirectory::new();
    directory.insert("docsteam", "docs-dl");
    directory.insert("writers", "writers-dl");
    RuleEngine::new(build_time(), Arc::new(allow_lists), Arc::new(directory))
}

fn metadata(fields: Value) -> RawMetadata {
    let Value::Object(fields) = fields else {
        panic!("metadata fixture must be an object");
    };
    RawMetadata::new(fields, "conceptual")
}

/// Evaluate a rules document against metadata fields.
fn eval(rules: &str, fields: Value) -> Vec<Diagnostic> {
    let config = parse_rules(rules).expect("valid rules fixture");
    engine().evaluate(&config.rule_set, &metadata(fields))
}

#[test]
fn disabled_rules_never_produce_diagnostics() {
    let rules = r#"{"rules": {"old.field": [
        {"kind": "Deprecated", "code": "deprecated-field", "disabled": true}
    ]}}"#;
    assert!(eval(rules, json!({"old.field": "still here"})).is_empty());
}

#[test]
fn content_type_scoping_skips_other_documents() {
    let rules = r#"{"rules": {"author": [
        {"kind": "Deprecated", "code": "c", "contentTypes": ["reference"]}
    ]}}"#;
    // Fixture metadata is tagged "conceptual", not "reference".
    assert!(eval(rules, json!({"author": "x"})).is_empty());

    let scoped = r#"{"rules": {"author": [
        {"kind": "Deprecated", "code": "c", "contentTypes": ["conceptual"]}
    ]}}"#;
    assert_eq!(eval(scoped, json!({"author": "x"})).len(), 1);
}

#[test]
fn either_truth_table() {
    let rules = r#"{"rules": {"a": [{"kind": "Either", "code": "c", "name": "b"}]}}"#;
    assert_eq!(eval(rules, json!({})).len(), 1);
    assert!(eval(rules, json!({"a": 1})).is_empty());
    assert!(eval(rules, json!({"b": 1})).is_empty());
    assert!(eval(rules, json!({"a": 1, "b": 1})).is_empty());
}

#[test]
fn precludes_truth_table() {
    let rules = r#"{"rules": {"a": [{"kind": "Precludes", "code": "c", "name": "b"}]}}"#;
    assert_eq!(eval(rules, json!({"a": 1, "b": 1})).len(), 1);
    assert!(eval(rules, json!({})).is_empty());
    assert!(eval(rules, json!({"a": 1})).is_empty());
    assert!(eval(rules, json!({"b": 1})).is_empty());
}

#[test]
fn requires_truth_table() {
    let rules = r#"{"rules": {"a": [{"kind": "Requires", "code": "c", "name": "b"}]}}"#;
    assert_eq!(eval(rules, json!({"a": 1})).len(), 1);
    assert!(eval(rules, json!({})).is_empty());
    assert!(eval(rules, json!({"b": 1})).is_empty());
    assert!(eval(rules, json!({"a": 1, "b": 1})).is_empty());
}

proptest! {
    #[test]
    fn cross_field_kinds_agree_with_their_predicates(a_present: bool, b_present: bool) {
        let mut fields = serde_json::Map::new();
        if a_present {
            fields.insert("a".to_string(), json!("x"));
        }
        if b_present {
            fields.insert("b".to_string(), json!("y"));
        }
        let fields = Value::Object(fields);

        let either = r#"{"rules": {"a": [{"kind": "Either", "code": "c", "name": "b"}]}}"#;
        let precludes = r#"{"rules": {"a": [{"kind": "Precludes", "code": "c", "name": "b"}]}}"#;
        let requires = r#"{"rules": {"a": [{"kind": "Requires", "code": "c", "name": "b"}]}}"#;

        assert_eq!(!eval(either, fields.clone()).is_empty(), !a_present && !b_present);
        assert_eq!(!eval(precludes, fields.clone()).is_empty(), a_present && b_present);
        assert_eq!(!eval(requires, fields).is_empty(), a_present && !b_present);
    }
}

#[test]
fn date_range_boundary() {
    // Window: build_time - 30d ..= unbounded.
    let rules = r#"{"rules": {"ms.date": [
        {"kind": "DateRange", "code": "date-out-of-range", "severity": "error",
         "relativeMin": "-30.00:00:00"}
    ]}}"#;

    // Exactly at build_time + relativeMin passes.
    assert!(eval(rules, json!({"ms.date": "2026-07-30T00:00:00Z"})).is_empty());
    // One second earlier fails.
    assert_eq!(
        eval(rules, json!({"ms.date": "2026-07-29T23:59:59Z"})).len(),
        1
    );
    // The unbounded side never fails.
    assert!(eval(rules, json!({"ms.date": "2030-01-01"})).is_empty());
}

#[test]
fn date_range_rejects_unparsable_dates() {
    let rules = r#"{"rules": {"ms.date": [
        {"kind": "DateRange", "code": "c", "relativeMax": "0.00:00"}
    ]}}"#;
    assert_eq!(eval(rules, json!({"ms.date": "next tuesday"})).len(), 1);
}

#[test]
fn date_format_checks_the_pattern() {
    let rules = r#"{"rules": {"ms.date": [
        {"kind": "DateFormat", "code": "invalid-date-format", "format": "%Y-%m-%d"}
    ]}}"#;
    assert!(eval(rules, json!({"ms.date": "2026-08-29"})).is_empty());
    assert_eq!(eval(rules, json!({"ms.date": "08/29/2026"})).len(), 1);
    assert_eq!(eval(rules, json!({"ms.date": ["2026-08-29"]})).len(), 1);
}

#[test]
fn kind_cardinality_boundary() {
    let single = r#"{"rules": {"author": [
        {"kind": "Kind", "code": "c", "multipleValues": false}
    ]}}"#;
    // A single scalar or a single-element sequence both pass.
    assert!(eval(single, json!({"author": "one"})).is_empty());
    assert!(eval(single, json!({"author": ["one"]})).is_empty());
    assert_eq!(eval(single, json!({"author": ["one", "two"]})).len(), 1);

    let multiple = r#"{"rules": {"author": [
        {"kind": "Kind", "code": "c", "multipleValues": true}
    ]}}"#;
    assert!(eval(multiple, json!({"author": ["one"]})).is_empty());
    assert_eq!(eval(multiple, json!({"author": "one"})).len(), 1);
}

#[test]
fn list_treats_scalar_as_singleton() {
    let rules = r#"{"rules": {"dev_langs": [
        {"kind": "List", "code": "invalid-devlang", "list": "devlangs"}
    ]}}"#;
    assert!(eval(rules, json!({"dev_langs": "rust"})).is_empty());
    assert!(eval(rules, json!({"dev_langs": ["rust", "csharp"]})).is_empty());
    assert_eq!(eval(rules, json!({"dev_langs": ["rust", "cobol"]})).len(), 1);
}

#[test]
fn unknown_allow_list_is_a_diagnostic() {
    let rules = r#"{"rules": {"dev_langs": [
        {"kind": "List", "code": "c", "list": "no-such-list"}
    ]}}"#;
    let diagnostics = eval(rules, json!({"dev_langs": "rust"}));
    assert_eq!(diagnostics.len(), 1);
    assert!(diagnostics[0].message.contains("no-such-list"));
}

#[test]
fn match_literal_and_pattern_modes() {
    let literal = r#"{"rules": {"locale": [
        {"kind": "Match", "code": "c", "value": "en-us"}
    ]}}"#;
    assert!(eval(literal, json!({"locale": "en-us"})).is_empty());
    assert_eq!(eval(literal, json!({"locale": "en-gb"})).len(), 1);

    let pattern = r#"{"rules": {"locale": [
        {"kind": "Match", "code": "c", "value": "/^[a-z]{2}-[a-z]{2}$/"}
    ]}}"#;
    assert!(eval(pattern, json!({"locale": "fr-fr"})).is_empty());
    assert_eq!(eval(pattern, json!({"locale": "french"})).len(), 1);
}

#[test]
fn match_rejects_non_scalar_values() {
    let rules = r#"{"rules": {"locale": [
        {"kind": "Match", "code": "c", "value": "en-us"}
    ]}}"#;
    // An array can never equal the literal, so it fails rather than passing
    // vacuously.
    assert_eq!(eval(rules, json!({"locale": ["en-us", "en-gb"]})).len(), 1);
    assert_eq!(eval(rules, json!({"locale": {"lang": "en-us"}})).len(), 1);
    assert_eq!(eval(rules, json!({"locale": null})).len(), 1);
}

#[test]
fn alias_resolution_and_scoping() {
    let scoped = r#"{"rules": {"ms.author": [
        {"kind": "MicrosoftAlias", "code": "invalid-alias", "allowedDLs": ["docs-dl"]}
    ]}}"#;
    assert!(eval(scoped, json!({"ms.author": "docsteam"})).is_empty());
    // Resolvable but owned by a different distribution list.
    assert_eq!(eval(scoped, json!({"ms.author": "writers"})).len(), 1);
    // Not resolvable at all.
    assert_eq!(eval(scoped, json!({"ms.author": "nobody"})).len(), 1);

    let unscoped = r#"{"rules": {"ms.author": [
        {"kind": "MicrosoftAlias", "code": "invalid-alias"}
    ]}}"#;
    assert!(eval(unscoped, json!({"ms.author": "writers"})).is_empty());
}

#[test]
fn deprecated_message_names_the_successor() {
    let rules = r#"{"rules": {"ms.topic_old": [
        {"kind": "Deprecated", "code": "deprecated-field", "replacedBy": "ms.topic"}
    ]}}"#;
    let diagnostics = eval(rules, json!({"ms.topic_old": "how-to"}));
    assert_eq!(diagnostics.len(), 1);
    assert!(diagnostics[0].message.contains("ms.topic"));
}

#[test]
fn absent_fields_pass_vacuously() {
    let rules = r#"{"rules": {"ms.date": [
        {"kind": "DateFormat", "code": "a", "format": "%Y-%m-%d"},
        {"kind": "DateRange", "code": "b", "relativeMax": "0.00:00"},
        {"kind": "Deprecated", "code": "c"},
        {"kind": "Kind", "code": "d", "multipleValues": false},
        {"kind": "List", "code": "e", "list": "devlangs"},
        {"kind": "Match", "code": "f", "value": "x"},
        {"kind": "MicrosoftAlias", "code": "g"}
    ]}}"#;
    assert!(eval(rules, json!({})).is_empty());
}

#[test]
fn additional_message_is_appended() {
    let rules = r#"{"rules": {"author": [
        {"kind": "Requires", "code": "c", "name": "ms.author",
         "additionalMessage": "Add ms.author with the owner's alias."}
    ]}}"#;
    let diagnostics = eval(rules, json!({"author": "Jo"}));
    assert_eq!(diagnostics.len(), 1);
    assert!(
        diagnostics[0]
            .message
            .ends_with("Add ms.author with the owner's alias.")
    );
}

#[test]
fn severity_comes_from_the_rule() {
    let rules = r#"{"rules": {"author": [
        {"kind": "Deprecated", "code": "c", "severity": "suggestion"}
    ]}}"#;
    let diagnostics = eval(rules, json!({"author": "Jo"}));
    assert_eq!(diagnostics[0].severity, Severity::Suggestion);
}

#[test]
fn evaluation_is_idempotent() {
    let rules = r#"{"rules": {
        "a": [{"kind": "Requires", "code": "r", "name": "b"}],
        "ms.date": [{"kind": "DateFormat", "code": "d", "format": "%Y-%m-%d"}]
    }}"#;
    let config = parse_rules(rules).expect("valid rules fixture");
    let engine = engine();
    let raw = metadata(json!({"a": 1, "ms.date": "bad"}));

    let first = engine.evaluate(&config.rule_set, &raw);
    let second = engine.evaluate(&config.rule_set, &raw);
    assert_eq!(first, second);
    assert_eq!(first.len(), 2);
}
