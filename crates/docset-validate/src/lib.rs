//! Rule-based metadata validation.
//!
//! This crate evaluates a resolved rule set against a page's raw front-matter
//! metadata:
//!
//! - **Rules** (`rules`): rule schema, flattened-union loader, rule set
//! - **Engine** (`engine`): per-field rule evaluation producing diagnostics
//! - **Lookup** (`lookup`): allow-list and alias-directory collaborators
//! - **Stage** (`stage`): validation plus typed-metadata coercion
//!
//! Rule configuration problems surface as [`RuleConfigError`] before the
//! first file is processed; everything after that is a [`Diagnostic`]
//! reported through the shared sink, never an error return.
//!
//! [`Diagnostic`]: docset_model::Diagnostic

pub mod engine;
pub mod lookup;
pub mod rules;
pub mod stage;

pub use engine::RuleEngine;
pub use lookup::{AliasDirectory, AllowListResolver, NamedAllowLists, StaticAliasDirectory};
pub use rules::{
    LoadError, MatchPattern, RawRule, Rule, RuleCheck, RuleConfigError, RuleEnvelope, RuleSet,
    RulesConfig, load_rules, parse_rules,
};
pub use stage::{INVALID_METADATA_TYPE, MetadataValidator};
