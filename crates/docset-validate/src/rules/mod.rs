//! Metadata validation rules.
//!
//! Rules are authored as a flattened union (one flat JSON object per rule,
//! every kind-specific attribute co-resident) and resolved at load time into
//! a closed sum type, so "irrelevant attribute populated" states cannot
//! survive past the loader.

mod loader;
mod schema;

pub use loader::{LoadError, RuleConfigError, RulesConfig, load_rules, parse_rules};
pub use schema::{MatchPattern, RawRule, Rule, RuleCheck, RuleEnvelope, RuleSet};
