#![allow(clippy::result_large_err)]
//! peel-core: parser for PEEL, the textual policy expression language.
//!
//! Turns strings such as `*gt(#int(1), #ref(limit))` into the domain
//! objects of [`peel_model`]. Parsing is a single synchronous pass with no
//! shared state; any failure aborts the whole parse with a [`PeelError`].
//!
//! # Public API
//!
//! - [`PeelParser`] -- entry points bound to a [`ParserConfig`]
//! - [`parse_variable()`], [`parse_resolver()`], [`parse_condition()`],
//!   [`parse_action()`], [`parse_policy()`], [`parse_options()`] -- the same
//!   entry points with the default (unbounded) configuration
//! - [`PeelError`] / [`ErrorKind`] -- failure type and its broad class
//! - [`REGISTRY`] -- the keyword table driving recognition and arity

pub mod config;
mod deserialize;
pub mod error;
pub mod grammar;
pub mod options;
pub mod parser;
pub mod reference;
pub mod scanner;

// ── Convenience re-exports: key types ────────────────────────────────

pub use config::ParserConfig;
pub use error::{ErrorKind, PeelError};
pub use grammar::{Command, EntityKind, GrammarEntry, REGISTRY};
pub use options::ParsedOptions;
pub use parser::{Category, PeelParser};

// ── Convenience re-exports: entry points ─────────────────────────────

use peel_model::{PolicyAction, PolicyCondition, PolicyEntity, PolicyVariable, ValueResolver};

/// Parse a static or dynamic variable.
pub fn parse_variable(input: &str) -> Result<PolicyVariable, PeelError> {
    PeelParser::default().parse_variable(input)
}

pub fn parse_resolver(input: &str) -> Result<ValueResolver, PeelError> {
    PeelParser::default().parse_resolver(input)
}

/// Parse an atomic, composite or default condition.
pub fn parse_condition(input: &str) -> Result<PolicyCondition, PeelError> {
    PeelParser::default().parse_condition(input)
}

pub fn parse_action(input: &str) -> Result<PolicyAction, PeelError> {
    PeelParser::default().parse_action(input)
}

/// Parse a policy, policy set or default policy.
pub fn parse_policy(input: &str) -> Result<PolicyEntity, PeelError> {
    PeelParser::default().parse_policy(input)
}

/// Parse a standalone `#opts(...)` command.
pub fn parse_options(input: &str) -> Result<ParsedOptions, PeelError> {
    PeelParser::default().parse_options(input)
}
