//! peel-model: typed domain objects for the policy engine.
//!
//! These are the values the evaluator walks. They can be produced either by
//! the PEEL text parser (`peel-core`) or by deserializing the persisted
//! document form with serde; both paths must yield identical values.
//!
//! - [`PolicyVariable`] / [`ValueResolver`] -- values and how to resolve them
//! - [`PolicyCondition`] -- atomic, composite and constant conditions
//! - [`PolicyEntity`] -- policies, policy sets and constant policies
//! - [`PolicyAction`] -- side effects run after a decision
//! - [`EntityRef`] / [`Reference`] / [`RefOr`] -- catalog references

pub mod action;
pub mod condition;
pub mod policy;
pub mod reference;
pub mod variable;

pub use action::*;
pub use condition::*;
pub use policy::*;
pub use reference::*;
pub use variable::*;

pub use semver::Version;
