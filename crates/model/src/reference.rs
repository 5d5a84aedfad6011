//! Identity metadata and catalog references.

use semver::Version;
use serde::{Deserialize, Serialize};

/// Identity metadata carried by every named entity.
///
/// All fields are optional; an entity without an id can only be used inline.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Metadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<Version>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
}

impl Metadata {
    pub fn is_empty(&self) -> bool {
        self.id.is_none()
            && self.version.is_none()
            && self.description.is_none()
            && self.labels.is_none()
    }
}

/// An opaque pointer to a separately defined entity.
///
/// Resolved by the catalog at evaluation time. A missing version means
/// "latest".
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EntityRef {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<Version>,
}

impl EntityRef {
    pub fn new(id: impl Into<String>, version: Option<Version>) -> Self {
        EntityRef {
            id: id.into(),
            version,
        }
    }
}

/// A reference tagged with the kind of entity it points at.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "refType", rename_all = "snake_case")]
pub enum Reference {
    Variable(EntityRef),
    Resolver(EntityRef),
    Condition(EntityRef),
    Policy(EntityRef),
    Action(EntityRef),
}

impl Reference {
    pub fn target(&self) -> &EntityRef {
        match self {
            Reference::Variable(r)
            | Reference::Resolver(r)
            | Reference::Condition(r)
            | Reference::Policy(r)
            | Reference::Action(r) => r,
        }
    }

    /// Human-readable name of the referenced kind, for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Reference::Variable(_) => "variable reference",
            Reference::Resolver(_) => "resolver reference",
            Reference::Condition(_) => "condition reference",
            Reference::Policy(_) => "policy reference",
            Reference::Action(_) => "action reference",
        }
    }
}

/// A slot holding either an inline entity or a reference to one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum RefOr<T> {
    Value(T),
    Ref(EntityRef),
}

impl<T> RefOr<T> {
    pub fn as_value(&self) -> Option<&T> {
        match self {
            RefOr::Value(v) => Some(v),
            RefOr::Ref(_) => None,
        }
    }

    pub fn as_reference(&self) -> Option<&EntityRef> {
        match self {
            RefOr::Value(_) => None,
            RefOr::Ref(r) => Some(r),
        }
    }
}
