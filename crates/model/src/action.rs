//! Policy actions: context mutations run after a decision.

use serde::{Deserialize, Serialize};

use crate::reference::{Metadata, RefOr};
use crate::variable::PolicyVariable;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PolicyActionKind {
    /// Store `value` under the action key.
    Save {
        value: RefOr<PolicyVariable>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        fail_on_existing_key: Option<bool>,
    },
    /// Remove the action key.
    Clear {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        fail_on_missing_key: Option<bool>,
    },
    /// Apply a JSON patch document to `source` and store the result.
    JsonPatch {
        source: RefOr<PolicyVariable>,
        patch: RefOr<PolicyVariable>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        cast_null_source_to_array: Option<bool>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        fail_on_missing_key: Option<bool>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        fail_on_null_source: Option<bool>,
    },
    /// Merge `merge` into `source` and store the result.
    JsonMerge {
        source: RefOr<PolicyVariable>,
        merge: RefOr<PolicyVariable>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        fail_on_missing_key: Option<bool>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        fail_on_existing_key: Option<bool>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        fail_on_null_source: Option<bool>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        fail_on_null_merge: Option<bool>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PolicyAction {
    #[serde(flatten)]
    pub metadata: Metadata,
    pub key: String,
    #[serde(flatten)]
    pub kind: PolicyActionKind,
}
