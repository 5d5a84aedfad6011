//! Conditions: the boolean tests a policy applies.

use serde::{Deserialize, Serialize};

use crate::reference::{Metadata, RefOr};
use crate::variable::PolicyVariable;

/// Operation performed by an atomic condition.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationType {
    GreaterThan,
    GreaterThanEqual,
    LessThan,
    LessThanEqual,
    IsNull,
    IsNotNull,
    IsEmpty,
    IsNotEmpty,
    IsBlank,
    IsNotBlank,
    StartsWith,
    EndsWith,
    Contains,
    IsIn,
    Equals,
    IsPositive,
    IsNegative,
    IsZero,
    IsPastDate,
    IsFutureDate,
    RegexpMatch,
    HasKey,
    IsUnique,
    SchemaMatch,
}

impl OperationType {
    /// Number of variable arguments the operation compares.
    pub fn arity(&self) -> usize {
        match self {
            OperationType::IsNull
            | OperationType::IsNotNull
            | OperationType::IsEmpty
            | OperationType::IsNotEmpty
            | OperationType::IsBlank
            | OperationType::IsNotBlank
            | OperationType::IsPositive
            | OperationType::IsNegative
            | OperationType::IsZero
            | OperationType::IsPastDate
            | OperationType::IsFutureDate
            | OperationType::IsUnique => 1,
            OperationType::GreaterThan
            | OperationType::GreaterThanEqual
            | OperationType::LessThan
            | OperationType::LessThanEqual
            | OperationType::StartsWith
            | OperationType::EndsWith
            | OperationType::Contains
            | OperationType::IsIn
            | OperationType::Equals
            | OperationType::RegexpMatch
            | OperationType::HasKey
            | OperationType::SchemaMatch => 2,
        }
    }
}

/// How a composite condition combines its children.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConditionCombinationLogic {
    And,
    Or,
    Not,
    NOf,
}

/// Constant conditions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PolicyConditionDefault {
    True,
    False,
    /// Always evaluates to "no result".
    Null,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PolicyConditionAtomic {
    #[serde(flatten)]
    pub metadata: Metadata,
    pub operation: OperationType,
    /// Arguments in authoring order; "first greater than second" is positional.
    pub args: Vec<RefOr<PolicyVariable>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub negate_result: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub string_ignore_case: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields_strict_check: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub array_order_strict_check: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PolicyConditionComposite {
    #[serde(flatten)]
    pub metadata: Metadata,
    pub logic: ConditionCombinationLogic,
    pub conditions: Vec<RefOr<PolicyCondition>>,
    /// Required for `NOf`, ignored otherwise.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_conditions: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optimize: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub negate_result: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strict_check: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PolicyCondition {
    Atomic(PolicyConditionAtomic),
    Composite(PolicyConditionComposite),
    Default { value: PolicyConditionDefault },
}

impl PolicyCondition {
    pub fn metadata(&self) -> Option<&Metadata> {
        match self {
            PolicyCondition::Atomic(c) => Some(&c.metadata),
            PolicyCondition::Composite(c) => Some(&c.metadata),
            PolicyCondition::Default { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_condition_document_form() {
        let c = PolicyCondition::Default {
            value: PolicyConditionDefault::Null,
        };
        let json = serde_json::to_value(&c).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "default", "value": "NULL"}));
        assert!(c.metadata().is_none());
    }

    #[test]
    fn unary_and_binary_operations() {
        assert_eq!(OperationType::IsBlank.arity(), 1);
        assert_eq!(OperationType::SchemaMatch.arity(), 2);
    }
}
