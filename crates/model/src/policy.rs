//! Policies, policy sets and their relationships.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::action::PolicyAction;
use crate::condition::PolicyCondition;
use crate::reference::{Metadata, RefOr};

/// The effect a policy yields when its condition holds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PolicyTargetEffect {
    Permit,
    Deny,
}

/// Decision-combination algorithm of a policy set.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PolicyCombinationLogic {
    DenyOverrides,
    PermitOverrides,
    DenyUnlessPermit,
    PermitUnlessDeny,
    FirstApplicable,
    OnlyOneApplicable,
}

/// Constant policies, one per possible decision.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PolicyDefault {
    Permit,
    Deny,
    NotApplicable,
    IndeterminateDenyPermit,
    IndeterminateDeny,
    IndeterminatePermit,
}

/// When an attached action runs, relative to the decision reached.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionMode {
    OnPermit,
    OnDeny,
    OnIndeterminate,
    OnNotApplicable,
}

impl ExecutionMode {
    pub const ALL: [ExecutionMode; 4] = [
        ExecutionMode::OnPermit,
        ExecutionMode::OnDeny,
        ExecutionMode::OnIndeterminate,
        ExecutionMode::OnNotApplicable,
    ];

    pub fn literal(&self) -> &'static str {
        match self {
            ExecutionMode::OnPermit => "ON_PERMIT",
            ExecutionMode::OnDeny => "ON_DENY",
            ExecutionMode::OnIndeterminate => "ON_INDETERMINATE",
            ExecutionMode::OnNotApplicable => "ON_NOT_APPLICABLE",
        }
    }

    pub fn from_literal(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.literal() == s)
    }
}

/// How a policy runs its attached actions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionExecutionStrategy {
    RunAll,
    StopOnFailure,
    UntilSuccess,
    RollbackOnFailure,
}

impl ActionExecutionStrategy {
    pub const ALL: [ActionExecutionStrategy; 4] = [
        ActionExecutionStrategy::RunAll,
        ActionExecutionStrategy::StopOnFailure,
        ActionExecutionStrategy::UntilSuccess,
        ActionExecutionStrategy::RollbackOnFailure,
    ];

    pub fn literal(&self) -> &'static str {
        match self {
            ActionExecutionStrategy::RunAll => "RUN_ALL",
            ActionExecutionStrategy::StopOnFailure => "STOP_ON_FAILURE",
            ActionExecutionStrategy::UntilSuccess => "UNTIL_SUCCESS",
            ActionExecutionStrategy::RollbackOnFailure => "ROLLBACK_ON_FAILURE",
        }
    }

    pub fn from_literal(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.literal() == s)
    }
}

// ──────────────────────────────────────────────
// Relationships
// ──────────────────────────────────────────────

/// An action attached to a policy or policy set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PolicyActionRelationship {
    pub action: RefOr<PolicyAction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraint: Option<RefOr<PolicyCondition>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_mode: Option<BTreeSet<ExecutionMode>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,
}

impl PolicyActionRelationship {
    pub fn new(action: RefOr<PolicyAction>) -> Self {
        PolicyActionRelationship {
            action,
            constraint: None,
            execution_mode: None,
            priority: None,
        }
    }
}

/// A member of a policy set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PolicyRelationship {
    pub policy: RefOr<PolicyEntity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraint: Option<RefOr<PolicyCondition>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_action: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,
}

impl PolicyRelationship {
    pub fn new(policy: RefOr<PolicyEntity>) -> Self {
        PolicyRelationship {
            policy,
            constraint: None,
            run_action: None,
            priority: None,
        }
    }
}

// ──────────────────────────────────────────────
// Policies
// ──────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Policy {
    #[serde(flatten)]
    pub metadata: Metadata,
    pub target_effect: PolicyTargetEffect,
    pub condition: RefOr<PolicyCondition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraint: Option<RefOr<PolicyCondition>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<PolicyActionRelationship>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strict_target_effect: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lenient_constraints: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_execution_strategy: Option<ActionExecutionStrategy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignore_errors: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_cache: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PolicySet {
    #[serde(flatten)]
    pub metadata: Metadata,
    pub logic: PolicyCombinationLogic,
    pub policies: Vec<PolicyRelationship>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraint: Option<RefOr<PolicyCondition>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<PolicyActionRelationship>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lenient_constraints: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_execution_strategy: Option<ActionExecutionStrategy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignore_errors: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_cache: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_child_actions: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indeterminate_on_action_fail: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strict_unless_logic: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PolicyEntity {
    Policy(Policy),
    Set(PolicySet),
    Default { value: PolicyDefault },
}

impl PolicyEntity {
    pub fn metadata(&self) -> Option<&Metadata> {
        match self {
            PolicyEntity::Policy(p) => Some(&p.metadata),
            PolicyEntity::Set(s) => Some(&s.metadata),
            PolicyEntity::Default { .. } => None,
        }
    }
}
