use peel_model::{
    Policy, PolicyCombinationLogic, PolicyDefault, PolicyEntity, PolicyRelationship, PolicySet,
    PolicyTargetEffect, RefOr, Reference,
};

use super::{reject_constraint, reject_contents, single_child, wrong_child};
use crate::error::PeelError;
use crate::grammar::{Command, GrammarEntry};
use crate::parser::{CommandArgs, Node};

pub(super) fn policy(entry: &'static GrammarEntry, args: CommandArgs) -> Result<Policy, PeelError> {
    reject_contents(entry, &args)?;
    let target_effect = match entry.command {
        Command::Permit => PolicyTargetEffect::Permit,
        Command::Deny => PolicyTargetEffect::Deny,
        _ => {
            return Err(PeelError::shape(
                entry.keyword,
                format!("command '{}' is not a policy", entry.keyword),
            ))
        }
    };

    let mut conditions = Vec::new();
    let mut actions = Vec::new();
    for node in args.children {
        match node {
            Node::Condition(c) => conditions.push(RefOr::Value(c)),
            Node::Reference(Reference::Condition(r)) => conditions.push(RefOr::Ref(r)),
            Node::ActionRelationship(a) => actions.push(a),
            other => {
                return Err(wrong_child(
                    entry,
                    "a condition, condition reference or action relationship",
                    &other,
                ))
            }
        }
    }
    if conditions.len() != 1 {
        return Err(PeelError::shape(
            entry.keyword,
            format!(
                "command '{}' requires exactly one condition, got {}",
                entry.keyword,
                conditions.len()
            ),
        ));
    }
    let condition = conditions.remove(0);

    let opts = args.options.unwrap_or_default();
    Ok(Policy {
        metadata: opts.metadata(),
        target_effect,
        condition,
        constraint: args.constraint,
        actions,
        strict_target_effect: opts.strict_target_effect,
        lenient_constraints: opts.lenient_constraints,
        action_execution_strategy: opts.action_execution_strategy,
        ignore_errors: opts.ignore_errors,
        skip_cache: opts.skip_cache,
    })
}

/// Bare policies and policy references become relationships without
/// constraint or options; explicit `*pol(...)` children are kept as written.
pub(super) fn policy_set(
    entry: &'static GrammarEntry,
    args: CommandArgs,
) -> Result<PolicySet, PeelError> {
    reject_contents(entry, &args)?;
    let logic = match entry.command {
        Command::DenyOverrides => PolicyCombinationLogic::DenyOverrides,
        Command::PermitOverrides => PolicyCombinationLogic::PermitOverrides,
        Command::DenyUnlessPermit => PolicyCombinationLogic::DenyUnlessPermit,
        Command::PermitUnlessDeny => PolicyCombinationLogic::PermitUnlessDeny,
        Command::FirstApplicable => PolicyCombinationLogic::FirstApplicable,
        Command::OnlyOneApplicable => PolicyCombinationLogic::OnlyOneApplicable,
        _ => {
            return Err(PeelError::shape(
                entry.keyword,
                format!("command '{}' is not a policy set", entry.keyword),
            ))
        }
    };

    let mut policies = Vec::new();
    let mut actions = Vec::new();
    for node in args.children {
        match node {
            Node::Policy(p) => policies.push(PolicyRelationship::new(RefOr::Value(p))),
            Node::Reference(Reference::Policy(r)) => {
                policies.push(PolicyRelationship::new(RefOr::Ref(r)))
            }
            Node::PolicyRelationship(rel) => policies.push(rel),
            Node::ActionRelationship(a) => actions.push(a),
            other => {
                return Err(wrong_child(
                    entry,
                    "a policy, policy reference, policy relationship or action relationship",
                    &other,
                ))
            }
        }
    }
    if policies.is_empty() {
        return Err(PeelError::shape(
            entry.keyword,
            format!("command '{}' requires at least one policy", entry.keyword),
        ));
    }

    let opts = args.options.unwrap_or_default();
    Ok(PolicySet {
        metadata: opts.metadata(),
        logic,
        policies,
        constraint: args.constraint,
        actions,
        lenient_constraints: opts.lenient_constraints,
        action_execution_strategy: opts.action_execution_strategy,
        ignore_errors: opts.ignore_errors,
        skip_cache: opts.skip_cache,
        run_child_actions: opts.run_child_actions,
        indeterminate_on_action_fail: opts.indeterminate_on_action_fail,
        strict_unless_logic: opts.strict_unless_logic,
    })
}

pub(super) fn default(
    entry: &'static GrammarEntry,
    args: CommandArgs,
) -> Result<PolicyEntity, PeelError> {
    reject_contents(entry, &args)?;
    reject_constraint(entry, &args)?;
    let value = match entry.command {
        Command::DefaultPermit => PolicyDefault::Permit,
        Command::DefaultDeny => PolicyDefault::Deny,
        Command::NotApplicable => PolicyDefault::NotApplicable,
        Command::IndeterminateDenyPermit => PolicyDefault::IndeterminateDenyPermit,
        Command::IndeterminateDeny => PolicyDefault::IndeterminateDeny,
        Command::IndeterminatePermit => PolicyDefault::IndeterminatePermit,
        _ => {
            return Err(PeelError::shape(
                entry.keyword,
                format!("command '{}' is not a default policy", entry.keyword),
            ))
        }
    };
    Ok(PolicyEntity::Default { value })
}

/// `*pol(...)`: one policy or policy reference plus relationship options.
pub(super) fn relationship(
    entry: &'static GrammarEntry,
    mut args: CommandArgs,
) -> Result<PolicyRelationship, PeelError> {
    reject_contents(entry, &args)?;
    let policy = match single_child(entry, &mut args)? {
        Node::Policy(p) => RefOr::Value(p),
        Node::Reference(Reference::Policy(r)) => RefOr::Ref(r),
        other => return Err(wrong_child(entry, "a policy or policy reference", &other)),
    };

    let opts = args.options.unwrap_or_default();
    Ok(PolicyRelationship {
        policy,
        constraint: args.constraint,
        run_action: opts.run_action,
        priority: opts.priority,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::PeelParser;
    use peel_model::{ActionExecutionStrategy, PolicyCondition};

    fn parse(src: &str) -> PolicyEntity {
        PeelParser::default().parse_policy(src).unwrap()
    }

    #[test]
    fn policy_with_condition_actions_and_options() {
        let PolicyEntity::Policy(p) = parse(
            "*permit(#opts(id=p1, strictTargetEffect, actionExecutionStrategy=STOP_ON_FAILURE), \
             *act(*clear(k1)), *gt(#int(2), #int(1)), *act(#ref(a2)))",
        ) else {
            panic!("expected policy");
        };
        assert_eq!(p.target_effect, PolicyTargetEffect::Permit);
        assert!(matches!(
            p.condition,
            RefOr::Value(PolicyCondition::Atomic(_))
        ));
        assert_eq!(p.actions.len(), 2);
        assert!(p.actions[0].action.as_value().is_some());
        assert_eq!(
            p.actions[1].action.as_reference().map(|r| r.id.as_str()),
            Some("a2")
        );
        assert_eq!(p.strict_target_effect, Some(true));
        assert_eq!(
            p.action_execution_strategy,
            Some(ActionExecutionStrategy::StopOnFailure)
        );
        assert_eq!(p.ignore_errors, None);
    }

    #[test]
    fn policy_condition_may_be_a_reference() {
        let PolicyEntity::Policy(p) = parse("*deny(#ref(cond1, 2.0.0))") else {
            panic!("expected policy");
        };
        assert_eq!(p.target_effect, PolicyTargetEffect::Deny);
        assert_eq!(p.condition.as_reference().map(|r| r.id.as_str()), Some("cond1"));
    }

    #[test]
    fn policy_needs_exactly_one_condition() {
        let parser = PeelParser::default();
        let err = parser.parse_policy("*permit(#true(), #false())").unwrap_err();
        assert_eq!(
            err.to_string(),
            "command '*permit' requires exactly one condition, got 2"
        );
        let err = parser.parse_policy("*permit(*act(#ref(a)))").unwrap_err();
        assert_eq!(
            err.to_string(),
            "command '*permit' requires exactly one condition, got 0"
        );
    }

    #[test]
    fn policy_set_wraps_bare_children() {
        let PolicyEntity::Set(set) = parse(
            "*DOverrides(#opts(runChildActions), *permit(#true()), #ref(p2), \
             *pol(#opts(priority=3, runAction=false), #deny()), *act(*clear(k)), #NA())",
        ) else {
            panic!("expected policy set");
        };
        assert_eq!(set.logic, PolicyCombinationLogic::DenyOverrides);
        assert_eq!(set.policies.len(), 4);
        assert!(matches!(
            set.policies[0].policy,
            RefOr::Value(PolicyEntity::Policy(_))
        ));
        assert_eq!(set.policies[0].priority, None);
        assert_eq!(
            set.policies[1].policy.as_reference().map(|r| r.id.as_str()),
            Some("p2")
        );
        assert_eq!(set.policies[2].priority, Some(3));
        assert_eq!(set.policies[2].run_action, Some(false));
        assert_eq!(
            set.policies[3].policy,
            RefOr::Value(PolicyEntity::Default {
                value: PolicyDefault::NotApplicable
            })
        );
        assert_eq!(set.actions.len(), 1);
        assert_eq!(set.run_child_actions, Some(true));
    }

    #[test]
    fn nested_policy_sets() {
        let PolicyEntity::Set(set) = parse(
            "*firstAppl(*constraint(#true()), *onlyOneAppl(#permit()), *PUnlessD(#deny()))",
        ) else {
            panic!("expected policy set");
        };
        assert_eq!(set.logic, PolicyCombinationLogic::FirstApplicable);
        assert!(set.constraint.is_some());
        assert!(matches!(
            &set.policies[0].policy,
            RefOr::Value(PolicyEntity::Set(s)) if s.logic == PolicyCombinationLogic::OnlyOneApplicable
        ));
    }

    #[test]
    fn policy_set_needs_a_policy() {
        let err = PeelParser::default()
            .parse_policy("*DUnlessP(*act(*clear(k)))")
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "command '*DUnlessP' requires at least one policy"
        );
    }

    #[test]
    fn every_default_policy_keyword() {
        for (src, value) in [
            ("#permit()", PolicyDefault::Permit),
            ("#deny()", PolicyDefault::Deny),
            ("#NA()", PolicyDefault::NotApplicable),
            ("#indDP()", PolicyDefault::IndeterminateDenyPermit),
            ("#indD()", PolicyDefault::IndeterminateDeny),
            ("#indP()", PolicyDefault::IndeterminatePermit),
        ] {
            assert_eq!(parse(src), PolicyEntity::Default { value }, "{}", src);
        }
    }

    #[test]
    fn policy_relationship_constraint() {
        let PolicyEntity::Set(set) =
            parse("*POverrides(*pol(*constraint(#ref(c)), #ref(p1, 1.0.0)))")
        else {
            panic!("expected policy set");
        };
        let rel = &set.policies[0];
        assert_eq!(rel.policy.as_reference().map(|r| r.id.as_str()), Some("p1"));
        assert_eq!(
            rel.constraint.as_ref().and_then(|c| c.as_reference()).map(|r| r.id.as_str()),
            Some("c")
        );
    }
}
