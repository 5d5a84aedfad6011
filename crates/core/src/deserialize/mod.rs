//! Conversion of parsed command arguments into domain objects.
//!
//! One function per entity kind. Each receives the grammar row and the
//! finished [`CommandArgs`], checks the shape it needs and builds the object.
//! Option values are copied through as-is; absent options stay `None`.

use peel_model::{PolicyCondition, PolicyEntity, PolicyVariable, RefOr, Reference};

use crate::error::PeelError;
use crate::grammar::{EntityKind, GrammarEntry};
use crate::parser::{CommandArgs, Node};

mod action;
mod condition;
mod literal;
mod policy;
mod variable;

pub(crate) fn dispatch(entry: &'static GrammarEntry, args: CommandArgs) -> Result<Node, PeelError> {
    let node = match entry.kind {
        EntityKind::VariableStatic => {
            Node::Variable(PolicyVariable::Static(variable::static_variable(entry, args)?))
        }
        EntityKind::VariableDynamic => {
            Node::Variable(PolicyVariable::Dynamic(variable::dynamic_variable(entry, args)?))
        }
        EntityKind::ValueResolver => Node::Resolver(variable::resolver(entry, args)?),
        EntityKind::ConditionAtomic => {
            Node::Condition(PolicyCondition::Atomic(condition::atomic(entry, args)?))
        }
        EntityKind::ConditionComposite => {
            Node::Condition(PolicyCondition::Composite(condition::composite(entry, args)?))
        }
        EntityKind::ConditionDefault => Node::Condition(condition::default(entry, args)?),
        EntityKind::Policy => Node::Policy(PolicyEntity::Policy(policy::policy(entry, args)?)),
        EntityKind::PolicySet => Node::Policy(PolicyEntity::Set(policy::policy_set(entry, args)?)),
        EntityKind::PolicyDefault => Node::Policy(policy::default(entry, args)?),
        EntityKind::PolicyAction => Node::Action(action::action(entry, args)?),
        EntityKind::ActionRelationship => {
            Node::ActionRelationship(action::relationship(entry, args)?)
        }
        EntityKind::PolicyRelationship => {
            Node::PolicyRelationship(policy::relationship(entry, args)?)
        }
        EntityKind::Reference | EntityKind::Options | EntityKind::Constraint => {
            return Err(PeelError::shape(
                entry.keyword,
                format!("command '{}' cannot stand on its own", entry.keyword),
            ))
        }
    };
    Ok(node)
}

/// Unwrap `*constraint(...)` into its single condition or condition reference.
pub(crate) fn constraint(
    entry: &'static GrammarEntry,
    mut args: CommandArgs,
) -> Result<RefOr<PolicyCondition>, PeelError> {
    reject_contents(entry, &args)?;
    reject_constraint(entry, &args)?;
    let node = single_child(entry, &mut args)?;
    condition_arg(entry, node)
}

// ──────────────────────────────────────────────
// Shape checks shared by the deserializers
// ──────────────────────────────────────────────

fn reject_contents(entry: &GrammarEntry, args: &CommandArgs) -> Result<(), PeelError> {
    match args.contents.first() {
        Some(text) => Err(PeelError::shape(
            entry.keyword,
            format!(
                "command '{}' does not accept content arguments, got '{}'",
                entry.keyword, text
            ),
        )),
        None => Ok(()),
    }
}

fn reject_children(entry: &GrammarEntry, args: &CommandArgs) -> Result<(), PeelError> {
    match args.children.first() {
        Some(node) => Err(PeelError::shape(
            entry.keyword,
            format!(
                "command '{}' does not accept child commands, got {}",
                entry.keyword,
                node.describe()
            ),
        )),
        None => Ok(()),
    }
}

fn reject_constraint(entry: &GrammarEntry, args: &CommandArgs) -> Result<(), PeelError> {
    if args.constraint.is_some() {
        return Err(PeelError::shape(
            entry.keyword,
            format!("Constraint is not supported for command '{}'", entry.keyword),
        ));
    }
    Ok(())
}

/// The one content token of a leaf command.
fn single_content(entry: &GrammarEntry, args: &mut CommandArgs) -> Result<String, PeelError> {
    if args.contents.len() != 1 {
        return Err(PeelError::shape(
            entry.keyword,
            format!(
                "command '{}' requires exactly one content argument, got {}",
                entry.keyword,
                args.contents.len()
            ),
        ));
    }
    Ok(args.contents.remove(0))
}

fn single_child(entry: &GrammarEntry, args: &mut CommandArgs) -> Result<Node, PeelError> {
    if args.children.len() != 1 {
        return Err(PeelError::shape(
            entry.keyword,
            format!(
                "command '{}' requires exactly one child command, got {}",
                entry.keyword,
                args.children.len()
            ),
        ));
    }
    Ok(args.children.remove(0))
}

fn wrong_child(entry: &GrammarEntry, wanted: &str, node: &Node) -> PeelError {
    PeelError::shape(
        entry.keyword,
        format!(
            "command '{}' expects {} but got {}",
            entry.keyword,
            wanted,
            node.describe()
        ),
    )
}

fn variable_arg(entry: &GrammarEntry, node: Node) -> Result<RefOr<PolicyVariable>, PeelError> {
    match node {
        Node::Variable(v) => Ok(RefOr::Value(v)),
        Node::Reference(Reference::Variable(r)) => Ok(RefOr::Ref(r)),
        other => Err(wrong_child(entry, "a variable or variable reference", &other)),
    }
}

fn condition_arg(entry: &GrammarEntry, node: Node) -> Result<RefOr<PolicyCondition>, PeelError> {
    match node {
        Node::Condition(c) => Ok(RefOr::Value(c)),
        Node::Reference(Reference::Condition(r)) => Ok(RefOr::Ref(r)),
        other => Err(wrong_child(entry, "a condition or condition reference", &other)),
    }
}
