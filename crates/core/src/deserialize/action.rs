use peel_model::{PolicyAction, PolicyActionKind, PolicyActionRelationship, RefOr, Reference};

use super::{reject_constraint, reject_contents, single_child, variable_arg, wrong_child};
use crate::error::PeelError;
use crate::grammar::{Command, GrammarEntry};
use crate::parser::{CommandArgs, Node};

/// `*save`, `*clear`, `*patch` and `*merge`.
///
/// The first content is the context key; the remaining arguments are
/// variables in the order the action consumes them.
pub(super) fn action(
    entry: &'static GrammarEntry,
    args: CommandArgs,
) -> Result<PolicyAction, PeelError> {
    reject_constraint(entry, &args)?;
    let mut contents = args.contents.into_iter();
    let key = contents.next().ok_or_else(|| {
        PeelError::shape(
            entry.keyword,
            format!("command '{}' requires a key as its first content argument", entry.keyword),
        )
    })?;
    if let Some(extra) = contents.next() {
        return Err(PeelError::shape(
            entry.keyword,
            format!(
                "command '{}' accepts only the key as content, got '{}'",
                entry.keyword, extra
            ),
        ));
    }

    let wanted = match entry.command {
        Command::Save => 1,
        Command::Clear => 0,
        Command::Patch | Command::Merge => 2,
        _ => {
            return Err(PeelError::shape(
                entry.keyword,
                format!("command '{}' is not a policy action", entry.keyword),
            ))
        }
    };
    if args.children.len() != wanted {
        return Err(PeelError::shape(
            entry.keyword,
            format!(
                "command '{}' requires a key and {} variable(s), got {} variable(s)",
                entry.keyword,
                wanted,
                args.children.len()
            ),
        ));
    }
    let mut values = args
        .children
        .into_iter()
        .map(|node| variable_arg(entry, node))
        .collect::<Result<Vec<_>, _>>()?
        .into_iter();

    let opts = args.options.unwrap_or_default();
    // `values` holds exactly `wanted` items here.
    let mut next = || {
        values.next().ok_or_else(|| {
            PeelError::shape(entry.keyword, format!("command '{}' is missing a variable", entry.keyword))
        })
    };
    let kind = match entry.command {
        Command::Save => PolicyActionKind::Save {
            value: next()?,
            fail_on_existing_key: opts.fail_on_existing_key,
        },
        Command::Patch => PolicyActionKind::JsonPatch {
            source: next()?,
            patch: next()?,
            cast_null_source_to_array: opts.cast_null_source_to_array,
            fail_on_missing_key: opts.fail_on_missing_key,
            fail_on_null_source: opts.fail_on_null_source,
        },
        Command::Merge => PolicyActionKind::JsonMerge {
            source: next()?,
            merge: next()?,
            fail_on_missing_key: opts.fail_on_missing_key,
            fail_on_existing_key: opts.fail_on_existing_key,
            fail_on_null_source: opts.fail_on_null_source,
            fail_on_null_merge: opts.fail_on_null_merge,
        },
        _ => PolicyActionKind::Clear {
            fail_on_missing_key: opts.fail_on_missing_key,
        },
    };

    Ok(PolicyAction {
        metadata: opts.metadata(),
        key,
        kind,
    })
}

/// `*act(...)`: one action or action reference plus when and in what order it runs.
pub(super) fn relationship(
    entry: &'static GrammarEntry,
    mut args: CommandArgs,
) -> Result<PolicyActionRelationship, PeelError> {
    reject_contents(entry, &args)?;
    let action = match single_child(entry, &mut args)? {
        Node::Action(a) => RefOr::Value(a),
        Node::Reference(Reference::Action(r)) => RefOr::Ref(r),
        other => return Err(wrong_child(entry, "a policy action or action reference", &other)),
    };

    let opts = args.options.unwrap_or_default();
    Ok(PolicyActionRelationship {
        action,
        constraint: args.constraint,
        execution_mode: opts.execution_mode,
        priority: opts.priority,
    })
}
