use peel_model::{
    ConditionCombinationLogic, OperationType, PolicyCondition, PolicyConditionAtomic,
    PolicyConditionComposite, PolicyConditionDefault,
};

use super::{condition_arg, reject_constraint, reject_contents, variable_arg};
use crate::error::PeelError;
use crate::grammar::{Command, GrammarEntry};
use crate::parser::CommandArgs;

fn operation(command: Command) -> Option<OperationType> {
    let op = match command {
        Command::GreaterThan => OperationType::GreaterThan,
        Command::GreaterThanEqual => OperationType::GreaterThanEqual,
        Command::LessThan => OperationType::LessThan,
        Command::LessThanEqual => OperationType::LessThanEqual,
        Command::IsNull => OperationType::IsNull,
        Command::NotNull => OperationType::IsNotNull,
        Command::IsEmpty => OperationType::IsEmpty,
        Command::NotEmpty => OperationType::IsNotEmpty,
        Command::IsBlank => OperationType::IsBlank,
        Command::NotBlank => OperationType::IsNotBlank,
        Command::StartsWith => OperationType::StartsWith,
        Command::EndsWith => OperationType::EndsWith,
        Command::Contains => OperationType::Contains,
        Command::IsIn => OperationType::IsIn,
        Command::Equals => OperationType::Equals,
        Command::Positive => OperationType::IsPositive,
        Command::Negative => OperationType::IsNegative,
        Command::Zero => OperationType::IsZero,
        Command::Past => OperationType::IsPastDate,
        Command::Future => OperationType::IsFutureDate,
        Command::Regexp => OperationType::RegexpMatch,
        Command::HasKey => OperationType::HasKey,
        Command::Unique => OperationType::IsUnique,
        Command::Schema => OperationType::SchemaMatch,
        _ => return None,
    };
    Some(op)
}

pub(super) fn atomic(
    entry: &'static GrammarEntry,
    args: CommandArgs,
) -> Result<PolicyConditionAtomic, PeelError> {
    reject_contents(entry, &args)?;
    reject_constraint(entry, &args)?;
    let operation = operation(entry.command).ok_or_else(|| {
        PeelError::shape(
            entry.keyword,
            format!("command '{}' is not a condition operation", entry.keyword),
        )
    })?;
    if args.children.len() != operation.arity() {
        return Err(PeelError::shape(
            entry.keyword,
            format!(
                "command '{}' requires {} argument(s), got {}",
                entry.keyword,
                operation.arity(),
                args.children.len()
            ),
        ));
    }

    let values = args
        .children
        .into_iter()
        .map(|node| variable_arg(entry, node))
        .collect::<Result<Vec<_>, _>>()?;

    let opts = args.options.unwrap_or_default();
    Ok(PolicyConditionAtomic {
        metadata: opts.metadata(),
        operation,
        args: values,
        negate_result: opts.negate_result,
        string_ignore_case: opts.string_ignore_case,
        fields_strict_check: opts.fields_strict_check,
        array_order_strict_check: opts.array_order_strict_check,
    })
}

pub(super) fn composite(
    entry: &'static GrammarEntry,
    args: CommandArgs,
) -> Result<PolicyConditionComposite, PeelError> {
    reject_contents(entry, &args)?;
    reject_constraint(entry, &args)?;
    let logic = match entry.command {
        Command::Any => ConditionCombinationLogic::Or,
        Command::All => ConditionCombinationLogic::And,
        Command::Not => ConditionCombinationLogic::Not,
        Command::NOf => ConditionCombinationLogic::NOf,
        _ => {
            return Err(PeelError::shape(
                entry.keyword,
                format!("command '{}' is not a condition combinator", entry.keyword),
            ))
        }
    };

    if logic == ConditionCombinationLogic::NOf {
        match &args.options {
            None => {
                return Err(PeelError::shape(
                    entry.keyword,
                    format!("Options must be provided for command '{}'", entry.keyword),
                ))
            }
            Some(opts) if opts.minimum_conditions.is_none() => {
                return Err(PeelError::shape(
                    entry.keyword,
                    format!(
                        "Option 'minimumConditions' must be provided for command '{}'",
                        entry.keyword
                    ),
                ))
            }
            Some(_) => {}
        }
    }

    let conditions = args
        .children
        .into_iter()
        .map(|node| condition_arg(entry, node))
        .collect::<Result<Vec<_>, _>>()?;

    let opts = args.options.unwrap_or_default();
    Ok(PolicyConditionComposite {
        metadata: opts.metadata(),
        logic,
        conditions,
        minimum_conditions: opts.minimum_conditions,
        optimize: opts.optimize,
        negate_result: opts.negate_result,
        strict_check: opts.strict_check,
    })
}

pub(super) fn default(
    entry: &'static GrammarEntry,
    args: CommandArgs,
) -> Result<PolicyCondition, PeelError> {
    reject_contents(entry, &args)?;
    reject_constraint(entry, &args)?;
    let value = match entry.command {
        Command::True => PolicyConditionDefault::True,
        Command::False => PolicyConditionDefault::False,
        Command::Null => PolicyConditionDefault::Null,
        _ => {
            return Err(PeelError::shape(
                entry.keyword,
                format!("command '{}' is not a default condition", entry.keyword),
            ))
        }
    };
    Ok(PolicyCondition::Default { value })
}
