use peel_model::{
    PolicyVariableDynamic, PolicyVariableStatic, RefOr, Reference, ResolverEngine, StaticValue,
    ValueResolver,
};

use super::literal;
use super::{reject_children, reject_constraint, reject_contents, single_content, wrong_child};
use crate::error::PeelError;
use crate::grammar::{Command, GrammarEntry};
use crate::parser::{CommandArgs, Node};

pub(super) fn static_variable(
    entry: &'static GrammarEntry,
    mut args: CommandArgs,
) -> Result<PolicyVariableStatic, PeelError> {
    reject_children(entry, &args)?;
    reject_constraint(entry, &args)?;
    let raw = single_content(entry, &mut args)?;
    let opts = args.options.unwrap_or_default();

    let invalid = |reason: String| PeelError::InvalidLiteral {
        keyword: entry.keyword,
        value: raw.clone(),
        reason,
    };

    let mut format = None;
    let value = match entry.command {
        Command::Str => {
            if opts.is_json == Some(true) {
                StaticValue::String(serde_json::Value::String(raw.clone()).to_string())
            } else {
                StaticValue::String(raw.clone())
            }
        }
        Command::Date => {
            format = opts.date_format.clone();
            StaticValue::Date(literal::date(&raw, format.as_deref()).map_err(invalid)?)
        }
        Command::DateTime => {
            format = opts.date_time_format.clone();
            StaticValue::DateTime(literal::date_time(&raw, format.as_deref()).map_err(invalid)?)
        }
        Command::Time => {
            format = opts.time_format.clone();
            StaticValue::Time(literal::time_of_day(&raw, format.as_deref()).map_err(invalid)?)
        }
        Command::Period => StaticValue::Period(literal::period(&raw).map_err(invalid)?),
        Command::Duration => StaticValue::Duration(literal::duration(&raw).map_err(invalid)?),
        Command::Int => StaticValue::Int(literal::int(&raw).map_err(invalid)?),
        Command::Long => StaticValue::Long(literal::long(&raw).map_err(invalid)?),
        Command::Number => StaticValue::Number(literal::number(&raw).map_err(invalid)?),
        Command::Float => StaticValue::Float(literal::float(&raw).map_err(invalid)?),
        Command::BigDecimal => StaticValue::BigDecimal(literal::big_decimal(&raw).map_err(invalid)?),
        Command::Bool => StaticValue::Boolean(literal::boolean(&raw).map_err(invalid)?),
        Command::Object => StaticValue::Object(literal::object(&raw).map_err(invalid)?),
        Command::Array => StaticValue::Array(literal::array(&raw).map_err(invalid)?),
        _ => {
            return Err(PeelError::shape(
                entry.keyword,
                format!("command '{}' does not build a static value", entry.keyword),
            ))
        }
    };

    let mut variable = PolicyVariableStatic::new(value);
    variable.metadata = opts.metadata();
    variable.format = format;
    if entry.command == Command::Str {
        variable.is_json = opts.is_json;
    }
    Ok(variable)
}

pub(super) fn dynamic_variable(
    entry: &'static GrammarEntry,
    args: CommandArgs,
) -> Result<PolicyVariableDynamic, PeelError> {
    reject_contents(entry, &args)?;
    reject_constraint(entry, &args)?;

    let resolvers = args
        .children
        .into_iter()
        .map(|node| match node {
            Node::Resolver(r) => Ok(RefOr::Value(r)),
            Node::Reference(Reference::Resolver(r)) => Ok(RefOr::Ref(r)),
            other => Err(wrong_child(entry, "a value resolver or resolver reference", &other)),
        })
        .collect::<Result<Vec<_>, _>>()?;

    let opts = args.options.unwrap_or_default();
    Ok(PolicyVariableDynamic {
        metadata: opts.metadata(),
        resolvers,
        value_type: opts.value_type,
        format: opts.format,
    })
}

pub(super) fn resolver(
    entry: &'static GrammarEntry,
    mut args: CommandArgs,
) -> Result<ValueResolver, PeelError> {
    reject_children(entry, &args)?;
    reject_constraint(entry, &args)?;
    let expression = single_content(entry, &mut args)?;
    let engine = match entry.command {
        Command::JsonPath => ResolverEngine::JsonPath,
        Command::Jq => ResolverEngine::Jq,
        Command::Key => ResolverEngine::Key,
        _ => {
            return Err(PeelError::shape(
                entry.keyword,
                format!("command '{}' does not build a resolver", entry.keyword),
            ))
        }
    };

    let opts = args.options.unwrap_or_default();
    Ok(ValueResolver {
        metadata: opts.metadata(),
        engine,
        expression,
        source: opts.source,
        key: opts.key,
    })
}
