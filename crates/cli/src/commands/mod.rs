//! Subcommand implementations. Each `cmd_*` reports its own failure and
//! exits with status 1.

pub(crate) mod check;
pub(crate) mod parse;

use std::io::Read;
use std::path::Path;
use std::process;

use peel_core::{ParsedOptions, PeelError, PeelParser};
use peel_model::{PolicyAction, PolicyCondition, PolicyEntity, PolicyVariable, ValueResolver};
use serde::Serialize;

use crate::{report_error, OutputFormat, Target};

/// A successfully parsed expression of any target.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub(crate) enum Parsed {
    Variable(PolicyVariable),
    Resolver(ValueResolver),
    Condition(PolicyCondition),
    Action(PolicyAction),
    Policy(PolicyEntity),
    Options(ParsedOptions),
}

pub(crate) fn parse_target(
    parser: &PeelParser,
    target: Target,
    input: &str,
) -> Result<Parsed, PeelError> {
    let parsed = match target {
        Target::Variable => Parsed::Variable(parser.parse_variable(input)?),
        Target::Resolver => Parsed::Resolver(parser.parse_resolver(input)?),
        Target::Condition => Parsed::Condition(parser.parse_condition(input)?),
        Target::Action => Parsed::Action(parser.parse_action(input)?),
        Target::Policy => Parsed::Policy(parser.parse_policy(input)?),
        Target::Options => Parsed::Options(parser.parse_options(input)?),
    };
    Ok(parsed)
}

/// The expression text: the argument, else the file, else stdin.
pub(crate) fn read_input(expr: Option<&str>, file: Option<&Path>) -> Result<String, String> {
    if let Some(expr) = expr {
        return Ok(expr.to_string());
    }
    if let Some(path) = file {
        return std::fs::read_to_string(path)
            .map_err(|e| format!("error reading file '{}': {}", path.display(), e));
    }
    let mut buf = String::new();
    std::io::stdin()
        .read_to_string(&mut buf)
        .map_err(|e| format!("error reading stdin: {}", e))?;
    Ok(buf)
}

/// Read the input or exit.
pub(crate) fn input_or_exit(
    expr: Option<&str>,
    file: Option<&Path>,
    output: OutputFormat,
    quiet: bool,
) -> String {
    match read_input(expr, file) {
        Ok(s) => s,
        Err(msg) => {
            report_error(&msg, output, quiet);
            process::exit(1);
        }
    }
}

pub(crate) fn report_parse_error(e: &PeelError, output: OutputFormat, quiet: bool) {
    match output {
        OutputFormat::Json => {
            let err_json = serde_json::to_string_pretty(&e.to_json_value())
                .unwrap_or_else(|_| format!("{{\"error\": \"{:?}\"}}", e));
            eprintln!("{}", err_json);
        }
        OutputFormat::Text => {
            if !quiet {
                eprintln!("parse error: {}", e);
            }
        }
    }
}
