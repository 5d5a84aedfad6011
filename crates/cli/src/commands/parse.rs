use std::path::Path;
use std::process;

use peel_core::PeelParser;

use super::{input_or_exit, parse_target, report_parse_error};
use crate::{OutputFormat, Target};

pub(crate) fn cmd_parse(
    parser: &PeelParser,
    target: Target,
    expr: Option<&str>,
    file: Option<&Path>,
    output: OutputFormat,
    quiet: bool,
) {
    let input = input_or_exit(expr, file, output, quiet);
    match parse_target(parser, target, &input) {
        Ok(parsed) => {
            let pretty = serde_json::to_string_pretty(&parsed)
                .unwrap_or_else(|e| format!("serialization error: {}", e));
            println!("{}", pretty);
        }
        Err(e) => {
            report_parse_error(&e, output, quiet);
            process::exit(1);
        }
    }
}
