use std::path::Path;
use std::process;

use peel_core::PeelParser;

use super::{input_or_exit, parse_target, report_parse_error};
use crate::{OutputFormat, Target};

pub(crate) fn cmd_check(
    parser: &PeelParser,
    target: Target,
    expr: Option<&str>,
    file: Option<&Path>,
    output: OutputFormat,
    quiet: bool,
) {
    let input = input_or_exit(expr, file, output, quiet);
    if let Err(e) = parse_target(parser, target, &input) {
        report_parse_error(&e, output, quiet);
        process::exit(1);
    }
    match output {
        OutputFormat::Json => println!("{}", serde_json::json!({ "valid": true })),
        OutputFormat::Text => {
            if !quiet {
                println!("ok");
            }
        }
    }
}
