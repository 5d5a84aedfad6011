mod commands;
mod config;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use peel_core::PeelParser;
use tracing_subscriber::EnvFilter;

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// What the expression must parse as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum Target {
    Variable,
    Resolver,
    Condition,
    Action,
    Policy,
    Options,
}

/// PEEL policy expression language toolchain.
#[derive(Parser)]
#[command(
    name = "peel",
    version,
    about = "PEEL policy expression language toolchain"
)]
struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    /// Log parser activity to stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    /// TOML file with a [parser] table
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Maximum command nesting depth (overrides the config file)
    #[arg(long, global = true)]
    max_depth: Option<usize>,

    /// Maximum input length in characters (overrides the config file)
    #[arg(long, global = true)]
    max_input_len: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse an expression and print the resulting object as JSON
    Parse {
        #[arg(value_enum)]
        target: Target,
        /// Expression text; read from --file or stdin when omitted
        expr: Option<String>,
        /// Read the expression from a file
        #[arg(long, conflicts_with = "expr")]
        file: Option<PathBuf>,
    },

    /// Check that an expression parses, without printing it
    Check {
        #[arg(value_enum)]
        target: Target,
        /// Expression text; read from --file or stdin when omitted
        expr: Option<String>,
        /// Read the expression from a file
        #[arg(long, conflicts_with = "expr")]
        file: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let parser_config =
        match config::resolve_parser_config(cli.config.as_deref(), cli.max_depth, cli.max_input_len)
        {
            Ok(c) => c,
            Err(msg) => {
                report_error(&msg, cli.output, cli.quiet);
                process::exit(1);
            }
        };
    tracing::debug!(?parser_config, "parser configured");
    let parser = PeelParser::new(parser_config);

    match cli.command {
        Commands::Parse { target, expr, file } => {
            commands::parse::cmd_parse(
                &parser,
                target,
                expr.as_deref(),
                file.as_deref(),
                cli.output,
                cli.quiet,
            );
        }
        Commands::Check { target, expr, file } => {
            commands::check::cmd_check(
                &parser,
                target,
                expr.as_deref(),
                file.as_deref(),
                cli.output,
                cli.quiet,
            );
        }
    }
}

/// Logs go to stderr so stdout carries only results.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Report a non-parse error (I/O, configuration) to stderr.
pub(crate) fn report_error(msg: &str, output: OutputFormat, quiet: bool) {
    match output {
        OutputFormat::Json => {
            eprintln!("{}", serde_json::json!({ "error": msg }));
        }
        OutputFormat::Text => {
            if !quiet {
                eprintln!("error: {}", msg);
            }
        }
    }
}
