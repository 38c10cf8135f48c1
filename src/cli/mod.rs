//! The koskinon Command-Line Interface.
//!
//! A thin diagnostic front end over the library: every subcommand reads a
//! file, runs one library entry point and prints the outcome. Failures are
//! rendered as `miette` reports and exit with status 2.

use std::fs;
use std::path::Path;
use std::process;

use clap::Parser;
use miette::{IntoDiagnostic, WrapErr};
use tracing_subscriber::EnvFilter;

use crate::cli::args::{Command, KoskinonArgs};
use crate::errors::SourceContext;
use crate::message::SimpleMessage;
use crate::syntax::{lex, parse_expression, parse_statement, GRAMMAR, GRAMMAR_START};
use crate::validation::{validate_grammar, validate_grammar_str, ValidationResult};

pub mod args;
pub mod output;

/// Environment variable read for the log filter when `--log-level` is absent.
pub const LOG_ENV: &str = "KOSKINON_LOG";

/// The main entry point for the CLI.
pub fn run() {
    let args = KoskinonArgs::parse();
    init_tracing(args.log_level.as_deref());

    let code = match dispatch(args.command) {
        Ok(code) => code,
        Err(report) => {
            eprintln!("{report:?}");
            2
        }
    };
    process::exit(code);
}

fn init_tracing(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    // A subscriber may already be installed when embedded.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Runs one subcommand and returns the process exit code.
fn dispatch(command: Command) -> miette::Result<i32> {
    tracing::debug!(?command, "dispatching");
    match command {
        Command::Tokens { file } => handle_tokens(&file),
        Command::Ast { file, stmt } => handle_ast(&file, stmt),
        Command::Eval { file, message } => handle_eval(&file, &message),
        Command::Grammar { path } => handle_grammar(path.as_deref()),
    }
}

fn read_source(path: &Path) -> miette::Result<SourceContext> {
    let content = fs::read_to_string(path)
        .into_diagnostic()
        .wrap_err_with(|| format!("reading {}", path.display()))?;
    Ok(SourceContext::from_file(path.display().to_string(), content))
}

fn handle_tokens(path: &Path) -> miette::Result<i32> {
    let source = read_source(path)?;
    let tokens = lex(&source)?;
    output::print_tokens(&tokens).into_diagnostic()?;
    Ok(0)
}

fn handle_ast(path: &Path, stmt: bool) -> miette::Result<i32> {
    let source = read_source(path)?;
    let json = if stmt {
        serde_json::to_string_pretty(&parse_statement(&source)?)
    } else {
        serde_json::to_string_pretty(&parse_expression(&source)?)
    }
    .into_diagnostic()?;
    println!("{json}");
    Ok(0)
}

fn handle_eval(path: &Path, message_path: &Path) -> miette::Result<i32> {
    let source = read_source(path)?;
    let expr = parse_expression(&source)?;

    let raw = fs::read_to_string(message_path)
        .into_diagnostic()
        .wrap_err_with(|| format!("reading {}", message_path.display()))?;
    let message: SimpleMessage = serde_json::from_str(&raw)
        .into_diagnostic()
        .wrap_err_with(|| format!("decoding message {}", message_path.display()))?;

    let matched = expr.eval(&message);
    output::print_verdict(matched).into_diagnostic()?;
    Ok(if matched { 0 } else { 1 })
}

fn handle_grammar(path: Option<&Path>) -> miette::Result<i32> {
    let result: ValidationResult = match path {
        Some(path) => validate_grammar(path, GRAMMAR_START)?,
        None => {
            let source = SourceContext::from_file("grammar.ebnf", GRAMMAR);
            validate_grammar_str(&source, GRAMMAR_START)?
        }
    };
    output::print_report(&result).into_diagnostic()?;
    Ok(if result.is_valid() { 0 } else { 1 })
}
