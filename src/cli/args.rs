//! Defines the command-line arguments and subcommands for the koskinon CLI.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// The main CLI argument structure.
#[derive(Debug, Parser)]
#[command(
    name = "koskinon",
    version,
    about = "Inspect, parse and evaluate koskinon mail filter rules."
)]
pub struct KoskinonArgs {
    /// Log filter, e.g. `debug` or `koskinon::syntax=trace`. Falls back to
    /// the KOSKINON_LOG environment variable.
    #[arg(long, global = true, value_name = "FILTER")]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// An enumeration of all available CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the token stream of a rule file, one token per line.
    Tokens {
        #[arg(required = true)]
        file: PathBuf,
    },
    /// Parse a rule file and print its AST as JSON.
    Ast {
        #[arg(required = true)]
        file: PathBuf,
        /// Parse the file as a statement instead of an expression.
        #[arg(long)]
        stmt: bool,
    },
    /// Evaluate an expression against a message; exits 0 on match, 1 otherwise.
    Eval {
        #[arg(required = true)]
        file: PathBuf,
        /// JSON file holding `{"body": ..., "headers": {...}}`.
        #[arg(long, required = true)]
        message: PathBuf,
    },
    /// Verify a grammar document (defaults to the built-in grammar).
    Grammar { path: Option<PathBuf> },
}
