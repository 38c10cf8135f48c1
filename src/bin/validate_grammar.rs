//! Grammar validation tool for koskinon.
//!
//! Validates an EBNF grammar document for consistency issues that would let
//! the document drift from the parser.
//!
//! ## Usage
//! ```bash
//! cargo run --bin validate_grammar [path/to/grammar.ebnf]
//! ```
//!
//! Without a path the built-in grammar is checked. Exits 1 when the grammar
//! has errors.

use std::process;

use koskinon::cli::output::print_report;
use koskinon::validation::{validate_grammar, validate_grammar_str};
use koskinon::{SourceContext, GRAMMAR, GRAMMAR_START};

fn main() {
    let result = match std::env::args_os().nth(1) {
        Some(path) => {
            println!("Validating grammar file: {}", path.to_string_lossy());
            validate_grammar(&path, GRAMMAR_START)
        }
        None => {
            println!("Validating built-in grammar");
            let source = SourceContext::from_file("grammar.ebnf", GRAMMAR);
            validate_grammar_str(&source, GRAMMAR_START).map_err(miette::Report::new)
        }
    };

    let result = match result {
        Ok(result) => result,
        Err(report) => {
            eprintln!("{report:?}");
            process::exit(1);
        }
    };

    if let Err(e) = print_report(&result) {
        eprintln!("Failed to print report: {e}");
    }
    if !result.is_valid() {
        process::exit(1);
    }
}
