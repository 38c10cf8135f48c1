//! Grammar document verification.
//!
//! The grammar is written in the usual EBNF notation:
//!
//! ```text
//! Production  = name "=" [ Expression ] "." .
//! Expression  = Alternative { "|" Alternative } .
//! Alternative = Term { Term } .
//! Term        = name | token [ "…" token ] | Group | Option | Repetition .
//! Group       = "(" Expression ")" .
//! Option      = "[" Expression "]" .
//! Repetition  = "{" Expression "}" .
//! ```
//!
//! Names starting with a lower-case letter are lexical productions.

use std::path::Path;

use miette::IntoDiagnostic;

use crate::errors::{Position, Result, SourceContext};

pub mod parser;
pub mod validators;

// =====================
// Core Data Structures
// =====================

#[derive(Debug, Clone, PartialEq)]
pub struct Grammar {
    pub productions: Vec<Production>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Production {
    pub name: String,
    pub position: Position,
    /// `None` for an empty production (`Name = .`).
    pub expr: Option<Expression>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Alternative(Vec<Expression>),
    Sequence(Vec<Expression>),
    Group(Box<Expression>),
    Option(Box<Expression>),
    Repetition(Box<Expression>),
    Name(Symbol),
    Token(Symbol),
    Range { begin: Symbol, end: Symbol },
}

/// A name or token as written, with where it was written.
#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    pub text: String,
    pub position: Position,
}

impl Grammar {
    pub fn get(&self, name: &str) -> Option<&Production> {
        self.productions.iter().find(|p| p.name == name)
    }
}

impl Production {
    pub fn is_lexical(&self) -> bool {
        is_lexical(&self.name)
    }
}

impl Expression {
    /// Visit every leaf (names, tokens, ranges) in source order.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Expression)) {
        match self {
            Expression::Alternative(items) | Expression::Sequence(items) => {
                for item in items {
                    item.walk(visit);
                }
            }
            Expression::Group(inner)
            | Expression::Option(inner)
            | Expression::Repetition(inner) => inner.walk(visit),
            leaf => visit(leaf),
        }
    }
}

pub fn is_lexical(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_lowercase)
}

#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub suggestions: Vec<String>,
}

// =====================
// Traits
// =====================

pub trait ValidationReporter {
    fn report_error(&mut self, message: impl Into<String>);
    fn report_warning(&mut self, message: impl Into<String>);
    fn report_suggestion(&mut self, message: impl Into<String>);
}

impl ValidationReporter for ValidationResult {
    fn report_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }
    fn report_warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }
    fn report_suggestion(&mut self, message: impl Into<String>) {
        self.suggestions.push(message.into());
    }
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn is_clean(&self) -> bool {
        self.is_valid() && self.warnings.is_empty() && self.suggestions.is_empty()
    }
}

// =====================
// Public API
// =====================

/// Validates a grammar file.
pub fn validate_grammar(
    path: impl AsRef<Path>,
    start: &[&str],
) -> miette::Result<ValidationResult> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).into_diagnostic()?;
    let source = SourceContext::from_file(path.display().to_string(), content);
    Ok(validate_grammar_str(&source, start)?)
}

/// Parses and verifies a grammar. Syntax errors in the document are returned
/// as errors; problems with a well-formed grammar land in the result.
pub fn validate_grammar_str(source: &SourceContext, start: &[&str]) -> Result<ValidationResult> {
    let grammar = parser::parse_grammar(source)?;
    tracing::debug!(
        source = source.name(),
        productions = grammar.productions.len(),
        "parsed grammar"
    );
    Ok(verify(&grammar, start))
}

/// Runs every check against an already parsed grammar.
pub fn verify(grammar: &Grammar, start: &[&str]) -> ValidationResult {
    use validators::GrammarValidators;

    let mut result = ValidationResult::new();
    GrammarValidators::check_duplicate_productions(grammar, &mut result);
    GrammarValidators::check_start_symbols(grammar, start, &mut result);
    GrammarValidators::check_references(grammar, &mut result);
    GrammarValidators::check_reachability(grammar, start, &mut result);
    GrammarValidators::check_lexical_references(grammar, &mut result);
    GrammarValidators::check_tokens(grammar, &mut result);
    GrammarValidators::check_empty_productions(grammar, &mut result);
    result
}
