//! Syntax module for the koskinon rule language
//!
//! Source text goes through the [`lexer`] into tokens and through the
//! [`parser`] into AST nodes. The grammar both implement is written down in
//! [`GRAMMAR`].

pub mod lexer;
pub mod parser;

pub use lexer::{lex, Lexer, Token, TokenKind};
pub use parser::{parse_expression, parse_statement, Parser};

/// The EBNF description of the rule grammar.
pub const GRAMMAR: &str = include_str!("syntax/grammar.ebnf");

/// Start symbols of [`GRAMMAR`].
pub const GRAMMAR_START: &[&str] = &["Expr", "Stmt"];
