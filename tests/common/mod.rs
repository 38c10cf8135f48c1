//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use koskinon::{Expr, SimpleMessage, SourceContext, Stmt};

pub const BODY: &str = "Hello world!

I'm a test message. Something normal people would write. I think.


Cheers,
-- koskinon
";

/// The message every evaluation test runs against.
pub fn test_message() -> SimpleMessage {
    SimpleMessage::new(BODY)
        .with_header("From", "koskinon@example.com")
        .with_header("To", "somebody@example.net")
}

pub fn source(input: &str) -> SourceContext {
    SourceContext::from_file("test.rules", input)
}

pub fn expr(input: &str) -> Expr {
    koskinon::parse_expression(&source(input))
        .unwrap_or_else(|e| panic!("failed to parse {input:?}: {e}"))
}

pub fn stmt(input: &str) -> Stmt {
    koskinon::parse_statement(&source(input))
        .unwrap_or_else(|e| panic!("failed to parse {input:?}: {e}"))
}
