//! Tests for the diagnostics attached to rule language errors.
//!
//! Errors carry their position as data and render through `miette` with the
//! offending source highlighted.

mod common;

use common::source;
use koskinon::errors::ErrorCategory;
use koskinon::syntax::lex;
use koskinon::{parse_expression, parse_statement, ErrorKind, KoskinonError};
use miette::{Diagnostic, GraphicalReportHandler, GraphicalTheme};

fn render(error: &KoskinonError) -> String {
    let mut out = String::new();
    GraphicalReportHandler::new_themed(GraphicalTheme::unicode_nocolor())
        .render_report(&mut out, error)
        .unwrap();
    out
}

fn code(error: &KoskinonError) -> String {
    error.code().map(|c| c.to_string()).unwrap_or_default()
}

#[test]
fn test_lexical_error_diagnostic() {
    let err = lex(&source("42 nope")).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Lexical);
    assert_eq!(err.kind, ErrorKind::UnexpectedToken { text: "42".into() });
    assert_eq!(code(&err), "koskinon::lex::unexpected_token");
    assert_eq!(err.to_string(), "test.rules:1:1: unexpected `42`");

    let rendered = render(&err);
    assert!(rendered.contains("koskinon::lex::unexpected_token"), "{rendered}");
    assert!(rendered.contains("42 nope"), "{rendered}");
    assert!(rendered.contains("quote the value"), "{rendered}");
}

#[test]
fn test_syntax_error_diagnostic() {
    let err = parse_statement(&source("skip\n  outbox")).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Syntax);
    assert_eq!(code(&err), "koskinon::parse::mismatch");
    assert_eq!(
        err.to_string(),
        "test.rules:2:3: expected IDENT(inbox), got IDENT(outbox)"
    );
    assert_eq!(err.position.line, 2);
    assert_eq!(err.position.column, 3);
    assert_eq!(&*err.position.source, "test.rules");
    assert!(render(&err).contains("unexpected token"));
}

#[test]
fn test_semantic_error_diagnostics() {
    let err = parse_expression(&source(r#"message frobs "x""#)).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Semantic);
    assert_eq!(code(&err), "koskinon::semantic::unknown_operator");
    assert!(render(&err).contains("use one of `is`"));

    let err = parse_expression(&source(r#"message matches "[z-a]""#)).unwrap_err();
    assert_eq!(code(&err), "koskinon::semantic::invalid_regex");
    assert_eq!(err.position.column, 17);
    assert!(std::error::Error::source(&err).is_some());
    assert!(err.help().is_some());
}

#[test]
fn test_unterminated_literal_diagnostic() {
    let err = lex(&source("label \"open")).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::UnterminatedLiteral { .. }));
    assert_eq!(err.position.column, 7);
    assert_eq!(code(&err), "koskinon::lex::unterminated_literal");
}

#[test]
fn test_eof_diagnostic_points_past_input() {
    let input = r#"header "From""#;
    let err = parse_expression(&source(input)).unwrap_err();
    assert_eq!(err.kind, ErrorKind::UnexpectedEof);
    assert_eq!(err.source_info.primary_span.offset(), input.len());
}

#[test]
fn test_custom_help_overrides_default() {
    let err = parse_statement(&source("stop now"))
        .unwrap_err()
        .with_help("one statement per line");
    assert!(render(&err).contains("one statement per line"));
}

#[test]
fn test_anonymous_source_omits_name() {
    let err = parse_statement(&koskinon::SourceContext::anonymous("mark")).unwrap_err();
    assert_eq!(err.to_string(), "1:1: unexpected EOF");
}
