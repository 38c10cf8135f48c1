mod common;

use common::{expr, source, stmt};
use koskinon::ast::{ExprHeader, ExprMessage, StmtLabel};
use koskinon::syntax::Parser;
use koskinon::{Comparator, ErrorKind, Expr, Stmt};
use proptest::prelude::*;

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_parse_header_expression() {
    assert_eq!(
        expr(r#"header ["From", "To"] match "example.com$""#),
        Expr::Header(ExprHeader {
            headers: strings(&["From", "To"]),
            op: Comparator::new("match", strings(&["example.com$"])).unwrap(),
        })
    );
}

#[test]
fn test_parse_message_expression_with_list() {
    assert_eq!(
        expr("message contains [`a`, \"b\"]"),
        Expr::Message(ExprMessage {
            op: Comparator::Contains(strings(&["a", "b"])),
        })
    );
}

#[test]
fn test_operator_synonyms_are_equal() {
    for (a, b) in [("is", "are"), ("contains", "contain"), ("matches", "match")] {
        assert_eq!(
            expr(&format!(r#"header "From" {a} "x""#)),
            expr(&format!(r#"headers "From" {b} "x""#)),
            "{a} vs {b}"
        );
        assert_eq!(
            expr(&format!(r#"message {a} ["x", "y"]"#)),
            expr(&format!(r#"message {b} ["x", "y"]"#)),
            "{a} vs {b}"
        );
    }
}

#[test]
fn test_parse_statements() {
    assert_eq!(
        stmt("label `Lists/rust`"),
        Stmt::Label(StmtLabel {
            labels: strings(&["Lists/rust"])
        })
    );
    assert_eq!(stmt("mark as read").to_string(), "mark as read");
    assert_eq!(stmt("skip inbox").to_string(), "skip inbox");
    assert_eq!(stmt("stop").to_string(), "stop");
}

#[test]
fn test_comments_and_layout_are_ignored() {
    let input = "// sort mailing lists\nheader /* which */ \"List-Id\"\n    contains `rust`";
    assert_eq!(expr(input), expr(r#"header "List-Id" contains "rust""#));
}

#[test]
fn test_failed_mark_leaves_cursor_for_retry() {
    let src = source("mark");
    let mut parser = Parser::new(&src).unwrap();
    assert!(parser.parse_stmt_mark().is_err());
    assert_eq!(parser.position(), 0);
    assert!(parser.parse_stmt_label().is_err());
    assert_eq!(parser.position(), 0);
}

#[test]
fn test_malformed_inputs_are_errors() {
    for input in [
        "",
        "header",
        r#"header "From""#,
        r#"header "From" is"#,
        r#"header "From" is []"#,
        r#"header From is "x""#,
        r#"message equals "x""#,
        r#"message matches "(""#,
        "truth",
    ] {
        assert!(
            koskinon::parse_expression(&source(input)).is_err(),
            "input: {input:?}"
        );
    }
    for input in ["", "label", "label []", "mark as", "skip", "stop now"] {
        assert!(
            koskinon::parse_statement(&source(input)).is_err(),
            "input: {input:?}"
        );
    }
}

#[test]
fn test_unknown_operator_is_reported_over_earlier_alternatives() {
    let err = koskinon::parse_expression(&source(r#"message equals "x""#)).unwrap_err();
    assert_eq!(err.kind, ErrorKind::UnknownOperator { op: "equals".into() });
    assert_eq!(err.position.column, 9);
}

fn item() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 @._/-]{0,12}"
}

fn operator() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec!["is", "are", "contains", "contain", "matches", "match"])
}

fn list_source(items: &[String]) -> String {
    let rendered: Vec<String> = items.iter().map(|s| format!("`{s}`")).collect();
    format!("[{}]", rendered.join(", "))
}

proptest! {
    #[test]
    fn prop_list_yields_items_in_order(items in prop::collection::vec(item(), 1..8)) {
        let src = source(&list_source(&items));
        let mut parser = Parser::new(&src).unwrap();
        prop_assert_eq!(parser.parse_list_str().unwrap(), items);
        prop_assert!(parser.is_at_end());
    }

    #[test]
    fn prop_trailing_comma_is_rejected(items in prop::collection::vec(item(), 1..8)) {
        let mut input = list_source(&items);
        input.insert(input.len() - 1, ',');
        let src = source(&input);
        let mut parser = Parser::new(&src).unwrap();
        prop_assert!(parser.parse_list_str().is_err());
        prop_assert_eq!(parser.position(), 0);
    }

    #[test]
    fn prop_parsing_is_deterministic(
        headers in prop::collection::vec("[A-Za-z-]{1,10}", 1..4),
        op in operator(),
        values in prop::collection::vec("[a-z0-9]{1,8}", 1..4),
    ) {
        let input = format!("headers {} {} {}", list_source(&headers), op, list_source(&values));
        prop_assert_eq!(expr(&input), expr(&input));
    }

    #[test]
    fn prop_display_round_trips(
        headers in prop::collection::vec("[A-Za-z-]{1,10}", 1..4),
        op in operator(),
        values in prop::collection::vec("[a-z0-9 ]{0,8}", 1..4),
    ) {
        let input = format!("headers {} {} {}", list_source(&headers), op, list_source(&values));
        let parsed = expr(&input);
        prop_assert_eq!(expr(&parsed.to_string()), parsed);
    }
}
