//! koskinon Parser
//!
//! Single-pass recursive descent over the token sequence. Every production is
//! run through [`Parser::attempt`], which restores the cursor when the
//! production fails, so a caller can try alternative productions from the same
//! place without any bookkeeping of its own.

use crate::ast::{
    Comparator, ComparatorError, Expr, ExprHeader, ExprMessage, PredBool, Stmt, StmtLabel,
    StmtMark, StmtSkip, StmtStop,
};
use crate::errors::{ErrorKind, KoskinonError, Position, Result, SourceContext, Span};
use crate::syntax::lexer::{lex, Token, TokenKind};

// ============================================================================
// PUBLIC API
// ============================================================================

/// Parse a whole source as exactly one expression.
pub fn parse_expression(source: &SourceContext) -> Result<Expr> {
    let mut parser = Parser::new(source)?;
    let expr = parser.parse_expr()?;
    parser.expect_eof()?;
    Ok(expr)
}

/// Parse a whole source as exactly one statement.
pub fn parse_statement(source: &SourceContext) -> Result<Stmt> {
    let mut parser = Parser::new(source)?;
    let stmt = parser.parse_stmt()?;
    parser.expect_eof()?;
    Ok(stmt)
}

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    source: SourceContext,
}

impl Parser {
    /// Lex `source` and set the cursor on its first token.
    pub fn new(source: &SourceContext) -> Result<Self> {
        let tokens = lex(source)?;
        Ok(Self::from_tokens(tokens, source))
    }

    pub fn from_tokens(tokens: Vec<Token>, source: &SourceContext) -> Self {
        Self {
            tokens,
            pos: 0,
            source: source.clone(),
        }
    }

    /// Index of the next token to be consumed.
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn is_at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    pub fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    /// Run `production`; if it fails, put the cursor back where it was.
    pub fn attempt<T>(&mut self, production: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let saved = self.pos;
        let result = production(self);
        if let Err(err) = &result {
            tracing::trace!(from = self.pos, to = saved, error = %err, "backtracking");
            self.pos = saved;
        }
        result
    }

    // ========================================================================
    // TOKEN PRIMITIVES
    // ========================================================================

    /// Consume the current token if it has the given kind and, when `literal`
    /// is given, exactly that text.
    pub fn expect(&mut self, kind: TokenKind, literal: Option<&str>) -> Result<Token> {
        let Some(token) = self.tokens.get(self.pos) else {
            return Err(self.eof_error());
        };
        if token.kind != kind || literal.is_some_and(|lit| token.text != lit) {
            let expected = match literal {
                Some(lit) => format!("{kind}({lit})"),
                None => kind.to_string(),
            };
            let kind = ErrorKind::Mismatch {
                expected,
                found: token.to_string(),
            };
            return Err(self.error_at(token, kind));
        }
        let token = token.clone();
        self.pos += 1;
        Ok(token)
    }

    pub fn expect_ident(&mut self, literal: &str) -> Result<()> {
        self.expect(TokenKind::Ident, Some(literal)).map(|_| ())
    }

    pub fn expect_other(&mut self, literal: &str) -> Result<()> {
        self.expect(TokenKind::Other, Some(literal)).map(|_| ())
    }

    pub fn next_ident(&mut self) -> Result<Token> {
        self.expect(TokenKind::Ident, None)
    }

    pub fn next_other(&mut self) -> Result<Token> {
        self.expect(TokenKind::Other, None)
    }

    pub fn next_str(&mut self) -> Result<Token> {
        self.expect(TokenKind::String, None)
    }

    /// Succeeds only when every token has been consumed.
    pub fn expect_eof(&self) -> Result<()> {
        match self.tokens.get(self.pos) {
            None => Ok(()),
            Some(token) => Err(self.error_at(
                token,
                ErrorKind::TrailingInput {
                    found: token.to_string(),
                },
            )),
        }
    }

    // ========================================================================
    // SHARED PRODUCTIONS
    // ========================================================================

    /// `StrOrListStr = String | ListStr`
    pub fn parse_str_or_list_str(&mut self) -> Result<Vec<String>> {
        self.parse_string_tokens().map(texts)
    }

    /// `ListStr = "[" String {"," String} "]"`
    pub fn parse_list_str(&mut self) -> Result<Vec<String>> {
        self.parse_list_tokens().map(texts)
    }

    fn parse_string_tokens(&mut self) -> Result<Vec<Token>> {
        if let Ok(token) = self.next_str() {
            return Ok(vec![token]);
        }
        self.parse_list_tokens()
    }

    fn parse_list_tokens(&mut self) -> Result<Vec<Token>> {
        self.attempt(|p| {
            p.expect_other("[")?;
            let mut items = Vec::new();
            loop {
                items.push(p.next_str()?);
                let separator = p.next_other()?;
                match separator.text.as_str() {
                    "]" => return Ok(items),
                    "," => continue,
                    _ => {
                        return Err(p.error_at(
                            &separator,
                            ErrorKind::Mismatch {
                                expected: "OTHER(,) or OTHER(])".into(),
                                found: separator.to_string(),
                            },
                        ))
                    }
                }
            }
        })
    }

    /// `Comparator = Op StrOrListStr`, resolved once the values are known.
    fn parse_comparator(&mut self) -> Result<Comparator> {
        let op = self.next_ident()?;
        let values = self.parse_string_tokens()?;
        let patterns = values.iter().map(|t| t.text.clone()).collect();
        Comparator::new(&op.text, patterns).map_err(|err| match err {
            ComparatorError::UnknownOperator => self.error_at(
                &op,
                ErrorKind::UnknownOperator {
                    op: op.text.clone(),
                },
            ),
            ComparatorError::InvalidRegex { index, source } => {
                let token = values.get(index).unwrap_or(&op);
                self.error_at(
                    token,
                    ErrorKind::InvalidRegex {
                        pattern: token.text.clone(),
                        source,
                    },
                )
            }
        })
    }

    // ========================================================================
    // EXPRESSIONS
    // ========================================================================

    /// `Expr = ExprHeader | ExprMessage | PredBool`
    pub fn parse_expr(&mut self) -> Result<Expr> {
        let header = match self.parse_expr_header() {
            Ok(expr) => return Ok(expr.into()),
            Err(err) => err,
        };
        let message = match self.parse_expr_message() {
            Ok(expr) => return Ok(expr.into()),
            Err(err) => err,
        };
        match self.parse_pred_bool() {
            Ok(pred) => Ok(pred.into()),
            Err(err) => Err(furthest(furthest(header, message), err)),
        }
    }

    /// `ExprHeader = ("header"|"headers") StrOrListStr Comparator`
    pub fn parse_expr_header(&mut self) -> Result<ExprHeader> {
        self.attempt(|p| {
            p.expect_ident("header")
                .or_else(|_| p.expect_ident("headers"))?;
            let headers = p.parse_str_or_list_str()?;
            let op = p.parse_comparator()?;
            Ok(ExprHeader { headers, op })
        })
    }

    /// `ExprMessage = "message" Comparator`
    pub fn parse_expr_message(&mut self) -> Result<ExprMessage> {
        self.attempt(|p| {
            p.expect_ident("message")?;
            let op = p.parse_comparator()?;
            Ok(ExprMessage { op })
        })
    }

    /// `PredBool = "true" | "false"`
    pub fn parse_pred_bool(&mut self) -> Result<PredBool> {
        if self.expect_ident("true").is_ok() {
            return Ok(PredBool(true));
        }
        self.expect_ident("false").map(|_| PredBool(false))
    }

    // ========================================================================
    // STATEMENTS
    // ========================================================================

    /// `Stmt = StmtLabel | StmtMark | StmtSkip | StmtStop`
    pub fn parse_stmt(&mut self) -> Result<Stmt> {
        let label = match self.parse_stmt_label() {
            Ok(stmt) => return Ok(stmt.into()),
            Err(err) => err,
        };
        let mark = match self.parse_stmt_mark() {
            Ok(stmt) => return Ok(stmt.into()),
            Err(err) => err,
        };
        let skip = match self.parse_stmt_skip() {
            Ok(stmt) => return Ok(stmt.into()),
            Err(err) => err,
        };
        match self.parse_stmt_stop() {
            Ok(stmt) => Ok(stmt.into()),
            Err(err) => Err(furthest(furthest(furthest(label, mark), skip), err)),
        }
    }

    /// `StmtLabel = "label" StrOrListStr`
    pub fn parse_stmt_label(&mut self) -> Result<StmtLabel> {
        self.attempt(|p| {
            p.expect_ident("label")?;
            let labels = p.parse_str_or_list_str()?;
            Ok(StmtLabel { labels })
        })
    }

    /// `StmtMark = "mark" "as" "read"`
    pub fn parse_stmt_mark(&mut self) -> Result<StmtMark> {
        self.attempt(|p| {
            p.expect_ident("mark")?;
            p.expect_ident("as")?;
            p.expect_ident("read")?;
            Ok(StmtMark)
        })
    }

    /// `StmtSkip = "skip" "inbox"`
    pub fn parse_stmt_skip(&mut self) -> Result<StmtSkip> {
        self.attempt(|p| {
            p.expect_ident("skip")?;
            p.expect_ident("inbox")?;
            Ok(StmtSkip)
        })
    }

    /// `StmtStop = "stop"`
    pub fn parse_stmt_stop(&mut self) -> Result<StmtStop> {
        self.expect_ident("stop").map(|_| StmtStop)
    }

    // ========================================================================
    // ERROR HANDLING
    // ========================================================================

    /// A mismatch at the current token, or EOF past the end.
    pub fn error_expected(&self, expected: impl Into<String>) -> KoskinonError {
        match self.peek() {
            Some(token) => self.error_at(
                token,
                ErrorKind::Mismatch {
                    expected: expected.into(),
                    found: token.to_string(),
                },
            ),
            None => self.eof_error(),
        }
    }

    fn error_at(&self, token: &Token, kind: ErrorKind) -> KoskinonError {
        KoskinonError::new(kind, token.position.clone(), token.span, &self.source)
    }

    /// Anchored at the last token, pointing just past it.
    fn eof_error(&self) -> KoskinonError {
        let (position, span) = match self.tokens.last() {
            Some(last) => (
                last.position.clone(),
                Span {
                    start: last.span.end,
                    end: last.span.end,
                },
            ),
            None => {
                let end = self.source.content().len();
                (
                    Position::start_of(self.source.shared_name()),
                    Span { start: end, end },
                )
            }
        };
        KoskinonError::new(ErrorKind::UnexpectedEof, position, span, &self.source)
    }
}

fn texts(tokens: Vec<Token>) -> Vec<String> {
    tokens.into_iter().map(|t| t.text).collect()
}

/// Of two failed alternatives, keep the one that got further into the input.
fn furthest(first: KoskinonError, second: KoskinonError) -> KoskinonError {
    if second.source_info.primary_span.offset() > first.source_info.primary_span.offset() {
        second
    } else {
        first
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCategory;

    fn parser(input: &str) -> Parser {
        Parser::new(&SourceContext::from_file("test", input)).unwrap()
    }

    #[test]
    fn test_parse_list_str() {
        for (input, want) in [
            (r#"["hello world"]"#, vec!["hello world"]),
            (r#"["hello", "world"]"#, vec!["hello", "world"]),
            ("[\"hello\", `world`]", vec!["hello", "world"]),
        ] {
            assert_eq!(parser(input).parse_list_str().unwrap(), want, "input: {input}");
        }
    }

    #[test]
    fn test_parse_list_str_rejects_malformed() {
        for input in [
            r#""hello world""#,
            r#"["hello",]"#,
            r#"[,"hello",]"#,
            "[]",
            r#"["hello""#,
            r#"["hello" "world"]"#,
            r#"["hello"; "world"]"#,
        ] {
            let mut p = parser(input);
            assert!(p.parse_list_str().is_err(), "input: {input}");
            assert_eq!(p.position(), 0, "cursor moved for: {input}");
        }
    }

    #[test]
    fn test_parse_str_or_list_str() {
        assert_eq!(parser("`a`").parse_str_or_list_str().unwrap(), vec!["a"]);
        assert_eq!(
            parser(r#"["a", "b"]"#).parse_str_or_list_str().unwrap(),
            vec!["a", "b"]
        );
        assert!(parser("a").parse_str_or_list_str().is_err());
    }

    #[test]
    fn test_parse_stmt_mark() {
        assert!(parser("mark as read").parse_stmt_mark().is_ok());
        assert!(parser(r#""mark as read""#).parse_stmt_mark().is_err());

        let mut p = parser("mark");
        let err = p.parse_stmt_mark().unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnexpectedEof);
        assert_eq!(p.position(), 0);
    }

    #[test]
    fn test_failed_statement_allows_retry() {
        let mut p = parser("mark as unread");
        assert!(p.parse_stmt_mark().is_err());
        assert_eq!(p.position(), 0);
        assert!(p.parse_stmt_stop().is_err());
        assert_eq!(p.next_ident().unwrap().text, "mark");
    }

    #[test]
    fn test_parse_stmt_alternatives() {
        assert_eq!(
            parser(r#"label ["a", "b"]"#).parse_stmt().unwrap(),
            Stmt::Label(StmtLabel {
                labels: vec!["a".into(), "b".into()]
            })
        );
        assert_eq!(parser("mark as read").parse_stmt().unwrap(), Stmt::Mark(StmtMark));
        assert_eq!(parser("skip inbox").parse_stmt().unwrap(), Stmt::Skip(StmtSkip));
        assert_eq!(parser("stop").parse_stmt().unwrap(), Stmt::Stop(StmtStop));
    }

    #[test]
    fn test_parse_stmt_reports_furthest_failure() {
        let err = parser("skip outbox").parse_stmt().unwrap_err();
        assert_eq!(
            err.kind,
            ErrorKind::Mismatch {
                expected: "IDENT(inbox)".into(),
                found: "IDENT(outbox)".into(),
            }
        );
        assert_eq!(err.position.column, 6);
    }

    #[test]
    fn test_parse_expr_header_keyword_forms() {
        let one = parser(r#"header "From" is "a""#).parse_expr_header().unwrap();
        let many = parser(r#"headers ["From"] are ["a"]"#)
            .parse_expr_header()
            .unwrap();
        assert_eq!(one, many);
    }

    #[test]
    fn test_parse_expr_header_restores_after_semantic_error() {
        let mut p = parser(r#"header "From" frobs "a""#);
        let err = p.parse_expr_header().unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Semantic);
        assert_eq!(
            err.kind,
            ErrorKind::UnknownOperator {
                op: "frobs".into()
            }
        );
        assert_eq!(p.position(), 0);
    }

    #[test]
    fn test_invalid_regex_is_anchored_at_pattern() {
        let err = parser(r#"message matches ["ok", "(unclosed"]"#)
            .parse_expr_message()
            .unwrap_err();
        assert!(matches!(
            &err.kind,
            ErrorKind::InvalidRegex { pattern, .. } if pattern == "(unclosed"
        ));
        assert_eq!(err.position.column, 24);
    }

    #[test]
    fn test_parse_expr_variants() {
        assert!(matches!(
            parser(r#"header "To" contains "x""#).parse_expr().unwrap(),
            Expr::Header(_)
        ));
        assert!(matches!(
            parser(r#"message match "x""#).parse_expr().unwrap(),
            Expr::Message(_)
        ));
        assert_eq!(parser("true").parse_expr().unwrap(), Expr::Bool(PredBool(true)));
        assert_eq!(parser("false").parse_expr().unwrap(), Expr::Bool(PredBool(false)));
    }

    #[test]
    fn test_expect_eof_errors() {
        let mut p = parser("stop stop");
        p.parse_stmt().unwrap();
        let err = p.expect_eof().unwrap_err();
        assert!(matches!(err.kind, ErrorKind::TrailingInput { .. }));

        let err = Parser::from_tokens(Vec::new(), &SourceContext::anonymous(""))
            .next_ident()
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnexpectedEof);
        assert_eq!(err.to_string(), "1:1: unexpected EOF");
    }

    #[test]
    fn test_eof_is_anchored_at_last_token() {
        let err = parser("message\n  contains").parse_expr_message().unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnexpectedEof);
        assert_eq!(err.to_string(), "test:2:3: unexpected EOF");
    }

    #[test]
    fn test_parse_expression_requires_whole_source() {
        let source = SourceContext::anonymous("true false");
        assert!(matches!(
            parse_expression(&source).unwrap_err().kind,
            ErrorKind::TrailingInput { .. }
        ));
        let source = SourceContext::anonymous("skip inbox");
        assert_eq!(parse_statement(&source).unwrap(), Stmt::Skip(StmtSkip));
    }
}
