//! Rule source lexer.
//!
//! Turns source text into a flat sequence of [`Token`]s. Keywords are not
//! recognised here: `header`, `contains` or `true` are plain identifiers and
//! the parser decides what they mean.

use std::fmt;
use std::sync::Arc;

use crate::errors::{ErrorKind, KoskinonError, Position, Result, SourceContext, Span};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Ident,
    /// Any single punctuation character: `[`, `]`, `,` and everything else.
    Other,
    /// Quoted or raw string, delimiters stripped.
    String,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TokenKind::Ident => "IDENT",
            TokenKind::Other => "OTHER",
            TokenKind::String => "STRING",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub position: Position,
    /// Byte range of the whole token, delimiters included.
    pub span: Span,
    pub text: String,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.kind, self.text)
    }
}

/// Lex a whole source. On error no tokens are returned.
pub fn lex(source: &SourceContext) -> Result<Vec<Token>> {
    Lexer::new(source).tokenize()
}

pub struct Lexer<'a> {
    source: &'a SourceContext,
    input: &'a str,
    name: Arc<str>,
    pos: usize,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a SourceContext) -> Self {
        Self {
            source,
            input: source.content(),
            name: source.shared_name(),
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        let mut chars = self.input[self.pos..].chars();
        chars.next();
        chars.next()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    fn read_while(&mut self, pred: impl Fn(char) -> bool) {
        while self.peek().is_some_and(&pred) {
            self.advance();
        }
    }

    fn position(&self) -> Position {
        Position {
            source: Arc::clone(&self.name),
            offset: self.pos,
            line: self.line,
            column: self.column,
        }
    }

    fn error(&self, kind: ErrorKind, start: Position) -> KoskinonError {
        let span = Span {
            start: start.offset,
            end: self.pos.max(start.offset),
        };
        KoskinonError::new(kind, start, span, self.source)
    }

    fn is_ident_start(ch: char) -> bool {
        ch.is_alphabetic() || ch == '_'
    }

    fn is_ident_char(ch: char) -> bool {
        ch.is_alphanumeric() || ch == '_'
    }

    fn starts_numeral(&self, ch: char) -> bool {
        ch.is_ascii_digit() || (ch == '.' && self.peek_second().is_some_and(|c| c.is_ascii_digit()))
    }

    pub fn tokenize(mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace_and_comments()?;
            let Some(ch) = self.peek() else { break };
            let start = self.position();

            let kind = match ch {
                '"' => {
                    self.scan_quoted(&start)?;
                    TokenKind::String
                }
                '`' => {
                    self.scan_raw(&start)?;
                    TokenKind::String
                }
                '\'' => {
                    self.scan_char_literal();
                    let text = self.input[start.offset..self.pos].to_string();
                    return Err(self.error(ErrorKind::UnexpectedToken { text }, start));
                }
                _ if self.starts_numeral(ch) => {
                    self.read_while(|c| c.is_alphanumeric() || c == '_' || c == '.');
                    let text = self.input[start.offset..self.pos].to_string();
                    return Err(self.error(ErrorKind::UnexpectedToken { text }, start));
                }
                _ if Self::is_ident_start(ch) => {
                    self.read_while(Self::is_ident_char);
                    TokenKind::Ident
                }
                _ => {
                    self.advance();
                    TokenKind::Other
                }
            };

            let raw = &self.input[start.offset..self.pos];
            let text = match kind {
                // both delimiters are one byte wide
                TokenKind::String => raw[1..raw.len() - 1].to_string(),
                _ => raw.to_string(),
            };
            tokens.push(Token {
                kind,
                span: Span {
                    start: start.offset,
                    end: self.pos,
                },
                position: start,
                text,
            });
        }

        tracing::debug!(source = %self.name, tokens = tokens.len(), "lexed rule source");
        Ok(tokens)
    }

    fn skip_whitespace_and_comments(&mut self) -> Result<()> {
        loop {
            match (self.peek(), self.peek_second()) {
                (Some(' ' | '\t' | '\n' | '\r'), _) => {
                    self.advance();
                }
                (Some('/'), Some('/')) => self.read_while(|c| c != '\n'),
                (Some('/'), Some('*')) => {
                    let start = self.position();
                    self.advance();
                    self.advance();
                    loop {
                        match self.advance() {
                            Some('*') if self.peek() == Some('/') => {
                                self.advance();
                                break;
                            }
                            Some(_) => {}
                            None => {
                                return Err(self.error(
                                    ErrorKind::UnterminatedLiteral { what: "comment" },
                                    start,
                                ))
                            }
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    /// `"…"`: a backslash protects the next character from ending the
    /// literal, but escapes are kept verbatim.
    fn scan_quoted(&mut self, start: &Position) -> Result<()> {
        self.advance();
        loop {
            match self.peek() {
                Some('"') => {
                    self.advance();
                    return Ok(());
                }
                Some('\\') => {
                    self.advance();
                    if self.peek().is_some_and(|c| c != '\n') {
                        self.advance();
                    }
                }
                Some('\n') | None => {
                    return Err(self.error(
                        ErrorKind::UnterminatedLiteral {
                            what: "string literal",
                        },
                        start.clone(),
                    ))
                }
                Some(_) => {
                    self.advance();
                }
            }
        }
    }

    fn scan_raw(&mut self, start: &Position) -> Result<()> {
        self.advance();
        self.read_while(|c| c != '`');
        if self.advance().is_none() {
            return Err(self.error(
                ErrorKind::UnterminatedLiteral {
                    what: "raw string literal",
                },
                start.clone(),
            ));
        }
        Ok(())
    }

    fn scan_char_literal(&mut self) {
        self.advance();
        while let Some(ch) = self.peek() {
            match ch {
                '\n' => break,
                '\'' => {
                    self.advance();
                    break;
                }
                '\\' => {
                    self.advance();
                    self.advance();
                }
                _ => {
                    self.advance();
                }
            }
        }
    }
}
