//! koskinon Error Handling
//!
//! Every failure in the lexer, the parser and the comparator construction is a
//! [`KoskinonError`]. It carries a structured [`Position`] so callers can
//! re-render or aggregate diagnostics, and enough source information to be
//! rendered as a `miette` diagnostic with a labelled snippet.

use miette::{Diagnostic, LabeledSpan, NamedSource, SourceSpan};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

// ============================================================================
// SOURCE CONTEXT - Named rule source
// ============================================================================

/// A named piece of rule source text.
///
/// Cloning is cheap: the text is shared, so every speculative parse failure can
/// hold on to the source for rendering.
#[derive(Debug, Clone)]
pub struct SourceContext {
    name: Arc<str>,
    named: Arc<NamedSource<String>>,
}

impl SourceContext {
    /// Create a source context from a name (used in positions) and its text.
    pub fn from_file(name: impl Into<String>, content: impl Into<String>) -> Self {
        let name: String = name.into();
        let named = NamedSource::new(&name, content.into());
        Self {
            name: Arc::from(name),
            named: Arc::new(named),
        }
    }

    /// Create an unnamed source, as used for inline snippets.
    pub fn anonymous(content: impl Into<String>) -> Self {
        Self::from_file("", content)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn content(&self) -> &str {
        self.named.inner()
    }

    /// The shared source name, as stored in every [`Position`].
    pub fn shared_name(&self) -> Arc<str> {
        Arc::clone(&self.name)
    }

    /// Convert to NamedSource for use with miette error reporting
    pub fn to_named_source(&self) -> Arc<NamedSource<String>> {
        Arc::clone(&self.named)
    }
}

// ============================================================================
// POSITIONS AND SPANS
// ============================================================================

/// Byte range in the source text.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl From<Span> for SourceSpan {
    fn from(span: Span) -> Self {
        SourceSpan::from(span.start..span.end)
    }
}

/// Where a token starts: source name, byte offset, 1-based line and column.
///
/// Columns count characters, not bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Position {
    pub source: Arc<str>,
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl Position {
    /// The first character of `source`.
    pub fn start_of(source: Arc<str>) -> Self {
        Self {
            source,
            offset: 0,
            line: 1,
            column: 1,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.source.is_empty() {
            write!(f, "{}:{}", self.line, self.column)
        } else {
            write!(f, "{}:{}:{}", self.source, self.line, self.column)
        }
    }
}

// ============================================================================
// ERROR KINDS
// ============================================================================

/// What went wrong.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ErrorKind {
    // Lexical errors
    #[error("unexpected `{text}`")]
    UnexpectedToken { text: String },
    #[error("{what} not terminated")]
    UnterminatedLiteral { what: &'static str },

    // Syntax errors
    #[error("expected {expected}, got {found}")]
    Mismatch { expected: String, found: String },
    #[error("unexpected EOF")]
    UnexpectedEof,
    #[error("expected EOF, got {found}")]
    TrailingInput { found: String },

    // Semantic errors
    #[error("unknown binary operator `{op}`")]
    UnknownOperator { op: String },
    #[error("invalid regular expression `{pattern}`")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// The three failure classes of the rule language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Lexical,
    Syntax,
    Semantic,
}

impl ErrorCategory {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Lexical => "lex",
            ErrorCategory::Syntax => "parse",
            ErrorCategory::Semantic => "semantic",
        }
    }
}

impl ErrorKind {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::UnexpectedToken { .. } | Self::UnterminatedLiteral { .. } => {
                ErrorCategory::Lexical
            }
            Self::Mismatch { .. } | Self::UnexpectedEof | Self::TrailingInput { .. } => {
                ErrorCategory::Syntax
            }
            Self::UnknownOperator { .. } | Self::InvalidRegex { .. } => ErrorCategory::Semantic,
        }
    }

    /// Get error code suffix for diagnostic codes
    pub const fn code_suffix(&self) -> &'static str {
        match self {
            Self::UnexpectedToken { .. } => "unexpected_token",
            Self::UnterminatedLiteral { .. } => "unterminated_literal",
            Self::Mismatch { .. } => "mismatch",
            Self::UnexpectedEof => "unexpected_eof",
            Self::TrailingInput { .. } => "trailing_input",
            Self::UnknownOperator { .. } => "unknown_operator",
            Self::InvalidRegex { .. } => "invalid_regex",
        }
    }

    fn primary_label(&self) -> &'static str {
        match self {
            Self::UnexpectedToken { .. } => "unsupported token",
            Self::UnterminatedLiteral { .. } => "starts here",
            Self::Mismatch { .. } => "unexpected token",
            Self::UnexpectedEof => "input ends after this",
            Self::TrailingInput { .. } => "not consumed",
            Self::UnknownOperator { .. } => "unknown operator",
            Self::InvalidRegex { .. } => "does not compile",
        }
    }

    fn default_help(&self) -> Option<String> {
        match self {
            Self::UnexpectedToken { .. } => {
                Some("numbers and character literals are not part of the rule language; quote the value".into())
            }
            Self::UnknownOperator { .. } => {
                Some("use one of `is`, `are`, `contains`, `contain`, `matches` or `match`".into())
            }
            Self::InvalidRegex { source, .. } => Some(source.to_string()),
            _ => None,
        }
    }
}

// ============================================================================
// THE ERROR TYPE
// ============================================================================

/// Source information for rendering.
#[derive(Debug, Clone)]
pub struct SourceInfo {
    pub source: Arc<NamedSource<String>>,
    pub primary_span: SourceSpan,
}

/// Diagnostic enhancement data
#[derive(Debug, Clone)]
pub struct DiagnosticInfo {
    pub help: Option<String>,
    pub error_code: String,
}

/// The single error type of the rule language.
#[derive(Debug)]
pub struct KoskinonError {
    /// What went wrong
    pub kind: ErrorKind,
    /// Where it happened, as structured data
    pub position: Position,
    pub source_info: SourceInfo,
    pub diagnostic_info: DiagnosticInfo,
}

impl KoskinonError {
    /// Build an error anchored at `position`, labelling `span` in `source`.
    pub fn new(kind: ErrorKind, position: Position, span: Span, source: &SourceContext) -> Self {
        let error_code = format!(
            "koskinon::{}::{}",
            kind.category().as_str(),
            kind.code_suffix()
        );
        let help = kind.default_help();
        Self {
            kind,
            position,
            source_info: SourceInfo {
                source: source.to_named_source(),
                primary_span: span.into(),
            },
            diagnostic_info: DiagnosticInfo { help, error_code },
        }
    }

    pub fn category(&self) -> ErrorCategory {
        self.kind.category()
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.diagnostic_info.help = Some(help.into());
        self
    }
}

impl fmt::Display for KoskinonError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.position, self.kind)
    }
}

impl std::error::Error for KoskinonError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        std::error::Error::source(&self.kind)
    }
}

impl Diagnostic for KoskinonError {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(&self.diagnostic_info.error_code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.diagnostic_info
            .help
            .as_ref()
            .map(|h| Box::new(h) as Box<dyn fmt::Display + 'a>)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let labels = vec![LabeledSpan::new_with_span(
            Some(self.kind.primary_label().to_string()),
            self.source_info.primary_span,
        )];
        Some(Box::new(labels.into_iter()))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(&*self.source_info.source)
    }
}

pub type Result<T, E = KoskinonError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    fn error_at(kind: ErrorKind, name: &str) -> KoskinonError {
        let source = SourceContext::from_file(name, "header 42");
        let position = Position {
            source: source.shared_name(),
            offset: 7,
            line: 1,
            column: 8,
        };
        KoskinonError::new(kind, position, Span { start: 7, end: 9 }, &source)
    }

    #[test]
    fn test_position_display_with_and_without_name() {
        let named = Position {
            source: Arc::from("rules"),
            offset: 0,
            line: 3,
            column: 5,
        };
        assert_eq!(named.to_string(), "rules:3:5");
        assert_eq!(Position::start_of(Arc::from("")).to_string(), "1:1");
    }

    #[test]
    fn test_display_prefixes_position() {
        let err = error_at(ErrorKind::UnexpectedToken { text: "42".into() }, "rules");
        assert_eq!(err.to_string(), "rules:1:8: unexpected `42`");
        assert_eq!(err.category(), ErrorCategory::Lexical);
        assert_eq!(err.diagnostic_info.error_code, "koskinon::lex::unexpected_token");
    }

    #[test]
    fn test_regex_error_exposes_source() {
        let source = regex::Regex::new("(").unwrap_err();
        let err = error_at(
            ErrorKind::InvalidRegex {
                pattern: "(".into(),
                source,
            },
            "",
        );
        assert_eq!(err.category(), ErrorCategory::Semantic);
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.diagnostic_info.help.is_some());
    }
}
