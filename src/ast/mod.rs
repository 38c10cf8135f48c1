//! AST module for the koskinon rule language
//!
//! Expressions decide whether a rule applies to a message; statements say what
//! to do with it. Both are closed sums built once by the parser and immutable
//! afterwards, so a parsed rule can be shared and evaluated from any thread.
//!
//! `Display` renders canonical source that parses back to an equal node.

use std::fmt;

use serde::Serialize;

use crate::message::Message;

pub mod comparator;

pub use comparator::{Comparator, ComparatorError};

// ============================================================================
// EXPRESSIONS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Expr {
    Header(ExprHeader),
    Message(ExprMessage),
    Bool(PredBool),
}

/// `header "From" contains "x"`: tests the values of the named headers that
/// the message actually has.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExprHeader {
    pub headers: Vec<String>,
    pub op: Comparator,
}

/// `message contains "x"`: tests the body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExprMessage {
    pub op: Comparator,
}

/// `true` or `false`, whatever the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PredBool(pub bool);

impl Expr {
    pub fn eval<M: Message + ?Sized>(&self, message: &M) -> bool {
        let matched = match self {
            Expr::Header(expr) => expr.eval(message),
            Expr::Message(expr) => expr.eval(message),
            Expr::Bool(pred) => pred.eval(message),
        };
        tracing::trace!(expr = %self, matched, "evaluated expression");
        matched
    }
}

impl ExprHeader {
    /// Missing headers contribute nothing; if none are present the result is
    /// false.
    pub fn eval<M: Message + ?Sized>(&self, message: &M) -> bool {
        let values: Vec<&str> = self
            .headers
            .iter()
            .filter_map(|name| message.header(name))
            .collect();
        self.op.eval(&values)
    }
}

impl ExprMessage {
    pub fn eval<M: Message + ?Sized>(&self, message: &M) -> bool {
        self.op.eval(&[message.body()])
    }
}

impl PredBool {
    pub fn eval<M: Message + ?Sized>(&self, _message: &M) -> bool {
        self.0
    }
}

impl From<ExprHeader> for Expr {
    fn from(expr: ExprHeader) -> Self {
        Expr::Header(expr)
    }
}

impl From<ExprMessage> for Expr {
    fn from(expr: ExprMessage) -> Self {
        Expr::Message(expr)
    }
}

impl From<PredBool> for Expr {
    fn from(pred: PredBool) -> Self {
        Expr::Bool(pred)
    }
}

// ============================================================================
// STATEMENTS
// ============================================================================

/// Actions taken when a rule matches. Statements do not execute themselves;
/// the mailbox layer interprets them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stmt {
    Label(StmtLabel),
    Mark(StmtMark),
    Skip(StmtSkip),
    Stop(StmtStop),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StmtLabel {
    pub labels: Vec<String>,
}

/// `mark as read`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct StmtMark;

/// `skip inbox`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct StmtSkip;

/// `stop`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct StmtStop;

impl From<StmtLabel> for Stmt {
    fn from(stmt: StmtLabel) -> Self {
        Stmt::Label(stmt)
    }
}

impl From<StmtMark> for Stmt {
    fn from(stmt: StmtMark) -> Self {
        Stmt::Mark(stmt)
    }
}

impl From<StmtSkip> for Stmt {
    fn from(stmt: StmtSkip) -> Self {
        Stmt::Skip(stmt)
    }
}

impl From<StmtStop> for Stmt {
    fn from(stmt: StmtStop) -> Self {
        Stmt::Stop(stmt)
    }
}

// ============================================================================
// RENDERING
// ============================================================================

/// Raw strings cannot hold a backtick; such values fall back to quotes.
fn write_str(f: &mut fmt::Formatter<'_>, value: &str) -> fmt::Result {
    if !value.contains('`') {
        write!(f, "`{value}`")
    } else {
        write!(f, "\"{value}\"")
    }
}

/// One value renders bare, several as a bracketed list.
pub(crate) fn write_str_or_list<S: AsRef<str>>(
    f: &mut fmt::Formatter<'_>,
    values: &[S],
) -> fmt::Result {
    if let [single] = values {
        return write_str(f, single.as_ref());
    }
    f.write_str("[")?;
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write_str(f, value.as_ref())?;
    }
    f.write_str("]")
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Header(expr) => fmt::Display::fmt(expr, f),
            Expr::Message(expr) => fmt::Display::fmt(expr, f),
            Expr::Bool(pred) => fmt::Display::fmt(pred, f),
        }
    }
}

impl fmt::Display for ExprHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keyword = if self.headers.len() == 1 { "header" } else { "headers" };
        write!(f, "{keyword} ")?;
        write_str_or_list(f, &self.headers)?;
        write!(f, " {}", self.op)
    }
}

impl fmt::Display for ExprMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "message {}", self.op)
    }
}

impl fmt::Display for PredBool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stmt::Label(stmt) => {
                f.write_str("label ")?;
                write_str_or_list(f, &stmt.labels)
            }
            Stmt::Mark(_) => f.write_str("mark as read"),
            Stmt::Skip(_) => f.write_str("skip inbox"),
            Stmt::Stop(_) => f.write_str("stop"),
        }
    }
}
