//! koskinon: the rule language of a mail filter.
//!
//! A rule pairs an expression that decides whether a message matches with
//! statements saying what to do with it:
//!
//! ```
//! use koskinon::{parse_expression, SimpleMessage, SourceContext};
//!
//! let source = SourceContext::anonymous(r#"header "From" contains "example.com""#);
//! let expr = parse_expression(&source).unwrap();
//! let message = SimpleMessage::new("").with_header("From", "a@example.com");
//! assert!(expr.eval(&message));
//! ```

pub mod ast;
pub mod cli;
pub mod errors;
pub mod message;
pub mod syntax;
pub mod validation;

pub use ast::{Comparator, Expr, Stmt};
pub use errors::{ErrorKind, KoskinonError, Position, SourceContext};
pub use message::{Message, SimpleMessage};
pub use syntax::{parse_expression, parse_statement, GRAMMAR, GRAMMAR_START};
