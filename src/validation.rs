pub mod grammar;

// Re-exports for concise imports
pub use grammar::{
    validate_grammar, validate_grammar_str, verify, Grammar, ValidationReporter, ValidationResult,
};
