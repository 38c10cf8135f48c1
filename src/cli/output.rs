//! Handles all user-facing output for the CLI.

use std::io::{self, Write};

use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::syntax::Token;
use crate::validation::ValidationResult;

/// Prints one token per line as `position KIND(text)`.
pub fn print_tokens(tokens: &[Token]) -> io::Result<()> {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    for token in tokens {
        stdout.set_color(ColorSpec::new().set_dimmed(true))?;
        write!(stdout, "{}", token.position)?;
        stdout.reset()?;
        writeln!(stdout, " {token}")?;
    }
    Ok(())
}

/// Prints an evaluation result: green `true` or red `false`.
pub fn print_verdict(matched: bool) -> io::Result<()> {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    let color = if matched { Color::Green } else { Color::Red };
    stdout.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true))?;
    write!(stdout, "{matched}")?;
    stdout.reset()?;
    writeln!(stdout)
}

/// Prints the sections of a grammar validation report on stderr.
pub fn print_report(result: &ValidationResult) -> io::Result<()> {
    let mut stderr = StandardStream::stderr(ColorChoice::Auto);
    print_section(&mut stderr, &result.errors, Color::Red, "GRAMMAR VALIDATION ERRORS")?;
    print_section(&mut stderr, &result.warnings, Color::Yellow, "GRAMMAR WARNINGS")?;
    print_section(&mut stderr, &result.suggestions, Color::Cyan, "GRAMMAR SUGGESTIONS")?;

    if result.is_clean() {
        stderr.set_color(ColorSpec::new().set_fg(Some(Color::Green)).set_bold(true))?;
        writeln!(stderr, "Grammar validation passed - no issues found")?;
        stderr.reset()?;
    }
    Ok(())
}

// ============================================================================
// PRIVATE HELPERS
// ============================================================================

fn print_section(
    out: &mut StandardStream,
    items: &[String],
    color: Color,
    title: &str,
) -> io::Result<()> {
    if items.is_empty() {
        return Ok(());
    }

    out.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true))?;
    writeln!(out, "{title}:")?;
    out.reset()?;
    for item in items {
        writeln!(out, "  • {item}")?;
    }
    writeln!(out)
}
