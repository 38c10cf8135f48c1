use std::collections::{HashMap, HashSet, VecDeque};

use crate::validation::grammar::{
    is_lexical, Expression, Grammar, Production, Symbol, ValidationReporter, ValidationResult,
};

/// Validates a parsed grammar for various correctness issues.
/// Each validator focuses on a single validation concern.
pub struct GrammarValidators;

impl GrammarValidators {
    /// Checks that no production is defined twice.
    pub fn check_duplicate_productions(grammar: &Grammar, result: &mut ValidationResult) {
        let mut seen: HashMap<&str, &Production> = HashMap::new();

        for production in &grammar.productions {
            if let Some(first) = seen.get(production.name.as_str()) {
                result.report_error(format!(
                    "{}: production `{}` redefined (first defined at {})",
                    production.position, production.name, first.position
                ));
                continue;
            }
            seen.insert(&production.name, production);
        }
    }

    /// Checks that every start symbol is a defined, non-lexical production.
    pub fn check_start_symbols(grammar: &Grammar, start: &[&str], result: &mut ValidationResult) {
        for &name in start {
            if is_lexical(name) {
                result.report_error(format!("start symbol `{name}` is a lexical production"));
                continue;
            }
            if grammar.get(name).is_none() {
                result.report_error(format!("start symbol `{name}` is not defined"));
            }
        }
    }

    /// Checks for references to undefined productions.
    pub fn check_references(grammar: &Grammar, result: &mut ValidationResult) {
        let defined: HashSet<&str> = grammar.productions.iter().map(|p| p.name.as_str()).collect();

        for production in &grammar.productions {
            for name in references(production) {
                if defined.contains(name.text.as_str()) {
                    continue;
                }

                result.report_error(format!(
                    "{}: `{}` references undefined production `{}`",
                    name.position, production.name, name.text
                ));
            }
        }
    }

    /// Checks that every production can be reached from a start symbol.
    pub fn check_reachability(grammar: &Grammar, start: &[&str], result: &mut ValidationResult) {
        let mut reached: HashSet<&str> = HashSet::new();
        let mut queue: VecDeque<&str> = start.iter().copied().collect();

        while let Some(name) = queue.pop_front() {
            if !reached.insert(name) {
                continue;
            }
            let Some(production) = grammar.get(name) else {
                continue;
            };
            queue.extend(references(production).map(|s| s.text.as_str()));
        }

        for production in &grammar.productions {
            if reached.contains(production.name.as_str()) {
                continue;
            }

            result.report_warning(format!(
                "{}: production `{}` is unreachable",
                production.position, production.name
            ));
        }
    }

    /// Checks that lexical productions only refer to other lexical productions.
    pub fn check_lexical_references(grammar: &Grammar, result: &mut ValidationResult) {
        for production in grammar.productions.iter().filter(|p| p.is_lexical()) {
            for name in references(production) {
                if is_lexical(&name.text) {
                    continue;
                }

                result.report_error(format!(
                    "{}: lexical production `{}` references non-lexical `{}`",
                    name.position, production.name, name.text
                ));
            }
        }
    }

    /// Checks that tokens are non-empty and that ranges are well formed.
    pub fn check_tokens(grammar: &Grammar, result: &mut ValidationResult) {
        for production in &grammar.productions {
            let Some(expr) = &production.expr else {
                continue;
            };

            expr.walk(&mut |leaf| match leaf {
                Expression::Token(token) if token.text.is_empty() => {
                    result.report_error(format!("{}: empty token", token.position));
                }
                Expression::Range { begin, end } => Self::report_bad_range(begin, end, result),
                _ => {}
            });
        }
    }

    fn report_bad_range(begin: &Symbol, end: &Symbol, result: &mut ValidationResult) {
        let Some(low) = decode_char(&begin.text) else {
            result.report_error(format!(
                "{}: range bound `{}` is not a single character",
                begin.position, begin.text
            ));
            return;
        };
        let Some(high) = decode_char(&end.text) else {
            result.report_error(format!(
                "{}: range bound `{}` is not a single character",
                end.position, end.text
            ));
            return;
        };

        if low > high {
            result.report_error(format!(
                "{}: empty range `{}` … `{}`",
                begin.position, begin.text, end.text
            ));
        }
    }

    /// Empty productions are legal but usually a mistake.
    pub fn check_empty_productions(grammar: &Grammar, result: &mut ValidationResult) {
        for production in grammar.productions.iter().filter(|p| p.expr.is_none()) {
            result.report_warning(format!(
                "{}: production `{}` is empty",
                production.position, production.name
            ));
        }
    }
}

/// Every production name referenced from `production`, in source order.
fn references(production: &Production) -> impl Iterator<Item = &Symbol> {
    let mut names = Vec::new();
    if let Some(expr) = &production.expr {
        expr.walk(&mut |leaf| {
            if let Expression::Name(name) = leaf {
                names.push(name);
            }
        });
    }
    names.into_iter()
}

/// Decode a token that should denote exactly one character, honouring the
/// escapes a quoted token may contain.
fn decode_char(text: &str) -> Option<char> {
    let mut chars = text.chars();
    let first = chars.next()?;
    if first != '\\' {
        return chars.next().is_none().then_some(first);
    }

    let escape = chars.next()?;
    let rest = chars.as_str();
    let simple = match escape {
        'a' => Some('\u{07}'),
        'b' => Some('\u{08}'),
        'f' => Some('\u{0C}'),
        'n' => Some('\n'),
        'r' => Some('\r'),
        't' => Some('\t'),
        'v' => Some('\u{0B}'),
        '\\' | '"' | '\'' | '`' => Some(escape),
        _ => None,
    };
    if let Some(ch) = simple {
        return rest.is_empty().then_some(ch);
    }

    let digits = match escape {
        'x' => 2,
        'u' => 4,
        'U' => 8,
        _ => return None,
    };
    if rest.len() != digits || !rest.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(rest, 16).ok().and_then(char::from_u32)
}
