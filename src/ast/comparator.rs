//! Comparators: the binary relation between the values pulled out of a
//! message and the values written in a rule.
//!
//! Every comparator is existential over both sides: it holds as soon as one
//! candidate relates to one target. No candidates means no match.

use std::fmt;

use regex::Regex;
use serde::{Serialize, Serializer};

use super::write_str_or_list;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "op", content = "values", rename_all = "lowercase")]
pub enum Comparator {
    /// `is` / `are`: exact string equality.
    Equal(Vec<String>),
    /// `contains` / `contain`: substring.
    Contains(Vec<String>),
    /// `matches` / `match`: unanchored regex search.
    Match(#[serde(serialize_with = "serialize_patterns")] Vec<Regex>),
}

/// Why [`Comparator::new`] refused to build a comparator.
#[derive(Debug, Clone, PartialEq)]
pub enum ComparatorError {
    UnknownOperator,
    /// The value at `index` is not a valid regular expression.
    InvalidRegex { index: usize, source: regex::Error },
}

impl Comparator {
    /// Resolve an operator keyword and its values into a comparator. For
    /// `match` every value is compiled; the first bad pattern fails the lot.
    pub fn new(op: &str, values: Vec<String>) -> Result<Self, ComparatorError> {
        match op {
            "is" | "are" => Ok(Comparator::Equal(values)),
            "contains" | "contain" => Ok(Comparator::Contains(values)),
            "matches" | "match" => values
                .iter()
                .enumerate()
                .map(|(index, pattern)| {
                    Regex::new(pattern)
                        .map_err(|source| ComparatorError::InvalidRegex { index, source })
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Comparator::Match),
            _ => Err(ComparatorError::UnknownOperator),
        }
    }

    pub fn eval<S: AsRef<str>>(&self, candidates: &[S]) -> bool {
        let mut candidates = candidates.iter().map(|c| c.as_ref());
        match self {
            Comparator::Equal(targets) => {
                candidates.any(|c| targets.iter().any(|t| c == t.as_str()))
            }
            Comparator::Contains(targets) => {
                candidates.any(|c| targets.iter().any(|t| c.contains(t.as_str())))
            }
            Comparator::Match(regexes) => {
                candidates.any(|c| regexes.iter().any(|r| r.is_match(c)))
            }
        }
    }

    /// The canonical keyword for this comparator.
    pub fn keyword(&self) -> &'static str {
        match self {
            Comparator::Equal(_) => "is",
            Comparator::Contains(_) => "contains",
            Comparator::Match(_) => "matches",
        }
    }

    /// The target values as written in the rule.
    pub fn values(&self) -> Vec<&str> {
        match self {
            Comparator::Equal(values) | Comparator::Contains(values) => {
                values.iter().map(String::as_str).collect()
            }
            Comparator::Match(regexes) => regexes.iter().map(Regex::as_str).collect(),
        }
    }
}

impl PartialEq for Comparator {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Comparator::Equal(a), Comparator::Equal(b)) => a == b,
            (Comparator::Contains(a), Comparator::Contains(b)) => a == b,
            (Comparator::Match(a), Comparator::Match(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.as_str() == y.as_str())
            }
            _ => false,
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ", self.keyword())?;
        write_str_or_list(f, &self.values())
    }
}

#[allow(clippy::ptr_arg)]
fn serialize_patterns<S: Serializer>(
    regexes: &Vec<Regex>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(regexes.iter().map(Regex::as_str))
}
