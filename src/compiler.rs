//! Entry points turning query text into [`Predicate`]s.
//!
//! Three query syntaxes are understood: QQL formulas, position ranges such
//! as `1-3,7`, and plain word search. [`compile_query`] tries them in that
//! order and never fails.

use std::fmt;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::debug;

use crate::ast::Expr;
use crate::checker::TypeContext;
use crate::evaluator::Env;
use crate::parser::{self, ParseError};
use crate::predicate::Predicate;
use crate::registry::Registry;
use crate::task::{Item, TaskList};
use crate::types::DType;

/// The current date in UTC, as bound to `today`.
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// A validated top-level QQL query.
#[derive(Debug, Clone)]
pub struct CompiledQuery {
    expr: Arc<Expr>,
}

impl CompiledQuery {
    pub fn compile(registry: &Registry, text: &str) -> Result<Self, ParseError> {
        let expr = parser::parse(registry, text, &TypeContext::top_level(), DType::Bool)?;
        Ok(CompiledQuery {
            expr: Arc::new(expr),
        })
    }

    /// The validated tree, with implicit items filled in.
    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    /// Evaluates against `item` with `today` fixed to the given date.
    pub fn matches_on(&self, list: &TaskList, item: &Arc<Item>, today: NaiveDate) -> bool {
        let mut env = Env::for_item(list, item, today);
        self.expr.eval(&mut env).as_bool()
    }

    pub fn matches(&self, list: &TaskList, item: &Arc<Item>) -> bool {
        self.matches_on(list, item, today())
    }

    pub fn into_predicate(self) -> Predicate {
        Predicate::new(move |list, item| self.matches(list, item))
    }
}

impl fmt::Display for CompiledQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.expr)
    }
}

/// Compiles a QQL formula.
///
/// # Examples
///
/// ```
/// use qql_lang::{Registry, TaskList, compile_qql};
///
/// let list = TaskList::parse("water plants +garden\nx mow lawn +garden\ncall mom\n");
/// let open_garden = compile_qql(&Registry::with_builtins(), "!done && +garden").unwrap();
/// assert_eq!(open_garden.filter(&list).len(), 1);
/// ```
pub fn compile_qql(registry: &Registry, text: &str) -> Result<Predicate, ParseError> {
    Ok(CompiledQuery::compile(registry, text)?.into_predicate())
}

/// Errors for malformed position ranges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RangeError {
    /// Nothing but whitespace
    Empty,
    /// A comma-separated part that is not `n`, `a-b`, `-b` or `a-`
    Malformed(String),
    /// Positions start at 1
    ZeroPosition(String),
    /// `a-b` with `a` greater than `b`
    Reversed(String),
}

impl fmt::Display for RangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RangeError::Empty => write!(f, "empty range"),
            RangeError::Malformed(part) => write!(f, "malformed range '{}'", part),
            RangeError::ZeroPosition(part) => {
                write!(f, "range '{}' contains position 0; positions start at 1", part)
            }
            RangeError::Reversed(part) => write!(f, "range '{}' ends before it starts", part),
        }
    }
}

impl std::error::Error for RangeError {}

/// Inclusive bounds; `None` leaves that side open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Span {
    start: Option<usize>,
    end: Option<usize>,
}

impl Span {
    fn contains(&self, position: usize) -> bool {
        self.start.is_none_or(|s| position >= s) && self.end.is_none_or(|e| position <= e)
    }
}

fn parse_position(text: &str, part: &str) -> Result<usize, RangeError> {
    let text = text.trim();
    if text.is_empty() || !text.chars().all(|c| c.is_ascii_digit()) {
        return Err(RangeError::Malformed(part.to_string()));
    }
    match text.parse::<usize>() {
        Ok(0) => Err(RangeError::ZeroPosition(part.to_string())),
        Ok(n) => Ok(n),
        Err(_) => Err(RangeError::Malformed(part.to_string())),
    }
}

fn parse_span(part: &str) -> Result<Span, RangeError> {
    let trimmed = part.trim();
    let span = match trimmed.split_once('-') {
        None => {
            let n = parse_position(trimmed, trimmed)?;
            Span {
                start: Some(n),
                end: Some(n),
            }
        }
        Some((start, end)) => {
            let (start, end) = (start.trim(), end.trim());
            if start.is_empty() && end.is_empty() {
                return Err(RangeError::Malformed(trimmed.to_string()));
            }
            let start = match start {
                "" => None,
                s => Some(parse_position(s, trimmed)?),
            };
            let end = match end {
                "" => None,
                e => Some(parse_position(e, trimmed)?),
            };
            Span { start, end }
        }
    };

    if let Span {
        start: Some(s),
        end: Some(e),
    } = span
        && s > e
    {
        return Err(RangeError::Reversed(trimmed.to_string()));
    }
    Ok(span)
}

/// Compiles a comma-separated list of 1-based positions and ranges.
///
/// # Examples
///
/// ```
/// use qql_lang::{TaskList, compile_range};
///
/// let list: TaskList = (1..=9).map(|n| qql_lang::Item::parse(&format!("task {}", n))).collect();
/// let picked = compile_range("-4, 8-").unwrap().filter(&list);
/// assert_eq!(picked.len(), 6);
/// ```
pub fn compile_range(text: &str) -> Result<Predicate, RangeError> {
    if text.trim().is_empty() {
        return Err(RangeError::Empty);
    }
    let spans = text
        .split(',')
        .map(parse_span)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Predicate::new(move |list, item| {
        list.position(item)
            .is_some_and(|position| spans.iter().any(|span| span.contains(position)))
    }))
}

/// Case-insensitive substring search over item descriptions.
pub fn compile_word_search(text: &str) -> Predicate {
    let needle = text.to_lowercase();
    Predicate::new(move |_, item| item.description().to_lowercase().contains(&needle))
}

/// Compiles `text` as QQL, else as a range, else as a word search.
pub fn compile_query(registry: &Registry, text: &str) -> Predicate {
    let qql_error = match compile_qql(registry, text) {
        Ok(predicate) => return predicate,
        Err(e) => e,
    };
    debug!(query = %text, error = %qql_error, "not a QQL query, trying range");

    match compile_range(text) {
        Ok(predicate) => predicate,
        Err(range_error) => {
            debug!(query = %text, error = %range_error, "not a range, using word search");
            compile_word_search(text)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_forms() {
        assert_eq!(
            parse_span(" 3 "),
            Ok(Span {
                start: Some(3),
                end: Some(3)
            })
        );
        assert_eq!(
            parse_span("-4"),
            Ok(Span {
                start: None,
                end: Some(4)
            })
        );
        assert_eq!(
            parse_span("8-"),
            Ok(Span {
                start: Some(8),
                end: None
            })
        );
        assert_eq!(
            parse_span("2 - 5"),
            Ok(Span {
                start: Some(2),
                end: Some(5)
            })
        );
    }

    #[test]
    fn test_span_errors() {
        assert_eq!(parse_span("-"), Err(RangeError::Malformed("-".into())));
        assert_eq!(parse_span("0"), Err(RangeError::ZeroPosition("0".into())));
        assert_eq!(parse_span("5-2"), Err(RangeError::Reversed("5-2".into())));
        assert_eq!(parse_span("1-2-3"), Err(RangeError::Malformed("1-2-3".into())));
        assert_eq!(parse_span("x"), Err(RangeError::Malformed("x".into())));
        assert_eq!(parse_span(""), Err(RangeError::Malformed("".into())));
    }
}
