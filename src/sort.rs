//! Ordering keys written in QQL.
//!
//! A sort specification is a comma-separated list of expressions, each
//! optionally followed by `asc` or `desc`:
//!
//! ```text
//! priority desc, tagDate("due"), description
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use chrono::NaiveDate;

use crate::ast::Expr;
use crate::checker::TypeContext;
use crate::compiler::today;
use crate::evaluator::Env;
use crate::lexer::Lexer;
use crate::parser::{ParseError, Parser};
use crate::registry::Registry;
use crate::task::{Item, TaskList};
use crate::types::{DType, TypeError};
use crate::value::Value;

#[derive(Debug, Clone)]
pub struct SortKey {
    expr: Arc<Expr>,
    descending: bool,
}

impl SortKey {
    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    pub fn is_descending(&self) -> bool {
        self.descending
    }
}

/// A validated list of sort keys. No keys keeps the original order.
#[derive(Debug, Clone, Default)]
pub struct SortOrder {
    keys: Vec<SortKey>,
}

impl SortOrder {
    /// Keeps items in the order given.
    pub fn identity() -> Self {
        Self::default()
    }

    pub fn keys(&self) -> &[SortKey] {
        &self.keys
    }

    pub fn is_identity(&self) -> bool {
        self.keys.is_empty()
    }

    /// Sorts `items`, members of `list`, by the keys; ties keep their order.
    pub fn sort_on(&self, list: &TaskList, items: Vec<Arc<Item>>, today: NaiveDate) -> Vec<Arc<Item>> {
        if self.is_identity() {
            return items;
        }

        let mut keyed: Vec<(Vec<Value>, Arc<Item>)> = items
            .into_iter()
            .map(|item| {
                let mut env = Env::for_item(list, &item, today);
                let values = self.keys.iter().map(|key| key.expr.eval(&mut env)).collect();
                (values, item)
            })
            .collect();

        keyed.sort_by(|(a, _), (b, _)| self.compare(a, b));
        keyed.into_iter().map(|(_, item)| item).collect()
    }

    pub fn sort_items(&self, list: &TaskList, items: Vec<Arc<Item>>) -> Vec<Arc<Item>> {
        self.sort_on(list, items, today())
    }

    /// All items of `list`, sorted.
    pub fn sort(&self, list: &TaskList) -> Vec<Arc<Item>> {
        self.sort_items(list, list.iter().cloned().collect())
    }

    fn compare(&self, a: &[Value], b: &[Value]) -> Ordering {
        for ((key, a), b) in self.keys.iter().zip(a).zip(b) {
            let ordering = a.compare(b);
            let ordering = if key.descending {
                ordering.reverse()
            } else {
                ordering
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, key) in self.keys.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", key.expr)?;
            if key.descending {
                f.write_str(" desc")?;
            }
        }
        Ok(())
    }
}

fn sortable(dtype: DType) -> bool {
    dtype == DType::Bool || dtype.is_ordered()
}

/// Compiles a sort specification against the top-level variables.
///
/// # Examples
///
/// ```
/// use qql_lang::{Registry, TaskList, compile_sort};
///
/// let list = TaskList::parse("(C) later\n(A) first\nnone\n");
/// let order = compile_sort(&Registry::with_builtins(), "priority desc").unwrap();
/// let sorted: Vec<_> = order.sort(&list).iter().map(|i| i.description().to_string()).collect();
/// assert_eq!(sorted, vec!["first", "later", "none"]);
/// ```
pub fn compile_sort(registry: &Registry, text: &str) -> Result<SortOrder, ParseError> {
    let mut parser = Parser::new(registry, Lexer::new(text))?;
    let syntax = parser.parse_sort_keys()?;
    let context = TypeContext::top_level();

    let mut keys = Vec::with_capacity(syntax.len());
    for key in syntax {
        let mut expr = key.expr;
        let dtype = expr.validate(&mut context.clone())?;
        if !sortable(dtype) {
            return Err(TypeError::NotOrderable(dtype).into());
        }
        keys.push(SortKey {
            expr: Arc::new(expr),
            descending: key.descending,
        });
    }
    Ok(SortOrder { keys })
}
