use std::fmt;
use std::sync::Arc;

use crate::task::{Item, TaskList};

type MatchFn = dyn Fn(&TaskList, &Arc<Item>) -> bool + Send + Sync;

/// A compiled item filter.
///
/// Predicates are cheap to clone and hold no mutable state, so one compiled
/// predicate can be shared between threads.
#[derive(Clone)]
pub struct Predicate {
    test: Arc<MatchFn>,
}

impl Predicate {
    pub fn new<F>(test: F) -> Self
    where
        F: Fn(&TaskList, &Arc<Item>) -> bool + Send + Sync + 'static,
    {
        Predicate {
            test: Arc::new(test),
        }
    }

    /// Matches every item.
    pub fn always() -> Self {
        Self::new(|_, _| true)
    }

    /// Whether `item`, a member of `list`, satisfies the predicate.
    pub fn matches(&self, list: &TaskList, item: &Arc<Item>) -> bool {
        (self.test)(list, item)
    }

    /// The items of `list` satisfying the predicate, in list order.
    pub fn filter(&self, list: &TaskList) -> Vec<Arc<Item>> {
        list.iter()
            .filter(|item| self.matches(list, item))
            .cloned()
            .collect()
    }

    /// Conjunction; stops at the first predicate that fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use qql_lang::{Predicate, TaskList, compile_range, compile_word_search};
    ///
    /// let list = TaskList::parse("buy milk\nbuy bread\ncall mom\n");
    /// let both = Predicate::and(vec![
    ///     compile_range("2-").unwrap(),
    ///     compile_word_search("buy"),
    /// ]);
    /// let found: Vec<_> = both.filter(&list).iter().map(|i| i.raw().to_string()).collect();
    /// assert_eq!(found, vec!["buy bread"]);
    /// ```
    pub fn and(predicates: Vec<Predicate>) -> Self {
        Self::new(move |list, item| predicates.iter().all(|p| p.matches(list, item)))
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Predicate")
    }
}
