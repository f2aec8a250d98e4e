//! Minimal todo.txt task model consumed by the query engine.
//!
//! Only what the engine reads is parsed: completion, priority, dates,
//! projects, contexts and `key:value` tags. Lines are kept verbatim so they
//! can be printed back unchanged.

use std::collections::BTreeMap;
use std::sync::{Arc, LazyLock};

use chrono::NaiveDate;
use regex::Regex;

static PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<done>x\s+)?(?:\((?P<prio>[A-Z])\)\s+)?(?P<rest>.*)$")
        .expect("prefix pattern is valid")
});

static DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<date>\d{4}-\d{2}-\d{2})\s+(?P<rest>.*)$").expect("date pattern is valid")
});

static PROJECT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|\s)(\+\S+)").expect("project pattern is valid"));

static CONTEXT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|\s)(@\S+)").expect("context pattern is valid"));

static TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|\s)([^\s:+@][^\s:]*):(\S+)").expect("tag pattern is valid")
});

/// One task line.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    raw: String,
    done: bool,
    priority: Option<char>,
    completion_date: Option<NaiveDate>,
    creation_date: Option<NaiveDate>,
    description: String,
    projects: Vec<String>,
    contexts: Vec<String>,
    tags: BTreeMap<String, Vec<String>>,
}

impl Item {
    /// Parses a single todo.txt line.
    ///
    /// # Examples
    ///
    /// ```
    /// use qql_lang::task::Item;
    ///
    /// let item = Item::parse("(A) call mom +family @phone due:2024-05-01");
    /// assert_eq!(item.priority(), Some('A'));
    /// assert_eq!(item.projects(), ["+family"]);
    /// assert_eq!(item.tag_values("due"), ["2024-05-01"]);
    /// ```
    pub fn parse(line: &str) -> Self {
        let raw = line.trim_end().to_string();

        let (done, priority, mut rest) = match PREFIX.captures(&raw) {
            Some(caps) => (
                caps.name("done").is_some(),
                caps.name("prio").and_then(|m| m.as_str().chars().next()),
                caps.name("rest").map_or("", |m| m.as_str()),
            ),
            None => (false, None, raw.as_str()),
        };

        let mut completion_date = None;
        let mut creation_date = None;
        if let Some((date, remainder)) = leading_date(rest) {
            rest = remainder;
            if done {
                completion_date = Some(date);
                if let Some((created, remainder)) = leading_date(rest) {
                    creation_date = Some(created);
                    rest = remainder;
                }
            } else {
                creation_date = Some(date);
            }
        }

        let description = rest.to_string();
        let projects = unique_matches(&PROJECT, &description);
        let contexts = unique_matches(&CONTEXT, &description);

        let mut tags: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for caps in TAG.captures_iter(&description) {
            tags.entry(caps[1].to_string())
                .or_default()
                .push(caps[2].to_string());
        }

        Item {
            raw,
            done,
            priority,
            completion_date,
            creation_date,
            description,
            projects,
            contexts,
            tags,
        }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn priority(&self) -> Option<char> {
        self.priority
    }

    pub fn completion_date(&self) -> Option<NaiveDate> {
        self.completion_date
    }

    pub fn creation_date(&self) -> Option<NaiveDate> {
        self.creation_date
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn projects(&self) -> &[String] {
        &self.projects
    }

    pub fn contexts(&self) -> &[String] {
        &self.contexts
    }

    pub fn tags(&self) -> &BTreeMap<String, Vec<String>> {
        &self.tags
    }

    /// All values recorded for a tag key, in order of appearance.
    pub fn tag_values(&self, key: &str) -> &[String] {
        self.tags.get(key).map_or(&[], |values| values.as_slice())
    }
}

fn leading_date(text: &str) -> Option<(NaiveDate, &str)> {
    let caps = DATE.captures(text)?;
    let date = NaiveDate::parse_from_str(&caps["date"], "%Y-%m-%d").ok()?;
    let rest = caps.name("rest").map_or("", |m| m.as_str());
    Some((date, rest))
}

fn unique_matches(pattern: &Regex, text: &str) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();
    for caps in pattern.captures_iter(text) {
        let token = caps[1].to_string();
        if !found.contains(&token) {
            found.push(token);
        }
    }
    found
}

/// An ordered list of tasks with stable 1-based positions.
///
/// Items are shared behind `Arc`s so that a query can bind the whole
/// collection for every item it tests without copying it.
#[derive(Debug, Clone, Default)]
pub struct TaskList {
    items: Arc<Vec<Arc<Item>>>,
}

impl TaskList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses one task per non-blank line.
    pub fn parse(text: &str) -> Self {
        text.lines()
            .filter(|line| !line.trim().is_empty())
            .map(Item::parse)
            .collect()
    }

    pub fn push(&mut self, item: Item) {
        Arc::make_mut(&mut self.items).push(Arc::new(item));
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &Arc<Vec<Arc<Item>>> {
        &self.items
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Item>> {
        self.items.iter()
    }

    /// The item at a 1-based position.
    pub fn get(&self, position: usize) -> Option<&Arc<Item>> {
        position.checked_sub(1).and_then(|i| self.items.get(i))
    }

    /// 1-based position of an item of this list, by identity.
    pub fn position(&self, item: &Arc<Item>) -> Option<usize> {
        position_in(&self.items, item)
    }
}

/// 1-based position of `item` in `items`, compared by identity.
pub fn position_in(items: &[Arc<Item>], item: &Arc<Item>) -> Option<usize> {
    items
        .iter()
        .position(|candidate| Arc::ptr_eq(candidate, item))
        .map(|i| i + 1)
}

impl FromIterator<Item> for TaskList {
    fn from_iter<I: IntoIterator<Item = Item>>(iter: I) -> Self {
        TaskList {
            items: Arc::new(iter.into_iter().map(Arc::new).collect()),
        }
    }
}
