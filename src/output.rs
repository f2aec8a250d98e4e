//! Rendering of matched items.
//!
//! Items are printed either as `position line` text, the way task lists are
//! usually shown, or as JSON records (compact or pretty) for scripting.
//!
//! # Examples
//!
//! ```
//! use qql_lang::TaskList;
//! use qql_lang::output::{ItemRecord, to_json};
//!
//! let list = TaskList::parse("(A) call mom @phone\n");
//! let records = ItemRecord::from_items(&list, list.iter().cloned());
//! let json = to_json(&records).unwrap();
//! assert!(json.contains("\"priority\":\"A\""));
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

use crate::task::{Item, TaskList};

/// JSON shape of one item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemRecord {
    /// 1-based position in the task list; 0 if the item is not a member
    pub position: usize,
    pub raw: String,
    pub done: bool,
    pub priority: Option<String>,
    pub creation_date: Option<String>,
    pub completion_date: Option<String>,
    pub description: String,
    pub projects: Vec<String>,
    pub contexts: Vec<String>,
    pub tags: BTreeMap<String, Vec<String>>,
}

impl ItemRecord {
    pub fn new(list: &TaskList, item: &Arc<Item>) -> Self {
        let date = |d: chrono::NaiveDate| d.format("%Y-%m-%d").to_string();
        ItemRecord {
            position: list.position(item).unwrap_or(0),
            raw: item.raw().to_string(),
            done: item.is_done(),
            priority: item.priority().map(String::from),
            creation_date: item.creation_date().map(date),
            completion_date: item.completion_date().map(date),
            description: item.description().to_string(),
            projects: item.projects().to_vec(),
            contexts: item.contexts().to_vec(),
            tags: item.tags().clone(),
        }
    }

    pub fn from_items(list: &TaskList, items: impl IntoIterator<Item = Arc<Item>>) -> Vec<Self> {
        items.into_iter().map(|item| Self::new(list, &item)).collect()
    }
}

pub fn to_json(records: &[ItemRecord]) -> serde_json::Result<String> {
    serde_json::to_string(records)
}

/// Pretty-printed with 2-space indentation.
pub fn to_json_pretty(records: &[ItemRecord]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(records)
}

/// One `position line` row per item, right-aligning positions.
pub fn to_text(list: &TaskList, items: &[Arc<Item>]) -> String {
    let width = list.len().max(1).to_string().len();
    let mut out = String::new();
    for item in items {
        let position = list.position(item).unwrap_or(0);
        out.push_str(&format!("{:>width$} {}\n", position, item.raw(), width = width));
    }
    out
}
