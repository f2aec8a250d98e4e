//! Select, sort and print tasks

use std::path::PathBuf;

use tracing::info;

use super::CliError;
use crate::compiler::{compile_qql, compile_query, compile_range, compile_word_search};
use crate::config::load_registry;
use crate::output::{ItemRecord, to_json, to_json_pretty, to_text};
use crate::predicate::Predicate;
use crate::sort::compile_sort;
use crate::task::TaskList;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// `position line`
    #[default]
    Text,
    Json,
    JsonPretty,
}

/// Options for the filter command
#[derive(Debug, Clone, Default)]
pub struct FilterOptions {
    /// The task list, one task per line
    pub tasks: String,
    pub qql: Option<String>,
    pub range: Option<String>,
    pub search: Option<String>,
    /// Tried as QQL, then range, then word search
    pub query: Option<String>,
    pub sort: Option<String>,
    /// Config file declaring macros
    pub config: Option<PathBuf>,
    pub format: OutputFormat,
}

/// Runs the filter and renders the matching tasks.
pub fn execute_filter(options: &FilterOptions) -> Result<String, CliError> {
    let registry = load_registry(options.config.as_deref())?;
    let list = TaskList::parse(&options.tasks);

    let mut predicates = Vec::new();
    if let Some(text) = &options.qql {
        predicates.push(compile_qql(&registry, text)?);
    }
    if let Some(text) = &options.range {
        predicates.push(compile_range(text)?);
    }
    if let Some(text) = &options.search {
        predicates.push(compile_word_search(text));
    }
    if let Some(text) = &options.query {
        predicates.push(compile_query(&registry, text));
    }
    let order = match &options.sort {
        Some(text) => compile_sort(&registry, text)?,
        None => Default::default(),
    };

    let matched = Predicate::and(predicates).filter(&list);
    info!(tasks = list.len(), matched = matched.len(), "filtered task list");
    let matched = order.sort_items(&list, matched);

    let rendered = match options.format {
        OutputFormat::Text => to_text(&list, &matched),
        OutputFormat::Json => to_json(&ItemRecord::from_items(&list, matched))? + "\n",
        OutputFormat::JsonPretty => to_json_pretty(&ItemRecord::from_items(&list, matched))? + "\n",
    };
    Ok(rendered)
}
