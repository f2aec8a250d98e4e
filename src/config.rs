//! JSON configuration declaring user macros.
//!
//! ```json
//! {
//!   "macros": [
//!     {
//!       "name": "blocked",
//!       "query": "exists a in tags(arg0, \"after\"): exists i in items: contains(tags(i, \"id\"), a) && !done(i)",
//!       "args": ["item"],
//!       "result": "bool",
//!       "inject_it": true
//!     }
//!   ]
//! }
//! ```

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::registry::{Registry, RegistryError};
use crate::types::DType;

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub macros: Vec<MacroConfig>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MacroConfig {
    pub name: String,
    pub query: String,
    #[serde(default)]
    pub args: Vec<DType>,
    #[serde(default = "default_result")]
    pub result: DType,
    #[serde(default)]
    pub inject_it: bool,
}

fn default_result() -> DType {
    DType::Bool
}

#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: io::Error },
    Json(serde_json::Error),
    InvalidQuery(RegistryError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, source } => {
                write!(f, "cannot read config file {}: {}", path.display(), source)
            }
            ConfigError::Json(e) => write!(f, "config file is not valid JSON: {}", e),
            ConfigError::InvalidQuery(e) => write!(f, "config file contains invalid query: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            ConfigError::Json(e) => Some(e),
            ConfigError::InvalidQuery(e) => Some(e),
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Json(e)
    }
}

impl From<RegistryError> for ConfigError {
    fn from(e: RegistryError) -> Self {
        ConfigError::InvalidQuery(e)
    }
}

impl Config {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&text)?;
        info!(path = %path.display(), macros = config.macros.len(), "loaded configuration");
        Ok(config)
    }

    /// Registers every macro in declaration order; later macros may call
    /// earlier ones.
    pub fn apply(&self, registry: &mut Registry) -> Result<(), ConfigError> {
        for m in &self.macros {
            debug!(macro_name = %m.name, query = %m.query, "registering configured macro");
            registry.register_macro(&m.name, &m.query, &m.args, m.result, m.inject_it)?;
        }
        Ok(())
    }
}

/// A registry with the built-ins plus the macros of the given config file.
pub fn load_registry(path: Option<&Path>) -> Result<Registry, ConfigError> {
    let mut registry = Registry::with_builtins();
    if let Some(path) = path {
        Config::load(path)?.apply(&mut registry)?;
    }
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config =
            Config::from_json(r#"{"macros": [{"name": "always", "query": "true"}]}"#).unwrap();
        let m = &config.macros[0];
        assert!(m.args.is_empty());
        assert_eq!(m.result, DType::Bool);
        assert!(!m.inject_it);
    }

    #[test]
    fn test_snake_case_types() {
        let config = Config::from_json(
            r#"{"macros": [{"name": "n", "query": "count(arg0)", "args": ["item_collection"], "result": "int"}]}"#,
        )
        .unwrap();
        assert_eq!(config.macros[0].args, vec![DType::ItemCollection]);
        assert_eq!(config.macros[0].result, DType::Int);
    }

    #[test]
    fn test_empty_object() {
        assert_eq!(Config::from_json("{}").unwrap(), Config::default());
    }
}
