//! Compile a query and show how it was understood

use std::path::PathBuf;

use super::CliError;
use crate::compiler::CompiledQuery;
use crate::config::load_registry;
use crate::sort::compile_sort;

/// Options for the check command
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// The QQL query (or sort specification) to compile
    pub query: String,
    /// Config file declaring macros
    pub config: Option<PathBuf>,
    /// Treat the query as a sort specification
    pub sort: bool,
}

/// Compiles the query and returns its canonical, fully parenthesised form.
pub fn execute_check(options: &CheckOptions) -> Result<String, CliError> {
    let registry = load_registry(options.config.as_deref())?;

    if options.sort {
        let order = compile_sort(&registry, &options.query)?;
        return Ok(order.to_string());
    }

    let query = CompiledQuery::compile(&registry, &options.query)?;
    Ok(query.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_form() {
        let options = CheckOptions {
            query: "true && false || true".to_string(),
            ..Default::default()
        };
        assert_eq!(execute_check(&options).unwrap(), "((true && false) || true)");
    }

    #[test]
    fn test_sort_form() {
        let options = CheckOptions {
            query: "priority desc, description".to_string(),
            sort: true,
            ..Default::default()
        };
        assert_eq!(
            execute_check(&options).unwrap(),
            "priority(it) desc, description(it)"
        );
    }

    #[test]
    fn test_type_error() {
        let options = CheckOptions {
            query: "true && \"true\"".to_string(),
            ..Default::default()
        };
        assert!(matches!(execute_check(&options), Err(CliError::Parse(_))));
    }
}
