//! Listing of the functions a query can call

use crate::registry::Registry;

/// One signature per line, sorted by name; macros are marked.
pub fn list_functions(registry: &Registry) -> String {
    let mut out = String::new();
    for function in registry.functions() {
        out.push_str(&function.descriptor().signature());
        if function.is_macro() {
            out.push_str("  (macro)");
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DType;

    #[test]
    fn test_lists_builtins_and_macros() {
        let mut registry = Registry::with_builtins();
        registry
            .register_macro("stale", "created < today - 1y", &[], DType::Bool, false)
            .unwrap();
        let listing = list_functions(&registry);
        assert!(listing.contains("tag(item, string, [string]) -> string\n"));
        assert!(listing.contains("stale() -> bool  (macro)\n"));
    }
}
