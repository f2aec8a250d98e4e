use chrono::NaiveDate;
use qql_lang::{
    CompiledQuery, DType, ParseError, Registry, RegistryError, TaskList, TypeError, compile_qql,
};

const BLOCKED: &str = "exists a in tags(arg0, \"after\"): exists i in items: contains(tags(i, \"id\"), a) && !done(i)";

const DEPENDENCIES: &str = "\
precondition id:1
blocked item after:1
x completed precondition id:2
item after completed after:2
";

fn registry_with_blocked() -> Registry {
    let mut registry = Registry::with_builtins();
    registry
        .register_macro("blocked", BLOCKED, &[DType::Item], DType::Bool, true)
        .unwrap();
    registry
}

fn positions(registry: &Registry, tasks: &str, query: &str) -> Vec<usize> {
    let list = TaskList::parse(tasks);
    let predicate = compile_qql(registry, query)
        .unwrap_or_else(|e| panic!("failed to compile {}: {}", query, e));
    predicate
        .filter(&list)
        .iter()
        .filter_map(|item| list.position(item))
        .collect()
}

// ============================================================================
// Dependency macro
// ============================================================================

#[test]
fn test_open_unblocked_items() {
    let registry = registry_with_blocked();
    assert_eq!(positions(&registry, DEPENDENCIES, "!done && !blocked"), vec![1, 4]);
}

#[test]
fn test_blocked_items() {
    let registry = registry_with_blocked();
    assert_eq!(positions(&registry, DEPENDENCIES, "blocked"), vec![2]);
}

#[test]
fn test_macro_call_forms_are_equivalent() {
    let registry = registry_with_blocked();
    let expected = positions(&registry, DEPENDENCIES, "blocked");
    assert_eq!(positions(&registry, DEPENDENCIES, "blocked()"), expected);
    assert_eq!(positions(&registry, DEPENDENCIES, "blocked(it)"), expected);
}

#[test]
fn test_macro_on_quantified_item() {
    let registry = registry_with_blocked();
    assert_eq!(
        positions(&registry, DEPENDENCIES, "exists i in items: blocked(i)"),
        vec![1, 2, 3, 4]
    );
}

#[test]
fn test_macro_canonical_form() {
    let registry = registry_with_blocked();
    let query = CompiledQuery::compile(&registry, "!done && !blocked").unwrap();
    assert_eq!(query.to_string(), "(!done(it) && !blocked(it))");
}

// ============================================================================
// Arguments and results
// ============================================================================

#[test]
fn test_macro_with_scalar_arguments() {
    let mut registry = Registry::with_builtins();
    registry
        .register_macro(
            "between",
            "arg1 <= arg0 && arg0 <= arg2",
            &[DType::Int, DType::Int, DType::Int],
            DType::Bool,
            false,
        )
        .unwrap();
    assert_eq!(
        positions(&registry, "a\nb\nc\nd\n", "between(position, 2, 3)"),
        vec![2, 3]
    );
}

#[test]
fn test_macro_with_non_bool_result() {
    let mut registry = Registry::with_builtins();
    registry
        .register_macro("due", "tagDate(arg0, \"due\", date(9999, 12, 31))", &[DType::Item], DType::Date, true)
        .unwrap();
    let tasks = "a due:2024-01-01\nb\n";
    assert_eq!(positions(&registry, tasks, "due < date(2025, 1, 1)"), vec![1]);
}

#[test]
fn test_macro_reads_caller_environment() {
    let mut registry = Registry::with_builtins();
    registry
        .register_macro("first", "position == 1", &[], DType::Bool, false)
        .unwrap();
    assert_eq!(positions(&registry, "a\nb\n", "first"), vec![1]);

    let list = TaskList::parse("a\nb\n");
    let query = CompiledQuery::compile(&registry, "exists it in items: first").unwrap();
    let today = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    assert!(query.matches_on(&list, &list.items()[1], today));
}

#[test]
fn test_macro_rejected_where_free_variables_change_type() {
    let mut registry = Registry::with_builtins();
    registry
        .register_macro("first", "position == 1", &[], DType::Bool, false)
        .unwrap();

    let err = CompiledQuery::compile(&registry, "exists it in projects(it): first").unwrap_err();
    assert_eq!(
        err,
        ParseError::Type(TypeError::ShadowedContext {
            function: "first".into(),
            variable: "it".into(),
            expected: DType::Item,
            found: DType::String,
        })
    );
    assert!(CompiledQuery::compile(&registry, "exists items in projects: first").is_err());
    assert!(CompiledQuery::compile(&registry, "exists today in contexts: first").is_err());

    // the same names rebound at their own types are fine
    assert!(CompiledQuery::compile(&registry, "exists it in items: first").is_ok());
}

#[test]
fn test_nested_macro_bodies_are_checked_at_registration() {
    let mut registry = Registry::with_builtins();
    registry
        .register_macro("first", "position == 1", &[], DType::Bool, false)
        .unwrap();
    assert!(registry
        .register_macro("anyFirst", "exists it in projects: first", &[], DType::Bool, false)
        .is_err());
    assert!(registry
        .register_macro("anyFirst", "exists i in items: first", &[], DType::Bool, false)
        .is_ok());
}

#[test]
fn test_macros_may_call_earlier_macros() {
    let mut registry = registry_with_blocked();
    registry
        .register_macro("ready", "!done(arg0) && !blocked(arg0)", &[DType::Item], DType::Bool, true)
        .unwrap();
    assert_eq!(positions(&registry, DEPENDENCIES, "ready"), vec![1, 4]);
}

#[test]
fn test_macro_argument_binding_is_restored() {
    let mut registry = Registry::with_builtins();
    registry
        .register_macro("inc", "arg0 + 1", &[DType::Int], DType::Int, false)
        .unwrap();
    registry
        .register_macro("twice", "inc(inc(arg0))", &[DType::Int], DType::Int, false)
        .unwrap();
    assert_eq!(positions(&registry, "a\n", "twice(1) == 3 && inc(5) == 6"), vec![1]);
}

// ============================================================================
// Registration
// ============================================================================

#[test]
fn test_invalid_macro_is_rejected() {
    let mut registry = Registry::with_builtins();
    let err = registry
        .register_macro("bad", "arg0 && true", &[DType::Int], DType::Bool, false)
        .unwrap_err();
    let RegistryError::InvalidMacro { name, .. } = &err;
    assert_eq!(name, "bad");
    assert!(!registry.contains("bad"));
}

#[test]
fn test_macro_result_type_is_checked() {
    let mut registry = Registry::with_builtins();
    assert!(registry
        .register_macro("n", "1", &[], DType::Bool, false)
        .is_err());
}

#[test]
fn test_unknown_macro_argument() {
    let mut registry = Registry::with_builtins();
    assert!(registry
        .register_macro("m", "arg1", &[DType::Bool], DType::Bool, false)
        .is_err());
}

#[test]
fn test_macro_without_injection_needs_item() {
    let mut registry = Registry::with_builtins();
    registry
        .register_macro("isDone", "done(arg0)", &[DType::Item], DType::Bool, false)
        .unwrap();
    assert!(compile_qql(&registry, "isDone").is_err());
    assert!(compile_qql(&registry, "isDone(it)").is_ok());
}

#[test]
fn test_redefinition_replaces_builtin() {
    let mut registry = Registry::with_builtins();
    registry
        .register_macro("done", "hasTag(arg0, \"finished\")", &[DType::Item], DType::Bool, true)
        .unwrap();
    assert_eq!(positions(&registry, "x a\nb finished:yes\n", "done"), vec![2]);
}

#[test]
fn test_compiled_queries_keep_their_functions() {
    let mut registry = Registry::with_builtins();
    registry
        .register_macro("flag", "true", &[], DType::Bool, false)
        .unwrap();
    let before = compile_qql(&registry, "flag").unwrap();
    registry
        .register_macro("flag", "false", &[], DType::Bool, false)
        .unwrap();
    let after = compile_qql(&registry, "flag").unwrap();

    let list = TaskList::parse("a\n");
    assert_eq!(before.filter(&list).len(), 1);
    assert_eq!(after.filter(&list).len(), 0);
}
