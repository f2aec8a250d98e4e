use qql_lang::{
    Item, Predicate, RangeError, Registry, TaskList, compile_qql, compile_query, compile_range,
    compile_word_search,
};

fn nine() -> TaskList {
    (1..=9).map(|n| Item::parse(&format!("task number {}", n))).collect()
}

fn positions(list: &TaskList, predicate: &Predicate) -> Vec<usize> {
    predicate
        .filter(list)
        .iter()
        .filter_map(|item| list.position(item))
        .collect()
}

// ============================================================================
// Ranges
// ============================================================================

#[test]
fn test_open_ranges() {
    let list = nine();
    let predicate = compile_range("-4,8-").unwrap();
    assert_eq!(positions(&list, &predicate), vec![1, 2, 3, 4, 8, 9]);
}

#[test]
fn test_single_positions() {
    let list = nine();
    let predicate = compile_range("3,5,7").unwrap();
    assert_eq!(positions(&list, &predicate), vec![3, 5, 7]);
}

#[test]
fn test_closed_range_with_whitespace() {
    let list = nine();
    let predicate = compile_range(" 2 - 4 , 9 ").unwrap();
    assert_eq!(positions(&list, &predicate), vec![2, 3, 4, 9]);
}

#[test]
fn test_order_and_duplicates_do_not_matter() {
    let list = nine();
    let predicate = compile_range("7,3,3,1-2,2").unwrap();
    assert_eq!(positions(&list, &predicate), vec![1, 2, 3, 7]);
}

#[test]
fn test_range_beyond_list_matches_nothing() {
    let list = nine();
    let predicate = compile_range("20-").unwrap();
    assert!(positions(&list, &predicate).is_empty());
}

#[test]
fn test_range_errors() {
    assert_eq!(compile_range("").unwrap_err(), RangeError::Empty);
    assert_eq!(compile_range("  ").unwrap_err(), RangeError::Empty);
    assert_eq!(compile_range("0").unwrap_err(), RangeError::ZeroPosition("0".into()));
    assert_eq!(compile_range("0-3").unwrap_err(), RangeError::ZeroPosition("0-3".into()));
    assert!(matches!(compile_range("1,,2"), Err(RangeError::Malformed(_))));
    assert!(matches!(compile_range("a-b"), Err(RangeError::Malformed(_))));
    assert!(matches!(compile_range("-"), Err(RangeError::Malformed(_))));
    assert!(matches!(compile_range("4-2"), Err(RangeError::Reversed(_))));
}

// ============================================================================
// Word search
// ============================================================================

#[test]
fn test_word_search_is_case_insensitive() {
    let list = TaskList::parse("Buy MILK\nbuy bread\ncall mom\n");
    assert_eq!(positions(&list, &compile_word_search("milk")), vec![1]);
    assert_eq!(positions(&list, &compile_word_search("BUY")), vec![1, 2]);
}

#[test]
fn test_word_search_keeps_surrounding_whitespace() {
    let list = TaskList::parse("call mom\nmomentum\n");
    assert_eq!(positions(&list, &compile_word_search(" mom")), vec![1]);
    assert_eq!(positions(&list, &compile_word_search("mom")), vec![1, 2]);
    assert!(positions(&list, &compile_word_search("mom ")).is_empty());
}

#[test]
fn test_word_search_ignores_priority_and_dates() {
    let list = TaskList::parse("(A) 2024-01-01 call mom\n");
    assert!(positions(&list, &compile_word_search("2024")).is_empty());
    assert!(positions(&list, &compile_word_search("(A)")).is_empty());
    assert_eq!(positions(&list, &compile_word_search("call")), vec![1]);
}

// ============================================================================
// Query recognition
// ============================================================================

#[test]
fn test_query_prefers_qql() {
    let registry = Registry::with_builtins();
    let list = TaskList::parse("x done thing\nopen thing\n");
    assert_eq!(positions(&list, &compile_query(&registry, "done")), vec![1]);
}

#[test]
fn test_query_falls_back_to_range() {
    let registry = Registry::with_builtins();
    let list = nine();
    assert_eq!(positions(&list, &compile_query(&registry, "2-3")), vec![2, 3]);
}

#[test]
fn test_query_falls_back_to_word_search() {
    let registry = Registry::with_builtins();
    let list = TaskList::parse("buy milk\ncall mom\n");
    assert_eq!(positions(&list, &compile_query(&registry, "mom")), vec![2]);
    assert_eq!(positions(&list, &compile_query(&registry, "call mom")), vec![2]);
}

#[test]
fn test_qql_errors_are_reported() {
    let registry = Registry::with_builtins();
    assert!(compile_qql(&registry, "true && \"true\"").is_err());
    assert!(compile_qql(&registry, "done &&").is_err());
}

// ============================================================================
// Combinators
// ============================================================================

#[test]
fn test_and_combines_syntaxes() {
    let registry = Registry::with_builtins();
    let list = TaskList::parse("x buy milk\nbuy bread\nbuy eggs\ncall mom\n");
    let predicate = Predicate::and(vec![
        compile_qql(&registry, "!done").unwrap(),
        compile_word_search("buy"),
        compile_range("-2").unwrap(),
    ]);
    assert_eq!(positions(&list, &predicate), vec![2]);
}

#[test]
fn test_predicates_work_across_threads() {
    let registry = Registry::with_builtins();
    let predicate = compile_qql(&registry, "!done").unwrap();
    let list = TaskList::parse("x a\nb\nc\n");

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let predicate = predicate.clone();
            let list = list.clone();
            std::thread::spawn(move || predicate.filter(&list).len())
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), 2);
    }
}
