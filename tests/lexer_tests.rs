// tests/lexer_tests.rs

use qql_lang::ast::TokenKind;
use qql_lang::lexer::{Lexer, Position};
use qql_lang::value::Duration;

fn kinds(input: &str) -> Vec<TokenKind> {
    let mut lexer = Lexer::new(input);
    let mut kinds = Vec::new();
    loop {
        let token = lexer.next_token();
        let done = matches!(token.kind, TokenKind::Eof | TokenKind::Error(_));
        kinds.push(token.kind);
        if done {
            return kinds;
        }
    }
}

fn is_error(input: &str) -> bool {
    matches!(kinds(input).last(), Some(TokenKind::Error(_)))
}

// ============================================================================
// Single Character Tokens
// ============================================================================

#[test]
fn test_single_char_tokens() {
    let test_cases = vec![
        ("!", TokenKind::Not),
        ("+", TokenKind::Plus),
        ("-", TokenKind::Minus),
        ("<", TokenKind::Lt),
        (">", TokenKind::Gt),
        (":", TokenKind::Colon),
        (",", TokenKind::Comma),
    ];

    for (input, expected) in test_cases {
        assert_eq!(kinds(input), vec![expected, TokenKind::Eof], "Failed for input: {}", input);
    }
}

#[test]
fn test_braces_and_parens_are_interchangeable() {
    assert_eq!(
        kinds("({})"),
        vec![
            TokenKind::LParen,
            TokenKind::LParen,
            TokenKind::RParen,
            TokenKind::RParen,
            TokenKind::Eof
        ]
    );
    assert_eq!(
        kinds("(}"),
        vec![TokenKind::LParen, TokenKind::RParen, TokenKind::Eof]
    );
}

// ============================================================================
// Two Character Tokens
// ============================================================================

#[test]
fn test_two_char_tokens() {
    let test_cases = vec![
        ("&&", TokenKind::And),
        ("||", TokenKind::Or),
        ("->", TokenKind::Implies),
        ("<=", TokenKind::LtEq),
        (">=", TokenKind::GtEq),
        ("==", TokenKind::EqEq),
    ];

    for (input, expected) in test_cases {
        assert_eq!(kinds(input), vec![expected, TokenKind::Eof], "Failed for input: {}", input);
    }
}

#[test]
fn test_two_char_vs_single_char() {
    assert_eq!(
        kinds("< =="),
        vec![TokenKind::Lt, TokenKind::EqEq, TokenKind::Eof]
    );
    assert_eq!(
        kinds("- >"),
        vec![TokenKind::Minus, TokenKind::Gt, TokenKind::Eof]
    );
}

#[test]
fn test_word_operators() {
    assert_eq!(
        kinds("a and b or c impl d"),
        vec![
            TokenKind::Ident("a".into()),
            TokenKind::And,
            TokenKind::Ident("b".into()),
            TokenKind::Or,
            TokenKind::Ident("c".into()),
            TokenKind::Implies,
            TokenKind::Ident("d".into()),
            TokenKind::Eof
        ]
    );
}

#[test]
fn test_keywords_need_whole_words() {
    assert_eq!(
        kinds("android index"),
        vec![
            TokenKind::Ident("android".into()),
            TokenKind::Ident("index".into()),
            TokenKind::Eof
        ]
    );
}

// ============================================================================
// Literals
// ============================================================================

#[test]
fn test_integers() {
    assert_eq!(kinds("42"), vec![TokenKind::Int(42), TokenKind::Eof]);
    assert_eq!(kinds("0"), vec![TokenKind::Int(0), TokenKind::Eof]);
}

#[test]
fn test_integer_overflow_is_error() {
    assert!(is_error("99999999999999999999"));
}

#[test]
fn test_duration_overflow_is_error() {
    assert!(is_error("9223372036854775807w"));
    assert!(is_error("1000000000000000000years"));
    assert!(!is_error("9223372036854775807d"));
    assert!(!is_error("1317624576693539401w"));

    match kinds("9223372036854775807w").last() {
        Some(TokenKind::Error(message)) => {
            assert!(message.contains("out of range"), "{}", message)
        }
        other => panic!("expected error, got {:?}", other),
    }
}

#[test]
fn test_durations() {
    let test_cases = vec![
        ("3d", Duration::days(3)),
        ("1day", Duration::days(1)),
        ("2days", Duration::days(2)),
        ("2w", Duration::weeks(2)),
        ("1week", Duration::weeks(1)),
        ("5m", Duration::months(5)),
        ("6months", Duration::months(6)),
        ("1y", Duration::years(1)),
        ("2years", Duration::years(2)),
    ];

    for (input, expected) in test_cases {
        let lexed = kinds(input);
        assert_eq!(lexed.len(), 2, "Failed for input: {}", input);
        match &lexed[0] {
            TokenKind::Duration(d) => {
                assert_eq!(d.months, expected.months, "Failed for input: {}", input);
                assert_eq!(d.days, expected.days, "Failed for input: {}", input);
            }
            other => panic!("expected duration for {}, got {:?}", input, other),
        }
    }
}

#[test]
fn test_unit_suffix_must_end_the_word() {
    assert_eq!(
        kinds("3dx"),
        vec![
            TokenKind::Int(3),
            TokenKind::Ident("dx".into()),
            TokenKind::Eof
        ]
    );
    assert_eq!(
        kinds("3d_"),
        vec![
            TokenKind::Int(3),
            TokenKind::Ident("d_".into()),
            TokenKind::Eof
        ]
    );
}

#[test]
fn test_duration_followed_by_operator() {
    let lexed = kinds("3d+1");
    assert!(matches!(lexed[0], TokenKind::Duration(_)));
    assert_eq!(lexed[1], TokenKind::Plus);
    assert_eq!(lexed[2], TokenKind::Int(1));
}

#[test]
fn test_strings() {
    assert_eq!(
        kinds(r#""hello world""#),
        vec![TokenKind::Str("hello world".into()), TokenKind::Eof]
    );
    assert_eq!(
        kinds(r#""say \"hi\"""#),
        vec![TokenKind::Str("say \"hi\"".into()), TokenKind::Eof]
    );
    assert_eq!(
        kinds(r#""a\nb\tc\\""#),
        vec![TokenKind::Str("a\nb\tc\\".into()), TokenKind::Eof]
    );
    assert_eq!(
        kinds(r#""\q""#),
        vec![TokenKind::Str("q".into()), TokenKind::Eof]
    );
}

#[test]
fn test_unterminated_string_is_error() {
    assert!(is_error(r#""open"#));
    assert!(is_error(r#""trailing\"#));
}

// ============================================================================
// Shorthands
// ============================================================================

#[test]
fn test_project_and_context_shorthands() {
    assert_eq!(
        kinds("+garden.herbs @phone-home"),
        vec![
            TokenKind::Project("+garden.herbs".into()),
            TokenKind::Context("@phone-home".into()),
            TokenKind::Eof
        ]
    );
}

#[test]
fn test_plus_before_non_letter_is_operator() {
    assert_eq!(
        kinds("1 + 2"),
        vec![
            TokenKind::Int(1),
            TokenKind::Plus,
            TokenKind::Int(2),
            TokenKind::Eof
        ]
    );
}

#[test]
fn test_bare_at_is_error() {
    assert!(is_error("@ phone"));
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_single_ampersand_and_pipe_are_errors() {
    assert!(is_error("a & b"));
    assert!(is_error("a | b"));
    assert!(is_error("a = b"));
}

#[test]
fn test_unbalanced_groups() {
    assert!(is_error("(a"));
    assert!(is_error("a)"));
    assert!(is_error("{(a)"));
    assert!(!is_error("{(a)}"));
}

#[test]
fn test_error_position() {
    let mut lexer = Lexer::new("done && #");
    lexer.next_token();
    lexer.next_token();
    let error = lexer.next_token();
    assert!(matches!(error.kind, TokenKind::Error(_)));
    assert_eq!(error.position, Position::new(8));
}

#[test]
fn test_error_repeats_forever() {
    let mut lexer = Lexer::new("$ a b c");
    let first = lexer.next_token();
    assert!(matches!(first.kind, TokenKind::Error(_)));
    for _ in 0..5 {
        assert_eq!(lexer.next_token(), first);
    }
}

// ============================================================================
// Token metadata
// ============================================================================

#[test]
fn test_token_text_and_position() {
    let mut lexer = Lexer::new("  tag(\"due\")");
    let name = lexer.next_token();
    assert_eq!(name.text, "tag");
    assert_eq!(name.position, Position::new(2));
    let paren = lexer.next_token();
    assert_eq!(paren.position, Position::new(5));
    let string = lexer.next_token();
    assert_eq!(string.text, "\"due\"");
    assert_eq!(string.kind, TokenKind::Str("due".into()));
}
