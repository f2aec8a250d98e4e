use std::fmt;

use crate::ast::{Token, TokenKind};
use crate::value::Duration;

/// Character offset of a token within the query text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub offset: usize,
}

impl Position {
    pub fn new(offset: usize) -> Self {
        Position { offset }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "position {}", self.offset)
    }
}

pub struct Lexer {
    input: Vec<char>,
    position: usize,
    /// Open `(`/`{` groups not yet closed
    depth: usize,
    /// Set once scanning fails; returned for every later call
    failed: Option<Token>,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer {
            input: input.chars().collect(),
            position: 0,
            depth: 0,
            failed: None,
        }
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn text_from(&self, start: usize) -> String {
        self.input[start..self.position].iter().collect()
    }

    fn token(&self, kind: TokenKind, start: usize) -> Token {
        Token::new(kind, Position::new(start), self.text_from(start))
    }

    fn error(&self, start: usize, message: impl Into<String>) -> Token {
        let text = self.text_from(start);
        Token::new(TokenKind::Error(message.into()), Position::new(start), text)
    }

    /// Consumes `ch` and, if the next character is `second`, that one too.
    fn one_or_two(&mut self, second: char, single: TokenKind, double: TokenKind) -> TokenKind {
        self.advance();
        if self.current_char() == Some(second) {
            self.advance();
            double
        } else {
            single
        }
    }

    fn read_identifier(&mut self) -> String {
        let mut result = String::new();
        while let Some(ch) = self.current_char() {
            if ch.is_alphanumeric() || ch == '_' {
                result.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        result
    }

    /// Reads the name part of a `+project` or `@context` shorthand.
    fn read_shorthand(&mut self) -> String {
        let mut result = String::new();
        while let Some(ch) = self.current_char() {
            if ch.is_alphanumeric() || matches!(ch, '_' | '-' | '.') {
                result.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        result
    }

    fn read_string(&mut self) -> Result<String, String> {
        let mut result = String::new();
        self.advance(); // opening quote

        while let Some(ch) = self.current_char() {
            match ch {
                '"' => {
                    self.advance();
                    return Ok(result);
                }
                '\\' => {
                    self.advance();
                    match self.current_char() {
                        Some('n') => result.push('\n'),
                        Some('t') => result.push('\t'),
                        Some(escaped) => result.push(escaped),
                        None => break,
                    }
                    self.advance();
                }
                _ => {
                    result.push(ch);
                    self.advance();
                }
            }
        }

        Err("unterminated string: missing closing quote".to_string())
    }

    fn read_number(&mut self) -> Result<TokenKind, String> {
        let mut number = String::new();
        while let Some(ch) = self.current_char() {
            if ch.is_ascii_digit() {
                number.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        let value: i64 = number
            .parse()
            .map_err(|_| format!("integer literal {} is out of range", number))?;

        // A unit suffix only counts when it ends the word: `3d` is a duration,
        // `3dx` is the integer 3 followed by the identifier `dx`.
        let mut suffix_len = 0;
        while self
            .peek_char(suffix_len)
            .is_some_and(|c| c.is_ascii_alphabetic())
        {
            suffix_len += 1;
        }
        let terminated = !self
            .peek_char(suffix_len)
            .is_some_and(|c| c.is_alphanumeric() || c == '_');
        if suffix_len == 0 || !terminated {
            return Ok(TokenKind::Int(value));
        }

        let suffix: String = self.input[self.position..self.position + suffix_len]
            .iter()
            .collect();
        let duration = match suffix.as_str() {
            "d" | "day" | "days" => Some(Duration::days(value)),
            "w" | "week" | "weeks" => Duration::checked_weeks(value),
            "m" | "month" | "months" => Some(Duration::months(value)),
            "y" | "year" | "years" => Duration::checked_years(value),
            _ => return Ok(TokenKind::Int(value)),
        };
        let duration = duration
            .ok_or_else(|| format!("duration literal {}{} is out of range", number, suffix))?;
        self.position += suffix_len;
        Ok(TokenKind::Duration(duration))
    }

    /// Returns the next token.
    ///
    /// After the first error token, every further call returns that same
    /// error: a query is rejected as a whole.
    pub fn next_token(&mut self) -> Token {
        if let Some(failed) = &self.failed {
            return failed.clone();
        }
        let token = self.scan();
        if matches!(token.kind, TokenKind::Error(_)) {
            self.failed = Some(token.clone());
        }
        token
    }

    fn scan(&mut self) -> Token {
        self.skip_whitespace();
        let start = self.position;

        let Some(ch) = self.current_char() else {
            if self.depth > 0 {
                let message = format!("{} unclosed group(s) at end of input", self.depth);
                return self.error(start, message);
            }
            return self.token(TokenKind::Eof, start);
        };

        let kind = match ch {
            '(' | '{' => {
                self.advance();
                self.depth += 1;
                TokenKind::LParen
            }
            ')' | '}' => {
                self.advance();
                if self.depth == 0 {
                    return self.error(start, format!("unmatched closing '{}'", ch));
                }
                self.depth -= 1;
                TokenKind::RParen
            }
            '&' | '|' => {
                self.advance();
                if self.current_char() != Some(ch) {
                    return self.error(start, format!("unexpected '{}' (did you mean '{}{}'?)", ch, ch, ch));
                }
                self.advance();
                if ch == '&' { TokenKind::And } else { TokenKind::Or }
            }
            '=' => {
                self.advance();
                if self.current_char() != Some('=') {
                    return self.error(start, "unexpected '=' (did you mean '=='?)");
                }
                self.advance();
                TokenKind::EqEq
            }
            '-' => self.one_or_two('>', TokenKind::Minus, TokenKind::Implies),
            '<' => self.one_or_two('=', TokenKind::Lt, TokenKind::LtEq),
            '>' => self.one_or_two('=', TokenKind::Gt, TokenKind::GtEq),
            '!' => {
                self.advance();
                TokenKind::Not
            }
            ':' => {
                self.advance();
                TokenKind::Colon
            }
            ',' => {
                self.advance();
                TokenKind::Comma
            }
            '+' | '@' => {
                let named = self.peek_char(1).is_some_and(|c| c.is_alphabetic());
                self.advance();
                match (ch, named) {
                    ('+', true) => TokenKind::Project(format!("+{}", self.read_shorthand())),
                    ('+', false) => TokenKind::Plus,
                    (_, true) => TokenKind::Context(format!("@{}", self.read_shorthand())),
                    (_, false) => return self.error(start, "expected a context name after '@'"),
                }
            }
            '"' => match self.read_string() {
                Ok(s) => TokenKind::Str(s),
                Err(message) => return self.error(start, message),
            },
            c if c.is_ascii_digit() => match self.read_number() {
                Ok(kind) => kind,
                Err(message) => return self.error(start, message),
            },
            c if c.is_alphabetic() || c == '_' => {
                let ident = self.read_identifier();
                match ident.as_str() {
                    "true" => TokenKind::True,
                    "false" => TokenKind::False,
                    "exists" => TokenKind::Exists,
                    "forall" => TokenKind::Forall,
                    "in" => TokenKind::In,
                    "and" => TokenKind::And,
                    "or" => TokenKind::Or,
                    "impl" => TokenKind::Implies,
                    _ => TokenKind::Ident(ident),
                }
            }
            c => {
                self.advance();
                return self.error(start, format!("unexpected character '{}'", c));
            }
        };

        self.token(kind, start)
    }
}

#[test]
fn test_keywords() {
    let mut lexer = Lexer::new("exists forall in and or impl true false");
    assert_eq!(lexer.next_token().kind, TokenKind::Exists);
    assert_eq!(lexer.next_token().kind, TokenKind::Forall);
    assert_eq!(lexer.next_token().kind, TokenKind::In);
    assert_eq!(lexer.next_token().kind, TokenKind::And);
    assert_eq!(lexer.next_token().kind, TokenKind::Or);
    assert_eq!(lexer.next_token().kind, TokenKind::Implies);
    assert_eq!(lexer.next_token().kind, TokenKind::True);
    assert_eq!(lexer.next_token().kind, TokenKind::False);
    assert_eq!(lexer.next_token().kind, TokenKind::Eof);
}

#[test]
fn test_error_is_sticky() {
    let mut lexer = Lexer::new("a # b");
    assert_eq!(lexer.next_token().kind, TokenKind::Ident("a".to_string()));
    let error = lexer.next_token();
    assert!(matches!(error.kind, TokenKind::Error(_)));
    assert_eq!(error.position, Position::new(2));
    assert_eq!(lexer.next_token(), error);
}
