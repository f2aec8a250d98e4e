use std::fmt;
use std::mem;

use crate::ast::{ArithOp, CompareOp, Expr, LogicOp, Quantifier, Token, TokenKind};
use crate::checker::{self, TypeContext};
use crate::lexer::{Lexer, Position};
use crate::registry::Registry;
use crate::types::{DType, TypeError};
use crate::value::Value;

/// Errors that can occur while compiling QQL text.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseError {
    /// The lexer rejected the input
    Lex { message: String, position: Position },

    /// A token that does not fit the grammar at this point
    UnexpectedToken {
        expected: String,
        found: String,
        position: Position,
    },

    /// The expression ended before the input did
    TrailingInput { found: String, position: Position },

    /// The expression parsed but does not type-check
    Type(TypeError),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Lex { message, position } => write!(f, "{} at {}", message, position),
            ParseError::UnexpectedToken {
                expected,
                found,
                position,
            } => write!(f, "expected {}, found {} at {}", expected, found, position),
            ParseError::TrailingInput { found, position } => {
                write!(f, "garbage at end of expression: {} at {}", found, position)
            }
            ParseError::Type(e) => write!(f, "type error: {}", e),
        }
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ParseError::Type(e) => Some(e),
            _ => None,
        }
    }
}

impl From<TypeError> for ParseError {
    fn from(e: TypeError) -> Self {
        ParseError::Type(e)
    }
}

/// One ordering key of a sort expression, before validation.
#[derive(Debug, Clone, PartialEq)]
pub struct SortKeySyntax {
    pub expr: Expr,
    pub descending: bool,
}

/// Recursive-descent parser producing unvalidated QQL trees.
///
/// Function names are resolved against the registry while parsing, so the
/// resulting tree holds the functions it calls.
pub struct Parser<'r> {
    lexer: Lexer,
    current_token: Token,
    registry: &'r Registry,
}

impl<'r> Parser<'r> {
    pub fn new(registry: &'r Registry, mut lexer: Lexer) -> Result<Self, ParseError> {
        let current_token = lexer.next_token();
        let parser = Parser {
            lexer,
            current_token,
            registry,
        };
        parser.check_lexed()?;
        Ok(parser)
    }

    fn check_lexed(&self) -> Result<(), ParseError> {
        match &self.current_token.kind {
            TokenKind::Error(message) => Err(ParseError::Lex {
                message: message.clone(),
                position: self.current_token.position,
            }),
            _ => Ok(()),
        }
    }

    fn advance(&mut self) -> Result<(), ParseError> {
        self.current_token = self.lexer.next_token();
        self.check_lexed()
    }

    /// Consumes the current token, returning its kind.
    fn take(&mut self) -> Result<TokenKind, ParseError> {
        let next = self.lexer.next_token();
        let taken = mem::replace(&mut self.current_token, next);
        self.check_lexed()?;
        Ok(taken.kind)
    }

    fn check(&self, kind: &TokenKind) -> bool {
        mem::discriminant(&self.current_token.kind) == mem::discriminant(kind)
    }

    fn expect(&mut self, kind: TokenKind) -> Result<(), ParseError> {
        if !self.check(&kind) {
            return Err(self.unexpected(&kind.to_string()));
        }
        self.advance()
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        ParseError::UnexpectedToken {
            expected: expected.to_string(),
            found: self.current_token.kind.to_string(),
            position: self.current_token.position,
        }
    }

    /// Parses a complete query. Empty input is the constant `true`.
    pub fn parse(&mut self) -> Result<Expr, ParseError> {
        if self.current_token.is_eof() {
            return Ok(Expr::Const(Value::Bool(true)));
        }
        let expr = self.parse_expression()?;
        self.expect_end()?;
        Ok(expr)
    }

    /// Parses `expr [asc|desc], ...`. Empty input yields no keys.
    pub fn parse_sort_keys(&mut self) -> Result<Vec<SortKeySyntax>, ParseError> {
        let mut keys = Vec::new();
        if self.current_token.is_eof() {
            return Ok(keys);
        }

        loop {
            let expr = self.parse_expression()?;
            let direction = match &self.current_token.kind {
                TokenKind::Ident(word) if word == "desc" => Some(true),
                TokenKind::Ident(word) if word == "asc" => Some(false),
                _ => None,
            };
            if direction.is_some() {
                self.advance()?;
            }
            keys.push(SortKeySyntax {
                expr,
                descending: direction.unwrap_or(false),
            });

            if self.check(&TokenKind::Comma) {
                self.advance()?;
            } else {
                break;
            }
        }

        self.expect_end()?;
        Ok(keys)
    }

    fn expect_end(&self) -> Result<(), ParseError> {
        if self.current_token.is_eof() {
            Ok(())
        } else {
            Err(ParseError::TrailingInput {
                found: self.current_token.kind.to_string(),
                position: self.current_token.position,
            })
        }
    }

    pub fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        self.parse_implication()
    }

    /// `exists x in c: body`; the body extends as far right as possible.
    fn parse_quantifier(&mut self, quantifier: Quantifier) -> Result<Expr, ParseError> {
        self.advance()?;

        let var = match &self.current_token.kind {
            TokenKind::Ident(name) => name.clone(),
            _ => {
                let expected = format!("variable name after '{}'", quantifier.keyword());
                return Err(self.unexpected(&expected));
            }
        };
        self.advance()?;

        self.expect(TokenKind::In)?;
        let collection = self.parse_implication()?;
        self.expect(TokenKind::Colon)?;
        let body = self.parse_expression()?;

        Ok(Expr::quantified(quantifier, var, collection, body))
    }

    /// Right-associative: `a -> b -> c` is `a -> (b -> c)`.
    fn parse_implication(&mut self) -> Result<Expr, ParseError> {
        let left = self.parse_or()?;

        if self.check(&TokenKind::Implies) {
            self.advance()?;
            let right = self.parse_implication()?;
            return Ok(Expr::logic(LogicOp::Implies, left, right));
        }
        Ok(left)
    }

    fn parse_or(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_and()?;

        while self.check(&TokenKind::Or) {
            self.advance()?;
            let right = self.parse_and()?;
            left = Expr::logic(LogicOp::Or, left, right);
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_not()?;

        while self.check(&TokenKind::And) {
            self.advance()?;
            let right = self.parse_not()?;
            left = Expr::logic(LogicOp::And, left, right);
        }
        Ok(left)
    }

    /// `!` binds looser than comparison: `!a == b` is `!(a == b)`.
    fn parse_not(&mut self) -> Result<Expr, ParseError> {
        if self.check(&TokenKind::Not) {
            self.advance()?;
            let operand = self.parse_not()?;
            return Ok(Expr::not(operand));
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_additive()?;

        loop {
            let op = match &self.current_token.kind {
                TokenKind::EqEq => CompareOp::Eq,
                TokenKind::Lt => CompareOp::Lt,
                TokenKind::LtEq => CompareOp::LtEq,
                TokenKind::Gt => CompareOp::Gt,
                TokenKind::GtEq => CompareOp::GtEq,
                _ => break,
            };

            self.advance()?;
            let right = self.parse_additive()?;
            left = Expr::compare(op, left, right);
        }
        Ok(left)
    }

    fn parse_additive(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_unary()?;

        loop {
            let op = match &self.current_token.kind {
                TokenKind::Plus => ArithOp::Add,
                TokenKind::Minus => ArithOp::Sub,
                _ => break,
            };

            self.advance()?;
            let right = self.parse_unary()?;
            left = Expr::arith(op, left, right);
        }
        Ok(left)
    }

    /// A run of signs collapses into one node: `--x` is `+x`.
    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        let mut negative = None;
        loop {
            match &self.current_token.kind {
                TokenKind::Minus => negative = Some(!negative.unwrap_or(false)),
                TokenKind::Plus => negative = Some(negative.unwrap_or(false)),
                _ => break,
            }
            self.advance()?;
        }

        let operand = self.parse_primary()?;
        Ok(match negative {
            Some(negative) => Expr::Sign {
                negative,
                operand: Box::new(operand),
            },
            None => operand,
        })
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        match &self.current_token.kind {
            TokenKind::Exists => return self.parse_quantifier(Quantifier::Exists),
            TokenKind::Forall => return self.parse_quantifier(Quantifier::Forall),
            TokenKind::LParen => {
                self.advance()?;
                let expr = self.parse_expression()?;
                self.expect(TokenKind::RParen)?;
                return Ok(expr);
            }
            TokenKind::Ident(_)
            | TokenKind::Int(_)
            | TokenKind::Duration(_)
            | TokenKind::Str(_)
            | TokenKind::True
            | TokenKind::False
            | TokenKind::Project(_)
            | TokenKind::Context(_) => {}
            _ => return Err(self.unexpected("an expression")),
        }

        match self.take()? {
            TokenKind::Int(n) => Ok(Expr::Const(Value::Int(n))),
            TokenKind::Duration(d) => Ok(Expr::Const(Value::Duration(d))),
            TokenKind::Str(s) => Ok(Expr::Const(Value::String(s))),
            TokenKind::True => Ok(Expr::Const(Value::Bool(true))),
            TokenKind::False => Ok(Expr::Const(Value::Bool(false))),
            TokenKind::Project(name) => self.shorthand("projects", name),
            TokenKind::Context(name) => self.shorthand("contexts", name),
            TokenKind::Ident(name) => self.parse_name(name),
            _ => unreachable!(),
        }
    }

    /// A name is a call when followed by `(` or when it names a function;
    /// anything else is a variable.
    fn parse_name(&mut self, name: String) -> Result<Expr, ParseError> {
        if self.check(&TokenKind::LParen) {
            let args = self.parse_arguments()?;
            let function = self
                .registry
                .get(&name)
                .ok_or(TypeError::UnknownFunction(name))?;
            return Ok(Expr::call(function.clone(), args));
        }

        match self.registry.get(&name) {
            Some(function) => Ok(Expr::Call {
                function: function.clone(),
                args: Vec::new(),
                bare: true,
            }),
            None => Ok(Expr::Ident(name)),
        }
    }

    fn parse_arguments(&mut self) -> Result<Vec<Expr>, ParseError> {
        self.expect(TokenKind::LParen)?;
        let mut args = Vec::new();

        if self.check(&TokenKind::RParen) {
            self.advance()?;
            return Ok(args);
        }

        loop {
            args.push(self.parse_expression()?);
            if self.check(&TokenKind::Comma) {
                self.advance()?;
            } else {
                break;
            }
        }

        self.expect(TokenKind::RParen)?;
        Ok(args)
    }

    /// `+name` becomes `exists p in projects(it): dotPrefix(p, "+name")`,
    /// `@name` the same over `contexts`.
    fn shorthand(&self, collection: &str, name: String) -> Result<Expr, ParseError> {
        let lookup = |function: &str| {
            self.registry
                .get(function)
                .cloned()
                .ok_or_else(|| TypeError::UnknownFunction(function.to_string()))
        };
        let members = lookup(collection)?;
        let dot_prefix = lookup("dotPrefix")?;

        Ok(Expr::quantified(
            Quantifier::Exists,
            "p",
            Expr::call(members, vec![Expr::ident("it")]),
            Expr::call(
                dot_prefix,
                vec![Expr::ident("p"), Expr::Const(Value::String(name))],
            ),
        ))
    }
}

/// Parses `text` and validates it against `context`, requiring `expected`.
///
/// # Examples
///
/// ```
/// use qql_lang::checker::TypeContext;
/// use qql_lang::parser::parse;
/// use qql_lang::{DType, Registry};
///
/// let registry = Registry::with_builtins();
/// let expr = parse(&registry, "!done && +garden", &TypeContext::top_level(), DType::Bool).unwrap();
/// assert_eq!(
///     expr.to_string(),
///     "(!done(it) && (exists p in projects(it): dotPrefix(p, \"+garden\")))"
/// );
/// ```
pub fn parse(
    registry: &Registry,
    text: &str,
    context: &TypeContext,
    expected: DType,
) -> Result<Expr, ParseError> {
    let mut parser = Parser::new(registry, Lexer::new(text))?;
    let mut expr = parser.parse()?;
    checker::validate_root(&mut expr, context, expected)?;
    Ok(expr)
}
