use std::fmt;
use std::sync::Arc;

use crate::ast::{ArithOp, CompareOp, LogicOp, Quantifier};
use crate::registry::Function;
use crate::value::Value;

/// Abstract Syntax Tree node of a QQL expression.
///
/// Nodes are produced by the parser, then rewritten in place by the checker
/// (implicit items are inserted, bare names resolved) before evaluation.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Literal boolean, integer, string or duration
    ///
    /// # Examples
    /// ```text
    /// true
    /// 42
    /// "id"
    /// 3d
    /// ```
    Const(Value),

    /// Variable reference: a free variable (`it`, `items`, `today`), a
    /// quantifier-bound variable, or a macro argument (`arg0`, ...)
    Ident(String),

    /// Function or macro call
    ///
    /// `bare` marks a name written without parentheses. If the checker finds
    /// a variable of that name in scope the node becomes an [`Expr::Ident`];
    /// otherwise it is a zero-argument call and the marker is cleared.
    ///
    /// # Examples
    /// ```text
    /// done
    /// tag(it, "due")
    /// ```
    Call {
        function: Arc<Function>,
        args: Vec<Expr>,
        bare: bool,
    },

    /// Logical negation (`!`)
    Not(Box<Expr>),

    /// Unary sign; chains collapse into one node by parity
    ///
    /// # Examples
    /// ```text
    /// -4        // Sign { negative: true, .. }, printed `(- 4)`
    /// --4       // Sign { negative: false, .. }, printed `(+ 4)`
    /// ```
    Sign { negative: bool, operand: Box<Expr> },

    /// `+` or `-` on integers, dates and durations
    Arith {
        op: ArithOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    Compare {
        op: CompareOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// `&&`, `||`, `->`
    Logic {
        op: LogicOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// `exists`/`forall` over a collection
    ///
    /// # Example
    /// ```text
    /// exists i in items: done(i)
    /// ```
    Quantified {
        quantifier: Quantifier,
        var: String,
        collection: Box<Expr>,
        body: Box<Expr>,
    },
}

impl Expr {
    pub fn ident(name: impl Into<String>) -> Self {
        Expr::Ident(name.into())
    }

    pub fn call(function: Arc<Function>, args: Vec<Expr>) -> Self {
        Expr::Call {
            function,
            args,
            bare: false,
        }
    }

    pub fn not(operand: Expr) -> Self {
        Expr::Not(Box::new(operand))
    }

    pub fn arith(op: ArithOp, left: Expr, right: Expr) -> Self {
        Expr::Arith {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn compare(op: CompareOp, left: Expr, right: Expr) -> Self {
        Expr::Compare {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn logic(op: LogicOp, left: Expr, right: Expr) -> Self {
        Expr::Logic {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn quantified(
        quantifier: Quantifier,
        var: impl Into<String>,
        collection: Expr,
        body: Expr,
    ) -> Self {
        Expr::Quantified {
            quantifier,
            var: var.into(),
            collection: Box::new(collection),
            body: Box::new(body),
        }
    }
}

/// Canonical, fully parenthesised form. Parsing it yields the same tree.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Const(value) => write!(f, "{}", value),
            Expr::Ident(name) => f.write_str(name),
            Expr::Call {
                function,
                bare: true,
                ..
            } => f.write_str(function.name()),
            Expr::Call { function, args, .. } => {
                write!(f, "{}(", function.name())?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                f.write_str(")")
            }
            Expr::Not(operand) => write!(f, "!{}", operand),
            Expr::Sign { negative, operand } => {
                // The space keeps `+name` from re-lexing as a project shorthand.
                write!(f, "({} {})", if *negative { "-" } else { "+" }, operand)
            }
            Expr::Arith { op, left, right } => write!(f, "({} {} {})", left, op.symbol(), right),
            Expr::Compare { op, left, right } => {
                write!(f, "({} {} {})", left, op.symbol(), right)
            }
            Expr::Logic { op, left, right } => write!(f, "({} {} {})", left, op.symbol(), right),
            Expr::Quantified {
                quantifier,
                var,
                collection,
                body,
            } => write!(
                f,
                "({} {} in {}: {})",
                quantifier.keyword(),
                var,
                collection,
                body
            ),
        }
    }
}
