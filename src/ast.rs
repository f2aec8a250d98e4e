//! # QQL - Abstract Syntax Tree
//!
//! QQL selects tasks from a task list with first-order logic formulas over
//! task attributes.
//!
//! ## Architecture Overview
//!
//! - **[tokens]** - Lexical tokens produced by the lexer
//! - **[expressions]** - Expression nodes (constants, calls, operators, quantifiers)
//! - **[operators]** - Arithmetic, comparison and logical operators
//!
//! ## Quick Start
//!
//! ```text
//! !done && tagDate("due") <= today + 1w
//! ```
//!
//! Open tasks due within the next week.
//!
//! ## Core Concepts
//!
//! ### Free variables
//!
//! Every query sees `it` (the item being tested), `items` (the whole list)
//! and `today`.
//!
//! ### Implicit items
//!
//! Functions taking an item as first argument may omit it: `done`, `done()`
//! and `done(it)` mean the same thing.
//!
//! ### Quantifiers
//!
//! ```text
//! exists i in items: tag(i, "id") == tag("after") && !done(i)
//! forall p in projects: dotPrefix(p, "+work")
//! ```
//!
//! ### Shorthands
//!
//! `+garden` matches items with a project `+garden` or `+garden.<sub>`;
//! `@phone` does the same for contexts.
//!
//! ## Precedence (loosest first)
//!
//! ```text
//! exists/forall  ->  ||  &&  !  == < <= > >=  + -  unary +/-
//! ```
pub mod expressions;
pub mod operators;
pub mod tokens;

pub use expressions::Expr;
pub use operators::{ArithOp, CompareOp, LogicOp, Quantifier};
pub use tokens::{Token, TokenKind};
