pub mod ast;
pub mod checker;
pub mod cli;
pub mod compiler;
pub mod config;
pub mod evaluator;
pub mod lexer;
pub mod output;
pub mod parser;
pub mod predicate;
pub mod registry;
pub mod sort;
pub mod task;
pub mod types;
pub mod value;

pub use ast::{Expr, Token, TokenKind};
pub use checker::TypeContext;
pub use compiler::{
    CompiledQuery, RangeError, compile_qql, compile_query, compile_range, compile_word_search,
};
pub use config::{Config, ConfigError};
pub use evaluator::Env;
pub use lexer::{Lexer, Position};
pub use parser::{ParseError, Parser};
pub use predicate::Predicate;
pub use registry::{Function, Registry, RegistryError};
pub use sort::{SortOrder, compile_sort};
pub use task::{Item, TaskList};
pub use types::{DType, TypeError};
pub use value::{Duration, Value};
