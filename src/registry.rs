//! Function and macro registry.
//!
//! A [`Registry`] maps names to callable [`Function`]s: native built-ins and
//! user macros. It is populated once (built-ins, then macros from the
//! configuration) and passed by reference to every compile call. Compiled
//! expressions hold `Arc`s to the functions they call, so a registry can be
//! dropped or changed without affecting queries compiled earlier.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::debug;

use crate::ast::Expr;
use crate::checker::TypeContext;
use crate::evaluator::Env;
use crate::parser::{self, ParseError};
use crate::task::position_in;
use crate::types::{DType, FunctionDescriptor};
use crate::value::Value;

/// Native implementation: receives evaluated arguments, defaults applied.
pub type NativeFn = fn(&[Value]) -> Value;

/// Supplies the value of an omitted optional trailing argument.
pub type DefaultFn = fn(&Env) -> Value;

#[derive(Clone)]
pub enum FunctionBody {
    Native(NativeFn),
    /// Validated expression over `arg0..argN` and the caller's environment
    Macro(Arc<Expr>),
}

impl fmt::Debug for FunctionBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FunctionBody::Native(_) => f.write_str("Native"),
            FunctionBody::Macro(body) => write!(f, "Macro({})", body),
        }
    }
}

#[derive(Clone)]
pub struct Function {
    descriptor: FunctionDescriptor,
    body: FunctionBody,
    trailing_default: Option<DefaultFn>,
}

impl Function {
    /// A native function with only required parameters.
    pub fn native(
        name: &str,
        params: &[DType],
        result: DType,
        inject_it: bool,
        implementation: NativeFn,
    ) -> Self {
        Function {
            descriptor: FunctionDescriptor {
                name: name.to_string(),
                params: params.to_vec(),
                result,
                optional_trailing: false,
                inject_it,
                context_access: false,
            },
            body: FunctionBody::Native(implementation),
            trailing_default: None,
        }
    }

    /// Makes the last parameter optional, filled by `default` when omitted.
    pub fn with_trailing_default(mut self, default: DefaultFn) -> Self {
        self.descriptor.optional_trailing = true;
        self.trailing_default = Some(default);
        self
    }

    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    pub fn descriptor(&self) -> &FunctionDescriptor {
        &self.descriptor
    }

    pub fn body(&self) -> &FunctionBody {
        &self.body
    }

    pub fn trailing_default(&self) -> Option<DefaultFn> {
        self.trailing_default
    }

    pub fn is_macro(&self) -> bool {
        matches!(self.body, FunctionBody::Macro(_))
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("descriptor", &self.descriptor)
            .field("body", &self.body)
            .field("has_trailing_default", &self.trailing_default.is_some())
            .finish()
    }
}

/// Functions are equal when their signatures and macro bodies agree; native
/// implementations are not compared.
impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        self.descriptor == other.descriptor
            && match (&self.body, &other.body) {
                (FunctionBody::Native(_), FunctionBody::Native(_)) => true,
                (FunctionBody::Macro(a), FunctionBody::Macro(b)) => a == b,
                _ => false,
            }
    }
}

/// Errors raised while registering functions.
#[derive(Debug, Clone)]
pub enum RegistryError {
    /// The macro body failed to compile
    InvalidMacro { name: String, source: ParseError },
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::InvalidMacro { name, source } => {
                write!(f, "invalid macro '{}': {}", name, source)
            }
        }
    }
}

impl std::error::Error for RegistryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RegistryError::InvalidMacro { source, .. } => Some(source),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Registry {
    functions: HashMap<String, Arc<Function>>,
}

/// The default registry holds the built-in functions.
impl Default for Registry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl Registry {
    /// A registry without any functions.
    pub fn empty() -> Self {
        Registry {
            functions: HashMap::new(),
        }
    }

    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        for function in builtins() {
            registry.insert(function);
        }
        registry
    }

    pub fn get(&self, name: &str) -> Option<&Arc<Function>> {
        self.functions.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// All functions, sorted by name.
    pub fn functions(&self) -> Vec<&Arc<Function>> {
        let mut functions: Vec<_> = self.functions.values().collect();
        functions.sort_by(|a, b| a.name().cmp(b.name()));
        functions
    }

    /// Installs a function; an existing one of the same name is replaced.
    pub fn insert(&mut self, function: Function) {
        let name = function.name().to_string();
        if let Some(previous) = self.functions.insert(name.clone(), Arc::new(function)) {
            debug!(
                function = %name,
                was_macro = previous.is_macro(),
                "replaced existing function"
            );
        }
    }

    /// Compiles `query` and registers it as a macro called `name`.
    ///
    /// The body sees its arguments as `arg0`, `arg1`, ... typed per
    /// `arg_types`, plus the usual `it`, `items` and `today`. Its type must be
    /// `result`. With `inject_it`, callers may omit an item argument just as
    /// with built-ins. A call is rejected where a quantifier has rebound
    /// `it`, `items` or `today` to another type.
    ///
    /// # Examples
    ///
    /// ```
    /// use qql_lang::{DType, Registry};
    ///
    /// let mut registry = Registry::with_builtins();
    /// registry
    ///     .register_macro("urgent", "priority(arg0) >= prio(\"B\")", &[DType::Item], DType::Bool, true)
    ///     .unwrap();
    /// assert!(registry.contains("urgent"));
    /// ```
    pub fn register_macro(
        &mut self,
        name: &str,
        query: &str,
        arg_types: &[DType],
        result: DType,
        inject_it: bool,
    ) -> Result<(), RegistryError> {
        let mut context = TypeContext::top_level();
        for (i, &dtype) in arg_types.iter().enumerate() {
            context.bind(&format!("arg{}", i), dtype);
        }

        let body = parser::parse(self, query, &context, result).map_err(|source| {
            RegistryError::InvalidMacro {
                name: name.to_string(),
                source,
            }
        })?;

        debug!(macro_name = %name, body = %body, "registered macro");

        self.insert(Function {
            descriptor: FunctionDescriptor {
                name: name.to_string(),
                params: arg_types.to_vec(),
                result,
                optional_trailing: false,
                inject_it,
                context_access: true,
            },
            body: FunctionBody::Macro(Arc::new(body)),
            trailing_default: None,
        });
        Ok(())
    }
}

fn builtins() -> Vec<Function> {
    use DType::*;

    vec![
        Function::native("done", &[Item], Bool, true, done),
        Function::native("description", &[Item], String, true, description),
        Function::native("projects", &[Item], StringCollection, true, projects),
        Function::native("contexts", &[Item], StringCollection, true, contexts),
        Function::native("tags", &[Item, String], StringCollection, true, tags),
        Function::native("tag", &[Item, String, String], String, true, tag)
            .with_trailing_default(default_empty_string),
        Function::native("hasTag", &[Item, String], Bool, true, has_tag),
        Function::native("priority", &[Item], Int, true, priority),
        Function::native("prio", &[String], Int, false, prio),
        Function::native("position", &[Item, ItemCollection], Int, true, position)
            .with_trailing_default(default_items),
        Function::native("created", &[Item, Date], Date, true, created)
            .with_trailing_default(default_today),
        Function::native("completed", &[Item, Date], Date, true, completed)
            .with_trailing_default(default_today),
        Function::native("tagDate", &[Item, String, Date], Date, true, tag_date)
            .with_trailing_default(default_today),
        Function::native("date", &[Int, Int, Int], Date, false, date),
        Function::native("days", &[Duration], Int, false, days),
        Function::native("dotPrefix", &[String, String], Bool, false, dot_prefix),
        Function::native("contains", &[StringCollection, String], Bool, false, contains),
        Function::native("hasSubstring", &[String, String], Bool, false, has_substring),
        Function::native("lower", &[String], String, false, lower),
        Function::native("count", &[ItemCollection], Int, false, count),
    ]
}

fn default_empty_string(_: &Env) -> Value {
    Value::String(String::new())
}

fn default_today(env: &Env) -> Value {
    Value::Date(env.today())
}

fn default_items(env: &Env) -> Value {
    Value::Items(Arc::clone(env.items()))
}

fn done(args: &[Value]) -> Value {
    Value::Bool(args[0].as_item().is_done())
}

fn description(args: &[Value]) -> Value {
    Value::String(args[0].as_item().description().to_string())
}

fn projects(args: &[Value]) -> Value {
    Value::Strings(args[0].as_item().projects().to_vec())
}

fn contexts(args: &[Value]) -> Value {
    Value::Strings(args[0].as_item().contexts().to_vec())
}

fn tags(args: &[Value]) -> Value {
    Value::Strings(args[0].as_item().tag_values(args[1].as_str()).to_vec())
}

fn tag(args: &[Value]) -> Value {
    let item = args[0].as_item();
    match item.tag_values(args[1].as_str()).first() {
        Some(value) => Value::String(value.clone()),
        None => args[2].clone(),
    }
}

fn has_tag(args: &[Value]) -> Value {
    Value::Bool(!args[0].as_item().tag_values(args[1].as_str()).is_empty())
}

/// `A` ranks highest (26), `Z` lowest (1), no priority is 0.
pub fn priority_ordinal(letter: char) -> i64 {
    let letter = letter.to_ascii_uppercase();
    if letter.is_ascii_uppercase() {
        26 - (letter as u8 - b'A') as i64
    } else {
        0
    }
}

fn priority(args: &[Value]) -> Value {
    Value::Int(args[0].as_item().priority().map_or(0, priority_ordinal))
}

fn prio(args: &[Value]) -> Value {
    let mut chars = args[0].as_str().chars();
    match (chars.next(), chars.next()) {
        (Some(letter), None) => Value::Int(priority_ordinal(letter)),
        _ => Value::Int(0),
    }
}

fn position(args: &[Value]) -> Value {
    let item = args[0].as_item();
    let found = position_in(args[1].as_items(), item);
    Value::Int(found.map_or(0, |p| p as i64))
}

fn created(args: &[Value]) -> Value {
    match args[0].as_item().creation_date() {
        Some(d) => Value::Date(d),
        None => args[1].clone(),
    }
}

fn completed(args: &[Value]) -> Value {
    match args[0].as_item().completion_date() {
        Some(d) => Value::Date(d),
        None => args[1].clone(),
    }
}

fn tag_date(args: &[Value]) -> Value {
    let item = args[0].as_item();
    item.tag_values(args[1].as_str())
        .first()
        .and_then(|raw| NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok())
        .map_or_else(|| args[2].clone(), Value::Date)
}

fn date(args: &[Value]) -> Value {
    let year = args[0].as_int().clamp(-9999, 9999) as i32;
    let month = args[1].as_int().clamp(1, 12) as u32;
    let day = args[2].as_int().clamp(1, 31) as u32;
    // Walk back from the requested day until it exists in that month.
    let date = (1..=day)
        .rev()
        .find_map(|d| NaiveDate::from_ymd_opt(year, month, d))
        .unwrap_or(NaiveDate::MIN);
    Value::Date(date)
}

fn days(args: &[Value]) -> Value {
    Value::Int(args[0].as_duration().whole_days())
}

/// True when `name` equals `prefix` or continues it with a `.` segment.
pub fn is_dot_prefix(name: &str, prefix: &str) -> bool {
    match name.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('.'),
        None => false,
    }
}

fn dot_prefix(args: &[Value]) -> Value {
    Value::Bool(is_dot_prefix(args[0].as_str(), args[1].as_str()))
}

fn contains(args: &[Value]) -> Value {
    let needle = args[1].as_str();
    Value::Bool(args[0].as_strings().iter().any(|s| s == needle))
}

fn has_substring(args: &[Value]) -> Value {
    let haystack = args[0].as_str().to_lowercase();
    Value::Bool(haystack.contains(&args[1].as_str().to_lowercase()))
}

fn lower(args: &[Value]) -> Value {
    Value::String(args[0].as_str().to_lowercase())
}

fn count(args: &[Value]) -> Value {
    Value::Int(args[0].as_items().len() as i64)
}
