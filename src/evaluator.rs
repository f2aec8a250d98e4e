use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;

use crate::ast::{ArithOp, Expr, LogicOp, Quantifier};
use crate::registry::{Function, FunctionBody};
use crate::task::{Item, TaskList};
use crate::value::Value;

/// Variable bindings visible while evaluating an expression.
///
/// Quantifiers and macro calls bind names for the duration of their body and
/// put the previous binding back afterwards, so one `Env` is threaded through
/// a whole evaluation. The top-level `items` and `today` are also kept aside
/// for trailing defaults, since queries may shadow those names.
#[derive(Debug, Clone)]
pub struct Env {
    bindings: HashMap<String, Value>,
    items: Arc<Vec<Arc<Item>>>,
    today: NaiveDate,
}

impl Env {
    pub fn new(today: NaiveDate) -> Self {
        let mut bindings = HashMap::new();
        bindings.insert("today".to_string(), Value::Date(today));
        Env {
            bindings,
            items: Arc::new(Vec::new()),
            today,
        }
    }

    /// The top-level environment for testing `item` as part of `list`.
    pub fn for_item(list: &TaskList, item: &Arc<Item>, today: NaiveDate) -> Self {
        let mut env = Self::new(today);
        env.items = Arc::clone(list.items());
        env.bind("it", Value::Item(Arc::clone(item)));
        env.bind("items", Value::Items(Arc::clone(&env.items)));
        env
    }

    /// Binds `name`, returning the value it shadows.
    pub fn bind(&mut self, name: &str, value: Value) -> Option<Value> {
        self.bindings.insert(name.to_string(), value)
    }

    /// Undoes a [`bind`](Self::bind) given the value it returned.
    pub fn restore(&mut self, name: &str, prior: Option<Value>) {
        match prior {
            Some(value) => {
                self.bindings.insert(name.to_string(), value);
            }
            None => {
                self.bindings.remove(name);
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.bindings.get(name)
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// The whole task list, whatever `items` is currently bound to.
    pub fn items(&self) -> &Arc<Vec<Arc<Item>>> {
        &self.items
    }
}

impl Expr {
    /// Evaluates a validated expression.
    ///
    /// # Panics
    ///
    /// Panics if the expression was not validated against bindings matching
    /// `env`, since a runtime type mismatch cannot happen otherwise.
    pub fn eval(&self, env: &mut Env) -> Value {
        match self {
            Expr::Const(value) => value.clone(),
            Expr::Ident(name) => match env.get(name) {
                Some(value) => value.clone(),
                None => panic!("internal invariant violated: unbound variable '{}'", name),
            },
            Expr::Call { function, args, .. } => call(function, args, env),
            Expr::Not(operand) => Value::Bool(!operand.eval(env).as_bool()),
            Expr::Sign { negative, operand } => {
                let value = operand.eval(env);
                match (negative, value) {
                    (false, value) => value,
                    (true, Value::Int(n)) => Value::Int(n.wrapping_neg()),
                    (true, Value::Duration(d)) => Value::Duration(d.negate()),
                    (true, other) => panic!(
                        "internal invariant violated: cannot negate {}",
                        other.dtype()
                    ),
                }
            }
            Expr::Arith { op, left, right } => {
                let l = left.eval(env);
                let r = right.eval(env);
                arith(*op, l, r)
            }
            Expr::Compare { op, left, right } => {
                let l = left.eval(env);
                let r = right.eval(env);
                Value::Bool(op.holds(l.compare(&r)))
            }
            Expr::Logic { op, left, right } => {
                let l = left.eval(env).as_bool();
                let result = match op {
                    LogicOp::And => l && right.eval(env).as_bool(),
                    LogicOp::Or => l || right.eval(env).as_bool(),
                    LogicOp::Implies => !l || right.eval(env).as_bool(),
                };
                Value::Bool(result)
            }
            Expr::Quantified {
                quantifier,
                var,
                collection,
                body,
            } => Value::Bool(quantify(*quantifier, var, collection, body, env)),
        }
    }
}

fn arith(op: ArithOp, left: Value, right: Value) -> Value {
    match (op, left, right) {
        (ArithOp::Add, Value::Int(a), Value::Int(b)) => Value::Int(a.wrapping_add(b)),
        (ArithOp::Sub, Value::Int(a), Value::Int(b)) => Value::Int(a.wrapping_sub(b)),
        (ArithOp::Add, Value::Date(d), Value::Duration(offset)) => Value::Date(offset.apply_to(d)),
        (ArithOp::Sub, Value::Date(d), Value::Duration(offset)) => {
            Value::Date(offset.negate().apply_to(d))
        }
        (ArithOp::Add, Value::Duration(a), Value::Duration(b)) => Value::Duration(a.plus(b)),
        (ArithOp::Sub, Value::Duration(a), Value::Duration(b)) => {
            Value::Duration(a.plus(b.negate()))
        }
        (op, l, r) => panic!(
            "internal invariant violated: '{}' applied to {} and {}",
            op.symbol(),
            l.dtype(),
            r.dtype()
        ),
    }
}

/// Short-circuits on the first element that decides the result.
fn quantify(
    quantifier: Quantifier,
    var: &str,
    collection: &Expr,
    body: &Expr,
    env: &mut Env,
) -> bool {
    let elements: Vec<Value> = match collection.eval(env) {
        Value::Items(items) => items.iter().cloned().map(Value::Item).collect(),
        Value::Strings(strings) => strings.into_iter().map(Value::String).collect(),
        other => panic!(
            "internal invariant violated: cannot quantify over {}",
            other.dtype()
        ),
    };

    // exists stops at the first true body, forall at the first false one
    let decisive = quantifier == Quantifier::Exists;
    let mut result = !decisive;
    for element in elements {
        let prior = env.bind(var, element);
        let holds = body.eval(env).as_bool();
        env.restore(var, prior);
        if holds == decisive {
            result = decisive;
            break;
        }
    }
    result
}

fn call(function: &Function, args: &[Expr], env: &mut Env) -> Value {
    let mut values: Vec<Value> = args.iter().map(|arg| arg.eval(env)).collect();
    if let Some(default) = function.trailing_default()
        && values.len() + 1 == function.descriptor().params.len()
    {
        values.push(default(env));
    }

    match function.body() {
        FunctionBody::Native(implementation) => implementation(&values),
        FunctionBody::Macro(body) => {
            let names: Vec<String> = (0..values.len()).map(|i| format!("arg{}", i)).collect();
            let priors: Vec<Option<Value>> = names
                .iter()
                .zip(values)
                .map(|(name, value)| env.bind(name, value))
                .collect();
            let result = body.eval(env);
            for (name, prior) in names.iter().zip(priors).rev() {
                env.restore(name, prior);
            }
            result
        }
    }
}
