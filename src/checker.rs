//! Static validation of QQL expressions.
//!
//! Validation runs once, right after parsing, and is the only place type
//! errors are reported. It also finishes the tree: bare names are resolved
//! to variables or calls, and implicit `it` arguments are inserted where a
//! function asks for them.

use std::collections::HashMap;
use std::sync::Arc;

use crate::ast::{ArithOp, CompareOp, Expr};
use crate::registry::Function;
use crate::types::{ArgCheck, DType, TypeError};

const FREE_VARIABLES: [(&str, DType); 3] = [
    ("it", DType::Item),
    ("items", DType::ItemCollection),
    ("today", DType::Date),
];

/// Names in scope and their types.
#[derive(Debug, Clone, Default)]
pub struct TypeContext {
    bindings: HashMap<String, DType>,
}

impl TypeContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// The free variables every top-level query sees.
    pub fn top_level() -> Self {
        let mut context = Self::new();
        for (name, dtype) in FREE_VARIABLES {
            context.bind(name, dtype);
        }
        context
    }

    /// Binds `name`, returning the binding it shadows.
    pub fn bind(&mut self, name: &str, dtype: DType) -> Option<DType> {
        self.bindings.insert(name.to_string(), dtype)
    }

    /// Undoes a [`bind`](Self::bind) given the value it returned.
    pub fn restore(&mut self, name: &str, prior: Option<DType>) {
        match prior {
            Some(dtype) => {
                self.bindings.insert(name.to_string(), dtype);
            }
            None => {
                self.bindings.remove(name);
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<DType> {
        self.bindings.get(name).copied()
    }
}

impl Expr {
    /// Infers the type of this expression, rewriting it in place.
    pub fn validate(&mut self, context: &mut TypeContext) -> Result<DType, TypeError> {
        // A bare function name that is also a variable in scope is the variable.
        if let Expr::Call { function, bare, .. } = self
            && *bare
        {
            match context.get(function.name()) {
                Some(dtype) => {
                    let name = function.name().to_string();
                    *self = Expr::Ident(name);
                    return Ok(dtype);
                }
                None => *bare = false,
            }
        }

        match self {
            Expr::Const(value) => Ok(value.dtype()),
            Expr::Ident(name) => context
                .get(name)
                .ok_or_else(|| TypeError::UnknownIdentifier(name.clone())),
            Expr::Call { function, args, .. } => validate_call(function, args, context),
            Expr::Not(operand) => match operand.validate(context)? {
                DType::Bool => Ok(DType::Bool),
                other => Err(TypeError::UnaryMismatch {
                    operator: "!",
                    operand: other,
                }),
            },
            Expr::Sign { negative, operand } => match operand.validate(context)? {
                dtype @ (DType::Int | DType::Duration) => Ok(dtype),
                other => Err(TypeError::UnaryMismatch {
                    operator: if *negative { "-" } else { "+" },
                    operand: other,
                }),
            },
            Expr::Arith { op, left, right } => {
                let l = left.validate(context)?;
                let r = right.validate(context)?;
                arith_result(*op, l, r).ok_or(TypeError::OperandMismatch {
                    operator: op.symbol(),
                    left: l,
                    right: r,
                })
            }
            Expr::Compare { op, left, right } => {
                let l = left.validate(context)?;
                let r = right.validate(context)?;
                let comparable =
                    l == r && (l.is_ordered() || (*op == CompareOp::Eq && l == DType::Bool));
                if comparable {
                    Ok(DType::Bool)
                } else {
                    Err(TypeError::OperandMismatch {
                        operator: op.symbol(),
                        left: l,
                        right: r,
                    })
                }
            }
            Expr::Logic { op, left, right } => {
                let l = left.validate(context)?;
                let r = right.validate(context)?;
                if l == DType::Bool && r == DType::Bool {
                    Ok(DType::Bool)
                } else {
                    Err(TypeError::OperandMismatch {
                        operator: op.symbol(),
                        left: l,
                        right: r,
                    })
                }
            }
            Expr::Quantified {
                quantifier,
                var,
                collection,
                body,
            } => {
                let collection_type = collection.validate(context)?;
                let element = collection_type
                    .element()
                    .ok_or(TypeError::NotACollection(collection_type))?;

                let prior = context.bind(var, element);
                let body_type = body.validate(context);
                context.restore(var, prior);

                match body_type? {
                    DType::Bool => Ok(DType::Bool),
                    other => Err(TypeError::UnaryMismatch {
                        operator: quantifier.keyword(),
                        operand: other,
                    }),
                }
            }
        }
    }
}

fn arith_result(op: ArithOp, left: DType, right: DType) -> Option<DType> {
    match (op, left, right) {
        (_, DType::Int, DType::Int) => Some(DType::Int),
        (_, DType::Date, DType::Duration) => Some(DType::Date),
        (_, DType::Duration, DType::Duration) => Some(DType::Duration),
        _ => None,
    }
}

/// Validates arguments, then matches them against the signature, inserting
/// `it` wherever the descriptor asks for it.
fn validate_call(
    function: &Arc<Function>,
    args: &mut Vec<Expr>,
    context: &mut TypeContext,
) -> Result<DType, TypeError> {
    let mut types = args
        .iter_mut()
        .map(|arg| arg.validate(context))
        .collect::<Result<Vec<_>, _>>()?;

    let descriptor = function.descriptor();
    if descriptor.context_access {
        check_free_variables(&descriptor.name, context)?;
    }
    loop {
        match descriptor.check(&types) {
            ArgCheck::Accepted => return Ok(descriptor.result),
            ArgCheck::InsertItemAt(position) => {
                let mut implicit = Expr::ident("it");
                let dtype = implicit.validate(context)?;
                if dtype != DType::Item {
                    return Err(TypeError::ArgumentMismatch {
                        function: descriptor.name.clone(),
                        position,
                        expected: DType::Item,
                        found: dtype,
                    });
                }
                args.insert(position, implicit);
                types.insert(position, dtype);
            }
            ArgCheck::Rejected(error) => return Err(error),
        }
    }
}

/// A macro body is evaluated in its caller's scope, so the free variables it
/// was validated against must not have been rebound to other types there.
fn check_free_variables(function: &str, context: &TypeContext) -> Result<(), TypeError> {
    for (name, expected) in FREE_VARIABLES {
        match context.get(name) {
            Some(found) if found == expected => {}
            Some(found) => {
                return Err(TypeError::ShadowedContext {
                    function: function.to_string(),
                    variable: name.to_string(),
                    expected,
                    found,
                });
            }
            None => return Err(TypeError::UnknownIdentifier(name.to_string())),
        }
    }
    Ok(())
}

/// Validates a whole query and checks its result type.
pub fn validate_root(
    expr: &mut Expr,
    context: &TypeContext,
    expected: DType,
) -> Result<(), TypeError> {
    let mut scope = context.clone();
    let found = expr.validate(&mut scope)?;
    if found != expected {
        return Err(TypeError::ResultMismatch { expected, found });
    }
    Ok(())
}
