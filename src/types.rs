//! The closed set of QQL value types and function signature validation.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Static type of a QQL expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DType {
    Bool,
    Int,
    String,
    Date,
    Duration,
    Item,
    ItemCollection,
    StringCollection,
}

impl DType {
    /// Element type bound by a quantifier ranging over this type.
    pub fn element(self) -> Option<DType> {
        match self {
            DType::ItemCollection => Some(DType::Item),
            DType::StringCollection => Some(DType::String),
            _ => None,
        }
    }

    /// Whether values of this type can be ordered with `<`, `<=`, `>`, `>=`.
    pub fn is_ordered(self) -> bool {
        matches!(
            self,
            DType::Int | DType::String | DType::Date | DType::Duration
        )
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DType::Bool => "bool",
            DType::Int => "int",
            DType::String => "string",
            DType::Date => "date",
            DType::Duration => "duration",
            DType::Item => "item",
            DType::ItemCollection => "item_collection",
            DType::StringCollection => "string_collection",
        };
        f.write_str(name)
    }
}

/// Signature of a built-in function or macro.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDescriptor {
    pub name: String,
    pub params: Vec<DType>,
    pub result: DType,
    /// The final parameter may be omitted; a default is supplied at evaluation.
    pub optional_trailing: bool,
    /// A missing or mismatched Item parameter is filled with the current item.
    pub inject_it: bool,
    /// The body reads the caller's `it`, `items` and `today`, so they must
    /// keep their top-level types wherever the function is called.
    pub context_access: bool,
}

/// Outcome of matching actual argument types against a descriptor.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgCheck {
    Accepted,
    /// Insert the implicit current item at this argument position and retry.
    InsertItemAt(usize),
    Rejected(TypeError),
}

impl FunctionDescriptor {
    pub fn check(&self, actual: &[DType]) -> ArgCheck {
        let last = self.params.len().checked_sub(1);

        for (position, &expected) in self.params.iter().enumerate() {
            match actual.get(position) {
                Some(&found) if found == expected => continue,
                None if self.optional_trailing
                    && Some(position) == last
                    && actual.len() == position =>
                {
                    return ArgCheck::Accepted;
                }
                _ if self.inject_it && expected == DType::Item => {
                    return ArgCheck::InsertItemAt(position);
                }
                Some(&found) => {
                    return ArgCheck::Rejected(TypeError::ArgumentMismatch {
                        function: self.name.clone(),
                        position,
                        expected,
                        found,
                    });
                }
                None => {
                    return ArgCheck::Rejected(TypeError::MissingArguments {
                        function: self.name.clone(),
                        expected: self.params.len(),
                        found: actual.len(),
                    });
                }
            }
        }

        if actual.len() > self.params.len() {
            return ArgCheck::Rejected(TypeError::TooManyArguments {
                function: self.name.clone(),
                expected: self.params.len(),
                found: actual.len(),
            });
        }

        ArgCheck::Accepted
    }

    /// Human-readable signature, e.g. `tag(item, string, [string]) -> string`.
    pub fn signature(&self) -> String {
        let last = self.params.len().saturating_sub(1);
        let params: Vec<String> = self
            .params
            .iter()
            .enumerate()
            .map(|(i, t)| {
                if self.optional_trailing && i == last {
                    format!("[{}]", t)
                } else {
                    t.to_string()
                }
            })
            .collect();
        format!("{}({}) -> {}", self.name, params.join(", "), self.result)
    }
}

/// A static type error found while validating a query.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeError {
    UnknownIdentifier(String),
    UnknownFunction(String),
    ArgumentMismatch {
        function: String,
        position: usize,
        expected: DType,
        found: DType,
    },
    MissingArguments {
        function: String,
        expected: usize,
        found: usize,
    },
    TooManyArguments {
        function: String,
        expected: usize,
        found: usize,
    },
    /// Operand types not accepted by a binary operator
    OperandMismatch {
        operator: &'static str,
        left: DType,
        right: DType,
    },
    /// Operand type not accepted by a unary operator or connective
    UnaryMismatch {
        operator: &'static str,
        operand: DType,
    },
    NotACollection(DType),
    NotOrderable(DType),
    /// A macro called where one of the free variables its body reads has
    /// been rebound to another type
    ShadowedContext {
        function: String,
        variable: String,
        expected: DType,
        found: DType,
    },
    ResultMismatch {
        expected: DType,
        found: DType,
    },
}

impl fmt::Display for TypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeError::UnknownIdentifier(name) => write!(f, "unknown identifier '{}'", name),
            TypeError::UnknownFunction(name) => write!(f, "unknown function '{}'", name),
            TypeError::ArgumentMismatch {
                function,
                position,
                expected,
                found,
            } => write!(
                f,
                "argument {} of {}() must be {}, got {}",
                position + 1,
                function,
                expected,
                found
            ),
            TypeError::MissingArguments {
                function,
                expected,
                found,
            } => write!(
                f,
                "{}() expects {} argument(s), got {}",
                function, expected, found
            ),
            TypeError::TooManyArguments {
                function,
                expected,
                found,
            } => write!(
                f,
                "{}() takes at most {} argument(s), got {}",
                function, expected, found
            ),
            TypeError::OperandMismatch {
                operator,
                left,
                right,
            } => write!(f, "operator '{}' cannot combine {} and {}", operator, left, right),
            TypeError::UnaryMismatch { operator, operand } => {
                write!(f, "operator '{}' cannot be applied to {}", operator, operand)
            }
            TypeError::NotACollection(found) => {
                write!(f, "quantifier ranges over {}, expected a collection", found)
            }
            TypeError::NotOrderable(found) => write!(f, "values of type {} cannot be ordered", found),
            TypeError::ShadowedContext {
                function,
                variable,
                expected,
                found,
            } => write!(
                f,
                "{}() reads '{}' as {}, but it is bound to {} here",
                function, variable, expected, found
            ),
            TypeError::ResultMismatch { expected, found } => {
                write!(f, "expression has type {}, expected {}", found, expected)
            }
        }
    }
}

impl std::error::Error for TypeError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(params: Vec<DType>, optional_trailing: bool, inject_it: bool) -> FunctionDescriptor {
        FunctionDescriptor {
            name: "f".to_string(),
            params,
            result: DType::Bool,
            optional_trailing,
            inject_it,
            context_access: false,
        }
    }

    #[test]
    fn test_exact_match_accepted() {
        let d = descriptor(vec![DType::Item, DType::String], false, true);
        assert_eq!(d.check(&[DType::Item, DType::String]), ArgCheck::Accepted);
    }

    #[test]
    fn test_missing_item_requests_insertion() {
        let d = descriptor(vec![DType::Item, DType::String], false, true);
        assert_eq!(d.check(&[DType::String]), ArgCheck::InsertItemAt(0));
        assert_eq!(d.check(&[]), ArgCheck::InsertItemAt(0));
    }

    #[test]
    fn test_no_injection_without_flag() {
        let d = descriptor(vec![DType::Item], false, false);
        assert!(matches!(
            d.check(&[]),
            ArgCheck::Rejected(TypeError::MissingArguments { .. })
        ));
    }

    #[test]
    fn test_optional_trailing_argument() {
        let d = descriptor(vec![DType::Item, DType::String, DType::String], true, true);
        assert_eq!(d.check(&[DType::Item, DType::String]), ArgCheck::Accepted);
        assert!(matches!(
            d.check(&[DType::Item]),
            ArgCheck::Rejected(TypeError::MissingArguments { .. })
        ));
    }

    #[test]
    fn test_too_many_arguments() {
        let d = descriptor(vec![DType::String], false, false);
        assert!(matches!(
            d.check(&[DType::String, DType::String]),
            ArgCheck::Rejected(TypeError::TooManyArguments { .. })
        ));
    }

    #[test]
    fn test_signature() {
        let d = descriptor(vec![DType::Item, DType::Date], true, true);
        assert_eq!(d.signature(), "f(item, [date]) -> bool");
    }
}
