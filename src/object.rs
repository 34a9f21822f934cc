use core::fmt;
use std::{cell::RefCell, collections::HashMap, hash::Hasher, rc::Rc};

use fnv::FnvHasher;
use itertools::Itertools;

use crate::{ast::BlockStatement, environment::Environment};

/// Native function: receives the caller's environment (no child scope) and
/// the already-evaluated arguments.
pub type BuiltinFn = fn(&Rc<RefCell<Environment>>, Vec<Object>) -> Object;

/// Bucket key for hash literals. Two objects land in the same bucket iff
/// both the type tag and the 64-bit digest match; distinct keys of one type
/// that digest equal are indistinguishable, which is part of the contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HashKey {
    pub kind: &'static str,
    pub value: u64,
}

/// The original key object is kept alongside the value so hashes can render
/// their keys back out.
#[derive(Debug, Clone, PartialEq)]
pub struct HashPair {
    pub key: Object,
    pub value: Object,
}

/// Closure payload: parameter names, body, and the captured defining scope.
#[derive(Clone)]
pub struct FunctionObject {
    pub parameters: Vec<String>,
    pub body: BlockStatement,
    pub env: Rc<RefCell<Environment>>,
}

/// Runtime value. `ReturnValue` and `Error` are sentinel variants used to
/// unwind evaluation through ordinary returns; they never appear inside
/// collections or environments.
///
/// Composite payloads sit behind `Rc` so a value keeps a stable identity
/// when cloned out of an environment; the evaluator's `==` leans on
/// `Rc::ptr_eq` for exactly that.
#[derive(Clone)]
pub enum Object {
    Integer(i64),
    Boolean(bool),
    Str(String),
    Null,
    Array(Rc<Vec<Object>>),
    Hash(Rc<HashMap<HashKey, HashPair>>),
    Function(Rc<FunctionObject>),
    Builtin {
        name: &'static str,
        func: BuiltinFn,
    },
    ReturnValue(Box<Object>),
    Error(String),
    Word {
        name: String,
        definition: String,
    },
    Reference {
        name: String,
        definition: String,
    },
    Concept {
        name: String,
        definition: String,
    },
    Translation {
        name: String,
        definition: String,
    },
    MeThought {
        content: String,
    },
}

impl Object {
    pub fn array(elements: Vec<Object>) -> Self {
        Self::Array(Rc::new(elements))
    }

    pub fn hash(pairs: HashMap<HashKey, HashPair>) -> Self {
        Self::Hash(Rc::new(pairs))
    }

    /// Type tag as it appears in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Integer(_) => "INTEGER",
            Self::Boolean(_) => "BOOLEAN",
            Self::Str(_) => "STRING",
            Self::Null => "NULL",
            Self::Array(_) => "ARRAY",
            Self::Hash(_) => "HASH",
            Self::Function(_) => "FUNCTION",
            Self::Builtin { .. } => "BUILTIN",
            Self::ReturnValue(_) => "RETURN_VALUE",
            Self::Error(_) => "ERROR",
            Self::Word { .. } => "WORD",
            Self::Reference { .. } => "REF",
            Self::Concept { .. } => "CPT",
            Self::Translation { .. } => "TR",
            Self::MeThought { .. } => "ME",
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// Digest for use as a hash literal key; `None` for unhashable types.
    pub fn hash_key(&self) -> Option<HashKey> {
        let value = match self {
            Self::Boolean(value) => *value as u64,
            Self::Integer(value) => *value as u64,
            Self::Str(value) => {
                let mut hasher = FnvHasher::default();
                hasher.write(value.as_bytes());
                hasher.finish()
            }
            _ => return None,
        };

        Some(HashKey {
            kind: self.type_name(),
            value,
        })
    }
}

// Structural comparison, except functions: those compare by identity of
// their shared payload (comparing captured environments would recurse
// through the closure cycle). Builtins never compare equal. The evaluator
// narrows this further for the `==` operator.
impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Integer(a), Self::Integer(b)) => a == b,
            (Self::Boolean(a), Self::Boolean(b)) => a == b,
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::Null, Self::Null) => true,
            (Self::Array(a), Self::Array(b)) => a == b,
            (Self::Hash(a), Self::Hash(b)) => a == b,
            (Self::Function(a), Self::Function(b)) => Rc::ptr_eq(a, b),
            (Self::ReturnValue(a), Self::ReturnValue(b)) => a == b,
            (Self::Error(a), Self::Error(b)) => a == b,
            (
                Self::Word {
                    name: a,
                    definition: ad,
                },
                Self::Word {
                    name: b,
                    definition: bd,
                },
            ) => a == b && ad == bd,
            (
                Self::Reference {
                    name: a,
                    definition: ad,
                },
                Self::Reference {
                    name: b,
                    definition: bd,
                },
            ) => a == b && ad == bd,
            (
                Self::Concept {
                    name: a,
                    definition: ad,
                },
                Self::Concept {
                    name: b,
                    definition: bd,
                },
            ) => a == b && ad == bd,
            (
                Self::Translation {
                    name: a,
                    definition: ad,
                },
                Self::Translation {
                    name: b,
                    definition: bd,
                },
            ) => a == b && ad == bd,
            (Self::MeThought { content: a }, Self::MeThought { content: b }) => a == b,
            _ => false,
        }
    }
}

/// Inspect rendering: the canonical textual form of a value, used for
/// display and as the stored definition text of domain declarations.
impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(value) => write!(f, "{}", value),
            Self::Boolean(value) => write!(f, "{}", value),
            Self::Str(value) => write!(f, "{}", value),
            Self::Null => write!(f, "null"),
            Self::Array(elements) => {
                write!(f, "[{}]", elements.iter().map(|e| e.to_string()).join(", "))
            }
            Self::Hash(pairs) => {
                let pairs = pairs
                    .values()
                    .map(|pair| format!("{}: {}", pair.key, pair.value))
                    .join(", ");
                write!(f, "{{{}}}", pairs)
            }
            Self::Function(function) => write!(
                f,
                "fn({}) {}",
                function.parameters.iter().join(", "),
                function.body
            ),
            Self::Builtin { .. } => write!(f, "builtin function"),
            Self::ReturnValue(value) => write!(f, "{}", value),
            Self::Error(message) => write!(f, "ERROR: {}", message),
            Self::Word { name, definition } => write!(f, "{}->{{{}}}", name, definition),
            Self::Reference { name, definition } => write!(f, "{}->{{{}}}", name, definition),
            Self::Concept { name, definition } => write!(f, "{}->{{{}}}", name, definition),
            Self::Translation { name, definition } => write!(f, "{}->{{{}}}", name, definition),
            Self::MeThought { content } => write!(f, "'{}'", content),
        }
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Closures point back at their defining environment; rendering the
        // inspect form avoids walking that cycle.
        write!(f, "{}[{}]", self.type_name(), self)
    }
}
