pub mod ast;
pub mod builtin;
pub mod context;
pub mod environment;
pub mod error;
pub mod evaluator;
pub mod lexer;
pub mod object;
pub mod parser;
pub mod token;

#[cfg(test)]
mod test_utils;

pub use builtin::Builtins;
pub use context::EvaluationContext;
pub use environment::Environment;
pub use error::{ParseError, ParseErrorList};
pub use evaluator::Evaluator;
pub use lexer::Lexer;
pub use object::Object;
pub use parser::Parser;
