use std::{cell::RefCell, rc::Rc};

use crate::{
    builtin::Builtins,
    environment::Environment,
    error::ParseErrorList,
    evaluator::Evaluator,
    lexer::Lexer,
    object::Object,
    parser::Parser,
};

/// A persistent evaluation session: one global environment fed by any
/// number of source snippets. Bindings, thoughts and quotes survive across
/// calls, which is what the REPL and the CLI both build on.
pub struct EvaluationContext {
    env: Rc<RefCell<Environment>>,
    evaluator: Evaluator,
}

impl EvaluationContext {
    pub fn new() -> Self {
        Self {
            env: Environment::new(),
            evaluator: Evaluator::new(),
        }
    }

    pub fn with_builtins(builtins: Builtins) -> Self {
        Self {
            env: Environment::new(),
            evaluator: Evaluator::with_builtins(builtins),
        }
    }

    pub fn env(&self) -> &Rc<RefCell<Environment>> {
        &self.env
    }

    /// Parses and evaluates one source text against the session environment.
    /// Any parse error refuses evaluation outright; a partial tree is never
    /// executed.
    pub fn evaluate_str(&mut self, source: &str) -> Result<Option<Object>, ParseErrorList> {
        let mut parser = Parser::new(Lexer::new(source));
        let program = parser.parse_program();

        if !parser.errors().is_empty() {
            return Err(ParseErrorList(parser.errors().to_vec()));
        }

        Ok(self.evaluator.eval_program(&program, &self.env))
    }
}

impl Default for EvaluationContext {
    fn default() -> Self {
        Self::new()
    }
}
