use std::{cell::RefCell, collections::HashMap, rc::Rc};

use crate::{
    ast::{BlockStatement, Declaration, Expression, Program, Statement},
    builtin::Builtins,
    environment::Environment,
    object::{FunctionObject, HashPair, Object},
};

/// Tree-walking evaluator. Holds the builtin registry as injected state so
/// tests can swap in their own table.
///
/// Errors are first-class `Object::Error` values that short-circuit every
/// nested evaluation call until `eval_program` surfaces them as the final
/// result; `Object::ReturnValue` unwinds the same way but is unwrapped at
/// the call boundary (and at program top level) instead of aborting.
pub struct Evaluator {
    builtins: Builtins,
}

impl Evaluator {
    pub fn new() -> Self {
        Self {
            builtins: Builtins::standard(),
        }
    }

    pub fn with_builtins(builtins: Builtins) -> Self {
        Self { builtins }
    }

    /// Evaluates every statement in order. Stops early when a statement
    /// produces a return (unwrapped) or an error (returned as-is). `None`
    /// means the program ended on a statement with no value, such as `let`.
    pub fn eval_program(
        &self,
        program: &Program,
        env: &Rc<RefCell<Environment>>,
    ) -> Option<Object> {
        let mut result = None;

        for statement in &program.statements {
            match self.eval_statement(statement, env) {
                Some(Object::ReturnValue(value)) => return Some(*value),
                Some(error @ Object::Error(_)) => return Some(error),
                other => result = other,
            }
        }

        result
    }

    /// Unlike `eval_program`, a block passes `ReturnValue` through intact so
    /// an enclosing function body can unwind through nested blocks.
    fn eval_block(
        &self,
        block: &BlockStatement,
        env: &Rc<RefCell<Environment>>,
    ) -> Option<Object> {
        let mut result = None;

        for statement in &block.statements {
            match self.eval_statement(statement, env) {
                Some(object @ (Object::ReturnValue(_) | Object::Error(_))) => {
                    return Some(object)
                }
                other => result = other,
            }
        }

        result
    }

    fn eval_statement(
        &self,
        statement: &Statement,
        env: &Rc<RefCell<Environment>>,
    ) -> Option<Object> {
        match statement {
            Statement::Let { name, value } => {
                let value = self.eval_expression(value, env);
                if value.is_error() {
                    return Some(value);
                }
                env.borrow_mut().set(name.clone(), value);
                None
            }
            Statement::Return { value } => {
                let value = self.eval_expression(value, env);
                if value.is_error() {
                    return Some(value);
                }
                Some(Object::ReturnValue(Box::new(value)))
            }
            Statement::Expression { value } => Some(self.eval_expression(value, env)),
            Statement::Word(declaration) => {
                Some(self.eval_declaration(declaration, env, |name, definition| Object::Word {
                    name,
                    definition,
                }))
            }
            Statement::Reference(declaration) => Some(self.eval_declaration(
                declaration,
                env,
                |name, definition| Object::Reference { name, definition },
            )),
            Statement::Concept(declaration) => Some(self.eval_declaration(
                declaration,
                env,
                |name, definition| Object::Concept { name, definition },
            )),
            Statement::Translation(declaration) => Some(self.eval_declaration(
                declaration,
                env,
                |name, definition| Object::Translation { name, definition },
            )),
            Statement::MeThought { content } => {
                env.borrow_mut().add_thought(content.clone());
                // Transient: logged but never bound to a name.
                Some(Object::MeThought {
                    content: content.clone(),
                })
            }
            Statement::Quote { value } => {
                let value = self.eval_expression(value, env);
                if value.is_error() {
                    return Some(value);
                }
                env.borrow_mut().add_quote(value.clone());
                Some(value)
            }
        }
    }

    /// The record's stored definition is the inspect text of the evaluated
    /// value expression, not the raw source literal; a null value or an
    /// absent block leaves it empty.
    fn eval_declaration(
        &self,
        declaration: &Declaration,
        env: &Rc<RefCell<Environment>>,
        make: fn(String, String) -> Object,
    ) -> Object {
        let definition = match &declaration.value {
            Some(expression) => match self.eval_expression(expression, env) {
                error @ Object::Error(_) => return error,
                Object::Null => String::new(),
                value => value.to_string(),
            },
            None => String::new(),
        };

        let record = make(declaration.name.clone(), definition);
        env.borrow_mut()
            .set(declaration.name.clone(), record.clone());
        record
    }

    fn eval_expression(&self, expression: &Expression, env: &Rc<RefCell<Environment>>) -> Object {
        match expression {
            Expression::Identifier(name) => self.eval_identifier(name, env),
            Expression::Integer(value) => Object::Integer(*value),
            Expression::Boolean(value) => Object::Boolean(*value),
            Expression::Str(value) => Object::Str(value.clone()),
            Expression::Array(elements) => match self.eval_expressions(elements, env) {
                Ok(elements) => Object::array(elements),
                Err(error) => error,
            },
            Expression::Hash(pairs) => self.eval_hash_literal(pairs, env),
            Expression::Prefix { operator, right } => {
                let right = self.eval_expression(right, env);
                if right.is_error() {
                    return right;
                }
                eval_prefix_expression(operator, right)
            }
            Expression::Infix {
                operator,
                left,
                right,
            } => {
                let left = self.eval_expression(left, env);
                if left.is_error() {
                    return left;
                }
                let right = self.eval_expression(right, env);
                if right.is_error() {
                    return right;
                }
                eval_infix_expression(operator, left, right)
            }
            Expression::If {
                condition,
                consequence,
                alternative,
            } => {
                let condition = self.eval_expression(condition, env);
                if condition.is_error() {
                    return condition;
                }

                if is_truthy(&condition) {
                    self.eval_block(consequence, env).unwrap_or(Object::Null)
                } else if let Some(alternative) = alternative {
                    self.eval_block(alternative, env).unwrap_or(Object::Null)
                } else {
                    Object::Null
                }
            }
            Expression::Function { parameters, body } => {
                Object::Function(Rc::new(FunctionObject {
                    parameters: parameters.clone(),
                    body: body.clone(),
                    env: env.clone(),
                }))
            }
            Expression::Call {
                function,
                arguments,
            } => {
                let function = self.eval_expression(function, env);
                if function.is_error() {
                    return function;
                }
                let arguments = match self.eval_expressions(arguments, env) {
                    Ok(arguments) => arguments,
                    Err(error) => return error,
                };
                self.apply_function(env, function, arguments)
            }
            Expression::Index { left, index } => {
                let left = self.eval_expression(left, env);
                if left.is_error() {
                    return left;
                }
                let index = self.eval_expression(index, env);
                if index.is_error() {
                    return index;
                }
                eval_index_expression(left, index)
            }
        }
    }

    fn eval_identifier(&self, name: &str, env: &Rc<RefCell<Environment>>) -> Object {
        if let Some(value) = env.borrow().get(name) {
            return value;
        }
        if let Some(builtin) = self.builtins.get(name) {
            return builtin;
        }
        Object::Error(format!("identifier not found: {}", name))
    }

    /// Left-to-right; the first error aborts and becomes the sole result.
    fn eval_expressions(
        &self,
        expressions: &[Expression],
        env: &Rc<RefCell<Environment>>,
    ) -> Result<Vec<Object>, Object> {
        let mut results = Vec::with_capacity(expressions.len());

        for expression in expressions {
            let value = self.eval_expression(expression, env);
            if value.is_error() {
                return Err(value);
            }
            results.push(value);
        }

        Ok(results)
    }

    fn eval_hash_literal(
        &self,
        pairs: &[(Expression, Expression)],
        env: &Rc<RefCell<Environment>>,
    ) -> Object {
        let mut map = HashMap::new();

        for (key_expression, value_expression) in pairs {
            let key = self.eval_expression(key_expression, env);
            if key.is_error() {
                return key;
            }

            let hash_key = match key.hash_key() {
                Some(hash_key) => hash_key,
                None => {
                    return Object::Error(format!("unusable as hash key: {}", key.type_name()))
                }
            };

            let value = self.eval_expression(value_expression, env);
            if value.is_error() {
                return value;
            }

            map.insert(hash_key, HashPair { key, value });
        }

        Object::hash(map)
    }

    fn apply_function(
        &self,
        env: &Rc<RefCell<Environment>>,
        function: Object,
        arguments: Vec<Object>,
    ) -> Object {
        match function {
            Object::Function(function) => {
                if arguments.len() != function.parameters.len() {
                    return Object::Error(format!(
                        "wrong number of arguments. got={}, want={}",
                        arguments.len(),
                        function.parameters.len()
                    ));
                }

                let extended = Environment::new_enclosed(function.env.clone());
                for (parameter, argument) in function.parameters.iter().zip(arguments) {
                    extended.borrow_mut().set(parameter.clone(), argument);
                }

                match self.eval_block(&function.body, &extended) {
                    Some(Object::ReturnValue(value)) => *value,
                    Some(other) => other,
                    None => Object::Null,
                }
            }
            // Builtins run in the caller's scope, no child frame.
            Object::Builtin { func, .. } => func(env, arguments),
            other => Object::Error(format!("not a function: {}", other.type_name())),
        }
    }
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

/// Only `false` and `null` are falsy.
fn is_truthy(object: &Object) -> bool {
    !matches!(object, Object::Boolean(false) | Object::Null)
}

fn eval_prefix_expression(operator: &str, right: Object) -> Object {
    match operator {
        "!" => eval_bang_operator(right),
        "-" => match right {
            Object::Integer(value) => Object::Integer(value.wrapping_neg()),
            other => Object::Error(format!("unknown operator: -{}", other.type_name())),
        },
        _ => Object::Error(format!("unknown operator: {}{}", operator, right.type_name())),
    }
}

fn eval_bang_operator(right: Object) -> Object {
    Object::Boolean(!is_truthy(&right))
}

/// Dispatch order matters: integer and string pairs take their specialized
/// paths before the generic `==`/`!=` branch, so `1 == "a"` is `false`
/// rather than a type mismatch.
fn eval_infix_expression(operator: &str, left: Object, right: Object) -> Object {
    match (left, right) {
        (Object::Integer(left), Object::Integer(right)) => {
            eval_integer_infix_expression(operator, left, right)
        }
        (Object::Str(left), Object::Str(right)) => {
            if operator == "+" {
                Object::Str(left + &right)
            } else {
                Object::Error(format!("unknown operator: STRING {} STRING", operator))
            }
        }
        (left, right) => match operator {
            "==" => Object::Boolean(objects_identical(&left, &right)),
            "!=" => Object::Boolean(!objects_identical(&left, &right)),
            _ if left.type_name() != right.type_name() => Object::Error(format!(
                "type mismatch: {} {} {}",
                left.type_name(),
                operator,
                right.type_name()
            )),
            _ => Object::Error(format!(
                "unknown operator: {} {} {}",
                left.type_name(),
                operator,
                right.type_name()
            )),
        },
    }
}

/// Identity comparison for the generic `==` branch: booleans and null
/// compare by value, composites by their shared payload (a value read twice
/// from one binding is identical to itself, a structural twin is not), and
/// every other pairing is distinct.
fn objects_identical(left: &Object, right: &Object) -> bool {
    match (left, right) {
        (Object::Boolean(left), Object::Boolean(right)) => left == right,
        (Object::Null, Object::Null) => true,
        (Object::Array(left), Object::Array(right)) => Rc::ptr_eq(left, right),
        (Object::Hash(left), Object::Hash(right)) => Rc::ptr_eq(left, right),
        (Object::Function(left), Object::Function(right)) => Rc::ptr_eq(left, right),
        _ => false,
    }
}

fn eval_integer_infix_expression(operator: &str, left: i64, right: i64) -> Object {
    match operator {
        "+" => Object::Integer(left.wrapping_add(right)),
        "-" => Object::Integer(left.wrapping_sub(right)),
        "*" => Object::Integer(left.wrapping_mul(right)),
        "/" => {
            if right == 0 {
                Object::Error("division by zero".to_owned())
            } else {
                Object::Integer(left.wrapping_div(right))
            }
        }
        "<" => Object::Boolean(left < right),
        ">" => Object::Boolean(left > right),
        "==" => Object::Boolean(left == right),
        "!=" => Object::Boolean(left != right),
        _ => Object::Error(format!("unknown operator: INTEGER {} INTEGER", operator)),
    }
}

fn eval_index_expression(left: Object, index: Object) -> Object {
    match (left, index) {
        (Object::Array(elements), Object::Integer(index)) => {
            if index < 0 || index as usize >= elements.len() {
                Object::Null
            } else {
                elements[index as usize].clone()
            }
        }
        (Object::Hash(pairs), index) => match index.hash_key() {
            Some(hash_key) => pairs
                .get(&hash_key)
                .map(|pair| pair.value.clone())
                .unwrap_or(Object::Null),
            None => Object::Error(format!("unusable as hash key: {}", index.type_name())),
        },
        (left, _) => Object::Error(format!(
            "index operator not supported: {}",
            left.type_name()
        )),
    }
}
