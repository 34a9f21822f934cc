use core::fmt;

use itertools::Itertools;

/// Root of one parsed source text. Owns every node for the lifetime of an
/// evaluation; nothing mutates the tree after parsing.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub statements: Vec<Statement>,
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for statement in &self.statements {
            write!(f, "{}", statement)?;
        }
        Ok(())
    }
}

/// Shared shape of the four domain declarations: `word`, `ref`, `cpt`, `tr`.
/// When the braced block is present `definition` holds the literal text,
/// `value` the expression parsed from it, and `defined` is set.
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub name: String,
    pub value: Option<Expression>,
    pub definition: String,
    pub defined: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Let { name: String, value: Expression },
    Return { value: Expression },
    Expression { value: Expression },
    Word(Declaration),
    Reference(Declaration),
    Concept(Declaration),
    Translation(Declaration),
    MeThought { content: String },
    Quote { value: Expression },
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Let { name, value } => write!(f, "let {} = {};", name, value),
            Self::Return { value } => write!(f, "return {};", value),
            Self::Expression { value } => write!(f, "{}", value),
            Self::Word(decl) => write_declaration(f, "word", &format!("\"{}\"", decl.name), decl),
            Self::Reference(decl) => {
                write_declaration(f, "ref", &format!("\"{}\"", decl.name), decl)
            }
            Self::Concept(decl) => {
                write_declaration(f, "cpt", &format!("\"{}\"", decl.name), decl)
            }
            Self::Translation(decl) => write_declaration(f, "tr", &decl.name, decl),
            Self::MeThought { content } => write!(f, "me: {{ \"{}\" }};", content),
            Self::Quote { value } => write!(f, "quote: {{ {} }};", value),
        }
    }
}

fn write_declaration(
    f: &mut fmt::Formatter<'_>,
    keyword: &str,
    name: &str,
    decl: &Declaration,
) -> fmt::Result {
    if decl.defined {
        write!(f, "{}: {} {{ \"{}\" }};", keyword, name, decl.definition)
    } else {
        write!(f, "{}: {};", keyword, name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BlockStatement {
    pub statements: Vec<Statement>,
}

impl fmt::Display for BlockStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for statement in &self.statements {
            write!(f, "{}", statement)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Identifier(String),
    Integer(i64),
    Boolean(bool),
    // Raw text; rendered without quotes, as the scanner produced it.
    Str(String),
    Array(Vec<Expression>),
    // Pairs in source order.
    Hash(Vec<(Expression, Expression)>),
    Prefix {
        operator: String,
        right: Box<Expression>,
    },
    Infix {
        operator: String,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    If {
        condition: Box<Expression>,
        consequence: BlockStatement,
        alternative: Option<BlockStatement>,
    },
    Function {
        parameters: Vec<String>,
        body: BlockStatement,
    },
    Call {
        function: Box<Expression>,
        arguments: Vec<Expression>,
    },
    Index {
        left: Box<Expression>,
        index: Box<Expression>,
    },
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Identifier(name) => write!(f, "{}", name),
            Self::Integer(value) => write!(f, "{}", value),
            Self::Boolean(value) => write!(f, "{}", value),
            Self::Str(value) => write!(f, "{}", value),
            Self::Array(elements) => {
                write!(f, "[{}]", elements.iter().map(|e| e.to_string()).join(", "))
            }
            Self::Hash(pairs) => {
                let pairs = pairs
                    .iter()
                    .map(|(key, value)| format!("{}:{}", key, value))
                    .join(", ");
                write!(f, "{{{}}}", pairs)
            }
            Self::Prefix { operator, right } => write!(f, "({}{})", operator, right),
            Self::Infix {
                operator,
                left,
                right,
            } => write!(f, "({} {} {})", left, operator, right),
            Self::If {
                condition,
                consequence,
                alternative,
            } => {
                write!(f, "if{} {}", condition, consequence)?;
                if let Some(alternative) = alternative {
                    write!(f, "else {}", alternative)?;
                }
                Ok(())
            }
            Self::Function { parameters, body } => {
                write!(f, "fn({}) {}", parameters.iter().join(", "), body)
            }
            Self::Call {
                function,
                arguments,
            } => {
                let arguments = arguments.iter().map(|a| a.to_string()).join(", ");
                write!(f, "{}({})", function, arguments)
            }
            Self::Index { left, index } => write!(f, "({}[{}])", left, index),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn let_statement_renders_to_source() {
        let program = Program {
            statements: vec![Statement::Let {
                name: "myVar".to_owned(),
                value: Expression::Identifier("anotherVar".to_owned()),
            }],
        };

        assert_eq!(program.to_string(), "let myVar = anotherVar;");
    }

    #[test]
    fn nested_expressions_render_with_grouping() {
        let expr = Expression::Infix {
            operator: "*".to_owned(),
            left: Box::new(Expression::Infix {
                operator: "+".to_owned(),
                left: Box::new(Expression::Integer(1)),
                right: Box::new(Expression::Integer(2)),
            }),
            right: Box::new(Expression::Prefix {
                operator: "-".to_owned(),
                right: Box::new(Expression::Identifier("x".to_owned())),
            }),
        };

        assert_eq!(expr.to_string(), "((1 + 2) * (-x))");
    }

    #[test]
    fn word_declaration_renders_its_block() {
        let statement = Statement::Word(Declaration {
            name: "cat".to_owned(),
            value: Some(Expression::Str("a small feline".to_owned())),
            definition: "a small feline".to_owned(),
            defined: true,
        });

        assert_eq!(
            statement.to_string(),
            "word: \"cat\" { \"a small feline\" };"
        );
    }
}
