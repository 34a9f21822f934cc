use crate::{
    ast::{BlockStatement, Declaration, Expression, Program, Statement},
    error::ParseError,
    lexer::Lexer,
    token::{Token, TokenKind},
};

/// Binding strength, low to high. Binary operators are left-associative:
/// the right-hand recursion re-uses the operator's own precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Precedence {
    Lowest,
    Equals,
    LessGreater,
    Sum,
    Product,
    Prefix,
    Call,
    Index,
}

fn precedence_of(kind: TokenKind) -> Precedence {
    match kind {
        TokenKind::Eq | TokenKind::NotEq => Precedence::Equals,
        TokenKind::Lt | TokenKind::Gt => Precedence::LessGreater,
        TokenKind::Plus | TokenKind::Minus => Precedence::Sum,
        TokenKind::Slash | TokenKind::Asterisk => Precedence::Product,
        TokenKind::LParen => Precedence::Call,
        TokenKind::LBracket => Precedence::Index,
        _ => Precedence::Lowest,
    }
}

/// Pratt-style recursive-descent parser with two tokens of lookahead.
///
/// `parse_program` never fails outright: a malformed construct records a
/// line-tagged [`ParseError`] and parsing resumes at the next statement
/// boundary. Callers must check [`Parser::errors`] before trusting the tree.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    cur: Token,
    peek: Token,
    errors: Vec<ParseError>,
}

impl<'a> Parser<'a> {
    pub fn new(mut lexer: Lexer<'a>) -> Self {
        let cur = lexer.next_token();
        let peek = lexer.next_token();
        Self {
            lexer,
            cur,
            peek,
            errors: Vec::new(),
        }
    }

    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    pub fn parse_program(&mut self) -> Program {
        let mut program = Program::default();

        while !self.cur_is(TokenKind::Eof) {
            if let Some(statement) = self.parse_statement() {
                program.statements.push(statement);
            }
            self.next_token();
        }

        program
    }

    fn next_token(&mut self) {
        self.cur = std::mem::replace(&mut self.peek, self.lexer.next_token());
    }

    fn cur_is(&self, kind: TokenKind) -> bool {
        self.cur.kind == kind
    }

    fn peek_is(&self, kind: TokenKind) -> bool {
        self.peek.kind == kind
    }

    fn expect_peek(&mut self, kind: TokenKind) -> bool {
        if self.peek_is(kind) {
            self.next_token();
            return true;
        }
        self.peek_error(kind);
        false
    }

    fn peek_error(&mut self, expected: TokenKind) {
        self.errors.push(ParseError {
            message: format!(
                "expected next token to be [{}], got {} instead",
                expected, self.peek.kind
            ),
            line: self.peek.line,
        });
    }

    fn peek_precedence(&self) -> Precedence {
        precedence_of(self.peek.kind)
    }

    fn cur_precedence(&self) -> Precedence {
        precedence_of(self.cur.kind)
    }

    fn parse_statement(&mut self) -> Option<Statement> {
        match self.cur.kind {
            TokenKind::Let => self.parse_let_statement(),
            TokenKind::Return => self.parse_return_statement(),
            TokenKind::Word => Some(Statement::Word(
                self.parse_declaration(TokenKind::String)?,
            )),
            TokenKind::Ref => Some(Statement::Reference(
                self.parse_declaration(TokenKind::String)?,
            )),
            TokenKind::Cpt => Some(Statement::Concept(
                self.parse_declaration(TokenKind::String)?,
            )),
            TokenKind::Tr => Some(Statement::Translation(
                self.parse_declaration(TokenKind::Ident)?,
            )),
            TokenKind::Me => self.parse_me_thought_statement(),
            TokenKind::Quote => self.parse_quote_statement(),
            _ => self.parse_expression_statement(),
        }
    }

    fn parse_let_statement(&mut self) -> Option<Statement> {
        if !self.expect_peek(TokenKind::Ident) {
            return None;
        }
        let name = self.cur.literal.clone();

        if !self.expect_peek(TokenKind::Assign) {
            return None;
        }
        self.next_token();

        let value = self.parse_expression(Precedence::Lowest)?;
        self.skip_optional_semicolon();

        Some(Statement::Let { name, value })
    }

    fn parse_return_statement(&mut self) -> Option<Statement> {
        self.next_token();
        let value = self.parse_expression(Precedence::Lowest)?;
        self.skip_optional_semicolon();

        Some(Statement::Return { value })
    }

    /// Shared grammar of `word`/`ref`/`cpt`/`tr`:
    /// `<kw> : <name> [ { <string-literal …> } ] ;`
    ///
    /// The braced block holds a string literal that does double duty: its
    /// raw text becomes the definition, and the expression parsed starting
    /// at it (infix may extend it) becomes the value.
    fn parse_declaration(&mut self, name_kind: TokenKind) -> Option<Declaration> {
        if !self.expect_peek(TokenKind::Colon) {
            return None;
        }
        if !self.expect_peek(name_kind) {
            return None;
        }

        let mut declaration = Declaration {
            name: self.cur.literal.clone(),
            value: None,
            definition: String::new(),
            defined: false,
        };

        if self.peek_is(TokenKind::LBrace) {
            self.next_token();
            if !self.expect_peek(TokenKind::String) {
                return None;
            }
            declaration.definition = self.cur.literal.clone();
            declaration.value = Some(self.parse_expression(Precedence::Lowest)?);
            if !self.expect_peek(TokenKind::RBrace) {
                return None;
            }
            declaration.defined = true;
        }

        self.skip_optional_semicolon();
        Some(declaration)
    }

    /// `me : { <string> } ;` where the literal's parsed-expression rendering
    /// becomes the thought content.
    fn parse_me_thought_statement(&mut self) -> Option<Statement> {
        if !self.expect_peek(TokenKind::Colon) {
            return None;
        }
        if !self.expect_peek(TokenKind::LBrace) {
            return None;
        }

        let mut content = String::new();
        if self.peek_is(TokenKind::String) {
            self.next_token();
            content = self.parse_expression(Precedence::Lowest)?.to_string();
        }
        if !self.expect_peek(TokenKind::RBrace) {
            return None;
        }

        self.skip_optional_semicolon();
        Some(Statement::MeThought { content })
    }

    /// `quote : { <expr> } ;`
    fn parse_quote_statement(&mut self) -> Option<Statement> {
        if !self.expect_peek(TokenKind::Colon) {
            return None;
        }
        if !self.expect_peek(TokenKind::LBrace) {
            return None;
        }
        self.next_token();

        let value = self.parse_expression(Precedence::Lowest)?;
        if !self.expect_peek(TokenKind::RBrace) {
            return None;
        }

        self.skip_optional_semicolon();
        Some(Statement::Quote { value })
    }

    fn parse_expression_statement(&mut self) -> Option<Statement> {
        let value = self.parse_expression(Precedence::Lowest);
        // Consume the terminator even when the expression failed, so one bad
        // expression reports one error instead of tripping over its own `;`.
        self.skip_optional_semicolon();
        Some(Statement::Expression { value: value? })
    }

    fn skip_optional_semicolon(&mut self) {
        if self.peek_is(TokenKind::Semicolon) {
            self.next_token();
        }
    }

    fn parse_expression(&mut self, precedence: Precedence) -> Option<Expression> {
        let mut left = self.parse_prefix()?;

        while !self.peek_is(TokenKind::Semicolon) && precedence < self.peek_precedence() {
            left = match self.peek.kind {
                TokenKind::Plus
                | TokenKind::Minus
                | TokenKind::Slash
                | TokenKind::Asterisk
                | TokenKind::Eq
                | TokenKind::NotEq
                | TokenKind::Lt
                | TokenKind::Gt => {
                    self.next_token();
                    self.parse_infix_expression(left)?
                }
                TokenKind::LParen => {
                    self.next_token();
                    self.parse_call_expression(left)?
                }
                TokenKind::LBracket => {
                    self.next_token();
                    self.parse_index_expression(left)?
                }
                _ => return Some(left),
            };
        }

        Some(left)
    }

    fn parse_prefix(&mut self) -> Option<Expression> {
        match self.cur.kind {
            TokenKind::Ident => Some(Expression::Identifier(self.cur.literal.clone())),
            TokenKind::Int => self.parse_integer_literal(),
            // The domain keywords double as plain string text when they
            // show up in expression position.
            TokenKind::String
            | TokenKind::Word
            | TokenKind::Ref
            | TokenKind::Tr
            | TokenKind::Me
            | TokenKind::Colon => Some(Expression::Str(self.cur.literal.clone())),
            TokenKind::True | TokenKind::False => {
                Some(Expression::Boolean(self.cur_is(TokenKind::True)))
            }
            TokenKind::Bang | TokenKind::Minus => self.parse_prefix_expression(),
            TokenKind::LParen => self.parse_grouped_expression(),
            TokenKind::If => self.parse_if_expression(),
            TokenKind::Function => self.parse_function_literal(),
            TokenKind::LBracket => Some(Expression::Array(
                self.parse_expression_list(TokenKind::RBracket)?,
            )),
            TokenKind::LBrace => self.parse_hash_literal(),
            _ => {
                self.errors.push(ParseError {
                    message: format!("no prefix parse function for {} found", self.cur.kind),
                    line: self.cur.line,
                });
                None
            }
        }
    }

    fn parse_integer_literal(&mut self) -> Option<Expression> {
        match self.cur.literal.parse::<i64>() {
            Ok(value) => Some(Expression::Integer(value)),
            Err(_) => {
                self.errors.push(ParseError {
                    message: format!("could not parse {:?} as Integer", self.cur.literal),
                    line: self.cur.line,
                });
                None
            }
        }
    }

    fn parse_prefix_expression(&mut self) -> Option<Expression> {
        let operator = self.cur.literal.clone();
        self.next_token();
        let right = self.parse_expression(Precedence::Prefix)?;

        Some(Expression::Prefix {
            operator,
            right: Box::new(right),
        })
    }

    fn parse_infix_expression(&mut self, left: Expression) -> Option<Expression> {
        let operator = self.cur.literal.clone();
        let precedence = self.cur_precedence();
        self.next_token();
        let right = self.parse_expression(precedence)?;

        Some(Expression::Infix {
            operator,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    fn parse_grouped_expression(&mut self) -> Option<Expression> {
        self.next_token();
        let expression = self.parse_expression(Precedence::Lowest)?;
        if !self.expect_peek(TokenKind::RParen) {
            return None;
        }
        Some(expression)
    }

    fn parse_if_expression(&mut self) -> Option<Expression> {
        if !self.expect_peek(TokenKind::LParen) {
            return None;
        }
        self.next_token();
        let condition = self.parse_expression(Precedence::Lowest)?;

        if !self.expect_peek(TokenKind::RParen) {
            return None;
        }
        if !self.expect_peek(TokenKind::LBrace) {
            return None;
        }
        let consequence = self.parse_block_statement();

        let mut alternative = None;
        if self.peek_is(TokenKind::Else) {
            self.next_token();
            if !self.expect_peek(TokenKind::LBrace) {
                return None;
            }
            alternative = Some(self.parse_block_statement());
        }

        Some(Expression::If {
            condition: Box::new(condition),
            consequence,
            alternative,
        })
    }

    fn parse_block_statement(&mut self) -> BlockStatement {
        let mut statements = Vec::new();
        self.next_token();

        while !self.cur_is(TokenKind::RBrace) && !self.cur_is(TokenKind::Eof) {
            if let Some(statement) = self.parse_statement() {
                statements.push(statement);
            }
            self.next_token();
        }

        BlockStatement { statements }
    }

    fn parse_function_literal(&mut self) -> Option<Expression> {
        if !self.expect_peek(TokenKind::LParen) {
            return None;
        }
        let parameters = self.parse_function_parameters()?;

        if !self.expect_peek(TokenKind::LBrace) {
            return None;
        }
        let body = self.parse_block_statement();

        Some(Expression::Function { parameters, body })
    }

    fn parse_function_parameters(&mut self) -> Option<Vec<String>> {
        let mut parameters = Vec::new();

        if self.peek_is(TokenKind::RParen) {
            self.next_token();
            return Some(parameters);
        }

        self.next_token();
        parameters.push(self.cur.literal.clone());

        while self.peek_is(TokenKind::Comma) {
            self.next_token();
            self.next_token();
            parameters.push(self.cur.literal.clone());
        }

        if !self.expect_peek(TokenKind::RParen) {
            return None;
        }

        Some(parameters)
    }

    fn parse_call_expression(&mut self, function: Expression) -> Option<Expression> {
        let arguments = self.parse_expression_list(TokenKind::RParen)?;
        Some(Expression::Call {
            function: Box::new(function),
            arguments,
        })
    }

    /// Comma-separated expressions until `end`; shared by array literals and
    /// call arguments, tolerant of the empty list.
    fn parse_expression_list(&mut self, end: TokenKind) -> Option<Vec<Expression>> {
        let mut list = Vec::new();

        if self.peek_is(end) {
            self.next_token();
            return Some(list);
        }

        self.next_token();
        list.push(self.parse_expression(Precedence::Lowest)?);

        while self.peek_is(TokenKind::Comma) {
            self.next_token();
            self.next_token();
            list.push(self.parse_expression(Precedence::Lowest)?);
        }

        if !self.expect_peek(end) {
            return None;
        }

        Some(list)
    }

    fn parse_index_expression(&mut self, left: Expression) -> Option<Expression> {
        self.next_token();
        let index = self.parse_expression(Precedence::Lowest)?;

        if !self.expect_peek(TokenKind::RBracket) {
            return None;
        }

        Some(Expression::Index {
            left: Box::new(left),
            index: Box::new(index),
        })
    }

    fn parse_hash_literal(&mut self) -> Option<Expression> {
        let mut pairs = Vec::new();

        while !self.peek_is(TokenKind::RBrace) {
            self.next_token();
            let key = self.parse_expression(Precedence::Lowest)?;

            if !self.expect_peek(TokenKind::Colon) {
                return None;
            }
            self.next_token();
            let value = self.parse_expression(Precedence::Lowest)?;

            pairs.push((key, value));

            if !self.peek_is(TokenKind::RBrace) && !self.expect_peek(TokenKind::Comma) {
                return None;
            }
        }

        if !self.expect_peek(TokenKind::RBrace) {
            return None;
        }

        Some(Expression::Hash(pairs))
    }
}
