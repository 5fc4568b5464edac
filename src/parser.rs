//! Parser for Monkey
//!
//! Converts tokens into an Abstract Syntax Tree. Statements are parsed by
//! recursive descent, expressions by operator precedence (Pratt) parsing
//! driven by the prefix/infix rule tables below.
//!
//! The parser does not stop at the first error. A statement that fails to
//! parse is dropped, its error recorded, and parsing resumes after the next
//! `;`. Callers must check [`Parser::errors`] before trusting the program.

use std::rc::Rc;

use crate::ast::{
    BlockStatement, BooleanLiteral, CallExpression, Expression, ExpressionStatement,
    FunctionLiteral, Identifier, IfExpression, InfixExpression, InfixOp, IntegerLiteral,
    LetStatement, PrefixExpression, PrefixOp, Program, ReturnStatement, Statement,
};
use crate::error::{ErrorKind, ParseError, Result};
use crate::lexer::Lexer;
use crate::token::{Span, Token, TokenKind};

/// Maximum expression nesting before parsing gives up
pub const MAX_NESTING: usize = 128;

/// Anything the parser can pull tokens from
pub trait TokenSource {
    /// Must keep returning `EOF` once exhausted
    fn next_token(&mut self) -> Token;
}

impl TokenSource for Lexer<'_> {
    fn next_token(&mut self) -> Token {
        Lexer::next_token(self)
    }
}

impl TokenSource for std::vec::IntoIter<Token> {
    fn next_token(&mut self) -> Token {
        self.next().unwrap_or_else(|| Token::eof(Span::default()))
    }
}

/// Binding power of operators, weakest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    Lowest,
    Equals,      // == !=
    LessGreater, // < >
    Sum,         // + -
    Product,     // * /
    Prefix,      // -x !x
    Call,        // f(x)
}

/// Precedence of a token in infix position
pub fn precedence_of(kind: TokenKind) -> Precedence {
    match kind {
        TokenKind::Eq | TokenKind::NotEq => Precedence::Equals,
        TokenKind::Lt | TokenKind::Gt => Precedence::LessGreater,
        TokenKind::Plus | TokenKind::Minus => Precedence::Sum,
        TokenKind::Asterisk | TokenKind::Slash => Precedence::Product,
        TokenKind::LParen => Precedence::Call,
        _ => Precedence::Lowest,
    }
}

fn prefix_op(kind: TokenKind) -> Option<PrefixOp> {
    match kind {
        TokenKind::Minus => Some(PrefixOp::Neg),
        TokenKind::Bang => Some(PrefixOp::Not),
        _ => None,
    }
}

fn infix_op(kind: TokenKind) -> Option<InfixOp> {
    match kind {
        TokenKind::Plus => Some(InfixOp::Add),
        TokenKind::Minus => Some(InfixOp::Sub),
        TokenKind::Asterisk => Some(InfixOp::Mul),
        TokenKind::Slash => Some(InfixOp::Div),
        TokenKind::Lt => Some(InfixOp::Lt),
        TokenKind::Gt => Some(InfixOp::Gt),
        TokenKind::Eq => Some(InfixOp::Eq),
        TokenKind::NotEq => Some(InfixOp::Ne),
        _ => None,
    }
}

type PrefixParseFn<S> = fn(&mut Parser<S>) -> Result<Expression>;
type InfixParseFn<S> = fn(&mut Parser<S>, Expression) -> Result<Expression>;

/// Parse a whole program, returning it together with every error found
pub fn parse<S: TokenSource>(source: S) -> (Program, Vec<ParseError>) {
    let mut parser = Parser::new(source);
    let program = parser.parse_program();
    (program, parser.errors)
}

/// The parser state
pub struct Parser<S> {
    source: S,
    current: Token,
    peek: Token,
    errors: Vec<ParseError>,
    depth: usize,
    /// Blocks entered but not yet closed by the statement being parsed
    open_blocks: usize,
}

impl<S: TokenSource> Parser<S> {
    /// Create a new parser, priming `current` and `peek`
    pub fn new(mut source: S) -> Self {
        let current = source.next_token();
        let peek = source.next_token();
        Self {
            source,
            current,
            peek,
            errors: Vec::new(),
            depth: 0,
            open_blocks: 0,
        }
    }

    /// Errors recorded so far, in source order
    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    /// Parse statements until `EOF`
    pub fn parse_program(&mut self) -> Program {
        let mut statements = Vec::new();

        while !self.current.is(TokenKind::Eof) {
            match self.parse_statement() {
                Ok(stmt) => statements.push(stmt),
                Err(error) => {
                    self.errors.push(error);
                    self.synchronize();
                }
            }
            self.next_token();
        }

        Program::new(statements)
    }

    // ==================== Statements ====================

    fn parse_statement(&mut self) -> Result<Statement> {
        match self.current.kind {
            TokenKind::Let => self.parse_let_statement().map(Statement::Let),
            TokenKind::Return => self.parse_return_statement().map(Statement::Return),
            _ => self.parse_expression_statement().map(Statement::Expression),
        }
    }

    fn parse_let_statement(&mut self) -> Result<LetStatement> {
        let token = self.current.clone();

        self.expect_peek(TokenKind::Ident)?;
        let name = Identifier::new(self.current.clone());

        self.expect_peek(TokenKind::Assign)?;
        self.next_token();

        let value = self.parse_expression(Precedence::Lowest)?;
        self.skip_semicolon();

        Ok(LetStatement { token, name, value })
    }

    fn parse_return_statement(&mut self) -> Result<ReturnStatement> {
        let token = self.current.clone();
        self.next_token();

        let value = self.parse_expression(Precedence::Lowest)?;
        self.skip_semicolon();

        Ok(ReturnStatement { token, value })
    }

    fn parse_expression_statement(&mut self) -> Result<ExpressionStatement> {
        let token = self.current.clone();
        let expression = self.parse_expression(Precedence::Lowest)?;
        self.skip_semicolon();

        Ok(ExpressionStatement { token, expression })
    }

    /// Expects `current` on `{`; leaves `current` on the closing `}`.
    /// On error the block stays counted in `open_blocks` for `synchronize`.
    fn parse_block_statement(&mut self) -> Result<BlockStatement> {
        let token = self.current.clone();
        let mut statements = Vec::new();

        self.open_blocks += 1;
        self.next_token();

        while !self.current.is(TokenKind::RBrace) {
            if self.current.is(TokenKind::Eof) {
                return Err(ParseError::new(
                    ErrorKind::ExpectedToken { expected: TokenKind::RBrace, got: TokenKind::Eof },
                    self.current.span,
                ));
            }
            statements.push(self.parse_statement()?);
            self.next_token();
        }

        self.open_blocks -= 1;
        Ok(BlockStatement { token, statements })
    }

    // ==================== Expressions ====================

    /// Parse one prefix term, then fold in infix operators that bind tighter
    /// than `precedence`. Operators of equal precedence associate left.
    pub fn parse_expression(&mut self, precedence: Precedence) -> Result<Expression> {
        if self.depth >= MAX_NESTING {
            return Err(ParseError::new(ErrorKind::NestingTooDeep(MAX_NESTING), self.current.span));
        }

        self.depth += 1;
        let result = self.parse_expression_inner(precedence);
        self.depth -= 1;
        result
    }

    fn parse_expression_inner(&mut self, precedence: Precedence) -> Result<Expression> {
        let Some(prefix) = Self::prefix_rule(self.current.kind) else {
            return Err(ParseError::new(
                ErrorKind::NoPrefixParse(self.current.kind),
                self.current.span,
            ));
        };

        let mut left = prefix(self)?;

        while !self.peek.is(TokenKind::Semicolon) && precedence < precedence_of(self.peek.kind) {
            let Some(infix) = Self::infix_rule(self.peek.kind) else {
                return Ok(left);
            };
            self.next_token();
            left = infix(self, left)?;
        }

        Ok(left)
    }

    fn prefix_rule(kind: TokenKind) -> Option<PrefixParseFn<S>> {
        match kind {
            TokenKind::Ident => Some(Self::parse_identifier),
            TokenKind::Int => Some(Self::parse_integer_literal),
            TokenKind::True | TokenKind::False => Some(Self::parse_boolean),
            TokenKind::Bang | TokenKind::Minus => Some(Self::parse_prefix_expression),
            TokenKind::LParen => Some(Self::parse_grouped_expression),
            TokenKind::If => Some(Self::parse_if_expression),
            TokenKind::Function => Some(Self::parse_function_literal),
            _ => None,
        }
    }

    fn infix_rule(kind: TokenKind) -> Option<InfixParseFn<S>> {
        match kind {
            TokenKind::Plus
            | TokenKind::Minus
            | TokenKind::Asterisk
            | TokenKind::Slash
            | TokenKind::Lt
            | TokenKind::Gt
            | TokenKind::Eq
            | TokenKind::NotEq => Some(Self::parse_infix_expression),
            TokenKind::LParen => Some(Self::parse_call_expression),
            _ => None,
        }
    }

    fn parse_identifier(&mut self) -> Result<Expression> {
        Ok(Expression::Identifier(Identifier::new(self.current.clone())))
    }

    fn parse_integer_literal(&mut self) -> Result<Expression> {
        let token = self.current.clone();
        let value = token.literal.parse::<i64>().map_err(|_| {
            ParseError::new(ErrorKind::InvalidInteger(token.literal.clone()), token.span)
        })?;

        Ok(Expression::Integer(IntegerLiteral { token, value }))
    }

    fn parse_boolean(&mut self) -> Result<Expression> {
        let token = self.current.clone();
        let value = token.is(TokenKind::True);
        Ok(Expression::Boolean(BooleanLiteral { token, value }))
    }

    fn parse_prefix_expression(&mut self) -> Result<Expression> {
        let token = self.current.clone();
        let operator = prefix_op(token.kind)
            .ok_or_else(|| ParseError::new(ErrorKind::NoPrefixParse(token.kind), token.span))?;

        self.next_token();
        let right = self.parse_expression(Precedence::Prefix)?;

        Ok(Expression::Prefix(PrefixExpression {
            token,
            operator,
            right: Box::new(right),
        }))
    }

    fn parse_grouped_expression(&mut self) -> Result<Expression> {
        self.next_token();
        let expr = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(TokenKind::RParen)?;
        Ok(expr)
    }

    fn parse_if_expression(&mut self) -> Result<Expression> {
        let token = self.current.clone();

        self.expect_peek(TokenKind::LParen)?;
        self.next_token();
        let condition = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(TokenKind::RParen)?;

        self.expect_peek(TokenKind::LBrace)?;
        let consequence = self.parse_block_statement()?;

        let alternative = if self.peek.is(TokenKind::Else) {
            self.next_token();
            self.expect_peek(TokenKind::LBrace)?;
            Some(self.parse_block_statement()?)
        } else {
            None
        };

        Ok(Expression::If(IfExpression {
            token,
            condition: Box::new(condition),
            consequence,
            alternative,
        }))
    }

    fn parse_function_literal(&mut self) -> Result<Expression> {
        let token = self.current.clone();

        self.expect_peek(TokenKind::LParen)?;
        let parameters = self.parse_function_parameters()?;

        self.expect_peek(TokenKind::LBrace)?;
        let body = self.parse_block_statement()?;

        Ok(Expression::Function(FunctionLiteral {
            token,
            parameters,
            body: Rc::new(body),
        }))
    }

    fn parse_function_parameters(&mut self) -> Result<Vec<Identifier>> {
        let mut params = Vec::new();

        if self.peek.is(TokenKind::RParen) {
            self.next_token();
            return Ok(params);
        }

        loop {
            self.expect_peek(TokenKind::Ident)?;
            params.push(Identifier::new(self.current.clone()));
            if !self.peek.is(TokenKind::Comma) {
                break;
            }
            self.next_token();
        }

        self.expect_peek(TokenKind::RParen)?;
        Ok(params)
    }

    /// All binary operators are left-associative: the right operand is
    /// parsed at the operator's own precedence. A right-associative operator
    /// would recurse one level lower instead.
    fn parse_infix_expression(&mut self, left: Expression) -> Result<Expression> {
        let token = self.current.clone();
        let operator = infix_op(token.kind)
            .ok_or_else(|| ParseError::new(ErrorKind::NoPrefixParse(token.kind), token.span))?;
        let precedence = precedence_of(token.kind);

        self.next_token();
        let right = self.parse_expression(precedence)?;

        Ok(Expression::Infix(InfixExpression {
            token,
            left: Box::new(left),
            operator,
            right: Box::new(right),
        }))
    }

    fn parse_call_expression(&mut self, function: Expression) -> Result<Expression> {
        let token = self.current.clone();
        let arguments = self.parse_call_arguments()?;

        Ok(Expression::Call(CallExpression {
            token,
            function: Box::new(function),
            arguments,
        }))
    }

    fn parse_call_arguments(&mut self) -> Result<Vec<Expression>> {
        let mut args = Vec::new();

        if self.peek.is(TokenKind::RParen) {
            self.next_token();
            return Ok(args);
        }

        self.next_token();
        args.push(self.parse_expression(Precedence::Lowest)?);

        while self.peek.is(TokenKind::Comma) {
            self.next_token();
            self.next_token();
            args.push(self.parse_expression(Precedence::Lowest)?);
        }

        self.expect_peek(TokenKind::RParen)?;
        Ok(args)
    }

    // ==================== Helpers ====================

    fn next_token(&mut self) {
        let next = self.source.next_token();
        self.current = std::mem::replace(&mut self.peek, next);
    }

    /// Advance only if the next token is `kind`
    fn expect_peek(&mut self, kind: TokenKind) -> Result<()> {
        if self.peek.is(kind) {
            self.next_token();
            Ok(())
        } else {
            Err(ParseError::new(
                ErrorKind::ExpectedToken { expected: kind, got: self.peek.kind },
                self.peek.span,
            ))
        }
    }

    fn skip_semicolon(&mut self) {
        if self.peek.is(TokenKind::Semicolon) {
            self.next_token();
        }
    }

    /// Skip the rest of a broken statement. At top level that is up to the
    /// next `;`. An error inside blocks skips until those blocks close, along
    /// with a `;` right after the last `}`.
    fn synchronize(&mut self) {
        let mut open = std::mem::take(&mut self.open_blocks);

        loop {
            match self.current.kind {
                TokenKind::Eof => return,
                TokenKind::Semicolon if open == 0 => return,
                TokenKind::LBrace => open += 1,
                TokenKind::RBrace if open <= 1 => {
                    self.skip_semicolon();
                    return;
                }
                TokenKind::RBrace => open -= 1,
                _ => {}
            }
            self.next_token();
        }
    }
}
