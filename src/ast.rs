//! Abstract Syntax Tree definitions for Monkey
//!
//! Represents the structure of programs after parsing. Every node keeps the
//! token it was built from, and every node renders (via `Display`) to a
//! canonical source form that parses back to the same tree.

use std::fmt;
use std::rc::Rc;

use crate::token::Token;

/// Behaviour shared by all nodes
pub trait Node: fmt::Display {
    /// The literal text of the token the node was built from
    fn token_literal(&self) -> &str;
}

/// A complete program
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub statements: Vec<Statement>,
}

impl Program {
    pub fn new(statements: Vec<Statement>) -> Self {
        Self { statements }
    }
}

impl Node for Program {
    fn token_literal(&self) -> &str {
        self.statements.first().map_or("", |s| s.token_literal())
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_statements(f, &self.statements)
    }
}

/// Statement nodes
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// `let x = expr;`
    Let(LetStatement),

    /// `return expr;`
    Return(ReturnStatement),

    /// An expression on its own
    Expression(ExpressionStatement),
}

impl Statement {
    pub fn token(&self) -> &Token {
        match self {
            Statement::Let(s) => &s.token,
            Statement::Return(s) => &s.token,
            Statement::Expression(s) => &s.token,
        }
    }
}

impl Node for Statement {
    fn token_literal(&self) -> &str {
        &self.token().literal
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Let(s) => write!(f, "{} {} = {};", s.token.literal, s.name, s.value),
            Statement::Return(s) => write!(f, "{} {};", s.token.literal, s.value),
            Statement::Expression(s) => write!(f, "{}", s.expression),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LetStatement {
    pub token: Token,
    pub name: Identifier,
    pub value: Expression,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStatement {
    pub token: Token,
    pub value: Expression,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionStatement {
    /// First token of the expression
    pub token: Token,
    pub expression: Expression,
}

/// Block: `{ stmt* }`
#[derive(Debug, Clone, PartialEq)]
pub struct BlockStatement {
    pub token: Token,
    pub statements: Vec<Statement>,
}

impl Node for BlockStatement {
    fn token_literal(&self) -> &str {
        &self.token.literal
    }
}

impl fmt::Display for BlockStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.statements.is_empty() {
            return f.write_str("{ }");
        }
        f.write_str("{ ")?;
        write_statements(f, &self.statements)?;
        f.write_str(" }")
    }
}

/// Writes statements so that the output parses back the same way. An
/// expression statement followed by another statement gets a `;`, otherwise
/// `a; -b` would come back as `a(-b)`.
fn write_statements(f: &mut fmt::Formatter<'_>, statements: &[Statement]) -> fmt::Result {
    for (i, stmt) in statements.iter().enumerate() {
        if i > 0 {
            f.write_str(" ")?;
        }
        write!(f, "{}", stmt)?;
        if matches!(stmt, Statement::Expression(_)) && i + 1 < statements.len() {
            f.write_str(";")?;
        }
    }
    Ok(())
}

/// Expression nodes
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// Variable reference: foo
    Identifier(Identifier),

    /// Integer literal: 42
    Integer(IntegerLiteral),

    /// Boolean literal: true, false
    Boolean(BooleanLiteral),

    /// Prefix operation: -x, !y
    Prefix(PrefixExpression),

    /// Infix operation: a + b, x == y
    Infix(InfixExpression),

    /// Conditional: if (cond) { } else { }
    If(IfExpression),

    /// Function literal: fn(a, b) { }
    Function(FunctionLiteral),

    /// Function call: add(a, b)
    Call(CallExpression),
}

impl Expression {
    pub fn token(&self) -> &Token {
        match self {
            Expression::Identifier(e) => &e.token,
            Expression::Integer(e) => &e.token,
            Expression::Boolean(e) => &e.token,
            Expression::Prefix(e) => &e.token,
            Expression::Infix(e) => &e.token,
            Expression::If(e) => &e.token,
            Expression::Function(e) => &e.token,
            Expression::Call(e) => &e.token,
        }
    }
}

impl Node for Expression {
    fn token_literal(&self) -> &str {
        &self.token().literal
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Identifier(e) => write!(f, "{}", e),
            Expression::Integer(e) => f.write_str(&e.token.literal),
            Expression::Boolean(e) => f.write_str(&e.token.literal),
            Expression::Prefix(e) => write!(f, "({}{})", e.operator, e.right),
            Expression::Infix(e) => write!(f, "({} {} {})", e.left, e.operator, e.right),
            Expression::If(e) => {
                // Prefix and infix forms already carry their own parentheses
                match *e.condition {
                    Expression::Prefix(_) | Expression::Infix(_) => {
                        write!(f, "if {} {}", e.condition, e.consequence)?
                    }
                    _ => write!(f, "if ({}) {}", e.condition, e.consequence)?,
                }
                if let Some(alternative) = &e.alternative {
                    write!(f, " else {}", alternative)?;
                }
                Ok(())
            }
            Expression::Function(e) => {
                let params: Vec<&str> = e.parameters.iter().map(|p| p.value.as_str()).collect();
                write!(f, "{}({}) {}", e.token.literal, params.join(", "), e.body)
            }
            Expression::Call(e) => {
                let args: Vec<String> = e.arguments.iter().map(|a| a.to_string()).collect();
                write!(f, "{}({})", e.function, args.join(", "))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Identifier {
    pub token: Token,
    pub value: String,
}

impl Identifier {
    pub fn new(token: Token) -> Self {
        let value = token.literal.clone();
        Self { token, value }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IntegerLiteral {
    pub token: Token,
    pub value: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BooleanLiteral {
    pub token: Token,
    pub value: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrefixExpression {
    pub token: Token,
    pub operator: PrefixOp,
    pub right: Box<Expression>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InfixExpression {
    /// The operator token
    pub token: Token,
    pub left: Box<Expression>,
    pub operator: InfixOp,
    pub right: Box<Expression>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfExpression {
    pub token: Token,
    pub condition: Box<Expression>,
    pub consequence: BlockStatement,
    pub alternative: Option<BlockStatement>,
}

/// The body sits behind an `Rc` so closures created from this literal can
/// share it without copying the tree.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionLiteral {
    pub token: Token,
    pub parameters: Vec<Identifier>,
    pub body: Rc<BlockStatement>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallExpression {
    /// The `(` token
    pub token: Token,
    pub function: Box<Expression>,
    pub arguments: Vec<Expression>,
}

/// Prefix operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefixOp {
    Neg, // -
    Not, // !
}

impl fmt::Display for PrefixOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrefixOp::Neg => write!(f, "-"),
            PrefixOp::Not => write!(f, "!"),
        }
    }
}

/// Infix operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfixOp {
    Add, // +
    Sub, // -
    Mul, // *
    Div, // /
    Lt,  // <
    Gt,  // >
    Eq,  // ==
    Ne,  // !=
}

impl fmt::Display for InfixOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InfixOp::Add => write!(f, "+"),
            InfixOp::Sub => write!(f, "-"),
            InfixOp::Mul => write!(f, "*"),
            InfixOp::Div => write!(f, "/"),
            InfixOp::Lt => write!(f, "<"),
            InfixOp::Gt => write!(f, ">"),
            InfixOp::Eq => write!(f, "=="),
            InfixOp::Ne => write!(f, "!="),
        }
    }
}
