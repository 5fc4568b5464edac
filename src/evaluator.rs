//! Tree-walking evaluator for Monkey
//!
//! Walks the AST and produces objects. Runtime errors are `Object::Error`
//! values: once produced, an error is handed back up unchanged by every
//! enclosing expression, so evaluation never continues through one.

use std::rc::Rc;

use crate::ast::{
    BlockStatement, Expression, Identifier, IfExpression, InfixOp, PrefixOp, Program, Statement,
};
use crate::environment::{Env, Environment};
use crate::object::{Function, Object, NULL};

/// Default maximum expression nesting during evaluation. Each level costs
/// several native frames, so this has to fit a 2 MiB thread stack; hosts
/// with a bigger stack can raise it with [`Evaluator::with_max_depth`].
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Evaluate a program in `env` with default settings
pub fn eval(program: &Program, env: &Env) -> Object {
    Evaluator::new().eval_program(program, env)
}

/// Evaluator state. Only the nesting depth is tracked, so runaway recursion
/// in a Monkey program turns into an error object instead of overflowing
/// the native stack.
#[derive(Debug)]
pub struct Evaluator {
    depth: usize,
    max_depth: usize,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluator {
    pub fn new() -> Self {
        Self::with_max_depth(DEFAULT_MAX_DEPTH)
    }

    pub fn with_max_depth(max_depth: usize) -> Self {
        Self { depth: 0, max_depth }
    }

    /// The value of a program is the value of its last statement. A `return`
    /// at top level stops the program with its value.
    pub fn eval_program(&mut self, program: &Program, env: &Env) -> Object {
        let mut result = NULL;

        for stmt in &program.statements {
            result = self.eval_statement(stmt, env);

            match result {
                Object::ReturnValue(value) => return *value,
                Object::Error(_) => return result,
                _ => {}
            }
        }

        result
    }

    /// Like a program, but a `ReturnValue` stays wrapped so the enclosing
    /// function call can see it.
    pub fn eval_block(&mut self, block: &BlockStatement, env: &Env) -> Object {
        let mut result = NULL;

        for stmt in &block.statements {
            result = self.eval_statement(stmt, env);

            if matches!(result, Object::ReturnValue(_) | Object::Error(_)) {
                return result;
            }
        }

        result
    }

    pub fn eval_statement(&mut self, stmt: &Statement, env: &Env) -> Object {
        match stmt {
            Statement::Expression(s) => self.eval_expression(&s.expression, env),
            Statement::Let(s) => {
                let value = self.eval_expression(&s.value, env);
                if value.is_error() {
                    return value;
                }
                env.borrow_mut().define(s.name.value.clone(), value);
                NULL
            }
            Statement::Return(s) => {
                let value = self.eval_expression(&s.value, env);
                if value.is_error() {
                    return value;
                }
                Object::ReturnValue(Box::new(value))
            }
        }
    }

    pub fn eval_expression(&mut self, expr: &Expression, env: &Env) -> Object {
        if self.depth >= self.max_depth {
            return Object::error("stack overflow");
        }

        self.depth += 1;
        let result = self.eval_expression_inner(expr, env);
        self.depth -= 1;
        result
    }

    fn eval_expression_inner(&mut self, expr: &Expression, env: &Env) -> Object {
        match expr {
            Expression::Integer(lit) => Object::Integer(lit.value),
            Expression::Boolean(lit) => Object::from(lit.value),
            Expression::Identifier(ident) => eval_identifier(ident, env),
            Expression::Prefix(prefix) => {
                let right = self.eval_expression(&prefix.right, env);
                if right.is_error() {
                    return right;
                }
                eval_prefix(prefix.operator, right)
            }
            Expression::Infix(infix) => {
                let left = self.eval_expression(&infix.left, env);
                if left.is_error() {
                    return left;
                }
                let right = self.eval_expression(&infix.right, env);
                if right.is_error() {
                    return right;
                }
                eval_infix(infix.operator, left, right)
            }
            Expression::If(if_expr) => self.eval_if(if_expr, env),
            Expression::Function(literal) => Object::Function(Rc::new(Function::new(
                literal.parameters.clone(),
                Rc::clone(&literal.body),
                Rc::clone(env),
            ))),
            Expression::Call(call) => {
                let function = self.eval_expression(&call.function, env);
                if function.is_error() {
                    return function;
                }
                match self.eval_arguments(&call.arguments, env) {
                    Ok(args) => self.apply_function(function, args),
                    Err(error) => error,
                }
            }
        }
    }

    fn eval_if(&mut self, if_expr: &IfExpression, env: &Env) -> Object {
        let condition = self.eval_expression(&if_expr.condition, env);
        if condition.is_error() {
            return condition;
        }

        if condition.is_truthy() {
            self.eval_block(&if_expr.consequence, env)
        } else if let Some(alternative) = &if_expr.alternative {
            self.eval_block(alternative, env)
        } else {
            NULL
        }
    }

    /// Left to right, stopping at the first error
    fn eval_arguments(&mut self, args: &[Expression], env: &Env) -> Result<Vec<Object>, Object> {
        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            let value = self.eval_expression(arg, env);
            if value.is_error() {
                return Err(value);
            }
            values.push(value);
        }
        Ok(values)
    }

    fn apply_function(&mut self, function: Object, args: Vec<Object>) -> Object {
        let func = match function {
            Object::Function(func) => func,
            other => return Object::error(format!("not a function: {}", other.object_type())),
        };

        if args.len() != func.parameters.len() {
            return Object::error(format!(
                "wrong number of arguments: expected {}, got {}",
                func.parameters.len(),
                args.len()
            ));
        }

        let scope = Environment::enclosed(&func.env);
        {
            let mut scope = scope.borrow_mut();
            for (param, arg) in func.parameters.iter().zip(args) {
                scope.define(param.value.clone(), arg);
            }
        }

        match self.eval_block(&func.body, &scope) {
            Object::ReturnValue(value) => *value,
            other => other,
        }
    }
}

fn eval_identifier(ident: &Identifier, env: &Env) -> Object {
    let value = env.borrow().get(&ident.value);
    value.unwrap_or_else(|| Object::error(format!("identifier not found: {}", ident.value)))
}

fn eval_prefix(op: PrefixOp, right: Object) -> Object {
    match op {
        PrefixOp::Not => Object::from(!right.is_truthy()),
        PrefixOp::Neg => match right {
            Object::Integer(n) => Object::Integer(n.wrapping_neg()),
            other => Object::error(format!("unknown operator: -{}", other.object_type())),
        },
    }
}

fn eval_infix(op: InfixOp, left: Object, right: Object) -> Object {
    if let (Object::Integer(l), Object::Integer(r)) = (&left, &right) {
        return eval_integer_infix(op, *l, *r);
    }

    match op {
        InfixOp::Eq => Object::from(left == right),
        InfixOp::Ne => Object::from(left != right),
        _ if left.object_type() != right.object_type() => Object::error(format!(
            "type mismatch: {} {} {}",
            left.object_type(),
            op,
            right.object_type()
        )),
        _ => Object::error(format!(
            "unknown operator: {} {} {}",
            left.object_type(),
            op,
            right.object_type()
        )),
    }
}

/// Integer arithmetic wraps on overflow
fn eval_integer_infix(op: InfixOp, l: i64, r: i64) -> Object {
    match op {
        InfixOp::Add => Object::Integer(l.wrapping_add(r)),
        InfixOp::Sub => Object::Integer(l.wrapping_sub(r)),
        InfixOp::Mul => Object::Integer(l.wrapping_mul(r)),
        InfixOp::Div if r == 0 => Object::error(format!("division by zero: {} / {}", l, r)),
        InfixOp::Div => Object::Integer(l.wrapping_div(r)),
        InfixOp::Lt => Object::from(l < r),
        InfixOp::Gt => Object::from(l > r),
        InfixOp::Eq => Object::from(l == r),
        InfixOp::Ne => Object::from(l != r),
    }
}
