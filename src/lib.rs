//! Monkey - a small, expression-oriented programming language
//!
//! Source text goes through the [`Lexer`], the [`Parser`] and finally the
//! tree-walking [`Evaluator`], producing an [`Object`].

pub mod token;
pub mod lexer;
pub mod parser;
pub mod ast;
pub mod object;
pub mod environment;
pub mod evaluator;
pub mod error;

pub use environment::{Env, Environment};
pub use error::{ParseError, ParseErrors};
pub use evaluator::Evaluator;
pub use lexer::Lexer;
pub use object::Object;
pub use parser::Parser;

/// Convenience function to run Monkey code in a fresh environment
pub fn run(source: &str) -> Result<Object, ParseErrors> {
    run_in(source, &Environment::new_env())
}

/// Run Monkey code in an existing environment, keeping its bindings
pub fn run_in(source: &str, env: &Env) -> Result<Object, ParseErrors> {
    run_with(source, env, &mut Evaluator::new())
}

/// Run Monkey code with a caller-configured evaluator
pub fn run_with(source: &str, env: &Env, evaluator: &mut Evaluator) -> Result<Object, ParseErrors> {
    let (program, errors) = parser::parse(Lexer::new(source));
    if !errors.is_empty() {
        return Err(ParseErrors(errors).with_source(source));
    }

    Ok(evaluator.eval_program(&program, env))
}

/// Version of the Monkey interpreter
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
