//! Error types for Monkey
//!
//! Parse errors carry a source location. Runtime errors are not here: they
//! are ordinary values (`Object::Error`) produced by the evaluator.

use crate::token::{Span, TokenKind};
use std::fmt;

/// Parse error kinds
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The token after the current one was not the one the grammar requires
    ExpectedToken { expected: TokenKind, got: TokenKind },

    /// A token that cannot start an expression
    NoPrefixParse(TokenKind),

    /// An integer literal that does not fit in an `i64`
    InvalidInteger(String),

    /// Expression nesting beyond the parser's limit
    NestingTooDeep(usize),
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::ExpectedToken { expected, got } => {
                write!(f, "expected next token to be {}, got {} instead", expected, got)
            }
            ErrorKind::NoPrefixParse(kind) => {
                write!(f, "no prefix parse function for {} found", kind)
            }
            ErrorKind::InvalidInteger(literal) => {
                write!(f, "could not parse {} as integer", literal)
            }
            ErrorKind::NestingTooDeep(limit) => {
                write!(f, "expression nested too deeply (limit {})", limit)
            }
        }
    }
}

/// A parse error with location information
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub kind: ErrorKind,
    pub span: Span,
    pub source_line: Option<String>,
}

impl ParseError {
    pub fn new(kind: ErrorKind, span: Span) -> Self {
        Self {
            kind,
            span,
            source_line: None,
        }
    }

    /// The bare message, without location
    pub fn message(&self) -> String {
        self.kind.to_string()
    }

    /// Attach the offending source line for display
    pub fn with_source(mut self, source: &str) -> Self {
        if self.span.line > 0 {
            self.source_line = source.lines().nth(self.span.line - 1).map(str::to_string);
        }
        self
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[line {}:{}] Error: {}", self.span.line, self.span.column, self.kind)?;

        if let Some(ref line) = self.source_line {
            write!(f, "\n  | {}", line)?;
            write!(f, "\n  | {}^", " ".repeat(self.span.column.saturating_sub(1)))?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseError {}

/// Every error from one parse, in source order
#[derive(Debug, Clone, PartialEq)]
pub struct ParseErrors(pub Vec<ParseError>);

impl ParseErrors {
    pub fn with_source(self, source: &str) -> Self {
        Self(self.0.into_iter().map(|e| e.with_source(source)).collect())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ParseError> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ParseErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseErrors {}

/// Result type for parsing
pub type Result<T> = std::result::Result<T, ParseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expected_token_message() {
        let kind = ErrorKind::ExpectedToken { expected: TokenKind::Ident, got: TokenKind::Assign };
        assert_eq!(kind.to_string(), "expected next token to be IDENT, got ASSIGN instead");
    }

    #[test]
    fn test_display_with_source() {
        let error = ParseError::new(
            ErrorKind::NoPrefixParse(TokenKind::RParen),
            Span::new(6, 7, 2, 3),
        )
        .with_source("let x = 1;\nx )");

        assert_eq!(
            error.to_string(),
            "[line 2:3] Error: no prefix parse function for RPAREN found\n  | x )\n  |   ^"
        );
    }

    #[test]
    fn test_display_without_source() {
        let error = ParseError::new(ErrorKind::InvalidInteger("99999999999999999999".into()), Span::new(0, 20, 1, 1));
        assert_eq!(
            error.to_string(),
            "[line 1:1] Error: could not parse 99999999999999999999 as integer"
        );
    }
}
