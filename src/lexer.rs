//! Lexer for Monkey
//!
//! Converts source code into a stream of tokens, one token per call.
//! The lexer never fails: characters it does not understand come out as
//! `ILLEGAL` tokens for the parser to reject.

use crate::token::{lookup_ident, Span, Token, TokenKind};

/// The lexer state
pub struct Lexer<'a> {
    source: &'a str,
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
    current_pos: usize,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer from source code
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.char_indices().peekable(),
            current_pos: 0,
            line: 1,
            column: 1,
        }
    }

    /// Tokenize the entire source, including the trailing `EOF`
    pub fn tokenize(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let done = token.is(TokenKind::Eof);
            tokens.push(token);
            if done {
                return tokens;
            }
        }
    }

    /// Get the next token. Once the input is exhausted this keeps
    /// returning `EOF`.
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();

        let Some(&(start_pos, ch)) = self.chars.peek() else {
            let here = Span::new(self.current_pos, self.current_pos, self.line, self.column);
            return Token::eof(here);
        };

        let start_line = self.line;
        let start_column = self.column;

        let kind = match ch {
            '+' => { self.advance(); TokenKind::Plus }
            '-' => { self.advance(); TokenKind::Minus }
            '*' => { self.advance(); TokenKind::Asterisk }
            '/' => { self.advance(); TokenKind::Slash }
            '<' => { self.advance(); TokenKind::Lt }
            '>' => { self.advance(); TokenKind::Gt }
            ',' => { self.advance(); TokenKind::Comma }
            ';' => { self.advance(); TokenKind::Semicolon }
            '(' => { self.advance(); TokenKind::LParen }
            ')' => { self.advance(); TokenKind::RParen }
            '{' => { self.advance(); TokenKind::LBrace }
            '}' => { self.advance(); TokenKind::RBrace }

            // Potentially two-character tokens
            '=' => {
                self.advance();
                if self.peek_char() == Some('=') {
                    self.advance();
                    TokenKind::Eq
                } else {
                    TokenKind::Assign
                }
            }
            '!' => {
                self.advance();
                if self.peek_char() == Some('=') {
                    self.advance();
                    TokenKind::NotEq
                } else {
                    TokenKind::Bang
                }
            }

            c if c.is_ascii_digit() => {
                self.eat_while(|c| c.is_ascii_digit());
                TokenKind::Int
            }

            c if is_letter(c) => {
                self.eat_while(is_letter);
                lookup_ident(&self.source[start_pos..self.current_pos])
            }

            _ => { self.advance(); TokenKind::Illegal }
        };

        let literal = &self.source[start_pos..self.current_pos];

        Token::new(
            kind,
            literal,
            Span::new(start_pos, self.current_pos, start_line, start_column),
        )
    }

    /// Advance and return the current character
    fn advance(&mut self) -> Option<char> {
        let (pos, ch) = self.chars.next()?;
        self.current_pos = pos + ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    /// Peek at the next character without advancing
    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().map(|&(_, ch)| ch)
    }

    fn skip_whitespace(&mut self) {
        while let Some(' ' | '\t' | '\r' | '\n') = self.peek_char() {
            self.advance();
        }
    }

    /// Consume a maximal run of characters matching `pred`
    fn eat_while(&mut self, pred: impl Fn(char) -> bool) {
        while self.peek_char().is_some_and(&pred) {
            self.advance();
        }
    }
}

fn is_letter(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::new(source)
            .tokenize()
            .into_iter()
            .map(|t| t.kind)
            .filter(|k| *k != TokenKind::Eof)
            .collect()
    }

    #[test]
    fn test_delimiters() {
        let tokens = Lexer::new("=+(){},;").tokenize();
        let expected = [
            (TokenKind::Assign, "="),
            (TokenKind::Plus, "+"),
            (TokenKind::LParen, "("),
            (TokenKind::RParen, ")"),
            (TokenKind::LBrace, "{"),
            (TokenKind::RBrace, "}"),
            (TokenKind::Comma, ","),
            (TokenKind::Semicolon, ";"),
            (TokenKind::Eof, ""),
        ];
        assert_eq!(tokens.len(), expected.len());
        for (token, (kind, literal)) in tokens.iter().zip(expected) {
            assert_eq!(token.kind, kind);
            assert_eq!(token.literal, literal);
        }
    }

    #[test]
    fn test_operators() {
        assert_eq!(kinds("- ! * / < > == != ="), vec![
            TokenKind::Minus,
            TokenKind::Bang,
            TokenKind::Asterisk,
            TokenKind::Slash,
            TokenKind::Lt,
            TokenKind::Gt,
            TokenKind::Eq,
            TokenKind::NotEq,
            TokenKind::Assign,
        ]);
    }

    #[test]
    fn test_program() {
        let source = "let five = 5;\nlet add = fn(x, y) {\n  x + y;\n};\nlet result = add(five, 10);";
        let tokens = Lexer::new(source).tokenize();
        let literals: Vec<&str> = tokens.iter().map(|t| t.literal.as_str()).collect();
        assert_eq!(literals, vec![
            "let", "five", "=", "5", ";",
            "let", "add", "=", "fn", "(", "x", ",", "y", ")", "{",
            "x", "+", "y", ";",
            "}", ";",
            "let", "result", "=", "add", "(", "five", ",", "10", ")", ";",
            "",
        ]);
        assert_eq!(tokens[8].kind, TokenKind::Function);
        assert_eq!(tokens[3].kind, TokenKind::Int);
        assert_eq!(tokens[1].kind, TokenKind::Ident);
    }

    #[test]
    fn test_keywords() {
        assert_eq!(kinds("if else return true false fn let"), vec![
            TokenKind::If,
            TokenKind::Else,
            TokenKind::Return,
            TokenKind::True,
            TokenKind::False,
            TokenKind::Function,
            TokenKind::Let,
        ]);
    }

    #[test]
    fn test_identifiers_stop_at_digits() {
        let tokens = Lexer::new("foo_bar x1").tokenize();
        assert_eq!(tokens[0].literal, "foo_bar");
        assert_eq!(tokens[1].literal, "x");
        assert_eq!(tokens[2].kind, TokenKind::Int);
        assert_eq!(tokens[2].literal, "1");
    }

    #[test]
    fn test_illegal_characters() {
        let tokens = Lexer::new("5 @ é").tokenize();
        assert_eq!(tokens[1].kind, TokenKind::Illegal);
        assert_eq!(tokens[1].literal, "@");
        assert_eq!(tokens[2].kind, TokenKind::Illegal);
        assert_eq!(tokens[2].literal, "é");
        assert_eq!(tokens[3].kind, TokenKind::Eof);
    }

    #[test]
    fn test_eof_repeats() {
        let mut lexer = Lexer::new("x");
        assert_eq!(lexer.next_token().kind, TokenKind::Ident);
        for _ in 0..3 {
            assert_eq!(lexer.next_token().kind, TokenKind::Eof);
        }
    }

    #[test]
    fn test_deterministic() {
        let source = "let x = fn(a) { !a == -5 }; x(10) $";
        assert_eq!(Lexer::new(source).tokenize(), Lexer::new(source).tokenize());
    }

    #[test]
    fn test_spans() {
        let tokens = Lexer::new("let x\n  = 5;").tokenize();
        assert_eq!(tokens[0].span, Span::new(0, 3, 1, 1));
        assert_eq!(tokens[1].span, Span::new(4, 5, 1, 5));
        assert_eq!(tokens[2].span.line, 2);
        assert_eq!(tokens[2].span.column, 3);
        assert_eq!(tokens[3].span, Span::new(10, 11, 2, 5));
    }
}
