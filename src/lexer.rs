//! Hand-rolled scanner turning source text into a flat token list.

use tracing::debug;

use crate::{
    error::SyntaxError,
    token::{Token, TokenKind},
};

/// Scan the whole source. The result always ends with exactly one `Eof` token.
pub fn lex(source: &str) -> Result<Vec<Token>, SyntaxError> {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token()?;
        let done = token.kind == TokenKind::Eof;
        tokens.push(token);
        if done {
            break;
        }
    }
    debug!(tokens = tokens.len(), "lexed source");
    Ok(tokens)
}

struct Lexer<'a> {
    s: &'a str,
    i: usize,
}

impl<'a> Lexer<'a> {
    fn new(s: &'a str) -> Self {
        Self { s, i: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.s[self.i..].chars().next()
    }

    fn bump(&mut self, c: char) {
        self.i += c.len_utf8();
    }

    /// Consume characters while `pred` holds and return the covered slice.
    fn take_while(&mut self, start: usize, pred: impl Fn(char) -> bool) -> &'a str {
        while let Some(c) = self.peek() {
            if !pred(c) {
                break;
            }
            self.bump(c);
        }
        &self.s[start..self.i]
    }

    fn next_token(&mut self) -> Result<Token, SyntaxError> {
        // newline is significant; every other blank is not
        while let Some(c @ (' ' | '\t' | '\r')) = self.peek() {
            self.bump(c);
        }

        let start = self.i;
        let Some(c) = self.peek() else {
            return Ok(Token::new(TokenKind::Eof, "", start));
        };

        let single = match c {
            '\n' => Some(TokenKind::Newline),
            '=' => Some(TokenKind::Equals),
            '+' => Some(TokenKind::Plus),
            '-' => Some(TokenKind::Minus),
            '*' => Some(TokenKind::Star),
            '/' => Some(TokenKind::Slash),
            '%' => Some(TokenKind::Percent),
            '(' => Some(TokenKind::LeftParen),
            ')' => Some(TokenKind::RightParen),
            _ => None,
        };
        if let Some(kind) = single {
            self.bump(c);
            return Ok(Token::new(kind, &self.s[start..self.i], start));
        }

        if c.is_ascii_digit() {
            let text = self.take_while(start, |ch| ch.is_ascii_digit());
            return Ok(Token::new(TokenKind::Number, text, start));
        }

        if c.is_alphabetic() || c == '_' {
            let text = self.take_while(start, |ch| ch.is_alphanumeric() || ch == '_');
            let kind = if text == "print" { TokenKind::Print } else { TokenKind::Identifier };
            return Ok(Token::new(kind, text, start));
        }

        Err(SyntaxError::UnexpectedCharacter { pos: start, ch: c })
    }
}
