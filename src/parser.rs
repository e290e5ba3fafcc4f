//! Recursive-descent parser over the token list.
//!
//! Grammar:
//!
//! ```text
//! program := NEWLINE* (stmt (NEWLINE+ | EOF))*
//! stmt    := 'print' expr | IDENT '=' expr
//! expr    := term (('+'|'-') term)*
//! term    := factor (('*'|'/') factor)*
//! factor  := ('+'|'-') factor | primary
//! primary := NUMBER | IDENT | '(' expr ')'
//! ```

use tracing::debug;

use crate::{
    ast::{BinaryOp, Expr, Program, Stmt, UnaryOp},
    error::SyntaxError,
    token::{Token, TokenKind},
};

/// Parse a complete program. Stops at the first unexpected token.
pub fn parse(tokens: Vec<Token>) -> Result<Program, SyntaxError> {
    let program = Parser::new(tokens).parse_program()?;
    debug!(statements = program.stmts.len(), "parsed program");
    Ok(program)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn new(mut tokens: Vec<Token>) -> Self {
        // callers normally pass lexer output, which already ends in Eof
        if tokens.last().map(|t| t.kind) != Some(TokenKind::Eof) {
            let end = tokens.last().map(|t| t.pos + t.text.len()).unwrap_or(0);
            tokens.push(Token::new(TokenKind::Eof, "", end));
        }
        Self { tokens, pos: 0 }
    }

    /// Token `offset` places ahead, clamped to the trailing Eof.
    fn peek_at(&self, offset: usize) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[(self.pos + offset).min(last)]
    }

    fn peek(&self) -> &Token {
        self.peek_at(0)
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.peek().kind == kind {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind, expected: &'static str) -> Result<Token, SyntaxError> {
        if self.peek().kind == kind {
            Ok(self.advance())
        } else {
            Err(self.unexpected(expected))
        }
    }

    fn unexpected(&self, expected: &'static str) -> SyntaxError {
        let token = self.peek();
        SyntaxError::UnexpectedToken { pos: token.pos, expected, found: token.kind }
    }

    fn skip_newlines(&mut self) {
        while self.eat(TokenKind::Newline) {}
    }

    fn parse_program(&mut self) -> Result<Program, SyntaxError> {
        let mut stmts = Vec::new();
        self.skip_newlines();

        while self.peek().kind != TokenKind::Eof {
            stmts.push(self.parse_stmt()?);

            match self.peek().kind {
                TokenKind::Newline => self.skip_newlines(),
                TokenKind::Eof => {}
                _ => return Err(self.unexpected("newline or end of input after statement")),
            }
        }

        Ok(Program { stmts })
    }

    fn parse_stmt(&mut self) -> Result<Stmt, SyntaxError> {
        if self.eat(TokenKind::Print) {
            let value = self.parse_expr()?;
            return Ok(Stmt::Print { value });
        }

        // one extra token of lookahead separates `x = ...` from anything else
        if self.peek().kind == TokenKind::Identifier && self.peek_at(1).kind == TokenKind::Equals {
            let name = self.advance().text;
            self.advance();
            let value = self.parse_expr()?;
            return Ok(Stmt::Assign { name, value });
        }

        Err(self.unexpected("`print` or assignment"))
    }

    fn parse_expr(&mut self) -> Result<Expr, SyntaxError> {
        let mut left = self.parse_term()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_term()?;
            left = Expr::binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_term(&mut self) -> Result<Expr, SyntaxError> {
        let mut left = self.parse_factor()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                _ => break,
            };
            self.advance();
            let right = self.parse_factor()?;
            left = Expr::binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_factor(&mut self) -> Result<Expr, SyntaxError> {
        let op = match self.peek().kind {
            TokenKind::Plus => UnaryOp::Plus,
            TokenKind::Minus => UnaryOp::Minus,
            _ => return self.parse_primary(),
        };
        self.advance();
        let operand = self.parse_factor()?;
        Ok(Expr::unary(op, operand))
    }

    fn parse_primary(&mut self) -> Result<Expr, SyntaxError> {
        match self.peek().kind {
            TokenKind::Number => {
                let token = self.advance();
                let value = token.text.parse::<i64>().map_err(|_| SyntaxError::InvalidIntLiteral {
                    pos: token.pos,
                    text: token.text.clone(),
                })?;
                Ok(Expr::Int(value))
            }
            TokenKind::Identifier => Ok(Expr::Var(self.advance().text)),
            TokenKind::LeftParen => {
                self.advance();
                let expr = self.parse_expr()?;
                self.expect(TokenKind::RightParen, "`)`")?;
                Ok(expr)
            }
            _ => Err(self.unexpected("number, identifier, or `(`")),
        }
    }
}
