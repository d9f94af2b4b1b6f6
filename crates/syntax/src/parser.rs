//! Recursive-descent parser for IMP.
//!
//! Precedence, lowest to highest: comparison, additive, multiplicative,
//! calls (postfix), terms. All binary levels are left-associative;
//! comparison is non-chaining in intent but parsed left-associatively,
//! so `a > b > c` becomes `(a > b) > c`.

use crate::ast::{BinOp, Expr, FuncDecl, Item, Module, ProtoDecl, Stmt};
use crate::error::SyntaxError;
use crate::token::{Token, TokenKind};

/// Parse a token stream into a module.
pub fn parse(tokens: Vec<Token>) -> Result<Module, SyntaxError> {
    Parser::new(tokens).parse_module()
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    // ---- Token stream helpers ----

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_at(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.pos + offset)
    }

    /// Skip the current token unconditionally.
    fn advance(&mut self) {
        self.pos += 1;
    }

    fn at(&self, kind: &TokenKind) -> bool {
        self.peek().is_some_and(|tk| tk.is(kind))
    }

    /// Consume the next token if it is of the given kind.
    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.at(kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Consume the next token, requiring it to be of the given kind.
    fn expect(&mut self, kind: TokenKind) -> Result<Token, SyntaxError> {
        match self.peek() {
            Some(tk) if tk.is(&kind) => {
                let tk = tk.clone();
                self.pos += 1;
                Ok(tk)
            }
            _ => Err(self.unexpected(&kind.to_string())),
        }
    }

    fn expect_ident(&mut self) -> Result<String, SyntaxError> {
        match self.peek() {
            Some(Token {
                kind: TokenKind::Ident(name),
                ..
            }) => {
                let name = name.clone();
                self.pos += 1;
                Ok(name)
            }
            _ => Err(self.unexpected("identifier")),
        }
    }

    fn expect_string(&mut self) -> Result<String, SyntaxError> {
        match self.peek() {
            Some(Token {
                kind: TokenKind::Str(value),
                ..
            }) => {
                let value = value.clone();
                self.pos += 1;
                Ok(value)
            }
            _ => Err(self.unexpected("string")),
        }
    }

    fn unexpected(&self, expected: &str) -> SyntaxError {
        match self.peek() {
            Some(tk) => SyntaxError::UnexpectedToken {
                location: tk.location,
                found: tk.kind.to_string(),
                expected: expected.to_string(),
            },
            None => SyntaxError::UnexpectedEof {
                expected: expected.to_string(),
            },
        }
    }

    // ---- Items ----

    fn parse_module(&mut self) -> Result<Module, SyntaxError> {
        let mut items = Vec::new();
        while self.peek().is_some() {
            if self.at(&TokenKind::Func) {
                items.push(self.parse_func_item()?);
            } else {
                items.push(Item::Stmt(self.parse_stmt()?));
            }
        }
        Ok(Module { items })
    }

    /// Parse a function prototype or declaration.
    ///
    /// `func name(args): type = "primitive";` declares a prototype;
    /// `func name(args): type { ... }` declares a function.
    fn parse_func_item(&mut self) -> Result<Item, SyntaxError> {
        self.expect(TokenKind::Func)?;
        let name = self.expect_ident()?;
        self.expect(TokenKind::LParen)?;

        let mut args = Vec::new();
        if !self.at(&TokenKind::RParen) {
            loop {
                let arg = self.expect_ident()?;
                self.expect(TokenKind::Colon)?;
                let ty = self.expect_ident()?;
                args.push((arg, ty));
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen)?;

        self.expect(TokenKind::Colon)?;
        let ret_type = self.expect_ident()?;

        if self.eat(&TokenKind::Equal) {
            let primitive = self.expect_string()?;
            self.expect(TokenKind::Semi)?;
            Ok(Item::Proto(ProtoDecl {
                name,
                args,
                ret_type,
                primitive,
            }))
        } else {
            let body = self.parse_block_stmt()?;
            Ok(Item::Func(FuncDecl {
                name,
                args,
                ret_type,
                body,
            }))
        }
    }

    // ---- Statements ----

    fn parse_stmt(&mut self) -> Result<Stmt, SyntaxError> {
        match self.peek().map(|tk| &tk.kind) {
            Some(TokenKind::LBrace) => self.parse_block_stmt(),
            Some(TokenKind::While) => self.parse_while_stmt(),
            Some(TokenKind::If) => self.parse_if_stmt(),
            Some(TokenKind::Return) => self.parse_return_stmt(),
            Some(TokenKind::Let) => self.parse_let_stmt(),
            Some(TokenKind::Ident(_))
                if self.peek_at(1).is_some_and(|tk| tk.is(&TokenKind::Equal)) =>
            {
                self.parse_assign_stmt()
            }
            _ => {
                let expr = self.parse_expr()?;
                self.expect(TokenKind::Semi)?;
                Ok(Stmt::Expr(expr))
            }
        }
    }

    fn parse_block_stmt(&mut self) -> Result<Stmt, SyntaxError> {
        self.expect(TokenKind::LBrace)?;
        let mut body = Vec::new();
        while !self.at(&TokenKind::RBrace) {
            if self.peek().is_none() {
                return Err(self.unexpected("'}'"));
            }
            body.push(self.parse_stmt()?);
        }
        self.expect(TokenKind::RBrace)?;
        Ok(Stmt::Block(body))
    }

    fn parse_while_stmt(&mut self) -> Result<Stmt, SyntaxError> {
        self.expect(TokenKind::While)?;
        self.expect(TokenKind::LParen)?;
        let cond = self.parse_expr()?;
        self.expect(TokenKind::RParen)?;
        let body = self.parse_stmt()?;
        Ok(Stmt::While {
            cond,
            body: Box::new(body),
        })
    }

    fn parse_if_stmt(&mut self) -> Result<Stmt, SyntaxError> {
        self.expect(TokenKind::If)?;
        self.expect(TokenKind::LParen)?;
        let cond = self.parse_expr()?;
        self.expect(TokenKind::RParen)?;
        let then = self.parse_stmt()?;

        let els = if self.eat(&TokenKind::Else) {
            Some(Box::new(self.parse_stmt()?))
        } else {
            None
        };

        Ok(Stmt::If {
            cond,
            then: Box::new(then),
            els,
        })
    }

    fn parse_return_stmt(&mut self) -> Result<Stmt, SyntaxError> {
        self.expect(TokenKind::Return)?;
        let expr = self.parse_expr()?;
        self.expect(TokenKind::Semi)?;
        Ok(Stmt::Return(expr))
    }

    fn parse_let_stmt(&mut self) -> Result<Stmt, SyntaxError> {
        self.expect(TokenKind::Let)?;
        let name = self.expect_ident()?;
        self.expect(TokenKind::Colon)?;
        let ty = self.expect_ident()?;

        let init = if self.eat(&TokenKind::Equal) {
            Some(self.parse_expr()?)
        } else {
            None
        };
        self.expect(TokenKind::Semi)?;

        Ok(Stmt::Let { name, ty, init })
    }

    fn parse_assign_stmt(&mut self) -> Result<Stmt, SyntaxError> {
        let name = self.expect_ident()?;
        self.expect(TokenKind::Equal)?;
        let value = self.parse_expr()?;
        self.expect(TokenKind::Semi)?;
        Ok(Stmt::Assign { name, value })
    }

    // ---- Expressions ----

    fn parse_expr(&mut self) -> Result<Expr, SyntaxError> {
        self.parse_comp_expr()
    }

    fn parse_comp_expr(&mut self) -> Result<Expr, SyntaxError> {
        let mut term = self.parse_add_sub_expr()?;
        loop {
            let op = match self.peek().map(|tk| &tk.kind) {
                Some(TokenKind::Greater) => BinOp::Greater,
                Some(TokenKind::Lower) => BinOp::Lower,
                Some(TokenKind::GreaterEq) => BinOp::GreaterEq,
                Some(TokenKind::LowerEq) => BinOp::LowerEq,
                Some(TokenKind::IsEq) => BinOp::IsEq,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_add_sub_expr()?;
            term = Expr::Binary {
                op,
                lhs: Box::new(term),
                rhs: Box::new(rhs),
            };
        }
        Ok(term)
    }

    fn parse_add_sub_expr(&mut self) -> Result<Expr, SyntaxError> {
        let mut term = self.parse_mul_div_mod_expr()?;
        loop {
            let op = match self.peek().map(|tk| &tk.kind) {
                Some(TokenKind::Plus) => BinOp::Add,
                Some(TokenKind::Minus) => BinOp::Sub,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_mul_div_mod_expr()?;
            term = Expr::Binary {
                op,
                lhs: Box::new(term),
                rhs: Box::new(rhs),
            };
        }
        Ok(term)
    }

    fn parse_mul_div_mod_expr(&mut self) -> Result<Expr, SyntaxError> {
        let mut term = self.parse_call_expr()?;
        loop {
            let op = match self.peek().map(|tk| &tk.kind) {
                Some(TokenKind::Star) => BinOp::Mul,
                Some(TokenKind::Slash) => BinOp::Div,
                Some(TokenKind::Percent) => BinOp::Mod,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_call_expr()?;
            term = Expr::Binary {
                op,
                lhs: Box::new(term),
                rhs: Box::new(rhs),
            };
        }
        Ok(term)
    }

    fn parse_call_expr(&mut self) -> Result<Expr, SyntaxError> {
        let mut callee = self.parse_term_expr()?;
        while self.eat(&TokenKind::LParen) {
            let mut args = Vec::new();
            if !self.at(&TokenKind::RParen) {
                loop {
                    args.push(self.parse_expr()?);
                    if !self.eat(&TokenKind::Comma) {
                        break;
                    }
                }
            }
            self.expect(TokenKind::RParen)?;
            callee = Expr::Call {
                callee: Box::new(callee),
                args,
            };
        }
        Ok(callee)
    }

    fn parse_term_expr(&mut self) -> Result<Expr, SyntaxError> {
        match self.peek().map(|tk| &tk.kind) {
            Some(TokenKind::Ident(name)) => {
                let name = name.clone();
                self.pos += 1;
                Ok(Expr::Ref(name))
            }
            Some(TokenKind::Int(value)) => {
                let value = *value;
                self.pos += 1;
                Ok(Expr::Int(value))
            }
            _ => Err(self.unexpected("term")),
        }
    }
}
