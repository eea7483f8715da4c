//! Parser for the Siv declaration language
//!
//! A recursive descent parser that transforms a token stream from the lexer
//! into a module AST. Errors are accumulated; after an item fails, the parser
//! synchronizes to the next item boundary and continues.

pub mod error;

use crate::ast::*;
use crate::lexer::Lexer;
use crate::token::{Span, Token};
use siv_types::Type;

pub use error::{ParseError, ParseErrorKind};

/// Parser state for the Siv declaration language.
pub struct Parser {
    /// Pre-tokenized input
    tokens: Vec<(Token, Span)>,

    /// Current position in token stream
    pos: usize,

    /// Accumulated parse errors (allows continuing after errors)
    errors: Vec<ParseError>,
}

impl Parser {
    /// Create a new parser from source code.
    pub fn new(source: &str) -> Result<Self, Vec<crate::lexer::LexError>> {
        let tokens = Lexer::new(source).tokenize()?;
        Ok(Self {
            tokens,
            pos: 0,
            errors: Vec::new(),
        })
    }

    /// Parse the entire source file into a Module AST.
    ///
    /// Returns the Module on success, or all accumulated errors on failure.
    pub fn parse(mut self) -> Result<Module, Vec<ParseError>> {
        let start_span = self.current_span();
        let mut items = Vec::new();

        while !self.at_eof() {
            match self.parse_item() {
                Ok(item) => items.push(item),
                Err(err) => {
                    self.errors.push(err);
                    self.sync_to_item_boundary();
                }
            }
        }

        let span = items
            .last()
            .map(|last| start_span.to(last.span()))
            .unwrap_or(start_span);

        if !self.errors.is_empty() {
            return Err(self.errors);
        }

        Ok(Module { items, span })
    }

    // ========================================================================
    // Token Management
    // ========================================================================

    /// Get the current token.
    #[inline]
    fn current(&self) -> &Token {
        &self.tokens[self.pos].0
    }

    /// Get the current token's span.
    #[inline]
    fn current_span(&self) -> Span {
        self.tokens[self.pos].1
    }

    /// Advance to the next token, returning the previous current token.
    fn advance(&mut self) -> (Token, Span) {
        let entry = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        entry
    }

    /// Whether the current token is `token`.
    fn check(&self, token: &Token) -> bool {
        self.current() == token
    }

    /// Consume the current token if it is `token`.
    fn eat(&mut self, token: &Token) -> bool {
        if self.check(token) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consume `token` or produce an error naming `expected`.
    fn expect(&mut self, token: Token, expected: &str) -> Result<Span, ParseError> {
        if self.check(&token) {
            Ok(self.advance().1)
        } else {
            Err(ParseError::unexpected(
                expected,
                self.current().clone(),
                self.current_span(),
            ))
        }
    }

    fn at_eof(&self) -> bool {
        matches!(self.current(), Token::Eof)
    }

    /// Skip tokens until a likely item boundary (after `;` or before an
    /// item-starting keyword).
    fn sync_to_item_boundary(&mut self) {
        while !self.at_eof() {
            if matches!(self.current(), Token::Semicolon) {
                self.advance();
                return;
            }
            if matches!(
                self.current(),
                Token::Function | Token::Const | Token::Let | Token::Deny
            ) {
                return;
            }
            self.advance();
        }
    }

    // ========================================================================
    // Items
    // ========================================================================

    fn parse_item(&mut self) -> Result<Item, ParseError> {
        match self.current() {
            Token::Deny | Token::Function => self.parse_function().map(Item::Function),
            Token::Const => self.parse_const().map(Item::Const),
            Token::Let => self.parse_let().map(Item::Let),
            _ => self.parse_expression_statement().map(Item::Expression),
        }
    }

    /// `[deny ["(" string ")"]] function name "(" params ")" [requires "(" expr ")"] ":" type ";"`
    fn parse_function(&mut self) -> Result<FunctionDecl, ParseError> {
        let deny = if self.check(&Token::Deny) {
            let deny_span = self.advance().1;
            let mut message = None;
            let mut span = deny_span;
            if self.eat(&Token::LeftParen) {
                match self.advance() {
                    (Token::StringLiteral(text), _) => message = Some(text),
                    (found, found_span) => {
                        return Err(ParseError::unexpected("a deny message string", found, found_span));
                    }
                }
                span = deny_span.to(self.expect(Token::RightParen, "`)`")?);
            }
            Some(DenyPolicy { message, span })
        } else {
            None
        };

        let start_span = deny
            .as_ref()
            .map(|d| d.span)
            .unwrap_or_else(|| self.current_span());
        self.expect(Token::Function, "`function`")?;
        let name = self.parse_identifier("a function name")?;

        self.expect(Token::LeftParen, "`(`")?;
        let mut params = Vec::new();
        if !self.check(&Token::RightParen) {
            loop {
                params.push(self.parse_param()?);
                if !self.eat(&Token::Comma) {
                    break;
                }
            }
        }
        self.expect(Token::RightParen, "`)` or `,`")?;

        let constraint = if self.eat(&Token::Requires) {
            self.expect(Token::LeftParen, "`(` after `requires`")?;
            let expr = self.parse_expression()?;
            self.expect(Token::RightParen, "`)` closing the constraint")?;
            Some(expr)
        } else {
            None
        };

        self.expect(Token::Colon, "`:` before the return type")?;
        let return_type = self.parse_type()?;
        let end_span = self.expect(Token::Semicolon, "`;` after the prototype")?;

        Ok(FunctionDecl {
            name,
            params,
            constraint,
            deny,
            return_type,
            span: start_span.to(end_span),
        })
    }

    /// `name ":" type`
    fn parse_param(&mut self) -> Result<Param, ParseError> {
        let name = self.parse_identifier("a parameter name")?;
        self.expect(Token::Colon, "`:` after the parameter name")?;
        let ty_span = self.current_span();
        let ty = self.parse_type()?;
        Ok(Param {
            span: name.span.to(ty_span),
            name,
            ty,
        })
    }

    /// `const name "=" expr ";"`
    fn parse_const(&mut self) -> Result<ConstDecl, ParseError> {
        let start_span = self.expect(Token::Const, "`const`")?;
        let name = self.parse_identifier("a binding name")?;
        self.expect(Token::Equal, "`=` after the binding name")?;
        let init = self.parse_expression()?;
        let end_span = self.expect(Token::Semicolon, "`;` after the initializer")?;
        Ok(ConstDecl {
            name,
            init,
            span: start_span.to(end_span),
        })
    }

    /// `let name [":" type] ["=" expr] ";"` — at least one of the type and
    /// initializer must be present.
    fn parse_let(&mut self) -> Result<LetDecl, ParseError> {
        let start_span = self.expect(Token::Let, "`let`")?;
        let name = self.parse_identifier("a binding name")?;

        let ty = if self.eat(&Token::Colon) {
            Some(self.parse_type()?)
        } else {
            None
        };
        let init = if self.eat(&Token::Equal) {
            Some(self.parse_expression()?)
        } else {
            None
        };
        let end_span = self.expect(Token::Semicolon, "`;` after the declaration")?;
        let span = start_span.to(end_span);

        if ty.is_none() && init.is_none() {
            return Err(ParseError::invalid(
                format!("`let {}` needs a type annotation or an initializer", name.name),
                span,
            ));
        }

        Ok(LetDecl { name, ty, init, span })
    }

    fn parse_expression_statement(&mut self) -> Result<ExpressionStatement, ParseError> {
        let expression = self.parse_expression()?;
        let end_span = self.expect(Token::Semicolon, "`;` after the expression")?;
        Ok(ExpressionStatement {
            span: expression.span().to(end_span),
            expression,
        })
    }

    fn parse_identifier(&mut self, expected: &str) -> Result<Identifier, ParseError> {
        match self.advance() {
            (Token::Identifier(name), span) => Ok(Identifier { name, span }),
            (found, span) => Err(ParseError::unexpected(expected, found, span)),
        }
    }

    fn parse_type(&mut self) -> Result<Type, ParseError> {
        let ident = self.parse_identifier("a type name")?;
        Type::from_name(&ident.name).ok_or_else(|| ParseError::unknown_type(ident.name, ident.span))
    }

    // ========================================================================
    // Expressions (precedence climbing)
    // ========================================================================

    /// Parse an expression.
    pub fn parse_expression(&mut self) -> Result<Expression, ParseError> {
        self.parse_binary(0)
    }

    fn parse_binary(&mut self, min_power: u8) -> Result<Expression, ParseError> {
        let mut lhs = self.parse_unary()?;

        while let Some((op, power)) = binary_op(self.current()) {
            if power < min_power {
                break;
            }
            self.advance();
            // All operators are left-associative
            let rhs = self.parse_binary(power + 1)?;
            let span = lhs.span().to(rhs.span());
            lhs = Expression::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
                span,
            };
        }

        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<Expression, ParseError> {
        let op = match self.current() {
            Token::Minus => Some(UnaryOp::Neg),
            Token::Bang => Some(UnaryOp::Not),
            _ => None,
        };
        if let Some(op) = op {
            let op_span = self.advance().1;
            let operand = self.parse_unary()?;
            let span = op_span.to(operand.span());
            return Ok(Expression::Unary {
                op,
                operand: Box::new(operand),
                span,
            });
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Expression, ParseError> {
        match self.advance() {
            (Token::IntLiteral(value), span) => Ok(Expression::IntLiteral { value, span }),
            (Token::FloatLiteral(value), span) => Ok(Expression::FloatLiteral { value, span }),
            (Token::StringLiteral(value), span) => Ok(Expression::StringLiteral { value, span }),
            (Token::True, span) => Ok(Expression::BoolLiteral { value: true, span }),
            (Token::False, span) => Ok(Expression::BoolLiteral { value: false, span }),
            (Token::Identifier(name), span) => {
                let ident = Identifier { name, span };
                if self.check(&Token::LeftParen) {
                    self.parse_call(ident)
                } else {
                    Ok(Expression::Identifier(ident))
                }
            }
            (Token::LeftParen, _) => {
                let expr = self.parse_expression()?;
                self.expect(Token::RightParen, "`)`")?;
                Ok(expr)
            }
            (found, span) => Err(ParseError::unexpected("an expression", found, span)),
        }
    }

    fn parse_call(&mut self, callee: Identifier) -> Result<Expression, ParseError> {
        self.expect(Token::LeftParen, "`(`")?;
        let mut args = Vec::new();
        if !self.check(&Token::RightParen) {
            loop {
                args.push(self.parse_expression()?);
                if !self.eat(&Token::Comma) {
                    break;
                }
            }
        }
        let end_span = self.expect(Token::RightParen, "`)` or `,`")?;
        let span = callee.span.to(end_span);
        Ok(Expression::Call { callee, args, span })
    }
}

/// Binding power for a binary operator token, if it is one.
///
/// Higher binds tighter; all operators are left-associative.
fn binary_op(token: &Token) -> Option<(BinaryOp, u8)> {
    let entry = match token {
        Token::PipePipe => (BinaryOp::Or, 1),
        Token::AmpAmp => (BinaryOp::And, 2),
        Token::EqualEqual => (BinaryOp::Eq, 3),
        Token::BangEqual => (BinaryOp::Ne, 3),
        Token::Less => (BinaryOp::Lt, 4),
        Token::LessEqual => (BinaryOp::Le, 4),
        Token::Greater => (BinaryOp::Gt, 4),
        Token::GreaterEqual => (BinaryOp::Ge, 4),
        Token::Plus => (BinaryOp::Add, 5),
        Token::Minus => (BinaryOp::Sub, 5),
        Token::Star => (BinaryOp::Mul, 6),
        Token::Slash => (BinaryOp::Div, 6),
        Token::Percent => (BinaryOp::Rem, 6),
        _ => return None,
    };
    Some(entry)
}
