//! Lexer for the Siv declaration language.
//!
//! Implemented with the logos library. Converts source text into a stream of
//! tokens with precise source location information.

use crate::token::{Span, Token};
use logos::Logos;
use thiserror::Error;

/// Logos-based token enum for lexing.
///
/// Used internally for efficient tokenization and converted to the public
/// `Token` enum after lexing.
#[derive(Logos, Debug, Clone, PartialEq)]
enum LogosToken {
    // Whitespace (skip)
    #[regex(r"[ \t\r\n]+", logos::skip)]
    Whitespace,

    // Comments (skip)
    #[regex(r"//[^\n]*", logos::skip)]
    LineComment,

    #[regex(r"/\*", lex_block_comment)]
    BlockComment,

    // Keywords (must come before identifiers)
    #[token("function")]
    Function,

    #[token("requires")]
    Requires,

    #[token("deny")]
    Deny,

    #[token("const")]
    Const,

    #[token("let")]
    Let,

    #[token("true")]
    True,

    #[token("false")]
    False,

    // Identifiers (must come after keywords)
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    Identifier(String),

    // Numbers with numeric separator support
    #[regex(r"0x[0-9a-fA-F]+(_[0-9a-fA-F]+)*", parse_hex)]
    #[regex(r"[0-9]+(_[0-9]+)*", parse_int)]
    IntLiteral(i64),

    #[regex(r"[0-9]+(_[0-9]+)*\.[0-9]+(_[0-9]+)*([eE][+-]?[0-9]+)?", parse_float)]
    #[regex(r"[0-9]+(_[0-9]+)*[eE][+-]?[0-9]+", parse_float)]
    FloatLiteral(f64),

    // Strings
    #[regex(r#""([^"\\]|\\.)*""#, parse_string)]
    StringLiteral(String),

    // Operators (2-char before 1-char)
    #[token("==")]
    EqualEqual,

    #[token("!=")]
    BangEqual,

    #[token("<=")]
    LessEqual,

    #[token(">=")]
    GreaterEqual,

    #[token("&&")]
    AmpAmp,

    #[token("||")]
    PipePipe,

    #[token("+")]
    Plus,

    #[token("-")]
    Minus,

    #[token("*")]
    Star,

    #[token("/")]
    Slash,

    #[token("%")]
    Percent,

    #[token("!")]
    Bang,

    #[token("<")]
    Less,

    #[token(">")]
    Greater,

    #[token("=")]
    Equal,

    #[token("(")]
    LeftParen,

    #[token(")")]
    RightParen,

    #[token(":")]
    Colon,

    #[token(";")]
    Semicolon,

    #[token(",")]
    Comma,
}

// Helper parsing functions
fn lex_block_comment(lex: &mut logos::Lexer<LogosToken>) -> logos::Skip {
    // We've already consumed "/*", now find "*/"
    let remainder = lex.remainder();

    if let Some(end) = remainder.find("*/") {
        lex.bump(end + 2);
    } else {
        // Unterminated comment - consume to end
        lex.bump(remainder.len());
    }

    logos::Skip
}

fn parse_hex(lex: &mut logos::Lexer<LogosToken>) -> Option<i64> {
    let s = lex.slice()[2..].replace('_', "");
    i64::from_str_radix(&s, 16).ok()
}

fn parse_int(lex: &mut logos::Lexer<LogosToken>) -> Option<i64> {
    lex.slice().replace('_', "").parse().ok()
}

fn parse_float(lex: &mut logos::Lexer<LogosToken>) -> Option<f64> {
    lex.slice().replace('_', "").parse().ok()
}

fn parse_string(lex: &mut logos::Lexer<LogosToken>) -> Option<String> {
    let s = lex.slice();
    let inner = &s[1..s.len() - 1]; // Remove quotes
    Some(unescape_string(inner))
}

fn unescape_string(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars();

    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => result.push('\n'),
                Some('r') => result.push('\r'),
                Some('t') => result.push('\t'),
                Some('\\') => result.push('\\'),
                Some('"') => result.push('"'),
                Some('0') => result.push('\0'),
                Some(c) => result.push(c),
                None => break,
            }
        } else {
            result.push(c);
        }
    }

    result
}

/// Lexer error types.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum LexError {
    /// A character no token starts with
    #[error("Unexpected character `{char}`")]
    UnexpectedCharacter {
        /// The offending character
        char: char,
        /// Where it occurred
        span: Span,
    },

    /// A numeric literal that does not fit its type
    #[error("Invalid number literal `{text}`")]
    InvalidNumber {
        /// The literal text
        text: String,
        /// Where it occurred
        span: Span,
    },
}

impl LexError {
    /// The source location of this error.
    pub fn span(&self) -> Span {
        match self {
            LexError::UnexpectedCharacter { span, .. } => *span,
            LexError::InvalidNumber { span, .. } => *span,
        }
    }
}

/// Main lexer structure.
pub struct Lexer<'a> {
    source: &'a str,
    tokens: Vec<(Token, Span)>,
    errors: Vec<LexError>,
}

impl<'a> Lexer<'a> {
    /// Create a lexer over `source`.
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            tokens: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Tokenize the entire input, returning all tokens or all errors.
    pub fn tokenize(mut self) -> Result<Vec<(Token, Span)>, Vec<LexError>> {
        let mut logos_lexer = LogosToken::lexer(self.source);
        let mut line = 1u32;
        let mut column = 1u32;
        let mut last_end = 0usize;

        while let Some(token_result) = logos_lexer.next() {
            let range = logos_lexer.span();

            // Update line and column across skipped text
            for c in self.source[last_end..range.start].chars() {
                if c == '\n' {
                    line += 1;
                    column = 1;
                } else {
                    column += 1;
                }
            }

            let span = Span::new(range.start, range.end, line, column);

            match token_result {
                Ok(logos_token) => {
                    let token = convert_token(logos_token);
                    self.tokens.push((token, span));
                }
                Err(_) => {
                    let slice = &self.source[range.start..range.end];
                    let char = slice.chars().next().unwrap_or('\0');
                    // An error span starting with a digit is a numeric literal
                    // that failed to parse (overflow, malformed).
                    if char.is_ascii_digit() {
                        self.errors.push(LexError::InvalidNumber {
                            text: slice.to_string(),
                            span,
                        });
                    } else {
                        self.errors.push(LexError::UnexpectedCharacter { char, span });
                    }
                }
            }

            // Update position across the token itself
            for c in self.source[range.start..range.end].chars() {
                if c == '\n' {
                    line += 1;
                    column = 1;
                } else {
                    column += 1;
                }
            }

            last_end = range.end;
        }

        let eof_span = Span::new(self.source.len(), self.source.len(), line, column);
        self.tokens.push((Token::Eof, eof_span));

        if self.errors.is_empty() {
            Ok(self.tokens)
        } else {
            Err(self.errors)
        }
    }
}

fn convert_token(token: LogosToken) -> Token {
    match token {
        LogosToken::Function => Token::Function,
        LogosToken::Requires => Token::Requires,
        LogosToken::Deny => Token::Deny,
        LogosToken::Const => Token::Const,
        LogosToken::Let => Token::Let,
        LogosToken::True => Token::True,
        LogosToken::False => Token::False,
        LogosToken::Identifier(name) => Token::Identifier(name),
        LogosToken::IntLiteral(v) => Token::IntLiteral(v),
        LogosToken::FloatLiteral(v) => Token::FloatLiteral(v),
        LogosToken::StringLiteral(s) => Token::StringLiteral(s),
        LogosToken::EqualEqual => Token::EqualEqual,
        LogosToken::BangEqual => Token::BangEqual,
        LogosToken::LessEqual => Token::LessEqual,
        LogosToken::GreaterEqual => Token::GreaterEqual,
        LogosToken::AmpAmp => Token::AmpAmp,
        LogosToken::PipePipe => Token::PipePipe,
        LogosToken::Plus => Token::Plus,
        LogosToken::Minus => Token::Minus,
        LogosToken::Star => Token::Star,
        LogosToken::Slash => Token::Slash,
        LogosToken::Percent => Token::Percent,
        LogosToken::Bang => Token::Bang,
        LogosToken::Less => Token::Less,
        LogosToken::Greater => Token::Greater,
        LogosToken::Equal => Token::Equal,
        LogosToken::LeftParen => Token::LeftParen,
        LogosToken::RightParen => Token::RightParen,
        LogosToken::Colon => Token::Colon,
        LogosToken::Semicolon => Token::Semicolon,
        LogosToken::Comma => Token::Comma,
        LogosToken::Whitespace
        | LogosToken::LineComment
        | LogosToken::BlockComment => unreachable!("skipped by logos"),
    }
}
