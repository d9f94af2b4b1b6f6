//! Tokenizer for IMP source text.

use crate::error::SyntaxError;
use crate::token::{Location, Token, TokenKind};

/// Split source text into a stream of tokens.
///
/// Whitespace separates tokens but is otherwise insignificant. `//`
/// starts a comment running to end of line.
pub fn tokenize(source: &str) -> Result<Vec<Token>, SyntaxError> {
    Lexer::new(source).run()
}

struct Lexer<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    line: u32,
    column: u32,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            chars: source.chars().peekable(),
            line: 1,
            column: 1,
        }
    }

    fn location(&self) -> Location {
        Location {
            line: self.line,
            column: self.column,
        }
    }

    /// Consume one character, maintaining the line and column counters.
    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    /// Consume the next character if it equals `expected`.
    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn run(mut self) -> Result<Vec<Token>, SyntaxError> {
        let mut tokens = Vec::new();

        while let Some(c) = self.peek() {
            let loc = self.location();

            // Whitespace.
            if c.is_whitespace() {
                self.bump();
                continue;
            }

            // Comments.
            if c == '/' {
                self.bump();
                if self.eat('/') {
                    while let Some(c) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.bump();
                    }
                    continue;
                }
                tokens.push(Token::new(TokenKind::Slash, loc));
                continue;
            }

            let kind = match c {
                '(' => {
                    self.bump();
                    TokenKind::LParen
                }
                ')' => {
                    self.bump();
                    TokenKind::RParen
                }
                '{' => {
                    self.bump();
                    TokenKind::LBrace
                }
                '}' => {
                    self.bump();
                    TokenKind::RBrace
                }
                ':' => {
                    self.bump();
                    TokenKind::Colon
                }
                ';' => {
                    self.bump();
                    TokenKind::Semi
                }
                ',' => {
                    self.bump();
                    TokenKind::Comma
                }
                '+' => {
                    self.bump();
                    TokenKind::Plus
                }
                '-' => {
                    self.bump();
                    TokenKind::Minus
                }
                '*' => {
                    self.bump();
                    TokenKind::Star
                }
                '%' => {
                    self.bump();
                    TokenKind::Percent
                }
                '=' => {
                    self.bump();
                    if self.eat('=') {
                        TokenKind::IsEq
                    } else {
                        TokenKind::Equal
                    }
                }
                '>' => {
                    self.bump();
                    if self.eat('=') {
                        TokenKind::GreaterEq
                    } else {
                        TokenKind::Greater
                    }
                }
                '<' => {
                    self.bump();
                    if self.eat('=') {
                        TokenKind::LowerEq
                    } else {
                        TokenKind::Lower
                    }
                }
                '"' => self.lex_string(loc)?,
                c if c.is_ascii_digit() => self.lex_int(loc)?,
                c if c.is_alphabetic() || c == '_' => self.lex_word(),
                other => {
                    return Err(SyntaxError::UnexpectedChar {
                        location: loc,
                        found: other,
                    })
                }
            };

            tokens.push(Token::new(kind, loc));
        }

        Ok(tokens)
    }

    fn lex_string(&mut self, loc: Location) -> Result<TokenKind, SyntaxError> {
        self.bump(); // opening quote
        let mut value = String::new();
        loop {
            match self.bump() {
                Some('"') => return Ok(TokenKind::Str(value)),
                Some('\n') | None => {
                    return Err(SyntaxError::UnterminatedString { location: loc })
                }
                Some(c) => value.push(c),
            }
        }
    }

    fn lex_int(&mut self, loc: Location) -> Result<TokenKind, SyntaxError> {
        let mut literal = String::new();
        while let Some(c) = self.peek() {
            if !c.is_ascii_digit() {
                break;
            }
            literal.push(c);
            self.bump();
        }
        let value = literal
            .parse::<i64>()
            .map_err(|_| SyntaxError::IntegerOutOfRange {
                location: loc,
                literal: literal.clone(),
            })?;
        Ok(TokenKind::Int(value))
    }

    fn lex_word(&mut self) -> TokenKind {
        let mut word = String::new();
        while let Some(c) = self.peek() {
            if !c.is_alphanumeric() && c != '_' {
                break;
            }
            word.push(c);
            self.bump();
        }
        match word.as_str() {
            "func" => TokenKind::Func,
            "return" => TokenKind::Return,
            "while" => TokenKind::While,
            "if" => TokenKind::If,
            "else" => TokenKind::Else,
            "let" => TokenKind::Let,
            _ => TokenKind::Ident(word),
        }
    }
}
