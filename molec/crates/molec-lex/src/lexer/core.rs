//! Core lexer implementation.
//!
//! This module contains the main Lexer struct and its dispatch table.

use molec_util::{DiagnosticBuilder, Handler, Phase, Span};

use crate::config::LexerConfig;
use crate::cursor::Cursor;
use crate::token::Token;
use crate::unicode::{is_ascii_ident_continue, is_ascii_ident_start};

/// Lexer for the Mole programming language.
///
/// Transforms normalized source text into a stream of tokens, skipping
/// whitespace and comments as it goes.
pub struct Lexer<'a> {
    /// Character cursor for source traversal.
    pub cursor: Cursor<'a>,

    /// Error handler for reporting lexical errors.
    pub handler: &'a mut Handler,

    /// Lexer limits (identifier/string length caps).
    pub config: LexerConfig,

    /// Starting byte offset of the current token.
    pub token_start: usize,

    /// Line number where the current token starts (1-based).
    token_start_line: u32,

    /// Column number where the current token starts (1-based).
    token_start_column: u32,

    /// Whether the leading-BOM check has already run.
    pub(crate) bom_checked: bool,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given (already newline-normalized) source.
    pub fn new(source: &'a str, handler: &'a mut Handler) -> Self {
        Self::with_config(source, handler, LexerConfig::default())
    }

    /// Creates a new lexer with explicit identifier/string length limits.
    pub fn with_config(source: &'a str, handler: &'a mut Handler, config: LexerConfig) -> Self {
        Self {
            cursor: Cursor::new(source),
            handler,
            config,
            token_start: 0,
            token_start_line: 1,
            token_start_column: 1,
            bom_checked: false,
        }
    }

    /// Returns the next token from the source code.
    ///
    /// Skips whitespace and comments, then dispatches on the current
    /// character. Reaching the end of input returns `Token::Eof`
    /// permanently; a lexical error returns `Token::Invalid` and lexing
    /// continues from the next character.
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace_and_comments();

        self.token_start = self.cursor.position();
        self.token_start_line = self.cursor.line();
        self.token_start_column = self.cursor.column();

        if self.cursor.is_at_end() {
            return Token::Eof;
        }

        match self.cursor.current_char() {
            '(' => {
                self.cursor.advance();
                Token::LParen
            }
            ')' => {
                self.cursor.advance();
                Token::RParen
            }
            '{' => {
                self.cursor.advance();
                Token::LBrace
            }
            '}' => {
                self.cursor.advance();
                Token::RBrace
            }
            '[' => {
                self.cursor.advance();
                Token::LBracket
            }
            ']' => {
                self.cursor.advance();
                Token::RBracket
            }
            ',' => {
                self.cursor.advance();
                Token::Comma
            }
            ';' => {
                self.cursor.advance();
                Token::Semicolon
            }
            ':' => {
                self.cursor.advance();
                Token::Colon
            }
            '@' => {
                self.cursor.advance();
                Token::At
            }
            '+' => self.lex_plus(),
            '-' => self.lex_minus(),
            '*' => self.lex_star(),
            '/' => self.lex_slash(),
            '%' => self.lex_percent(),
            '=' => self.lex_equals(),
            '!' => self.lex_bang(),
            '<' => self.lex_less(),
            '>' => self.lex_greater(),
            '&' => self.lex_ampersand(),
            '|' => self.lex_pipe(),
            '^' => self.lex_caret(),
            '~' => self.lex_tilde(),
            '.' => self.lex_dot(),
            '"' => self.lex_string(),
            '\'' => self.lex_char(),
            '_' => {
                self.cursor.advance();
                if is_ascii_ident_continue(self.cursor.current_char())
                    || self.cursor.current_char().is_alphanumeric()
                {
                    self.lex_identifier()
                } else {
                    Token::Underscore
                }
            }
            c if c.is_ascii_digit() => self.lex_number(),
            c if is_ascii_ident_start(c) || (c.is_alphabetic() && !c.is_ascii()) => {
                self.lex_identifier()
            }
            c => {
                self.report_error(format!("unexpected character '{}'", c));
                self.cursor.advance();
                Token::Invalid(c.to_string())
            }
        }
    }

    /// Lexes `.` as the start of a float literal, the `...` ellipsis, or an error.
    fn lex_dot(&mut self) -> Token {
        if self.cursor.peek_char(1).is_ascii_digit() {
            return self.lex_number();
        }

        let start = self.cursor.position();
        self.cursor.advance();
        if self.cursor.current_char() == '.' && self.cursor.peek_char(1) == '.' {
            self.cursor.advance();
            self.cursor.advance();
            Token::DotDotDot
        } else {
            self.report_error("unexpected character '.'".to_string());
            Token::Invalid(self.cursor.slice_from(start).to_string())
        }
    }

    /// Reports a lexical error at the current token's starting position.
    pub fn report_error(&mut self, message: String) {
        let span = Span::new(
            self.token_start,
            self.cursor.position(),
            self.token_start_line,
            self.token_start_column,
        );
        DiagnosticBuilder::error(message)
            .phase(Phase::Lexer)
            .span(span)
            .emit(self.handler);
    }

    /// Reports a lexical warning at the current token's starting position.
    pub fn report_warning(&mut self, message: String) {
        let span = Span::new(
            self.token_start,
            self.cursor.position(),
            self.token_start_line,
            self.token_start_column,
        );
        DiagnosticBuilder::warning(message)
            .phase(Phase::Lexer)
            .span(span)
            .emit(self.handler);
    }

    /// Returns the current line number (1-based).
    pub fn line(&self) -> u32 {
        self.cursor.line()
    }

    /// Returns the current column number (1-based).
    pub fn column(&self) -> u32 {
        self.cursor.column()
    }

    /// Returns the current byte position in the source.
    pub fn position(&self) -> usize {
        self.cursor.position()
    }

    /// The span of the token most recently returned by `next_token`.
    pub fn token_span(&self) -> Span {
        Span::new(
            self.token_start,
            self.cursor.position(),
            self.token_start_line,
            self.token_start_column,
        )
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        let token = self.next_token();
        if token == Token::Eof {
            None
        } else {
            Some(token)
        }
    }
}
