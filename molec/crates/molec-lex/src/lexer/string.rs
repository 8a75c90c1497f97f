//! String and character literal lexing.
//!
//! This module handles string and character literals. There are no raw
//! strings and no `\u{...}` escape: the escape set is `\\ \' \" \n \t \r \0`
//! plus the two-hex-digit `\xHH` byte escape.

use crate::token::Token;
use crate::Lexer;
use molec_util::Symbol;

impl<'a> Lexer<'a> {
    /// Lexes a string literal.
    ///
    /// A string may span multiple physical lines; it is only unterminated
    /// when the source ends before the closing `"`.
    pub fn lex_string(&mut self) -> Token {
        self.cursor.advance();

        let mut content = String::new();

        loop {
            if self.cursor.is_at_end() {
                self.report_error("unterminated string literal".to_string());
                break;
            }

            let c = self.cursor.current_char();

            if c == '"' {
                self.cursor.advance();
                break;
            }

            if c == '\\' {
                self.cursor.advance();
                if let Some(escaped) = self.parse_escape() {
                    content.push(escaped);
                }
            } else {
                content.push(c);
                self.cursor.advance();
            }
        }

        let length = content.chars().count();
        if length > self.config.max_string_length {
            self.report_error(format!(
                "string literal exceeds the maximum length of {} characters",
                self.config.max_string_length
            ));
        }

        Token::StringLiteral(Symbol::intern(&content))
    }

    /// Lexes a character literal.
    pub fn lex_char(&mut self) -> Token {
        self.cursor.advance();

        if self.cursor.is_at_end() {
            self.report_error("unterminated character literal".to_string());
            return Token::CharLiteral('\0');
        }

        let c = if self.cursor.current_char() == '\\' {
            self.cursor.advance();
            self.parse_escape().unwrap_or('\0')
        } else {
            let c = self.cursor.current_char();
            if c == '\'' || c == '\n' {
                self.report_error("empty character literal".to_string());
                return Token::CharLiteral('\0');
            }
            self.cursor.advance();
            c
        };

        if self.cursor.current_char() != '\'' {
            self.report_error("unterminated character literal".to_string());
            while !self.cursor.is_at_end()
                && self.cursor.current_char() != '\''
                && self.cursor.current_char() != '\n'
            {
                self.cursor.advance();
            }
        } else {
            self.cursor.advance();
        }

        Token::CharLiteral(c)
    }

    /// Parses an escape sequence: `\\ \' \" \n \t \r \0 \xHH`.
    ///
    /// An unrecognized escape is reported, and lexing continues by keeping
    /// the character after the backslash literally rather than dropping it.
    pub fn parse_escape(&mut self) -> Option<char> {
        if self.cursor.is_at_end() {
            self.report_error("unterminated escape sequence".to_string());
            return None;
        }

        let c = self.cursor.current_char();
        self.cursor.advance();

        match c {
            'n' => Some('\n'),
            't' => Some('\t'),
            'r' => Some('\r'),
            '\\' => Some('\\'),
            '"' => Some('"'),
            '\'' => Some('\''),
            '0' => Some('\0'),
            'x' => {
                let mut hex = String::new();
                for _ in 0..2 {
                    let h = self.cursor.current_char();
                    if h.is_ascii_hexdigit() {
                        hex.push(h);
                        self.cursor.advance();
                    } else {
                        break;
                    }
                }
                if hex.len() == 2 {
                    u8::from_str_radix(&hex, 16).ok().map(|b| b as char)
                } else {
                    self.report_error("invalid hex escape sequence".to_string());
                    None
                }
            }
            _ => {
                self.report_error(format!("unknown escape sequence: \\{}", c));
                Some(c)
            }
        }
    }
}
