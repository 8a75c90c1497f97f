//! Operator and punctuation lexing.
//!
//! This module handles lexing of operators and delimiters that need more
//! than a single character of lookahead. Single-character punctuation and
//! the `...` ellipsis are dispatched directly from `core`.

use crate::token::Token;
use crate::Lexer;

impl<'a> Lexer<'a> {
    /// Lexes `+`, `++`, or `+=`.
    pub fn lex_plus(&mut self) -> Token {
        self.cursor.advance();
        if self.cursor.match_char('+') {
            Token::PlusPlus
        } else if self.cursor.match_char('=') {
            Token::PlusEq
        } else {
            Token::Plus
        }
    }

    /// Lexes `-`, `--`, or `-=`.
    pub fn lex_minus(&mut self) -> Token {
        self.cursor.advance();
        if self.cursor.match_char('-') {
            Token::MinusMinus
        } else if self.cursor.match_char('=') {
            Token::MinusEq
        } else {
            Token::Minus
        }
    }

    /// Lexes `*` or `*=`.
    pub fn lex_star(&mut self) -> Token {
        self.cursor.advance();
        if self.cursor.match_char('=') {
            Token::StarEq
        } else {
            Token::Star
        }
    }

    /// Lexes `/`, a line or block comment, or `/=`.
    pub fn lex_slash(&mut self) -> Token {
        self.cursor.advance();

        if self.cursor.current_char() == '/' {
            while !self.cursor.is_at_end() && self.cursor.current_char() != '\n' {
                self.cursor.advance();
            }
            self.skip_whitespace_and_comments();
            return self.next_token();
        }

        if self.cursor.current_char() == '*' {
            self.skip_block_comment();
            self.skip_whitespace_and_comments();
            return self.next_token();
        }

        if self.cursor.match_char('=') {
            Token::SlashEq
        } else {
            Token::Slash
        }
    }

    /// Lexes `%` or `%=`.
    pub fn lex_percent(&mut self) -> Token {
        self.cursor.advance();
        if self.cursor.match_char('=') {
            Token::PercentEq
        } else {
            Token::Percent
        }
    }

    /// Lexes `=`, `==`, or `=>`.
    pub fn lex_equals(&mut self) -> Token {
        self.cursor.advance();
        if self.cursor.match_char('=') {
            Token::EqEq
        } else if self.cursor.match_char('>') {
            Token::FatArrow
        } else {
            Token::Eq
        }
    }

    /// Lexes `!` or `!=`.
    pub fn lex_bang(&mut self) -> Token {
        self.cursor.advance();
        if self.cursor.match_char('=') {
            Token::NotEq
        } else {
            Token::Bang
        }
    }

    /// Lexes `<`, `<=`, `<<`, or `<<=`.
    pub fn lex_less(&mut self) -> Token {
        self.cursor.advance();
        if self.cursor.match_char('=') {
            Token::LtEq
        } else if self.cursor.match_char('<') {
            if self.cursor.match_char('=') {
                Token::ShlEq
            } else {
                Token::Shl
            }
        } else {
            Token::Lt
        }
    }

    /// Lexes `>`, `>=`, `>>`, or `>>=`.
    pub fn lex_greater(&mut self) -> Token {
        self.cursor.advance();
        if self.cursor.match_char('=') {
            Token::GtEq
        } else if self.cursor.match_char('>') {
            if self.cursor.match_char('=') {
                Token::ShrEq
            } else {
                Token::Shr
            }
        } else {
            Token::Gt
        }
    }

    /// Lexes `&`, `&&`, or `&=`.
    pub fn lex_ampersand(&mut self) -> Token {
        self.cursor.advance();
        if self.cursor.match_char('&') {
            Token::AmpAmp
        } else if self.cursor.match_char('=') {
            Token::AmpEq
        } else {
            Token::Amp
        }
    }

    /// Lexes `|`, `||`, or `|=`.
    pub fn lex_pipe(&mut self) -> Token {
        self.cursor.advance();
        if self.cursor.match_char('|') {
            Token::PipePipe
        } else if self.cursor.match_char('=') {
            Token::PipeEq
        } else {
            Token::Pipe
        }
    }

    /// Lexes `^`, `^=`, `^^`, or `^^=`.
    pub fn lex_caret(&mut self) -> Token {
        self.cursor.advance();
        if self.cursor.match_char('^') {
            if self.cursor.match_char('=') {
                Token::CaretCaretEq
            } else {
                Token::CaretCaret
            }
        } else if self.cursor.match_char('=') {
            Token::CaretEq
        } else {
            Token::Caret
        }
    }

    /// Lexes `~`. There is no `~=` form; `~` is unary only.
    pub fn lex_tilde(&mut self) -> Token {
        self.cursor.advance();
        Token::Tilde
    }
}
