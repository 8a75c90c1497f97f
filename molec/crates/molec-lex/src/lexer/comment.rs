//! Comment lexing.
//!
//! This module handles skipping line and block comments. Block comments do
//! not nest: the first `*/` closes the comment.

use crate::Lexer;

impl<'a> Lexer<'a> {
    /// Skips a block comment, stopping at the first `*/`.
    pub fn skip_block_comment(&mut self) {
        self.cursor.advance(); // '/'
        self.cursor.advance(); // '*'

        while !self.cursor.is_at_end() {
            if self.cursor.current_char() == '*' && self.cursor.peek_char(1) == '/' {
                self.cursor.advance();
                self.cursor.advance();
                return;
            }
            self.cursor.advance();
        }

        self.report_error("unterminated block comment".to_string());
    }

    /// Skips whitespace and comments.
    ///
    /// Called before lexing each token; also strips a leading UTF-8 BOM the
    /// first time it runs.
    pub fn skip_whitespace_and_comments(&mut self) {
        if !self.bom_checked {
            self.bom_checked = true;
            if self.cursor.remaining().starts_with('\u{FEFF}') {
                self.cursor.advance();
            }
        }

        loop {
            if self.cursor.is_at_end() {
                return;
            }

            match self.cursor.current_char() {
                ' ' | '\t' | '\r' | '\n' => {
                    self.cursor.advance();
                }
                '/' => {
                    let next = self.cursor.peek_char(1);
                    if next == '/' {
                        self.skip_line_comment();
                    } else if next == '*' {
                        self.skip_block_comment();
                    } else {
                        return;
                    }
                }
                _ => return,
            }
        }
    }

    /// Skips a line comment (from `//` to end of line).
    fn skip_line_comment(&mut self) {
        self.cursor.advance();
        self.cursor.advance();

        while !self.cursor.is_at_end() && self.cursor.current_char() != '\n' {
            self.cursor.advance();
        }
    }
}

#[cfg(test)]
mod tests {
    use molec_util::{Handler, Symbol};

    use crate::token::Token;

    #[test]
    fn test_skip_whitespace() {
        let mut handler = Handler::new();
        let mut lexer = crate::Lexer::new("   hello", &mut handler);
        lexer.skip_whitespace_and_comments();
        assert_eq!(lexer.next_token(), Token::Ident(Symbol::intern("hello")));
    }

    #[test]
    fn test_skip_line_comment() {
        let mut handler = Handler::new();
        let mut lexer = crate::Lexer::new("// comment\nhello", &mut handler);
        lexer.skip_whitespace_and_comments();
        assert_eq!(lexer.next_token(), Token::Ident(Symbol::intern("hello")));
    }

    #[test]
    fn test_skip_block_comment() {
        let mut handler = Handler::new();
        let mut lexer = crate::Lexer::new("/* comment */hello", &mut handler);
        lexer.skip_whitespace_and_comments();
        assert_eq!(lexer.next_token(), Token::Ident(Symbol::intern("hello")));
    }

    #[test]
    fn test_block_comment_does_not_nest() {
        let mut handler = Handler::new();
        let mut lexer = crate::Lexer::new("/* outer /* inner */ still_source */", &mut handler);
        lexer.skip_whitespace_and_comments();
        // The first `*/` closes the comment, leaving the rest as source.
        assert_eq!(
            lexer.next_token(),
            Token::Ident(Symbol::intern("still_source"))
        );
    }

    #[test]
    fn test_unterminated_block_comment_reports_error() {
        let mut handler = Handler::new();
        let mut lexer = crate::Lexer::new("/* never closed", &mut handler);
        lexer.skip_whitespace_and_comments();
        assert!(handler.has_errors());
    }

    #[test]
    fn test_leading_bom_is_skipped() {
        let mut handler = Handler::new();
        let mut lexer = crate::Lexer::new("\u{FEFF}hello", &mut handler);
        assert_eq!(lexer.next_token(), Token::Ident(Symbol::intern("hello")));
    }
}
