//! Identifier and keyword lexing.

use crate::token::{keyword_from_ident, Token};
use crate::unicode::is_ascii_ident_continue;
use crate::Lexer;
use molec_util::Symbol;

impl<'a> Lexer<'a> {
    /// Lexes an identifier or keyword.
    ///
    /// Identifiers start with a letter, underscore, or a non-ASCII
    /// alphabetic character, and continue with alphanumerics or
    /// underscores. A match against the keyword table takes precedence
    /// over treating the text as a plain identifier.
    pub fn lex_identifier(&mut self) -> Token {
        while is_ascii_ident_continue(self.cursor.current_char())
            || (self.cursor.current_char().is_alphanumeric() && !self.cursor.current_char().is_ascii())
        {
            self.cursor.advance();
        }

        let text = self.cursor.slice_from(self.token_start);
        let length = text.chars().count();
        if length > self.config.max_identifier_length {
            self.report_error(format!(
                "identifier '{}' exceeds the maximum length of {} characters",
                text, self.config.max_identifier_length
            ));
        }

        keyword_from_ident(text).unwrap_or_else(|| Token::Ident(Symbol::intern(text)))
    }
}
