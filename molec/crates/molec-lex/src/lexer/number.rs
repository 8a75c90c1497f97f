//! Number literal lexing.
//!
//! Mole has no hexadecimal, binary, octal, or exponent syntax: an integer
//! is a run of decimal digits, and a float additionally has a `.` followed
//! by digits (or an integer part of zero digits, e.g. `.5`).

use molec_util::diagnostic::W_LEXER_INTEGER_OVERFLOW;
use molec_util::{DiagnosticBuilder, Phase, Span};

use crate::token::Token;
use crate::Lexer;

impl<'a> Lexer<'a> {
    /// Lexes a decimal integer or floating-point literal.
    ///
    /// Integer digits are accumulated with wrapping arithmetic so a literal
    /// longer than 64 bits keeps its low 64 bits rather than panicking;
    /// exceeding `u32::MAX` (the language's only integer width) is reported
    /// as a warning, not an error.
    pub fn lex_number(&mut self) -> Token {
        let start = self.cursor.position();
        let mut int_value: u64 = 0;
        let mut digit_count = 0usize;

        while self.cursor.current_char().is_ascii_digit() {
            let digit = self.cursor.current_char() as u64 - '0' as u64;
            int_value = int_value.wrapping_mul(10).wrapping_add(digit);
            digit_count += 1;
            self.cursor.advance();
        }

        let is_float =
            self.cursor.current_char() == '.' && self.cursor.peek_char(1).is_ascii_digit();

        if !is_float {
            if digit_count == 0 {
                // `lex_dot` only calls us when a digit follows `.`, so this
                // path is only reachable from a stray leading digit dispatch.
                self.report_error("expected a digit".to_string());
                return Token::Invalid(self.cursor.slice_from(start).to_string());
            }

            if int_value > u32::MAX as u64 {
                let span = Span::new(
                    start,
                    self.cursor.position(),
                    self.cursor.line(),
                    self.cursor.column(),
                );
                DiagnosticBuilder::warning(format!(
                    "integer literal '{}' overflows u32, low bits kept",
                    self.cursor.slice_from(start)
                ))
                .phase(Phase::Lexer)
                .code(W_LEXER_INTEGER_OVERFLOW)
                .span(span)
                .emit(self.handler);
            }

            return Token::U32Literal(int_value);
        }

        self.cursor.advance(); // '.'
        while self.cursor.current_char().is_ascii_digit() {
            self.cursor.advance();
        }

        let text = self.cursor.slice_from(start);
        match text.parse::<f64>() {
            Ok(value) => Token::F64Literal(value),
            Err(e) => {
                self.report_error(format!("invalid floating point literal '{}': {}", text, e));
                Token::Invalid(text.to_string())
            }
        }
    }
}
