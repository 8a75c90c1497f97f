//! molec-lex - Lexical Analyzer (Lexer/Tokenizer)
//!
//! ============================================================================
//! LEXICAL ANALYSIS THEORY
//! ============================================================================
//!
//! Lexical analysis is the first phase of compilation after the reader. It
//! transforms a stream of characters into a stream of tokens. This process
//! is also called "tokenization" or "scanning".
//!
//! FORMAL DEFINITION:
//! ------------------
//! Let Σ be the alphabet (set of all valid characters).
//! Let Σ* be the set of all strings over Σ.
//!
//! The lexer is a function:
//!   L: Σ* → T*
//! where T is the set of tokens.
//!
//! PROPERTIES:
//! -----------
//! - Linear time complexity: O(n) where n = input length
//! - Single-pass processing
//! - Context-free (doesn't consider surrounding tokens)
//!
//! LEXEME vs TOKEN:
//! ----------------
//! - Lexeme: the actual string of characters (e.g. "let", "123", "+")
//! - Token: the abstract category plus any recovered value (e.g. `Token::Let`,
//!   `Token::U32Literal(123)`)
//!
//! ```text
//! Source: "let x = 42;"
//! Lexemes:  "let", " ", "x", " ", "=", " ", "42", ";"
//! Tokens:   [Let] [Ident("x")] [Eq] [U32Literal(42)] [Semicolon] [Eof]
//! ```
//!
//! ============================================================================
//! TOKEN CATEGORIES
//! ============================================================================
//!
//! 1. KEYWORDS: `fn extern let return mut const if else while match continue
//!    break as true false` plus the type keywords `u32 i32 f64 bool char str`.
//!    `main` is a reserved identifier, not a keyword.
//! 2. IDENTIFIERS: any Unicode-letter-or-`_`-started run of letters, digits,
//!    and `_`. A lone `_` lexes as the placeholder token instead.
//! 3. LITERALS: decimal integers (`U32Literal`, a u64 payload with overflow
//!    past `u32::MAX` reported as a warning rather than an error), decimal
//!    floats with no exponent syntax (`F64Literal`), strings and characters
//!    with a small escape set (no raw strings, no `\u{...}`).
//! 4. OPERATORS AND PUNCTUATION: arithmetic, bitwise, shift, comparison,
//!    assignment, and the exponent operator `^^`.
//!
//! Comments come in two flavors: `//` line comments and `/* */` block
//! comments. Block comments do not nest.
//!
//! This crate assumes its input has already passed through
//! [`reader::normalize_newlines`] (or [`reader::read_file`]), so the lexer
//! itself only ever sees `\n` as a line terminator.

pub mod config;
pub mod cursor;
#[cfg(test)]
mod edge_cases;
mod lexer;
pub mod reader;
pub mod token;
pub mod unicode;

pub use config::LexerConfig;
pub use cursor::Cursor;
pub use lexer::Lexer;
pub use reader::{read_file, ReaderError};
pub use token::Token;

#[cfg(test)]
mod tests {
    use molec_util::{Handler, Symbol};

    use super::*;

    fn tokenize(source: &str) -> Vec<Token> {
        let mut handler = Handler::new();
        let lexer = Lexer::new(source, &mut handler);
        lexer.collect()
    }

    #[test]
    fn test_empty_source() {
        assert_eq!(tokenize(""), vec![]);
    }

    #[test]
    fn test_let_statement() {
        assert_eq!(
            tokenize("let x: u32 = 42;"),
            vec![
                Token::Let,
                Token::Ident(Symbol::intern("x")),
                Token::Colon,
                Token::TyU32,
                Token::Eq,
                Token::U32Literal(42),
                Token::Semicolon,
            ]
        );
    }

    #[test]
    fn test_function_signature() {
        assert_eq!(
            tokenize("fn main() => u32 {"),
            vec![
                Token::Fn,
                Token::Ident(Symbol::intern("main")),
                Token::LParen,
                Token::RParen,
                Token::FatArrow,
                Token::TyU32,
                Token::LBrace,
            ]
        );
    }

    #[test]
    fn test_skips_comments() {
        assert_eq!(
            tokenize("// leading\nlet x = 1; /* trailing */"),
            vec![
                Token::Let,
                Token::Ident(Symbol::intern("x")),
                Token::Eq,
                Token::U32Literal(1),
                Token::Semicolon,
            ]
        );
    }

    #[test]
    fn test_lambda_call_marker_tokens() {
        assert_eq!(
            tokenize("f@(_, ...)"),
            vec![
                Token::Ident(Symbol::intern("f")),
                Token::At,
                Token::LParen,
                Token::Underscore,
                Token::Comma,
                Token::DotDotDot,
                Token::RParen,
            ]
        );
    }

    #[test]
    fn test_exponent_and_shift_operators_are_distinct() {
        assert_eq!(
            tokenize("a ^^ b << c"),
            vec![
                Token::Ident(Symbol::intern("a")),
                Token::CaretCaret,
                Token::Ident(Symbol::intern("b")),
                Token::Shl,
                Token::Ident(Symbol::intern("c")),
            ]
        );
    }
}
