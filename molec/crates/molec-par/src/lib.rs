//! molec-par - Parser (Syntactic Analyzer)
//!
//! ============================================================================
//! PARSING THEORY
//! ============================================================================
//!
//! Parsing determines the grammatical structure of a token stream according
//! to a context-free grammar and produces an Abstract Syntax Tree.
//!
//! This parser is recursive descent with Pratt-style (top-down operator
//! precedence) expression parsing:
//!
//! - Each grammar production (`VarDecl`, `If`, `Match`, ...) is one method.
//! - Expressions climb a binding-power table instead of one method per
//!   precedence level, which is the usual shape for a grammar with this many
//!   operators.
//!
//! ```ebnf
//! program    = { global | extern | fn_def } ;
//! global     = "let" ["mut"] ident [":" type] ["=" expr] ";" ;
//! extern     = "extern" ident "(" [param {"," param}] ")" ["=>" type] ";" ;
//! fn_def     = "fn" ["const"] ident "(" [param {"," param}] ")" ["=>" type] block ;
//! param      = ident ":" type ;
//! ```
//!
//! BINDING POWER TABLE (lowest to highest, all left-associative except `^^`):
//!
//! | Level | Operators                         |
//! |-------|------------------------------------|
//! | 10    | `\|\|`                             |
//! | 15    | `&&`                               |
//! | 20    | `== != < <= > >=`                  |
//! | 25    | `\|`                               |
//! | 30    | `^`                                |
//! | 35    | `&`                                |
//! | 40    | `<< >>`                            |
//! | 45    | `+ -`                              |
//! | 50    | `* / %`                            |
//! | 55    | `^^` (right-associative)           |
//!
//! Prefix operators (`! ~ - ++ -- & &mut *`) and the postfix chain
//! (call, lambda-call, index, cast) bind tighter than every entry above.
//!
//! ERROR RECOVERY
//! --------------
//! A statement that fails to parse is recorded as a diagnostic, and the
//! parser skips forward to the next `;` or `}` (or a top-level `fn extern
//! let` keyword) before resuming, so one bad statement does not cascade
//! into unrelated errors later in the file.

mod ast;
mod expr;
mod items;
mod stmt;
mod types;

#[cfg(test)]
mod edge_cases;

pub use ast::*;

use molec_lex::Token;
use molec_util::{DiagnosticBuilder, Handler, Phase, Span};
use molec_util::diagnostic::{E_PARSER_EXPECTED_TOKEN, E_PARSER_UNEXPECTED_EOF, E_PARSER_UNEXPECTED_TOKEN};

/// A token paired with the span of source text it came from.
#[derive(Clone, Debug, PartialEq)]
pub struct TokenWithSpan {
    pub token: Token,
    pub span: Span,
}

impl TokenWithSpan {
    pub fn new(token: Token, span: Span) -> Self {
        Self { token, span }
    }
}

/// Recursive-descent parser over a pre-lexed token stream.
pub struct Parser<'a> {
    tokens: Vec<TokenWithSpan>,
    pos: usize,
    handler: &'a Handler,
}

impl<'a> Parser<'a> {
    /// Builds a parser from a token/span stream (see [`crate::lex_all`] in
    /// tests, or drive `molec_lex::Lexer` + `Lexer::token_span` directly).
    pub fn from_tokens(tokens: Vec<TokenWithSpan>, handler: &'a Handler) -> Self {
        Self { tokens, pos: 0, handler }
    }

    /// Parses a whole compilation unit.
    pub fn parse_program(&mut self) -> Program {
        let mut globals = Vec::new();
        let mut functions = Vec::new();
        let mut externs = Vec::new();

        while !self.is_at_end() {
            match self.current() {
                Token::Let => {
                    if let Some(decl) = self.parse_global() {
                        globals.push(decl);
                    } else {
                        self.recover_to_sync_point();
                    }
                }
                Token::Extern => {
                    if let Some(decl) = self.parse_extern() {
                        externs.push(decl);
                    } else {
                        self.recover_to_sync_point();
                    }
                }
                Token::Fn => {
                    if let Some(def) = self.parse_fn_def() {
                        functions.push(def);
                    } else {
                        self.recover_to_sync_point();
                    }
                }
                _ => {
                    self.error("expected 'let', 'extern', or 'fn'".to_string());
                    self.recover_to_sync_point();
                }
            }
        }

        Program { globals, functions, externs }
    }

    fn current(&self) -> Token {
        self.tokens.get(self.pos).map(|t| t.token.clone()).unwrap_or(Token::Eof)
    }

    fn peek(&self, offset: usize) -> Token {
        self.tokens.get(self.pos + offset).map(|t| t.token.clone()).unwrap_or(Token::Eof)
    }

    fn current_span(&self) -> Span {
        self.tokens.get(self.pos).map(|t| t.span).unwrap_or(Span::DUMMY)
    }

    /// The span of the token just consumed by the most recent `advance`.
    fn prev_span(&self) -> Span {
        if self.pos == 0 {
            self.current_span()
        } else {
            self.tokens.get(self.pos - 1).map(|t| t.span).unwrap_or(Span::DUMMY)
        }
    }

    /// Merges `start` with the span of the last consumed token, for
    /// constructing the span of a just-finished production.
    fn span_from_start(&self, start: Span) -> Span {
        start.merge(self.prev_span())
    }

    fn is_at_end(&self) -> bool {
        matches!(self.current(), Token::Eof)
    }

    fn advance(&mut self) -> Token {
        let tok = self.current();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn match_token(&mut self, expected: &Token) -> bool {
        if &self.current() == expected {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: Token) -> Option<Span> {
        if self.current() == expected {
            let span = self.current_span();
            self.advance();
            Some(span)
        } else {
            let found = self.current();
            self.error_coded(
                format!("expected {:?}, found {:?}", expected, found),
                E_PARSER_EXPECTED_TOKEN,
            );
            None
        }
    }

    fn error(&mut self, message: String) {
        let code = if self.is_at_end() {
            E_PARSER_UNEXPECTED_EOF
        } else {
            E_PARSER_UNEXPECTED_TOKEN
        };
        self.error_coded(message, code);
    }

    fn error_coded(&mut self, message: String, code: molec_util::diagnostic::DiagnosticCode) {
        DiagnosticBuilder::error(message)
            .phase(Phase::Parser)
            .code(code)
            .span(self.current_span())
            .emit(self.handler);
    }

    /// Skips to the next statement terminator or a top-level keyword, so a
    /// single malformed statement does not cascade into the rest of the file.
    fn recover_to_sync_point(&mut self) {
        loop {
            match self.current() {
                Token::Eof => return,
                Token::Semicolon => {
                    self.advance();
                    return;
                }
                Token::RBrace | Token::Fn | Token::Extern | Token::Let => return,
                _ => {
                    self.advance();
                }
            }
        }
    }
}
