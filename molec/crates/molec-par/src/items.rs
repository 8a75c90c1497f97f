//! Top-level item parsing: globals, externs, function definitions.
//!
//! ```ebnf
//! global  = "let" ["mut"] ident [":" type] ["=" expr] ";" ;
//! extern  = "extern" ident "(" [param {"," param}] ")" ["=>" type] ";" ;
//! fn_def  = "fn" ["const"] ident "(" [param {"," param}] ")" ["=>" type] block ;
//! param   = ident ":" type ;
//! ```

use molec_lex::Token;
use molec_util::Symbol;

use crate::ast::{ExternDecl, FuncDef, Param, Stmt, VarDecl};
use crate::Parser;

impl<'a> Parser<'a> {
    pub(crate) fn parse_global(&mut self) -> Option<VarDecl> {
        let start = self.current_span();
        self.expect(Token::Let)?;
        let is_mut = self.match_token(&Token::Mut);
        let name = self.parse_ident()?;
        let ty = if self.match_token(&Token::Colon) { Some(self.parse_type()?) } else { None };
        let init = if self.match_token(&Token::Eq) { Some(self.parse_expr()?) } else { None };
        self.expect(Token::Semicolon)?;
        Some(VarDecl { name, ty, init, is_mut, span: self.span_from_start(start) })
    }

    pub(crate) fn parse_extern(&mut self) -> Option<ExternDecl> {
        let start = self.current_span();
        self.expect(Token::Extern)?;
        let name = self.parse_ident()?;
        let params = self.parse_param_list()?;
        let ret_type = self.parse_optional_return_type()?;
        self.expect(Token::Semicolon)?;
        Some(ExternDecl { name, params, ret_type, span: self.span_from_start(start) })
    }

    pub(crate) fn parse_fn_def(&mut self) -> Option<FuncDef> {
        let start = self.current_span();
        self.expect(Token::Fn)?;
        let is_const = self.match_token(&Token::Const);
        let name = self.parse_ident()?;
        let params = self.parse_param_list()?;
        let ret_type = self.parse_optional_return_type()?;
        let body = match self.parse_block()? {
            Stmt::Block(stmts, _) => stmts,
            _ => unreachable!("parse_block always returns Stmt::Block"),
        };
        Some(FuncDef { name, params, ret_type, body, is_const, span: self.span_from_start(start) })
    }

    fn parse_ident(&mut self) -> Option<Symbol> {
        match self.current() {
            Token::Ident(sym) => {
                self.advance();
                Some(sym)
            }
            _ => {
                self.error(format!("expected an identifier, found {:?}", self.current()));
                None
            }
        }
    }

    fn parse_param_list(&mut self) -> Option<Vec<Param>> {
        self.expect(Token::LParen)?;
        let mut params = Vec::new();
        if self.current() != Token::RParen {
            loop {
                params.push(self.parse_param()?);
                if !self.match_token(&Token::Comma) {
                    break;
                }
            }
        }
        self.expect(Token::RParen)?;
        Some(params)
    }

    fn parse_param(&mut self) -> Option<Param> {
        let start = self.current_span();
        let name = self.parse_ident()?;
        self.expect(Token::Colon)?;
        let ty = self.parse_type()?;
        Some(Param { name, ty, span: self.span_from_start(start) })
    }

    fn parse_optional_return_type(&mut self) -> Option<Option<crate::ast::Type>> {
        if self.match_token(&Token::FatArrow) {
            Some(Some(self.parse_type()?))
        } else {
            Some(None)
        }
    }
}
