//! Type expression parsing.
//!
//! ```ebnf
//! type     = fn_type | ref_spec base_type ;
//! fn_type  = "fn" ["const"] "(" [type {"," type}] ")" ["=>" type] ;
//! ref_spec = ε | "&" | "&" "mut" ;
//! base     = "u32" | "i32" | "f64" | "bool" | "char" | "str" ;
//! ```

use molec_lex::Token;

use crate::ast::{BaseKind, FunctionType, RefKind, SimpleType, Type};
use crate::Parser;

impl<'a> Parser<'a> {
    pub(crate) fn parse_type(&mut self) -> Option<Type> {
        if self.current() == Token::Fn {
            return self.parse_fn_type();
        }

        let reference = self.parse_ref_spec();
        let kind = self.parse_base_kind()?;
        Some(Type::Simple(SimpleType { kind, reference }))
    }

    fn parse_ref_spec(&mut self) -> RefKind {
        if self.match_token(&Token::Amp) {
            if self.match_token(&Token::Mut) {
                RefKind::MutRef
            } else {
                RefKind::Ref
            }
        } else {
            RefKind::NonRef
        }
    }

    fn parse_base_kind(&mut self) -> Option<BaseKind> {
        let kind = match self.current() {
            Token::TyU32 => BaseKind::U32,
            Token::TyI32 => BaseKind::I32,
            Token::TyF64 => BaseKind::F64,
            Token::TyBool => BaseKind::Bool,
            Token::TyChar => BaseKind::Char,
            Token::TyStr => BaseKind::Str,
            _ => {
                self.error(format!("expected a type, found {:?}", self.current()));
                return None;
            }
        };
        self.advance();
        Some(kind)
    }

    fn parse_fn_type(&mut self) -> Option<Type> {
        self.expect(Token::Fn)?;
        let is_const = self.match_token(&Token::Const);

        self.expect(Token::LParen)?;
        let mut params = Vec::new();
        if self.current() != Token::RParen {
            loop {
                params.push(self.parse_type()?);
                if !self.match_token(&Token::Comma) {
                    break;
                }
            }
        }
        self.expect(Token::RParen)?;

        let ret = if self.match_token(&Token::FatArrow) {
            Some(Box::new(self.parse_type()?))
        } else {
            None
        };

        Some(Type::Function(FunctionType { params, ret, is_const }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TokenWithSpan;
    use molec_lex::Lexer;
    use molec_util::Handler;

    fn parse_type_source(source: &str) -> (Option<Type>, Handler) {
        let mut handler = Handler::new();
        let tokens = {
            let mut lexer = Lexer::new(source, &mut handler);
            let mut tokens = Vec::new();
            loop {
                let token = lexer.next_token();
                let span = lexer.token_span();
                if token == Token::Eof {
                    break;
                }
                tokens.push(TokenWithSpan::new(token, span));
            }
            tokens
        };
        let mut parser = Parser::from_tokens(tokens, &handler);
        let ty = parser.parse_type();
        (ty, handler)
    }

    #[test]
    fn test_base_types() {
        for (src, kind) in [
            ("u32", BaseKind::U32),
            ("i32", BaseKind::I32),
            ("f64", BaseKind::F64),
            ("bool", BaseKind::Bool),
            ("char", BaseKind::Char),
            ("str", BaseKind::Str),
        ] {
            let (ty, handler) = parse_type_source(src);
            assert!(!handler.has_errors());
            assert_eq!(
                ty,
                Some(Type::Simple(SimpleType { kind, reference: RefKind::NonRef }))
            );
        }
    }

    #[test]
    fn test_reference_type() {
        let (ty, handler) = parse_type_source("&str");
        assert!(!handler.has_errors());
        assert_eq!(
            ty,
            Some(Type::Simple(SimpleType { kind: BaseKind::Str, reference: RefKind::Ref }))
        );
    }

    #[test]
    fn test_mut_reference_type() {
        let (ty, handler) = parse_type_source("&mut i32");
        assert!(!handler.has_errors());
        assert_eq!(
            ty,
            Some(Type::Simple(SimpleType { kind: BaseKind::I32, reference: RefKind::MutRef }))
        );
    }

    #[test]
    fn test_fn_type_no_params_no_return() {
        let (ty, handler) = parse_type_source("fn()");
        assert!(!handler.has_errors());
        assert_eq!(
            ty,
            Some(Type::Function(FunctionType { params: vec![], ret: None, is_const: false }))
        );
    }

    #[test]
    fn test_fn_type_with_params_and_return() {
        let (ty, handler) = parse_type_source("fn(u32, &str) => bool");
        assert!(!handler.has_errors());
        match ty {
            Some(Type::Function(f)) => {
                assert_eq!(f.params.len(), 2);
                assert!(!f.is_const);
                assert!(f.ret.is_some());
            }
            _ => panic!("expected function type"),
        }
    }

    #[test]
    fn test_const_fn_type() {
        let (ty, handler) = parse_type_source("fn const(f64) => f64");
        assert!(!handler.has_errors());
        match ty {
            Some(Type::Function(f)) => assert!(f.is_const),
            _ => panic!("expected function type"),
        }
    }

    #[test]
    fn test_no_reference_of_reference() {
        // '&&i32' lexes as a single AmpAmp token, so this is simply not
        // parseable as a reference type at all (there is no '&(&i32)' form).
        let (ty, handler) = parse_type_source("&&i32");
        assert!(ty.is_none() || handler.has_errors());
    }
}
