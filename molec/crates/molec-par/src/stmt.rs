//! Statement parsing: blocks, declarations, control flow, assignment.
//!
//! ```ebnf
//! stmt    = block | "return" [expr] ";" | "continue" ";" | "break" ";"
//!         | local | while | if | match | assign_or_expr ;
//! block   = "{" { stmt } "}" ;
//! local   = "let" ["mut"] ident [":" type] ["=" expr] ";" ;
//! while   = "while" expr block ;
//! if      = "if" expr block ["else" (if | block)] ;
//! match   = "match" expr "{" { arm } "}" ;
//! arm     = (expr {"," expr} | "else") "=>" stmt ;
//! ```

use molec_lex::Token;

use crate::ast::{AssignOp, MatchArm, Stmt, VarDecl};
use crate::Parser;

impl<'a> Parser<'a> {
    pub(crate) fn parse_stmt(&mut self) -> Option<Stmt> {
        match self.current() {
            Token::LBrace => self.parse_block(),
            Token::Return => self.parse_return(),
            Token::Continue => {
                let span = self.current_span();
                self.advance();
                self.expect(Token::Semicolon)?;
                Some(Stmt::Continue(span))
            }
            Token::Break => {
                let span = self.current_span();
                self.advance();
                self.expect(Token::Semicolon)?;
                Some(Stmt::Break(span))
            }
            Token::Let => self.parse_local().map(Stmt::VarDecl),
            Token::While => self.parse_while(),
            Token::If => self.parse_if(),
            Token::Match => self.parse_match(),
            _ => self.parse_assign_or_expr_stmt(),
        }
    }

    pub(crate) fn parse_block(&mut self) -> Option<Stmt> {
        let start = self.current_span();
        self.expect(Token::LBrace)?;
        let mut stmts = Vec::new();
        while self.current() != Token::RBrace && self.current() != Token::Eof {
            match self.parse_stmt() {
                Some(stmt) => stmts.push(stmt),
                None => self.recover_to_sync_point(),
            }
        }
        self.expect(Token::RBrace)?;
        Some(Stmt::Block(stmts, self.span_from_start(start)))
    }

    fn parse_return(&mut self) -> Option<Stmt> {
        let start = self.current_span();
        self.expect(Token::Return)?;
        let value = if self.current() == Token::Semicolon { None } else { Some(self.parse_expr()?) };
        self.expect(Token::Semicolon)?;
        Some(Stmt::Return(value, self.span_from_start(start)))
    }

    fn parse_local(&mut self) -> Option<VarDecl> {
        let start = self.current_span();
        self.expect(Token::Let)?;
        let is_mut = self.match_token(&Token::Mut);

        let name = match self.current() {
            Token::Ident(sym) => {
                self.advance();
                sym
            }
            _ => {
                self.error(format!("expected an identifier, found {:?}", self.current()));
                return None;
            }
        };

        let ty = if self.match_token(&Token::Colon) { Some(self.parse_type()?) } else { None };
        let init = if self.match_token(&Token::Eq) { Some(self.parse_expr()?) } else { None };
        self.expect(Token::Semicolon)?;

        Some(VarDecl { name, ty, init, is_mut, span: self.span_from_start(start) })
    }

    fn parse_while(&mut self) -> Option<Stmt> {
        let start = self.current_span();
        self.expect(Token::While)?;
        let cond = self.parse_expr()?;
        let body = self.parse_block()?;
        Some(Stmt::While(Box::new(cond), Box::new(body), self.span_from_start(start)))
    }

    fn parse_if(&mut self) -> Option<Stmt> {
        let start = self.current_span();
        self.expect(Token::If)?;
        let cond = self.parse_expr()?;
        let then_branch = self.parse_block()?;

        let else_branch = if self.match_token(&Token::Else) {
            if self.current() == Token::If {
                Some(Box::new(self.parse_if()?))
            } else {
                Some(Box::new(self.parse_block()?))
            }
        } else {
            None
        };

        Some(Stmt::If(Box::new(cond), Box::new(then_branch), else_branch, self.span_from_start(start)))
    }

    fn parse_match(&mut self) -> Option<Stmt> {
        let start = self.current_span();
        self.expect(Token::Match)?;
        let scrutinee = self.parse_expr()?;
        self.expect(Token::LBrace)?;

        let mut arms = Vec::new();
        while self.current() != Token::RBrace && self.current() != Token::Eof {
            arms.push(self.parse_match_arm()?);
        }
        self.expect(Token::RBrace)?;

        Some(Stmt::Match(Box::new(scrutinee), arms, self.span_from_start(start)))
    }

    fn parse_match_arm(&mut self) -> Option<MatchArm> {
        let start = self.current_span();

        if self.match_token(&Token::Else) {
            self.expect(Token::FatArrow)?;
            let body = self.parse_stmt()?;
            return Some(MatchArm::Else(Box::new(body), self.span_from_start(start)));
        }

        let first = self.parse_expr()?;
        if self.match_token(&Token::FatArrow) {
            let body = self.parse_stmt()?;
            return Some(MatchArm::Guard(first, Box::new(body), self.span_from_start(start)));
        }

        let mut literals = vec![first];
        while self.match_token(&Token::Comma) {
            literals.push(self.parse_expr()?);
        }
        self.expect(Token::FatArrow)?;
        let body = self.parse_stmt()?;
        Some(MatchArm::Literal(literals, Box::new(body), self.span_from_start(start)))
    }

    fn assign_op(&self) -> Option<AssignOp> {
        let op = match self.current() {
            Token::Eq => AssignOp::Normal,
            Token::PlusEq => AssignOp::Plus,
            Token::MinusEq => AssignOp::Minus,
            Token::StarEq => AssignOp::Mul,
            Token::SlashEq => AssignOp::Div,
            Token::PercentEq => AssignOp::Mod,
            Token::CaretCaretEq => AssignOp::Exp,
            Token::AmpEq => AssignOp::BitAnd,
            Token::PipeEq => AssignOp::BitOr,
            Token::CaretEq => AssignOp::BitXor,
            Token::ShlEq => AssignOp::Shl,
            Token::ShrEq => AssignOp::Shr,
            _ => return None,
        };
        Some(op)
    }

    fn parse_assign_or_expr_stmt(&mut self) -> Option<Stmt> {
        let start = self.current_span();
        let lhs = self.parse_expr()?;

        if let Some(op) = self.assign_op() {
            self.advance();
            let rhs = self.parse_expr()?;
            self.expect(Token::Semicolon)?;
            return Some(Stmt::Assign(Box::new(lhs), op, Box::new(rhs), self.span_from_start(start)));
        }

        self.expect(Token::Semicolon)?;
        Some(Stmt::ExprStmt(lhs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TokenWithSpan;
    use molec_lex::Lexer;
    use molec_util::Handler;

    fn parse_stmt_source(source: &str) -> (Option<Stmt>, Handler) {
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
        (parser.parse_stmt(), handler)
    }

    #[test]
    fn test_block() {
        let (stmt, handler) = parse_stmt_source("{ let x: u32 = 1; return x; }");
        assert!(!handler.has_errors());
        match stmt {
            Some(Stmt::Block(stmts, _)) => assert_eq!(stmts.len(), 2),
            other => panic!("expected block, got {:?}", other),
        }
    }

    #[test]
    fn test_return_with_value() {
        let (stmt, handler) = parse_stmt_source("return 1;");
        assert!(!handler.has_errors());
        assert!(matches!(stmt, Some(Stmt::Return(Some(_), _))));
    }

    #[test]
    fn test_return_without_value() {
        let (stmt, handler) = parse_stmt_source("return;");
        assert!(!handler.has_errors());
        assert!(matches!(stmt, Some(Stmt::Return(None, _))));
    }

    #[test]
    fn test_continue_and_break() {
        assert!(matches!(parse_stmt_source("continue;").0, Some(Stmt::Continue(_))));
        assert!(matches!(parse_stmt_source("break;").0, Some(Stmt::Break(_))));
    }

    #[test]
    fn test_let_with_mut_and_type() {
        let (stmt, handler) = parse_stmt_source("let mut x: i32 = -1;");
        assert!(!handler.has_errors());
        match stmt {
            Some(Stmt::VarDecl(decl)) => {
                assert!(decl.is_mut);
                assert!(decl.ty.is_some());
                assert!(decl.init.is_some());
            }
            other => panic!("expected var decl, got {:?}", other),
        }
    }

    #[test]
    fn test_let_without_init() {
        let (stmt, handler) = parse_stmt_source("let x: u32;");
        assert!(!handler.has_errors());
        match stmt {
            Some(Stmt::VarDecl(decl)) => assert!(decl.init.is_none()),
            other => panic!("expected var decl, got {:?}", other),
        }
    }

    #[test]
    fn test_while_loop() {
        let (stmt, handler) = parse_stmt_source("while x { x = x - 1; }");
        assert!(!handler.has_errors());
        assert!(matches!(stmt, Some(Stmt::While(_, _, _))));
    }

    #[test]
    fn test_if_else() {
        let (stmt, handler) = parse_stmt_source("if x { return 1; } else { return 0; }");
        assert!(!handler.has_errors());
        match stmt {
            Some(Stmt::If(_, _, Some(_), _)) => {}
            other => panic!("expected if/else, got {:?}", other),
        }
    }

    #[test]
    fn test_if_else_if_chain() {
        let (stmt, handler) =
            parse_stmt_source("if a { return 1; } else if b { return 2; } else { return 3; }");
        assert!(!handler.has_errors());
        match stmt {
            Some(Stmt::If(_, _, Some(else_branch), _)) => {
                assert!(matches!(*else_branch, Stmt::If(_, _, _, _)));
            }
            other => panic!("expected nested if, got {:?}", other),
        }
    }

    #[test]
    fn test_match_with_literal_and_else_arms() {
        let (stmt, handler) = parse_stmt_source("match x { 1, 2 => { return 1; } else => { return 0; } }");
        assert!(!handler.has_errors());
        match stmt {
            Some(Stmt::Match(_, arms, _)) => {
                assert_eq!(arms.len(), 2);
                assert!(matches!(arms[0], MatchArm::Literal(ref lits, _, _) if lits.len() == 2));
                assert!(matches!(arms[1], MatchArm::Else(_, _)));
            }
            other => panic!("expected match, got {:?}", other),
        }
    }

    #[test]
    fn test_match_with_guard_arm() {
        let (stmt, handler) = parse_stmt_source("match x { x > 0 => { return 1; } }");
        assert!(!handler.has_errors());
        match stmt {
            Some(Stmt::Match(_, arms, _)) => assert!(matches!(arms[0], MatchArm::Guard(_, _, _))),
            other => panic!("expected match, got {:?}", other),
        }
    }

    #[test]
    fn test_compound_assign() {
        let (stmt, handler) = parse_stmt_source("x += 1;");
        assert!(!handler.has_errors());
        assert!(matches!(stmt, Some(Stmt::Assign(_, AssignOp::Plus, _, _))));
    }

    #[test]
    fn test_plain_assign() {
        let (stmt, handler) = parse_stmt_source("x = 1;");
        assert!(!handler.has_errors());
        assert!(matches!(stmt, Some(Stmt::Assign(_, AssignOp::Normal, _, _))));
    }

    #[test]
    fn test_bare_expr_stmt() {
        let (stmt, handler) = parse_stmt_source("foo();");
        assert!(!handler.has_errors());
        assert!(matches!(stmt, Some(Stmt::ExprStmt(_))));
    }

    #[test]
    fn test_missing_semicolon_reports_error() {
        let (_, handler) = parse_stmt_source("return 1");
        assert!(handler.has_errors());
    }
}
