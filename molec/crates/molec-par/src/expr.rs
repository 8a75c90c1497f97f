//! Expression parsing via precedence climbing (Pratt parsing).
//!
//! Binary operators are tried in [`infix_binding_power`]; everything tighter
//! than the operator table (unary prefixes, calls, lambda calls, indexing,
//! casts) is handled in [`Parser::parse_prefix`] and its postfix loop.

use molec_lex::Token;
use molec_util::Span;

use crate::ast::{BinOp, Expr, LambdaArg, UnOp};
use crate::Parser;

/// Binding power one above the tightest binary operator (`^^`), so a prefix
/// operator's operand never swallows a following binary operator it
/// shouldn't.
const PREFIX_BP: u8 = 60;

impl<'a> Parser<'a> {
    pub(crate) fn parse_expr(&mut self) -> Option<Expr> {
        self.parse_expr_bp(0)
    }

    fn parse_expr_bp(&mut self, min_bp: u8) -> Option<Expr> {
        let mut lhs = self.parse_prefix()?;

        loop {
            let (op, lbp, rbp) = match self.infix_binding_power() {
                Some(t) if t.1 >= min_bp => t,
                _ => break,
            };
            let start = lhs.span();
            self.advance();
            let rhs = self.parse_expr_bp(rbp)?;
            let span = start.merge(rhs.span());
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs), span);
            let _ = lbp;
        }

        Some(lhs)
    }

    /// Returns `(op, left_bp, right_bp)` for the current token, if it is a
    /// binary operator. Left-associative operators use `right_bp = left_bp +
    /// 1`; the lone right-associative operator (`^^`) uses `right_bp =
    /// left_bp`.
    fn infix_binding_power(&self) -> Option<(BinOp, u8, u8)> {
        let (op, bp, right_assoc) = match self.current() {
            Token::PipePipe => (BinOp::Or, 10, false),
            Token::AmpAmp => (BinOp::And, 15, false),
            Token::EqEq => (BinOp::Eq, 20, false),
            Token::NotEq => (BinOp::Neq, 20, false),
            Token::Gt => (BinOp::Gt, 20, false),
            Token::GtEq => (BinOp::Ge, 20, false),
            Token::Lt => (BinOp::Lt, 20, false),
            Token::LtEq => (BinOp::Le, 20, false),
            Token::Pipe => (BinOp::BitOr, 25, false),
            Token::Caret => (BinOp::BitXor, 30, false),
            Token::Amp => (BinOp::BitAnd, 35, false),
            Token::Shl => (BinOp::Shl, 40, false),
            Token::Shr => (BinOp::Shr, 40, false),
            Token::Plus => (BinOp::Add, 45, false),
            Token::Minus => (BinOp::Sub, 45, false),
            Token::Star => (BinOp::Mul, 50, false),
            Token::Slash => (BinOp::Div, 50, false),
            Token::Percent => (BinOp::Mod, 50, false),
            Token::CaretCaret => (BinOp::Exp, 55, true),
            _ => return None,
        };
        let rbp = if right_assoc { bp } else { bp + 1 };
        Some((op, bp, rbp))
    }

    fn parse_prefix(&mut self) -> Option<Expr> {
        let start = self.current_span();
        match self.current() {
            Token::Bang => self.parse_unary(UnOp::Not, start),
            Token::Tilde => self.parse_unary(UnOp::BitNot, start),
            Token::Minus => self.parse_unary(UnOp::Neg, start),
            Token::PlusPlus => self.parse_unary(UnOp::Inc, start),
            Token::MinusMinus => self.parse_unary(UnOp::Dec, start),
            Token::Star => self.parse_unary(UnOp::Deref, start),
            Token::Amp => {
                self.advance();
                let op = if self.match_token(&Token::Mut) { UnOp::MutRef } else { UnOp::Ref };
                let operand = self.parse_expr_bp(PREFIX_BP)?;
                let span = start.merge(operand.span());
                Some(Expr::Unary(op, Box::new(operand), span))
            }
            _ => self.parse_postfix(),
        }
    }

    fn parse_unary(&mut self, op: UnOp, start: Span) -> Option<Expr> {
        self.advance();
        let operand = self.parse_expr_bp(PREFIX_BP)?;
        let span = start.merge(operand.span());
        Some(Expr::Unary(op, Box::new(operand), span))
    }

    fn parse_postfix(&mut self) -> Option<Expr> {
        let mut expr = self.parse_atom()?;

        loop {
            expr = match self.current() {
                Token::LParen => self.parse_call(expr)?,
                Token::At if self.peek(1) == Token::LParen => self.parse_lambda_call(expr)?,
                Token::LBracket => self.parse_index(expr)?,
                Token::As => self.parse_cast(expr)?,
                _ => break,
            };
        }

        Some(expr)
    }

    fn parse_atom(&mut self) -> Option<Expr> {
        let span = self.current_span();
        match self.current() {
            Token::Ident(sym) => {
                self.advance();
                Some(Expr::Variable(sym, span))
            }
            Token::U32Literal(n) => {
                self.advance();
                Some(Expr::U32Literal(n, span))
            }
            Token::F64Literal(f) => {
                self.advance();
                Some(Expr::F64Literal(f, span))
            }
            Token::StringLiteral(sym) => {
                self.advance();
                Some(Expr::StringLiteral(sym, span))
            }
            Token::CharLiteral(c) => {
                self.advance();
                Some(Expr::CharLiteral(c, span))
            }
            Token::True => {
                self.advance();
                Some(Expr::BoolLiteral(true, span))
            }
            Token::False => {
                self.advance();
                Some(Expr::BoolLiteral(false, span))
            }
            Token::LParen => {
                self.advance();
                let inner = self.parse_expr()?;
                self.expect(Token::RParen)?;
                Some(inner)
            }
            _ => {
                self.error(format!("expected an expression, found {:?}", self.current()));
                None
            }
        }
    }

    fn parse_call(&mut self, callee: Expr) -> Option<Expr> {
        self.expect(Token::LParen)?;
        let mut args = Vec::new();
        if self.current() != Token::RParen {
            loop {
                args.push(self.parse_expr()?);
                if !self.match_token(&Token::Comma) {
                    break;
                }
            }
        }
        let end = self.expect(Token::RParen)?;
        let span = callee.span().merge(end);
        Some(Expr::Call(Box::new(callee), args, span))
    }

    /// `callee@(arg, _, ...)`: a lambda call with holes and an optional
    /// trailing `...` marking a variadic tail.
    fn parse_lambda_call(&mut self, callee: Expr) -> Option<Expr> {
        self.expect(Token::At)?;
        self.expect(Token::LParen)?;

        let mut args = Vec::new();
        let mut is_ellipsis = false;
        if self.current() != Token::RParen {
            loop {
                if self.current() == Token::DotDotDot {
                    self.advance();
                    is_ellipsis = true;
                    break;
                }
                if self.match_token(&Token::Underscore) {
                    args.push(LambdaArg::Hole);
                } else {
                    args.push(LambdaArg::Value(self.parse_expr()?));
                }
                if !self.match_token(&Token::Comma) {
                    break;
                }
            }
        }

        let end = self.expect(Token::RParen)?;
        let span = callee.span().merge(end);
        Some(Expr::LambdaCall(Box::new(callee), args, is_ellipsis, span))
    }

    fn parse_index(&mut self, base: Expr) -> Option<Expr> {
        self.expect(Token::LBracket)?;
        let index = self.parse_expr()?;
        let end = self.expect(Token::RBracket)?;
        let span = base.span().merge(end);
        Some(Expr::Index(Box::new(base), Box::new(index), span))
    }

    fn parse_cast(&mut self, expr: Expr) -> Option<Expr> {
        self.expect(Token::As)?;
        let ty_start = self.current_span();
        let ty = self.parse_type()?;
        let span = expr.span().merge(self.span_from_start(ty_start));
        Some(Expr::Cast(Box::new(expr), ty, span))
    }
}
