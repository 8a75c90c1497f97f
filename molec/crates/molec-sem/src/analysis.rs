//! The checking pass itself: expression typing, statement checking,
//! mutability/assignment rules, control-flow validity, purity, and
//! return-coverage.

use molec_par::{
    AssignOp, BaseKind, BinOp, Expr, ExternDecl, FuncDef, FunctionType, LambdaArg, MatchArm, Param,
    Program, RefKind, SimpleType, Stmt, Type, UnOp, VarDecl,
};
use molec_util::diagnostic::{
    DiagnosticBuilder, DiagnosticCode, Phase, E_SEMANTIC_BAD_CAST, E_SEMANTIC_BAD_MAIN,
    E_SEMANTIC_DUPLICATE_DEF, E_SEMANTIC_LOOP_CONTROL_OUTSIDE_LOOP, E_SEMANTIC_MISSING_RETURN,
    E_SEMANTIC_MUT_REQUIRED, E_SEMANTIC_NOT_ASSIGNABLE, E_SEMANTIC_PURITY_VIOLATION,
    E_SEMANTIC_TYPE_MISMATCH, E_SEMANTIC_UNDEFINED_FN, E_SEMANTIC_UNDEFINED_VAR,
    E_SEMANTIC_USE_BEFORE_INIT,
};
use molec_util::symbol::ID_MAIN;
use molec_util::{Handler, Span, Symbol};

use crate::scope::{Binding, RibId, RibKind, ScopeStack};
use crate::types::{self, simple, VarRecord};

/// Drives one semantic-checking pass over a whole [`Program`].
pub struct Checker<'a> {
    handler: &'a Handler,
    scopes: ScopeStack,
    /// Expected return type of the function currently being checked, `None`
    /// for a void function.
    return_stack: Vec<Option<Type>>,
    /// The rib entered for the nearest enclosing `const fn`'s parameters, if
    /// any — names found outside this rib are a purity violation.
    const_boundary: Vec<RibId>,
}

impl<'a> Checker<'a> {
    pub fn new(handler: &'a Handler) -> Self {
        Self { handler, scopes: ScopeStack::new(), return_stack: Vec::new(), const_boundary: Vec::new() }
    }

    pub fn check_program(&mut self, program: &Program) {
        for extern_decl in &program.externs {
            self.register_extern(extern_decl);
        }
        for func in &program.functions {
            self.register_function(func);
        }

        self.check_main_exists(program);

        for global in &program.globals {
            self.check_global(global);
        }
        for func in &program.functions {
            self.check_function_body(func);
        }
    }

    fn error(&self, message: impl Into<String>, span: Span, code: DiagnosticCode) {
        DiagnosticBuilder::error(message).phase(Phase::Semantic).code(code).span(span).emit(self.handler);
    }

    fn function_type_of(params: &[Param], ret: &Option<Type>, is_const: bool) -> FunctionType {
        FunctionType { params: params.iter().map(|p| p.ty.clone()).collect(), ret: ret.clone().map(Box::new), is_const }
    }

    fn register_extern(&mut self, decl: &ExternDecl) {
        if decl.name == ID_MAIN {
            self.error("'extern' may not be named 'main'", decl.span, E_SEMANTIC_BAD_MAIN);
            return;
        }
        if self.scopes.declared_in_current_scope(decl.name) {
            self.error(format!("'{}' is already defined", decl.name.as_str()), decl.span, E_SEMANTIC_DUPLICATE_DEF);
            return;
        }
        let ty = Self::function_type_of(&decl.params, &decl.ret_type, false);
        self.scopes.declare(decl.name, Binding::Func { ty, is_const: false });
    }

    fn register_function(&mut self, func: &FuncDef) {
        if self.scopes.declared_in_current_scope(func.name) {
            self.error(format!("'{}' is already defined", func.name.as_str()), func.span, E_SEMANTIC_DUPLICATE_DEF);
            return;
        }
        let ty = Self::function_type_of(&func.params, &func.ret_type, func.is_const);
        self.scopes.declare(func.name, Binding::Func { ty, is_const: func.is_const });
    }

    fn check_main_exists(&mut self, program: &Program) {
        let main = program.functions.iter().find(|f| f.name == ID_MAIN);
        match main {
            None => {
                let span = program.functions.first().map(|f| f.span).unwrap_or(Span::DUMMY);
                self.error("program has no 'main' function", span, E_SEMANTIC_BAD_MAIN);
            }
            Some(main) => {
                if !main.params.is_empty() {
                    self.error("'main' must take no parameters", main.span, E_SEMANTIC_BAD_MAIN);
                }
                let ok_ret = main.ret_type.is_none() || main.ret_type == Some(simple(BaseKind::U32));
                if !ok_ret {
                    self.error("'main' must return nothing or 'u32'", main.span, E_SEMANTIC_BAD_MAIN);
                }
            }
        }

        for global in &program.globals {
            if global.name == ID_MAIN {
                self.error("'main' may not be used as a variable name", global.span, E_SEMANTIC_BAD_MAIN);
            }
        }
    }

    fn check_global(&mut self, decl: &VarDecl) {
        if decl.name == ID_MAIN {
            return; // already reported by check_main_exists
        }
        if self.scopes.declared_in_current_scope(decl.name) {
            self.error(format!("'{}' is already defined", decl.name.as_str()), decl.span, E_SEMANTIC_DUPLICATE_DEF);
        }
        let record = self.check_var_decl_common(decl);
        self.scopes.declare(decl.name, Binding::Var(record));
    }

    fn check_function_body(&mut self, func: &FuncDef) {
        let boundary = self.scopes.enter(RibKind::Function);
        if func.is_const {
            self.const_boundary.push(boundary);
        }
        self.return_stack.push(func.ret_type.clone());

        for param in &func.params {
            self.scopes
                .declare(param.name, Binding::Var(VarRecord { ty: param.ty.clone(), is_mut: false, is_initialized: true }));
        }

        let covers = self.check_block(&func.body);
        if func.ret_type.is_some() && !covers {
            self.error(
                format!("function '{}' does not return a value on every path", func.name.as_str()),
                func.span,
                E_SEMANTIC_MISSING_RETURN,
            );
        }

        self.return_stack.pop();
        if func.is_const {
            self.const_boundary.pop();
        }
        self.scopes.exit();
    }

    /// Checks a `let` declaration's type/initializer, independent of
    /// whether it ends up a global or a local — returns the resulting
    /// record without declaring it (the caller decides scope).
    fn check_var_decl_common(&mut self, decl: &VarDecl) -> VarRecord {
        let init_ty = decl.init.as_ref().map(|e| self.check_expr(e));

        let ty = match (&decl.ty, &init_ty) {
            (Some(declared), Some(inferred)) => {
                if declared != inferred {
                    self.error(
                        format!("'{}' declared as {:?} but initialized with {:?}", decl.name.as_str(), declared, inferred),
                        decl.span,
                        E_SEMANTIC_TYPE_MISMATCH,
                    );
                }
                declared.clone()
            }
            (Some(declared), None) => declared.clone(),
            (None, Some(inferred)) => inferred.clone(),
            (None, None) => {
                self.error(
                    format!("'{}' needs either a type annotation or an initializer", decl.name.as_str()),
                    decl.span,
                    E_SEMANTIC_TYPE_MISMATCH,
                );
                simple(BaseKind::U32)
            }
        };

        VarRecord { ty, is_mut: decl.is_mut, is_initialized: decl.init.is_some() }
    }

    /// Checks a block of statements and reports whether every path through
    /// it returns.
    fn check_block(&mut self, stmts: &[Stmt]) -> bool {
        self.scopes.enter(RibKind::Block);
        let mut covers = false;
        for stmt in stmts {
            if self.check_stmt(stmt) {
                covers = true;
            }
        }
        self.scopes.exit();
        covers
    }

    /// Checks one statement; returns whether it unconditionally returns.
    fn check_stmt(&mut self, stmt: &Stmt) -> bool {
        match stmt {
            Stmt::Block(stmts, _) => self.check_block(stmts),
            Stmt::Return(value, span) => {
                let expected = self.return_stack.last().cloned().flatten();
                match (value, &expected) {
                    (Some(expr), Some(expected_ty)) => {
                        let actual = self.check_expr(expr);
                        if actual != *expected_ty {
                            self.error(
                                format!("expected return type {:?}, found {:?}", expected_ty, actual),
                                *span,
                                E_SEMANTIC_TYPE_MISMATCH,
                            );
                        }
                    }
                    (Some(expr), None) => {
                        self.check_expr(expr);
                        self.error("void function must not return a value", *span, E_SEMANTIC_TYPE_MISMATCH);
                    }
                    (None, Some(expected_ty)) => {
                        self.error(format!("expected a return value of type {:?}", expected_ty), *span, E_SEMANTIC_TYPE_MISMATCH);
                    }
                    (None, None) => {}
                }
                true
            }
            Stmt::Continue(span) | Stmt::Break(span) => {
                if !self.scopes.inside_loop() {
                    self.error("'break'/'continue' outside a loop", *span, E_SEMANTIC_LOOP_CONTROL_OUTSIDE_LOOP);
                }
                false
            }
            Stmt::VarDecl(decl) => {
                if decl.name == ID_MAIN {
                    self.error("'main' may not be used as a variable name", decl.span, E_SEMANTIC_BAD_MAIN);
                }
                if self.scopes.declared_in_current_scope(decl.name) {
                    self.error(
                        format!("'{}' is already defined in this scope", decl.name.as_str()),
                        decl.span,
                        E_SEMANTIC_DUPLICATE_DEF,
                    );
                }
                let record = self.check_var_decl_common(decl);
                self.scopes.declare(decl.name, Binding::Var(record));
                false
            }
            Stmt::Assign(lhs, op, rhs, span) => {
                self.check_assign(lhs, *op, rhs, *span);
                false
            }
            Stmt::ExprStmt(expr) => {
                self.check_expr(expr);
                false
            }
            Stmt::While(cond, body, span) => {
                let cond_ty = self.check_expr(cond);
                if cond_ty != simple(BaseKind::Bool) {
                    self.error("'while' condition must be BOOL", *span, E_SEMANTIC_TYPE_MISMATCH);
                }
                self.scopes.enter(RibKind::Loop);
                self.check_stmt(body);
                self.scopes.exit();
                false
            }
            Stmt::If(cond, then_branch, else_branch, span) => {
                let cond_ty = self.check_expr(cond);
                if cond_ty != simple(BaseKind::Bool) {
                    self.error("'if' condition must be BOOL", *span, E_SEMANTIC_TYPE_MISMATCH);
                }
                let then_covers = self.check_stmt(then_branch);
                let else_covers = match else_branch {
                    Some(else_branch) => self.check_stmt(else_branch),
                    None => false,
                };
                then_covers && else_covers
            }
            Stmt::Match(scrutinee, arms, _) => self.check_match(scrutinee, arms),
        }
    }

    fn check_match(&mut self, scrutinee: &Expr, arms: &[MatchArm]) -> bool {
        let scrutinee_ty = self.check_expr(scrutinee);
        let mut has_else = false;
        let mut all_cover = !arms.is_empty();

        for arm in arms {
            let covers_this_arm = match arm {
                MatchArm::Literal(literals, body, span) => {
                    for lit in literals {
                        let lit_ty = self.check_expr(lit);
                        if lit_ty != scrutinee_ty {
                            self.error("match arm literal type must match the scrutinee's type", *span, E_SEMANTIC_TYPE_MISMATCH);
                        }
                    }
                    self.check_stmt(body)
                }
                MatchArm::Guard(guard, body, span) => {
                    let guard_ty = self.check_expr(guard);
                    if guard_ty != simple(BaseKind::Bool) {
                        self.error("match guard must be BOOL", *span, E_SEMANTIC_TYPE_MISMATCH);
                    }
                    self.check_stmt(body)
                }
                MatchArm::Else(body, _) => {
                    has_else = true;
                    self.check_stmt(body)
                }
            };
            all_cover &= covers_this_arm;
        }

        all_cover && has_else
    }

    fn check_assign(&mut self, lhs: &Expr, op: AssignOp, rhs: &Expr, span: Span) {
        let lhs_ty = self.check_expr(lhs);
        let rhs_ty = self.check_expr(rhs);

        if !self.is_assignable(lhs) {
            self.error("left-hand side of assignment is not assignable", span, E_SEMANTIC_NOT_ASSIGNABLE);
            return;
        }

        match op {
            AssignOp::Normal => {
                if lhs_ty != rhs_ty {
                    self.error(format!("cannot assign {:?} to {:?}", rhs_ty, lhs_ty), span, E_SEMANTIC_TYPE_MISMATCH);
                }
            }
            _ => {
                let bin_op = compound_to_binop(op);
                match types::binary_result(bin_op, &lhs_ty) {
                    Some(result) if result == lhs_ty && rhs_ty == lhs_ty => {}
                    _ => self.error(format!("operator {:?}= is not defined for {:?}", bin_op, lhs_ty), span, E_SEMANTIC_TYPE_MISMATCH),
                }
                if !self.is_initialized(lhs) {
                    self.error(
                        "left-hand side must already be initialized for a compound assignment",
                        span,
                        E_SEMANTIC_USE_BEFORE_INIT,
                    );
                }
            }
        }
    }

    fn is_assignable(&mut self, expr: &Expr) -> bool {
        match expr {
            Expr::Variable(name, _) => match self.scopes.resolve(*name) {
                Some(Binding::Var(v)) => v.is_mut,
                _ => false,
            },
            Expr::Unary(UnOp::Deref, inner, _) => {
                let ty = self.check_expr(inner);
                types::deref_is_assignable(&ty)
            }
            Expr::Index(base, _, _) => matches!(**base, Expr::Variable(_, _)),
            _ => false,
        }
    }

    fn is_initialized(&self, expr: &Expr) -> bool {
        match expr {
            Expr::Variable(name, _) => matches!(self.scopes.resolve(*name), Some(Binding::Var(v)) if v.is_initialized),
            _ => true,
        }
    }

    fn check_expr(&mut self, expr: &Expr) -> Type {
        match expr {
            Expr::Variable(name, span) => self.check_variable(*name, *span),
            Expr::U32Literal(_, _) => simple(BaseKind::U32),
            Expr::F64Literal(_, _) => simple(BaseKind::F64),
            Expr::StringLiteral(_, _) => Type::Simple(SimpleType { kind: BaseKind::Str, reference: RefKind::Ref }),
            Expr::CharLiteral(_, _) => simple(BaseKind::Char),
            Expr::BoolLiteral(_, _) => simple(BaseKind::Bool),
            Expr::Binary(op, lhs, rhs, span) => self.check_binary(*op, lhs, rhs, *span),
            Expr::Unary(op, operand, span) => self.check_unary(*op, operand, *span),
            Expr::Call(callee, args, span) => self.check_call(callee, args, *span),
            Expr::LambdaCall(callee, args, is_ellipsis, span) => self.check_lambda_call(callee, args, *is_ellipsis, *span),
            Expr::Index(base, index, span) => self.check_index(base, index, *span),
            Expr::Cast(inner, target, span) => self.check_cast(inner, target, *span),
        }
    }

    fn check_variable(&mut self, name: Symbol, span: Span) -> Type {
        let boundary = self.const_boundary.last().copied();
        match boundary {
            Some(boundary) => match self.scopes.resolve_with_locality(name, boundary) {
                Some((Binding::Var(v), external)) => {
                    if external {
                        self.error(
                            format!("const function may not read '{}', declared outside its body", name.as_str()),
                            span,
                            E_SEMANTIC_PURITY_VIOLATION,
                        );
                    }
                    v.ty.clone()
                }
                Some((Binding::Func { ty, .. }, _)) => Type::Function(ty.clone()),
                None => {
                    self.error(format!("undefined name '{}'", name.as_str()), span, E_SEMANTIC_UNDEFINED_VAR);
                    simple(BaseKind::U32)
                }
            },
            None => match self.scopes.resolve(name) {
                Some(Binding::Var(v)) => v.ty.clone(),
                Some(Binding::Func { ty, .. }) => Type::Function(ty.clone()),
                None => {
                    self.error(format!("undefined name '{}'", name.as_str()), span, E_SEMANTIC_UNDEFINED_VAR);
                    simple(BaseKind::U32)
                }
            },
        }
    }

    fn check_binary(&mut self, op: BinOp, lhs: &Expr, rhs: &Expr, span: Span) -> Type {
        let lhs_ty = self.check_expr(lhs);
        let rhs_ty = self.check_expr(rhs);

        if matches!(op, BinOp::Shl | BinOp::Shr) {
            if rhs_ty != simple(BaseKind::U32) {
                self.error("shift amount must be U32", span, E_SEMANTIC_TYPE_MISMATCH);
            }
            return types::binary_result(op, &lhs_ty).unwrap_or_else(|| {
                self.error(format!("operator {:?} is not defined for {:?}", op, lhs_ty), span, E_SEMANTIC_TYPE_MISMATCH);
                lhs_ty.clone()
            });
        }

        if lhs_ty != rhs_ty {
            if op == BinOp::Add {
                if let Some(result) = types::add_str_char_result(&lhs_ty, &rhs_ty) {
                    return result;
                }
            }
            self.error(
                format!("operator {:?} requires matching operand types, found {:?} and {:?}", op, lhs_ty, rhs_ty),
                span,
                E_SEMANTIC_TYPE_MISMATCH,
            );
            return lhs_ty;
        }

        if matches!(op, BinOp::Gt | BinOp::Ge | BinOp::Lt | BinOp::Le) && types::is_string_ref(&lhs_ty) {
            self.error("ordering comparisons are not defined for STR", span, E_SEMANTIC_TYPE_MISMATCH);
            return simple(BaseKind::Bool);
        }

        types::binary_result(op, &lhs_ty).unwrap_or_else(|| {
            self.error(format!("operator {:?} is not defined for {:?}", op, lhs_ty), span, E_SEMANTIC_TYPE_MISMATCH);
            lhs_ty.clone()
        })
    }

    fn check_unary(&mut self, op: UnOp, operand: &Expr, span: Span) -> Type {
        let operand_ty = self.check_expr(operand);
        if matches!(op, UnOp::MutRef) && !self.is_assignable(operand) {
            self.error("'&mut' requires a mutable place", span, E_SEMANTIC_MUT_REQUIRED);
        }
        types::unary_result(op, &operand_ty).unwrap_or_else(|| {
            self.error(format!("operator {:?} is not defined for {:?}", op, operand_ty), span, E_SEMANTIC_TYPE_MISMATCH);
            operand_ty
        })
    }

    fn check_call(&mut self, callee: &Expr, args: &[Expr], span: Span) -> Type {
        self.check_callee_purity(callee, span);
        let callee_ty = self.check_expr(callee);
        let arg_tys: Vec<Type> = args.iter().map(|a| self.check_expr(a)).collect();

        match callee_ty {
            Type::Function(f) => {
                if f.params.len() != arg_tys.len() {
                    self.error(
                        format!("expected {} argument(s), found {}", f.params.len(), arg_tys.len()),
                        span,
                        E_SEMANTIC_TYPE_MISMATCH,
                    );
                } else {
                    for (param_ty, arg_ty) in f.params.iter().zip(arg_tys.iter()) {
                        if param_ty != arg_ty {
                            self.error(format!("expected argument of type {:?}, found {:?}", param_ty, arg_ty), span, E_SEMANTIC_TYPE_MISMATCH);
                        }
                    }
                }
                f.ret.map(|b| *b).unwrap_or_else(|| simple(BaseKind::U32))
            }
            other => {
                self.error(format!("{:?} is not callable", other), span, E_SEMANTIC_UNDEFINED_FN);
                simple(BaseKind::U32)
            }
        }
    }

    /// Calling a non-const function from inside a const function's own body
    /// is a purity violation; calling another const function is fine.
    fn check_callee_purity(&mut self, callee: &Expr, span: Span) {
        let Expr::Variable(name, _) = callee else { return };
        let Some(&boundary) = self.const_boundary.last() else { return };
        if let Some((Binding::Func { is_const, .. }, true)) = self.scopes.resolve_with_locality(*name, boundary) {
            if !is_const {
                self.error(
                    format!("const function may not call non-const function '{}'", name.as_str()),
                    span,
                    E_SEMANTIC_PURITY_VIOLATION,
                );
            }
        }
    }

    fn check_lambda_call(&mut self, callee: &Expr, args: &[LambdaArg], is_ellipsis: bool, span: Span) -> Type {
        self.check_callee_purity(callee, span);
        let callee_ty = self.check_expr(callee);
        let Type::Function(f) = callee_ty else {
            self.error("lambda call target is not a function", span, E_SEMANTIC_UNDEFINED_FN);
            return simple(BaseKind::U32);
        };

        let mut hole_params = Vec::new();
        for (i, arg) in args.iter().enumerate() {
            let Some(param_ty) = f.params.get(i) else {
                self.error("too many arguments in lambda call", span, E_SEMANTIC_TYPE_MISMATCH);
                continue;
            };
            match arg {
                LambdaArg::Hole => hole_params.push(param_ty.clone()),
                LambdaArg::Value(expr) => {
                    let arg_ty = self.check_expr(expr);
                    if arg_ty != *param_ty {
                        self.error(format!("expected argument of type {:?}, found {:?}", param_ty, arg_ty), span, E_SEMANTIC_TYPE_MISMATCH);
                    }
                }
            }
        }

        if is_ellipsis {
            hole_params.extend(f.params.iter().skip(args.len()).cloned());
        }

        Type::Function(FunctionType { params: hole_params, ret: f.ret, is_const: f.is_const })
    }

    fn check_index(&mut self, base: &Expr, index: &Expr, span: Span) -> Type {
        let base_ty = self.check_expr(base);
        let index_ty = self.check_expr(index);

        if !types::is_string_ref(&base_ty) {
            self.error("indexing target must be a string reference", span, E_SEMANTIC_TYPE_MISMATCH);
        }
        if index_ty != simple(BaseKind::U32) {
            self.error("index must be U32", span, E_SEMANTIC_TYPE_MISMATCH);
        }

        simple(BaseKind::Char)
    }

    fn check_cast(&mut self, inner: &Expr, target: &Type, span: Span) -> Type {
        let inner_ty = self.check_expr(inner);
        let (Some(from), Some(to)) = (types::base_kind(&inner_ty), types::base_kind(target)) else {
            self.error("casts are only defined between base value types", span, E_SEMANTIC_BAD_CAST);
            return target.clone();
        };
        let both_nonref =
            types::reference_kind(&inner_ty) == Some(RefKind::NonRef) && types::reference_kind(target) == Some(RefKind::NonRef);
        if !both_nonref || !types::cast_allowed(from, to) {
            self.error(format!("cannot cast {:?} to {:?}", inner_ty, target), span, E_SEMANTIC_BAD_CAST);
        }
        target.clone()
    }
}

fn compound_to_binop(op: AssignOp) -> BinOp {
    match op {
        AssignOp::Normal => unreachable!("compound_to_binop called on AssignOp::Normal"),
        AssignOp::Plus => BinOp::Add,
        AssignOp::Minus => BinOp::Sub,
        AssignOp::Mul => BinOp::Mul,
        AssignOp::Div => BinOp::Div,
        AssignOp::Mod => BinOp::Mod,
        AssignOp::Exp => BinOp::Exp,
        AssignOp::BitAnd => BinOp::BitAnd,
        AssignOp::BitOr => BinOp::BitOr,
        AssignOp::BitXor => BinOp::BitXor,
        AssignOp::Shl => BinOp::Shl,
        AssignOp::Shr => BinOp::Shr,
    }
}
