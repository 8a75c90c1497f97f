//! Lowers a semantically checked `Program` straight to an `inkwell` module;
//! there is no intermediate IR between the AST and LLVM IR. Because the
//! checker does not annotate the AST with the types it computed, this phase
//! re-derives each subexpression's type as it lowers it, reusing the exact
//! same operator/cast tables the checker used (`molec_sem::types`) so the two
//! phases can never disagree about what a given expression means.

use std::collections::HashMap;
use std::path::Path;

use inkwell::basic_block::BasicBlock;
use inkwell::builder::Builder;
use inkwell::context::Context;
use inkwell::module::{Linkage, Module};
use inkwell::targets::{CodeModel, FileType, InitializationConfig, RelocMode, Target, TargetMachine, TargetTriple};
use inkwell::types::BasicType;
use inkwell::values::{BasicValueEnum, FunctionValue, IntValue, PointerValue};
use inkwell::{FloatPredicate, IntPredicate, OptimizationLevel};

use molec_par::{
    AssignOp, BaseKind, BinOp, Expr, ExternDecl, FuncDef, FunctionType, MatchArm, Program,
    RefKind, SimpleType, Stmt, Type, UnOp, VarDecl,
};
use molec_sem::{base_kind, binary_result, is_string_ref, simple, unary_result};
use molec_util::diagnostic::{DiagnosticBuilder, Phase, E_CODEGEN_LAMBDA_CALL, E_CODEGEN_STRING_EQ};
use molec_util::{Handler, Span, Symbol};

use crate::error::{CodeGenError, Result};
use crate::types::TypeMapper;

type LocalScopes<'ctx> = Vec<HashMap<Symbol, (PointerValue<'ctx>, Type)>>;

#[derive(Clone)]
struct FunctionInfo<'ctx> {
    value: FunctionValue<'ctx>,
    ty: FunctionType,
}

#[derive(Clone, Copy)]
struct LoopBlocks<'ctx> {
    continue_block: BasicBlock<'ctx>,
    exit_block: BasicBlock<'ctx>,
}

fn llvm_err(e: impl std::fmt::Display) -> CodeGenError {
    CodeGenError::LlvmOperationFailed(e.to_string())
}

fn compound_to_binop(op: AssignOp) -> BinOp {
    match op {
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
        AssignOp::Normal => unreachable!("Normal has no binary-operator counterpart"),
    }
}

fn ordering_predicate(op: BinOp, signed: bool) -> IntPredicate {
    use BinOp::*;
    match (op, signed) {
        (Gt, true) => IntPredicate::SGT,
        (Gt, false) => IntPredicate::UGT,
        (Ge, true) => IntPredicate::SGE,
        (Ge, false) => IntPredicate::UGE,
        (Lt, true) => IntPredicate::SLT,
        (Lt, false) => IntPredicate::ULT,
        (Le, true) => IntPredicate::SLE,
        (Le, false) => IntPredicate::ULE,
        _ => unreachable!("not an ordering comparison"),
    }
}

/// Lowers a checked `molec_par::Program` into an `inkwell::module::Module`.
///
/// Mirrors `molec_sem::Checker`'s shape: constructed once per compilation
/// with a borrowed [`Handler`], driven through one pass over the program.
pub struct Generator<'ctx, 'h> {
    context: &'ctx Context,
    handler: &'h Handler,
    module: Module<'ctx>,
    builder: Builder<'ctx>,
    types: TypeMapper<'ctx>,
    target_triple: String,
    target_machine: Option<TargetMachine>,
    functions: HashMap<Symbol, FunctionInfo<'ctx>>,
    globals: HashMap<Symbol, (PointerValue<'ctx>, Type)>,
    loops: Vec<LoopBlocks<'ctx>>,
    string_literal_count: u32,
}

impl<'ctx, 'h> Generator<'ctx, 'h> {
    pub fn new(context: &'ctx Context, handler: &'h Handler, module_name: &str, target_triple: &str) -> Self {
        Target::initialize_all(&InitializationConfig::default());
        let module = context.create_module(module_name);
        let triple = TargetTriple::create(target_triple);
        module.set_triple(&triple);

        let target_machine = Target::from_triple(&triple).ok().and_then(|target| {
            target.create_target_machine(
                &triple,
                "generic",
                "",
                OptimizationLevel::None,
                RelocMode::Default,
                CodeModel::Default,
            )
        });
        if let Some(tm) = &target_machine {
            module.set_data_layout(&tm.get_target_data().get_data_layout());
        }

        Self {
            context,
            handler,
            module,
            builder: context.create_builder(),
            types: TypeMapper::new(context),
            target_triple: target_triple.to_string(),
            target_machine,
            functions: HashMap::new(),
            globals: HashMap::new(),
            loops: Vec::new(),
            string_literal_count: 0,
        }
    }

    pub fn module(&self) -> &Module<'ctx> {
        &self.module
    }

    pub fn emit_ir(&self) -> String {
        self.module.print_to_string().to_string()
    }

    pub fn write_object_file(&self, path: &Path) -> Result<()> {
        let tm = self.target_machine.as_ref().ok_or_else(|| {
            CodeGenError::CompilationError(format!("no target machine for triple '{}'", self.target_triple))
        })?;
        tm.write_to_file(&self.module, FileType::Object, path)
            .map_err(|e| CodeGenError::CompilationError(e.to_string()))
    }

    pub fn write_assembly_file(&self, path: &Path) -> Result<()> {
        let tm = self.target_machine.as_ref().ok_or_else(|| {
            CodeGenError::CompilationError(format!("no target machine for triple '{}'", self.target_triple))
        })?;
        tm.write_to_file(&self.module, FileType::Assembly, path)
            .map_err(|e| CodeGenError::CompilationError(e.to_string()))
    }

    pub fn write_bitcode_file(&self, path: &Path) -> bool {
        self.module.write_bitcode_to_path(path)
    }

    fn error(&self, message: impl Into<String>, span: Span, code: molec_util::diagnostic::DiagnosticCode) {
        DiagnosticBuilder::error(message)
            .phase(Phase::Codegen)
            .code(code)
            .span(span)
            .emit(self.handler);
    }

    /// Declares every extern and function signature, defines every global,
    /// then fills in every function body, and finally verifies the module.
    pub fn compile_program(&mut self, program: &Program) -> Result<()> {
        for ext in &program.externs {
            self.declare_extern(ext)?;
        }
        for func in &program.functions {
            self.declare_function(func)?;
        }
        for global in &program.globals {
            self.define_global(global)?;
        }
        for func in &program.functions {
            self.define_function(func)?;
        }
        self.verify()
    }

    fn verify(&self) -> Result<()> {
        if let Err(llvm_message) = self.module.verify() {
            let message = llvm_message.to_string();
            let ir = self.emit_ir();
            self.error(
                format!("module verification failed: {}", message),
                Span::DUMMY,
                molec_util::diagnostic::E_CODEGEN_VERIFICATION_FAILED,
            );
            return Err(CodeGenError::VerificationFailed { message, ir });
        }
        Ok(())
    }

    fn declare_extern(&mut self, ext: &ExternDecl) -> Result<()> {
        let param_types = ext
            .params
            .iter()
            .map(|p| self.types.map(&p.ty).map(Into::into))
            .collect::<Result<Vec<_>>>()?;
        let fn_type = match &ext.ret_type {
            Some(ty) => self.types.map(ty)?.fn_type(&param_types, false),
            None => self.context.void_type().fn_type(&param_types, false),
        };
        let function = self.module.add_function(ext.name.as_str(), fn_type, Some(Linkage::External));
        let ty = FunctionType {
            params: ext.params.iter().map(|p| p.ty.clone()).collect(),
            ret: ext.ret_type.clone().map(Box::new),
            is_const: false,
        };
        self.functions.insert(ext.name, FunctionInfo { value: function, ty });
        Ok(())
    }

    fn declare_function(&mut self, func: &FuncDef) -> Result<()> {
        let param_types = func
            .params
            .iter()
            .map(|p| self.types.map(&p.ty).map(Into::into))
            .collect::<Result<Vec<_>>>()?;
        let fn_type = match &func.ret_type {
            Some(ty) => self.types.map(ty)?.fn_type(&param_types, false),
            None => self.context.void_type().fn_type(&param_types, false),
        };
        let function = self.module.add_function(func.name.as_str(), fn_type, None);
        let ty = FunctionType {
            params: func.params.iter().map(|p| p.ty.clone()).collect(),
            ret: func.ret_type.clone().map(Box::new),
            is_const: func.is_const,
        };
        self.functions.insert(func.name, FunctionInfo { value: function, ty });
        Ok(())
    }

    fn define_global(&mut self, decl: &VarDecl) -> Result<()> {
        let init_expr = decl
            .init
            .as_ref()
            .ok_or_else(|| CodeGenError::Internal("global without initializer reached codegen (checker bug)".to_string()))?;
        let (init_val, inferred_ty) = self.lower_global_init(init_expr)?;
        let ty = decl.ty.clone().unwrap_or(inferred_ty);
        let llvm_ty = self.types.map(&ty)?;
        let global = self.module.add_global(llvm_ty, None, decl.name.as_str());
        global.set_initializer(&init_val);
        global.set_constant(!decl.is_mut);
        self.globals.insert(decl.name, (global.as_pointer_value(), ty));
        Ok(())
    }

    /// Global initializers must already be LLVM constants (no builder
    /// instructions may appear outside a function body), so only literals
    /// and literal negation are accepted here.
    fn lower_global_init(&mut self, expr: &Expr) -> Result<(BasicValueEnum<'ctx>, Type)> {
        match expr {
            Expr::U32Literal(v, _) => Ok((self.context.i32_type().const_int(*v, false).into(), simple(BaseKind::U32))),
            Expr::F64Literal(v, _) => Ok((self.context.f64_type().const_float(*v).into(), simple(BaseKind::F64))),
            Expr::BoolLiteral(b, _) => Ok((self.context.bool_type().const_int(*b as u64, false).into(), simple(BaseKind::Bool))),
            Expr::CharLiteral(c, _) => Ok((self.context.i32_type().const_int(*c as u64, false).into(), simple(BaseKind::Char))),
            Expr::StringLiteral(sym, _) => self.lower_string_literal(*sym),
            Expr::Unary(UnOp::Neg, inner, _) => {
                let (val, ty) = self.lower_global_init(inner)?;
                let negated = match val {
                    BasicValueEnum::IntValue(i) => i.const_neg().into(),
                    BasicValueEnum::FloatValue(f) => f.const_neg().into(),
                    _ => return Err(CodeGenError::InvalidOperandType("cannot negate this constant".to_string())),
                };
                Ok((negated, ty))
            }
            _ => Err(CodeGenError::Internal(
                "a global initializer that isn't a literal reached codegen (checker bug)".to_string(),
            )),
        }
    }

    fn define_function(&mut self, func: &FuncDef) -> Result<()> {
        let info = self
            .functions
            .get(&func.name)
            .cloned()
            .ok_or_else(|| CodeGenError::Internal(format!("'{}' was not declared in the first pass", func.name.as_str())))?;
        let function = info.value;
        let entry = self.context.append_basic_block(function, "entry");
        self.builder.position_at_end(entry);

        let mut scopes: LocalScopes<'ctx> = vec![HashMap::new()];
        for (i, param) in func.params.iter().enumerate() {
            let llvm_ty = self.types.map(&param.ty)?;
            let alloca = self.builder.build_alloca(llvm_ty, param.name.as_str()).map_err(llvm_err)?;
            let arg_val = function
                .get_nth_param(i as u32)
                .ok_or_else(|| CodeGenError::Internal(format!("function '{}' is missing parameter {}", func.name.as_str(), i)))?;
            self.builder.build_store(alloca, arg_val).map_err(llvm_err)?;
            scopes.last_mut().unwrap().insert(param.name, (alloca, param.ty.clone()));
        }

        for stmt in &func.body {
            if self.block_terminated() {
                break;
            }
            self.lower_stmt(stmt, &mut scopes, function)?;
        }

        if !self.block_terminated() {
            match &func.ret_type {
                None => {
                    self.builder.build_return(None).map_err(llvm_err)?;
                }
                Some(_) => {
                    return Err(CodeGenError::Internal(format!(
                        "function '{}' has a path with no return (checker bug)",
                        func.name.as_str()
                    )))
                }
            }
        }
        Ok(())
    }

    fn block_terminated(&self) -> bool {
        self.builder.get_insert_block().and_then(|b| b.get_terminator()).is_some()
    }

    fn resolve(&self, name: Symbol, scopes: &LocalScopes<'ctx>) -> Result<(PointerValue<'ctx>, Type)> {
        for scope in scopes.iter().rev() {
            if let Some((ptr, ty)) = scope.get(&name) {
                return Ok((*ptr, ty.clone()));
            }
        }
        if let Some((ptr, ty)) = self.globals.get(&name) {
            return Ok((*ptr, ty.clone()));
        }
        Err(CodeGenError::Internal(format!(
            "undefined variable '{}' reached codegen (checker bug)",
            name.as_str()
        )))
    }

    // ---- statements ----

    fn lower_stmt(&mut self, stmt: &Stmt, scopes: &mut LocalScopes<'ctx>, function: FunctionValue<'ctx>) -> Result<()> {
        if self.block_terminated() {
            return Ok(());
        }
        match stmt {
            Stmt::Block(stmts, _) => {
                scopes.push(HashMap::new());
                for s in stmts {
                    if self.block_terminated() {
                        break;
                    }
                    self.lower_stmt(s, scopes, function)?;
                }
                scopes.pop();
            }
            Stmt::Return(Some(expr), _) => {
                let (val, _) = self.lower_expr(expr, scopes)?;
                self.builder.build_return(Some(&val)).map_err(llvm_err)?;
            }
            Stmt::Return(None, _) => {
                self.builder.build_return(None).map_err(llvm_err)?;
            }
            Stmt::Continue(_) => {
                let target = self
                    .loops
                    .last()
                    .ok_or_else(|| CodeGenError::Internal("continue outside a loop reached codegen (checker bug)".to_string()))?
                    .continue_block;
                self.builder.build_unconditional_branch(target).map_err(llvm_err)?;
            }
            Stmt::Break(_) => {
                let target = self
                    .loops
                    .last()
                    .ok_or_else(|| CodeGenError::Internal("break outside a loop reached codegen (checker bug)".to_string()))?
                    .exit_block;
                self.builder.build_unconditional_branch(target).map_err(llvm_err)?;
            }
            Stmt::VarDecl(decl) => self.lower_var_decl(decl, scopes)?,
            Stmt::Assign(lhs, op, rhs, span) => self.lower_assign(lhs, *op, rhs, *span, scopes)?,
            Stmt::ExprStmt(expr) => {
                self.lower_expr(expr, scopes)?;
            }
            Stmt::While(cond, body, _) => self.lower_while(cond, body, scopes, function)?,
            Stmt::If(cond, then_branch, else_branch, _) => {
                self.lower_if(cond, then_branch, else_branch.as_deref(), scopes, function)?
            }
            Stmt::Match(scrutinee, arms, _) => self.lower_match(scrutinee, arms, scopes, function)?,
        }
        Ok(())
    }

    fn lower_var_decl(&mut self, decl: &VarDecl, scopes: &mut LocalScopes<'ctx>) -> Result<()> {
        let (value, ty) = match &decl.init {
            Some(init) => {
                let (v, inferred) = self.lower_expr(init, scopes)?;
                (Some(v), decl.ty.clone().unwrap_or(inferred))
            }
            None => {
                let ty = decl.ty.clone().ok_or_else(|| {
                    CodeGenError::Internal("variable with no type and no initializer reached codegen (checker bug)".to_string())
                })?;
                (None, ty)
            }
        };
        let llvm_ty = self.types.map(&ty)?;
        let alloca = self.builder.build_alloca(llvm_ty, decl.name.as_str()).map_err(llvm_err)?;
        if let Some(v) = value {
            self.builder.build_store(alloca, v).map_err(llvm_err)?;
        }
        scopes.last_mut().unwrap().insert(decl.name, (alloca, ty));
        Ok(())
    }

    fn lower_assign(&mut self, lhs: &Expr, op: AssignOp, rhs: &Expr, _span: Span, scopes: &mut LocalScopes<'ctx>) -> Result<()> {
        let (addr, ty) = self.lower_place(lhs, scopes)?;
        match op {
            AssignOp::Normal => {
                let (val, _) = self.lower_expr(rhs, scopes)?;
                self.builder.build_store(addr, val).map_err(llvm_err)?;
            }
            _ => {
                let bin_op = compound_to_binop(op);
                let llvm_ty = self.types.map(&ty)?;
                let current = self.builder.build_load(llvm_ty, addr, "compound.lhs").map_err(llvm_err)?;
                let (rhs_val, _) = self.lower_expr(rhs, scopes)?;
                let result = self.lower_binary_values(bin_op, current, rhs_val, &ty)?;
                self.builder.build_store(addr, result).map_err(llvm_err)?;
            }
        }
        Ok(())
    }

    fn lower_if(
        &mut self,
        cond: &Expr,
        then_branch: &Stmt,
        else_branch: Option<&Stmt>,
        scopes: &mut LocalScopes<'ctx>,
        function: FunctionValue<'ctx>,
    ) -> Result<()> {
        let (cond_val, _) = self.lower_expr(cond, scopes)?;
        let then_block = self.context.append_basic_block(function, "if.then");
        let merge_block = self.context.append_basic_block(function, "if.merge");
        let else_block = if else_branch.is_some() {
            self.context.append_basic_block(function, "if.else")
        } else {
            merge_block
        };

        self.builder
            .build_conditional_branch(cond_val.into_int_value(), then_block, else_block)
            .map_err(llvm_err)?;

        self.builder.position_at_end(then_block);
        self.lower_stmt(then_branch, scopes, function)?;
        if !self.block_terminated() {
            self.builder.build_unconditional_branch(merge_block).map_err(llvm_err)?;
        }

        if let Some(else_stmt) = else_branch {
            self.builder.position_at_end(else_block);
            self.lower_stmt(else_stmt, scopes, function)?;
            if !self.block_terminated() {
                self.builder.build_unconditional_branch(merge_block).map_err(llvm_err)?;
            }
        }

        // `merge_block` may end up with no predecessors when both arms
        // return; that's a perfectly valid (just unreachable) LLVM block.
        self.builder.position_at_end(merge_block);
        Ok(())
    }

    fn lower_while(&mut self, cond: &Expr, body: &Stmt, scopes: &mut LocalScopes<'ctx>, function: FunctionValue<'ctx>) -> Result<()> {
        let cond_block = self.context.append_basic_block(function, "while.cond");
        let body_block = self.context.append_basic_block(function, "while.body");
        let exit_block = self.context.append_basic_block(function, "while.exit");

        self.builder.build_unconditional_branch(cond_block).map_err(llvm_err)?;

        self.builder.position_at_end(cond_block);
        let (cond_val, _) = self.lower_expr(cond, scopes)?;
        self.builder
            .build_conditional_branch(cond_val.into_int_value(), body_block, exit_block)
            .map_err(llvm_err)?;

        self.loops.push(LoopBlocks { continue_block: cond_block, exit_block });
        self.builder.position_at_end(body_block);
        self.lower_stmt(body, scopes, function)?;
        if !self.block_terminated() {
            self.builder.build_unconditional_branch(cond_block).map_err(llvm_err)?;
        }
        self.loops.pop();

        self.builder.position_at_end(exit_block);
        Ok(())
    }

    fn lower_match(
        &mut self,
        scrutinee: &Expr,
        arms: &[MatchArm],
        scopes: &mut LocalScopes<'ctx>,
        function: FunctionValue<'ctx>,
    ) -> Result<()> {
        let (scrutinee_val, _) = self.lower_expr(scrutinee, scopes)?;
        let exit_block = self.context.append_basic_block(function, "match.exit");
        let mut test_block = self.builder.get_insert_block().ok_or_else(|| CodeGenError::Internal("no current block".to_string()))?;
        let mut exhaustive = false;

        for (i, arm) in arms.iter().enumerate() {
            match arm {
                MatchArm::Literal(literals, body, _) => {
                    let arm_block = self.context.append_basic_block(function, &format!("match.arm{i}"));
                    let next_block = self.context.append_basic_block(function, &format!("match.next{i}"));

                    self.builder.position_at_end(test_block);
                    let mut matched: Option<IntValue<'ctx>> = None;
                    for lit in literals {
                        let (lit_val, _) = self.lower_expr(lit, scopes)?;
                        let eq = self
                            .builder
                            .build_int_compare(IntPredicate::EQ, scrutinee_val.into_int_value(), lit_val.into_int_value(), "match.eq")
                            .map_err(llvm_err)?;
                        matched = Some(match matched {
                            None => eq,
                            Some(acc) => self.builder.build_or(acc, eq, "match.or").map_err(llvm_err)?,
                        });
                    }
                    let matched = matched.ok_or_else(|| CodeGenError::Internal("literal arm with no literals".to_string()))?;
                    self.builder.build_conditional_branch(matched, arm_block, next_block).map_err(llvm_err)?;

                    self.builder.position_at_end(arm_block);
                    self.lower_stmt(body, scopes, function)?;
                    if !self.block_terminated() {
                        self.builder.build_unconditional_branch(exit_block).map_err(llvm_err)?;
                    }
                    test_block = next_block;
                }
                MatchArm::Guard(guard, body, _) => {
                    let arm_block = self.context.append_basic_block(function, &format!("match.arm{i}"));
                    let next_block = self.context.append_basic_block(function, &format!("match.next{i}"));

                    self.builder.position_at_end(test_block);
                    let (guard_val, _) = self.lower_expr(guard, scopes)?;
                    self.builder
                        .build_conditional_branch(guard_val.into_int_value(), arm_block, next_block)
                        .map_err(llvm_err)?;

                    self.builder.position_at_end(arm_block);
                    self.lower_stmt(body, scopes, function)?;
                    if !self.block_terminated() {
                        self.builder.build_unconditional_branch(exit_block).map_err(llvm_err)?;
                    }
                    test_block = next_block;
                }
                MatchArm::Else(body, _) => {
                    let arm_block = self.context.append_basic_block(function, "match.else");
                    self.builder.position_at_end(test_block);
                    self.builder.build_unconditional_branch(arm_block).map_err(llvm_err)?;

                    self.builder.position_at_end(arm_block);
                    self.lower_stmt(body, scopes, function)?;
                    if !self.block_terminated() {
                        self.builder.build_unconditional_branch(exit_block).map_err(llvm_err)?;
                    }
                    exhaustive = true;
                }
            }
        }

        if !exhaustive {
            self.builder.position_at_end(test_block);
            self.builder.build_unconditional_branch(exit_block).map_err(llvm_err)?;
        }

        self.builder.position_at_end(exit_block);
        Ok(())
    }

    // ---- places (assignment / &, &mut / ++, -- targets) ----

    fn lower_place(&mut self, expr: &Expr, scopes: &mut LocalScopes<'ctx>) -> Result<(PointerValue<'ctx>, Type)> {
        match expr {
            Expr::Variable(name, _) => self.resolve(*name, scopes),
            Expr::Unary(UnOp::Deref, inner, _) => {
                let (val, ty) = self.lower_expr(inner, scopes)?;
                let kind = base_kind(&ty).ok_or_else(|| CodeGenError::Internal("deref of a non-simple type (checker bug)".to_string()))?;
                Ok((val.into_pointer_value(), simple(kind)))
            }
            Expr::Index(base, index, _) => self.string_index_address(base, index, scopes),
            _ => Err(CodeGenError::Internal("expression is not an assignable place (checker bug)".to_string())),
        }
    }

    /// `&`/`&mut` accept any expression, not only a place; a non-place
    /// operand is materialized into a fresh stack slot first.
    fn lower_addressable(&mut self, expr: &Expr, scopes: &mut LocalScopes<'ctx>) -> Result<(PointerValue<'ctx>, Type)> {
        match expr {
            Expr::Variable(..) | Expr::Unary(UnOp::Deref, ..) | Expr::Index(..) => self.lower_place(expr, scopes),
            _ => {
                let (val, ty) = self.lower_expr(expr, scopes)?;
                let llvm_ty = self.types.map(&ty)?;
                let slot = self.builder.build_alloca(llvm_ty, "ref.tmp").map_err(llvm_err)?;
                self.builder.build_store(slot, val).map_err(llvm_err)?;
                Ok((slot, ty))
            }
        }
    }

    fn string_index_address(&mut self, base: &Expr, index: &Expr, scopes: &mut LocalScopes<'ctx>) -> Result<(PointerValue<'ctx>, Type)> {
        let (base_val, _) = self.lower_expr(base, scopes)?;
        let (index_val, _) = self.lower_expr(index, scopes)?;
        let elem_ty = self.types.char_element_type();
        let addr = unsafe {
            self.builder
                .build_gep(elem_ty, base_val.into_pointer_value(), &[index_val.into_int_value()], "str.idx")
                .map_err(llvm_err)?
        };
        Ok((addr, simple(BaseKind::Char)))
    }

    // ---- expressions ----

    fn lower_expr(&mut self, expr: &Expr, scopes: &mut LocalScopes<'ctx>) -> Result<(BasicValueEnum<'ctx>, Type)> {
        match expr {
            Expr::Variable(name, _) => {
                let (addr, ty) = self.resolve(*name, scopes)?;
                let llvm_ty = self.types.map(&ty)?;
                let val = self.builder.build_load(llvm_ty, addr, name.as_str()).map_err(llvm_err)?;
                Ok((val, ty))
            }
            Expr::U32Literal(v, _) => Ok((self.context.i32_type().const_int(*v, false).into(), simple(BaseKind::U32))),
            Expr::F64Literal(v, _) => Ok((self.context.f64_type().const_float(*v).into(), simple(BaseKind::F64))),
            Expr::StringLiteral(sym, _) => self.lower_string_literal(*sym),
            Expr::CharLiteral(c, _) => Ok((self.context.i32_type().const_int(*c as u64, false).into(), simple(BaseKind::Char))),
            Expr::BoolLiteral(b, _) => Ok((self.context.bool_type().const_int(*b as u64, false).into(), simple(BaseKind::Bool))),
            Expr::Binary(op, lhs, rhs, span) => self.lower_binary(*op, lhs, rhs, *span, scopes),
            Expr::Unary(op, operand, span) => self.lower_unary(*op, operand, *span, scopes),
            Expr::Call(callee, args, _) => self.lower_call(callee, args, scopes),
            Expr::LambdaCall(_, _, _, span) => {
                self.error("lambda calls have no codegen lowering", *span, E_CODEGEN_LAMBDA_CALL);
                Err(CodeGenError::LambdaCallUnsupported(format!("at {span:?}")))
            }
            Expr::Index(base, index, _) => {
                let (addr, elem_ty) = self.string_index_address(base, index, scopes)?;
                let llvm_ty = self.types.map(&elem_ty)?;
                let val = self.builder.build_load(llvm_ty, addr, "str.elem").map_err(llvm_err)?;
                Ok((val, elem_ty))
            }
            Expr::Cast(inner, target, _) => {
                let (val, src_ty) = self.lower_expr(inner, scopes)?;
                let src_kind = base_kind(&src_ty).ok_or_else(|| CodeGenError::Internal("cast of a non-simple type (checker bug)".to_string()))?;
                let target_kind = base_kind(target).ok_or_else(|| CodeGenError::Internal("cast to a non-simple type (checker bug)".to_string()))?;
                let result = self.lower_cast_value(val, src_kind, target_kind)?;
                Ok((result, target.clone()))
            }
        }
    }

    fn lower_string_literal(&mut self, sym: Symbol) -> Result<(BasicValueEnum<'ctx>, Type)> {
        let text = sym.as_str();
        let i32_t = self.context.i32_type();
        let mut code_points: Vec<_> = text.chars().map(|c| i32_t.const_int(c as u64, false)).collect();
        code_points.push(i32_t.const_int(0, false));
        let const_array = i32_t.const_array(&code_points);
        let name = format!("str.{}", self.string_literal_count);
        self.string_literal_count += 1;
        let global = self.module.add_global(const_array.get_type(), None, &name);
        global.set_initializer(&const_array);
        global.set_constant(true);
        global.set_linkage(Linkage::Private);
        let ty = Type::Simple(SimpleType { kind: BaseKind::Str, reference: RefKind::Ref });
        Ok((global.as_pointer_value().into(), ty))
    }

    fn lower_unary(&mut self, op: UnOp, operand: &Expr, span: Span, scopes: &mut LocalScopes<'ctx>) -> Result<(BasicValueEnum<'ctx>, Type)> {
        match op {
            UnOp::Ref | UnOp::MutRef => {
                let (addr, ty) = self.lower_addressable(operand, scopes)?;
                let result_ty = unary_result(op, &ty)
                    .ok_or_else(|| CodeGenError::Internal(format!("{op:?} has no codegen lowering for {ty:?} (checker bug)")))?;
                Ok((addr.into(), result_ty))
            }
            UnOp::Deref => {
                let (val, ty) = self.lower_expr(operand, scopes)?;
                let result_ty = unary_result(op, &ty)
                    .ok_or_else(|| CodeGenError::Internal(format!("{op:?} has no codegen lowering for {ty:?} (checker bug)")))?;
                let llvm_ty = self.types.map(&result_ty)?;
                let loaded = self.builder.build_load(llvm_ty, val.into_pointer_value(), "deref").map_err(llvm_err)?;
                Ok((loaded, result_ty))
            }
            UnOp::Neg => {
                let (val, ty) = self.lower_expr(operand, scopes)?;
                let result_ty = unary_result(op, &ty)
                    .ok_or_else(|| CodeGenError::Internal(format!("{op:?} has no codegen lowering for {ty:?} (checker bug)")))?;
                let negated = match val {
                    BasicValueEnum::IntValue(i) => self.builder.build_int_neg(i, "neg").map_err(llvm_err)?.into(),
                    BasicValueEnum::FloatValue(f) => self.builder.build_float_neg(f, "fneg").map_err(llvm_err)?.into(),
                    _ => return Err(CodeGenError::InvalidOperandType("negation of a non-numeric value".to_string())),
                };
                Ok((negated, result_ty))
            }
            UnOp::BitNot | UnOp::Not => {
                let (val, ty) = self.lower_expr(operand, scopes)?;
                let result_ty = unary_result(op, &ty)
                    .ok_or_else(|| CodeGenError::Internal(format!("{op:?} has no codegen lowering for {ty:?} (checker bug)")))?;
                let notted = self.builder.build_not(val.into_int_value(), "not").map_err(llvm_err)?;
                Ok((notted.into(), result_ty))
            }
            UnOp::Inc | UnOp::Dec => {
                let (addr, ty) = self.lower_place(operand, scopes)?;
                let result_ty = unary_result(op, &ty)
                    .ok_or_else(|| CodeGenError::Internal(format!("{op:?} has no codegen lowering for {ty:?} (checker bug)")))?;
                let llvm_ty = self.types.map(&ty)?;
                let current = self.builder.build_load(llvm_ty, addr, "incdec.cur").map_err(llvm_err)?;
                let updated: BasicValueEnum<'ctx> = match current {
                    BasicValueEnum::IntValue(i) => {
                        let one = i.get_type().const_int(1, false);
                        if op == UnOp::Inc {
                            self.builder.build_int_add(i, one, "inc").map_err(llvm_err)?.into()
                        } else {
                            self.builder.build_int_sub(i, one, "dec").map_err(llvm_err)?.into()
                        }
                    }
                    BasicValueEnum::FloatValue(f) => {
                        let one = f.get_type().const_float(1.0);
                        if op == UnOp::Inc {
                            self.builder.build_float_add(f, one, "finc").map_err(llvm_err)?.into()
                        } else {
                            self.builder.build_float_sub(f, one, "fdec").map_err(llvm_err)?.into()
                        }
                    }
                    _ => return Err(CodeGenError::InvalidOperandType("++/-- on a non-numeric value".to_string())),
                };
                self.builder.build_store(addr, updated).map_err(llvm_err)?;
                let _ = span;
                Ok((updated, result_ty))
            }
        }
    }

    fn lower_binary(
        &mut self,
        op: BinOp,
        lhs: &Expr,
        rhs: &Expr,
        span: Span,
        scopes: &mut LocalScopes<'ctx>,
    ) -> Result<(BasicValueEnum<'ctx>, Type)> {
        let (lhs_val, lhs_ty) = self.lower_expr(lhs, scopes)?;
        let (rhs_val, rhs_ty) = self.lower_expr(rhs, scopes)?;

        // No string representation (length, allocation) is defined in the
        // target model, so every string binary op is rejected here, the
        // same way `==`/`!=` on strings is rejected per the open question.
        if is_string_ref(&lhs_ty) || is_string_ref(&rhs_ty) {
            self.error(format!("operator {op:?} on a string reference has no codegen lowering"), span, E_CODEGEN_STRING_EQ);
            return Err(CodeGenError::StringEqUnsupported(format!("{op:?}")));
        }

        let result_ty = binary_result(op, &lhs_ty)
            .ok_or_else(|| CodeGenError::Internal(format!("{op:?} has no codegen lowering for {lhs_ty:?} (checker bug)")))?;

        let value = self.lower_binary_values(op, lhs_val, rhs_val, &lhs_ty)?;
        Ok((value, result_ty))
    }

    fn lower_binary_values(&self, op: BinOp, lhs: BasicValueEnum<'ctx>, rhs: BasicValueEnum<'ctx>, ty: &Type) -> Result<BasicValueEnum<'ctx>> {
        use BinOp::*;
        let kind = base_kind(ty).ok_or_else(|| CodeGenError::Internal("binary op on a non-simple type (checker bug)".to_string()))?;

        match kind {
            BaseKind::Bool => {
                let l = lhs.into_int_value();
                let r = rhs.into_int_value();
                let v = match op {
                    And => self.builder.build_and(l, r, "and").map_err(llvm_err)?,
                    Or => self.builder.build_or(l, r, "or").map_err(llvm_err)?,
                    Eq => self.builder.build_int_compare(IntPredicate::EQ, l, r, "cmp").map_err(llvm_err)?,
                    Neq => self.builder.build_int_compare(IntPredicate::NE, l, r, "cmp").map_err(llvm_err)?,
                    _ => return Err(CodeGenError::Internal(format!("{op:?} has no bool lowering (checker bug)"))),
                };
                Ok(v.into())
            }
            BaseKind::U32 | BaseKind::I32 | BaseKind::Char => {
                let signed = kind == BaseKind::I32;
                let l = lhs.into_int_value();
                let r = rhs.into_int_value();
                let v: BasicValueEnum<'ctx> = match op {
                    Add => self.builder.build_int_add(l, r, "add").map_err(llvm_err)?.into(),
                    Sub => self.builder.build_int_sub(l, r, "sub").map_err(llvm_err)?.into(),
                    Mul => self.builder.build_int_mul(l, r, "mul").map_err(llvm_err)?.into(),
                    Div if signed => self.builder.build_int_signed_div(l, r, "sdiv").map_err(llvm_err)?.into(),
                    Div => self.builder.build_int_unsigned_div(l, r, "udiv").map_err(llvm_err)?.into(),
                    Mod if signed => self.builder.build_int_signed_rem(l, r, "srem").map_err(llvm_err)?.into(),
                    Mod => self.builder.build_int_unsigned_rem(l, r, "urem").map_err(llvm_err)?.into(),
                    Exp => self.lower_int_pow(l, r, signed)?,
                    Eq => self.builder.build_int_compare(IntPredicate::EQ, l, r, "cmp").map_err(llvm_err)?.into(),
                    Neq => self.builder.build_int_compare(IntPredicate::NE, l, r, "cmp").map_err(llvm_err)?.into(),
                    Gt | Ge | Lt | Le => self
                        .builder
                        .build_int_compare(ordering_predicate(op, signed), l, r, "cmp")
                        .map_err(llvm_err)?
                        .into(),
                    BitAnd => self.builder.build_and(l, r, "band").map_err(llvm_err)?.into(),
                    BitOr => self.builder.build_or(l, r, "bor").map_err(llvm_err)?.into(),
                    BitXor => self.builder.build_xor(l, r, "bxor").map_err(llvm_err)?.into(),
                    Shl => self.builder.build_left_shift(l, r, "shl").map_err(llvm_err)?.into(),
                    // The target model's shift row reads "Shl, AShr" for both
                    // U32 and I32; both use an arithmetic right shift.
                    Shr => self.builder.build_right_shift(l, r, true, "ashr").map_err(llvm_err)?.into(),
                    And | Or => return Err(CodeGenError::Internal("&&/|| require BOOL operands (checker bug)".to_string())),
                };
                Ok(v)
            }
            BaseKind::F64 => {
                let l = lhs.into_float_value();
                let r = rhs.into_float_value();
                let v: BasicValueEnum<'ctx> = match op {
                    Add => self.builder.build_float_add(l, r, "fadd").map_err(llvm_err)?.into(),
                    Sub => self.builder.build_float_sub(l, r, "fsub").map_err(llvm_err)?.into(),
                    Mul => self.builder.build_float_mul(l, r, "fmul").map_err(llvm_err)?.into(),
                    Div => self.builder.build_float_div(l, r, "fdiv").map_err(llvm_err)?.into(),
                    Mod => self.builder.build_float_rem(l, r, "frem").map_err(llvm_err)?.into(),
                    Exp => self.lower_float_pow(l, r)?,
                    Eq => self.builder.build_float_compare(FloatPredicate::OEQ, l, r, "fcmp").map_err(llvm_err)?.into(),
                    Neq => self.builder.build_float_compare(FloatPredicate::ONE, l, r, "fcmp").map_err(llvm_err)?.into(),
                    Gt => self.builder.build_float_compare(FloatPredicate::OGT, l, r, "fcmp").map_err(llvm_err)?.into(),
                    Ge => self.builder.build_float_compare(FloatPredicate::OGE, l, r, "fcmp").map_err(llvm_err)?.into(),
                    Lt => self.builder.build_float_compare(FloatPredicate::OLT, l, r, "fcmp").map_err(llvm_err)?.into(),
                    Le => self.builder.build_float_compare(FloatPredicate::OLE, l, r, "fcmp").map_err(llvm_err)?.into(),
                    _ => return Err(CodeGenError::Internal(format!("{op:?} has no float lowering (checker bug)"))),
                };
                Ok(v)
            }
            BaseKind::Str => unreachable!("string binary ops are rejected in lower_binary"),
        }
    }

    fn get_powi_f64_i32(&self) -> FunctionValue<'ctx> {
        if let Some(f) = self.module.get_function("llvm.powi.f64.i32") {
            return f;
        }
        let f64_t = self.context.f64_type();
        let i32_t = self.context.i32_type();
        let fn_ty = f64_t.fn_type(&[f64_t.into(), i32_t.into()], false);
        self.module.add_function("llvm.powi.f64.i32", fn_ty, None)
    }

    fn get_pow_f64(&self) -> FunctionValue<'ctx> {
        if let Some(f) = self.module.get_function("llvm.pow.f64") {
            return f;
        }
        let f64_t = self.context.f64_type();
        let fn_ty = f64_t.fn_type(&[f64_t.into(), f64_t.into()], false);
        self.module.add_function("llvm.pow.f64", fn_ty, None)
    }

    /// `U32 ^^ U32` / `I32 ^^ I32`: neither integer type has a native powi
    /// form, so the base round-trips through `f64` around the `llvm.powi`
    /// intrinsic and the result is converted back.
    fn lower_int_pow(&self, base: IntValue<'ctx>, exponent: IntValue<'ctx>, signed: bool) -> Result<BasicValueEnum<'ctx>> {
        let f64_t = self.context.f64_type();
        let base_f = if signed {
            self.builder.build_signed_int_to_float(base, f64_t, "pow.base").map_err(llvm_err)?
        } else {
            self.builder.build_unsigned_int_to_float(base, f64_t, "pow.base").map_err(llvm_err)?
        };
        let powi = self.get_powi_f64_i32();
        let call = self.builder.build_call(powi, &[base_f.into(), exponent.into()], "pow").map_err(llvm_err)?;
        let result_f = call
            .try_as_basic_value()
            .left()
            .ok_or_else(|| CodeGenError::Internal("llvm.powi.f64.i32 returned void".to_string()))?
            .into_float_value();
        let i32_t = self.context.i32_type();
        let result = if signed {
            self.builder.build_float_to_signed_int(result_f, i32_t, "pow.result").map_err(llvm_err)?
        } else {
            self.builder.build_float_to_unsigned_int(result_f, i32_t, "pow.result").map_err(llvm_err)?
        };
        Ok(result.into())
    }

    fn lower_float_pow(&self, base: inkwell::values::FloatValue<'ctx>, exponent: inkwell::values::FloatValue<'ctx>) -> Result<BasicValueEnum<'ctx>> {
        let pow = self.get_pow_f64();
        let call = self.builder.build_call(pow, &[base.into(), exponent.into()], "pow").map_err(llvm_err)?;
        call.try_as_basic_value()
            .left()
            .ok_or_else(|| CodeGenError::Internal("llvm.pow.f64 returned void".to_string()))
    }

    fn lower_cast_value(&self, val: BasicValueEnum<'ctx>, src: BaseKind, target: BaseKind) -> Result<BasicValueEnum<'ctx>> {
        use BaseKind::*;
        match (src, target) {
            (Bool, Bool) => Ok(val),
            (Bool, U32) | (Bool, I32) => Ok(self
                .builder
                .build_int_z_extend(val.into_int_value(), self.context.i32_type(), "zext")
                .map_err(llvm_err)?
                .into()),
            (Bool, F64) => Ok(self
                .builder
                .build_unsigned_int_to_float(val.into_int_value(), self.context.f64_type(), "uitofp")
                .map_err(llvm_err)?
                .into()),
            // U32, I32 and CHAR all map onto the same i32 LLVM type, so
            // converting between them is a pure reinterpretation.
            (U32 | I32 | Char, U32 | I32 | Char) => Ok(val),
            (F64, F64) => Ok(val),
            (F64, U32) => Ok(self
                .builder
                .build_float_to_unsigned_int(val.into_float_value(), self.context.i32_type(), "fptoui")
                .map_err(llvm_err)?
                .into()),
            (F64, I32) => Ok(self
                .builder
                .build_float_to_signed_int(val.into_float_value(), self.context.i32_type(), "fptosi")
                .map_err(llvm_err)?
                .into()),
            (U32, F64) => Ok(self
                .builder
                .build_unsigned_int_to_float(val.into_int_value(), self.context.f64_type(), "uitofp")
                .map_err(llvm_err)?
                .into()),
            (I32, F64) => Ok(self
                .builder
                .build_signed_int_to_float(val.into_int_value(), self.context.f64_type(), "sitofp")
                .map_err(llvm_err)?
                .into()),
            _ => Err(CodeGenError::InvalidOperandType(format!("cast {src:?} -> {target:?} has no codegen lowering (checker bug)"))),
        }
    }

    fn lower_call(&mut self, callee: &Expr, args: &[Expr], scopes: &mut LocalScopes<'ctx>) -> Result<(BasicValueEnum<'ctx>, Type)> {
        let name = match callee {
            Expr::Variable(n, _) => *n,
            _ => return Err(CodeGenError::Internal("call target must be a named function (checker bug)".to_string())),
        };
        let info = self
            .functions
            .get(&name)
            .cloned()
            .ok_or_else(|| CodeGenError::FunctionNotFound(name.as_str().to_string()))?;

        let mut arg_vals = Vec::with_capacity(args.len());
        for arg in args {
            let (v, _) = self.lower_expr(arg, scopes)?;
            arg_vals.push(v.into());
        }

        let call = self.builder.build_call(info.value, &arg_vals, "call").map_err(llvm_err)?;
        let result_ty = info.ty.ret.as_ref().map(|t| (**t).clone()).unwrap_or_else(|| simple(BaseKind::Bool));
        let value = call
            .try_as_basic_value()
            .left()
            .unwrap_or_else(|| self.context.bool_type().const_int(0, false).into());
        Ok((value, result_ty))
    }
}
