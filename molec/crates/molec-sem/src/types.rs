//! Typing rules: what a variable/function record looks like, and the
//! operator/cast tables spec.md §4.4 defines over [`molec_par::ast::Type`].
//!
//! The checker reuses the parser's `Type` directly rather than maintaining a
//! second "resolved" type representation — there is no inference and no
//! generics, so nothing a checked type would need that the parsed one lacks.

use molec_par::{BaseKind, BinOp, RefKind, SimpleType, Type, UnOp};

/// A variable's entry in a scope: its type, whether it was declared `mut`,
/// and whether every path so far has given it a value.
#[derive(Debug, Clone)]
pub struct VarRecord {
    pub ty: Type,
    pub is_mut: bool,
    pub is_initialized: bool,
}

pub fn simple(kind: BaseKind) -> Type {
    Type::Simple(SimpleType { kind, reference: RefKind::NonRef })
}

pub fn is_numeric(kind: BaseKind) -> bool {
    matches!(kind, BaseKind::U32 | BaseKind::I32 | BaseKind::F64)
}

pub fn is_integer(kind: BaseKind) -> bool {
    matches!(kind, BaseKind::U32 | BaseKind::I32)
}

/// The non-ref base kind a type carries, if it is a [`Type::Simple`].
pub fn base_kind(ty: &Type) -> Option<BaseKind> {
    match ty {
        Type::Simple(s) => Some(s.kind),
        Type::Function(_) => None,
    }
}

pub fn reference_kind(ty: &Type) -> Option<RefKind> {
    match ty {
        Type::Simple(s) => Some(s.reference),
        Type::Function(_) => None,
    }
}

pub fn is_string_ref(ty: &Type) -> bool {
    matches!(ty, Type::Simple(SimpleType { kind: BaseKind::Str, reference: RefKind::Ref | RefKind::MutRef }))
}

/// The result type of applying a prefix unary operator to `operand_ty`, or
/// `None` if the operator does not accept that type.
pub fn unary_result(op: UnOp, operand_ty: &Type) -> Option<Type> {
    match op {
        UnOp::Inc | UnOp::Dec | UnOp::Neg => {
            let kind = base_kind(operand_ty)?;
            (is_numeric(kind) && reference_kind(operand_ty) == Some(RefKind::NonRef))
                .then(|| operand_ty.clone())
        }
        UnOp::BitNot => {
            let kind = base_kind(operand_ty)?;
            (is_integer(kind) && reference_kind(operand_ty) == Some(RefKind::NonRef))
                .then(|| operand_ty.clone())
        }
        UnOp::Not => (*operand_ty == simple(BaseKind::Bool)).then(|| simple(BaseKind::Bool)),
        UnOp::Ref => {
            let kind = base_kind(operand_ty)?;
            (reference_kind(operand_ty) == Some(RefKind::NonRef))
                .then(|| Type::Simple(SimpleType { kind, reference: RefKind::Ref }))
        }
        UnOp::MutRef => {
            let kind = base_kind(operand_ty)?;
            (reference_kind(operand_ty) == Some(RefKind::NonRef))
                .then(|| Type::Simple(SimpleType { kind, reference: RefKind::MutRef }))
        }
        UnOp::Deref => {
            let kind = base_kind(operand_ty)?;
            matches!(reference_kind(operand_ty), Some(RefKind::Ref | RefKind::MutRef))
                .then(|| simple(kind))
        }
    }
}

/// Whether `*` is a mutable dereference, i.e. the result is assignable.
pub fn deref_is_assignable(operand_ty: &Type) -> bool {
    reference_kind(operand_ty) == Some(RefKind::MutRef)
}

/// The result type of a binary operator over two *equal* operand types
/// (binary ops never coerce), or `None` if the operator rejects that type.
pub fn binary_result(op: BinOp, ty: &Type) -> Option<Type> {
    use BinOp::*;

    if matches!(op, And | Or) {
        return (*ty == simple(BaseKind::Bool)).then(|| simple(BaseKind::Bool));
    }

    let kind = base_kind(ty)?;
    let is_nonref = reference_kind(ty) == Some(RefKind::NonRef);

    match op {
        Add => {
            if is_nonref && is_numeric(kind) {
                return Some(ty.clone());
            }
            if is_string_ref(ty) {
                return Some(ty.clone());
            }
            None
        }
        Sub | Mul | Div => (is_nonref && is_numeric(kind)).then(|| ty.clone()),
        Mod | Exp => (is_nonref && is_numeric(kind)).then(|| ty.clone()),
        BitAnd | BitOr | BitXor => (is_nonref && is_integer(kind)).then(|| ty.clone()),
        Shl | Shr => (is_nonref && is_integer(kind)).then(|| ty.clone()),
        Eq | Neq => {
            let ok = (is_nonref && matches!(kind, BaseKind::Bool | BaseKind::Char))
                || is_nonref && is_numeric(kind)
                || is_string_ref(ty);
            ok.then(|| simple(BaseKind::Bool))
        }
        Gt | Ge | Lt | Le => {
            let ok = is_nonref && is_numeric(kind);
            ok.then(|| simple(BaseKind::Bool))
        }
        And | Or => unreachable!("handled above"),
    }
}

/// `+`'s one heterogeneous case: `STR + CHAR` concatenation.
pub fn add_str_char_result(lhs: &Type, rhs: &Type) -> Option<Type> {
    (is_string_ref(lhs) && *rhs == simple(BaseKind::Char)).then(|| lhs.clone())
}

/// Cast table from spec.md §4.4: `from -> to` is allowed only for the pairs
/// marked there. References and strings never participate in casts.
pub fn cast_allowed(from: BaseKind, to: BaseKind) -> bool {
    use BaseKind::*;
    matches!(
        (from, to),
        (Bool, Bool | U32 | I32 | F64)
            | (U32, U32 | I32 | F64 | Char)
            | (I32, U32 | I32 | F64 | Char)
            | (F64, U32 | I32 | F64)
            | (Char, U32 | I32 | Char)
    )
}
