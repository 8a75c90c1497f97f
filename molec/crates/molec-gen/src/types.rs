//! Maps `molec_par::Type` onto the target model's LLVM type lattice:
//! 1-bit integer, 32-bit integer (U32/I32/CHAR share a width), 64-bit float,
//! and pointer (for references and string buffers).

use inkwell::context::Context;
use inkwell::types::BasicTypeEnum;
use inkwell::AddressSpace;
use molec_par::{BaseKind, RefKind, SimpleType, Type};

use crate::error::{CodeGenError, Result};

pub struct TypeMapper<'ctx> {
    context: &'ctx Context,
}

impl<'ctx> TypeMapper<'ctx> {
    pub fn new(context: &'ctx Context) -> Self {
        Self { context }
    }

    /// Maps a base kind to its non-reference LLVM representation.
    pub fn map_base(&self, kind: BaseKind) -> BasicTypeEnum<'ctx> {
        match kind {
            BaseKind::Bool => self.context.bool_type().into(),
            BaseKind::U32 | BaseKind::I32 | BaseKind::Char => self.context.i32_type().into(),
            BaseKind::F64 => self.context.f64_type().into(),
            BaseKind::Str => self.context.ptr_type(AddressSpace::default()).into(),
        }
    }

    /// Maps a full `SimpleType`, applying a pointer wrapper for references.
    pub fn map_simple(&self, ty: &SimpleType) -> BasicTypeEnum<'ctx> {
        match ty.reference {
            RefKind::NonRef => self.map_base(ty.kind),
            RefKind::Ref | RefKind::MutRef => {
                self.context.ptr_type(AddressSpace::default()).into()
            }
        }
    }

    /// Maps any checker-produced `Type` that can reach codegen. Function
    /// types never appear as a value's storage type (only as a call's
    /// static shape, which codegen reads off the `FuncDef`/`ExternDecl`
    /// directly), so that case is an internal error rather than a mapping
    /// table entry.
    pub fn map(&self, ty: &Type) -> Result<BasicTypeEnum<'ctx>> {
        match ty {
            Type::Simple(simple) => Ok(self.map_simple(simple)),
            Type::Function(_) => Err(CodeGenError::TypeMappingError(
                "a function type has no storage representation".to_string(),
            )),
        }
    }

    /// The element type of a string buffer: a 32-bit code point, per the
    /// "wide char" string model.
    pub fn char_element_type(&self) -> inkwell::types::IntType<'ctx> {
        self.context.i32_type()
    }
}
