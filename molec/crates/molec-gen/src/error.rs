//! Error types for LLVM code generation
//!
//! This module defines error types for the molec-gen crate, providing
//! proper error handling instead of panics.

use thiserror::Error;

/// Error type for LLVM code generation
#[derive(Debug, Error)]
pub enum CodeGenError {
    /// A basic block expected to exist (e.g. a loop's exit block) was not found
    #[error("Target block '{0}' not found")]
    BlockNotFound(String),

    /// An inkwell builder call returned `Err`
    #[error("LLVM operation failed: {0}")]
    LlvmOperationFailed(String),

    /// A call expression's callee does not name a declared function or extern
    #[error("Function '{0}' not found")]
    FunctionNotFound(String),

    /// An operand reached codegen with a shape the lowering table has no case for
    #[error("Invalid operand type: {0}")]
    InvalidOperandType(String),

    /// A `molec_par::Type` has no mapping onto the target's LLVM type model
    #[error("Type mapping error: {0}")]
    TypeMappingError(String),

    /// A lambda call (`@(...)`) reached codegen; closures have no defined representation
    #[error("Lambda call has no codegen lowering: {0}")]
    LambdaCallUnsupported(String),

    /// String `==`/`!=` reached codegen; no string comparison primitive is defined
    #[error("String equality has no codegen lowering: {0}")]
    StringEqUnsupported(String),

    /// The finished module failed `Module::verify`
    #[error("module verification failed: {message}\n---- IR dump ----\n{ir}")]
    VerificationFailed { message: String, ir: String },

    /// Object/assembly/bitcode emission failed
    #[error("compilation error: {0}")]
    CompilationError(String),

    /// Indicates a bug in the generator itself: a checked program reached a
    /// state the checker should have already rejected.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type alias for code generation operations
pub type Result<T> = std::result::Result<T, CodeGenError>;
