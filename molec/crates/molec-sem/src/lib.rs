//! molec-sem - Semantic Analyzer & Type Checker
//!
//! ============================================================================
//! SEMANTIC ANALYSIS THEORY
//! ============================================================================
//!
//! Semantic analysis is the phase where the checker decides what a
//! syntactically valid program *means*: is every name defined, does every
//! operator see operands of a type it accepts, does every non-void function
//! return on every path, and does a `const fn` stay pure.
//!
//! PHASES:
//! -------
//! 1. NAME RESOLUTION — match identifiers to their declarations through a
//!    chain of lexical scopes ([`scope::ScopeStack`]).
//! 2. TYPE CHECKING — assign every expression a [`molec_par::Type`] and
//!    reject operators/casts/calls/assignments that disagree with the
//!    tables in [`types`].
//! 3. CONTROL FLOW — `break`/`continue` only inside a loop, and every path
//!    through a non-void function body ends in a `return`.
//! 4. PURITY — a `const fn` body may read only its own parameters and
//!    locals, and may call only other `const fn`s.
//!
//! RIB STRUCTURE
//! -------------
//! A "rib" is one scope level:
//!
//! ```text
//! Rib { bindings: Map<Symbol, Binding>, parent: Option<RibId>, kind: RibKind }
//! ```
//!
//! Ribs chain from the innermost block outward to the global rib; resolving
//! a name walks that chain until a binding is found or the chain ends.
//! Shadowing falls out for free: declaring a name in an inner rib hides an
//! outer binding of the same name until that rib closes. There is no
//! separate type-inference pass and no intermediate HIR — this language
//! requires an explicit type on every binding and parameter, so the checker
//! assigns types to expressions directly during the one AST walk, and
//! [`types`] reuses [`molec_par::Type`] itself rather than a second
//! resolved-type representation.
//!
//! TOP-LEVEL ORDER
//! ----------------
//! 1. Register every `extern` and function signature globally, so forward
//!    references between functions are legal.
//! 2. Check every global `let`.
//! 3. Check every function body.

mod analysis;
mod scope;
mod types;

#[cfg(test)]
mod edge_cases;

pub use analysis::Checker;
pub use scope::{Binding, RibId, RibKind, ScopeStack};
pub use types::{
    add_str_char_result, base_kind, binary_result, cast_allowed, deref_is_assignable, is_integer,
    is_numeric, is_string_ref, reference_kind, simple, unary_result, VarRecord,
};
