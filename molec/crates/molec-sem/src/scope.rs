//! Scope chain (rib) tracking for name resolution and purity checking.

use std::collections::HashMap;

use molec_util::{Idx, IndexVec, Symbol};

use crate::types::VarRecord;
use molec_par::FunctionType;

/// Identifier for a single scope level (rib) in the [`ScopeStack`]'s arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RibId(u32);

impl Idx for RibId {
    fn from_usize(idx: usize) -> Self {
        RibId(idx as u32)
    }

    fn index(self) -> usize {
        self.0 as usize
    }
}

/// What a name in scope refers to.
#[derive(Debug, Clone)]
pub enum Binding {
    Var(VarRecord),
    Func { ty: FunctionType, is_const: bool },
}

/// The kind of construct that opened a rib, used only for `break`/`continue`
/// validity (is there an enclosing loop?).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RibKind {
    Global,
    Function,
    Block,
    Loop,
}

#[derive(Debug)]
struct Rib {
    bindings: HashMap<Symbol, Binding>,
    parent: Option<RibId>,
    kind: RibKind,
}

/// A chain of lexical scopes, innermost-current.
///
/// Ribs are appended to an arena and never removed; `exit_scope` just moves
/// `current` back to the parent, so a [`RibId`] captured before a scope
/// closes (e.g. the entry into a `const fn` body, for purity checks) stays
/// valid for the rest of the pass.
pub struct ScopeStack {
    ribs: IndexVec<RibId, Rib>,
    current: RibId,
}

impl ScopeStack {
    pub fn new() -> Self {
        let mut ribs = IndexVec::new();
        let root = ribs.push(Rib { bindings: HashMap::new(), parent: None, kind: RibKind::Global });
        Self { ribs, current: root }
    }

    pub fn enter(&mut self, kind: RibKind) -> RibId {
        let rib = self.ribs.push(Rib { bindings: HashMap::new(), parent: Some(self.current), kind });
        self.current = rib;
        rib
    }

    pub fn exit(&mut self) {
        if let Some(parent) = self.ribs[self.current].parent {
            self.current = parent;
        }
    }

    pub fn current_rib(&self) -> RibId {
        self.current
    }

    /// Declares `name` in the current scope, overwriting any prior binding
    /// of the same name at this exact level (shadowing an outer scope is
    /// fine; re-declaring within the same block is a caller-level check).
    pub fn declare(&mut self, name: Symbol, binding: Binding) {
        self.ribs[self.current].bindings.insert(name, binding);
    }

    /// True if `name` is already bound in the *current* rib (not an outer
    /// one) — used to reject duplicate declarations within one block.
    pub fn declared_in_current_scope(&self, name: Symbol) -> bool {
        self.ribs[self.current].bindings.contains_key(&name)
    }

    /// Looks up `name` starting at the current rib and walking outward.
    pub fn resolve(&self, name: Symbol) -> Option<&Binding> {
        let mut rib = self.current;
        loop {
            if let Some(binding) = self.ribs[rib].bindings.get(&name) {
                return Some(binding);
            }
            rib = self.ribs[rib].parent?;
        }
    }

    /// Resolves `name` and reports whether it was found strictly outside
    /// `boundary` (i.e. only by walking past `boundary` to its parent) —
    /// the shape `const fn` purity checks need: a name found at or within
    /// the boundary rib is part of the const function's own body.
    pub fn resolve_with_locality(&self, name: Symbol, boundary: RibId) -> Option<(&Binding, bool)> {
        let mut rib = self.current;
        let mut past_boundary = false;
        loop {
            if let Some(binding) = self.ribs[rib].bindings.get(&name) {
                return Some((binding, past_boundary));
            }
            if rib == boundary {
                past_boundary = true;
            }
            rib = self.ribs[rib].parent?;
        }
    }

    /// Whether a rib of kind [`RibKind::Loop`] encloses the current scope.
    pub fn inside_loop(&self) -> bool {
        let mut rib = self.current;
        loop {
            if self.ribs[rib].kind == RibKind::Loop {
                return true;
            }
            match self.ribs[rib].parent {
                Some(parent) => rib = parent,
                None => return false,
            }
        }
    }
}

impl Default for ScopeStack {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use molec_par::{BaseKind, RefKind, SimpleType, Type};
    use molec_util::Symbol;

    fn var(kind: BaseKind, is_mut: bool) -> Binding {
        Binding::Var(VarRecord {
            ty: Type::Simple(SimpleType { kind, reference: RefKind::NonRef }),
            is_mut,
            is_initialized: true,
        })
    }

    #[test]
    fn test_resolve_in_current_scope() {
        let mut scopes = ScopeStack::new();
        let x = Symbol::intern("x");
        scopes.declare(x, var(BaseKind::U32, false));
        assert!(scopes.resolve(x).is_some());
    }

    #[test]
    fn test_resolve_through_outer_scope() {
        let mut scopes = ScopeStack::new();
        let x = Symbol::intern("x");
        scopes.declare(x, var(BaseKind::U32, false));
        scopes.enter(RibKind::Block);
        assert!(scopes.resolve(x).is_some());
    }

    #[test]
    fn test_shadowing() {
        let mut scopes = ScopeStack::new();
        let x = Symbol::intern("x");
        scopes.declare(x, var(BaseKind::U32, false));
        scopes.enter(RibKind::Block);
        scopes.declare(x, var(BaseKind::F64, true));
        match scopes.resolve(x) {
            Some(Binding::Var(v)) => {
                assert_eq!(v.ty, Type::Simple(SimpleType { kind: BaseKind::F64, reference: RefKind::NonRef }))
            }
            other => panic!("expected var binding, got {:?}", other),
        }
        scopes.exit();
        match scopes.resolve(x) {
            Some(Binding::Var(v)) => {
                assert_eq!(v.ty, Type::Simple(SimpleType { kind: BaseKind::U32, reference: RefKind::NonRef }))
            }
            other => panic!("expected outer var binding restored, got {:?}", other),
        }
    }

    #[test]
    fn test_exit_past_root_is_noop() {
        let mut scopes = ScopeStack::new();
        scopes.exit();
        scopes.exit();
        let x = Symbol::intern("x");
        scopes.declare(x, var(BaseKind::U32, false));
        assert!(scopes.resolve(x).is_some());
    }

    #[test]
    fn test_undeclared_name_not_resolved() {
        let scopes = ScopeStack::new();
        assert!(scopes.resolve(Symbol::intern("nope")).is_none());
    }

    #[test]
    fn test_locality_inside_boundary() {
        let mut scopes = ScopeStack::new();
        let boundary = scopes.enter(RibKind::Function);
        let p = Symbol::intern("p");
        scopes.declare(p, var(BaseKind::U32, false));
        scopes.enter(RibKind::Block);
        let (_, external) = scopes.resolve_with_locality(p, boundary).unwrap();
        assert!(!external);
    }

    #[test]
    fn test_locality_outside_boundary() {
        let mut scopes = ScopeStack::new();
        let g = Symbol::intern("g");
        scopes.declare(g, var(BaseKind::U32, false));
        let boundary = scopes.enter(RibKind::Function);
        let (_, external) = scopes.resolve_with_locality(g, boundary).unwrap();
        assert!(external);
    }

    #[test]
    fn test_inside_loop_detection() {
        let mut scopes = ScopeStack::new();
        assert!(!scopes.inside_loop());
        scopes.enter(RibKind::Loop);
        assert!(scopes.inside_loop());
        scopes.enter(RibKind::Block);
        assert!(scopes.inside_loop());
    }

    #[test]
    fn test_duplicate_in_same_scope_detected() {
        let mut scopes = ScopeStack::new();
        let x = Symbol::intern("dup");
        assert!(!scopes.declared_in_current_scope(x));
        scopes.declare(x, var(BaseKind::U32, false));
        assert!(scopes.declared_in_current_scope(x));
    }
}
