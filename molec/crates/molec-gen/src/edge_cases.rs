//! Codegen edge cases: the open questions spec.md §9 leaves for this phase
//! (lambda-call lowering, string-op rejection), plus the awkward corners of
//! the lowering rules (return-coverage insertion, non-exhaustive `match`,
//! taking a reference to a non-place expression).
