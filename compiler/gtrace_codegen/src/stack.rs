//! Stack growth for recursion over continuation and nested-trace results.
//!
//! Model nesting is finite but unbounded; each level of a curried hook adds a
//! few frames to every synthesis pass that walks it.

const RED_ZONE: usize = 64 * 1024;
const GROW_BY: usize = 1024 * 1024;

/// Run `f`, first growing the stack if less than the red zone remains.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, GROW_BY, f)
}

#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
