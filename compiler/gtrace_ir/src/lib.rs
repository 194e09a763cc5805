//! gtrace IR - the input model of the hook-companion generator
//!
//! A static-analysis front end reads declared trace structures and hands the
//! generator one [`Package`] per module:
//!
//! ```text
//! Package
//!   └── Trace (ordered, `nested` enables `is_zero`)
//!         └── Hook (name + Func)
//!               └── Func (ordered Params, 0 or 1 HookResult)
//!                     ├── HookResult::Continuation(Func)  (curried hook)
//!                     └── HookResult::Trace(Trace)        (nested composite)
//! ```
//!
//! The model is built once, shared read-only and never mutated by the
//! generator. Parameter types are described by [`Ty`], which only answers the
//! questions the generator asks: is it a struct, which fields are exported,
//! does it wrap a pointee, and which named type (and module) is it.

mod model;
mod ty;

pub use model::{Func, Hook, HookResult, Package, Param, Trace};
pub use ty::{Field, ModuleRef, NamedTy, Ty};

#[cfg(test)]
mod tests;
