//! Collision-free identifier allocation across nested blocks.
//!
//! Generated functions nest arbitrarily: hook closures inside option-aware
//! compose closures inside `impl` blocks. Every binding the generator
//! introduces goes through a [`ScopeStack`] whose nesting mirrors the emitted
//! blocks, so a new binding never shadows one a nested closure still needs.
//!
//! ```text
//! module scope        symbols, import qualifiers, shortcuts, options types
//!   impl scope        compose, is_zero, forwarders
//!     method scope    x, opts, ret, params
//!       closure scope captured h1/h2/cb + params
//! ```
//!
//! Suffixes are tried in order (`t`, `t0`, `t1`, ...), so the same sequence
//! of requests always yields the same names.

use std::panic::Location;

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::trace;

use crate::error::DeclSite;
use crate::naming::{first_char, is_keyword, is_predeclared};
use crate::GenError;

#[derive(Default)]
struct Scope {
    names: FxHashMap<String, DeclSite>,
}

impl Scope {
    /// Register `name`; returns `false` if it is already taken.
    fn set(&mut self, name: &str, site: DeclSite) -> bool {
        if self.names.contains_key(name) {
            return false;
        }
        self.names.insert(name.to_owned(), site);
        true
    }
}

/// Stack of lexical scopes; the bottom entry is module scope.
pub struct ScopeStack {
    scopes: Vec<Scope>,
    module_symbols: FxHashSet<String>,
}

impl ScopeStack {
    /// A stack holding only module scope.
    ///
    /// `module_symbols` are names visible at module scope that the generator
    /// did not declare (types, functions, imports of the package).
    pub fn new<I, S>(module_symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ScopeStack {
            scopes: vec![Scope::default()],
            module_symbols: module_symbols.into_iter().map(Into::into).collect(),
        }
    }

    /// Number of open scopes, module scope included.
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_module_scope(&self) -> bool {
        self.scopes.len() == 1
    }

    pub fn enter(&mut self) {
        self.scopes.push(Scope::default());
    }

    pub fn exit(&mut self) {
        debug_assert!(self.scopes.len() > 1, "exit called at module scope");
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    /// Declare a binding derived from `base`, renaming it until it is free.
    #[track_caller]
    pub fn declare(&mut self, base: &str) -> Result<String, GenError> {
        let site = DeclSite::Generator(Location::caller());
        let base = if is_predeclared(base) {
            first_char(base)?
        } else {
            first_char(base)?;
            base
        };
        Ok(self.allocate(base, site))
    }

    /// Declare the qualifier of an imported module at module scope.
    ///
    /// Unlike [`declare`](Self::declare), predeclared names are kept whole
    /// (`std::str` imports as `str`). A taken name gets a numeric suffix.
    #[track_caller]
    pub fn declare_import(&mut self, name: &str) -> Result<String, GenError> {
        let site = DeclSite::Generator(Location::caller());
        first_char(name)?;
        if !self.is_module_scope() {
            return Err(GenError::unsupported(format!(
                "import `{name}` declared below module scope"
            )));
        }
        Ok(self.allocate(name, site))
    }

    fn allocate(&mut self, base: &str, site: DeclSite) -> String {
        let at_module = self.is_module_scope();
        let mut suffix = 0usize;
        let mut candidate = base.to_owned();
        loop {
            let free = !is_keyword(&candidate)
                && !(at_module && self.module_symbols.contains(&candidate))
                && self.current().set(&candidate, site);
            if free {
                trace!(base, name = %candidate, depth = self.depth(), "declared");
                return candidate;
            }
            candidate = format!("{base}{suffix}");
            suffix += 1;
        }
    }

    /// Declare exactly `name`.
    #[track_caller]
    pub fn must_declare(&mut self, name: &str) -> Result<(), GenError> {
        let site = DeclSite::Generator(Location::caller());
        if is_keyword(name) {
            return Err(GenError::unsupported(format!(
                "`{name}` is a reserved word and can't be declared"
            )));
        }
        if self.is_module_scope() && self.module_symbols.contains(name) {
            return Err(GenError::HardCollision {
                name: name.to_owned(),
                prior: DeclSite::ModuleScope,
            });
        }
        self.claim(name, site)
    }

    /// Mark names bound outside the current block (closure captures) as
    /// taken, without renaming them.
    #[track_caller]
    pub fn capture(&mut self, names: &[&str]) -> Result<(), GenError> {
        let site = DeclSite::Generator(Location::caller());
        for name in names {
            self.claim(name, site)?;
        }
        Ok(())
    }

    fn claim(&mut self, name: &str, site: DeclSite) -> Result<(), GenError> {
        let scope = self.current();
        if let Some(&prior) = scope.names.get(name) {
            return Err(GenError::HardCollision {
                name: name.to_owned(),
                prior,
            });
        }
        scope.set(name, site);
        Ok(())
    }

    fn current(&mut self) -> &mut Scope {
        let last = self.scopes.len() - 1;
        &mut self.scopes[last]
    }
}
