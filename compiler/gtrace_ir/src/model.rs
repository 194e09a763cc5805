//! Packages, traces, hooks and their signatures.

use std::sync::Arc;

use crate::Ty;

/// All traces declared in one module, plus what generated code must respect
/// about that module.
#[derive(Clone, Debug, Default)]
pub struct Package {
    /// Module name, used in diagnostics.
    pub name: String,
    /// Module path; named types whose module has this path are local.
    pub path: Option<String>,
    /// Build/platform constraints, emitted verbatim.
    pub build_constraints: Vec<String>,
    /// Names already declared at module scope.
    pub symbols: Vec<String>,
    pub traces: Vec<Arc<Trace>>,
}

impl Package {
    pub fn new(name: impl Into<String>) -> Self {
        Package {
            name: name.into(),
            ..Package::default()
        }
    }

    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_constraint(mut self, constraint: impl Into<String>) -> Self {
        self.build_constraints.push(constraint.into());
        self
    }

    #[must_use]
    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbols.push(symbol.into());
        self
    }

    #[must_use]
    pub fn with_trace(mut self, trace: impl Into<Arc<Trace>>) -> Self {
        self.traces.push(trace.into());
        self
    }
}

/// A bundle of independently optional hooks.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Trace {
    pub name: String,
    /// Nested traces are returned by other hooks and get an `is_zero` check.
    pub nested: bool,
    pub hooks: Vec<Hook>,
}

impl Trace {
    pub fn new(name: impl Into<String>) -> Self {
        Trace {
            name: name.into(),
            ..Trace::default()
        }
    }

    #[must_use]
    pub fn nested(mut self) -> Self {
        self.nested = true;
        self
    }

    #[must_use]
    pub fn hook(mut self, name: impl Into<String>, func: Func) -> Self {
        self.hooks.push(Hook {
            name: name.into(),
            func,
        });
        self
    }
}

/// A named hook slot.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Hook {
    pub name: String,
    pub func: Func,
}

/// What invoking a hook (or one of its continuations) yields.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum HookResult {
    /// A further callable stage.
    Continuation(Box<Func>),
    /// A nested trace value.
    Trace(Arc<Trace>),
}

/// A callable signature.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Func {
    pub params: Vec<Param>,
    pub result: Option<HookResult>,
}

impl Func {
    pub fn new() -> Self {
        Func::default()
    }

    #[must_use]
    pub fn param(mut self, param: Param) -> Self {
        self.params.push(param);
        self
    }

    /// Make invoking this function return `next`.
    #[must_use]
    pub fn continues_with(mut self, next: Func) -> Self {
        self.result = Some(HookResult::Continuation(Box::new(next)));
        self
    }

    /// Make invoking this function return a `trace` value.
    #[must_use]
    pub fn yields_trace(mut self, trace: impl Into<Arc<Trace>>) -> Self {
        self.result = Some(HookResult::Trace(trace.into()));
        self
    }

    pub fn has_result(&self) -> bool {
        self.result.is_some()
    }

    /// The next stage, if invoking this function yields one.
    pub fn continuation(&self) -> Option<&Func> {
        match &self.result {
            Some(HookResult::Continuation(next)) => Some(&**next),
            _ => None,
        }
    }
}

/// A function parameter.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Param {
    pub name: Option<String>,
    pub ty: Ty,
}

impl Param {
    pub fn named(name: impl Into<String>, ty: Ty) -> Self {
        Param {
            name: Some(name.into()),
            ty,
        }
    }

    pub fn unnamed(ty: Ty) -> Self {
        Param { name: None, ty }
    }
}
