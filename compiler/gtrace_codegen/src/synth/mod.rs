//! Code synthesis for one package.
//!
//! # Architecture
//!
//! ```text
//! Package
//!    ↓  ImportResolver (one pass over every trace)
//! header + `use` block
//!    ↓  per trace
//! options type + setter → impl { compose, is_zero, forwarders }
//!    ↓  per trace, per hook
//! shortcuts
//!    ↓
//! guard helper (only if some trace has hooks)
//! ```
//!
//! Every binding goes through the [`ScopeStack`]; every `block` both indents
//! the [`Emitter`] and opens a scope, so the two stay in lockstep.

mod compose;
mod forward;
mod options;
mod shortcut;
mod signature;

use gtrace_ir::{Package, Param, Trace};
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::emitter::Emitter;
use crate::imports::{ImportResolver, StdLib};
use crate::naming::{is_identifier, is_keyword, param_base};
use crate::scope::ScopeStack;
use crate::GenError;

/// Fully qualified `Arc`, immune to shadowing by the parent module.
const ARC: &str = "::std::sync::Arc";

/// Type of the panic callback stored in compose options.
const PANIC_CALLBACK: &str =
    "::std::sync::Arc<dyn Fn(Box<dyn ::std::any::Any + Send>) + Send + Sync>";

/// Synthesize the companion module for `package` into a fresh buffer.
pub(crate) fn write_package(
    package: &Package,
    std: &StdLib,
    tool_name: &str,
) -> Result<Emitter, GenError> {
    validate(package)?;
    let mut w = Writer::new(package);
    w.header(tool_name);
    w.imports(std)?;

    if package.traces.iter().any(|t| !t.hooks.is_empty()) {
        w.guard = Some(w.declare("guarded")?);
    }
    for trace in &package.traces {
        debug!(trace = %trace.name, hooks = trace.hooks.len(), nested = trace.nested, "synthesizing");
        w.options(trace)?;
        w.trace_impl(trace)?;
    }
    for trace in &package.traces {
        for hook in &trace.hooks {
            w.shortcut(trace, hook)?;
        }
    }
    w.guard_helper()?;
    Ok(w.out)
}

/// Names the generator pastes verbatim must be usable identifiers.
fn validate(package: &Package) -> Result<(), GenError> {
    let check = |what: &str, name: &str| {
        if is_identifier(name) && !is_keyword(name) {
            Ok(())
        } else {
            Err(GenError::unsupported(format!(
                "{what} name `{name}` in package `{}` is not an identifier",
                package.name
            )))
        }
    };
    for trace in &package.traces {
        check("trace", &trace.name)?;
        for hook in &trace.hooks {
            check("hook", &hook.name)?;
        }
    }
    Ok(())
}

pub(crate) struct Writer<'p> {
    out: Emitter,
    scopes: ScopeStack,
    package: &'p Package,
    /// Name of the emitted guarded-invocation helper.
    guard: Option<String>,
    /// Module path to the qualifier it was imported under.
    qualifiers: FxHashMap<String, String>,
}

impl<'p> Writer<'p> {
    fn new(package: &'p Package) -> Self {
        Writer {
            out: Emitter::new(),
            scopes: ScopeStack::new(package.symbols.iter().cloned()),
            package,
            guard: None,
            qualifiers: FxHashMap::default(),
        }
    }

    fn header(&mut self, tool_name: &str) {
        self.line(&["// Code generated by ", tool_name, ". DO NOT EDIT."]);
        for (i, constraint) in self.package.build_constraints.iter().enumerate() {
            if i == 0 {
                self.out.newline();
            }
            self.out.line(&[constraint]);
        }
        self.out.newline();
        self.line(&["use super::*;"]);
    }

    /// Emit the `use` block, giving every module a distinct qualifier.
    fn imports(&mut self, std: &StdLib) -> Result<(), GenError> {
        let mut resolver = ImportResolver::new(self.package);
        for trace in &self.package.traces {
            resolver.collect(trace);
        }
        let mut imports = resolver.finish(std);
        if imports.is_empty() {
            return Ok(());
        }
        for dep in imports.std.iter_mut().chain(&mut imports.external) {
            dep.name = self.scopes.declare_import(&dep.name)?;
            self.qualifiers.insert(dep.path.clone(), dep.name.clone());
        }
        self.out.newline();
        for dep in &imports.std {
            self.line(&[&dep.use_item()]);
        }
        if !imports.std.is_empty() && !imports.external.is_empty() {
            self.out.newline();
        }
        for dep in &imports.external {
            self.line(&[&dep.use_item()]);
        }
        Ok(())
    }

    fn code(&mut self, parts: &[&str]) {
        self.out.code(parts);
    }

    fn line(&mut self, parts: &[&str]) {
        self.out.line(parts);
    }

    /// Run `f` one level deeper, in a fresh scope.
    fn block<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, GenError>,
    ) -> Result<T, GenError> {
        self.out.indent();
        let result = self.scope(f);
        self.out.dedent();
        result
    }

    /// Run `f` in a fresh scope at the current indentation.
    fn scope<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, GenError>,
    ) -> Result<T, GenError> {
        self.scopes.enter();
        let result = f(self);
        self.scopes.exit();
        result
    }

    #[track_caller]
    fn declare(&mut self, base: &str) -> Result<String, GenError> {
        self.scopes.declare(base)
    }

    #[track_caller]
    fn must_declare(&mut self, name: &str) -> Result<(), GenError> {
        self.scopes.must_declare(name)
    }

    #[track_caller]
    fn capture(&mut self, names: &[&str]) -> Result<(), GenError> {
        self.scopes.capture(names)
    }

    #[track_caller]
    fn capture_all(&mut self, names: &[String]) -> Result<(), GenError> {
        let names: Vec<&str> = names.iter().map(String::as_str).collect();
        self.scopes.capture(&names)
    }

    /// Declare one binding per parameter.
    #[track_caller]
    fn declare_params(&mut self, params: &[Param]) -> Result<Vec<String>, GenError> {
        params
            .iter()
            .map(|p| {
                let base = param_base(p)?;
                if !is_identifier(&base) {
                    return Err(GenError::unsupported(format!(
                        "parameter name `{base}` of type `{}` is not an identifier",
                        p.ty
                    )));
                }
                self.declare(&base)
            })
            .collect()
    }

    /// The guard helper's name; only asked for when some trace has hooks.
    fn guard_name(&self) -> Result<String, GenError> {
        self.guard
            .clone()
            .ok_or_else(|| GenError::unsupported("guarded invocation requested without hooks"))
    }

    fn trace_impl(&mut self, trace: &Trace) -> Result<(), GenError> {
        self.out.newline();
        self.line(&["impl ", &trace.name, " {"]);
        self.block(|w| {
            w.must_declare("compose")?;
            if trace.nested {
                w.must_declare("is_zero")?;
            }
            for hook in &trace.hooks {
                w.must_declare(&hook.name)?;
            }

            w.compose(trace)?;
            if trace.nested {
                w.out.newline();
                w.is_zero(trace);
            }
            for hook in &trace.hooks {
                w.out.newline();
                w.forwarder(hook)?;
            }
            Ok(())
        })?;
        self.line(&["}"]);
        Ok(())
    }
}
