//! Import resolution for generated companions.
//!
//! Walks hook signatures (parameters, exported fields of struct parameters,
//! continuation stages and nested traces) and produces the `use` block:
//!
//! ```text
//! collect(trace)*  ->  dedup by module path (first display name wins)
//!                  ->  order: std roots by path, blank line, external by path
//! ```
//!
//! Which first segments count as standard library is decided once per std
//! root per process and then shared read-only between concurrent runs.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use gtrace_ir::{Func, HookResult, Package, Trace, Ty};
use parking_lot::RwLock;
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

use crate::naming::is_identifier;
use crate::stack::ensure_sufficient_stack;
use crate::GenError;

/// Library roots assumed when no std root is configured.
const BUILTIN_ROOTS: &[&str] = &["alloc", "core", "proc_macro", "std", "test"];

/// Directories under a std root that are not importable libraries.
const IGNORED_ROOTS: &[&str] = &["rtstartup", "sysroot"];

/// A module referenced by generated code.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Dep {
    /// Full module path, e.g. `std::time`.
    pub path: String,
    /// Name types from this module are qualified with.
    pub name: String,
}

impl Dep {
    /// The `use` item importing this module.
    pub fn use_item(&self) -> String {
        let last = self.path.rsplit("::").next().unwrap_or_default();
        if last == self.name {
            format!("use {};", self.path)
        } else {
            format!("use {} as {};", self.path, self.name)
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DepKind {
    Std,
    External,
}

/// First path segments that belong to the standard library.
#[derive(Debug)]
pub struct StdLib {
    roots: FxHashSet<String>,
}

impl StdLib {
    pub(crate) fn builtin() -> Self {
        StdLib {
            roots: BUILTIN_ROOTS.iter().map(|&r| r.to_owned()).collect(),
        }
    }

    fn scan(root: &Path) -> Result<Self, GenError> {
        let context = || format!("can't list std root {}", root.display());
        let entries = fs::read_dir(root).map_err(|e| GenError::io(context(), e))?;
        let mut roots = FxHashSet::default();
        for entry in entries {
            let entry = entry.map_err(|e| GenError::io(context(), e))?;
            let file_type = entry.file_type().map_err(|e| GenError::io(context(), e))?;
            if !file_type.is_dir() {
                continue;
            }
            let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
                continue;
            };
            if is_identifier(&name) && !IGNORED_ROOTS.contains(&name.as_str()) {
                roots.insert(name);
            }
        }
        debug!(root = %root.display(), count = roots.len(), "scanned std roots");
        Ok(StdLib { roots })
    }

    pub fn classify(&self, path: &str) -> DepKind {
        let first = path.trim_start_matches("::").split("::").next().unwrap_or_default();
        if self.roots.contains(first) {
            DepKind::Std
        } else {
            DepKind::External
        }
    }
}

type StdCache = RwLock<FxHashMap<PathBuf, Arc<StdLib>>>;

fn std_cache() -> &'static StdCache {
    static CACHE: OnceLock<StdCache> = OnceLock::new();
    CACHE.get_or_init(|| RwLock::new(FxHashMap::default()))
}

/// The classification table for `root`, computed on first use.
pub fn std_lib(root: Option<&Path>) -> Result<Arc<StdLib>, GenError> {
    let Some(root) = root else {
        static BUILTIN: OnceLock<Arc<StdLib>> = OnceLock::new();
        return Ok(Arc::clone(BUILTIN.get_or_init(|| Arc::new(StdLib::builtin()))));
    };
    if let Some(lib) = std_cache().read().get(root) {
        return Ok(Arc::clone(lib));
    }
    let mut cache = std_cache().write();
    if let Some(lib) = cache.get(root) {
        return Ok(Arc::clone(lib));
    }
    let lib = Arc::new(StdLib::scan(root)?);
    cache.insert(root.to_path_buf(), Arc::clone(&lib));
    Ok(lib)
}

/// Collects the modules referenced by a package's traces.
pub struct ImportResolver<'p> {
    local_path: Option<&'p str>,
    deps: Vec<Dep>,
    seen: FxHashSet<String>,
    visited: FxHashSet<String>,
}

impl<'p> ImportResolver<'p> {
    pub fn new(package: &'p Package) -> Self {
        ImportResolver {
            local_path: package.path.as_deref(),
            deps: Vec::new(),
            seen: FxHashSet::default(),
            visited: FxHashSet::default(),
        }
    }

    /// Add every module referenced by `trace`'s hook signatures.
    pub fn collect(&mut self, trace: &Trace) {
        if !self.visited.insert(trace.name.clone()) {
            return;
        }
        for hook in &trace.hooks {
            self.collect_func(&hook.func);
        }
    }

    fn collect_func(&mut self, func: &Func) {
        for param in &func.params {
            self.collect_ty(&param.ty);
            for field in param.ty.exported_fields() {
                self.collect_ty(&field.ty);
            }
        }
        match &func.result {
            Some(HookResult::Continuation(next)) => {
                ensure_sufficient_stack(|| self.collect_func(next));
            }
            Some(HookResult::Trace(nested)) => {
                ensure_sufficient_stack(|| self.collect(nested));
            }
            None => {}
        }
    }

    fn collect_ty(&mut self, ty: &Ty) {
        if let Some(pointee) = ty.pointee() {
            return self.collect_ty(pointee);
        }
        let Some(module) = ty.named_ty().and_then(|n| n.module) else {
            return;
        };
        if Some(module.path()) == self.local_path {
            return;
        }
        if self.seen.insert(module.path().to_owned()) {
            self.deps.push(Dep {
                path: module.path().to_owned(),
                name: module.name().to_owned(),
            });
        }
    }

    pub fn finish(self, std: &StdLib) -> Imports {
        order(self.deps, std)
    }
}

/// An ordered import block.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Imports {
    pub std: Vec<Dep>,
    pub external: Vec<Dep>,
}

impl Imports {
    pub fn is_empty(&self) -> bool {
        self.std.is_empty() && self.external.is_empty()
    }
}

/// Split `deps` into std and external groups, each sorted by path.
pub fn order(deps: Vec<Dep>, std: &StdLib) -> Imports {
    let (mut std_deps, mut external): (Vec<_>, Vec<_>) = deps
        .into_iter()
        .partition(|d| std.classify(&d.path) == DepKind::Std);
    std_deps.sort_by(|a, b| a.path.cmp(&b.path));
    external.sort_by(|a, b| a.path.cmp(&b.path));
    debug!(std = std_deps.len(), external = external.len(), "resolved imports");
    Imports {
        std: std_deps,
        external,
    }
}
