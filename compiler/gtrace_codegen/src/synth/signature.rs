//! Rendering of parameter and hook types.
//!
//! A hook function is rendered in one of three shapes:
//!
//! - raw: the field type; a continuation result is `Option<raw(next)>`
//! - safe: what forwarders return; continuations are plain callables
//! - flat: what shortcuts return; struct parameters are flattened

use gtrace_ir::{Func, HookResult, Param, Ty};

use super::{Writer, ARC};
use crate::stack::ensure_sufficient_stack;
use crate::GenError;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(super) enum Shape {
    Raw,
    Safe,
    Flat,
}

impl Writer<'_> {
    /// Source text of `ty` as seen from the generated module.
    pub(super) fn ty(&self, ty: &Ty) -> String {
        if let Some(pointee) = ty.pointee() {
            return format!("&{}", self.ty(pointee));
        }
        match ty.named_ty() {
            Some(named) => match named.module {
                Some(module) if Some(module.path()) != self.package.path.as_deref() => {
                    let qualifier = self
                        .qualifiers
                        .get(module.path())
                        .map_or(module.name(), String::as_str);
                    format!("{qualifier}::{}", named.name)
                }
                _ => named.name.to_owned(),
            },
            None => ty.to_string(),
        }
    }

    /// `::std::sync::Arc<dyn Fn(..) -> R + Send + Sync>` for `func`.
    pub(super) fn func_type(&self, func: &Func, shape: Shape) -> Result<String, GenError> {
        let params = if shape == Shape::Flat {
            flatten(&func.params)?
        } else {
            func.params.clone()
        };
        let params: Vec<String> = params.iter().map(|p| self.ty(&p.ty)).collect();
        let result = match self.result_type(func, shape)? {
            Some(result) => format!(" -> {result}"),
            None => String::new(),
        };
        Ok(format!(
            "{ARC}<dyn Fn({}){result} + Send + Sync>",
            params.join(", ")
        ))
    }

    /// What invoking `func` yields, rendered in `shape`.
    pub(super) fn result_type(
        &self,
        func: &Func,
        shape: Shape,
    ) -> Result<Option<String>, GenError> {
        let rendered = match &func.result {
            None => return Ok(None),
            Some(HookResult::Trace(trace)) => trace.name.clone(),
            Some(HookResult::Continuation(next)) => {
                let inner = ensure_sufficient_stack(|| self.func_type(next, shape))?;
                match shape {
                    Shape::Raw => format!("Option<{inner}>"),
                    Shape::Safe | Shape::Flat => inner,
                }
            }
        };
        Ok(Some(rendered))
    }

    /// `_: A, _: B` for a closure that ignores its arguments.
    pub(super) fn ignored_params(&self, params: &[Param]) -> String {
        params
            .iter()
            .map(|p| format!("_: {}", self.ty(&p.ty)))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// `a: A, b: B` for already declared bindings.
    pub(super) fn typed_params(&self, names: &[String], params: &[Param]) -> String {
        names
            .iter()
            .zip(params)
            .map(|(name, p)| format!("{name}: {}", self.ty(&p.ty)))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Replace each struct parameter by its exported fields, one level deep.
pub(super) fn flatten(params: &[Param]) -> Result<Vec<Param>, GenError> {
    let mut flat = Vec::with_capacity(params.len());
    for param in params {
        if !param.ty.is_struct() {
            flat.push(param.clone());
            continue;
        }
        for field in param.ty.exported_fields() {
            if field.ty.is_struct() {
                return Err(GenError::unsupported(format!(
                    "field `{}` of `{}` is itself a struct; only one level is flattened",
                    field.name, param.ty
                )));
            }
            flat.push(Param::named(field.name.clone(), field.ty.clone()));
        }
    }
    Ok(flat)
}
