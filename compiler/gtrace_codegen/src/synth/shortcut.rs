//! Shortcuts: module-level functions taking struct fields as arguments.

use gtrace_ir::{Func, Hook, Param, Trace};

use super::signature::{flatten, Shape};
use super::{Writer, ARC};
use crate::naming::shortcut_name;
use crate::stack::ensure_sufficient_stack;
use crate::GenError;

impl Writer<'_> {
    pub(super) fn shortcut(&mut self, trace: &Trace, hook: &Hook) -> Result<(), GenError> {
        let name = shortcut_name(&trace.name, &hook.name)?;
        self.must_declare(&name)?;
        let func = &hook.func;
        self.scope(|w| {
            let t = w.declare("t")?;
            let flat = flatten(&func.params)?;
            let args = w.declare_params(&flat)?;
            let params = w.typed_params(&args, &flat);

            w.out.newline();
            w.line(&["/// Calls the `", &hook.name, "` hook of `", &t, "`."]);
            w.code(&["pub fn ", &name, "(", &t, ": &", &trace.name]);
            if !params.is_empty() {
                w.code(&[", ", &params]);
            }
            w.code(&[")"]);
            if let Some(result) = w.result_type(func, Shape::Flat)? {
                w.code(&[" -> ", &result]);
            }
            w.line(&[" {"]);
            w.block(|w| {
                w.capture(&[&t])?;
                w.capture_all(&args)?;
                let vars = w.rebuild_params(&func.params, &args)?;
                let call = format!("{t}.{}({})", hook.name, vars.join(", "));
                w.shortcut_result(func, &call)
            })?;
            w.line(&["}"]);
            Ok(())
        })
    }

    /// Rebuild struct arguments from their flattened fields.
    ///
    /// `flat` holds one binding per flattened parameter; the result holds
    /// one expression per declared parameter.
    fn rebuild_params(&mut self, params: &[Param], flat: &[String]) -> Result<Vec<String>, GenError> {
        let mut flat = flat.iter();
        let mut vars = Vec::with_capacity(params.len());
        for param in params {
            if !param.ty.is_struct() {
                if let Some(arg) = flat.next() {
                    vars.push(arg.clone());
                }
                continue;
            }
            let p = self.declare("p")?;
            let ty = self.ty(&param.ty);
            let fields: Vec<_> = param.ty.exported_fields().collect();
            if fields.is_empty() {
                self.line(&["let ", &p, " = ", &ty, "::default();"]);
            } else {
                self.line(&["let mut ", &p, " = ", &ty, "::default();"]);
            }
            for (field, arg) in fields.iter().zip(flat.by_ref()) {
                self.line(&[&p, ".", &field.name, " = ", arg, ";"]);
            }
            vars.push(p);
        }
        Ok(vars)
    }

    /// Emit `call` as the tail, wrapping continuations into flat callables.
    fn shortcut_result(&mut self, func: &Func, call: &str) -> Result<(), GenError> {
        let Some(next) = func.continuation() else {
            self.line(&[call]);
            return Ok(());
        };
        let res = self.declare("res")?;
        self.line(&["let ", &res, " = ", call, ";"]);
        self.flat_closure(next, &res)?;
        self.out.newline();
        Ok(())
    }

    /// A callable with flattened parameters that forwards to `callee`.
    fn flat_closure(&mut self, func: &Func, callee: &str) -> Result<(), GenError> {
        self.scope(|w| {
            w.capture(&[callee])?;
            let flat = flatten(&func.params)?;
            let args = w.declare_params(&flat)?;
            let params = w.typed_params(&args, &flat);
            w.code(&[ARC, "::new(move |", &params, "|"]);
            if let Some(result) = w.result_type(func, Shape::Flat)? {
                w.code(&[" -> ", &result]);
            }
            w.line(&[" {"]);
            w.block(|w| {
                w.capture(&[callee])?;
                w.capture_all(&args)?;
                let vars = w.rebuild_params(&func.params, &args)?;
                let call = format!("{callee}({})", vars.join(", "));
                ensure_sufficient_stack(|| w.shortcut_result(func, &call))
            })?;
            w.code(&["})"]);
            Ok(())
        })
    }
}
