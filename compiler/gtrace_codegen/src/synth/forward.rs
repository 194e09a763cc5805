//! Forwarders: call a hook if it is set, otherwise return a zero value.
//!
//! A missing continuation at any stage degrades to a callable that does
//! nothing, so callers never check for absence themselves.

use gtrace_ir::{Func, Hook, HookResult};

use super::signature::Shape;
use super::{Writer, ARC};
use crate::stack::ensure_sufficient_stack;
use crate::GenError;

impl Writer<'_> {
    pub(super) fn forwarder(&mut self, hook: &Hook) -> Result<(), GenError> {
        let func = &hook.func;
        self.scope(|w| {
            let args = w.declare_params(&func.params)?;
            let params = w.typed_params(&args, &func.params);
            w.code(&["pub(super) fn ", &hook.name, "(&self"]);
            if !params.is_empty() {
                w.code(&[", ", &params]);
            }
            w.code(&[")"]);
            if let Some(result) = w.result_type(func, Shape::Safe)? {
                w.code(&[" -> ", &result]);
            }
            w.line(&[" {"]);
            w.block(|w| {
                w.capture_all(&args)?;
                let f = w.declare("f")?;
                w.line(&["let Some(", &f, ") = &self.", &hook.name, " else {"]);
                w.block(|w| w.zero_return(func))?;
                w.line(&["};"]);
                w.forward_call(func, &f, &args)
            })?;
            w.line(&["}"]);
            Ok(())
        })
    }

    /// Call `callee` and hand back its result in safe shape.
    fn forward_call(&mut self, func: &Func, callee: &str, args: &[String]) -> Result<(), GenError> {
        let call = format!("{callee}({})", args.join(", "));
        let Some(next) = func.continuation() else {
            self.line(&[&call]);
            return Ok(());
        };

        let res = self.declare("res")?;
        self.line(&["let Some(", &res, ") = ", &call, " else {"]);
        self.block(|w| w.zero_return(func))?;
        self.line(&["};"]);
        if next.continuation().is_none() {
            self.line(&[&res]);
            return Ok(());
        }

        self.scope(|w| {
            w.capture(&[&res])?;
            let args = w.declare_params(&next.params)?;
            let params = w.typed_params(&args, &next.params);
            w.code(&[ARC, "::new(move |", &params, "|"]);
            if let Some(result) = w.result_type(next, Shape::Safe)? {
                w.code(&[" -> ", &result]);
            }
            w.line(&[" {"]);
            w.block(|w| {
                w.capture(&[&res])?;
                w.capture_all(&args)?;
                ensure_sufficient_stack(|| w.forward_call(next, &res, &args))
            })?;
            w.line(&["})"]);
            Ok(())
        })
    }

    /// Leave the function with the zero value of `func`'s result.
    fn zero_return(&mut self, func: &Func) -> Result<(), GenError> {
        if !func.has_result() {
            self.line(&["return;"]);
            return Ok(());
        }
        self.code(&["return "]);
        self.zero_value(func)?;
        self.line(&[";"]);
        Ok(())
    }

    /// The zero value of `func`'s result, in safe shape.
    fn zero_value(&mut self, func: &Func) -> Result<(), GenError> {
        match &func.result {
            None => self.code(&["()"]),
            Some(HookResult::Trace(trace)) => self.code(&[&trace.name, "::default()"]),
            Some(HookResult::Continuation(next)) => {
                let params = self.ignored_params(&next.params);
                self.code(&[ARC, "::new(|", &params, "|"]);
                match self.result_type(next, Shape::Safe)? {
                    None => self.code(&[" {})"]),
                    Some(result) => {
                        self.line(&[" -> ", &result, " {"]);
                        self.block(|w| {
                            ensure_sufficient_stack(|| w.zero_value(next))?;
                            w.out.newline();
                            Ok(())
                        })?;
                        self.code(&["})"]);
                    }
                }
            }
        }
        Ok(())
    }
}
