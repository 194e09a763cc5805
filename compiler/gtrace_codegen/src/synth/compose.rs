//! `compose` and `is_zero`.
//!
//! A composed hook calls the receiver's hook, then the argument's. Each call
//! runs through the guard helper so a panic in one does not skip the other
//! when a panic callback is set. The first call gets clones of the
//! arguments and the second takes them by value.

use gtrace_ir::{Func, Hook, HookResult, Trace};

use super::options::options_name;
use super::signature::Shape;
use super::{Writer, ARC};
use crate::stack::ensure_sufficient_stack;
use crate::GenError;

impl Writer<'_> {
    pub(super) fn compose(&mut self, trace: &Trace) -> Result<(), GenError> {
        let options = options_name(trace);
        self.scope(|w| {
            let x = w.declare("x")?;
            let opts = w.declare("opts")?;
            let ret = w.declare("ret")?;
            w.line(&[
                "/// Returns a trace whose hooks call the hooks of `self`, then those of `",
                &x,
                "`.",
            ]);
            w.line(&[
                "pub fn compose(&self, ", &x, ": &", &trace.name, ", ", &opts, ": ", &options,
                ") -> ", &trace.name, " {",
            ]);
            w.block(|w| {
                if trace.hooks.is_empty() {
                    w.line(&["let _ = (", &x, ", ", &opts, ");"]);
                    w.line(&[&trace.name, "::default()"]);
                    return Ok(());
                }
                w.line(&["let mut ", &ret, " = ", &trace.name, "::default();"]);
                for hook in &trace.hooks {
                    w.compose_hook(hook, &x, &opts, &ret)?;
                }
                w.line(&[&ret]);
                Ok(())
            })?;
            w.line(&["}"]);
            Ok(())
        })
    }

    fn compose_hook(&mut self, hook: &Hook, x: &str, opts: &str, ret: &str) -> Result<(), GenError> {
        self.line(&["{"]);
        self.block(|w| {
            let h1 = w.declare("h1")?;
            let h2 = w.declare("h2")?;
            w.line(&["let ", &h1, " = self.", &hook.name, ".clone();"]);
            w.line(&["let ", &h2, " = ", x, ".", &hook.name, ".clone();"]);
            w.code(&[ret, ".", &hook.name, " = "]);
            let panic_callback = format!("{opts}.panic_callback");
            w.compose_call(&hook.func, &h1, &h2, &panic_callback)?;
            w.line(&[";"]);
            Ok(())
        })?;
        self.line(&["}"]);
        Ok(())
    }

    /// An `Option` holding a callable that runs `h1`, then `h2`.
    ///
    /// Leaves the cursor right after the closing brace of the `if` expression.
    fn compose_call(&mut self, func: &Func, h1: &str, h2: &str, cb_src: &str) -> Result<(), GenError> {
        self.line(&["if ", h1, ".is_none() && ", h2, ".is_none() {"]);
        self.block(|w| {
            w.line(&["None"]);
            Ok(())
        })?;
        self.line(&["} else {"]);
        self.block(|w| {
            w.capture(&[h1, h2])?;
            let cb = w.declare("panic_callback")?;
            w.line(&["let ", &cb, " = ", cb_src, ".clone();"]);
            w.code(&["Some(", ARC, "::new("]);
            w.compose_closure(func, h1, h2, &cb)?;
            w.line(&["))"]);
            Ok(())
        })?;
        self.code(&["}"]);
        Ok(())
    }

    fn compose_closure(&mut self, func: &Func, h1: &str, h2: &str, cb: &str) -> Result<(), GenError> {
        let guard = self.guard_name()?;
        self.scope(|w| {
            w.capture(&[h1, h2, cb, &guard])?;
            let args = w.declare_params(&func.params)?;
            let params = w.typed_params(&args, &func.params);
            w.code(&["move |", &params, "|"]);
            if let Some(result) = w.result_type(func, Shape::Raw)? {
                w.code(&[" -> ", &result]);
            }
            w.line(&[" {"]);
            w.block(|w| {
                w.capture(&[h1, h2, cb, &guard])?;
                w.capture_all(&args)?;
                w.compose_body(func, [h1, h2], cb, &guard, &args)
            })?;
            w.code(&["}"]);
            Ok(())
        })
    }

    fn compose_body(
        &mut self,
        func: &Func,
        hooks: [&str; 2],
        cb: &str,
        guard: &str,
        args: &[String],
    ) -> Result<(), GenError> {
        let cloned: Vec<String> = args.iter().map(|a| format!("Clone::clone(&{a})")).collect();
        let calls = [cloned.join(", "), args.join(", ")];

        let Some(result) = &func.result else {
            for (hook, call_args) in hooks.iter().zip(&calls) {
                self.scope(|w| {
                    w.capture(&[cb, guard])?;
                    w.capture_all(args)?;
                    let h = w.declare("h")?;
                    w.line(&["if let Some(", &h, ") = &", hook, " {"]);
                    w.block(|w| {
                        w.line(&[guard, "(&", cb, ", || ", &h, "(", call_args, "));"]);
                        Ok(())
                    })?;
                    w.line(&["}"]);
                    Ok(())
                })?;
            }
            return Ok(());
        };

        let mut results = Vec::with_capacity(2);
        for (hook, call_args) in hooks.iter().zip(&calls) {
            let r = self.declare("r")?;
            self.line(&["let ", &r, " = match &", hook, " {"]);
            self.block(|w| {
                w.scope(|w| {
                    w.capture(&[cb, guard])?;
                    w.capture_all(args)?;
                    let h = w.declare("h")?;
                    w.line(&[
                        "Some(", &h, ") => ", guard, "(&", cb, ", || ", &h, "(", call_args, ")),",
                    ]);
                    Ok(())
                })?;
                w.line(&["None => Default::default(),"]);
                Ok(())
            })?;
            self.line(&["};"]);
            results.push(r);
        }

        match result {
            HookResult::Continuation(next) => {
                ensure_sufficient_stack(|| self.compose_call(next, &results[0], &results[1], cb))?;
                self.out.newline();
            }
            HookResult::Trace(_) => {
                self.line(&[&results[0], ".compose(&", &results[1], ", Default::default())"]);
            }
        }
        Ok(())
    }

    /// `true` only when every hook is unset.
    pub(super) fn is_zero(&mut self, trace: &Trace) {
        self.line(&["/// Reports whether no hook is set."]);
        self.line(&["pub fn is_zero(&self) -> bool {"]);
        self.out.indent();
        if trace.hooks.is_empty() {
            self.line(&["true"]);
        } else {
            let checks: Vec<String> = trace
                .hooks
                .iter()
                .map(|h| format!("self.{}.is_none()", h.name))
                .collect();
            self.line(&[&checks.join(" && ")]);
        }
        self.out.dedent();
        self.line(&["}"]);
    }
}
