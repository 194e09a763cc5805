//! Compose options and the guarded-invocation helper.

use gtrace_ir::Trace;

use super::{Writer, ARC, PANIC_CALLBACK};
use crate::GenError;

pub(super) fn options_name(trace: &Trace) -> String {
    format!("{}ComposeOptions", trace.name)
}

impl Writer<'_> {
    /// The options type accepted by `compose`, with its panic-callback setter.
    pub(super) fn options(&mut self, trace: &Trace) -> Result<(), GenError> {
        let name = options_name(trace);
        self.must_declare(&name)?;

        self.out.newline();
        self.line(&["/// Options for [`", &trace.name, "::compose`]."]);
        self.line(&["#[derive(Clone, Default)]"]);
        self.line(&["pub struct ", &name, " {"]);
        self.block(|w| {
            w.line(&["panic_callback: Option<", PANIC_CALLBACK, ">,"]);
            Ok(())
        })?;
        self.line(&["}"]);

        self.out.newline();
        self.line(&["impl ", &name, " {"]);
        self.block(|w| {
            w.must_declare("with_panic_callback")?;
            w.scope(|w| {
                let cb = w.declare("cb")?;
                w.line(&["/// Routes panics raised by composed hooks to `", &cb, "`."]);
                w.line(&["///"]);
                w.line(&["/// The faulting hook's result becomes its default value."]);
                w.line(&["pub fn with_panic_callback<F>(mut self, ", &cb, ": F) -> Self"]);
                w.line(&["where"]);
                w.block(|w| {
                    w.line(&[
                        "F: Fn(Box<dyn ::std::any::Any + Send>) + Send + Sync + 'static,",
                    ]);
                    Ok(())
                })?;
                w.line(&["{"]);
                w.block(|w| {
                    w.line(&["self.panic_callback = Some(", ARC, "::new(", &cb, "));"]);
                    w.line(&["self"]);
                    Ok(())
                })?;
                w.line(&["}"]);
                Ok(())
            })
        })?;
        self.line(&["}"]);
        Ok(())
    }

    /// Emit the helper every composed hook calls through.
    pub(super) fn guard_helper(&mut self) -> Result<(), GenError> {
        let Some(guard) = self.guard.clone() else {
            return Ok(());
        };
        self.out.newline();
        self.line(&["/// Runs `f`; with a callback set, a panic is handed to it instead."]);
        self.scope(|w| {
            let cb = w.declare("panic_callback")?;
            let f = w.declare("f")?;
            w.line(&["fn ", &guard, "<R: Default>("]);
            w.block(|w| {
                w.line(&[&cb, ": &Option<", PANIC_CALLBACK, ">,"]);
                w.line(&[&f, ": impl FnOnce() -> R,"]);
                Ok(())
            })?;
            w.line(&[") -> R {"]);
            w.block(|w| {
                w.line(&["match ", &cb, " {"]);
                w.block(|w| {
                    w.scope(|w| {
                        let h = w.declare("h")?;
                        let r = w.declare("r")?;
                        let e = w.declare("e")?;
                        w.line(&[
                            "Some(", &h, ") => match ::std::panic::catch_unwind(",
                            "::std::panic::AssertUnwindSafe(", &f, ")) {",
                        ]);
                        w.block(|w| {
                            w.line(&["Ok(", &r, ") => ", &r, ","]);
                            w.line(&["Err(", &e, ") => {"]);
                            w.block(|w| {
                                w.line(&[&h, "(", &e, ");"]);
                                w.line(&["R::default()"]);
                                Ok(())
                            })?;
                            w.line(&["}"]);
                            Ok(())
                        })?;
                        w.line(&["},"]);
                        Ok(())
                    })?;
                    w.line(&["None => ", &f, "(),"]);
                    Ok(())
                })?;
                w.line(&["}"]);
                Ok(())
            })?;
            w.line(&["}"]);
            Ok(())
        })
    }
}
