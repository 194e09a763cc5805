//! Generates `trace_gtrace.rs` for the traces declared in `src/lib.rs`.
//!
//! The model below mirrors those declarations by hand; a front end would
//! normally extract it from the source.

use std::path::PathBuf;
use std::sync::Arc;

use gtrace_codegen::{GenConfig, Generator};
use gtrace_ir::{Field, Func, ModuleRef, Package, Param, Trace, Ty};

fn events(name: &str, fields: Vec<Field>) -> Ty {
    Ty::structure(name, fields).in_module(ModuleRef::new("crate::events"))
}

fn opaque(name: &str, ty: &str) -> Param {
    Param::named(name, Ty::opaque(ty))
}

fn model() -> Package {
    let session = Arc::new(
        Trace::new("SessionTrace")
            .nested()
            .hook("on_close", Func::new().param(opaque("code", "i32")))
            .hook(
                "on_data",
                Func::new()
                    .param(opaque("bytes", "usize"))
                    .continues_with(Func::new()),
            ),
    );

    let dial_start = events(
        "DialStartInfo",
        vec![
            Field::exported("address", Ty::opaque("String")),
            Field::exported("attempt", Ty::opaque("u32")),
        ],
    );
    let dial_done = events(
        "DialDoneInfo",
        vec![Field::exported("error", Ty::opaque("Option<String>"))],
    );
    let point = events(
        "Point",
        vec![
            Field::exported("x", Ty::opaque("i64")),
            Field::exported("y", Ty::opaque("i64")),
        ],
    );
    let duration = Ty::named("Duration").in_module(ModuleRef::new("std::time"));

    let conn = Trace::new("ConnTrace")
        .hook(
            "on_dial",
            Func::new()
                .param(Param::unnamed(dial_start))
                .continues_with(Func::new().param(Param::unnamed(dial_done))),
        )
        .hook("on_ping", Func::new())
        .hook(
            "on_query",
            Func::new()
                .param(opaque("query", "String"))
                .param(opaque("attempt", "u32"))
                .continues_with(
                    Func::new()
                        .param(opaque("rows", "usize"))
                        .continues_with(Func::new().param(opaque("error", "Option<String>"))),
                ),
        )
        .hook(
            "on_session",
            Func::new()
                .param(opaque("id", "u64"))
                .yields_trace(Arc::clone(&session)),
        )
        .hook("on_move", Func::new().param(Param::named("point", point)))
        .hook(
            "on_label",
            Func::new().param(Param::unnamed(Ty::pointer(Ty::opaque("str")))),
        )
        .hook("on_wait", Func::new().param(Param::named("elapsed", duration)));

    Package::new("gtrace_fixtures")
        .with_path("crate")
        .with_symbol("ConnTrace")
        .with_symbol("SessionTrace")
        .with_symbol("events")
        .with_symbol("generated")
        .with_trace(conn)
        .with_trace(session)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed={}", gtrace_codegen::STD_ROOT_ENV);
    gtrace_codegen::init_tracing();

    let out_dir = PathBuf::from(std::env::var("OUT_DIR")?);
    Generator::new(GenConfig::from_env()).write(&model(), &out_dir.join("trace_gtrace.rs"))?;
    Ok(())
}
