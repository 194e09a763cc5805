use std::sync::Arc;

use pretty_assertions::assert_eq;

use super::*;

fn point() -> Ty {
    Ty::structure(
        "Point",
        vec![
            Field::exported("x", Ty::opaque("i64")),
            Field::private("tag", Ty::opaque("u8")),
            Field::exported("y", Ty::opaque("i64")),
        ],
    )
    .in_module(ModuleRef::new("crate::geo"))
}

#[test]
fn module_ref_defaults_to_last_segment() {
    let m = ModuleRef::new("std::time");
    assert_eq!(m.path(), "std::time");
    assert_eq!(m.name(), "time");
    assert!(!m.is_aliased());

    let single = ModuleRef::new("events");
    assert_eq!(single.name(), "events");

    let aliased = ModuleRef::aliased("std::time", "stdtime");
    assert!(aliased.is_aliased());
}

#[test]
fn struct_queries() {
    let ty = point();
    assert!(ty.is_struct());
    let names: Vec<_> = ty.exported_fields().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["x", "y"]);
    assert!(ty.pointee().is_none());

    let named = ty.named_ty().map(|n| (n.name, n.module.map(ModuleRef::path)));
    assert_eq!(named, Some(("Point", Some("crate::geo"))));
}

#[test]
fn pointer_queries() {
    let ty = Ty::pointer(point());
    assert!(!ty.is_struct());
    assert_eq!(ty.exported_fields().count(), 0);
    assert!(ty.named_ty().is_none());
    assert_eq!(ty.pointee(), Some(&point()));
    assert_eq!(ty.basename(), "Point");
    assert_eq!(ty.to_string(), "&crate::geo::Point");
}

#[test]
fn opaque_queries() {
    let ty = Ty::opaque("std::string::String");
    assert!(ty.named_ty().is_none());
    assert_eq!(ty.opaque_text(), Some("std::string::String"));
    assert_eq!(ty.basename(), "String");

    // Modules only attach to named types.
    let still_opaque = Ty::opaque("u64").in_module(ModuleRef::new("core"));
    assert_eq!(still_opaque, Ty::opaque("u64"));
}

#[test]
fn func_builders() {
    let sub = Arc::new(Trace::new("SubTrace").nested());
    let f = Func::new()
        .param(Param::named("id", Ty::opaque("u64")))
        .continues_with(Func::new().yields_trace(Arc::clone(&sub)));

    assert!(f.has_result());
    let next = f.continuation();
    assert!(next.is_some());
    assert_eq!(
        next.and_then(|n| n.result.clone()),
        Some(HookResult::Trace(sub))
    );
}

#[test]
fn package_builders_keep_order() {
    let pkg = Package::new("trace")
        .with_path("crate::trace")
        .with_constraint("#![cfg(unix)]")
        .with_symbol("ConnTrace")
        .with_trace(Trace::new("B"))
        .with_trace(Trace::new("A"));

    let names: Vec<_> = pkg.traces.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["B", "A"]);
    assert_eq!(pkg.path.as_deref(), Some("crate::trace"));
    assert_eq!(pkg.build_constraints, vec!["#![cfg(unix)]".to_owned()]);
}
