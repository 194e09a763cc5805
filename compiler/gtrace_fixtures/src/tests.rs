#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use pretty_assertions::assert_eq;

use super::*;
use crate::events::{DialDoneInfo, DialStartInfo, Point};

type Log = Arc<Mutex<Vec<String>>>;
type DoneHook = Arc<dyn Fn(Option<String>) + Send + Sync>;
type RowsHook = Arc<dyn Fn(usize) -> Option<DoneHook> + Send + Sync>;
type DoneInfoHook = Arc<dyn Fn(DialDoneInfo) + Send + Sync>;

fn log() -> Log {
    Arc::new(Mutex::new(Vec::new()))
}

fn entries(log: &Log) -> Vec<String> {
    log.lock().clone()
}

fn pinging(log: &Log, tag: &'static str) -> ConnTrace {
    let log = Arc::clone(log);
    ConnTrace {
        on_ping: Some(Arc::new(move || log.lock().push(tag.to_owned()))),
        ..ConnTrace::default()
    }
}

fn querying(log: &Log, tag: &'static str) -> ConnTrace {
    let log = Arc::clone(log);
    ConnTrace {
        on_query: Some(Arc::new(move |query: String, attempt: u32| -> Option<RowsHook> {
            log.lock().push(format!("{tag} query {query} #{attempt}"));
            let log = Arc::clone(&log);
            Some(Arc::new(move |rows: usize| -> Option<DoneHook> {
                log.lock().push(format!("{tag} rows {rows}"));
                let log = Arc::clone(&log);
                Some(Arc::new(move |error: Option<String>| {
                    log.lock().push(format!("{tag} done {error:?}"));
                }))
            }))
        })),
        ..ConnTrace::default()
    }
}

fn closing(log: &Log, tag: &'static str) -> SessionTrace {
    let log = Arc::clone(log);
    SessionTrace {
        on_close: Some(Arc::new(move |code: i32| {
            log.lock().push(format!("{tag} close {code}"));
        })),
        ..SessionTrace::default()
    }
}

fn no_opts() -> ConnTraceComposeOptions {
    ConnTraceComposeOptions::default()
}

#[test]
fn composed_hook_calls_receiver_then_argument() {
    let log = log();
    let composed = pinging(&log, "A").compose(&pinging(&log, "B"), no_opts());
    composed.on_ping();
    assert_eq!(entries(&log), vec!["A", "B"]);
}

#[test]
fn compose_leaves_inputs_alone() {
    let log = log();
    let a = pinging(&log, "A");
    let b = ConnTrace::default();
    let composed = a.compose(&b, no_opts());
    assert!(b.on_ping.is_none());
    assert!(composed.on_dial.is_none());
    assert!(composed.on_ping.is_some());

    a.on_ping();
    assert_eq!(entries(&log), vec!["A"]);
}

#[test]
fn one_sided_composition_still_runs() {
    let log = log();
    let composed = ConnTrace::default().compose(&pinging(&log, "B"), no_opts());
    conn_trace_on_ping(&composed);
    assert_eq!(entries(&log), vec!["B"]);
}

#[test]
fn compose_is_zero_matches_inputs() {
    let log = log();
    let options = [SessionTrace::default(), closing(&log, "A")];
    for a in &options {
        for b in &options {
            let composed = a.compose(b, SessionTraceComposeOptions::default());
            assert_eq!(composed.is_zero(), a.is_zero() && b.is_zero());
        }
    }
}

#[test]
fn forwarders_on_empty_trace_return_zero_values() {
    let trace = ConnTrace::default();
    trace.on_ping();
    trace.on_move(Point { x: 1, y: 2 });
    trace.on_label("idle");
    trace.on_wait(Duration::from_millis(5));

    let done = trace.on_dial(DialStartInfo::default());
    done(DialDoneInfo::default());

    let rows = trace.on_query("select 1".to_owned(), 1);
    let finish = rows(0);
    finish(None);

    let session = trace.on_session(7);
    assert!(session.is_zero());
    let more = session.on_data(3);
    more();
    session.on_close(0);
}

#[test]
fn panic_callback_sees_each_fault_once_and_sibling_runs() {
    let log = log();
    let faults = Arc::new(AtomicUsize::new(0));
    let panicking = ConnTrace {
        on_ping: Some(Arc::new(|| panic!("boom"))),
        ..ConnTrace::default()
    };

    let seen = Arc::clone(&faults);
    let opts = no_opts().with_panic_callback(move |payload| {
        assert_eq!(payload.downcast_ref::<&str>(), Some(&"boom"));
        seen.fetch_add(1, Ordering::SeqCst);
    });
    let composed = panicking.compose(&pinging(&log, "B"), opts);
    composed.on_ping();
    assert_eq!(faults.load(Ordering::SeqCst), 1);
    assert_eq!(entries(&log), vec!["B"]);

    let seen = Arc::clone(&faults);
    let opts = no_opts().with_panic_callback(move |_| {
        seen.fetch_add(1, Ordering::SeqCst);
    });
    let both = panicking.compose(&panicking, opts);
    both.on_ping();
    assert_eq!(faults.load(Ordering::SeqCst), 3);
}

#[test]
fn without_callback_panics_propagate() {
    let log = log();
    let panicking = ConnTrace {
        on_ping: Some(Arc::new(|| panic!("boom"))),
        ..ConnTrace::default()
    };
    let composed = panicking.compose(&pinging(&log, "B"), no_opts());
    assert!(catch_unwind(AssertUnwindSafe(|| composed.on_ping())).is_err());
    assert!(entries(&log).is_empty());
}

#[test]
fn faulting_stage_yields_no_continuation() {
    let log = log();
    let panicking = ConnTrace {
        on_query: Some(Arc::new(|_: String, _: u32| -> Option<RowsHook> {
            panic!("no rows")
        })),
        ..ConnTrace::default()
    };
    let opts = no_opts().with_panic_callback(|_| {});
    let composed = panicking.compose(&querying(&log, "B"), opts);
    composed.on_query("q".to_owned(), 1)(2)(None);
    assert_eq!(
        entries(&log),
        vec!["B query q #1", "B rows 2", "B done None"]
    );
}

#[test]
fn continuations_compose_stage_by_stage() {
    let log = log();
    let composed = querying(&log, "A").compose(&querying(&log, "B"), no_opts());
    let rows = composed.on_query("q".to_owned(), 3);
    let done = rows(10);
    done(Some("timeout".to_owned()));
    assert_eq!(
        entries(&log),
        vec![
            "A query q #3",
            "B query q #3",
            "A rows 10",
            "B rows 10",
            "A done Some(\"timeout\")",
            "B done Some(\"timeout\")",
        ]
    );
}

#[test]
fn absent_continuation_on_one_side() {
    let log = log();
    let stops_early = {
        let log = Arc::clone(&log);
        ConnTrace {
            on_query: Some(Arc::new(move |_: String, _: u32| -> Option<RowsHook> {
                log.lock().push("A query".to_owned());
                None
            })),
            ..ConnTrace::default()
        }
    };
    let composed = stops_early.compose(&querying(&log, "B"), no_opts());
    composed.on_query("q".to_owned(), 1)(1)(None);
    assert_eq!(
        entries(&log),
        vec!["A query", "B query q #1", "B rows 1", "B done None"]
    );
}

#[test]
fn nested_traces_compose_through_their_own_compose() {
    let log = log();
    let opening = |tag: &'static str| {
        let log = Arc::clone(&log);
        ConnTrace {
            on_session: Some(Arc::new(move |id: u64| {
                log.lock().push(format!("{tag} session {id}"));
                closing(&log, tag)
            })),
            ..ConnTrace::default()
        }
    };
    let composed = opening("A").compose(&opening("B"), no_opts());
    let session = conn_trace_on_session(&composed, 9);
    assert!(!session.is_zero());
    session_trace_on_close(&session, 4);
    assert_eq!(
        entries(&log),
        vec!["A session 9", "B session 9", "A close 4", "B close 4"]
    );
}

#[test]
fn shortcut_rebuilds_flattened_struct() {
    let seen = Arc::new(Mutex::new(None));
    let trace = {
        let seen = Arc::clone(&seen);
        ConnTrace {
            on_move: Some(Arc::new(move |point: Point| *seen.lock() = Some(point))),
            ..ConnTrace::default()
        }
    };
    conn_trace_on_move(&trace, 3, 4);
    assert_eq!(*seen.lock(), Some(Point { x: 3, y: 4 }));
}

#[test]
fn shortcut_flattens_every_continuation_stage() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let trace = {
        let seen = Arc::clone(&seen);
        ConnTrace {
            on_dial: Some(Arc::new(move |start: DialStartInfo| -> Option<DoneInfoHook> {
                seen.lock().push(format!("{}#{}", start.address, start.attempt));
                let seen = Arc::clone(&seen);
                Some(Arc::new(move |done: DialDoneInfo| {
                    seen.lock().push(format!("{:?}", done.error));
                }))
            })),
            ..ConnTrace::default()
        }
    };
    let done = conn_trace_on_dial(&trace, "db:5432".to_owned(), 2);
    done(Some("refused".to_owned()));
    assert_eq!(
        *seen.lock(),
        vec!["db:5432#2".to_owned(), "Some(\"refused\")".to_owned()]
    );
}

#[test]
fn borrowed_and_std_parameters_pass_through() {
    let log = log();
    let trace = {
        let (labels, waits) = (Arc::clone(&log), Arc::clone(&log));
        ConnTrace {
            on_label: Some(Arc::new(move |label: &str| labels.lock().push(label.to_owned()))),
            on_wait: Some(Arc::new(move |d: Duration| {
                waits.lock().push(format!("{}ms", d.as_millis()));
            })),
            ..ConnTrace::default()
        }
    };
    let composed = trace.compose(&trace, no_opts());
    conn_trace_on_label(&composed, "ready");
    conn_trace_on_wait(&composed, Duration::from_millis(12));
    assert_eq!(entries(&log), vec!["ready", "ready", "12ms", "12ms"]);
}
