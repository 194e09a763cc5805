//! Fixture traces with build-time generated companions.
//!
//! `build.rs` runs the generator over a model of the traces below and the
//! result is included as [`generated`]. The tests exercise that code at
//! runtime.

use std::sync::Arc;
use std::time::Duration;

pub mod events {
    //! Payloads passed to connection hooks.

    #[derive(Clone, Debug, Default, PartialEq, Eq)]
    pub struct DialStartInfo {
        pub address: String,
        pub attempt: u32,
    }

    #[derive(Clone, Debug, Default, PartialEq, Eq)]
    pub struct DialDoneInfo {
        pub error: Option<String>,
    }

    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct Point {
        pub x: i64,
        pub y: i64,
    }
}

/// Hooks of a client connection.
#[allow(clippy::type_complexity)]
#[derive(Clone, Default)]
pub struct ConnTrace {
    pub on_dial: Option<
        Arc<
            dyn Fn(events::DialStartInfo) -> Option<Arc<dyn Fn(events::DialDoneInfo) + Send + Sync>>
                + Send
                + Sync,
        >,
    >,
    pub on_ping: Option<Arc<dyn Fn() + Send + Sync>>,
    pub on_query: Option<
        Arc<
            dyn Fn(String, u32) -> Option<
                    Arc<
                        dyn Fn(usize) -> Option<Arc<dyn Fn(Option<String>) + Send + Sync>>
                            + Send
                            + Sync,
                    >,
                > + Send
                + Sync,
        >,
    >,
    pub on_session: Option<Arc<dyn Fn(u64) -> SessionTrace + Send + Sync>>,
    pub on_move: Option<Arc<dyn Fn(events::Point) + Send + Sync>>,
    pub on_label: Option<Arc<dyn Fn(&str) + Send + Sync>>,
    pub on_wait: Option<Arc<dyn Fn(Duration) + Send + Sync>>,
}

/// Hooks of one session, handed out by `ConnTrace::on_session`.
#[allow(clippy::type_complexity)]
#[derive(Clone, Default)]
pub struct SessionTrace {
    pub on_close: Option<Arc<dyn Fn(i32) + Send + Sync>>,
    pub on_data: Option<Arc<dyn Fn(usize) -> Option<Arc<dyn Fn() + Send + Sync>> + Send + Sync>>,
}

#[allow(unused, clippy::all, clippy::pedantic)]
pub mod generated {
    include!(concat!(env!("OUT_DIR"), "/trace_gtrace.rs"));
}

pub use generated::*;

#[cfg(test)]
mod tests;
