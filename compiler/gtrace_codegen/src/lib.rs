//! gtrace code generator
//!
//! Turns a [`Package`] of trace declarations into the companion module that
//! gives every trace `compose`, `is_zero` (nested traces), hook forwarders and
//! flattened shortcut functions.
//!
//! # Architecture
//!
//! - **Scope allocator** (`scope`): collision-free identifiers per emitted block
//! - **Import resolver** (`imports`): module dependencies, std first
//! - **Synthesizer** (`synth`): walks the model, drives the other two
//! - **Emitter** (`emitter`): indentation-aware buffer, atomic flush
//!
//! A run either produces the whole artifact or an error; nothing is written
//! on failure.
//!
//! # Debugging
//!
//! - `RUST_LOG=gtrace_codegen=debug` - one event per trace and import set
//! - `RUST_LOG=gtrace_codegen::scope=trace` - every identifier allocation
//!
//! # Example
//!
//! ```
//! use gtrace_codegen::{GenConfig, Generator};
//! use gtrace_ir::{Func, Package, Param, Trace, Ty};
//!
//! let trace = Trace::new("ConnTrace")
//!     .hook("on_ping", Func::new().param(Param::named("seq", Ty::opaque("u32"))));
//! let package = Package::new("trace").with_symbol("ConnTrace").with_trace(trace);
//!
//! let source = Generator::new(GenConfig::new()).generate(&package).unwrap();
//! assert!(source.contains("pub fn conn_trace_on_ping(t: &ConnTrace, seq: u32)"));
//! ```

mod config;
mod emitter;
mod error;
mod imports;
mod naming;
mod scope;
mod stack;
mod synth;

pub use config::{GenConfig, STD_ROOT_ENV};
pub use error::{DeclSite, GenError};

use std::path::Path;
use std::sync::Once;

use gtrace_ir::Package;
use rayon::prelude::*;
use tracing::{debug, instrument};

use crate::emitter::Emitter;
use crate::imports::std_lib;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Only installs a subscriber when `RUST_LOG` is set. Safe to call multiple
/// times.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}

/// Generates companion modules.
#[derive(Clone, Debug, Default)]
pub struct Generator {
    config: GenConfig,
}

impl Generator {
    pub fn new(config: GenConfig) -> Self {
        Generator { config }
    }

    pub fn config(&self) -> &GenConfig {
        &self.config
    }

    /// Generate the companion module for `package`.
    #[instrument(level = "debug", skip_all, fields(package = %package.name))]
    pub fn generate(&self, package: &Package) -> Result<String, GenError> {
        self.run(package).map(Emitter::into_output)
    }

    /// Generate the companion module for `package` and replace `path` with it.
    ///
    /// On error `path` is left untouched.
    #[instrument(level = "debug", skip_all, fields(package = %package.name, path = %path.display()))]
    pub fn write(&self, package: &Package, path: &Path) -> Result<(), GenError> {
        let out = self.run(package)?;
        out.flush_to(path)?;
        debug!(bytes = out.as_str().len(), "written");
        Ok(())
    }

    /// Generate every package on the rayon pool; results keep input order.
    #[instrument(level = "debug", skip_all, fields(packages = packages.len()))]
    pub fn generate_all(&self, packages: &[Package]) -> Vec<Result<String, GenError>> {
        packages.par_iter().map(|p| self.generate(p)).collect()
    }

    fn run(&self, package: &Package) -> Result<Emitter, GenError> {
        let std = std_lib(self.config.std_root())?;
        synth::write_package(package, &std, self.config.tool_name())
    }
}
