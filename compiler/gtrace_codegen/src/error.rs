//! Generation errors.
//!
//! Every error is fatal to the run that produced it: the caller discards the
//! buffer and nothing is written. The expected cause is a malformed model, so
//! each kind carries enough context to find the offending declaration.

use std::fmt;
use std::io;
use std::panic::Location;

/// Where an identifier was first declared.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DeclSite {
    /// Declared by the generator at this source location.
    Generator(&'static Location<'static>),
    /// Supplied by the model as a module-scope symbol.
    ModuleScope,
}

impl DeclSite {
    /// The generator source line, if declared by the generator.
    pub fn line(self) -> Option<u32> {
        match self {
            DeclSite::Generator(loc) => Some(loc.line()),
            DeclSite::ModuleScope => None,
        }
    }
}

impl fmt::Display for DeclSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeclSite::Generator(loc) => write!(f, "{}:{}", loc.file(), loc.line()),
            DeclSite::ModuleScope => f.write_str("module scope"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GenError {
    /// An exact identifier was required but is already declared.
    #[error("gtrace: can't declare identifier `{name}`: already defined at {prior}")]
    HardCollision { name: String, prior: DeclSite },

    /// The model has a shape the generator cannot render.
    #[error("gtrace: unsupported shape: {0}")]
    UnsupportedShape(String),

    /// Library roots could not be listed or output could not be written.
    #[error("gtrace: {context}: {source}")]
    IoFailure {
        context: String,
        #[source]
        source: io::Error,
    },
}

impl GenError {
    #[cold]
    pub(crate) fn unsupported(message: impl Into<String>) -> Self {
        GenError::UnsupportedShape(message.into())
    }

    #[cold]
    pub(crate) fn io(context: impl Into<String>, source: io::Error) -> Self {
        GenError::IoFailure {
            context: context.into(),
            source,
        }
    }
}
