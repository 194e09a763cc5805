//! Generator configuration.

use std::path::{Path, PathBuf};

/// Environment variable naming the standard-library root directory.
pub const STD_ROOT_ENV: &str = "GTRACE_STD_ROOT";

const DEFAULT_TOOL_NAME: &str = "gtrace";

/// Settings shared by every run of a [`Generator`](crate::Generator).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenConfig {
    std_root: Option<PathBuf>,
    tool_name: String,
}

impl Default for GenConfig {
    fn default() -> Self {
        GenConfig {
            std_root: None,
            tool_name: DEFAULT_TOOL_NAME.to_owned(),
        }
    }
}

impl GenConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults, with the std root taken from `GTRACE_STD_ROOT` when set.
    pub fn from_env() -> Self {
        let config = Self::default();
        match std::env::var_os(STD_ROOT_ENV) {
            Some(root) if !root.is_empty() => config.with_std_root(root),
            _ => config,
        }
    }

    /// Classify imports against the subdirectories of `root`, typically
    /// `<sysroot>/lib/rustlib/src/rust/library`.
    #[must_use]
    pub fn with_std_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.std_root = Some(root.into());
        self
    }

    /// Name written into the generated-file marker.
    #[must_use]
    pub fn with_tool_name(mut self, name: impl Into<String>) -> Self {
        self.tool_name = name.into();
        self
    }

    pub fn std_root(&self) -> Option<&Path> {
        self.std_root.as_deref()
    }

    pub fn tool_name(&self) -> &str {
        &self.tool_name
    }
}
