//! Output Emitter
//!
//! Sequential, indentation-tracking text buffer. Nothing reaches the
//! destination until [`Emitter::flush_to`] runs after a successful
//! generation pass; a failed run simply drops the emitter.

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::GenError;

const INDENT: &str = "    ";

pub struct Emitter {
    buffer: String,
    depth: usize,
    at_line_start: bool,
}

impl Default for Emitter {
    fn default() -> Self {
        Self::new()
    }
}

impl Emitter {
    pub fn new() -> Self {
        Self {
            buffer: String::with_capacity(16 * 1024),
            depth: 0,
            at_line_start: true,
        }
    }

    pub fn indent(&mut self) {
        self.depth += 1;
    }

    pub fn dedent(&mut self) {
        debug_assert!(self.depth > 0, "dedent called with zero indent");
        self.depth = self.depth.saturating_sub(1);
    }

    /// Append tokens to the current line, indenting a fresh line first.
    pub fn code(&mut self, parts: &[&str]) {
        if self.at_line_start {
            for _ in 0..self.depth {
                self.buffer.push_str(INDENT);
            }
            self.at_line_start = false;
        }
        for part in parts {
            self.buffer.push_str(part);
        }
    }

    /// Append tokens and terminate the line.
    pub fn line(&mut self, parts: &[&str]) {
        if !parts.is_empty() {
            self.code(parts);
        }
        self.newline();
    }

    /// Terminate the current line without indenting it.
    pub fn newline(&mut self) {
        self.buffer.push('\n');
        self.at_line_start = true;
    }

    pub fn as_str(&self) -> &str {
        &self.buffer
    }

    /// Take the generated text.
    pub fn into_output(self) -> String {
        self.buffer
    }

    /// Replace `path` with the buffered text in one step.
    ///
    /// The text goes to a temporary file next to `path`, which is then renamed
    /// over it; readers see either the old file or the complete new one.
    pub fn flush_to(&self, path: &Path) -> Result<(), GenError> {
        write_atomic(path, &self.buffer)
    }
}

pub(crate) fn write_atomic(path: &Path, contents: &str) -> Result<(), GenError> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)
        .map_err(|e| GenError::io(format!("can't create temporary file in {}", dir.display()), e))?;
    tmp.write_all(contents.as_bytes())
        .and_then(|()| tmp.as_file().sync_all())
        .map_err(|e| GenError::io(format!("can't write {}", tmp.path().display()), e))?;
    tmp.persist(path)
        .map_err(|e| GenError::io(format!("can't replace {}", path.display()), e.error))?;
    Ok(())
}
