//! Ordered, single-pass line sources

use super::EngineError;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;

type Lines = Box<dyn Iterator<Item = io::Result<String>> + Send>;

/// Input lines in file order
///
/// Line terminators (`\n` or `\r\n`) are stripped. Read failures, including
/// invalid UTF-8, surface as `Err` items.
pub struct LineSource {
    label: String,
    lines: Lines,
}

impl LineSource {
    /// Open a file, or standard input for `-`
    pub fn open(path: &Path) -> Result<Self, EngineError> {
        if path.as_os_str() == "-" {
            return Ok(Self::stdin());
        }
        let file = File::open(path).map_err(|source| EngineError::SourceOpen {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_reader(path.display().to_string(), file))
    }

    pub fn stdin() -> Self {
        Self::from_reader("<stdin>", io::stdin())
    }

    /// Buffered lines of any reader
    pub fn from_reader<R>(label: impl Into<String>, reader: R) -> Self
    where
        R: Read + Send + 'static,
    {
        // 1 MiB read buffer
        let reader = BufReader::with_capacity(1 << 20, reader);
        Self {
            label: label.into(),
            lines: Box::new(reader.lines()),
        }
    }

    /// In-memory lines, mostly for tests
    pub fn from_lines<I, S>(label: impl Into<String>, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        I::IntoIter: Send + 'static,
        S: Into<String>,
    {
        Self {
            label: label.into(),
            lines: Box::new(lines.into_iter().map(|l| Ok(l.into()))),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl Iterator for LineSource {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.lines.next()
    }
}

impl std::fmt::Debug for LineSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LineSource")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}
