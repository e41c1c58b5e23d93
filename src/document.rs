//! Input documents and source locations.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Cursor location inside a document, zero-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

/// Byte range inside a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// A comment harvested by the reader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub text: String,
    pub span: Span,
}

/// Raw input handed to the pipeline, with enough identity to run an
/// external preprocessor over it.
///
/// The text is reference-counted so the effective document produced by the
/// preprocess stage can share the identity fields cheaply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub filename: PathBuf,
    pub workdir: PathBuf,
    text: Rc<str>,
}

impl Document {
    pub fn new(
        filename: impl Into<PathBuf>,
        workdir: impl Into<PathBuf>,
        text: impl Into<Rc<str>>,
    ) -> Self {
        Self {
            filename: filename.into(),
            workdir: workdir.into(),
            text: text.into(),
        }
    }

    pub fn filename(&self) -> &Path {
        &self.filename
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Derive a document with the same identity but different text, as
    /// produced by preprocessing.
    pub fn with_text(&self, text: impl Into<Rc<str>>) -> Self {
        Self {
            filename: self.filename.clone(),
            workdir: self.workdir.clone(),
            text: text.into(),
        }
    }
}
