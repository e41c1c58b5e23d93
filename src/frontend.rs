//! Collaborator contracts consumed by the pipeline.
//!
//! The pipeline does not parse, rewrite, or type-check anything itself; a
//! [`Frontend`] implementation supplies all of that. The trait bundles the
//! external collaborators behind one seam: preprocessor, reader, directive
//! applier, configuration normalizer, macro rewriter, and type checker.

use crate::config::{AnalysisConfig, PreprocessorCommand};
use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::document::{Comment, Document, Position};
use crate::error::Result;
use std::path::Path;

/// Whether completion candidates should carry labels for this document.
///
/// Decided by the reader, typically when a target position lands in a
/// context where labelled candidates would be redundant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompletionLabels {
    #[default]
    Full,
    Suppressed,
}

/// Artifacts produced by the reader for one document.
///
/// Lexer and parser diagnostics are plain data here: the reader reports
/// document problems synchronously instead of failing.
#[derive(Debug, Clone)]
pub struct Parsed<T> {
    pub tree: T,
    pub comments: Vec<Comment>,
    pub lexer_diagnostics: Vec<Diagnostic>,
    pub parser_diagnostics: Vec<Diagnostic>,
    pub completion_labels: CompletionLabels,
}

/// The language toolchain driving the pipeline stages.
///
/// `Tree` is the parse tree handle; it must be cheap to clone (frontends
/// typically use a reference-counted tree). `Typed` is the fully resolved
/// program representation and is only ever shared, never cloned.
pub trait Frontend: 'static {
    type Tree: Clone + 'static;
    type Typed: 'static;

    /// Run the external preprocessing command over the raw source text,
    /// returning the effective text to read.
    fn preprocess(
        &self,
        workdir: &Path,
        filename: &Path,
        source: &str,
        command: &PreprocessorCommand,
    ) -> Result<String>;

    /// Parse the (effective) document. A target position enables partial
    /// reading biased toward that cursor location.
    fn parse(
        &self,
        config: &AnalysisConfig,
        document: &Document,
        target: Option<Position>,
    ) -> Parsed<Self::Tree>;

    /// Fold configuration directives embedded in the parse tree into the
    /// configuration. Pure; the default keeps the configuration unchanged.
    fn apply_directives(&self, config: AnalysisConfig, tree: &Self::Tree) -> AnalysisConfig {
        let _ = tree;
        config
    }

    /// Canonicalize the configuration after directive application. Pure;
    /// the default keeps it unchanged.
    fn normalize(&self, config: AnalysisConfig) -> AnalysisConfig {
        config
    }

    /// Rewrite macros in the tree. Document diagnostics raised along the
    /// way go through `sink` and never abort the stage; an `Err` return is
    /// a genuine fault and propagates.
    fn rewrite(
        &self,
        config: AnalysisConfig,
        tree: Self::Tree,
        sink: &DiagnosticSink,
    ) -> Result<(AnalysisConfig, Self::Tree)>;

    /// Resolve and type the rewritten tree.
    fn typecheck(&self, config: &AnalysisConfig, tree: &Self::Tree) -> Result<Self::Typed>;

    /// Extract diagnostics from a typed result. Pure; called lazily and
    /// separately from `typecheck` so callers who only need the typed
    /// result never pay for it.
    fn typed_diagnostics(&self, typed: &Self::Typed) -> Vec<Diagnostic>;
}
