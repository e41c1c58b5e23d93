//! srclens: staged, lazily evaluated analysis pipeline for source-code
//! intelligence backends.
//!
//! Given an [`AnalysisConfig`] and a raw [`Document`], a [`Pipeline`]
//! produces on demand a preprocessed text, a parse tree, a macro-rewritten
//! tree, and a fully typed result, while attributing wall-clock time to
//! the stage that actually did the work and collecting every diagnostic
//! raised along the way. The language-specific collaborators (parser,
//! rewriter, type checker, preprocessor) plug in behind the [`Frontend`]
//! trait.
//!
//! Stages are memoized: forcing an accessor twice replays the cached value
//! (or the cached failure), and forcing a late stage transitively forces
//! the earlier ones exactly once. [`Pipeline::for_completion`] answers a
//! second query at a different cursor position while accumulating into the
//! same timing counters.
//!
//! ```ignore
//! let pipeline = PipelineBuilder::new(frontend, config, document).build();
//! let typed = pipeline.typed_result()?;
//! let report = pipeline.timing_report();
//! println!("{}", report.to_summary());
//! ```

// Export modules for library usage
pub mod config;
pub mod diagnostics;
pub mod document;
pub mod error;
pub mod frontend;
pub mod pipeline;
pub mod stage;
pub mod timing;

// Re-export commonly used types
pub use crate::config::{AnalysisConfig, PreprocessorCommand, WarningsPolicy};
pub use crate::diagnostics::{Diagnostic, DiagnosticSink, Severity};
pub use crate::document::{Comment, Document, Position, Span};
pub use crate::error::{PipelineError, Result};
pub use crate::frontend::{CompletionLabels, Frontend, Parsed};
pub use crate::pipeline::{Pipeline, PipelineBuilder, ReadStage, RewriteStage};
pub use crate::stage::StageCell;
pub use crate::timing::{
    Clock, ProcessClock, StageCounter, StageTimings, TimingContext, TimingReport,
};
