//! The four-stage analysis pipeline and its builder.
//!
//! A [`Pipeline`] chains four memoized stages (preprocess, read, rewrite,
//! type-check), each built from the previous one's result, plus a fifth
//! deferred computation for type diagnostics. Nothing runs at construction
//! time: whichever accessor the caller invokes forces its stage, which
//! transitively forces the earlier ones exactly once.

use crate::config::AnalysisConfig;
use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::document::{Comment, Document, Position};
use crate::error::Result;
use crate::frontend::{CompletionLabels, Frontend, Parsed};
use crate::stage::StageCell;
use crate::timing::{StageCounter, TimingContext, TimingReport};
use std::rc::Rc;

/// Result of the read stage: parse artifacts plus the configuration after
/// directive application and normalization.
#[derive(Debug, Clone)]
pub struct ReadStage<T> {
    pub parsed: Parsed<T>,
    pub config: AnalysisConfig,
}

/// Result of the rewrite stage: the possibly revised configuration, the
/// rewritten tree, and the diagnostics captured while rewriting.
#[derive(Debug, Clone)]
pub struct RewriteStage<T> {
    pub config: AnalysisConfig,
    pub tree: T,
    pub diagnostics: Vec<Diagnostic>,
}

/// Constructs a [`Pipeline`] from a configuration and a raw document,
/// optionally biased toward a target position and optionally reusing the
/// timing state of a prior pipeline.
pub struct PipelineBuilder<F: Frontend> {
    frontend: Rc<F>,
    config: AnalysisConfig,
    document: Document,
    target: Option<Position>,
    timing: Option<Rc<TimingContext>>,
}

impl<F: Frontend> PipelineBuilder<F> {
    pub fn new(frontend: Rc<F>, config: AnalysisConfig, document: Document) -> Self {
        Self {
            frontend,
            config,
            document,
            target: None,
            timing: None,
        }
    }

    /// Bias the reader toward this cursor position.
    pub fn target(mut self, position: Position) -> Self {
        self.target = Some(position);
        self
    }

    /// Accumulate stage times into an existing timing context instead of a
    /// fresh one.
    pub fn share_timings(mut self, timing: Rc<TimingContext>) -> Self {
        self.timing = Some(timing);
        self
    }

    pub fn build(self) -> Pipeline<F> {
        let timing = self
            .timing
            .unwrap_or_else(|| Rc::new(TimingContext::process()));
        Pipeline::assemble(
            self.frontend,
            self.config,
            Rc::new(self.document),
            self.target,
            timing,
        )
    }
}

/// One memoized run of the staged analysis over a single document.
pub struct Pipeline<F: Frontend> {
    frontend: Rc<F>,
    config: AnalysisConfig,
    document: Rc<Document>,
    timing: Rc<TimingContext>,
    preprocess: Rc<StageCell<Document>>,
    read: Rc<StageCell<ReadStage<F::Tree>>>,
    rewrite: Rc<StageCell<RewriteStage<F::Tree>>>,
    typecheck: Rc<StageCell<F::Typed>>,
    type_diagnostics: Rc<StageCell<Vec<Diagnostic>>>,
}

impl<F: Frontend> Pipeline<F> {
    fn assemble(
        frontend: Rc<F>,
        config: AnalysisConfig,
        document: Rc<Document>,
        target: Option<Position>,
        timing: Rc<TimingContext>,
    ) -> Self {
        // Stage 1: without a preprocessor the raw document is the
        // effective document, with no time attributed at all.
        let preprocess = match config.preprocessor.clone() {
            None => Rc::new(StageCell::settled(
                "preprocess",
                StageCounter::Preprocess,
                timing.clone(),
                document.clone(),
            )),
            Some(command) => {
                let frontend = frontend.clone();
                let document = document.clone();
                Rc::new(StageCell::deferred(
                    "preprocess",
                    StageCounter::Preprocess,
                    timing.clone(),
                    move || {
                        let text = frontend.preprocess(
                            document.workdir(),
                            document.filename(),
                            document.text(),
                            &command,
                        )?;
                        Ok(document.with_text(text))
                    },
                ))
            }
        };

        // Stage 2: parse the effective document, then fold in directives
        // and normalize the configuration for the later stages.
        let read = {
            let frontend = frontend.clone();
            let preprocess = preprocess.clone();
            let config = config.clone();
            Rc::new(StageCell::deferred(
                "read",
                StageCounter::Read,
                timing.clone(),
                move || {
                    let document = preprocess.force()?;
                    let parsed = frontend.parse(&config, &document, target);
                    let config = frontend.apply_directives(config, &parsed.tree);
                    let config = frontend.normalize(config);
                    Ok(ReadStage { parsed, config })
                },
            ))
        };

        // Stage 3: rewrite under diagnostic capture.
        let rewrite = {
            let frontend = frontend.clone();
            let read = read.clone();
            Rc::new(StageCell::deferred(
                "rewrite",
                StageCounter::Rewrite,
                timing.clone(),
                move || {
                    let read = read.force()?;
                    let sink = DiagnosticSink::new(read.config.warnings);
                    let (config, tree) =
                        frontend.rewrite(read.config.clone(), read.parsed.tree.clone(), &sink)?;
                    Ok(RewriteStage {
                        config,
                        tree,
                        diagnostics: sink.into_diagnostics(),
                    })
                },
            ))
        };

        // Stage 4: type-check the rewritten tree.
        let typecheck = {
            let frontend = frontend.clone();
            let rewrite = rewrite.clone();
            Rc::new(StageCell::deferred(
                "typecheck",
                StageCounter::Typecheck,
                timing.clone(),
                move || {
                    let rewrite = rewrite.force()?;
                    frontend.typecheck(&rewrite.config, &rewrite.tree)
                },
            ))
        };

        // Type diagnostics are deferred past stage 4 and timed separately.
        let type_diagnostics = {
            let frontend = frontend.clone();
            let typecheck = typecheck.clone();
            Rc::new(StageCell::deferred(
                "type_diagnostics",
                StageCounter::TypeDiagnostics,
                timing.clone(),
                move || {
                    let typed = typecheck.force()?;
                    Ok(frontend.typed_diagnostics(&typed))
                },
            ))
        };

        Self {
            frontend,
            config,
            document,
            timing,
            preprocess,
            read,
            rewrite,
            typecheck,
            type_diagnostics,
        }
    }

    /// New pipeline over the same configuration and raw document, biased
    /// toward `position`, accumulating into this pipeline's timing
    /// counters. The clone re-executes all stages independently; only the
    /// configuration, document, and counters are shared.
    pub fn for_completion(&self, position: Position) -> Self {
        Self::assemble(
            self.frontend.clone(),
            self.config.clone(),
            self.document.clone(),
            Some(position),
            self.timing.clone(),
        )
    }

    pub fn raw_document(&self) -> &Document {
        &self.document
    }

    pub fn input_config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Timing context backing this pipeline, shareable with further
    /// builders via [`PipelineBuilder::share_timings`].
    pub fn timing(&self) -> &Rc<TimingContext> {
        &self.timing
    }

    /// Snapshot of the five stage counters, in seconds.
    pub fn timing_report(&self) -> TimingReport {
        self.timing.report()
    }

    /// Document actually read: the raw document, or the preprocessor's
    /// output when one is configured.
    pub fn effective_document(&self) -> Result<Rc<Document>> {
        self.preprocess.force()
    }

    /// Full read-stage result.
    pub fn reader_result(&self) -> Result<Rc<ReadStage<F::Tree>>> {
        self.read.force()
    }

    pub fn parse_tree(&self) -> Result<F::Tree> {
        Ok(self.read.force()?.parsed.tree.clone())
    }

    pub fn comments(&self) -> Result<Vec<Comment>> {
        Ok(self.read.force()?.parsed.comments.clone())
    }

    pub fn lexer_diagnostics(&self) -> Result<Vec<Diagnostic>> {
        Ok(self.read.force()?.parsed.lexer_diagnostics.clone())
    }

    pub fn parser_diagnostics(&self) -> Result<Vec<Diagnostic>> {
        Ok(self.read.force()?.parsed.parser_diagnostics.clone())
    }

    pub fn completion_labels(&self) -> Result<CompletionLabels> {
        Ok(self.read.force()?.parsed.completion_labels)
    }

    /// Configuration after the read stage's directive application and
    /// normalization.
    pub fn reader_config(&self) -> Result<AnalysisConfig> {
        Ok(self.read.force()?.config.clone())
    }

    pub fn rewritten_tree(&self) -> Result<F::Tree> {
        Ok(self.rewrite.force()?.tree.clone())
    }

    /// Diagnostics captured during macro rewriting, in report order.
    pub fn rewrite_diagnostics(&self) -> Result<Vec<Diagnostic>> {
        Ok(self.rewrite.force()?.diagnostics.clone())
    }

    /// Configuration as revised by the last stage that touched it.
    pub fn final_config(&self) -> Result<AnalysisConfig> {
        Ok(self.rewrite.force()?.config.clone())
    }

    pub fn typed_result(&self) -> Result<Rc<F::Typed>> {
        self.typecheck.force()
    }

    /// Diagnostics of the typed result. Computed lazily from the typed
    /// result and timed under its own counter.
    pub fn type_diagnostics(&self) -> Result<Vec<Diagnostic>> {
        Ok(self.type_diagnostics.force()?.as_ref().clone())
    }
}
