//! Shared fixtures: a deterministic clock and a scripted frontend.
//!
//! The fake frontend advances the manual clock by a fixed cost inside each
//! collaborator call, so stage self-times are exact and assertions can use
//! equality instead of tolerances.

#![allow(dead_code)]

use srclens::{
    AnalysisConfig, Clock, Comment, CompletionLabels, Diagnostic, DiagnosticSink, Document,
    Frontend, Parsed, Pipeline, PipelineBuilder, PipelineError, Position, Result, Span,
    TimingContext,
};
use std::cell::{Cell, RefCell};
use std::path::Path;
use std::rc::Rc;
use std::time::Duration;

/// Clock advanced by hand from inside the fake collaborators.
#[derive(Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, amount: Duration) {
        self.now.set(self.now.get() + amount);
    }

    pub fn now(&self) -> Duration {
        self.now.get()
    }
}

impl Clock for ManualClock {
    fn time_spent(&self) -> Duration {
        self.now.get()
    }
}

pub fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

/// Fixed wall-clock cost of each scripted collaborator call.
pub const PREPROCESS_COST: Duration = Duration::from_millis(5);
pub const PARSE_COST: Duration = Duration::from_millis(10);
pub const REWRITE_COST: Duration = Duration::from_millis(20);
pub const TYPECHECK_COST: Duration = Duration::from_millis(40);
pub const TYPE_DIAGNOSTICS_COST: Duration = Duration::from_millis(80);

/// Typed result produced by the scripted type checker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedProgram {
    pub tree: String,
    pub diagnostics: Vec<Diagnostic>,
}

/// Scripted frontend: trees are strings describing how they were derived,
/// and every collaborator call is logged and billed to the manual clock.
pub struct FakeFrontend {
    clock: ManualClock,
    pub events: RefCell<Vec<&'static str>>,
    pub parse_targets: RefCell<Vec<Option<Position>>>,
    pub fail_preprocess: Cell<bool>,
    pub lexer_diagnostics: Vec<Diagnostic>,
    pub parser_diagnostics: Vec<Diagnostic>,
    pub rewrite_emits: Vec<Diagnostic>,
    pub typed_diagnostics: Vec<Diagnostic>,
    pub directive_flag: Option<String>,
}

impl FakeFrontend {
    pub fn new() -> Self {
        Self {
            clock: ManualClock::new(),
            events: RefCell::new(Vec::new()),
            parse_targets: RefCell::new(Vec::new()),
            fail_preprocess: Cell::new(false),
            lexer_diagnostics: Vec::new(),
            parser_diagnostics: Vec::new(),
            rewrite_emits: Vec::new(),
            typed_diagnostics: Vec::new(),
            directive_flag: None,
        }
    }

    pub fn clock(&self) -> ManualClock {
        self.clock.clone()
    }

    pub fn with_parser_diagnostics(mut self, diagnostics: Vec<Diagnostic>) -> Self {
        self.parser_diagnostics = diagnostics;
        self
    }

    pub fn with_rewrite_emits(mut self, diagnostics: Vec<Diagnostic>) -> Self {
        self.rewrite_emits = diagnostics;
        self
    }

    pub fn with_typed_diagnostics(mut self, diagnostics: Vec<Diagnostic>) -> Self {
        self.typed_diagnostics = diagnostics;
        self
    }

    pub fn with_directive_flag(mut self, flag: impl Into<String>) -> Self {
        self.directive_flag = Some(flag.into());
        self
    }

    pub fn failing_preprocess(self) -> Self {
        self.fail_preprocess.set(true);
        self
    }

    pub fn call_count(&self, name: &str) -> usize {
        self.events.borrow().iter().filter(|e| **e == name).count()
    }
}

impl Frontend for FakeFrontend {
    type Tree = String;
    type Typed = TypedProgram;

    fn preprocess(
        &self,
        _workdir: &Path,
        _filename: &Path,
        source: &str,
        command: &srclens::PreprocessorCommand,
    ) -> Result<String> {
        self.events.borrow_mut().push("preprocess");
        self.clock.advance(PREPROCESS_COST);
        if self.fail_preprocess.get() {
            return Err(PipelineError::preprocess(
                command.to_string(),
                "scripted failure",
            ));
        }
        Ok(format!("pp:{source}"))
    }

    fn parse(
        &self,
        _config: &AnalysisConfig,
        document: &Document,
        target: Option<Position>,
    ) -> Parsed<String> {
        self.events.borrow_mut().push("parse");
        self.parse_targets.borrow_mut().push(target);
        self.clock.advance(PARSE_COST);
        Parsed {
            tree: format!("tree({})", document.text()),
            comments: vec![Comment {
                text: "header".to_string(),
                span: Span::new(0, 6),
            }],
            lexer_diagnostics: self.lexer_diagnostics.clone(),
            parser_diagnostics: self.parser_diagnostics.clone(),
            completion_labels: if target.is_some() {
                CompletionLabels::Suppressed
            } else {
                CompletionLabels::Full
            },
        }
    }

    fn apply_directives(&self, mut config: AnalysisConfig, _tree: &String) -> AnalysisConfig {
        if let Some(flag) = &self.directive_flag {
            config.flags.push(flag.clone());
        }
        config
    }

    fn normalize(&self, mut config: AnalysisConfig) -> AnalysisConfig {
        config.flags.sort();
        config
    }

    fn rewrite(
        &self,
        mut config: AnalysisConfig,
        tree: String,
        sink: &DiagnosticSink,
    ) -> Result<(AnalysisConfig, String)> {
        self.events.borrow_mut().push("rewrite");
        self.clock.advance(REWRITE_COST);
        for diagnostic in &self.rewrite_emits {
            sink.report(diagnostic.clone());
        }
        config.flags.push("rewritten".to_string());
        Ok((config, format!("rw({tree})")))
    }

    fn typecheck(&self, _config: &AnalysisConfig, tree: &String) -> Result<TypedProgram> {
        self.events.borrow_mut().push("typecheck");
        self.clock.advance(TYPECHECK_COST);
        Ok(TypedProgram {
            tree: tree.clone(),
            diagnostics: self.typed_diagnostics.clone(),
        })
    }

    fn typed_diagnostics(&self, typed: &TypedProgram) -> Vec<Diagnostic> {
        self.events.borrow_mut().push("typed_diagnostics");
        self.clock.advance(TYPE_DIAGNOSTICS_COST);
        typed.diagnostics.clone()
    }
}

pub fn document() -> Document {
    Document::new("main.src", "/work", "let x = 1")
}

/// Pipeline over the fake frontend, timed by its manual clock.
pub fn pipeline(frontend: Rc<FakeFrontend>, config: AnalysisConfig) -> Pipeline<FakeFrontend> {
    let timing = Rc::new(TimingContext::new(Rc::new(frontend.clock())));
    PipelineBuilder::new(frontend, config, document())
        .share_timings(timing)
        .build()
}
