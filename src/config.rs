//! Analysis configuration threaded through the pipeline stages.
//!
//! A configuration is immutable from the caller's point of view, but the
//! pipeline itself threads a *revised* copy forward: the read stage may
//! rewrite it from directives embedded in the parse tree, and the rewrite
//! stage may revise it again.

use serde::{Deserialize, Serialize};
use std::fmt;

/// External preprocessing command applied to a document before reading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreprocessorCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl PreprocessorCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }
}

impl fmt::Display for PreprocessorCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// How the rewrite stage treats warnings raised by the macro rewriter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WarningsPolicy {
    /// Keep warnings as warnings.
    #[default]
    Keep,
    /// Promote warnings to errors.
    AsErrors,
    /// Drop warnings entirely.
    Ignore,
}

/// Immutable description of one analysis request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Command to preprocess the document with, if any. When absent the
    /// raw document is read as-is.
    pub preprocessor: Option<PreprocessorCommand>,
    /// Policy for warnings raised during macro rewriting.
    pub warnings: WarningsPolicy,
    /// Free-form analysis flags. Directives found in the parse tree land
    /// here when the frontend applies them.
    pub flags: Vec<String>,
}

impl AnalysisConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_preprocessor(mut self, command: PreprocessorCommand) -> Self {
        self.preprocessor = Some(command);
        self
    }

    pub fn with_warnings(mut self, policy: WarningsPolicy) -> Self {
        self.warnings = policy;
        self
    }

    pub fn with_flag(mut self, flag: impl Into<String>) -> Self {
        self.flags.push(flag.into());
        self
    }
}
