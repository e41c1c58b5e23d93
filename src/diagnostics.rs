//! Diagnostics as data, and the capture scope used by the rewrite stage.
//!
//! A diagnostic describes an issue with the analyzed document. Diagnostics
//! are always returned as values, never as control-flow failures: instead
//! of stopping at the first problem, each stage collects everything it saw
//! and presents it together. The one exception is preprocessing, whose
//! collaborator failures are fatal to the forcing (see `error`).

use crate::config::WarningsPolicy;
use crate::document::Span;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Warning,
    Error,
}

/// A non-fatal condition describing an issue with the analyzed document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub span: Option<Span>,
}

impl Diagnostic {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
            span: None,
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
            span: None,
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Collecting boundary for diagnostics raised during macro rewriting.
///
/// Diagnostics reported here are appended to an ordered list instead of
/// aborting the stage; the configured warnings policy is applied at report
/// time. Genuine faults do not go through the sink at all: the rewriter
/// returns them as errors and they propagate.
#[derive(Debug)]
pub struct DiagnosticSink {
    policy: WarningsPolicy,
    items: RefCell<Vec<Diagnostic>>,
}

impl DiagnosticSink {
    pub fn new(policy: WarningsPolicy) -> Self {
        Self {
            policy,
            items: RefCell::new(Vec::new()),
        }
    }

    /// Record a diagnostic, applying the warnings policy.
    pub fn report(&self, diagnostic: Diagnostic) {
        let diagnostic = match (self.policy, diagnostic.severity) {
            (WarningsPolicy::Ignore, Severity::Warning) => return,
            (WarningsPolicy::AsErrors, Severity::Warning) => Diagnostic {
                severity: Severity::Error,
                ..diagnostic
            },
            _ => diagnostic,
        };
        self.items.borrow_mut().push(diagnostic);
    }

    pub fn has_errors(&self) -> bool {
        self.items.borrow().iter().any(Diagnostic::is_error)
    }

    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }

    /// Consume the sink, yielding the collected diagnostics in report order.
    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.items.into_inner()
    }
}
