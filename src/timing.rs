//! Wall-clock accounting for pipeline stages.
//!
//! Each pipeline phase owns a monotonically growing counter, and a shared
//! *time shift* tracks how much elapsed time has already been claimed by
//! completed accounted computations. Subtracting the shift delta from a
//! computation's elapsed time yields its *self time*: the cost of the work
//! it did itself, excluding nested accounted computations it triggered.
//!
//! The shift is not process-global: it lives in a [`TimingContext`] that a
//! builder creates and alternate-target clones share by reference. The
//! context is single-threaded by construction (`Cell`, `Rc`), matching the
//! re-entrant-but-not-parallel evaluation model of the pipeline.

use once_cell::sync::Lazy;
use serde::Serialize;
use std::cell::Cell;
use std::collections::BTreeMap;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Monotonic clock seam.
///
/// `time_spent` reports cumulative time consumed so far; only differences
/// of successive readings are meaningful, so any fixed epoch works.
pub trait Clock {
    fn time_spent(&self) -> Duration;
}

static PROCESS_EPOCH: Lazy<Instant> = Lazy::new(Instant::now);

/// Wall clock measuring time since its first use in this process.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessClock;

impl Clock for ProcessClock {
    fn time_spent(&self) -> Duration {
        PROCESS_EPOCH.elapsed()
    }
}

/// The five independently timed pipeline phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageCounter {
    Preprocess,
    Read,
    Rewrite,
    Typecheck,
    TypeDiagnostics,
}

impl StageCounter {
    pub fn name(self) -> &'static str {
        match self {
            Self::Preprocess => "preprocess",
            Self::Read => "read",
            Self::Rewrite => "rewrite",
            Self::Typecheck => "typecheck",
            Self::TypeDiagnostics => "type_diagnostics",
        }
    }
}

/// Per-stage accumulators. Counters only grow; a stage's contribution is
/// added exactly once, when the stage first finishes evaluating.
#[derive(Debug, Default)]
pub struct StageTimings {
    preprocess: Cell<Duration>,
    read: Cell<Duration>,
    rewrite: Cell<Duration>,
    typecheck: Cell<Duration>,
    type_diagnostics: Cell<Duration>,
}

impl StageTimings {
    fn cell(&self, counter: StageCounter) -> &Cell<Duration> {
        match counter {
            StageCounter::Preprocess => &self.preprocess,
            StageCounter::Read => &self.read,
            StageCounter::Rewrite => &self.rewrite,
            StageCounter::Typecheck => &self.typecheck,
            StageCounter::TypeDiagnostics => &self.type_diagnostics,
        }
    }

    pub fn add(&self, counter: StageCounter, amount: Duration) {
        let cell = self.cell(counter);
        cell.set(cell.get() + amount);
    }

    pub fn get(&self, counter: StageCounter) -> Duration {
        self.cell(counter).get()
    }

    /// Snapshot the accumulators in seconds.
    pub fn report(&self) -> TimingReport {
        TimingReport {
            preprocess: self.preprocess.get().as_secs_f64(),
            read: self.read.get().as_secs_f64(),
            rewrite: self.rewrite.get().as_secs_f64(),
            typecheck: self.typecheck.get().as_secs_f64(),
            type_diagnostics: self.type_diagnostics.get().as_secs_f64(),
        }
    }
}

/// Timing state shared by every stage of one pipeline, and across
/// alternate-target clones of it: the per-stage counters plus the running
/// shift used for nested self-time subtraction.
pub struct TimingContext {
    clock: Rc<dyn Clock>,
    shift: Cell<Duration>,
    counters: StageTimings,
}

impl TimingContext {
    pub fn new(clock: Rc<dyn Clock>) -> Self {
        Self {
            clock,
            shift: Cell::new(Duration::ZERO),
            counters: StageTimings::default(),
        }
    }

    /// Context backed by the process wall clock.
    pub fn process() -> Self {
        Self::new(Rc::new(ProcessClock))
    }

    pub fn counters(&self) -> &StageTimings {
        &self.counters
    }

    pub fn report(&self) -> TimingReport {
        self.counters.report()
    }

    /// Run `body`, crediting its self time to `counter`.
    ///
    /// `body` may recursively run further accounted computations on this
    /// context; their total elapsed time is excluded from this call's self
    /// time via the shift. Bookkeeping is unconditional: when `body`
    /// produces an error value, the counter and shift are still updated
    /// before the outcome is handed back.
    ///
    /// Summed across one forcing call stack, self times equal the elapsed
    /// wall time of the outermost accounted call.
    pub fn account<T>(&self, counter: StageCounter, body: impl FnOnce() -> T) -> T {
        let start = self.clock.time_spent();
        let shift_before = self.shift.get();

        let outcome = body();

        let elapsed = self.clock.time_spent().saturating_sub(start);
        let nested = self.shift.get().saturating_sub(shift_before);
        self.counters.add(counter, elapsed.saturating_sub(nested));
        // Propagate this call's total upward so an enclosing accounted
        // computation excludes it entirely.
        self.shift.set(shift_before + elapsed);

        outcome
    }
}

/// Snapshot of per-stage elapsed wall time, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimingReport {
    pub preprocess: f64,
    pub read: f64,
    pub rewrite: f64,
    pub typecheck: f64,
    pub type_diagnostics: f64,
}

impl TimingReport {
    pub fn total(&self) -> f64 {
        self.preprocess + self.read + self.rewrite + self.typecheck + self.type_diagnostics
    }

    /// Stage name to elapsed seconds, in stage order.
    pub fn to_map(&self) -> BTreeMap<&'static str, f64> {
        BTreeMap::from([
            (StageCounter::Preprocess.name(), self.preprocess),
            (StageCounter::Read.name(), self.read),
            (StageCounter::Rewrite.name(), self.rewrite),
            (StageCounter::Typecheck.name(), self.typecheck),
            (StageCounter::TypeDiagnostics.name(), self.type_diagnostics),
        ])
    }

    /// Serialize the report to JSON.
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }

    /// Generate a human-readable summary of the report.
    #[must_use]
    pub fn to_summary(&self) -> String {
        let mut output = String::new();
        output.push_str(&format!(
            "Pipeline timing (total {})\n",
            format_seconds(self.total())
        ));
        for (name, seconds) in [
            (StageCounter::Preprocess.name(), self.preprocess),
            (StageCounter::Read.name(), self.read),
            (StageCounter::Rewrite.name(), self.rewrite),
            (StageCounter::Typecheck.name(), self.typecheck),
            (StageCounter::TypeDiagnostics.name(), self.type_diagnostics),
        ] {
            output.push_str(&format!(
                "{:<18} {:>10}\n",
                name,
                format_seconds(seconds)
            ));
        }
        output
    }
}

/// Format a duration in seconds for display.
fn format_seconds(seconds: f64) -> String {
    if seconds >= 1.0 {
        format!("{seconds:.2}s")
    } else if seconds >= 0.001 {
        format!("{:.1}ms", seconds * 1000.0)
    } else {
        format!("{:.0}µs", seconds * 1_000_000.0)
    }
}
