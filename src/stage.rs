//! Memoized deferred stage evaluation.
//!
//! A [`StageCell`] holds one pipeline phase as a cell in one of four
//! states: not yet evaluated, currently evaluating, evaluated, or failed.
//! The first access runs the thunk under self-time accounting; every later
//! access replays the cached value or the cached failure without touching
//! the collaborator or the counters again.

use crate::error::PipelineError;
use crate::timing::{StageCounter, TimingContext};
use std::cell::RefCell;
use std::rc::Rc;

type Thunk<T> = Box<dyn FnOnce() -> Result<T, PipelineError>>;

enum StageState<T> {
    Pending(Thunk<T>),
    Evaluating,
    Ready(Rc<T>),
    Failed(PipelineError),
}

/// A single deferred, memoized pipeline phase.
pub struct StageCell<T> {
    name: &'static str,
    counter: StageCounter,
    timing: Rc<TimingContext>,
    state: RefCell<StageState<T>>,
}

impl<T> StageCell<T> {
    /// Cell that evaluates `thunk` on first force, crediting its self time
    /// to `counter`.
    pub fn deferred(
        name: &'static str,
        counter: StageCounter,
        timing: Rc<TimingContext>,
        thunk: impl FnOnce() -> Result<T, PipelineError> + 'static,
    ) -> Self {
        Self {
            name,
            counter,
            timing,
            state: RefCell::new(StageState::Pending(Box::new(thunk))),
        }
    }

    /// Cell that is already resolved. Forcing returns the value without
    /// accounting any time, so its counter stays untouched.
    pub fn settled(
        name: &'static str,
        counter: StageCounter,
        timing: Rc<TimingContext>,
        value: Rc<T>,
    ) -> Self {
        Self {
            name,
            counter,
            timing,
            state: RefCell::new(StageState::Ready(value)),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Whether the cell has already resolved to a value or a failure.
    pub fn is_settled(&self) -> bool {
        matches!(
            &*self.state.borrow(),
            StageState::Ready(_) | StageState::Failed(_)
        )
    }

    /// Evaluate the cell if needed and return its (shared) result.
    ///
    /// Failures are memoized too: the first error is cloned back out on
    /// every subsequent force. Forcing a cell from within its own thunk is
    /// reported as a dependency cycle instead of looping.
    pub fn force(&self) -> Result<Rc<T>, PipelineError> {
        let thunk = {
            let mut state = self.state.borrow_mut();
            match std::mem::replace(&mut *state, StageState::Evaluating) {
                StageState::Pending(thunk) => thunk,
                StageState::Ready(value) => {
                    *state = StageState::Ready(value.clone());
                    return Ok(value);
                }
                StageState::Failed(err) => {
                    *state = StageState::Failed(err.clone());
                    return Err(err);
                }
                // State stays Evaluating; the in-flight force will settle it.
                StageState::Evaluating => {
                    return Err(PipelineError::DependencyCycle { stage: self.name })
                }
            }
        };

        let before = self.timing.counters().get(self.counter);
        let outcome = self.timing.account(self.counter, thunk);
        let spent = self
            .timing
            .counters()
            .get(self.counter)
            .saturating_sub(before);

        match outcome {
            Ok(value) => {
                log::debug!("stage `{}` settled in {:?}", self.name, spent);
                let value = Rc::new(value);
                *self.state.borrow_mut() = StageState::Ready(value.clone());
                Ok(value)
            }
            Err(err) => {
                log::debug!("stage `{}` failed in {:?}: {}", self.name, spent, err);
                *self.state.borrow_mut() = StageState::Failed(err.clone());
                Err(err)
            }
        }
    }
}
