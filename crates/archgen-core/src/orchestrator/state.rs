//! Pipeline state machine.
//!
//! Multi-step async retry workflows are modeled as an explicit state
//! machine: each transition is a pure function of `(state, event)`, and
//! the engine performs exactly one side-effecting step per state. This
//! keeps the retry control loop auditable and testable without any I/O.

use std::fmt;

use thiserror::Error;

/// States of one create/modify pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    BuildingPrompt,
    Generating,
    Validating,
    /// Terminal: result persisted.
    Accepted,
    /// Drift rejected with attempts remaining; the prompt is rebuilt with
    /// an intensified lock and generation re-entered.
    RetryStronger,
    /// Terminal: attempts exhausted or an unrecoverable error.
    Failed,
}

impl PipelineState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::Accepted | PipelineState::Failed)
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineState::Idle => "idle",
            PipelineState::BuildingPrompt => "building_prompt",
            PipelineState::Generating => "generating",
            PipelineState::Validating => "validating",
            PipelineState::Accepted => "accepted",
            PipelineState::RetryStronger => "retry_stronger",
            PipelineState::Failed => "failed",
        };
        write!(f, "{name}")
    }
}

/// Events that drive the pipeline forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineEvent {
    Start,
    PromptReady,
    GenerationFinished,
    ValidationPassed,
    /// Validation rejected the render and a retry attempt remains.
    ValidationFailedRetry,
    /// Validation rejected the render and no attempts remain.
    ValidationFailedFinal,
    RetryPromptReady,
    /// Unrecoverable error or cancellation in any non-terminal state.
    Abort,
}

/// Attempted transition not defined by the state machine.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid transition: {state} on {event:?}")]
pub struct TransitionError {
    pub state: PipelineState,
    pub event: PipelineEvent,
}

/// Pure transition function. No side effects, no clock, no I/O.
pub fn transition(
    state: PipelineState,
    event: PipelineEvent,
) -> Result<PipelineState, TransitionError> {
    use PipelineEvent as E;
    use PipelineState as S;

    let next = match (state, event) {
        (S::Idle, E::Start) => S::BuildingPrompt,
        (S::BuildingPrompt, E::PromptReady) => S::Generating,
        (S::Generating, E::GenerationFinished) => S::Validating,
        (S::Validating, E::ValidationPassed) => S::Accepted,
        (S::Validating, E::ValidationFailedRetry) => S::RetryStronger,
        (S::Validating, E::ValidationFailedFinal) => S::Failed,
        (S::RetryStronger, E::RetryPromptReady) => S::Generating,
        (s, E::Abort) if !s.is_terminal() => S::Failed,
        (state, event) => return Err(TransitionError { state, event }),
    };
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use PipelineEvent as E;
    use PipelineState as S;

    #[test]
    fn test_happy_path_create() {
        let mut state = S::Idle;
        for event in [E::Start, E::PromptReady, E::GenerationFinished, E::ValidationPassed] {
            state = transition(state, event).unwrap();
        }
        assert_eq!(state, S::Accepted);
        assert!(state.is_terminal());
    }

    #[test]
    fn test_retry_loop_reenters_generating() {
        let mut state = S::Idle;
        for event in [E::Start, E::PromptReady, E::GenerationFinished, E::ValidationFailedRetry] {
            state = transition(state, event).unwrap();
        }
        assert_eq!(state, S::RetryStronger);
        state = transition(state, E::RetryPromptReady).unwrap();
        assert_eq!(state, S::Generating);
    }

    #[test]
    fn test_exhausted_retries_fail() {
        let state = transition(S::Validating, E::ValidationFailedFinal).unwrap();
        assert_eq!(state, S::Failed);
        assert!(state.is_terminal());
    }

    #[test]
    fn test_abort_from_any_non_terminal_state() {
        for state in [S::Idle, S::BuildingPrompt, S::Generating, S::Validating, S::RetryStronger] {
            assert_eq!(transition(state, E::Abort).unwrap(), S::Failed);
        }
    }

    #[test]
    fn test_terminal_states_accept_no_events() {
        for state in [S::Accepted, S::Failed] {
            for event in [
                E::Start,
                E::PromptReady,
                E::GenerationFinished,
                E::ValidationPassed,
                E::ValidationFailedRetry,
                E::ValidationFailedFinal,
                E::RetryPromptReady,
                E::Abort,
            ] {
                assert!(transition(state, event).is_err(), "{state} accepted {event:?}");
            }
        }
    }

    #[test]
    fn test_out_of_order_events_rejected() {
        assert!(transition(S::Idle, E::GenerationFinished).is_err());
        assert!(transition(S::Generating, E::ValidationPassed).is_err());
        assert!(transition(S::BuildingPrompt, E::RetryPromptReady).is_err());
    }
}
