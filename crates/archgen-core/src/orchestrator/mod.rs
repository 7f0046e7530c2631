//! Pipeline orchestration: the explicit state machine plus the engine
//! that drives generate -> validate -> retry-or-accept for the create and
//! modify flows.

mod engine;
mod state;

pub use engine::Orchestrator;
pub use state::{transition, PipelineEvent, PipelineState, TransitionError};
