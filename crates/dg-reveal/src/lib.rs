#![forbid(unsafe_code)]

//! Progressive reveal: nodes appear one per tick in declaration order, edges
//! appear together with their destination node.

mod scheduler;
mod state;

pub use scheduler::RevealScheduler;
pub use state::{RevealFrame, RevealState, TickOutcome};

#[derive(Debug, thiserror::Error)]
pub enum RevealError {
    #[error("a tokio runtime is required to schedule reveal ticks")]
    NoRuntime,
}
