pub mod context;
pub mod error;
pub mod flow;
pub mod runner;
pub mod session;
pub mod step;

// Re-export commonly used types
pub use context::{Context, Speaker, TranscriptEntry};
pub use error::{FlowError, Result};
pub use flow::{ExecutionResult, ExecutionStatus, Flow, FlowBuilder};
pub use runner::FlowRunner;
pub use session::{InMemorySessionStorage, Session, SessionStorage};
pub use step::{NextAction, Step, StepResult};
