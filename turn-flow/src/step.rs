use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{context::Context, error::Result};

/// Result of a single step execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepResult {
    /// Reply to send back to the user, if any
    pub reply: Option<String>,
    /// What the flow should do next
    pub next_action: NextAction,
    /// Short progress description persisted on the session
    pub status_message: Option<String>,
    /// Id of the step that produced this result, filled in by the flow
    #[serde(default)]
    pub(crate) step_id: String,
}

impl StepResult {
    pub fn new(reply: Option<String>, next_action: NextAction) -> Self {
        Self {
            reply,
            next_action,
            status_message: None,
            step_id: String::new(),
        }
    }

    pub fn with_status(
        reply: Option<String>,
        next_action: NextAction,
        status_message: Option<String>,
    ) -> Self {
        Self {
            reply,
            next_action,
            status_message,
            step_id: String::new(),
        }
    }
}

/// Defines what should happen after a step completes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum NextAction {
    /// Advance to the next step, which runs on the next turn
    Continue,
    /// Advance to the next step and execute it immediately
    ContinueAndExecute,
    /// Stay at the current step and wait for another turn
    WaitForInput,
    /// End the flow
    End,
}

/// One step of a conversation flow
#[async_trait]
pub trait Step: Send + Sync {
    /// Unique identifier for this step
    fn id(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Execute the step against the shared context
    async fn run(&self, context: Context) -> Result<StepResult>;
}
