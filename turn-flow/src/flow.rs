use dashmap::DashMap;
use std::sync::{Arc, Mutex};
use tracing::debug;

use crate::{
    context::Context,
    error::{FlowError, Result},
    session::Session,
    step::{NextAction, Step, StepResult},
};

/// Directed edge between two steps
#[derive(Clone)]
pub struct Edge {
    pub from: String,
    pub to: String,
}

/// A conversation flow: a set of steps connected by edges, executed one
/// turn at a time against a session.
pub struct Flow {
    pub id: String,
    steps: DashMap<String, Arc<dyn Step>>,
    edges: Mutex<Vec<Edge>>,
    start_step_id: Mutex<Option<String>>,
}

impl Flow {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            steps: DashMap::new(),
            edges: Mutex::new(Vec::new()),
            start_step_id: Mutex::new(None),
        }
    }

    /// Add a step to the flow. The first step added becomes the start step.
    pub fn add_step(&self, step: Arc<dyn Step>) -> &Self {
        let step_id = step.id().to_string();
        let is_first = self.steps.is_empty();
        self.steps.insert(step_id.clone(), step);

        if is_first {
            *self.start_step_id.lock().unwrap() = Some(step_id);
        }

        self
    }

    /// Add an edge between steps
    pub fn add_edge(&self, from: impl Into<String>, to: impl Into<String>) -> &Self {
        self.edges.lock().unwrap().push(Edge {
            from: from.into(),
            to: to.into(),
        });
        self
    }

    /// Execute the session's current step and apply its next action to the
    /// session. At most one user-visible reply is produced per call.
    pub async fn execute_session(&self, session: &mut Session) -> Result<ExecutionResult> {
        let result = self
            .execute_single_step(&session.current_step_id, session.context.clone())
            .await?;

        debug!(
            flow_id = %self.id,
            step_id = %result.step_id,
            action = ?result.next_action,
            "step executed"
        );

        match &result.next_action {
            NextAction::Continue => {
                session.status_message = result.status_message.clone();

                // Advance the pointer without executing the next step
                if let Some(next_step_id) = self.find_next_step(&result.step_id) {
                    session.current_step_id = next_step_id;
                } else {
                    session.current_step_id = result.step_id.clone();
                }

                Ok(ExecutionResult {
                    response: result.reply,
                    status: ExecutionStatus::WaitingForInput,
                })
            }
            NextAction::ContinueAndExecute => {
                session.status_message = result.status_message.clone();

                if let Some(next_step_id) = self.find_next_step(&result.step_id) {
                    session.current_step_id = next_step_id;
                    // Keep executing within the same turn so the reply comes
                    // from the step that actually finishes the work
                    return Box::pin(self.execute_session(session)).await;
                }

                session.current_step_id = result.step_id.clone();
                Ok(ExecutionResult {
                    response: result.reply,
                    status: ExecutionStatus::WaitingForInput,
                })
            }
            NextAction::WaitForInput => {
                session.status_message = result.status_message.clone();
                session.current_step_id = result.step_id.clone();
                Ok(ExecutionResult {
                    response: result.reply,
                    status: ExecutionStatus::WaitingForInput,
                })
            }
            NextAction::End => {
                session.status_message = result.status_message.clone();
                session.current_step_id = result.step_id.clone();
                Ok(ExecutionResult {
                    response: result.reply,
                    status: ExecutionStatus::Completed,
                })
            }
        }
    }

    async fn execute_single_step(&self, step_id: &str, context: Context) -> Result<StepResult> {
        let step = self
            .steps
            .get(step_id)
            .ok_or_else(|| FlowError::StepNotFound(step_id.to_string()))?;

        let mut result = step.run(context).await?;

        // Track which step produced the result
        result.step_id = step_id.to_string();

        Ok(result)
    }

    /// Find the next step following the first matching edge
    pub fn find_next_step(&self, current_step_id: &str) -> Option<String> {
        let edges = self.edges.lock().unwrap();
        edges
            .iter()
            .find(|edge| edge.from == current_step_id)
            .map(|edge| edge.to.clone())
    }

    /// Get the start step ID
    pub fn start_step_id(&self) -> Option<String> {
        self.start_step_id.lock().unwrap().clone()
    }
}

/// Builder for creating flows
pub struct FlowBuilder {
    flow: Flow,
}

impl FlowBuilder {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            flow: Flow::new(id),
        }
    }

    pub fn add_step(self, step: Arc<dyn Step>) -> Self {
        self.flow.add_step(step);
        self
    }

    pub fn add_edge(self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.flow.add_edge(from, to);
        self
    }

    pub fn build(self) -> Flow {
        self.flow
    }
}

/// Status of one turn of flow execution
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    pub response: Option<String>,
    pub status: ExecutionStatus,
}

#[derive(Debug, Clone)]
pub enum ExecutionStatus {
    /// Waiting for the next user turn
    WaitingForInput,
    /// Flow completed
    Completed,
    /// Error occurred during execution
    Error(String),
}
