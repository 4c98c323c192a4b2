//! FlowRunner – drives exactly one turn of a flow: stage the user's input,
//! execute the session's current step, persist the updated session.
//!
//! All three phases happen behind a per-session gate, so a second submission
//! for the same session blocks until the in-flight one has resolved and
//! rendered. Turns therefore execute and complete in arrival order; there is
//! no cancellation and no supersede, a queued turn simply runs next.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::debug;

use crate::{
    error::{FlowError, Result},
    flow::{ExecutionResult, Flow},
    session::SessionStorage,
};

/// High-level helper that orchestrates the _stage → load → execute → save_
/// cycle for each turn.
#[derive(Clone)]
pub struct FlowRunner {
    flow: Arc<Flow>,
    storage: Arc<dyn SessionStorage>,
    in_flight: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl FlowRunner {
    pub fn new(flow: Arc<Flow>, storage: Arc<dyn SessionStorage>) -> Self {
        Self {
            flow,
            storage,
            in_flight: Arc::new(DashMap::new()),
        }
    }

    /// Process one user turn for the given session and persist the result.
    ///
    /// Returns the same [`ExecutionResult`] that `Flow::execute_session`
    /// does, so callers can inspect the reply and the status
    /// (`WaitingForInput`, `Completed`, …).
    pub async fn run_turn(
        &self,
        session_id: &str,
        input: impl Into<String>,
    ) -> Result<ExecutionResult> {
        // Per-session turn gate: taken for the whole load → execute → save
        // cycle, including the outbound prediction call a step may make.
        let gate = self
            .in_flight
            .entry(session_id.to_string())
            .or_default()
            .clone();
        let _turn = gate.lock().await;

        let mut session = self
            .storage
            .get(session_id)
            .await?
            .ok_or_else(|| FlowError::SessionNotFound(session_id.to_string()))?;

        session.context.set_user_turn(input).await;

        debug!(
            session_id = %session_id,
            current_step = %session.current_step_id,
            "processing turn"
        );

        let result = self.flow.execute_session(&mut session).await?;

        self.storage.save(session).await?;

        Ok(result)
    }
}
