use async_trait::async_trait;
use tracing::info;
use turn_flow::{Context, FlowError, NextAction, Result, Step, StepResult};

use crate::parse;
use crate::render::invalid_amount;
use crate::types::session_keys;

/// Second collection step: the minimum range. A usable answer hands the
/// conversation straight to the prediction step within the same turn.
pub struct CollectRangeStep;

#[async_trait]
impl Step for CollectRangeStep {
    async fn run(&self, context: Context) -> Result<StepResult> {
        info!("running step: {}", self.id());

        let user_input: String = context
            .user_turn()
            .await
            .ok_or_else(|| FlowError::ContextError("user turn not found".to_string()))?;
        let turn = user_input.trim();

        if turn.is_empty() {
            let reply = "What is the minimum range you need (in km)?".to_string();
            context.add_bot_message(reply.clone()).await;
            return Ok(StepResult::new(Some(reply), NextAction::WaitForInput));
        }

        context.add_user_message(turn).await;

        match parse::extract_amount(turn) {
            Ok(range) => {
                context.set(session_keys::RANGE_KM, range).await;

                info!(range_km = range, "range collected - running prediction");

                // No reply of its own; the prediction step speaks next
                Ok(StepResult::with_status(
                    None,
                    NextAction::ContinueAndExecute,
                    Some("range collected - running prediction".to_string()),
                ))
            }
            Err(err) => {
                let reply = invalid_amount("range", &err);
                context.add_bot_message(reply.clone()).await;

                Ok(StepResult::new(Some(reply), NextAction::WaitForInput))
            }
        }
    }
}
