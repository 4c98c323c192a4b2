use async_trait::async_trait;
use tracing::info;
use turn_flow::{Context, FlowError, NextAction, Result, Step, StepResult};

use crate::parse;
use crate::render::{format_euro, invalid_amount};
use crate::types::session_keys;

const GREETING: &str = "Welcome! I can help you find your ideal electric vehicle segment. \
What is the maximum price you want to pay (in euro)?";

/// First collection step: the price ceiling.
pub struct CollectPriceStep;

#[async_trait]
impl Step for CollectPriceStep {
    async fn run(&self, context: Context) -> Result<StepResult> {
        info!("running step: {}", self.id());

        let user_input: String = context
            .user_turn()
            .await
            .ok_or_else(|| FlowError::ContextError("user turn not found".to_string()))?;
        let turn = user_input.trim();

        // The opening turn of a conversation may be empty; greet and wait.
        if turn.is_empty() {
            context.add_bot_message(GREETING).await;
            return Ok(StepResult::new(
                Some(GREETING.to_string()),
                NextAction::WaitForInput,
            ));
        }

        context.add_user_message(turn).await;

        match parse::extract_amount(turn) {
            Ok(price) => {
                context.set(session_keys::PRICE_EURO, price).await;

                let reply = format!(
                    "Got it! Max budget set to €{}. Now, what is the minimum range you need (in km)?",
                    format_euro(price)
                );
                context.add_bot_message(reply.clone()).await;

                info!(price_euro = price, "price collected");

                Ok(StepResult::with_status(
                    Some(reply),
                    NextAction::Continue,
                    Some("price collected - waiting for range".to_string()),
                ))
            }
            Err(err) => {
                let reply = invalid_amount("price", &err);
                context.add_bot_message(reply.clone()).await;

                Ok(StepResult::new(Some(reply), NextAction::WaitForInput))
            }
        }
    }
}
