use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;
use turn_flow::{Context, FlowError, NextAction, Result, Step, StepResult};

use crate::client::PredictionClient;
use crate::render;
use crate::types::{VehicleSpec, session_keys};

/// Terminal step of a conversation: assemble the spec from the collected
/// answers plus chat defaults, call the prediction service once, and reply
/// with the rendered outcome. The collected answers are cleared so the next
/// conversation starts from defaults.
pub struct RunPredictionStep {
    client: Arc<PredictionClient>,
}

impl RunPredictionStep {
    pub fn new(client: Arc<PredictionClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Step for RunPredictionStep {
    async fn run(&self, context: Context) -> Result<StepResult> {
        info!("running step: {}", self.id());

        let price_euro: f64 = context
            .get(session_keys::PRICE_EURO)
            .await
            .ok_or_else(|| FlowError::ContextError("price_euro not found".to_string()))?;
        let range_km: f64 = context
            .get(session_keys::RANGE_KM)
            .await
            .ok_or_else(|| FlowError::ContextError("range_km not found".to_string()))?;

        let spec = VehicleSpec::from_chat_answers(price_euro, range_km);

        // Exactly one render per prediction: the success branch or the
        // error branch, decided here.
        let reply = match self.client.predict(&spec).await {
            Ok(outcome) => render::chat_reply(&outcome),
            Err(err) => render::chat_error(&err),
        };

        // A finished conversation starts the next one from defaults
        context.remove(session_keys::PRICE_EURO).await;
        context.remove(session_keys::RANGE_KM).await;

        context.add_bot_message(reply.clone()).await;

        Ok(StepResult::with_status(
            Some(reply),
            NextAction::Continue,
            Some("prediction delivered - ready for a new conversation".to_string()),
        ))
    }
}
