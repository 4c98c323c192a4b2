//! HTTP surface of the advisor: the chat collector, the form collector,
//! and the session view, wired over one shared prediction client.

use std::any::type_name;
use std::sync::Arc;

use axum::{
    Router,
    extract::{Path, State},
    http::{HeaderValue, Request, StatusCode},
    middleware::{Next, from_fn},
    response::Json,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{Instrument, error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use turn_flow::{
    Flow, FlowBuilder, FlowError, FlowRunner, InMemorySessionStorage, Session, SessionStorage,
    Step, TranscriptEntry,
};
use uuid::Uuid;

use crate::client::{PredictionClient, PredictionError};
use crate::form::{FormError, FormSubmission};
use crate::render;
use crate::steps::{CollectPriceStep, CollectRangeStep, RunPredictionStep};
use crate::types::Recommendation;

#[derive(Clone)]
pub struct AppState {
    runner: Arc<FlowRunner>,
    session_storage: Arc<dyn SessionStorage>,
    prediction_client: Arc<PredictionClient>,
}

impl AppState {
    /// Build the full advisor state against the given prediction endpoint.
    pub fn new(predictor_url: impl Into<String>) -> Self {
        let prediction_client = Arc::new(PredictionClient::new(predictor_url));
        let session_storage: Arc<dyn SessionStorage> = Arc::new(InMemorySessionStorage::new());
        let flow = Arc::new(build_advisor_flow(prediction_client.clone()));
        let runner = Arc::new(FlowRunner::new(flow, session_storage.clone()));

        Self {
            runner,
            session_storage,
            prediction_client,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub session_id: Option<String>,
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub session_id: String,
    pub response: Option<String>,
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct SessionView {
    pub session_id: String,
    pub current_step: String,
    pub status_message: Option<String>,
    pub transcript: Vec<TranscriptEntry>,
}

#[derive(Debug, Serialize)]
pub struct RecommendResponse {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub panel: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub predicted_segment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendations: Option<Vec<Recommendation>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub missing_fields: Option<Vec<String>>,
}

/// Initialize structured tracing based on environment variables
pub fn init_tracing() {
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "json".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "ev_advisor_service=debug,turn_flow=debug,tower_http=debug".into());

    match log_format.as_str() {
        "pretty" => {
            // Human-readable logging for development
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        _ => {
            // Structured JSON logging for production
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_target(true)
                        .with_level(true),
                )
                .init();
        }
    }
}

/// Middleware to add a correlation ID to all requests
async fn correlation_id_middleware(
    mut request: Request<axum::body::Body>,
    next: Next,
) -> axum::response::Response {
    let correlation_id = Uuid::new_v4().to_string();

    request.headers_mut().insert(
        "x-correlation-id",
        HeaderValue::from_str(&correlation_id).unwrap(),
    );

    let span = tracing::info_span!("http_request", correlation_id = %correlation_id);

    next.run(request).instrument(span).await
}

/// The chat collector as a flow: price -> range -> prediction, with the
/// prediction step cycling back so a finished conversation is immediately
/// ready for a new one.
pub fn build_advisor_flow(client: Arc<PredictionClient>) -> Flow {
    let collect_price = Arc::new(CollectPriceStep);
    let collect_range = Arc::new(CollectRangeStep);
    let run_prediction = Arc::new(RunPredictionStep::new(client));

    let price_id = collect_price.id().to_string();
    let range_id = collect_range.id().to_string();
    let predict_id = run_prediction.id().to_string();

    FlowBuilder::new("ev_advisor_chat")
        .add_step(collect_price)
        .add_step(collect_range)
        .add_step(run_prediction)
        .add_edge(price_id.clone(), range_id.clone())
        .add_edge(range_id, predict_id.clone())
        .add_edge(predict_id, price_id)
        .build()
}

/// Build the router with tracing, CORS, and correlation ID middleware
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/chat", post(chat_turn))
        .route("/recommend", post(recommend))
        .route("/session/{id}", get(get_session))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .layer(from_fn(correlation_id_middleware))
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

async fn chat_turn(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, StatusCode> {
    let session_id_provided = request.session_id.is_some();
    let session_id = request
        .session_id
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    // Validate session ID format if provided
    if session_id_provided && Uuid::parse_str(&session_id).is_err() {
        error!(session_id = %session_id, "Invalid session ID format");
        return Err(StatusCode::BAD_REQUEST);
    }

    info!(
        session_id = %session_id,
        content_length = request.content.len(),
        "processing chat turn"
    );

    match state.session_storage.get(&session_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            // A provided session id must already exist
            if session_id_provided {
                error!(session_id = %session_id, "Session not found");
                return Err(StatusCode::NOT_FOUND);
            }
            info!(session_id = %session_id, "Creating new session");
            let session =
                Session::new_from_step(session_id.clone(), type_name::<CollectPriceStep>());
            if let Err(e) = state.session_storage.save(session).await {
                error!(session_id = %session_id, error = %e, "Failed to save session");
                return Err(StatusCode::INTERNAL_SERVER_ERROR);
            }
        }
        Err(e) => {
            error!(session_id = %session_id, error = %e, "Failed to get session");
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    }

    let execution = match state.runner.run_turn(&session_id, request.content).await {
        Ok(execution) => execution,
        Err(FlowError::SessionNotFound(_)) => return Err(StatusCode::NOT_FOUND),
        Err(e) => {
            error!(session_id = %session_id, error = %e, "Failed to process turn");
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    Ok(Json(ChatResponse {
        session_id,
        response: execution.response,
        status: format!("{:?}", execution.status),
    }))
}

async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionView>, StatusCode> {
    match state.session_storage.get(&session_id).await {
        Ok(Some(session)) => {
            let transcript = session.context.transcript().await;
            Ok(Json(SessionView {
                session_id: session.id,
                current_step: session.current_step_id,
                status_message: session.status_message,
                transcript,
            }))
        }
        Ok(None) => {
            info!(session_id = %session_id, "Session not found");
            Err(StatusCode::NOT_FOUND)
        }
        Err(e) => {
            error!(session_id = %session_id, error = %e, "Failed to get session");
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

async fn recommend(
    State(state): State<AppState>,
    Json(submission): Json<FormSubmission>,
) -> (StatusCode, Json<RecommendResponse>) {
    let spec = match submission.assemble() {
        Ok(spec) => spec,
        Err(FormError::MissingFields(missing)) => {
            info!(missing = ?missing, "form submission rejected");
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(RecommendResponse {
                    status: "error".to_string(),
                    panel: None,
                    predicted_segment: None,
                    recommendations: None,
                    error: Some(format!("missing required fields: {}", missing.join(", "))),
                    missing_fields: Some(missing),
                }),
            );
        }
        Err(err) => {
            info!(error = %err, "form submission rejected");
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(RecommendResponse {
                    status: "error".to_string(),
                    panel: None,
                    predicted_segment: None,
                    recommendations: None,
                    error: Some(err.to_string()),
                    missing_fields: None,
                }),
            );
        }
    };

    info!(price_euro = spec.price_euro, "running form prediction");

    match state.prediction_client.predict(&spec).await {
        Ok(outcome) => (
            StatusCode::OK,
            Json(RecommendResponse {
                status: "success".to_string(),
                panel: Some(render::results_panel(&outcome)),
                predicted_segment: Some(outcome.predicted_segment.clone()),
                recommendations: Some(outcome.recommendations),
                error: None,
                missing_fields: None,
            }),
        ),
        Err(err) => {
            // A rejection was processed upstream; only transport trouble
            // maps to a gateway error
            let status = match &err {
                PredictionError::Rejected(_) => StatusCode::OK,
                PredictionError::Connection(_) => StatusCode::BAD_GATEWAY,
            };
            (
                status,
                Json(RecommendResponse {
                    status: "error".to_string(),
                    panel: Some(render::panel_error(&err)),
                    predicted_segment: None,
                    recommendations: None,
                    error: Some(err.to_string()),
                    missing_fields: None,
                }),
            )
        }
    }
}
