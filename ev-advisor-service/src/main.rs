use ev_advisor_service::{AppState, create_app, init_tracing};
use tracing::info;

const DEFAULT_PREDICTOR_URL: &str = "http://127.0.0.1:5000/predict";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let predictor_url =
        std::env::var("PREDICTOR_URL").unwrap_or_else(|_| DEFAULT_PREDICTOR_URL.to_string());
    info!(endpoint = %predictor_url, "using prediction endpoint");

    let app = create_app(AppState::new(predictor_url));

    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;

    info!("Server running on http://0.0.0.0:3000");

    axum::serve(listener, app).await?;

    Ok(())
}
