use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::types::{PredictionOutcome, Recommendation, VehicleSpec};

/// How a prediction call failed
#[derive(Debug, Error)]
pub enum PredictionError {
    /// The service was reachable and turned the request down
    #[error("{0}")]
    Rejected(String),

    /// The service could not be reached or its reply could not be parsed
    #[error("could not reach the prediction service: {0}")]
    Connection(String),
}

/// Raw shape of the prediction endpoint's reply, success or failure
#[derive(Debug, Deserialize)]
struct PredictResponse {
    status: Option<String>,
    predicted_segment: Option<String>,
    recommendations: Option<Vec<Recommendation>>,
    error: Option<String>,
}

/// HTTP client for the segment prediction endpoint, shared by both the form
/// and the chat collectors.
#[derive(Debug, Clone)]
pub struct PredictionClient {
    http: Client,
    endpoint: String,
}

impl PredictionClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            endpoint: endpoint.into(),
        }
    }

    /// POST the spec once and classify the reply. One call per submission,
    /// no retries, no timeout.
    pub async fn predict(&self, spec: &VehicleSpec) -> Result<PredictionOutcome, PredictionError> {
        debug!(endpoint = %self.endpoint, "sending prediction request");

        let response = self
            .http
            .post(&self.endpoint)
            .json(spec)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, endpoint = %self.endpoint, "prediction request failed");
                PredictionError::Connection(e.to_string())
            })?;

        let http_status = response.status();

        // The endpoint sends a JSON body for rejections too, so the body is
        // parsed before the HTTP status is judged.
        let body: PredictResponse = response
            .json()
            .await
            .map_err(|e| PredictionError::Connection(format!("malformed response: {e}")))?;

        if http_status.is_success() && body.status.as_deref() == Some("success") {
            let predicted_segment = body.predicted_segment.ok_or_else(|| {
                PredictionError::Connection("malformed response: missing predicted_segment".into())
            })?;
            let recommendations = body.recommendations.unwrap_or_default();

            info!(
                segment = %predicted_segment,
                count = recommendations.len(),
                "prediction succeeded"
            );

            Ok(PredictionOutcome {
                predicted_segment,
                recommendations,
            })
        } else {
            let message = body.error.unwrap_or_else(|| "Unknown error.".to_string());
            info!(http_status = %http_status, error = %message, "prediction rejected");
            Err(PredictionError::Rejected(message))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn spec() -> VehicleSpec {
        VehicleSpec::from_chat_answers(30000.0, 400.0)
    }

    async fn client_for(server: &MockServer) -> PredictionClient {
        PredictionClient::new(format!("{}/predict", server.uri()))
    }

    #[tokio::test]
    async fn success_reply_parses_into_outcome() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/predict"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "success",
                "predicted_segment": "C",
                "recommendations": [{
                    "Brand": "X",
                    "Model": "Y",
                    "PriceEuro": 30000.0,
                    "Range_Km": 400.0,
                    "AccelSec": 6.5,
                }],
            })))
            .expect(1)
            .mount(&server)
            .await;

        let outcome = client_for(&server).await.predict(&spec()).await.unwrap();

        assert_eq!(outcome.predicted_segment, "C");
        assert_eq!(outcome.recommendations.len(), 1);
        assert_eq!(outcome.recommendations[0].brand, "X");
    }

    #[tokio::test]
    async fn request_body_uses_wire_names() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/predict"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "success",
                "predicted_segment": "B",
                "recommendations": [],
            })))
            .mount(&server)
            .await;

        client_for(&server).await.predict(&spec()).await.unwrap();

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);

        let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert!(body["PriceEuro"].is_number());
        assert!(body["Range_Km"].is_number());
        assert_eq!(body["PowerTrain"], "AWD");
        assert_eq!(body["RapidCharge"], "Yes");
    }

    #[tokio::test]
    async fn server_side_rejection_surfaces_its_error_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/predict"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(json!({"error": "bad input"})),
            )
            .mount(&server)
            .await;

        let err = client_for(&server).await.predict(&spec()).await.unwrap_err();

        match err {
            PredictionError::Rejected(message) => assert_eq!(message, "bad input"),
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn non_success_status_field_is_a_rejection_even_on_200() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/predict"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "error"})))
            .mount(&server)
            .await;

        let err = client_for(&server).await.predict(&spec()).await.unwrap_err();

        match err {
            PredictionError::Rejected(message) => assert_eq!(message, "Unknown error."),
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unparseable_body_is_a_connection_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/predict"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
            .mount(&server)
            .await;

        let err = client_for(&server).await.predict(&spec()).await.unwrap_err();
        assert!(matches!(err, PredictionError::Connection(_)));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_connection_failure() {
        // Nothing listens here
        let client = PredictionClient::new("http://127.0.0.1:9/predict");

        let err = client.predict(&spec()).await.unwrap_err();
        assert!(matches!(err, PredictionError::Connection(_)));
    }
}
