//! Form collector tests: a complete submission reaches the prediction
//! endpoint exactly once with typed fields; an incomplete one never does.

use ev_advisor_service::client::PredictionClient;
use ev_advisor_service::form::{FormError, FormSubmission};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn full_submission() -> FormSubmission {
    FormSubmission {
        price_euro: Some("55000".to_string()),
        range_km: Some("450".to_string()),
        accel_sec: Some("5.1".to_string()),
        body_style: Some("Sedan".to_string()),
        top_speed_kmh: Some("233".to_string()),
        efficiency_whkm: Some("161".to_string()),
        fast_charge_kmh: Some("940".to_string()),
        seats: Some("5".to_string()),
        power_train: Some("AWD".to_string()),
        plug_type: Some("Type 2 CCS".to_string()),
        rapid_charge: Some("Yes".to_string()),
    }
}

#[tokio::test]
async fn populated_form_issues_exactly_one_typed_call() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/predict"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "predicted_segment": "D",
            "recommendations": [],
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = PredictionClient::new(format!("{}/predict", server.uri()));
    let spec = full_submission().assemble().unwrap();
    client.predict(&spec).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);

    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    // Numeric controls arrive as JSON numbers, the rest as strings
    assert!(body["PriceEuro"].is_number());
    assert!(body["Range_Km"].is_number());
    assert!(body["AccelSec"].is_number());
    assert!(body["TopSpeed_KmH"].is_number());
    assert!(body["Efficiency_WhKm"].is_number());
    assert!(body["FastCharge_KmH"].is_number());
    assert!(body["Seats"].is_number());
    assert!(body["BodyStyle"].is_string());
    assert!(body["PowerTrain"].is_string());
    assert!(body["PlugType"].is_string());
    assert!(body["RapidCharge"].is_string());
}

#[tokio::test]
async fn incomplete_form_never_reaches_the_service() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/predict"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "predicted_segment": "D",
            "recommendations": [],
        })))
        .expect(0)
        .mount(&server)
        .await;

    let submission = FormSubmission {
        range_km: None,
        ..full_submission()
    };

    // Validation fails before any client involvement
    let err = submission.assemble().unwrap_err();
    match err {
        FormError::MissingFields(missing) => assert_eq!(missing, vec!["Range_Km".to_string()]),
        other => panic!("expected missing fields, got {other:?}"),
    }

    assert!(server.received_requests().await.unwrap().is_empty());
}
