//! End-to-end tests for the HTTP routes.
//!
//! Requests are driven through the axum router in-process with
//! `tower::ServiceExt::oneshot`; no socket is bound.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use cropwise::model::Predictor;
use cropwise::server::router;
use cropwise::{ArtifactStore, ClassLabel, LabelEncoder, Recommender, Result};

// ============================================================================
// Helpers
// ============================================================================

fn bundled_app() -> Router {
    let store = ArtifactStore::load(Path::new(env!("CARGO_MANIFEST_DIR")).join("Models")).unwrap();
    router(Recommender::new(Arc::new(store)))
}

async fn post(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

fn crop_body() -> Value {
    json!({
        "nitrogen": 90,
        "phosphorus": 42,
        "potassium": 43,
        "temperature": 20.8,
        "humidity": 82.0,
        "ph": 6.5,
        "rainfall": 202.9
    })
}

fn fertilizer_body() -> Value {
    json!({
        "temperature": 26,
        "humidity": 52,
        "moisture": 38,
        "soil_type": "Sandy",
        "crop_type": "Maize",
        "nitrogen": 37,
        "potassium": 0,
        "phosphorous": 0
    })
}

/// Counts calls so tests can prove the predictor was never reached.
struct CountingPredictor {
    calls: AtomicUsize,
    n_features: usize,
    classes: Vec<ClassLabel>,
}

impl CountingPredictor {
    fn new(n_features: usize, answer: ClassLabel) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            n_features,
            classes: vec![answer],
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Predictor for CountingPredictor {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn classes(&self) -> &[ClassLabel] {
        &self.classes
    }

    fn predict(&self, _features: &[f64]) -> Result<ClassLabel> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.classes[0].clone())
    }
}

fn counting_app() -> (Router, Arc<CountingPredictor>, Arc<CountingPredictor>) {
    let crop = CountingPredictor::new(7, ClassLabel::from("rice"));
    let fert = CountingPredictor::new(8, ClassLabel::Code(1));
    let store = ArtifactStore::builder()
        .crop_model(crop.clone())
        .fertilizer_model(fert.clone())
        .soil_encoder(LabelEncoder::new(["Sandy"]).unwrap())
        .crop_encoder(LabelEncoder::new(["Maize"]).unwrap())
        .fertilizer_encoder(LabelEncoder::new(["DAP", "Urea"]).unwrap())
        .build()
        .unwrap();
    (router(Recommender::new(Arc::new(store))), crop, fert)
}

// ============================================================================
// Success paths
// ============================================================================

#[tokio::test]
async fn crop_recommendation_returns_label() {
    let (status, body) = post(bundled_app(), "/crop_recommendation/", crop_body()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "recommended_crop": "rice" }));
}

#[tokio::test]
async fn fertilizer_recommendation_returns_label() {
    let (status, body) =
        post(bundled_app(), "/fertilizer_recommendation/", fertilizer_body()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "recommended_fertilizer": "Urea" }));
}

#[tokio::test]
async fn routes_accept_missing_trailing_slash() {
    let (status, _) = post(bundled_app(), "/crop_recommendation", crop_body()).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = post(bundled_app(), "/fertilizer_recommendation", fertilizer_body()).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn identical_payloads_give_identical_labels() {
    let app = bundled_app();
    let (_, first) = post(app.clone(), "/fertilizer_recommendation/", fertilizer_body()).await;
    for _ in 0..5 {
        let (_, again) = post(app.clone(), "/fertilizer_recommendation/", fertilizer_body()).await;
        assert_eq!(again, first);
    }
}

#[tokio::test]
async fn extra_fields_are_ignored() {
    let mut body = crop_body();
    body["farmer"] = json!("Ada");
    let (status, _) = post(bundled_app(), "/crop_recommendation/", body).await;
    assert_eq!(status, StatusCode::OK);
}

// ============================================================================
// Validation failures (422)
// ============================================================================

#[tokio::test]
async fn missing_field_is_422_and_skips_predictor() {
    let (app, crop, _) = counting_app();
    let mut body = crop_body();
    body.as_object_mut().unwrap().remove("rainfall");

    let (status, response) = post(app, "/crop_recommendation/", body).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        response,
        json!({ "detail": [{
            "loc": ["body", "rainfall"],
            "msg": "Field required",
            "type": "missing"
        }]})
    );
    assert_eq!(crop.calls(), 0);
}

#[tokio::test]
async fn wrong_type_is_422_and_skips_predictor() {
    let (app, _, fert) = counting_app();
    let mut body = fertilizer_body();
    body["moisture"] = json!("damp");
    body["crop_type"] = json!(3);

    let (status, response) = post(app, "/fertilizer_recommendation/", body).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let detail = response["detail"].as_array().unwrap();
    assert_eq!(detail.len(), 2);
    assert_eq!(detail[0]["loc"], json!(["body", "moisture"]));
    assert_eq!(detail[0]["type"], "float_type");
    assert_eq!(detail[1]["loc"], json!(["body", "crop_type"]));
    assert_eq!(detail[1]["type"], "string_type");
    assert_eq!(fert.calls(), 0);
}

#[tokio::test]
async fn malformed_json_is_422() {
    let (app, crop, _) = counting_app();
    let request = Request::builder()
        .method("POST")
        .uri("/crop_recommendation/")
        .header("content-type", "application/json")
        .body(Body::from("{\"nitrogen\": 90,"))
        .unwrap();

    let (status, response) = send(app, request).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response["detail"][0]["type"], "json_invalid");
    assert_eq!(crop.calls(), 0);
}

#[tokio::test]
async fn numeric_strings_are_accepted() {
    let mut body = crop_body();
    body["nitrogen"] = json!("90");
    body["ph"] = json!("6.5");

    let (status, response) = post(bundled_app(), "/crop_recommendation/", body).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(response, json!({ "recommended_crop": "rice" }));
}

#[tokio::test]
async fn non_numeric_string_is_422() {
    let (app, _, fert) = counting_app();
    let mut body = fertilizer_body();
    body["humidity"] = json!("humid");

    let (status, response) = post(app, "/fertilizer_recommendation/", body).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response["detail"][0]["loc"], json!(["body", "humidity"]));
    assert_eq!(response["detail"][0]["type"], "float_parsing");
    assert_eq!(fert.calls(), 0);
}

#[tokio::test]
async fn non_json_content_type_is_422() {
    let (app, crop, _) = counting_app();
    let request = Request::builder()
        .method("POST")
        .uri("/crop_recommendation/")
        .header("content-type", "text/plain")
        .body(Body::from(crop_body().to_string()))
        .unwrap();

    let (status, response) = send(app, request).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response["detail"][0]["loc"], json!(["body"]));
    assert_eq!(response["detail"][0]["type"], "model_attributes_type");
    assert_eq!(crop.calls(), 0);
}

#[tokio::test]
async fn json_suffix_content_type_and_missing_header_are_parsed() {
    for content_type in [Some("application/merge-patch+json"), None] {
        let mut request = Request::builder()
            .method("POST")
            .uri("/crop_recommendation/");
        if let Some(value) = content_type {
            request = request.header("content-type", value);
        }
        let request = request.body(Body::from(crop_body().to_string())).unwrap();

        let (status, _) = send(bundled_app(), request).await;

        assert_eq!(status, StatusCode::OK, "{content_type:?}");
    }
}

#[tokio::test]
async fn out_of_range_number_is_422() {
    let (app, crop, _) = counting_app();
    let body = crop_body().to_string().replace("202.9", "1e400");
    let request = Request::builder()
        .method("POST")
        .uri("/crop_recommendation/")
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap();

    let (status, response) = send(app, request).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response["detail"][0]["type"], "json_invalid");
    assert_eq!(crop.calls(), 0);
}

#[tokio::test]
async fn oversized_body_is_413() {
    let (app, crop, _) = counting_app();
    let request = Request::builder()
        .method("POST")
        .uri("/crop_recommendation/")
        .header("content-type", "application/json")
        .body(Body::from(vec![b' '; 3 * 1024 * 1024]))
        .unwrap();

    let (status, response) = send(app, request).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert!(response["detail"].is_string(), "{response}");
    assert_eq!(crop.calls(), 0);
}

// ============================================================================
// Translation failures (500)
// ============================================================================

#[tokio::test]
async fn unknown_soil_type_is_500() {
    let mut body = fertilizer_body();
    body["soil_type"] = json!("Unknown");

    let (status, response) = post(bundled_app(), "/fertilizer_recommendation/", body).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let detail = response["detail"].as_str().unwrap();
    assert!(detail.starts_with("Error: "), "{detail}");
    assert!(detail.contains("soil_type 'Unknown'"), "{detail}");
}

#[tokio::test]
async fn unknown_crop_type_is_500() {
    let (app, _, fert) = counting_app();
    let mut body = fertilizer_body();
    body["crop_type"] = json!("Rice");

    let (status, _) = post(app, "/fertilizer_recommendation/", body).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(fert.calls(), 0);
}

#[tokio::test]
async fn undecodable_prediction_is_500() {
    let crop = CountingPredictor::new(7, ClassLabel::from("rice"));
    let store = ArtifactStore::builder()
        .crop_model(crop)
        .fertilizer_model(CountingPredictor::new(8, ClassLabel::Code(42)))
        .soil_encoder(LabelEncoder::new(["Sandy"]).unwrap())
        .crop_encoder(LabelEncoder::new(["Maize"]).unwrap())
        .fertilizer_encoder(LabelEncoder::new(["Urea"]).unwrap())
        .build()
        .unwrap();
    let app = router(Recommender::new(Arc::new(store)));

    let (status, response) = post(app, "/fertilizer_recommendation/", fertilizer_body()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(
        response["detail"]
            .as_str()
            .unwrap()
            .contains("fertilizer code 42")
    );
}

// ============================================================================
// Other routes
// ============================================================================

#[tokio::test]
async fn health_reports_artifacts() {
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(bundled_app(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(
        body["version"]
            .as_str()
            .unwrap()
            .starts_with(cropwise::PKG_VERSION)
    );
    assert_eq!(body["artifacts"]["crop_model"]["n_features"], 7);
    assert_eq!(
        body["artifacts"]["soil_types"],
        json!(["Black", "Clayey", "Loamy", "Red", "Sandy"])
    );
}

#[tokio::test]
async fn get_on_prediction_route_is_405() {
    let request = Request::builder()
        .uri("/crop_recommendation/")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(bundled_app(), request).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn unknown_route_is_404() {
    let (status, _) = post(bundled_app(), "/yield_forecast/", json!({})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn serves_over_tcp() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let store = ArtifactStore::load(Path::new(env!("CARGO_MANIFEST_DIR")).join("Models")).unwrap();
    let server = tokio::spawn(cropwise::server::serve(
        listener,
        Recommender::new(Arc::new(store)),
    ));

    let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
    let body = crop_body().to_string();
    let request = format!(
        "POST /crop_recommendation/ HTTP/1.1\r\nHost: {addr}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    stream.write_all(request.as_bytes()).await.unwrap();
    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();

    assert!(response.starts_with("HTTP/1.1 200"), "{response}");
    assert!(response.contains(r#"{"recommended_crop":"rice"}"#), "{response}");
    server.abort();
}
