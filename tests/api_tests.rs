//! Integration tests for the HTTP API over a mock-backed responder.

use std::sync::Arc;
use std::time::Instant;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use tokio::sync::Mutex;
use tower::ServiceExt;

use med_assist::config::{Config, GenerationConfig};
use med_assist::inference::backend::{BackendError, ChatBackend, Completion};
use med_assist::inference::responder::Responder;
use med_assist::server::api::{build_router, AppState};

struct FixedBackend {
    decoded: String,
}

impl ChatBackend for FixedBackend {
    fn complete(
        &mut self,
        prompt: &str,
        _params: &GenerationConfig,
    ) -> Result<Completion, BackendError> {
        Ok(Completion {
            text: self.decoded.clone(),
            prompt_tokens: prompt.len() / 4,
            completion_tokens: self.decoded.len() / 4,
        })
    }
}

struct FailingBackend;

impl ChatBackend for FailingBackend {
    fn complete(
        &mut self,
        _prompt: &str,
        _params: &GenerationConfig,
    ) -> Result<Completion, BackendError> {
        Err(BackendError::Decode("device fault".to_string()))
    }
}

fn test_state(backend: Box<dyn ChatBackend>) -> Arc<AppState> {
    let config = Arc::new(Config::default());
    let responder = Responder::new(backend, config.generation.clone());
    Arc::new(AppState {
        responder: Mutex::new(responder),
        config,
        start_time: Instant::now(),
    })
}

fn predict_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/predict")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

// block_in_place requires the multi-thread runtime flavor.

#[tokio::test(flavor = "multi_thread")]
async fn test_predict_round_trip() {
    let backend = Box::new(FixedBackend {
        decoded: "assistant Flu symptoms include fever and cough.".to_string(),
    });
    let app = build_router(test_state(backend));

    let response = app
        .oneshot(predict_request(
            r#"{"question": "What are symptoms of the flu?"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["answer"], "Flu symptoms include fever and cough.");
    assert_eq!(json["model"], "ruslanmv/Medical-Llama3-8B-GGUF");
    assert!(json["duration_ms"].is_u64());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_predict_empty_question() {
    let backend = Box::new(FixedBackend {
        decoded: "assistant Please provide a question.".to_string(),
    });
    let app = build_router(test_state(backend));

    let response = app
        .oneshot(predict_request(r#"{"question": ""}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["answer"], "Please provide a question.");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_predict_backend_failure_is_500() {
    let app = build_router(test_state(Box::new(FailingBackend)));

    let response = app
        .oneshot(predict_request(r#"{"question": "Is aspirin safe?"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_predict_malformed_body_is_client_error() {
    let backend = Box::new(FixedBackend {
        decoded: "assistant ok".to_string(),
    });
    let app = build_router(test_state(backend));

    let response = app
        .oneshot(predict_request(r#"{"not_a_question": 5}"#))
        .await
        .unwrap();
    assert!(response.status().is_client_error());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_health() {
    let backend = Box::new(FixedBackend {
        decoded: String::new(),
    });
    let app = build_router(test_state(backend));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["model"], "ruslanmv/Medical-Llama3-8B-GGUF");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_model_info() {
    let backend = Box::new(FixedBackend {
        decoded: String::new(),
    });
    let app = build_router(test_state(backend));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/model")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["weights_file"], "Medical-Llama3-8B.Q4_K_M.gguf");
    assert_eq!(json["max_new_tokens"], 1000);
}
