mod common;

use axum::body::{to_bytes, Body};
use axum::extract::{Request, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use base64::Engine;

use sentiment_service::server::routes::{self, PredictResponse, TEST_MESSAGE};
use sentiment_service::server::AppState;
use sentiment_service::{SentimentAnalysisPipelineBuilder, SentimentLabel};

const BOUNDARY: &str = "sentiment-test-boundary";

async fn state() -> anyhow::Result<(tempfile::TempDir, AppState)> {
    let dir = common::logistic_artifacts()?;
    let pipeline = SentimentAnalysisPipelineBuilder::from_dir(dir.path())
        .build()
        .await?;
    Ok((dir, AppState::new(pipeline, 1024 * 1024)?))
}

fn json_request(body: &str) -> anyhow::Result<Request> {
    Ok(Request::builder()
        .method("POST")
        .uri("/predict")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))?)
}

fn multipart_request(field: &str, csv: &str) -> anyhow::Result<Request> {
    let body = format!(
        "--{BOUNDARY}\r\n\
         Content-Disposition: form-data; name=\"{field}\"; filename=\"reviews.csv\"\r\n\
         Content-Type: text/csv\r\n\r\n\
         {csv}\r\n\
         --{BOUNDARY}--\r\n"
    );
    Ok(Request::builder()
        .method("POST")
        .uri("/predict")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))?)
}

async fn into_parts(response: Response) -> anyhow::Result<(StatusCode, axum::http::HeaderMap, Vec<u8>)> {
    let status = response.status();
    let headers = response.headers().clone();
    let body = to_bytes(response.into_body(), usize::MAX).await?;
    Ok((status, headers, body.to_vec()))
}

async fn call_predict(state: AppState, request: Request) -> anyhow::Result<Response> {
    Ok(match routes::predict(State(state), request).await {
        Ok(response) => response,
        Err(err) => err.into_response(),
    })
}

#[tokio::test]
async fn test_endpoint_reports_running() {
    assert_eq!(routes::test().await, TEST_MESSAGE);
}

#[tokio::test]
async fn landing_page_renders() -> anyhow::Result<()> {
    let (_dir, state) = state().await?;
    let page = routes::home(State(state)).await.map_err(|e| anyhow::anyhow!(e.message))?;
    assert!(page.0.contains("<html"));
    assert!(page.0.contains("Sentence"));
    Ok(())
}

#[tokio::test]
async fn json_text_prediction() -> anyhow::Result<()> {
    let (_dir, state) = state().await?;
    let response = call_predict(state, json_request(r#"{"text": "I absolutely loved this product!!!"}"#)?).await?;
    let (status, headers, body) = into_parts(response).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    let body: PredictResponse = serde_json::from_slice(&body)?;
    assert_eq!(body.prediction, SentimentLabel::Positive);
    Ok(())
}

#[tokio::test]
async fn malformed_json_is_bad_request() -> anyhow::Result<()> {
    let (_dir, state) = state().await?;
    let response = call_predict(state, json_request(r#"{"review": "hi"}"#)?).await?;
    let (status, _, body) = into_parts(response).await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let body: serde_json::Value = serde_json::from_slice(&body)?;
    assert!(body["error"].is_string());
    Ok(())
}

#[tokio::test]
async fn csv_upload_returns_labelled_csv_and_chart() -> anyhow::Result<()> {
    let (_dir, state) = state().await?;
    let csv = "Sentence\ngreat film\nterrible film\ngreat film\ngreat film";
    let response = call_predict(state, multipart_request("file", csv)?).await?;
    let (status, headers, body) = into_parts(response).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::CONTENT_TYPE], "text/csv");
    assert_eq!(
        headers[header::CONTENT_DISPOSITION],
        "attachment; filename=\"Predictions.csv\""
    );
    assert_eq!(headers["x-graph-exists"], "true");
    assert_eq!(headers[header::ACCESS_CONTROL_EXPOSE_HEADERS], "X-Graph-Data");

    let png = base64::engine::general_purpose::STANDARD.decode(headers["x-graph-data"].as_bytes())?;
    assert!(png.starts_with(b"\x89PNG"));

    let out = String::from_utf8(body)?;
    assert_eq!(
        out,
        "Sentence,Predicted sentiment\n\
         great film,Positive\n\
         terrible film,Negative\n\
         great film,Positive\n\
         great film,Positive\n"
    );
    Ok(())
}

#[tokio::test]
async fn csv_without_sentence_column_is_unprocessable() -> anyhow::Result<()> {
    let (_dir, state) = state().await?;
    let response = call_predict(state, multipart_request("file", "Review\ngreat")?).await?;
    let (status, _, body) = into_parts(response).await?;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let body: serde_json::Value = serde_json::from_slice(&body)?;
    assert!(body["error"].as_str().unwrap_or_default().contains("Sentence"));
    Ok(())
}

#[tokio::test]
async fn empty_csv_is_unprocessable() -> anyhow::Result<()> {
    let (_dir, state) = state().await?;
    let response = call_predict(state, multipart_request("file", "Sentence")?).await?;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    Ok(())
}

#[tokio::test]
async fn multipart_without_file_field_is_bad_request() -> anyhow::Result<()> {
    let (_dir, state) = state().await?;
    let response = call_predict(state, multipart_request("upload", "Sentence\nhi")?).await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn preflight_allows_any_origin() -> anyhow::Result<()> {
    let response = routes::preflight().await.into_response();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    assert!(response.headers()[header::ACCESS_CONTROL_ALLOW_METHODS]
        .to_str()?
        .contains("POST"));
    Ok(())
}
