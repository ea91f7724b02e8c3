use axum::body::Bytes;
use axum::extract::{FromRequest, Multipart, Request, State};
use axum::http::header::{self, HeaderMap, HeaderName, HeaderValue};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use minijinja::context;
use serde::{Deserialize, Serialize};

use super::{AppState, LANDING_TEMPLATE};
use crate::core::SentimentError;
use crate::pipelines::sentiment_analysis_pipeline::{BatchTable, SENTENCE_COLUMN};
use crate::pipelines::SentimentLabel;

pub const TEST_MESSAGE: &str = "Test request received successfully. Service is running.";
pub const PREDICTIONS_FILENAME: &str = "Predictions.csv";
pub const FILE_FIELD: &str = "file";

pub const X_GRAPH_EXISTS: HeaderName = HeaderName::from_static("x-graph-exists");
pub const X_GRAPH_DATA: HeaderName = HeaderName::from_static("x-graph-data");

#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PredictResponse {
    pub prediction: SentimentLabel,
}

/// Error body `{"error": ..}` with a status code.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl From<SentimentError> for ApiError {
    fn from(err: SentimentError) -> Self {
        let status = if err.is_client_error() {
            StatusCode::UNPROCESSABLE_ENTITY
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        Self::new(status, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = %self.status, error = %self.message, "request failed");
        } else {
            tracing::warn!(status = %self.status, error = %self.message, "request rejected");
        }
        (
            self.status,
            [(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*")],
            Json(serde_json::json!({ "error": self.message })),
        )
            .into_response()
    }
}

pub async fn test() -> &'static str {
    TEST_MESSAGE
}

pub async fn home(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    let page = state
        .templates()
        .get_template(LANDING_TEMPLATE)
        .and_then(|t| {
            t.render(context! {
                title => "Review Sentiment",
                sentence_column => SENTENCE_COLUMN,
                max_upload_mb => state.max_upload_bytes / (1024 * 1024),
            })
        })
        .map_err(|e| ApiError::internal(format!("Failed to render landing page: {e}")))?;
    Ok(Html(page))
}

pub async fn preflight() -> impl IntoResponse {
    (
        StatusCode::NO_CONTENT,
        [
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
            (header::ACCESS_CONTROL_ALLOW_METHODS, "POST, OPTIONS"),
            (header::ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type"),
        ],
    )
}

/// Multipart bodies are batch uploads; everything else is read as JSON.
pub async fn predict(State(state): State<AppState>, request: Request) -> Result<Response, ApiError> {
    let is_multipart = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("multipart/form-data"));

    if is_multipart {
        let multipart = Multipart::from_request(request, &state)
            .await
            .map_err(|e| ApiError::bad_request(e.body_text()))?;
        predict_file(state, multipart).await
    } else {
        let Json(body) = Json::<PredictRequest>::from_request(request, &state)
            .await
            .map_err(|e| ApiError::bad_request(e.body_text()))?;
        predict_text(state, body).await
    }
}

async fn predict_text(state: AppState, body: PredictRequest) -> Result<Response, ApiError> {
    let pipeline = state.pipeline.clone();
    let prediction = tokio::task::spawn_blocking(move || pipeline.predict(&body.text))
        .await
        .map_err(|e| ApiError::internal(format!("Prediction task failed: {e}")))??;

    tracing::debug!(%prediction, "single prediction");
    Ok((
        [(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*")],
        Json(PredictResponse { prediction }),
    )
        .into_response())
}

async fn predict_file(state: AppState, mut multipart: Multipart) -> Result<Response, ApiError> {
    let upload = read_file_field(&mut multipart).await?;
    tracing::info!(bytes = upload.len(), "batch upload received");

    let pipeline = state.pipeline.clone();
    let (csv, chart) = tokio::task::spawn_blocking(move || -> Result<_, SentimentError> {
        let table = BatchTable::from_csv_bytes(&upload)?;
        let prediction = pipeline.predict_batch(table)?;
        Ok((prediction.table.to_csv_bytes()?, prediction.summary.chart_base64()))
    })
    .await
    .map_err(|e| ApiError::internal(format!("Prediction task failed: {e}")))??;

    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/csv"));
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_str(&format!("attachment; filename=\"{PREDICTIONS_FILENAME}\""))
            .map_err(|e| ApiError::internal(format!("Invalid disposition header: {e}")))?,
    );
    headers.insert(X_GRAPH_EXISTS, HeaderValue::from_static("true"));
    headers.insert(
        X_GRAPH_DATA,
        HeaderValue::from_str(&chart)
            .map_err(|e| ApiError::internal(format!("Invalid chart header: {e}")))?,
    );
    headers.insert(
        header::ACCESS_CONTROL_EXPOSE_HEADERS,
        HeaderValue::from_static("X-Graph-Data"),
    );
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));

    Ok((headers, csv).into_response())
}

async fn read_file_field(multipart: &mut Multipart) -> Result<Bytes, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::new(e.status(), e.body_text()))?
    {
        if field.name() == Some(FILE_FIELD) {
            return field
                .bytes()
                .await
                .map_err(|e| ApiError::new(e.status(), e.body_text()));
        }
    }
    Err(ApiError::bad_request(format!(
        "multipart body has no {FILE_FIELD:?} field"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_map_to_422() {
        let err: ApiError = SentimentError::EmptyBatch.into();
        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
        let err: ApiError = SentimentError::Schema("missing Sentence".into()).into();
        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn deployment_errors_map_to_500() {
        let err: ApiError = SentimentError::Encoding("3 != 4".into())
            .into_prediction()
            .into();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
