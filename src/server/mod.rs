//! HTTP front end for the sentiment pipeline.
//!
//! - `GET /test` liveness text
//! - `GET /` landing page
//! - `POST /predict` JSON `{"text": ..}` for one review, or a multipart
//!   `file` field holding a CSV for a batch
//! - `OPTIONS /predict` CORS preflight

pub mod routes;

use std::sync::Arc;

use anyhow::Context;
use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use axum::Router;
use minijinja::Environment;

use crate::core::ServiceConfig;
use crate::pipelines::{SentimentAnalysisPipeline, SentimentAnalysisPipelineBuilder};

pub const LANDING_TEMPLATE: &str = "landing.html";

/// Shared handler state. Cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: SentimentAnalysisPipeline,
    pub max_upload_bytes: usize,
    templates: Arc<Environment<'static>>,
}

impl AppState {
    pub fn new(pipeline: SentimentAnalysisPipeline, max_upload_bytes: usize) -> anyhow::Result<Self> {
        let mut env = Environment::new();
        env.add_template(LANDING_TEMPLATE, include_str!("templates/landing.html"))?;
        Ok(Self {
            pipeline,
            max_upload_bytes,
            templates: Arc::new(env),
        })
    }

    pub fn templates(&self) -> &Environment<'static> {
        &self.templates
    }
}

pub fn router(state: AppState) -> Router {
    let limit = state.max_upload_bytes;
    Router::new()
        .route("/", get(routes::home).post(routes::home))
        .route("/test", get(routes::test))
        .route(
            "/predict",
            axum::routing::post(routes::predict).options(routes::preflight),
        )
        .layer(DefaultBodyLimit::max(limit))
        .with_state(state)
}

/// Loads the artifacts named by `config` and serves until the process stops.
pub async fn serve(config: ServiceConfig) -> anyhow::Result<()> {
    let mut builder = SentimentAnalysisPipelineBuilder::from_source(config.artifacts.clone());
    if let Some(path) = &config.stopwords {
        builder = builder.stopwords_file(path);
    }
    let pipeline = builder.build().await?;

    let app = router(AppState::new(pipeline, config.max_upload_bytes)?);
    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind))?;

    tracing::info!(
        addr = %config.bind,
        artifacts = ?config.artifacts,
        max_upload_bytes = config.max_upload_bytes,
        "sentiment service listening"
    );
    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
