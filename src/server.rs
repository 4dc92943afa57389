use std::sync::Arc;

use axum::{
    Form, Json, Router,
    extract::{Path, State},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::{Deserialize, Serialize};
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::{info, warn};

use crate::{
    config::{AppConfig, OutputMode},
    error::ServiceError,
    model::{ModelMetadata, ModelRegistry},
    pages,
    render::STATIC_URL_PREFIX,
    sampling::LatentSampler,
    validation::{self, ValidationError},
};

/// Characters left unescaped when a message is embedded in a path segment.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub registry: Arc<ModelRegistry>,
    pub sampler: Arc<LatentSampler>,
}

#[derive(Deserialize)]
struct DigitForm {
    #[serde(rename = "targetDigit")]
    target_digit: String,
}

#[derive(Serialize)]
struct MetadataResponse {
    generator: ModelMetadata,
    latent_dim: usize,
    grid_size: usize,
    output_mode: OutputMode,
}

pub fn build_router(
    config: Arc<AppConfig>,
    registry: Arc<ModelRegistry>,
    sampler: Arc<LatentSampler>,
) -> Router {
    let static_files = ServeDir::new(&config.static_dir);
    let state = AppState {
        registry,
        sampler,
        config,
    };

    Router::new()
        .route("/", get(form).post(submit_digit))
        .route("/generate/:digit", get(generate))
        .route("/error/:message", get(error_page))
        .route("/health", get(health))
        .route("/metadata", get(metadata))
        .nest_service(STATIC_URL_PREFIX, static_files)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Location of the error page carrying `message`.
pub fn error_location(message: &str) -> String {
    format!("/error/{}", utf8_percent_encode(message, PATH_SEGMENT))
}

async fn health() -> &'static str {
    "ok"
}

async fn form() -> Html<String> {
    Html(pages::form_page())
}

async fn submit_digit(Form(form): Form<DigitForm>) -> Redirect {
    match validation::validate(&form.target_digit) {
        Ok(digit) => Redirect::to(&format!("/generate/{digit}")),
        Err(err) => {
            info!(input = %form.target_digit, "redirecting to error");
            Redirect::to(&error_location(&err.to_string()))
        }
    }
}

async fn generate(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> Result<Response, ServiceError> {
    let digit = match validation::validate(&raw) {
        Ok(digit) => digit,
        Err(err @ ValidationError::OutOfRange(_)) => {
            return Ok(Redirect::to(&error_location(&err.to_string())).into_response());
        }
        Err(ValidationError::NotAnInteger(_)) => {
            return Err(ServiceError::BadRequest(format!(
                "digit segment '{raw}' is not an integer"
            )));
        }
    };

    let response = state
        .registry
        .generate(digit, &state.config, state.sampler.clone())
        .await?;
    let cache_token = state.sampler.cache_token();

    Ok(Html(pages::result_page(digit, &response.image_url, cache_token)).into_response())
}

async fn error_page(Path(message): Path<String>) -> Html<String> {
    warn!(%message, "error page requested");
    Html(pages::error_page(&message))
}

async fn metadata(State(state): State<AppState>) -> Json<MetadataResponse> {
    Json(MetadataResponse {
        generator: state.registry.metadata(),
        latent_dim: state.config.latent_dim,
        grid_size: state.config.grid_size,
        output_mode: state.config.output_mode,
    })
}
