use crate::{
    error::AdapterError,
    form::{banner_for, render_page, Outcome, Submission},
    model::{GenerationResponse, InferenceAdapter, ModelRuntime},
    profile::FormProfile,
    validate::{Rejected, Validator},
};
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde::Serialize;
use serde_json::json;
use std::{sync::Arc, time::Instant};
use tracing::warn;

pub struct AppState<R> {
    adapter: Arc<InferenceAdapter<R>>,
    validator: Arc<Validator>,
    profile: Arc<FormProfile>,
}

impl<R> Clone for AppState<R> {
    fn clone(&self) -> Self {
        Self {
            adapter: self.adapter.clone(),
            validator: self.validator.clone(),
            profile: self.profile.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct GenerateReply {
    #[serde(flatten)]
    pub response: GenerationResponse,
    pub elapsed_secs: f64,
}

enum Failure {
    Invalid(Rejected),
    Adapter(AdapterError),
}

pub fn routes<R: ModelRuntime>(
    adapter: InferenceAdapter<R>,
    validator: Arc<Validator>,
    profile: Arc<FormProfile>,
) -> Router {
    let state = AppState {
        adapter: Arc::new(adapter),
        validator,
        profile,
    };
    Router::new()
        .route("/", get(show_form::<R>).post(submit_form::<R>))
        .route("/v1/generate", post(generate_json::<R>))
        .route("/healthz", get(|| async { "ok" }))
        .with_state(state)
}

async fn show_form<R: ModelRuntime>(State(st): State<AppState<R>>) -> Html<String> {
    let sub = Submission::from_profile(&st.profile);
    Html(render_page(&st.profile, &sub, Outcome::Blank))
}

async fn submit_form<R: ModelRuntime>(
    State(st): State<AppState<R>>,
    Form(sub): Form<Submission>,
) -> (StatusCode, Html<String>) {
    match run(&st, &sub).await {
        Ok((response, elapsed_secs)) => {
            let page = render_page(
                &st.profile,
                &sub,
                Outcome::Answered {
                    response: &response,
                    elapsed_secs,
                },
            );
            (StatusCode::OK, Html(page))
        }
        Err(Failure::Invalid(Rejected(msg))) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Html(render_page(&st.profile, &sub, Outcome::Failed(msg))),
        ),
        Err(Failure::Adapter(e)) => (
            StatusCode::OK,
            Html(render_page(&st.profile, &sub, Outcome::Failed(banner_for(&e)))),
        ),
    }
}

async fn generate_json<R: ModelRuntime>(
    State(st): State<AppState<R>>,
    Json(sub): Json<Submission>,
) -> Response {
    match run(&st, &sub).await {
        Ok((response, elapsed_secs)) => Json(GenerateReply {
            response,
            elapsed_secs,
        })
        .into_response(),
        Err(Failure::Invalid(Rejected(msg))) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({"error": "invalid_submission", "message": msg})),
        )
            .into_response(),
        Err(Failure::Adapter(e)) => {
            let status = match e {
                AdapterError::Envelope { .. } => StatusCode::INTERNAL_SERVER_ERROR,
                _ => StatusCode::BAD_GATEWAY,
            };
            (status, Json(json!({"error": e.kind(), "message": e.message()}))).into_response()
        }
    }
}

/// Validate, then exactly one adapter call, timed for display.
async fn run<R: ModelRuntime>(
    st: &AppState<R>,
    sub: &Submission,
) -> Result<(GenerationResponse, f64), Failure> {
    let value = serde_json::to_value(sub)
        .map_err(|e| Failure::Invalid(Rejected(format!("unreadable submission: {e}"))))?;
    if let Err(rejected) = st.validator.check(&value) {
        warn!(reason = %rejected, "submission rejected");
        metrics::counter!("generate_requests_total", "outcome" => "invalid").increment(1);
        return Err(Failure::Invalid(rejected));
    }

    let request = sub.to_request();
    let start = Instant::now();
    let result = st.adapter.generate(&request).await;
    let elapsed_secs = start.elapsed().as_secs_f64();

    metrics::histogram!("generate_latency_seconds").record(elapsed_secs);
    let outcome = match &result {
        Ok(_) => "ok",
        Err(e) => e.kind(),
    };
    metrics::counter!("generate_requests_total", "outcome" => outcome).increment(1);

    result
        .map(|response| (response, elapsed_secs))
        .map_err(Failure::Adapter)
}
