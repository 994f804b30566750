//! The form page and its submission handler

use super::AppState;
use crate::engine::run;
use crate::error::Result;
use crate::render::{PageState, render};
use crate::request::{AnalysisForm, collect_inputs};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Router};
use tracing::error;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/analyze", post(analyze))
        .with_state(state)
}

async fn index() -> Response {
    page(StatusCode::OK, render(&collect_inputs(None), PageState::Fresh))
}

/// Runs one analysis and answers with the page for that run only
async fn analyze(State(state): State<AppState>, Form(form): Form<AnalysisForm>) -> Response {
    let request = collect_inputs(Some(&form));

    match run(state.engine.as_ref(), &state.config, &request).await {
        Ok(result) => page(StatusCode::OK, render(&request, PageState::Results(&result))),
        Err(e) => {
            error!(error = %e, stock = %request.stock_selection, "Analysis failed");
            page(
                StatusCode::INTERNAL_SERVER_ERROR,
                render(&request, PageState::Failed),
            )
        }
    }
}

fn page(status: StatusCode, rendered: Result<String>) -> Response {
    match rendered {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to render page");
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to render page").into_response()
        }
    }
}
