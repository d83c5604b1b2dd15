use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse},
};
use minijinja::context;
use std::sync::Arc;

use crate::llm::prompt::{EXAMPLE_QUESTIONS, SCHEMA_TABLES};
use crate::web::state::AppState;
use crate::web::templates::render_template;

// Main UI entry point
pub async fn index_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let model = state.llm_manager.status().await;

    Html(render_template(
        &state.template_env,
        "index.html",
        context! {
            version => env!("CARGO_PKG_VERSION"),
            model => model,
            tables => SCHEMA_TABLES,
            examples => EXAMPLE_QUESTIONS,
            max_question_length => state.converter.max_question_length(),
        },
    ))
}

pub async fn not_found_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Html(render_template(
            &state.template_env,
            "error.html",
            context! { status => 404, message => "Page not found" },
        )),
    )
}
