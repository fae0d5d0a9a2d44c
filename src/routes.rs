use axum::{
    http::StatusCode,
    routing::{delete, get, patch, post},
    Router,
};
use std::sync::Arc;

use crate::handlers::api::{
    create_form, delete_form, export_responses_csv, get_forms_by_user, get_responses, login_user,
    register_user, submit_response, update_form, AppState,
};
use crate::handlers::health::health_check;

pub fn create_router(app_state: Arc<AppState>) -> Router {
    let form_routes = Router::new()
        .route("/create", post(create_form))
        .route("/update/:id", patch(update_form))
        .route("/:username", get(get_forms_by_user))
        .route("/:username/:form_id", delete(delete_form));

    let response_routes = Router::new()
        .route("/create", post(submit_response))
        .route("/:form_id", get(get_responses))
        .route("/:form_id/export-csv", get(export_responses_csv));

    let user_routes = Router::new()
        .route("/register", post(register_user))
        .route("/login", post(login_user));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/form", form_routes)
        .nest("/api/response", response_routes)
        .nest("/api/user", user_routes)
        .fallback(unknown_route)
        .with_state(app_state)
}

// Unknown routes answer with plain text, not JSON
async fn unknown_route() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "There is no such route")
}
