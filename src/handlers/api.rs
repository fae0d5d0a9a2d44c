use axum::{
    extract::{Json as ExtractJson, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json},
};
use std::sync::Arc;
use tracing::info;

use crate::error::{Result, ServiceError};
use crate::models::common::MessageResponse;
use crate::models::form::{
    CreateFormRequest, Form, FormWithFields, UpdateFormRequest, UpdateFormResponse,
};
use crate::models::response::{FormResponse, SubmitResponseReply, SubmitResponseRequest};
use crate::models::user::{AuthResponse, LoginRequest, RegisterRequest};
use crate::services::export;
use crate::services::forms::FormService;
use crate::services::responses::ResponseService;
use crate::services::users::UserService;

// AppState struct containing shared resources
pub struct AppState {
    pub users: UserService,
    pub forms: FormService,
    pub responses: ResponseService,
}

// Create form endpoint
pub async fn create_form(
    State(state): State<Arc<AppState>>,
    ExtractJson(request): ExtractJson<CreateFormRequest>,
) -> Result<(StatusCode, Json<Form>)> {
    info!(
        "Received request to create form: {} ({} fields)",
        request.title,
        request.form_fields.len()
    );

    let form = state
        .forms
        .create_form(
            &request.title,
            request.description.as_deref(),
            request.user_id,
            &request.form_fields,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(form)))
}

// Update form endpoint: replaces the entire field set
pub async fn update_form(
    State(state): State<Arc<AppState>>,
    Path(form_id): Path<i64>,
    ExtractJson(request): ExtractJson<UpdateFormRequest>,
) -> Result<Json<UpdateFormResponse>> {
    info!("Received request to update form {}", form_id);

    let (form, form_fields) = state
        .forms
        .update_form(
            form_id,
            &request.title,
            request.description.as_deref(),
            &request.form_fields,
        )
        .await?;

    Ok(Json(UpdateFormResponse { form, form_fields }))
}

// List a user's forms with their fields
pub async fn get_forms_by_user(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> Result<Json<Vec<FormWithFields>>> {
    info!("Received request to list forms for user {}", username);

    let forms = state.forms.get_forms_by_user(&username).await?;
    Ok(Json(forms))
}

// Delete form endpoint (owner only)
pub async fn delete_form(
    State(state): State<Arc<AppState>>,
    Path((username, form_id)): Path<(String, i64)>,
) -> Result<Json<MessageResponse>> {
    info!(
        "Received request from {} to delete form {}",
        username, form_id
    );

    state.forms.delete_form(&username, form_id).await?;

    Ok(Json(MessageResponse {
        message: "Form deleted successfully".to_string(),
    }))
}

// Submit a response against a form
pub async fn submit_response(
    State(state): State<Arc<AppState>>,
    ExtractJson(request): ExtractJson<SubmitResponseRequest>,
) -> Result<(StatusCode, Json<SubmitResponseReply>)> {
    info!(
        "Received response submission for form {} from {}",
        request.form_id, request.username
    );

    let form_response = state
        .responses
        .submit_response(request.form_id, &request.username, &request.responses)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(SubmitResponseReply {
            message: "Form response submitted successfully".to_string(),
            form_response,
        }),
    ))
}

// List all responses for a form
pub async fn get_responses(
    State(state): State<Arc<AppState>>,
    Path(form_id): Path<i64>,
) -> Result<Json<Vec<FormResponse>>> {
    info!("Received request to list responses for form {}", form_id);

    let responses = state.responses.get_responses(form_id).await?;

    if responses.is_empty() {
        return Err(ServiceError::NotFound(
            "No responses found for this form.".to_string(),
        ));
    }

    Ok(Json(responses))
}

// Export a form's responses as a downloadable CSV file
pub async fn export_responses_csv(
    State(state): State<Arc<AppState>>,
    Path(form_id): Path<i64>,
) -> Result<impl IntoResponse> {
    info!("Received CSV export request for form {}", form_id);

    let csv_data = export::export_to_csv(&state.responses, form_id).await?;

    let headers = [
        (header::CONTENT_TYPE, "text/csv".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=form_responses_{}.csv", form_id),
        ),
    ];

    Ok((headers, csv_data))
}

// Register endpoint: creates the user and issues a session token
pub async fn register_user(
    State(state): State<Arc<AppState>>,
    ExtractJson(request): ExtractJson<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>)> {
    info!("Received registration request for {}", request.username);

    let (user, token) = state
        .users
        .register(&request.username, &request.email, &request.password)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            status: "Success".to_string(),
            message: "User registered successfully".to_string(),
            username: user.username,
            user_id: user.id,
            token,
        }),
    ))
}

// Login endpoint: identifier may be a username or an email
pub async fn login_user(
    State(state): State<Arc<AppState>>,
    ExtractJson(request): ExtractJson<LoginRequest>,
) -> Result<Json<AuthResponse>> {
    info!("Received login request for {}", request.identifier);

    let (user, token) = state
        .users
        .login(&request.identifier, &request.password)
        .await?;

    Ok(Json(AuthResponse {
        status: "Success".to_string(),
        message: "Login successful".to_string(),
        username: user.username,
        user_id: user.id,
        token,
    }))
}
