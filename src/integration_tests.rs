#[cfg(test)]
mod integration_tests {
    use axum::http::StatusCode;
    use axum_test::{TestServer, TestServerConfig};
    use serde_json::{json, Value};
    use std::sync::Arc;

    use crate::auth::TokenAuth;
    use crate::handlers::api::AppState;
    use crate::routes::create_router;
    use crate::services::database::create_test_pool;
    use crate::services::forms::FormService;
    use crate::services::responses::ResponseService;
    use crate::services::users::UserService;

    // Helper function to set up a test server over an in-memory database
    async fn setup_test_server() -> TestServer {
        let pool = create_test_pool().await;
        let auth = TokenAuth::new("integration-test-secret");

        let app_state = Arc::new(AppState {
            users: UserService::new(pool.clone(), auth),
            forms: FormService::new(pool.clone()),
            responses: ResponseService::new(pool),
        });

        let config = TestServerConfig::builder().mock_transport().build();
        TestServer::new_with_config(create_router(app_state), config).unwrap()
    }

    // Helper to register a user and hand back (userId, token)
    async fn register(server: &TestServer, username: &str) -> (i64, String) {
        let response = server
            .post("/api/user/register")
            .json(&json!({
                "username": username,
                "email": format!("{}@example.com", username),
                "password": "secret123",
            }))
            .await;
        assert_eq!(response.status_code(), StatusCode::CREATED);

        let body: Value = response.json();
        assert_eq!(body["status"], "Success");
        (
            body["userId"].as_i64().unwrap(),
            body["token"].as_str().unwrap().to_string(),
        )
    }

    // Helper to create a form with two fields, returning its id
    async fn create_form(server: &TestServer, user_id: i64) -> i64 {
        let response = server
            .post("/api/form/create")
            .json(&json!({
                "title": "Customer Survey",
                "description": "How did we do?",
                "userId": user_id,
                "formFields": [
                    {"fieldType": "text", "label": "Name", "isRequired": true},
                    {"fieldType": "dropdown", "label": "Rating",
                     "options": ["good", "bad"], "isRequired": false},
                ],
            }))
            .await;
        assert_eq!(response.status_code(), StatusCode::CREATED);

        let body: Value = response.json();
        body["id"].as_i64().unwrap()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let server = setup_test_server().await;

        let response = server.get("/health").await;
        assert_eq!(response.status_code(), StatusCode::OK);
        assert_eq!(response.text(), "OK");
    }

    #[tokio::test]
    async fn test_unknown_route_returns_plain_404() {
        let server = setup_test_server().await;

        let response = server.get("/api/nope").await;
        assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(response.text(), "There is no such route");
    }

    #[tokio::test]
    async fn test_registration_and_login_flow() {
        let server = setup_test_server().await;
        register(&server, "alice").await;

        // Same email again is a conflict, not a success-shaped failure
        let response = server
            .post("/api/user/register")
            .json(&json!({
                "username": "alice2",
                "email": "alice@example.com",
                "password": "secret123",
            }))
            .await;
        assert_eq!(response.status_code(), StatusCode::CONFLICT);
        let body: Value = response.json();
        assert_eq!(body["message"], "Email already exists");

        // Login by email
        let response = server
            .post("/api/user/login")
            .json(&json!({"identifier": "alice@example.com", "password": "secret123"}))
            .await;
        assert_eq!(response.status_code(), StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["username"], "alice");
        assert!(body["token"].as_str().is_some());

        // Wrong password issues no token
        let response = server
            .post("/api/user/login")
            .json(&json!({"identifier": "alice", "password": "nope"}))
            .await;
        assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
        let body: Value = response.json();
        assert!(body.get("token").is_none());
    }

    #[tokio::test]
    async fn test_form_lifecycle() {
        let server = setup_test_server().await;
        let (alice_id, _) = register(&server, "alice").await;
        register(&server, "mallory").await;

        let form_id = create_form(&server, alice_id).await;

        // The owner sees the form with its fields in order
        let response = server.get("/api/form/alice").await;
        assert_eq!(response.status_code(), StatusCode::OK);
        let forms: Value = response.json();
        assert_eq!(forms.as_array().unwrap().len(), 1);
        let fields = forms[0]["formFields"].as_array().unwrap();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0]["label"], "Name");
        assert_eq!(fields[0]["fieldType"], "text");
        assert_eq!(fields[1]["options"], json!(["good", "bad"]));
        let old_field_id = fields[0]["id"].as_i64().unwrap();

        // Update replaces the whole field set; ids are not preserved
        let response = server
            .patch(&format!("/api/form/update/{}", form_id))
            .json(&json!({
                "title": "Renamed Survey",
                "description": "v2",
                "formFields": [
                    {"fieldType": "email", "label": "Contact", "isRequired": true},
                ],
            }))
            .await;
        assert_eq!(response.status_code(), StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["form"]["title"], "Renamed Survey");
        let new_fields = body["formFields"].as_array().unwrap();
        assert_eq!(new_fields.len(), 1);
        assert_ne!(new_fields[0]["id"].as_i64().unwrap(), old_field_id);

        // Unknown form id on update
        let response = server
            .patch("/api/form/update/999")
            .json(&json!({"title": "x", "formFields": []}))
            .await;
        assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

        // A non-owner cannot delete, and cannot tell whether the form exists
        let response = server
            .delete(&format!("/api/form/mallory/{}", form_id))
            .await;
        assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

        let response = server.get("/api/form/alice").await;
        let forms: Value = response.json();
        assert_eq!(forms.as_array().unwrap().len(), 1);

        // The owner can
        let response = server
            .delete(&format!("/api/form/alice/{}", form_id))
            .await;
        assert_eq!(response.status_code(), StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["message"], "Form deleted successfully");

        // Zero forms is an empty list, not an error
        let response = server.get("/api/form/alice").await;
        assert_eq!(response.status_code(), StatusCode::OK);
        let forms: Value = response.json();
        assert_eq!(forms.as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_response_collection_and_csv_export() {
        let server = setup_test_server().await;
        let (alice_id, _) = register(&server, "alice").await;
        let form_id = create_form(&server, alice_id).await;

        // Submitting against a missing form writes nothing
        let response = server
            .post("/api/response/create")
            .json(&json!({"formId": 999, "username": "bob", "responses": {"1": "x"}}))
            .await;
        assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

        // No responses yet
        let response = server.get(&format!("/api/response/{}", form_id)).await;
        assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

        // Two submissions from the same respondent are allowed
        for rating in ["good", "bad"] {
            let response = server
                .post("/api/response/create")
                .json(&json!({
                    "formId": form_id,
                    "username": "bob",
                    "responses": {"1": "Bob", "2": rating},
                }))
                .await;
            assert_eq!(response.status_code(), StatusCode::CREATED);
            let body: Value = response.json();
            assert_eq!(body["message"], "Form response submitted successfully");
            assert_eq!(body["formResponse"]["username"], "bob");
        }

        let response = server.get(&format!("/api/response/{}", form_id)).await;
        assert_eq!(response.status_code(), StatusCode::OK);
        let responses: Value = response.json();
        assert_eq!(responses.as_array().unwrap().len(), 2);
        assert_eq!(responses[0]["responses"]["2"], "good");

        // CSV download
        let response = server
            .get(&format!("/api/response/{}/export-csv", form_id))
            .await;
        assert_eq!(response.status_code(), StatusCode::OK);
        assert_eq!(response.header("content-type").to_str().unwrap(), "text/csv");
        assert_eq!(
            response.header("content-disposition").to_str().unwrap(),
            format!("attachment; filename=form_responses_{}.csv", form_id)
        );

        let csv = response.text();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("id,formId,username,1,2"));
        assert!(lines.next().unwrap().ends_with("Bob,good"));
        assert!(lines.next().unwrap().ends_with("Bob,bad"));
    }

    #[tokio::test]
    async fn test_csv_export_without_responses_is_404() {
        let server = setup_test_server().await;
        let (alice_id, _) = register(&server, "alice").await;
        let form_id = create_form(&server, alice_id).await;

        let response = server
            .get(&format!("/api/response/{}/export-csv", form_id))
            .await;
        assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
        let body: Value = response.json();
        assert_eq!(body["message"], "No responses found for this form");
    }
}
