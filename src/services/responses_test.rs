#[cfg(test)]
mod response_service_tests {
    use serde_json::{json, Map, Value};
    use sqlx::SqlitePool;

    use crate::error::ServiceError;
    use crate::models::form::{FieldType, FormFieldInput};
    use crate::services::database::create_test_pool;
    use crate::services::forms::FormService;
    use crate::services::responses::ResponseService;

    async fn seed_form(pool: &SqlitePool) -> i64 {
        sqlx::query(
            "INSERT INTO users (username, email, password_hash, created_at, updated_at)
             VALUES ('alice', 'alice@example.com', 'hash', '2026-01-01T00:00:00Z', '2026-01-01T00:00:00Z')",
        )
        .execute(pool)
        .await
        .unwrap();

        let field = FormFieldInput {
            field_type: FieldType::Text,
            label: "Name".to_string(),
            placeholder: None,
            is_required: true,
            default_value: None,
            options: None,
            order: None,
        };

        FormService::new(pool.clone())
            .create_form("Survey", None, 1, &[field])
            .await
            .unwrap()
            .id
    }

    fn answers(pairs: &[(&str, Value)]) -> Map<String, Value> {
        let mut map = Map::new();
        for (key, value) in pairs {
            map.insert(key.to_string(), value.clone());
        }
        map
    }

    #[tokio::test]
    async fn test_submit_and_read_back() {
        let pool = create_test_pool().await;
        let form_id = seed_form(&pool).await;
        let service = ResponseService::new(pool);

        let submitted = answers(&[("1", json!("Bob")), ("2", json!(["red", "blue"]))]);
        let stored = service
            .submit_response(form_id, "bob", &submitted)
            .await
            .unwrap();

        assert_eq!(stored.form_id, form_id);
        assert_eq!(stored.username, "bob");

        let all = service.get_responses(form_id).await.unwrap();
        assert_eq!(all.len(), 1);

        // The blob decodes back to the submitted mapping
        assert_eq!(all[0].responses, submitted);
    }

    #[tokio::test]
    async fn test_submit_against_missing_form_writes_no_row() {
        let pool = create_test_pool().await;
        let service = ResponseService::new(pool.clone());

        let result = service
            .submit_response(42, "bob", &answers(&[("1", json!("x"))]))
            .await;
        assert!(matches!(result, Err(ServiceError::NotFound(_))));

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM form_responses")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_same_respondent_may_submit_repeatedly() {
        let pool = create_test_pool().await;
        let form_id = seed_form(&pool).await;
        let service = ResponseService::new(pool);

        let payload = answers(&[("1", json!("first"))]);
        service.submit_response(form_id, "bob", &payload).await.unwrap();
        service.submit_response(form_id, "bob", &payload).await.unwrap();

        let all = service.get_responses(form_id).await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn test_get_responses_for_form_without_submissions_is_empty() {
        let pool = create_test_pool().await;
        let form_id = seed_form(&pool).await;
        let service = ResponseService::new(pool);

        let all = service.get_responses(form_id).await.unwrap();
        assert!(all.is_empty());
    }
}
