use chrono::Utc;
use serde_json::{Map, Value};
use sqlx::SqlitePool;
use tracing::info;

use crate::error::{Result, ServiceError};
use crate::models::response::{FormResponse, FormResponseRow};

/// Response store: submitted answer sets keyed to a form. Rows are
/// immutable once written and a respondent may submit any number of times.
#[derive(Clone)]
pub struct ResponseService {
    pool: SqlitePool,
}

impl ResponseService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Store one response. The form must exist with at least one field
    /// defined, which ties the answers to a live field set at submission
    /// time; the answer keys themselves are not validated per-key and the
    /// mapping is persisted as an opaque JSON blob.
    pub async fn submit_response(
        &self,
        form_id: i64,
        username: &str,
        answers: &Map<String, Value>,
    ) -> Result<FormResponse> {
        let form = sqlx::query(
            "SELECT f.id FROM forms f
             JOIN form_fields ff ON ff.form_id = f.id
             WHERE f.id = ? LIMIT 1",
        )
        .bind(form_id)
        .fetch_optional(&self.pool)
        .await?;

        if form.is_none() {
            return Err(ServiceError::NotFound("Form not found".to_string()));
        }

        let blob = serde_json::to_string(answers)?;
        let now = Utc::now().to_rfc3339();

        let result = sqlx::query(
            "INSERT INTO form_responses (form_id, username, responses, created_at)
             VALUES (?, ?, ?, ?)",
        )
        .bind(form_id)
        .bind(username)
        .bind(&blob)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        info!(
            "Stored response {} for form {} from {}",
            result.last_insert_rowid(),
            form_id,
            username
        );

        Ok(FormResponse {
            id: result.last_insert_rowid(),
            form_id,
            username: username.to_string(),
            responses: answers.clone(),
            created_at: now,
        })
    }

    /// All responses for a form with answers decoded. An empty list is a
    /// valid state; callers that need to distinguish it from a missing
    /// form must check form existence separately.
    pub async fn get_responses(&self, form_id: i64) -> Result<Vec<FormResponse>> {
        let rows = sqlx::query_as::<_, FormResponseRow>(
            "SELECT id, form_id, username, responses, created_at
             FROM form_responses WHERE form_id = ? ORDER BY id",
        )
        .bind(form_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(FormResponseRow::into_response)
            .collect()
    }
}
