use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::FromRow;

use crate::error::Result;

/// One respondent's submitted answer set against a form.
/// Immutable once created; the same respondent may submit repeatedly.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormResponse {
    pub id: i64,
    pub form_id: i64,
    pub username: String,
    /// Answers keyed by field id, decoded from the stored blob
    pub responses: Map<String, Value>,
    pub created_at: String, // RFC3339
}

/// Raw form_responses row. The answers mapping is persisted as an opaque
/// JSON text blob and only decoded on read, so field schemas can change
/// independently of past responses.
#[derive(Debug, FromRow)]
pub struct FormResponseRow {
    pub id: i64,
    pub form_id: i64,
    pub username: String,
    pub responses: String,
    pub created_at: String,
}

impl FormResponseRow {
    pub fn into_response(self) -> Result<FormResponse> {
        let responses = serde_json::from_str(&self.responses)?;

        Ok(FormResponse {
            id: self.id,
            form_id: self.form_id,
            username: self.username,
            responses,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponseRequest {
    pub form_id: i64,
    pub username: String,
    pub responses: Map<String, Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponseReply {
    pub message: String,
    pub form_response: FormResponse,
}
