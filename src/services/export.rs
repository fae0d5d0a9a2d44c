use csv::WriterBuilder;
use serde_json::Value;
use tracing::info;

use crate::error::{Result, ServiceError};
use crate::models::response::FormResponse;
use crate::services::responses::ResponseService;

/// Flatten every stored response for a form into a single CSV blob
/// suitable for direct download. Fails NotFound when the form has no
/// responses at all.
pub async fn export_to_csv(responses: &ResponseService, form_id: i64) -> Result<String> {
    let rows = responses.get_responses(form_id).await?;

    if rows.is_empty() {
        return Err(ServiceError::NotFound(
            "No responses found for this form".to_string(),
        ));
    }

    let csv = build_csv(&rows)?;
    info!("Exported {} responses for form {} as CSV", rows.len(), form_id);

    Ok(csv)
}

/// Build the tabular projection: fixed {id, formId, username} columns
/// followed by one column per answer key of the FIRST response. Keys that
/// appear only in later responses are dropped — the first row defines the
/// schema (see DESIGN.md).
pub fn build_csv(rows: &[FormResponse]) -> Result<String> {
    let answer_columns: Vec<String> = rows
        .first()
        .map(|first| first.responses.keys().cloned().collect())
        .unwrap_or_default();

    let mut buffer = Vec::new();
    {
        let mut writer = WriterBuilder::new().from_writer(&mut buffer);

        let mut header: Vec<&str> = vec!["id", "formId", "username"];
        header.extend(answer_columns.iter().map(String::as_str));
        writer.write_record(&header)?;

        for row in rows {
            let mut record = vec![
                row.id.to_string(),
                row.form_id.to_string(),
                row.username.clone(),
            ];
            for key in &answer_columns {
                let cell = match row.responses.get(key) {
                    Some(value) => flatten_value(value),
                    None => String::new(),
                };
                record.push(cell);
            }
            writer.write_record(&record)?;
        }

        writer.flush()?;
    }

    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

// Composite values are serialized to their JSON text, never expanded into
// extra columns. Plain strings are emitted without surrounding quotes.
fn flatten_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Object(_) | Value::Array(_) => value.to_string(),
        other => other.to_string(),
    }
}
