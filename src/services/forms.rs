use chrono::Utc;
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::info;

use crate::error::{Result, ServiceError};
use crate::models::form::{Form, FormField, FormFieldInput, FormFieldRow, FormWithFields};

/// Form aggregate service: a form and its ordered field collection are one
/// consistency unit, so every mutation of the pair runs inside a single
/// transaction. On any failure the transaction rolls back on drop and no
/// partial aggregate is ever observable.
///
/// Concurrent updates to the same form are not serialized beyond the
/// storage layer: the last committed transaction wins.
#[derive(Clone)]
pub struct FormService {
    pool: SqlitePool,
}

impl FormService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a form row plus all of its field rows atomically.
    pub async fn create_form(
        &self,
        title: &str,
        description: Option<&str>,
        owner_id: i64,
        fields: &[FormFieldInput],
    ) -> Result<Form> {
        if title.trim().is_empty() {
            return Err(ServiceError::Validation("title is required".to_string()));
        }
        if owner_id <= 0 {
            return Err(ServiceError::Validation("userId is required".to_string()));
        }

        let mut tx = self.pool.begin().await?;
        let now = Utc::now().to_rfc3339();

        let result = sqlx::query(
            "INSERT INTO forms (title, description, user_id, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(title)
        .bind(description)
        .bind(owner_id)
        .bind(&now)
        .bind(&now)
        .execute(&mut *tx)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.message().contains("FOREIGN KEY") => {
                ServiceError::Validation("userId does not reference an existing user".to_string())
            }
            _ => ServiceError::from(e),
        })?;

        let form_id = result.last_insert_rowid();
        insert_fields(&mut tx, form_id, fields).await?;
        tx.commit().await?;

        info!("Created form {} with {} fields", form_id, fields.len());

        Ok(Form {
            id: form_id,
            title: title.to_string(),
            description: description.map(str::to_string),
            user_id: owner_id,
            created_at: now.clone(),
            updated_at: now,
        })
    }

    /// Update form metadata and replace its entire field set atomically.
    ///
    /// This is a deliberate destroy-and-recreate: the old field rows are
    /// deleted and the new list inserted fresh, so field ids are NOT stable
    /// across updates. External references to a field id from a prior
    /// version become invalid once the update commits.
    pub async fn update_form(
        &self,
        form_id: i64,
        title: &str,
        description: Option<&str>,
        fields: &[FormFieldInput],
    ) -> Result<(Form, Vec<FormField>)> {
        let mut tx = self.pool.begin().await?;

        let existing = sqlx::query_as::<_, Form>(
            "SELECT id, title, description, user_id, created_at, updated_at
             FROM forms WHERE id = ?",
        )
        .bind(form_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Form not found".to_string()))?;

        let now = Utc::now().to_rfc3339();

        sqlx::query("UPDATE forms SET title = ?, description = ?, updated_at = ? WHERE id = ?")
            .bind(title)
            .bind(description)
            .bind(&now)
            .bind(form_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM form_fields WHERE form_id = ?")
            .bind(form_id)
            .execute(&mut *tx)
            .await?;

        insert_fields(&mut tx, form_id, fields).await?;
        let rows = fetch_field_rows(&mut tx, form_id).await?;

        tx.commit().await?;

        info!(
            "Updated form {} and replaced its fields ({} new)",
            form_id,
            rows.len()
        );

        let form = Form {
            title: title.to_string(),
            description: description.map(str::to_string),
            updated_at: now,
            ..existing
        };

        let fields = rows
            .into_iter()
            .map(FormFieldRow::into_field)
            .collect::<Result<Vec<_>>>()?;

        Ok((form, fields))
    }

    /// All forms owned by the given user, fields eagerly loaded and
    /// stable-sorted by (field_order, id). Zero forms is an empty list.
    pub async fn get_forms_by_user(&self, username: &str) -> Result<Vec<FormWithFields>> {
        let owner_id = self.resolve_owner(username).await?;

        let forms = sqlx::query_as::<_, Form>(
            "SELECT id, title, description, user_id, created_at, updated_at
             FROM forms WHERE user_id = ? ORDER BY id",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        let mut result = Vec::with_capacity(forms.len());
        for form in forms {
            let rows = sqlx::query_as::<_, FormFieldRow>(
                "SELECT id, form_id, field_type, label, placeholder, is_required,
                        default_value, options, field_order
                 FROM form_fields WHERE form_id = ? ORDER BY field_order, id",
            )
            .bind(form.id)
            .fetch_all(&self.pool)
            .await?;

            let form_fields = rows
                .into_iter()
                .map(FormFieldRow::into_field)
                .collect::<Result<Vec<_>>>()?;

            result.push(FormWithFields { form, form_fields });
        }

        Ok(result)
    }

    /// Delete a form, its fields and its responses atomically.
    ///
    /// Ownership is enforced by the lookup predicate itself (id AND owner),
    /// so a non-owner's delete finds no row and fails NotFound exactly like
    /// a missing form. The two cases are indistinguishable by design.
    pub async fn delete_form(&self, username: &str, form_id: i64) -> Result<()> {
        let owner_id = self.resolve_owner(username).await?;

        let mut tx = self.pool.begin().await?;

        sqlx::query("SELECT id FROM forms WHERE id = ? AND user_id = ?")
            .bind(form_id)
            .bind(owner_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound("Form not found or user not authorized".to_string())
            })?;

        // Responses are deleted with their form rather than orphaned
        sqlx::query("DELETE FROM form_responses WHERE form_id = ?")
            .bind(form_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM form_fields WHERE form_id = ?")
            .bind(form_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM forms WHERE id = ?")
            .bind(form_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        info!("Deleted form {} owned by {}", form_id, username);

        Ok(())
    }

    async fn resolve_owner(&self, username: &str) -> Result<i64> {
        let row: Option<(i64,)> = sqlx::query_as("SELECT id FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|(id,)| id)
            .ok_or_else(|| ServiceError::NotFound("User not found".to_string()))
    }
}

/// Bulk-insert a field list for a form inside an open transaction.
/// A field with no explicit order takes its input array index.
async fn insert_fields(
    tx: &mut Transaction<'_, Sqlite>,
    form_id: i64,
    fields: &[FormFieldInput],
) -> Result<()> {
    for (index, field) in fields.iter().enumerate() {
        let options = match &field.options {
            Some(list) => Some(serde_json::to_string(list)?),
            None => None,
        };
        let order = field.order.unwrap_or(index as i64);

        sqlx::query(
            "INSERT INTO form_fields
                (form_id, field_type, label, placeholder, is_required,
                 default_value, options, field_order)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(form_id)
        .bind(field.field_type.as_str())
        .bind(&field.label)
        .bind(&field.placeholder)
        .bind(field.is_required)
        .bind(&field.default_value)
        .bind(options)
        .bind(order)
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}

async fn fetch_field_rows(
    tx: &mut Transaction<'_, Sqlite>,
    form_id: i64,
) -> Result<Vec<FormFieldRow>> {
    let rows = sqlx::query_as::<_, FormFieldRow>(
        "SELECT id, form_id, field_type, label, placeholder, is_required,
                default_value, options, field_order
         FROM form_fields WHERE form_id = ? ORDER BY field_order, id",
    )
    .bind(form_id)
    .fetch_all(&mut **tx)
    .await?;

    Ok(rows)
}
