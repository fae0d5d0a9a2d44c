use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::error::{Result, ServiceError};

/// The closed set of input types a form field can take.
/// Anything outside this enumeration is a validation error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Number,
    Email,
    Date,
    Checkbox,
    Dropdown,
    Radio,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Number => "number",
            FieldType::Email => "email",
            FieldType::Date => "date",
            FieldType::Checkbox => "checkbox",
            FieldType::Dropdown => "dropdown",
            FieldType::Radio => "radio",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "text" => Some(FieldType::Text),
            "number" => Some(FieldType::Number),
            "email" => Some(FieldType::Email),
            "date" => Some(FieldType::Date),
            "checkbox" => Some(FieldType::Checkbox),
            "dropdown" => Some(FieldType::Dropdown),
            "radio" => Some(FieldType::Radio),
            _ => None,
        }
    }
}

/// A named, owned form template
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Form {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub user_id: i64,
    pub created_at: String, // RFC3339
    pub updated_at: String, // RFC3339
}

/// One input definition within a form, as served over the API
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormField {
    pub id: i64,
    pub form_id: i64,
    pub field_type: FieldType,
    pub label: String,
    pub placeholder: Option<String>,
    pub is_required: bool,
    pub default_value: Option<String>,
    /// Choice list, semantically required for dropdown/radio fields
    pub options: Option<Vec<String>>,
    pub order: i64,
}

/// Raw form_fields row. Options are stored as a JSON text column and
/// decoded when converting to the API model.
#[derive(Debug, FromRow)]
pub struct FormFieldRow {
    pub id: i64,
    pub form_id: i64,
    pub field_type: String,
    pub label: String,
    pub placeholder: Option<String>,
    pub is_required: bool,
    pub default_value: Option<String>,
    pub options: Option<String>,
    pub field_order: i64,
}

impl FormFieldRow {
    pub fn into_field(self) -> Result<FormField> {
        let field_type = FieldType::parse(&self.field_type).ok_or_else(|| {
            ServiceError::Validation(format!("Unknown field type: {}", self.field_type))
        })?;

        let options = match self.options {
            Some(raw) => Some(serde_json::from_str(&raw)?),
            None => None,
        };

        Ok(FormField {
            id: self.id,
            form_id: self.form_id,
            field_type,
            label: self.label,
            placeholder: self.placeholder,
            is_required: self.is_required,
            default_value: self.default_value,
            options,
            order: self.field_order,
        })
    }
}

/// Field definition as supplied by clients when creating or updating a form
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormFieldInput {
    pub field_type: FieldType,
    pub label: String,
    #[serde(default)]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub is_required: bool,
    #[serde(default)]
    pub default_value: Option<String>,
    #[serde(default)]
    pub options: Option<Vec<String>>,
    /// Position within the form; defaults to the input array index
    #[serde(default)]
    pub order: Option<i64>,
}

/// A form together with its eagerly loaded fields
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormWithFields {
    #[serde(flatten)]
    pub form: Form,
    pub form_fields: Vec<FormField>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFormRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub user_id: i64,
    #[serde(default)]
    pub form_fields: Vec<FormFieldInput>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFormRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub form_fields: Vec<FormFieldInput>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFormResponse {
    pub form: Form,
    pub form_fields: Vec<FormField>,
}
