use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use utoipa::ToSchema;

/// Flattened validation issues: record-level problems plus per-field messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Issues {
    pub form_errors: Vec<String>,
    pub field_errors: BTreeMap<String, Vec<String>>,
}

impl Issues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn form(&mut self, message: impl Into<String>) {
        self.form_errors.push(message.into());
    }

    pub fn field(&mut self, field: &str, message: impl Into<String>) {
        self.field_errors
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.form_errors.is_empty() && self.field_errors.is_empty()
    }

    /// Messages recorded against `field`, empty when the field passed.
    pub fn for_field(&self, field: &str) -> &[String] {
        self.field_errors
            .get(field)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub(crate) fn finish<T>(self, value: impl FnOnce() -> T) -> Result<T, Issues> {
        if self.is_empty() {
            Ok(value())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for Issues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<String> = self.form_errors.clone();
        parts.extend(
            self.field_errors
                .iter()
                .map(|(field, messages)| format!("{}: {}", field, messages.join(", "))),
        );
        f.write_str(&parts.join("; "))
    }
}

/// A rejected batch record together with the input it came from.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct RecordError {
    #[schema(value_type = Object)]
    pub input: Value,
    pub issues: Issues,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum ValidationFailure {
    #[error("{} submitted record(s) failed validation", .0.len())]
    Batch(Vec<RecordError>),

    #[error("invalid item data for update: {0}")]
    Update(Issues),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issues_serialize_in_flattened_shape() {
        let mut issues = Issues::new();
        issues.field("sku", "SKU must not be empty");
        issues.form("Expected object, received array");

        let value = serde_json::to_value(&issues).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "formErrors": ["Expected object, received array"],
                "fieldErrors": {"sku": ["SKU must not be empty"]}
            })
        );
    }

    #[test]
    fn display_lists_every_field() {
        let mut issues = Issues::new();
        issues.field("quantity", "Required");
        issues.field("store", "Store must not be empty");
        assert_eq!(
            issues.to_string(),
            "quantity: Required; store: Store must not be empty"
        );
    }
}
