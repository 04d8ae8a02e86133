//! Runtime shape-checking of untyped stock item records.
//!
//! Every check records its message and validation continues, so one pass reports
//! all problems with a record. Keys the schemas do not name are ignored.

mod issues;

pub use issues::{Issues, RecordError, ValidationFailure};

use serde_json::{Map, Value};

use crate::models::stock_item::{FieldPatch, StockItem, StockItemUpdate};

pub const REQUIRED: &str = "Required";
pub const SKU_EMPTY: &str = "SKU must not be empty";
pub const STORE_EMPTY: &str = "Store must not be empty";
pub const QUANTITY_NEGATIVE: &str = "Quantity must be a non-negative integer";
pub const QUANTITY_NOT_INTEGER: &str = "Expected integer, received float";
pub const QUANTITY_TOO_LARGE: &str = "Quantity is too large";

/// Validates one record against the full stock item schema.
pub fn validate_stock_item(record: &Value) -> Result<StockItem, Issues> {
    let mut issues = Issues::new();
    let Some(fields) = as_object(record, &mut issues) else {
        return Err(issues);
    };

    let sku = required_identifier(fields, "sku", SKU_EMPTY, &mut issues);
    let store = required_identifier(fields, "store", STORE_EMPTY, &mut issues);
    let quantity = match fields.get("quantity") {
        Some(value) => read_quantity(value, "quantity", &mut issues),
        None => {
            issues.field("quantity", REQUIRED);
            None
        }
    };
    let description = match fields.get("description") {
        None => None,
        Some(Value::String(text)) => Some(text.clone()),
        Some(other) => {
            issues.field("description", expected("string", other));
            None
        }
    };

    issues.finish(|| StockItem {
        sku: sku.unwrap_or_default(),
        store: store.unwrap_or_default(),
        quantity: quantity.unwrap_or_default(),
        description,
    })
}

/// Validates a batch. Either every record is valid and the typed items come back in
/// input order, or the batch is rejected with one entry per failing record.
pub fn validate_many(records: &[Value]) -> Result<Vec<StockItem>, Vec<RecordError>> {
    let mut validated = Vec::with_capacity(records.len());
    let mut errors = Vec::new();

    for record in records {
        match validate_stock_item(record) {
            Ok(item) => validated.push(item),
            Err(issues) => errors.push(RecordError {
                input: record.clone(),
                issues,
            }),
        }
    }

    if errors.is_empty() {
        Ok(validated)
    } else {
        Err(errors)
    }
}

/// Validates a partial update. `description` keeps its three states: a missing key,
/// an explicit `null` and a string are all distinct in the result.
pub fn validate_update(record: &Value) -> Result<StockItemUpdate, Issues> {
    let mut issues = Issues::new();
    let Some(fields) = as_object(record, &mut issues) else {
        return Err(issues);
    };

    let quantity = fields
        .get("quantity")
        .and_then(|value| read_quantity(value, "quantity", &mut issues));

    let description = match fields.get("description") {
        None => FieldPatch::Absent,
        Some(Value::Null) => FieldPatch::Null,
        Some(Value::String(text)) => FieldPatch::Value(text.clone()),
        Some(other) => {
            issues.field("description", expected("string", other));
            FieldPatch::Absent
        }
    };

    issues.finish(|| StockItemUpdate {
        quantity,
        description,
    })
}

fn as_object<'a>(record: &'a Value, issues: &mut Issues) -> Option<&'a Map<String, Value>> {
    match record {
        Value::Object(fields) => Some(fields),
        other => {
            issues.form(expected("object", other));
            None
        }
    }
}

fn required_identifier(
    fields: &Map<String, Value>,
    name: &str,
    empty_message: &str,
    issues: &mut Issues,
) -> Option<String> {
    match fields.get(name) {
        None => {
            issues.field(name, REQUIRED);
            None
        }
        Some(Value::String(text)) if text.is_empty() => {
            issues.field(name, empty_message);
            None
        }
        Some(Value::String(text)) => Some(text.clone()),
        Some(other) => {
            issues.field(name, expected("string", other));
            None
        }
    }
}

/// Accepts JSON integers and integral floats (`5.0`) in `0..=i64::MAX`.
fn read_quantity(value: &Value, name: &str, issues: &mut Issues) -> Option<i64> {
    let Value::Number(number) = value else {
        issues.field(name, expected("number", value));
        return None;
    };

    if let Some(quantity) = number.as_i64() {
        if quantity < 0 {
            issues.field(name, QUANTITY_NEGATIVE);
            return None;
        }
        return Some(quantity);
    }
    if number.is_u64() {
        issues.field(name, QUANTITY_TOO_LARGE);
        return None;
    }

    let float = number.as_f64().unwrap_or(f64::NAN);
    let mut valid = true;
    if float.fract() != 0.0 || !float.is_finite() {
        issues.field(name, QUANTITY_NOT_INTEGER);
        valid = false;
    }
    if float < 0.0 {
        issues.field(name, QUANTITY_NEGATIVE);
        valid = false;
    }
    if valid && float >= i64::MAX as f64 {
        issues.field(name, QUANTITY_TOO_LARGE);
        valid = false;
    }
    valid.then_some(float as i64)
}

fn expected(kind: &str, received: &Value) -> String {
    format!("Expected {}, received {}", kind, json_type_name(received))
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    #[test]
    fn accepts_full_record() {
        let item = validate_stock_item(&json!({
            "sku": "A-1",
            "store": "S1",
            "quantity": 4,
            "description": "blue widget"
        }))
        .unwrap();
        assert_eq!(item.sku, "A-1");
        assert_eq!(item.store, "S1");
        assert_eq!(item.quantity, 4);
        assert_eq!(item.description.as_deref(), Some("blue widget"));
    }

    #[test]
    fn description_is_optional_and_extra_keys_are_dropped() {
        let item =
            validate_stock_item(&json!({"sku": "A", "store": "S", "quantity": 0, "color": "red"}))
                .unwrap();
        assert_eq!(item.description, None);
        assert_eq!(item.quantity, 0);
    }

    #[test]
    fn reports_every_failing_field() {
        let issues =
            validate_stock_item(&json!({"sku": "", "store": 7, "quantity": -2})).unwrap_err();
        assert_eq!(issues.for_field("sku"), [SKU_EMPTY]);
        assert_eq!(issues.for_field("store"), ["Expected string, received number"]);
        assert_eq!(issues.for_field("quantity"), [QUANTITY_NEGATIVE]);
        assert!(issues.form_errors.is_empty());
    }

    #[test]
    fn missing_fields_are_required() {
        let issues = validate_stock_item(&json!({})).unwrap_err();
        for field in ["sku", "store", "quantity"] {
            assert_eq!(issues.for_field(field), [REQUIRED], "field {field}");
        }
        assert!(issues.for_field("description").is_empty());
    }

    #[test]
    fn null_description_is_rejected_in_full_record() {
        let issues =
            validate_stock_item(&json!({"sku": "A", "store": "S", "quantity": 1, "description": null}))
                .unwrap_err();
        assert_eq!(
            issues.for_field("description"),
            ["Expected string, received null"]
        );
    }

    #[test]
    fn quantity_must_be_integral() {
        let issues =
            validate_stock_item(&json!({"sku": "A", "store": "S", "quantity": 1.5})).unwrap_err();
        assert_eq!(issues.for_field("quantity"), [QUANTITY_NOT_INTEGER]);

        let issues =
            validate_stock_item(&json!({"sku": "A", "store": "S", "quantity": -0.5})).unwrap_err();
        assert_eq!(
            issues.for_field("quantity"),
            [QUANTITY_NOT_INTEGER, QUANTITY_NEGATIVE]
        );

        let item = validate_stock_item(&json!({"sku": "A", "store": "S", "quantity": 5.0})).unwrap();
        assert_eq!(item.quantity, 5);
    }

    #[test]
    fn quantity_beyond_storage_range_is_rejected() {
        let issues =
            validate_stock_item(&json!({"sku": "A", "store": "S", "quantity": u64::MAX})).unwrap_err();
        assert_eq!(issues.for_field("quantity"), [QUANTITY_TOO_LARGE]);
    }

    #[test]
    fn string_quantity_is_a_type_error() {
        let issues =
            validate_stock_item(&json!({"sku": "A", "store": "S", "quantity": "3"})).unwrap_err();
        assert_eq!(
            issues.for_field("quantity"),
            ["Expected number, received string"]
        );
    }

    #[test]
    fn non_object_record_is_a_form_error() {
        let issues = validate_stock_item(&json!(["A", "S", 1])).unwrap_err();
        assert_eq!(issues.form_errors, ["Expected object, received array"]);
        assert!(issues.field_errors.is_empty());
    }

    #[test]
    fn batch_preserves_order() {
        let records = vec![
            json!({"sku": "B", "store": "S", "quantity": 2}),
            json!({"sku": "A", "store": "S", "quantity": 1}),
        ];
        let items = validate_many(&records).unwrap();
        let skus: Vec<_> = items.iter().map(|item| item.sku.as_str()).collect();
        assert_eq!(skus, ["B", "A"]);
    }

    #[test]
    fn batch_is_all_or_nothing_and_reports_every_failure() {
        let records = vec![
            json!({"sku": "A", "store": "S", "quantity": 1}),
            json!({"sku": "", "store": "S", "quantity": 1}),
            json!({"sku": "C", "store": "S", "quantity": -1}),
        ];
        let errors = validate_many(&records).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].input, records[1]);
        assert_eq!(errors[1].input, records[2]);
        assert_eq!(errors[1].issues.for_field("quantity"), [QUANTITY_NEGATIVE]);
    }

    #[test]
    fn update_distinguishes_absent_null_and_value() {
        let absent = validate_update(&json!({"quantity": 3})).unwrap();
        assert_eq!(absent.quantity, Some(3));
        assert_matches!(absent.description, FieldPatch::Absent);

        let cleared = validate_update(&json!({"description": null})).unwrap();
        assert_eq!(cleared.quantity, None);
        assert_matches!(cleared.description, FieldPatch::Null);

        let set = validate_update(&json!({"description": "restocked"})).unwrap();
        assert_matches!(set.description, FieldPatch::Value(ref text) if text == "restocked");
    }

    #[test]
    fn update_with_only_unknown_keys_is_empty() {
        let patch = validate_update(&json!({"color": "red"})).unwrap();
        assert!(patch.is_empty());
    }

    #[test]
    fn update_reports_all_invalid_fields() {
        let issues = validate_update(&json!({"quantity": -1, "description": 12})).unwrap_err();
        assert_eq!(issues.for_field("quantity"), [QUANTITY_NEGATIVE]);
        assert_eq!(
            issues.for_field("description"),
            ["Expected string, received number"]
        );
    }

    #[test]
    fn update_rejects_null_quantity_and_non_object_body() {
        let issues = validate_update(&json!({"quantity": null})).unwrap_err();
        assert_eq!(issues.for_field("quantity"), ["Expected number, received null"]);

        let issues = validate_update(&json!("quantity=3")).unwrap_err();
        assert_eq!(issues.form_errors, ["Expected object, received string"]);
    }
}
