use sea_orm::DatabaseConnection;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::errors::ServiceError;
use crate::models::stock_item::{ItemKey, StockItem};
use crate::repositories::{StockItemRepository, UpdateOutcome};
use crate::validation::{self, ValidationFailure};

/// Validates untyped submissions and drives the repository.
#[derive(Debug, Clone)]
pub struct StockItemService {
    repository: Arc<StockItemRepository>,
}

impl StockItemService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            repository: Arc::new(StockItemRepository::new(db)),
        }
    }

    pub fn repository(&self) -> &StockItemRepository {
        &self.repository
    }

    /// Validates and upserts a submission. An array is taken as the batch, any other
    /// value as a batch of one. Returns the number of items written.
    #[instrument(skip(self, body))]
    pub async fn insert_items(&self, body: Value) -> Result<usize, ServiceError> {
        let records = into_records(body);
        if records.is_empty() {
            return Err(ServiceError::EmptyBatch);
        }

        let items = validation::validate_many(&records).map_err(|errors| {
            warn!(
                rejected = errors.len(),
                submitted = records.len(),
                "Stock item batch failed validation"
            );
            ValidationFailure::Batch(errors)
        })?;

        self.repository.batch_upsert(&items).await?;
        info!(count = items.len(), "Stock items created or updated");
        Ok(items.len())
    }

    #[instrument(skip(self))]
    pub async fn list_items(&self) -> Result<Vec<StockItem>, ServiceError> {
        self.repository.get_all().await
    }

    /// Applies a partial update to the item at `key`.
    #[instrument(skip(self, body), fields(key = %key))]
    pub async fn update_item(&self, key: &ItemKey, body: &Value) -> Result<(), ServiceError> {
        let patch = validation::validate_update(body).map_err(ValidationFailure::Update)?;

        match self.repository.update(key, patch).await? {
            UpdateOutcome::Updated => {
                info!("Stock item updated");
                Ok(())
            }
            UpdateOutcome::NoFieldsProvided => Err(ServiceError::NoFieldsToUpdate),
            UpdateOutcome::NotFound => Err(ServiceError::NotFound(key.to_string())),
        }
    }

    #[instrument(skip(self), fields(key = %key))]
    pub async fn delete_item(&self, key: &ItemKey) -> Result<(), ServiceError> {
        if self.repository.delete(key).await? {
            info!("Stock item deleted");
            Ok(())
        } else {
            Err(ServiceError::NotFound(key.to_string()))
        }
    }
}

fn into_records(body: Value) -> Vec<Value> {
    match body {
        Value::Array(records) => records,
        single => vec![single],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn array_body_is_the_batch() {
        let records = into_records(json!([{"sku": "A"}, {"sku": "B"}]));
        assert_eq!(records.len(), 2);
        assert!(into_records(json!([])).is_empty());
    }

    #[test]
    fn single_object_becomes_batch_of_one() {
        let records = into_records(json!({"sku": "A", "store": "S", "quantity": 1}));
        assert_eq!(records, vec![json!({"sku": "A", "store": "S", "quantity": 1})]);
    }
}
