use metrics::counter;
use sea_orm::{
    sea_query::OnConflict, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, TransactionTrait,
};
use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::entities::stock_item::{Column, Entity as StockItemEntity};
use crate::errors::AppError;
use crate::models::stock_item::{ItemKey, StockItem, StockItemUpdate};
use crate::repositories::Repository;

use super::BaseRepository;

/// Result of a partial update against the `items` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The patch named no field; nothing was written.
    NoFieldsProvided,
    /// No row matched the key.
    NotFound,
    Updated,
}

/// Persistence gateway for stock items keyed by `(sku, store)`.
#[derive(Debug, Clone)]
pub struct StockItemRepository {
    base: BaseRepository,
}

impl StockItemRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Inserts every item, overwriting `quantity` and `description` of rows whose key
    /// already exists. The whole batch commits or none of it does; when a key repeats
    /// within the batch the later record wins.
    #[instrument(skip(self, items), fields(count = items.len()))]
    pub async fn batch_upsert(&self, items: &[StockItem]) -> Result<(), AppError> {
        if items.is_empty() {
            return Ok(());
        }

        let txn = self.base.get_db().begin().await?;
        for item in items {
            StockItemEntity::insert(item.clone().into_active_model())
                .on_conflict(
                    OnConflict::columns([Column::Sku, Column::Store])
                        .update_columns([Column::Quantity, Column::Description])
                        .to_owned(),
                )
                .exec_without_returning(&txn)
                .await?;
        }
        txn.commit().await?;

        counter!("stockroom_db.items.upserted", items.len() as u64);
        info!(count = items.len(), "Upserted stock items");
        Ok(())
    }

    /// Applies only the fields present in `patch` to the row at `key`.
    #[instrument(skip(self, patch), fields(key = %key))]
    pub async fn update(
        &self,
        key: &ItemKey,
        patch: StockItemUpdate,
    ) -> Result<UpdateOutcome, AppError> {
        if patch.is_empty() {
            return Ok(UpdateOutcome::NoFieldsProvided);
        }

        let result = StockItemEntity::update_many()
            .set(patch.into_active_model())
            .filter(Column::Store.eq(key.store.as_str()))
            .filter(Column::Sku.eq(key.sku.as_str()))
            .exec(self.base.get_db())
            .await?;

        debug!(rows_affected = result.rows_affected, "Stock item update executed");
        if result.rows_affected == 0 {
            Ok(UpdateOutcome::NotFound)
        } else {
            Ok(UpdateOutcome::Updated)
        }
    }

    /// Removes the row at `key`. Returns whether a row existed.
    #[instrument(skip(self), fields(key = %key))]
    pub async fn delete(&self, key: &ItemKey) -> Result<bool, AppError> {
        let result = StockItemEntity::delete_many()
            .filter(Column::Store.eq(key.store.as_str()))
            .filter(Column::Sku.eq(key.sku.as_str()))
            .exec(self.base.get_db())
            .await?;

        Ok(result.rows_affected > 0)
    }

    /// Every stored item. Ordered by store then SKU so listings are stable.
    #[instrument(skip(self))]
    pub async fn get_all(&self) -> Result<Vec<StockItem>, AppError> {
        let rows = StockItemEntity::find()
            .order_by_asc(Column::Store)
            .order_by_asc(Column::Sku)
            .all(self.base.get_db())
            .await?;

        Ok(rows.into_iter().map(StockItem::from).collect())
    }
}
