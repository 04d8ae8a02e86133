use sea_orm::ActiveValue::{self, NotSet, Set};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::stock_item;

/// A validated stock item, as accepted by the insert endpoint and returned by the list endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StockItem {
    #[schema(example = "SKU-001")]
    pub sku: String,
    #[schema(example = "store-42")]
    pub store: String,
    #[schema(example = 12, minimum = 0)]
    pub quantity: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl StockItem {
    /// Full-row active model. An omitted description is written as NULL.
    pub fn into_active_model(self) -> stock_item::ActiveModel {
        stock_item::ActiveModel {
            sku: Set(self.sku),
            store: Set(self.store),
            quantity: Set(self.quantity),
            description: Set(self.description),
        }
    }
}

impl From<stock_item::Model> for StockItem {
    fn from(row: stock_item::Model) -> Self {
        Self {
            sku: row.sku,
            store: row.store,
            quantity: row.quantity,
            description: row.description,
        }
    }
}

/// Natural key of a stock item.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ItemKey {
    pub store: String,
    pub sku: String,
}

impl ItemKey {
    pub fn new(store: impl Into<String>, sku: impl Into<String>) -> Self {
        Self {
            store: store.into(),
            sku: sku.into(),
        }
    }
}

impl std::fmt::Display for ItemKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.store, self.sku)
    }
}

/// Presence-aware value of a nullable field in a patch.
///
/// `Absent` leaves the column untouched, `Null` clears it and `Value` overwrites it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FieldPatch<T> {
    #[default]
    Absent,
    Null,
    Value(T),
}

impl<T> FieldPatch<T> {
    pub fn is_present(&self) -> bool {
        !matches!(self, FieldPatch::Absent)
    }

    pub fn into_active_value(self) -> ActiveValue<Option<T>>
    where
        Option<T>: Into<sea_orm::Value>,
    {
        match self {
            FieldPatch::Absent => NotSet,
            FieldPatch::Null => Set(None),
            FieldPatch::Value(value) => Set(Some(value)),
        }
    }
}

/// Partial mutation of a stock item. Only present fields are written.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StockItemUpdate {
    pub quantity: Option<i64>,
    pub description: FieldPatch<String>,
}

impl StockItemUpdate {
    /// True when the patch names no field at all.
    pub fn is_empty(&self) -> bool {
        self.quantity.is_none() && !self.description.is_present()
    }

    pub fn into_active_model(self) -> stock_item::ActiveModel {
        stock_item::ActiveModel {
            quantity: self.quantity.map_or(NotSet, Set),
            description: self.description.into_active_value(),
            ..Default::default()
        }
    }
}
