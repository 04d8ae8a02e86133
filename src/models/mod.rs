pub mod stock_item;

pub use stock_item::{FieldPatch, ItemKey, StockItem, StockItemUpdate};
