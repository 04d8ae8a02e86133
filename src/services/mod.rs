pub mod stock_items;

pub use stock_items::StockItemService;
