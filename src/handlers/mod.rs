pub mod items;

pub use items::{item_routes, unmatched};
