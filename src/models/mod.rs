pub mod product;
pub mod product_market;
pub mod supplier;
pub mod market;
pub mod category;

pub use product::{ProductWithMarkets, StockStatus};
