//! Services Layer
//!
//! Business logic over the database connection, free of HTTP concerns.
//! Handlers call these; tests call them directly.

pub mod category_service;
pub mod market_service;
pub mod product_service;
pub mod supplier_service;
