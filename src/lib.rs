pub mod api;
pub mod api_docs;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod db;
pub mod domain;
pub mod import;
pub mod models;
pub mod orders;
pub mod seed;
pub mod services;
pub mod state;
