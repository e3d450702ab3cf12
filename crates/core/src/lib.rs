//! Core types and shared functionality for prerender.
//!
//! This crate provides:
//! - The persistent page store with a SQLite backend
//! - Unified error types
//! - Configuration structures

pub mod config;
pub mod error;
pub mod store;

pub use config::AppConfig;
pub use error::Error;
pub use store::{CachedPage, PageStore, SqlitePageStore};
