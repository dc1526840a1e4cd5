// src/models/mod.rs

//! Domain models for the review crawler.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod category;
mod config;
mod item;
mod record;

// Re-export all public types
pub use category::{Category, CategoryCounts};
pub use config::{AuthConfig, Config, CrawlerConfig, OutputConfig};
pub use item::ItemInfo;
pub use record::{Rating, Record, RecordRow};

/// Nominal number of reviews the source returns per page.
pub const PAGE_SIZE: usize = 20;
