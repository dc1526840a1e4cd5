// src/lib.rs

//! Review crawler library.
//!
//! Crawls the paginated review listing of a single catalog item,
//! deduplicates reviews across pages and exports one CSV per category.

pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
