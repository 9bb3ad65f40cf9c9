//! Configuration and cache stores.
//!
//! Both are treated as atomic read/replace-whole-document stores. The
//! in-memory implementations back the tests and the CLI.

mod cache;
mod config;

pub use cache::{CacheStore, MemoryCache};
pub use config::{ConfigStore, MemoryStore};
