//! Configuration types
//!
//! Link policy structures stored as postcard binary data.

pub mod types;

pub use types::*;
