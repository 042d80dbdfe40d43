//! File serving on top of the HTTP layer
//!
//! This module owns the storage root, the index page and the router that
//! turns parsed requests into storage operations.

pub mod listing;
pub mod router;
pub mod storage;

pub use router::Router;
pub use storage::{Storage, StorageError};
