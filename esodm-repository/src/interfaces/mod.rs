//! Interface definitions for the search engine client.
//!
//! This module defines the abstract `SearchClient` trait that the manager and
//! repositories talk to, so the engine can be swapped for a mock in tests.

mod search_client;

pub use search_client::{ClientParams, SearchClient};
