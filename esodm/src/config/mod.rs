//! Configuration and dependency initialization.

mod dependencies;

pub use dependencies::{AdminConfig, ConnectionMode, Dependencies};
