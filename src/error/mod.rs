//! Error handling
//!
//! Defines the low-level client error and the typed connection errors
//! produced while bootstrapping a control connection.

pub mod types;

pub use types::*;
