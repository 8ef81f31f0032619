//! Shared types for the POS backend
//!
//! Wire models used by the server and its browser client, plus the unified
//! error type that every handler returns.

pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};
