//! Data models
//!
//! Shared between pos-server and the browser client (via API).
//! All IDs are `i64` snowflakes, safe for JavaScript numbers.

pub mod order;
pub mod statistics;
pub mod user;

// Re-exports
pub use order::*;
pub use statistics::*;
pub use user::*;
