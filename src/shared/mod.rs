//! Shared types used across SDK modules.

pub mod types;

pub use types::{Side, TradeEvent};
