//! Wire types for the NiceApe REST data-API.

pub mod chart;
pub mod tokens;
pub mod txns;

pub use chart::{ChartRequest, ChartResponse};
pub use tokens::{RecentTokensResponse, TokenSummary};
pub use txns::TokenTxsResponse;
