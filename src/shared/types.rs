//! Core wire model shared between the REST API and the streaming client.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Trade Events (shared between API and stream)
// ============================================================================

/// One executed swap, as delivered by the market-data feed and by the
/// transaction-history REST endpoint.
///
/// Immutable once received. Timestamps are monotonically non-decreasing
/// within one asset's stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeEvent {
    /// Token identity (mint address)
    pub asset: String,
    /// Execution time
    pub timestamp: DateTime<Utc>,
    /// Execution price in USD
    pub usd_price: f64,
    /// Traded volume in USD
    pub usd_volume: f64,
    /// Taker side
    pub side: Side,
    /// Trader's wallet address
    pub trader_address: String,
    /// Transaction signature
    pub tx_hash: String,
}

impl TradeEvent {
    /// Execution time as epoch milliseconds.
    pub fn timestamp_millis(&self) -> i64 {
        self.timestamp.timestamp_millis()
    }
}

/// Swap direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// Get the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Buy => "buy",
            Self::Sell => "sell",
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
