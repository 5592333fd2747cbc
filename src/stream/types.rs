//! Message types for the NiceApe stream protocol.
//!
//! Request and response types exchanged with the market-data stream server.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::chart::Bar;
use crate::shared::TradeEvent;
use crate::stream::error::StreamError;

// ============================================================================
// REQUEST TYPES (Client → Server)
// ============================================================================

/// Outbound subscribe/unsubscribe request, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum StreamRequest {
    /// Subscribe to the new-token firehose
    #[serde(rename = "subscribe:recent")]
    SubscribeRecent {
        #[serde(skip_serializing_if = "Option::is_none")]
        filters: Option<RecentListFilters>,
    },
    /// Unsubscribe from the new-token firehose
    #[serde(rename = "unsubscribe:recent")]
    UnsubscribeRecent,
    /// Subscribe to price/stat updates for liquidity pools
    #[serde(rename = "subscribe:pool")]
    SubscribePools { pools: Vec<String> },
    /// Unsubscribe from pool updates
    #[serde(rename = "unsubscribe:pool")]
    UnsubscribePools { pools: Vec<String> },
    /// Subscribe to trade-event streams for assets
    #[serde(rename = "subscribe:txns")]
    SubscribeTxns { assets: Vec<String> },
    /// Unsubscribe from trade-event streams
    #[serde(rename = "unsubscribe:txns")]
    UnsubscribeTxns { assets: Vec<String> },
}

/// Partner-config filter keys scoping the recent-token subscription.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentListFilters {
    #[serde(rename = "partnerConfigs")]
    pub partner_configs: Vec<String>,
}

// ============================================================================
// RESPONSE TYPES (Server → Client)
// ============================================================================

/// Raw message wrapper for initial parsing
#[derive(Debug, Clone, Deserialize)]
pub struct RawStreamMessage {
    #[serde(rename = "type")]
    pub type_: String,
    pub data: serde_json::Value,
}

/// Enum for all possible server message types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    /// Batch of executed trades
    Actions,
    /// Asset price update
    Price,
    /// New-token firehose entry
    Recent,
    /// Pool stat update
    Pool,
    Unknown,
}

impl From<&str> for MessageType {
    fn from(s: &str) -> Self {
        match s {
            "actions" => Self::Actions,
            "price" => Self::Price,
            "recent" => Self::Recent,
            "pool" => Self::Pool,
            _ => Self::Unknown,
        }
    }
}

/// Asset price update data
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceUpdateData {
    pub asset: String,
    pub usd_price: f64,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

/// New-token firehose entry
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentTokenData {
    pub asset: String,
    pub pool: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub partner_config: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Pool price/stat update data
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolUpdateData {
    pub pool: String,
    #[serde(default)]
    pub asset: Option<String>,
    #[serde(default)]
    pub usd_price: Option<f64>,
    #[serde(default)]
    pub usd_liquidity: Option<f64>,
    #[serde(default)]
    pub usd_volume_24h: Option<f64>,
}

// ============================================================================
// CLIENT EVENTS
// ============================================================================

/// Events emitted by the streaming client
#[derive(Debug, Clone)]
pub enum StreamEvent {
    /// Successfully connected; subscriptions have been replayed
    Connected,

    /// Disconnected from server
    Disconnected { reason: String },

    /// Waiting out the reconnect delay before the next attempt
    Reconnecting,

    /// Batch of executed trades for one asset
    TradeActions {
        asset: String,
        trades: Vec<TradeEvent>,
    },

    /// Asset price update received
    PriceUpdate(PriceUpdateData),

    /// New tokens appeared on the recent list
    RecentListUpdate(Vec<RecentTokenData>),

    /// Pool stats update received
    PoolUpdate(PoolUpdateData),

    /// The live chart's most recent bar changed
    ChartBar { asset: String, bar: Bar },

    /// Error occurred
    Error { error: StreamError },
}
