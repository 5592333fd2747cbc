//! # NiceApe Rust SDK
//!
//! A Rust SDK for the NiceApe token marketplace: real-time market-data
//! streaming and candlestick-chart aggregation.
//!
//! ## Modules
//!
//! This SDK provides two main modules:
//! - [`api`]: REST data-API client for chart history, transaction pages, and token lists
//! - [`stream`]: Real-time market data over one persistent connection
//!
//! Plus the shared building blocks:
//! - [`chart`]: OHLCV bar construction, merging, and series state
//! - [`shared`]: Wire model shared between modules
//!
//! ## Quick Start - Streaming
//!
//! ```rust,ignore
//! use niceape::stream::{NiceapeStreamClient, StreamEvent};
//! use niceape::chart::ChartTimeInterval;
//! use futures_util::StreamExt;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut client = NiceapeStreamClient::connect_default()?;
//!
//!     client.subscribe_txns(vec!["mint1".to_string()]).await?;
//!     client.set_chart("mint1", ChartTimeInterval::FifteenMinutes, None).await;
//!
//!     while let Some(event) = client.next().await {
//!         match event {
//!             StreamEvent::ChartBar { asset, bar } => {
//!                 println!("{}: close {}", asset, bar.close);
//!             }
//!             StreamEvent::TradeActions { asset, trades } => {
//!                 println!("{}: {} new trades", asset, trades.len());
//!             }
//!             _ => {}
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Quick Start - REST API
//!
//! ```rust,ignore
//! use niceape::api::{NiceapeApiClient, types::ChartRequest};
//! use niceape::chart::ChartTimeInterval;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = NiceapeApiClient::new("https://datapi.jup.ag")?;
//!
//!     let request = ChartRequest::new("mint1", ChartTimeInterval::FifteenMinutes);
//!     let chart = client.get_chart_bars(&request).await?;
//!     println!("Fetched {} bars", chart.bars.len());
//!
//!     let txs = client.get_token_txs("mint1", Some(50), None).await?;
//!     println!("Fetched {} trades", txs.txs.len());
//!
//!     Ok(())
//! }
//! ```

// ============================================================================
// MODULES
// ============================================================================

/// Candlestick-chart aggregation: bars, intervals, series state.
pub mod chart;

/// Network URL constants (data-API and stream endpoints).
pub mod network;

/// Shared wire model used across SDK modules.
pub mod shared;

/// REST data-API client for snapshot data.
#[cfg(feature = "api")]
pub mod api;

/// Streaming client for real-time market data.
#[cfg(feature = "stream")]
pub mod stream;

// ============================================================================
// PRELUDE
// ============================================================================

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use niceape::prelude::*;
/// ```
pub mod prelude {
    pub use crate::chart::{
        bucket_start, construct_bars, next_bar, Bar, BarSeries, ChartTimeInterval,
    };
    pub use crate::network::{DEFAULT_DATA_API_URL, DEFAULT_STREAM_URL};
    pub use crate::shared::{Side, TradeEvent};

    #[cfg(feature = "api")]
    pub use crate::api::{ApiError, ApiResult, NiceapeApiClient};

    #[cfg(feature = "stream")]
    pub use crate::stream::{
        ConnectionState, NiceapeStreamClient, RecentListFilters, StreamConfig, StreamError,
        StreamEvent, StreamRequest, StreamResult, SubscriptionRegistry,
    };
}
