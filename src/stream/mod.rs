//! Streaming client module for NiceApe.
//!
//! Real-time market data over one persistent connection: trade-event
//! streams, pool stat updates, and the new-token firehose. Subscriptions are
//! tracked locally and replayed in full after every reconnect.

pub mod client;
pub mod error;
pub mod handlers;
pub mod state;
pub mod subscriptions;
pub mod types;

pub use client::{ConnectionState, NiceapeStreamClient, StreamConfig};
pub use error::{StreamError, StreamResult};
pub use state::{ChartTracker, TxnCache};
pub use subscriptions::SubscriptionRegistry;
pub use types::{
    MessageType, PoolUpdateData, PriceUpdateData, RawStreamMessage, RecentListFilters,
    RecentTokenData, StreamEvent, StreamRequest,
};
