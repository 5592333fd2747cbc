//! Message handlers for stream events.
//!
//! Routes incoming messages to local state and emits events.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::shared::TradeEvent;
use crate::stream::error::StreamError;
use crate::stream::state::{ChartTracker, TxnCache};
use crate::stream::types::{
    MessageType, PoolUpdateData, PriceUpdateData, RawStreamMessage, RecentTokenData, StreamEvent,
};

/// Handles incoming stream messages
#[derive(Debug)]
pub struct MessageHandler {
    /// Per-asset trade-table caches
    txn_caches: Arc<RwLock<HashMap<String, TxnCache>>>,
    /// The currently displayed chart, if any
    chart: Arc<RwLock<Option<ChartTracker>>>,
}

impl MessageHandler {
    /// Create a new message handler with shared state
    pub fn new(
        txn_caches: Arc<RwLock<HashMap<String, TxnCache>>>,
        chart: Arc<RwLock<Option<ChartTracker>>>,
    ) -> Self {
        Self { txn_caches, chart }
    }

    /// Handle an incoming message and return events.
    ///
    /// A message that fails to parse is logged and dropped; the connection
    /// keeps running.
    pub async fn handle_message(&self, text: &str) -> Vec<StreamEvent> {
        let raw_msg: RawStreamMessage = match serde_json::from_str(text) {
            Ok(msg) => msg,
            Err(e) => {
                tracing::warn!("Failed to parse stream message: {}", e);
                return vec![StreamEvent::Error {
                    error: StreamError::MessageParse(e.to_string()),
                }];
            }
        };

        match MessageType::from(raw_msg.type_.as_str()) {
            MessageType::Actions => self.handle_actions(&raw_msg).await,
            MessageType::Price => self.handle_price(&raw_msg).await,
            MessageType::Recent => self.handle_recent(&raw_msg).await,
            MessageType::Pool => self.handle_pool(&raw_msg).await,
            MessageType::Unknown => {
                tracing::warn!("Unknown message type: {}", raw_msg.type_);
                vec![]
            }
        }
    }

    /// Handle a batch of executed trades
    async fn handle_actions(&self, raw_msg: &RawStreamMessage) -> Vec<StreamEvent> {
        let trades: Vec<TradeEvent> = match serde_json::from_value(raw_msg.data.clone()) {
            Ok(trades) => trades,
            Err(e) => {
                tracing::warn!("Failed to parse trade actions: {}", e);
                return vec![StreamEvent::Error {
                    error: StreamError::MessageParse(e.to_string()),
                }];
            }
        };

        if trades.is_empty() {
            return vec![];
        }

        // Group by asset, preserving batch order within each group
        let mut groups: Vec<(String, Vec<TradeEvent>)> = Vec::new();
        for trade in trades {
            match groups.iter().position(|(asset, _)| *asset == trade.asset) {
                Some(idx) => groups[idx].1.push(trade),
                None => groups.push((trade.asset.clone(), vec![trade])),
            }
        }

        let mut events = Vec::new();

        for (asset, group) in groups {
            // Newest trades go to the front of the asset's cached first page
            {
                let mut caches = self.txn_caches.write().await;
                if let Some(cache) = caches.get_mut(&asset) {
                    cache.prepend(&group);
                }
            }

            // Fold into the live chart when the asset matches its symbol
            {
                let mut chart = self.chart.write().await;
                if let Some(tracker) = chart.as_mut() {
                    if let Some(bar) = tracker.apply_trades(&asset, &group) {
                        events.push(StreamEvent::ChartBar {
                            asset: asset.clone(),
                            bar,
                        });
                    }
                }
            }

            events.push(StreamEvent::TradeActions {
                asset,
                trades: group,
            });
        }

        events
    }

    /// Handle an asset price update
    async fn handle_price(&self, raw_msg: &RawStreamMessage) -> Vec<StreamEvent> {
        let data: PriceUpdateData = match serde_json::from_value(raw_msg.data.clone()) {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!("Failed to parse price update: {}", e);
                return vec![StreamEvent::Error {
                    error: StreamError::MessageParse(e.to_string()),
                }];
            }
        };

        vec![StreamEvent::PriceUpdate(data)]
    }

    /// Handle new tokens appearing on the recent list
    async fn handle_recent(&self, raw_msg: &RawStreamMessage) -> Vec<StreamEvent> {
        let data: Vec<RecentTokenData> = match serde_json::from_value(raw_msg.data.clone()) {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!("Failed to parse recent-list update: {}", e);
                return vec![StreamEvent::Error {
                    error: StreamError::MessageParse(e.to_string()),
                }];
            }
        };

        vec![StreamEvent::RecentListUpdate(data)]
    }

    /// Handle a pool stat update
    async fn handle_pool(&self, raw_msg: &RawStreamMessage) -> Vec<StreamEvent> {
        let data: PoolUpdateData = match serde_json::from_value(raw_msg.data.clone()) {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!("Failed to parse pool update: {}", e);
                return vec![StreamEvent::Error {
                    error: StreamError::MessageParse(e.to_string()),
                }];
            }
        };

        vec![StreamEvent::PoolUpdate(data)]
    }

    /// Start caching trades for an asset's transaction table.
    pub async fn init_txn_cache(&self, asset: &str) {
        let mut caches = self.txn_caches.write().await;
        caches
            .entry(asset.to_string())
            .or_insert_with(|| TxnCache::new(asset.to_string()));
    }

    /// Stop caching trades for an asset.
    pub async fn remove_txn_cache(&self, asset: &str) {
        self.txn_caches.write().await.remove(asset);
    }

    /// Point the live chart at an asset/interval pair.
    pub async fn set_chart(&self, tracker: ChartTracker) {
        *self.chart.write().await = Some(tracker);
    }

    /// Detach the live chart.
    pub async fn clear_chart(&self) {
        *self.chart.write().await = None;
    }
}
