//! Subscription bookkeeping for the stream connection.
//!
//! Tracks the set of active subscriptions so the full set can be replayed
//! after a connection drop.

use std::collections::HashSet;

use crate::stream::types::{RecentListFilters, StreamRequest};

/// Tracks active subscriptions across reconnects.
///
/// All operations are set-union/set-difference: adding an already-present id
/// or removing an absent one is a no-op. The registry lives only for the
/// session; nothing is persisted.
#[derive(Debug, Default)]
pub struct SubscriptionRegistry {
    /// Liquidity pools subscribed for price/stat updates
    pools: HashSet<String>,
    /// Assets subscribed for trade-event streams
    txn_assets: HashSet<String>,
    /// Whether the new-token firehose is subscribed
    recent_list: bool,
    /// Filter keys sent with the recent-list subscription
    recent_filters: Option<RecentListFilters>,
}

impl SubscriptionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Add pool subscriptions
    pub fn add_pools(&mut self, pools: &[String]) {
        for pool in pools {
            self.pools.insert(pool.clone());
        }
    }

    /// Remove pool subscriptions
    pub fn remove_pools(&mut self, pools: &[String]) {
        for pool in pools {
            self.pools.remove(pool);
        }
    }

    /// Check if subscribed to a pool
    pub fn is_subscribed_pool(&self, pool: &str) -> bool {
        self.pools.contains(pool)
    }

    /// Add trade-stream subscriptions
    pub fn add_txn_assets(&mut self, assets: &[String]) {
        for asset in assets {
            self.txn_assets.insert(asset.clone());
        }
    }

    /// Remove trade-stream subscriptions
    pub fn remove_txn_assets(&mut self, assets: &[String]) {
        for asset in assets {
            self.txn_assets.remove(asset);
        }
    }

    /// Check if subscribed to an asset's trade stream
    pub fn is_subscribed_txns(&self, asset: &str) -> bool {
        self.txn_assets.contains(asset)
    }

    /// Subscribe to the new-token firehose, optionally scoped by filters
    pub fn subscribe_recent(&mut self, filters: Option<RecentListFilters>) {
        self.recent_list = true;
        self.recent_filters = filters;
    }

    /// Unsubscribe from the new-token firehose
    pub fn unsubscribe_recent(&mut self) {
        self.recent_list = false;
    }

    /// Whether the new-token firehose is subscribed
    pub fn is_subscribed_recent(&self) -> bool {
        self.recent_list
    }

    /// Build the requests that re-establish every tracked subscription.
    ///
    /// Emits one subscribe message per non-empty category; called once per
    /// successful connection open.
    pub fn replay_all(&self) -> Vec<StreamRequest> {
        let mut requests = Vec::new();

        if self.recent_list {
            requests.push(StreamRequest::SubscribeRecent {
                filters: self.recent_filters.clone(),
            });
        }

        if !self.pools.is_empty() {
            requests.push(StreamRequest::SubscribePools {
                pools: self.pools.iter().cloned().collect(),
            });
        }

        if !self.txn_assets.is_empty() {
            requests.push(StreamRequest::SubscribeTxns {
                assets: self.txn_assets.iter().cloned().collect(),
            });
        }

        requests
    }

    /// Check if there are any active subscriptions
    pub fn has_subscriptions(&self) -> bool {
        self.recent_list || !self.pools.is_empty() || !self.txn_assets.is_empty()
    }

    /// Count of tracked subscriptions
    pub fn subscription_count(&self) -> usize {
        self.pools.len() + self.txn_assets.len() + usize::from(self.recent_list)
    }

    /// All subscribed pool ids
    pub fn subscribed_pools(&self) -> Vec<String> {
        self.pools.iter().cloned().collect()
    }

    /// All assets with subscribed trade streams
    pub fn subscribed_txn_assets(&self) -> Vec<String> {
        self.txn_assets.iter().cloned().collect()
    }

    /// Clear all subscriptions
    pub fn clear(&mut self) {
        self.pools.clear();
        self.txn_assets.clear();
        self.recent_list = false;
        self.recent_filters = None;
    }
}
