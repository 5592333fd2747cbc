//! Per-asset transaction cache.
//!
//! Holds the first page of an asset's trade table; streamed batches are
//! prepended so the newest trades surface without a refetch.

use std::collections::VecDeque;

use crate::shared::TradeEvent;

/// Default number of trades retained per asset.
pub const DEFAULT_TXN_CACHE_CAPACITY: usize = 100;

/// Newest-first trade cache for one asset.
#[derive(Debug, Clone)]
pub struct TxnCache {
    asset: String,
    txs: VecDeque<TradeEvent>,
    capacity: usize,
}

impl TxnCache {
    /// Create an empty cache for an asset.
    pub fn new(asset: impl Into<String>) -> Self {
        Self::with_capacity(asset, DEFAULT_TXN_CACHE_CAPACITY)
    }

    /// Create an empty cache with a custom capacity.
    pub fn with_capacity(asset: impl Into<String>, capacity: usize) -> Self {
        Self {
            asset: asset.into(),
            txs: VecDeque::new(),
            capacity,
        }
    }

    /// Replace the cache contents with a fetched first page (newest first).
    pub fn seed(&mut self, txs: Vec<TradeEvent>) {
        self.txs = txs.into_iter().take(self.capacity).collect();
    }

    /// Prepend a streamed batch (sorted ascending by timestamp) so the
    /// newest trade ends up first; trims the oldest beyond capacity.
    pub fn prepend(&mut self, batch: &[TradeEvent]) {
        for tx in batch {
            self.txs.push_front(tx.clone());
        }
        self.txs.truncate(self.capacity);
    }

    /// The cached trades, newest first.
    pub fn txs(&self) -> impl Iterator<Item = &TradeEvent> {
        self.txs.iter()
    }

    /// The asset this cache belongs to.
    pub fn asset(&self) -> &str {
        &self.asset
    }

    /// Number of cached trades.
    pub fn len(&self) -> usize {
        self.txs.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.txs.is_empty()
    }

    /// Drop all cached trades.
    pub fn clear(&mut self) {
        self.txs.clear();
    }
}
