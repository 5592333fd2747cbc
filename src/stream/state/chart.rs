//! Live chart state.
//!
//! Tracks which asset the chart is currently displaying and folds that
//! asset's streamed trades into its bar series.

use crate::chart::{Bar, BarSeries, ChartTimeInterval};
use crate::shared::TradeEvent;

/// Bar series bound to the currently displayed chart symbol.
#[derive(Debug, Clone)]
pub struct ChartTracker {
    asset: String,
    series: BarSeries,
}

impl ChartTracker {
    /// Start tracking an asset at the given candle width.
    pub fn new(asset: impl Into<String>, interval: ChartTimeInterval) -> Self {
        Self {
            asset: asset.into(),
            series: BarSeries::new(interval),
        }
    }

    /// Scale prices by circulating supply (market-cap mode).
    pub fn with_price_multiplier(mut self, multiplier: f64) -> Self {
        self.series = self.series.with_price_multiplier(multiplier);
        self
    }

    /// Seed the series from fetched chart history.
    pub fn apply_history(&mut self, bars: &[Bar]) {
        self.series.apply_history(bars);
    }

    /// Fold streamed trades into the series when they belong to the tracked
    /// asset; returns the updated bar if anything changed.
    pub fn apply_trades(&mut self, asset: &str, trades: &[TradeEvent]) -> Option<Bar> {
        if asset != self.asset {
            return None;
        }
        self.series.apply_trades(trades)
    }

    /// The tracked asset id.
    pub fn asset(&self) -> &str {
        &self.asset
    }

    /// The underlying bar series.
    pub fn series(&self) -> &BarSeries {
        &self.series
    }
}
