//! Bar series state for a single chart.
//!
//! Maintains the ordered, deduplicated bar sequence handed to the chart
//! widget: ascending by time, one bar per interval start, bounded length.

use std::collections::HashMap;

use crate::chart::bars::{construct_bars, next_bar, Bar};
use crate::chart::intervals::ChartTimeInterval;
use crate::shared::TradeEvent;

/// Maximum number of bars retained; oldest bars are trimmed beyond this.
const MAX_BARS: usize = 1000;

/// Bar sequence for one asset/interval pair.
#[derive(Debug, Clone)]
pub struct BarSeries {
    interval: ChartTimeInterval,
    /// Price scale; set when the chart displays market cap instead of price.
    price_multiplier: Option<f64>,
    /// Bars sorted by time (oldest first)
    bars: Vec<Bar>,
    /// Index by time for fast lookup
    bar_index: HashMap<i64, usize>,
}

impl BarSeries {
    /// Create an empty series.
    pub fn new(interval: ChartTimeInterval) -> Self {
        Self {
            interval,
            price_multiplier: None,
            bars: Vec::new(),
            bar_index: HashMap::new(),
        }
    }

    /// Scale prices by the asset's circulating supply (market-cap mode).
    pub fn with_price_multiplier(mut self, multiplier: f64) -> Self {
        self.price_multiplier = Some(multiplier);
        self
    }

    /// Replace the series contents with a historical snapshot.
    pub fn apply_history(&mut self, bars: &[Bar]) {
        self.bars.clear();
        self.bar_index.clear();
        for bar in bars {
            self.upsert(*bar);
        }
    }

    /// Fold a batch of trades (sorted ascending by timestamp) into the
    /// series and return the bar that changed, if any.
    ///
    /// With at least one bar present, only the most recent bar is advanced or
    /// merged. On a cold start the trades seed the series wholesale.
    pub fn apply_trades(&mut self, trades: &[TradeEvent]) -> Option<Bar> {
        if trades.is_empty() {
            return None;
        }

        let interval_ms = self.interval.millis();
        match next_bar(self.latest(), trades, interval_ms, self.price_multiplier) {
            Some(updated) => {
                self.upsert(updated);
                Some(updated)
            }
            None => {
                let mut last = None;
                for bar in construct_bars(trades, interval_ms, self.price_multiplier) {
                    self.upsert(bar);
                    last = Some(bar);
                }
                last
            }
        }
    }

    /// Insert a bar, merging over any existing bar with the same time key.
    fn upsert(&mut self, bar: Bar) {
        if let Some(&idx) = self.bar_index.get(&bar.time) {
            self.bars[idx] = bar;
            return;
        }

        let insert_pos = self
            .bars
            .iter()
            .position(|b| b.time > bar.time)
            .unwrap_or(self.bars.len());

        // Shift indices for bars displaced by the insert
        for idx in self.bar_index.values_mut() {
            if *idx >= insert_pos {
                *idx += 1;
            }
        }

        self.bar_index.insert(bar.time, insert_pos);
        self.bars.insert(insert_pos, bar);

        while self.bars.len() > MAX_BARS {
            let removed = self.bars.remove(0);
            self.bar_index.remove(&removed.time);
            for idx in self.bar_index.values_mut() {
                *idx -= 1;
            }
        }
    }

    /// All bars, oldest first.
    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    /// The most recent bar.
    pub fn latest(&self) -> Option<Bar> {
        self.bars.last().copied()
    }

    /// Get a bar by its interval-start time.
    pub fn get(&self, time: i64) -> Option<&Bar> {
        self.bar_index.get(&time).map(|&idx| &self.bars[idx])
    }

    /// Number of bars held.
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// Whether the series is empty.
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// The candle width of this series.
    pub fn interval(&self) -> ChartTimeInterval {
        self.interval
    }

    /// Drop all bars.
    pub fn clear(&mut self) {
        self.bars.clear();
        self.bar_index.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::Side;
    use chrono::DateTime;

    fn trade(timestamp_ms: i64, usd_price: f64, usd_volume: f64) -> TradeEvent {
        TradeEvent {
            asset: "mint1".to_string(),
            timestamp: DateTime::from_timestamp_millis(timestamp_ms).unwrap(),
            usd_price,
            usd_volume,
            side: Side::Buy,
            trader_address: "trader1".to_string(),
            tx_hash: "sig1".to_string(),
        }
    }

    fn bar(time: i64, price: f64) -> Bar {
        Bar {
            time,
            open: price,
            high: price,
            low: price,
            close: price,
            volume: 1.0,
        }
    }

    #[test]
    fn test_cold_start_seeds_from_trades() {
        let mut series = BarSeries::new(ChartTimeInterval::OneMinute);
        let updated = series.apply_trades(&[trade(1000, 10.0, 1.0), trade(61_000, 11.0, 2.0)]);
        assert_eq!(series.len(), 2);
        assert_eq!(updated.unwrap().time, 60_000);
        assert_eq!(series.bars()[0].time, 0);
    }

    #[test]
    fn test_same_interval_updates_in_place() {
        let mut series = BarSeries::new(ChartTimeInterval::OneMinute);
        series.apply_trades(&[trade(1000, 10.0, 1.0)]);
        series.apply_trades(&[trade(2000, 12.0, 2.0)]);

        assert_eq!(series.len(), 1);
        let latest = series.latest().unwrap();
        assert_eq!(latest.high, 12.0);
        assert_eq!(latest.close, 12.0);
        assert_eq!(latest.volume, 3.0);
    }

    #[test]
    fn test_rollover_appends_without_duplicates() {
        let mut series = BarSeries::new(ChartTimeInterval::OneMinute);
        series.apply_trades(&[trade(1000, 10.0, 1.0)]);
        series.apply_trades(&[trade(61_000, 15.0, 1.0)]);

        assert_eq!(series.len(), 2);
        let times: Vec<i64> = series.bars().iter().map(|b| b.time).collect();
        assert_eq!(times, vec![0, 60_000]);
        // Continuity: new candle opens at the previous close.
        assert_eq!(series.bars()[1].open, 10.0);
    }

    #[test]
    fn test_history_then_live_merge() {
        let mut series = BarSeries::new(ChartTimeInterval::OneMinute);
        series.apply_history(&[bar(0, 10.0), bar(60_000, 11.0)]);

        let updated = series.apply_trades(&[trade(70_000, 13.0, 5.0)]).unwrap();
        assert_eq!(updated.time, 60_000);
        assert_eq!(updated.open, 11.0);
        assert_eq!(updated.close, 13.0);
        assert_eq!(series.len(), 2);
    }

    #[test]
    fn test_times_stay_ascending_and_unique() {
        let mut series = BarSeries::new(ChartTimeInterval::OneMinute);
        series.apply_history(&[bar(60_000, 2.0), bar(0, 1.0), bar(60_000, 3.0)]);

        let times: Vec<i64> = series.bars().iter().map(|b| b.time).collect();
        assert_eq!(times, vec![0, 60_000]);
        // The later duplicate wins.
        assert_eq!(series.get(60_000).unwrap().close, 3.0);
    }

    #[test]
    fn test_trims_oldest_beyond_capacity() {
        let history: Vec<Bar> = (0..(MAX_BARS as i64 + 10)).map(|i| bar(i * 60_000, 1.0)).collect();
        let mut series = BarSeries::new(ChartTimeInterval::OneMinute);
        series.apply_history(&history);

        assert_eq!(series.len(), MAX_BARS);
        assert_eq!(series.bars()[0].time, 10 * 60_000);
        assert_eq!(series.get(0), None);
        assert_eq!(
            series.get(10 * 60_000).copied(),
            Some(bar(10 * 60_000, 1.0))
        );
    }

    #[test]
    fn test_market_cap_mode_scales_prices() {
        let mut series =
            BarSeries::new(ChartTimeInterval::OneMinute).with_price_multiplier(1_000.0);
        series.apply_trades(&[trade(1000, 2.0, 5.0)]);
        let latest = series.latest().unwrap();
        assert_eq!(latest.close, 2_000.0);
        assert_eq!(latest.volume, 5.0);
    }
}
