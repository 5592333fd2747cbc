//! OHLCV bar construction and merging.
//!
//! Turns batches of trade events into candlestick bars and folds new trades
//! into the most recent bar as they stream in.

use serde::{Deserialize, Serialize};

use crate::shared::TradeEvent;

/// One OHLCV candle.
///
/// `time` is the interval-start instant in epoch milliseconds and acts as the
/// bar's identity key; it is always an exact multiple of the interval width.
/// Prices satisfy `low <= open, close <= high`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// Interval start (epoch milliseconds)
    pub time: i64,
    /// Price of the first trade in the interval
    pub open: f64,
    /// Highest trade price in the interval
    pub high: f64,
    /// Lowest trade price in the interval
    pub low: f64,
    /// Price of the last trade in the interval
    pub close: f64,
    /// Summed USD volume of the interval's trades
    pub volume: f64,
}

/// Map a timestamp to the start of its containing interval.
///
/// Integer arithmetic only, so repeated calls with the same timestamp always
/// land in the same bucket. `interval_ms` must be positive.
pub const fn bucket_start(timestamp_ms: i64, interval_ms: i64) -> i64 {
    timestamp_ms - timestamp_ms % interval_ms
}

/// Build OHLCV bars from a batch of trades.
///
/// `trades` must be sorted ascending by timestamp. Returns one bar per
/// interval that contains at least one trade, in ascending time order;
/// intervals without trades are not emitted. Prices are scaled by
/// `price_multiplier` when set (market-cap mode: price × circulating supply).
pub fn construct_bars(
    trades: &[TradeEvent],
    interval_ms: i64,
    price_multiplier: Option<f64>,
) -> Vec<Bar> {
    let multiplier = price_multiplier.unwrap_or(1.0);
    let mut bars: Vec<Bar> = Vec::new();

    for trade in trades {
        let time = bucket_start(trade.timestamp_millis(), interval_ms);
        let price = trade.usd_price * multiplier;

        match bars.last_mut() {
            Some(bar) if bar.time == time => {
                if price > bar.high {
                    bar.high = price;
                }
                if price < bar.low {
                    bar.low = price;
                }
                bar.close = price;
                bar.volume += trade.usd_volume;
            }
            _ => bars.push(Bar {
                time,
                open: price,
                high: price,
                low: price,
                close: price,
                volume: trade.usd_volume,
            }),
        }
    }

    bars
}

/// Fold a batch of new trades into the most recent bar.
///
/// Returns the previous bar untouched when there is no previous bar or no new
/// trades. When the first new bar opens a later interval than `previous`, the
/// rolled-over bar opens at `previous.close` and its high/low are widened to
/// include it, so consecutive candles stay continuous. Otherwise the new
/// trades are merged into the bar already being built: time and open are
/// kept, high/low widen, close follows the newest trade, volumes sum.
pub fn next_bar(
    previous: Option<Bar>,
    trades: &[TradeEvent],
    interval_ms: i64,
    price_multiplier: Option<f64>,
) -> Option<Bar> {
    let prev = previous?;
    if trades.is_empty() {
        return Some(prev);
    }

    let new_bar = match construct_bars(trades, interval_ms, price_multiplier).into_iter().next() {
        Some(bar) => bar,
        None => return Some(prev),
    };

    if new_bar.time > prev.time {
        // A new interval has started: open where the prior candle closed.
        return Some(Bar {
            time: new_bar.time,
            open: prev.close,
            high: new_bar.high.max(prev.close),
            low: new_bar.low.min(prev.close),
            close: new_bar.close,
            volume: new_bar.volume,
        });
    }

    Some(Bar {
        time: prev.time,
        open: prev.open,
        high: prev.high.max(new_bar.high),
        low: prev.low.min(new_bar.low),
        close: new_bar.close,
        volume: prev.volume + new_bar.volume,
    })
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

    fn assert_ohlc_invariant(bar: &Bar) {
        assert!(bar.low <= bar.open && bar.open <= bar.high);
        assert!(bar.low <= bar.close && bar.close <= bar.high);
    }

    #[test]
    fn test_bucket_start_alignment() {
        for (t, w) in [(0, 1), (999, 1000), (1000, 1000), (16000, 15000), (86_400_001, 60_000)] {
            let start = bucket_start(t, w);
            assert_eq!(start % w, 0);
            assert!(start <= t && t < start + w);
        }
    }

    #[test]
    fn test_bucket_start_is_stable() {
        assert_eq!(bucket_start(1234, 100), bucket_start(1234, 100));
        assert_eq!(bucket_start(1234, 100), 1200);
    }

    #[test]
    fn test_construct_bars_empty() {
        assert!(construct_bars(&[], 15_000, None).is_empty());
    }

    #[test]
    fn test_construct_bars_two_buckets() {
        let trades = vec![
            trade(1000, 10.0, 5.0),
            trade(1000, 12.0, 3.0),
            trade(16000, 9.0, 2.0),
        ];
        let bars = construct_bars(&trades, 15_000, None);
        assert_eq!(bars.len(), 2);

        assert_eq!(bars[0].time, 0);
        assert_eq!(bars[0].open, 10.0);
        assert_eq!(bars[0].high, 12.0);
        assert_eq!(bars[0].low, 10.0);
        assert_eq!(bars[0].close, 12.0);
        assert_eq!(bars[0].volume, 8.0);

        assert_eq!(bars[1].time, 15_000);
        assert_eq!(bars[1].open, 9.0);
        assert_eq!(bars[1].high, 9.0);
        assert_eq!(bars[1].low, 9.0);
        assert_eq!(bars[1].close, 9.0);
        assert_eq!(bars[1].volume, 2.0);

        for bar in &bars {
            assert_ohlc_invariant(bar);
        }
    }

    #[test]
    fn test_construct_bars_skips_empty_intervals() {
        // Trades three intervals apart: no bar is emitted for the gap.
        let trades = vec![trade(1000, 10.0, 1.0), trade(46_000, 11.0, 1.0)];
        let bars = construct_bars(&trades, 15_000, None);
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].time, 0);
        assert_eq!(bars[1].time, 45_000);
    }

    #[test]
    fn test_construct_bars_market_cap_mode() {
        let trades = vec![trade(1000, 2.0, 5.0)];
        let bars = construct_bars(&trades, 15_000, Some(1_000_000.0));
        assert_eq!(bars[0].open, 2_000_000.0);
        assert_eq!(bars[0].close, 2_000_000.0);
        // Volume stays in USD, unscaled.
        assert_eq!(bars[0].volume, 5.0);
    }

    #[test]
    fn test_construct_bars_single_trade_collapses() {
        let bars = construct_bars(&[trade(500, 7.0, 1.0)], 1000, None);
        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].open, 7.0);
        assert_eq!(bars[0].high, 7.0);
        assert_eq!(bars[0].low, 7.0);
        assert_eq!(bars[0].close, 7.0);
        assert_ohlc_invariant(&bars[0]);
    }

    #[test]
    fn test_next_bar_identity_cases() {
        let bar = Bar {
            time: 0,
            open: 1.0,
            high: 2.0,
            low: 0.5,
            close: 1.5,
            volume: 10.0,
        };
        assert_eq!(next_bar(None, &[trade(1000, 1.0, 1.0)], 15_000, None), None);
        assert_eq!(next_bar(Some(bar), &[], 15_000, None), Some(bar));
    }

    #[test]
    fn test_next_bar_rollover_opens_at_previous_close() {
        let prev = Bar {
            time: 0,
            open: 90.0,
            high: 110.0,
            low: 80.0,
            close: 100.0,
            volume: 50.0,
        };
        let updated = next_bar(Some(prev), &[trade(15_000, 150.0, 4.0)], 15_000, None).unwrap();
        assert_eq!(updated.time, 15_000);
        assert_eq!(updated.open, 100.0);
        assert!(updated.high >= 150.0);
        assert!(updated.low <= 100.0);
        assert_eq!(updated.close, 150.0);
        assert_eq!(updated.volume, 4.0);
        assert_ohlc_invariant(&updated);
    }

    #[test]
    fn test_next_bar_rollover_downward() {
        let prev = Bar {
            time: 0,
            open: 90.0,
            high: 110.0,
            low: 80.0,
            close: 100.0,
            volume: 50.0,
        };
        let updated = next_bar(Some(prev), &[trade(15_000, 60.0, 4.0)], 15_000, None).unwrap();
        assert_eq!(updated.open, 100.0);
        assert_eq!(updated.high, 100.0);
        assert_eq!(updated.low, 60.0);
        assert_ohlc_invariant(&updated);
    }

    #[test]
    fn test_next_bar_same_interval_merge() {
        let prev = Bar {
            time: 0,
            open: 10.0,
            high: 12.0,
            low: 9.0,
            close: 11.0,
            volume: 8.0,
        };
        let trades = vec![trade(5000, 14.0, 2.0), trade(6000, 13.0, 1.0)];
        let updated = next_bar(Some(prev), &trades, 15_000, None).unwrap();
        assert_eq!(updated.time, 0);
        assert_eq!(updated.open, 10.0);
        assert_eq!(updated.high, 14.0);
        assert_eq!(updated.low, 9.0);
        assert_eq!(updated.close, 13.0);
        assert_eq!(updated.volume, 11.0);
        assert_ohlc_invariant(&updated);
    }

    #[test]
    fn test_merge_volume_is_order_independent() {
        let prev = Bar {
            time: 0,
            open: 10.0,
            high: 10.0,
            low: 10.0,
            close: 10.0,
            volume: 0.0,
        };
        let batch_a = vec![trade(1000, 11.0, 3.0)];
        let batch_b = vec![trade(2000, 9.0, 4.0)];

        let ab = next_bar(next_bar(Some(prev), &batch_a, 15_000, None), &batch_b, 15_000, None)
            .unwrap();
        let ba = next_bar(next_bar(Some(prev), &batch_b, 15_000, None), &batch_a, 15_000, None)
            .unwrap();

        assert_eq!(ab.volume, 7.0);
        assert_eq!(ba.volume, 7.0);
        // Close follows whichever batch was applied last.
        assert_eq!(ab.close, 9.0);
        assert_eq!(ba.close, 11.0);
    }
}
