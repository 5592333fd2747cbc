//! Candlestick-chart aggregation.
//!
//! Converts streams of [`TradeEvent`](crate::shared::TradeEvent)s into OHLCV
//! bars and maintains the bar sequence a chart widget consumes.

pub mod bars;
pub mod intervals;
pub mod series;

pub use bars::{bucket_start, construct_bars, next_bar, Bar};
pub use intervals::ChartTimeInterval;
pub use series::BarSeries;
