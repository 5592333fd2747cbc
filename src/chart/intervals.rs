//! Chart time intervals.
//!
//! Fixed candle widths supported by the chart, with conversions from
//! TradingView-style resolution strings.

use serde::{Deserialize, Serialize};

/// Candle width for chart aggregation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChartTimeInterval {
    /// 1 minute candles
    #[serde(rename = "1m")]
    OneMinute,
    /// 5 minute candles
    #[serde(rename = "5m")]
    FiveMinutes,
    /// 15 minute candles
    #[default]
    #[serde(rename = "15m")]
    FifteenMinutes,
    /// 30 minute candles
    #[serde(rename = "30m")]
    ThirtyMinutes,
    /// 1 hour candles
    #[serde(rename = "1h")]
    OneHour,
    /// 4 hour candles
    #[serde(rename = "4h")]
    FourHours,
    /// 1 day candles
    #[serde(rename = "1d")]
    OneDay,
}

impl ChartTimeInterval {
    /// Interval width in milliseconds.
    pub const fn millis(&self) -> i64 {
        match self {
            Self::OneMinute => 60_000,
            Self::FiveMinutes => 300_000,
            Self::FifteenMinutes => 900_000,
            Self::ThirtyMinutes => 1_800_000,
            Self::OneHour => 3_600_000,
            Self::FourHours => 14_400_000,
            Self::OneDay => 86_400_000,
        }
    }

    /// Get the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OneMinute => "1m",
            Self::FiveMinutes => "5m",
            Self::FifteenMinutes => "15m",
            Self::ThirtyMinutes => "30m",
            Self::OneHour => "1h",
            Self::FourHours => "4h",
            Self::OneDay => "1d",
        }
    }

    /// Parse a TradingView resolution string ("1", "5", "15", "30", "60",
    /// "240", "1D") into an interval.
    pub fn from_resolution(resolution: &str) -> Option<Self> {
        match resolution {
            "1" => Some(Self::OneMinute),
            "5" => Some(Self::FiveMinutes),
            "15" => Some(Self::FifteenMinutes),
            "30" => Some(Self::ThirtyMinutes),
            "60" => Some(Self::OneHour),
            "240" => Some(Self::FourHours),
            "1D" | "D" => Some(Self::OneDay),
            _ => None,
        }
    }

    /// The TradingView resolution string for this interval.
    pub fn resolution(&self) -> &'static str {
        match self {
            Self::OneMinute => "1",
            Self::FiveMinutes => "5",
            Self::FifteenMinutes => "15",
            Self::ThirtyMinutes => "30",
            Self::OneHour => "60",
            Self::FourHours => "240",
            Self::OneDay => "1D",
        }
    }
}

impl std::fmt::Display for ChartTimeInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_millis() {
        assert_eq!(ChartTimeInterval::OneMinute.millis(), 60_000);
        assert_eq!(ChartTimeInterval::FifteenMinutes.millis(), 900_000);
        assert_eq!(ChartTimeInterval::OneDay.millis(), 86_400_000);
    }

    #[test]
    fn test_resolution_round_trip() {
        for interval in [
            ChartTimeInterval::OneMinute,
            ChartTimeInterval::FiveMinutes,
            ChartTimeInterval::FifteenMinutes,
            ChartTimeInterval::ThirtyMinutes,
            ChartTimeInterval::OneHour,
            ChartTimeInterval::FourHours,
            ChartTimeInterval::OneDay,
        ] {
            assert_eq!(
                ChartTimeInterval::from_resolution(interval.resolution()),
                Some(interval)
            );
        }
    }

    #[test]
    fn test_from_resolution_unknown() {
        assert_eq!(ChartTimeInterval::from_resolution("7"), None);
        assert_eq!(ChartTimeInterval::from_resolution(""), None);
    }

    #[test]
    fn test_default_is_fifteen_minutes() {
        assert_eq!(ChartTimeInterval::default(), ChartTimeInterval::FifteenMinutes);
    }

    #[test]
    fn test_serde() {
        let json = serde_json::to_string(&ChartTimeInterval::FourHours).unwrap();
        assert_eq!(json, "\"4h\"");
        let back: ChartTimeInterval = serde_json::from_str("\"15m\"").unwrap();
        assert_eq!(back, ChartTimeInterval::FifteenMinutes);
    }
}
