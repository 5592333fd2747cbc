//! Chart history types for the REST data-API.

use serde::{Deserialize, Serialize};

use crate::chart::{Bar, ChartTimeInterval};

/// Query parameters for GET /charts/{asset}.
#[derive(Debug, Clone)]
pub struct ChartRequest {
    /// Token mint address (required)
    pub asset: String,
    /// Candle width
    pub interval: ChartTimeInterval,
    /// Start timestamp (epoch milliseconds)
    pub from: Option<i64>,
    /// End timestamp (epoch milliseconds)
    pub to: Option<i64>,
}

impl ChartRequest {
    /// Create new params with the required asset.
    pub fn new(asset: impl Into<String>, interval: ChartTimeInterval) -> Self {
        Self {
            asset: asset.into(),
            interval,
            from: None,
            to: None,
        }
    }

    /// Set the time range.
    pub fn with_time_range(mut self, from: i64, to: i64) -> Self {
        self.from = Some(from);
        self.to = Some(to);
        self
    }
}

/// Response for GET /charts/{asset}.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartResponse {
    /// Historical bars, oldest first
    pub bars: Vec<Bar>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chart_response_deserialization() {
        let json = r#"{
            "bars": [
                { "time": 0, "open": 1.0, "high": 2.0, "low": 0.5, "close": 1.5, "volume": 10.0 },
                { "time": 900000, "open": 1.5, "high": 1.6, "low": 1.4, "close": 1.6, "volume": 3.0 }
            ]
        }"#;
        let response: ChartResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.bars.len(), 2);
        assert_eq!(response.bars[1].time, 900_000);
        assert_eq!(response.bars[1].close, 1.6);
    }
}
