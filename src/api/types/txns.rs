//! Transaction-history types for the REST data-API.

use serde::{Deserialize, Serialize};

use crate::shared::TradeEvent;

/// Response for GET /txs/{asset}: one page of an asset's trade history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenTxsResponse {
    /// Trades, newest first
    pub txs: Vec<TradeEvent>,
    /// Cursor for the next page, if any
    #[serde(default)]
    pub next: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_txs_response_deserialization() {
        let json = r#"{
            "txs": [{
                "asset": "mint1",
                "timestamp": "2024-01-01T00:00:01.000Z",
                "usdPrice": 0.5,
                "usdVolume": 20.0,
                "side": "sell",
                "traderAddress": "trader1",
                "txHash": "sig1"
            }],
            "next": "cursor123"
        }"#;
        let response: TokenTxsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.txs.len(), 1);
        assert_eq!(response.next.as_deref(), Some("cursor123"));
    }

    #[test]
    fn test_txs_response_without_cursor() {
        let response: TokenTxsResponse = serde_json::from_str(r#"{"txs":[]}"#).unwrap();
        assert!(response.txs.is_empty());
        assert!(response.next.is_none());
    }
}
