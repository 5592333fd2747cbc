//! Token-list types for the REST data-API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Summary of one tradable token.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenSummary {
    /// Token mint address
    pub asset: String,
    /// Primary liquidity pool id
    pub pool: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub usd_price: Option<f64>,
    #[serde(default)]
    pub usd_market_cap: Option<f64>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Response for GET /tokens/recent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentTokensResponse {
    /// Newest tokens first
    pub tokens: Vec<TokenSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_summary_deserialization() {
        let json = r#"{
            "asset": "mint1",
            "pool": "pool1",
            "symbol": "APE",
            "usdPrice": 0.002,
            "usdMarketCap": 2000000.0
        }"#;
        let token: TokenSummary = serde_json::from_str(json).unwrap();
        assert_eq!(token.symbol.as_deref(), Some("APE"));
        assert_eq!(token.usd_market_cap, Some(2_000_000.0));
        assert!(token.created_at.is_none());
    }
}
