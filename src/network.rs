//! Network URL constants for the NiceApe SDK.

/// Default REST data-API base URL.
pub const DEFAULT_DATA_API_URL: &str = "https://datapi.jup.ag";

/// Default market-data stream URL.
pub const DEFAULT_STREAM_URL: &str = "wss://trench-stream.jup.ag/ws";
