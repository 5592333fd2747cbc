//! Streaming client for the NiceApe market-data feed.
//!
//! Owns one persistent connection, replays subscriptions after every
//! reconnect, and feeds trade events into the chart and transaction caches.

use std::collections::HashMap;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, Stream, StreamExt};
use pin_project_lite::pin_project;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch, RwLock};
use tokio::time::Instant;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use crate::chart::{Bar, ChartTimeInterval};
use crate::network::DEFAULT_STREAM_URL;
use crate::shared::TradeEvent;
use crate::stream::error::{StreamError, StreamResult};
use crate::stream::handlers::MessageHandler;
use crate::stream::state::{ChartTracker, TxnCache};
use crate::stream::subscriptions::SubscriptionRegistry;
use crate::stream::types::{RecentListFilters, StreamEvent, StreamRequest};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, Message>;
type WsSource = SplitStream<WsStream>;

/// Connection timeout for a single handshake attempt
const CONNECTION_TIMEOUT: Duration = Duration::from_secs(30);

/// Stream client configuration
#[derive(Debug, Clone)]
pub struct StreamConfig {
    /// Delay between reconnect attempts (ms). Fixed cadence; retries never
    /// stop until shutdown.
    pub reconnect_delay_ms: u64,
    /// Capacity of the event channel. Default: 1000
    pub event_channel_capacity: usize,
    /// Capacity of the command channel. Default: 100
    pub command_channel_capacity: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            reconnect_delay_ms: 2500,
            event_channel_capacity: 1000,
            command_channel_capacity: 100,
        }
    }
}

/// Connection state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Handshake in progress
    Connecting,
    /// Connected; subscriptions replayed
    Open,
    /// Dropped; a reconnect is scheduled
    ClosedWillRetry,
    /// Shut down; no further reconnects
    ClosedFinal,
}

/// Internal command for the connection task
enum ConnectionCommand {
    Send(String),
    Shutdown,
}

pin_project! {
    /// Streaming client for the NiceApe market-data feed.
    ///
    /// # Example
    ///
    /// ```ignore
    /// use niceape::stream::*;
    /// use futures_util::StreamExt;
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), StreamError> {
    ///     let mut client = NiceapeStreamClient::connect_default()?;
    ///
    ///     client.subscribe_txns(vec!["mint1".to_string()]).await?;
    ///
    ///     while let Some(event) = client.next().await {
    ///         if let StreamEvent::TradeActions { asset, trades } = event {
    ///             println!("{}: {} new trades", asset, trades.len());
    ///         }
    ///     }
    ///     Ok(())
    /// }
    /// ```
    pub struct NiceapeStreamClient {
        url: String,
        config: StreamConfig,
        registry: Arc<RwLock<SubscriptionRegistry>>,
        txn_caches: Arc<RwLock<HashMap<String, TxnCache>>>,
        chart: Arc<RwLock<Option<ChartTracker>>>,
        handler: Arc<MessageHandler>,
        should_reconnect: Arc<AtomicBool>,
        state_rx: watch::Receiver<ConnectionState>,
        cmd_tx: mpsc::Sender<ConnectionCommand>,
        #[pin]
        event_rx: mpsc::Receiver<StreamEvent>,
        connection_task_handle: Option<tokio::task::JoinHandle<()>>,
    }
}

impl NiceapeStreamClient {
    /// Connect to the default NiceApe stream server.
    pub fn connect_default() -> StreamResult<Self> {
        Self::connect(DEFAULT_STREAM_URL)
    }

    /// Connect to a stream server with default configuration.
    pub fn connect(url: &str) -> StreamResult<Self> {
        Self::connect_with_config(url, StreamConfig::default())
    }

    /// Connect to a stream server with custom configuration.
    ///
    /// Returns as soon as the connection task is running; the handshake
    /// happens in the background and a [`StreamEvent::Connected`] event is
    /// emitted once subscriptions have been replayed. Transport failures are
    /// never fatal; the task retries at a fixed cadence until
    /// [`shutdown`](Self::shutdown) is called.
    pub fn connect_with_config(url: &str, config: StreamConfig) -> StreamResult<Self> {
        // Reject malformed URLs up front; everything past this point retries.
        url.into_client_request()
            .map_err(|e| StreamError::InvalidUrl(e.to_string()))?;

        let (event_tx, event_rx) = mpsc::channel(config.event_channel_capacity);
        let (cmd_tx, cmd_rx) = mpsc::channel(config.command_channel_capacity);
        let (state_tx, state_rx) = watch::channel(ConnectionState::Connecting);

        let registry = Arc::new(RwLock::new(SubscriptionRegistry::new()));
        let txn_caches = Arc::new(RwLock::new(HashMap::new()));
        let chart = Arc::new(RwLock::new(None));
        let handler = Arc::new(MessageHandler::new(txn_caches.clone(), chart.clone()));
        let should_reconnect = Arc::new(AtomicBool::new(true));

        let ctx = ConnectionContext {
            url: url.to_string(),
            config: config.clone(),
            registry: registry.clone(),
            handler: handler.clone(),
            event_tx,
            state_tx,
            should_reconnect: should_reconnect.clone(),
        };

        let handle = tokio::spawn(connection_task(cmd_rx, ctx));

        Ok(Self {
            url: url.to_string(),
            config,
            registry,
            txn_caches,
            chart,
            handler,
            should_reconnect,
            state_rx,
            cmd_tx,
            event_rx,
            connection_task_handle: Some(handle),
        })
    }

    /// Subscribe to price/stat updates for liquidity pools.
    pub async fn subscribe_pools(&self, pools: Vec<String>) -> StreamResult<()> {
        self.registry.write().await.add_pools(&pools);
        self.send_request(&StreamRequest::SubscribePools { pools }).await
    }

    /// Unsubscribe from pool updates.
    pub async fn unsubscribe_pools(&self, pools: Vec<String>) -> StreamResult<()> {
        self.registry.write().await.remove_pools(&pools);
        self.send_request(&StreamRequest::UnsubscribePools { pools }).await
    }

    /// Subscribe to trade-event streams for assets.
    ///
    /// Each asset also gets a transaction cache that collects the newest
    /// trades as they stream in.
    pub async fn subscribe_txns(&self, assets: Vec<String>) -> StreamResult<()> {
        for asset in &assets {
            self.handler.init_txn_cache(asset).await;
        }
        self.registry.write().await.add_txn_assets(&assets);
        self.send_request(&StreamRequest::SubscribeTxns { assets }).await
    }

    /// Unsubscribe from trade-event streams.
    pub async fn unsubscribe_txns(&self, assets: Vec<String>) -> StreamResult<()> {
        for asset in &assets {
            self.handler.remove_txn_cache(asset).await;
        }
        self.registry.write().await.remove_txn_assets(&assets);
        self.send_request(&StreamRequest::UnsubscribeTxns { assets }).await
    }

    /// Subscribe to the new-token firehose, optionally scoped by
    /// partner-config filter keys.
    pub async fn subscribe_recent_list(
        &self,
        filters: Option<RecentListFilters>,
    ) -> StreamResult<()> {
        self.registry.write().await.subscribe_recent(filters.clone());
        self.send_request(&StreamRequest::SubscribeRecent { filters }).await
    }

    /// Unsubscribe from the new-token firehose.
    pub async fn unsubscribe_recent_list(&self) -> StreamResult<()> {
        self.registry.write().await.unsubscribe_recent();
        self.send_request(&StreamRequest::UnsubscribeRecent).await
    }

    /// Send a request if the connection is open.
    ///
    /// While the connection is down, subscription changes live only in the
    /// registry. Nothing is queued; the registry is replayed in full on the
    /// next open.
    async fn send_request(&self, request: &StreamRequest) -> StreamResult<()> {
        if *self.state_rx.borrow() != ConnectionState::Open {
            return Ok(());
        }
        let json = serde_json::to_string(request)?;
        self.cmd_tx
            .send(ConnectionCommand::Send(json))
            .await
            .map_err(|_| StreamError::ChannelClosed)
    }

    /// Point the live chart at an asset/interval pair.
    ///
    /// Pass a price multiplier (circulating supply) to chart market cap
    /// instead of price.
    pub async fn set_chart(
        &self,
        asset: impl Into<String>,
        interval: ChartTimeInterval,
        price_multiplier: Option<f64>,
    ) {
        let mut tracker = ChartTracker::new(asset, interval);
        if let Some(multiplier) = price_multiplier {
            tracker = tracker.with_price_multiplier(multiplier);
        }
        self.handler.set_chart(tracker).await;
    }

    /// Seed the live chart with fetched history bars.
    pub async fn apply_chart_history(&self, bars: &[Bar]) {
        let mut chart = self.chart.write().await;
        if let Some(tracker) = chart.as_mut() {
            tracker.apply_history(bars);
        }
    }

    /// Detach the live chart.
    pub async fn clear_chart(&self) {
        self.handler.clear_chart().await;
    }

    /// The live chart's bars, oldest first.
    pub async fn chart_bars(&self) -> Option<Vec<Bar>> {
        let chart = self.chart.read().await;
        chart.as_ref().map(|t| t.series().bars().to_vec())
    }

    /// The live chart's most recent bar.
    pub async fn latest_bar(&self) -> Option<Bar> {
        let chart = self.chart.read().await;
        chart.as_ref().and_then(|t| t.series().latest())
    }

    /// Cached trades for an asset, newest first.
    pub async fn token_txs(&self, asset: &str) -> Option<Vec<TradeEvent>> {
        let caches = self.txn_caches.read().await;
        caches.get(asset).map(|c| c.txs().cloned().collect())
    }

    /// Get the current connection state.
    pub fn connection_state(&self) -> ConnectionState {
        *self.state_rx.borrow()
    }

    /// Check if connected.
    pub fn is_open(&self) -> bool {
        self.connection_state() == ConnectionState::Open
    }

    /// Check if the connection task is still running.
    pub fn is_task_running(&self) -> bool {
        self.connection_task_handle
            .as_ref()
            .map(|h| !h.is_finished())
            .unwrap_or(false)
    }

    /// Shut down the connection permanently.
    ///
    /// Clears the reconnect flag before closing so a close racing with
    /// teardown cannot schedule another attempt, then waits for the
    /// connection task to finish.
    pub async fn shutdown(&mut self) -> StreamResult<()> {
        self.should_reconnect.store(false, Ordering::SeqCst);

        let _ = self.cmd_tx.send(ConnectionCommand::Shutdown).await;

        if let Some(handle) = self.connection_task_handle.take() {
            let _ = handle.await;
        }
        Ok(())
    }

    /// Get the stream URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Get the configuration.
    pub fn config(&self) -> &StreamConfig {
        &self.config
    }
}

impl Stream for NiceapeStreamClient {
    type Item = StreamEvent;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();
        this.event_rx.poll_recv(cx)
    }
}

/// Shared context for the connection task
struct ConnectionContext {
    url: String,
    config: StreamConfig,
    registry: Arc<RwLock<SubscriptionRegistry>>,
    handler: Arc<MessageHandler>,
    event_tx: mpsc::Sender<StreamEvent>,
    state_tx: watch::Sender<ConnectionState>,
    should_reconnect: Arc<AtomicBool>,
}

/// How one pass through the connection loop ended
enum LoopExit {
    /// Shutdown requested; stop for good
    Shutdown,
    /// Connection dropped; retry after the fixed delay
    Closed(String),
}

/// Connection task: connect, replay subscriptions, pump messages, reconnect.
async fn connection_task(mut cmd_rx: mpsc::Receiver<ConnectionCommand>, ctx: ConnectionContext) {
    let ConnectionContext {
        url,
        config,
        registry,
        handler,
        event_tx,
        state_tx,
        should_reconnect,
    } = ctx;

    loop {
        state_tx.send_replace(ConnectionState::Connecting);

        let ws_stream =
            match tokio::time::timeout(CONNECTION_TIMEOUT, connect_async(&url)).await {
                Ok(Ok((stream, _))) => stream,
                Ok(Err(e)) => {
                    tracing::warn!("Connect failed: {}", e);
                    let _ = event_tx
                        .send(StreamEvent::Error { error: StreamError::from(e) })
                        .await;
                    if wait_for_retry(&config, &mut cmd_rx, &should_reconnect, &state_tx, &event_tx)
                        .await
                    {
                        continue;
                    }
                    break;
                }
                Err(_) => {
                    tracing::warn!("Connect timed out");
                    let _ = event_tx
                        .send(StreamEvent::Error { error: StreamError::Timeout })
                        .await;
                    if wait_for_retry(&config, &mut cmd_rx, &should_reconnect, &state_tx, &event_tx)
                        .await
                    {
                        continue;
                    }
                    break;
                }
            };

        let (mut sink, mut source) = ws_stream.split();

        // Replay every tracked subscription on the fresh connection
        let requests = registry.read().await.replay_all();
        let mut replay_failed = false;
        for request in requests {
            match serde_json::to_string(&request) {
                Ok(json) => {
                    if let Err(e) = sink.send(Message::Text(json.into())).await {
                        tracing::warn!("Failed to replay subscription: {}", e);
                        replay_failed = true;
                        break;
                    }
                }
                Err(e) => tracing::warn!("Failed to encode subscription: {}", e),
            }
        }
        if replay_failed {
            if wait_for_retry(&config, &mut cmd_rx, &should_reconnect, &state_tx, &event_tx).await {
                continue;
            }
            break;
        }

        state_tx.send_replace(ConnectionState::Open);
        if event_tx.send(StreamEvent::Connected).await.is_err() {
            // Event receiver dropped; nobody is listening anymore
            return;
        }
        tracing::info!("Stream connected: {}", url);

        match run_connection(&mut sink, &mut source, &mut cmd_rx, &handler, &event_tx).await {
            LoopExit::Shutdown => break,
            LoopExit::Closed(reason) => {
                tracing::info!("Stream closed: {}", reason);
                let _ = event_tx.send(StreamEvent::Disconnected { reason }).await;
                if wait_for_retry(&config, &mut cmd_rx, &should_reconnect, &state_tx, &event_tx)
                    .await
                {
                    continue;
                }
                break;
            }
        }
    }

    state_tx.send_replace(ConnectionState::ClosedFinal);
}

/// Pump one open connection until it drops or shutdown is requested.
async fn run_connection(
    sink: &mut WsSink,
    source: &mut WsSource,
    cmd_rx: &mut mpsc::Receiver<ConnectionCommand>,
    handler: &Arc<MessageHandler>,
    event_tx: &mpsc::Sender<StreamEvent>,
) -> LoopExit {
    loop {
        tokio::select! {
            msg = source.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let events = handler.handle_message(&text).await;
                        for event in events {
                            // try_send so a slow consumer can't stall the connection
                            match event_tx.try_send(event) {
                                Ok(_) => {}
                                Err(mpsc::error::TrySendError::Full(dropped_event)) => {
                                    tracing::warn!(
                                        "Event channel full, dropping event: {:?}",
                                        std::mem::discriminant(&dropped_event)
                                    );
                                }
                                Err(mpsc::error::TrySendError::Closed(_)) => {
                                    tracing::debug!("Event receiver dropped");
                                    return LoopExit::Shutdown;
                                }
                            }
                        }
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if let Err(e) = sink.send(Message::Pong(data)).await {
                            tracing::warn!("Failed to send pong: {}", e);
                        }
                    }
                    Some(Ok(Message::Close(frame))) => {
                        let reason = frame
                            .as_ref()
                            .map(|f| format!("code: {}, reason: {}", f.code, f.reason))
                            .unwrap_or_else(|| "no reason".to_string());
                        return LoopExit::Closed(reason);
                    }
                    Some(Ok(_)) => {
                        // Ignore binary/pong/raw frames
                    }
                    Some(Err(e)) => {
                        // Force-close so every failure funnels through the
                        // same close-and-retry path
                        tracing::error!("Stream error: {}", e);
                        let _ = sink.close().await;
                        return LoopExit::Closed(e.to_string());
                    }
                    None => {
                        return LoopExit::Closed("Stream ended".to_string());
                    }
                }
            }

            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(ConnectionCommand::Send(text)) => {
                        if let Err(e) = sink.send(Message::Text(text.into())).await {
                            tracing::warn!("Failed to send message: {}", e);
                        }
                    }
                    Some(ConnectionCommand::Shutdown) | None => {
                        let _ = sink.send(Message::Close(Some(CloseFrame {
                            code: tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode::Normal,
                            reason: "Client shutdown".into(),
                        }))).await;
                        return LoopExit::Shutdown;
                    }
                }
            }
        }
    }
}

/// Wait out the fixed reconnect delay.
///
/// Returns `true` to reconnect, `false` to stop. Shutdown cancels the
/// pending delay immediately; sends arriving while disconnected are dropped,
/// never queued, since the registry replay covers them on the next open.
async fn wait_for_retry(
    config: &StreamConfig,
    cmd_rx: &mut mpsc::Receiver<ConnectionCommand>,
    should_reconnect: &Arc<AtomicBool>,
    state_tx: &watch::Sender<ConnectionState>,
    event_tx: &mpsc::Sender<StreamEvent>,
) -> bool {
    if !should_reconnect.load(Ordering::SeqCst) {
        return false;
    }

    state_tx.send_replace(ConnectionState::ClosedWillRetry);
    let _ = event_tx.send(StreamEvent::Reconnecting).await;

    let deadline = Instant::now() + Duration::from_millis(config.reconnect_delay_ms);
    loop {
        tokio::select! {
            _ = tokio::time::sleep_until(deadline) => {
                return should_reconnect.load(Ordering::SeqCst);
            }
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(ConnectionCommand::Send(_)) => {
                        // Not connected; skip the send and keep waiting
                    }
                    Some(ConnectionCommand::Shutdown) | None => {
                        return false;
                    }
                }
            }
        }
    }
}
