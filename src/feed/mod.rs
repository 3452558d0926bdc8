//! Live feed subscriber
//!
//! Keeps a WebSocket to the backend's results channel open and folds every
//! frame into a capped, persisted [`FeedLog`].
//!
//! # Tasks
//!
//! ```text
//!  connection loop ──raw frames──▶ writer ──▶ FeedLog (Arc<Mutex>) ──▶ store
//!        │                           │
//!        ▼                           ▼
//!   watch<FeedState>           watch<u64> revision
//! ```
//!
//! The connection loop only moves text off the socket. The writer is the
//! single task that mutates the log: decode, validate, append, truncate and
//! persist all happen before it takes the next frame, so the persisted copy
//! is always a consistent snapshot.
//!
//! The log is rehydrated from the store before either task starts, so the
//! first render after a restart already shows the last known entries.

pub mod log;

pub use log::{FeedEntry, FeedLog, DEFAULT_CAPACITY};

use crate::storage::SharedStore;
use futures::StreamExt;
use serde_json::Value;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, tungstenite::Message};

/// Connection state as shown in the live results header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedState {
    Connecting { attempt: u32 },
    Open,
    ClosedWillRetry { attempt: u32, retry_in: Duration },
    ClosedFinal,
}

impl FeedState {
    pub fn label(&self) -> String {
        match self {
            FeedState::Connecting { attempt: 0 } => "Connecting".to_string(),
            FeedState::Connecting { attempt } => format!("Reconnecting (attempt {})", attempt),
            FeedState::Open => "Open".to_string(),
            FeedState::ClosedWillRetry { retry_in, .. } => {
                format!("Closed, retrying in {:.1}s", retry_in.as_secs_f32())
            }
            FeedState::ClosedFinal => "Closed".to_string(),
        }
    }
}

/// Reconnect and capacity settings
#[derive(Debug, Clone)]
pub struct FeedConfig {
    pub capacity: usize,
    pub reconnect_base: Duration,
    pub reconnect_max: Duration,
    /// `None` = retry forever
    pub max_attempts: Option<u32>,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            reconnect_base: Duration::from_secs(1),
            reconnect_max: Duration::from_secs(30),
            max_attempts: None,
        }
    }
}

/// Delay before reconnect attempt `attempt` (1-based): base * 2^(attempt-1), capped
pub fn backoff_delay(attempt: u32, base: Duration, max: Duration) -> Duration {
    let exponent = attempt.saturating_sub(1).min(16);
    base.saturating_mul(2u32.saturating_pow(exponent)).min(max)
}

/// Why a frame was not appended
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("not JSON: {0}")]
    NotJson(String),
    #[error("payload is not an object")]
    NotAnObject,
}

/// Decode one frame into an entry
///
/// The backend republishes Redis payloads, which arrive either as a JSON
/// object or as a JSON string whose contents are the object. Both are
/// accepted; anything that does not end up as a non-null object is
/// rejected.
pub fn decode_frame(text: &str) -> Result<FeedEntry, DecodeError> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| DecodeError::NotJson(e.to_string()))?;

    let value = match value {
        Value::String(inner) => {
            serde_json::from_str(&inner).map_err(|e| DecodeError::NotJson(e.to_string()))?
        }
        other => other,
    };

    match value {
        Value::Object(fields) => Ok(FeedEntry::new(fields)),
        _ => Err(DecodeError::NotAnObject),
    }
}

/// Running subscriber; dropping it detaches the handler and closes the socket
pub struct FeedHandle {
    log: Arc<Mutex<FeedLog>>,
    state: watch::Receiver<FeedState>,
    revision: watch::Receiver<u64>,
    tasks: Vec<JoinHandle<()>>,
}

impl FeedHandle {
    /// Rehydrate the log, then start the writer and connection tasks
    pub fn start(url: impl Into<String>, store: SharedStore, config: FeedConfig) -> Self {
        let url = url.into();

        // Rehydrate before any network frame can be processed
        let log = Arc::new(Mutex::new(FeedLog::load(store.as_ref(), config.capacity)));

        let (frame_tx, frame_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(FeedState::Connecting { attempt: 0 });
        let (revision_tx, revision_rx) = watch::channel(0u64);

        let writer = tokio::spawn(writer_loop(frame_rx, Arc::clone(&log), store, revision_tx));
        let connection = tokio::spawn(connection_loop(url, frame_tx, state_tx, config));

        Self {
            log,
            state: state_rx,
            revision: revision_rx,
            tasks: vec![writer, connection],
        }
    }

    /// Entries for display, most recent first
    pub fn entries_newest_first(&self) -> Vec<FeedEntry> {
        match self.log.lock() {
            Ok(log) => log.newest_first(),
            Err(e) => {
                tracing::error!("Feed log lock poisoned: {}", e);
                Vec::new()
            }
        }
    }

    /// Entries appended after the cursor `seen` (oldest first) and the new cursor
    pub fn entries_since(&self, seen: u64) -> (Vec<FeedEntry>, u64) {
        match self.log.lock() {
            Ok(log) => (log.since(seen), log.appended()),
            Err(e) => {
                tracing::error!("Feed log lock poisoned: {}", e);
                (Vec::new(), seen)
            }
        }
    }

    pub fn len(&self) -> usize {
        self.log.lock().map(|log| log.len()).unwrap_or(0)
    }

    pub fn state(&self) -> FeedState {
        *self.state.borrow()
    }

    /// Receiver for connection state changes
    pub fn state_receiver(&self) -> watch::Receiver<FeedState> {
        self.state.clone()
    }

    /// Receiver bumped once per processed frame
    pub fn revision_receiver(&self) -> watch::Receiver<u64> {
        self.revision.clone()
    }

    /// Stop applying frames and drop the connection
    pub fn shutdown(mut self) {
        self.abort_tasks();
    }

    fn abort_tasks(&mut self) {
        for task in self.tasks.drain(..) {
            task.abort();
        }
    }
}

impl Drop for FeedHandle {
    fn drop(&mut self) {
        self.abort_tasks();
    }
}

/// Single writer: the only code path that mutates the feed log
async fn writer_loop(
    mut frames: mpsc::UnboundedReceiver<String>,
    log: Arc<Mutex<FeedLog>>,
    store: SharedStore,
    revision: watch::Sender<u64>,
) {
    while let Some(frame) = frames.recv().await {
        apply_frame(&frame, &log, store.as_ref());
        revision.send_modify(|r| *r += 1);
    }
    tracing::debug!("Feed writer stopped");
}

/// Decode, validate, append, truncate and persist one frame
fn apply_frame(frame: &str, log: &Mutex<FeedLog>, store: &dyn crate::storage::Store) {
    let entry = match decode_frame(frame) {
        Ok(entry) => entry,
        Err(e) => {
            tracing::warn!("Dropping feed message: {}", e);
            return;
        }
    };

    let mut log = match log.lock() {
        Ok(log) => log,
        Err(e) => {
            tracing::error!("Feed log lock poisoned: {}", e);
            return;
        }
    };

    log.push(entry);
    if let Err(e) = log.persist(store) {
        tracing::error!("Failed to persist feed: {:#}", e);
    }
}

/// Outcome of one connection attempt
enum ConnectionEnd {
    /// The writer is gone; nothing left to deliver to
    Detached,
    /// Socket failed or closed; `opened` tells whether it ever got going
    Lost { opened: bool, reason: String },
}

async fn connection_loop(
    url: String,
    frames: mpsc::UnboundedSender<String>,
    state: watch::Sender<FeedState>,
    config: FeedConfig,
) {
    let mut attempt: u32 = 0;

    loop {
        state.send_replace(FeedState::Connecting { attempt });

        match run_connection(&url, &frames, &state).await {
            ConnectionEnd::Detached => {
                state.send_replace(FeedState::ClosedFinal);
                break;
            }
            ConnectionEnd::Lost { opened, reason } => {
                // A session that actually opened starts the backoff over
                if opened {
                    attempt = 0;
                }
                attempt = attempt.saturating_add(1);
                tracing::warn!("Live feed connection lost (attempt {}): {}", attempt, reason);

                if let Some(max) = config.max_attempts {
                    if attempt > max {
                        tracing::error!("Live feed giving up after {} attempts", max);
                        state.send_replace(FeedState::ClosedFinal);
                        break;
                    }
                }

                let retry_in = backoff_delay(attempt, config.reconnect_base, config.reconnect_max);
                state.send_replace(FeedState::ClosedWillRetry { attempt, retry_in });
                tokio::time::sleep(retry_in).await;
            }
        }
    }
}

async fn run_connection(
    url: &str,
    frames: &mpsc::UnboundedSender<String>,
    state: &watch::Sender<FeedState>,
) -> ConnectionEnd {
    let (ws_stream, _) = match connect_async(url).await {
        Ok(conn) => conn,
        Err(e) => {
            return ConnectionEnd::Lost {
                opened: false,
                reason: format!("connect: {}", e),
            }
        }
    };

    tracing::info!("Live feed connected to {}", url);
    state.send_replace(FeedState::Open);

    // Outbound half is unused; pings are answered by tungstenite
    let (_write, mut read) = ws_stream.split();

    loop {
        let text = match read.next().await {
            Some(Ok(Message::Text(text))) => text,
            Some(Ok(Message::Binary(bytes))) => match String::from_utf8(bytes) {
                Ok(text) => text,
                Err(_) => {
                    tracing::warn!("Dropping non-UTF-8 binary feed frame");
                    continue;
                }
            },
            Some(Ok(Message::Close(_))) | None => {
                return ConnectionEnd::Lost {
                    opened: true,
                    reason: "closed by server".to_string(),
                }
            }
            Some(Err(e)) => {
                return ConnectionEnd::Lost {
                    opened: true,
                    reason: format!("read: {}", e),
                }
            }
            Some(Ok(_)) => continue, // Ping/Pong/raw frames
        };

        if frames.send(text).is_err() {
            return ConnectionEnd::Detached;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStore, Store, FEED_KEY};
    use futures::SinkExt;
    use serde_json::json;
    use tokio::net::TcpListener;

    #[test]
    fn test_decode_object_frame() {
        let entry = decode_frame(r#"{"news":{"title":"A"},"task":{"result":true}}"#).unwrap();
        assert_eq!(entry.news_title(), Some("A"));
        assert_eq!(entry.result(), Some(true));
    }

    #[test]
    fn test_decode_string_encoded_frame() {
        let inner = r#"{"news":{"title":"B"}}"#;
        let frame = serde_json::to_string(inner).unwrap();
        let entry = decode_frame(&frame).unwrap();
        assert_eq!(entry.news_title(), Some("B"));
    }

    #[test]
    fn test_decode_rejects_non_objects() {
        assert_eq!(decode_frame("null"), Err(DecodeError::NotAnObject));
        assert_eq!(decode_frame("[1,2]"), Err(DecodeError::NotAnObject));
        assert_eq!(decode_frame("\"null\""), Err(DecodeError::NotAnObject));
        assert!(matches!(decode_frame("{oops"), Err(DecodeError::NotJson(_))));
        assert!(matches!(
            decode_frame("\"not json inside\""),
            Err(DecodeError::NotJson(_))
        ));
        assert_eq!(DecodeError::NotAnObject.to_string(), "payload is not an object");
        assert_eq!(
            DecodeError::NotJson("eof".into()).to_string(),
            "not JSON: eof"
        );
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        let base = Duration::from_secs(1);
        let max = Duration::from_secs(30);
        assert_eq!(backoff_delay(1, base, max), Duration::from_secs(1));
        assert_eq!(backoff_delay(2, base, max), Duration::from_secs(2));
        assert_eq!(backoff_delay(3, base, max), Duration::from_secs(4));
        assert_eq!(backoff_delay(5, base, max), Duration::from_secs(16));
        assert_eq!(backoff_delay(6, base, max), max);
        assert_eq!(backoff_delay(u32::MAX, base, max), max);
    }

    #[test]
    fn test_apply_frame_persists_each_append() {
        let store = MemoryStore::new();
        let log = Mutex::new(FeedLog::new(2));

        apply_frame(r#"{"n":1}"#, &log, &store);
        apply_frame("garbage", &log, &store);
        apply_frame(r#"{"n":2}"#, &log, &store);
        apply_frame(r#"{"n":3}"#, &log, &store);

        let persisted: Vec<Value> =
            serde_json::from_str(&store.get(FEED_KEY).unwrap().unwrap()).unwrap();
        assert_eq!(persisted, vec![json!({"n": 2}), json!({"n": 3})]);
    }

    fn fast_config() -> FeedConfig {
        FeedConfig {
            capacity: DEFAULT_CAPACITY,
            reconnect_base: Duration::from_millis(10),
            reconnect_max: Duration::from_millis(50),
            max_attempts: None,
        }
    }

    async fn wait_for_revision(rx: &mut watch::Receiver<u64>, target: u64) {
        tokio::time::timeout(Duration::from_secs(10), async {
            while *rx.borrow_and_update() < target {
                rx.changed().await.unwrap();
            }
        })
        .await
        .expect("feed did not process frames in time");
    }

    /// Serve `frames` to the first client, then close
    async fn serve_frames(frames: Vec<String>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
            for frame in frames {
                ws.send(Message::Text(frame)).await.unwrap();
            }
            let _ = ws.close(None).await;
        });
        format!("ws://{}/api/news_task/ws", addr)
    }

    #[tokio::test]
    async fn test_stream_of_more_than_capacity_keeps_last_100() {
        let mut frames: Vec<String> = (0..130)
            .map(|n| json!({"news": {"title": format!("n{}", n)}, "task": {"id": n}}).to_string())
            .collect();
        // One string-encoded payload and one rejected frame in the middle
        frames[60] = serde_json::to_string(&frames[60]).unwrap();
        frames.insert(61, "null".to_string());
        let total = frames.len() as u64;

        let url = serve_frames(frames).await;
        let store = MemoryStore::shared();
        let feed = FeedHandle::start(url, store.clone(), fast_config());
        let mut revision = feed.revision_receiver();
        wait_for_revision(&mut revision, total).await;

        let newest = feed.entries_newest_first();
        assert_eq!(newest.len(), 100);
        assert_eq!(newest[0].task_id(), Some(129));
        assert_eq!(newest[99].task_id(), Some(30));

        let persisted: Vec<Value> =
            serde_json::from_str(&store.get(FEED_KEY).unwrap().unwrap()).unwrap();
        let ids: Vec<i64> = persisted
            .iter()
            .map(|v| v["task"]["id"].as_i64().unwrap())
            .collect();
        assert_eq!(ids, (30..130).collect::<Vec<i64>>());

        feed.shutdown();
    }

    #[tokio::test]
    async fn test_rehydrates_before_network() {
        let store = MemoryStore::shared();
        let persisted: Vec<Value> = (0..5).map(|n| json!({"task": {"id": n}})).collect();
        store
            .set(FEED_KEY, &serde_json::to_string(&persisted).unwrap())
            .unwrap();

        // Port 9 refuses connections; entries must come from the store alone
        let feed = FeedHandle::start("ws://127.0.0.1:9/ws", store, fast_config());
        let ids: Vec<i64> = feed
            .entries_newest_first()
            .iter()
            .filter_map(FeedEntry::task_id)
            .collect();
        assert_eq!(ids, vec![4, 3, 2, 1, 0]);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let config = FeedConfig {
            max_attempts: Some(2),
            ..fast_config()
        };
        let feed = FeedHandle::start("ws://127.0.0.1:9/ws", MemoryStore::shared(), config);
        let mut state = feed.state_receiver();

        tokio::time::timeout(Duration::from_secs(10), async {
            while *state.borrow_and_update() != FeedState::ClosedFinal {
                state.changed().await.unwrap();
            }
        })
        .await
        .expect("feed never reached ClosedFinal");
    }

    #[tokio::test]
    async fn test_reconnects_after_server_close() {
        let url = serve_frames(vec![json!({"n": 1}).to_string()]).await;
        let feed = FeedHandle::start(url, MemoryStore::shared(), fast_config());
        let mut state = feed.state_receiver();

        tokio::time::timeout(Duration::from_secs(10), async {
            loop {
                if matches!(*state.borrow_and_update(), FeedState::ClosedWillRetry { .. }) {
                    break;
                }
                state.changed().await.unwrap();
            }
        })
        .await
        .expect("feed did not schedule a reconnect");

        assert_eq!(feed.len(), 1);
    }

    #[test]
    fn test_state_labels() {
        assert_eq!(FeedState::Open.label(), "Open");
        assert_eq!(FeedState::Connecting { attempt: 0 }.label(), "Connecting");
        assert_eq!(
            FeedState::ClosedWillRetry {
                attempt: 2,
                retry_in: Duration::from_millis(2500)
            }
            .label(),
            "Closed, retrying in 2.5s"
        );
    }
}
