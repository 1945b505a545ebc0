//! Shared mock adapters for the controller test suites.
//!
//! Every mock records its calls so tests can assert resource ordering, not
//! just end states.
#![allow(dead_code)]

use async_trait::async_trait;
use bridge_desktop::ProcessKeepalive;
use bridge_traits::engine::{EngineEventStream, MediaEngine};
use bridge_traits::error::{BridgeError, Result as BridgeResult};
use bridge_traits::{
    AudioFocusService, EngineEvent, EngineFactory, FocusChange, FocusChangeStream, FocusResponse,
    MediaCatalog, MediaItem, StatusNotifier, StatusUpdate, TrackMetadata, TrackSource,
    TransportControls, TransportState,
};
use core_playback::{ControllerHandle, Player};
use core_runtime::config::CoreConfig;
use core_runtime::events::PlayerEvent;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, watch};

// ============================================================================
// Decode engine mock
// ============================================================================

/// Factory plus a side channel to drive every opened engine from the test.
pub struct EngineHarness {
    calls: Mutex<Vec<String>>,
    senders: Mutex<Vec<mpsc::UnboundedSender<EngineEvent>>>,
    opened: AtomicUsize,
}

impl EngineHarness {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            senders: Mutex::new(Vec::new()),
            opened: AtomicUsize::new(0),
        })
    }

    /// Deliver an event to the engine opened `index`-th.
    pub fn emit(&self, index: usize, event: EngineEvent) {
        self.senders.lock()[index]
            .send(event)
            .expect("engine event stream dropped");
    }

    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn count(&self, needle: &str) -> usize {
        self.calls.lock().iter().filter(|c| *c == needle).count()
    }

    pub fn position(&self, needle: &str) -> Option<usize> {
        self.calls.lock().iter().position(|c| c == needle)
    }

    fn record(&self, entry: String) {
        self.calls.lock().push(entry);
    }
}

pub struct MockFactory {
    harness: Arc<EngineHarness>,
}

impl MockFactory {
    pub fn new(harness: Arc<EngineHarness>) -> Self {
        Self { harness }
    }
}

impl EngineFactory for MockFactory {
    fn open(&self) -> BridgeResult<(Box<dyn MediaEngine>, Box<dyn EngineEventStream>)> {
        let index = self.harness.opened.fetch_add(1, Ordering::SeqCst);
        let (tx, rx) = mpsc::unbounded_channel();
        self.harness.senders.lock().push(tx);
        let engine = MockEngine {
            index,
            harness: Arc::clone(&self.harness),
        };
        Ok((Box::new(engine), Box::new(MockEngineStream { rx })))
    }
}

struct MockEngine {
    index: usize,
    harness: Arc<EngineHarness>,
}

impl MockEngine {
    fn record(&self, call: &str) {
        self.harness.record(format!("e{}.{}", self.index, call));
    }
}

#[async_trait]
impl MediaEngine for MockEngine {
    async fn load(&self, source: &TrackSource) -> BridgeResult<()> {
        if source.as_str().starts_with("invalid:") {
            return Err(BridgeError::MalformedSource(source.to_string()));
        }
        self.record(&format!("load {source}"));
        Ok(())
    }

    async fn start(&self) -> BridgeResult<()> {
        self.record("start");
        Ok(())
    }

    async fn pause(&self) -> BridgeResult<()> {
        self.record("pause");
        Ok(())
    }

    async fn seek_to_start(&self) -> BridgeResult<()> {
        self.record("seek");
        Ok(())
    }

    async fn set_volume(&self, volume: f32) -> BridgeResult<()> {
        self.record(&format!("volume {volume}"));
        Ok(())
    }

    async fn release(&self) -> BridgeResult<()> {
        self.record("release");
        Ok(())
    }
}

struct MockEngineStream {
    rx: mpsc::UnboundedReceiver<EngineEvent>,
}

#[async_trait]
impl EngineEventStream for MockEngineStream {
    async fn next(&mut self) -> Option<EngineEvent> {
        self.rx.recv().await
    }
}

// ============================================================================
// Focus arbiter mock
// ============================================================================

pub struct MockFocus {
    requests: AtomicUsize,
    abandons: AtomicUsize,
    response: Mutex<FocusResponse>,
    changes_tx: mpsc::UnboundedSender<FocusChange>,
    changes_rx: Mutex<Option<mpsc::UnboundedReceiver<FocusChange>>>,
}

impl MockFocus {
    pub fn new() -> Arc<Self> {
        let (changes_tx, changes_rx) = mpsc::unbounded_channel();
        Arc::new(Self {
            requests: AtomicUsize::new(0),
            abandons: AtomicUsize::new(0),
            response: Mutex::new(FocusResponse::Granted),
            changes_tx,
            changes_rx: Mutex::new(Some(changes_rx)),
        })
    }

    pub fn set_response(&self, response: FocusResponse) {
        *self.response.lock() = response;
    }

    /// Push a revocation/grant as the arbiter would.
    pub fn push(&self, change: FocusChange) {
        self.changes_tx.send(change).expect("focus stream dropped");
    }

    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    pub fn abandons(&self) -> usize {
        self.abandons.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AudioFocusService for MockFocus {
    async fn request_focus(&self) -> BridgeResult<FocusResponse> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        Ok(*self.response.lock())
    }

    async fn abandon_focus(&self) -> BridgeResult<bool> {
        self.abandons.fetch_add(1, Ordering::SeqCst);
        Ok(true)
    }

    async fn subscribe_changes(&self) -> BridgeResult<Box<dyn FocusChangeStream>> {
        let rx = self
            .changes_rx
            .lock()
            .take()
            .expect("subscribe_changes called twice");
        Ok(Box::new(MockFocusStream { rx }))
    }
}

struct MockFocusStream {
    rx: mpsc::UnboundedReceiver<FocusChange>,
}

#[async_trait]
impl FocusChangeStream for MockFocusStream {
    async fn next(&mut self) -> Option<FocusChange> {
        self.rx.recv().await
    }
}

// ============================================================================
// Catalog mock
// ============================================================================

/// Catalog whose "random" pick consumes items front to back, so tests can
/// script which item each load receives.
pub struct MockCatalog {
    items: Mutex<VecDeque<MediaItem>>,
    ready_tx: watch::Sender<bool>,
    picks: AtomicUsize,
}

impl MockCatalog {
    pub fn ready_now(items: Vec<MediaItem>) -> Arc<Self> {
        let (ready_tx, _) = watch::channel(true);
        Arc::new(Self {
            items: Mutex::new(items.into()),
            ready_tx,
            picks: AtomicUsize::new(0),
        })
    }

    pub fn indexing(items: Vec<MediaItem>) -> Arc<Self> {
        let (ready_tx, _) = watch::channel(false);
        Arc::new(Self {
            items: Mutex::new(items.into()),
            ready_tx,
            picks: AtomicUsize::new(0),
        })
    }

    /// Finish the simulated indexing phase.
    pub fn complete(&self) {
        let _ = self.ready_tx.send(true);
    }

    pub fn picks(&self) -> usize {
        self.picks.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MediaCatalog for MockCatalog {
    async fn ready(&self) {
        let mut rx = self.ready_tx.subscribe();
        while !*rx.borrow() {
            if rx.changed().await.is_err() {
                break;
            }
        }
    }

    async fn random_item(&self) -> BridgeResult<Option<MediaItem>> {
        self.picks.fetch_add(1, Ordering::SeqCst);
        Ok(self.items.lock().pop_front())
    }
}

// ============================================================================
// Notification sink mocks
// ============================================================================

#[derive(Default)]
pub struct RecordingStatus {
    calls: Mutex<Vec<String>>,
}

impl RecordingStatus {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn last_published(&self) -> Option<String> {
        self.calls
            .lock()
            .iter()
            .rev()
            .find(|c| c.starts_with("publish:"))
            .map(|c| c["publish:".len()..].to_string())
    }
}

#[async_trait]
impl StatusNotifier for RecordingStatus {
    async fn publish(&self, update: StatusUpdate) -> BridgeResult<()> {
        self.calls.lock().push(format!("publish:{}", update.phase_text));
        Ok(())
    }

    async fn clear(&self) -> BridgeResult<()> {
        self.calls.lock().push("clear".to_string());
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingTransport {
    calls: Mutex<Vec<String>>,
}

impl RecordingTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn last_state(&self) -> Option<String> {
        self.calls
            .lock()
            .iter()
            .rev()
            .find(|c| c.starts_with("state:"))
            .map(|c| c["state:".len()..].to_string())
    }
}

#[async_trait]
impl TransportControls for RecordingTransport {
    async fn register(&self) -> BridgeResult<()> {
        self.calls.lock().push("register".to_string());
        Ok(())
    }

    async fn set_playback_state(&self, state: TransportState) -> BridgeResult<()> {
        self.calls.lock().push(format!("state:{state:?}"));
        Ok(())
    }

    async fn set_metadata(&self, metadata: TrackMetadata) -> BridgeResult<()> {
        self.calls.lock().push(format!(
            "metadata:{}",
            metadata.title.as_deref().unwrap_or("<none>")
        ));
        Ok(())
    }
}

// ============================================================================
// Test rig
// ============================================================================

pub struct TestRig {
    pub player: Player,
    pub handle: ControllerHandle,
    pub events: broadcast::Receiver<PlayerEvent>,
    pub engines: Arc<EngineHarness>,
    pub focus: Arc<MockFocus>,
    pub catalog: Arc<MockCatalog>,
    pub keepalive: Arc<ProcessKeepalive>,
    pub status: Arc<RecordingStatus>,
    pub transport: Arc<RecordingTransport>,
}

pub fn rig(catalog: Arc<MockCatalog>) -> TestRig {
    let engines = EngineHarness::new();
    let focus = MockFocus::new();
    let keepalive = Arc::new(ProcessKeepalive::new());
    let status = RecordingStatus::new();
    let transport = RecordingTransport::new();

    let config = CoreConfig::builder()
        .engine_factory(Arc::new(MockFactory::new(Arc::clone(&engines))))
        .catalog(Arc::clone(&catalog) as Arc<dyn MediaCatalog>)
        .focus(Arc::clone(&focus) as Arc<dyn AudioFocusService>)
        .keepalive(Arc::clone(&keepalive) as Arc<dyn bridge_traits::NetworkKeepalive>)
        .status(Arc::clone(&status) as Arc<dyn StatusNotifier>)
        .transport(Arc::clone(&transport) as Arc<dyn TransportControls>)
        .build()
        .expect("test config must build");

    let player = Player::spawn(config);
    let handle = player.handle();
    let events = player.events().subscribe();

    TestRig {
        player,
        handle,
        events,
        engines,
        focus,
        catalog,
        keepalive,
        status,
        transport,
    }
}

pub fn item(title: &str, reference: &str) -> MediaItem {
    MediaItem {
        title: Some(title.to_string()),
        artist: Some("Test Artist".to_string()),
        album: Some("Test Album".to_string()),
        duration: Some(Duration::from_secs(180)),
        source: TrackSource::from(reference),
    }
}

// ============================================================================
// Waiting helpers
// ============================================================================

const WAIT_TIMEOUT: Duration = Duration::from_secs(5);

/// Receive bus events until one matches `pred`.
pub async fn wait_for_event<F>(rx: &mut broadcast::Receiver<PlayerEvent>, pred: F) -> PlayerEvent
where
    F: Fn(&PlayerEvent) -> bool,
{
    tokio::time::timeout(WAIT_TIMEOUT, async {
        loop {
            match rx.recv().await {
                Ok(event) if pred(&event) => return event,
                Ok(_) => continue,
                Err(err) => panic!("event bus closed while waiting: {err}"),
            }
        }
    })
    .await
    .expect("timed out waiting for player event")
}

/// Poll `cond` until it holds.
pub async fn wait_until<F>(mut cond: F)
where
    F: FnMut() -> bool,
{
    tokio::time::timeout(WAIT_TIMEOUT, async {
        while !cond() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("timed out waiting for condition")
}

/// Poll snapshots until the controller reaches `want`.
pub async fn wait_for_state(handle: &ControllerHandle, want: core_playback::PlaybackState) {
    tokio::time::timeout(WAIT_TIMEOUT, async {
        loop {
            let snapshot = handle.snapshot().await.expect("controller gone");
            if snapshot.state == want {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("timed out waiting for playback state")
}
