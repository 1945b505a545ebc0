//! # Decode Resource Manager
//!
//! Owns the single live decode session on behalf of the controller. The
//! manager enforces the engine contract so the state machine does not have
//! to: at most one instance is live, nothing is driven before the engine
//! reports ready, release is idempotent, and events from a superseded
//! session are identified and dropped by session id.

use crate::error::{PlaybackError, Result};
use bridge_traits::{EngineEvent, EngineFactory, MediaEngine, TrackSource};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

/// Identifier pairing engine events with the load they belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

struct Session {
    id: SessionId,
    engine: Box<dyn MediaEngine>,
    /// The engine reported `Ready`; start/pause/seek/volume are now valid.
    ready: bool,
    /// The engine is currently producing sound.
    started: bool,
}

/// Manager for the at-most-one live decode session.
pub struct EngineController {
    factory: Arc<dyn EngineFactory>,
    session: Option<Session>,
}

impl EngineController {
    pub fn new(factory: Arc<dyn EngineFactory>) -> Self {
        Self {
            factory,
            session: None,
        }
    }

    /// Replace the live session with a fresh load of `source`.
    ///
    /// Any previous session is released first; two sessions are never live
    /// at the same time. The engine's events are forwarded through
    /// `forward`, tagged with the new session id, until its stream closes.
    /// Fails synchronously only when the engine cannot be opened or rejects
    /// the reference outright; all later failures arrive as events.
    pub async fn load<F>(&mut self, source: &TrackSource, forward: F) -> Result<SessionId>
    where
        F: Fn(SessionId, EngineEvent) + Send + 'static,
    {
        self.release().await;

        let (engine, mut events) = self.factory.open().map_err(|err| PlaybackError::Load {
            src: source.to_string(),
            message: err.to_string(),
        })?;
        let id = SessionId::new();

        if let Err(err) = engine.load(source).await {
            let _ = engine.release().await;
            return Err(PlaybackError::Load {
                src: source.to_string(),
                message: err.to_string(),
            });
        }
        debug!(session = %id, %source, "decode session loading");

        tokio::spawn(async move {
            while let Some(event) = events.next().await {
                forward(id, event);
            }
        });

        self.session = Some(Session {
            id,
            engine,
            ready: false,
            started: false,
        });
        Ok(id)
    }

    /// Whether `id` names the current live session.
    pub fn is_live(&self, id: SessionId) -> bool {
        self.session.as_ref().is_some_and(|s| s.id == id)
    }

    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    pub fn is_started(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.started)
    }

    /// Record that the live session finished preparing.
    pub fn mark_ready(&mut self, id: SessionId) {
        if let Some(session) = self.session.as_mut() {
            if session.id == id {
                session.ready = true;
            }
        }
    }

    /// Begin or resume sound production. A no-op when already started.
    pub async fn start(&mut self) -> Result<()> {
        let session = self.ready_session("start")?;
        if !session.started {
            session.engine.start().await?;
            session.started = true;
        }
        Ok(())
    }

    /// Halt sound production, keeping position. A no-op when not started.
    pub async fn pause(&mut self) -> Result<()> {
        let session = self.ready_session("pause")?;
        if session.started {
            session.engine.pause().await?;
            session.started = false;
        }
        Ok(())
    }

    /// Seek the live session back to the beginning.
    pub async fn seek_to_start(&mut self) -> Result<()> {
        let session = self.ready_session("seek_to_start")?;
        session.engine.seek_to_start().await?;
        Ok(())
    }

    /// Set output gain on the live session.
    pub async fn set_volume(&mut self, volume: f32) -> Result<()> {
        let session = self.ready_session("set_volume")?;
        session.engine.set_volume(volume).await?;
        Ok(())
    }

    /// Release the live session, if any. Idempotent and always safe,
    /// including after a failure event.
    pub async fn release(&mut self) {
        if let Some(session) = self.session.take() {
            debug!(session = %session.id, "releasing decode session");
            if let Err(err) = session.engine.release().await {
                warn!(session = %session.id, %err, "engine release failed");
            }
        }
    }

    fn ready_session(&mut self, operation: &'static str) -> Result<&mut Session> {
        match self.session.as_mut() {
            None => Err(PlaybackError::Usage {
                operation,
                condition: "without a decode session",
            }),
            Some(session) if !session.ready => Err(PlaybackError::Usage {
                operation,
                condition: "before the session is ready",
            }),
            Some(session) => Ok(session),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::engine::EngineEventStream;
    use bridge_traits::error::{BridgeError, Result as BridgeResult};
    use parking_lot::Mutex;
    use std::sync::mpsc as std_mpsc;
    use tokio::sync::mpsc;

    struct TestEngine {
        calls: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl MediaEngine for TestEngine {
        async fn load(&self, source: &TrackSource) -> BridgeResult<()> {
            if source.as_str().is_empty() {
                return Err(BridgeError::MalformedSource("empty reference".into()));
            }
            self.calls.lock().push(format!("load {source}"));
            Ok(())
        }

        async fn start(&self) -> BridgeResult<()> {
            self.calls.lock().push("start".into());
            Ok(())
        }

        async fn pause(&self) -> BridgeResult<()> {
            self.calls.lock().push("pause".into());
            Ok(())
        }

        async fn seek_to_start(&self) -> BridgeResult<()> {
            self.calls.lock().push("seek".into());
            Ok(())
        }

        async fn set_volume(&self, volume: f32) -> BridgeResult<()> {
            self.calls.lock().push(format!("volume {volume}"));
            Ok(())
        }

        async fn release(&self) -> BridgeResult<()> {
            self.calls.lock().push("release".into());
            Ok(())
        }
    }

    struct TestStream {
        rx: mpsc::UnboundedReceiver<EngineEvent>,
    }

    #[async_trait]
    impl EngineEventStream for TestStream {
        async fn next(&mut self) -> Option<EngineEvent> {
            self.rx.recv().await
        }
    }

    struct TestFactory {
        calls: Arc<Mutex<Vec<String>>>,
        event_txs: Arc<Mutex<Vec<mpsc::UnboundedSender<EngineEvent>>>>,
    }

    impl TestFactory {
        fn new() -> Self {
            Self {
                calls: Arc::new(Mutex::new(Vec::new())),
                event_txs: Arc::new(Mutex::new(Vec::new())),
            }
        }
    }

    impl EngineFactory for TestFactory {
        fn open(&self) -> BridgeResult<(Box<dyn MediaEngine>, Box<dyn EngineEventStream>)> {
            let (tx, rx) = mpsc::unbounded_channel();
            self.event_txs.lock().push(tx);
            let engine = TestEngine {
                calls: self.calls.clone(),
            };
            Ok((Box::new(engine), Box::new(TestStream { rx })))
        }
    }

    #[tokio::test]
    async fn driving_before_ready_is_a_usage_error() {
        let factory = Arc::new(TestFactory::new());
        let mut controller = EngineController::new(factory.clone());

        assert!(controller.start().await.unwrap_err().is_usage());

        controller
            .load(&TrackSource::from("file:///a.mp3"), |_, _| {})
            .await
            .unwrap();
        assert!(controller.start().await.unwrap_err().is_usage());

        let id = factory.event_txs.lock().len();
        assert_eq!(id, 1);
    }

    #[tokio::test]
    async fn start_after_ready_is_tracked_and_idempotent() {
        let factory = Arc::new(TestFactory::new());
        let mut controller = EngineController::new(factory.clone());

        let id = controller
            .load(&TrackSource::from("file:///a.mp3"), |_, _| {})
            .await
            .unwrap();
        controller.mark_ready(id);

        controller.start().await.unwrap();
        controller.start().await.unwrap();
        assert!(controller.is_started());

        let starts = factory
            .calls
            .lock()
            .iter()
            .filter(|c| *c == "start")
            .count();
        assert_eq!(starts, 1);
    }

    #[tokio::test]
    async fn load_replaces_the_previous_session() {
        let factory = Arc::new(TestFactory::new());
        let mut controller = EngineController::new(factory.clone());

        let first = controller
            .load(&TrackSource::from("file:///a.mp3"), |_, _| {})
            .await
            .unwrap();
        let second = controller
            .load(&TrackSource::from("file:///b.mp3"), |_, _| {})
            .await
            .unwrap();

        assert!(!controller.is_live(first));
        assert!(controller.is_live(second));
        // The first engine was released before the second loaded.
        let calls = factory.calls.lock().clone();
        let release_at = calls.iter().position(|c| c == "release").unwrap();
        let second_load_at = calls.iter().position(|c| c == "load file:///b.mp3").unwrap();
        assert!(release_at < second_load_at);
    }

    #[tokio::test]
    async fn stale_session_events_are_identifiable() {
        let factory = Arc::new(TestFactory::new());
        let mut controller = EngineController::new(factory.clone());

        let (seen_tx, seen_rx) = std_mpsc::channel::<(SessionId, EngineEvent)>();
        let first = controller
            .load(&TrackSource::from("file:///a.mp3"), move |id, ev| {
                seen_tx.send((id, ev)).unwrap();
            })
            .await
            .unwrap();
        let _second = controller
            .load(&TrackSource::from("file:///b.mp3"), |_, _| {})
            .await
            .unwrap();

        // A late ready from the first engine still carries the first id.
        factory.event_txs.lock()[0].send(EngineEvent::Ready).unwrap();
        let (id, event) = tokio::task::spawn_blocking(move || seen_rx.recv().unwrap())
            .await
            .unwrap();
        assert_eq!(id, first);
        assert_eq!(event, EngineEvent::Ready);
        assert!(!controller.is_live(id));
    }

    #[tokio::test]
    async fn malformed_reference_fails_synchronously() {
        let factory = Arc::new(TestFactory::new());
        let mut controller = EngineController::new(factory);

        let err = controller
            .load(&TrackSource::from(""), |_, _| {})
            .await
            .unwrap_err();
        assert!(matches!(err, PlaybackError::Load { .. }));
        assert!(!controller.has_session());
    }

    #[tokio::test]
    async fn release_is_idempotent() {
        let factory = Arc::new(TestFactory::new());
        let mut controller = EngineController::new(factory.clone());

        let id = controller
            .load(&TrackSource::from("file:///a.mp3"), |_, _| {})
            .await
            .unwrap();
        controller.mark_ready(id);
        controller.release().await;
        controller.release().await;

        let releases = factory
            .calls
            .lock()
            .iter()
            .filter(|c| *c == "release")
            .count();
        assert_eq!(releases, 1);
    }
}
