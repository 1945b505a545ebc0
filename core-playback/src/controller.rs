//! # Playback State Machine
//!
//! The controller is the single owner of playback state. Commands from the
//! host and events from the adapters (decode engine, focus arbiter, catalog)
//! are delivered as messages into one inbox and processed strictly in
//! arrival order by one task; nothing mutates controller state from outside
//! that task. Asynchronous work never blocks the loop: each suspension is
//! "issue request, return, resume on a later message".
//!
//! Lifecycle: [`Player::spawn`] starts the task, [`Player::shutdown`] (or
//! dropping every [`ControllerHandle`]) forces a full stop and releases
//! focus, the keepalive token and the decode session unconditionally.
//!
//! Commands that arrive while the catalog is still indexing are deferred in
//! a single [`PendingRequest`] slot and consumed exactly once when the
//! catalog becomes ready. A command that supersedes an in-flight load
//! releases the stale decode session first; late events from that session
//! are discarded by session id.

use crate::engine::{EngineController, SessionId};
use crate::error::{PlaybackError, Result};
use crate::types::{
    AudioFocus, NowPlaying, PauseReason, PendingRequest, PlaybackState, StateSnapshot,
};
use bridge_traits::{
    AudioFocusService, EngineEvent, FocusChange, FocusResponse, MediaCatalog, MediaItem,
    NetworkKeepalive, StatusNotifier, StatusUpdate, TrackMetadata, TrackSource, TransportControls,
    TransportState,
};
use core_runtime::config::CoreConfig;
use core_runtime::events::{EventBus, PlayerEvent};
use std::ops::ControlFlow;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Gain applied when focus permits playback at full volume.
const FULL_VOLUME: f32 = 1.0;

/// Commands accepted by the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Play,
    Pause,
    /// Play when paused or stopped, pause otherwise.
    TogglePlayback,
    Stop,
    /// Drop the current item and load a new random one.
    Skip,
    /// Seek the current item back to its start.
    Rewind,
    /// Play a specific reference instead of a random pick.
    PlayExplicit(TrackSource),
    /// Force a full stop and end the controller task.
    Shutdown,
}

enum Msg {
    Command(Command),
    Engine(SessionId, EngineEvent),
    Focus(FocusChange),
    CatalogReady,
    Snapshot(oneshot::Sender<StateSnapshot>),
}

/// Cloneable command surface of a running controller.
#[derive(Clone)]
pub struct ControllerHandle {
    tx: mpsc::UnboundedSender<Msg>,
}

impl ControllerHandle {
    pub fn play(&self) -> Result<()> {
        self.command(Command::Play)
    }

    pub fn pause(&self) -> Result<()> {
        self.command(Command::Pause)
    }

    pub fn toggle_playback(&self) -> Result<()> {
        self.command(Command::TogglePlayback)
    }

    pub fn stop(&self) -> Result<()> {
        self.command(Command::Stop)
    }

    pub fn skip(&self) -> Result<()> {
        self.command(Command::Skip)
    }

    pub fn rewind(&self) -> Result<()> {
        self.command(Command::Rewind)
    }

    pub fn play_explicit(&self, reference: impl Into<TrackSource>) -> Result<()> {
        self.command(Command::PlayExplicit(reference.into()))
    }

    /// Post any command to the controller inbox.
    pub fn command(&self, command: Command) -> Result<()> {
        self.send(Msg::Command(command))
    }

    /// Current controller state. Also acts as a barrier: the returned
    /// snapshot reflects every message posted before this call.
    pub async fn snapshot(&self) -> Result<StateSnapshot> {
        let (tx, rx) = oneshot::channel();
        self.send(Msg::Snapshot(tx))?;
        rx.await.map_err(|_| PlaybackError::ControllerClosed)
    }

    fn send(&self, msg: Msg) -> Result<()> {
        self.tx.send(msg).map_err(|_| PlaybackError::ControllerClosed)
    }
}

/// A spawned playback controller.
pub struct Player {
    handle: ControllerHandle,
    events: EventBus,
    task: JoinHandle<()>,
}

impl Player {
    /// Start the controller task and its adapter watchers.
    pub fn spawn(config: CoreConfig) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let events = EventBus::new(config.event_capacity);

        // The catalog signals readiness once; duplicates are ignored by the
        // state machine anyway.
        let catalog = Arc::clone(&config.catalog);
        let inbox = tx.downgrade();
        tokio::spawn(async move {
            catalog.ready().await;
            if let Some(tx) = inbox.upgrade() {
                let _ = tx.send(Msg::CatalogReady);
            }
        });

        // Focus revocations can arrive at any time, independent of commands.
        let focus = Arc::clone(&config.focus);
        let inbox = tx.downgrade();
        tokio::spawn(async move {
            let mut stream = match focus.subscribe_changes().await {
                Ok(stream) => stream,
                Err(err) => {
                    warn!(%err, "focus change stream unavailable");
                    return;
                }
            };
            while let Some(change) = stream.next().await {
                let Some(tx) = inbox.upgrade() else { break };
                if tx.send(Msg::Focus(change)).is_err() {
                    break;
                }
            }
        });

        let controller = Controller::new(config, events.clone(), tx.downgrade());
        let task = tokio::spawn(controller.run(rx));

        Self {
            handle: ControllerHandle { tx },
            events,
            task,
        }
    }

    pub fn handle(&self) -> ControllerHandle {
        self.handle.clone()
    }

    /// Bus carrying [`PlayerEvent`]s for in-process listeners.
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Force a full stop, release every held resource and end the task.
    pub async fn shutdown(self) -> Result<()> {
        // A controller whose handles were all dropped has already torn down.
        let _ = self.handle.command(Command::Shutdown);
        drop(self.handle);
        self.task.await.map_err(|_| PlaybackError::ControllerClosed)
    }
}

struct Controller {
    state: PlaybackState,
    focus: AudioFocus,
    pause_reason: PauseReason,
    pending: Option<PendingRequest>,
    now_playing: Option<NowPlaying>,
    is_streaming: bool,
    transport_registered: bool,
    engine: EngineController,
    inbox: mpsc::WeakUnboundedSender<Msg>,
    focus_service: Arc<dyn AudioFocusService>,
    keepalive: Arc<dyn NetworkKeepalive>,
    catalog: Arc<dyn MediaCatalog>,
    status: Arc<dyn StatusNotifier>,
    transport: Arc<dyn TransportControls>,
    events: EventBus,
    service_label: String,
    duck_volume: f32,
}

impl Controller {
    fn new(config: CoreConfig, events: EventBus, inbox: mpsc::WeakUnboundedSender<Msg>) -> Self {
        Self {
            state: PlaybackState::Retrieving,
            focus: AudioFocus::NoFocusNoDuck,
            pause_reason: PauseReason::UserRequest,
            pending: None,
            now_playing: None,
            is_streaming: false,
            transport_registered: false,
            engine: EngineController::new(Arc::clone(&config.engine_factory)),
            inbox,
            focus_service: Arc::clone(&config.focus),
            keepalive: Arc::clone(&config.keepalive),
            catalog: Arc::clone(&config.catalog),
            status: Arc::clone(&config.status),
            transport: Arc::clone(&config.transport),
            events,
            service_label: config.service_label.clone(),
            duck_volume: config.duck_volume,
        }
    }

    async fn run(mut self, mut rx: mpsc::UnboundedReceiver<Msg>) {
        info!("playback controller started");
        while let Some(msg) = rx.recv().await {
            if self.handle_msg(msg).await.is_break() {
                break;
            }
        }
        // Explicit shutdown and dropped handles take the same teardown path:
        // force a stop so nothing stays held.
        self.process_stop(true).await;
        info!("playback controller stopped");
    }

    async fn handle_msg(&mut self, msg: Msg) -> ControlFlow<()> {
        match msg {
            Msg::Command(Command::Shutdown) => return ControlFlow::Break(()),
            Msg::Command(command) => self.handle_command(command).await,
            Msg::Engine(id, event) => self.handle_engine_event(id, event).await,
            Msg::Focus(change) => self.handle_focus_change(change).await,
            Msg::CatalogReady => self.handle_catalog_ready().await,
            Msg::Snapshot(reply) => {
                let _ = reply.send(self.snapshot());
            }
        }
        ControlFlow::Continue(())
    }

    async fn handle_command(&mut self, command: Command) {
        debug!(?command, state = %self.state, "processing command");
        match command {
            Command::Play => self.process_play().await,
            Command::Pause => self.process_pause().await,
            Command::TogglePlayback => {
                if matches!(self.state, PlaybackState::Paused | PlaybackState::Stopped) {
                    self.process_play().await
                } else {
                    self.process_pause().await
                }
            }
            Command::Stop => self.process_stop(false).await,
            Command::Skip => self.process_skip().await,
            Command::Rewind => self.process_rewind().await,
            Command::PlayExplicit(source) => self.process_play_explicit(source).await,
            // Handled in handle_msg before dispatch.
            Command::Shutdown => {}
        }
    }

    async fn process_play(&mut self) {
        if self.state == PlaybackState::Retrieving {
            // Defer until the catalog is ready. A newer "play anything"
            // intent overrides an explicit source deferred earlier.
            self.pending = Some(PendingRequest {
                source: None,
                autoplay: true,
            });
            return;
        }

        self.try_to_get_focus().await;

        match self.state {
            PlaybackState::Stopped => self.play_next_item(None).await,
            PlaybackState::Paused => {
                self.state = PlaybackState::Playing;
                self.publish_phase("(playing)").await;
                self.config_and_start_engine().await;
                self.emit(PlayerEvent::Resumed);
            }
            _ => {}
        }

        if matches!(
            self.state,
            PlaybackState::Playing | PlaybackState::Preparing
        ) {
            self.set_transport_state(TransportState::Playing).await;
        }
    }

    async fn process_pause(&mut self) {
        if self.state == PlaybackState::Retrieving {
            // Only the autoplay intent is withdrawn; a deferred explicit
            // source stays deferred.
            if let Some(pending) = self.pending.as_mut() {
                pending.autoplay = false;
            }
            return;
        }

        if self.state == PlaybackState::Playing {
            self.state = PlaybackState::Paused;
            self.pause_reason = PauseReason::UserRequest;
            if let Err(err) = self.engine.pause().await {
                warn!(%err, "pause rejected");
            }
            self.relax_resources(false).await;
            self.emit(PlayerEvent::Paused);
        }

        if self.state == PlaybackState::Paused {
            self.set_transport_state(TransportState::Paused).await;
        }
    }

    async fn process_skip(&mut self) {
        if matches!(
            self.state,
            PlaybackState::Playing | PlaybackState::Paused | PlaybackState::Preparing
        ) {
            self.try_to_get_focus().await;
            self.play_next_item(None).await;
        }
    }

    async fn process_rewind(&mut self) {
        if matches!(self.state, PlaybackState::Playing | PlaybackState::Paused) {
            if let Err(err) = self.engine.seek_to_start().await {
                warn!(%err, "rewind rejected");
            }
        }
    }

    async fn process_stop(&mut self, force: bool) {
        if matches!(self.state, PlaybackState::Playing | PlaybackState::Paused) || force {
            self.state = PlaybackState::Stopped;
            self.is_streaming = false;
            self.now_playing = None;
            self.pending = None;
            self.relax_resources(true).await;
            self.give_up_focus().await;
            self.set_transport_state(TransportState::Stopped).await;
            self.emit(PlayerEvent::Stopped);
        }
    }

    async fn process_play_explicit(&mut self, source: TrackSource) {
        if self.state == PlaybackState::Retrieving {
            // Play the requested reference right after retrieving finishes.
            self.pending = Some(PendingRequest {
                source: Some(source),
                autoplay: true,
            });
            return;
        }

        info!(%source, "playing explicit reference");
        self.try_to_get_focus().await;
        self.play_next_item(Some(source)).await;
    }

    /// Begin playing the next item: the explicit `source` when given,
    /// otherwise a random catalog pick. Releases the previous decode
    /// session before the new load so two are never live at once.
    async fn play_next_item(&mut self, explicit: Option<TrackSource>) {
        self.state = PlaybackState::Stopped;
        self.relax_resources(false).await;

        let item = match explicit {
            Some(source) => MediaItem::from_reference(source),
            None => match self.catalog.random_item().await {
                Ok(Some(item)) => item,
                Ok(None) => {
                    warn!("catalog has no items to play");
                    self.emit(PlayerEvent::NoItemsAvailable);
                    self.process_stop(true).await;
                    // Leave the condition visible after the stop wiped the
                    // previous status line.
                    self.publish_status("No available items to play").await;
                    return;
                }
                Err(err) => {
                    error!(%err, "random pick failed");
                    self.fail_to_stopped(PlaybackError::Bridge(err)).await;
                    return;
                }
            },
        };

        self.is_streaming = item.source.is_remote();
        let now = NowPlaying::from_item(&item);
        let title = now.title.clone();
        self.now_playing = Some(now);

        let inbox = self.inbox.clone();
        let forward = move |id: SessionId, event: EngineEvent| {
            if let Some(tx) = inbox.upgrade() {
                let _ = tx.send(Msg::Engine(id, event));
            }
        };

        match self.engine.load(&item.source, forward).await {
            Ok(_) => {
                self.state = PlaybackState::Preparing;
                self.publish_phase("(loading)").await;
                self.ensure_transport_registered().await;
                self.set_transport_state(TransportState::Playing).await;
                self.set_transport_metadata().await;
                self.emit(PlayerEvent::TrackChanged {
                    title,
                    source: item.source.to_string(),
                });

                if self.is_streaming {
                    self.keepalive.acquire();
                } else if self.keepalive.is_held() {
                    self.keepalive.release();
                }
            }
            Err(err) => {
                error!(%err, source = %item.source, "failed to begin load");
                self.fail_to_stopped(err).await;
            }
        }
    }

    async fn handle_engine_event(&mut self, id: SessionId, event: EngineEvent) {
        if !self.engine.is_live(id) {
            debug!(session = %id, ?event, "event from superseded session ignored");
            return;
        }
        match event {
            EngineEvent::Ready => {
                self.engine.mark_ready(id);
                self.state = PlaybackState::Playing;
                self.publish_phase("(playing)").await;
                self.config_and_start_engine().await;
                let title = self
                    .now_playing
                    .as_ref()
                    .map(|now| now.title.clone())
                    .unwrap_or_default();
                self.emit(PlayerEvent::Started { title });
            }
            EngineEvent::Finished => {
                info!("item finished, auto-advancing");
                if let Some(now) = &self.now_playing {
                    self.emit(PlayerEvent::PlaybackEnded {
                        source: now.source.to_string(),
                    });
                }
                self.play_next_item(None).await;
            }
            EngineEvent::Failed { message } => {
                error!(%message, "decode session failed");
                let source = self
                    .now_playing
                    .as_ref()
                    .map(|now| now.source.to_string())
                    .unwrap_or_else(|| "<unknown>".to_string());
                self.fail_to_stopped(PlaybackError::Load { src: source, message })
                    .await;
            }
        }
    }

    async fn handle_focus_change(&mut self, change: FocusChange) {
        match change {
            FocusChange::Gained => {
                info!("audio focus gained");
                self.focus = AudioFocus::Focused;
                if self.state == PlaybackState::Playing {
                    self.config_and_start_engine().await;
                }
            }
            FocusChange::Lost { can_duck } => {
                info!(can_duck, "audio focus lost");
                self.focus = if can_duck {
                    AudioFocus::NoFocusCanDuck
                } else {
                    AudioFocus::NoFocusNoDuck
                };
                if self.engine.is_started() {
                    self.config_and_start_engine().await;
                }
            }
        }
    }

    async fn handle_catalog_ready(&mut self) {
        if self.state != PlaybackState::Retrieving {
            debug!("duplicate catalog-ready signal ignored");
            return;
        }
        info!("catalog ready");
        self.state = PlaybackState::Stopped;
        self.emit(PlayerEvent::CatalogReady);

        // Consume the deferred request exactly once.
        if let Some(request) = self.pending.take() {
            if request.autoplay {
                self.try_to_get_focus().await;
                self.play_next_item(request.source).await;
            }
        }
    }

    /// Reconcile the engine with the current focus standing: pause it
    /// outright without focus, duck it when tolerated, run at full volume
    /// when focused. Starts the engine if focus allows and it is not
    /// already producing sound.
    async fn config_and_start_engine(&mut self) {
        match self.focus {
            AudioFocus::NoFocusNoDuck => {
                if self.engine.is_started() {
                    if let Err(err) = self.engine.pause().await {
                        warn!(%err, "focus-forced pause rejected");
                    }
                    self.pause_reason = PauseReason::FocusLoss;
                    if self.keepalive.is_held() {
                        self.keepalive.release();
                    }
                }
                return;
            }
            AudioFocus::NoFocusCanDuck => {
                if let Err(err) = self.engine.set_volume(self.duck_volume).await {
                    warn!(%err, "duck volume rejected");
                    return;
                }
            }
            AudioFocus::Focused => {
                if let Err(err) = self.engine.set_volume(FULL_VOLUME).await {
                    warn!(%err, "volume update rejected");
                    return;
                }
            }
        }

        if !self.engine.is_started() {
            match self.engine.start().await {
                Ok(()) => {
                    if self.is_streaming {
                        self.keepalive.acquire();
                    }
                }
                Err(err) => warn!(%err, "engine start rejected"),
            }
        }
    }

    /// Release everything except (optionally) the decode session: status
    /// surface and keepalive token. Safe on every error path.
    async fn relax_resources(&mut self, release_engine: bool) {
        if let Err(err) = self.status.clear().await {
            warn!(%err, "status clear failed");
        }
        if release_engine {
            self.engine.release().await;
        }
        if self.keepalive.is_held() {
            self.keepalive.release();
        }
    }

    /// Error recovery: surface the failure, then settle in `Stopped` with
    /// nothing held.
    async fn fail_to_stopped(&mut self, err: PlaybackError) {
        self.emit(PlayerEvent::Error {
            message: err.to_string(),
        });
        self.state = PlaybackState::Stopped;
        self.is_streaming = false;
        self.now_playing = None;
        self.relax_resources(true).await;
        self.give_up_focus().await;
        self.set_transport_state(TransportState::Stopped).await;
    }

    async fn try_to_get_focus(&mut self) {
        if self.focus == AudioFocus::Focused {
            return;
        }
        match self.focus_service.request_focus().await {
            Ok(FocusResponse::Granted) => {
                debug!("audio focus granted");
                self.focus = AudioFocus::Focused;
            }
            Ok(FocusResponse::Pending) => debug!("audio focus request pending"),
            Ok(FocusResponse::Denied) => warn!("audio focus request denied"),
            Err(err) => warn!(%err, "audio focus request failed"),
        }
    }

    async fn give_up_focus(&mut self) {
        if self.focus != AudioFocus::Focused {
            return;
        }
        match self.focus_service.abandon_focus().await {
            Ok(true) => {
                debug!("audio focus abandoned");
                self.focus = AudioFocus::NoFocusNoDuck;
            }
            // Nothing was held with an arbiter; the grant stands.
            Ok(false) => {}
            Err(err) => warn!(%err, "audio focus abandon failed"),
        }
    }

    async fn publish_phase(&self, phase: &str) {
        let title = self
            .now_playing
            .as_ref()
            .map(|now| now.title.as_str())
            .unwrap_or_default();
        self.publish_status(&format!("{title} {phase}")).await;
    }

    async fn publish_status(&self, phase_text: &str) {
        let update = StatusUpdate {
            title: self.service_label.clone(),
            phase_text: phase_text.to_string(),
        };
        if let Err(err) = self.status.publish(update).await {
            warn!(%err, "status publish failed");
        }
    }

    async fn ensure_transport_registered(&mut self) {
        if self.transport_registered {
            return;
        }
        match self.transport.register().await {
            Ok(()) => self.transport_registered = true,
            Err(err) => warn!(%err, "transport registration failed"),
        }
    }

    async fn set_transport_state(&self, state: TransportState) {
        if !self.transport_registered {
            return;
        }
        if let Err(err) = self.transport.set_playback_state(state).await {
            warn!(%err, "transport state update failed");
        }
    }

    async fn set_transport_metadata(&self) {
        if !self.transport_registered {
            return;
        }
        let Some(now) = &self.now_playing else {
            return;
        };
        let metadata = TrackMetadata {
            title: Some(now.title.clone()),
            artist: now.artist.clone(),
            album: now.album.clone(),
            duration: now.duration,
        };
        if let Err(err) = self.transport.set_metadata(metadata).await {
            warn!(%err, "transport metadata update failed");
        }
    }

    fn emit(&self, event: PlayerEvent) {
        // Nobody listening is fine; the bus is observability only.
        let _ = self.events.emit(event);
    }

    fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            state: self.state,
            focus: self.focus,
            pause_reason: self.pause_reason,
            now_playing: self.now_playing.clone(),
            is_streaming: self.is_streaming,
        }
    }
}
