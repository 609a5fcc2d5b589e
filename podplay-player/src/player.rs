//! Player task and handle
//!
//! One tokio task owns the [`PlaybackFacade`] and processes, one at a time,
//! commands from API handlers and notifications from the audio resource.
//! Each command is acknowledged with the session snapshot taken right after
//! it was applied, so a caller that awaited `play_track` observes the new
//! track. Dropping every [`PlayerHandle`] ends the task and releases the
//! resource.

use crate::audio::HeadlessResource;
use crate::error::{Error, Result};
use crate::playback::{AudioResource, MediaEngineAdapter, PlaybackFacade, ResourceEvent};
use crate::state::SharedState;
use podplay_common::config::PlayerConfig;
use podplay_common::events::PlayerEvent;
use podplay_common::{SessionSnapshot, TrackRef};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{debug, info};

/// Pending commands before senders wait
const COMMAND_CAPACITY: usize = 64;

/// Operations accepted by the player task
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerCommand {
    PlayTrack(Arc<TrackRef>),
    Play,
    Pause,
    TogglePlayPause,
    Seek(f64),
    /// Skip ahead; `None` uses the configured step
    SkipForward(Option<f64>),
    SkipBackward(Option<f64>),
    SetVolume(f64),
    SetPlaybackRate(f64),
    ToggleMute,
    ClearError,
    ToggleMinimized,
    Reset,
    SetQueue(Vec<Arc<TrackRef>>),
    Enqueue(Arc<TrackRef>),
    Dequeue(String),
    PlayNext,
    PlayPrevious,
    PlayQueueIndex(usize),
}

struct Request {
    command: PlayerCommand,
    reply: oneshot::Sender<SessionSnapshot>,
}

/// Cloneable async front end of the player task
#[derive(Clone)]
pub struct PlayerHandle {
    commands: mpsc::Sender<Request>,
    state: Arc<SharedState>,
    config: Arc<PlayerConfig>,
}

impl PlayerHandle {
    /// Spawn the player task with a [`HeadlessResource`]
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(config: PlayerConfig) -> Self {
        let interval = config.progress_interval;
        Self::spawn_with_resource(config, move |events| {
            Box::new(HeadlessResource::new(events, interval))
        })
    }

    /// Spawn the player task with a custom resource
    ///
    /// `make_resource` runs once, on first use, and receives the sender
    /// the resource reports its notifications on.
    pub fn spawn_with_resource<F>(config: PlayerConfig, mut make_resource: F) -> Self
    where
        F: FnMut(mpsc::UnboundedSender<ResourceEvent>) -> Box<dyn AudioResource> + Send + 'static,
    {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let adapter = MediaEngineAdapter::new(move || make_resource(event_tx.clone()));
        let mut facade = PlaybackFacade::from_config(&config, adapter);

        let state = Arc::new(SharedState::new(facade.snapshot(), config.event_capacity));
        let observer_state = Arc::clone(&state);
        facade.subscribe(move |change| observer_state.publish(change));

        let (command_tx, command_rx) = mpsc::channel(COMMAND_CAPACITY);
        tokio::spawn(run_player(facade, command_rx, event_rx));

        info!(
            "Player task started (autoplay: {}, skip: {}s)",
            config.autoplay, config.skip_seconds
        );

        Self {
            commands: command_tx,
            state,
            config: Arc::new(config),
        }
    }

    /// Send a command and wait for the resulting snapshot
    pub async fn execute(&self, command: PlayerCommand) -> Result<SessionSnapshot> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(Request { command, reply })
            .await
            .map_err(|_| Error::PlayerClosed)?;
        response.await.map_err(|_| Error::PlayerClosed)
    }

    /// Latest snapshot, without a round trip through the player task
    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.snapshot()
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<PlayerEvent> {
        self.state.subscribe_events()
    }

    pub fn state(&self) -> &Arc<SharedState> {
        &self.state
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    /// Validate `track`, load it and start playback
    pub async fn play_track(&self, track: TrackRef) -> Result<SessionSnapshot> {
        track.validate()?;
        self.execute(PlayerCommand::PlayTrack(Arc::new(track))).await
    }

    pub async fn play(&self) -> Result<SessionSnapshot> {
        self.execute(PlayerCommand::Play).await
    }

    pub async fn pause(&self) -> Result<SessionSnapshot> {
        self.execute(PlayerCommand::Pause).await
    }

    pub async fn toggle_play_pause(&self) -> Result<SessionSnapshot> {
        self.execute(PlayerCommand::TogglePlayPause).await
    }

    pub async fn seek(&self, position: f64) -> Result<SessionSnapshot> {
        self.execute(PlayerCommand::Seek(position)).await
    }

    pub async fn skip_forward(&self, seconds: Option<f64>) -> Result<SessionSnapshot> {
        self.execute(PlayerCommand::SkipForward(seconds)).await
    }

    pub async fn skip_backward(&self, seconds: Option<f64>) -> Result<SessionSnapshot> {
        self.execute(PlayerCommand::SkipBackward(seconds)).await
    }

    pub async fn set_volume(&self, volume: f64) -> Result<SessionSnapshot> {
        self.execute(PlayerCommand::SetVolume(volume)).await
    }

    pub async fn set_playback_rate(&self, rate: f64) -> Result<SessionSnapshot> {
        self.execute(PlayerCommand::SetPlaybackRate(rate)).await
    }

    pub async fn toggle_mute(&self) -> Result<SessionSnapshot> {
        self.execute(PlayerCommand::ToggleMute).await
    }

    pub async fn clear_error(&self) -> Result<SessionSnapshot> {
        self.execute(PlayerCommand::ClearError).await
    }

    pub async fn toggle_minimized(&self) -> Result<SessionSnapshot> {
        self.execute(PlayerCommand::ToggleMinimized).await
    }

    pub async fn reset(&self) -> Result<SessionSnapshot> {
        self.execute(PlayerCommand::Reset).await
    }

    pub async fn set_queue(&self, tracks: Vec<TrackRef>) -> Result<SessionSnapshot> {
        for track in &tracks {
            track.validate()?;
        }
        let queue = tracks.into_iter().map(Arc::new).collect();
        self.execute(PlayerCommand::SetQueue(queue)).await
    }

    pub async fn enqueue(&self, track: TrackRef) -> Result<SessionSnapshot> {
        track.validate()?;
        self.execute(PlayerCommand::Enqueue(Arc::new(track))).await
    }

    pub async fn dequeue(&self, episode_id: impl Into<String>) -> Result<SessionSnapshot> {
        self.execute(PlayerCommand::Dequeue(episode_id.into())).await
    }

    pub async fn play_next(&self) -> Result<SessionSnapshot> {
        self.execute(PlayerCommand::PlayNext).await
    }

    pub async fn play_previous(&self) -> Result<SessionSnapshot> {
        self.execute(PlayerCommand::PlayPrevious).await
    }

    pub async fn play_queue_index(&self, index: usize) -> Result<SessionSnapshot> {
        self.execute(PlayerCommand::PlayQueueIndex(index)).await
    }
}

fn apply_command(facade: &mut PlaybackFacade, command: PlayerCommand) {
    match command {
        PlayerCommand::PlayTrack(track) => facade.play_track(track),
        PlayerCommand::Play => facade.play(),
        PlayerCommand::Pause => facade.pause(),
        PlayerCommand::TogglePlayPause => facade.toggle_play_pause(),
        PlayerCommand::Seek(position) => facade.seek(position),
        PlayerCommand::SkipForward(seconds) => {
            let step = seconds.unwrap_or_else(|| facade.skip_seconds());
            facade.skip_forward(step);
        }
        PlayerCommand::SkipBackward(seconds) => {
            let step = seconds.unwrap_or_else(|| facade.skip_seconds());
            facade.skip_backward(step);
        }
        PlayerCommand::SetVolume(volume) => facade.set_volume(volume),
        PlayerCommand::SetPlaybackRate(rate) => facade.set_playback_rate(rate),
        PlayerCommand::ToggleMute => facade.toggle_mute(),
        PlayerCommand::ClearError => facade.clear_error(),
        PlayerCommand::ToggleMinimized => facade.toggle_minimized(),
        PlayerCommand::Reset => facade.reset(),
        PlayerCommand::SetQueue(queue) => facade.set_queue(queue),
        PlayerCommand::Enqueue(track) => facade.enqueue(track),
        PlayerCommand::Dequeue(episode_id) => facade.dequeue(&episode_id),
        PlayerCommand::PlayNext => {
            facade.play_next();
        }
        PlayerCommand::PlayPrevious => {
            facade.play_previous();
        }
        PlayerCommand::PlayQueueIndex(index) => {
            facade.play_queue_index(index);
        }
    }
}

async fn run_player(
    mut facade: PlaybackFacade,
    mut commands: mpsc::Receiver<Request>,
    mut events: mpsc::UnboundedReceiver<ResourceEvent>,
) {
    loop {
        tokio::select! {
            request = commands.recv() => {
                let Some(Request { command, reply }) = request else {
                    break;
                };
                debug!("Player command: {:?}", command);
                apply_command(&mut facade, command);
                // Caller may have given up waiting
                let _ = reply.send(facade.snapshot());
            }
            Some(event) = events.recv() => {
                facade.handle_resource_event(event);
            }
        }
    }

    facade.shutdown();
    info!("Player task stopped");
}
