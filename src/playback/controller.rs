use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};
use std::time::Duration;

use log::{error, warn};
use serde::Serialize;
use tokio::{sync::Mutex, task::JoinHandle, time};

use tauri::{AppHandle, Emitter, Runtime};

use crate::config::AmbientConfig;
use crate::effects::EffectsEngineHandle;
use crate::error::RoastError;
use crate::roast::{CuePoint, CueTag};
use crate::speech::SpeechOutcome;

use super::ambient::AmbientScheduler;
use super::state::{PlaybackState, PlaybackStatus};

/// How long the UI keeps the end-of-roast celebration on screen.
const CELEBRATION_DISPLAY_MS: u64 = 3_000;
/// Overlay duration for a fired cue.
const CUE_OVERLAY_MS: u64 = 1_500;

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackSnapshot {
    pub state: PlaybackState,
    pub progress_fraction: f64,
    pub is_playing: bool,
}

#[derive(Serialize, Clone)]
#[serde(rename_all = "camelCase")]
struct PlaybackProgressEvent {
    current_token_index: i64,
    progress_fraction: f64,
    is_playing: bool,
}

#[derive(Serialize, Clone)]
#[serde(rename_all = "camelCase")]
struct CueFiredEvent {
    cue_tag: CueTag,
    fired_at_token_index: usize,
    overlay_ms: u64,
}

#[derive(Serialize, Clone)]
#[serde(rename_all = "camelCase")]
struct PlaybackEndedEvent {
    roast_id: Option<String>,
    celebration_ms: u64,
}

/// A fully prepared roast waiting to play (kept around for replay).
#[derive(Clone)]
struct LoadedRoast {
    roast_id: String,
    schedule_ms: Vec<f64>,
    cues: Vec<CuePoint>,
    duration_ms: f64,
    audio: Option<Vec<u8>>,
}

/// Owns the playback state machine and drives the 20ms polling loop that
/// synchronizes highlighting and cue firing with the playback clock.
/// Generic over the runtime so tests can drive it on the mock runtime.
pub struct PlaybackController<R: Runtime = tauri::Wry> {
    state: Arc<Mutex<PlaybackState>>,
    loaded: Arc<Mutex<Option<LoadedRoast>>>,
    app_handle: AppHandle<R>,
    effects: EffectsEngineHandle,
    ticker: Arc<Mutex<Option<JoinHandle<()>>>>,
    ambient: Arc<Mutex<AmbientScheduler>>,
    ambient_fired: Arc<AtomicUsize>,
    poll_interval: Duration,
}

impl<R: Runtime> Clone for PlaybackController<R> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
            loaded: self.loaded.clone(),
            app_handle: self.app_handle.clone(),
            effects: self.effects.clone(),
            ticker: self.ticker.clone(),
            ambient: self.ambient.clone(),
            ambient_fired: self.ambient_fired.clone(),
            poll_interval: self.poll_interval,
        }
    }
}

impl<R: Runtime> PlaybackController<R> {
    pub fn new(app_handle: AppHandle<R>, effects: EffectsEngineHandle) -> Self {
        Self {
            state: Arc::new(Mutex::new(PlaybackState::new())),
            loaded: Arc::new(Mutex::new(None)),
            app_handle,
            effects,
            ticker: Arc::new(Mutex::new(None)),
            ambient: Arc::new(Mutex::new(AmbientScheduler::new())),
            ambient_fired: Arc::new(AtomicUsize::new(0)),
            poll_interval: Duration::from_millis(20),
        }
    }

    pub async fn get_snapshot(&self) -> PlaybackSnapshot {
        let guard = self.state.lock().await;
        PlaybackSnapshot {
            progress_fraction: guard.progress_fraction(),
            is_playing: guard.is_playing(),
            state: guard.clone(),
        }
    }

    /// Stages a prepared roast: state moves to Loading, playback starts on
    /// an explicit `start()`.
    pub async fn load(
        &self,
        roast_id: String,
        schedule_ms: Vec<f64>,
        cues: Vec<CuePoint>,
        speech: &SpeechOutcome,
    ) -> Result<(), RoastError> {
        // A new roast invalidates whatever was playing.
        self.teardown().await;

        let audio = match speech {
            SpeechOutcome::Audio { bytes, .. } => Some(bytes.clone()),
            SpeechOutcome::Fallback { .. } => None,
        };

        {
            let mut state = self.state.lock().await;
            state.begin_loading(roast_id.clone());
        }

        *self.loaded.lock().await = Some(LoadedRoast {
            roast_id,
            schedule_ms,
            cues,
            duration_ms: speech.duration_ms(),
            audio,
        });

        self.emit_state_changed().await;
        Ok(())
    }

    pub async fn start(&self) -> Result<(), RoastError> {
        let loaded = {
            let guard = self.loaded.lock().await;
            guard.clone().ok_or_else(|| {
                RoastError::PlaybackError("no roast loaded for playback".into())
            })?
        };
        if loaded.schedule_ms.is_empty() {
            return Err(RoastError::PlaybackError(
                "cannot start playback with an empty schedule".into(),
            ));
        }

        if let Some(bytes) = &loaded.audio {
            self.effects
                .play_speech(bytes.clone())
                .map_err(|e| RoastError::PlaybackError(format!("speech playback failed: {e}")))?;
        }

        {
            let mut state = self.state.lock().await;
            state.begin_playing(loaded.schedule_ms, loaded.cues, loaded.duration_ms);
        }

        self.ambient_fired.store(0, Ordering::SeqCst);
        self.spawn_ticker().await;
        self.start_ambient().await;
        self.emit_state_changed().await;
        Ok(())
    }

    pub async fn pause(&self) -> Result<(), RoastError> {
        {
            let mut state = self.state.lock().await;
            if !state.is_playing() {
                return Ok(());
            }
            state.pause();
        }

        let _ = self.effects.pause_speech();
        self.cancel_ticker().await;
        self.stop_ambient().await;
        self.emit_state_changed().await;
        Ok(())
    }

    pub async fn resume(&self) -> Result<(), RoastError> {
        {
            let mut state = self.state.lock().await;
            if state.status != PlaybackStatus::Paused {
                return Err(RoastError::PlaybackError("nothing paused to resume".into()));
            }
            state.resume();
        }

        let _ = self.effects.resume_speech();
        self.spawn_ticker().await;
        self.start_ambient().await;
        self.emit_state_changed().await;
        Ok(())
    }

    /// Restarts the loaded roast from the top, re-arming every cue.
    pub async fn replay(&self) -> Result<(), RoastError> {
        let loaded = {
            let guard = self.loaded.lock().await;
            guard
                .clone()
                .ok_or_else(|| RoastError::PlaybackError("no roast loaded to replay".into()))?
        };

        self.cancel_ticker().await;
        self.stop_ambient().await;

        if let Some(bytes) = &loaded.audio {
            self.effects
                .play_speech(bytes.clone())
                .map_err(|e| RoastError::PlaybackError(format!("speech playback failed: {e}")))?;
        }

        {
            let mut state = self.state.lock().await;
            if state.schedule_ms.is_empty() {
                state.begin_playing(loaded.schedule_ms, loaded.cues, loaded.duration_ms);
            } else {
                state.replay();
            }
        }

        self.ambient_fired.store(0, Ordering::SeqCst);
        self.spawn_ticker().await;
        self.start_ambient().await;
        self.emit_state_changed().await;
        Ok(())
    }

    pub async fn seek(&self, position_ms: f64) -> Result<(), RoastError> {
        {
            let mut state = self.state.lock().await;
            state.seek(position_ms);
        }
        let _ = self
            .effects
            .seek_speech(Duration::from_millis(position_ms.max(0.0) as u64));
        self.emit_progress().await;
        Ok(())
    }

    /// Navigation away / new submission: stop everything, drop all timers.
    pub async fn stop(&self) -> Result<(), RoastError> {
        self.teardown().await;
        {
            let mut state = self.state.lock().await;
            state.reset();
        }
        *self.loaded.lock().await = None;
        self.emit_state_changed().await;
        Ok(())
    }

    async fn teardown(&self) {
        self.cancel_ticker().await;
        self.stop_ambient().await;
        let _ = self.effects.stop();
    }

    async fn start_ambient(&self) {
        let mut ambient = self.ambient.lock().await;
        if let Err(e) = ambient.start(
            self.app_handle.clone(),
            self.effects.clone(),
            self.ambient_fired.clone(),
            AmbientConfig::default(),
        ) {
            warn!("failed to start ambient scheduler: {e}");
        }
    }

    async fn stop_ambient(&self) {
        if let Err(e) = self.ambient.lock().await.stop().await {
            error!("failed to stop ambient scheduler: {e}");
        }
    }

    async fn spawn_ticker(&self) {
        let mut ticker_guard = self.ticker.lock().await;
        if let Some(handle) = ticker_guard.take() {
            handle.abort();
        }

        let state = self.state.clone();
        let app_handle = self.app_handle.clone();
        let effects = self.effects.clone();
        let ambient = self.ambient.clone();
        let poll_interval = self.poll_interval;

        let handle = tokio::spawn(async move {
            let mut interval = time::interval(poll_interval);
            loop {
                interval.tick().await;

                let (outcome, progress) = {
                    let mut guard = state.lock().await;
                    if !guard.is_playing() {
                        break;
                    }
                    let elapsed = guard.current_elapsed_ms();
                    let outcome = guard.poll(elapsed);
                    let progress = PlaybackProgressEvent {
                        current_token_index: guard.current_token_index,
                        progress_fraction: guard.progress_fraction(),
                        is_playing: guard.is_playing(),
                    };
                    (outcome, progress)
                };

                for cue in &outcome.fired {
                    if let Err(e) = effects.play_cue(cue.tag) {
                        warn!("cue sound playback failed: {e}");
                    }
                    let _ = app_handle.emit(
                        "cue-fired",
                        CueFiredEvent {
                            cue_tag: cue.tag,
                            fired_at_token_index: cue.token_index,
                            overlay_ms: CUE_OVERLAY_MS,
                        },
                    );
                }

                if outcome.index_changed || outcome.ended {
                    let _ = app_handle.emit("playback-progress", progress);
                }

                if outcome.ended {
                    if let Err(e) = ambient.lock().await.stop().await {
                        error!("failed to stop ambient scheduler at end: {e}");
                    }

                    let roast_id = state.lock().await.roast_id.clone();
                    let _ = app_handle.emit(
                        "playback-ended",
                        PlaybackEndedEvent {
                            roast_id,
                            celebration_ms: CELEBRATION_DISPLAY_MS,
                        },
                    );
                    break;
                }
            }
        });

        *ticker_guard = Some(handle);
    }

    async fn cancel_ticker(&self) {
        if let Some(handle) = self.ticker.lock().await.take() {
            handle.abort();
        }
    }

    async fn emit_state_changed(&self) {
        let snapshot = self.get_snapshot().await;
        let _ = self.app_handle.emit("playback-state-changed", snapshot);
    }

    async fn emit_progress(&self) {
        let guard = self.state.lock().await;
        let _ = self.app_handle.emit(
            "playback-progress",
            PlaybackProgressEvent {
                current_token_index: guard.current_token_index,
                progress_fraction: guard.progress_fraction(),
                is_playing: guard.is_playing(),
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tauri::test::MockRuntime;

    fn controller(app: &tauri::App<MockRuntime>) -> PlaybackController<MockRuntime> {
        PlaybackController::new(app.handle().clone(), EffectsEngineHandle::new())
    }

    fn fallback_speech(duration_ms: f64) -> SpeechOutcome {
        SpeechOutcome::Fallback {
            text: "your repos are a graveyard".into(),
            duration_ms,
        }
    }

    #[tokio::test]
    async fn loading_a_new_roast_cancels_the_running_ticker() {
        let app = tauri::test::mock_app();
        let controller = controller(&app);
        let speech = fallback_speech(60_000.0);

        controller
            .load("roast-1".into(), vec![0.0, 30_000.0], vec![], &speech)
            .await
            .unwrap();
        controller.start().await.unwrap();
        assert!(controller.ticker.lock().await.is_some());
        assert!(controller.ambient.lock().await.is_active());

        controller
            .load("roast-2".into(), vec![0.0, 30_000.0], vec![], &speech)
            .await
            .unwrap();
        assert!(controller.ticker.lock().await.is_none());
        assert!(!controller.ambient.lock().await.is_active());
        assert_eq!(
            controller.get_snapshot().await.state.status,
            PlaybackStatus::Loading
        );
    }

    #[tokio::test]
    async fn stop_releases_ticker_and_ambient() {
        let app = tauri::test::mock_app();
        let controller = controller(&app);
        let speech = fallback_speech(60_000.0);

        controller
            .load("roast-1".into(), vec![0.0, 30_000.0], vec![], &speech)
            .await
            .unwrap();
        controller.start().await.unwrap();

        controller.stop().await.unwrap();
        assert!(controller.ticker.lock().await.is_none());
        assert!(!controller.ambient.lock().await.is_active());
        assert_eq!(
            controller.get_snapshot().await.state.status,
            PlaybackStatus::Idle
        );
    }

    #[tokio::test]
    async fn pause_releases_ticker_and_ambient_and_resume_rearms() {
        let app = tauri::test::mock_app();
        let controller = controller(&app);
        let speech = fallback_speech(60_000.0);

        controller
            .load("roast-1".into(), vec![0.0, 30_000.0], vec![], &speech)
            .await
            .unwrap();
        controller.start().await.unwrap();

        controller.pause().await.unwrap();
        assert!(controller.ticker.lock().await.is_none());
        assert!(!controller.ambient.lock().await.is_active());

        controller.resume().await.unwrap();
        assert!(controller.ticker.lock().await.is_some());
        assert!(controller.ambient.lock().await.is_active());

        controller.stop().await.unwrap();
    }

    #[tokio::test]
    async fn unplayable_speech_audio_fails_start_cleanly() {
        let app = tauri::test::mock_app();
        let controller = controller(&app);
        let speech = SpeechOutcome::Audio {
            bytes: vec![0u8; 64],
            duration_ms: 1_000.0,
        };

        controller
            .load("roast-1".into(), vec![0.0, 500.0], vec![], &speech)
            .await
            .unwrap();

        let result = controller.start().await;
        assert!(matches!(result, Err(RoastError::PlaybackError(_))));

        // The scheduler never started: no ticker, no ambient task, state
        // stays out of Playing so the user can retry.
        assert!(controller.ticker.lock().await.is_none());
        assert!(!controller.ambient.lock().await.is_active());
        assert!(!controller.get_snapshot().await.is_playing);
    }

    #[tokio::test]
    async fn start_without_a_loaded_roast_is_an_error() {
        let app = tauri::test::mock_app();
        let controller = controller(&app);
        assert!(matches!(
            controller.start().await,
            Err(RoastError::PlaybackError(_))
        ));
    }
}
