use anyhow::{bail, Context, Result};
use log::{info, warn};
use rand::Rng;
use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tauri::{AppHandle, Emitter, Runtime};
use tokio::task::JoinHandle;
use tokio::time::{sleep, Duration};
use tokio_util::sync::CancellationToken;

use crate::config::AmbientConfig;
use crate::effects::EffectsEngineHandle;
use crate::roast::{CueTag, ALL_CUE_TAGS};

#[derive(Serialize, Clone)]
#[serde(rename_all = "camelCase")]
struct AmbientEffectEvent {
    cue_tag: CueTag,
}

/// Injects randomized meme effects while the roast is playing, independent
/// of the text's own cues. Owns nothing shared beyond its own counter; it
/// is cancelled the instant playback leaves the Playing state so no timer
/// outlives the transition.
pub struct AmbientScheduler {
    handle: Option<JoinHandle<()>>,
    cancel_token: Option<CancellationToken>,
}

impl AmbientScheduler {
    pub fn new() -> Self {
        Self {
            handle: None,
            cancel_token: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.handle.is_some()
    }

    /// `fired_count` survives pause/resume so the per-playback cap holds
    /// across interruptions; the caller resets it on replay.
    pub fn start<R: Runtime>(
        &mut self,
        app_handle: AppHandle<R>,
        effects: EffectsEngineHandle,
        fired_count: Arc<AtomicUsize>,
        config: AmbientConfig,
    ) -> Result<()> {
        if self.handle.is_some() {
            bail!("ambient scheduler already active");
        }

        let cancel_token = CancellationToken::new();
        let token_clone = cancel_token.clone();

        let handle = tokio::spawn(ambient_loop(
            app_handle,
            effects,
            token_clone,
            fired_count,
            config,
        ));

        self.handle = Some(handle);
        self.cancel_token = Some(cancel_token);
        Ok(())
    }

    pub async fn stop(&mut self) -> Result<()> {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }

        if let Some(handle) = self.handle.take() {
            handle
                .await
                .context("ambient loop task failed to join")
                .map(|_| ())
        } else {
            Ok(())
        }
    }
}

async fn ambient_loop<R: Runtime>(
    app_handle: AppHandle<R>,
    effects: EffectsEngineHandle,
    cancel_token: CancellationToken,
    fired_count: Arc<AtomicUsize>,
    config: AmbientConfig,
) {
    let mut previous: Option<CueTag> = None;

    while fired_count.load(Ordering::SeqCst) < config.max_effects {
        let gap_ms = {
            let mut rng = rand::thread_rng();
            rng.gen_range(config.min_gap_ms..=config.max_gap_ms)
        };

        tokio::select! {
            _ = sleep(Duration::from_millis(gap_ms)) => {}
            _ = cancel_token.cancelled() => {
                info!("ambient effect loop shutting down");
                break;
            }
        }

        let tag = pick_effect(previous);
        previous = Some(tag);
        fired_count.fetch_add(1, Ordering::SeqCst);

        if let Err(e) = effects.play_cue(tag) {
            warn!("ambient effect playback failed: {e}");
        }
        let _ = app_handle.emit("ambient-effect", AmbientEffectEvent { cue_tag: tag });
    }
}

/// Random effect, never the same one twice in a row.
fn pick_effect(previous: Option<CueTag>) -> CueTag {
    let mut rng = rand::thread_rng();
    loop {
        let tag = ALL_CUE_TAGS[rng.gen_range(0..ALL_CUE_TAGS.len())];
        if Some(tag) != previous {
            return tag;
        }
    }
}
