mod config;
mod effects;
mod error;
mod github;
mod llm;
mod playback;
mod roast;
mod settings;
mod speech;

use effects::EffectsEngineHandle;
use github::GithubClient;
use llm::OpenAiClient;
use log::warn;
use playback::commands::{
    get_playback_snapshot, pause_playback, replay_playback, resume_playback, seek_playback,
    start_playback, stop_playback,
};
use playback::PlaybackController;
use settings::{RoastSettings, SettingsStore};
use speech::{ElevenLabsClient, SpeechOutcome, SpeechPipeline};
use std::path::PathBuf;
use tauri::{Manager, State};

use config::{CueConfig, Intensity, TimingConfig};
use roast::RoastScript;

pub(crate) struct AppState {
    pub(crate) effects: EffectsEngineHandle,
    pub(crate) playback: PlaybackController,
    pub(crate) github: GithubClient,
    pub(crate) llm: Option<OpenAiClient>,
    pub(crate) speech: SpeechPipeline,
    pub(crate) settings: SettingsStore,
}

#[derive(serde::Serialize, Clone)]
#[serde(rename_all = "camelCase")]
struct GeneratedRoast {
    username: String,
    roast_text: String,
    intensity: Intensity,
}

#[derive(serde::Serialize, Clone)]
#[serde(rename_all = "camelCase")]
struct LoadedRoastInfo {
    script: RoastScript,
    schedule_ms: Vec<f64>,
    duration_ms: f64,
    /// Present when synthesis fell back to on-device speech; the UI hands
    /// this text to its local synthesizer.
    fallback_text: Option<String>,
}

/// Normalizes user input: trims, drops a leading `@`, rejects empty names.
fn normalize_username(raw: &str) -> Result<String, String> {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_prefix('@').unwrap_or(trimmed);
    if trimmed.is_empty() {
        return Err("Please enter a GitHub username".to_string());
    }
    Ok(trimmed.to_string())
}

#[tauri::command]
async fn generate_roast(
    username: String,
    intensity: Intensity,
    state: State<'_, AppState>,
) -> Result<GeneratedRoast, String> {
    let username = normalize_username(&username)?;

    let llm = state
        .llm
        .as_ref()
        .ok_or_else(|| "Roast generation is not configured (missing API key)".to_string())?
        .clone();
    let github = state.github.clone();

    let user = github.fetch_user(&username).await.map_err(|e| e.to_string())?;
    let repos = github
        .fetch_repos(&username)
        .await
        .map_err(|e| e.to_string())?;
    let summary = github::profile_summary(&user, &repos);

    let roast_text = llm
        .generate_roast(&summary, intensity)
        .await
        .map_err(|e| e.to_string())?;

    Ok(GeneratedRoast {
        username,
        roast_text,
        intensity,
    })
}

#[tauri::command]
async fn load_roast(
    roast_text: String,
    intensity: Intensity,
    state: State<'_, AppState>,
) -> Result<LoadedRoastInfo, String> {
    let script = roast::prepare_script(&roast_text, &CueConfig::default());
    let speech = state.speech.acquire(&script.clean_text, intensity).await;

    let schedule_ms =
        roast::timing::build_schedule(&script.tokens, speech.duration_ms(), &TimingConfig::default());

    state
        .playback
        .load(
            script.id.clone(),
            schedule_ms.clone(),
            script.cues.clone(),
            &speech,
        )
        .await
        .map_err(|e| e.to_string())?;

    let fallback_text = match &speech {
        SpeechOutcome::Fallback { text, .. } => Some(text.clone()),
        SpeechOutcome::Audio { .. } => None,
    };

    Ok(LoadedRoastInfo {
        script,
        schedule_ms,
        duration_ms: speech.duration_ms(),
        fallback_text,
    })
}

#[tauri::command]
fn set_effect_volume(volume: f32, state: State<AppState>) -> Result<(), String> {
    state.effects.set_volume(volume)?;
    state
        .settings
        .update_volume(volume)
        .map_err(|e| e.to_string())
}

#[tauri::command]
fn set_sounds_dir(dir: String, state: State<AppState>) -> Result<(), String> {
    let path = PathBuf::from(dir);
    state.effects.set_sounds_dir(path.clone());
    state
        .settings
        .update_sounds_dir(Some(path))
        .map_err(|e| e.to_string())
}

#[tauri::command]
fn get_settings(state: State<AppState>) -> Result<RoastSettings, String> {
    Ok(state.settings.current())
}

#[tauri::command]
fn update_settings(settings: RoastSettings, state: State<AppState>) -> Result<(), String> {
    state
        .settings
        .update(settings)
        .map_err(|e| e.to_string())
}

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    // Initialize logging (reads RUST_LOG env var)
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    log::info!("RoastMeNow starting up...");

    tauri::Builder::default()
        .plugin(tauri_plugin_opener::init())
        .setup(|app| {
            let result = (|| -> anyhow::Result<()> {
                let app_data_dir = app
                    .path()
                    .app_data_dir()
                    .map_err(|err| anyhow::anyhow!(err))?;
                std::fs::create_dir_all(&app_data_dir)?;

                let settings_path = app_data_dir.join("settings.json");
                let settings_store = SettingsStore::new(settings_path)?;
                let initial = settings_store.current();

                let effects = EffectsEngineHandle::new();
                if let Some(dir) = &initial.sounds_dir {
                    effects.set_sounds_dir(dir.clone());
                }
                if (initial.volume - 1.0).abs() > f32::EPSILON {
                    if let Err(e) = effects.set_volume(initial.volume) {
                        warn!("failed to apply saved volume: {e}");
                    }
                }

                let playback = PlaybackController::new(app.handle().clone(), effects.clone());

                app.manage(AppState {
                    effects,
                    playback,
                    github: GithubClient::new(),
                    llm: OpenAiClient::from_env(),
                    speech: SpeechPipeline::new(ElevenLabsClient::from_env()),
                    settings: settings_store,
                });

                Ok(())
            })();

            result.map_err(|err| err.into())
        })
        .invoke_handler(tauri::generate_handler![
            generate_roast,
            load_roast,
            get_playback_snapshot,
            start_playback,
            pause_playback,
            resume_playback,
            replay_playback,
            seek_playback,
            stop_playback,
            set_effect_volume,
            set_sounds_dir,
            get_settings,
            update_settings,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
