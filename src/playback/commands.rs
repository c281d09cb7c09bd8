use tauri::State;

use crate::playback::{PlaybackController, PlaybackSnapshot};
use crate::AppState;

fn controller_from_state(state: &State<'_, AppState>) -> PlaybackController {
    state.playback.clone()
}

#[tauri::command]
pub async fn get_playback_snapshot(
    state: State<'_, AppState>,
) -> Result<PlaybackSnapshot, String> {
    let controller = controller_from_state(&state);
    Ok(controller.get_snapshot().await)
}

#[tauri::command]
pub async fn start_playback(state: State<'_, AppState>) -> Result<(), String> {
    let controller = controller_from_state(&state);
    controller.start().await.map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn pause_playback(state: State<'_, AppState>) -> Result<(), String> {
    let controller = controller_from_state(&state);
    controller.pause().await.map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn resume_playback(state: State<'_, AppState>) -> Result<(), String> {
    let controller = controller_from_state(&state);
    controller.resume().await.map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn replay_playback(state: State<'_, AppState>) -> Result<(), String> {
    let controller = controller_from_state(&state);
    controller.replay().await.map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn seek_playback(state: State<'_, AppState>, position_ms: f64) -> Result<(), String> {
    let controller = controller_from_state(&state);
    controller.seek(position_ms).await.map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn stop_playback(state: State<'_, AppState>) -> Result<(), String> {
    let controller = controller_from_state(&state);
    controller.stop().await.map_err(|e| e.to_string())
}
