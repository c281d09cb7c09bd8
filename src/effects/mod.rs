use log::warn;
use rodio::{Decoder, OutputStream, Sink, Source};
use std::fs::File;
use std::io::{BufReader, Cursor};
use std::path::PathBuf;
use std::sync::{
    mpsc::{self, Sender},
    Arc, Mutex, RwLock,
};
use std::thread;
use std::time::Duration;

use crate::roast::CueTag;

enum EffectCommand {
    PlaySpeech {
        bytes: Vec<u8>,
        respond: Sender<Result<(), String>>,
    },
    PauseSpeech,
    ResumeSpeech,
    SeekSpeech { position: Duration },
    PlayClip { path: PathBuf },
    StopAll,
    SetVolume(f32),
}

/// Handle to the audio engine thread. Speech (synthesized roast audio) and
/// effect clips (cue/ambient sounds) play on separate sinks so a cue never
/// interrupts narration.
#[derive(Clone)]
pub struct EffectsEngineHandle {
    tx: Arc<Mutex<Option<Sender<EffectCommand>>>>,
    sounds_dir: Arc<RwLock<Option<PathBuf>>>,
}

impl EffectsEngineHandle {
    pub fn new() -> Self {
        Self {
            tx: Arc::new(Mutex::new(None)),
            sounds_dir: Arc::new(RwLock::new(None)),
        }
    }

    pub fn set_sounds_dir(&self, dir: PathBuf) {
        *self.sounds_dir.write().unwrap() = Some(dir);
    }

    fn ensure_thread(&self) -> Result<Sender<EffectCommand>, String> {
        if let Some(tx) = self.tx.lock().map_err(|e| e.to_string())?.as_ref() {
            return Ok(tx.clone());
        }

        let (tx, rx) = mpsc::channel::<EffectCommand>();

        // Dedicated thread holding the non-Send audio objects
        thread::Builder::new()
            .name("audio-engine".to_string())
            .spawn(move || {
                let mut _stream: Option<OutputStream> = None;
                let mut speech_sink: Option<Sink> = None;
                let mut effects_sink: Option<Sink> = None;
                let mut volume: f32 = 1.0;

                fn ensure_sinks(
                    stream: &mut Option<OutputStream>,
                    speech: &mut Option<Sink>,
                    effects: &mut Option<Sink>,
                ) -> Result<(), String> {
                    if speech.is_none() || effects.is_none() {
                        let (s, handle) = OutputStream::try_default()
                            .map_err(|e| format!("Failed to create audio output stream: {}", e))?;
                        *speech = Some(
                            Sink::try_new(&handle)
                                .map_err(|e| format!("Failed to create speech sink: {}", e))?,
                        );
                        *effects = Some(
                            Sink::try_new(&handle)
                                .map_err(|e| format!("Failed to create effects sink: {}", e))?,
                        );
                        *stream = Some(s);
                    }
                    Ok(())
                }

                while let Ok(cmd) = rx.recv() {
                    match cmd {
                        EffectCommand::PlaySpeech { bytes, respond } => {
                            if let Some(old) = speech_sink.take() {
                                old.stop();
                            }
                            let result = (|| -> Result<(), String> {
                                ensure_sinks(&mut _stream, &mut speech_sink, &mut effects_sink)?;
                                let source = Decoder::new(Cursor::new(bytes))
                                    .map_err(|e| format!("failed to decode speech audio: {e}"))?;
                                if let Some(ref sink) = speech_sink {
                                    sink.set_volume(volume);
                                    sink.append(source.convert_samples::<f32>());
                                    sink.play();
                                }
                                Ok(())
                            })();
                            if let Err(ref e) = result {
                                warn!("speech playback failed: {e}");
                            }
                            let _ = respond.send(result);
                        }
                        EffectCommand::PauseSpeech => {
                            if let Some(ref sink) = speech_sink {
                                sink.pause();
                            }
                        }
                        EffectCommand::ResumeSpeech => {
                            if let Some(ref sink) = speech_sink {
                                sink.play();
                            }
                        }
                        EffectCommand::SeekSpeech { position } => {
                            if let Some(ref sink) = speech_sink {
                                // Best effort; the scheduler's own clock is
                                // authoritative for highlighting.
                                if let Err(e) = sink.try_seek(position) {
                                    warn!("speech seek failed: {e:?}");
                                }
                            }
                        }
                        EffectCommand::PlayClip { path } => {
                            if let Err(e) =
                                ensure_sinks(&mut _stream, &mut speech_sink, &mut effects_sink)
                            {
                                warn!("audio output unavailable: {e}");
                                continue;
                            }
                            match File::open(&path) {
                                Ok(file) => match Decoder::new(BufReader::new(file)) {
                                    Ok(source) => {
                                        if let Some(ref sink) = effects_sink {
                                            sink.set_volume(volume);
                                            sink.append(source.convert_samples::<f32>());
                                        }
                                    }
                                    Err(e) => {
                                        warn!("failed to decode clip {}: {e}", path.display())
                                    }
                                },
                                Err(e) => {
                                    warn!("missing sound clip {}: {e}", path.display());
                                }
                            }
                        }
                        EffectCommand::StopAll => {
                            if let Some(old) = speech_sink.take() {
                                old.stop();
                            }
                            if let Some(old) = effects_sink.take() {
                                old.stop();
                            }
                            _stream = None;
                        }
                        EffectCommand::SetVolume(v) => {
                            volume = v.clamp(0.0, 1.0);
                            if let Some(ref sink) = speech_sink {
                                sink.set_volume(volume);
                            }
                            if let Some(ref sink) = effects_sink {
                                sink.set_volume(volume);
                            }
                        }
                    }
                }
            })
            .map_err(|e| e.to_string())?;

        let tx_clone = tx.clone();
        *self.tx.lock().map_err(|e| e.to_string())? = Some(tx);
        Ok(tx_clone)
    }

    fn send(&self, cmd: EffectCommand) -> Result<(), String> {
        let tx = self.ensure_thread()?;
        tx.send(cmd).map_err(|e| e.to_string())
    }

    /// Hands the synthesized audio to the engine thread and waits for the
    /// decode/output result, so the caller learns about a dead audio
    /// device or undecodable bytes before playback state advances.
    pub fn play_speech(&self, bytes: Vec<u8>) -> Result<(), String> {
        let (respond, result_rx) = mpsc::channel();
        self.send(EffectCommand::PlaySpeech { bytes, respond })?;
        result_rx
            .recv()
            .map_err(|_| "audio engine thread is gone".to_string())?
    }

    pub fn pause_speech(&self) -> Result<(), String> {
        self.send(EffectCommand::PauseSpeech)
    }

    pub fn resume_speech(&self) -> Result<(), String> {
        self.send(EffectCommand::ResumeSpeech)
    }

    pub fn seek_speech(&self, position: Duration) -> Result<(), String> {
        self.send(EffectCommand::SeekSpeech { position })
    }

    /// Plays the sound clip for a cue. Without a configured sounds
    /// directory (or with the clip missing) the cue stays visual-only.
    pub fn play_cue(&self, tag: CueTag) -> Result<(), String> {
        let Some(dir) = self.sounds_dir.read().unwrap().clone() else {
            return Ok(());
        };
        let path = dir.join(format!("{}.mp3", tag.file_stem()));
        self.send(EffectCommand::PlayClip { path })
    }

    pub fn stop(&self) -> Result<(), String> {
        if let Ok(Some(tx)) = self.tx.lock().map(|g| g.clone()) {
            let _ = tx.send(EffectCommand::StopAll);
        }
        Ok(())
    }

    pub fn set_volume(&self, volume: f32) -> Result<(), String> {
        self.send(EffectCommand::SetVolume(volume))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn play_speech_surfaces_unplayable_audio() {
        let engine = EffectsEngineHandle::new();
        // Not valid audio in any format rodio decodes; fails at the output
        // stage on machines without an audio device, at the decode stage
        // otherwise. Either way the caller must see the error.
        let result = engine.play_speech(vec![0u8; 64]);
        assert!(result.is_err());
    }

    #[test]
    fn cue_without_sounds_dir_is_a_silent_no_op() {
        let engine = EffectsEngineHandle::new();
        assert!(engine.play_cue(crate::roast::CueTag::Airhorn).is_ok());
    }
}
