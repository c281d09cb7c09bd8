pub mod elevenlabs;
pub mod optimize;

pub use elevenlabs::ElevenLabsClient;
pub use optimize::optimize_for_speech;

use log::{info, warn};
use std::io::Cursor;

use crate::config::Intensity;

/// Result of speech acquisition: either synthesized audio, or instructions
/// for the UI layer's on-device synthesizer plus an estimated duration.
#[derive(Debug, Clone)]
pub enum SpeechOutcome {
    Audio { bytes: Vec<u8>, duration_ms: f64 },
    Fallback { text: String, duration_ms: f64 },
}

impl SpeechOutcome {
    pub fn duration_ms(&self) -> f64 {
        match self {
            SpeechOutcome::Audio { duration_ms, .. } => *duration_ms,
            SpeechOutcome::Fallback { duration_ms, .. } => *duration_ms,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, SpeechOutcome::Fallback { .. })
    }
}

/// Requests synthesized speech for clean roast text, degrading to the
/// on-device fallback on quota exhaustion or any backend failure. Pure
/// request/response mapping; no state beyond the HTTP client.
#[derive(Clone)]
pub struct SpeechPipeline {
    tts: Option<ElevenLabsClient>,
}

impl SpeechPipeline {
    pub fn new(tts: Option<ElevenLabsClient>) -> Self {
        Self { tts }
    }

    pub async fn acquire(&self, clean_text: &str, intensity: Intensity) -> SpeechOutcome {
        let spoken = optimize_for_speech(clean_text);
        let estimate_ms = estimate_duration_ms(&spoken, intensity);

        let Some(tts) = &self.tts else {
            return SpeechOutcome::Fallback {
                text: spoken,
                duration_ms: estimate_ms,
            };
        };

        match tts.synthesize(&spoken, intensity).await {
            Ok(bytes) => {
                let duration_ms = probe_audio_duration_ms(&bytes).unwrap_or(estimate_ms);
                info!(
                    "synthesized {} bytes of speech ({:.1}s)",
                    bytes.len(),
                    duration_ms / 1000.0
                );
                SpeechOutcome::Audio { bytes, duration_ms }
            }
            Err(err) if err.is_speech_recoverable() => {
                warn!("remote speech unavailable, using on-device fallback: {err}");
                SpeechOutcome::Fallback {
                    text: spoken,
                    duration_ms: estimate_ms,
                }
            }
            Err(err) => {
                warn!("speech synthesis failed, using on-device fallback: {err}");
                SpeechOutcome::Fallback {
                    text: spoken,
                    duration_ms: estimate_ms,
                }
            }
        }
    }
}

/// Duration estimate used when no real audio clock exists: text length
/// scaled by the intensity's estimated speech rate.
pub fn estimate_duration_ms(text: &str, intensity: Intensity) -> f64 {
    text.chars().count() as f64 * intensity.per_char_ms()
}

/// Decodes the audio header to learn the real duration, when the decoder
/// can report one.
fn probe_audio_duration_ms(bytes: &[u8]) -> Option<f64> {
    let decoder = rodio::Decoder::new(Cursor::new(bytes.to_vec())).ok()?;
    rodio::Source::total_duration(&decoder).map(|d| d.as_secs_f64() * 1000.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn estimate_is_nonzero_and_scales_with_intensity() {
        let text = "Your repos are a graveyard of good intentions.";
        let mild = estimate_duration_ms(text, Intensity::Mild);
        let no_mercy = estimate_duration_ms(text, Intensity::NoMercy);

        assert!(mild > 0.0);
        assert!(no_mercy > 0.0);
        // Harsher roasts are spoken faster.
        assert!(no_mercy < mild);
    }

    #[tokio::test]
    async fn pipeline_without_client_falls_back() {
        let pipeline = SpeechPipeline::new(None);
        let outcome = pipeline
            .acquire("Nice try. That repo has three commits.", Intensity::Spicy)
            .await;

        assert!(outcome.is_fallback());
        assert!(outcome.duration_ms() > 0.0);
        if let SpeechOutcome::Fallback { text, .. } = outcome {
            assert!(!text.is_empty());
        }
    }
}
