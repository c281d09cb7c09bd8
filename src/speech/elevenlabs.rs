use log::{error, warn};
use serde::Serialize;

use crate::config::Intensity;
use crate::error::RoastError;

const API_BASE: &str = "https://api.elevenlabs.io/v1/text-to-speech";
const MODEL_ID: &str = "eleven_monolingual_v1";
// "Antoni" voice.
const DEFAULT_VOICE_ID: &str = "ErXwobaYiN019PkySvjV";

#[derive(Serialize)]
struct VoiceSettings {
    stability: f32,
    similarity_boost: f32,
    style: f32,
}

#[derive(Serialize)]
struct SynthesisRequest<'a> {
    text: &'a str,
    model_id: &'static str,
    voice_settings: VoiceSettings,
}

/// Remote TTS client. Quota and rate-limit responses are reported as
/// `SpeechQuotaExhausted` so the pipeline can degrade to on-device speech.
#[derive(Clone)]
pub struct ElevenLabsClient {
    http: reqwest::Client,
    api_key: String,
    voice_id: String,
}

impl ElevenLabsClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.into(),
            voice_id: DEFAULT_VOICE_ID.to_string(),
        }
    }

    pub fn from_env() -> Option<Self> {
        match std::env::var("ELEVENLABS_API_KEY") {
            Ok(key) if !key.is_empty() => Some(Self::new(key)),
            _ => {
                warn!("ELEVENLABS_API_KEY not set; speech will use the on-device fallback");
                None
            }
        }
    }

    pub async fn synthesize(
        &self,
        text: &str,
        intensity: Intensity,
    ) -> Result<Vec<u8>, RoastError> {
        let body = SynthesisRequest {
            text,
            model_id: MODEL_ID,
            voice_settings: VoiceSettings {
                stability: intensity.voice_stability(),
                similarity_boost: 0.75,
                style: intensity.voice_style(),
            },
        };

        let response = self
            .http
            .post(format!("{API_BASE}/{}", self.voice_id))
            .header("accept", "audio/mpeg")
            .header("xi-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|err| RoastError::SpeechBackendError(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            error!("elevenlabs request failed ({status}): {detail}");

            if status.as_u16() == 429 || detail.contains("quota") || detail.contains("limit") {
                return Err(RoastError::SpeechQuotaExhausted);
            }
            return Err(RoastError::SpeechBackendError(format!(
                "synthesis failed with status {status}"
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|err| RoastError::SpeechBackendError(err.to_string()))?;
        Ok(bytes.to_vec())
    }
}
