use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::config::Intensity;
use crate::error::RoastError;

const API_URL: &str = "https://api.openai.com/v1/chat/completions";
const MODEL: &str = "gpt-4o";
const MAX_TOKENS: u32 = 500;

const BASE_PROMPT: &str = "You are a comedy roast bot analyzing a GitHub profile. \
Create a funny, clever roast based on the GitHub data provided. Be witty and creative, \
focusing on their coding habits, repository choices, and activity patterns. \
The roast should be humorous but not excessively mean.";

const NO_MERCY_PROMPT: &str = "You are a brutal roast comedian analyzing a GitHub profile. \
ABSOLUTELY OBLITERATE THEM WITH NO MERCY, but always use proper English and avoid gibberish. \
Tear apart their coding style, project choices, commit history, language preferences and \
documentation. Be extremely specific - use real details from their profile, never invented ones. \
Keep your roast under 150 words maximum, in simple, direct, devastating language.";

const MARKER_PROMPT: &str = "Where a line lands hardest, embed one of these sound-effect \
markers inline, brackets included: [AIRHORN] [OOF] [BRUH] [EMOTIONAL-DAMAGE] [THUG-LIFE] \
[WOW] [FATALITY]. Use two to four markers total and nothing outside that list.";

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'static str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

/// Builds the intensity-shaped system prompt, always instructing the model
/// to embed cue markers from the closed vocabulary.
pub fn system_prompt(intensity: Intensity) -> String {
    let body = match intensity {
        Intensity::Mild => format!(
            "{BASE_PROMPT} Keep it light and playful, with gentle teasing. \
             Focus more on silly observations than criticism."
        ),
        Intensity::Medium => BASE_PROMPT.to_string(),
        Intensity::Spicy => format!(
            "{BASE_PROMPT} Turn up the heat: sharper jabs, more pointed observations, \
             still clever rather than cruel."
        ),
        Intensity::NoMercy => NO_MERCY_PROMPT.to_string(),
    };
    format!("{body}\n\n{MARKER_PROMPT}")
}

/// Roast-generation client for the OpenAI chat completions API.
#[derive(Clone)]
pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: String,
}

impl OpenAiClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.into(),
        }
    }

    pub fn from_env() -> Option<Self> {
        match std::env::var("OPENAI_API_KEY") {
            Ok(key) if !key.is_empty() => Some(Self::new(key)),
            _ => {
                warn!("OPENAI_API_KEY not set; roast generation is unavailable");
                None
            }
        }
    }

    pub async fn generate_roast(
        &self,
        profile_summary: &str,
        intensity: Intensity,
    ) -> Result<String, RoastError> {
        let prompt = system_prompt(intensity);
        let user_message = format!(
            "Roast this GitHub user based on their profile information:\n\n{profile_summary}"
        );

        let body = ChatRequest {
            model: MODEL,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &prompt,
                },
                ChatMessage {
                    role: "user",
                    content: &user_message,
                },
            ],
            temperature: intensity.temperature(),
            max_tokens: MAX_TOKENS,
        };

        info!("requesting roast (intensity {intensity:?}, temperature {})", body.temperature);

        let response = self
            .http
            .post(API_URL)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|err| RoastError::GenerationFailed(err.to_string()))?;

        if response.status().as_u16() == 429 {
            return Err(RoastError::UpstreamRateLimited { service: "OpenAI" });
        }
        if !response.status().is_success() {
            return Err(RoastError::GenerationFailed(format!(
                "completion request failed with status {}",
                response.status()
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|err| RoastError::GenerationFailed(err.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| RoastError::GenerationFailed("model returned no content".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompts_vary_with_intensity() {
        let mild = system_prompt(Intensity::Mild);
        let medium = system_prompt(Intensity::Medium);
        let no_mercy = system_prompt(Intensity::NoMercy);

        assert!(mild.contains("light and playful"));
        assert!(no_mercy.contains("NO MERCY"));
        assert_ne!(mild, medium);
        assert_ne!(medium, no_mercy);
    }

    #[test]
    fn every_prompt_requests_markers() {
        for intensity in [
            Intensity::Mild,
            Intensity::Medium,
            Intensity::Spicy,
            Intensity::NoMercy,
        ] {
            let prompt = system_prompt(intensity);
            assert!(prompt.contains("[AIRHORN]"));
            assert!(prompt.contains("[FATALITY]"));
        }
    }

    #[test]
    fn temperature_rises_with_intensity() {
        assert!(Intensity::Mild.temperature() < Intensity::Medium.temperature());
        assert!(Intensity::Medium.temperature() < Intensity::Spicy.temperature());
        assert!(Intensity::Spicy.temperature() < Intensity::NoMercy.temperature());
    }
}
