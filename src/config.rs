use serde::{Deserialize, Serialize};

/// User-selected roast harshness. Shapes the LLM prompt, the TTS voice
/// settings, and the estimated speech rate used when the remote voice is
/// unavailable.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Intensity {
    Mild,
    Medium,
    Spicy,
    NoMercy,
}

impl Default for Intensity {
    fn default() -> Self {
        Intensity::Medium
    }
}

impl Intensity {
    /// Sampling temperature for the roast generation request.
    pub fn temperature(self) -> f32 {
        match self {
            Intensity::Mild => 0.5,
            Intensity::Medium => 0.7,
            Intensity::Spicy => 0.8,
            Intensity::NoMercy => 0.9,
        }
    }

    /// Estimated speech rate for the on-device fallback synthesizer.
    /// Harsher roasts are delivered faster.
    pub fn per_char_ms(self) -> f64 {
        match self {
            Intensity::Mild => 75.0,
            Intensity::Medium => 65.0,
            Intensity::Spicy => 58.0,
            Intensity::NoMercy => 50.0,
        }
    }

    /// ElevenLabs voice stability; lower values sound more unhinged.
    pub fn voice_stability(self) -> f32 {
        match self {
            Intensity::Mild => 0.7,
            Intensity::Medium => 0.5,
            Intensity::Spicy => 0.4,
            Intensity::NoMercy => 0.3,
        }
    }

    /// ElevenLabs style exaggeration.
    pub fn voice_style(self) -> f32 {
        match self {
            Intensity::Mild => 0.1,
            Intensity::Medium => 0.3,
            Intensity::Spicy => 0.55,
            Intensity::NoMercy => 0.8,
        }
    }
}

/// Tunables for the heuristic cue locator.
#[derive(Debug, Clone)]
pub struct CueConfig {
    /// A sentence buffer longer than this is tested against the rules even
    /// without terminal punctuation.
    pub max_sentence_words: usize,

    /// Hard cap on heuristic cue points per roast. The effective cap is
    /// `min(max_heuristic_cues, candidates / 2)`.
    pub max_heuristic_cues: usize,
}

impl Default for CueConfig {
    fn default() -> Self {
        Self {
            max_sentence_words: 12,
            max_heuristic_cues: 6,
        }
    }
}

/// Tunables for the ambient effect scheduler.
#[derive(Debug, Clone)]
pub struct AmbientConfig {
    pub min_gap_ms: u64,
    pub max_gap_ms: u64,
    /// Cap on ambient effects per playback.
    pub max_effects: usize,
}

impl Default for AmbientConfig {
    fn default() -> Self {
        Self {
            min_gap_ms: 5_000,
            max_gap_ms: 10_000,
            max_effects: 12,
        }
    }
}

/// Weights for the per-token timing model.
#[derive(Debug, Clone)]
pub struct TimingConfig {
    /// Words longer than this get the long-word factor.
    pub long_word_chars: usize,
    /// Words longer than this (but not long) get the medium-word factor.
    pub medium_word_chars: usize,

    pub long_word_factor: f64,
    pub medium_word_factor: f64,
    pub sentence_end_factor: f64,
    pub paragraph_factor: f64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            long_word_chars: 8,
            medium_word_chars: 5,
            long_word_factor: 1.5,
            medium_word_factor: 1.2,
            sentence_end_factor: 1.5,
            paragraph_factor: 0.5,
        }
    }
}
