use thiserror::Error;

/// Error taxonomy for the roast pipeline. Backend errors are translated into
/// one of these kinds at the boundary clients; raw upstream bodies never
/// reach the playback core.
#[derive(Debug, Error)]
pub enum RoastError {
    #[error("GitHub user '{0}' not found")]
    UpstreamNotFound(String),

    #[error("{service} rate limit exceeded, try again later")]
    UpstreamRateLimited { service: &'static str },

    #[error("failed to generate roast: {0}")]
    GenerationFailed(String),

    #[error("speech quota exhausted")]
    SpeechQuotaExhausted,

    #[error("speech backend error: {0}")]
    SpeechBackendError(String),

    #[error("playback error: {0}")]
    PlaybackError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RoastError {
    /// Speech failures degrade to the on-device fallback instead of
    /// surfacing as hard errors.
    pub fn is_speech_recoverable(&self) -> bool {
        matches!(
            self,
            RoastError::SpeechQuotaExhausted | RoastError::SpeechBackendError(_)
        )
    }
}
