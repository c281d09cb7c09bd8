pub mod cues;
pub mod markers;
pub mod timing;
pub mod tokens;

pub use cues::CuePoint;
pub use markers::{CueTag, ALL_CUE_TAGS};
pub use tokens::Token;

use serde::Serialize;
use uuid::Uuid;

use crate::config::CueConfig;

/// Everything the playback engine needs about one roast: the clean display
/// text, its token sequence, and the cue points (explicit or heuristic).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoastScript {
    pub id: String,
    pub clean_text: String,
    pub tokens: Vec<Token>,
    pub cues: Vec<CuePoint>,
    /// Whether cues came from explicit markers or the heuristic scan.
    pub explicit_cues: bool,
}

/// Runs normalization, segmentation and cue location over raw generator
/// output. Falls back to the heuristic cue scan when the text carries no
/// explicit markers.
pub fn prepare_script(raw: &str, cue_config: &CueConfig) -> RoastScript {
    let (clean_text, markers) = markers::extract_markers(raw);
    let tokens = tokens::tokenize(&clean_text);

    let explicit_cues = !markers.is_empty();
    let cues = if explicit_cues {
        cues::locate_cues(&markers, &tokens)
    } else {
        cues::heuristic_cues(&tokens, cue_config)
    };

    RoastScript {
        id: Uuid::new_v4().to_string(),
        clean_text,
        tokens,
        cues,
        explicit_cues,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marked_text_uses_explicit_cues() {
        let script = prepare_script(
            "Nice try. [AIRHORN] That repo has three commits and two are typos. [FATALITY]",
            &CueConfig::default(),
        );

        assert!(script.explicit_cues);
        assert_eq!(script.cues.len(), 2);
        assert_eq!(
            script.clean_text,
            "Nice try. That repo has three commits and two are typos."
        );
        assert_eq!(script.tokens.len(), 11);
    }

    #[test]
    fn unmarked_text_falls_back_to_heuristics() {
        let script = prepare_script("Every repo is abandoned and dead.", &CueConfig::default());
        assert!(!script.explicit_cues);
        for cue in &script.cues {
            assert!(cue.token_index < script.tokens.len());
        }
    }
}
