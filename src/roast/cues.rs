use rand::seq::SliceRandom;
use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

use crate::config::CueConfig;

use super::markers::{CueMarker, CueTag};
use super::tokens::Token;

/// A cue anchored to a token index. At most one cue per token on the
/// explicit-marker path; the heuristic path may coincidentally collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CuePoint {
    pub token_index: usize,
    pub tag: CueTag,
}

/// Maps explicit marker offsets onto token indices: each marker lands on
/// the first word token starting at or after its offset, clamped to the
/// last word. Duplicate token indices keep the first marker only.
pub fn locate_cues(markers: &[CueMarker], tokens: &[Token]) -> Vec<CuePoint> {
    let words: Vec<&Token> = tokens.iter().filter(|t| !t.is_paragraph_break()).collect();
    if words.is_empty() {
        return Vec::new();
    }

    let last_word_index = words[words.len() - 1].index;
    let mut cues: Vec<CuePoint> = Vec::new();
    for marker in markers {
        let token_index = words
            .iter()
            .find(|t| t.start >= marker.offset)
            .map(|t| t.index)
            .unwrap_or(last_word_index);

        if cues.iter().any(|c| c.token_index == token_index) {
            continue;
        }
        cues.push(CuePoint {
            token_index,
            tag: marker.tag,
        });
    }

    cues.sort_by_key(|c| c.token_index);
    cues
}

struct CueRule {
    pattern: Regex,
    tag: CueTag,
}

/// Ordered trigger-vocabulary rules for roasts that arrive without
/// explicit markers. First match per sentence wins.
fn cue_rules() -> &'static [CueRule] {
    static RULES: OnceLock<Vec<CueRule>> = OnceLock::new();
    RULES.get_or_init(|| {
        let table: [(&str, CueTag); 7] = [
            (
                r"(?i)\b(savage|brutal|destroy|obliterat|devastat)",
                CueTag::EmotionalDamage,
            ),
            (
                r"(?i)\b(delete|give up|quit|start over|uninstall)",
                CueTag::Fatality,
            ),
            (r"(?i)\b(wow|impressive|amazing|incredible)\b", CueTag::Wow),
            (
                r"(?i)\b(abandon|dead|dust|graveyard|ghost)",
                CueTag::Oof,
            ),
            (r"(?i)\b(commit|push|merge|fork|typo)", CueTag::Bruh),
            (r"(?i)\b(star|follower|clout|trophy)", CueTag::Airhorn),
            (
                r"(?i)\b(bold|fearless|gangster|confident)",
                CueTag::ThugLife,
            ),
        ];
        table
            .into_iter()
            .map(|(pattern, tag)| CueRule {
                pattern: Regex::new(pattern).expect("cue rule pattern is valid"),
                tag,
            })
            .collect()
    })
}

/// Synthesizes cue points when the generator embedded no markers. Scans a
/// rolling sentence buffer against the rule table, then randomly subsamples
/// candidates down to `min(cap, candidates / 2)`. Intentionally
/// non-deterministic so repeated roasts place cues differently.
pub fn heuristic_cues(tokens: &[Token], config: &CueConfig) -> Vec<CuePoint> {
    let candidates = heuristic_candidates(tokens, config);

    let cap = config.max_heuristic_cues.min(candidates.len() / 2);
    if candidates.len() > cap && cap > 0 {
        let mut rng = rand::thread_rng();
        let mut picked: Vec<CuePoint> = candidates
            .choose_multiple(&mut rng, cap)
            .copied()
            .collect();
        picked.sort_by_key(|c| c.token_index);
        return picked;
    }

    candidates
}

/// The full candidate list, before subsampling. Exposed so tests can pin
/// the deterministic part of the heuristic.
pub fn heuristic_candidates(tokens: &[Token], config: &CueConfig) -> Vec<CuePoint> {
    let mut candidates = Vec::new();
    let mut buffer: Vec<&str> = Vec::new();

    for token in tokens {
        if token.is_paragraph_break() {
            buffer.clear();
            continue;
        }

        buffer.push(&token.text);
        if token.ends_sentence || buffer.len() >= config.max_sentence_words {
            let sentence = buffer.join(" ");
            if let Some(rule) = cue_rules().iter().find(|r| r.pattern.is_match(&sentence)) {
                candidates.push(CuePoint {
                    token_index: token.index,
                    tag: rule.tag,
                });
                buffer.clear();
            } else if token.ends_sentence {
                // Past the word threshold the buffer keeps growing until a
                // rule matches, so a trigger phrase straddling the window
                // is still caught; only terminal punctuation discards it.
                buffer.clear();
            }
        }
    }

    candidates
}
