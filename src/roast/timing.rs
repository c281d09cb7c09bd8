use crate::config::TimingConfig;

use super::tokens::Token;

/// Builds the per-token start-time schedule (milliseconds) for a given
/// total duration. Longer words and sentence-final words are held longer,
/// paragraph sentinels shorter; the whole sequence is rescaled so the last
/// start time equals the duration exactly.
pub fn build_schedule(tokens: &[Token], duration_ms: f64, config: &TimingConfig) -> Vec<f64> {
    if tokens.is_empty() {
        return Vec::new();
    }
    if tokens.len() == 1 {
        // Rescaling is undefined for a single token; it is active for the
        // whole duration.
        return vec![0.0];
    }

    let base = duration_ms / tokens.len() as f64;

    let mut raw = Vec::with_capacity(tokens.len());
    let mut acc = 0.0;
    for token in tokens {
        raw.push(acc);
        acc += base * token_factor(token, config);
    }

    let last = raw[raw.len() - 1];
    if last <= 0.0 {
        // Zero-length playback; every token starts immediately.
        return raw;
    }
    raw.iter().map(|start| start * duration_ms / last).collect()
}

fn token_factor(token: &Token, config: &TimingConfig) -> f64 {
    if token.is_paragraph_break() {
        return config.paragraph_factor;
    }

    let mut factor = 1.0;
    let len = token.text.chars().count();
    if len > config.long_word_chars {
        factor *= config.long_word_factor;
    } else if len > config.medium_word_chars {
        factor *= config.medium_word_factor;
    }
    if token.ends_sentence {
        factor *= config.sentence_end_factor;
    }
    factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roast::tokens::tokenize;

    const EPSILON: f64 = 1e-6;

    #[test]
    fn schedule_matches_token_count_and_bounds() {
        let tokens = tokenize("Nice try. That repo has three commits and two are typos.");
        let duration = 7_500.0;
        let schedule = build_schedule(&tokens, duration, &TimingConfig::default());

        assert_eq!(schedule.len(), tokens.len());
        assert_eq!(schedule[0], 0.0);
        for pair in schedule.windows(2) {
            assert!(pair[1] >= pair[0]);
        }
        assert!((schedule.last().unwrap() - duration).abs() < EPSILON);
    }

    #[test]
    fn long_words_get_more_time() {
        let tokens = tokenize("a extraordinarily b c");
        let schedule = build_schedule(&tokens, 4_000.0, &TimingConfig::default());

        let short_gap = schedule[1] - schedule[0];
        let long_gap = schedule[2] - schedule[1];
        assert!(long_gap > short_gap);
    }

    #[test]
    fn sentence_ends_get_more_time() {
        let tokens = tokenize("one two. three four");
        let schedule = build_schedule(&tokens, 4_000.0, &TimingConfig::default());

        let plain_gap = schedule[1] - schedule[0];
        let sentence_gap = schedule[2] - schedule[1];
        assert!(sentence_gap > plain_gap);
    }

    #[test]
    fn paragraph_sentinels_get_less_time() {
        let tokens = tokenize("one two\n\nthree four");
        let sentinel = tokens.iter().position(|t| t.is_paragraph_break()).unwrap();
        let schedule = build_schedule(&tokens, 5_000.0, &TimingConfig::default());

        let word_gap = schedule[1] - schedule[0];
        let sentinel_gap = schedule[sentinel + 1] - schedule[sentinel];
        assert!(sentinel_gap < word_gap);
    }

    #[test]
    fn empty_tokens_empty_schedule() {
        assert!(build_schedule(&[], 3_000.0, &TimingConfig::default()).is_empty());
    }

    #[test]
    fn single_token_starts_at_zero() {
        let tokens = tokenize("hi");
        assert_eq!(
            build_schedule(&tokens, 1_000.0, &TimingConfig::default()),
            vec![0.0]
        );
    }
}
