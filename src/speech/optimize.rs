use regex::Regex;
use std::sync::OnceLock;

/// Hard cap on spoken words, to keep synthesis cost bounded.
const MAX_SPOKEN_WORDS: usize = 150;

/// Filler openers the generator likes to pad roasts with; stripping them
/// shortens the synthesized audio without losing any jokes.
const FILLER_PHRASES: &[&str] = &[
    "I have to say",
    "to be honest",
    "let me tell you",
    "I must admit",
    "it's worth noting that",
    "I can't help but notice",
    "needless to say",
    "as you can see",
    "it goes without saying",
    "in my opinion",
    "if you ask me",
    "in my humble opinion",
    "to put it bluntly",
    "frankly speaking",
    "to be perfectly honest",
    "to be fair",
    "to tell you the truth",
    "to put it simply",
    "to put it mildly",
    "to sum it up",
];

fn code_fence_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"```[\s\S]*?```").expect("code fence pattern is valid"))
}

fn inline_code_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"`([^`]+)`").expect("inline code pattern is valid"))
}

fn filler_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        let alternation = FILLER_PHRASES
            .iter()
            .map(|p| regex::escape(p))
            .collect::<Vec<_>>()
            .join("|");
        Regex::new(&format!("(?i)({alternation})")).expect("filler pattern is valid")
    })
}

fn excess_newlines_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n{3,}").expect("newline pattern is valid"))
}

/// Cleans roast text before sending it to the TTS backend: markdown and
/// filler phrases are removed and the result is capped at a whole-word
/// boundary. Never splits inside a word.
pub fn optimize_for_speech(text: &str) -> String {
    let mut optimized = code_fence_re().replace_all(text, "").into_owned();
    optimized = inline_code_re().replace_all(&optimized, "$1").into_owned();
    optimized = optimized.replace("**", "").replace('*', "");
    optimized = excess_newlines_re()
        .replace_all(&optimized, "\n\n")
        .into_owned();
    optimized = filler_re().replace_all(&optimized, "").into_owned();

    let words: Vec<&str> = optimized.split_whitespace().collect();
    if words.len() > MAX_SPOKEN_WORDS {
        words[..MAX_SPOKEN_WORDS].join(" ")
    } else {
        words.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_markdown() {
        let out = optimize_for_speech("**bold** and *starred* plus `inline` and ```\ncode\n```");
        assert!(!out.contains('*'));
        assert!(!out.contains('`'));
        assert!(out.contains("inline"));
        assert!(!out.contains("code"));
    }

    #[test]
    fn strips_filler_phrases() {
        let out = optimize_for_speech("To be honest, your repos are a graveyard.");
        assert!(!out.to_lowercase().contains("to be honest"));
        assert!(out.contains("your repos are a graveyard."));
    }

    #[test]
    fn caps_word_count_without_splitting_words() {
        let long: String = std::iter::repeat("supercalifragilistic")
            .take(300)
            .collect::<Vec<_>>()
            .join(" ");
        let out = optimize_for_speech(&long);

        let words: Vec<&str> = out.split_whitespace().collect();
        assert_eq!(words.len(), MAX_SPOKEN_WORDS);
        assert!(words.iter().all(|w| *w == "supercalifragilistic"));
    }

    #[test]
    fn short_text_passes_through() {
        assert_eq!(optimize_for_speech("short and sweet"), "short and sweet");
    }
}
