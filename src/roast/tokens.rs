use serde::Serialize;

/// One display unit of the clean roast text: a word, or a paragraph-break
/// sentinel (empty text). Regenerated fresh per roast, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    pub index: usize,
    pub text: String,
    /// Char offset of the token in the clean text. Sentinels carry the
    /// offset of their paragraph separator.
    pub start: usize,
    pub ends_sentence: bool,
}

impl Token {
    pub fn is_paragraph_break(&self) -> bool {
        self.text.is_empty()
    }
}

/// Splits whitespace-normalized clean text into an ordered token sequence.
/// Paragraph separators (`\n\n`) become sentinel tokens; empty fragments
/// are discarded. Deterministic and idempotent.
pub fn tokenize(clean: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut cursor: usize = 0;

    for (para_index, paragraph) in clean.split("\n\n").enumerate() {
        if para_index > 0 {
            tokens.push(Token {
                index: tokens.len(),
                text: String::new(),
                start: cursor.saturating_sub(2),
                ends_sentence: false,
            });
        }

        let mut offset_in_para = 0;
        for word in paragraph.split(' ') {
            if !word.is_empty() {
                tokens.push(Token {
                    index: tokens.len(),
                    text: word.to_string(),
                    start: cursor + offset_in_para,
                    ends_sentence: ends_sentence(word),
                });
            }
            offset_in_para += word.len() + 1;
        }

        cursor += paragraph.len() + 2;
    }

    tokens
}

fn ends_sentence(word: &str) -> bool {
    let trimmed = word.trim_end_matches(['"', '\'', ')', ']']);
    trimmed.ends_with(['.', '!', '?'])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rebuild(tokens: &[Token]) -> String {
        let mut out = String::new();
        for token in tokens {
            if token.is_paragraph_break() {
                out = out.trim_end().to_string();
                out.push_str("\n\n");
            } else {
                out.push_str(&token.text);
                out.push(' ');
            }
        }
        out.trim_end().to_string()
    }

    #[test]
    fn round_trips_clean_text() {
        let clean = "Nice try. That repo has three commits and two are typos.";
        let tokens = tokenize(clean);
        assert_eq!(rebuild(&tokens), clean);
    }

    #[test]
    fn paragraph_breaks_become_sentinels() {
        let clean = "first part.\n\nsecond part";
        let tokens = tokenize(clean);

        let sentinel = tokens.iter().find(|t| t.is_paragraph_break()).unwrap();
        assert_eq!(sentinel.index, 2);
        assert_eq!(rebuild(&tokens), clean);
    }

    #[test]
    fn indices_are_dense_and_starts_match_text() {
        let clean = "one two three.";
        let tokens = tokenize(clean);
        for (i, token) in tokens.iter().enumerate() {
            assert_eq!(token.index, i);
            assert_eq!(&clean[token.start..token.start + token.text.len()], token.text);
        }
    }

    #[test]
    fn idempotent_over_same_input() {
        let clean = "same in.\n\nsame out.";
        assert_eq!(tokenize(clean), tokenize(clean));
    }

    #[test]
    fn sentence_ends_detected() {
        let tokens = tokenize("really? yes. sure!");
        assert!(tokens.iter().all(|t| t.ends_sentence));

        let tokens = tokenize("no punctuation here");
        assert!(tokens.iter().all(|t| !t.ends_sentence));
    }

    #[test]
    fn empty_text_yields_no_tokens() {
        assert!(tokenize("").is_empty());
    }
}
