use serde::{Deserialize, Serialize};

/// Closed vocabulary of sound-effect cues the generator may embed inline as
/// bracketed markers, e.g. `[AIRHORN]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CueTag {
    Airhorn,
    Oof,
    Bruh,
    EmotionalDamage,
    ThugLife,
    Wow,
    Fatality,
}

pub const ALL_CUE_TAGS: [CueTag; 7] = [
    CueTag::Airhorn,
    CueTag::Oof,
    CueTag::Bruh,
    CueTag::EmotionalDamage,
    CueTag::ThugLife,
    CueTag::Wow,
    CueTag::Fatality,
];

impl CueTag {
    /// Marker spelling inside brackets, matched case-insensitively.
    pub fn marker_name(self) -> &'static str {
        match self {
            CueTag::Airhorn => "AIRHORN",
            CueTag::Oof => "OOF",
            CueTag::Bruh => "BRUH",
            CueTag::EmotionalDamage => "EMOTIONAL-DAMAGE",
            CueTag::ThugLife => "THUG-LIFE",
            CueTag::Wow => "WOW",
            CueTag::Fatality => "FATALITY",
        }
    }

    /// File stem of the bundled sound clip for this cue.
    pub fn file_stem(self) -> &'static str {
        match self {
            CueTag::Airhorn => "airhorn",
            CueTag::Oof => "oof",
            CueTag::Bruh => "bruh",
            CueTag::EmotionalDamage => "emotional-damage",
            CueTag::ThugLife => "thug-life",
            CueTag::Wow => "wow",
            CueTag::Fatality => "fatality",
        }
    }

    pub fn from_marker_name(name: &str) -> Option<Self> {
        let upper = name.to_ascii_uppercase();
        ALL_CUE_TAGS
            .into_iter()
            .find(|tag| tag.marker_name() == upper)
    }
}

/// A marker extracted from raw generator output. `offset` is the char
/// position the marker anchors to in the cleaned, whitespace-normalized
/// text (the start of the word that followed it, or one past the end for a
/// trailing marker).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CueMarker {
    pub tag: CueTag,
    pub offset: usize,
}

/// Strips all recognized cue markers from raw generator output.
///
/// Returns the clean display text plus the extracted markers. The clean
/// text is whitespace-normalized as a side effect of stripping: word gaps
/// collapse to a single space and blank lines collapse to a single `\n\n`
/// paragraph separator, so recorded offsets index directly into the text
/// the tokenizer will see. Unrecognized bracketed words are left verbatim.
pub fn extract_markers(raw: &str) -> (String, Vec<CueMarker>) {
    let mut clean = String::new();
    let mut markers: Vec<CueMarker> = Vec::new();

    // Markers waiting for the start of the next word to anchor to.
    let mut pending_tags: Vec<CueTag> = Vec::new();
    let mut saw_whitespace = false;
    let mut newline_count = 0usize;

    let bytes = raw.as_bytes();
    let mut i = 0;
    while i < raw.len() {
        if bytes[i] == b'[' {
            if let Some((tag, end)) = parse_marker(raw, i) {
                pending_tags.push(tag);
                i = end;
                continue;
            }
        }

        // i always lands on a char boundary.
        let Some(ch) = raw[i..].chars().next() else {
            break;
        };
        if ch.is_whitespace() {
            saw_whitespace = true;
            if ch == '\n' {
                newline_count += 1;
            }
        } else {
            if saw_whitespace && !clean.is_empty() {
                if newline_count >= 2 {
                    clean.push_str("\n\n");
                } else {
                    clean.push(' ');
                }
            }
            saw_whitespace = false;
            newline_count = 0;

            for tag in pending_tags.drain(..) {
                markers.push(CueMarker {
                    tag,
                    offset: clean.len(),
                });
            }
            clean.push(ch);
        }
        i += ch.len_utf8();
    }

    // Trailing markers anchor past the end; the cue locator clamps them to
    // the final word.
    for tag in pending_tags.drain(..) {
        markers.push(CueMarker {
            tag,
            offset: clean.len(),
        });
    }

    (clean, markers)
}

/// Tries to parse a `[TAG]` marker starting at byte `start`. Returns the
/// tag and the byte offset just past the closing bracket.
fn parse_marker(raw: &str, start: usize) -> Option<(CueTag, usize)> {
    let rest = &raw[start + 1..];
    let close = rest.find(']')?;
    let name = &rest[..close];
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphabetic() || c == '-') {
        return None;
    }
    let tag = CueTag::from_marker_name(name)?;
    Some((tag, start + 1 + close + 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_all_markers_and_strips_brackets() {
        let raw = "Nice try. [AIRHORN] That repo has three commits and two are typos. [FATALITY]";
        let (clean, markers) = extract_markers(raw);

        assert_eq!(
            clean,
            "Nice try. That repo has three commits and two are typos."
        );
        assert_eq!(markers.len(), 2);
        assert_eq!(markers[0].tag, CueTag::Airhorn);
        assert_eq!(markers[1].tag, CueTag::Fatality);
        assert!(!clean.contains('['));
        assert!(!clean.contains(']'));
    }

    #[test]
    fn marker_anchors_to_following_word() {
        let raw = "Nice try. [AIRHORN] That repo";
        let (clean, markers) = extract_markers(raw);
        // "That" starts at char 10 of the clean text.
        assert_eq!(&clean[markers[0].offset..markers[0].offset + 4], "That");
    }

    #[test]
    fn trailing_marker_anchors_past_end() {
        let (clean, markers) = extract_markers("You tried. [OOF]");
        assert_eq!(clean, "You tried.");
        assert_eq!(markers[0].offset, clean.len());
    }

    #[test]
    fn leading_and_adjacent_markers() {
        let (clean, markers) = extract_markers("[WOW][BRUH] bold move");
        assert_eq!(clean, "bold move");
        assert_eq!(markers.len(), 2);
        assert_eq!(markers[0].offset, 0);
        assert_eq!(markers[1].offset, 0);
        assert_eq!(markers[0].tag, CueTag::Wow);
        assert_eq!(markers[1].tag, CueTag::Bruh);
    }

    #[test]
    fn markers_are_case_insensitive() {
        let (_, markers) = extract_markers("ouch [emotional-damage] indeed");
        assert_eq!(markers[0].tag, CueTag::EmotionalDamage);
    }

    #[test]
    fn unknown_brackets_survive() {
        let (clean, markers) = extract_markers("see [citation] and [NOT-A-CUE] here");
        assert!(markers.is_empty());
        assert_eq!(clean, "see [citation] and [NOT-A-CUE] here");
    }

    #[test]
    fn zero_markers_is_not_an_error() {
        let (clean, markers) = extract_markers("plain text only");
        assert_eq!(clean, "plain text only");
        assert!(markers.is_empty());
    }

    #[test]
    fn paragraph_breaks_survive_normalization() {
        let (clean, _) = extract_markers("first part. [BRUH]\n\n\nsecond   part");
        assert_eq!(clean, "first part.\n\nsecond part");
    }
}
