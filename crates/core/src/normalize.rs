//! Plain-text derivation and display statistics for generated text.
//!
//! The plain variant is produced by deleting heading and emphasis marker
//! characters. Nothing else changes: links, URLs and other punctuation stay as
//! they are, and escaped or nested markers get no special treatment.

use serde::Serialize;

/// Characters removed when deriving the plain-text variant.
pub const MARKUP_MARKERS: [char; 2] = ['#', '*'];

/// Characters left out of [`TextStats::char_count_no_spaces`]: space and no-break space.
pub const SPACE_CHARS: [char; 2] = [' ', '\u{a0}'];

/// Word and character counts of one text variant.
///
/// Descriptive only; they are never checked against the requested word bounds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TextStats {
    /// Whitespace-delimited tokens.
    pub word_count: usize,
    /// Characters excluding space characters. Newlines and tabs still count.
    pub char_count_no_spaces: usize,
    /// All characters.
    pub char_count_with_spaces: usize,
}

impl TextStats {
    pub fn of(text: &str) -> Self {
        let char_count_with_spaces = text.chars().count();
        let spaces = text.chars().filter(|c| SPACE_CHARS.contains(c)).count();

        Self {
            word_count: text.split_whitespace().count(),
            char_count_no_spaces: char_count_with_spaces - spaces,
            char_count_with_spaces,
        }
    }
}

/// Generated text in marked-up and plain form, with statistics for each.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedArtifact {
    pub markup_text: String,
    pub plain_text: String,
    pub markup_stats: TextStats,
    pub plain_stats: TextStats,
}

/// Removes every markup marker character from `markup`.
pub fn strip_markers(markup: &str) -> String {
    markup.chars().filter(|c| !MARKUP_MARKERS.contains(c)).collect()
}

/// Builds the artifact for a generated text.
pub fn normalize(markup_text: impl Into<String>) -> GeneratedArtifact {
    let markup_text = markup_text.into();
    let plain_text = strip_markers(&markup_text);

    GeneratedArtifact {
        markup_stats: TextStats::of(&markup_text),
        plain_stats: TextStats::of(&plain_text),
        markup_text,
        plain_text,
    }
}
