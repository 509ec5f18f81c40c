//! Per-post text measurements.

use std::sync::LazyLock;

use regex::Regex;

// One match per rendered glyph: a keycap, a pictograph with its modifiers,
// joined ZWJ sequences, or a regional-indicator flag pair.
static EMOJI: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"[0-9#*]\x{FE0F}?\x{20E3}|\p{Extended_Pictographic}(?:\p{Emoji_Modifier}|\x{FE0F}|\x{20E3})*(?:\x{200D}\p{Extended_Pictographic}(?:\p{Emoji_Modifier}|\x{FE0F})*)*|[\x{1F1E6}-\x{1F1FF}]{2}",
    )
    .expect("valid regex")
});

/// Length in Unicode scalar values, not bytes.
pub(crate) fn text_length(content: &str) -> usize {
    content.chars().count()
}

pub(crate) fn emoji_count(content: &str) -> usize {
    EMOJI.find_iter(content).count()
}

/// Newline count; a single-paragraph post scores zero.
pub(crate) fn paragraph_breaks(content: &str) -> usize {
    content.matches('\n').count()
}

pub(crate) fn hashtag_count(content: &str) -> usize {
    content.matches('#').count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_counts_characters() {
        assert_eq!(text_length("héllo"), 5);
        assert_eq!(text_length(""), 0);
    }

    #[test]
    fn single_emojis_are_counted() {
        assert_eq!(emoji_count("Launch day 🚀🎉"), 2);
        assert_eq!(emoji_count("no emoji here"), 0);
    }

    #[test]
    fn modified_and_joined_emojis_count_once() {
        assert_eq!(emoji_count("👍🏽"), 1, "skin tone modifier");
        assert_eq!(emoji_count("👩‍💻"), 1, "zwj sequence");
        assert_eq!(emoji_count("❤️"), 1, "variation selector");
    }

    #[test]
    fn flags_count_once() {
        assert_eq!(emoji_count("Hello from 🇩🇪"), 1);
    }

    #[test]
    fn keycaps_count_once() {
        assert_eq!(emoji_count("1\u{FE0F}\u{20E3}"), 1);
        assert_eq!(emoji_count("#\u{FE0F}\u{20E3}"), 1);
        assert_eq!(emoji_count("*\u{20E3}"), 1, "without variation selector");
        assert_eq!(emoji_count("Steps: 1\u{FE0F}\u{20E3} plan 2\u{FE0F}\u{20E3} ship"), 2);
    }

    #[test]
    fn hashtags_and_digits_are_not_emojis() {
        assert_eq!(emoji_count("#rust 2024"), 0);
    }

    #[test]
    fn paragraphs_and_hashtags() {
        let post = "First line\n\nSecond #rust #async\nThird";
        assert_eq!(paragraph_breaks(post), 3);
        assert_eq!(hashtag_count(post), 2);
    }
}
