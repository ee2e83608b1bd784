use once_cell::sync::Lazy;
use regex::{escape, RegexBuilder};
use thiserror::Error;

pub const MIN_TEXT_LEN: usize = 10;
pub const MAX_TEXT_LEN: usize = 150;

/// Phrases that are not welcome on the wall, matched case-insensitively
/// on whole-word boundaries. "scammer" does not match "scam".
const DENY_LIST: &[&str] = &["rugpull", "scam", "pump and dump", "shitcoin", "pumpanddump"];

static DENY_PATTERNS: Lazy<Vec<regex::Regex>> = Lazy::new(|| {
    DENY_LIST
        .iter()
        .map(|phrase| {
            RegexBuilder::new(&format!(r"\b{}\b", escape(phrase)))
                .case_insensitive(true)
                .build()
                .expect("compile deny-list pattern")
        })
        .collect()
});

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContentRejection {
    #[error("note is shorter than {MIN_TEXT_LEN} characters")]
    TooShort,
    #[error("note is longer than {MAX_TEXT_LEN} characters")]
    TooLong,
    #[error("note contains a disallowed phrase")]
    BlockedPhrase,
}

/// Validates the text of a note before it is allowed onto the wall.
///
/// Whitespace is trimmed before the length check. The deny list is
/// consulted on the trimmed text with word-boundary semantics.
pub fn validate_text(text: &str) -> Result<(), ContentRejection> {
    let trimmed = text.trim();
    let len = trimmed.chars().count();
    if len < MIN_TEXT_LEN {
        return Err(ContentRejection::TooShort);
    }
    if len > MAX_TEXT_LEN {
        return Err(ContentRejection::TooLong);
    }

    if DENY_PATTERNS.iter().any(|re| re.is_match(trimmed)) {
        return Err(ContentRejection::BlockedPhrase);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_short_text() {
        assert_eq!(validate_text(""), Err(ContentRejection::TooShort));
        assert_eq!(validate_text("   \t\n  "), Err(ContentRejection::TooShort));
        assert_eq!(validate_text("short one"), Err(ContentRejection::TooShort));
        // nine characters once surrounding whitespace is gone
        assert_eq!(
            validate_text("  hi there!  \n"),
            Err(ContentRejection::TooShort)
        );
    }

    #[test]
    fn rejects_oversized_text() {
        let long = "a".repeat(MAX_TEXT_LEN + 1);
        assert_eq!(validate_text(&long), Err(ContentRejection::TooLong));
        assert_eq!(validate_text(&"a".repeat(MAX_TEXT_LEN)), Ok(()));
    }

    #[test]
    fn accepts_ordinary_notes() {
        assert_eq!(validate_text("this market is wild today!!"), Ok(()));
        assert_eq!(validate_text("gm to everyone on the wall 🌞"), Ok(()));
    }

    #[test]
    fn rejects_denylisted_phrases() {
        assert_eq!(
            validate_text("this is a total scam honestly"),
            Err(ContentRejection::BlockedPhrase)
        );
        assert_eq!(
            validate_text("classic RUGPULL energy here"),
            Err(ContentRejection::BlockedPhrase)
        );
        assert_eq!(
            validate_text("another pump and dump scheme"),
            Err(ContentRejection::BlockedPhrase)
        );
        assert_eq!(
            validate_text("that pumpanddump vibe again"),
            Err(ContentRejection::BlockedPhrase)
        );
    }

    #[test]
    fn word_boundaries_do_not_match_substrings() {
        // "scammer" contains "scam" but is a different word
        assert_eq!(validate_text("scammers are everywhere now"), Ok(()));
        assert_eq!(validate_text("we love a good scampi dinner"), Ok(()));
    }

    #[test]
    fn never_panics_on_unicode() {
        assert!(validate_text("🦀🦀🦀🦀🦀🦀🦀🦀🦀🦀🦀🦀").is_ok());
        let _ = validate_text("ß\u{0301}\u{200d}");
    }
}
