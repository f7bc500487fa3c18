//! Markdown escaping for literal text.
//!
//! Substitutions run in a fixed order. The backslash goes first so the
//! backslashes inserted by later substitutions are not escaped again.
//! Anchored patterns only look at the start of the text node.

use once_cell::sync::Lazy;
use regex::Regex;

static ESCAPES: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        (r"\\", r"\\"),
        (r"\*", r"\*"),
        (r"^-", r"\-"),
        (r"^\+ ", r"\+ "),
        (r"^(=+)", r"\$1"),
        (r"^(#{1,6}) ", r"\$1 "),
        (r"`", r"\`"),
        (r"^~~~", r"\~~~"),
        (r"\[", r"\["),
        (r"\]", r"\]"),
        (r"^>", r"\>"),
        (r"_", r"\_"),
        (r"^(\d+)\. ", r"${1}\. "),
    ]
    .into_iter()
    .map(|(pattern, replacement)| (Regex::new(pattern).unwrap(), replacement))
    .collect()
});

/// Escape Markdown syntax in literal text.
///
/// ```rust
/// use turndown_safespace::escape_markdown;
///
/// assert_eq!(escape_markdown("*bold*"), "\\*bold\\*");
/// assert_eq!(escape_markdown("1. item"), "1\\. item");
/// ```
pub fn escape_markdown(text: &str) -> String {
    ESCAPES
        .iter()
        .fold(text.to_string(), |acc, (pattern, replacement)| {
            pattern.replace_all(&acc, *replacement).into_owned()
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_escape_inline_syntax() {
        assert_eq!(escape_markdown("*test*"), "\\*test\\*");
        assert_eq!(escape_markdown("_test_"), "\\_test\\_");
        assert_eq!(escape_markdown("[link]"), "\\[link\\]");
        assert_eq!(escape_markdown("`code`"), "\\`code\\`");
        assert_eq!(escape_markdown("normal"), "normal");
    }

    #[test]
    fn test_escape_line_start_syntax() {
        assert_eq!(escape_markdown("- item"), "\\- item");
        assert_eq!(escape_markdown("+ item"), "\\+ item");
        assert_eq!(escape_markdown("== title"), "\\== title");
        assert_eq!(escape_markdown("### title"), "\\### title");
        assert_eq!(escape_markdown("~~~ fence"), "\\~~~ fence");
        assert_eq!(escape_markdown("> quote"), "\\> quote");
        assert_eq!(escape_markdown("42. answer"), "42\\. answer");
    }

    #[test]
    fn test_line_start_patterns_only_match_at_start() {
        assert_eq!(escape_markdown("a - b"), "a - b");
        assert_eq!(escape_markdown("a > b"), "a > b");
        assert_eq!(escape_markdown("see 1. above"), "see 1. above");
        assert_eq!(escape_markdown("####### seven"), "####### seven");
    }

    #[test]
    fn test_backslash_is_escaped_first() {
        assert_eq!(escape_markdown("\\"), "\\\\");
        assert_eq!(escape_markdown("\\*"), "\\\\\\*");
    }

    #[test]
    fn test_escaping_twice_escapes_the_backslashes() {
        let once = escape_markdown("*bold*");
        assert_eq!(once, "\\*bold\\*");
        assert_eq!(escape_markdown(&once), "\\\\\\*bold\\\\\\*");
    }

    proptest! {
        #[test]
        fn prop_plain_text_is_unchanged(s in "[a-zA-Z0-9 ,]{0,40}") {
            prop_assert_eq!(escape_markdown(&s), s);
        }
    }
}
