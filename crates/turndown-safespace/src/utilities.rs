//! Utility functions and constants for HTML processing.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::node::Node;

/// Block-level HTML elements
pub const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "audio", "blockquote", "body", "canvas",
    "center", "dd", "dir", "div", "dl", "dt", "fieldset", "figcaption",
    "figure", "footer", "form", "frameset", "h1", "h2", "h3", "h4", "h5",
    "h6", "header", "hgroup", "hr", "html", "isindex", "li", "main", "menu",
    "nav", "noframes", "noscript", "ol", "output", "p", "pre", "section",
    "table", "tbody", "td", "tfoot", "th", "thead", "tr", "ul",
];

/// Void (self-closing) HTML elements
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "command", "embed", "hr", "img", "input",
    "keygen", "link", "meta", "param", "source", "track", "wbr",
];

/// Elements that have meaning even when blank
pub const MEANINGFUL_WHEN_BLANK: &[&str] = &[
    "a", "table", "thead", "tbody", "tfoot", "th", "td", "iframe", "script",
    "audio", "video",
];

/// Check if a tag is a block-level element
pub fn is_block(tag: &str) -> bool {
    BLOCK_ELEMENTS.contains(&tag.to_lowercase().as_str())
}

/// Check if a tag is a void element
pub fn is_void(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag.to_lowercase().as_str())
}

/// Check if a tag is meaningful when blank
pub fn is_meaningful_when_blank(tag: &str) -> bool {
    MEANINGFUL_WHEN_BLANK.contains(&tag.to_lowercase().as_str())
}

/// Check if any element below `node` is a void element
pub fn has_void(node: &Node) -> bool {
    has_descendant(node, is_void)
}

/// Check if any element below `node` is meaningful when blank
pub fn has_meaningful_when_blank(node: &Node) -> bool {
    has_descendant(node, is_meaningful_when_blank)
}

fn has_descendant(node: &Node, predicate: fn(&str) -> bool) -> bool {
    node.element_children()
        .any(|child| predicate(&child.node_name) || has_descendant(child, predicate))
}

/// Repeat a string n times
pub fn repeat(s: &str, n: usize) -> String {
    s.repeat(n)
}

/// Strip every leading `\n`
pub fn trim_leading_newlines(s: &str) -> &str {
    s.trim_start_matches('\n')
}

/// Strip every trailing `\n`
pub fn trim_trailing_newlines(s: &str) -> &str {
    s.trim_end_matches('\n')
}

/// Join a replacement onto the output produced so far.
///
/// Newlines at the junction are not added up: both sides state how many
/// they need (0, 1 or 2) and the larger demand wins.
///
/// ```rust
/// use turndown_safespace::join;
///
/// assert_eq!(join("a\n", "\nb"), "a\nb");
/// assert_eq!(join("a\n\n", "\n\nb"), "a\n\nb");
/// assert_eq!(join("a", "\n\n\n\nb"), "a\n\nb");
/// ```
pub fn join(output: &str, replacement: &str) -> String {
    let s1 = trim_trailing_newlines(output);
    let s2 = trim_leading_newlines(replacement);
    let nls = (output.len() - s1.len())
        .max(replacement.len() - s2.len())
        .min(2);

    let mut joined = String::with_capacity(s1.len() + nls + s2.len());
    joined.push_str(s1);
    joined.push_str(&"\n\n"[..nls]);
    joined.push_str(s2);
    joined
}

static ATTRIBUTE_NEWLINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\n+\s*)+").unwrap());

/// Clean an attribute value: runs of newlines (and the whitespace after
/// them) fold into a single newline. Missing attributes become empty.
pub fn clean_attribute(value: Option<&str>) -> String {
    value
        .map(|v| ATTRIBUTE_NEWLINES.replace_all(v, "\n").into_owned())
        .unwrap_or_default()
}
