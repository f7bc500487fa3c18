//! Protection for significant leading spaces.
//!
//! HTML whitespace collapsing and Markdown trimming both eat leading spaces.
//! Where such a space matters (the start of the document, the start of a
//! line after `<br>`), the space is swapped for [`SAFE_SPACE`] before the
//! tree is normalized and swapped back once the Markdown is assembled.
//!
//! The sentinel is a real code point. An em space that is already present
//! in the input is indistinguishable from a protected space, so it also
//! comes out of [`decode_safe_spaces`] as an ASCII space.

use crate::node::{Node, NodeType};

/// Stand-in for a protected leading space (U+2003 EM SPACE).
pub const SAFE_SPACE: char = '\u{2003}';

/// Replace every leading ASCII space of `text` with [`SAFE_SPACE`].
pub fn protect_leading_spaces(text: &str) -> String {
    let body = text.trim_start_matches(' ');
    let count = text.len() - body.len();

    let mut protected = String::with_capacity(count * SAFE_SPACE.len_utf8() + body.len());
    protected.extend(std::iter::repeat(SAFE_SPACE).take(count));
    protected.push_str(body);
    protected
}

/// Protect the leading spaces of every first text node below `root`.
///
/// Only element roots are encoded; `PRE` and `CODE` subtrees are left
/// byte-exact.
pub fn encode_safe_spaces(root: &mut Node) {
    if root.is_element() {
        encode_element(root, None, None);
    }
}

fn encode_element(element: &mut Node, parent_name: Option<&str>, previous_sibling: Option<&str>) {
    if is_pre_or_code(&element.node_name) {
        return;
    }

    let qualifies = holds_first_text(&element.node_name, parent_name, previous_sibling);
    let name = element.node_name.clone();
    let Some(children) = element.children.as_mut() else {
        return;
    };

    let mut previous: Option<String> = None;
    for child in children.iter_mut() {
        match child.node_type {
            NodeType::Text if qualifies => {
                if let Some(value) = child.node_value.as_mut() {
                    if value.starts_with(' ') {
                        *value = protect_leading_spaces(value);
                    }
                }
            }
            NodeType::Element => encode_element(child, Some(&name), previous.as_deref()),
            _ => {}
        }
        previous = Some(child.node_name.clone());
    }
}

/// Whether text directly inside `element` counts as a first text node.
///
/// `parent_name` is `None` when the element has no parent element (the
/// conversion root); `previous_sibling` is the node name of the element's
/// own previous sibling.
fn holds_first_text(
    element_name: &str,
    parent_name: Option<&str>,
    previous_sibling: Option<&str>,
) -> bool {
    let Some(parent_name) = parent_name else {
        return true;
    };
    if is_span_or_code(parent_name) {
        return false;
    }
    if is_span_or_code(element_name) {
        return match previous_sibling {
            None => true,
            Some(name) => name.eq_ignore_ascii_case("br"),
        };
    }
    false
}

fn is_span_or_code(name: &str) -> bool {
    name.eq_ignore_ascii_case("span") || name.eq_ignore_ascii_case("code")
}

fn is_pre_or_code(name: &str) -> bool {
    name.eq_ignore_ascii_case("pre") || name.eq_ignore_ascii_case("code")
}

/// Turn protected spaces back into ASCII spaces.
///
/// A sentinel at the very start of the output stays as it is, so a
/// Markdown renderer still shows the leading space.
pub fn decode_safe_spaces(markdown: &str) -> String {
    let mut chars = markdown.chars();
    let mut decoded = String::with_capacity(markdown.len());

    if let Some(first) = chars.next() {
        decoded.push(first);
    }
    decoded.extend(chars.map(|c| if c == SAFE_SPACE { ' ' } else { c }));
    decoded
}

/// Trim that keeps protected leading spaces.
///
/// - starts and ends with [`SAFE_SPACE`]: returned unchanged
/// - starts with it only: only the end is trimmed
/// - otherwise: [`str::trim`]
pub fn safe_trim(text: &str) -> &str {
    if text.starts_with(SAFE_SPACE) {
        if text.ends_with(SAFE_SPACE) {
            return text;
        }
        return text.trim_end();
    }
    text.trim()
}
