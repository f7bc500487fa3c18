//! HTML whitespace collapsing over an owned [`Node`] tree.
//!
//! Text is visited in document order. Each text node's runs of ASCII
//! whitespace become one space, and a leading space is dropped when the
//! text before it already ended in one. Block elements and `<br>` end a
//! line, so the space before them is dropped as well. Preformatted
//! elements are skipped.
//!
//! The previous text node can sit anywhere earlier in the tree, so it is
//! tracked by its index path from the root. Removing the current node only
//! shifts later siblings, never an earlier path.

use crate::node::{Node, NodeType};
use crate::utilities::{is_block, is_void};

/// Collapse whitespace below `root`.
///
/// `is_pre` marks elements whose content must stay byte-exact.
pub fn collapse_whitespace<F>(root: &mut Node, is_pre: F)
where
    F: Fn(&Node) -> bool,
{
    if root.child_nodes().is_empty() || is_pre(root) {
        return;
    }

    let mut collapser = Collapser {
        is_pre,
        prev_text: None,
        keep_leading_ws: false,
    };
    collapser.walk_children(root, &mut Vec::new());

    if let Some(path) = collapser.prev_text.take() {
        let now_empty = text_at_mut(root, &path)
            .map(|text| {
                strip_trailing_space(text);
                text.is_empty()
            })
            .unwrap_or(false);
        if now_empty {
            remove_at(root, &path);
        }
    }
}

struct Collapser<F> {
    is_pre: F,
    /// Path of the last text node that was kept
    prev_text: Option<Vec<usize>>,
    keep_leading_ws: bool,
}

impl<F> Collapser<F>
where
    F: Fn(&Node) -> bool,
{
    fn walk_children(&mut self, root: &mut Node, path: &mut Vec<usize>) {
        let mut index = 0;
        while index < node_at(root, path).map_or(0, |n| n.child_nodes().len()) {
            path.push(index);
            let kept = self.visit(root, path);
            path.pop();
            if kept {
                index += 1;
            }
        }
    }

    /// Returns false when the node at `path` was removed.
    fn visit(&mut self, root: &mut Node, path: &mut Vec<usize>) -> bool {
        let Some(node) = node_at(root, path) else {
            return false;
        };
        let node_type = node.node_type;

        match node_type {
            NodeType::Text => {
                let mut text = collapse_runs(node.node_value.as_deref().unwrap_or(""));

                let prev_ends_with_space = match &self.prev_text {
                    None => true,
                    Some(prev) => node_at(root, prev)
                        .and_then(|n| n.node_value.as_deref())
                        .is_some_and(|v| v.ends_with(' ')),
                };
                if prev_ends_with_space && !self.keep_leading_ws && text.starts_with(' ') {
                    text.remove(0);
                }

                if text.is_empty() {
                    remove_at(root, path);
                    return false;
                }

                if let Some(value) = text_at_mut(root, path) {
                    *value = text;
                }
                self.prev_text = Some(path.clone());
            }
            NodeType::Element => {
                let pre = (self.is_pre)(node);
                let ends_line = is_block(&node.node_name) || node.is_tag("br");
                let inline_void = is_void(&node.node_name);

                if ends_line {
                    if let Some(prev) = self.prev_text.take() {
                        if let Some(text) = text_at_mut(root, &prev) {
                            strip_trailing_space(text);
                        }
                    }
                    self.keep_leading_ws = false;
                } else if inline_void || pre {
                    // Keep the space around inline void and inline pre elements
                    self.prev_text = None;
                    self.keep_leading_ws = true;
                } else if self.prev_text.is_some() {
                    self.keep_leading_ws = false;
                }

                if !pre {
                    self.walk_children(root, path);
                }
            }
            _ => {
                remove_at(root, path);
                return false;
            }
        }
        true
    }
}

/// Replace each run of `[ \r\n\t]` with a single space.
fn collapse_runs(text: &str) -> String {
    let mut collapsed = String::with_capacity(text.len());
    let mut in_run = false;

    for c in text.chars() {
        if matches!(c, ' ' | '\r' | '\n' | '\t') {
            if !in_run {
                collapsed.push(' ');
                in_run = true;
            }
        } else {
            collapsed.push(c);
            in_run = false;
        }
    }
    collapsed
}

fn strip_trailing_space(text: &mut String) {
    if text.ends_with(' ') {
        text.pop();
    }
}

fn node_at<'n>(root: &'n Node, path: &[usize]) -> Option<&'n Node> {
    path.iter()
        .try_fold(root, |node, &index| node.child_nodes().get(index))
}

fn node_at_mut<'n>(root: &'n mut Node, path: &[usize]) -> Option<&'n mut Node> {
    path.iter().try_fold(root, |node, &index| {
        node.children.as_mut().and_then(|c| c.get_mut(index))
    })
}

fn text_at_mut<'n>(root: &'n mut Node, path: &[usize]) -> Option<&'n mut String> {
    node_at_mut(root, path)
        .filter(|n| n.is_text())
        .and_then(|n| n.node_value.as_mut())
}

fn remove_at(root: &mut Node, path: &[usize]) {
    let Some((&index, parent_path)) = path.split_last() else {
        return;
    };
    if let Some(children) = node_at_mut(root, parent_path).and_then(|p| p.children.as_mut()) {
        if index < children.len() {
            children.remove(index);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_pre(node: &Node) -> bool {
        node.is_tag("pre")
    }

    fn texts(node: &Node) -> Vec<String> {
        let mut out = Vec::new();
        collect_texts(node, &mut out);
        out
    }

    fn collect_texts(node: &Node, out: &mut Vec<String>) {
        for child in node.children() {
            if child.is_text() {
                out.push(child.node_value.clone().unwrap_or_default());
            }
            collect_texts(child, out);
        }
    }

    fn paragraph(text: &str) -> Node {
        let mut p = Node::element("p");
        p.add_child(Node::text(text));
        p
    }

    #[test]
    fn test_collapse_runs() {
        assert_eq!(collapse_runs("a \n\t b"), "a b");
        assert_eq!(collapse_runs("\u{a0} a"), "\u{a0} a");
    }

    #[test]
    fn test_inline_runs_collapse() {
        let mut root = Node::element("div");
        root.add_child(Node::text("  Hello   "));
        let mut b = Node::element("b");
        b.add_child(Node::text("  world  "));
        root.add_child(b);

        collapse_whitespace(&mut root, is_pre);

        assert_eq!(texts(&root), vec!["Hello ", "world"]);
    }

    #[test]
    fn test_space_before_block_is_dropped() {
        let mut root = Node::element("div");
        root.add_child(Node::text("a   "));
        root.add_child(paragraph("  b  "));
        root.add_child(Node::text("  "));

        collapse_whitespace(&mut root, is_pre);

        assert_eq!(texts(&root), vec!["a", "b"]);
        assert_eq!(root.child_nodes().len(), 2);
    }

    #[test]
    fn test_space_after_inline_void_is_kept() {
        let mut root = Node::element("p");
        root.add_child(Node::text("a"));
        root.add_child(Node::element("img"));
        root.add_child(Node::text(" b"));

        collapse_whitespace(&mut root, is_pre);

        assert_eq!(texts(&root), vec!["a", " b"]);
    }

    #[test]
    fn test_comments_are_removed() {
        let mut root = Node::element("div");
        root.add_child(Node::text("a"));
        root.add_child(Node::comment("gone"));
        root.add_child(Node::text("b"));

        collapse_whitespace(&mut root, is_pre);

        assert_eq!(root.child_nodes().len(), 2);
        assert!(root.children().all(|n| n.is_text()));
    }

    #[test]
    fn test_pre_content_is_untouched() {
        let mut root = Node::element("div");
        let mut pre = Node::element("pre");
        pre.add_child(Node::text("  a \n\n  b  "));
        root.add_child(pre);

        collapse_whitespace(&mut root, is_pre);

        assert_eq!(texts(&root), vec!["  a \n\n  b  "]);
    }

    #[test]
    fn test_code_is_pre_only_when_asked() {
        let build = || {
            let mut root = Node::element("p");
            let mut code = Node::element("code");
            code.add_child(Node::text("a   b"));
            root.add_child(code);
            root
        };

        let mut plain = build();
        collapse_whitespace(&mut plain, is_pre);
        assert_eq!(texts(&plain), vec!["a b"]);

        let mut preformatted = build();
        collapse_whitespace(&mut preformatted, |n| n.is_tag("pre") || n.is_tag("code"));
        assert_eq!(texts(&preformatted), vec!["a   b"]);
    }

    #[test]
    fn test_preformatted_root_is_untouched() {
        let mut pre = Node::element("pre");
        pre.add_child(Node::text("  x  "));

        collapse_whitespace(&mut pre, is_pre);

        assert_eq!(texts(&pre), vec!["  x  "]);
    }

    #[test]
    fn test_sentinels_survive() {
        let mut root = Node::element("div");
        root.add_child(Node::text("\u{2003}\u{2003}a  b "));

        collapse_whitespace(&mut root, is_pre);

        assert_eq!(texts(&root), vec!["\u{2003}\u{2003}a b"]);
    }
}
