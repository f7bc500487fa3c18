//! CDP-style DOM Node structure for HTML to Markdown conversion.
//!
//! This module provides a DOM node structure that matches the Chrome DevTools Protocol
//! DOM.Node structure. Any parser (html5ever, CDP, etc.) can convert their output to
//! this structure to use turndown.
//!
//! [`NodeRef`] is the per-visit view the reduction engine hands to rules: it
//! knows the parent and siblings of the node and carries the whitespace
//! properties computed for it.

use crate::options::TurndownOptions;
use crate::rules::ConversionState;
use crate::utilities::{
    has_meaningful_when_blank, has_void, is_block, is_meaningful_when_blank, is_void,
};

/// Node types matching DOM nodeType values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    /// Element node (nodeType = 1)
    Element = 1,
    /// Text node (nodeType = 3)
    Text = 3,
    /// Comment node (nodeType = 8)
    Comment = 8,
    /// Document node (nodeType = 9)
    Document = 9,
    /// Document fragment node (nodeType = 11)
    DocumentFragment = 11,
}

/// A DOM node following the CDP DOM.Node structure.
///
/// This structure is designed to be compatible with Chrome DevTools Protocol
/// and can be used as a common interface for any HTML parser.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Node type (1 = Element, 3 = Text, etc.)
    pub node_type: NodeType,

    /// Node name (uppercase for elements, e.g., "DIV", "#text" for text nodes)
    pub node_name: String,

    /// Text content for text and comment nodes
    pub node_value: Option<String>,

    /// Attributes as flat array [name, value, name, value, ...] (CDP style)
    /// Only present for element nodes
    pub attributes: Option<Vec<String>>,

    /// Child nodes
    pub children: Option<Vec<Node>>,
}

impl Node {
    /// Create a new element node
    pub fn element(tag_name: &str) -> Self {
        Self {
            node_type: NodeType::Element,
            node_name: tag_name.to_uppercase(),
            node_value: None,
            attributes: Some(Vec::new()),
            children: Some(Vec::new()),
        }
    }

    /// Create a new element node with attributes
    pub fn element_with_attrs(tag_name: &str, attrs: Vec<(&str, &str)>) -> Self {
        let flat_attrs: Vec<String> = attrs
            .into_iter()
            .flat_map(|(k, v)| vec![k.to_string(), v.to_string()])
            .collect();

        Self {
            node_type: NodeType::Element,
            node_name: tag_name.to_uppercase(),
            node_value: None,
            attributes: Some(flat_attrs),
            children: Some(Vec::new()),
        }
    }

    /// Create a new text node
    pub fn text(content: &str) -> Self {
        Self {
            node_type: NodeType::Text,
            node_name: "#text".to_string(),
            node_value: Some(content.to_string()),
            attributes: None,
            children: None,
        }
    }

    /// Create a new comment node
    pub fn comment(content: &str) -> Self {
        Self {
            node_type: NodeType::Comment,
            node_name: "#comment".to_string(),
            node_value: Some(content.to_string()),
            attributes: None,
            children: None,
        }
    }

    /// Create a document node
    pub fn document() -> Self {
        Self {
            node_type: NodeType::Document,
            node_name: "#document".to_string(),
            node_value: None,
            attributes: None,
            children: Some(Vec::new()),
        }
    }

    /// Create a document fragment node
    pub fn document_fragment() -> Self {
        Self {
            node_type: NodeType::DocumentFragment,
            node_name: "#document-fragment".to_string(),
            node_value: None,
            attributes: None,
            children: Some(Vec::new()),
        }
    }

    /// Check if this is an element node
    pub fn is_element(&self) -> bool {
        self.node_type == NodeType::Element
    }

    /// Check if this is a text node
    pub fn is_text(&self) -> bool {
        self.node_type == NodeType::Text
    }

    /// Check if this is an element with the given tag name (case-insensitive)
    pub fn is_tag(&self, tag: &str) -> bool {
        self.is_element() && self.node_name.eq_ignore_ascii_case(tag)
    }

    /// Get the tag name (lowercase)
    pub fn tag_name(&self) -> String {
        self.node_name.to_lowercase()
    }

    /// Get an attribute value by name
    pub fn attr(&self, name: &str) -> Option<&str> {
        let attrs = self.attributes.as_ref()?;

        // CDP stores attributes as flat array: [name, value, name, value, ...]
        attrs
            .chunks_exact(2)
            .find(|pair| pair[0].eq_ignore_ascii_case(name))
            .map(|pair| pair[1].as_str())
    }

    /// Check if an attribute exists
    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    /// The `id` attribute, if any
    pub fn id(&self) -> Option<&str> {
        self.attr("id")
    }

    /// Get all child nodes
    pub fn children(&self) -> impl Iterator<Item = &Node> {
        self.children.iter().flat_map(|c| c.iter())
    }

    /// Child nodes as a slice (empty for leaf nodes)
    pub fn child_nodes(&self) -> &[Node] {
        self.children.as_deref().unwrap_or(&[])
    }

    /// Get only element children
    pub fn element_children(&self) -> impl Iterator<Item = &Node> {
        self.children().filter(|n| n.is_element())
    }

    /// Add a child node
    pub fn add_child(&mut self, child: Node) {
        if let Some(ref mut children) = self.children {
            children.push(child);
        } else {
            self.children = Some(vec![child]);
        }
    }

    /// Set an attribute
    pub fn set_attr(&mut self, name: &str, value: &str) {
        let attrs = self.attributes.get_or_insert_with(Vec::new);

        if let Some(pair) = attrs
            .chunks_exact_mut(2)
            .find(|pair| pair[0].eq_ignore_ascii_case(name))
        {
            pair[1] = value.to_string();
            return;
        }
        attrs.push(name.to_string());
        attrs.push(value.to_string());
    }

    /// Consume this tree and return the first element (in document order)
    /// whose `id` equals `id`, searching this node too.
    pub fn into_element_by_id(self, id: &str) -> Option<Node> {
        if self.is_element() && self.id() == Some(id) {
            return Some(self);
        }
        self.children
            .into_iter()
            .flatten()
            .find_map(|child| child.into_element_by_id(id))
    }

    /// Get all text content from this node and descendants
    pub fn text_content(&self) -> String {
        match self.node_type {
            NodeType::Text => self.node_value.clone().unwrap_or_default(),
            NodeType::Comment => String::new(),
            _ => self
                .children()
                .map(|child| child.text_content())
                .collect::<Vec<_>>()
                .join(""),
        }
    }

    /// Reconstruct outer HTML (for keep rules)
    pub fn outer_html(&self) -> String {
        match self.node_type {
            NodeType::Text => escape_html_text(self.node_value.as_deref().unwrap_or("")),
            NodeType::Comment => format!("<!--{}-->", self.node_value.as_deref().unwrap_or("")),
            NodeType::Element => {
                let tag = self.tag_name();
                let attrs = self.attributes_string();

                if is_void(&tag) {
                    if attrs.is_empty() {
                        format!("<{}>", tag)
                    } else {
                        format!("<{} {}>", tag, attrs)
                    }
                } else {
                    let inner = self.inner_html();
                    if attrs.is_empty() {
                        format!("<{}>{}</{}>", tag, inner, tag)
                    } else {
                        format!("<{} {}>{}</{}>", tag, attrs, inner, tag)
                    }
                }
            }
            _ => self.inner_html(),
        }
    }

    /// Reconstruct inner HTML
    pub fn inner_html(&self) -> String {
        self.children()
            .map(|child| child.outer_html())
            .collect::<Vec<_>>()
            .join("")
    }

    /// Get attributes as a string for HTML output
    fn attributes_string(&self) -> String {
        let Some(ref attrs) = self.attributes else {
            return String::new();
        };

        attrs
            .chunks_exact(2)
            .map(|pair| {
                if pair[1].is_empty() {
                    pair[0].clone()
                } else {
                    format!("{}=\"{}\"", pair[0], escape_html_attr(&pair[1]))
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Escape HTML attribute value
fn escape_html_attr(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('\u{a0}', "&nbsp;")
}

/// Escape text the way serialized DOM text reads
fn escape_html_text(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('\u{a0}', "&nbsp;")
}

/// Whitespace to re-insert around a node's replacement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlankingWhitespace {
    pub leading: String,
    pub trailing: String,
}

impl FlankingWhitespace {
    pub fn is_empty(&self) -> bool {
        self.leading.is_empty() && self.trailing.is_empty()
    }
}

/// A reference to a node with parent context.
///
/// Created fresh for every element the reduction engine visits, so the
/// computed properties always describe the normalized tree as it is now.
#[derive(Debug, Clone)]
pub struct NodeRef<'a> {
    /// The node itself
    pub node: &'a Node,
    parent: Option<&'a Node>,
    index: usize,
    /// Block-level element
    pub is_block: bool,
    /// `CODE` element, or inside one
    pub is_code: bool,
    /// Renders to nothing (see [`NodeRef::decorate`])
    pub is_blank: bool,
    pub flanking_whitespace: FlankingWhitespace,
    state: Option<&'a ConversionState>,
}

impl<'a> NodeRef<'a> {
    /// Create a new NodeRef without parent context
    pub fn new(node: &'a Node) -> Self {
        Self {
            node,
            parent: None,
            index: 0,
            is_block: is_block(&node.node_name),
            is_code: node.is_tag("code"),
            is_blank: is_blank(node),
            flanking_whitespace: FlankingWhitespace::default(),
            state: None,
        }
    }

    /// Decorate `parent`'s child at `index`.
    ///
    /// `parent_is_code` is the `is_code` flag of the parent's own view; the
    /// conversion root counts as not code.
    pub fn decorate(
        parent: &'a Node,
        index: usize,
        parent_is_code: bool,
        options: &TurndownOptions,
    ) -> Option<Self> {
        let node = parent.child_nodes().get(index)?;
        let mut node_ref = Self {
            node,
            parent: Some(parent),
            index,
            is_block: node.is_element() && is_block(&node.node_name),
            is_code: node.is_tag("code") || parent_is_code,
            is_blank: is_blank(node),
            flanking_whitespace: FlankingWhitespace::default(),
            state: None,
        };
        node_ref.flanking_whitespace = node_ref.compute_flanking_whitespace(options);
        Some(node_ref)
    }

    /// Attach the state of the conversion this node is visited by
    pub fn with_state(mut self, state: &'a ConversionState) -> Self {
        self.state = Some(state);
        self
    }

    /// State of the running conversion; `None` outside of one
    pub fn state(&self) -> Option<&'a ConversionState> {
        self.state
    }

    /// Get the parent node if known
    pub fn parent(&self) -> Option<&'a Node> {
        self.parent
    }

    /// Get the parent tag name if known
    pub fn parent_tag(&self) -> Option<String> {
        self.parent.filter(|p| p.is_element()).map(|p| p.tag_name())
    }

    pub fn previous_sibling(&self) -> Option<&'a Node> {
        let index = self.index.checked_sub(1)?;
        self.parent?.child_nodes().get(index)
    }

    pub fn next_sibling(&self) -> Option<&'a Node> {
        self.parent?.child_nodes().get(self.index + 1)
    }

    pub fn first_child(&self) -> Option<&'a Node> {
        self.node.child_nodes().first()
    }

    /// Position among the parent's element children
    pub fn element_index(&self) -> usize {
        self.parent
            .map(|p| {
                p.child_nodes()[..self.index]
                    .iter()
                    .filter(|n| n.is_element())
                    .count()
            })
            .unwrap_or(0)
    }

    /// Whether this is the last element child of its parent
    pub fn is_last_element_child(&self) -> bool {
        self.parent
            .map(|p| {
                p.child_nodes()[self.index + 1..]
                    .iter()
                    .all(|n| !n.is_element())
            })
            .unwrap_or(true)
    }

    /// Delegate to Node methods
    pub fn is_element(&self) -> bool {
        self.node.is_element()
    }

    pub fn is_text(&self) -> bool {
        self.node.is_text()
    }

    pub fn tag_name(&self) -> String {
        self.node.tag_name()
    }

    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.node.attr(name)
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.node.has_attr(name)
    }

    pub fn children(&self) -> impl Iterator<Item = &'a Node> {
        self.node.children()
    }

    pub fn element_children(&self) -> impl Iterator<Item = &'a Node> {
        self.node.element_children()
    }

    pub fn text_content(&self) -> String {
        self.node.text_content()
    }

    pub fn outer_html(&self) -> String {
        self.node.outer_html()
    }

    pub fn inner_html(&self) -> String {
        self.node.inner_html()
    }

    fn compute_flanking_whitespace(&self, options: &TurndownOptions) -> FlankingWhitespace {
        if self.is_block || (options.preformatted_code && self.is_code) {
            return FlankingWhitespace::default();
        }

        let text = self.node.text_content();
        let edges = EdgeWhitespace::of(&text);

        // abandon leading ASCII whitespace if left-flanked by ASCII whitespace
        let leading = if !edges.leading_ascii.is_empty()
            && is_flanked_by_whitespace(self.previous_sibling(), Side::Left, options)
        {
            edges.leading_non_ascii
        } else {
            edges.leading
        };

        // abandon trailing ASCII whitespace if right-flanked by ASCII whitespace
        let trailing = if !edges.trailing_ascii.is_empty()
            && is_flanked_by_whitespace(self.next_sibling(), Side::Right, options)
        {
            edges.trailing_non_ascii
        } else {
            edges.trailing
        };

        FlankingWhitespace {
            leading: leading.to_string(),
            trailing: trailing.to_string(),
        }
    }
}

fn is_blank(node: &Node) -> bool {
    let name = &node.node_name;
    !is_void(name)
        && !is_meaningful_when_blank(name)
        && node.text_content().chars().all(char::is_whitespace)
        && !has_void(node)
        && !has_meaningful_when_blank(node)
}

fn is_ascii_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n')
}

/// Whitespace at the edges of a string, split into the ASCII part
/// (outermost) and the rest.
#[derive(Debug, PartialEq, Eq)]
struct EdgeWhitespace<'s> {
    /// Whole string for whitespace-only strings
    leading: &'s str,
    leading_ascii: &'s str,
    leading_non_ascii: &'s str,
    /// Empty for whitespace-only strings
    trailing: &'s str,
    trailing_non_ascii: &'s str,
    trailing_ascii: &'s str,
}

impl<'s> EdgeWhitespace<'s> {
    fn of(text: &'s str) -> Self {
        let body_start = text.len() - text.trim_start().len();
        let leading = &text[..body_start];
        let ascii_end = leading.len() - leading.trim_start_matches(is_ascii_whitespace).len();
        let (leading_ascii, leading_non_ascii) = leading.split_at(ascii_end);

        let rest = &text[body_start..];
        let trailing = &rest[rest.trim_end().len()..];
        let ascii_start = trailing.trim_end_matches(is_ascii_whitespace).len();
        let (trailing_non_ascii, trailing_ascii) = trailing.split_at(ascii_start);

        Self {
            leading,
            leading_ascii,
            leading_non_ascii,
            trailing,
            trailing_non_ascii,
            trailing_ascii,
        }
    }
}

#[derive(Clone, Copy)]
enum Side {
    Left,
    Right,
}

fn is_flanked_by_whitespace(
    sibling: Option<&Node>,
    side: Side,
    options: &TurndownOptions,
) -> bool {
    let Some(sibling) = sibling else {
        return false;
    };
    let touches_space = |text: &str| match side {
        Side::Left => text.ends_with(' '),
        Side::Right => text.starts_with(' '),
    };

    if sibling.is_text() {
        touches_space(sibling.node_value.as_deref().unwrap_or(""))
    } else if options.preformatted_code && sibling.is_tag("code") {
        false
    } else if sibling.is_element() && !is_block(&sibling.node_name) {
        touches_space(&sibling.text_content())
    } else {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decorate_child(parent: &Node, index: usize) -> NodeRef<'_> {
        NodeRef::decorate(parent, index, false, &TurndownOptions::default()).unwrap()
    }

    #[test]
    fn test_create_element() {
        let node = Node::element("div");
        assert!(node.is_element());
        assert_eq!(node.tag_name(), "div");
        assert_eq!(node.node_name, "DIV");
    }

    #[test]
    fn test_create_text() {
        let node = Node::text("Hello World");
        assert!(node.is_text());
        assert_eq!(node.text_content(), "Hello World");
    }

    #[test]
    fn test_attributes() {
        let mut node = Node::element_with_attrs(
            "a",
            vec![("href", "https://example.com"), ("title", "Example")],
        );
        assert_eq!(node.attr("href"), Some("https://example.com"));
        assert_eq!(node.attr("TITLE"), Some("Example"));
        assert_eq!(node.attr("class"), None);

        node.set_attr("title", "Changed");
        node.set_attr("id", "x");
        assert_eq!(node.attr("title"), Some("Changed"));
        assert_eq!(node.id(), Some("x"));
    }

    #[test]
    fn test_text_content_skips_comments() {
        let mut div = Node::element("div");
        div.add_child(Node::text("Hello "));
        div.add_child(Node::comment("note"));
        let mut span = Node::element("span");
        span.add_child(Node::text("World"));
        div.add_child(span);

        assert_eq!(div.text_content(), "Hello World");
    }

    #[test]
    fn test_outer_html() {
        let mut a = Node::element_with_attrs("a", vec![("href", "https://example.com")]);
        a.add_child(Node::text("Link & <more>"));

        assert_eq!(
            a.outer_html(),
            "<a href=\"https://example.com\">Link &amp; &lt;more&gt;</a>"
        );
    }

    #[test]
    fn test_void_element_html() {
        let br = Node::element("br");
        assert_eq!(br.outer_html(), "<br>");

        let img = Node::element_with_attrs("img", vec![("src", "test.png"), ("alt", "Test")]);
        assert_eq!(img.outer_html(), "<img src=\"test.png\" alt=\"Test\">");
    }

    #[test]
    fn test_into_element_by_id() {
        let mut html = Node::element("html");
        let mut body = Node::element("body");
        let mut root = Node::element_with_attrs("x-turndown", vec![("id", "turndown-root")]);
        root.add_child(Node::text("hi"));
        body.add_child(root);
        html.add_child(body);

        let found = html.into_element_by_id("turndown-root").unwrap();
        assert_eq!(found.tag_name(), "x-turndown");
        assert_eq!(found.text_content(), "hi");
    }

    #[test]
    fn test_edge_whitespace() {
        let edges = EdgeWhitespace::of(" \u{a0}foo\u{a0}\n");
        assert_eq!(edges.leading, " \u{a0}");
        assert_eq!(edges.leading_ascii, " ");
        assert_eq!(edges.leading_non_ascii, "\u{a0}");
        assert_eq!(edges.trailing, "\u{a0}\n");
        assert_eq!(edges.trailing_non_ascii, "\u{a0}");
        assert_eq!(edges.trailing_ascii, "\n");

        let blank = EdgeWhitespace::of("  ");
        assert_eq!(blank.leading, "  ");
        assert_eq!(blank.trailing, "");
    }

    #[test]
    fn test_flanking_whitespace_hoists_edges() {
        let mut p = Node::element("p");
        p.add_child(Node::text("a"));
        let mut em = Node::element("em");
        em.add_child(Node::text(" b "));
        p.add_child(em);
        p.add_child(Node::text("c"));

        let em = decorate_child(&p, 1);
        assert_eq!(em.flanking_whitespace.leading, " ");
        assert_eq!(em.flanking_whitespace.trailing, " ");
    }

    #[test]
    fn test_flanking_whitespace_abandoned_next_to_spaces() {
        let mut p = Node::element("p");
        p.add_child(Node::text("a "));
        let mut em = Node::element("em");
        em.add_child(Node::text(" b "));
        p.add_child(em);
        p.add_child(Node::text(" c"));

        let em = decorate_child(&p, 1);
        assert!(em.flanking_whitespace.is_empty());
    }

    #[test]
    fn test_block_has_no_flanking_whitespace() {
        let mut div = Node::element("div");
        let mut p = Node::element("p");
        p.add_child(Node::text(" b "));
        div.add_child(p);

        let p = decorate_child(&div, 0);
        assert!(p.is_block);
        assert!(p.flanking_whitespace.is_empty());
    }

    #[test]
    fn test_is_blank() {
        let mut p = Node::element("p");
        p.add_child(Node::text("  "));
        assert!(NodeRef::new(&p).is_blank);

        let mut p = Node::element("p");
        p.add_child(Node::element("br"));
        assert!(!NodeRef::new(&p).is_blank);

        assert!(!NodeRef::new(&Node::element("a")).is_blank);
        assert!(!NodeRef::new(&Node::element("hr")).is_blank);
    }

    #[test]
    fn test_sibling_navigation() {
        let mut ol = Node::element("ol");
        ol.add_child(Node::element("li"));
        ol.add_child(Node::text(" "));
        ol.add_child(Node::element("li"));

        let second = decorate_child(&ol, 2);
        assert_eq!(second.element_index(), 1);
        assert!(second.is_last_element_child());
        assert!(second.previous_sibling().unwrap().is_text());
        assert!(second.next_sibling().is_none());
        assert_eq!(second.parent_tag().as_deref(), Some("ol"));

        let first = decorate_child(&ol, 0);
        assert_eq!(first.element_index(), 0);
        assert!(!first.is_last_element_child());
        assert!(first.previous_sibling().is_none());
    }

    #[test]
    fn test_is_code_is_inherited() {
        let mut code = Node::element("code");
        code.add_child(Node::element("span"));
        let options = TurndownOptions::default();

        let span = NodeRef::decorate(&code, 0, true, &options).unwrap();
        assert!(span.is_code);
        let span = NodeRef::decorate(&code, 0, false, &options).unwrap();
        assert!(!span.is_code);
    }
}
