//! HTML parsing support.
//!
//! This module parses HTML strings with `scraper` and converts the result
//! to the CDP-style Node structure the converter works on.

use scraper::{ElementRef, Html, Node as ScraperNode};

use crate::node::Node;
use crate::root::HtmlParser;

/// [`HtmlParser`] backed by `scraper` (html5ever).
///
/// Stateless: every call builds a fresh document.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScraperParser;

impl HtmlParser for ScraperParser {
    fn parse_fragment(&self, html: &str) -> Node {
        parse_html(html)
    }
}

/// Parse an HTML string into a Node tree.
///
/// This is useful when you need to manipulate the DOM tree before
/// converting to Markdown, or when integrating with other tools.
///
/// # Example
///
/// ```rust
/// use turndown_safespace::{parse_html, TurndownService};
///
/// // Parse HTML to a Node tree
/// let node = parse_html("<h1>Hello <em>World</em></h1>");
///
/// // Convert to Markdown
/// let service = TurndownService::new();
/// let markdown = service.turndown(&node).unwrap();
/// assert_eq!(markdown, "Hello _World_\n=============");
/// ```
pub fn parse_html(html: &str) -> Node {
    let document = Html::parse_fragment(html);
    scraper_to_node(document.root_element())
}

/// Convert a scraper ElementRef to our Node structure
fn scraper_to_node(element: ElementRef) -> Node {
    let attrs: Vec<(&str, &str)> = element.value().attrs().collect();
    let mut node = Node::element_with_attrs(element.value().name(), attrs);

    // Doctypes and processing instructions have no counterpart
    for child in element.children() {
        match child.value() {
            ScraperNode::Text(text) => node.add_child(Node::text(&text.text)),
            ScraperNode::Comment(comment) => node.add_child(Node::comment(&comment.comment)),
            ScraperNode::Element(_) => {
                if let Some(child_element) = ElementRef::wrap(child) {
                    node.add_child(scraper_to_node(child_element));
                }
            }
            _ => {}
        }
    }

    node
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TurndownService;

    #[test]
    fn test_parse_simple_html() {
        let node = parse_html("<p>Hello World</p>");
        assert!(node.is_element());
        assert_eq!(node.tag_name(), "html");
        assert_eq!(node.text_content(), "Hello World");
    }

    #[test]
    fn test_comments_and_attributes_survive() {
        let node = parse_html(r#"<p class="x">a<!-- note -->b</p>"#);
        let p = node.element_children().next().unwrap();

        assert_eq!(p.attr("class"), Some("x"));
        assert_eq!(p.child_nodes().len(), 3);
        assert_eq!(p.child_nodes()[1].node_value.as_deref(), Some(" note "));
    }

    #[test]
    fn test_container_can_be_found() {
        let node = ScraperParser
            .parse_fragment(r#"<x-turndown id="turndown-root"><p>a</p></x-turndown>"#);
        let root = node.into_element_by_id("turndown-root").unwrap();

        assert_eq!(root.tag_name(), "x-turndown");
        assert_eq!(root.element_children().next().map(|n| n.tag_name()).as_deref(), Some("p"));
    }

    #[test]
    fn test_turndown_html() {
        let service = TurndownService::new();
        let result = service.turndown_html("<p>Hello World</p>").unwrap();
        assert_eq!(result, "Hello World");
    }

    #[test]
    fn test_turndown_html_with_formatting() {
        let service = TurndownService::new();
        let result = service
            .turndown_html("<p>Hello <strong>World</strong></p>")
            .unwrap();
        assert_eq!(result, "Hello **World**");
    }

    #[test]
    fn test_turndown_html_heading() {
        let service = TurndownService::new();
        let result = service.turndown_html("<h1>Title</h1>").unwrap();
        assert_eq!(result, "Title\n=====");
    }
}
