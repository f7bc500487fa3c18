//! Building the normalized tree a conversion works on.

use log::debug;

use crate::collapse::collapse_whitespace;
use crate::node::{Node, NodeType};
use crate::options::TurndownOptions;
use crate::safe_space::encode_safe_spaces;
use crate::{Result, TurndownError};

/// Id of the container element string input is wrapped in
pub const ROOT_ID: &str = "turndown-root";

/// Parses HTML fragments into [`Node`] trees.
///
/// Implementations must keep elements, text and comments, and must be
/// stateless between calls.
pub trait HtmlParser: Send + Sync {
    /// Parse `html` and return the tree the parser builds around it
    fn parse_fragment(&self, html: &str) -> Node;
}

impl<F> HtmlParser for F
where
    F: Fn(&str) -> Node + Send + Sync,
{
    fn parse_fragment(&self, html: &str) -> Node {
        self(html)
    }
}

/// What a conversion starts from
#[derive(Debug, Clone, Copy)]
pub enum Input<'a> {
    /// Raw HTML
    Html(&'a str),
    /// An element, document or document fragment; never modified
    Node(&'a Node),
}

impl<'a> From<&'a str> for Input<'a> {
    fn from(html: &'a str) -> Self {
        Input::Html(html)
    }
}

impl<'a> From<&'a String> for Input<'a> {
    fn from(html: &'a String) -> Self {
        Input::Html(html)
    }
}

impl<'a> From<&'a Node> for Input<'a> {
    fn from(node: &'a Node) -> Self {
        Input::Node(node)
    }
}

impl Input<'_> {
    /// Reject node kinds that cannot be converted
    pub fn validate(&self) -> Result<()> {
        match self {
            Input::Html(_) => Ok(()),
            Input::Node(node) => match node.node_type {
                NodeType::Element | NodeType::Document | NodeType::DocumentFragment => Ok(()),
                other => Err(TurndownError::InvalidInput(format!(
                    "{:?} node is not an element, document or fragment",
                    other
                ))),
            },
        }
    }
}

/// Build the normalized root for `input`.
///
/// HTML is wrapped in an `<x-turndown>` container so the parser keeps all
/// of it under one element; nodes are deep-cloned. Leading spaces are then
/// protected and whitespace collapsed.
pub fn build_root(
    input: Input<'_>,
    options: &TurndownOptions,
    parser: Option<&dyn HtmlParser>,
) -> Result<Node> {
    let mut root = match input {
        Input::Html(html) => {
            let parser = parser.ok_or_else(|| {
                TurndownError::Conversion("no HTML parser configured".to_string())
            })?;
            let wrapped = format!("<x-turndown id=\"{}\">{}</x-turndown>", ROOT_ID, html);
            parser
                .parse_fragment(&wrapped)
                .into_element_by_id(ROOT_ID)
                .ok_or_else(|| {
                    TurndownError::Conversion(format!("parser output has no #{} element", ROOT_ID))
                })?
        }
        Input::Node(node) => node.clone(),
    };

    debug!(
        "normalizing <{}> root with {} children",
        root.tag_name(),
        root.child_nodes().len()
    );

    encode_safe_spaces(&mut root);

    if options.preformatted_code {
        collapse_whitespace(&mut root, |n| n.is_tag("pre") || n.is_tag("code"));
    } else {
        collapse_whitespace(&mut root, |n| n.is_tag("pre"));
    }

    Ok(root)
}
