//! TurndownService - the main entry point for HTML to Markdown conversion.

use log::debug;

use crate::escape::escape_markdown;
use crate::node::{Node, NodeRef, NodeType};
use crate::options::TurndownOptions;
use crate::root::{build_root, HtmlParser, Input};
use crate::rules::{ConversionState, Filter, Rule, Rules};
use crate::safe_space::{decode_safe_spaces, safe_trim, SAFE_SPACE};
use crate::utilities::join;
use crate::Result;

/// Something that configures a [`TurndownService`].
///
/// Any `FnOnce(&mut TurndownService)` is a plugin, and so is a `Vec` or
/// array of plugins, applied in order.
pub trait Plugin {
    fn apply(self, service: &mut TurndownService);
}

impl<F> Plugin for F
where
    F: FnOnce(&mut TurndownService),
{
    fn apply(self, service: &mut TurndownService) {
        self(service)
    }
}

impl<P: Plugin> Plugin for Vec<P> {
    fn apply(self, service: &mut TurndownService) {
        for plugin in self {
            plugin.apply(service);
        }
    }
}

impl<P: Plugin, const N: usize> Plugin for [P; N] {
    fn apply(self, service: &mut TurndownService) {
        for plugin in self {
            plugin.apply(service);
        }
    }
}

/// The main service for converting HTML to Markdown
pub struct TurndownService {
    options: TurndownOptions,
    rules: Rules,
    parser: Option<Box<dyn HtmlParser>>,
}

impl TurndownService {
    /// Create a new TurndownService with default options
    pub fn new() -> Self {
        Self::with_options(TurndownOptions::default())
    }

    /// Create a TurndownService with custom options
    pub fn with_options(options: TurndownOptions) -> Self {
        Self {
            rules: Rules::new(&options),
            options,
            parser: default_parser(),
        }
    }

    /// Replace the parser used for HTML string input
    pub fn with_parser(mut self, parser: impl HtmlParser + 'static) -> Self {
        self.parser = Some(Box::new(parser));
        self
    }

    /// Convert HTML or a node tree to Markdown.
    ///
    /// Only the children of a node are converted; the node itself acts as
    /// the container. Text and comment nodes are rejected.
    pub fn turndown<'a>(&self, input: impl Into<Input<'a>>) -> Result<String> {
        let input = input.into();
        input.validate()?;

        if let Input::Html("") = input {
            return Ok(String::new());
        }

        let root = build_root(input, &self.options, self.parser.as_deref())?;
        let state = ConversionState::new();
        let output = self.process(&root, false, &state);
        let markdown = self.post_process(output, &state);

        debug!("converted {} input to {} bytes of Markdown", kind(&input), markdown.len());
        Ok(markdown)
    }

    /// Convert an HTML string to Markdown
    pub fn turndown_html(&self, html: &str) -> Result<String> {
        self.turndown(Input::Html(html))
    }

    /// Convert a node tree to Markdown
    pub fn turndown_node(&self, node: &Node) -> Result<String> {
        self.turndown(Input::Node(node))
    }

    /// Apply a plugin
    pub fn use_plugin(&mut self, plugin: impl Plugin) -> &mut Self {
        plugin.apply(self);
        self
    }

    /// Add a custom rule, replacing any rule with the same key
    pub fn add_rule(&mut self, key: &str, rule: Rule) -> &mut Self {
        self.rules.add(key, rule);
        self
    }

    /// Keep elements matching the filter as HTML
    pub fn keep(&mut self, filter: impl Into<Filter>) -> &mut Self {
        self.rules.keep(filter.into());
        self
    }

    /// Remove elements matching the filter
    pub fn remove(&mut self, filter: impl Into<Filter>) -> &mut Self {
        self.rules.remove(filter.into());
        self
    }

    /// Escape markdown special characters in a string
    pub fn escape(&self, text: &str) -> String {
        escape_markdown(text)
    }

    /// Get the current options
    pub fn options(&self) -> &TurndownOptions {
        &self.options
    }

    /// Reduce the children of `parent` to Markdown
    fn process(&self, parent: &Node, parent_is_code: bool, state: &ConversionState) -> String {
        parent
            .child_nodes()
            .iter()
            .enumerate()
            .fold(String::new(), |output, (index, child)| {
                let replacement = match child.node_type {
                    NodeType::Text => {
                        let text = child.node_value.as_deref().unwrap_or("");
                        if parent_is_code {
                            text.to_string()
                        } else {
                            self.escape(text)
                        }
                    }
                    NodeType::Element => {
                        NodeRef::decorate(parent, index, parent_is_code, &self.options)
                            .map(|node| self.replacement_for_node(&node.with_state(state), state))
                            .unwrap_or_default()
                    }
                    _ => String::new(),
                };

                join(&output, &replacement)
            })
    }

    /// Convert one element, hoisting its flanking whitespace outside the
    /// rule's replacement
    fn replacement_for_node(&self, node: &NodeRef, state: &ConversionState) -> String {
        let rule = self.rules.for_node(node, &self.options);
        let content = self.process(node.node, node.is_code, state);
        let whitespace = &node.flanking_whitespace;

        // Nothing to hoist: leading sentinels reach the rule untouched
        if whitespace.is_empty() {
            return rule.replace(node, &content, &self.options);
        }

        let mut content = safe_trim(&content);
        // The leading separator already stands in for protected spaces
        if !whitespace.leading.is_empty() {
            content = content.trim_start_matches(SAFE_SPACE);
        }

        format!(
            "{}{}{}",
            whitespace.leading,
            rule.replace(node, content, &self.options),
            whitespace.trailing
        )
    }

    /// Join every rule's appended output, trim, and decode protected spaces
    fn post_process(&self, output: String, state: &ConversionState) -> String {
        let output = self
            .rules
            .iter()
            .filter_map(|rule| rule.append.as_ref())
            .fold(output, |output, append| join(&output, &append(&self.options, state)));

        let trimmed = output.trim_start_matches(['\t', '\r', '\n']).trim_end();
        decode_safe_spaces(trimmed)
    }
}

impl Default for TurndownService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "html")]
fn default_parser() -> Option<Box<dyn HtmlParser>> {
    Some(Box::new(crate::html::ScraperParser))
}

#[cfg(not(feature = "html"))]
fn default_parser() -> Option<Box<dyn HtmlParser>> {
    None
}

fn kind(input: &Input<'_>) -> &'static str {
    match input {
        Input::Html(_) => "html",
        Input::Node(_) => "node",
    }
}
