//! Configuration options for conversion

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::node::NodeRef;
use crate::rules::{commonmark_rules, ReplacementFn, Rule};
use crate::{Result, TurndownError};

/// Heading style options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeadingStyle {
    /// Use setext-style headings (underlined with = or -)
    /// Only works for h1 and h2, falls back to ATX for h3-h6
    #[default]
    Setext,
    /// Use ATX-style headings (prefixed with #)
    Atx,
}

/// Code block style options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CodeBlockStyle {
    /// Use indented code blocks (4 spaces)
    #[default]
    Indented,
    /// Use fenced code blocks (```)
    Fenced,
}

/// Link style options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkStyle {
    /// Use inline links [text](url)
    #[default]
    Inlined,
    /// Use reference links [text][ref]
    Referenced,
}

/// Reference style for referenced links
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkReferenceStyle {
    /// Full reference: [text][label]
    #[default]
    Full,
    /// Collapsed reference: [text][]
    Collapsed,
    /// Shortcut reference: [text]
    Shortcut,
}

macro_rules! impl_from_str {
    ($ty:ty, $what:literal, { $($name:literal => $variant:expr),+ $(,)? }) => {
        impl FromStr for $ty {
            type Err = TurndownError;

            fn from_str(s: &str) -> Result<Self> {
                match s.to_lowercase().as_str() {
                    $($name => Ok($variant),)+
                    other => Err(TurndownError::InvalidOption(format!(
                        "unknown {}: {:?}",
                        $what, other
                    ))),
                }
            }
        }
    };
}

impl_from_str!(HeadingStyle, "heading style", {
    "setext" => HeadingStyle::Setext,
    "atx" => HeadingStyle::Atx,
});

impl_from_str!(CodeBlockStyle, "code block style", {
    "indented" => CodeBlockStyle::Indented,
    "fenced" => CodeBlockStyle::Fenced,
});

impl_from_str!(LinkStyle, "link style", {
    "inlined" => LinkStyle::Inlined,
    "referenced" => LinkStyle::Referenced,
});

impl_from_str!(LinkReferenceStyle, "link reference style", {
    "full" => LinkReferenceStyle::Full,
    "collapsed" => LinkReferenceStyle::Collapsed,
    "shortcut" => LinkReferenceStyle::Shortcut,
});

/// Options for TurndownService
#[derive(Clone)]
pub struct TurndownOptions {
    /// Rule table, checked in order
    pub rules: IndexMap<String, Rule>,

    /// Heading style (setext or atx)
    pub heading_style: HeadingStyle,

    /// Horizontal rule string
    pub hr: String,

    /// Bullet list marker
    pub bullet_list_marker: char,

    /// Code block style
    pub code_block_style: CodeBlockStyle,

    /// Fence string for fenced code blocks
    pub fence: String,

    /// Emphasis delimiter
    pub em_delimiter: char,

    /// Strong delimiter
    pub strong_delimiter: String,

    /// Link style
    pub link_style: LinkStyle,

    /// Reference style for referenced links
    pub link_reference_style: LinkReferenceStyle,

    /// Text placed before the newline of a `<br>`
    pub br: String,

    /// Treat `<code>` like `<pre>` when collapsing whitespace
    pub preformatted_code: bool,

    /// Replacement for nodes that render to nothing
    pub blank_replacement: ReplacementFn,

    /// Replacement for nodes matched by a keep filter
    pub keep_replacement: ReplacementFn,

    /// Replacement for nodes no rule matches
    pub default_replacement: ReplacementFn,
}

impl Default for TurndownOptions {
    fn default() -> Self {
        Self {
            rules: commonmark_rules(),
            heading_style: HeadingStyle::Setext,
            hr: "* * *".to_string(),
            bullet_list_marker: '*',
            code_block_style: CodeBlockStyle::Indented,
            fence: "```".to_string(),
            em_delimiter: '_',
            strong_delimiter: "**".to_string(),
            link_style: LinkStyle::Inlined,
            link_reference_style: LinkReferenceStyle::Full,
            br: "  ".to_string(),
            preformatted_code: false,
            blank_replacement: Arc::new(blank_replacement),
            keep_replacement: Arc::new(keep_replacement),
            default_replacement: Arc::new(default_replacement),
        }
    }
}

impl fmt::Debug for TurndownOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TurndownOptions")
            .field("rules", &self.rules.keys().collect::<Vec<_>>())
            .field("heading_style", &self.heading_style)
            .field("hr", &self.hr)
            .field("bullet_list_marker", &self.bullet_list_marker)
            .field("code_block_style", &self.code_block_style)
            .field("fence", &self.fence)
            .field("em_delimiter", &self.em_delimiter)
            .field("strong_delimiter", &self.strong_delimiter)
            .field("link_style", &self.link_style)
            .field("link_reference_style", &self.link_reference_style)
            .field("br", &self.br)
            .field("preformatted_code", &self.preformatted_code)
            .finish_non_exhaustive()
    }
}

fn blank_replacement(node: &NodeRef, _content: &str, _options: &TurndownOptions) -> String {
    if node.is_block {
        "\n\n".to_string()
    } else {
        String::new()
    }
}

fn keep_replacement(node: &NodeRef, _content: &str, _options: &TurndownOptions) -> String {
    if node.is_block {
        format!("\n\n{}\n\n", node.outer_html())
    } else {
        node.outer_html()
    }
}

fn default_replacement(node: &NodeRef, content: &str, _options: &TurndownOptions) -> String {
    if node.is_block {
        format!("\n\n{}\n\n", content)
    } else {
        content.to_string()
    }
}

/// String-keyed options, as they arrive from a config file or a foreign
/// caller. Unset fields keep their defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase", default))]
pub struct TurndownConfig {
    pub heading_style: Option<String>,
    pub hr: Option<String>,
    pub bullet_list_marker: Option<String>,
    pub code_block_style: Option<String>,
    pub fence: Option<String>,
    pub em_delimiter: Option<String>,
    pub strong_delimiter: Option<String>,
    pub link_style: Option<String>,
    pub link_reference_style: Option<String>,
    pub br: Option<String>,
    pub preformatted_code: Option<bool>,
}

impl TryFrom<TurndownConfig> for TurndownOptions {
    type Error = TurndownError;

    fn try_from(config: TurndownConfig) -> Result<Self> {
        let mut result = TurndownOptions::default();

        if let Some(style) = config.heading_style {
            result.heading_style = style.parse()?;
        }

        if let Some(hr) = config.hr {
            result.hr = hr;
        }

        if let Some(marker) = config.bullet_list_marker {
            result.bullet_list_marker = single_char("bullet list marker", &marker)?;
        }

        if let Some(style) = config.code_block_style {
            result.code_block_style = style.parse()?;
        }

        if let Some(fence) = config.fence {
            result.fence = fence;
        }

        if let Some(delim) = config.em_delimiter {
            result.em_delimiter = single_char("emphasis delimiter", &delim)?;
        }

        if let Some(delim) = config.strong_delimiter {
            result.strong_delimiter = delim;
        }

        if let Some(style) = config.link_style {
            result.link_style = style.parse()?;
        }

        if let Some(style) = config.link_reference_style {
            result.link_reference_style = style.parse()?;
        }

        if let Some(br) = config.br {
            result.br = br;
        }

        if let Some(preformatted) = config.preformatted_code {
            result.preformatted_code = preformatted;
        }

        Ok(result)
    }
}

fn single_char(what: &str, value: &str) -> Result<char> {
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(TurndownError::InvalidOption(format!(
            "{} must be a single character, got {:?}",
            what, value
        ))),
    }
}
