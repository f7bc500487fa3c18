//! # turndown-safespace
//!
//! Convert HTML and DOM nodes to Markdown, keeping significant leading
//! spaces.
//!
//! HTML whitespace collapsing and Markdown trimming both eat leading spaces.
//! Where such a space matters (the start of the document, text right after a
//! `<br>`), it is swapped for a sentinel ([`SAFE_SPACE`]) before the tree is
//! normalized and swapped back once the Markdown is assembled.
//!
//! ## Design
//!
//! The converter works on a CDP-style [`Node`] tree. HTML strings are parsed
//! by an [`HtmlParser`]; with the default `html` feature that is
//! [`ScraperParser`]. Caller-supplied trees are cloned and never modified.
//!
//! Conversion is a fold over the tree: every element is matched against the
//! [`Rules`] and replaced by its rule's output, and the replacements are
//! [`join`]ed with at most one blank line between them.
//!
//! ## Example (Node-based)
//!
//! ```rust
//! use turndown_safespace::{Node, TurndownService};
//!
//! let service = TurndownService::new();
//!
//! // The container's children are converted
//! let mut h1 = Node::element("h1");
//! h1.add_child(Node::text("Hello World"));
//! let mut root = Node::element("div");
//! root.add_child(h1);
//!
//! let markdown = service.turndown(&root).unwrap();
//! assert_eq!(markdown, "Hello World\n===========");
//! ```
//!
//! ## Example (HTML string)
//!
//! ```rust
//! use turndown_safespace::TurndownService;
//!
//! let service = TurndownService::new();
//! let markdown = service.turndown("a<br><span> b</span>").unwrap();
//! assert_eq!(markdown, "a  \n b");
//! ```

mod collapse;
mod escape;
#[cfg(feature = "html")]
pub mod html;
pub mod node;
mod options;
mod root;
mod rules;
mod safe_space;
mod service;
mod utilities;

pub use collapse::collapse_whitespace;
pub use escape::escape_markdown;
#[cfg(feature = "html")]
pub use html::{parse_html, ScraperParser};
pub use node::{FlankingWhitespace, Node, NodeRef, NodeType};
pub use options::{
    CodeBlockStyle, HeadingStyle, LinkReferenceStyle, LinkStyle, TurndownConfig, TurndownOptions,
};
pub use root::{build_root, HtmlParser, Input, ROOT_ID};
pub use rules::{
    commonmark_rules, AppendFn, ConversionState, Filter, PredicateFn, ReplacementFn, Rule, Rules,
};
pub use safe_space::{decode_safe_spaces, encode_safe_spaces, safe_trim, SAFE_SPACE};
pub use service::{Plugin, TurndownService};
pub use utilities::*;

/// Error type for turndown operations
#[derive(Debug, thiserror::Error)]
pub enum TurndownError {
    #[error("Conversion error: {0}")]
    Conversion(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid option: {0}")]
    InvalidOption(String),
}

pub type Result<T> = std::result::Result<T, TurndownError>;
