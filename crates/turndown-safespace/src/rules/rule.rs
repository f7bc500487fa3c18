//! Rule and Filter types for HTML conversion.

use std::cell::RefCell;
use std::fmt;
use std::sync::Arc;

use crate::node::NodeRef;
use crate::options::TurndownOptions;

/// Type alias for replacement functions
pub type ReplacementFn = Arc<dyn Fn(&NodeRef, &str, &TurndownOptions) -> String + Send + Sync>;

/// Type alias for append functions, called once after the whole tree is reduced
pub type AppendFn = Arc<dyn Fn(&TurndownOptions, &ConversionState) -> String + Send + Sync>;

/// Type alias for filter predicates
pub type PredicateFn = Arc<dyn Fn(&str, &NodeRef, &TurndownOptions) -> bool + Send + Sync>;

/// Scratch state owned by a single conversion.
///
/// Every `turndown` call creates its own, hands it to the rules through
/// [`NodeRef::state`] and to the append functions, and drops it when the
/// call returns or unwinds.
#[derive(Debug, Default)]
pub struct ConversionState {
    references: RefCell<Vec<String>>,
}

impl ConversionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of link references collected so far
    pub fn reference_count(&self) -> usize {
        self.references.borrow().len()
    }

    /// Record a link reference definition line
    pub fn push_reference(&self, reference: String) {
        self.references.borrow_mut().push(reference);
    }

    /// Remove and return the collected references in document order
    pub fn take_references(&self) -> Vec<String> {
        self.references.take()
    }
}

/// A filter determines which elements a rule applies to
#[derive(Clone)]
pub enum Filter {
    /// Match a single tag name
    TagName(String),
    /// Match any of multiple tag names
    TagNames(Vec<String>),
    /// Match using a predicate function
    Predicate(PredicateFn),
}

impl Filter {
    /// Create a filter for a single tag
    pub fn tag(name: &str) -> Self {
        Filter::TagName(name.to_lowercase())
    }

    /// Create a filter for multiple tags
    pub fn tags(names: &[&str]) -> Self {
        Filter::TagNames(names.iter().map(|s| s.to_lowercase()).collect())
    }

    /// Create a filter with a predicate
    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&str, &NodeRef, &TurndownOptions) -> bool + Send + Sync + 'static,
    {
        Filter::Predicate(Arc::new(f))
    }

    /// Check if this filter matches a node
    pub fn matches(&self, tag: &str, node: &NodeRef, options: &TurndownOptions) -> bool {
        let tag_lower = tag.to_lowercase();
        match self {
            Filter::TagName(t) => tag_lower == *t,
            Filter::TagNames(tags) => tags.contains(&tag_lower),
            Filter::Predicate(f) => f(&tag_lower, node, options),
        }
    }
}

impl From<&str> for Filter {
    fn from(name: &str) -> Self {
        Filter::tag(name)
    }
}

impl From<&[&str]> for Filter {
    fn from(names: &[&str]) -> Self {
        Filter::tags(names)
    }
}

impl<const N: usize> From<[&str; N]> for Filter {
    fn from(names: [&str; N]) -> Self {
        Filter::tags(&names)
    }
}

impl fmt::Debug for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::TagName(t) => f.debug_tuple("TagName").field(t).finish(),
            Filter::TagNames(tags) => f.debug_tuple("TagNames").field(tags).finish(),
            Filter::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

/// A rule defines how to convert a matched HTML element to Markdown
#[derive(Clone)]
pub struct Rule {
    /// Filter to determine which elements this rule applies to
    pub filter: Filter,
    /// Replacement function that generates Markdown
    pub replacement: ReplacementFn,
    /// Trailing content joined onto the finished document
    pub append: Option<AppendFn>,
}

impl Rule {
    /// Create a new rule
    pub fn new<F>(filter: Filter, replacement: F) -> Self
    where
        F: Fn(&NodeRef, &str, &TurndownOptions) -> String + Send + Sync + 'static,
    {
        Self {
            filter,
            replacement: Arc::new(replacement),
            append: None,
        }
    }

    /// Create a rule that matches a single tag
    pub fn for_tag<F>(tag: &str, replacement: F) -> Self
    where
        F: Fn(&NodeRef, &str, &TurndownOptions) -> String + Send + Sync + 'static,
    {
        Self::new(Filter::tag(tag), replacement)
    }

    /// Create a rule that matches multiple tags
    pub fn for_tags<F>(tags: &[&str], replacement: F) -> Self
    where
        F: Fn(&NodeRef, &str, &TurndownOptions) -> String + Send + Sync + 'static,
    {
        Self::new(Filter::tags(tags), replacement)
    }

    /// Rule that applies a shared replacement to every node it is asked about
    pub(crate) fn fallback(replacement: ReplacementFn) -> Self {
        Self {
            filter: Filter::predicate(|_, _, _| true),
            replacement,
            append: None,
        }
    }

    /// Attach an append function
    pub fn with_append<F>(mut self, append: F) -> Self
    where
        F: Fn(&TurndownOptions, &ConversionState) -> String + Send + Sync + 'static,
    {
        self.append = Some(Arc::new(append));
        self
    }

    /// Apply this rule's replacement
    pub fn replace(&self, node: &NodeRef, content: &str, options: &TurndownOptions) -> String {
        (self.replacement)(node, content, options)
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("filter", &self.filter)
            .field("append", &self.append.is_some())
            .finish_non_exhaustive()
    }
}
