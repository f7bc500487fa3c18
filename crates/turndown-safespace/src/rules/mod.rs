//! Rule system for HTML to Markdown conversion.

mod commonmark;
mod rule;

pub use commonmark::commonmark_rules;
pub use rule::{AppendFn, ConversionState, Filter, PredicateFn, ReplacementFn, Rule};

use std::sync::Arc;

use indexmap::IndexMap;
use log::trace;

use crate::node::NodeRef;
use crate::options::TurndownOptions;

/// Collection of rules for conversion.
///
/// A node is matched against, in order: the blank rule (blank nodes only),
/// added rules newest first, the options' rule table, keep filters newest
/// first, remove filters newest first, and finally the default rule.
#[derive(Clone)]
pub struct Rules {
    /// Rules added through [`Rules::add`], oldest first
    added: IndexMap<String, Rule>,
    /// Rule table taken from the options
    table: IndexMap<String, Rule>,
    /// Keep rules (preserve as HTML), oldest first
    keep: Vec<Rule>,
    /// Remove rules (drop entirely), oldest first
    remove: Vec<Rule>,
    blank_rule: Rule,
    default_rule: Rule,
    keep_replacement: ReplacementFn,
}

impl Rules {
    /// Create the rules described by `options`
    pub fn new(options: &TurndownOptions) -> Self {
        Self {
            added: IndexMap::new(),
            table: options.rules.clone(),
            keep: Vec::new(),
            remove: Vec::new(),
            blank_rule: Rule::fallback(Arc::clone(&options.blank_replacement)),
            default_rule: Rule::fallback(Arc::clone(&options.default_replacement)),
            keep_replacement: Arc::clone(&options.keep_replacement),
        }
    }

    /// Add a rule under `key`, replacing any rule already known by that key
    pub fn add(&mut self, key: &str, rule: Rule) {
        self.table.shift_remove(key);
        self.added.shift_remove(key);
        self.added.insert(key.to_string(), rule);
    }

    /// Add a keep filter
    pub fn keep(&mut self, filter: Filter) {
        self.keep.push(Rule {
            filter,
            replacement: Arc::clone(&self.keep_replacement),
            append: None,
        });
    }

    /// Add a remove filter
    pub fn remove(&mut self, filter: Filter) {
        self.remove.push(Rule::new(filter, |_, _, _| String::new()));
    }

    /// Find the rule that converts `node`
    pub fn for_node(&self, node: &NodeRef, options: &TurndownOptions) -> &Rule {
        if node.is_blank {
            trace!("<{}> is blank", node.tag_name());
            return &self.blank_rule;
        }

        let tag = node.tag_name();
        let matches = |rule: &&Rule| rule.filter.matches(&tag, node, options);

        if let Some((key, rule)) = self
            .added
            .iter()
            .rev()
            .chain(self.table.iter())
            .find(|(_, rule)| matches(rule))
        {
            trace!("<{}> matched rule {:?}", tag, key);
            return rule;
        }

        if let Some(rule) = self.keep.iter().rev().find(matches) {
            trace!("<{}> kept as HTML", tag);
            return rule;
        }

        if let Some(rule) = self.remove.iter().rev().find(matches) {
            trace!("<{}> removed", tag);
            return rule;
        }

        trace!("<{}> fell through to the default rule", tag);
        &self.default_rule
    }

    /// Rules that may carry an append function, in matching order
    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.added.values().rev().chain(self.table.values())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Node;

    fn paragraph(text: &str) -> Node {
        let mut p = Node::element("p");
        p.add_child(Node::text(text));
        p
    }

    fn replace(rules: &Rules, node: &Node, options: &TurndownOptions) -> String {
        let node = NodeRef::new(node);
        rules.for_node(&node, options).replace(&node, "x", options)
    }

    #[test]
    fn test_table_rule_matches() {
        let options = TurndownOptions::default();
        let rules = Rules::new(&options);

        assert_eq!(replace(&rules, &paragraph("a"), &options), "\n\nx\n\n");
    }

    #[test]
    fn test_blank_rule_wins() {
        let options = TurndownOptions::default();
        let mut rules = Rules::new(&options);
        rules.add(
            "everything",
            Rule::new(Filter::predicate(|_, _, _| true), |_, _, _| "!".into()),
        );

        assert_eq!(replace(&rules, &paragraph("  "), &options), "\n\n");
        assert_eq!(replace(&rules, &Node::element("span"), &options), "");
    }

    #[test]
    fn test_newest_added_rule_wins() {
        let options = TurndownOptions::default();
        let mut rules = Rules::new(&options);
        rules.add("first", Rule::for_tag("p", |_, _, _| "first".into()));
        rules.add("second", Rule::for_tag("p", |_, _, _| "second".into()));

        assert_eq!(replace(&rules, &paragraph("a"), &options), "second");
    }

    #[test]
    fn test_add_overwrites_table_key() {
        let options = TurndownOptions::default();
        let mut rules = Rules::new(&options);
        rules.add("paragraph", Rule::for_tag("div", |_, _, _| "div".into()));

        let mut div = Node::element("div");
        div.add_child(Node::text("a"));

        assert_eq!(replace(&rules, &div, &options), "div");
        assert_eq!(rules.iter().count(), options.rules.len());
    }

    #[test]
    fn test_keep_and_remove_come_after_rules() {
        let options = TurndownOptions::default();
        let mut rules = Rules::new(&options);
        rules.keep(Filter::tags(&["p", "del"]));
        rules.remove(Filter::tag("del"));

        let mut del = Node::element("del");
        del.add_child(Node::text("gone"));

        assert_eq!(replace(&rules, &paragraph("a"), &options), "\n\nx\n\n");
        assert_eq!(replace(&rules, &del, &options), "<del>gone</del>");
    }

    #[test]
    fn test_remove_and_default() {
        let options = TurndownOptions::default();
        let mut rules = Rules::new(&options);
        rules.remove(Filter::tag("script"));

        let mut script = Node::element("script");
        script.add_child(Node::text("alert(1)"));
        let mut span = Node::element("span");
        span.add_child(Node::text("a"));

        assert_eq!(replace(&rules, &script, &options), "");
        assert_eq!(replace(&rules, &span, &options), "x");
    }
}
