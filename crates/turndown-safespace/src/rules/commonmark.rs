//! CommonMark rules for HTML to Markdown conversion.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;

use super::{ConversionState, Filter, Rule};
use crate::node::NodeRef;
use crate::options::{CodeBlockStyle, HeadingStyle, LinkReferenceStyle, LinkStyle};
use crate::safe_space::safe_trim;
use crate::utilities::{clean_attribute, repeat};

/// Create all CommonMark rules, keyed by name, in matching order
pub fn commonmark_rules() -> IndexMap<String, Rule> {
    [
        ("paragraph", paragraph_rule()),
        ("lineBreak", line_break_rule()),
        ("heading", heading_rule()),
        ("blockquote", blockquote_rule()),
        ("list", list_rule()),
        ("listItem", list_item_rule()),
        ("indentedCodeBlock", indented_code_block_rule()),
        ("fencedCodeBlock", fenced_code_block_rule()),
        ("horizontalRule", horizontal_rule()),
        ("inlineLink", inline_link_rule()),
        ("referenceLink", reference_link_rule()),
        ("emphasis", emphasis_rule()),
        ("strong", strong_rule()),
        ("code", code_rule()),
        ("image", image_rule()),
    ]
    .into_iter()
    .map(|(key, rule)| (key.to_string(), rule))
    .collect()
}

fn paragraph_rule() -> Rule {
    Rule::for_tag("p", |_, content, _| format!("\n\n{}\n\n", content))
}

fn line_break_rule() -> Rule {
    Rule::for_tag("br", |_, _, options| format!("{}\n", options.br))
}

fn heading_rule() -> Rule {
    Rule::for_tags(
        &["h1", "h2", "h3", "h4", "h5", "h6"],
        |node, content, options| {
            let tag = node.tag_name();
            let level: usize = tag[1..].parse().unwrap_or(1);

            match options.heading_style {
                HeadingStyle::Setext if level < 3 => {
                    let underline = if level == 1 { "=" } else { "-" };
                    format!(
                        "\n\n{}\n{}\n\n",
                        content,
                        repeat(underline, content.chars().count())
                    )
                }
                _ => format!("\n\n{} {}\n\n", repeat("#", level), content),
            }
        },
    )
}

fn blockquote_rule() -> Rule {
    Rule::for_tag("blockquote", |_, content, _| {
        let quoted: Vec<String> = content
            .trim_matches('\n')
            .split('\n')
            .map(|line| format!("> {}", line))
            .collect();
        format!("\n\n{}\n\n", quoted.join("\n"))
    })
}

fn list_rule() -> Rule {
    Rule::for_tags(&["ul", "ol"], |node, content, _| {
        let nested_last =
            node.parent_tag().as_deref() == Some("li") && node.is_last_element_child();

        if nested_last {
            format!("\n{}", content)
        } else {
            format!("\n\n{}\n\n", content)
        }
    })
}

fn list_item_rule() -> Rule {
    Rule::for_tag("li", |node, content, options| {
        let mut content = content.trim_start_matches('\n').to_string();
        let body_len = content.trim_end_matches('\n').len();
        if body_len < content.len() {
            content.truncate(body_len);
            content.push('\n');
        }
        // Indent continuation lines
        let content = content.replace('\n', "\n    ");

        let ordered_parent = node.parent().filter(|p| p.is_tag("ol"));
        let prefix = match ordered_parent {
            Some(ol) => {
                let index = node.element_index();
                let number = ol
                    .attr("start")
                    .and_then(|s| s.trim().parse::<i64>().ok())
                    .map(|start| start + index as i64)
                    .unwrap_or(index as i64 + 1);
                format!("{}.  ", number)
            }
            None => format!("{}   ", options.bullet_list_marker),
        };

        let separator = if node.next_sibling().is_some() && !content.ends_with('\n') {
            "\n"
        } else {
            ""
        };

        format!("{}{}{}", prefix, content, separator)
    })
}

fn starts_with_code(node: &NodeRef) -> bool {
    node.first_child().is_some_and(|c| c.is_tag("code"))
}

fn indented_code_block_rule() -> Rule {
    Rule::new(
        Filter::predicate(|tag, node, options| {
            options.code_block_style == CodeBlockStyle::Indented
                && tag == "pre"
                && starts_with_code(node)
        }),
        |node, _, _| {
            let code = node.first_child().map(|c| c.text_content()).unwrap_or_default();
            format!("\n\n    {}\n\n", code.replace('\n', "\n    "))
        },
    )
}

static LANGUAGE_CLASS: Lazy<Regex> = Lazy::new(|| Regex::new(r"language-(\S+)").unwrap());

fn fenced_code_block_rule() -> Rule {
    Rule::new(
        Filter::predicate(|tag, node, options| {
            options.code_block_style == CodeBlockStyle::Fenced
                && tag == "pre"
                && starts_with_code(node)
        }),
        |node, _, options| {
            let Some(code_node) = node.first_child() else {
                return String::new();
            };

            let class = code_node.attr("class").unwrap_or("");
            let language = LANGUAGE_CLASS
                .captures(class)
                .and_then(|c| c.get(1))
                .map_or("", |m| m.as_str());

            let code = code_node.text_content();
            let fence_char = options.fence.chars().next().unwrap_or('`');

            // Grow the fence past any fence-like run opening a line of code
            let fence_size = code
                .split('\n')
                .map(|line| line.chars().take_while(|c| *c == fence_char).count())
                .filter(|run| *run >= 3)
                .fold(3, |size, run| if run >= size { run + 1 } else { size });
            let fence = fence_char.to_string().repeat(fence_size);

            format!(
                "\n\n{}{}\n{}\n{}\n\n",
                fence,
                language,
                code.strip_suffix('\n').unwrap_or(&code),
                fence
            )
        },
    )
}

fn horizontal_rule() -> Rule {
    Rule::for_tag("hr", |_, _, options| format!("\n\n{}\n\n", options.hr))
}

fn has_href(node: &NodeRef) -> bool {
    node.attr("href").is_some_and(|href| !href.is_empty())
}

fn inline_link_rule() -> Rule {
    Rule::new(
        Filter::predicate(|tag, node, options| {
            options.link_style == LinkStyle::Inlined && tag == "a" && has_href(node)
        }),
        |node, content, _| {
            let href = node
                .attr("href")
                .unwrap_or("")
                .replace('(', "\\(")
                .replace(')', "\\)");
            let title = clean_attribute(node.attr("title"));
            let title_part = if title.is_empty() {
                String::new()
            } else {
                format!(" \"{}\"", title.replace('"', "\\\""))
            };

            format!("[{}]({}{})", content, href, title_part)
        },
    )
}

fn reference_link_rule() -> Rule {
    Rule::new(
        Filter::predicate(|tag, node, options| {
            options.link_style == LinkStyle::Referenced && tag == "a" && has_href(node)
        }),
        |node, content, options| {
            let href = node.attr("href").unwrap_or("");
            let title = clean_attribute(node.attr("title"));
            let title_part = if title.is_empty() {
                String::new()
            } else {
                format!(" \"{}\"", title)
            };

            let (replacement, reference) = match options.link_reference_style {
                LinkReferenceStyle::Collapsed => (
                    format!("[{}][]", content),
                    format!("[{}]: {}{}", content, href, title_part),
                ),
                LinkReferenceStyle::Shortcut => (
                    format!("[{}]", content),
                    format!("[{}]: {}{}", content, href, title_part),
                ),
                LinkReferenceStyle::Full => {
                    let id = node.state().map_or(0, ConversionState::reference_count) + 1;
                    (
                        format!("[{}][{}]", content, id),
                        format!("[{}]: {}{}", id, href, title_part),
                    )
                }
            };
            if let Some(state) = node.state() {
                state.push_reference(reference);
            }
            replacement
        },
    )
    .with_append(|_, state| {
        let references = state.take_references();
        if references.is_empty() {
            return String::new();
        }
        format!("\n\n{}\n\n", references.join("\n"))
    })
}

fn emphasis_rule() -> Rule {
    Rule::for_tags(&["em", "i"], |_, content, options| {
        if safe_trim(content).is_empty() {
            return String::new();
        }
        let delimiter = options.em_delimiter;
        format!("{}{}{}", delimiter, content, delimiter)
    })
}

fn strong_rule() -> Rule {
    Rule::for_tags(&["strong", "b"], |_, content, options| {
        if safe_trim(content).is_empty() {
            return String::new();
        }
        let delimiter = &options.strong_delimiter;
        format!("{}{}{}", delimiter, content, delimiter)
    })
}

static LINE_ENDINGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\r?\n|\r").unwrap());

fn code_rule() -> Rule {
    Rule::new(
        Filter::predicate(|tag, node, _| {
            // Match <code> unless it is the only child of a <pre>
            let has_siblings = node.previous_sibling().is_some() || node.next_sibling().is_some();
            let is_code_block = node.parent_tag().as_deref() == Some("pre") && !has_siblings;
            tag == "code" && !is_code_block
        }),
        |_, content, _| {
            if content.is_empty() {
                return String::new();
            }
            let content = LINE_ENDINGS.replace_all(content, " ");

            let padded = content.starts_with(' ')
                && content.ends_with(' ')
                && content.chars().any(|c| c != ' ');
            let extra_space = if content.starts_with('`') || content.ends_with('`') || padded {
                " "
            } else {
                ""
            };

            // Pick a delimiter no backtick run in the content equals
            let runs = backtick_runs(&content);
            let mut delimiter = "`".to_string();
            while runs.contains(&delimiter.len()) {
                delimiter.push('`');
            }

            format!(
                "{}{}{}{}{}",
                delimiter, extra_space, content, extra_space, delimiter
            )
        },
    )
}

fn backtick_runs(content: &str) -> Vec<usize> {
    content
        .split(|c| c != '`')
        .map(str::len)
        .filter(|len| *len > 0)
        .collect()
}

fn image_rule() -> Rule {
    Rule::for_tag("img", |node, _, _| {
        let alt = clean_attribute(node.attr("alt"));
        let src = node.attr("src").unwrap_or("");
        let title = clean_attribute(node.attr("title"));

        if src.is_empty() {
            return String::new();
        }

        let title_part = if title.is_empty() {
            String::new()
        } else {
            format!(" \"{}\"", title)
        };

        format!("![{}]({}{})", alt, src, title_part)
    })
}
