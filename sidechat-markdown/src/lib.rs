//! HTML → plain-text/Markdown normalizer for captured chat responses.
//!
//! Host pages decorate their response HTML with icons, disclaimers, and
//! hidden scaffolding. [`remove`] strips named selectors from a detached
//! parse tree; [`convert`] walks the tree and emits a light Markdown
//! approximation (bold, italics, headings, lists, inline code). Both are
//! deterministic, pure functions of their input.

use std::sync::LazyLock;

use ego_tree::NodeRef;
use regex::Regex;
use scraper::{Html, Node, Selector};
use tracing::warn;

static ORDERED_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\s").expect("ordered-item regex"));

/// Parse `html` into a detached tree, drop every element matching any of
/// `selectors`, and serialize the remainder back to HTML.
///
/// Unparseable selectors are skipped with a warning rather than failing the
/// whole extraction. Applying `remove` twice is equivalent to applying it
/// once: the second pass finds nothing left to strip.
pub fn remove(html: &str, selectors: &[&str]) -> String {
    let mut doc = Html::parse_fragment(html);

    for raw in selectors {
        let sel = match Selector::parse(raw) {
            Ok(sel) => sel,
            Err(err) => {
                warn!(selector = raw, %err, "skipping unparseable strip selector");
                continue;
            }
        };
        let ids: Vec<_> = doc.select(&sel).map(|el| el.id()).collect();
        for id in ids {
            if let Some(mut node) = doc.tree.get_mut(id) {
                node.detach();
            }
        }
    }

    doc.root_element().inner_html()
}

/// Convert response HTML into plain text with light Markdown markup.
///
/// Emits `**bold**`, `*italic*`, `#`–`######` headings, `* ` / `1. ` list
/// markers, and backtick inline code; paragraphs become blank-line separated
/// blocks and redundant whitespace is collapsed.
pub fn convert(html: &str) -> String {
    let doc = Html::parse_fragment(html);

    let mut walk = Walker::default();
    for child in doc.root_element().children() {
        walk.process(child);
    }

    reflow(&walk.out)
}

#[derive(Default)]
struct Walker {
    out: String,
    list_level: usize,
    ordered_item: usize,
}

impl Walker {
    fn process(&mut self, node: NodeRef<'_, Node>) {
        match node.value() {
            Node::Text(text) => self.out.push_str(text.trim()),
            Node::Element(element) => {
                self.out.push(' ');
                match element.name() {
                    "p" => {
                        if !self.out.trim().is_empty() {
                            self.out.push_str("\n\n");
                        }
                        self.children(node);
                    }
                    "strong" | "b" => self.wrap(node, "**"),
                    "em" | "i" => self.wrap(node, "*"),
                    "code" => self.wrap(node, "`"),
                    "h1" => self.heading(node, "# "),
                    "h2" => self.heading(node, "## "),
                    "h3" => self.heading(node, "### "),
                    "h4" => self.heading(node, "#### "),
                    "h5" => self.heading(node, "##### "),
                    "h6" => self.heading(node, "###### "),
                    "ul" => self.list(node, false),
                    "ol" => self.list(node, true),
                    "li" => self.item(node),
                    _ => self.children(node),
                }
                self.out.push(' ');
            }
            _ => {}
        }
    }

    fn children(&mut self, node: NodeRef<'_, Node>) {
        for child in node.children() {
            self.process(child);
        }
    }

    fn wrap(&mut self, node: NodeRef<'_, Node>, marker: &str) {
        self.out.push_str(marker);
        self.children(node);
        self.out.push_str(marker);
    }

    fn heading(&mut self, node: NodeRef<'_, Node>, marker: &str) {
        if !self.out.trim().is_empty() {
            self.out.push_str("\n\n");
        }
        self.out.push_str(marker);
        self.children(node);
        self.out.push_str("\n\n");
    }

    fn list(&mut self, node: NodeRef<'_, Node>, ordered: bool) {
        if !self.out.trim().is_empty() && !self.out.ends_with('\n') {
            self.out.push('\n');
        }
        self.list_level += 1;
        if ordered {
            self.ordered_item = 1;
        }
        self.children(node);
        self.list_level -= 1;
        if self.list_level == 0 && !self.out.ends_with('\n') {
            self.out.push('\n');
        }
    }

    fn item(&mut self, node: NodeRef<'_, Node>) {
        let ordered = node
            .parent()
            .and_then(|p| p.value().as_element())
            .is_some_and(|el| el.name() == "ol");
        if ordered {
            self.out.push_str(&format!("{}. ", self.ordered_item));
            self.ordered_item += 1;
        } else {
            self.out.push_str("* ");
        }
        self.children(node);
        self.out.push('\n');
    }
}

/// Re-join the walker's raw output: list runs stay line-per-item, other
/// non-empty lines become blank-line separated blocks, whitespace collapses.
fn reflow(plain: &str) -> String {
    let mut formatted = String::new();
    let mut in_list = false;

    for raw in plain.trim().split('\n') {
        let line = raw.trim();
        if line.starts_with("* ") || ORDERED_ITEM.is_match(line) {
            if !in_list && !formatted.trim().is_empty() {
                formatted.push('\n');
            }
            in_list = true;
            formatted.push_str(line);
            formatted.push('\n');
        } else if !line.is_empty() {
            in_list = false;
            if !formatted.trim().is_empty() {
                formatted.push_str("\n\n");
            }
            formatted.push_str(line);
        } else if in_list {
            formatted.push('\n');
        }
    }

    let mut formatted = formatted.trim().replace('\u{a0}', " ");
    while formatted.contains("  ") {
        formatted = formatted.replace("  ", " ");
    }
    formatted
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn paragraph_round_trip() {
        let html = "<p>Hello <b>world</b></p>";
        assert_eq!(convert(&remove(html, &[])), "Hello **world**");
    }

    #[test]
    fn remove_is_idempotent() {
        let html = r#"<div><p>keep</p><span class="sr-only">drop</span></div>"#;
        let once = remove(html, &[".sr-only"]);
        let twice = remove(&once, &[".sr-only"]);
        assert_eq!(once, twice);
        assert!(!once.contains("drop"));
    }

    #[test]
    fn remove_skips_bad_selector() {
        let html = "<p>still here</p>";
        let out = remove(html, &["<<not a selector>>"]);
        assert!(out.contains("still here"));
    }

    #[test]
    fn remove_strips_custom_elements_and_attribute_selectors() {
        let html = r#"<div><mat-icon>star</mat-icon><p aria-hidden="true">x</p><p>body</p></div>"#;
        let out = remove(html, &["mat-icon", r#"[aria-hidden="true"]"#]);
        assert!(!out.contains("star"));
        assert!(!out.contains(">x<"));
        assert!(out.contains("body"));
    }

    #[test]
    fn headings_and_paragraphs() {
        let html = "<h1>Title</h1><p>Body text</p><h2>Section</h2>";
        assert_eq!(convert(html), "# Title\n\nBody text\n\n## Section");
    }

    #[test]
    fn unordered_list() {
        let html = "<p>Shopping:</p><ul><li>apples</li><li>pears</li></ul>";
        assert_eq!(convert(html), "Shopping:\n* apples\n* pears");
    }

    #[test]
    fn ordered_list_numbers_monotonically() {
        let html = "<ol><li>first</li><li>second</li><li>third</li></ol>";
        assert_eq!(convert(html), "1. first\n2. second\n3. third");
    }

    #[test]
    fn italic_and_inline_code() {
        let html = "<p>run <code>ls</code> <em>now</em></p>";
        assert_eq!(convert(html), "run `ls` *now*");
    }

    #[test]
    fn nbsp_and_double_spaces_collapse() {
        let html = "<p>a&nbsp;&nbsp;b    c</p>";
        assert_eq!(convert(html), "a b c");
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert_eq!(convert(""), "");
        assert_eq!(remove("", &[".anything"]), "");
    }
}
