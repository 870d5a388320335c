//! Pure selector logic over DOM snapshots.
//!
//! Everything here is a deterministic function of an HTML string, which keeps
//! the brittle part of each adapter — the selector choreography — testable
//! against fixture markup without a live browser. Lookup failures degrade to
//! empty results; a turn whose HTML conversion blows up yields a visible
//! placeholder answer instead of aborting the pass.

use scraper::{ElementRef, Html, Selector};
use sidechat_common::{ChatMessage, ERROR_ANSWER_PLACEHOLDER};
use tracing::warn;

use crate::profile::{SiteProfile, TurnLayout};

fn parse_selector(raw: &str) -> Option<Selector> {
    match Selector::parse(raw) {
        Ok(sel) => Some(sel),
        Err(err) => {
            warn!(selector = raw, %err, "unparseable selector");
            None
        }
    }
}

/// Number of elements matching `selector` in the snapshot.
pub fn count(html: &str, selector: &str) -> usize {
    let Some(sel) = parse_selector(selector) else {
        return 0;
    };
    Html::parse_document(html).select(&sel).count()
}

/// Whether any element matches `selector` in the snapshot.
pub fn exists(html: &str, selector: &str) -> bool {
    count(html, selector) > 0
}

/// Whether the **last** element matching `container` contains a match for
/// `inner`. `None` when no container matches at all.
pub fn last_container_has(html: &str, container: &str, inner: &str) -> Option<bool> {
    let container_sel = parse_selector(container)?;
    let inner_sel = parse_selector(inner)?;
    let doc = Html::parse_document(html);
    let last = doc.select(&container_sel).last()?;
    Some(last.select(&inner_sel).next().is_some())
}

/// Number of conversation-turn containers in the snapshot.
pub fn turn_count(html: &str, profile: &SiteProfile) -> usize {
    count(html, profile.container)
}

/// Extract every complete conversation turn, in document order.
///
/// Containers that are not a complete turn are skipped, not reported as
/// failures.
pub fn collect_turns(html: &str, profile: &SiteProfile) -> Vec<ChatMessage> {
    let doc = Html::parse_document(html);
    match profile.layout {
        TurnLayout::Nested => nested_turns(&doc, profile),
        TurnLayout::Paired => paired_turns(&doc, profile),
        TurnLayout::Sibling => sibling_turns(&doc, profile),
    }
}

fn nested_turns(doc: &Html, profile: &SiteProfile) -> Vec<ChatMessage> {
    let Some(container_sel) = parse_selector(profile.container) else {
        return Vec::new();
    };
    let Some(user_sel) = parse_selector(profile.user_message) else {
        return Vec::new();
    };
    let Some(answer_sel) = parse_selector(profile.assistant_message) else {
        return Vec::new();
    };

    doc.select(&container_sel)
        .filter_map(|container| {
            let question = container.select(&user_sel).next()?;
            let answer = container.select(&answer_sel).next()?;
            Some(ChatMessage {
                question: question_text(question, profile),
                answer: convert_answer(&answer.inner_html(), profile.strip),
            })
        })
        .collect()
}

fn paired_turns(doc: &Html, profile: &SiteProfile) -> Vec<ChatMessage> {
    let Some(user_sel) = parse_selector(profile.user_message) else {
        return Vec::new();
    };
    let Some(answer_sel) = parse_selector(profile.assistant_message) else {
        return Vec::new();
    };

    let questions: Vec<ElementRef> = doc.select(&user_sel).collect();
    let answers: Vec<ElementRef> = doc.select(&answer_sel).collect();

    questions
        .into_iter()
        .zip(answers)
        .map(|(question, answer)| ChatMessage {
            question: question_text(question, profile),
            answer: convert_answer(&answer.inner_html(), profile.strip),
        })
        .collect()
}

fn sibling_turns(doc: &Html, profile: &SiteProfile) -> Vec<ChatMessage> {
    let Some(container_sel) = parse_selector(profile.container) else {
        return Vec::new();
    };
    let Some(user_sel) = parse_selector(profile.user_message) else {
        return Vec::new();
    };
    let rows_raw = profile.all_rows.unwrap_or(profile.container);
    let Some(rows_sel) = parse_selector(rows_raw) else {
        return Vec::new();
    };

    let rows: Vec<ElementRef> = doc.select(&rows_sel).collect();

    doc.select(&container_sel)
        .map(|container| {
            let question = rows
                .iter()
                .position(|row| row.id() == container.id())
                .filter(|&idx| idx > 0)
                .and_then(|idx| rows[idx - 1].select(&user_sel).next())
                .map(|el| collapse_text(el))
                .unwrap_or_else(|| "Unable to retrieve question".to_string());
            ChatMessage {
                question,
                answer: convert_answer(&container.inner_html(), profile.strip),
            }
        })
        .collect()
}

fn question_text(el: ElementRef, profile: &SiteProfile) -> String {
    if profile.convert_question {
        convert_answer(&el.inner_html(), profile.strip)
    } else {
        collapse_text(el)
    }
}

fn collapse_text(el: ElementRef) -> String {
    el.text().collect::<String>().trim().to_string()
}

/// Strip decoration, then convert to Markdown. A panic inside the conversion
/// pipeline is caught and replaced with a visible placeholder so one bad turn
/// cannot abort a whole transcription pass.
fn convert_answer(raw_html: &str, strip: &[&str]) -> String {
    let raw_html = raw_html.trim();
    std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        sidechat_markdown::convert(&sidechat_markdown::remove(raw_html, strip))
    }))
    .unwrap_or_else(|_| {
        warn!("HTML conversion panicked; substituting placeholder answer");
        ERROR_ANSWER_PLACEHOLDER.to_string()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn count_and_exists_on_snapshot() {
        let html = r#"<div class="turn"></div><div class="turn"></div>"#;
        assert_eq!(count(html, ".turn"), 2);
        assert!(exists(html, ".turn"));
        assert!(!exists(html, ".missing"));
        assert_eq!(count(html, "<<bad>>"), 0);
    }

    #[test]
    fn last_container_inspection() {
        let html = r#"
            <div class="turn"><span class="busy"></span></div>
            <div class="turn"></div>
        "#;
        assert_eq!(last_container_has(html, ".turn", ".busy"), Some(false));
        assert_eq!(last_container_has(html, ".absent", ".busy"), None);
    }
}
