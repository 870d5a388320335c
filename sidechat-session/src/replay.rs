//! Prompt-replay parsing and transcript formatting.
//!
//! A prompt file is a plain-text document with separator lines (default
//! `NEXT_PROMPT`) between prompts; text on the separator line after the
//! separator itself becomes the prompt's title. The inverse direction renders
//! extracted turns back into that format, in one of three modes.

use sidechat_common::{BatchItem, ChatMessage};

/// Which side of each turn a rendered transcript carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranscriptMode {
    /// Answers only, the default.
    ResponsesOnly,
    /// Questions only, rendered as a replayable prompt file.
    PromptsOnly,
    /// Questions and answers, separated by a `RESPONSE` line.
    Both,
}

/// Split a prompt file into batch items on `separator` lines.
///
/// Content before the first separator is itself one prompt (a file with no
/// separator at all is a single prompt). Blank prompts are dropped.
pub fn parse_prompts(content: &str, separator: &str) -> Vec<BatchItem> {
    let lines: Vec<&str> = content.split('\n').collect();
    let mut items = Vec::new();

    let Some(first_separator) = lines.iter().position(|line| line.contains(separator)) else {
        push_item(&mut items, "", content);
        return items;
    };

    if first_separator > 0 {
        push_item(&mut items, "", &lines[..first_separator].join("\n"));
    }

    let mut title = "";
    let mut body: Vec<&str> = Vec::new();
    for line in &lines[first_separator..] {
        if line.contains(separator) {
            push_item(&mut items, title, &body.join("\n"));
            body.clear();
            title = line
                .split_once(separator)
                .map(|(_, rest)| rest.trim())
                .unwrap_or("");
        } else {
            body.push(line);
        }
    }
    push_item(&mut items, title, &body.join("\n"));

    items
}

fn push_item(items: &mut Vec<BatchItem>, title: &str, body: &str) {
    let description = body.trim();
    if description.is_empty() {
        return;
    }
    items.push(BatchItem {
        title: title.to_string(),
        description: description.to_string(),
    });
}

/// Render extracted turns in the requested mode.
///
/// `PromptsOnly` and `Both` emit separator lines so their output can be fed
/// back through [`parse_prompts`].
pub fn format_transcript(
    messages: &[ChatMessage],
    mode: TranscriptMode,
    separator: &str,
) -> String {
    match mode {
        TranscriptMode::ResponsesOnly => messages
            .iter()
            .map(|message| format!("{}\n\n", message.answer))
            .collect(),
        TranscriptMode::PromptsOnly => messages
            .iter()
            .map(|message| format!("{separator}\n\n{}", message.question))
            .collect::<Vec<_>>()
            .join("\n\n"),
        TranscriptMode::Both => messages
            .iter()
            .map(|message| {
                format!(
                    "{separator}\n\n{}\n\nRESPONSE\n\n{}",
                    message.question, message.answer
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SEP: &str = "NEXT_PROMPT";

    #[test]
    fn a_file_without_separators_is_one_prompt() {
        let items = parse_prompts("just one prompt\nwith two lines\n", SEP);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "");
        assert_eq!(items[0].description, "just one prompt\nwith two lines");
    }

    #[test]
    fn content_before_the_first_separator_is_a_prompt() {
        let content = "leading prompt\nNEXT_PROMPT\nsecond prompt";
        let items = parse_prompts(content, SEP);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].description, "leading prompt");
        assert_eq!(items[1].description, "second prompt");
    }

    #[test]
    fn separator_lines_carry_titles() {
        let content = "NEXT_PROMPT intro\nfirst body\nNEXT_PROMPT followup\nsecond body";
        let items = parse_prompts(content, SEP);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].title, "intro");
        assert_eq!(items[0].description, "first body");
        assert_eq!(items[1].title, "followup");
        assert_eq!(items[1].description, "second body");
    }

    #[test]
    fn blank_prompts_are_dropped() {
        let content = "NEXT_PROMPT\n\nNEXT_PROMPT\nreal prompt";
        let items = parse_prompts(content, SEP);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].description, "real prompt");
    }

    #[test]
    fn an_empty_file_yields_nothing() {
        assert!(parse_prompts("", SEP).is_empty());
        assert!(parse_prompts("\n\n", SEP).is_empty());
    }

    fn sample_messages() -> Vec<ChatMessage> {
        vec![
            ChatMessage {
                question: "one?".to_string(),
                answer: "first".to_string(),
            },
            ChatMessage {
                question: "two?".to_string(),
                answer: "second".to_string(),
            },
        ]
    }

    #[test]
    fn responses_only_concatenates_answers() {
        let text = format_transcript(&sample_messages(), TranscriptMode::ResponsesOnly, SEP);
        assert_eq!(text, "first\n\nsecond\n\n");
    }

    #[test]
    fn prompts_only_round_trips_through_the_parser() {
        let text = format_transcript(&sample_messages(), TranscriptMode::PromptsOnly, SEP);
        let items = parse_prompts(&text, SEP);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].description, "one?");
        assert_eq!(items[1].description, "two?");
    }

    #[test]
    fn both_mode_interleaves_responses() {
        let text = format_transcript(&sample_messages(), TranscriptMode::Both, SEP);
        assert_eq!(
            text,
            "NEXT_PROMPT\n\none?\n\nRESPONSE\n\nfirst\n\n\
             NEXT_PROMPT\n\ntwo?\n\nRESPONSE\n\nsecond"
        );
    }
}
