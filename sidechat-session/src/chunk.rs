//! Paragraph-safe content chunking and file-transfer envelopes.
//!
//! Large content is split on line boundaries so no part ever breaks inside a
//! paragraph, then each part is wrapped in a plain-text envelope that tells
//! the model what it is receiving and asks for a short acknowledgement, which
//! keeps the reply small between parts.

/// Split `content` into parts of at most `max_chars` characters, breaking
/// only at line boundaries.
///
/// A single line longer than the bound becomes its own oversized part rather
/// than being cut mid-paragraph.
pub fn split_into_parts(content: &str, max_chars: usize) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();

    for line in content.split('\n') {
        let added = if current.is_empty() {
            line.len()
        } else {
            line.len() + 1
        };
        if !current.is_empty() && current.len() + added > max_chars {
            parts.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push('\n');
        }
        current.push_str(line);
    }

    if !current.is_empty() {
        parts.push(current);
    }
    parts
}

/// Wrap chunked file content in its transfer envelopes.
///
/// One part uses the `BEGIN FILE` form; several parts get numbered
/// `BEGIN PART k of N` envelopes so the receiving model can reassemble them.
pub fn envelope_parts(parts: &[String], name: &str) -> Vec<String> {
    match parts {
        [] => vec![format!(
            "BEGIN FILE: {name}\n\nEND FILE\nAcknowledge receipt of file only."
        )],
        [single] => vec![format!(
            "BEGIN FILE: {name}\n{single}\nEND FILE\nAcknowledge receipt of file only."
        )],
        many => {
            let total = many.len();
            many.iter()
                .enumerate()
                .map(|(idx, part)| {
                    let number = idx + 1;
                    format!(
                        "BEGIN PART {number} of {total} FILE: ({name})\n{part}\n\
                         END PART {number}\nAcknowledge receipt of Part {number}."
                    )
                })
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn short_content_stays_in_one_part() {
        let parts = split_into_parts("alpha\nbeta", 100);
        assert_eq!(parts, vec!["alpha\nbeta".to_string()]);
    }

    #[test]
    fn splits_only_at_line_boundaries() {
        let parts = split_into_parts("aaaa\nbbbb\ncccc", 9);
        assert_eq!(parts, vec!["aaaa\nbbbb".to_string(), "cccc".to_string()]);
    }

    #[test]
    fn an_oversized_line_becomes_its_own_part() {
        let long = "x".repeat(50);
        let parts = split_into_parts(&format!("short\n{long}\ntail"), 10);
        assert_eq!(parts, vec!["short".to_string(), long, "tail".to_string()]);
    }

    #[test]
    fn single_part_gets_the_file_envelope() {
        let messages = envelope_parts(&["line one\nline two".to_string()], "notes.txt");
        assert_eq!(messages.len(), 1);
        assert!(messages[0].starts_with("BEGIN FILE: notes.txt\n"));
        assert!(messages[0].contains("line one\nline two"));
        assert!(messages[0].contains("END FILE"));
        assert!(messages[0].ends_with("Acknowledge receipt of file only."));
    }

    #[test]
    fn multiple_parts_get_numbered_envelopes() {
        let parts = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let messages = envelope_parts(&parts, "notes.txt");
        assert_eq!(messages.len(), 3);
        for (idx, message) in messages.iter().enumerate() {
            let number = idx + 1;
            assert!(message.starts_with(&format!("BEGIN PART {number} of 3 FILE: (notes.txt)\n")));
            assert!(message.contains(&format!("END PART {number}")));
            assert!(message.ends_with(&format!("Acknowledge receipt of Part {number}.")));
        }
    }
}
