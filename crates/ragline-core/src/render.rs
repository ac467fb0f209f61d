//! Answer segmentation for display.
//!
//! Backend answers are markdown with fenced code blocks. Presentation
//! layers render prose and code very differently (syntax highlighting,
//! copy buttons), so this module splits an answer into a typed sequence of
//! segments instead of handing rendering callbacks a raw string. The parse
//! is standalone: the display layer consumes the sequence, it does not
//! drive the parse.

use once_cell::sync::Lazy;
use regex::Regex;

/// Language tag assigned to fenced blocks that do not carry one.
pub const DEFAULT_LANGUAGE: &str = "plain";

/// Opening fence: three backticks, an optional language tag, nothing else.
static FENCE_OPEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^```(\w+)?\s*$").expect("fence pattern is valid"));

/// One displayable piece of an answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// A run of markdown prose. Inline code spans stay inside the prose;
    /// they are an inline style, not a block.
    Prose(String),
    /// A fenced code block with its verbatim (case-sensitive) language tag.
    CodeBlock { language: String, code: String },
}

/// Splits an answer into an ordered sequence of prose and code segments.
///
/// Stateless and referentially transparent: the same input always yields
/// structurally equal output. Exactly one trailing newline is stripped
/// from each code block body; an unterminated fence runs to the end of
/// the input and still yields a code block.
///
/// ```
/// use ragline_core::render::{render, Segment};
///
/// let fence = "`".repeat(3);
/// let text = format!("Intro\n{fence}rust\nfn main() {{}}\n{fence}");
/// let segments = render(&text);
/// assert_eq!(segments.len(), 2);
/// assert!(matches!(&segments[1], Segment::CodeBlock { language, .. } if language == "rust"));
/// ```
pub fn render(text: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut prose: Vec<&str> = Vec::new();
    // (language, accumulated body) while inside a fence
    let mut open_block: Option<(String, String)> = None;

    for line in text.lines() {
        if let Some((language, mut body)) = open_block.take() {
            if line.trim_end() == "```" {
                segments.push(close_block(language, body));
            } else {
                body.push_str(line);
                body.push('\n');
                open_block = Some((language, body));
            }
        } else if let Some(caps) = FENCE_OPEN.captures(line) {
            flush_prose(&mut segments, &mut prose);
            let language = caps
                .get(1)
                .map(|tag| tag.as_str())
                .filter(|tag| !tag.is_empty())
                .unwrap_or(DEFAULT_LANGUAGE)
                .to_string();
            open_block = Some((language, String::new()));
        } else {
            prose.push(line);
        }
    }

    if let Some((language, body)) = open_block {
        segments.push(close_block(language, body));
    }
    flush_prose(&mut segments, &mut prose);

    segments
}

fn close_block(language: String, body: String) -> Segment {
    // Exactly one trailing newline is stripped; further ones stay.
    let code = match body.strip_suffix('\n') {
        Some(trimmed) => trimmed.to_string(),
        None => body,
    };
    Segment::CodeBlock { language, code }
}

fn flush_prose(segments: &mut Vec<Segment>, prose: &mut Vec<&str>) {
    if prose.iter().all(|line| line.trim().is_empty()) {
        prose.clear();
        return;
    }
    segments.push(Segment::Prose(prose.join("\n")));
    prose.clear();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fenced(tag: &str, body: &str) -> String {
        format!("```{}\n{}```", tag, body)
    }

    #[test]
    fn plain_text_is_one_prose_segment() {
        let segments = render("Just an answer with `inline code` in it.");
        assert_eq!(
            segments,
            vec![Segment::Prose(
                "Just an answer with `inline code` in it.".to_string()
            )]
        );
    }

    #[test]
    fn empty_input_yields_no_segments() {
        assert!(render("").is_empty());
        assert!(render("   \n\n").is_empty());
    }

    #[test]
    fn language_tag_recovered_verbatim() {
        let segments = render(&fenced("python", "print(1)\n"));
        assert_eq!(
            segments,
            vec![Segment::CodeBlock {
                language: "python".to_string(),
                code: "print(1)".to_string(),
            }]
        );
    }

    #[test]
    fn language_tag_is_case_sensitive() {
        let segments = render(&fenced("Python", "x = 1\n"));
        match &segments[0] {
            Segment::CodeBlock { language, .. } => assert_eq!(language, "Python"),
            other => panic!("expected code block, got {:?}", other),
        }
    }

    #[test]
    fn missing_tag_defaults_to_plain() {
        let segments = render(&fenced("", "hello\n"));
        assert_eq!(
            segments,
            vec![Segment::CodeBlock {
                language: DEFAULT_LANGUAGE.to_string(),
                code: "hello".to_string(),
            }]
        );
    }

    #[test]
    fn exactly_one_trailing_newline_is_stripped() {
        // Body "print(1)\n\n" keeps one newline after the trim.
        let segments = render(&fenced("python", "print(1)\n\n"));
        assert_eq!(
            segments,
            vec![Segment::CodeBlock {
                language: "python".to_string(),
                code: "print(1)\n".to_string(),
            }]
        );
    }

    #[test]
    fn prose_and_blocks_interleave_in_order() {
        let text = "Before\n```rust\nfn main() {}\n```\nAfter";
        let segments = render(text);
        assert_eq!(
            segments,
            vec![
                Segment::Prose("Before".to_string()),
                Segment::CodeBlock {
                    language: "rust".to_string(),
                    code: "fn main() {}".to_string(),
                },
                Segment::Prose("After".to_string()),
            ]
        );
    }

    #[test]
    fn unterminated_fence_runs_to_end_of_input() {
        let segments = render("```sql\nSELECT 1;");
        assert_eq!(
            segments,
            vec![Segment::CodeBlock {
                language: "sql".to_string(),
                code: "SELECT 1;".to_string(),
            }]
        );
    }

    #[test]
    fn render_is_restartable() {
        let text = "Text\n```js\nconsole.log(1)\n\n```\nMore *markdown*.";
        assert_eq!(render(text), render(text));
    }

    #[test]
    fn indented_backticks_stay_in_prose() {
        let segments = render("  ```not a fence");
        assert_eq!(
            segments,
            vec![Segment::Prose("  ```not a fence".to_string())]
        );
    }
}
