//! Cue markup tokenizer.
//!
//! Splits a cue payload into tag/text runs and builds the nested
//! [`CueStructure`] tree, validating opening tags against the WebVTT
//! allow-list when sanitization is on.

use crate::{
    ParseOptions,
    structure::{CueNode, CueSpan, CueStructure},
    timestamp,
};
use regex::Regex;
use std::sync::LazyLock;

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"</?[^>]+>").unwrap());
static NEWLINES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n+").unwrap());

static VOICE_OPEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^<v\s+[^>]+>").unwrap());
static VOICE_NAME: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^<v\s*([^>]+)>").unwrap());
static CLASS_OPEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^<c[a-z0-9_.-]+>").unwrap());
static SIMPLE_OPEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^<(b|i|u|ruby|rt)>").unwrap());

/// Outcome of applying one closing tag to the open-tag stack. A close
/// that matches nothing is a representable, tolerated condition rather
/// than an implicit no-op.
enum CloseOutcome {
    Matched,
    Unmatched,
}

/// Tokenize a cue payload into a nested, time-annotated structure.
pub(crate) fn tokenize(payload: &str, options: &ParseOptions) -> CueStructure {
    let mut root: Vec<CueNode> = Vec::new();
    let mut stack: Vec<CueSpan> = Vec::new();
    let mut time_dependent = false;
    let mut mismatched_closes = 0;

    let mut cursor = 0;

    for tag in TAG.find_iter(payload) {
        if tag.start() > cursor {
            push_text(&mut root, &mut stack, &payload[cursor..tag.start()], options);
        }
        cursor = tag.end();

        if tag.as_str().starts_with("</") {
            match close_span(&mut root, &mut stack, tag.as_str()) {
                CloseOutcome::Matched => (),
                CloseOutcome::Unmatched => {
                    mismatched_closes += 1;
                    log::debug!("ignoring mismatched closing tag {}", tag.as_str());
                }
            }
        } else {
            open_span(&mut stack, tag.as_str(), options, &mut time_dependent);
        }
    }

    if cursor < payload.len() {
        push_text(&mut root, &mut stack, &payload[cursor..], options);
    }

    // Unclosed tags keep their children, fold whatever is still open back
    // into the tree.
    while let Some(span) = stack.pop() {
        attach(&mut root, &mut stack, CueNode::Span(span));
    }

    CueStructure::new(payload, root, time_dependent, mismatched_closes)
}

fn attach(root: &mut Vec<CueNode>, stack: &mut [CueSpan], node: CueNode) {
    match stack.last_mut() {
        Some(open) => open.children.push(node),
        None => root.push(node),
    }
}

fn push_text(root: &mut Vec<CueNode>, stack: &mut [CueSpan], text: &str, options: &ParseOptions) {
    let text = if options.sanitise_cue_html {
        let escaped = text
            .replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;");

        if options.ignore_whitespace {
            escaped
        } else {
            NEWLINES.replace_all(&escaped, "<br />").into_owned()
        }
    } else {
        text.to_owned()
    };

    attach(root, stack, CueNode::Text(text));
}

fn open_span(stack: &mut Vec<CueSpan>, tag: &str, options: &ParseOptions, time_dependent: &mut bool) {
    let name = name_of(tag);
    let inner = tag.trim_matches(|c| matches!(c, '<' | '>'));

    let mut span = CueSpan {
        raw_token: tag.to_owned(),
        ..Default::default()
    };

    if name == "v" && VOICE_OPEN.is_match(tag) {
        span.token = name;
        span.voice = VOICE_NAME.captures(tag).map(|caps| caps[1].to_owned());
    } else if name == "c" && CLASS_OPEN.is_match(tag) {
        span.token = name;
        span.classes = class_list(tag);
    } else if let Some(time_in) = timestamp::parse_inline(inner) {
        *time_dependent = true;
        span.token = inner.to_owned();
        span.time_in = Some(time_in);
    } else if SIMPLE_OPEN.is_match(tag) {
        span.token = name;
    } else if options.sanitise_cue_html {
        // Disallowed tag: dropped entirely, its contents still flow into
        // the nearest open context.
        return;
    } else {
        span.token = name;
    }

    stack.push(span);
}

fn close_span(root: &mut Vec<CueNode>, stack: &mut Vec<CueSpan>, tag: &str) -> CloseOutcome {
    let name = tag
        .trim_start_matches("</")
        .split(|c: char| c.is_whitespace() || c == '>')
        .next()
        .unwrap_or_default();

    // Scan the stack backwards for an open tag to close; a close that
    // matches nothing leaves the tree as-is.
    let Some(depth) = stack.iter().rposition(|open| open.token == name) else {
        return CloseOutcome::Unmatched;
    };

    while stack.len() > depth {
        let span = stack.pop().unwrap();
        attach(root, stack, CueNode::Span(span));
    }

    CloseOutcome::Matched
}

// First run of the tag text before any whitespace or dot, with the angle
// bracket and slash characters stripped. `<c.yellow>` names `c`, `<v Fred>`
// names `v`.
fn name_of(tag: &str) -> String {
    let stripped: String = tag
        .chars()
        .filter(|c| !matches!(c, '<' | '/' | '>'))
        .collect();

    stripped
        .split(|c: char| c.is_whitespace() || c == '.')
        .next()
        .unwrap_or_default()
        .to_owned()
}

// Dot-separated class list of a class tag, empty and non-alphanumeric
// segments filtered out.
fn class_list(tag: &str) -> Vec<String> {
    let stripped: String = tag
        .chars()
        .filter(|c| !matches!(c, '<' | '/' | '>') && !c.is_whitespace())
        .collect();

    stripped
        .split('.')
        .skip(1)
        .filter(|segment| segment.chars().any(|c| c.is_ascii_alphanumeric()))
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> ParseOptions {
        ParseOptions::default()
    }

    #[test]
    fn nested_simple_tags() {
        let structure = tokenize("Hello <b>World</b>", &options());
        assert!(!structure.is_time_dependent());
        assert_eq!(structure.mismatched_closes(), 0);
        assert_eq!(structure.to_html(None), "Hello <b>World</b>");
    }

    #[test]
    fn voice_tag_extracts_speaker() {
        let structure = tokenize("<v Fred>Hi there</v>", &options());
        assert_eq!(
            structure.to_html(None),
            "<q data-voice=\"Fred\" class=\"voice speaker-fred webvtt-span\" title=\"Fred\">Hi there</q>",
        );
    }

    #[test]
    fn class_tag_extracts_class_list() {
        let structure = tokenize("<c.yellow.bg_blue>text</c>", &options());
        assert_eq!(
            structure.to_html(None),
            "<span class=\"webvtt-span webvtt-class-span yellow bg_blue\">text</span>",
        );
    }

    #[test]
    fn class_tag_filters_empty_segments() {
        let structure = tokenize("<c.yellow..>text</c>", &options());
        assert_eq!(
            structure.to_html(None),
            "<span class=\"webvtt-span webvtt-class-span yellow\">text</span>",
        );
    }

    #[test]
    fn inline_timestamp_marks_structure_time_dependent() {
        let structure = tokenize("Never <00:00:02.000>gonna", &options());
        assert!(structure.is_time_dependent());
        assert_eq!(structure.to_html(Some(1.0)), "Never ");
        assert_eq!(
            structure.to_html(Some(2.0)),
            "Never <span class=\"webvtt-span webvtt-timestamp-span\" data-timestamp=\"00:00:02.000\" data-timestamp-seconds=\"2\">gonna</span>",
        );
    }

    #[test]
    fn mismatched_close_is_tolerated_and_counted() {
        let structure = tokenize("Hello</i> <b>there</b>", &options());
        assert_eq!(structure.mismatched_closes(), 1);
        assert_eq!(structure.to_html(None), "Hello <b>there</b>");
    }

    #[test]
    fn close_pops_intervening_unclosed_tags() {
        let structure = tokenize("<b><i>both</b> after", &options());
        // </b> closes both the dangling <i> and the <b>.
        assert_eq!(structure.to_html(None), "<b><i>both</i></b> after");
    }

    #[test]
    fn unclosed_tag_keeps_its_children() {
        let structure = tokenize("<b>bold to the end", &options());
        assert_eq!(structure.to_html(None), "<b>bold to the end</b>");
    }

    #[test]
    fn disallowed_tag_is_dropped_but_contents_flow() {
        let structure = tokenize("<script>alert</script> done", &options());
        assert_eq!(structure.mismatched_closes(), 1);
        assert_eq!(structure.to_html(None), "alert done");
    }

    #[test]
    fn disallowed_tag_passes_through_without_sanitization() {
        let structure = tokenize(
            "<blink>retro</blink>",
            &ParseOptions {
                sanitise_cue_html: false,
                ..ParseOptions::default()
            },
        );
        assert_eq!(structure.to_html(None), "<blink>retro</blink>");
    }

    #[test]
    fn text_runs_are_escaped() {
        let structure = tokenize("fish & chips < dinner", &options());
        assert_eq!(structure.to_html(None), "fish &amp; chips &lt; dinner");
    }

    #[test]
    fn newlines_become_breaks_unless_ignored() {
        let structure = tokenize("line one\nline two", &options());
        assert_eq!(structure.to_html(None), "line one<br />line two");

        let structure = tokenize(
            "line one\nline two",
            &ParseOptions {
                ignore_whitespace: true,
                ..ParseOptions::default()
            },
        );
        assert_eq!(structure.to_html(None), "line one\nline two");
    }
}
