//! Caption chunk parsing.
//!
//! A chunk is one blank-line-delimited block of a caption file (or one
//! line of an LRC file). Chunks either carry WebVTT directives
//! (`DEFAULTS`, `STYLE`, `COMMENT`) that update the running parse state,
//! or resolve to a single [`Cue`].

use crate::{
    Cue, CueSettings, CueText, ParseOptions,
    parser::CaptionFormat,
    timestamp, tokenizer,
};
use log::debug;
use regex::Regex;
use std::sync::LazyLock;

static DEFAULTS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:DEFAULTS|DEFAULT)\s+-->\s+(.*)").unwrap());

static STYLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^(?:STYLES|STYLE)\s+-->\s*\n(.*)$").unwrap());

static COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:COMMENTS|COMMENT)\s+-->").unwrap());

// A bare alphanumeric/hyphen token standing alone on the first line is a
// cue id.
static ID_LINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^\s*[a-z0-9-]+\s*$").unwrap());

/// Parse state carried across the chunks of one file.
pub(crate) struct ChunkContext {
    pub(crate) format: CaptionFormat,
    pub(crate) cue_defaults: Vec<String>,
    pub(crate) cue_styles: String,
}

impl ChunkContext {
    pub(crate) fn new(format: CaptionFormat) -> Self {
        Self {
            format,
            cue_defaults: Vec::new(),
            cue_styles: String::new(),
        }
    }
}

/// Convert one chunk of caption text into a cue.
///
/// Directive chunks update `ctx` and yield no cue. A chunk without any
/// recognizable timestamp line is silently dropped, one bad chunk never
/// aborts the rest of the file.
pub(crate) fn parse_caption_chunk(
    chunk: &str,
    ordinal: usize,
    ctx: &mut ChunkContext,
    options: &ParseOptions,
) -> Option<Cue> {
    if let Some(caps) = DEFAULTS.captures(chunk) {
        // A later DEFAULTS block supersedes the previous one.
        ctx.cue_defaults = caps[1].split_whitespace().map(str::to_owned).collect();
        return None;
    }

    if let Some(caps) = STYLE.captures(chunk) {
        ctx.cue_styles.push_str(&caps[1]);
        return None;
    }

    if COMMENT.is_match(chunk) {
        return None;
    }

    // LRC lines split at the closing bracket of the time marker, every
    // other format is line-based.
    let mut lines: Vec<&str> = if ctx.format == CaptionFormat::Lrc {
        match chunk.find(']') {
            Some(index) => vec![&chunk[..=index], &chunk[index + 1..]],
            None => vec![chunk],
        }
    } else {
        chunk.split('\n').collect()
    };

    while lines.first().is_some_and(|line| line.trim().is_empty()) {
        lines.remove(0);
    }

    if lines.is_empty() {
        return None;
    }

    let id = if ID_LINE.is_match(lines[0]) {
        lines.remove(0).trim().to_owned()
    } else {
        // Not a format with per-cue identifiers, the chunk's position
        // becomes the id.
        ordinal.to_string()
    };

    // The first line carrying a timestamp is consumed; everything left
    // over is the payload.
    let mut span = None;

    for index in 0..lines.len() {
        if let Some(timing) = timestamp::parse_cue_timing(lines[index]) {
            lines.remove(index);
            span = Some(timing);
            break;
        }
    }

    let Some(span) = span else {
        debug!("dropping chunk without time information: {chunk:?}");
        return None;
    };

    let settings = CueSettings::from_pairs(&merge_settings(&ctx.cue_defaults, &span.settings));
    let payload = lines.join("\n");

    let text = if options.process_cue_html {
        CueText::Structured(tokenizer::tokenize(&payload, options))
    } else {
        CueText::Raw(payload)
    };

    let mut cue = Cue::new(id, span.start, span.end, text, settings);
    cue.set_style_data(&ctx.cue_styles);
    Some(cue)
}

// Per-cue settings override same-key file-level defaults; default-only
// keys keep their position.
fn merge_settings(defaults: &[String], cue_settings: &str) -> Vec<(String, String)> {
    let mut pairs: Vec<(String, String)> = defaults
        .iter()
        .filter_map(|item| item.split_once(':'))
        .map(|(key, value)| (key.to_owned(), value.to_owned()))
        .collect();

    for item in cue_settings.split_whitespace() {
        let Some((key, value)) = item.split_once(':') else {
            continue;
        };

        match pairs.iter_mut().find(|(existing, _)| existing.as_str() == key) {
            Some(pair) => pair.1 = value.to_owned(),
            None => pairs.push((key.to_owned(), value.to_owned())),
        }
    }

    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Alignment;

    fn ctx() -> ChunkContext {
        ChunkContext::new(CaptionFormat::Unknown)
    }

    fn options() -> ParseOptions {
        ParseOptions::default()
    }

    #[test]
    fn explicit_id_is_consumed_from_the_chunk() {
        let cue =
            parse_caption_chunk("1\n00:00:01,000 --> 00:00:04,000\nHello", 7, &mut ctx(), &options())
                .unwrap();
        assert_eq!(cue.id(), "1");
        assert_eq!(cue.start_time(), 1.0);
        assert_eq!(cue.end_time(), 4.0);
        assert_eq!(cue.render(None), "Hello");
    }

    #[test]
    fn ordinal_id_when_no_identifier_line() {
        let cue =
            parse_caption_chunk("00:00:01.000 --> 00:00:02.000\nHi", 7, &mut ctx(), &options())
                .unwrap();
        assert_eq!(cue.id(), "7");
    }

    #[test]
    fn leading_blank_lines_are_stripped() {
        let cue = parse_caption_chunk(
            "\n  \nid-a\n00:00:01.000 --> 00:00:02.000\nHi",
            0,
            &mut ctx(),
            &options(),
        )
        .unwrap();
        assert_eq!(cue.id(), "id-a");
    }

    #[test]
    fn chunk_without_timestamp_is_dropped() {
        assert!(parse_caption_chunk("no timing here\njust text", 0, &mut ctx(), &options()).is_none());
    }

    #[test]
    fn defaults_directive_applies_to_later_cues() {
        let mut ctx = ctx();

        assert!(parse_caption_chunk("DEFAULTS --> A:start S:40", 0, &mut ctx, &options()).is_none());
        assert_eq!(ctx.cue_defaults, ["A:start", "S:40"]);

        let cue = parse_caption_chunk("00:00:01.000 --> 00:00:02.000\nHi", 1, &mut ctx, &options())
            .unwrap();
        assert_eq!(cue.settings().alignment, Alignment::Start);
        assert_eq!(cue.settings().size, 40.0);
        assert_eq!(cue.settings().as_str(), "A:start S:40");
    }

    #[test]
    fn cue_settings_override_defaults_per_key() {
        let mut ctx = ctx();
        assert!(parse_caption_chunk("DEFAULT --> A:start", 0, &mut ctx, &options()).is_none());

        let cue = parse_caption_chunk(
            "00:00:01.000 --> 00:00:02.000 A:end T:10\nHi",
            1,
            &mut ctx,
            &options(),
        )
        .unwrap();
        assert_eq!(cue.settings().alignment, Alignment::End);
        assert_eq!(cue.settings().text_position, 10.0);
        assert_eq!(cue.settings().as_str(), "A:end T:10");
    }

    #[test]
    fn style_directive_attaches_to_later_cues() {
        let mut ctx = ctx();

        assert!(
            parse_caption_chunk("STYLE -->\n::cue { color: gold }", 0, &mut ctx, &options())
                .is_none()
        );

        let cue = parse_caption_chunk("00:00:01.000 --> 00:00:02.000\nHi", 1, &mut ctx, &options())
            .unwrap();
        assert_eq!(cue.style_data(), "::cue { color: gold }");
    }

    #[test]
    fn comment_directive_is_discarded() {
        let mut ctx = ctx();
        assert!(
            parse_caption_chunk("COMMENT --> not worth keeping", 0, &mut ctx, &options()).is_none()
        );
        assert!(ctx.cue_defaults.is_empty());
        assert!(ctx.cue_styles.is_empty());
    }

    #[test]
    fn raw_payload_when_processing_is_disabled() {
        let cue = parse_caption_chunk(
            "00:00:01.000 --> 00:00:02.000\n<b>kept</b>",
            0,
            &mut ctx(),
            &ParseOptions {
                process_cue_html: false,
                ..ParseOptions::default()
            },
        )
        .unwrap();
        assert!(matches!(cue.text(), CueText::Raw(_)));
        assert_eq!(cue.render(Some(99.0)), "<b>kept</b>");
    }

    #[test]
    fn lrc_chunk_splits_at_time_marker() {
        let mut ctx = ChunkContext::new(CaptionFormat::Lrc);
        let cue = parse_caption_chunk("[00:12.00]Some lyric", 3, &mut ctx, &options()).unwrap();
        assert_eq!(cue.id(), "3");
        assert_eq!(cue.start_time(), 12.0);
        assert_eq!(cue.end_time(), 12.0);
        assert_eq!(cue.render(None), "Some lyric");
    }
}
