//! Whole-file caption parsing: format sniffing and chunk dispatch.

use crate::{
    Cue, Error, ParseOptions, Result,
    chunk::{self, ChunkContext},
    timestamp,
};
use regex::Regex;
use std::sync::LazyLock;

static TTML_CHECK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<tt\s+xml").unwrap());

static WEBVTT_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^WEBVTT(\s*FILE)?").unwrap());

static CHUNK_SPLIT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n\n+").unwrap());
static LINE_SPLIT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n+").unwrap());

/// Detected caption file format. The classification is terminal, decided
/// once per file, and only changes how the file is chunked and
/// post-processed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CaptionFormat {
    Lrc,
    Ttml,
    /// Line-based formats without a distinguishing signature (SRT, SUB,
    /// SBV, Google).
    #[default]
    Unknown,
    WebVtt,
}

impl std::fmt::Display for CaptionFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Lrc => "lrc",
            Self::Ttml => "ttml",
            Self::Unknown => "unknown",
            Self::WebVtt => "webvtt",
        })
    }
}

/// Sniff the whole-file format without parsing it.
pub fn sniff_format(data: &str) -> CaptionFormat {
    if TTML_CHECK.is_match(data) {
        CaptionFormat::Ttml
    } else if data.lines().any(timestamp::is_lrc_line) {
        CaptionFormat::Lrc
    } else if WEBVTT_HEADER.is_match(data.trim_start()) {
        CaptionFormat::WebVtt
    } else {
        CaptionFormat::Unknown
    }
}

/// Parse an entire caption file into cues.
///
/// This is the sole entry point of the parsing core; fetching the text is
/// the caller's concern. Malformed chunks are dropped without aborting
/// the rest of the file, but missing input is a caller error.
pub fn parse_captions(data: &str, options: &ParseOptions) -> Result<Vec<Cue>> {
    if data.is_empty() {
        return Err(Error::new_invalid_input(
            "required caption data was not supplied",
        ));
    }

    let normalized = data.replace("\r\n", "\n").replace('\r', "\n");

    if TTML_CHECK.is_match(&normalized) {
        #[cfg(feature = "ttml")]
        return crate::ttml::parse_document(&normalized, options);

        #[cfg(not(feature = "ttml"))]
        return Err(Error::new(
            "ttml input requires the `ttml` feature to be enabled",
        ));
    }

    // LRC files carry one cue per line, everything else is split on runs
    // of blank lines.
    let format = if normalized.lines().any(timestamp::is_lrc_line) {
        CaptionFormat::Lrc
    } else {
        CaptionFormat::Unknown
    };

    let chunks = if format == CaptionFormat::Lrc {
        LINE_SPLIT.split(&normalized)
    } else {
        CHUNK_SPLIT.split(&normalized)
    };

    let mut ctx = ChunkContext::new(format);
    let mut cues = Vec::new();
    let mut ordinal = 0;

    for chunk_text in chunks {
        if WEBVTT_HEADER.is_match(chunk_text) {
            ctx.format = CaptionFormat::WebVtt;
            continue;
        }

        if chunk_text.trim().is_empty() {
            continue;
        }

        let cue = chunk::parse_caption_chunk(chunk_text, ordinal, &mut ctx, options);
        ordinal += 1;

        if let Some(cue) = cue {
            cues.push(cue);
        }
    }

    if format == CaptionFormat::Lrc {
        // LRC end times are implicit: each cue ends where the next one
        // begins. Blank cues are stripped afterwards so they never
        // surface, but they still donate their start time first.
        for index in 1..cues.len() {
            let start = cues[index].start_time();

            if cues[index - 1].end_time() < start {
                cues[index - 1].set_end_time(start);
            }
        }

        cues.retain(|cue| !cue.render(None).trim().is_empty());
    }

    Ok(cues)
}
