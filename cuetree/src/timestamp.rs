//! Timestamp grammar for every supported caption format.

/*
    REFERENCES
    ----------

    1. https://www.w3.org/TR/webvtt1/#webvtt-timestamp
    2. https://www.matroska.org/technical/subtitles.html
    3. https://w3c.github.io/ttml2/#timing-value-timeExpression

*/

use regex::{Captures, Regex};
use std::sync::LazyLock;

// SRT does WebVTT timestamps as well.
static SRT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+)?:?(\d+):(\d+)[.,](\d+)\s+-->\s+(\d+)?:?(\d+):(\d+)[.,](\d+)\s*(.*)$")
        .unwrap()
});

// SUB (VOBSub) and YouTube SBV share the same timing shape.
static SUB_SBV: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+)?:?(\d+):(\d+)\.(\d+),(\d+)?:?(\d+):(\d+)\.(\d+)\s*(.*)$").unwrap()
});

// Google's proposed `start +duration` timestamp form.
static GOOGLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([\d.]+)\s+\+([\d.]+)\s*(.*)$").unwrap());

static LRC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[(\d+)?:?(\d+):(\d+)\.(\d{2,3})\]\s*(.*?)$").unwrap());

// A bare clock timestamp, as found inside karaoke-style cue markup.
static INLINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)?:?(\d+):(\d+)[.,](\d+)").unwrap());

static TTML_CLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)?:?(\d+):(\d+)\.(\d+)").unwrap());

// Decimal seconds, with the optional metric suffix TTML allows.
static TTML_OFFSET: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^([\d.]+)s?$").unwrap());

/// A parsed time range plus whatever trailed the timestamps on the line
/// (WebVTT cue settings, usually).
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct TimeSpan {
    pub(crate) start: f32,
    pub(crate) end: f32,
    pub(crate) settings: String,
}

/// Try every line-level timing format in fixed priority order.
pub(crate) fn parse_cue_timing(line: &str) -> Option<TimeSpan> {
    if let Some(caps) = SRT.captures(line).or_else(|| SUB_SBV.captures(line)) {
        return Some(TimeSpan {
            start: clock_seconds(&caps, 1),
            end: clock_seconds(&caps, 5),
            settings: caps.get(9).map_or_else(String::new, |m| m.as_str().to_owned()),
        });
    }

    if let Some(caps) = GOOGLE.captures(line) {
        let start = caps[1].parse::<f32>().ok()?;
        let duration = caps[2].parse::<f32>().ok()?;

        return Some(TimeSpan {
            start,
            end: start + duration,
            settings: caps.get(3).map_or_else(String::new, |m| m.as_str().to_owned()),
        });
    }

    if let Some(caps) = LRC.captures(line) {
        let start = clock_seconds(&caps, 1);

        // LRC carries no explicit duration, the dispatcher corrects the
        // end time from the next cue's start in a post-pass.
        return Some(TimeSpan {
            start,
            end: start,
            settings: String::new(),
        });
    }

    None
}

/// Whether a line looks like an LRC `[MM:SS.cc]` lyric line.
pub(crate) fn is_lrc_line(line: &str) -> bool {
    LRC.is_match(line)
}

/// Parse a bare clock timestamp found inside cue markup.
pub(crate) fn parse_inline(text: &str) -> Option<f32> {
    INLINE.captures(text).map(|caps| clock_seconds(&caps, 1))
}

/// Parse a TTML `begin`/`end` attribute, in either clock or
/// decimal-seconds form.
pub(crate) fn parse_ttml(value: &str) -> Option<f32> {
    if let Some(caps) = TTML_CLOCK.captures(value) {
        return Some(clock_seconds(&caps, 1));
    }

    if let Some(caps) = TTML_OFFSET.captures(value) {
        return caps[1].parse::<f32>().ok();
    }

    None
}

// Hours and minutes default to 0 when their capture group is absent, which
// covers both `MM:SS.fff` and `HH:MM:SS.fff`. The fraction is parsed by
// prefixing `0.`, so its digit count is deliberately NOT normalized:
// `"5"` is 0.5s while `"05"` is 0.05s. Format compatibility depends on it.
fn clock_seconds(caps: &Captures<'_>, base: usize) -> f32 {
    let component = |index: usize| {
        caps.get(base + index)
            .map_or(0.0, |m| m.as_str().parse::<f32>().unwrap_or(0.0))
    };

    let fraction = caps.get(base + 3).map_or(0.0, |m| {
        format!("0.{}", m.as_str()).parse::<f32>().unwrap_or(0.0)
    });

    component(0) * 3600.0 + component(1) * 60.0 + component(2) + fraction
}
