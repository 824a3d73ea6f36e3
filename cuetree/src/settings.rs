//! WebVTT cue settings.

/*
    REFERENCES
    ----------

    1. https://www.w3.org/TR/webvtt1/#webvtt-cue-settings

*/

/// Writing direction of a cue's lines.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Direction {
    #[default]
    Horizontal,
    Vertical,
    VerticalLr,
}

/// Alignment of a cue's text within each line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Alignment {
    Start,
    #[default]
    Middle,
    End,
}

/// Position of a cue's lines, either automatic, a percentage of the video
/// dimension, or a multiple of the first line's dimensions.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum LinePosition {
    #[default]
    Auto,
    Percentage(f32),
    Line(i32),
}

/// Positional and layout directives attached to a cue, parsed from a
/// WebVTT cue-settings string. Every directive has a default, so any
/// malformed or unknown setting simply leaves its default in place.
#[derive(Clone, Debug, PartialEq)]
pub struct CueSettings {
    pub direction: Direction,
    /// Whether the line position is counted in line units rather than as
    /// a percentage of the video. Cleared when the `L` directive carries
    /// a percentage.
    pub snap_to_lines: bool,
    pub line_position: LinePosition,
    /// Position of the text within each line, as a percentage.
    pub text_position: f32,
    /// Size of the cue box, as a percentage of the video.
    pub size: f32,
    pub alignment: Alignment,
    canonical: String,
}

impl Default for CueSettings {
    fn default() -> Self {
        Self {
            direction: Direction::default(),
            snap_to_lines: true,
            line_position: LinePosition::default(),
            text_position: 50.0,
            size: 0.0,
            alignment: Alignment::default(),
            canonical: String::new(),
        }
    }
}

impl CueSettings {
    /// Parse a space-separated `K:V` settings string.
    pub fn parse(settings: &str) -> Self {
        let pairs = settings
            .split_whitespace()
            .filter_map(|item| item.split_once(':'))
            .map(|(key, value)| (key.to_owned(), value.to_owned()))
            .collect::<Vec<_>>();

        Self::from_pairs(&pairs)
    }

    /// Build settings from already-merged `(key, value)` pairs. The pairs
    /// are also kept as the canonical settings string.
    pub(crate) fn from_pairs(pairs: &[(String, String)]) -> Self {
        let mut settings = Self::default();

        for (key, value) in pairs {
            match key.as_str() {
                "D" => match value.as_str() {
                    "horizontal" => settings.direction = Direction::Horizontal,
                    "vertical" => settings.direction = Direction::Vertical,
                    "vertical-lr" => settings.direction = Direction::VerticalLr,
                    _ => (),
                },
                "L" => {
                    if let Some(percentage) = value.strip_suffix('%') {
                        if let Ok(percentage) = percentage.parse() {
                            settings.line_position = LinePosition::Percentage(percentage);
                            settings.snap_to_lines = false;
                        }
                    } else if value == "auto" {
                        settings.line_position = LinePosition::Auto;
                    } else if let Ok(line) = value.parse() {
                        settings.line_position = LinePosition::Line(line);
                    }
                }
                "T" => {
                    if let Ok(position) = value.trim_end_matches('%').parse() {
                        settings.text_position = position;
                    }
                }
                "A" => match value.as_str() {
                    "start" => settings.alignment = Alignment::Start,
                    "middle" => settings.alignment = Alignment::Middle,
                    "end" => settings.alignment = Alignment::End,
                    _ => (),
                },
                "S" => {
                    if let Ok(size) = value.trim_end_matches('%').parse() {
                        settings.size = size;
                    }
                }
                _ => (),
            }
        }

        settings.canonical = pairs
            .iter()
            .map(|(key, value)| format!("{key}:{value}"))
            .collect::<Vec<_>>()
            .join(" ");

        settings
    }

    /// The merged settings as a `K:V K:V` string.
    pub fn as_str(&self) -> &str {
        &self.canonical
    }
}
