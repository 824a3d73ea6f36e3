//! Timed caption cues.

use crate::{CueSettings, structure::CueStructure};

/// A cue's payload, either raw text or the tokenized markup tree.
#[derive(Clone, Debug)]
pub enum CueText {
    Raw(String),
    Structured(CueStructure),
}

impl CueText {
    /// Project the payload as seen at `current` seconds of playback.
    /// Raw payloads are time-independent and returned verbatim.
    pub fn render(&self, current: Option<f32>) -> String {
        match self {
            Self::Raw(text) => text.clone(),
            Self::Structured(structure) => structure.to_html(current),
        }
    }

    /// The original payload text.
    pub fn source(&self) -> &str {
        match self {
            Self::Raw(text) => text,
            Self::Structured(structure) => structure.source(),
        }
    }

    /// Whether rendering depends on the playback timestamp.
    pub fn is_time_dependent(&self) -> bool {
        match self {
            Self::Raw(_) => false,
            Self::Structured(structure) => structure.is_time_dependent(),
        }
    }
}

/// A single timed caption/subtitle entry.
#[derive(Clone, Debug)]
pub struct Cue {
    id: String,
    start_time: f32,
    end_time: f32,
    text: CueText,
    settings: CueSettings,
    style_data: String,
    track: Option<String>,
    was_active: bool,
}

impl Cue {
    /// Create a cue. An end time earlier than the start time is clamped
    /// up to the start time.
    pub fn new<T: Into<String>>(
        id: T,
        start_time: f32,
        end_time: f32,
        text: CueText,
        settings: CueSettings,
    ) -> Self {
        Self {
            id: id.into(),
            start_time,
            end_time: if end_time >= start_time {
                end_time
            } else {
                start_time
            },
            text,
            settings,
            style_data: String::new(),
            track: None,
            was_active: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn start_time(&self) -> f32 {
        self.start_time
    }

    pub fn end_time(&self) -> f32 {
        self.end_time
    }

    pub fn text(&self) -> &CueText {
        &self.text
    }

    pub fn settings(&self) -> &CueSettings {
        &self.settings
    }

    /// Settings may still be adjusted after construction, before the cue
    /// is first rendered.
    pub fn settings_mut(&mut self) -> &mut CueSettings {
        &mut self.settings
    }

    /// Raw WebVTT STYLE payload in effect when this cue was parsed. Not
    /// interpreted further, handed to the renderer as-is.
    pub fn style_data(&self) -> &str {
        &self.style_data
    }

    /// Id of the track this cue is attached to, if any.
    pub fn track(&self) -> Option<&str> {
        self.track.as_deref()
    }

    /// Whether this cue's display interval contains `current_time`.
    pub fn is_active(&self, current_time: f32) -> bool {
        self.start_time <= current_time && current_time <= self.end_time
    }

    /// Project the cue's payload as seen at `current` seconds.
    pub fn render(&self, current: Option<f32>) -> String {
        self.text.render(current)
    }

    pub(crate) fn set_style_data(&mut self, style_data: &str) {
        self.style_data = style_data.to_owned();
    }

    pub(crate) fn bind(&mut self, track_id: &str) {
        self.track = Some(track_id.to_owned());
    }

    pub(crate) fn set_end_time(&mut self, end_time: f32) {
        self.end_time = end_time.max(self.start_time);
    }

    // Edge-trigger state for enter/exit events; owned by Track::refresh.
    pub(crate) fn was_active(&self) -> bool {
        self.was_active
    }

    pub(crate) fn set_was_active(&mut self, was_active: bool) {
        self.was_active = was_active;
    }
}

impl std::fmt::Display for Cue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}\n{}", self.id, self.text.render(None))
    }
}
