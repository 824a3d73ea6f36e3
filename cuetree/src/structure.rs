//! Tokenized cue markup tree and its time-parameterized projection.

use std::{fmt::Write, sync::OnceLock};

/// One parsed markup unit inside a cue payload.
#[derive(Clone, Debug)]
pub enum CueNode {
    /// A plain text run.
    Text(String),
    /// A structural span produced by an allowed tag.
    Span(CueSpan),
}

/// A structural markup node with its nested children.
#[derive(Clone, Debug, Default)]
pub struct CueSpan {
    /// Tag name ("v", "c", "b", ...), or the timestamp text itself for
    /// inline timestamp spans.
    pub token: String,
    /// Original tag text, kept for reconstructing passthrough spans.
    pub raw_token: String,
    /// Speaker name, for voice spans.
    pub voice: Option<String>,
    /// Ordered class list, for class spans.
    pub classes: Vec<String>,
    /// Reveal time in seconds, for timestamp-gated spans.
    pub time_in: Option<f32>,
    /// Nested children, in source order.
    pub children: Vec<CueNode>,
}

/// The tokenized tree representation of a cue's markup payload.
///
/// Serialization is parameterized by an optional playback timestamp so
/// that karaoke-style timestamp-gated spans reveal progressively. A
/// structure with no gated span serializes identically for every
/// timestamp, and that projection is computed once and cached.
#[derive(Clone, Debug)]
pub struct CueStructure {
    cue_source: String,
    nodes: Vec<CueNode>,
    time_dependent: bool,
    mismatched_closes: usize,
    processed: OnceLock<String>,
}

impl CueStructure {
    pub(crate) fn new(
        cue_source: &str,
        nodes: Vec<CueNode>,
        time_dependent: bool,
        mismatched_closes: usize,
    ) -> Self {
        Self {
            cue_source: cue_source.to_owned(),
            nodes,
            time_dependent,
            mismatched_closes,
            processed: OnceLock::new(),
        }
    }

    /// The raw payload this structure was tokenized from.
    pub fn source(&self) -> &str {
        &self.cue_source
    }

    /// The root nodes of the tree, in source order.
    pub fn nodes(&self) -> &[CueNode] {
        &self.nodes
    }

    /// Whether the tree contains at least one timestamp-gated span and so
    /// must be re-projected per tick.
    pub fn is_time_dependent(&self) -> bool {
        self.time_dependent
    }

    /// Number of closing tags that matched no open tag and were tolerated.
    pub fn mismatched_closes(&self) -> usize {
        self.mismatched_closes
    }

    /// Serialize the tree as seen at `current` seconds of playback.
    ///
    /// `None` means no gating: every timestamp span is emitted. Gated
    /// spans whose reveal time lies in the future contribute nothing at
    /// all. Time-independent structures are rendered once and the cached
    /// projection is returned on every later call.
    pub fn to_html(&self, current: Option<f32>) -> String {
        if self.time_dependent {
            render_nodes(&self.nodes, current)
        } else {
            self.processed
                .get_or_init(|| render_nodes(&self.nodes, None))
                .clone()
        }
    }
}

fn render_nodes(nodes: &[CueNode], current: Option<f32>) -> String {
    let mut html = String::new();

    for node in nodes {
        match node {
            CueNode::Text(text) => html.push_str(text),
            // A span without contents generates no text, independent of
            // its kind.
            CueNode::Span(span) if span.children.is_empty() => (),
            CueNode::Span(span) => render_span(span, current, &mut html),
        }
    }

    html
}

fn render_span(span: &CueSpan, current: Option<f32>, html: &mut String) {
    match span.token.as_str() {
        "v" => {
            let voice = span.voice.as_deref().unwrap_or_default();
            let name = voice.replace('"', "");
            let _ = write!(
                html,
                "<q data-voice=\"{}\" class=\"voice speaker-{} webvtt-span\" title=\"{}\">{}</q>",
                name,
                speaker_slug(voice),
                name,
                render_nodes(&span.children, current),
            );
        }
        "c" => {
            let _ = write!(
                html,
                "<span class=\"webvtt-span webvtt-class-span {}\">{}</span>",
                span.classes.join(" "),
                render_nodes(&span.children, current),
            );
        }
        _ => {
            if let Some(time_in) = span.time_in {
                // Strict gating: an unreached span contributes nothing,
                // rather than rendering hidden.
                if current.is_none_or(|now| now >= time_in) {
                    let _ = write!(
                        html,
                        "<span class=\"webvtt-span webvtt-timestamp-span\" data-timestamp=\"{}\" data-timestamp-seconds=\"{}\">{}</span>",
                        span.token,
                        time_in,
                        render_nodes(&span.children, current),
                    );
                }
            } else {
                let _ = write!(
                    html,
                    "{}{}</{}>",
                    span.raw_token,
                    render_nodes(&span.children, current),
                    span.token,
                );
            }
        }
    }
}

// Lowercased speaker name with every non-alphanumeric run collapsed to a
// single hyphen, for class-name use.
fn speaker_slug(voice: &str) -> String {
    let mut slug = String::with_capacity(voice.len());

    for c in voice.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }

    slug
}
