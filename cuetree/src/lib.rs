#![cfg_attr(docsrs, feature(doc_cfg))]

//! Multi-format caption/subtitle parser with a time-addressable cue tree.
//!
//! The parsing core accepts SRT, WebVTT, SUB, SBV, LRC, Google-timestamp
//! and TTML caption data through one entry point, [`parse_captions`], and
//! produces [`Cue`] records whose markup payload is a nested,
//! time-annotated [`CueStructure`]. Projecting a structure through
//! [`CueStructure::to_html`] with a playback timestamp gates
//! karaoke-style timestamp spans; [`Track`] keeps the per-tick active-cue
//! set with edge-triggered enter/exit events and change detection.
//!
//! Fetching caption data and rendering cue boxes are deliberately not
//! handled here, they belong to the embedding loader and renderer.
//!
//! # Optional Features
//!
//! The following are a list of [Cargo features](https://doc.rust-lang.org/stable/cargo/reference/features.html#the-features-section) that can be
//! enabled or disabled:
//!
//! - **ttml** (default): Enables support for parsing ttml documents.

mod chunk;
mod cue;
mod error;
mod options;
mod parser;
mod settings;
mod structure;
mod subtitles;
mod timestamp;
mod tokenizer;
mod track;

#[cfg(feature = "ttml")]
mod ttml;

pub use cue::{Cue, CueText};
pub use error::Error;
pub use options::ParseOptions;
pub use parser::{CaptionFormat, parse_captions, sniff_format};
pub use settings::{Alignment, CueSettings, Direction, LinePosition};
pub use structure::{CueNode, CueSpan, CueStructure};
pub use subtitles::Subtitles;
pub use track::{
    CueEvent, CueEventKind, CueList, LoadToken, ReadyState, Track, TrackKind, TrackMode, TrackTick,
};

/// A `Result` alias where the `Err` case is `cuetree::Error`.
pub type Result<T> = std::result::Result<T, Error>;
