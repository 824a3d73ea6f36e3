use anyhow::Result;
use clap::{Args, ValueEnum};
use cuetree::{ParseOptions, Subtitles};
use log::info;
use std::path::PathBuf;

/// Convert a caption file to subrip or webvtt format.
#[derive(Debug, Clone, Args)]
pub struct Convert {
    /// Path of the caption file (srt, vtt, sub, sbv, lrc or ttml).
    #[arg(required = true)]
    input: PathBuf,

    /// Codec for output subtitles.
    #[arg(short, long, value_enum, default_value_t = Codec::Webvtt)]
    codec: Codec,

    /// Store cue payloads raw instead of tokenizing their markup.
    #[arg(long)]
    no_markup: bool,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum Codec {
    Subrip,
    Webvtt,
}

impl Convert {
    pub fn execute(self) -> Result<()> {
        let data = std::fs::read_to_string(&self.input)?;
        let options = ParseOptions {
            process_cue_html: !self.no_markup,
            ..ParseOptions::default()
        };

        let cues = cuetree::parse_captions(&data, &options)?;
        info!(
            "parsed {} cues from {}",
            cues.len(),
            self.input.to_string_lossy()
        );

        let subtitles = Subtitles::from_cues(&cues);
        print!(
            "{}",
            match &self.codec {
                Codec::Subrip => subtitles.as_srt(),
                Codec::Webvtt => subtitles.as_vtt(),
            }
        );

        Ok(())
    }
}
