use anyhow::Result;
use clap::Args;
use cuetree::{ParseOptions, Track, TrackKind, TrackMode};
use log::{debug, info};
use std::path::PathBuf;

/// Show the cues active at a given playback instant, rendered as of that
/// instant.
#[derive(Debug, Clone, Args)]
pub struct Preview {
    /// Path of the caption file.
    #[arg(required = true)]
    input: PathBuf,

    /// Playback instant in seconds.
    #[arg(short, long)]
    at: f32,

    /// Language tag for the preview track.
    #[arg(long, default_value = "und")]
    language: String,
}

impl Preview {
    pub fn execute(self) -> Result<()> {
        let data = std::fs::read_to_string(&self.input)?;

        let mut track = Track::new("preview", TrackKind::Subtitles, "Preview", self.language);
        track.set_mode(TrackMode::Showing);

        let token = track.begin_load();
        track.finish_load(token, &data, &ParseOptions::default())?;

        let tick = track.refresh(self.at);
        debug!("active fingerprints: {:?}", tick.active_ids);

        let active = track.active_cues(self.at);

        if active.is_empty() {
            info!("no active cues at {}s", self.at);
            return Ok(());
        }

        for cue in active {
            println!(
                "[{}] {:.3}s --> {:.3}s",
                cue.id(),
                cue.start_time(),
                cue.end_time()
            );
            println!("{}", cue.render(Some(self.at)));
            println!();
        }

        Ok(())
    }
}
