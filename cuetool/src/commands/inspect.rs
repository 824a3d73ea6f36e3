use anyhow::Result;
use clap::Args;
use cuetree::ParseOptions;
use serde_json::json;
use std::path::PathBuf;

/// Dump the parsed cues of a caption file.
#[derive(Debug, Clone, Args)]
pub struct Inspect {
    /// Path of the caption file.
    #[arg(required = true)]
    input: PathBuf,

    /// Emit machine-readable json instead of a listing.
    #[arg(long)]
    json: bool,
}

impl Inspect {
    pub fn execute(self) -> Result<()> {
        let data = std::fs::read_to_string(&self.input)?;
        let format = cuetree::sniff_format(&data);
        let cues = cuetree::parse_captions(&data, &ParseOptions::default())?;

        if self.json {
            let cues = cues
                .iter()
                .map(|cue| {
                    json!({
                        "id": cue.id(),
                        "startTime": cue.start_time(),
                        "endTime": cue.end_time(),
                        "settings": cue.settings().as_str(),
                        "timeDependent": cue.text().is_time_dependent(),
                        "source": cue.text().source(),
                        "rendered": cue.render(None),
                    })
                })
                .collect::<Vec<_>>();

            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "format": format.to_string(),
                    "cues": cues,
                }))?
            );

            return Ok(());
        }

        println!("format: {} ({} cues)", format, cues.len());

        for cue in &cues {
            println!();
            print!(
                "[{}] {:.3}s --> {:.3}s",
                cue.id(),
                cue.start_time(),
                cue.end_time()
            );

            if !cue.settings().as_str().is_empty() {
                print!(" {}", cue.settings().as_str());
            }

            println!();

            for line in cue.render(None).split("<br />") {
                println!("    {line}");
            }
        }

        Ok(())
    }
}
