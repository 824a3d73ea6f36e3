//! Subtitle output builders.

use crate::Cue;
use std::fmt::Write;

struct Entry {
    end_time: f32,
    payload: String,
    settings: String,
    start_time: f32,
}

/// Subtitles builder over parsed cues.
#[derive(Default)]
pub struct Subtitles {
    entries: Vec<Entry>,
}

impl Subtitles {
    /// Build from parsed cues. Payloads are the cues' original markup
    /// source, settings their canonical string form.
    pub fn from_cues(cues: &[Cue]) -> Self {
        Self {
            entries: cues
                .iter()
                .map(|cue| Entry {
                    end_time: cue.end_time(),
                    payload: cue.text().source().trim().to_owned(),
                    settings: cue.settings().as_str().to_owned(),
                    start_time: cue.start_time(),
                })
                .collect(),
        }
    }

    // Drop empty and zero-length entries, and merge runs of adjacent
    // entries carrying the same payload and settings.
    fn fix_cues(self) -> Self {
        let mut entries: Vec<Entry> = Vec::new();

        for entry in self.entries {
            if !(entry.payload.is_empty() || (entry.start_time == entry.end_time)) {
                if let Some(last_entry) = entries.last()
                    && last_entry.end_time == entry.start_time
                    && last_entry.settings == entry.settings
                    && last_entry.payload == entry.payload
                {
                    entries.last_mut().unwrap().end_time = entry.end_time;
                    continue;
                }

                entries.push(entry);
            }
        }

        Self { entries }
    }

    /// Build subtitles in subrip format.
    pub fn as_srt(self) -> String {
        let entries = self.fix_cues().entries;
        let mut subtitles = String::new();

        for (i, entry) in entries.iter().enumerate() {
            let _ = write!(
                subtitles,
                "{}\n{} --> {}\n{}\n\n",
                i + 1,
                timestamp(entry.start_time, ','),
                timestamp(entry.end_time, ','),
                entry.payload
            );
        }

        subtitles
    }

    /// Build subtitles in webvtt format.
    pub fn as_vtt(self) -> String {
        let entries = self.fix_cues().entries;
        let mut subtitles = "WEBVTT\n\n".to_owned();

        for entry in entries {
            if entry.settings.is_empty() {
                let _ = write!(
                    subtitles,
                    "{} --> {}\n{}\n\n",
                    timestamp(entry.start_time, '.'),
                    timestamp(entry.end_time, '.'),
                    entry.payload
                );
            } else {
                let _ = write!(
                    subtitles,
                    "{} --> {} {}\n{}\n\n",
                    timestamp(entry.start_time, '.'),
                    timestamp(entry.end_time, '.'),
                    entry.settings,
                    entry.payload
                );
            }
        }

        subtitles
    }
}

fn timestamp(seconds: f32, sep: char) -> String {
    let divmod = |x, y| (x / y, x % y);
    let (s, ms) = divmod((seconds * 1000.0).round() as usize, 1000);
    let (m, s) = divmod(s, 60);
    let (h, m) = divmod(m, 60);
    format!("{h:02}:{m:02}:{s:02}{sep}{ms:03}")
}
