//! Text tracks: cue lists, the display-mode state machine and per-tick
//! active-cue computation.

use crate::{Cue, Error, ParseOptions, Result, parse_captions};
use log::warn;

/// What a track's cues represent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TrackKind {
    Captions,
    Chapters,
    Descriptions,
    /// Freeform data cues; stored raw, never tokenized or sanitized.
    Metadata,
    #[default]
    Subtitles,
}

/// Display mode of a track.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TrackMode {
    /// Cues are computed (events still fire) but not meant to be shown.
    Hidden,
    #[default]
    Off,
    Showing,
}

impl std::str::FromStr for TrackMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "hidden" => Ok(Self::Hidden),
            "off" => Ok(Self::Off),
            "showing" => Ok(Self::Showing),
            _ => Err(Error::new_invalid_mode(format!(
                "{s} is not one of off, hidden and showing"
            ))),
        }
    }
}

/// Load state of a track's cue source.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ReadyState {
    Error,
    Loaded,
    Loading,
    #[default]
    None,
}

/// Ordered cue collection of one track, insertion order = parse order.
#[derive(Debug, Default)]
pub struct CueList {
    cues: Vec<Cue>,
}

impl CueList {
    /// Append a cue, binding it to `track_id`. A cue already bound to a
    /// different track is rejected: a cue belongs to exactly one track.
    fn add(&mut self, mut cue: Cue, track_id: &str) -> Result<()> {
        if let Some(owner) = cue.track()
            && owner != track_id
        {
            return Err(Error::new_invalid_input(format!(
                "cue {} is associated with a different track",
                cue.id()
            )));
        }

        cue.bind(track_id);
        self.cues.push(cue);
        Ok(())
    }

    /// First cue carrying the given id, if any. Ids are conventionally
    /// unique per track but not required to be.
    pub fn get_by_id(&self, id: &str) -> Option<&Cue> {
        self.cues.iter().find(|cue| cue.id() == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Cue> {
        self.cues.iter()
    }

    pub fn len(&self) -> usize {
        self.cues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }

    fn clear(&mut self) {
        self.cues.clear();
    }
}

/// Token tying a load completion back to the load request it belongs to.
/// A completion whose token is stale (a newer load started, or the track
/// was turned off meanwhile) is discarded instead of applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadToken(u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CueEventKind {
    Enter,
    Exit,
}

/// An edge-triggered cue transition observed by [`Track::refresh`].
#[derive(Clone, Debug)]
pub struct CueEvent {
    pub kind: CueEventKind,
    pub cue_id: String,
}

/// Result of one [`Track::refresh`] tick.
#[derive(Clone, Debug)]
pub struct TrackTick {
    /// Enter/exit transitions, exactly one per cue crossing an interval
    /// boundary, however many ticks pass in steady state.
    pub events: Vec<CueEvent>,
    /// Whether the active set differs from the previous tick; at most one
    /// change notification per track per tick.
    pub cues_changed: bool,
    /// Fingerprints of the active cues, most recent start time first.
    pub active_ids: Vec<String>,
}

/// A named, language-tagged collection of cues loaded from one source.
#[derive(Debug)]
pub struct Track {
    id: String,
    kind: TrackKind,
    label: String,
    language: String,
    mode: TrackMode,
    ready_state: ReadyState,
    cues: CueList,
    previous_active: Vec<String>,
    generation: u64,
}

impl Track {
    pub fn new(
        id: impl Into<String>,
        kind: TrackKind,
        label: impl Into<String>,
        language: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            label: label.into(),
            language: language.into(),
            mode: TrackMode::default(),
            ready_state: ReadyState::default(),
            cues: CueList::default(),
            previous_active: Vec::new(),
            generation: 0,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> TrackKind {
        self.kind
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn mode(&self) -> TrackMode {
        self.mode
    }

    pub fn ready_state(&self) -> ReadyState {
        self.ready_state
    }

    pub fn cues(&self) -> &CueList {
        &self.cues
    }

    /// Change the display mode. Turning the track off destroys its cue
    /// data so the source is reloaded on the next activation.
    pub fn set_mode(&mut self, mode: TrackMode) {
        if mode == self.mode {
            return;
        }

        self.mode = mode;

        if mode == TrackMode::Off {
            self.cues.clear();
            self.previous_active.clear();
            self.ready_state = ReadyState::None;
        }
    }

    /// Start a new load, invalidating any load still in flight.
    pub fn begin_load(&mut self) -> LoadToken {
        self.generation += 1;
        self.ready_state = ReadyState::Loading;
        LoadToken(self.generation)
    }

    /// Complete a load started with [`Track::begin_load`]. Returns
    /// `Ok(false)` when the token is stale and the data was discarded.
    pub fn finish_load(
        &mut self,
        token: LoadToken,
        data: &str,
        options: &ParseOptions,
    ) -> Result<bool> {
        if token.0 != self.generation || self.mode == TrackMode::Off {
            warn!("discarding stale caption data for track {}", self.id);
            return Ok(false);
        }

        let mut options = *options;

        if self.kind == TrackKind::Metadata {
            // People can load whatever data they please into metadata
            // tracks. Don't process it.
            options.process_cue_html = false;
            options.sanitise_cue_html = false;
        }

        let cues = match parse_captions(data, &options) {
            Ok(cues) => cues,
            Err(e) => {
                self.ready_state = ReadyState::Error;
                return Err(e);
            }
        };

        self.cues.clear();

        for cue in cues {
            self.cues.add(cue, &self.id)?;
        }

        self.ready_state = ReadyState::Loaded;
        Ok(true)
    }

    /// Record a failed load. Fetching and its error reporting live with
    /// the loader; the track only keeps the resulting state.
    pub fn fail_load(&mut self, token: LoadToken) {
        if token.0 == self.generation {
            self.ready_state = ReadyState::Error;
        }
    }

    /// Append a programmatically created cue.
    pub fn add_cue(&mut self, cue: Cue) -> Result<()> {
        self.cues.add(cue, &self.id)
    }

    /// Whether this track's cues take part in display at all.
    pub fn is_displayable(&self) -> bool {
        matches!(self.mode, TrackMode::Showing | TrackMode::Hidden)
            && self.ready_state == ReadyState::Loaded
    }

    /// The cues active at `current_time`, most recent start time first
    /// (older cues render above newer ones).
    pub fn active_cues(&self, current_time: f32) -> Vec<&Cue> {
        if !self.is_displayable() {
            return Vec::new();
        }

        let mut active: Vec<&Cue> = self
            .cues
            .iter()
            .filter(|cue| cue.is_active(current_time))
            .collect();

        active.sort_by(|a, b| {
            b.start_time()
                .partial_cmp(&a.start_time())
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        active
    }

    /// Recompute the active set for a new tick, firing enter/exit
    /// transitions and change detection against the previous tick.
    ///
    /// The fingerprint of an active cue includes its rendered length, so
    /// a timestamp-gated span becoming visible counts as a change even
    /// when the membership of the active set is unchanged.
    pub fn refresh(&mut self, current_time: f32) -> TrackTick {
        let displayable = self.is_displayable();
        let mut events = Vec::new();

        for cue in &mut self.cues.cues {
            let active = displayable && cue.is_active(current_time);

            if active != cue.was_active() {
                cue.set_was_active(active);
                events.push(CueEvent {
                    kind: if active {
                        CueEventKind::Enter
                    } else {
                        CueEventKind::Exit
                    },
                    cue_id: cue.id().to_owned(),
                });
            }
        }

        let active_ids: Vec<String> = self
            .active_cues(current_time)
            .into_iter()
            .map(|cue| {
                format!(
                    "{}.{}:{}",
                    self.id,
                    cue.id(),
                    cue.render(Some(current_time)).len()
                )
            })
            .collect();

        let cues_changed = active_ids != self.previous_active;
        self.previous_active = active_ids.clone();

        TrackTick {
            events,
            cues_changed,
            active_ids,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CueSettings, CueText};

    fn showing_track(data: &str) -> Track {
        let mut track = Track::new("t1", TrackKind::Subtitles, "English", "en");
        track.set_mode(TrackMode::Showing);
        let token = track.begin_load();
        assert!(track.finish_load(token, data, &ParseOptions::default()).unwrap());
        track
    }

    #[test]
    fn mode_parsing_rejects_unknown_values() {
        assert_eq!("showing".parse::<TrackMode>().unwrap(), TrackMode::Showing);
        let err = "sideways".parse::<TrackMode>().unwrap_err();
        assert!(err.is_invalid_mode());
    }

    #[test]
    fn enter_and_exit_fire_exactly_once_per_transition() {
        let mut track = showing_track("1\n00:00:01,000 --> 00:00:04,000\nHello\n");

        assert!(track.refresh(0.0).events.is_empty());

        let tick = track.refresh(1.5);
        assert_eq!(tick.events.len(), 1);
        assert_eq!(tick.events[0].kind, CueEventKind::Enter);
        assert_eq!(tick.events[0].cue_id, "1");

        // Steady state inside the interval: no further events.
        assert!(track.refresh(2.0).events.is_empty());
        assert!(track.refresh(3.0).events.is_empty());

        let tick = track.refresh(5.0);
        assert_eq!(tick.events.len(), 1);
        assert_eq!(tick.events[0].kind, CueEventKind::Exit);

        assert!(track.refresh(6.0).events.is_empty());
    }

    #[test]
    fn cues_changed_signals_once_per_membership_change() {
        let mut track = showing_track(
            "a\n00:00:01,000 --> 00:00:04,000\nA\n\nb\n00:00:03,000 --> 00:00:06,000\nB",
        );

        let tick = track.refresh(1.5);
        assert!(tick.cues_changed);
        assert_eq!(tick.active_ids, ["t1.a:1"]);

        assert!(!track.refresh(2.0).cues_changed);

        // Second cue joins; most recent start time sorts first.
        let tick = track.refresh(3.5);
        assert!(tick.cues_changed);
        assert_eq!(tick.active_ids, ["t1.b:1", "t1.a:1"]);
    }

    #[test]
    fn karaoke_reveal_counts_as_a_change_without_membership_change() {
        let mut track = showing_track("1\n00:00:00,000 --> 00:00:10,000\nNow <00:00:05.000>later");

        let tick = track.refresh(1.0);
        assert!(tick.cues_changed);
        assert!(track.refresh(2.0).events.is_empty());
        assert!(!track.refresh(2.0).cues_changed);

        // The gated span becomes visible: same membership, longer text.
        let tick = track.refresh(5.5);
        assert!(tick.cues_changed);
        assert!(tick.events.is_empty());
    }

    #[test]
    fn cue_bound_elsewhere_is_rejected() {
        let mut track = Track::new("t1", TrackKind::Subtitles, "", "");
        let mut cue = Cue::new(
            "x",
            0.0,
            1.0,
            CueText::Raw("hi".to_owned()),
            CueSettings::default(),
        );
        cue.bind("other-track");

        let err = track.add_cue(cue).unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn turning_off_destroys_cue_data() {
        let mut track = showing_track("1\n00:00:01,000 --> 00:00:04,000\nHello\n");
        assert_eq!(track.ready_state(), ReadyState::Loaded);
        assert_eq!(track.cues().len(), 1);

        track.set_mode(TrackMode::Off);
        assert_eq!(track.ready_state(), ReadyState::None);
        assert!(track.cues().is_empty());

        // Reactivating alone does not bring the cues back.
        track.set_mode(TrackMode::Showing);
        assert!(!track.is_displayable());
        assert!(track.refresh(2.0).events.is_empty());
    }

    #[test]
    fn stale_load_results_are_discarded() {
        let mut track = Track::new("t1", TrackKind::Subtitles, "", "");
        track.set_mode(TrackMode::Showing);

        let stale = track.begin_load();
        let current = track.begin_load();

        let applied = track
            .finish_load(stale, "1\n00:00:01,000 --> 00:00:02,000\nOld\n", &ParseOptions::default())
            .unwrap();
        assert!(!applied);
        assert_eq!(track.ready_state(), ReadyState::Loading);
        assert!(track.cues().is_empty());

        let applied = track
            .finish_load(current, "1\n00:00:01,000 --> 00:00:02,000\nNew\n", &ParseOptions::default())
            .unwrap();
        assert!(applied);
        assert_eq!(track.ready_state(), ReadyState::Loaded);
        assert!(track.cues().get_by_id("1").unwrap().render(None).contains("New"));
    }

    #[test]
    fn load_finishing_after_track_turned_off_is_discarded() {
        let mut track = Track::new("t1", TrackKind::Subtitles, "", "");
        track.set_mode(TrackMode::Showing);
        let token = track.begin_load();
        track.set_mode(TrackMode::Off);

        let applied = track
            .finish_load(token, "1\n00:00:01,000 --> 00:00:02,000\nLate\n", &ParseOptions::default())
            .unwrap();
        assert!(!applied);
        assert!(track.cues().is_empty());
    }

    #[test]
    fn metadata_tracks_store_cue_payloads_raw() {
        let mut track = Track::new("t1", TrackKind::Metadata, "", "");
        track.set_mode(TrackMode::Hidden);
        let token = track.begin_load();
        track
            .finish_load(
                token,
                "1\n00:00:01,000 --> 00:00:02,000\n{\"any\": \"<data>\"}",
                &ParseOptions::default(),
            )
            .unwrap();

        let cue = track.cues().get_by_id("1").unwrap();
        assert!(matches!(cue.text(), CueText::Raw(_)));
        assert_eq!(cue.render(None), "{\"any\": \"<data>\"}");
    }

    #[test]
    fn failed_load_marks_the_track() {
        let mut track = Track::new("t1", TrackKind::Subtitles, "", "");
        track.set_mode(TrackMode::Showing);
        let token = track.begin_load();
        track.fail_load(token);
        assert_eq!(track.ready_state(), ReadyState::Error);
    }
}
