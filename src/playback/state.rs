use serde::Serialize;
use std::time::Instant;

use crate::roast::CuePoint;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum PlaybackStatus {
    Idle,
    Loading,
    Playing,
    Paused,
    Ended,
}

impl Default for PlaybackStatus {
    fn default() -> Self {
        PlaybackStatus::Idle
    }
}

/// Outcome of one polling step: cues that crossed the watermark on this
/// advance, and whether playback ran out.
#[derive(Debug, Default)]
pub struct PollOutcome {
    pub fired: Vec<CuePoint>,
    pub index_changed: bool,
    pub ended: bool,
}

/// The playback state machine. Single logical owner (the controller);
/// mutated only by polling and explicit user actions. Elapsed time uses
/// the baseline + anchor pattern so pause/resume never drifts.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackState {
    pub status: PlaybackStatus,
    pub roast_id: Option<String>,
    /// -1 while no token is highlighted.
    pub current_token_index: i64,
    /// Watermark: the highest token index whose cue has fired. Never
    /// decreased except by an explicit replay.
    pub last_fired_cue_index: i64,
    pub duration_ms: f64,
    #[serde(skip)]
    pub schedule_ms: Vec<f64>,
    #[serde(skip)]
    pub cues: Vec<CuePoint>,
    #[serde(skip)]
    pub elapsed_baseline_ms: f64,
    #[serde(skip)]
    pub playing_anchor: Option<Instant>,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            status: PlaybackStatus::Idle,
            roast_id: None,
            current_token_index: -1,
            last_fired_cue_index: -1,
            duration_ms: 0.0,
            schedule_ms: Vec::new(),
            cues: Vec::new(),
            elapsed_baseline_ms: 0.0,
            playing_anchor: None,
        }
    }
}

impl PlaybackState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_playing(&self) -> bool {
        self.status == PlaybackStatus::Playing
    }

    pub fn current_elapsed_ms(&self) -> f64 {
        match (self.status, self.playing_anchor) {
            (PlaybackStatus::Playing, Some(anchor)) => {
                self.elapsed_baseline_ms + anchor.elapsed().as_secs_f64() * 1000.0
            }
            _ => self.elapsed_baseline_ms,
        }
    }

    pub fn progress_fraction(&self) -> f64 {
        if self.duration_ms <= 0.0 {
            return 0.0;
        }
        (self.current_elapsed_ms() / self.duration_ms).clamp(0.0, 1.0)
    }

    /// New roast submitted: everything resets, schedule arrives later.
    pub fn begin_loading(&mut self, roast_id: String) {
        *self = Self {
            status: PlaybackStatus::Loading,
            roast_id: Some(roast_id),
            ..Self::default()
        };
    }

    /// Loading -> Playing once audio/synthesis is ready. The schedule must
    /// be non-empty; the caller enforces that.
    pub fn begin_playing(&mut self, schedule_ms: Vec<f64>, mut cues: Vec<CuePoint>, duration_ms: f64) {
        cues.sort_by_key(|c| c.token_index);
        self.status = PlaybackStatus::Playing;
        self.current_token_index = -1;
        self.last_fired_cue_index = -1;
        self.schedule_ms = schedule_ms;
        self.cues = cues;
        self.duration_ms = duration_ms;
        self.elapsed_baseline_ms = 0.0;
        self.playing_anchor = Some(Instant::now());
    }

    pub fn pause(&mut self) {
        if self.status != PlaybackStatus::Playing {
            return;
        }
        self.elapsed_baseline_ms = self.current_elapsed_ms();
        self.playing_anchor = None;
        self.status = PlaybackStatus::Paused;
    }

    /// Resume keeps the watermark: no cue re-fires after a pause.
    pub fn resume(&mut self) {
        if self.status != PlaybackStatus::Paused {
            return;
        }
        self.playing_anchor = Some(Instant::now());
        self.status = PlaybackStatus::Playing;
    }

    /// Replay is the one transition that resets the watermark.
    pub fn replay(&mut self) {
        self.current_token_index = -1;
        self.last_fired_cue_index = -1;
        self.elapsed_baseline_ms = 0.0;
        self.playing_anchor = Some(Instant::now());
        self.status = PlaybackStatus::Playing;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Greatest schedule index whose start time is at or before `elapsed`,
    /// clamped to the last index. -1 before the first token.
    pub fn index_for_elapsed(&self, elapsed_ms: f64) -> i64 {
        let mut index: i64 = -1;
        for (i, start) in self.schedule_ms.iter().enumerate() {
            if *start <= elapsed_ms {
                index = i as i64;
            } else {
                break;
            }
        }
        index
    }

    /// One polling step at the given elapsed time. Advances the current
    /// token, fires every cue between the watermark and the new position
    /// exactly once (in token order), and reports completion.
    pub fn poll(&mut self, elapsed_ms: f64) -> PollOutcome {
        let mut outcome = PollOutcome::default();
        if self.status != PlaybackStatus::Playing {
            return outcome;
        }

        let new_index = self.index_for_elapsed(elapsed_ms);
        outcome.index_changed = new_index != self.current_token_index;
        self.current_token_index = new_index;

        for cue in &self.cues {
            let idx = cue.token_index as i64;
            if idx > self.last_fired_cue_index && idx <= new_index {
                outcome.fired.push(*cue);
                self.last_fired_cue_index = idx;
            }
        }

        if elapsed_ms >= self.duration_ms && self.duration_ms > 0.0 {
            self.elapsed_baseline_ms = self.duration_ms;
            self.playing_anchor = None;
            self.status = PlaybackStatus::Ended;
            outcome.ended = true;
        }

        outcome
    }

    /// Re-derives the position after a scrub. The watermark only moves
    /// forward: seeking past cues skips them silently, seeking back never
    /// re-arms cues that already fired.
    pub fn seek(&mut self, position_ms: f64) {
        if matches!(self.status, PlaybackStatus::Idle | PlaybackStatus::Loading) {
            return;
        }
        let position = position_ms.clamp(0.0, self.duration_ms);
        self.elapsed_baseline_ms = position;
        if self.status == PlaybackStatus::Playing {
            self.playing_anchor = Some(Instant::now());
        }
        let index = self.index_for_elapsed(position);
        self.current_token_index = index;
        self.last_fired_cue_index = self.last_fired_cue_index.max(index);
        if self.status == PlaybackStatus::Ended && position < self.duration_ms {
            self.status = PlaybackStatus::Paused;
        }
    }
}
