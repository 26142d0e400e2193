//! Frame interval sampling.
//!
//! The sampler is a pure state machine: the host's per-frame scheduling
//! primitive (or a timer standing in for one) calls [`FrameSampler::record_frame`]
//! once per frame with the token it was handed at start. Stopping or
//! resetting the session invalidates that token, so a callback that was
//! already queued when the session stopped is discarded instead of counted.

use crate::stats::RunningStats;
use crate::timing::Sample;
use serde::{Deserialize, Serialize};

/// Lifecycle of a sampling session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    /// Never started, or reset
    #[default]
    Idle,
    /// Frames are being sampled
    Running,
    /// Sampling finished; statistics are frozen
    Stopped,
}

/// Identifies one sampling session.
///
/// Frame callbacks carry the token of the session that scheduled them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SamplingToken(u64);

impl SamplingToken {
    /// Raw generation number.
    #[inline]
    pub fn generation(&self) -> u64 {
        self.0
    }
}

/// Samples inter-frame intervals and counts dropped frames.
#[derive(Debug, Clone)]
pub struct FrameSampler {
    drop_threshold_ms: f64,
    state: SessionState,
    generation: u64,
    active: Option<SamplingToken>,
    start_ms: f64,
    end_ms: Option<f64>,
    last_frame_ms: f64,
    intervals: RunningStats,
    dropped: u64,
    scroll_events: u64,
    final_fps: f64,
}

impl FrameSampler {
    /// Create an idle sampler that treats intervals above `drop_threshold_ms` as dropped.
    pub fn new(drop_threshold_ms: f64) -> Self {
        Self {
            drop_threshold_ms,
            state: SessionState::Idle,
            generation: 0,
            active: None,
            start_ms: 0.0,
            end_ms: None,
            last_frame_ms: 0.0,
            intervals: RunningStats::new(),
            dropped: 0,
            scroll_events: 0,
            final_fps: 0.0,
        }
    }

    /// Begin a session at `now_ms`.
    ///
    /// Starting while already running keeps the current session and its
    /// counters and hands back the same token.
    pub fn start(&mut self, now_ms: f64) -> SamplingToken {
        if let (SessionState::Running, Some(token)) = (self.state, self.active) {
            return token;
        }

        let token = self.next_token();
        self.state = SessionState::Running;
        self.active = Some(token);
        self.start_ms = now_ms;
        self.end_ms = None;
        self.last_frame_ms = now_ms;
        self.intervals.reset();
        self.dropped = 0;
        self.final_fps = 0.0;
        token
    }

    /// Fold the frame observed at `frame_ms` into the session.
    ///
    /// Returns `None` when the token does not belong to the running session.
    pub fn record_frame(&mut self, token: SamplingToken, frame_ms: f64) -> Option<Sample> {
        if !self.accepts(token) {
            return None;
        }

        let delta = (frame_ms - self.last_frame_ms).max(0.0);
        let sample = Sample::new(frame_ms, delta);

        self.intervals.push(delta);
        if sample.exceeds(self.drop_threshold_ms) {
            self.dropped += 1;
        }
        self.last_frame_ms = frame_ms;

        Some(sample)
    }

    /// End the running session at `now_ms` and freeze the average frame rate.
    ///
    /// Returns `false` when nothing was running.
    pub fn stop(&mut self, now_ms: f64) -> bool {
        if self.state != SessionState::Running {
            return false;
        }

        self.final_fps = self.fps_until(now_ms);
        self.state = SessionState::Stopped;
        self.end_ms = Some(now_ms);
        self.active = None;
        self.generation += 1;
        true
    }

    /// Count one externally reported scroll or input event.
    #[inline]
    pub fn record_scroll_event(&mut self) {
        self.scroll_events += 1;
    }

    /// Return to idle with zeroed counters because the host cannot deliver frames.
    pub fn disable(&mut self) {
        let scroll_events = self.scroll_events;
        self.reset();
        self.scroll_events = scroll_events;
    }

    /// Invalidate any session and zero every counter.
    pub fn reset(&mut self) {
        let generation = self.generation + 1;
        *self = Self::new(self.drop_threshold_ms);
        self.generation = generation;
    }

    /// Check if `token` belongs to the running session.
    #[inline]
    pub fn accepts(&self, token: SamplingToken) -> bool {
        self.state == SessionState::Running && self.active == Some(token)
    }

    /// Current lifecycle state.
    #[inline]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Token of the running session, if any.
    #[inline]
    pub fn token(&self) -> Option<SamplingToken> {
        self.active
    }

    /// Interval statistics for the current or last session.
    #[inline]
    pub fn intervals(&self) -> &RunningStats {
        &self.intervals
    }

    /// Number of dropped frames in the current or last session.
    #[inline]
    pub fn dropped_count(&self) -> u64 {
        self.dropped
    }

    /// Number of scroll events since the last reset.
    #[inline]
    pub fn scroll_events(&self) -> u64 {
        self.scroll_events
    }

    /// Time at which the current or last session started.
    #[inline]
    pub fn start_ms(&self) -> f64 {
        self.start_ms
    }

    /// Time at which the last session stopped.
    #[inline]
    pub fn end_ms(&self) -> Option<f64> {
        self.end_ms
    }

    /// Length of the session, measured up to `now_ms` while running.
    pub fn duration_ms(&self, now_ms: f64) -> f64 {
        match self.state {
            SessionState::Idle => 0.0,
            SessionState::Running => (now_ms - self.start_ms).max(0.0),
            SessionState::Stopped => {
                (self.end_ms.unwrap_or(self.start_ms) - self.start_ms).max(0.0)
            }
        }
    }

    /// Frames per second over the session.
    ///
    /// Live while running, frozen once stopped.
    pub fn average_fps(&self, now_ms: f64) -> f64 {
        match self.state {
            SessionState::Idle => 0.0,
            SessionState::Running => self.fps_until(now_ms),
            SessionState::Stopped => self.final_fps,
        }
    }

    fn fps_until(&self, now_ms: f64) -> f64 {
        let seconds = (now_ms - self.start_ms) / 1000.0;
        if seconds <= 0.0 {
            return 0.0;
        }
        self.intervals.count() as f64 / seconds
    }

    fn next_token(&mut self) -> SamplingToken {
        self.generation += 1;
        SamplingToken(self.generation)
    }
}
