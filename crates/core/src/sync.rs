//! Keeps the timeline cursor in step with playback time.
//! Also tracks the debounce window for time signals and the single pending
//! end-of-subtitle pause.

use crate::timeline::Timeline;
use std::time::{Duration, Instant};
use tracing::trace;

/// Result of aligning the cursor with a playback time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Located {
    /// Entries passed while catching up.
    pub advanced: usize,
    /// Cursor position of the entry covering the time, if one does.
    pub displayed: Option<usize>,
}

/// Advance the cursor past entries that ended before `time` and report
/// whether the new active entry covers it.
pub fn locate(timeline: &mut Timeline, time: f64) -> Located {
    let advanced = timeline.advance_past(time);
    let displayed = timeline
        .active()
        .filter(|e| e.contains(time))
        .and_then(|_| timeline.current_index());
    Located {
        advanced,
        displayed,
    }
}

/// The one-shot pause that may be pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingPause {
    token: u64,
    position: usize,
}

/// Debounce and pause-timer bookkeeping for playback signals.
#[derive(Debug, Clone, Default)]
pub struct PlaybackSync {
    debounce: Option<Duration>,
    last_processed: Option<Instant>,
    next_token: u64,
    pending: Option<PendingPause>,
}

impl PlaybackSync {
    pub fn new(debounce: Option<Duration>) -> Self {
        Self {
            debounce,
            ..Self::default()
        }
    }

    /// Whether a signal arriving at `now` should be processed.
    /// Without a debounce interval every signal is accepted.
    pub fn accept(&mut self, now: Instant) -> bool {
        if let (Some(window), Some(last)) = (self.debounce, self.last_processed) {
            if now.saturating_duration_since(last) < window {
                return false;
            }
        }
        self.last_processed = Some(now);
        true
    }

    /// Schedule a pause for the entry at `position`, replacing any pending one.
    /// Returns the token the caller must hand back when the timer fires.
    pub fn schedule(&mut self, position: usize) -> u64 {
        self.next_token += 1;
        self.pending = Some(PendingPause {
            token: self.next_token,
            position,
        });
        trace!("scheduled pause token={} position={position}", self.next_token);
        self.next_token
    }

    /// Drop the pending pause. Returns true if there was one.
    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }

    /// Consume the pending pause if `token` is current and its entry is
    /// still active at `position`.
    pub fn fire(&mut self, token: u64, position: Option<usize>) -> bool {
        match self.pending {
            Some(p) if p.token == token && Some(p.position) == position => {
                self.pending = None;
                true
            }
            _ => {
                trace!("ignoring stale pause token={token}");
                false
            }
        }
    }

    /// Forget the debounce window and any pending pause.
    pub fn reset(&mut self) {
        self.last_processed = None;
        self.pending = None;
    }
}
