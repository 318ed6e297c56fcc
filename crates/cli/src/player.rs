//! A stand-in for the video element: a media clock that runs while playing.

use std::time::Instant;

#[derive(Debug, Clone)]
pub struct VirtualPlayer {
    position: f64,
    playing: bool,
    last: Instant,
}

impl VirtualPlayer {
    pub fn new(now: Instant) -> Self {
        Self {
            position: 0.0,
            playing: false,
            last: now,
        }
    }

    /// Move the clock forward to `now` and return the playback time.
    pub fn advance(&mut self, now: Instant) -> f64 {
        if self.playing {
            self.position += now.saturating_duration_since(self.last).as_secs_f64();
        }
        self.last = now;
        self.position
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn seek(&mut self, time: f64, now: Instant) {
        self.advance(now);
        self.position = time.max(0.0);
    }

    pub fn play(&mut self, now: Instant) {
        self.advance(now);
        self.playing = true;
    }

    pub fn pause(&mut self, now: Instant) {
        self.advance(now);
        self.playing = false;
    }

    pub fn toggle(&mut self, now: Instant) {
        if self.playing {
            self.pause(now);
        } else {
            self.play(now);
        }
    }
}
