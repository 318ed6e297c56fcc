//! The game session: one owned aggregate that routes player input and
//! playback ticks through the timeline, synchronizer and puzzle.
//!
//! Nothing here talks to a video surface or a screen. Every operation returns
//! a list of [`Effect`]s for the host to apply, in order.

use crate::config::GameConfig;
use crate::puzzle::{clean_word, Guess, PuzzleEngine, PuzzleView};
use crate::srt;
use crate::sync::{locate, PlaybackSync};
use crate::timeline::{Direction, Timeline};
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Player input, already decoded from keys or commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Letter(char),
    Navigate(Direction),
    Merge,
    Split,
    /// Replay the active subtitle from its start.
    Repeat,
    Restart,
}

/// Terminal state of a word or of the whole session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Lost { word: String },
    Completed,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Outcome::Lost { word } => write!(f, "lost: word was {word}"),
            Outcome::Completed => write!(f, "completed all phrases"),
        }
    }
}

/// A state change the host must apply.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Raw text of the displayed subtitle; empty when none is shown.
    Caption(String),
    Puzzle(PuzzleView),
    Errors(u32),
    Seek(f64),
    Play,
    Pause,
    /// Pause after `after` unless superseded. Replaces any earlier schedule.
    SchedulePause { token: u64, after: Duration },
    CancelPause,
    Notice(String),
    GameOver(Outcome),
}

/// All mutable game state.
#[derive(Debug, Clone, Default)]
pub struct Session {
    config: GameConfig,
    timeline: Timeline,
    puzzle: PuzzleEngine,
    sync: PlaybackSync,
    paused_for_game: bool,
    caption: String,
}

impl Session {
    pub fn new(config: GameConfig) -> Self {
        Self {
            sync: PlaybackSync::new(config.debounce()),
            config,
            ..Self::default()
        }
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn puzzle(&self) -> &PuzzleEngine {
        &self.puzzle
    }

    pub fn is_paused_for_game(&self) -> bool {
        self.paused_for_game
    }

    /// Current puzzle markup.
    pub fn view(&self) -> PuzzleView {
        self.puzzle.view(self.config.words_per_line)
    }

    /// Replace the subtitles and start over from the first entry.
    /// Cursor, counters, flags and any pending pause are all reset.
    pub fn load(&mut self, srt_text: &str) -> Vec<Effect> {
        self.timeline = Timeline::new(srt::parse(srt_text));
        info!("loaded {} subtitles", self.timeline.len());
        self.sync.reset();
        self.paused_for_game = false;
        self.caption.clear();
        let mut effects = vec![Effect::CancelPause, Effect::Caption(String::new())];
        match self.timeline.active().cloned() {
            Some(first) => {
                self.set_puzzle(&first.text, &mut effects);
                effects.push(Effect::Seek(first.start_time));
                effects.push(Effect::Play);
            }
            None => self.set_puzzle("", &mut effects),
        }
        effects
    }

    /// Apply one player input.
    pub fn handle(&mut self, input: Input) -> Vec<Effect> {
        let mut effects = Vec::new();
        match input {
            Input::Letter(c) => self.guess(c, &mut effects),
            Input::Navigate(direction) => {
                if self.timeline.navigate(direction) {
                    self.cancel_pause(&mut effects);
                    self.show_active(&mut effects);
                }
            }
            Input::Merge => {
                if self.timeline.merge_with_next() {
                    self.cancel_pause(&mut effects);
                    self.show_active(&mut effects);
                }
            }
            Input::Split => match self.timeline.split_current() {
                Ok(()) => {
                    self.cancel_pause(&mut effects);
                    self.show_active(&mut effects);
                }
                Err(err) => {
                    debug!("split rejected: {err}");
                    effects.push(Effect::Notice(err.to_string()));
                }
            },
            Input::Repeat => self.repeat(&mut effects),
            Input::Restart => return self.restart(),
        }
        effects
    }

    /// Process a playback-time signal.
    pub fn tick(&mut self, time: f64, now: Instant) -> Vec<Effect> {
        if !self.sync.accept(now) {
            return Vec::new();
        }
        let mut effects = Vec::new();
        let located = locate(&mut self.timeline, time);
        if located.advanced > 0 {
            self.paused_for_game = false;
        }
        let displayed = located
            .displayed
            .and_then(|i| self.timeline.entries().get(i).map(|e| (i, e.clone())));

        let caption = displayed
            .as_ref()
            .map(|(_, e)| e.text.clone())
            .unwrap_or_default();
        if caption != self.caption {
            self.caption = caption.clone();
            effects.push(Effect::Caption(caption));
        }

        if let Some((position, entry)) = displayed {
            if clean_word(&entry.text) != self.puzzle.word() {
                self.set_puzzle(&entry.text, &mut effects);
            }
            if !self.paused_for_game {
                let token = self.sync.schedule(position);
                let after = Duration::try_from_secs_f64((entry.end_time - time).max(0.0))
                    .unwrap_or(Duration::MAX);
                effects.push(Effect::SchedulePause { token, after });
            }
        }
        effects
    }

    /// Called by the host when a scheduled pause elapses.
    /// Stale or cancelled tokens are ignored.
    pub fn pause_fired(&mut self, token: u64) -> Vec<Effect> {
        if self.sync.fire(token, self.timeline.current_index()) {
            self.paused_for_game = true;
            vec![Effect::Pause]
        } else {
            Vec::new()
        }
    }

    /// Start again from the first subtitle with a clean puzzle.
    pub fn restart(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        self.paused_for_game = false;
        self.cancel_pause(&mut effects);
        self.timeline.rewind();
        match self.timeline.active().cloned() {
            Some(first) => {
                self.set_puzzle(&first.text, &mut effects);
                effects.push(Effect::Seek(first.start_time));
            }
            None => self.set_puzzle("", &mut effects),
        }
        effects.push(Effect::Play);
        effects
    }

    /// Rebuild the puzzle for the active entry, or the first one when
    /// nothing is active. Playback is left alone.
    pub fn reset_puzzle(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        if self.timeline.active().is_none() {
            self.timeline.rewind();
        }
        let text = self
            .timeline
            .active()
            .map(|e| e.text.clone())
            .unwrap_or_default();
        self.set_puzzle(&text, &mut effects);
        effects
    }

    fn guess(&mut self, letter: char, effects: &mut Vec<Effect>) {
        if !letter.is_ascii_alphabetic() {
            return;
        }
        match self.puzzle.submit_letter(letter.to_ascii_lowercase()) {
            Guess::Ignored => {}
            Guess::Correct => effects.push(Effect::Puzzle(self.view())),
            Guess::Wrong { errors } => effects.push(Effect::Errors(errors)),
            Guess::Lost => {
                effects.push(Effect::Errors(self.puzzle.errors()));
                effects.push(Effect::GameOver(Outcome::Lost {
                    word: self.puzzle.word().to_string(),
                }));
                effects.push(Effect::Pause);
            }
            Guess::Solved => {
                effects.push(Effect::Puzzle(self.view()));
                self.advance_after_win(effects);
            }
        }
    }

    fn advance_after_win(&mut self, effects: &mut Vec<Effect>) {
        self.cancel_pause(effects);
        match self.timeline.advance().cloned() {
            Some(next) => {
                debug!("advancing to next subtitle at {}", next.start_time);
                self.paused_for_game = false;
                self.set_puzzle(&next.text, effects);
                effects.push(Effect::Seek(next.start_time));
                effects.push(Effect::Play);
            }
            None => {
                info!("all subtitles completed");
                effects.push(Effect::GameOver(Outcome::Completed));
                effects.push(Effect::Pause);
            }
        }
    }

    fn repeat(&mut self, effects: &mut Vec<Effect>) {
        let Some(start) = self.timeline.active().map(|e| e.start_time) else {
            return;
        };
        self.paused_for_game = false;
        self.cancel_pause(effects);
        effects.push(Effect::Seek(start));
        effects.push(Effect::Play);
        effects.push(Effect::Notice("repeating current segment".to_string()));
    }

    /// Show the active entry after the cursor or structure changed.
    /// A video paused for the game stays paused.
    fn show_active(&mut self, effects: &mut Vec<Effect>) {
        let Some(entry) = self.timeline.active().cloned() else {
            return;
        };
        self.set_puzzle(&entry.text, effects);
        effects.push(Effect::Seek(entry.start_time));
        if !self.paused_for_game {
            effects.push(Effect::Play);
        }
    }

    fn set_puzzle(&mut self, text: &str, effects: &mut Vec<Effect>) {
        self.puzzle = PuzzleEngine::new(text);
        effects.push(Effect::Puzzle(self.view()));
        effects.push(Effect::Errors(0));
    }

    fn cancel_pause(&mut self, effects: &mut Vec<Effect>) {
        if self.sync.cancel() {
            effects.push(Effect::CancelPause);
        }
    }
}
