//! Terminal host: applies session effects to the virtual player and stdout.

use crate::commands::{Command, HELP};
use crate::player::VirtualPlayer;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use std::time::Instant;
use subguess_core::{srt, Effect, Session};
use tracing::{debug, info, warn};

/// A pause the session asked for, keyed by its token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingPause {
    pub token: u64,
    pub deadline: Instant,
}

pub struct App {
    pub session: Session,
    pub player: VirtualPlayer,
    pub pending: Option<PendingPause>,
}

impl App {
    pub fn new(session: Session, now: Instant) -> Self {
        Self {
            session,
            player: VirtualPlayer::new(now),
            pending: None,
        }
    }

    /// Read an SRT file and start a fresh session on it.
    pub fn load(&mut self, path: &Path, now: Instant) -> Result<()> {
        info!("reading subtitles from {}", path.display());
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read subtitles: {}", path.display()))?;
        let effects = self.session.load(&text);
        if self.session.timeline().is_empty() {
            warn!("no subtitles found in {}", path.display());
        }
        self.apply(effects, now);
        Ok(())
    }

    /// Feed the current playback time to the session.
    pub fn on_tick(&mut self, now: Instant) {
        let time = self.player.advance(now);
        let effects = self.session.tick(time, now);
        self.apply(effects, now);
    }

    /// Fire the pending pause once its deadline passed.
    pub fn on_pause_deadline(&mut self, now: Instant) {
        if let Some(p) = self.pending.take() {
            let effects = self.session.pause_fired(p.token);
            self.apply(effects, now);
        }
    }

    /// Run one command. Returns false when the player asked to quit.
    pub fn on_command(&mut self, command: Command, now: Instant) -> Result<bool> {
        match command {
            Command::Game(input) => {
                let effects = self.session.handle(input);
                self.apply(effects, now);
            }
            Command::TogglePlayback => {
                self.player.toggle(now);
                let state = if self.player.is_playing() { "playing" } else { "paused" };
                println!("[{state} at {:.1}s]", self.player.position());
            }
            Command::Load(path) => self.load(&path, now)?,
            Command::Save(path) => {
                let out = srt::format(self.session.timeline().entries());
                fs::write(&path, out)
                    .with_context(|| format!("failed to write {}", path.display()))?;
                println!("saved {} subtitles to {}", self.session.timeline().len(), path.display());
            }
            Command::Help => println!("{HELP}"),
            Command::Quit => return Ok(false),
        }
        Ok(true)
    }

    fn apply(&mut self, effects: Vec<Effect>, now: Instant) {
        for effect in effects {
            debug!("effect {:?}", effect);
            match effect {
                Effect::Caption(text) if text.is_empty() => {}
                Effect::Caption(text) => println!("» {text}"),
                Effect::Puzzle(view) => println!("{view}"),
                Effect::Errors(0) => {}
                Effect::Errors(n) => println!("errors: {n}"),
                Effect::Seek(time) => self.player.seek(time, now),
                Effect::Play => self.player.play(now),
                Effect::Pause => self.player.pause(now),
                Effect::SchedulePause { token, after } => {
                    self.pending = Some(PendingPause {
                        token,
                        deadline: now + after,
                    });
                }
                Effect::CancelPause => self.pending = None,
                Effect::Notice(msg) => println!("({msg})"),
                Effect::GameOver(outcome) => println!("*** {outcome} ***"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use subguess_core::{GameConfig, Input};
    use tempfile::tempdir;

    const SRT: &str = "1\n00:00:01,000 --> 00:00:02,000\nHi\n\n\
                       2\n00:00:03,000 --> 00:00:04,000\nthere\n\n";

    fn app_with_file() -> (App, tempfile::TempDir, Instant) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("subs.srt");
        fs::write(&path, SRT).unwrap();
        let now = Instant::now();
        let mut app = App::new(Session::new(GameConfig::default()), now);
        app.load(&path, now).unwrap();
        (app, dir, now)
    }

    /// Loading seeks to the first subtitle and starts playing.
    #[test]
    fn load_starts_playback() {
        let (app, _dir, _) = app_with_file();
        assert!(app.player.is_playing());
        assert_eq!(app.player.position(), 1.0);
    }

    /// A tick inside a subtitle schedules the end-of-line pause, which then pauses.
    #[test]
    fn pauses_at_subtitle_end() {
        let (mut app, _dir, now) = app_with_file();
        let later = now + Duration::from_millis(500);
        app.on_tick(later);
        let pending = app.pending.unwrap();
        assert_eq!(pending.deadline, later + Duration::from_millis(500));
        app.on_pause_deadline(pending.deadline);
        assert!(!app.player.is_playing());
        assert!(app.session.is_paused_for_game());
    }

    /// Solving a line jumps the player to the next one.
    #[test]
    fn solving_seeks_forward() {
        let (mut app, _dir, now) = app_with_file();
        for c in ['h', 'i'] {
            app.on_command(Command::Game(Input::Letter(c)), now).unwrap();
        }
        assert_eq!(app.player.position(), 3.0);
    }

    /// Saving writes the edited timeline.
    #[test]
    fn saves_merged_timeline() {
        let (mut app, dir, now) = app_with_file();
        app.on_command(Command::Game(Input::Merge), now).unwrap();
        let out = dir.path().join("out.srt");
        assert!(app.on_command(Command::Save(out.clone()), now).unwrap());
        let saved = fs::read_to_string(out).unwrap();
        assert_eq!(saved, "1\n00:00:01,000 --> 00:00:04,000\nHi there\n\n");
        assert!(!app.on_command(Command::Quit, now).unwrap());
    }

    /// Loading a missing file is an error and leaves the session alone.
    #[test]
    fn missing_file_errors() {
        let (mut app, dir, now) = app_with_file();
        let res = app.on_command(Command::Load(dir.path().join("nope.srt")), now);
        assert!(res.is_err());
        assert_eq!(app.session.timeline().len(), 2);
    }
}
