//! Decoding of typed lines into game commands.

use std::path::PathBuf;
use subguess_core::{Direction, Input};

/// One thing the player asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Game(Input),
    TogglePlayback,
    Load(PathBuf),
    Save(PathBuf),
    Help,
    Quit,
}

pub const HELP: &str = "\
letters   guess the next letters of the subtitle
<  >      previous / next subtitle
+         merge with the next subtitle
-         split a merged subtitle
.         repeat the current subtitle
!         restart from the first subtitle
(empty)   play / pause
:load F   load another SRT file
:w F      save the edited subtitles to F
:q        quit";

/// Parse one input line.
/// Whole-line commands start with `:`; anything else is read key by key.
pub fn parse_line(line: &str) -> Vec<Command> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return vec![Command::TogglePlayback];
    }
    if let Some(rest) = trimmed.strip_prefix(':') {
        let (name, arg) = rest
            .split_once(char::is_whitespace)
            .map(|(n, a)| (n, a.trim()))
            .unwrap_or((rest, ""));
        return match (name, arg) {
            ("q" | "quit", _) => vec![Command::Quit],
            ("w" | "save", path) if !path.is_empty() => vec![Command::Save(path.into())],
            ("load", path) if !path.is_empty() => vec![Command::Load(path.into())],
            _ => vec![Command::Help],
        };
    }
    if trimmed == "?" {
        return vec![Command::Help];
    }
    trimmed.chars().filter_map(key).collect()
}

fn key(c: char) -> Option<Command> {
    let input = match c {
        '<' => Input::Navigate(Direction::Previous),
        '>' => Input::Navigate(Direction::Next),
        '+' => Input::Merge,
        '-' => Input::Split,
        '.' => Input::Repeat,
        '!' => Input::Restart,
        c if c.is_ascii_alphabetic() => Input::Letter(c.to_ascii_lowercase()),
        _ => return None,
    };
    Some(Command::Game(input))
}
