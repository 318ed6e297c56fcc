//! Core of the subtitle guessing game.
//! Parses SRT files, keeps a cursor in step with playback time, supports
//! merging and splitting neighbouring subtitles and runs the hangman puzzle
//! for the active line. Hosts drive it through [`session::Session`].

pub mod config;
pub mod puzzle;
pub mod session;
pub mod srt;
pub mod sync;
pub mod timeline;

pub use config::GameConfig;
pub use session::{Effect, Input, Outcome, Session};
pub use timeline::Direction;
