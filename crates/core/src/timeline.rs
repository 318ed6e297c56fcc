//! Ordered subtitle entries with a cursor on the active one.
//! Structural edits are limited to merging the active entry with its
//! successor and splitting a merged entry back into its parts.

use crate::srt::{OriginalRecord, ParsedSrt, SubtitleEntry};
use std::fmt;
use tracing::{debug, trace};

/// Direction of a navigation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Previous,
    Next,
}

impl Direction {
    fn offset(self) -> isize {
        match self {
            Direction::Previous => -1,
            Direction::Next => 1,
        }
    }
}

/// Rejected structural edit. State is left unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    NoActiveEntry,
    NotMerged,
}

impl std::error::Error for EditError {}

impl fmt::Display for EditError {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EditError::NoActiveEntry => write!(fmt, "no subtitle is active"),
            EditError::NotMerged => {
                write!(fmt, "this subtitle was not merged or is already split")
            }
        }
    }
}

/// The subtitle sequence and its cursor.
///
/// The cursor is a position in `0..=len`. `len` means playback ran past the
/// last entry and nothing is active.
#[derive(Debug, Clone, Default)]
pub struct Timeline {
    entries: Vec<SubtitleEntry>,
    originals: Vec<OriginalRecord>,
    cursor: usize,
}

impl Timeline {
    /// Build a timeline from parser output with the cursor on the first entry.
    pub fn new(parsed: ParsedSrt) -> Self {
        Self {
            entries: parsed.entries,
            originals: parsed.originals,
            cursor: 0,
        }
    }

    /// Build a timeline from bare entries, without original records.
    pub fn from_entries(entries: Vec<SubtitleEntry>) -> Self {
        Self {
            entries,
            originals: Vec::new(),
            cursor: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[SubtitleEntry] {
        &self.entries
    }

    /// Records of the file as parsed, independent of edits.
    pub fn originals(&self) -> &[OriginalRecord] {
        &self.originals
    }

    /// Cursor position, or `None` for an empty timeline.
    /// May equal `len()` once playback has passed every entry.
    pub fn current_index(&self) -> Option<usize> {
        (!self.is_empty()).then_some(self.cursor)
    }

    /// The entry under the cursor, if any.
    pub fn active(&self) -> Option<&SubtitleEntry> {
        self.entries.get(self.cursor)
    }

    /// Put the cursor back on the first entry.
    pub fn rewind(&mut self) {
        self.cursor = 0;
    }

    /// Move the cursor one step forward, saturating one past the last entry.
    /// Returns the new active entry.
    pub fn advance(&mut self) -> Option<&SubtitleEntry> {
        if self.cursor < self.entries.len() {
            self.cursor += 1;
        }
        self.active()
    }

    /// Advance while the active entry ended strictly before `time`.
    /// Returns how many entries were passed.
    pub fn advance_past(&mut self, time: f64) -> usize {
        let mut passed = 0;
        while self
            .entries
            .get(self.cursor)
            .map_or(false, |e| e.end_time < time)
        {
            self.cursor += 1;
            passed += 1;
        }
        if passed > 0 {
            trace!("advance_past time={time} passed={passed} cursor={}", self.cursor);
        }
        passed
    }

    /// Move the cursor one step, clamped to the valid range.
    /// Returns true only if the cursor actually moved.
    pub fn navigate(&mut self, direction: Direction) -> bool {
        if self.entries.is_empty() {
            return false;
        }
        let last = self.entries.len() - 1;
        let target = (self.cursor as isize + direction.offset()).clamp(0, last as isize) as usize;
        if target == self.cursor {
            return false;
        }
        debug!("navigate {:?}: {} -> {}", direction, self.cursor, target);
        self.cursor = target;
        true
    }

    /// Fold the next entry into the active one.
    /// Returns false when there is no next entry to merge.
    pub fn merge_with_next(&mut self) -> bool {
        if self.cursor + 1 >= self.entries.len() {
            return false;
        }
        let next = self.entries.remove(self.cursor + 1);
        let current = &mut self.entries[self.cursor];
        if current.is_merged {
            current.merged_subtitles.push(next.as_part());
        } else {
            current.merged_subtitles = vec![current.as_part(), next.as_part()];
            current.is_merged = true;
        }
        current.text = format!("{} {}", current.text, next.text);
        current.end_time = next.end_time;
        debug!(
            "merged entry at {} now spans {} parts",
            self.cursor,
            current.merged_subtitles.len()
        );
        true
    }

    /// Replace the active merged entry with the entries it was built from.
    pub fn split_current(&mut self) -> Result<(), EditError> {
        let current = self
            .entries
            .get(self.cursor)
            .ok_or(EditError::NoActiveEntry)?;
        if !current.is_merged || current.merged_subtitles.len() < 2 {
            return Err(EditError::NotMerged);
        }
        let parts = current.merged_subtitles.clone();
        let count = parts.len();
        self.entries.splice(
            self.cursor..=self.cursor,
            parts.into_iter().map(SubtitleEntry::from),
        );
        self.cursor = self.cursor.min(self.entries.len() - 1);
        debug!("split entry at {} into {count} parts", self.cursor);
        Ok(())
    }
}
