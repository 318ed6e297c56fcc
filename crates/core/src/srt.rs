//! This module is responsible for SRT parsing and writing.
//! Parsing is permissive: blocks that do not look like subtitles are dropped
//! instead of failing the whole file.

use regex::Regex;
use std::sync::OnceLock;
use tracing::{debug, trace};

/// Separator between the start and end timestamp of a block.
pub const TIME_SEPARATOR: &str = " --> ";

/// One original subtitle kept inside a merged entry so it can be restored.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedPart {
    pub index: Option<u32>,
    pub text: String,
    pub start_time: f64,
    pub end_time: f64,
}

/// A timed line of dialogue, or a merged group of lines.
#[derive(Debug, Clone, PartialEq)]
pub struct SubtitleEntry {
    /// Ordinal from the file. `None` when the index line was not a number.
    pub index: Option<u32>,
    pub start_time: f64,
    pub end_time: f64,
    pub text: String,
    pub is_merged: bool,
    /// Empty unless `is_merged` is set.
    pub merged_subtitles: Vec<MergedPart>,
}

impl SubtitleEntry {
    /// Build a plain, unmerged entry.
    pub fn new(index: Option<u32>, start_time: f64, end_time: f64, text: impl Into<String>) -> Self {
        Self {
            index,
            start_time,
            end_time,
            text: text.into(),
            is_merged: false,
            merged_subtitles: Vec::new(),
        }
    }

    /// True when `time` lies within `[start_time, end_time]`.
    pub fn contains(&self, time: f64) -> bool {
        self.start_time <= time && time <= self.end_time
    }

    /// Snapshot of this entry as a restorable part.
    pub fn as_part(&self) -> MergedPart {
        MergedPart {
            index: self.index,
            text: self.text.clone(),
            start_time: self.start_time,
            end_time: self.end_time,
        }
    }
}

impl From<MergedPart> for SubtitleEntry {
    fn from(part: MergedPart) -> Self {
        SubtitleEntry::new(part.index, part.start_time, part.end_time, part.text)
    }
}

/// Pristine copy of a parsed block, untouched by later merges and splits.
#[derive(Debug, Clone, PartialEq)]
pub struct OriginalRecord {
    pub index: Option<u32>,
    pub original_start_time: f64,
    pub original_end_time: f64,
    pub original_text: String,
    /// The time range line exactly as it appeared in the file.
    pub original_time_string: String,
    pub merged: bool,
    pub split: bool,
}

/// Result of parsing: working entries plus the parallel audit trail.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedSrt {
    pub entries: Vec<SubtitleEntry>,
    pub originals: Vec<OriginalRecord>,
}

fn block_separator() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n\n|\r\n\r\n").expect("valid block separator"))
}

fn stage_direction() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[.*?\]").expect("valid stage direction pattern"))
}

/// Parse SRT text into entries and original records.
/// Blocks with fewer than three lines, without a time range on the second
/// line, with unreadable timestamps or with no text left after cleaning are
/// skipped.
pub fn parse(input: &str) -> ParsedSrt {
    let input = input.strip_prefix('\u{FEFF}').unwrap_or(input);
    let mut parsed = ParsedSrt::default();
    for (n, block) in block_separator().split(input).enumerate() {
        let block = block.trim_matches(|c| c == '\r' || c == '\n');
        if block.is_empty() {
            continue;
        }
        let lines: Vec<&str> = block.lines().collect();
        if lines.len() < 3 || !lines[1].contains(TIME_SEPARATOR) {
            trace!("skipping block {n}: not a subtitle");
            continue;
        }
        let Some((start_time, end_time)) = parse_times(lines[1]) else {
            debug!("skipping block {n}: bad time range {:?}", lines[1]);
            continue;
        };
        let index = lines[0].trim().parse::<u32>().ok();
        let text = clean_text(&lines[2..].join(" "));
        if text.is_empty() {
            trace!("skipping block {n}: no text after cleaning");
            continue;
        }
        parsed.originals.push(OriginalRecord {
            index,
            original_start_time: start_time,
            original_end_time: end_time,
            original_text: text.clone(),
            original_time_string: lines[1].to_string(),
            merged: false,
            split: false,
        });
        parsed
            .entries
            .push(SubtitleEntry::new(index, start_time, end_time, text));
    }
    debug!("parsed {} subtitle entries", parsed.entries.len());
    parsed
}

/// Strip bracketed stage directions and musical notes, then trim.
pub fn clean_text(raw: &str) -> String {
    stage_direction()
        .replace_all(raw, "")
        .replace('♪', "")
        .trim()
        .to_string()
}

/// Format entries back to SRT text, numbering blocks from 1.
/// Merged entries are written as a single block.
pub fn format(entries: &[SubtitleEntry]) -> String {
    let mut out = String::new();
    for (i, entry) in entries.iter().enumerate() {
        out.push_str(&format!(
            "{}\n{}{}{}\n{}\n\n",
            i + 1,
            format_time(entry.start_time),
            TIME_SEPARATOR,
            format_time(entry.end_time),
            entry.text
        ));
    }
    out
}

/// Parse a time range like `00:00:01,000 --> 00:00:02,000` to seconds.
/// Start times past the end are rejected.
fn parse_times(line: &str) -> Option<(f64, f64)> {
    let mut parts = line.split(TIME_SEPARATOR);
    let start = parse_time(parts.next()?)?;
    let end = parse_time(parts.next()?)?;
    (start <= end).then_some((start, end))
}

/// Parse `HH:MM:SS,mmm` into seconds. Fields too large to add up are rejected.
fn parse_time(t: &str) -> Option<f64> {
    let parts: Vec<&str> = t.trim().split([':', ',']).collect();
    if parts.len() != 4 {
        return None;
    }
    let h: u64 = parts[0].parse().ok()?;
    let m: u64 = parts[1].parse().ok()?;
    let s: u64 = parts[2].parse().ok()?;
    let ms: u64 = parts[3].parse().ok()?;
    let whole = h
        .checked_mul(3600)?
        .checked_add(m.checked_mul(60)?)?
        .checked_add(s)?;
    Some(whole as f64 + ms as f64 / 1000.0)
}

/// Format seconds back to `HH:MM:SS,mmm`.
fn format_time(seconds: f64) -> String {
    let total = (seconds.max(0.0) * 1000.0).round() as u64;
    let h = total / 3_600_000;
    let m = (total % 3_600_000) / 60_000;
    let s = (total % 60_000) / 1000;
    let ms = total % 1000;
    format!("{h:02}:{m:02}:{s:02},{ms:03}")
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A single well-formed block yields one entry with times in seconds.
    #[test]
    fn parses_single_block() {
        let parsed = parse("1\n00:00:01,000 --> 00:00:03,500\nHello World!\n\n");
        assert_eq!(parsed.entries.len(), 1);
        let entry = &parsed.entries[0];
        assert_eq!(entry.index, Some(1));
        assert_eq!(entry.start_time, 1.0);
        assert_eq!(entry.end_time, 3.5);
        assert_eq!(entry.text, "Hello World!");
        assert!(!entry.is_merged);
        assert!(entry.merged_subtitles.is_empty());
    }

    /// Windows line endings and multi-line text are handled.
    #[test]
    fn parses_crlf_and_joins_lines() {
        let input = "1\r\n00:01:02,250 --> 00:01:04,000\r\nfirst line\r\nsecond line\r\n\r\n\
                     2\r\n01:00:00,000 --> 01:00:01,000\r\nlast\r\n";
        let parsed = parse(input);
        assert_eq!(parsed.entries.len(), 2);
        assert_eq!(parsed.entries[0].text, "first line second line");
        assert_eq!(parsed.entries[0].start_time, 62.25);
        assert_eq!(parsed.entries[1].start_time, 3600.0);
    }

    /// Stage directions and musical notes are stripped; blocks left empty are dropped.
    #[test]
    fn strips_asides_and_drops_empty() {
        let input = "1\n00:00:00,000 --> 00:00:01,000\n[door slams]\n\n\
                     2\n00:00:01,000 --> 00:00:02,000\n♪ la la ♪\n\n\
                     3\n00:00:02,000 --> 00:00:03,000\n[laughs] Okay [sighs] then\n\n";
        let parsed = parse(input);
        let texts: Vec<&str> = parsed.entries.iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, vec!["la la", "Okay  then"]);
        assert_eq!(parsed.originals.len(), 2);
    }

    /// Malformed blocks are skipped without affecting their neighbours.
    #[test]
    fn skips_malformed_blocks() {
        let input = "1\n00:00:00,000 --> 00:00:01,000\n\n\
                     2\n00:00:01,000 - 00:00:02,000\nno arrow\n\n\
                     3\n00:00:xx,000 --> 00:00:03,000\nbad time\n\n\
                     4\n00:00:05,000 --> 00:00:04,000\nbackwards\n\n\
                     5\n00:00:06,000 --> 00:00:07,000\nkept\n\n";
        let parsed = parse(input);
        assert_eq!(parsed.entries.len(), 1);
        assert_eq!(parsed.entries[0].index, Some(5));
        assert_eq!(parsed.entries[0].text, "kept");
    }

    /// Hour fields that overflow drop the block instead of panicking.
    #[test]
    fn skips_overflowing_times() {
        let input = "1\n9999999999999999999:00:00,000 --> 9999999999999999999:00:01,000\nhi\n\n\
                     2\n00:00:01,000 --> 00:00:02,000\nok\n";
        let parsed = parse(input);
        assert_eq!(parsed.entries.len(), 1);
        assert_eq!(parsed.entries[0].text, "ok");
        assert_eq!(parsed.originals.len(), 1);
    }

    /// A non-numeric index is passed through as an empty label.
    #[test]
    fn non_numeric_index_is_kept_as_none() {
        let parsed = parse("abc\n00:00:00,000 --> 00:00:01,000\nhi\n");
        assert_eq!(parsed.entries.len(), 1);
        assert_eq!(parsed.entries[0].index, None);
    }

    /// Original records mirror the parsed entries, including the raw time line.
    #[test]
    fn records_originals() {
        let input = "\u{FEFF}7\n00:00:01,000 --> 00:00:02,000\nHi\n\n\n\n8\n00:00:02,000 --> 00:00:03,000\nthere\n";
        let parsed = parse(input);
        assert_eq!(parsed.entries.len(), 2);
        let first = &parsed.originals[0];
        assert_eq!(first.index, Some(7));
        assert_eq!(first.original_text, "Hi");
        assert_eq!(first.original_time_string, "00:00:01,000 --> 00:00:02,000");
        assert!(!first.merged && !first.split);
        assert_eq!(parsed.originals[1].original_start_time, 2.0);
    }

    /// Every parsed entry has ordered times and non-empty text.
    #[test]
    fn parsed_entries_hold_invariants() {
        let input = "1\n00:00:00,000 --> 00:00:00,000\na\n\n\
                     2\n00:00:00,500 --> 00:10:00,999\n[x] b\n\n\
                     3\n00:00:00,500 --> 00:00:00,400\nc\n\n";
        for entry in parse(input).entries {
            assert!(entry.start_time <= entry.end_time);
            assert!(!entry.text.is_empty());
        }
    }

    /// Writing entries produces renumbered SRT blocks.
    #[test]
    fn formats_entries() {
        let entries = vec![
            SubtitleEntry::new(Some(4), 1.0, 3.5, "Hi there"),
            SubtitleEntry::new(None, 3661.2, 3662.0, "bye"),
        ];
        assert_eq!(
            format(&entries),
            "1\n00:00:01,000 --> 00:00:03,500\nHi there\n\n\
             2\n01:01:01,200 --> 01:01:02,000\nbye\n\n"
        );
    }
}
