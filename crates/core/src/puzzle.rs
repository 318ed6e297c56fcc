//! Hangman state for the active subtitle.
//! Letters must be guessed in order; spaces are revealed automatically.

use std::fmt;
use tracing::{debug, trace};

/// Number of wrong guesses that loses the current word.
pub const MAX_ERRORS: u32 = 6;

/// Default number of words shown per line of the puzzle markup.
pub const DEFAULT_WORDS_PER_LINE: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PuzzleStatus {
    Playing,
    Won,
    Lost,
}

/// What a submitted letter did to the puzzle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guess {
    /// The puzzle is finished or has nothing left to guess.
    Ignored,
    Correct,
    /// The letter revealed the last hidden position.
    Solved,
    Wrong { errors: u32 },
    /// The error threshold was reached.
    Lost,
}

/// One position of the rendered puzzle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Revealed(char),
    Hidden,
    Space,
    LineBreak,
}

/// Display data for the puzzle: reveal markup plus the error count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PuzzleView {
    pub cells: Vec<Cell>,
    pub errors: u32,
}

impl fmt::Display for PuzzleView {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for cell in &self.cells {
            match cell {
                Cell::Revealed(c) => write!(f, "{c}")?,
                Cell::Hidden => write!(f, "_")?,
                Cell::Space => write!(f, "  ")?,
                Cell::LineBreak => writeln!(f)?,
            }
        }
        Ok(())
    }
}

/// Reduce subtitle text to lowercase ASCII letters and spaces.
pub fn clean_word(text: &str) -> String {
    text.trim()
        .to_lowercase()
        .chars()
        .filter_map(|c| {
            if c.is_ascii_lowercase() {
                Some(c)
            } else if c.is_whitespace() {
                Some(' ')
            } else {
                None
            }
        })
        .collect()
}

/// Guessing state for a single word.
#[derive(Debug, Clone)]
pub struct PuzzleEngine {
    word: String,
    guessed: Vec<bool>,
    current_letter_index: usize,
    errors: u32,
    status: PuzzleStatus,
}

impl Default for PuzzleEngine {
    fn default() -> Self {
        Self::new("")
    }
}

impl PuzzleEngine {
    /// Derive a fresh puzzle from subtitle text.
    pub fn new(text: &str) -> Self {
        let word = clean_word(text);
        trace!("new puzzle word={word:?}");
        Self {
            guessed: vec![false; word.len()],
            word,
            current_letter_index: 0,
            errors: 0,
            status: PuzzleStatus::Playing,
        }
    }

    pub fn word(&self) -> &str {
        &self.word
    }

    pub fn guessed(&self) -> &[bool] {
        &self.guessed
    }

    pub fn current_letter_index(&self) -> usize {
        self.current_letter_index
    }

    pub fn errors(&self) -> u32 {
        self.errors
    }

    pub fn status(&self) -> PuzzleStatus {
        self.status
    }

    /// Check `letter` against the next hidden position.
    pub fn submit_letter(&mut self, letter: char) -> Guess {
        if self.status != PuzzleStatus::Playing {
            return Guess::Ignored;
        }
        self.skip_spaces();
        let Some(&expected) = self.word.as_bytes().get(self.current_letter_index) else {
            return Guess::Ignored;
        };
        if letter.to_ascii_lowercase() == expected as char {
            self.guessed[self.current_letter_index] = true;
            self.current_letter_index += 1;
            if self.check_win() {
                debug!("word {:?} solved with {} errors", self.word, self.errors);
                self.status = PuzzleStatus::Won;
                Guess::Solved
            } else {
                Guess::Correct
            }
        } else {
            self.errors += 1;
            if self.errors >= MAX_ERRORS {
                debug!("word {:?} lost", self.word);
                self.status = PuzzleStatus::Lost;
                Guess::Lost
            } else {
                Guess::Wrong {
                    errors: self.errors,
                }
            }
        }
    }

    /// Reveal any run of spaces at the current position.
    fn skip_spaces(&mut self) {
        let bytes = self.word.as_bytes();
        while self.current_letter_index < bytes.len() && bytes[self.current_letter_index] == b' ' {
            self.guessed[self.current_letter_index] = true;
            self.current_letter_index += 1;
        }
    }

    fn check_win(&mut self) -> bool {
        self.skip_spaces();
        self.guessed.iter().all(|&g| g)
    }

    /// Render the reveal markup, breaking the line every `words_per_line` words.
    pub fn view(&self, words_per_line: usize) -> PuzzleView {
        let mut cells = Vec::with_capacity(self.word.len());
        let mut word_count = 0;
        for (c, &guessed) in self.word.chars().zip(&self.guessed) {
            if c == ' ' {
                cells.push(Cell::Space);
                word_count += 1;
                if words_per_line > 0 && word_count % words_per_line == 0 {
                    cells.push(Cell::LineBreak);
                }
            } else if guessed {
                cells.push(Cell::Revealed(c));
            } else {
                cells.push(Cell::Hidden);
            }
        }
        PuzzleView {
            cells,
            errors: self.errors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Punctuation, digits and case are removed from the guessing target.
    #[test]
    fn cleans_words() {
        assert_eq!(clean_word("  Hello, World! "), "hello world");
        assert_eq!(clean_word("It's 5 o'clock"), "its  oclock");
        assert_eq!(clean_word("Café-au-lait"), "cafaulait");
    }

    /// Guessing "h" then "i" on "hi" solves the word.
    #[test]
    fn solves_short_word() {
        let mut p = PuzzleEngine::new("Hi!");
        assert_eq!(p.submit_letter('h'), Guess::Correct);
        assert_eq!(p.submit_letter('i'), Guess::Solved);
        assert_eq!(p.status(), PuzzleStatus::Won);
        assert_eq!(p.errors(), 0);
    }

    /// Spaces are skipped, including trailing and repeated ones.
    #[test]
    fn spaces_need_no_guess() {
        let mut p = PuzzleEngine::new("a  b -");
        assert_eq!(p.word(), "a  b ");
        assert_eq!(p.submit_letter('a'), Guess::Correct);
        assert_eq!(p.submit_letter('b'), Guess::Solved);
        assert!(p.guessed().iter().all(|&g| g));
    }

    /// Feeding every letter in order wins without touching the error count.
    #[test]
    fn errors_unchanged_by_correct_sequence() {
        let mut p = PuzzleEngine::new("the quick brown fox");
        p.submit_letter('z');
        p.submit_letter('z');
        let letters: Vec<char> = p.word().chars().filter(|c| *c != ' ').collect();
        let mut last = Guess::Ignored;
        for c in letters {
            last = p.submit_letter(c);
        }
        assert_eq!(last, Guess::Solved);
        assert_eq!(p.errors(), 2);
    }

    /// Six wrong guesses lose the word, which is kept intact for display.
    #[test]
    fn six_errors_lose() {
        let mut p = PuzzleEngine::new("Good night");
        for n in 1..MAX_ERRORS {
            assert_eq!(p.submit_letter('x'), Guess::Wrong { errors: n });
        }
        assert_eq!(p.submit_letter('x'), Guess::Lost);
        assert_eq!(p.status(), PuzzleStatus::Lost);
        assert_eq!(p.word(), "good night");
        assert_eq!(p.submit_letter('g'), Guess::Ignored);
    }

    /// Wrong guesses do not move the letter position.
    #[test]
    fn wrong_guess_keeps_position() {
        let mut p = PuzzleEngine::new("ab");
        p.submit_letter('a');
        p.submit_letter('c');
        assert_eq!(p.current_letter_index(), 1);
        assert_eq!(p.submit_letter('B'), Guess::Solved);
    }

    /// A word with no letters ignores input.
    #[test]
    fn empty_word_ignores_input() {
        let mut p = PuzzleEngine::new("123 !");
        assert_eq!(p.word(), " ");
        assert_eq!(p.submit_letter('a'), Guess::Ignored);
        assert_eq!(p.errors(), 0);
    }

    /// The markup hides unrevealed letters and breaks lines every few words.
    #[test]
    fn renders_markup() {
        let mut p = PuzzleEngine::new("a b c d e");
        p.submit_letter('a');
        let view = p.view(2);
        assert_eq!(view.to_string(), "a  _  \n_  _  \n_");
        assert_eq!(view.errors, 0);
        assert_eq!(view.cells[0], Cell::Revealed('a'));
        assert_eq!(view.cells[1], Cell::Space);
    }
}
