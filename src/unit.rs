use std::hash::Hash;

use chrono::NaiveTime;

use crate::engine::{Diff, DiffOptions};
use crate::errors::Error;

/// The alphabet a diff runs over.
///
/// The engine itself only ever compares units for equality; everything it
/// needs beyond that lives here. Two alphabets are wired up: `char` for
/// character-level diffs and `u32` for token ids produced by the tokenizer.
/// The `bisect_split` hook exists because the two levels recurse into
/// different entry points once the Myers walk finds the middle snake.
pub trait Unit: Copy + Ord + Eq + Hash {
    fn bisect_split(
        options: &DiffOptions,
        old: &[Self],
        new: &[Self],
        x: usize,
        y: usize,
        deadline: Option<NaiveTime>,
    ) -> Result<Vec<Diff<Self>>, Error>;

    /// The unit as a character, if it denotes one. Token ids return `None`,
    /// which makes every token boundary score as a perfect break.
    fn as_char(self) -> Option<char>;

    fn ends_with_blank_line(data: &[Self]) -> bool;
    fn starts_with_blank_line(data: &[Self]) -> bool;
}

impl Unit for char {
    fn bisect_split(
        options: &DiffOptions,
        old: &[char],
        new: &[char],
        x: usize,
        y: usize,
        deadline: Option<NaiveTime>,
    ) -> Result<Vec<Diff<char>>, Error> {
        // Diff the halves on either side of the snake and stitch them up.
        let mut diffs = options.diff_internal(&old[..x], &new[..y], false, deadline)?;
        diffs.append(&mut options.diff_internal(&old[x..], &new[y..], false, deadline)?);

        Ok(diffs)
    }

    fn as_char(self) -> Option<char> {
        Some(self)
    }

    fn ends_with_blank_line(data: &[char]) -> bool {
        data.ends_with(&['\n', '\n']) || data.ends_with(&['\n', '\r', '\n'])
    }

    fn starts_with_blank_line(data: &[char]) -> bool {
        data.starts_with(&['\r', '\n', '\n'])
            || data.starts_with(&['\r', '\n', '\r', '\n'])
            || data.starts_with(&['\n', '\r', '\n'])
            || data.starts_with(&['\n', '\n'])
    }
}

impl Unit for u32 {
    fn bisect_split(
        options: &DiffOptions,
        old: &[u32],
        new: &[u32],
        x: usize,
        y: usize,
        deadline: Option<NaiveTime>,
    ) -> Result<Vec<Diff<u32>>, Error> {
        let mut diffs = options.diff_tokens(&old[..x], &new[..y], deadline)?;
        diffs.append(&mut options.diff_tokens(&old[x..], &new[y..], deadline)?);

        Ok(diffs)
    }

    fn as_char(self) -> Option<char> {
        None
    }

    fn ends_with_blank_line(_: &[u32]) -> bool {
        false
    }

    fn starts_with_blank_line(_: &[u32]) -> bool {
        false
    }
}
