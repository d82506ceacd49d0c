//! The Myers diff core and its cleanup passes.

use std::fmt::Display;

use chrono::{NaiveTime, TimeDelta, Utc};
use serde_repr::{Deserialize_repr, Serialize_repr};

use crate::errors::Error;
use crate::tokens::{self, TokenMode};
use crate::unit::Unit;

/// Enum representing the different ops of diff
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize_repr, Deserialize_repr)]
#[repr(i8)]
pub enum Ops {
    Delete = -1,
    Insert,
    Equal,
}

/// A structure representing a single contiguous edit
/// (Ops::Delete, "Hello") means delete `Hello`
/// (Ops::Insert, "Goodbye") means add `Goodbye`
/// (Ops::Equal, "World") means keep `World`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diff<T: Unit>(pub(crate) Ops, pub(crate) Vec<T>);

impl Display for Diff<char> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:?}, {})", self.op(), self.text())
    }
}

impl<T: Unit> Diff<T> {
    /// Create a new diff object
    pub fn new(op: Ops, data: &[T]) -> Self {
        Self(op, data.to_vec())
    }

    /// helper functions to create ops
    pub fn delete(data: &[T]) -> Self {
        Self::new(Ops::Delete, data)
    }

    pub fn insert(data: &[T]) -> Self {
        Self::new(Ops::Insert, data)
    }

    pub fn equal(data: &[T]) -> Self {
        Self::new(Ops::Equal, data)
    }

    // returns the operation of the current diff
    pub fn op(&self) -> Ops {
        self.0
    }

    // returns the inner data
    pub fn data(&self) -> &[T] {
        &self.1[..]
    }

    // returns length of data
    pub fn size(&self) -> usize {
        self.1.len()
    }
}

impl Diff<char> {
    /// The affected text as an owned string.
    pub fn text(&self) -> String {
        self.1.iter().collect()
    }
}

/// Per-call configuration of the diff engine.
///
/// There is no global state: build an options value, tweak it, and every
/// `diff` call made through it is independent of any other caller.
#[derive(Debug, Clone)]
pub struct DiffOptions {
    /// a speedup flag, If false, don't run a line-level diff first to
    /// identify the changed areas. Defaults to true, which does a faster,
    /// slightly less optimal diff.
    checklines: bool,
    /// A default timeout in num milliseconds, defaults to 1000 (1 second).
    /// `None` means no deadline at all.
    timeout: Option<u32>,
    /// Whether the half-match speedup may be used. A half-match can return a
    /// suboptimal diff, so switch it off when optimality matters more than
    /// time. Defaults to true.
    half_match: bool,
    // Cost of an empty edit operation in terms of edit characters. Defaults to 4
    edit_cost: usize,
    /// Inputs shorter than this skip the line-level pass. Defaults to 100.
    line_mode_threshold: usize,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            checklines: true,
            timeout: Some(1000),
            half_match: true,
            edit_cost: 4,
            line_mode_threshold: 100,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
struct HalfMatch<'a, T: Unit> {
    prefix_long: &'a [T],
    suffix_long: &'a [T],
    prefix_short: &'a [T],
    suffix_short: &'a [T],
    common: &'a [T],
}

impl DiffOptions {
    /// Create a new instance of the struct with default settings
    ///
    /// # Example
    /// ```
    /// use redelta::{apply_new, DiffOptions, Error};
    ///
    /// # fn main() -> Result<(), Error> {
    /// let mut options = DiffOptions::new();
    /// // e.g. disable the line-level pass because the texts are short
    /// options.set_checklines(false);
    /// let diffs = options.diff("Fast enough", "Blazing fast")?;
    /// assert_eq!("Blazing fast", apply_new(&diffs));
    /// # Ok(())
    /// # }
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    fn checklines(&self) -> bool {
        self.checklines
    }

    /// Enables or disables the line-level pass.
    /// When enabled, the diff algorithm first finds the `lines` that changed
    /// and only re-diffs those areas character by character.
    ///
    /// This optimization makes sense for text with many lines (~100s), defaults to `true`
    pub fn set_checklines(&mut self, checklines: bool) {
        self.checklines = checklines;
    }

    // returns the configured timeout, `None` means no deadline
    fn timeout(&self) -> Option<i64> {
        self.timeout.map(|t| t as i64)
    }

    /// Set a timeout in number of `milliseconds`. This creates a cutoff for
    /// the internal `recursive` calls: past it the engine settles for the
    /// coarse `[Delete, Insert]` answer it has.
    ///
    /// Defaults to `1000ms` (1 second), `None` means unlimited time
    pub fn set_timeout(&mut self, timeout: Option<u32>) {
        self.timeout = timeout;
    }

    /// Enables or disables the half-match speedup independently of the
    /// timeout. A half-match split can produce a non-minimal diff.
    pub fn set_half_match(&mut self, half_match: bool) {
        self.half_match = half_match;
    }

    // returns the current edit cost saved
    fn edit_cost(&self) -> usize {
        self.edit_cost
    }

    /// Update edit cost, the threshold under which short equalities are
    /// dissolved into the surrounding edits
    pub fn set_edit_cost(&mut self, edit_cost: usize) {
        self.edit_cost = edit_cost;
    }

    /// Inputs must be longer than this on both sides before the line-level
    /// pass kicks in
    pub fn set_line_mode_threshold(&mut self, threshold: usize) {
        self.line_mode_threshold = threshold;
    }

    /// creates a deadline from the given timeout
    pub fn deadline(&self) -> Option<NaiveTime> {
        self.timeout()
            .and_then(|t| Utc::now().checked_add_signed(TimeDelta::milliseconds(t)))
            .map(|t| t.time())
    }

    /// Find the differences between two texts.
    ///
    /// The returned edit list is normalized: no adjacent diffs share an op,
    /// no diff is empty, the non-inserted parts concatenate to `old` and the
    /// non-deleted parts to `new`.
    ///
    /// # Example
    /// ```
    /// use redelta::{DiffOptions, Error, Ops};
    ///
    /// # fn main() -> Result<(), Error> {
    /// let options = DiffOptions::new();
    /// let diffs = options.diff("abcxyz", "abcdxyz")?;
    ///
    /// let rendered = diffs.iter().map(|d| (d.op(), d.text())).collect::<Vec<_>>();
    /// assert_eq!(
    ///     vec![
    ///         (Ops::Equal, "abc".to_string()),
    ///         (Ops::Insert, "d".to_string()),
    ///         (Ops::Equal, "xyz".to_string()),
    ///     ],
    ///     rendered
    /// );
    /// # Ok(())
    /// # }
    /// ```
    pub fn diff(&self, old: &str, new: &str) -> Result<Vec<Diff<char>>, Error> {
        let old = old.chars().collect::<Vec<_>>();
        let new = new.chars().collect::<Vec<_>>();

        let mut diffs = self.diff_internal(&old, &new, self.checklines(), self.deadline())?;
        if diffs.len() > 2 {
            Self::cleanup_semantic(&mut diffs);
            self.cleanup_efficiency(&mut diffs);
        }

        Ok(diffs)
    }

    /// Word-granularity diff: tokenize both texts into whitespace and
    /// non-whitespace runs, diff the token streams, then re-diff the
    /// replaced runs character by character.
    pub fn word_diff(&self, old: &str, new: &str) -> Result<Vec<Diff<char>>, Error> {
        let old = old.chars().collect::<Vec<_>>();
        let new = new.chars().collect::<Vec<_>>();
        let deadline = self.deadline();

        let tokenized = tokens::tokenize(&old, &new, TokenMode::Words);
        let token_diffs =
            self.diff_tokens(&tokenized.old_ids, &tokenized.new_ids, deadline)?;
        let mut diffs = tokens::expand(&token_diffs, &tokenized.tokens);

        Self::cleanup_semantic(&mut diffs);
        let mut diffs = self.rediff_chars(diffs, deadline)?;

        Self::cleanup_merge(&mut diffs);
        if diffs.len() > 2 {
            Self::cleanup_semantic(&mut diffs);
            self.cleanup_efficiency(&mut diffs);
        }

        Ok(diffs)
    }

    pub(crate) fn diff_internal(
        &self,
        old: &[char],
        new: &[char],
        linemode: bool,
        deadline: Option<NaiveTime>,
    ) -> Result<Vec<Diff<char>>, Error> {
        if old == new {
            if old.is_empty() {
                return Ok(Vec::new());
            }

            return Ok(vec![Diff::equal(old)]);
        }

        if old.is_empty() {
            return Ok(vec![Diff::insert(new)]);
        }

        if new.is_empty() {
            return Ok(vec![Diff::delete(old)]);
        }

        // Peel off what both texts share at either end and diff the middle.
        let prefix = Self::common_prefix(old, new, false);
        let suffix = Self::common_prefix(&old[prefix..], &new[prefix..], true);

        let mut diffs = self.compute(
            &old[prefix..old.len() - suffix],
            &new[prefix..new.len() - suffix],
            linemode,
            deadline,
        )?;

        if prefix > 0 {
            diffs.insert(0, Diff::equal(&old[..prefix]));
        }

        if suffix > 0 {
            diffs.push(Diff::equal(&new[new.len() - suffix..]));
        }

        Self::cleanup_merge(&mut diffs);

        Ok(diffs)
    }

    fn compute(
        &self,
        old: &[char],
        new: &[char],
        linemode: bool,
        deadline: Option<NaiveTime>,
    ) -> Result<Vec<Diff<char>>, Error> {
        if old.is_empty() {
            return Ok(vec![Diff::insert(new)]);
        }

        if new.is_empty() {
            return Ok(vec![Diff::delete(old)]);
        }

        let (long, short, old_is_long) = if old.len() > new.len() {
            (old, new, true)
        } else {
            (new, old, false)
        };

        // Shorter text is inside the longer text (speedup).
        if let Some(at) = long.windows(short.len()).position(|w| w == short) {
            let op = if old_is_long { Ops::Delete } else { Ops::Insert };
            return Ok(vec![
                Diff::new(op, &long[..at]),
                Diff::equal(short),
                Diff::new(op, &long[at + short.len()..]),
            ]);
        }

        if short.len() == 1 {
            // After the previous case the single unit can't be an equality.
            return Ok(vec![Diff::delete(old), Diff::insert(new)]);
        }

        // Check if the problem can be split in two.
        if let Some(half) = self.half_match(old, new) {
            let mut diffs = self.diff_internal(half.prefix_long, half.prefix_short, linemode, deadline)?;
            diffs.push(Diff::equal(half.common));
            diffs.append(&mut self.diff_internal(
                half.suffix_long,
                half.suffix_short,
                linemode,
                deadline,
            )?);

            return Ok(diffs);
        }

        if linemode && old.len() > self.line_mode_threshold && new.len() > self.line_mode_threshold {
            return self.line_mode(old, new, deadline);
        }

        self.bisect(old, new, deadline)
    }

    // Quick line-level diff on both texts, then rediff the parts for greater accuracy.
    // This speedup can produce non-minimal diffs.
    fn line_mode(
        &self,
        old: &[char],
        new: &[char],
        deadline: Option<NaiveTime>,
    ) -> Result<Vec<Diff<char>>, Error> {
        let tokenized = tokens::tokenize(old, new, TokenMode::Lines);
        let token_diffs =
            self.diff_tokens(&tokenized.old_ids, &tokenized.new_ids, deadline)?;
        let mut diffs = tokens::expand(&token_diffs, &tokenized.tokens);

        // Eliminate freak matches before refining.
        Self::cleanup_semantic(&mut diffs);

        self.rediff_chars(diffs, deadline)
    }

    // Walks an expanded coarse diff and re-diffs every delete/insert
    // replacement run character by character. One-shot refinement, the inner
    // diff never re-enters a coarse pass.
    fn rediff_chars(
        &self,
        diffs: Vec<Diff<char>>,
        deadline: Option<NaiveTime>,
    ) -> Result<Vec<Diff<char>>, Error> {
        let mut out: Vec<Diff<char>> = Vec::with_capacity(diffs.len());
        let mut deleted: Vec<char> = Vec::new();
        let mut inserted: Vec<char> = Vec::new();

        let flush = |out: &mut Vec<Diff<char>>,
                     deleted: &mut Vec<char>,
                     inserted: &mut Vec<char>|
         -> Result<(), Error> {
            if !deleted.is_empty() && !inserted.is_empty() {
                out.append(&mut self.diff_internal(deleted, inserted, false, deadline)?);
            } else if !deleted.is_empty() {
                out.push(Diff::delete(deleted));
            } else if !inserted.is_empty() {
                out.push(Diff::insert(inserted));
            }
            deleted.clear();
            inserted.clear();

            Ok(())
        };

        for diff in diffs {
            match diff.op() {
                Ops::Delete => deleted.extend_from_slice(diff.data()),
                Ops::Insert => inserted.extend_from_slice(diff.data()),
                Ops::Equal => {
                    flush(&mut out, &mut deleted, &mut inserted)?;
                    out.push(diff);
                }
            }
        }
        flush(&mut out, &mut deleted, &mut inserted)?;

        Ok(out)
    }

    // Token-id level diffing. Same shape as the character entry point minus
    // the line-mode reduction, which would make no sense on ids.
    pub(crate) fn diff_tokens(
        &self,
        old: &[u32],
        new: &[u32],
        deadline: Option<NaiveTime>,
    ) -> Result<Vec<Diff<u32>>, Error> {
        if old == new {
            if old.is_empty() {
                return Ok(Vec::new());
            }

            return Ok(vec![Diff::equal(old)]);
        }

        if old.is_empty() {
            return Ok(vec![Diff::insert(new)]);
        }

        if new.is_empty() {
            return Ok(vec![Diff::delete(old)]);
        }

        let prefix = Self::common_prefix(old, new, false);
        let suffix = Self::common_prefix(&old[prefix..], &new[prefix..], true);

        let mut diffs = self.compute_tokens(
            &old[prefix..old.len() - suffix],
            &new[prefix..new.len() - suffix],
            deadline,
        )?;

        if prefix > 0 {
            diffs.insert(0, Diff::equal(&old[..prefix]));
        }

        if suffix > 0 {
            diffs.push(Diff::equal(&new[new.len() - suffix..]));
        }

        Self::cleanup_merge(&mut diffs);

        Ok(diffs)
    }

    fn compute_tokens(
        &self,
        old: &[u32],
        new: &[u32],
        deadline: Option<NaiveTime>,
    ) -> Result<Vec<Diff<u32>>, Error> {
        if old.is_empty() {
            return Ok(vec![Diff::insert(new)]);
        }

        if new.is_empty() {
            return Ok(vec![Diff::delete(old)]);
        }

        let (long, short, old_is_long) = if old.len() > new.len() {
            (old, new, true)
        } else {
            (new, old, false)
        };

        if let Some(at) = long.windows(short.len()).position(|w| w == short) {
            let op = if old_is_long { Ops::Delete } else { Ops::Insert };
            return Ok(vec![
                Diff::new(op, &long[..at]),
                Diff::equal(short),
                Diff::new(op, &long[at + short.len()..]),
            ]);
        }

        if short.len() == 1 {
            return Ok(vec![Diff::delete(old), Diff::insert(new)]);
        }

        if let Some(half) = self.half_match(old, new) {
            let mut diffs = self.diff_tokens(half.prefix_long, half.prefix_short, deadline)?;
            diffs.push(Diff::equal(half.common));
            diffs.append(&mut self.diff_tokens(half.suffix_long, half.suffix_short, deadline)?);

            return Ok(diffs);
        }

        self.bisect(old, new, deadline)
    }

    // Find the 'middle snake' of a diff, split the problem in two
    // and return the recursively constructed diff.
    // See Myers 1986 paper: An O(ND) Difference Algorithm and Its Variations.
    pub fn bisect<T: Unit>(
        &self,
        old: &[T],
        new: &[T],
        deadline: Option<NaiveTime>,
    ) -> Result<Vec<Diff<T>>, Error> {
        let old_len = old.len() as isize;
        let new_len = new.len() as isize;

        let max_d = (old_len + new_len + 1) / 2;
        let v_offset = max_d;
        let v_len = 2 * max_d;

        let mut v1 = vec![-1_isize; v_len as usize];
        let mut v2 = vec![-1_isize; v_len as usize];

        v1[v_offset as usize + 1] = 0;
        v2[v_offset as usize + 1] = 0;

        let delta = old_len - new_len;
        // If the total number of units is odd, the front path will be the one
        // to collide with the reverse path.
        let front = delta % 2 != 0;

        // Offsets for the start and end of the k loop.
        // Prevents mapping of space beyond the grid.
        let mut k1start: isize = 0;
        let mut k1end: isize = 0;
        let mut k2start: isize = 0;
        let mut k2end: isize = 0;

        for d in 0..max_d {
            // Bail out if deadline is reached.
            if let Some(deadline) = deadline {
                if Utc::now().time() > deadline {
                    break;
                }
            }

            // Walk the front path one step.
            let mut k1 = -d + k1start;
            while k1 < d + 1 - k1end {
                let k1_offset = (v_offset + k1) as usize;
                let mut x1 = if k1 == -d || (k1 != d && v1[k1_offset - 1] < v1[k1_offset + 1]) {
                    v1[k1_offset + 1]
                } else {
                    v1[k1_offset - 1] + 1
                };
                let mut y1 = x1 - k1;

                // Extend the snake.
                while x1 < old_len && y1 < new_len && old[x1 as usize] == new[y1 as usize] {
                    x1 += 1;
                    y1 += 1;
                }
                v1[k1_offset] = x1;

                if x1 > old_len {
                    // Ran off the right of the graph.
                    k1end += 2;
                } else if y1 > new_len {
                    // Ran off the bottom of the graph.
                    k1start += 2;
                } else if front {
                    let k2_offset = v_offset + delta - k1;
                    if k2_offset >= 0 && k2_offset < v_len && v2[k2_offset as usize] != -1 {
                        // Mirror x2 onto the top-left coordinate system.
                        let x2 = old_len - v2[k2_offset as usize];
                        if x1 >= x2 {
                            // Overlap detected.
                            return T::bisect_split(self, old, new, x1 as usize, y1 as usize, deadline);
                        }
                    }
                }

                k1 += 2;
            }

            // Walk the reverse path one step.
            let mut k2 = -d + k2start;
            while k2 < d + 1 - k2end {
                let k2_offset = (v_offset + k2) as usize;
                let mut x2 = if k2 == -d || (k2 != d && v2[k2_offset - 1] < v2[k2_offset + 1]) {
                    v2[k2_offset + 1]
                } else {
                    v2[k2_offset - 1] + 1
                };
                let mut y2 = x2 - k2;

                while x2 < old_len
                    && y2 < new_len
                    && old[(old_len - x2 - 1) as usize] == new[(new_len - y2 - 1) as usize]
                {
                    x2 += 1;
                    y2 += 1;
                }
                v2[k2_offset] = x2;

                if x2 > old_len {
                    // Ran off the left of the graph.
                    k2end += 2;
                } else if y2 > new_len {
                    // Ran off the top of the graph.
                    k2start += 2;
                } else if !front {
                    let k1_offset = v_offset + delta - k2;
                    if k1_offset >= 0 && k1_offset < v_len && v1[k1_offset as usize] != -1 {
                        let x1 = v1[k1_offset as usize];
                        let y1 = v_offset + x1 - k1_offset;
                        // Mirror x2 onto the top-left coordinate system.
                        let x2 = old_len - x2;
                        if x1 >= x2 {
                            // Overlap detected.
                            return T::bisect_split(self, old, new, x1 as usize, y1 as usize, deadline);
                        }
                    }
                }

                k2 += 2;
            }
        }

        // Ran out of time or diff paths: the whole of old was swapped for new.
        Ok(vec![Diff::delete(old), Diff::insert(new)])
    }

    // Do the two texts share a substring which is at least half the length of
    // the longer text? This speedup can produce a non-minimal diff.
    fn half_match<'a, T: Unit>(&self, old: &'a [T], new: &'a [T]) -> Option<HalfMatch<'a, T>> {
        // Don't risk returning a suboptimal diff when asked for precision.
        if !self.half_match {
            return None;
        }

        let (long, short) = if old.len() > new.len() {
            (old, new)
        } else {
            (new, old)
        };

        // Pointless - too small for this speedup.
        if long.len() < 4 || short.len() * 2 < long.len() {
            return None;
        }

        // First check if the second quarter is the seed for a half-match.
        let hm1 = Self::half_match_at(long, short, long.len() / 4);
        // Check again based on the third quarter.
        let hm2 = Self::half_match_at(long, short, long.len() / 2);

        let half = match (hm1, hm2) {
            (None, None) => return None,
            (Some(hm1), None) => hm1,
            (None, Some(hm2)) => hm2,
            // Both match, select the longest.
            (Some(hm1), Some(hm2)) => {
                if hm1.common.len() > hm2.common.len() {
                    hm1
                } else {
                    hm2
                }
            }
        };

        // A half-match was found, sort out the return data.
        if old.len() > new.len() {
            Some(half)
        } else {
            Some(HalfMatch {
                prefix_long: half.prefix_short,
                suffix_long: half.suffix_short,
                prefix_short: half.prefix_long,
                suffix_short: half.suffix_long,
                common: half.common,
            })
        }
    }

    // Does a substring of short exist within long such that the substring is
    // at least half the length of long? `seed_at` is the start of the
    // quarter-length seed within long.
    fn half_match_at<'a, T: Unit>(
        long: &'a [T],
        short: &'a [T],
        seed_at: usize,
    ) -> Option<HalfMatch<'a, T>> {
        let seed = &long[seed_at..seed_at + long.len() / 4];

        let mut j = 0;

        let mut best_common: &[T] = &[];
        let mut best_long_a: &[T] = &[];
        let mut best_long_b: &[T] = &[];
        let mut best_short_a: &[T] = &[];
        let mut best_short_b: &[T] = &[];

        while let Some(at) = short[j..].windows(seed.len()).position(|w| w == seed) {
            j += at;

            let prefix_len = Self::common_prefix(&long[seed_at..], &short[j..], false);
            let suffix_len = Self::common_prefix(&long[..seed_at], &short[..j], true);

            if best_common.len() < suffix_len + prefix_len {
                best_common = &short[j - suffix_len..j + prefix_len];

                best_long_a = &long[..seed_at - suffix_len];
                best_long_b = &long[seed_at + prefix_len..];

                best_short_a = &short[..j - suffix_len];
                best_short_b = &short[j + prefix_len..];
            }

            j += 1;
        }

        if best_common.len() * 2 >= long.len() {
            Some(HalfMatch {
                prefix_long: best_long_a,
                suffix_long: best_long_b,
                prefix_short: best_short_a,
                suffix_short: best_short_b,
                common: best_common,
            })
        } else {
            None
        }
    }

    // Number of units shared at the start of both slices, or at the end when
    // `reverse` is set. Binary search over the candidate length; same
    // performance picture as the original flat scan in practice, see
    // https://neil.fraser.name/news/2007/10/09/
    pub(crate) fn common_prefix<T: Unit>(lhs: &[T], rhs: &[T], reverse: bool) -> usize {
        if lhs.is_empty()
            || rhs.is_empty()
            || (!reverse && lhs.first() != rhs.first())
            || (reverse && lhs.last() != rhs.last())
        {
            return 0;
        }

        let mut low = 0;
        let mut high = lhs.len().min(rhs.len());
        let mut mid = high;
        let mut start = 0;

        while low < mid {
            let (lhs_range, rhs_range) = if !reverse {
                (start..mid, start..mid)
            } else {
                (
                    lhs.len() - mid..lhs.len() - start,
                    rhs.len() - mid..rhs.len() - start,
                )
            };

            if lhs[lhs_range] == rhs[rhs_range] {
                low = mid;
                start = low;
            } else {
                high = mid;
            }

            mid = (high - low) / 2 + low;
        }

        mid
    }

    // Length of the longest suffix of lhs that is a prefix of rhs.
    pub(crate) fn common_overlap<T: Unit>(lhs: &[T], rhs: &[T]) -> usize {
        if lhs.is_empty() || rhs.is_empty() {
            return 0;
        }

        let min_len = lhs.len().min(rhs.len());

        // A working set with the longer side truncated.
        let l = if lhs.len() > rhs.len() {
            &lhs[lhs.len() - rhs.len()..]
        } else {
            lhs
        };
        let r = if lhs.len() < rhs.len() {
            &rhs[..lhs.len()]
        } else {
            rhs
        };

        // Quick check for the worst case.
        if l == r {
            return min_len;
        }

        // Start with a single-unit match and grow the candidate until no
        // match is found. Performance analysis:
        // https://neil.fraser.name/news/2010/11/04/
        let mut len = 1;
        let mut best = 0;

        loop {
            let pattern = &l[min_len - len..];
            let found = match r.windows(pattern.len()).position(|w| w == pattern) {
                Some(found) => found,
                None => return best,
            };

            len += found;
            if found == 0 || l[min_len - len..] == r[..len] {
                best = len;
                len += 1;
            }
        }
    }

    // Reduce the number of edits by eliminating semantically trivial equalities.
    pub(crate) fn cleanup_semantic<T: Unit>(diffs: &mut Vec<Diff<T>>) {
        let mut changes = false;

        let mut idx = 0;
        let mut equalities: Vec<usize> = Vec::with_capacity(diffs.len());
        let mut last_equality: Option<Vec<T>> = None;

        // Units changed before the last equality seen.
        let mut ins_before = 0;
        let mut del_before = 0;
        // Units changed after it.
        let mut ins_after = 0;
        let mut del_after = 0;

        while idx < diffs.len() {
            if diffs[idx].op() == Ops::Equal {
                equalities.push(idx);

                ins_before = ins_after;
                del_before = del_after;
                ins_after = 0;
                del_after = 0;

                last_equality = Some(diffs[idx].data().to_vec());
            } else {
                if diffs[idx].op() == Ops::Insert {
                    ins_after += diffs[idx].size();
                } else {
                    del_after += diffs[idx].size();
                }

                // Eliminate an equality smaller than or equal to the edits on
                // both sides of it.
                let dominated = last_equality.as_ref().is_some_and(|eq| {
                    eq.len() <= ins_before.max(del_before) && eq.len() <= ins_after.max(del_after)
                });
                if dominated {
                    let eq = last_equality.take().unwrap_or_default();
                    if let Some(at) = equalities.pop() {
                        // Duplicate record, then turn the copy into an insert.
                        diffs[at].0 = Ops::Insert;
                        diffs.insert(at, Diff::delete(&eq));

                        // The previous equality needs to be reevaluated too.
                        equalities.pop();

                        idx = match equalities.last() {
                            Some(&e) => e + 1,
                            None => 0,
                        };

                        ins_before = 0;
                        del_before = 0;
                        ins_after = 0;
                        del_after = 0;
                        changes = true;

                        continue;
                    }
                }
            }

            idx += 1;
        }

        // Normalize the diff.
        if changes {
            Self::cleanup_merge(diffs);
        }

        Self::cleanup_semantic_lossless(diffs);

        // Find any overlaps between deletions and insertions.
        // e.g: <del>abcxxx</del><ins>xxxdef</ins>
        //   -> <del>abc</del>xxx<ins>def</ins>
        // e.g: <del>xxxabc</del><ins>defxxx</ins>
        //   -> <ins>def</ins>xxx<del>abc</del>
        // Only extract an overlap if it is as big as the edit ahead or behind it.
        let mut idx = 1;
        while !diffs.is_empty() && idx < diffs.len() {
            if diffs[idx - 1].op() == Ops::Delete && diffs[idx].op() == Ops::Insert {
                let deleted = diffs[idx - 1].data().to_vec();
                let inserted = diffs[idx].data().to_vec();

                let overlap_del_ins = Self::common_overlap(&deleted, &inserted);
                let overlap_ins_del = Self::common_overlap(&inserted, &deleted);

                if overlap_del_ins >= overlap_ins_del {
                    if overlap_del_ins * 2 >= deleted.len() || overlap_del_ins * 2 >= inserted.len()
                    {
                        // Overlap found. Insert an equality and trim the surrounding edits.
                        diffs.insert(idx, Diff::equal(&inserted[..overlap_del_ins]));
                        diffs[idx - 1].1 = deleted[..deleted.len() - overlap_del_ins].to_vec();
                        diffs[idx + 1].1 = inserted[overlap_del_ins..].to_vec();
                        idx += 1;
                    }
                } else if overlap_ins_del * 2 >= deleted.len()
                    || overlap_ins_del * 2 >= inserted.len()
                {
                    // Reverse overlap: insert an equality and swap and trim
                    // the surrounding edits.
                    diffs.insert(idx, Diff::equal(&deleted[..overlap_ins_del]));
                    diffs[idx - 1] = Diff::insert(&inserted[..inserted.len() - overlap_ins_del]);
                    diffs[idx + 1] = Diff::delete(&deleted[overlap_ins_del..]);
                    idx += 1;
                }

                idx += 1;
            }

            idx += 1;
        }
    }

    // Look for single edits surrounded on both sides by equalities which can
    // be shifted sideways to align to a word/line boundary.
    // e.g: The c<ins>at c</ins>ame. -> The <ins>cat </ins>came.
    fn cleanup_semantic_lossless<T: Unit>(diffs: &mut Vec<Diff<T>>) {
        // The first and last element don't need checking.
        let mut idx = 1;
        while !diffs.is_empty() && idx < diffs.len() - 1 {
            if diffs[idx - 1].op() == Ops::Equal && diffs[idx + 1].op() == Ops::Equal {
                // First shift the edit as far left as possible.
                let (mut prev, mut edit, mut next) = {
                    let common =
                        Self::common_prefix(diffs[idx - 1].data(), diffs[idx].data(), true);
                    if common > 0 {
                        let shared = &diffs[idx].data()[diffs[idx].size() - common..];

                        (
                            diffs[idx - 1].data()[..diffs[idx - 1].size() - common].to_vec(),
                            [shared, &diffs[idx].data()[..diffs[idx].size() - common]].concat(),
                            [shared, diffs[idx + 1].data()].concat(),
                        )
                    } else {
                        (
                            diffs[idx - 1].data().to_vec(),
                            diffs[idx].data().to_vec(),
                            diffs[idx + 1].data().to_vec(),
                        )
                    }
                };

                // Then step unit by unit to the right looking for the best fit.
                let mut best_prev = prev.clone();
                let mut best_edit = edit.clone();
                let mut best_next = next.clone();
                let mut best_score = Self::semantic_score(&prev, &edit)
                    + Self::semantic_score(&edit, &next);

                while !edit.is_empty() && !next.is_empty() && edit[0] == next[0] {
                    prev.push(edit[0]);
                    edit.remove(0);
                    edit.push(next[0]);
                    next.remove(0);

                    let score = Self::semantic_score(&prev, &edit)
                        + Self::semantic_score(&edit, &next);

                    // The >= encourages trailing rather than leading
                    // whitespace on edits.
                    if score >= best_score {
                        best_score = score;
                        best_prev.clone_from(&prev);
                        best_edit.clone_from(&edit);
                        best_next.clone_from(&next);
                    }
                }

                // We have an improvement, save it back to the diff.
                if diffs[idx - 1].data() != best_prev {
                    if !best_prev.is_empty() {
                        diffs[idx - 1].1.clone_from(&best_prev);
                    } else {
                        diffs.remove(idx - 1);
                        idx -= 1;
                    }

                    diffs[idx].1.clone_from(&best_edit);

                    if !best_next.is_empty() {
                        diffs[idx + 1].1.clone_from(&best_next);
                    } else {
                        diffs.remove(idx + 1);
                        idx = idx.saturating_sub(1);
                    }
                }
            }

            idx += 1;
        }
    }

    // Given two slices, compute a score representing whether the boundary
    // between them falls on logical boundaries.
    // Scores range from 6 (best) to 0 (worst).
    fn semantic_score<T: Unit>(one: &[T], two: &[T]) -> u8 {
        let (Some(&last), Some(&first)) = (one.last(), two.first()) else {
            // Edges are the best.
            return 6;
        };
        let (Some(char1), Some(char2)) = (last.as_char(), first.as_char()) else {
            // Non-character alphabets break perfectly between any two units.
            return 6;
        };

        let whitespace_1 = char1.is_whitespace();
        let whitespace_2 = char2.is_whitespace();

        let linebreak_1 = whitespace_1 && (char1 == '\n' || char1 == '\r');
        let linebreak_2 = whitespace_2 && (char2 == '\n' || char2 == '\r');

        let blankline_1 = linebreak_1 && T::ends_with_blank_line(one);
        let blankline_2 = linebreak_2 && T::starts_with_blank_line(two);

        if blankline_1 || blankline_2 {
            // Five points for blank lines.
            5
        } else if linebreak_1 || linebreak_2 {
            // Four points for line breaks.
            4
        } else if !char1.is_alphanumeric() && !whitespace_1 && whitespace_2 {
            // Three points for end of sentences.
            3
        } else if whitespace_1 || whitespace_2 {
            // Two points for whitespace.
            2
        } else if !char1.is_alphanumeric() || !char2.is_alphanumeric() {
            // One point for non-alphanumeric.
            1
        } else {
            0
        }
    }

    // Reorder and merge like edit sections. Merge equalities.
    // Any edit section can move as long as it doesn't cross an equality.
    pub(crate) fn cleanup_merge<T: Unit>(diffs: &mut Vec<Diff<T>>) {
        // A dummy equality at the end triggers the flush of a trailing run.
        diffs.push(Diff::equal(&[]));

        let mut idx = 0;
        let mut ins_count = 0;
        let mut del_count = 0;
        let mut ins_text: Vec<T> = Vec::new();
        let mut del_text: Vec<T> = Vec::new();

        while idx < diffs.len() {
            match diffs[idx].op() {
                Ops::Insert => {
                    ins_count += 1;
                    ins_text.extend_from_slice(diffs[idx].data());
                    idx += 1;
                }
                Ops::Delete => {
                    del_count += 1;
                    del_text.extend_from_slice(diffs[idx].data());
                    idx += 1;
                }
                Ops::Equal => {
                    // Upon reaching an equality, check for prior redundancies.
                    if del_count + ins_count > 1 {
                        if del_count != 0 && ins_count != 0 {
                            // Factor out any common prefix.
                            let common = Self::common_prefix(&ins_text, &del_text, false);
                            if common != 0 {
                                let run_start = idx - del_count - ins_count;
                                if run_start > 0 && diffs[run_start - 1].op() == Ops::Equal {
                                    diffs[run_start - 1].1.extend_from_slice(&ins_text[..common]);
                                } else {
                                    diffs.insert(0, Diff::equal(&ins_text[..common]));
                                    idx += 1;
                                }
                                ins_text.drain(..common);
                                del_text.drain(..common);
                            }

                            // Factor out any common suffix.
                            let common = Self::common_prefix(&ins_text, &del_text, true);
                            if common != 0 {
                                let mut merged = ins_text[ins_text.len() - common..].to_vec();
                                merged.extend_from_slice(diffs[idx].data());
                                diffs[idx].1 = merged;

                                ins_text.truncate(ins_text.len() - common);
                                del_text.truncate(del_text.len() - common);
                            }
                        }

                        // Replace the run with the merged records.
                        let run_start = idx - del_count - ins_count;
                        diffs.drain(run_start..idx);
                        idx = run_start;

                        if !del_text.is_empty() {
                            diffs.insert(idx, Diff::delete(&del_text));
                            idx += 1;
                        }
                        if !ins_text.is_empty() {
                            diffs.insert(idx, Diff::insert(&ins_text));
                            idx += 1;
                        }

                        idx += 1;
                    } else if idx != 0 && diffs[idx - 1].op() == Ops::Equal {
                        // Merge this equality with the previous one.
                        let data = diffs.remove(idx);
                        diffs[idx - 1].1.extend_from_slice(data.data());
                    } else {
                        idx += 1;
                    }

                    ins_count = 0;
                    del_count = 0;
                    ins_text.clear();
                    del_text.clear();
                }
            }
        }

        if diffs.last().is_some_and(|d| d.data().is_empty()) {
            diffs.pop();
        }

        // Second pass: look for single edits surrounded on both sides by
        // equalities which can be shifted sideways to eliminate an equality.
        // e.g: A<ins>BA</ins>C -> <ins>AB</ins>AC
        let mut changes = false;
        let mut idx = 1;

        while !diffs.is_empty() && idx < diffs.len() - 1 {
            if diffs[idx - 1].op() == Ops::Equal && diffs[idx + 1].op() == Ops::Equal {
                // This is a single edit surrounded by equalities.
                if diffs[idx].data().ends_with(diffs[idx - 1].data()) {
                    // Shift the edit over the previous equality.
                    let prev = diffs[idx - 1].data().to_vec();
                    let shifted =
                        [&prev[..], &diffs[idx].data()[..diffs[idx].size() - prev.len()]].concat();
                    let merged = [&prev[..], diffs[idx + 1].data()].concat();

                    diffs[idx].1 = shifted;
                    diffs[idx + 1].1 = merged;
                    diffs.remove(idx - 1);

                    changes = true;
                } else if diffs[idx].data().starts_with(diffs[idx + 1].data()) {
                    // Shift the edit over the next equality.
                    let next = diffs.remove(idx + 1);

                    diffs[idx - 1].1.extend_from_slice(next.data());
                    let shifted = [&diffs[idx].data()[next.size()..], next.data()].concat();
                    diffs[idx].1 = shifted;

                    changes = true;
                }
            }

            idx += 1;
        }

        // If shifts were made, the diff needs reordering and merging again.
        if changes {
            Self::cleanup_merge(diffs);
        }
    }

    // Reduce the number of edits by eliminating operationally trivial equalities.
    pub(crate) fn cleanup_efficiency<T: Unit>(&self, diffs: &mut Vec<Diff<T>>) {
        if diffs.is_empty() {
            return;
        }

        let edit_cost = self.edit_cost();

        let mut changes = false;
        let mut idx = 0;
        let mut equalities: Vec<usize> = Vec::new();
        let mut last_equality: Option<Vec<T>> = None;

        // Is there an insertion or deletion before the last equality.
        let mut pre_ins = false;
        let mut pre_del = false;
        // Is there an insertion or deletion after it.
        let mut post_ins = false;
        let mut post_del = false;

        while idx < diffs.len() {
            if diffs[idx].op() == Ops::Equal {
                if diffs[idx].size() < edit_cost && (post_ins || post_del) {
                    // Candidate found.
                    equalities.push(idx);
                    pre_ins = post_ins;
                    pre_del = post_del;
                    last_equality = Some(diffs[idx].data().to_vec());
                } else {
                    // Not a candidate, and can never become one.
                    equalities.clear();
                    last_equality = None;
                }

                post_ins = false;
                post_del = false;
            } else {
                if diffs[idx].op() == Ops::Delete {
                    post_del = true;
                } else {
                    post_ins = true;
                }

                // Five types to be split:
                // <ins>A</ins><del>B</del>XY<ins>C</ins><del>D</del>
                // <ins>A</ins>X<ins>C</ins><del>D</del>
                // <ins>A</ins><del>B</del>X<ins>C</ins>
                // <ins>A</ins>X<ins>C</ins><del>D</del>
                // <ins>A</ins><del>B</del>X<del>C</del>
                let split = last_equality.as_ref().is_some_and(|eq| {
                    (pre_ins && pre_del && post_ins && post_del)
                        || (eq.len() < edit_cost / 2
                            && pre_ins as u8 + pre_del as u8 + post_ins as u8 + post_del as u8 == 3)
                });
                if split {
                    let eq = last_equality.take().unwrap_or_default();
                    if let Some(at) = equalities.pop() {
                        // Duplicate record, then turn the copy into an insert.
                        diffs[at].0 = Ops::Insert;
                        diffs.insert(at, Diff::delete(&eq));

                        changes = true;

                        if pre_ins && pre_del {
                            // No changes made which could affect previous
                            // entry, keep going.
                            post_ins = true;
                            post_del = true;
                            equalities.clear();
                        } else {
                            // The previous equality needs reevaluating.
                            equalities.pop();

                            idx = match equalities.last() {
                                Some(&e) => e + 1,
                                None => 0,
                            };
                            post_ins = false;
                            post_del = false;

                            continue;
                        }
                    }
                }
            }

            idx += 1;
        }

        if changes {
            Self::cleanup_merge(diffs);
        }
    }
}

/// Maps a position in the old text through an edit list into the equivalent
/// position in the new text. Handy for carrying a cursor across an edit.
pub fn x_index<T: Unit>(diffs: &[Diff<T>], loc: usize) -> usize {
    let mut old_chars = 0;
    let mut new_chars = 0;
    let mut last_old = 0;
    let mut last_new = 0;

    let mut overshot = None;

    for diff in diffs {
        if diff.op() != Ops::Insert {
            // Equality or deletion.
            old_chars += diff.size();
        }
        if diff.op() != Ops::Delete {
            // Equality or insertion.
            new_chars += diff.size();
        }

        if old_chars > loc {
            overshot = Some(diff);
            break;
        }

        last_old = old_chars;
        last_new = new_chars;
    }

    if overshot.is_some_and(|diff| diff.op() == Ops::Delete) {
        // The location was deleted.
        return last_new;
    }

    // Add the remaining unit length.
    last_new + (loc - last_old)
}

/// Given a diff, measure its Levenshtein distance in terms of inserted,
/// deleted or substituted units. 0 means equality, the maximum is the length
/// of the longer text.
pub fn levenshtein<T: Unit>(diffs: &[Diff<T>]) -> usize {
    let mut distance = 0;
    let mut inserted = 0;
    let mut deleted = 0;

    for diff in diffs {
        match diff.op() {
            Ops::Insert => inserted += diff.size(),
            Ops::Delete => deleted += diff.size(),
            Ops::Equal => {
                // A deletion and an insertion is one substitution.
                distance += inserted.max(deleted);
                inserted = 0;
                deleted = 0;
            }
        }
    }

    distance + inserted.max(deleted)
}

/// Rebuilds the new text: the concatenation of everything that was not
/// deleted.
pub fn apply_new(diffs: &[Diff<char>]) -> String {
    diffs
        .iter()
        .filter(|diff| diff.op() != Ops::Delete)
        .flat_map(|diff| diff.data().iter())
        .collect()
}

/// Rebuilds the old text: the concatenation of everything that was not
/// inserted.
pub fn apply_old(diffs: &[Diff<char>]) -> String {
    diffs
        .iter()
        .filter(|diff| diff.op() != Ops::Insert)
        .flat_map(|diff| diff.data().iter())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(text: &str) -> Vec<char> {
        text.chars().collect()
    }

    fn eq(text: &str) -> Diff<char> {
        Diff::equal(&c(text))
    }

    fn del(text: &str) -> Diff<char> {
        Diff::delete(&c(text))
    }

    fn ins(text: &str) -> Diff<char> {
        Diff::insert(&c(text))
    }

    // Options without speedups: deterministic, optimal diffs.
    fn precise() -> DiffOptions {
        let mut options = DiffOptions::new();
        options.set_timeout(None);
        options.set_half_match(false);
        options.set_checklines(false);
        options
    }

    #[test]
    fn test_common_prefix() {
        // Null case.
        assert_eq!(0, DiffOptions::common_prefix(&c("abc"), &c("xyz"), false));
        // Non-null case.
        assert_eq!(
            4,
            DiffOptions::common_prefix(&c("1234abcdef"), &c("1234xyz"), false)
        );
        // Whole case.
        assert_eq!(
            4,
            DiffOptions::common_prefix(&c("1234"), &c("1234xyz"), false)
        );
    }

    #[test]
    fn test_common_suffix() {
        // Null case.
        assert_eq!(0, DiffOptions::common_prefix(&c("abc"), &c("xyz"), true));
        // Non-null case.
        assert_eq!(
            4,
            DiffOptions::common_prefix(&c("abcdef1234"), &c("xyz1234"), true)
        );
        // Whole case.
        assert_eq!(4, DiffOptions::common_prefix(&c("1234"), &c("xyz1234"), true));
    }

    #[test]
    fn test_common_overlap() {
        // Null case.
        assert_eq!(0, DiffOptions::common_overlap(&c(""), &c("abcd")));
        // Whole case.
        assert_eq!(3, DiffOptions::common_overlap(&c("abc"), &c("abcd")));
        // No overlap.
        assert_eq!(0, DiffOptions::common_overlap(&c("123456"), &c("abcd")));
        // Overlap.
        assert_eq!(3, DiffOptions::common_overlap(&c("123456xxx"), &c("xxxabcd")));
        // Unicode: a ligature is one unit, not the letters it resembles.
        assert_eq!(0, DiffOptions::common_overlap(&c("fi"), &c("\u{fb01}i")));
    }

    #[test]
    fn test_half_match() {
        let options = DiffOptions::new();

        // No match.
        assert_eq!(
            None,
            options.half_match(&c("1234567890"), &c("abcdef"))
        );
        assert_eq!(None, options.half_match(&c("12345"), &c("23")));

        // Single match.
        assert_eq!(
            Some(HalfMatch {
                prefix_long: &c("12")[..],
                suffix_long: &c("90")[..],
                prefix_short: &c("a")[..],
                suffix_short: &c("z")[..],
                common: &c("345678")[..],
            }),
            options.half_match(&c("1234567890"), &c("a345678z"))
        );
        assert_eq!(
            Some(HalfMatch {
                prefix_long: &c("a")[..],
                suffix_long: &c("z")[..],
                prefix_short: &c("12")[..],
                suffix_short: &c("90")[..],
                common: &c("345678")[..],
            }),
            options.half_match(&c("a345678z"), &c("1234567890"))
        );
        assert_eq!(
            Some(HalfMatch {
                prefix_long: &c("abc")[..],
                suffix_long: &c("z")[..],
                prefix_short: &c("1234")[..],
                suffix_short: &c("0")[..],
                common: &c("56789")[..],
            }),
            options.half_match(&c("abc56789z"), &c("1234567890"))
        );
        assert_eq!(
            Some(HalfMatch {
                prefix_long: &c("a")[..],
                suffix_long: &c("xyz")[..],
                prefix_short: &c("1")[..],
                suffix_short: &c("7890")[..],
                common: &c("23456")[..],
            }),
            options.half_match(&c("a23456xyz"), &c("1234567890"))
        );

        // Multiple matches.
        assert_eq!(
            Some(HalfMatch {
                prefix_long: &c("12123")[..],
                suffix_long: &c("123121")[..],
                prefix_short: &c("a")[..],
                suffix_short: &c("z")[..],
                common: &c("1234123451234")[..],
            }),
            options.half_match(&c("121231234123451234123121"), &c("a1234123451234z"))
        );

        // Disabled.
        let precise = precise();
        assert_eq!(None, precise.half_match(&c("1234567890"), &c("a345678z")));
    }

    #[test]
    fn test_cleanup_merge() {
        // Null case.
        let mut diffs: Vec<Diff<char>> = vec![];
        DiffOptions::cleanup_merge(&mut diffs);
        assert!(diffs.is_empty());

        // No change case.
        let mut diffs = vec![eq("a"), del("b"), ins("c")];
        DiffOptions::cleanup_merge(&mut diffs);
        assert_eq!(vec![eq("a"), del("b"), ins("c")], diffs);

        // Merge equalities.
        let mut diffs = vec![eq("a"), eq("b"), eq("c")];
        DiffOptions::cleanup_merge(&mut diffs);
        assert_eq!(vec![eq("abc")], diffs);

        // Merge deletions.
        let mut diffs = vec![del("a"), del("b"), del("c")];
        DiffOptions::cleanup_merge(&mut diffs);
        assert_eq!(vec![del("abc")], diffs);

        // Merge insertions.
        let mut diffs = vec![ins("a"), ins("b"), ins("c")];
        DiffOptions::cleanup_merge(&mut diffs);
        assert_eq!(vec![ins("abc")], diffs);

        // Merge interweave.
        let mut diffs = vec![del("a"), ins("b"), del("c"), ins("d"), eq("e"), eq("f")];
        DiffOptions::cleanup_merge(&mut diffs);
        assert_eq!(vec![del("ac"), ins("bd"), eq("ef")], diffs);

        // Prefix and suffix detection.
        let mut diffs = vec![del("a"), ins("abc"), del("dc")];
        DiffOptions::cleanup_merge(&mut diffs);
        assert_eq!(vec![eq("a"), del("d"), ins("b"), eq("c")], diffs);

        // Prefix and suffix detection with equalities.
        let mut diffs = vec![eq("x"), del("a"), ins("abc"), del("dc"), eq("y")];
        DiffOptions::cleanup_merge(&mut diffs);
        assert_eq!(vec![eq("xa"), del("d"), ins("b"), eq("cy")], diffs);

        // Slide edit left.
        let mut diffs = vec![eq("a"), ins("ba"), eq("c")];
        DiffOptions::cleanup_merge(&mut diffs);
        assert_eq!(vec![ins("ab"), eq("ac")], diffs);

        // Slide edit right.
        let mut diffs = vec![eq("c"), ins("ab"), eq("a")];
        DiffOptions::cleanup_merge(&mut diffs);
        assert_eq!(vec![eq("ca"), ins("ba")], diffs);

        // Slide edit left recursive.
        let mut diffs = vec![eq("a"), del("b"), eq("c"), del("ac"), eq("x")];
        DiffOptions::cleanup_merge(&mut diffs);
        assert_eq!(vec![del("abc"), eq("acx")], diffs);

        // Slide edit right recursive.
        let mut diffs = vec![eq("x"), del("ca"), eq("c"), del("b"), eq("a")];
        DiffOptions::cleanup_merge(&mut diffs);
        assert_eq!(vec![eq("xca"), del("cba")], diffs);
    }

    #[test]
    fn test_cleanup_merge_idempotent() {
        let cases = vec![
            vec![eq("a"), del("b"), ins("c")],
            vec![del("a"), ins("abc"), del("dc")],
            vec![eq("x"), del("ca"), eq("c"), del("b"), eq("a")],
        ];

        for case in cases {
            let mut once = case.clone();
            DiffOptions::cleanup_merge(&mut once);
            let mut twice = once.clone();
            DiffOptions::cleanup_merge(&mut twice);
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_cleanup_semantic() {
        // Null case.
        let mut diffs: Vec<Diff<char>> = vec![];
        DiffOptions::cleanup_semantic(&mut diffs);
        assert!(diffs.is_empty());

        // No elimination #1.
        let mut diffs = vec![del("ab"), ins("cd"), eq("12"), del("e")];
        DiffOptions::cleanup_semantic(&mut diffs);
        assert_eq!(vec![del("ab"), ins("cd"), eq("12"), del("e")], diffs);

        // No elimination #2.
        let mut diffs = vec![del("abc"), ins("ABC"), eq("1234"), del("wxyz")];
        DiffOptions::cleanup_semantic(&mut diffs);
        assert_eq!(vec![del("abc"), ins("ABC"), eq("1234"), del("wxyz")], diffs);

        // Simple elimination.
        let mut diffs = vec![del("a"), eq("b"), del("c")];
        DiffOptions::cleanup_semantic(&mut diffs);
        assert_eq!(vec![del("abc"), ins("b")], diffs);

        // Backpass elimination.
        let mut diffs = vec![del("ab"), eq("cd"), del("e"), eq("f"), ins("g")];
        DiffOptions::cleanup_semantic(&mut diffs);
        assert_eq!(vec![del("abcdef"), ins("cdfg")], diffs);

        // Multiple eliminations.
        let mut diffs = vec![
            ins("1"),
            eq("A"),
            del("B"),
            ins("2"),
            eq("_"),
            ins("1"),
            eq("A"),
            del("B"),
            ins("2"),
        ];
        DiffOptions::cleanup_semantic(&mut diffs);
        assert_eq!(vec![del("AB_AB"), ins("1A2_1A2")], diffs);

        // Word boundaries.
        let mut diffs = vec![eq("The c"), del("ow and the c"), eq("at.")];
        DiffOptions::cleanup_semantic(&mut diffs);
        assert_eq!(vec![eq("The "), del("cow and the "), eq("cat.")], diffs);

        // No overlap elimination.
        let mut diffs = vec![del("abcxx"), ins("xxdef")];
        DiffOptions::cleanup_semantic(&mut diffs);
        assert_eq!(vec![del("abcxx"), ins("xxdef")], diffs);

        // Overlap elimination.
        let mut diffs = vec![del("abcxxx"), ins("xxxdef")];
        DiffOptions::cleanup_semantic(&mut diffs);
        assert_eq!(vec![del("abc"), eq("xxx"), ins("def")], diffs);

        // Reverse overlap elimination.
        let mut diffs = vec![del("xxxabc"), ins("defxxx")];
        DiffOptions::cleanup_semantic(&mut diffs);
        assert_eq!(vec![ins("def"), eq("xxx"), del("abc")], diffs);

        // Two overlap eliminations.
        let mut diffs = vec![
            del("abcd1212"),
            ins("1212efghi"),
            eq("----"),
            del("A3"),
            ins("3BC"),
        ];
        DiffOptions::cleanup_semantic(&mut diffs);
        assert_eq!(
            vec![
                del("abcd"),
                eq("1212"),
                ins("efghi"),
                eq("----"),
                del("A"),
                eq("3"),
                ins("BC"),
            ],
            diffs
        );
    }

    #[test]
    fn test_cleanup_semantic_lossless() {
        // Null case.
        let mut diffs: Vec<Diff<char>> = vec![];
        DiffOptions::cleanup_semantic_lossless(&mut diffs);
        assert!(diffs.is_empty());

        // Blank lines.
        let mut diffs = vec![
            eq("AAA\r\n\r\nBBB"),
            ins("\r\nDDD\r\n\r\nBBB"),
            eq("\r\nEEE"),
        ];
        DiffOptions::cleanup_semantic_lossless(&mut diffs);
        assert_eq!(
            vec![
                eq("AAA\r\n\r\n"),
                ins("BBB\r\nDDD\r\n\r\n"),
                eq("BBB\r\nEEE"),
            ],
            diffs
        );

        // Line boundaries.
        let mut diffs = vec![eq("AAA\r\nBBB"), ins(" DDD\r\nBBB"), eq(" EEE")];
        DiffOptions::cleanup_semantic_lossless(&mut diffs);
        assert_eq!(
            vec![eq("AAA\r\n"), ins("BBB DDD\r\n"), eq("BBB EEE")],
            diffs
        );

        // Word boundaries.
        let mut diffs = vec![eq("The c"), ins("ow and the c"), eq("at.")];
        DiffOptions::cleanup_semantic_lossless(&mut diffs);
        assert_eq!(vec![eq("The "), ins("cow and the "), eq("cat.")], diffs);

        // Alphanumeric boundaries.
        let mut diffs = vec![eq("The-c"), ins("ow-and-the-c"), eq("at.")];
        DiffOptions::cleanup_semantic_lossless(&mut diffs);
        assert_eq!(vec![eq("The-"), ins("cow-and-the-"), eq("cat.")], diffs);

        // Hitting the start.
        let mut diffs = vec![eq("a"), del("a"), eq("ax")];
        DiffOptions::cleanup_semantic_lossless(&mut diffs);
        assert_eq!(vec![del("a"), eq("aax")], diffs);

        // Hitting the end.
        let mut diffs = vec![eq("xa"), del("a"), eq("a")];
        DiffOptions::cleanup_semantic_lossless(&mut diffs);
        assert_eq!(vec![eq("xaa"), del("a")], diffs);

        // Sentence boundaries.
        let mut diffs = vec![eq("The xxx. The "), ins("zzz. The "), eq("yyy.")];
        DiffOptions::cleanup_semantic_lossless(&mut diffs);
        assert_eq!(
            vec![eq("The xxx."), ins(" The zzz."), eq(" The yyy.")],
            diffs
        );
    }

    #[test]
    fn test_cleanup_efficiency() {
        let mut options = DiffOptions::new();

        // Null case.
        let mut diffs: Vec<Diff<char>> = vec![];
        options.cleanup_efficiency(&mut diffs);
        assert!(diffs.is_empty());

        // No elimination.
        let mut diffs = vec![del("ab"), ins("12"), eq("wxyz"), del("cd"), ins("34")];
        options.cleanup_efficiency(&mut diffs);
        assert_eq!(
            vec![del("ab"), ins("12"), eq("wxyz"), del("cd"), ins("34")],
            diffs
        );

        // Four-edit elimination.
        let mut diffs = vec![del("ab"), ins("12"), eq("xyz"), del("cd"), ins("34")];
        options.cleanup_efficiency(&mut diffs);
        assert_eq!(vec![del("abxyzcd"), ins("12xyz34")], diffs);

        // Three-edit elimination.
        let mut diffs = vec![ins("12"), eq("x"), del("cd"), ins("34")];
        options.cleanup_efficiency(&mut diffs);
        assert_eq!(vec![del("xcd"), ins("12x34")], diffs);

        // Backpass elimination.
        let mut diffs = vec![
            del("ab"),
            ins("12"),
            eq("xy"),
            ins("34"),
            eq("z"),
            del("cd"),
            ins("56"),
        ];
        options.cleanup_efficiency(&mut diffs);
        assert_eq!(vec![del("abxyzcd"), ins("12xy34z56")], diffs);

        // High cost elimination.
        options.set_edit_cost(5);
        let mut diffs = vec![del("ab"), ins("12"), eq("wxyz"), del("cd"), ins("34")];
        options.cleanup_efficiency(&mut diffs);
        assert_eq!(vec![del("abwxyzcd"), ins("12wxyz34")], diffs);
    }

    #[test]
    fn test_bisect() -> Result<(), Error> {
        let mut options = precise();

        // Normal: the bisected diff is raw, not yet normalized.
        assert_eq!(
            vec![del("c"), ins("m"), eq("a"), del("t"), ins("p")],
            options.bisect(&c("cat"), &c("map"), None)?
        );

        // Timeout: an already-spent deadline degrades to delete + insert.
        options.set_timeout(Some(0));
        let deadline = options.deadline();
        assert_eq!(
            vec![del("cat"), ins("map")],
            options.bisect(&c("cat"), &c("map"), deadline)?
        );

        Ok(())
    }

    // The raw edit scripts before any cleanup pass, straight out of the
    // bisection.
    #[test]
    fn test_diff_internal_raw() -> Result<(), Error> {
        let options = precise();

        // Null case.
        assert!(options.diff_internal(&c(""), &c(""), false, None)?.is_empty());

        // Equality.
        assert_eq!(
            vec![eq("abc")],
            options.diff_internal(&c("abc"), &c("abc"), false, None)?
        );

        // Full insertion / deletion.
        assert_eq!(
            vec![ins("abc")],
            options.diff_internal(&c(""), &c("abc"), false, None)?
        );
        assert_eq!(
            vec![del("abc")],
            options.diff_internal(&c("abc"), &c(""), false, None)?
        );

        // Simple insertion.
        assert_eq!(
            vec![eq("ab"), ins("123"), eq("c")],
            options.diff_internal(&c("abc"), &c("ab123c"), false, None)?
        );

        // Simple deletion.
        assert_eq!(
            vec![eq("a"), del("123"), eq("bc")],
            options.diff_internal(&c("a123bc"), &c("abc"), false, None)?
        );

        // Two insertions.
        assert_eq!(
            vec![eq("a"), ins("123"), eq("b"), ins("456"), eq("c")],
            options.diff_internal(&c("abc"), &c("a123b456c"), false, None)?
        );

        // Two deletions.
        assert_eq!(
            vec![eq("a"), del("123"), eq("b"), del("456"), eq("c")],
            options.diff_internal(&c("a123b456c"), &c("abc"), false, None)?
        );

        // Simple substitution.
        assert_eq!(
            vec![del("a"), ins("b")],
            options.diff_internal(&c("a"), &c("b"), false, None)?
        );

        assert_eq!(
            vec![
                del("Apple"),
                ins("Banana"),
                eq("s are a"),
                ins("lso"),
                eq(" fruit."),
            ],
            options.diff_internal(
                &c("Apples are a fruit."),
                &c("Bananas are also fruit."),
                false,
                None
            )?
        );

        // Edits over unicode and control characters.
        assert_eq!(
            vec![del("a"), ins("\u{0680}"), eq("x"), del("\t"), ins("\0")],
            options.diff_internal(&c("ax\t"), &c("\u{0680}x\0"), false, None)?
        );

        // Overlaps.
        assert_eq!(
            vec![del("1"), eq("a"), del("y"), eq("b"), del("2"), ins("xab")],
            options.diff_internal(&c("1ayb2"), &c("abxab"), false, None)?
        );
        assert_eq!(
            vec![ins("xaxcx"), eq("abc"), del("y")],
            options.diff_internal(&c("abcy"), &c("xaxcxabc"), false, None)?
        );
        assert_eq!(
            vec![
                del("ABCD"),
                eq("a"),
                del("="),
                ins("-"),
                eq("bcd"),
                del("="),
                ins("-"),
                eq("efghijklmnopqrs"),
                del("EFGHIJKLMNOefg"),
            ],
            options.diff_internal(
                &c("ABCDa=bcd=efghijklmnopqrsEFGHIJKLMNOefg"),
                &c("a-bcd-efghijklmnopqrs"),
                false,
                None
            )?
        );

        // Large equality.
        assert_eq!(
            vec![
                ins(" "),
                eq("a"),
                ins("nd"),
                eq(" [[Pennsylvania]]"),
                del(" and [[New"),
            ],
            options.diff_internal(
                &c("a [[Pennsylvania]] and [[New"),
                &c(" and [[Pennsylvania]]"),
                false,
                None
            )?
        );

        Ok(())
    }

    // The full pipeline: raw diff followed by the semantic and efficiency
    // cleanup passes.
    #[test]
    fn test_diff_cleaned() -> Result<(), Error> {
        let options = precise();

        // Two-diff scripts skip the cleanup passes entirely.
        assert_eq!(vec![del("a"), ins("b")], options.diff("a", "b")?);

        // A short equality flanked by insertions survives untouched.
        assert_eq!(
            vec![eq("abc"), ins("d"), eq("xyz")],
            options.diff("abcxyz", "abcdxyz")?
        );

        // Edits land on the line boundary.
        assert_eq!(
            vec![eq("a\n"), del("b"), ins("B"), eq("\nc")],
            options.diff("a\nb\nc", "a\nB\nc")?
        );

        // A one-character equality dominated by edits on both sides is
        // dissolved into them.
        assert_eq!(
            vec![del("ax\t"), ins("\u{0680}x\0")],
            options.diff("ax\t", "\u{0680}x\0")?
        );
        assert_eq!(
            vec![del("1ayb2"), ins("abxab")],
            options.diff("1ayb2", "abxab")?
        );
        assert_eq!(
            vec![eq("a"), del("b"), ins("123b456"), eq("c")],
            options.diff("abc", "a123b456c")?
        );

        // Untouched by every pass.
        assert_eq!(
            vec![
                del("Apple"),
                ins("Banana"),
                eq("s are a"),
                ins("lso"),
                eq(" fruit."),
            ],
            options.diff("Apples are a fruit.", "Bananas are also fruit.")?
        );

        Ok(())
    }

    #[test]
    fn test_diff_reconstruction() -> Result<(), Error> {
        let cases = [
            ("", "abc"),
            ("abc", ""),
            (
                "This is the original text.",
                "This is a revised text with multiple differences.",
            ),
            ("abcxyz", "abcdxyz"),
            ("a\nb\nc", "a\nB\nc"),
            ("The quick brown fox.", "The quick red fox jumps."),
        ];

        for options in [DiffOptions::new(), precise()] {
            for (old, new) in cases {
                let diffs = options.diff(old, new)?;
                assert_eq!(old, apply_old(&diffs), "old text mismatch for {old:?}");
                assert_eq!(new, apply_new(&diffs), "new text mismatch for {new:?}");
            }
        }

        Ok(())
    }

    #[test]
    fn test_diff_line_mode_reconstruction() -> Result<(), Error> {
        // 13 repetitions push both sides well past the line-mode threshold.
        let old = "1234567890\n".repeat(13);
        let new = "abcdefghij\n".repeat(13);

        let mut line_mode = DiffOptions::new();
        line_mode.set_checklines(true);
        let mut char_mode = DiffOptions::new();
        char_mode.set_checklines(false);

        let diffs = line_mode.diff(&old, &new)?;
        assert_eq!(old, apply_old(&diffs));
        assert_eq!(new, apply_new(&diffs));

        // Both modes agree on the texts they rebuild.
        let char_diffs = char_mode.diff(&old, &new)?;
        assert_eq!(apply_new(&char_diffs), apply_new(&diffs));

        // Mixed edits across many lines.
        let old = "The quick brown fox\njumps over\nthe lazy dog\n".repeat(10);
        let new = old.replace("lazy", "energetic");
        let diffs = line_mode.diff(&old, &new)?;
        assert_eq!(old, apply_old(&diffs));
        assert_eq!(new, apply_new(&diffs));

        Ok(())
    }

    #[test]
    fn test_diff_timeout_degrades() -> Result<(), Error> {
        let mut options = DiffOptions::new();
        options.set_timeout(Some(0));

        let old = "`Twas brillig, and the slithy toves\nDid gyre and gimble in the wabe.\n"
            .repeat(50);
        let new = "I am the very model of a modern major general,\nI've information vegetable.\n"
            .repeat(50);

        // Still a valid edit script, just a coarse one.
        let diffs = options.diff(&old, &new)?;
        assert_eq!(old, apply_old(&diffs));
        assert_eq!(new, apply_new(&diffs));

        Ok(())
    }

    #[test]
    fn test_word_diff() -> Result<(), Error> {
        let options = DiffOptions::new();

        let diffs = options.word_diff(
            "The quick brown fox jumps over the lazy dog",
            "The quick red fox walks over the lazy dog",
        )?;
        assert_eq!(
            "The quick brown fox jumps over the lazy dog",
            apply_old(&diffs)
        );
        assert_eq!(
            "The quick red fox walks over the lazy dog",
            apply_new(&diffs)
        );

        // Equal inputs stay a single equality.
        let diffs = options.word_diff("same words here", "same words here")?;
        assert_eq!(vec![eq("same words here")], diffs);

        // Null case.
        assert!(options.word_diff("", "")?.is_empty());

        Ok(())
    }

    #[test]
    fn test_word_diff_normal_form() -> Result<(), Error> {
        let options = DiffOptions::new();
        let diffs = options.word_diff(
            "one two three four five",
            "one deux three quatre cinq five",
        )?;

        for pair in diffs.windows(2) {
            assert_ne!(pair[0].op(), pair[1].op());
        }
        for diff in &diffs {
            assert!(!diff.data().is_empty());
        }

        Ok(())
    }

    #[test]
    fn test_x_index() {
        // Translation on equality.
        assert_eq!(5, x_index(&[del("a"), ins("1234"), eq("xyz")], 2));
        // Translation on deletion.
        assert_eq!(1, x_index(&[eq("a"), del("1234"), eq("xyz")], 3));
    }

    #[test]
    fn test_levenshtein() {
        // Levenshtein with trailing equality.
        assert_eq!(4, levenshtein(&[del("abc"), ins("1234"), eq("xyz")]));
        // Levenshtein with leading equality.
        assert_eq!(4, levenshtein(&[eq("xyz"), del("abc"), ins("1234")]));
        // Levenshtein with middle equality.
        assert_eq!(7, levenshtein(&[del("abc"), eq("xyz"), ins("1234")]));
    }

    #[test]
    fn test_semantic_score_ordering() {
        // A boundary on a blank line beats one on a word boundary, which in
        // turn beats one in the middle of a word.
        let blank = DiffOptions::semantic_score(&c("one\n\n"), &c("two"));
        let line = DiffOptions::semantic_score(&c("one\n"), &c("two"));
        let sentence = DiffOptions::semantic_score(&c("one."), &c(" two"));
        let word = DiffOptions::semantic_score(&c("one "), &c("two"));
        let none = DiffOptions::semantic_score(&c("one"), &c("two"));

        assert_eq!(5, blank);
        assert_eq!(4, line);
        assert_eq!(3, sentence);
        assert_eq!(2, word);
        assert_eq!(0, none);
        assert_eq!(6, DiffOptions::semantic_score(&c(""), &c("two")));
    }
}
