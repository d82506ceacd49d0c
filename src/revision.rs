//! Patches, revisions and the strict applier.
//!
//! A [`Patch`] is the transport form of a single diff: insertions carry their
//! compressed text, deletions and equalities only a length. A [`Revision`] is
//! an ordered list of patches and serializes to the tab-separated delta wire
//! format, e.g. `=3\t-2\t+ing` to keep 3 units, delete 2 and insert `ing`.
//!
//! Application is strict: the source text must have exactly the shape the
//! revision was computed from. There is no fuzzy matching and no positional
//! search; a mismatch fails the whole application.

use std::fmt::{self, Display};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::codec;
use crate::engine::{Diff, DiffOptions, Ops};
use crate::errors::Error;

/// Transport form of a single diff.
///
/// Invariants: an `Insert` patch carries the compressed inserted text and its
/// `length` is unused; `Delete` and `Equal` patches carry a positive length
/// and no text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patch {
    op: Ops,
    length: usize,
    data: Option<String>,
}

impl Patch {
    pub(crate) fn from_diff(diff: &Diff<char>) -> Self {
        match diff.op() {
            Ops::Insert => Self {
                op: Ops::Insert,
                length: 0,
                data: Some(codec::compress(&diff.text())),
            },
            op => Self {
                op,
                length: diff.size(),
                data: None,
            },
        }
    }

    pub fn op(&self) -> Ops {
        self.op
    }

    /// Number of source units consumed; 0 for insertions.
    pub fn length(&self) -> usize {
        self.length
    }

    /// The compressed insertion payload, if any.
    pub fn data(&self) -> Option<&str> {
        self.data.as_deref()
    }
}

impl Display for Patch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.op {
            Ops::Insert => write!(f, "+{}", self.data.as_deref().unwrap_or_default()),
            Ops::Delete => write!(f, "-{}", self.length),
            Ops::Equal => write!(f, "={}", self.length),
        }
    }
}

/// An ordered sequence of patches describing one `old -> new` transition.
///
/// A revision keeps no reference to either text; applying it to the exact
/// original reproduces the target.
///
/// # Example
/// ```
/// use redelta::{Error, Revision};
///
/// # fn main() -> Result<(), Error> {
/// let revision = Revision::new("Apples are a fruit.", "Bananas are also fruit.")?;
/// assert_eq!(
///     "Bananas are also fruit.",
///     revision.apply("Apples are a fruit.")?
/// );
///
/// // The delta form survives the wire.
/// let parsed: Revision = revision.to_string().parse()?;
/// assert_eq!(revision, parsed);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Revision(Vec<Patch>);

impl Revision {
    /// Diffs `old` against `new` with default options and compresses the
    /// result.
    pub fn new(old: &str, new: &str) -> Result<Self, Error> {
        Self::with_options(old, new, &DiffOptions::default())
    }

    /// Same as [`Revision::new`] with caller-provided engine options.
    pub fn with_options(old: &str, new: &str, options: &DiffOptions) -> Result<Self, Error> {
        let diffs = options.diff(old, new)?;

        Ok(Self::from_diffs(&diffs))
    }

    /// Compresses an existing edit list.
    pub fn from_diffs(diffs: &[Diff<char>]) -> Self {
        Self(diffs.iter().map(Patch::from_diff).collect())
    }

    pub fn patches(&self) -> &[Patch] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Replays the revision on top of `text`.
    ///
    /// The walk is shape-checked, not content-checked: a `Delete` or `Equal`
    /// patch consumes its length from wherever the cursor is, every patch
    /// must stay inside the text and the final patch must land exactly on its
    /// end. Any violation fails the application.
    pub fn apply(&self, text: &str) -> Result<String, Error> {
        let chars = text.chars().collect::<Vec<_>>();

        let mut cursor = 0;
        let mut out = String::with_capacity(text.len());

        for patch in &self.0 {
            match patch.op {
                Ops::Insert => {
                    let data = patch.data.as_deref().ok_or(Error::MissingPayload)?;
                    out.push_str(&codec::decompress(data)?);
                }
                Ops::Delete | Ops::Equal => {
                    if patch.length == 0 {
                        return Err(Error::BadLength);
                    }
                    if cursor + patch.length > chars.len() {
                        return Err(Error::Overrun);
                    }

                    if patch.op == Ops::Equal {
                        out.extend(&chars[cursor..cursor + patch.length]);
                    }
                    cursor += patch.length;
                }
            }
        }

        if cursor != chars.len() {
            return Err(Error::UnconsumedTail);
        }

        Ok(out)
    }
}

impl Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (at, patch) in self.0.iter().enumerate() {
            if at > 0 {
                write!(f, "\t")?;
            }
            write!(f, "{patch}")?;
        }

        Ok(())
    }
}

impl FromStr for Revision {
    type Err = Error;

    /// Parses the tab-separated delta form. Empty tokens between consecutive
    /// tabs are skipped; anything else must be a well-formed patch token.
    fn from_str(delta: &str) -> Result<Self, Error> {
        let mut patches = Vec::new();

        for token in delta.split('\t') {
            let mut units = token.chars();
            let Some(sigil) = units.next() else {
                continue;
            };
            let payload = units.as_str();

            match sigil {
                '+' => {
                    // Validate now so application can't trip over it later.
                    codec::decompress(payload)?;
                    patches.push(Patch {
                        op: Ops::Insert,
                        length: 0,
                        data: Some(payload.to_string()),
                    });
                }
                '-' | '=' => {
                    if payload.is_empty() || !payload.bytes().all(|b| b.is_ascii_digit()) {
                        return Err(Error::BadLength);
                    }
                    let length = payload.parse::<usize>().map_err(|_| Error::BadLength)?;
                    if length == 0 {
                        return Err(Error::BadLength);
                    }

                    let op = if sigil == '-' { Ops::Delete } else { Ops::Equal };
                    patches.push(Patch {
                        op,
                        length,
                        data: None,
                    });
                }
                _ => return Err(Error::BadSigil),
            }
        }

        Ok(Self(patches))
    }
}

/// Replays a chain of revisions strictly in order. The first failure aborts
/// the whole chain; later revisions are not attempted.
pub fn apply_sequence(revisions: &[Revision], text: &str) -> Result<String, Error> {
    revisions
        .iter()
        .try_fold(text.to_string(), |current, revision| {
            revision.apply(&current)
        })
}
