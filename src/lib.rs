//! Strict Myers diff, compact delta serialization and revision replay.
//!
//! Given two strings, the engine computes a minimal edit script, cleans it up
//! for humans or for transport, and can compress it into a [`Revision`]: a
//! tab-separated delta like `=8\t-5\t+man\t=17` that reapplies on top of the
//! exact original text. Application is strict by design: no fuzzy matching,
//! no positional search, no context windows.
//!
//! ```
//! use redelta::{diff, apply_new, revision, Error};
//!
//! # fn main() -> Result<(), Error> {
//! let diffs = diff("The old house and the new dog!", "The old man and the new dog!")?;
//! assert_eq!("The old man and the new dog!", apply_new(&diffs));
//!
//! let revision = revision("The old house and the new dog!", "The old man and the new dog!")?;
//! assert_eq!(
//!     "The old man and the new dog!",
//!     revision.apply("The old house and the new dog!")?
//! );
//! # Ok(())
//! # }
//! ```

pub mod codec;
pub mod engine;
pub mod errors;
pub mod format;
pub mod fuzz;
pub mod revision;
mod tokens;
pub mod unit;

pub use engine::{apply_new, apply_old, levenshtein, x_index, Diff, DiffOptions, Ops};
pub use errors::Error;
pub use format::{format, render, Format};
pub use revision::{apply_sequence, Patch, Revision};
pub use unit::Unit;

/// Character-level diff of two texts with default options.
pub fn diff(old: &str, new: &str) -> Result<Vec<Diff<char>>, Error> {
    DiffOptions::new().diff(old, new)
}

/// Word-granularity diff of two texts with default options.
pub fn word_diff(old: &str, new: &str) -> Result<Vec<Diff<char>>, Error> {
    DiffOptions::new().word_diff(old, new)
}

/// Diffs two texts and compresses the result into a [`Revision`].
pub fn revision(old: &str, new: &str) -> Result<Revision, Error> {
    Revision::new(old, new)
}

/// Parses the delta form of a revision; `None` if it is malformed.
pub fn revision_parse(delta: &str) -> Option<Revision> {
    delta.parse().ok()
}
