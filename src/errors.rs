use thiserror::Error;

/// Failures surfaced by the delta parser and the revision applier.
///
/// The diff engine itself never fails: on deadline expiry it degrades to a
/// coarse `[Delete, Insert]` script instead of erroring out.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A delta token did not start with one of the sigils `+`, `-` or `=`.
    #[error("delta token carries an unknown sigil")]
    BadSigil,
    /// The payload of a `-` or `=` token was not a positive base-10 integer.
    #[error("patch length must be a positive integer")]
    BadLength,
    /// A `+` payload did not decode back to valid UTF-8.
    #[error("compressed payload is not valid utf-8")]
    Decode,
    /// An insert patch without a payload; only reachable through
    /// hand-constructed or deserialized revisions.
    #[error("insert patch carries no payload")]
    MissingPayload,
    /// A patch asked for more characters than the source text has left.
    #[error("patch overruns the end of the source text")]
    Overrun,
    /// The source text was longer than the revision accounts for.
    #[error("source text left unconsumed after the final patch")]
    UnconsumedTail,
    /// The format tag handed to [`format`](crate::format::format) is not one
    /// of `delta`, `gnu`, `md` or `html`.
    #[error("unknown format tag")]
    UnknownFormat,
}
