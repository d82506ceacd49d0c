//! Render an edit list for humans or the wire.

use std::fmt::Write;
use std::str::FromStr;

use crate::engine::{Diff, Ops};
use crate::errors::Error;
use crate::revision::Revision;

/// The supported renderings of an edit list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// The delta wire format, tab-separated patch tokens.
    Delta,
    /// `- `/`+ ` prefixed lines, newline-separated.
    Gnu,
    /// `~~deleted~~` / `++inserted++` inline markup.
    Markdown,
    /// `<span>` elements classed `diff-deleted` / `diff-inserted`.
    Html,
}

impl FromStr for Format {
    type Err = Error;

    fn from_str(tag: &str) -> Result<Self, Error> {
        match tag {
            "delta" => Ok(Self::Delta),
            "gnu" => Ok(Self::Gnu),
            "md" => Ok(Self::Markdown),
            "html" => Ok(Self::Html),
            _ => Err(Error::UnknownFormat),
        }
    }
}

/// Renders `diffs` in the format named by `tag`, one of `delta`, `gnu`, `md`
/// or `html`. An unrecognized tag is an error.
pub fn format(diffs: &[Diff<char>], tag: &str) -> Result<String, Error> {
    Ok(render(diffs, tag.parse()?))
}

/// Renders `diffs` in an already-resolved [`Format`].
pub fn render(diffs: &[Diff<char>], format: Format) -> String {
    match format {
        Format::Delta => Revision::from_diffs(diffs).to_string(),
        Format::Gnu => diffs
            .iter()
            .map(|diff| match diff.op() {
                Ops::Insert => format!("+ {}", diff.text()),
                Ops::Delete => format!("- {}", diff.text()),
                Ops::Equal => diff.text(),
            })
            .collect::<Vec<_>>()
            .join("\n"),
        Format::Markdown => diffs.iter().fold(String::new(), |mut out, diff| {
            let _ = match diff.op() {
                Ops::Insert => write!(out, "++{}++", diff.text()),
                Ops::Delete => write!(out, "~~{}~~", diff.text()),
                Ops::Equal => write!(out, "{}", diff.text()),
            };
            out
        }),
        Format::Html => diffs.iter().fold(String::new(), |mut out, diff| {
            let _ = match diff.op() {
                Ops::Insert => write!(
                    out,
                    "<span class=\"diff-inserted\">{}</span>",
                    diff.text()
                ),
                Ops::Delete => write!(
                    out,
                    "<span class=\"diff-deleted\">{}</span>",
                    diff.text()
                ),
                Ops::Equal => write!(out, "{}", diff.text()),
            };
            out
        }),
    }
}
