use crate::engine::{apply_new, apply_old, DiffOptions};
use crate::errors::Error;
use crate::revision::{apply_sequence, Revision};

/// Exercises the whole pipeline for one pair of texts: reconstruction from
/// the edit list, revision application and the delta round trip. Panics on
/// the first property that does not hold; meant to be driven with arbitrary
/// input.
pub fn fuzz(old: &str, new: &str) -> Result<(), Error> {
    let options = DiffOptions::new();

    let diffs = options.diff(old, new)?;
    assert_eq!(old, apply_old(&diffs));
    assert_eq!(new, apply_new(&diffs));

    let revision = Revision::new(old, new)?;
    assert_eq!(new, revision.apply(old)?);

    let parsed: Revision = revision.to_string().parse()?;
    assert_eq!(revision, parsed);
    assert_eq!(new, apply_sequence(&[parsed], old)?);

    Ok(())
}
