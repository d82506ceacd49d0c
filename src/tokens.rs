//! Line and word tokenization for coarse-grained diffing.
//!
//! Long inputs are first diffed over token ids, then the interesting runs are
//! re-diffed character by character. Each unique token gets a `u32` id into a
//! dictionary scoped to a single diff call; id 0 is a reserved empty slot so
//! a real token never maps to zero.

use std::collections::HashMap;

use crate::engine::Diff;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TokenMode {
    Lines,
    Words,
}

pub(crate) struct Tokenized<'a> {
    pub(crate) old_ids: Vec<u32>,
    pub(crate) new_ids: Vec<u32>,
    pub(crate) tokens: Vec<&'a [char]>,
}

// The old text gets roughly 2/3rds of the id space, the new text the rest.
// Past the cap the remainder of a text collapses into one tail token.
const OLD_TOKEN_CAP: usize = 40_000;
const TOKEN_CAP: usize = 65_535;

pub(crate) fn tokenize<'a>(old: &'a [char], new: &'a [char], mode: TokenMode) -> Tokenized<'a> {
    let mut tokens: Vec<&'a [char]> = vec![&[]];
    let mut ids: HashMap<&'a [char], u32> = HashMap::new();

    let old_ids = tokenize_into(old, mode, &mut tokens, &mut ids, OLD_TOKEN_CAP);
    let new_ids = tokenize_into(new, mode, &mut tokens, &mut ids, TOKEN_CAP);

    Tokenized {
        old_ids,
        new_ids,
        tokens,
    }
}

fn tokenize_into<'a>(
    text: &'a [char],
    mode: TokenMode,
    tokens: &mut Vec<&'a [char]>,
    ids: &mut HashMap<&'a [char], u32>,
    cap: usize,
) -> Vec<u32> {
    let mut out = Vec::new();
    let mut cursor = 0;

    while cursor < text.len() {
        if tokens.len() >= cap {
            out.push(intern(&text[cursor..], tokens, ids));
            return out;
        }

        let end = match mode {
            TokenMode::Lines => line_end(text, cursor),
            TokenMode::Words => word_end(text, cursor),
        };
        out.push(intern(&text[cursor..end], tokens, ids));
        cursor = end;
    }

    out
}

fn intern<'a>(
    token: &'a [char],
    tokens: &mut Vec<&'a [char]>,
    ids: &mut HashMap<&'a [char], u32>,
) -> u32 {
    *ids.entry(token).or_insert_with(|| {
        tokens.push(token);
        (tokens.len() - 1) as u32
    })
}

// A line token ends at the first '\n' (inclusive) or end of text.
fn line_end(text: &[char], start: usize) -> usize {
    match text[start..].iter().position(|&c| c == '\n') {
        Some(at) => start + at + 1,
        None => text.len(),
    }
}

// A word token is a maximal run of whitespace or of non-whitespace.
fn word_end(text: &[char], start: usize) -> usize {
    let in_whitespace = text[start].is_whitespace();
    let mut end = start + 1;
    while end < text.len() && text[end].is_whitespace() == in_whitespace {
        end += 1;
    }

    end
}

/// Rewrites token-id diffs back to their textual form.
pub(crate) fn expand(diffs: &[Diff<u32>], tokens: &[&[char]]) -> Vec<Diff<char>> {
    diffs
        .iter()
        .map(|diff| {
            let text = diff
                .data()
                .iter()
                .flat_map(|&id| tokens[id as usize].iter().copied())
                .collect::<Vec<_>>();

            Diff::new(diff.op(), &text)
        })
        .collect()
}
