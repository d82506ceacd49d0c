//! Insertion payload codec for the delta wire format.
//!
//! Inserted text travels inside a tab-separated delta string, so the encoded
//! form must never contain a raw tab. Payloads are percent-encoded UTF-8 with
//! the `encodeURI` whitelist (plus space) left literal, which keeps the
//! common case human-readable on the wire. The embedded `+`, `-` and `=`
//! characters are harmless: tokens are tab-delimited and a sigil is only ever
//! the first character of a token.

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::errors::Error;

/// Everything outside this set is escaped. Mirrors the whitelist the delta
/// format was originally defined against: ASCII alphanumerics plus
/// `! * ' ( ) ; / ? : @ & = + $ , # ~ - _ .` and space.
const PAYLOAD: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b' ')
    .remove(b'!')
    .remove(b'#')
    .remove(b'$')
    .remove(b'&')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b'*')
    .remove(b'+')
    .remove(b',')
    .remove(b'-')
    .remove(b'.')
    .remove(b'/')
    .remove(b':')
    .remove(b';')
    .remove(b'=')
    .remove(b'?')
    .remove(b'@')
    .remove(b'_')
    .remove(b'~');

/// Encodes `text` for transport inside a delta token.
pub fn compress(text: &str) -> String {
    utf8_percent_encode(text, PAYLOAD).to_string()
}

/// Decodes a payload produced by [`compress`].
///
/// Stray `%` sequences that do not form a valid escape pass through
/// literally; anything that fails to decode back to UTF-8 is rejected.
pub fn decompress(text: &str) -> Result<String, Error> {
    percent_decode_str(text)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .map_err(|_| Error::Decode)
}
