//! Line unfolding.
//!
//! Producers wrap long content lines by inserting a CRLF immediately followed by a single
//! SPACE or HTAB. Unfolding removes exactly that sequence and nothing else, turning the raw
//! document into one logical line per content line.
//!
//! Unfolding works on bytes: a producer may split a multi-octet UTF-8 character across two
//! physical lines, so the document is only decoded once the folds are gone.

use std::borrow::Cow;

#[inline]
fn is_fold_whitespace(byte: u8) -> bool {
    byte == b' ' || byte == b'\t'
}

fn has_fold(input: &[u8]) -> bool {
    input
        .windows(3)
        .any(|w| w[0] == b'\r' && w[1] == b'\n' && is_fold_whitespace(w[2]))
}

/// Remove every folding sequence from `input`.
///
/// The output never contains a CRLF followed by SPACE or HTAB, so unfolding is idempotent.
/// Input without any fold is returned borrowed.
pub fn unfold_bytes(input: &[u8]) -> Cow<'_, [u8]> {
    if !has_fold(input) {
        return Cow::Borrowed(input);
    }

    let mut out: Vec<u8> = Vec::with_capacity(input.len());
    for &byte in input {
        if is_fold_whitespace(byte) && out.ends_with(b"\r\n") {
            // The whitespace swallows the terminator it follows.
            out.truncate(out.len() - 2);
        } else {
            out.push(byte);
        }
    }
    Cow::Owned(out)
}

/// Remove every folding sequence from `input`. See [`unfold_bytes`].
pub fn unfold(input: &str) -> Cow<'_, str> {
    match unfold_bytes(input.as_bytes()) {
        Cow::Borrowed(_) => Cow::Borrowed(input),
        // Only ASCII bytes are removed, so valid UTF-8 stays valid.
        Cow::Owned(bytes) => Cow::Owned(
            String::from_utf8(bytes)
                .unwrap_or_else(|err| String::from_utf8_lossy(err.as_bytes()).into_owned()),
        ),
    }
}
