//! Literal prefix extraction.
//!
//! The `regex` crate does not tell us which literal every match
//! begins with, but its parser (`regex-syntax`) can work that out.

use regex_syntax::hir::literal::Extractor;
use regex_syntax::ParserBuilder;

/// Returns the literal bytes which begin every match of `pattern`,
/// and whether that literal is the whole of the regex (meaning the
/// regex matches only that literal).
///
/// `utf8` should be false for patterns intended to match arbitrary
/// bytes, mirroring the difference between `regex::Regex` and
/// `regex::bytes::Regex`.
pub(crate) fn literal_prefix(pattern: &str, utf8: bool) -> (Vec<u8>, bool) {
    let hir = match ParserBuilder::new().utf8(utf8).build().parse(pattern) {
        Ok(hir) => hir,
        // The engine accepted this pattern, so the parser should too;
        // if it doesn't, we just don't know of a prefix.
        Err(_) => return (Vec::new(), false),
    };
    // Literals must not be cut short by length or repetition limits.
    let seq = Extractor::new()
        .limit_literal_len(usize::MAX)
        .limit_repeat(usize::MAX)
        .extract(&hir);
    let prefix: Vec<u8> = match seq.longest_common_prefix() {
        Some(prefix) => prefix.to_vec(),
        None => return (Vec::new(), false),
    };
    let complete =
        seq.is_exact() && seq.len() == Some(1) && hir.properties().look_set().is_empty();
    (prefix, complete)
}

/// Like [`literal_prefix`] but for `&str` patterns.  A prefix which
/// ends partway through a UTF-8 sequence is shortened to the last
/// whole character (and so is no longer complete).
pub(crate) fn literal_prefix_str(pattern: &str) -> (String, bool) {
    let (prefix, complete) = literal_prefix(pattern, true);
    match String::from_utf8(prefix) {
        Ok(s) => (s, complete),
        Err(e) => {
            let valid = e.utf8_error().valid_up_to();
            let mut bytes = e.into_bytes();
            bytes.truncate(valid);
            match String::from_utf8(bytes) {
                Ok(s) => (s, false),
                Err(_) => (String::new(), false),
            }
        }
    }
}
