//! Errors reported by the regex engines behind a `DeferredRegex`.

use std::error::Error;
use std::fmt::{self, Display, Formatter};

/// Signals that a regex engine does not offer a configuration which
/// was asked of it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Unsupported {
    /// The engine only implements leftmost-first matching.
    LeftmostLongest,
}

impl Error for Unsupported {}

impl Display for Unsupported {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            Unsupported::LeftmostLongest => {
                f.write_str("this regex engine does not support leftmost-longest matching")
            }
        }
    }
}
