//! The seam between a `DeferredRegex` and the engine which does the
//! real work.

use super::error::Unsupported;

/// A compiled regular expression which a
/// [`DeferredRegex`](crate::DeferredRegex) can create on demand.
///
/// This is implemented for [`regex::Regex`] and
/// [`regex::bytes::Regex`].  Other implementations are mostly useful
/// for instrumenting compilation (for example, counting how often it
/// happens).
pub trait Compile: Sized {
    /// The error produced for an invalid pattern.
    type Error: std::error::Error;

    /// Compile `pattern`.
    ///
    /// # Errors
    ///
    /// Returns the engine's error when `pattern` is not a valid
    /// regular expression.
    fn compile(pattern: &str) -> Result<Self, Self::Error>;

    /// Switch this regex to prefer leftmost-longest matches in future
    /// searches.
    ///
    /// # Errors
    ///
    /// The default implementation reports
    /// [`Unsupported::LeftmostLongest`], which is the right answer
    /// for engines (such as those in the `regex` crate) that only
    /// implement leftmost-first semantics.
    fn set_leftmost_longest(&mut self) -> Result<(), Unsupported> {
        Err(Unsupported::LeftmostLongest)
    }
}

impl Compile for regex::Regex {
    type Error = regex::Error;

    fn compile(pattern: &str) -> Result<Self, Self::Error> {
        regex::Regex::new(pattern)
    }
}

impl Compile for regex::bytes::Regex {
    type Error = regex::Error;

    fn compile(pattern: &str) -> Result<Self, Self::Error> {
        regex::bytes::Regex::new(pattern)
    }
}
