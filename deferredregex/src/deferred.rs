use std::borrow::Cow;
use std::convert::Infallible;
use std::fmt::{self, Debug, Display, Formatter};
use std::ops::Deref;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::de::{self, Deserialize, Deserializer, Unexpected, Visitor};
use serde::{Serialize, Serializer};
use tracing::{event, Level};

use super::compile::Compile;
use super::error::Unsupported;


/// A regular expression which is compiled the first time it is used.
///
/// Every operation which needs the compiled regex (matching,
/// searching, replacing, splitting and most introspection) compiles
/// the pattern if that has not happened yet.  Compilation happens at
/// most once even when many threads make their first call at the same
/// time; they all wait for it and then share the result.
///
/// Reading or replacing the pattern text ([`pattern`](Self::pattern),
/// [`set_pattern`](Self::set_pattern), `Display`, `FromStr` and the
/// serde impls) never compiles anything.  That is what allows a
/// `DeferredRegex` to sit inside configuration which is loaded at
/// startup.
///
/// Once the regex has been compiled, changing the pattern has no
/// effect on matching: the compiled regex stays bound to the pattern
/// it was compiled from.
pub struct DeferredRegex<R: Compile = Regex> {
    pattern: Cow<'static, str>,
    once: OnceLock<Result<R, R::Error>>,
}

/// Runs at most once per gate, so the outcome is logged only once
/// however often it is consulted.
fn compile_pattern<R: Compile>(pattern: &str) -> Result<R, R::Error> {
    event!(Level::DEBUG, "compiling deferred regex '{pattern}'");
    let result = R::compile(pattern);
    if let Err(e) = &result {
        event!(Level::WARN, "deferred regex '{pattern}' failed to compile: {e}");
    }
    result
}

impl<R: Compile> DeferredRegex<R> {
    /// Declare a regex without compiling it.  This is a `const fn` so
    /// that it can initialise a `static`.
    #[must_use]
    pub const fn new(pattern: &'static str) -> Self {
        DeferredRegex {
            pattern: Cow::Borrowed(pattern),
            once: OnceLock::new(),
        }
    }

    /// The current pattern text.  This does not compile the regex.
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Replace the pattern text.  This does not compile the regex.
    ///
    /// If the regex has already been compiled, the new pattern is
    /// recorded (and will be rendered by [`pattern`](Self::pattern))
    /// but matching continues to use the pattern which was compiled.
    pub fn set_pattern(&mut self, pattern: impl Into<Cow<'static, str>>) {
        let pattern = pattern.into();
        if self.is_compiled() {
            event!(
                Level::DEBUG,
                "pattern of compiled regex '{}' set to '{}'; matching will still use the compiled pattern",
                self.pattern,
                pattern
            );
        }
        self.pattern = pattern;
    }

    /// Returns true if the regex has been compiled (successfully or
    /// not).
    #[must_use]
    pub fn is_compiled(&self) -> bool {
        self.once.get().is_some()
    }

    /// Compile the regex if that has not happened yet, and return it.
    ///
    /// # Errors
    ///
    /// Returns the engine's error when the pattern is invalid.  The
    /// outcome is remembered, so an invalid pattern is not compiled
    /// again on later calls.
    pub fn try_compiled(&self) -> Result<&R, &R::Error> {
        self.once
            .get_or_init(|| compile_pattern(&self.pattern))
            .as_ref()
    }

    /// Compile the regex if that has not happened yet, and return it.
    ///
    /// # Panics
    ///
    /// Panics if the pattern is not a valid regular expression.
    pub fn compiled(&self) -> &R {
        match self.try_compiled() {
            Ok(r) => r,
            Err(e) => panic!("'{}' is not a valid regular expression: {e}", self.pattern),
        }
    }

    /// Make future searches prefer leftmost-longest matches.
    ///
    /// This compiles the regex (if necessary) and then reconfigures
    /// it, so it must happen before the regex is shared with other
    /// threads; taking `&mut self` ensures that.
    ///
    /// # Errors
    ///
    /// Returns [`Unsupported::LeftmostLongest`] if the engine only
    /// implements leftmost-first matching.  The engines in the `regex`
    /// crate are like that.
    pub fn longest(&mut self) -> Result<(), Unsupported> {
        self.compiled();
        match self.once.get_mut() {
            Some(Ok(r)) => r.set_leftmost_longest(),
            // compiled() has initialised the gate, or panicked.
            Some(Err(_)) | None => unreachable!(),
        }
    }
}

impl<R: Compile> Deref for DeferredRegex<R> {
    type Target = R;

    fn deref(&self) -> &R {
        self.compiled()
    }
}

impl<R: Compile> Default for DeferredRegex<R> {
    fn default() -> Self {
        DeferredRegex::new("")
    }
}

impl<R: Compile> From<String> for DeferredRegex<R> {
    fn from(pattern: String) -> Self {
        DeferredRegex {
            pattern: Cow::Owned(pattern),
            once: OnceLock::new(),
        }
    }
}

impl<R: Compile> From<&str> for DeferredRegex<R> {
    fn from(pattern: &str) -> Self {
        DeferredRegex::from(pattern.to_owned())
    }
}

/// Parsing accepts any text; the pattern is only checked when the
/// regex is first used.  This is the conversion `clap` uses for
/// command-line arguments.
impl<R: Compile> FromStr for DeferredRegex<R> {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Infallible> {
        Ok(DeferredRegex::from(s))
    }
}

impl<R: Compile> Display for DeferredRegex<R> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        f.write_str(&self.pattern)
    }
}

impl<R: Compile> Debug for DeferredRegex<R> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        f.debug_struct("DeferredRegex")
            .field("pattern", &self.pattern)
            .field("compiled", &self.is_compiled())
            .finish()
    }
}

impl<R> Clone for DeferredRegex<R>
where
    R: Compile + Clone,
    R::Error: Clone,
{
    fn clone(&self) -> Self {
        DeferredRegex {
            pattern: self.pattern.clone(),
            once: self.once.clone(),
        }
    }
}

/// Two deferred regexes are equal when their pattern text is equal.
impl<R: Compile> PartialEq for DeferredRegex<R> {
    fn eq(&self, other: &Self) -> bool {
        self.pattern == other.pattern
    }
}

impl<R: Compile> Eq for DeferredRegex<R> {}

impl<R: Compile> Serialize for DeferredRegex<R> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.pattern)
    }
}

struct PatternVisitor;

impl Visitor<'_> for PatternVisitor {
    type Value = String;

    fn expecting(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("a regular expression")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<String, E> {
        Ok(v.to_owned())
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<String, E> {
        Ok(v)
    }

    fn visit_bytes<E: de::Error>(self, v: &[u8]) -> Result<String, E> {
        match std::str::from_utf8(v) {
            Ok(s) => Ok(s.to_owned()),
            Err(_) => Err(E::invalid_value(Unexpected::Bytes(v), &self)),
        }
    }
}

impl<'de, R: Compile> Deserialize<'de> for DeferredRegex<R> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer
            .deserialize_str(PatternVisitor)
            .map(DeferredRegex::from)
    }

    // Loading into an existing value only replaces the pattern text;
    // a regex which is already compiled stays compiled.
    fn deserialize_in_place<D: Deserializer<'de>>(
        deserializer: D,
        place: &mut Self,
    ) -> Result<(), D::Error> {
        let pattern = deserializer.deserialize_str(PatternVisitor)?;
        place.set_pattern(pattern);
        Ok(())
    }
}
