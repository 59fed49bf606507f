//! Operations on a [`DeferredRegex`] which searches `&str`.
//!
//! Each of these compiles the regex if necessary and then hands the
//! work to [`regex::Regex`].

use std::borrow::Cow;
use std::ops::Range;

use regex::{CaptureNames, Captures, Match, NoExpand, Regex};

use super::deferred::DeferredRegex;
use super::prefix::literal_prefix_str;


/// A limit of `None` means "no limit".
fn limit(n: Option<usize>) -> usize {
    n.unwrap_or(usize::MAX)
}

fn group_strs<'h>(caps: &Captures<'h>) -> Vec<Option<&'h str>> {
    caps.iter().map(|m| m.map(|m| m.as_str())).collect()
}

fn group_ranges(caps: &Captures<'_>) -> Vec<Option<Range<usize>>> {
    caps.iter().map(|m| m.map(|m| m.range())).collect()
}

impl DeferredRegex<Regex> {
    #[must_use]
    pub fn is_match(&self, haystack: &str) -> bool {
        self.compiled().is_match(haystack)
    }

    /// The leftmost-first match in `haystack`.
    #[must_use]
    pub fn find<'h>(&self, haystack: &'h str) -> Option<Match<'h>> {
        self.compiled().find(haystack)
    }

    /// The text of the leftmost-first match in `haystack`.
    #[must_use]
    pub fn find_str<'h>(&self, haystack: &'h str) -> Option<&'h str> {
        self.find(haystack).map(|m| m.as_str())
    }

    /// The byte offsets of the leftmost-first match in `haystack`.
    #[must_use]
    pub fn find_range(&self, haystack: &str) -> Option<Range<usize>> {
        self.find(haystack).map(|m| m.range())
    }

    #[must_use]
    pub fn captures<'h>(&self, haystack: &'h str) -> Option<Captures<'h>> {
        self.compiled().captures(haystack)
    }

    /// The text of each capture group of the leftmost-first match;
    /// element 0 is the whole match.  Groups which did not
    /// participate in the match are `None`.
    #[must_use]
    pub fn captures_strs<'h>(&self, haystack: &'h str) -> Option<Vec<Option<&'h str>>> {
        self.captures(haystack).map(|caps| group_strs(&caps))
    }

    /// Like [`captures_strs`](Self::captures_strs) but yields byte
    /// offsets.
    #[must_use]
    pub fn captures_ranges(&self, haystack: &str) -> Option<Vec<Option<Range<usize>>>> {
        self.captures(haystack).map(|caps| group_ranges(&caps))
    }

    /// The text of successive non-overlapping matches, at most
    /// `max` of them (or all of them when `max` is `None`).
    #[must_use]
    pub fn find_all<'h>(&self, haystack: &'h str, max: Option<usize>) -> Vec<&'h str> {
        self.compiled()
            .find_iter(haystack)
            .take(limit(max))
            .map(|m| m.as_str())
            .collect()
    }

    #[must_use]
    pub fn find_all_ranges(&self, haystack: &str, max: Option<usize>) -> Vec<Range<usize>> {
        self.compiled()
            .find_iter(haystack)
            .take(limit(max))
            .map(|m| m.range())
            .collect()
    }

    #[must_use]
    pub fn captures_all<'h>(
        &self,
        haystack: &'h str,
        max: Option<usize>,
    ) -> Vec<Vec<Option<&'h str>>> {
        self.compiled()
            .captures_iter(haystack)
            .take(limit(max))
            .map(|caps| group_strs(&caps))
            .collect()
    }

    #[must_use]
    pub fn captures_all_ranges(
        &self,
        haystack: &str,
        max: Option<usize>,
    ) -> Vec<Vec<Option<Range<usize>>>> {
        self.compiled()
            .captures_iter(haystack)
            .take(limit(max))
            .map(|caps| group_ranges(&caps))
            .collect()
    }

    /// Append `template` to `dst`, with `$name` and `${name}`
    /// replaced by the corresponding groups of `caps`.
    pub fn expand(&self, caps: &Captures<'_>, template: &str, dst: &mut String) {
        self.compiled();
        caps.expand(template, dst);
    }

    /// Replace every match, expanding `$name` references in
    /// `replacement`.
    #[must_use]
    pub fn replace_all<'h>(&self, haystack: &'h str, replacement: &str) -> Cow<'h, str> {
        self.compiled().replace_all(haystack, replacement)
    }

    /// Replace every match with `replacement` exactly as written.
    #[must_use]
    pub fn replace_all_literal<'h>(&self, haystack: &'h str, replacement: &str) -> Cow<'h, str> {
        self.compiled()
            .replace_all(haystack, NoExpand(replacement))
    }

    /// Replace every match with whatever `f` returns for the matched
    /// text.  The returned text is used as-is.
    pub fn replace_all_fn<'h, F>(&self, haystack: &'h str, mut f: F) -> Cow<'h, str>
    where
        F: FnMut(&str) -> String,
    {
        self.compiled()
            .replace_all(haystack, |caps: &Captures<'_>| f(&caps[0]))
    }

    /// The text between matches, in at most `max` pieces (or as many
    /// as there are when `max` is `None`).
    #[must_use]
    pub fn split<'h>(&self, haystack: &'h str, max: Option<usize>) -> Vec<&'h str> {
        match max {
            None => self.compiled().split(haystack).collect(),
            Some(n) => self.compiled().splitn(haystack, n).collect(),
        }
    }

    /// The literal text which begins every match, and whether it is
    /// the whole of the regex.
    #[must_use]
    pub fn literal_prefix(&self) -> (String, bool) {
        literal_prefix_str(self.as_str())
    }

    /// The number of capture groups, including the implicit group 0
    /// for the whole match.
    #[must_use]
    pub fn captures_len(&self) -> usize {
        self.compiled().captures_len()
    }

    #[must_use]
    pub fn capture_names(&self) -> CaptureNames<'_> {
        self.compiled().capture_names()
    }

    /// The index of the capture group called `name`.
    #[must_use]
    pub fn capture_index(&self, name: &str) -> Option<usize> {
        self.capture_names().position(|n| n == Some(name))
    }

    /// The pattern the regex was compiled from.  Unlike
    /// [`pattern`](DeferredRegex::pattern), this compiles the regex.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.compiled().as_str()
    }
}
