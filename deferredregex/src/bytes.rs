//! Operations on a [`DeferredBytesRegex`](crate::DeferredBytesRegex),
//! which searches byte strings that need not be valid UTF-8.

use std::borrow::Cow;
use std::ops::Range;

use regex::bytes::{CaptureNames, Captures, Match, NoExpand, Regex};

use super::deferred::DeferredRegex;
use super::prefix::literal_prefix;

fn limit(n: Option<usize>) -> usize {
    n.unwrap_or(usize::MAX)
}

fn group_bytes<'h>(caps: &Captures<'h>) -> Vec<Option<&'h [u8]>> {
    caps.iter().map(|m| m.map(|m| m.as_bytes())).collect()
}

fn group_ranges(caps: &Captures<'_>) -> Vec<Option<Range<usize>>> {
    caps.iter().map(|m| m.map(|m| m.range())).collect()
}

impl DeferredRegex<Regex> {
    #[must_use]
    pub fn is_match(&self, haystack: &[u8]) -> bool {
        self.compiled().is_match(haystack)
    }

    #[must_use]
    pub fn find<'h>(&self, haystack: &'h [u8]) -> Option<Match<'h>> {
        self.compiled().find(haystack)
    }

    #[must_use]
    pub fn find_bytes<'h>(&self, haystack: &'h [u8]) -> Option<&'h [u8]> {
        self.find(haystack).map(|m| m.as_bytes())
    }

    #[must_use]
    pub fn find_range(&self, haystack: &[u8]) -> Option<Range<usize>> {
        self.find(haystack).map(|m| m.range())
    }

    #[must_use]
    pub fn captures<'h>(&self, haystack: &'h [u8]) -> Option<Captures<'h>> {
        self.compiled().captures(haystack)
    }

    /// Element 0 is the whole match; groups which did not participate
    /// are `None`.
    #[must_use]
    pub fn captures_bytes<'h>(&self, haystack: &'h [u8]) -> Option<Vec<Option<&'h [u8]>>> {
        self.captures(haystack).map(|caps| group_bytes(&caps))
    }

    #[must_use]
    pub fn captures_ranges(&self, haystack: &[u8]) -> Option<Vec<Option<Range<usize>>>> {
        self.captures(haystack).map(|caps| group_ranges(&caps))
    }

    #[must_use]
    pub fn find_all<'h>(&self, haystack: &'h [u8], max: Option<usize>) -> Vec<&'h [u8]> {
        self.compiled()
            .find_iter(haystack)
            .take(limit(max))
            .map(|m| m.as_bytes())
            .collect()
    }

    #[must_use]
    pub fn find_all_ranges(&self, haystack: &[u8], max: Option<usize>) -> Vec<Range<usize>> {
        self.compiled()
            .find_iter(haystack)
            .take(limit(max))
            .map(|m| m.range())
            .collect()
    }

    #[must_use]
    pub fn captures_all<'h>(
        &self,
        haystack: &'h [u8],
        max: Option<usize>,
    ) -> Vec<Vec<Option<&'h [u8]>>> {
        self.compiled()
            .captures_iter(haystack)
            .take(limit(max))
            .map(|caps| group_bytes(&caps))
            .collect()
    }

    #[must_use]
    pub fn captures_all_ranges(
        &self,
        haystack: &[u8],
        max: Option<usize>,
    ) -> Vec<Vec<Option<Range<usize>>>> {
        self.compiled()
            .captures_iter(haystack)
            .take(limit(max))
            .map(|caps| group_ranges(&caps))
            .collect()
    }

    pub fn expand(&self, caps: &Captures<'_>, template: &[u8], dst: &mut Vec<u8>) {
        self.compiled();
        caps.expand(template, dst);
    }

    #[must_use]
    pub fn replace_all<'h>(&self, haystack: &'h [u8], replacement: &[u8]) -> Cow<'h, [u8]> {
        self.compiled().replace_all(haystack, replacement)
    }

    #[must_use]
    pub fn replace_all_literal<'h>(
        &self,
        haystack: &'h [u8],
        replacement: &[u8],
    ) -> Cow<'h, [u8]> {
        self.compiled()
            .replace_all(haystack, NoExpand(replacement))
    }

    pub fn replace_all_fn<'h, F>(&self, haystack: &'h [u8], mut f: F) -> Cow<'h, [u8]>
    where
        F: FnMut(&[u8]) -> Vec<u8>,
    {
        self.compiled()
            .replace_all(haystack, |caps: &Captures<'_>| f(&caps[0]))
    }

    #[must_use]
    pub fn split<'h>(&self, haystack: &'h [u8], max: Option<usize>) -> Vec<&'h [u8]> {
        match max {
            None => self.compiled().split(haystack).collect(),
            Some(n) => self.compiled().splitn(haystack, n).collect(),
        }
    }

    #[must_use]
    pub fn literal_prefix(&self) -> (Vec<u8>, bool) {
        literal_prefix(self.as_str(), false)
    }

    #[must_use]
    pub fn captures_len(&self) -> usize {
        self.compiled().captures_len()
    }

    #[must_use]
    pub fn capture_names(&self) -> CaptureNames<'_> {
        self.compiled().capture_names()
    }

    #[must_use]
    pub fn capture_index(&self, name: &str) -> Option<usize> {
        self.capture_names().position(|n| n == Some(name))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        self.compiled().as_str()
    }
}

#[cfg(test)]
mod tests {
    use regex::bytes::Regex;

    use crate::DeferredBytesRegex;

    const SEMVER: &str = r"([0-9]+)\.([0-9]+)\.([0-9]+)";

    #[test]
    fn matches_invalid_utf8() {
        let dr = DeferredBytesRegex::new(r"(?-u)\xFF+");
        let hay: &[u8] = b"a\xFF\xFFb";
        assert!(dr.is_match(hay));
        assert_eq!(dr.find_bytes(hay), Some(&b"\xFF\xFF"[..]));
        assert_eq!(dr.find_range(hay), Some(1..3));
    }

    #[test]
    fn captures_bytes() {
        let dr = DeferredBytesRegex::new(SEMVER);
        let got = dr.captures_bytes(b"1.2.3").expect("should match");
        let expected: Vec<Option<&[u8]>> = vec![
            Some(&b"1.2.3"[..]),
            Some(&b"1"[..]),
            Some(&b"2"[..]),
            Some(&b"3"[..]),
        ];
        assert_eq!(got, expected);
        assert_eq!(
            dr.captures_ranges(b"v1.2.3"),
            Some(vec![Some(1..6), Some(1..2), Some(3..4), Some(5..6)])
        );
    }

    #[test]
    fn find_all_respects_limit() {
        let dr = DeferredBytesRegex::new("[0-9]+");
        let hay: &[u8] = b"1 22 333 4444";
        assert_eq!(dr.find_all(hay, None).len(), 4);
        assert_eq!(dr.find_all(hay, Some(2)), vec![&b"1"[..], &b"22"[..]]);
        assert!(dr.find_all(hay, Some(0)).is_empty());
        assert_eq!(dr.find_all_ranges(hay, Some(1)), vec![0..1]);
        assert_eq!(dr.captures_all(hay, Some(3)).len(), 3);
        assert_eq!(
            dr.captures_all_ranges(hay, None),
            vec![vec![Some(0..1)], vec![Some(2..4)], vec![Some(5..8)], vec![Some(9..13)]]
        );
    }

    #[test]
    fn replacements() {
        let dr = DeferredBytesRegex::new(SEMVER);
        let hay: &[u8] = b"from 1.2.3 to 4.5.6";
        assert_eq!(
            &*dr.replace_all(hay, b"$3.$2.$1"),
            &b"from 3.2.1 to 6.5.4"[..]
        );
        assert_eq!(
            &*dr.replace_all_literal(hay, b"$1"),
            &b"from $1 to $1"[..]
        );
        assert_eq!(
            &*dr.replace_all_fn(hay, |m| m.iter().filter(|b| **b != b'.').copied().collect()),
            &b"from 123 to 456"[..]
        );
    }

    #[test]
    fn expand_template() {
        let dr = DeferredBytesRegex::new(r"(?<major>[0-9]+)\.(?<minor>[0-9]+)");
        let caps = dr.captures(b"10.4").expect("should match");
        let mut dst = b"v".to_vec();
        dr.expand(&caps, b"${minor}-${major}", &mut dst);
        assert_eq!(dst, b"v4-10".to_vec());
    }

    #[test]
    fn split_with_limit() {
        let dr = DeferredBytesRegex::new(",");
        let hay: &[u8] = b"a,b,c";
        assert_eq!(dr.split(hay, None), vec![&b"a"[..], &b"b"[..], &b"c"[..]]);
        assert_eq!(dr.split(hay, Some(2)), vec![&b"a"[..], &b"b,c"[..]]);
    }

    #[test]
    fn introspection_agrees_with_engine() {
        let pattern = r"(?<year>[0-9]{4})-(?<month>[0-9]{2})-([0-9]{2})";
        let dr = DeferredBytesRegex::new(pattern);
        let re = Regex::new(pattern).expect("valid test regex");
        assert_eq!(dr.captures_len(), re.captures_len());
        assert!(dr.capture_names().eq(re.capture_names()));
        assert_eq!(dr.capture_index("month"), Some(2));
        assert_eq!(dr.capture_index("day"), None);
        assert_eq!(dr.as_str(), pattern);
    }

    #[test]
    fn literal_prefix_of_bytes_regex() {
        let dr = DeferredBytesRegex::new("GET /[a-z]+");
        assert_eq!(dr.literal_prefix(), (b"GET /".to_vec(), false));
    }
}
