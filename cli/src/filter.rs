//! Applying rules to lines of input.

use std::borrow::Cow;
use std::error::Error;
use std::fmt::{self, Display, Formatter};
use std::io::{self, BufRead, Write};

use serde::Deserialize;

use deferredregex::DeferredRegex;

/// A pattern, and what to do with the text it matches.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct Rule {
    pub(crate) name: String,
    pub(crate) pattern: DeferredRegex,
    /// Replacement template.  `$1` and `${name}` refer to capture
    /// groups unless `literal` is set.
    #[serde(default)]
    pub(crate) replace: Option<String>,
    #[serde(default)]
    pub(crate) literal: bool,
}

impl Rule {
    /// Compile the rule's pattern if that has not happened yet.
    fn ensure_valid(&self) -> Result<(), InvalidRule> {
        match self.pattern.try_compiled() {
            Ok(_) => Ok(()),
            Err(e) => Err(InvalidRule {
                name: self.name.clone(),
                pattern: self.pattern.pattern().to_string(),
                error: e.clone(),
            }),
        }
    }

    fn rewrite<'a>(&self, line: &'a str) -> Cow<'a, str> {
        match &self.replace {
            None => Cow::Borrowed(line),
            Some(replacement) if self.literal => {
                self.pattern.replace_all_literal(line, replacement)
            }
            Some(replacement) => self.pattern.replace_all(line, replacement),
        }
    }

    fn push_matches(&self, line: &str, output: &mut Vec<String>) {
        match &self.replace {
            None => output.extend(
                self.pattern
                    .find_all(line, None)
                    .into_iter()
                    .map(str::to_string),
            ),
            Some(replacement) => {
                for caps in self.pattern.captures_iter(line) {
                    let mut expanded = String::new();
                    if self.literal {
                        expanded.push_str(replacement);
                    } else {
                        self.pattern.expand(&caps, replacement, &mut expanded);
                    }
                    output.push(expanded);
                }
            }
        }
    }
}

/// A rule whose pattern turned out not to compile.
#[derive(Debug)]
pub(crate) struct InvalidRule {
    pub(crate) name: String,
    pub(crate) pattern: String,
    pub(crate) error: regex::Error,
}

impl Display for InvalidRule {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        write!(
            f,
            "rule '{}': '{}' is not a valid regular expression: {}",
            self.name, self.pattern, self.error
        )
    }
}

impl Error for InvalidRule {}

#[derive(Debug)]
pub(crate) enum RunError {
    Io(io::Error),
    Invalid(InvalidRule),
}

impl Display for RunError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            RunError::Io(e) => write!(f, "I/O error: {e}"),
            RunError::Invalid(rule) => rule.fmt(f),
        }
    }
}

impl Error for RunError {}

impl From<io::Error> for RunError {
    fn from(e: io::Error) -> RunError {
        RunError::Io(e)
    }
}

impl From<InvalidRule> for RunError {
    fn from(e: InvalidRule) -> RunError {
        RunError::Invalid(e)
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct Summary {
    pub(crate) lines_read: usize,
    pub(crate) lines_matched: usize,
}

/// Selects (and perhaps rewrites) the lines which match any of a
/// list of rules.
///
/// Without `only_matching`, each matching rule which has a
/// replacement rewrites the line, and later rules see the rewritten
/// line.  With `only_matching`, every match of every rule is
/// emitted separately.
#[derive(Debug)]
pub(crate) struct Filter {
    rules: Vec<Rule>,
    only_matching: bool,
}

impl Filter {
    pub(crate) fn new(rules: Vec<Rule>, only_matching: bool) -> Filter {
        Filter {
            rules,
            only_matching,
        }
    }

    pub(crate) fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// The output for a single line; empty when no rule matches.
    pub(crate) fn filter_line(&self, line: &str) -> Result<Vec<String>, InvalidRule> {
        let mut output: Vec<String> = Vec::new();
        if self.only_matching {
            for rule in &self.rules {
                rule.ensure_valid()?;
                rule.push_matches(line, &mut output);
            }
            return Ok(output);
        }

        let mut current: Cow<'_, str> = Cow::Borrowed(line);
        let mut matched = false;
        for rule in &self.rules {
            rule.ensure_valid()?;
            if rule.pattern.is_match(&current) {
                matched = true;
                if rule.replace.is_some() {
                    let rewritten = rule.rewrite(&current).into_owned();
                    current = Cow::Owned(rewritten);
                }
            }
        }
        if matched {
            output.push(current.into_owned());
        }
        Ok(output)
    }

    /// Filter every line of `input` into `output`.
    pub(crate) fn run<R: BufRead, W: Write>(
        &self,
        input: R,
        output: &mut W,
        summary: &mut Summary,
    ) -> Result<(), RunError> {
        for line in input.lines() {
            let line = line?;
            summary.lines_read += 1;
            let selected = self.filter_line(&line)?;
            if !selected.is_empty() {
                summary.lines_matched += 1;
            }
            for text in selected {
                writeln!(output, "{text}")?;
            }
        }
        output.flush()?;
        Ok(())
    }

    /// Compile every rule, returning the ones which are invalid.
    pub(crate) fn check(&self) -> Vec<InvalidRule> {
        self.rules
            .iter()
            .filter_map(|rule| rule.ensure_valid().err())
            .collect()
    }

    /// How many rules have had their pattern compiled so far.
    pub(crate) fn compiled_rules(&self) -> usize {
        self.rules
            .iter()
            .filter(|rule| rule.pattern.is_compiled())
            .count()
    }
}
