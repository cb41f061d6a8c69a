//! Regular-expression search over label text.

use regex::{Captures, Regex};

use crate::Result;
use crate::label::Label;

/// Anything usable as a search pattern: a compiled [`Regex`] or a pattern string compiled
/// with default flags.
pub trait IntoPattern {
    fn into_pattern(self) -> Result<Regex>;
}

impl IntoPattern for Regex {
    fn into_pattern(self) -> Result<Regex> {
        Ok(self)
    }
}

impl IntoPattern for &Regex {
    fn into_pattern(self) -> Result<Regex> {
        Ok(self.clone())
    }
}

impl IntoPattern for &str {
    fn into_pattern(self) -> Result<Regex> {
        Ok(Regex::new(self)?)
    }
}

impl IntoPattern for String {
    fn into_pattern(self) -> Result<Regex> {
        self.as_str().into_pattern()
    }
}

impl IntoPattern for &String {
    fn into_pattern(self) -> Result<Regex> {
        self.as_str().into_pattern()
    }
}

/// A label paired with the match found in its text.
///
/// Capture groups are reachable by index or name through [`LabelMatch::captures`].
#[derive(Debug)]
pub struct LabelMatch<'t> {
    pub label: &'t Label,
    pub captures: Captures<'t>,
}

impl<'t> LabelMatch<'t> {
    /// The whole matched substring.
    pub fn as_str(&self) -> &'t str {
        // Group 0 is always present on a successful match.
        self.captures.get(0).map_or("", |m| m.as_str())
    }

    /// A named capture group, if it participated in the match.
    pub fn name(&self, group: &str) -> Option<&'t str> {
        self.captures.name(group).map(|m| m.as_str())
    }
}

/// Labels from `labels` whose text matches `re`, in order.
pub(crate) fn filter<'t>(
    re: &Regex,
    labels: impl IntoIterator<Item = &'t Label>,
) -> Vec<&'t Label> {
    labels
        .into_iter()
        .filter(|l| re.is_match(l.text()))
        .collect()
}

/// Like [`filter`], keeping each label's match.
pub(crate) fn matches<'t>(
    re: &Regex,
    labels: impl IntoIterator<Item = &'t Label>,
) -> Vec<LabelMatch<'t>> {
    labels
        .into_iter()
        .filter_map(|label| {
            re.captures(label.text())
                .map(|captures| LabelMatch { label, captures })
        })
        .collect()
}
