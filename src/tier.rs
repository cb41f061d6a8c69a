//! Chronologically ordered label sequences and the queries that run over them.
//!
//! A [`Tier`] holds labels of a single [`TierKind`]. Every label is treated as the closed span
//! `[t1, end]` (a point label's end is its start), so slicing, search and navigation are shared
//! between kinds. Only [`Tier::label_at`] behaves differently: point tiers answer with the
//! nearest label, interval tiers with the containing one.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::Index;

use serde::{Deserialize, Serialize};

use crate::label::{Label, ensure_finite};
use crate::opts::SliceOpts;
use crate::search::{self, IntoPattern, LabelMatch};
use crate::tolerance::{Time, approx_eq};
use crate::{Error, Result};

/// Whether a tier holds point labels or interval labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TierKind {
    Point,
    Interval,
}

impl TierKind {
    fn admits(self, label: &Label) -> bool {
        match self {
            TierKind::Point => label.is_point(),
            TierKind::Interval => !label.is_point(),
        }
    }
}

impl fmt::Display for TierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TierKind::Point => f.write_str("PointTier"),
            TierKind::Interval => f.write_str("IntervalTier"),
        }
    }
}

/// Which time of an interval label a point label takes when converting tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Anchor {
    #[default]
    Start,
    End,
    Center,
}

/// An ordered, homogeneous sequence of labels.
///
/// Invariants, enforced by [`Tier::add`]:
/// - labels are sorted by `t1` (non-decreasing)
/// - every label matches the tier's kind
/// - in an interval tier, `labels[i].t2 <= labels[i + 1].t1` (gaps allowed)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTier")]
pub struct Tier {
    kind: TierKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    start: Time,
    end: Time,
    labels: Vec<Label>,
    /// File-specific attributes with no home in the model (an ELAN tier's participant, say).
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    extra_data: BTreeMap<String, String>,
}

#[derive(Deserialize)]
struct RawTier {
    kind: TierKind,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    start: Option<Time>,
    #[serde(default)]
    end: Option<Time>,
    #[serde(default)]
    labels: Vec<Label>,
    #[serde(default)]
    extra_data: BTreeMap<String, String>,
}

impl TryFrom<RawTier> for Tier {
    type Error = Error;

    fn try_from(raw: RawTier) -> Result<Self> {
        let mut tier = Tier::new(raw.kind);
        tier.name = raw.name;
        tier.extra_data = raw.extra_data;
        for label in raw.labels {
            tier.add(label)?;
        }
        let start = raw.start.unwrap_or(tier.start);
        let end = raw.end.unwrap_or(tier.end);
        tier.with_bounds(start, end)
    }
}

impl Tier {
    /// An empty tier spanning `[0, 0]`; the end grows as labels are added.
    pub fn new(kind: TierKind) -> Self {
        Self {
            kind,
            name: None,
            start: 0.0,
            end: 0.0,
            labels: Vec::new(),
            extra_data: BTreeMap::new(),
        }
    }

    pub fn point() -> Self {
        Self::new(TierKind::Point)
    }

    pub fn interval() -> Self {
        Self::new(TierKind::Interval)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the tier's time extent, as declared by the source it was read from.
    pub fn with_bounds(mut self, start: Time, end: Time) -> Result<Self> {
        ensure_finite(start, "tier start")?;
        ensure_finite(end, "tier end")?;
        if end < start {
            return Err(Error::value(format!(
                "tier ends before it starts (start={start}, end={end})"
            )));
        }
        self.start = start;
        self.end = end;
        Ok(self)
    }

    /// Record one file-specific attribute on the tier.
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_data.insert(key.into(), value.into());
        self
    }

    pub fn extra_data(&self) -> &BTreeMap<String, String> {
        &self.extra_data
    }

    pub fn extra_data_mut(&mut self) -> &mut BTreeMap<String, String> {
        &mut self.extra_data
    }

    pub fn kind(&self) -> TierKind {
        self.kind
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn start(&self) -> Time {
        self.start
    }

    pub fn end(&self) -> Time {
        self.end
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Label> {
        self.labels.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Label> {
        self.labels.get(index)
    }

    pub fn first(&self) -> Option<&Label> {
        self.labels.first()
    }

    pub fn last(&self) -> Option<&Label> {
        self.labels.last()
    }

    /// Insert `label` at its chronological position and return that position.
    ///
    /// Rejects labels of the wrong kind and, for interval tiers, labels that would overlap a
    /// neighbour. Labels with equal `t1` keep insertion order.
    pub fn add(&mut self, label: Label) -> Result<usize> {
        if !self.kind.admits(&label) {
            return Err(Error::value(format!(
                "cannot add {} to a {}",
                if label.is_point() {
                    "point label"
                } else {
                    "interval label"
                },
                self.kind
            )));
        }

        let key = (label.t1(), label.end());
        let pos = self
            .labels
            .partition_point(|l| (l.t1(), l.end()) <= key);

        if self.kind == TierKind::Interval {
            if let Some(prev) = pos.checked_sub(1).map(|i| &self.labels[i]) {
                if prev.end() > label.t1() {
                    return Err(overlap(prev, &label));
                }
            }
            if let Some(next) = self.labels.get(pos) {
                if label.end() > next.t1() {
                    return Err(overlap(&label, next));
                }
            }
        }

        if label.end() > self.end {
            self.end = label.end();
        }
        self.labels.insert(pos, label);
        Ok(pos)
    }

    /// Remove and return the label at `index`.
    pub fn discard(&mut self, index: usize) -> Result<Label> {
        if index >= self.labels.len() {
            return Err(Error::out_of_bounds(index, self.labels.len()));
        }
        Ok(self.labels.remove(index))
    }

    /// Position of `label` in this tier, by identity rather than value.
    pub fn position(&self, label: &Label) -> Option<usize> {
        self.labels.iter().position(|l| std::ptr::eq(l, label))
    }

    /// The label at `time`.
    ///
    /// - Point tier: the label nearest to `time` (the earliest one on ties).
    /// - Interval tier: the label with `t1 <= time < t2`. The final label's `t2` counts as
    ///   inside, so the very end of the tier still resolves.
    pub fn label_at(&self, time: Time) -> Result<&Label> {
        let found = match self.kind {
            TierKind::Point => self.nearest(time),
            TierKind::Interval => self.containing(time),
        };
        found.ok_or(Error::NotFound { time })
    }

    fn nearest(&self, time: Time) -> Option<&Label> {
        let idx = self.labels.partition_point(|l| l.t1() < time);
        let before = idx.checked_sub(1).map(|i| self.labels[i].t1());
        let after = self.labels.get(idx).map(Label::t1);
        let best = match (before, after) {
            (Some(b), Some(a)) if time - b <= a - time => b,
            (_, Some(a)) => a,
            (Some(b), None) => b,
            (None, None) => return None,
        };
        // Several labels may share the winning time; the first of them wins.
        self.labels.get(self.labels.partition_point(|l| l.t1() < best))
    }

    fn containing(&self, time: Time) -> Option<&Label> {
        let idx = self.labels.partition_point(|l| l.t1() <= time);
        let candidate = &self.labels[idx.checked_sub(1)?];
        let is_last = idx == self.labels.len();
        if time < candidate.end() || (is_last && approx_eq(time, candidate.end(), 0.0)) {
            Some(candidate)
        } else {
            None
        }
    }

    /// Labels overlapping `[t1, t2]`, in order.
    ///
    /// Boundary behaviour is controlled by `opts`: see [`SliceOpts`]. Only the labels at the
    /// two ends of the overlapping run are subject to the strip/include policy; everything in
    /// between is always returned. An empty slice means nothing overlapped.
    pub fn tslice(&self, t1: Time, t2: Time, opts: &SliceOpts) -> Result<&[Label]> {
        if t2 < t1 {
            return Err(Error::value(format!(
                "time slice ends before it starts (t1={t1}, t2={t2})"
            )));
        }

        let lo = t1 - opts.tolerance.left();
        let hi = t2 + opts.tolerance.right();
        // Ends are sorted too: interval labels never overlap and a point ends where it starts.
        let first = self.labels.partition_point(|l| l.end() < lo);
        let last = self.labels.partition_point(|l| l.t1() <= hi);
        if first >= last {
            return Ok(&[]);
        }

        let mut slice = &self.labels[first..last];
        while let Some((head, rest)) = slice.split_first() {
            if !drop_at_left(head, t1, opts) {
                break;
            }
            slice = rest;
        }
        while let Some((tail, rest)) = slice.split_last() {
            if !drop_at_right(tail, t2, opts) {
                break;
            }
            slice = rest;
        }
        Ok(slice)
    }

    /// A zero-width slice at `time` that is expected to hit at most one label.
    pub fn tslice_one(&self, time: Time, opts: &SliceOpts) -> Result<Option<&Label>> {
        match self.tslice(time, time, opts)? {
            [] => Ok(None),
            [label] => Ok(Some(label)),
            many => Err(Error::Ambiguous { count: many.len() }),
        }
    }

    /// Labels whose text matches `pattern`, in tier order.
    pub fn search(&self, pattern: impl IntoPattern) -> Result<Vec<&Label>> {
        Ok(search::filter(&pattern.into_pattern()?, &self.labels))
    }

    /// Like [`Tier::search`], pairing each label with its match.
    pub fn search_matches(&self, pattern: impl IntoPattern) -> Result<Vec<LabelMatch<'_>>> {
        Ok(search::matches(&pattern.into_pattern()?, &self.labels))
    }

    /// Search restricted to `tslice(t1, t2, opts)`.
    pub fn search_within(
        &self,
        pattern: impl IntoPattern,
        t1: Time,
        t2: Time,
        opts: &SliceOpts,
    ) -> Result<Vec<&Label>> {
        let re = pattern.into_pattern()?;
        Ok(search::filter(&re, self.tslice(t1, t2, opts)?))
    }

    /// Like [`Tier::search_within`], pairing each label with its match.
    pub fn search_matches_within(
        &self,
        pattern: impl IntoPattern,
        t1: Time,
        t2: Time,
        opts: &SliceOpts,
    ) -> Result<Vec<LabelMatch<'_>>> {
        let re = pattern.into_pattern()?;
        Ok(search::matches(&re, self.tslice(t1, t2, opts)?))
    }

    /// The label `skip + 1` positions after `label`.
    pub fn next(&self, label: &Label, skip: usize) -> Result<&Label> {
        let idx = self.require_position(label)?;
        let target = idx.checked_add(skip).and_then(|i| i.checked_add(1));
        match target.and_then(|i| self.labels.get(i)) {
            Some(next) => Ok(next),
            None => Err(Error::out_of_bounds(
                target.unwrap_or(usize::MAX),
                self.labels.len(),
            )),
        }
    }

    /// The label `skip + 1` positions before `label`.
    pub fn prev(&self, label: &Label, skip: usize) -> Result<&Label> {
        let idx = self.require_position(label)?;
        match skip.checked_add(1).and_then(|back| idx.checked_sub(back)) {
            Some(i) => Ok(&self.labels[i]),
            None => {
                let back = isize::try_from(skip).unwrap_or(isize::MAX).saturating_add(1);
                Err(Error::OutOfBounds {
                    index: (idx as isize).saturating_sub(back),
                    len: self.labels.len(),
                })
            }
        }
    }

    fn require_position(&self, label: &Label) -> Result<usize> {
        self.position(label)
            .ok_or_else(|| Error::value(format!("{label} is not a member of this tier")))
    }

    /// Multiply every time in the tier (labels and extent) by `factor`.
    pub fn scale_by(&mut self, factor: Time) -> Result<()> {
        check_scale_factor(factor)?;
        self.apply_scale(factor);
        Ok(())
    }

    /// Add `offset` to every time in the tier (labels and extent).
    pub fn shift_by(&mut self, offset: Time) -> Result<()> {
        check_shift_offset(offset)?;
        self.apply_shift(offset);
        Ok(())
    }

    pub(crate) fn apply_scale(&mut self, factor: Time) {
        self.start *= factor;
        self.end *= factor;
        for label in &mut self.labels {
            label.scale_by(factor);
        }
    }

    pub(crate) fn apply_shift(&mut self, offset: Time) {
        self.start += offset;
        self.end += offset;
        for label in &mut self.labels {
            label.shift_by(offset);
        }
    }

    /// A point-tier copy of this tier, taking each label's time from `anchor`.
    pub fn to_point_tier(&self, anchor: Anchor) -> Tier {
        let labels = self
            .labels
            .iter()
            .map(|l| {
                let t = match anchor {
                    Anchor::Start => l.t1(),
                    Anchor::End => l.end(),
                    Anchor::Center => l.center(),
                };
                l.with_times(t, None)
            })
            .collect();
        self.converted(TierKind::Point, labels)
    }

    /// An interval-tier copy of this tier. Point labels become zero-duration intervals.
    pub fn to_interval_tier(&self) -> Tier {
        let labels = self
            .labels
            .iter()
            .map(|l| l.with_times(l.t1(), Some(l.end())))
            .collect();
        self.converted(TierKind::Interval, labels)
    }

    // Start, end and center are all monotone over a valid tier, so the converted labels are
    // already sorted and non-overlapping.
    fn converted(&self, kind: TierKind, labels: Vec<Label>) -> Tier {
        Tier {
            kind,
            name: self.name.clone(),
            start: self.start,
            end: self.end,
            labels,
            extra_data: self.extra_data.clone(),
        }
    }
}

fn drop_at_left(label: &Label, t1: Time, opts: &SliceOpts) -> bool {
    let tol = &opts.tolerance;
    let partial = label.t1() < t1 && !tol.at_left(label.t1(), t1);
    let touching = label.end() < t1 || tol.at_left(label.end(), t1);
    (opts.lstrip && partial) || (!opts.lincl && touching)
}

fn drop_at_right(label: &Label, t2: Time, opts: &SliceOpts) -> bool {
    let tol = &opts.tolerance;
    let partial = label.end() > t2 && !tol.at_right(label.end(), t2);
    let touching = label.t1() > t2 || tol.at_right(label.t1(), t2);
    (opts.rstrip && partial) || (!opts.rincl && touching)
}

pub(crate) fn check_scale_factor(factor: Time) -> Result<()> {
    if factor.is_finite() && factor > 0.0 {
        Ok(())
    } else {
        Err(Error::value(format!(
            "scale factor must be positive and finite, got {factor}"
        )))
    }
}

pub(crate) fn check_shift_offset(offset: Time) -> Result<()> {
    ensure_finite(offset, "shift offset")
}

fn overlap(earlier: &Label, later: &Label) -> Error {
    Error::value(format!("{earlier} overlaps {later}"))
}

impl Index<usize> for Tier {
    type Output = Label;

    fn index(&self, index: usize) -> &Label {
        &self.labels[index]
    }
}

impl<'a> IntoIterator for &'a Tier {
    type Item = &'a Label;
    type IntoIter = std::slice::Iter<'a, Label>;

    fn into_iter(self) -> Self::IntoIter {
        self.labels.iter()
    }
}

/// Long tiers show their first and last five labels.
const DISPLAY_EDGE: usize = 5;

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.kind)?;
        if let Some(name) = &self.name {
            write!(f, "name='{name}', ")?;
        }
        write!(f, "[")?;
        let n = self.labels.len();
        for (i, label) in self.labels.iter().enumerate() {
            if n > DISPLAY_EDGE * 2 && i >= DISPLAY_EDGE && i < n - DISPLAY_EDGE {
                if i == DISPLAY_EDGE {
                    write!(f, ", ...")?;
                }
                continue;
            }
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{label}")?;
        }
        write!(f, "])")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words() -> Result<Tier> {
        let mut tier = Tier::interval().with_name("word");
        for (i, text) in ["zero", "one", "two", "three", "four"].iter().enumerate() {
            tier.add(Label::interval(i as f64, i as f64 + 1.0, *text)?)?;
        }
        Ok(tier)
    }

    fn texts(labels: &[Label]) -> Vec<&str> {
        labels.iter().map(Label::text).collect()
    }

    #[test]
    fn add_inserts_in_chronological_order() -> anyhow::Result<()> {
        let mut tier = Tier::interval();
        tier.add(Label::interval(2.0, 3.0, "c")?)?;
        tier.add(Label::interval(0.0, 1.0, "a")?)?;
        let pos = tier.add(Label::interval(1.0, 2.0, "b")?)?;
        assert_eq!(pos, 1);
        assert_eq!(texts(tier.labels()), ["a", "b", "c"]);
        assert_eq!(tier.end(), 3.0);
        Ok(())
    }

    #[test]
    fn add_rejects_overlap_and_wrong_kind() -> anyhow::Result<()> {
        let mut tier = words()?;
        assert!(tier.add(Label::interval(0.5, 1.5, "x")?).is_err());
        assert!(tier.add(Label::interval(4.5, 6.0, "x")?).is_err());
        assert!(tier.add(Label::point(7.0, "x")?).is_err());

        let mut points = Tier::point();
        assert!(points.add(Label::interval(0.0, 1.0, "x")?).is_err());
        assert_eq!(tier.len(), 5);
        Ok(())
    }

    #[test]
    fn add_places_zero_duration_interval_before_shared_start() -> anyhow::Result<()> {
        let mut tier = Tier::interval();
        tier.add(Label::interval(1.0, 2.0, "long")?)?;
        let pos = tier.add(Label::interval(1.0, 1.0, "edge")?)?;
        assert_eq!(pos, 0);
        assert_eq!(texts(tier.labels()), ["edge", "long"]);
        Ok(())
    }

    #[test]
    fn adjacent_intervals_never_overlap() -> anyhow::Result<()> {
        let tier = words()?;
        for pair in tier.labels().windows(2) {
            assert!(pair[0].t2().unwrap_or(pair[0].t1()) <= pair[1].t1());
        }
        Ok(())
    }

    #[test]
    fn interval_label_at_uses_half_open_spans() -> anyhow::Result<()> {
        let tier = words()?;
        assert_eq!(tier.label_at(0.0)?.text(), "zero");
        assert_eq!(tier.label_at(0.999)?.text(), "zero");
        assert_eq!(tier.label_at(1.0)?.text(), "one");
        assert_eq!(tier.label_at(5.0)?.text(), "four");
        assert!(matches!(tier.label_at(5.01), Err(Error::NotFound { .. })));
        assert!(matches!(tier.label_at(-0.1), Err(Error::NotFound { .. })));
        Ok(())
    }

    #[test]
    fn interval_label_at_reports_gaps() -> anyhow::Result<()> {
        let mut tier = Tier::interval();
        tier.add(Label::interval(0.0, 1.0, "a")?)?;
        tier.add(Label::interval(2.0, 3.0, "b")?)?;
        assert!(matches!(tier.label_at(1.5), Err(Error::NotFound { .. })));
        assert_eq!(tier.label_at(2.0)?.text(), "b");
        Ok(())
    }

    #[test]
    fn point_label_at_picks_nearest() -> anyhow::Result<()> {
        let mut tier = Tier::point();
        assert!(matches!(tier.label_at(1.0), Err(Error::NotFound { .. })));
        for (t, text) in [(1.0, "a"), (2.0, "b"), (4.0, "c")] {
            tier.add(Label::point(t, text)?)?;
        }
        assert_eq!(tier.label_at(-3.0)?.text(), "a");
        assert_eq!(tier.label_at(1.4)?.text(), "a");
        assert_eq!(tier.label_at(1.5)?.text(), "a");
        assert_eq!(tier.label_at(1.6)?.text(), "b");
        assert_eq!(tier.label_at(3.5)?.text(), "c");
        assert_eq!(tier.label_at(100.0)?.text(), "c");
        Ok(())
    }

    #[test]
    fn point_label_at_prefers_first_of_equal_times() -> anyhow::Result<()> {
        let mut tier = Tier::point();
        tier.add(Label::point(1.0, "first")?)?;
        tier.add(Label::point(1.0, "second")?)?;
        assert_eq!(tier.label_at(0.9)?.text(), "first");
        assert_eq!(tier.label_at(1.2)?.text(), "first");
        Ok(())
    }

    #[test]
    fn tslice_includes_partial_overlaps_by_default() -> anyhow::Result<()> {
        let tier = words()?;
        let o = SliceOpts::default();
        assert_eq!(
            texts(tier.tslice(0.8, 4.2, &o)?),
            ["zero", "one", "two", "three", "four"]
        );
        assert_eq!(
            texts(tier.tslice(0.8, 4.2, &o.strip(true, true))?),
            ["one", "two", "three"]
        );
        Ok(())
    }

    #[test]
    fn tslice_boundary_touches() -> anyhow::Result<()> {
        let tier = words()?;
        let o = SliceOpts::default();
        assert_eq!(tier.tslice(1.0, 4.0, &o)?.len(), 5);
        assert_eq!(
            texts(tier.tslice(1.0, 4.0, &o.inclusive(false, false))?),
            ["one", "two", "three"]
        );
        assert_eq!(
            texts(tier.tslice(1.0, 4.0, &o.inclusive(false, true))?),
            ["one", "two", "three", "four"]
        );
        assert_eq!(
            texts(tier.tslice(1.0, 4.0, &o.inclusive(true, false))?),
            ["zero", "one", "two", "three"]
        );
        Ok(())
    }

    #[test]
    fn tslice_strips_one_side_at_a_time() -> anyhow::Result<()> {
        let tier = words()?;
        let o = SliceOpts::default();
        assert_eq!(
            texts(tier.tslice(0.8, 4.2, &o.strip(true, false))?),
            ["one", "two", "three", "four"]
        );
        assert_eq!(
            texts(tier.tslice(0.8, 4.2, &o.strip(false, true))?),
            ["zero", "one", "two", "three"]
        );
        Ok(())
    }

    #[test]
    fn tslice_tolerance_absorbs_near_misses() -> anyhow::Result<()> {
        let tier = words()?;
        let o = SliceOpts::default();
        assert_eq!(
            texts(tier.tslice(1.0001, 3.9999, &o)?),
            ["one", "two", "three"]
        );
        assert_eq!(tier.tslice(1.0001, 3.9999, &o.tol(0.01))?.len(), 5);
        assert_eq!(
            texts(tier.tslice(1.0001, 3.9999, &o.tol(0.01).inclusive(false, false))?),
            ["one", "two", "three"]
        );
        // Only the left edge widens.
        assert_eq!(
            texts(tier.tslice(1.0001, 3.9999, &o.ltol(0.01))?),
            ["zero", "one", "two", "three"]
        );
        Ok(())
    }

    #[test]
    fn tslice_negative_tolerance_means_exact() -> anyhow::Result<()> {
        let tier = words()?;
        let o = SliceOpts::default().ltol(-1.0).rtol(-1.0);
        assert_eq!(tier.tslice(1.0, 4.0, &o)?.len(), 5);
        assert_eq!(tier.tslice(1.0001, 3.9999, &o)?.len(), 3);
        Ok(())
    }

    #[test]
    fn tslice_edge_cases() -> anyhow::Result<()> {
        let tier = words()?;
        let o = SliceOpts::default();
        assert!(tier.tslice(6.0, 7.0, &o)?.is_empty());
        assert!(Tier::interval().tslice(0.0, 1.0, &o)?.is_empty());
        assert!(tier.tslice(2.0, 1.0, &o).unwrap_err().is_value_error());
        assert_eq!(tier.tslice(0.8, 4.2, &o)?, tier.tslice(0.8, 4.2, &o)?);
        Ok(())
    }

    #[test]
    fn tslice_on_points() -> anyhow::Result<()> {
        let mut tier = Tier::point();
        for (t, text) in [(0.5, "a"), (1.0, "b"), (1.5, "c"), (2.0, "d")] {
            tier.add(Label::point(t, text)?)?;
        }
        let o = SliceOpts::default();
        assert_eq!(texts(tier.tslice(1.0, 2.0, &o)?), ["b", "c", "d"]);
        assert_eq!(
            texts(tier.tslice(1.0, 2.0, &o.inclusive(false, false))?),
            ["c"]
        );
        assert_eq!(texts(tier.tslice(0.99, 1.01, &o)?), ["b"]);
        Ok(())
    }

    #[test]
    fn tslice_one_flags_ambiguity() -> anyhow::Result<()> {
        let tier = words()?;
        let o = SliceOpts::default();
        assert_eq!(tier.tslice_one(2.5, &o)?.map(Label::text), Some("two"));
        assert!(matches!(
            tier.tslice_one(2.0, &o),
            Err(Error::Ambiguous { count: 2 })
        ));
        assert_eq!(tier.tslice_one(9.0, &o)?, None);
        Ok(())
    }

    #[test]
    fn search_keeps_order_and_compiles_strings() -> anyhow::Result<()> {
        let tier = words()?;
        let found = tier.search("^t")?;
        assert_eq!(
            found.iter().map(|l| l.text()).collect::<Vec<_>>(),
            ["two", "three"]
        );
        assert!(tier.search("[").unwrap_err().is_value_error());
        assert!(tier.search(regex::Regex::new("^x")?)?.is_empty());
        Ok(())
    }

    #[test]
    fn search_within_restricts_to_slice() -> anyhow::Result<()> {
        let tier = words()?;
        let o = SliceOpts::default().inclusive(false, false);
        let found = tier.search_within("o", 1.0, 3.0, &o)?;
        assert_eq!(
            found.iter().map(|l| l.text()).collect::<Vec<_>>(),
            ["one", "two"]
        );
        Ok(())
    }

    #[test]
    fn search_matches_within_keeps_captures() -> anyhow::Result<()> {
        let tier = words()?;
        let o = SliceOpts::default().inclusive(false, false);
        let found = tier.search_matches_within(r"^(?P<head>t)(?P<tail>\w+)", 1.0, 4.0, &o)?;
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].label.text(), "two");
        assert_eq!(found[1].name("tail"), Some("hree"));
        assert!(
            tier.search_matches_within("o", 3.0, 1.0, &o)
                .unwrap_err()
                .is_value_error()
        );
        Ok(())
    }

    #[test]
    fn navigation_round_trips() -> anyhow::Result<()> {
        let tier = words()?;
        let x = &tier[2];
        assert!(std::ptr::eq(tier.next(tier.prev(x, 0)?, 0)?, x));
        assert!(std::ptr::eq(tier.prev(tier.next(x, 0)?, 0)?, x));
        assert_eq!(tier.prev(x, 1)?.text(), "zero");
        assert_eq!(tier.next(x, 1)?.text(), "four");
        Ok(())
    }

    #[test]
    fn navigation_past_the_ends_fails() -> anyhow::Result<()> {
        let tier = words()?;
        let last = &tier[4];
        assert!(matches!(
            tier.next(last, 0),
            Err(Error::OutOfBounds { index: 5, len: 5 })
        ));
        assert!(matches!(
            tier.prev(&tier[1], 1),
            Err(Error::OutOfBounds { index: -1, len: 5 })
        ));
        assert!(tier.next(&tier[0], usize::MAX).is_err());
        assert!(tier.prev(&tier[0], usize::MAX).is_err());
        Ok(())
    }

    #[test]
    fn navigation_requires_membership_by_identity() -> anyhow::Result<()> {
        let tier = words()?;
        let lookalike = tier[1].clone();
        assert_eq!(lookalike, tier[1]);
        assert!(tier.next(&lookalike, 0).unwrap_err().is_value_error());
        Ok(())
    }

    #[test]
    fn discard_removes_by_index() -> anyhow::Result<()> {
        let mut tier = words()?;
        assert_eq!(tier.discard(0)?.text(), "zero");
        assert_eq!(tier.first().map(Label::text), Some("one"));
        assert!(tier.discard(10).is_err());
        Ok(())
    }

    #[test]
    fn scale_and_shift_validate_first() -> anyhow::Result<()> {
        let mut tier = words()?;
        assert!(tier.scale_by(0.0).is_err());
        assert!(tier.scale_by(-2.0).is_err());
        assert!(tier.shift_by(f64::NAN).is_err());
        assert_eq!(tier[4].t2(), Some(5.0));

        tier.scale_by(2.0)?;
        assert_eq!(tier[4].t2(), Some(10.0));
        assert_eq!(tier.end(), 10.0);
        tier.shift_by(-1.0)?;
        assert_eq!(tier[0].t1(), -1.0);
        assert_eq!(tier.start(), -1.0);
        Ok(())
    }

    #[test]
    fn conversion_between_kinds() -> anyhow::Result<()> {
        let tier = words()?;
        let ends = tier.to_point_tier(Anchor::End);
        assert_eq!(ends.kind(), TierKind::Point);
        assert_eq!(ends.name(), Some("word"));
        assert_eq!(ends[0].t1(), 1.0);
        assert_eq!(tier.to_point_tier(Anchor::Center)[0].t1(), 0.5);

        let back = ends.to_interval_tier();
        assert_eq!(back.kind(), TierKind::Interval);
        assert_eq!(back[0].duration(), Some(0.0));
        Ok(())
    }

    #[test]
    fn display_truncates_long_tiers() -> anyhow::Result<()> {
        let mut tier = Tier::point();
        for i in 0..12 {
            tier.add(Label::point(i as f64, format!("p{i}"))?)?;
        }
        let s = tier.to_string();
        assert!(s.starts_with("PointTier(["));
        assert!(s.contains("text='p4' ), ..., Label( t1=7.0000"));
        assert!(!s.contains("'p5'"));
        Ok(())
    }

    #[test]
    fn deserializing_enforces_invariants() {
        let ok: Tier = serde_json::from_str(
            r#"{"kind": "interval", "name": "w", "labels": [
                {"t1": 1.0, "t2": 2.0, "text": "b"},
                {"t1": 0.0, "t2": 1.0, "text": "a"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(ok[0].text(), "a");
        assert_eq!(ok.end(), 2.0);

        let overlapping = serde_json::from_str::<Tier>(
            r#"{"kind": "interval", "labels": [
                {"t1": 0.0, "t2": 1.5, "text": "a"},
                {"t1": 1.0, "t2": 2.0, "text": "b"}
            ]}"#,
        );
        assert!(overlapping.is_err());
    }

    #[test]
    fn extra_data_travels_with_the_tier() -> anyhow::Result<()> {
        let mut tier = words()?.with_extra("participant", "S01");
        tier.extra_data_mut().insert("annotator".into(), "jk".into());

        let back: Tier = serde_json::from_str(&serde_json::to_string(&tier)?)?;
        assert_eq!(back, tier);
        assert_eq!(back.extra_data()["participant"], "S01");

        let points = tier.to_point_tier(Anchor::Center);
        assert_eq!(points.extra_data(), tier.extra_data());

        let bare = serde_json::to_value(Tier::point())?;
        assert!(bare.get("extra_data").is_none());
        Ok(())
    }
}
