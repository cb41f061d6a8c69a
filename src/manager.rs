//! The owner of every tier read from one annotation source.
//!
//! A format reader assembles [`Tier`]s and hands them to a [`LabelManager`]; from then on the
//! manager gives cross-tier access by index or name, answers "what is happening at this
//! time?" across all tiers at once, and applies time transforms to everything it owns.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::io::{Read, Write};
use std::mem;
use std::ops::{Deref, Index};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::label::Label;
use crate::tier::{Anchor, Tier, TierKind, check_scale_factor, check_shift_offset};
use crate::tolerance::Time;
use crate::{Error, Result};

/// Identifies a tier by position or by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TierKey<'k> {
    Index(usize),
    Name(&'k str),
}

impl From<usize> for TierKey<'_> {
    fn from(index: usize) -> Self {
        TierKey::Index(index)
    }
}

impl<'k> From<&'k str> for TierKey<'k> {
    fn from(name: &'k str) -> Self {
        TierKey::Name(name)
    }
}

impl<'k> From<&'k String> for TierKey<'k> {
    fn from(name: &'k String) -> Self {
        TierKey::Name(name)
    }
}

/// An ordered collection of tiers.
///
/// Tier names, where present, are unique. Every path that puts a tier into the manager
/// ([`LabelManager::add`], [`LabelManager::insert`], [`LabelManager::replace`]) rejects
/// duplicates, and [`LabelManager::tier_mut`] cannot rename a tier.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawManager")]
pub struct LabelManager {
    tiers: Vec<Tier>,
    #[serde(skip_serializing_if = "Option::is_none")]
    appdata: Option<Value>,
}

#[derive(Deserialize)]
struct RawManager {
    #[serde(default)]
    tiers: Vec<Tier>,
    #[serde(default)]
    appdata: Option<Value>,
}

impl TryFrom<RawManager> for LabelManager {
    type Error = Error;

    fn try_from(raw: RawManager) -> Result<Self> {
        let mut manager = LabelManager::from_tiers(raw.tiers)?;
        manager.appdata = raw.appdata;
        Ok(manager)
    }
}

impl LabelManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a manager from tiers in source order.
    pub fn from_tiers(tiers: impl IntoIterator<Item = Tier>) -> Result<Self> {
        let mut manager = Self::new();
        for tier in tiers {
            manager.add(tier)?;
        }
        Ok(manager)
    }

    /// Load a manager from its JSON representation, re-validating every tier.
    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn to_json_writer<W: Write>(&self, writer: W) -> Result<()> {
        Ok(serde_json::to_writer(writer, self)?)
    }

    /// Append a tier.
    pub fn add(&mut self, tier: Tier) -> Result<()> {
        self.insert(self.tiers.len(), tier)
    }

    /// Insert a tier at `index`, shifting later tiers back.
    pub fn insert(&mut self, index: usize, tier: Tier) -> Result<()> {
        if index > self.tiers.len() {
            return Err(Error::out_of_bounds(index, self.tiers.len()));
        }
        self.check_name(&tier, None)?;
        self.tiers.insert(index, tier);
        Ok(())
    }

    /// Swap the tier identified by `key` for `tier`, returning the old one.
    ///
    /// The new tier may keep the old one's name but not take another tier's.
    pub fn replace<'k>(&mut self, key: impl Into<TierKey<'k>>, tier: Tier) -> Result<Tier> {
        let index = self.index_of(key)?;
        self.check_name(&tier, Some(index))?;
        Ok(mem::replace(&mut self.tiers[index], tier))
    }

    // A tier's name must not be used by any tier other than the one at `skip`.
    fn check_name(&self, tier: &Tier, skip: Option<usize>) -> Result<()> {
        let Some(name) = tier.name() else {
            return Ok(());
        };
        let taken = self
            .tiers
            .iter()
            .enumerate()
            .any(|(i, t)| Some(i) != skip && t.name() == Some(name));
        if taken {
            return Err(Error::value(format!("duplicate tier name '{name}'")));
        }
        Ok(())
    }

    /// Remove and return a tier.
    pub fn discard<'k>(&mut self, key: impl Into<TierKey<'k>>) -> Result<Tier> {
        let index = self.index_of(key)?;
        Ok(self.tiers.remove(index))
    }

    pub fn len(&self) -> usize {
        self.tiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }

    pub fn tiers(&self) -> &[Tier] {
        &self.tiers
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Tier> {
        self.tiers.iter()
    }

    /// Position of the tier identified by `key`.
    pub fn index_of<'k>(&self, key: impl Into<TierKey<'k>>) -> Result<usize> {
        match key.into() {
            TierKey::Index(index) if index < self.tiers.len() => Ok(index),
            TierKey::Index(index) => Err(Error::out_of_bounds(index, self.tiers.len())),
            TierKey::Name(name) => self
                .tiers
                .iter()
                .position(|t| t.name() == Some(name))
                .ok_or_else(|| Error::UnknownTier(name.to_owned())),
        }
    }

    /// The tier at an index, or with a name.
    pub fn tier<'k>(&self, key: impl Into<TierKey<'k>>) -> Result<&Tier> {
        let index = self.index_of(key)?;
        Ok(&self.tiers[index])
    }

    /// Label-level write access to one tier. See [`TierMut`].
    pub fn tier_mut<'k>(&mut self, key: impl Into<TierKey<'k>>) -> Result<TierMut<'_>> {
        let index = self.index_of(key)?;
        Ok(TierMut {
            tier: &mut self.tiers[index],
        })
    }

    /// A tier viewed as `kind`, converting it only when it is of the other kind.
    pub fn tier_as<'k>(
        &self,
        key: impl Into<TierKey<'k>>,
        kind: TierKind,
        anchor: Anchor,
    ) -> Result<Cow<'_, Tier>> {
        let tier = self.tier(key)?;
        Ok(match (tier.kind(), kind) {
            (have, want) if have == want => Cow::Borrowed(tier),
            (_, TierKind::Point) => Cow::Owned(tier.to_point_tier(anchor)),
            (_, TierKind::Interval) => Cow::Owned(tier.to_interval_tier()),
        })
    }

    /// Application data attached to the whole manager.
    pub fn appdata(&self) -> Option<&Value> {
        self.appdata.as_ref()
    }

    pub fn set_appdata(&mut self, appdata: Option<Value>) -> Option<Value> {
        mem::replace(&mut self.appdata, appdata)
    }

    /// Tier names in order, or an empty list unless every tier is named.
    pub fn names(&self) -> Vec<&str> {
        self.tiers
            .iter()
            .map(Tier::name)
            .collect::<Option<Vec<_>>>()
            .unwrap_or_default()
    }

    /// The earliest tier start, if there are any tiers.
    pub fn start(&self) -> Option<Time> {
        self.tiers.iter().map(Tier::start).reduce(f64::min)
    }

    /// The latest tier end, if there are any tiers.
    pub fn end(&self) -> Option<Time> {
        self.tiers.iter().map(Tier::end).reduce(f64::max)
    }

    /// One label per tier at `time`, in tier order.
    ///
    /// Fails with [`Error::NotFound`] if any tier has no label there; partial results are
    /// never returned.
    pub fn labels_at(&self, time: Time) -> Result<LabelsAt<'_>> {
        let labels = self
            .tiers
            .iter()
            .map(|t| t.label_at(time))
            .collect::<Result<Vec<_>>>()?;
        let names = Some(self.names()).filter(|names| {
            !names.is_empty() && names.iter().all(|n| is_field_name(n))
        });
        Ok(LabelsAt { labels, names })
    }

    /// Multiply every time in every tier by `factor`.
    ///
    /// `factor` must be positive: zero collapses every label onto one instant and a negative
    /// factor would reverse chronological order. Nothing is modified on error.
    pub fn scale_by(&mut self, factor: Time) -> Result<()> {
        check_scale_factor(factor)?;
        for tier in &mut self.tiers {
            tier.apply_scale(factor);
        }
        Ok(())
    }

    /// Add `offset` to every time in every tier. Times may become negative.
    pub fn shift_by(&mut self, offset: Time) -> Result<()> {
        check_shift_offset(offset)?;
        for tier in &mut self.tiers {
            tier.apply_shift(offset);
        }
        Ok(())
    }
}

// Usable as a field name: non-empty with no whitespace.
fn is_field_name(name: &str) -> bool {
    !name.is_empty() && !name.chars().any(char::is_whitespace)
}

impl<'a> IntoIterator for &'a LabelManager {
    type Item = &'a Tier;
    type IntoIter = std::slice::Iter<'a, Tier>;

    fn into_iter(self) -> Self::IntoIter {
        self.tiers.iter()
    }
}

impl fmt::Display for LabelManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let indexes: Vec<String> = (0..self.tiers.len()).map(|i| i.to_string()).collect();
        write!(f, "LabelManager(tiers=[{}]", indexes.join(","))?;
        let names = self.names();
        if !names.is_empty() {
            write!(f, ", names=['{}']", names.join("','"))?;
        }
        write!(f, ")")
    }
}

/// A tier borrowed mutably from a [`LabelManager`].
///
/// Reads go through `Deref<Target = Tier>`. Writes are limited to labels, times and
/// extra data: the tier cannot be renamed or swapped out, so the manager's names stay
/// unique. Use [`LabelManager::replace`] to exchange a whole tier.
#[derive(Debug)]
pub struct TierMut<'m> {
    tier: &'m mut Tier,
}

impl TierMut<'_> {
    /// See [`Tier::add`].
    pub fn add(&mut self, label: Label) -> Result<usize> {
        self.tier.add(label)
    }

    pub fn discard(&mut self, index: usize) -> Result<Label> {
        self.tier.discard(index)
    }

    pub fn scale_by(&mut self, factor: Time) -> Result<()> {
        self.tier.scale_by(factor)
    }

    pub fn shift_by(&mut self, offset: Time) -> Result<()> {
        self.tier.shift_by(offset)
    }

    pub fn extra_data_mut(&mut self) -> &mut BTreeMap<String, String> {
        self.tier.extra_data_mut()
    }
}

impl Deref for TierMut<'_> {
    type Target = Tier;

    fn deref(&self) -> &Tier {
        self.tier
    }
}

/// The labels found at one time, one per tier.
///
/// Always addressable by position. When every tier carries a usable name (non-empty, no
/// whitespace), labels are also addressable by tier name through [`LabelsAt::field`].
#[derive(Debug, Clone, PartialEq)]
pub struct LabelsAt<'m> {
    labels: Vec<&'m Label>,
    names: Option<Vec<&'m str>>,
}

impl<'m> LabelsAt<'m> {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&'m Label> {
        self.labels.get(index).copied()
    }

    /// Field names, if name access is available.
    pub fn names(&self) -> Option<&[&'m str]> {
        self.names.as_deref()
    }

    /// The label from the tier called `name`.
    pub fn field(&self, name: &str) -> Result<&'m Label> {
        let names = self
            .names
            .as_ref()
            .ok_or_else(|| Error::Unnamed(name.to_owned()))?;
        names
            .iter()
            .position(|n| *n == name)
            .map(|i| self.labels[i])
            .ok_or_else(|| Error::UnknownTier(name.to_owned()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &'m Label> + '_ {
        self.labels.iter().copied()
    }

    pub fn into_vec(self) -> Vec<&'m Label> {
        self.labels
    }
}

impl<'m> Index<usize> for LabelsAt<'m> {
    type Output = Label;

    fn index(&self, index: usize) -> &Label {
        self.labels[index]
    }
}

impl<'m> IntoIterator for LabelsAt<'m> {
    type Item = &'m Label;
    type IntoIter = std::vec::IntoIter<&'m Label>;

    fn into_iter(self) -> Self::IntoIter {
        self.labels.into_iter()
    }
}
