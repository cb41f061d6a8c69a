use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::tolerance::Time;
use crate::{Error, Result};

/// A single annotation: a point in time or an interval, carrying text.
///
/// Times are seconds. A label is a point label iff `t2` is absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawLabel")]
pub struct Label {
    t1: Time,
    #[serde(skip_serializing_if = "Option::is_none")]
    t2: Option<Time>,
    text: String,
    /// Application data a reader could not place elsewhere (a display colour, say).
    #[serde(skip_serializing_if = "Option::is_none")]
    appdata: Option<Value>,
}

/// Unvalidated wire form; `Label`'s constructors decide whether it is acceptable.
#[derive(Deserialize)]
struct RawLabel {
    t1: Time,
    #[serde(default)]
    t2: Option<Time>,
    #[serde(default)]
    text: String,
    #[serde(default)]
    appdata: Option<Value>,
}

impl TryFrom<RawLabel> for Label {
    type Error = Error;

    fn try_from(raw: RawLabel) -> Result<Self> {
        let label = match raw.t2 {
            Some(t2) => Label::interval(raw.t1, t2, raw.text)?,
            None => Label::point(raw.t1, raw.text)?,
        };
        Ok(Label {
            appdata: raw.appdata,
            ..label
        })
    }
}

impl Label {
    /// Create a point label at `t1`.
    pub fn point(t1: Time, text: impl Into<String>) -> Result<Self> {
        ensure_finite(t1, "t1")?;
        Ok(Self {
            t1,
            t2: None,
            text: text.into(),
            appdata: None,
        })
    }

    /// Create an interval label spanning `[t1, t2]`.
    ///
    /// Zero-duration intervals are allowed; `t2 < t1` is not.
    pub fn interval(t1: Time, t2: Time, text: impl Into<String>) -> Result<Self> {
        ensure_finite(t1, "t1")?;
        ensure_finite(t2, "t2")?;
        if t2 < t1 {
            return Err(Error::value(format!(
                "interval label ends before it starts (t1={t1}, t2={t2})"
            )));
        }
        Ok(Self {
            t1,
            t2: Some(t2),
            text: text.into(),
            appdata: None,
        })
    }

    /// The first (possibly only) time of the label.
    pub fn t1(&self) -> Time {
        self.t1
    }

    /// The end time of an interval label.
    pub fn t2(&self) -> Option<Time> {
        self.t2
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn appdata(&self) -> Option<&Value> {
        self.appdata.as_ref()
    }

    /// Attach application data to the label, replacing any already there.
    pub fn with_appdata(mut self, appdata: impl Into<Value>) -> Self {
        self.appdata = Some(appdata.into());
        self
    }

    pub fn is_point(&self) -> bool {
        self.t2.is_none()
    }

    /// Length of an interval label; `None` for point labels.
    pub fn duration(&self) -> Option<Time> {
        self.t2.map(|t2| t2 - self.t1)
    }

    /// Midpoint of an interval label, or the point itself.
    pub fn center(&self) -> Time {
        match self.t2 {
            Some(t2) => (self.t1 + t2) / 2.0,
            None => self.t1,
        }
    }

    /// Where the label ends in time. A point label ends where it starts.
    ///
    /// Tiers treat every label as the closed span `[t1, end]`, which lets point and interval
    /// tiers share the same slicing and navigation code.
    pub(crate) fn end(&self) -> Time {
        self.t2.unwrap_or(self.t1)
    }

    pub(crate) fn scale_by(&mut self, factor: Time) {
        self.t1 *= factor;
        if let Some(t2) = self.t2.as_mut() {
            *t2 *= factor;
        }
    }

    pub(crate) fn shift_by(&mut self, offset: Time) {
        self.t1 += offset;
        if let Some(t2) = self.t2.as_mut() {
            *t2 += offset;
        }
    }

    /// Re-shape the label's times, keeping its text and data.
    pub(crate) fn with_times(&self, t1: Time, t2: Option<Time>) -> Self {
        Self {
            t1,
            t2,
            text: self.text.clone(),
            appdata: self.appdata.clone(),
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Label( t1={:.4}, ", self.t1)?;
        if let Some(t2) = self.t2 {
            write!(f, "t2={t2:.4}, ")?;
        }
        write!(f, "text='{}' )", self.text)
    }
}

pub(crate) fn ensure_finite(value: Time, what: &str) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(Error::value(format!("{what} must be finite, got {value}")))
    }
}
