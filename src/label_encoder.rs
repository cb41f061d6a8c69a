use serde::Serialize;

use crate::Result;
use crate::label::Label;
use crate::tolerance::Time;

/// A sink for query results, one label at a time.
///
/// Callers own the encoder lifecycle: write any number of labels, then `close` once.
pub trait LabelEncoder {
    /// Write one label, tagged with the name of the tier it came from when known.
    fn write_label(&mut self, tier: Option<&str>, label: &Label) -> Result<()>;
    fn close(&mut self) -> Result<()>;
}

/// The serialized shape of one encoded label.
#[derive(Debug, Serialize)]
pub(crate) struct LabelRecord<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<&'a str>,
    pub t1: Time,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub t2: Option<Time>,
    pub text: &'a str,
}

impl<'a> LabelRecord<'a> {
    pub(crate) fn new(tier: Option<&'a str>, label: &'a Label) -> Self {
        Self {
            tier,
            t1: label.t1(),
            t2: label.t2(),
            text: label.text(),
        }
    }
}
