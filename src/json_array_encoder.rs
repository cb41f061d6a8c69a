use std::io::Write;

use crate::Result;
use crate::label::Label;
use crate::label_encoder::{LabelEncoder, LabelRecord};

/// A `LabelEncoder` that writes labels as a single JSON array.
///
/// Output is streamed straight to the writer; the encoder only tracks enough state to place
/// brackets and commas.
///
/// Example output:
/// ```json
/// [{"tier":"word","t1":0.0,"t2":1.2,"text":"hello"},{"tier":"word","t1":1.2,"t2":2.5,"text":"world"}]
/// ```
pub struct JsonArrayEncoder<W: Write> {
    w: W,

    /// Whether the opening `[` has been written.
    started: bool,

    /// Whether the next element is the first one (no leading comma).
    first: bool,

    closed: bool,
}

impl<W: Write> JsonArrayEncoder<W> {
    pub fn new(w: W) -> Self {
        Self {
            w,
            started: false,
            first: true,
            closed: false,
        }
    }

    // Deferred so that an empty result still closes as `[]`.
    fn start_if_needed(&mut self) -> Result<()> {
        if !self.started {
            self.w.write_all(b"[")?;
            self.started = true;
        }
        Ok(())
    }
}

impl<W: Write> LabelEncoder for JsonArrayEncoder<W> {
    fn write_label(&mut self, tier: Option<&str>, label: &Label) -> Result<()> {
        if self.closed {
            return Err(crate::Error::value(
                "cannot write label: encoder is already closed",
            ));
        }

        self.start_if_needed()?;

        if !self.first {
            self.w.write_all(b",")?;
        }
        self.first = false;

        serde_json::to_writer(&mut self.w, &LabelRecord::new(tier, label))?;
        Ok(())
    }

    /// Finalize the JSON array and flush. Idempotent.
    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }

        self.start_if_needed()?;
        self.w.write_all(b"]")?;
        self.w.flush()?;

        self.closed = true;
        Ok(())
    }
}
