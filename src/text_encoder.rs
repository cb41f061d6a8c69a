use std::io::Write;

use crate::label::Label;
use crate::label_encoder::LabelEncoder;
use crate::{Error, Result};

/// A `LabelEncoder` that writes one label per line, prefixed by its tier name when known:
///
/// ```text
/// word: Label( t1=0.0000, t2=1.0000, text='hello' )
/// ```
pub struct TextEncoder<W: Write> {
    w: W,
    closed: bool,
}

impl<W: Write> TextEncoder<W> {
    pub fn new(w: W) -> Self {
        Self { w, closed: false }
    }
}

impl<W: Write> LabelEncoder for TextEncoder<W> {
    fn write_label(&mut self, tier: Option<&str>, label: &Label) -> Result<()> {
        if self.closed {
            return Err(Error::value("cannot write label: encoder is already closed"));
        }
        match tier {
            Some(tier) => writeln!(&mut self.w, "{tier}: {label}")?,
            None => writeln!(&mut self.w, "{label}")?,
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.w.flush()?;
        self.closed = true;
        Ok(())
    }
}
