//! `tiergrid` — time-aligned annotation tiers with tolerant time queries.
//!
//! This crate provides:
//! - The label model: point and interval [`Label`]s grouped into sorted [`Tier`]s, owned by a
//!   [`LabelManager`]
//! - Time indexing: `label_at`, `labels_at` and `tslice` with boundary and tolerance policy
//! - Regex search over label text, and `next`/`prev` navigation
//! - Whole-manager time transforms (`scale_by`, `shift_by`)
//! - Streaming encoders (JSON, plain text) for query results
//!
//! Reading and writing annotation file formats is left to callers: a format reader builds
//! tiers and hands them to a [`LabelManager`].
//!
//! ```
//! use tiergrid::{Label, LabelManager, SliceOpts, Tier};
//!
//! let mut words = Tier::interval().with_name("word");
//! words.add(Label::interval(0.0, 0.4, "the")?)?;
//! words.add(Label::interval(0.4, 0.9, "cat")?)?;
//!
//! let lm = LabelManager::from_tiers([words])?;
//! assert_eq!(lm.labels_at(0.5)?.field("word")?.text(), "cat");
//!
//! let hits = lm.tier("word")?.tslice(0.4, 0.9, &SliceOpts::default().inclusive(false, true))?;
//! assert_eq!(hits.len(), 1);
//! # Ok::<(), tiergrid::Error>(())
//! ```

// Error type shared by every module.
pub mod error;

// Core model and queries.
pub mod label;
pub mod manager;
pub mod opts;
pub mod search;
pub mod tier;
pub mod tolerance;

// Output selection and encoder interfaces.
pub mod label_encoder;
pub mod output_type;

// Encoders that serialize query results.
pub mod json_array_encoder;
pub mod text_encoder;

// Logging configuration for binaries.
#[cfg(feature = "logging")]
pub mod logging;

pub use error::{Error, Result};
pub use label::Label;
pub use manager::{LabelManager, LabelsAt, TierKey, TierMut};
pub use opts::SliceOpts;
pub use search::{IntoPattern, LabelMatch};
pub use tier::{Anchor, Tier, TierKind};
pub use tolerance::{Time, Tolerance, approx_eq};
