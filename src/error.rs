use thiserror::Error;

/// Tiergrid's crate-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Tiergrid's crate-wide error type.
///
/// This is intentionally decoupled from `anyhow` so downstream libraries aren't forced to
/// adopt `anyhow` in their own public APIs.
///
/// Every variant is scoped to the single call that produced it; nothing here is transient,
/// so callers should never retry.
#[derive(Debug, Error)]
pub enum Error {
    /// A time-based lookup (`label_at`, `labels_at`) matched no label.
    #[error("no label found at {time}")]
    NotFound { time: f64 },

    /// Malformed arguments or an insertion that would break a tier invariant.
    #[error("{0}")]
    Value(String),

    /// A regular expression failed to compile.
    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// Positional access past either end of a tier or manager.
    #[error("index {index} is out of bounds for length {len}")]
    OutOfBounds { index: isize, len: usize },

    /// No tier carries the requested name.
    #[error("no tier named '{0}'")]
    UnknownTier(String),

    /// Name-based access on a `labels_at` result whose tiers are not (validly) named.
    #[error("cannot look up '{0}' by name: tiers are not named")]
    Unnamed(String),

    /// A single-label slice matched more than one label.
    #[error("found {count} labels while looking for one")]
    Ambiguous { count: usize },

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn value(message: impl Into<String>) -> Self {
        Self::Value(message.into())
    }

    pub(crate) fn out_of_bounds(index: usize, len: usize) -> Self {
        Self::OutOfBounds {
            index: isize::try_from(index).unwrap_or(isize::MAX),
            len,
        }
    }

    /// Whether this error belongs to the "malformed argument" class.
    pub fn is_value_error(&self) -> bool {
        matches!(self, Self::Value(_) | Self::Pattern(_))
    }
}
