/// The supported output formats for encoded query results.
///
/// Each variant maps to a concrete `LabelEncoder` implementation.
/// With the `cli` feature, `ValueEnum` lets this enum be used directly as a `clap` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum OutputType {
    /// Output labels as a JSON array.
    Json,

    /// Output one human-readable label per line.
    Text,
}
