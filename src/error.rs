use crate::location::NormalizedLocation;
use crate::tag::Tag;

/// Errors raised synchronously by this crate's public API.
///
/// None of these are retried internally; the caller decides how to react.
#[derive(Debug, thiserror::Error)]
pub enum VariationModelError {
    /// An axis's (min, default, max) triple does not satisfy `min <= default <= max`.
    #[error("axis {tag}: min ({min}) / default ({default}) / max ({max}) is not ascending")]
    InvalidAxis {
        tag: Tag,
        min: f64,
        default: f64,
        max: f64,
    },

    /// A values array did not match the expected length.
    #[error("expected {expected} values, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    /// Two master locations were equal after dropping their explicit-zero axes.
    #[error("duplicate master location after sparsification: {0:?}")]
    DuplicateMaster(NormalizedLocation),

    /// A normalized coordinate outside `[-1, 1]` was supplied to a strict constructor.
    #[error("coordinate {0} for axis {1} is outside [-1, 1]")]
    OutOfRange(f64, Tag),
}
