//! The OpenType variation model: canonical master ordering, support region
//! derivation, and delta/scalar interpolation for variable fonts.
//!
//! The entry point is [`VariationModel`]: build one from a set of master
//! locations in normalized `[-1, 1]` design space, then use it to compute
//! per-master deltas ([`VariationModel::get_deltas`]) or to blend master
//! values at an arbitrary location ([`VariationModel::interpolate_from_masters`]).

mod error;
mod location;
mod model;
mod point;
mod space;
mod support;
mod tag;

pub use error::VariationModelError;
pub use location::{NormalizedLocation, Support, Tent};
pub use model::VariationModel;
pub use point::{Delta, Point2D};
pub use space::{
    designspace_to_userspace, normalize_location, normalize_value, piecewise_linear_map,
    userspace_to_designspace, Axis, DesignCoord, NormalizedCoord, UserCoord,
};
pub use support::support_scalar;
pub use tag::{InvalidTag, Tag};
