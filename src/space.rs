//! The three coordinate spaces a variable font axis moves through, and the
//! conversions between them.
//!
//! `UserCoord`, `DesignCoord` and `NormalizedCoord` are disjoint types with
//! no implicit conversion between them, so a value read from one space can't
//! be silently passed where another is expected — the only way to move
//! between spaces is through the named functions below.

use std::cmp::Ordering;

use crate::error::VariationModelError;
use crate::location::NormalizedLocation;
use crate::tag::Tag;

/// A coordinate in user space, e.g. the `wght=650` an end user types into a
/// font picker.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct UserCoord(pub f64);

/// A coordinate in design space, the font designer's own units.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct DesignCoord(pub f64);

/// A coordinate normalized to `[-1, 1]`, the space the variation model
/// actually interpolates in.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct NormalizedCoord(pub f64);

/// A design axis in user-space units, with an optional user→design break
/// table.
#[derive(Debug, Clone)]
pub struct Axis {
    pub tag: Tag,
    pub name: Option<String>,
    pub minimum: UserCoord,
    pub default: UserCoord,
    pub maximum: UserCoord,
    /// User-space to design-space break points, sorted ascending on `.0`.
    /// Empty means user space and design space coincide for this axis.
    pub map: Vec<(UserCoord, DesignCoord)>,
    pub hidden: bool,
}

impl Axis {
    pub fn new(tag: Tag, minimum: f64, default: f64, maximum: f64) -> Self {
        Axis {
            tag,
            name: None,
            minimum: UserCoord(minimum),
            default: UserCoord(default),
            maximum: UserCoord(maximum),
            map: Vec::new(),
            hidden: false,
        }
    }

    fn design_default(&self) -> DesignCoord {
        DesignCoord(userspace_to_designspace(self, self.default.0))
    }

    fn design_minimum(&self) -> DesignCoord {
        DesignCoord(userspace_to_designspace(self, self.minimum.0))
    }

    fn design_maximum(&self) -> DesignCoord {
        DesignCoord(userspace_to_designspace(self, self.maximum.0))
    }
}

/// Perform a piecewise-linear mapping of `value` through a sorted table of
/// `(from, to)` break points.
///
/// An empty table is the identity. Values at or beyond either end of the
/// table clamp to that end's `to`; values between two break points are
/// linearly interpolated. A value exactly on a break point maps to that
/// break point's `to` (the comparison is inclusive on both sides of a
/// bracketing segment).
pub fn piecewise_linear_map(value: f64, table: &[(f64, f64)]) -> f64 {
    if table.is_empty() {
        return value;
    }
    if let Some(&(_, to)) = table.iter().find(|(from, _)| *from == value) {
        return to;
    }
    let (first_from, first_to) = table[0];
    if value <= first_from {
        return first_to;
    }
    let (last_from, last_to) = table[table.len() - 1];
    if value >= last_from {
        return last_to;
    }
    let lower = table
        .iter()
        .filter(|(from, _)| *from < value)
        .max_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal))
        .unwrap();
    let upper = table
        .iter()
        .filter(|(from, _)| *from > value)
        .min_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal))
        .unwrap();
    lower.1 + (upper.1 - lower.1) * (value - lower.0) / (upper.0 - lower.0)
}

/// Map a user-space coordinate to design space through `axis.map`.
pub fn userspace_to_designspace(axis: &Axis, value: f64) -> f64 {
    let table: Vec<(f64, f64)> = axis.map.iter().map(|(u, d)| (u.0, d.0)).collect();
    piecewise_linear_map(value, &table)
}

/// Map a design-space coordinate back to user space: the same break table,
/// read in reverse.
pub fn designspace_to_userspace(axis: &Axis, value: f64) -> f64 {
    let reversed: Vec<(f64, f64)> = axis.map.iter().map(|(u, d)| (d.0, u.0)).collect();
    piecewise_linear_map(value, &reversed)
}

/// Normalize a design-space value against an axis's (min, default, max), to
/// a value in `[-1, 1]`.
///
/// Fails if the axis is ill-defined (`min <= default <= max` does not hold).
/// When `extrapolate` is false (the common case) `v` is clamped to
/// `[min, max]` before normalizing, so the result is always in range.
pub fn normalize_value(
    v: f64,
    tag: Tag,
    min: f64,
    default: f64,
    max: f64,
    extrapolate: bool,
) -> Result<f64, VariationModelError> {
    if !(min <= default && default <= max) {
        return Err(VariationModelError::InvalidAxis {
            tag,
            min,
            default,
            max,
        });
    }
    let v = if extrapolate {
        v
    } else {
        v.max(min).min(max)
    };
    let result = if v == default || min == max {
        0.0
    } else if (v < default && min != default) || (v > default && max == default) {
        // Either the normal below-default branch, or the case where the
        // axis has no room above default (max == default): fall back to the
        // same (default - min) denominator to avoid dividing by zero.
        (v - default) / (default - min)
    } else {
        (v - default) / (max - default)
    };
    log::trace!("normalized {} against ({}, {}, {}) -> {}", v, min, default, max, result);
    Ok(result)
}

/// Normalize every axis of `loc` (a design-space location) against `axes`,
/// filling in any axis `loc` doesn't mention with that axis's default (which
/// always normalizes to 0).
pub fn normalize_location(
    loc: &[(Tag, f64)],
    axes: &[Axis],
) -> Result<NormalizedLocation, VariationModelError> {
    let mut out = NormalizedLocation::new();
    for axis in axes {
        let design_value = loc
            .iter()
            .find(|(tag, _)| *tag == axis.tag)
            .map(|(_, v)| *v)
            .unwrap_or(axis.design_default().0);
        let normalized = normalize_value(
            design_value,
            axis.tag,
            axis.design_minimum().0,
            axis.design_default().0,
            axis.design_maximum().0,
            false,
        )?;
        out.insert(axis.tag, normalized);
    }
    Ok(out)
}
