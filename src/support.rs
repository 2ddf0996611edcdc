//! Evaluating a single master's support region at a location.

use crate::location::{NormalizedLocation, Support};

/// The blend weight, in `[0, 1]`, that `support` contributes at `location`.
///
/// An empty support (no axes constrained) always yields `1`. Each
/// constrained axis multiplies the running scalar by its own triangular
/// falloff, except when the axis is degenerate and is skipped entirely (see
/// the per-branch comments below) — those axes simply don't attenuate.
pub fn support_scalar(location: &NormalizedLocation, support: &Support) -> f64 {
    let mut scalar = 1.0;
    for (tag, tent) in support.iter() {
        let (lower, peak, upper) = (tent.lower, tent.peak, tent.upper);

        if peak == 0.0 {
            // Master is on the default along this axis: no constraint.
            continue;
        }
        if lower > peak || peak > upper {
            // Degenerate support: contributes no attenuation.
            continue;
        }
        if lower < 0.0 && upper > 0.0 {
            // Support straddles the default; can't be validly attenuated.
            continue;
        }

        let v = location.get(tag);
        if v == peak {
            continue;
        }
        if v <= lower || v >= upper {
            return 0.0;
        }
        if v < peak {
            scalar *= (v - lower) / (peak - lower);
        } else {
            scalar *= (v - upper) / (peak - upper);
        }
    }
    scalar
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::Tent;
    use assert_approx_eq::assert_approx_eq;

    fn loc(pairs: &[(&str, f64)]) -> NormalizedLocation {
        NormalizedLocation::from_iter(
            pairs
                .iter()
                .map(|(t, v)| (crate::Tag::from_raw(t).unwrap(), *v)),
        )
    }

    fn support(pairs: &[(&str, (f64, f64, f64))]) -> Support {
        pairs
            .iter()
            .map(|(t, tent)| (crate::Tag::from_raw(t).unwrap(), Tent::from(*tent)))
            .collect()
    }

    #[test]
    fn basics() {
        assert_approx_eq!(support_scalar(&loc(&[]), &support(&[])), 1.0);
        assert_approx_eq!(support_scalar(&loc(&[("wght", 0.2)]), &support(&[])), 1.0);
        assert_approx_eq!(
            support_scalar(&loc(&[("wght", 0.2)]), &support(&[("wght", (0.0, 2.0, 3.0))])),
            0.1
        );
        assert_approx_eq!(
            support_scalar(&loc(&[("wght", 2.5)]), &support(&[("wght", (0.0, 2.0, 4.0))])),
            0.75
        );
        assert_approx_eq!(
            support_scalar(&loc(&[("wght", 3.0)]), &support(&[("wght", (0.0, 2.0, 2.0))])),
            0.0
        );
    }

    #[test]
    fn outside_range_is_zero() {
        assert_approx_eq!(
            support_scalar(&loc(&[("wght", -0.5)]), &support(&[("wght", (0.0, 1.0, 1.0))])),
            0.0
        );
    }

    #[test]
    fn straddling_default_is_skipped() {
        assert_approx_eq!(
            support_scalar(&loc(&[("wght", 0.5)]), &support(&[("wght", (-1.0, 1.0, 1.0))])),
            1.0
        );
    }
}
