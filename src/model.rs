//! The variation model itself: canonical master ordering, box-split support
//! derivation, delta back-substitution, and scalar evaluation.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, Weak};

use crate::error::VariationModelError;
use crate::location::{NormalizedLocation, Support, Tent};
use crate::point::Delta;
use crate::support::support_scalar;
use crate::tag::Tag;

/// An OpenType variation model: given a set of master locations, derives the
/// canonical ordering, support regions and delta weights needed to blend
/// per-master values at an arbitrary location.
///
/// Immutable after construction except for the submodel cache (see
/// [`get_sub_model`](Self::get_sub_model)), which is guarded by a
/// [`Mutex`] and so safe to query from multiple threads at once.
pub struct VariationModel {
    original_locations: Vec<NormalizedLocation>,
    axis_order: Vec<Tag>,
    sorted_locations: Vec<NormalizedLocation>,
    /// original index -> sorted index
    mapping: Vec<usize>,
    /// sorted index -> original index
    reverse_mapping: Vec<usize>,
    supports: Vec<Support>,
    /// row i: column j (< i) -> nonzero support_scalar(sorted_locations[i], supports[j])
    delta_weights: Vec<BTreeMap<usize, f64>>,
    sub_models: Mutex<HashMap<Vec<usize>, Arc<VariationModel>>>,
    self_ref: Weak<VariationModel>,
}

impl std::fmt::Debug for VariationModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VariationModel")
            .field("sorted_locations", &self.sorted_locations)
            .field("supports", &self.supports)
            .field("delta_weights", &self.delta_weights)
            .finish()
    }
}

fn ordered_axes(loc: &NormalizedLocation, axis_order: &[Tag]) -> Vec<Tag> {
    let mut ordered: Vec<Tag> = axis_order
        .iter()
        .filter(|tag| loc.keys().any(|k| k == *tag))
        .copied()
        .collect();
    let mut rest: Vec<Tag> = loc
        .keys()
        .filter(|tag| !axis_order.contains(tag))
        .copied()
        .collect();
    rest.sort();
    ordered.extend(rest);
    ordered
}

fn axis_order_index(tag: &Tag, axis_order: &[Tag]) -> usize {
    axis_order
        .iter()
        .position(|t| t == tag)
        .unwrap_or(0x10000)
}

fn on_point_count(loc: &NormalizedLocation, axis_points: &BTreeMap<Tag, Vec<f64>>) -> usize {
    loc.iter()
        .filter(|(tag, value)| {
            axis_points
                .get(*tag)
                .map(|points| points.contains(value))
                .unwrap_or(false)
        })
        .count()
}

/// The total order spec.md §4.4 sorts sparsified master locations by.
fn compare_locations(
    a: &NormalizedLocation,
    b: &NormalizedLocation,
    axis_order: &[Tag],
    axis_points: &BTreeMap<Tag, Vec<f64>>,
) -> Ordering {
    // 1. ascending rank
    let rank = a.len().cmp(&b.len());
    if rank != Ordering::Equal {
        return rank;
    }

    // 2. descending on-point axis count
    let on_point = on_point_count(b, axis_points).cmp(&on_point_count(a, axis_points));
    if on_point != Ordering::Equal {
        return on_point;
    }

    let a_axes = ordered_axes(a, axis_order);
    let b_axes = ordered_axes(b, axis_order);

    // 3. axis-order index sequence, shorter wins on prefix tie
    for (x, y) in a_axes.iter().zip(b_axes.iter()) {
        let idx = axis_order_index(x, axis_order).cmp(&axis_order_index(y, axis_order));
        if idx != Ordering::Equal {
            return idx;
        }
    }
    let len_cmp = a_axes.len().cmp(&b_axes.len());
    if len_cmp != Ordering::Equal {
        return len_cmp;
    }

    // 4. the axis lists themselves, lexicographically, shorter wins on prefix tie
    for (x, y) in a_axes.iter().zip(b_axes.iter()) {
        let tag_cmp = x.cmp(y);
        if tag_cmp != Ordering::Equal {
            return tag_cmp;
        }
    }

    // 5. per axis: sign ascending, then magnitude ascending
    for (x, y) in a_axes.iter().zip(b_axes.iter()) {
        let sign_cmp = a.get(x).signum().partial_cmp(&b.get(y).signum()).unwrap();
        if sign_cmp != Ordering::Equal {
            return sign_cmp;
        }
    }
    for (x, y) in a_axes.iter().zip(b_axes.iter()) {
        let abs_cmp = a.get(x).abs().partial_cmp(&b.get(y).abs()).unwrap();
        if abs_cmp != Ordering::Equal {
            return abs_cmp;
        }
    }
    Ordering::Equal
}

fn collect_axis_points(sparse: &[NormalizedLocation]) -> BTreeMap<Tag, Vec<f64>> {
    let mut axis_points: BTreeMap<Tag, Vec<f64>> = BTreeMap::new();
    for loc in sparse.iter().filter(|l| l.len() == 1) {
        let (tag, value) = loc.iter().next().unwrap();
        let points = axis_points.entry(*tag).or_insert_with(|| vec![0.0]);
        if !points.contains(&value) {
            points.push(value);
        }
    }
    axis_points
}

/// Initial box regions: one tent per axis a master deviates from default on,
/// spanning from the default out to the most extreme value seen on that
/// side of the axis across all masters.
fn initial_regions(sorted: &[NormalizedLocation]) -> Vec<Support> {
    let mut axis_min: BTreeMap<Tag, f64> = BTreeMap::new();
    let mut axis_max: BTreeMap<Tag, f64> = BTreeMap::new();
    for loc in sorted {
        for (tag, v) in loc.iter() {
            axis_max
                .entry(*tag)
                .and_modify(|m| *m = m.max(v))
                .or_insert(v);
            axis_min
                .entry(*tag)
                .and_modify(|m| *m = m.min(v))
                .or_insert(v);
        }
    }
    sorted
        .iter()
        .map(|loc| {
            loc.iter()
                .map(|(tag, v)| {
                    let tent = if v > 0.0 {
                        Tent::new(0.0, v, *axis_max.get(tag).unwrap())
                    } else {
                        Tent::new(*axis_min.get(tag).unwrap(), v, 0.0)
                    };
                    (*tag, tent)
                })
                .collect()
        })
        .collect()
}

/// The box-splitting refinement of spec.md §4.3: for each master (in sorted
/// order), shrink its initial region against every earlier master whose
/// region is "relevant" to it.
fn derive_supports(sorted: &[NormalizedLocation]) -> Vec<Support> {
    let regions = initial_regions(sorted);
    let mut supports: Vec<Support> = Vec::with_capacity(regions.len());

    for (i, region) in regions.iter().enumerate() {
        let mut refined = region.clone();
        for prev in &regions[..i] {
            if !prev.keys().all(|axis| region.contains_key(axis)) {
                continue;
            }
            let relevant = region.iter().all(|(axis, tent)| match prev.get(axis) {
                None => false,
                Some(prev_tent) => {
                    (prev_tent.peak - tent.peak).abs() < f64::EPSILON
                        || (tent.lower < prev_tent.peak && prev_tent.peak < tent.upper)
                }
            });
            if !relevant {
                continue;
            }

            let mut best_ratio = -1.0_f64;
            let mut best_axes: Support = Support::new();
            for (axis, prev_tent) in prev.iter() {
                // Ratios are computed against the *original* region bounds,
                // not the bounds accumulated so far in `refined` — each
                // earlier master gets a say based on the untouched box.
                let tent = region.get(axis).unwrap();
                let (lower, peak, upper) = (tent.lower, tent.peak, tent.upper);
                let val = prev_tent.peak;
                let (new_lower, new_upper, ratio) = if val < peak {
                    (val, upper, (val - peak) / (lower - peak))
                } else if peak < val {
                    (lower, val, (val - peak) / (upper - peak))
                } else {
                    continue;
                };
                if ratio > best_ratio {
                    best_ratio = ratio;
                    best_axes.clear();
                }
                if (ratio - best_ratio).abs() < f64::EPSILON {
                    best_axes.insert(*axis, Tent::new(new_lower, peak, new_upper));
                }
            }
            for (axis, tent) in best_axes.iter() {
                refined.insert(*axis, *tent);
            }
        }
        supports.push(refined);
    }
    supports
}

fn compute_delta_weights(
    sorted: &[NormalizedLocation],
    supports: &[Support],
) -> Vec<BTreeMap<usize, f64>> {
    sorted
        .iter()
        .enumerate()
        .map(|(i, loc)| {
            let mut row = BTreeMap::new();
            for (j, support) in supports[..i].iter().enumerate() {
                let w = support_scalar(loc, support);
                if w != 0.0 {
                    row.insert(j, w);
                }
            }
            row
        })
        .collect()
}

impl VariationModel {
    /// Build a variation model over `locations` (in caller order, not
    /// necessarily normalized-sparse), using `axis_order` as a tie-breaker
    /// for the canonical sort. Out-of-range coordinates are clamped to
    /// `[-1, 1]`; use [`new_strict`](Self::new_strict) to reject them instead.
    pub fn new(
        locations: Vec<NormalizedLocation>,
        axis_order: Vec<Tag>,
    ) -> Result<Arc<Self>, VariationModelError> {
        Self::build(locations, axis_order, false)
    }

    /// As [`new`](Self::new), but fails with
    /// [`VariationModelError::OutOfRange`] if any master coordinate falls
    /// outside `[-1, 1]`, instead of clamping it.
    pub fn new_strict(
        locations: Vec<NormalizedLocation>,
        axis_order: Vec<Tag>,
    ) -> Result<Arc<Self>, VariationModelError> {
        Self::build(locations, axis_order, true)
    }

    fn build(
        locations: Vec<NormalizedLocation>,
        axis_order: Vec<Tag>,
        strict: bool,
    ) -> Result<Arc<Self>, VariationModelError> {
        if strict {
            for loc in &locations {
                for (tag, v) in loc.iter() {
                    if !(-1.0..=1.0).contains(&v) {
                        return Err(VariationModelError::OutOfRange(v, *tag));
                    }
                }
            }
        }

        let original_locations: Vec<NormalizedLocation> = if strict {
            locations
        } else {
            locations
                .into_iter()
                .map(|loc| {
                    loc.iter()
                        .map(|(tag, v)| (*tag, v.clamp(-1.0, 1.0)))
                        .collect()
                })
                .collect()
        };
        let sparse: Vec<NormalizedLocation> =
            original_locations.iter().map(|l| l.sparsify()).collect();

        for i in 1..sparse.len() {
            for j in 0..i {
                if sparse[i] == sparse[j] {
                    return Err(VariationModelError::DuplicateMaster(sparse[i].clone()));
                }
            }
        }

        let axis_points = collect_axis_points(&sparse);
        let n = sparse.len();
        let mut order: Vec<usize> = (0..n).collect();
        let sort_order = permutation::sort_by(&order[..], |&i, &j| {
            compare_locations(&sparse[i], &sparse[j], &axis_order, &axis_points)
        });
        order = sort_order.apply_slice(&order[..]);
        let reverse_mapping = order;
        let sorted_locations: Vec<NormalizedLocation> = sort_order.apply_slice(&sparse[..]);

        let mut mapping = vec![0usize; n];
        for (sorted_idx, &original_idx) in reverse_mapping.iter().enumerate() {
            mapping[original_idx] = sorted_idx;
        }

        let supports = derive_supports(&sorted_locations);
        let delta_weights = compute_delta_weights(&sorted_locations, &supports);

        log::debug!(
            "built variation model over {} masters ({} axes seen)",
            n,
            axis_points.len()
        );

        Ok(Arc::new_cyclic(|weak| VariationModel {
            original_locations,
            axis_order,
            sorted_locations,
            mapping,
            reverse_mapping,
            supports,
            delta_weights,
            sub_models: Mutex::new(HashMap::new()),
            self_ref: weak.clone(),
        }))
    }

    /// The master locations as supplied to the constructor, in that order.
    pub fn original_locations(&self) -> &[NormalizedLocation] {
        &self.original_locations
    }

    /// The axis order this model was built with (used as a tiebreak in the
    /// canonical sort, and as a default for submodels).
    pub fn axis_order(&self) -> &[Tag] {
        &self.axis_order
    }

    /// The master locations after sparsification and canonical sort.
    pub fn sorted_locations(&self) -> &[NormalizedLocation] {
        &self.sorted_locations
    }

    /// The derived support region for each sorted master.
    pub fn supports(&self) -> &[Support] {
        &self.supports
    }

    /// Deltas in sorted-master order, computed from `values` (one value per
    /// original master, in original order) such that each master's value is
    /// reproduced exactly when the deltas are blended back at that master's
    /// own location.
    pub fn get_deltas<T: Delta>(&self, values: &[T]) -> Result<Vec<T>, VariationModelError> {
        if values.len() != self.original_locations.len() {
            return Err(VariationModelError::LengthMismatch {
                expected: self.original_locations.len(),
                actual: values.len(),
            });
        }
        let mut deltas: Vec<T> = Vec::with_capacity(self.sorted_locations.len());
        for i in 0..self.sorted_locations.len() {
            let mut delta = values[self.reverse_mapping[i]];
            for (&j, &w) in &self.delta_weights[i] {
                delta = delta - deltas[j] * w;
            }
            deltas.push(delta);
        }
        Ok(deltas)
    }

    /// The support scalar of each sorted master's region at `loc`.
    pub fn get_scalars(&self, loc: &NormalizedLocation) -> Vec<f64> {
        self.supports.iter().map(|s| support_scalar(loc, s)).collect()
    }

    /// The coefficients `c` (in original master order) such that the value
    /// interpolated at `loc` equals `sum(c[k] * master_values[k])`.
    pub fn get_master_scalars(&self, loc: &NormalizedLocation) -> Vec<f64> {
        let mut scalars = self.get_scalars(loc);
        for i in (0..scalars.len()).rev() {
            for (&j, &w) in &self.delta_weights[i] {
                scalars[j] -= scalars[i] * w;
            }
        }
        self.mapping.iter().map(|&sorted_idx| scalars[sorted_idx]).collect()
    }

    /// Sum `values[i] * scalars[i]`, skipping zero scalars, and returning
    /// `None` (rather than `Some(0)`) if every term was skipped.
    pub fn interpolate_from_values_and_scalars<T: Delta>(
        values: &[T],
        scalars: &[f64],
    ) -> Result<Option<T>, VariationModelError> {
        if values.len() != scalars.len() {
            return Err(VariationModelError::LengthMismatch {
                expected: values.len(),
                actual: scalars.len(),
            });
        }
        let mut acc: Option<T> = None;
        for (&value, &scalar) in values.iter().zip(scalars.iter()) {
            if scalar == 0.0 {
                continue;
            }
            let term = value * scalar;
            acc = Some(match acc {
                None => term,
                Some(running) => running + term,
            });
        }
        Ok(acc)
    }

    /// `interpolateFromValuesAndScalars(deltas, getScalars(loc))`.
    pub fn interpolate_from_deltas<T: Delta>(
        &self,
        loc: &NormalizedLocation,
        deltas: &[T],
    ) -> Option<T> {
        let scalars = self.get_scalars(loc);
        Self::interpolate_from_values_and_scalars(deltas, &scalars)
            .expect("get_scalars always returns one entry per sorted master")
    }

    /// `interpolateFromValuesAndScalars(masterValues, getMasterScalars(loc))`.
    pub fn interpolate_from_masters<T: Delta>(
        &self,
        loc: &NormalizedLocation,
        master_values: &[T],
    ) -> Result<Option<T>, VariationModelError> {
        let scalars = self.get_master_scalars(loc);
        Self::interpolate_from_values_and_scalars(master_values, &scalars)
    }

    /// Treats `scalars` as having come from [`get_scalars`](Self::get_scalars)
    /// (i.e. delta-scalars, not master-scalars): computes deltas from
    /// `master_values` first, then blends those against `scalars`. This is
    /// deliberately distinct from
    /// `interpolate_from_values_and_scalars(master_values, scalars)`, which
    /// would treat `scalars` as master-scalars instead.
    pub fn interpolate_from_masters_and_scalars<T: Delta>(
        &self,
        master_values: &[T],
        scalars: &[f64],
    ) -> Result<Option<T>, VariationModelError> {
        let deltas = self.get_deltas(master_values)?;
        Self::interpolate_from_values_and_scalars(&deltas, scalars)
    }

    /// Restrict this model to the masters for which `items` holds a value.
    ///
    /// `items` must have one entry per original master, in original order.
    /// If nothing is missing, returns this same model (by `Arc` identity)
    /// paired with `items` unwrapped; otherwise builds (or reuses a cached)
    /// submodel over just the present masters, with an empty axis order.
    /// Two calls with the same set of present indices always observe the
    /// same submodel instance.
    pub fn get_sub_model(
        &self,
        items: &[Option<f64>],
    ) -> Result<(Arc<VariationModel>, Vec<f64>), VariationModelError> {
        if items.len() != self.original_locations.len() {
            return Err(VariationModelError::LengthMismatch {
                expected: self.original_locations.len(),
                actual: items.len(),
            });
        }

        if items.iter().all(Option::is_some) {
            let values = items.iter().map(|v| v.unwrap()).collect();
            let this = self
                .self_ref
                .upgrade()
                .expect("a VariationModel always outlives a weak ref to itself");
            return Ok((this, values));
        }

        let present: Vec<usize> = items
            .iter()
            .enumerate()
            .filter_map(|(i, v)| v.map(|_| i))
            .collect();
        let values: Vec<f64> = items.iter().filter_map(|v| *v).collect();

        if let Some(existing) = self.sub_models.lock().unwrap().get(&present) {
            return Ok((Arc::clone(existing), values));
        }

        let sub_locations: Vec<NormalizedLocation> = present
            .iter()
            .map(|&i| self.original_locations[i].clone())
            .collect();
        let built = VariationModel::build(sub_locations, Vec::new(), false)
            .expect("a subset of an already-valid location set cannot fail to validate");

        let mut cache = self.sub_models.lock().unwrap();
        let entry = Arc::clone(cache.entry(present).or_insert(built));
        Ok((entry, values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tag;
    use assert_approx_eq::assert_approx_eq;

    fn loc(pairs: &[(&str, f64)]) -> NormalizedLocation {
        NormalizedLocation::from_iter(
            pairs.iter().map(|(t, v)| (Tag::from_raw(t).unwrap(), *v)),
        )
    }

    #[test]
    fn canonical_sort_nine_locations() {
        let locations = vec![
            loc(&[("wght", 0.55), ("wdth", 0.0)]),
            loc(&[("wght", -0.55), ("wdth", 0.0)]),
            loc(&[("wght", -1.0), ("wdth", 0.0)]),
            loc(&[("wght", 0.0), ("wdth", 1.0)]),
            loc(&[("wght", 0.66), ("wdth", 1.0)]),
            loc(&[("wght", 0.66), ("wdth", 0.66)]),
            loc(&[("wght", 0.0), ("wdth", 0.0)]),
            loc(&[("wght", 1.0), ("wdth", 1.0)]),
            loc(&[("wght", 1.0), ("wdth", 0.0)]),
        ];
        let model = VariationModel::new(locations, vec![tag!("wght")]).unwrap();

        let expected_locations = vec![
            loc(&[]),
            loc(&[("wght", -0.55)]),
            loc(&[("wght", -1.0)]),
            loc(&[("wght", 0.55)]),
            loc(&[("wght", 1.0)]),
            loc(&[("wdth", 1.0)]),
            loc(&[("wdth", 1.0), ("wght", 1.0)]),
            loc(&[("wdth", 1.0), ("wght", 0.66)]),
            loc(&[("wdth", 0.66), ("wght", 0.66)]),
        ];
        assert_eq!(model.sorted_locations, expected_locations);

        let tent = |lower, peak, upper| Tent::new(lower, peak, upper);
        let expected_supports: Vec<Support> = vec![
            Vec::<(Tag, Tent)>::new().into_iter().collect(),
            vec![(tag!("wght"), tent(-1.0, -0.55, 0.0))].into_iter().collect(),
            vec![(tag!("wght"), tent(-1.0, -1.0, -0.55))].into_iter().collect(),
            vec![(tag!("wght"), tent(0.0, 0.55, 1.0))].into_iter().collect(),
            vec![(tag!("wght"), tent(0.55, 1.0, 1.0))].into_iter().collect(),
            vec![(tag!("wdth"), tent(0.0, 1.0, 1.0))].into_iter().collect(),
            vec![(tag!("wdth"), tent(0.0, 1.0, 1.0)), (tag!("wght"), tent(0.0, 1.0, 1.0))]
                .into_iter()
                .collect(),
            vec![(tag!("wdth"), tent(0.0, 1.0, 1.0)), (tag!("wght"), tent(0.0, 0.66, 1.0))]
                .into_iter()
                .collect(),
            vec![(tag!("wdth"), tent(0.0, 0.66, 1.0)), (tag!("wght"), tent(0.0, 0.66, 1.0))]
                .into_iter()
                .collect(),
        ];
        assert_eq!(model.supports, expected_supports);

        assert_eq!(model.delta_weights[0], BTreeMap::new());
        assert_eq!(model.delta_weights[1], BTreeMap::from([(0, 1.0)]));
        assert_eq!(model.delta_weights[6], BTreeMap::from([(0, 1.0), (4, 1.0), (5, 1.0)]));
        assert_approx_eq!(model.delta_weights[7][&3], 0.755_555_57, 1e-6);
        assert_approx_eq!(model.delta_weights[7][&4], 0.244_444_49, 1e-6);
    }

    #[test]
    fn construction_logs_at_debug_level() {
        let _ = env_logger::try_init();
        let wght = tag!("wght");
        let locations = vec![loc(&[]), loc(&[("wght", 1.0)])];
        let model = VariationModel::new(locations, vec![wght]).unwrap();
        log::debug!("model under test: {:?}", model);
    }

    #[test]
    fn six_master_interpolation() {
        let a = tag!("A");
        let b = tag!("B");
        let locations = vec![
            loc(&[]),
            loc(&[("A", 1.0)]),
            loc(&[("B", 1.0)]),
            loc(&[("A", 1.0), ("B", 1.0)]),
            loc(&[("A", 0.5), ("B", 1.0)]),
            loc(&[("A", 1.0), ("B", 0.5)]),
        ];
        let model = VariationModel::new(locations, vec![a, b]).unwrap();
        let values = [0.0, 10.0, 20.0, 70.0, 50.0, 60.0];
        let at = loc(&[("A", 0.5), ("B", 0.5)]);

        let result = model.interpolate_from_masters(&at, &values).unwrap().unwrap();
        assert_approx_eq!(result, 37.5, 1e-9);

        let scalars = model.get_master_scalars(&at);
        let expected = [0.25, 0.0, 0.0, -0.25, 0.5, 0.5];
        for (got, want) in scalars.iter().zip(expected.iter()) {
            assert_approx_eq!(got, want, 1e-9);
        }
    }

    #[test]
    fn three_master_scalars() {
        let wght = tag!("wght");
        let wdth = tag!("wdth");
        let locations = vec![loc(&[]), loc(&[("wght", 1.0)]), loc(&[("wdth", 1.0)])];
        let model = VariationModel::new(locations, vec![wght, wdth]).unwrap();

        let check = |at: &[(&str, f64)], expected: [f64; 3]| {
            let scalars = model.get_master_scalars(&loc(at));
            for (got, want) in scalars.iter().zip(expected.iter()) {
                assert_approx_eq!(got, want, 1e-9);
            }
        };
        check(&[], [1.0, 0.0, 0.0]);
        check(&[("wght", 0.5)], [0.5, 0.5, 0.0]);
        check(&[("wght", 1.0), ("wdth", 1.0)], [-1.0, 1.0, 1.0]);
        check(&[("wght", 0.75), ("wdth", 0.75)], [-0.5, 0.75, 0.75]);
    }

    #[test]
    fn four_master_corner() {
        let wght = tag!("wght");
        let wdth = tag!("wdth");
        let locations = vec![
            loc(&[]),
            loc(&[("wght", 1.0)]),
            loc(&[("wdth", 1.0)]),
            loc(&[("wght", 1.0), ("wdth", 1.0)]),
        ];
        let model = VariationModel::new(locations, vec![wght, wdth]).unwrap();
        let scalars = model.get_master_scalars(&loc(&[("wght", 0.5), ("wdth", 0.5)]));
        for got in scalars {
            assert_approx_eq!(got, 0.25, 1e-9);
        }
    }

    #[test]
    fn scalar_sum_at_default() {
        let wght = tag!("wght");
        let locations = vec![loc(&[]), loc(&[("wght", 1.0)]), loc(&[("wght", -1.0)])];
        let model = VariationModel::new(locations, vec![wght]).unwrap();
        let scalars = model.get_master_scalars(&NormalizedLocation::new());
        assert_approx_eq!(scalars[0], 1.0, 1e-9);
        assert_approx_eq!(scalars[1], 0.0, 1e-9);
        assert_approx_eq!(scalars[2], 0.0, 1e-9);
    }

    #[test]
    fn exactness_at_masters() {
        let wght = tag!("wght");
        let wdth = tag!("wdth");
        let locations = vec![
            loc(&[]),
            loc(&[("wght", 1.0)]),
            loc(&[("wdth", 1.0)]),
            loc(&[("wght", 1.0), ("wdth", 1.0)]),
        ];
        let model = VariationModel::new(locations.clone(), vec![wght, wdth]).unwrap();
        let values = [1.0, 2.0, 3.0, 4.0];
        for (k, location) in locations.iter().enumerate() {
            let got = model.interpolate_from_masters(location, &values).unwrap().unwrap();
            assert_approx_eq!(got, values[k], 1e-9);
        }
    }

    #[test]
    fn get_scalars_bounded() {
        let wght = tag!("wght");
        let locations = vec![loc(&[]), loc(&[("wght", 1.0)]), loc(&[("wght", -1.0)])];
        let model = VariationModel::new(locations, vec![wght]).unwrap();
        for tenth in -10..=10 {
            let at = loc(&[("wght", tenth as f64 / 10.0)]);
            for s in model.get_scalars(&at) {
                assert!((0.0..=1.0).contains(&s), "scalar {} out of [0,1]", s);
            }
        }
    }

    #[test]
    fn duplicate_master_is_rejected() {
        let wght = tag!("wght");
        let locations = vec![loc(&[("wght", 0.5)]), loc(&[("wght", 0.5)])];
        let err = VariationModel::new(locations, vec![wght]).unwrap_err();
        assert!(matches!(err, VariationModelError::DuplicateMaster(_)));
    }

    #[test]
    fn new_clamps_out_of_range_coordinates() {
        let wght = tag!("wght");
        let locations = vec![loc(&[]), loc(&[("wght", 2.5)])];
        let model = VariationModel::new(locations, vec![wght]).unwrap();
        assert_approx_eq!(model.original_locations()[1].get(&wght), 1.0);
    }

    #[test]
    fn new_strict_rejects_out_of_range_coordinates() {
        let wght = tag!("wght");
        let locations = vec![loc(&[]), loc(&[("wght", 2.5)])];
        let err = VariationModel::new_strict(locations, vec![wght]).unwrap_err();
        assert!(matches!(err, VariationModelError::OutOfRange(_, _)));
    }

    #[test]
    fn length_mismatch_is_rejected() {
        let wght = tag!("wght");
        let locations = vec![loc(&[]), loc(&[("wght", 1.0)])];
        let model = VariationModel::new(locations, vec![wght]).unwrap();
        let err = model.get_deltas(&[1.0]).unwrap_err();
        assert!(matches!(err, VariationModelError::LengthMismatch { .. }));
    }

    #[test]
    fn sub_model_cache_identity() {
        let wght = tag!("wght");
        let wdth = tag!("wdth");
        let locations = vec![
            loc(&[]),
            loc(&[("wght", 1.0)]),
            loc(&[("wdth", 1.0)]),
            loc(&[("wght", 1.0), ("wdth", 1.0)]),
        ];
        let model = VariationModel::new(locations, vec![wght, wdth]).unwrap();
        let items = [Some(1.0), Some(2.0), None, Some(4.0)];
        let (a, _) = model.get_sub_model(&items).unwrap();
        let (b, _) = model.get_sub_model(&items).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn sub_model_unchanged_when_nothing_missing() {
        let wght = tag!("wght");
        let locations = vec![loc(&[]), loc(&[("wght", 1.0)])];
        let model = VariationModel::new(locations, vec![wght]).unwrap();
        let items = [Some(1.0), Some(2.0)];
        let (sub, values) = model.get_sub_model(&items).unwrap();
        assert!(Arc::ptr_eq(&sub, &model));
        assert_eq!(values, vec![1.0, 2.0]);
    }

    #[test]
    fn sub_model_length_mismatch_is_rejected() {
        let wght = tag!("wght");
        let locations = vec![loc(&[]), loc(&[("wght", 1.0)])];
        let model = VariationModel::new(locations, vec![wght]).unwrap();
        let err = model.get_sub_model(&[Some(1.0)]).unwrap_err();
        assert!(matches!(err, VariationModelError::LengthMismatch { .. }));
    }
}
