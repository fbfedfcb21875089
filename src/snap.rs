//! Nearest-neighbour selection over tabulated values.
//!
//! Tie rule: when two candidates are equally close to the target, the one
//! that comes first wins. Stellar-mass entries are stored in ascending
//! order, so an exact midpoint between two mass bins resolves to the lower
//! bin. Redshift bins are scanned in table order, so the first bin listed
//! wins.

/// Index of the candidate closest to `target`, or [`None`] when there are
/// no candidates.
///
/// # Examples
///
/// ```
/// use cosmic_variance::snap::nearest_index;
///
/// let bins = [8.75, 9.25, 9.75];
/// assert_eq!(nearest_index(bins, 9.3), Some(1));
/// // 9.0 is equidistant from 8.75 and 9.25; the lower bin wins.
/// assert_eq!(nearest_index(bins, 9.0), Some(0));
/// ```
#[must_use]
pub fn nearest_index<I>(candidates: I, target: f64) -> Option<usize>
where
    I: IntoIterator<Item = f64>,
{
    let mut best: Option<(usize, f64)> = None;
    for (index, value) in candidates.into_iter().enumerate() {
        #[expect(clippy::float_arithmetic, reason = "distance to candidate")]
        let distance = (value - target).abs();
        match best {
            Some((_, closest)) if distance >= closest => {}
            _ => best = Some((index, distance)),
        }
    }
    best.map(|(index, _)| index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const MASS_BINS: [f64; 6] = [8.75, 9.25, 9.75, 10.25, 10.75, 11.25];

    #[rstest]
    #[case(8.75, 0)]
    #[case(10.2, 3)]
    #[case(10.4, 3)]
    #[case(10.0, 2)]
    #[case(10.5, 3)]
    #[case(11.5, 5)]
    #[case(5.0, 0)]
    #[case(14.0, 5)]
    fn snaps_to_nearest_mass(#[case] target: f64, #[case] expected: usize) {
        assert_eq!(nearest_index(MASS_BINS, target), Some(expected));
    }

    #[rstest]
    fn empty_candidates_have_no_nearest() {
        assert_eq!(nearest_index(std::iter::empty(), 1.0), None);
    }

    #[rstest]
    fn duplicate_candidates_pick_first() {
        assert_eq!(nearest_index([2.0, 1.0, 1.0], 1.0), Some(1));
    }
}
