//! Uniform sampling of a single element from an iterator. The driver uses these to pick the
//! infector for a contact event (known length) and the contacted neighbor (a filtered adjacency
//! list of unknown length) without allocating.

use rand::Rng;

/// Sample a random element uniformly from an iterator of known length.
///
/// We do not assume the container is randomly indexable, only that it can be iterated over.
/// Exactly one draw is made when the iterator is non-empty, none otherwise.
pub fn sample_single_from_known_length<I, R, T>(rng: &mut R, mut iter: I) -> Option<T>
where
    R: Rng,
    I: ExactSizeIterator<Item = T>,
{
    let len = iter.len();
    if len == 0 {
        return None;
    }
    let index = rng.random_range(0..len);
    iter.nth(index)
}

/// Sample a random element uniformly from an iterator of unknown length.
///
/// This function implements "Algorithm L" from KIM-HUNG LI
/// Reservoir-Sampling Algorithms of Time Complexity O(n(1 + log(N/n)))
/// <https://dl.acm.org/doi/pdf/10.1145/198429.198435>
///
/// For a single element the skip distance only depends on one running weight, so the number of
/// draws grows with the logarithm of the length rather than the length itself.
pub fn sample_single_l_reservoir<I, R, T>(rng: &mut R, iterable: I) -> Option<T>
where
    R: Rng,
    I: IntoIterator<Item = T>,
{
    let mut chosen_item: Option<T> = None;
    let mut weight: f64 = rng.random_range(0.0..1.0); // controls skip distance distribution
    let mut position: usize = 0;
    let mut next_pick_position: usize = 1;

    for item in iterable {
        position += 1;
        if position == next_pick_position {
            chosen_item = Some(item);
            // A zero draw yields an infinite skip, which saturates.
            let skip = (f64::ln(rng.random_range(0.0..1.0)) / f64::ln(1.0 - weight)).floor() as usize;
            next_pick_position = next_pick_position.saturating_add(skip).saturating_add(1);
            weight *= rng.random_range(0.0..1.0);
        }
    }

    chosen_item
}
