//! Uniform sampling of unique indices.

use std::collections::HashSet;

use rand::Rng;

use crate::{Error, Result};

/// Picks `amount` unique indices from `[0, container_size)` uniformly, in
/// O(`amount`) time and space.
///
/// This is the streaming pass of Floyd's sampling algorithm: for each `j`
/// from `container_size - amount` up to `container_size - 1`, draw
/// `t ∈ [0, j]` and keep `t` if it has not been seen, otherwise keep `j`.
/// Each kept index is distinct, and the whole selection is deterministic for
/// a seeded generator.
///
/// # Errors
///
/// [`Error::Internal`] if more indices are requested than exist; reclustering
/// and build never do this on a consistent index.
pub(crate) fn random_unique_indices<R: Rng>(amount: usize, container_size: usize, rng: &mut R) -> Result<Vec<usize>> {
    if amount > container_size {
        return Err(Error::internal(format!(
            "cannot sample {amount} unique indices from {container_size} candidates"
        )));
    }

    let mut chosen = Vec::with_capacity(amount);
    let mut seen = HashSet::with_capacity(amount);

    for j in (container_size - amount)..container_size {
        let t = rng.random_range(0..=j);
        if seen.insert(t) {
            chosen.push(t);
        } else {
            seen.insert(j);
            chosen.push(j);
        }
    }

    Ok(chosen)
}
