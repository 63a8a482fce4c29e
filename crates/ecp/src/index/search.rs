//! Query processing: a best-first descent over the most promising branches.
//!
//! The frontier starts at the root's children and is narrowed to the `b`
//! closest branches at every level. Only the clusters reached by the
//! surviving branches are scanned, so the search is approximate unless `b`
//! covers every branch.

use crate::utils::{MinItem, SizedHeap};
use crate::{Index, Node};

/// Collects up to `k` nearest neighbors of `query`, ascending by distance
/// with distance ties broken toward smaller ids.
///
/// The caller has already validated `k`, `b`, the query dimensionality, and
/// that the root has children.
pub(super) fn k_nearest(index: &Index, query: &[f32], k: usize, b: usize) -> Vec<(u64, f32)> {
    let metric = index.metric();

    let mut frontier = index
        .root()
        .children()
        .iter()
        .map(|child| (metric.distance(query, child.leader().descriptor(), f32::INFINITY), child))
        .collect::<Vec<_>>();

    // Walk from level 1 down to the cluster level, expanding only the best
    // `b` branches of each level.
    for _ in 1..index.levels() {
        keep_best(&mut frontier, b);
        let next = frontier
            .iter()
            .flat_map(|&(_, node)| node.children())
            .map(|child| (metric.distance(query, child.leader().descriptor(), f32::INFINITY), child))
            .collect::<Vec<_>>();
        frontier = next;
    }
    keep_best(&mut frontier, b);

    // Scan the surviving clusters, feeding the current k-th distance back
    // into the metric as the halting threshold.
    let mut hits = SizedHeap::new(k);
    for &(_, cluster) in &frontier {
        for point in cluster.points() {
            let threshold = if hits.is_full() {
                hits.threshold().copied().unwrap_or(f32::INFINITY)
            } else {
                f32::INFINITY
            };
            let d = metric.distance(query, point.descriptor(), threshold);
            hits.push((point.id(), d));
        }
    }

    hits.into_sorted_vec()
}

/// Keeps the `b` closest entries of the frontier, in ascending distance
/// order. Distance ties keep their frontier position, so earlier branches
/// win.
fn keep_best(frontier: &mut Vec<(f32, &Node)>, b: usize) {
    if frontier.len() > b {
        frontier.sort_by_key(|&(d, _)| MinItem((), d));
        frontier.truncate(b);
    }
}
