//! Bulk index construction.
//!
//! A bulk build runs in three steps: compute the per-level node counts,
//! assemble the tree of leaders bottom-up from randomly selected
//! descriptors, then route every dataset entry into its nearest leaf
//! cluster.

use log::debug;
use rand::{rngs::StdRng, Rng};

use crate::traversal::nearest_leaf_mut;
use crate::utils::random_unique_indices;
use crate::{Metric, Node, Point, ReclusteringScheme, Result};

/// Builds the tree for `dataset` and returns the root together with the
/// number of levels beneath it.
pub(super) fn bulk_build(
    dataset: Vec<Vec<f32>>,
    scheme: &ReclusteringScheme,
    metric: Metric,
    rng: &mut StdRng,
) -> Result<(Node, usize)> {
    let sizes = level_sizes(dataset.len(), scheme.lo_mark());
    debug!(
        "bulk build: {} descriptors, {} levels, level sizes {:?}",
        dataset.len(),
        sizes.len(),
        sizes,
    );

    let mut root = assemble(&dataset, &sizes, scheme.hi_mark(), metric, rng)?;
    populate(&mut root, dataset, metric)?;

    Ok((root, sizes.len()))
}

/// The node count of each level, cluster level first.
///
/// The cluster level holds `ceil(n / lo_mark)` clusters; each level above
/// divides the count below by `lo_mark` (rounded up) until a level fits
/// within the target fanout. That last count is level 1, directly under the
/// root.
fn level_sizes(n: usize, lo_mark: usize) -> Vec<usize> {
    let mut sizes = vec![n.div_ceil(lo_mark)];
    let mut current = sizes[0];
    while current > lo_mark {
        let next = current.div_ceil(lo_mark);
        if next >= current {
            // A lower mark of 1 cannot shrink a level; stop at a flat index.
            break;
        }
        current = next;
        sizes.push(current);
    }
    sizes
}

/// Assembles the tree of leaders bottom-up.
///
/// The cluster level is seeded with randomly selected dataset descriptors,
/// keeping their dataset positions as ids. Each level above is seeded by
/// cloning the leaders of randomly selected nodes from the level below, and
/// every lower node is then moved under the upper node whose leader is
/// nearest to its own. The root clones the leader of one random top-level
/// node.
fn assemble(
    dataset: &[Vec<f32>],
    sizes: &[usize],
    hi_mark: usize,
    metric: Metric,
    rng: &mut StdRng,
) -> Result<Node> {
    let mut previous: Vec<Node> = Vec::new();

    for (level, &size) in sizes.iter().enumerate() {
        let pool = if level == 0 { dataset.len() } else { previous.len() };
        let leaders = random_unique_indices(size, pool, rng)?;

        let mut current = Vec::with_capacity(size);
        if previous.is_empty() {
            for index in leaders {
                current.push(Node::cluster(Point::new(dataset[index].clone(), index as u64), hi_mark));
            }
        } else {
            for &index in &leaders {
                current.push(Node::new(previous[index].leader().clone()));
            }
            for node in previous {
                let target = crate::traversal::closest_child_index(metric, node.leader().descriptor(), &current)?;
                current[target].push_child(node);
            }
        }
        previous = current;
    }

    let pick = rng.random_range(0..previous.len());
    let mut root = Node::new(previous[pick].leader().clone());
    root.set_children(previous);
    Ok(root)
}

/// Routes every dataset entry into its nearest leaf cluster, in input order.
///
/// An entry is skipped only when its id equals the reached cluster's leader
/// id, because that descriptor was already stored there when the tree was
/// assembled.
fn populate(root: &mut Node, dataset: Vec<Vec<f32>>, metric: Metric) -> Result<()> {
    for (id, descriptor) in dataset.into_iter().enumerate() {
        let leaf = nearest_leaf_mut(metric, &descriptor, root.children_mut())?;
        if leaf.leader().id() == id as u64 {
            continue;
        }
        leaf.push_point(Point::new(descriptor, id as u64));
    }
    Ok(())
}
