//! Shared traversal primitives used by build, search, and maintenance.

use crate::{Error, Metric, Node, Result};

/// The index of the node whose leader is closest to `query`.
///
/// A linear scan; the best distance so far is fed back into the metric as
/// the halting threshold. Ties are broken by the lowest index because only
/// a strictly smaller distance replaces the current best.
///
/// # Errors
///
/// [`Error::EmptyInput`] if `nodes` is empty.
pub(crate) fn closest_child_index(metric: Metric, query: &[f32], nodes: &[Node]) -> Result<usize> {
    let mut best = f32::INFINITY;
    let mut closest = None;

    for (i, node) in nodes.iter().enumerate() {
        let d = metric.distance(query, node.leader().descriptor(), best);
        if d < best {
            best = d;
            closest = Some(i);
        }
    }

    closest.ok_or(Error::EmptyInput)
}

/// Descends through `nodes` by repeated [`closest_child_index`] until a node
/// with no children is reached, and returns that leaf mutably.
///
/// # Errors
///
/// [`Error::EmptyInput`] if any visited child sequence is empty.
pub(crate) fn nearest_leaf_mut<'a>(metric: Metric, query: &[f32], nodes: &'a mut [Node]) -> Result<&'a mut Node> {
    let target = closest_child_index(metric, query, nodes)?;
    let node = &mut nodes[target];
    if node.is_leaf() {
        Ok(node)
    } else {
        nearest_leaf_mut(metric, query, node.children_mut())
    }
}

#[cfg(test)]
mod tests {
    use super::{closest_child_index, nearest_leaf_mut};
    use crate::{Error, Metric, Node, Point};

    fn node(descriptor: Vec<f32>, id: u64) -> Node {
        Node::new(Point::new(descriptor, id))
    }

    #[test]
    fn closest_child_minimizes_leader_distance() {
        let nodes = vec![node(vec![0.0, 0.0], 0), node(vec![5.0, 5.0], 1), node(vec![2.0, 2.0], 2)];

        let i = closest_child_index(Metric::Euclidean, &[2.1, 2.1], &nodes).unwrap();
        assert_eq!(i, 2);
    }

    #[test]
    fn closest_child_ties_keep_the_first() {
        let nodes = vec![node(vec![1.0], 0), node(vec![3.0], 1), node(vec![3.0], 2)];

        let i = closest_child_index(Metric::Euclidean, &[3.0], &nodes).unwrap();
        assert_eq!(i, 1);
    }

    #[test]
    fn closest_child_over_nothing_is_an_error() {
        let err = closest_child_index(Metric::Euclidean, &[0.0], &[]).unwrap_err();
        assert_eq!(err, Error::EmptyInput);
    }

    #[test]
    fn nearest_leaf_descends_to_the_bottom() {
        // Two internal nodes, each with two clusters below.
        let mut left = node(vec![0.0], 0);
        left.push_child(node(vec![0.0], 0));
        left.push_child(node(vec![2.0], 1));
        let mut right = node(vec![10.0], 2);
        right.push_child(node(vec![10.0], 2));
        right.push_child(node(vec![12.0], 3));
        let mut level = vec![left, right];

        let leaf = nearest_leaf_mut(Metric::Euclidean, &[11.5], &mut level).unwrap();
        assert_eq!(leaf.leader().id(), 3);
        assert!(leaf.is_leaf());
    }
}
