//! Dynamic maintenance: insertion, reclustering, and index growth.
//!
//! An insertion descends to the nearest cluster and appends there. The
//! cluster is then checked against the cluster policy, and the check walks
//! back up the descent path under the node policy, reclustering each level
//! that fires and stopping at the first that does not. When every level up
//! to the root fired and the root's own fanout has overflowed, the index
//! grows a new root level.

use std::mem;

use log::debug;
use rand::{rngs::StdRng, Rng};

use crate::traversal::closest_child_index;
use crate::utils::random_unique_indices;
use crate::{Error, Metric, Node, Point, ReclusteringPolicy, ReclusteringScheme, Result};

/// Inserts `point` below `root` and runs the reclustering protocol.
/// Returns whether the index grew a level.
pub(super) fn insert(
    root: &mut Node,
    levels: usize,
    point: Point,
    scheme: &ReclusteringScheme,
    metric: Metric,
    rng: &mut StdRng,
) -> Result<bool> {
    let propagate = descend(root, levels, point, scheme, metric, rng)?;

    if propagate && root.children().len() > scheme.hi_mark() {
        grow(root, scheme, metric, rng)?;
        return Ok(true);
    }
    Ok(false)
}

/// Recursively descends to the nearest cluster, appends the point, and runs
/// the policy checks on the way back up.
///
/// The return value says whether the caller, one level further up, should
/// keep checking: `false` stops the upward propagation.
fn descend(
    parent: &mut Node,
    depth: usize,
    point: Point,
    scheme: &ReclusteringScheme,
    metric: Metric,
    rng: &mut StdRng,
) -> Result<bool> {
    let target = closest_child_index(metric, point.descriptor(), parent.children())?;

    if depth == 1 {
        // The children of `parent` are clusters.
        parent.children_mut()[target].push_point(point);
        if cluster_reclustering_required(&parent.children()[target], parent, scheme) {
            recluster_clusters(parent, scheme, metric, rng)?;
        }
        Ok(true)
    } else {
        let propagate = descend(&mut parent.children_mut()[target], depth - 1, point, scheme, metric, rng)?;
        if !propagate {
            return Ok(false);
        }
        if node_reclustering_required(&parent.children()[target], parent, scheme) {
            recluster_internal(parent, scheme, metric, rng)?;
            Ok(true)
        } else {
            Ok(false)
        }
    }
}

/// Whether the cluster that just received a point requires its level to be
/// reclustered.
fn cluster_reclustering_required(cluster: &Node, parent: &Node, scheme: &ReclusteringScheme) -> bool {
    match scheme.cluster_policy() {
        ReclusteringPolicy::Absolute => cluster.points().len() >= scheme.hi_mark(),
        ReclusteringPolicy::Average => {
            points_below(parent) > parent.children().len() * scheme.hi_mark()
        }
    }
}

/// Whether the internal node on the descent path requires its level to be
/// reclustered.
fn node_reclustering_required(node: &Node, parent: &Node, scheme: &ReclusteringScheme) -> bool {
    match scheme.node_policy() {
        ReclusteringPolicy::Absolute => node.children().len() >= scheme.hi_mark(),
        ReclusteringPolicy::Average => {
            fanout_below(parent) > parent.children().len() * scheme.hi_mark()
        }
    }
}

/// Total number of points held by the children of `parent`. Cluster-level
/// accounting for the average policy.
fn points_below(parent: &Node) -> usize {
    parent.children().iter().map(|child| child.points().len()).sum()
}

/// Total fanout of the children of `parent`. Internal-level accounting for
/// the average policy.
fn fanout_below(parent: &Node) -> usize {
    parent.children().iter().map(|child| child.children().len()).sum()
}

/// Rebuilds the cluster level below `parent` from freshly sampled leaders.
///
/// All points are gathered in order, `ceil(n / lo_mark)` of them are drawn
/// as the new leaders, and the rest are routed to their nearest new leader.
/// The new clusters replace the old children in one assignment, so a failure
/// partway leaves no half-moved state behind. Point count and ids are
/// preserved; points move, they are never cloned.
fn recluster_clusters(parent: &mut Node, scheme: &ReclusteringScheme, metric: Metric, rng: &mut StdRng) -> Result<()> {
    let points = parent
        .take_children()
        .into_iter()
        .flat_map(Node::into_points)
        .collect::<Vec<_>>();
    if points.is_empty() {
        return Err(Error::internal("reclustering found no points below the parent"));
    }

    let fanout = points.len().div_ceil(scheme.lo_mark());
    debug!("reclustering {} points into {} clusters", points.len(), fanout);

    let leaders = random_unique_indices(fanout, points.len(), rng)?;
    let mut slots = points.into_iter().map(Some).collect::<Vec<_>>();

    let mut clusters = Vec::with_capacity(fanout);
    for &index in &leaders {
        let leader = slots[index]
            .take()
            .ok_or_else(|| Error::internal("leader index drawn twice"))?;
        clusters.push(Node::cluster(leader, scheme.hi_mark()));
    }

    for point in slots.into_iter().flatten() {
        let target = closest_child_index(metric, point.descriptor(), &clusters)?;
        clusters[target].push_point(point);
    }

    parent.set_children(clusters);
    Ok(())
}

/// Rebuilds the internal level below `parent` from freshly sampled leaders.
///
/// The grandchildren are gathered, `ceil(n / lo_mark)` of them lend their
/// leaders (cloned) to new internal nodes, and every grandchild subtree is
/// moved whole under the nearest new node. The discarded old nodes held
/// nothing but leader clones, so no point is lost.
fn recluster_internal(parent: &mut Node, scheme: &ReclusteringScheme, metric: Metric, rng: &mut StdRng) -> Result<()> {
    let grandchildren = parent
        .take_children()
        .into_iter()
        .flat_map(|mut child| child.take_children())
        .collect::<Vec<_>>();
    if grandchildren.is_empty() {
        return Err(Error::internal("reclustering found no nodes below the parent"));
    }

    let fanout = grandchildren.len().div_ceil(scheme.lo_mark());
    debug!("reclustering {} nodes into {} internal nodes", grandchildren.len(), fanout);

    let leaders = random_unique_indices(fanout, grandchildren.len(), rng)?;
    let mut nodes = leaders
        .iter()
        .map(|&index| Node::new(grandchildren[index].leader().clone()))
        .collect::<Vec<_>>();

    for child in grandchildren {
        let target = closest_child_index(metric, child.leader().descriptor(), &nodes)?;
        nodes[target].push_child(child);
    }

    parent.set_children(nodes);
    Ok(())
}

/// Grows the index by one level.
///
/// A random child lends its leader (cloned) to the new root, the old root
/// becomes the new root's only child, and the overgrown level below is
/// immediately reclustered to restore the fanout. The caller accounts for
/// the extra level.
fn grow(root: &mut Node, scheme: &ReclusteringScheme, metric: Metric, rng: &mut StdRng) -> Result<()> {
    if root.children().is_empty() {
        return Err(Error::internal("cannot grow an index with no root children"));
    }
    debug!(
        "growing the index: root fanout {} exceeds {}",
        root.children().len(),
        scheme.hi_mark(),
    );

    let pick = rng.random_range(0..root.children().len());
    let leader = root.children()[pick].leader().clone();

    let old_root = mem::replace(root, Node::new(leader));
    root.push_child(old_root);

    recluster_internal(root, scheme, metric, rng)
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::{cluster_reclustering_required, points_below, recluster_clusters};
    use crate::index::Index;
    use crate::{BuildParams, Metric, Node, Point, ReclusteringPolicy, ReclusteringScheme};

    fn scheme(sc: u32, span: f32, policy: ReclusteringPolicy) -> ReclusteringScheme {
        let params = BuildParams::new(sc)
            .with_span(span)
            .with_cluster_policy(policy)
            .with_node_policy(policy);
        ReclusteringScheme::derive(&params).unwrap()
    }

    /// A level-1 index with a single cluster holding three points, one
    /// insertion away from drifting past its marks.
    fn three_point_index(policy: ReclusteringPolicy) -> Index {
        let mut cluster = Node::cluster(Point::new(vec![0.0, 0.0, 0.0], 0), 4);
        cluster.push_point(Point::new(vec![2.0, 2.0, 2.0], 2));
        cluster.push_point(Point::new(vec![3.0, 3.0, 3.0], 3));

        let mut root = Node::new(Point::new(vec![0.0, 0.0, 0.0], 0));
        root.push_child(cluster);

        Index {
            levels: 1,
            size: 3,
            root,
            scheme: scheme(2, 0.0, policy),
            metric: Metric::Euclidean,
            dimensionality: 3,
            rng: StdRng::seed_from_u64(42),
        }
    }

    #[test]
    fn insert_with_average_policy_reclusters_the_overfull_level() {
        let mut index = three_point_index(ReclusteringPolicy::Average);

        index.insert(&[42.0, 42.0, 42.0]).unwrap();

        assert_eq!(index.len(), 4);
        assert_eq!(index.levels(), 1);
        assert!(index.root().children().len() >= 2);

        let stored = points_below(index.root());
        assert_eq!(stored, 4);
    }

    #[test]
    fn points_below_counts_all_cluster_points() {
        let mut root = Node::new(Point::new(vec![1.0], 1));
        for _ in 0..2 {
            let mut cluster = Node::cluster(Point::new(vec![2.0], 2), 2);
            cluster.push_point(Point::new(vec![2.0], 2));
            root.push_child(cluster);
        }
        assert_eq!(points_below(&root), 4);
    }

    #[test]
    fn absolute_policy_fires_on_a_cluster_at_the_high_mark() {
        let mut cluster = Node::cluster(Point::new(vec![2.0], 2), 3);
        cluster.push_point(Point::new(vec![2.0], 2));
        cluster.push_point(Point::new(vec![2.0], 2));
        let mut root = Node::new(Point::new(vec![1.0], 1));
        root.push_child(cluster);

        let scheme = scheme(2, 0.0, ReclusteringPolicy::Absolute);
        assert!(cluster_reclustering_required(&root.children()[0], &root, &scheme));
    }

    #[test]
    fn average_policy_tolerates_one_hot_cluster() {
        // Three clusters, five points in total: the average is below the
        // mark even though one cluster is past it.
        let mut root = Node::new(Point::new(vec![1.0], 1));
        let mut hot = Node::cluster(Point::new(vec![2.0], 2), 3);
        hot.push_point(Point::new(vec![2.0], 2));
        hot.push_point(Point::new(vec![2.0], 2));
        root.push_child(hot);
        root.push_child(Node::cluster(Point::new(vec![2.0], 2), 1));
        root.push_child(Node::cluster(Point::new(vec![2.0], 2), 1));

        let scheme = scheme(2, 0.0, ReclusteringPolicy::Average);
        assert!(!cluster_reclustering_required(&root.children()[0], &root, &scheme));
    }

    #[test]
    fn average_policy_fires_once_the_level_as_a_whole_drifts() {
        // Two clusters, five points: 5 > 2 * 2.
        let mut root = Node::new(Point::new(vec![1.0], 1));
        let mut hot = Node::cluster(Point::new(vec![2.0], 2), 4);
        for _ in 0..3 {
            hot.push_point(Point::new(vec![2.0], 2));
        }
        root.push_child(hot);
        root.push_child(Node::cluster(Point::new(vec![2.0], 2), 1));

        let scheme = scheme(2, 0.0, ReclusteringPolicy::Average);
        assert!(cluster_reclustering_required(&root.children()[0], &root, &scheme));
    }

    #[test]
    fn reclustering_preserves_points_and_ids() {
        let mut root = Node::new(Point::new(vec![0.0], 0));
        let mut cluster = Node::cluster(Point::new(vec![0.0], 0), 8);
        for id in 1..8 {
            cluster.push_point(Point::new(vec![id as f32], id));
        }
        root.push_child(cluster);

        let scheme = scheme(2, 0.0, ReclusteringPolicy::Absolute);
        let mut rng = StdRng::seed_from_u64(7);
        recluster_clusters(&mut root, &scheme, Metric::Euclidean, &mut rng).unwrap();

        assert_eq!(root.children().len(), 4);
        assert_eq!(points_below(&root), 8);

        let mut ids = root
            .children()
            .iter()
            .flat_map(|cluster| cluster.points().iter().map(Point::id))
            .collect::<Vec<_>>();
        ids.sort_unstable();
        assert_eq!(ids, (0..8).collect::<Vec<_>>());
    }

    #[test]
    fn growth_wraps_the_old_root_and_restores_fanout() {
        // A root with four clusters under an absolute scheme with hi = 2:
        // one more insert must grow the index by one level.
        let descriptors = [[0.0_f32, 0.0], [10.0, 10.0], [20.0, 20.0], [30.0, 30.0]];
        let mut root = Node::new(Point::new(descriptors[0].to_vec(), 0));
        for (id, descriptor) in descriptors.iter().enumerate() {
            root.push_child(Node::cluster(Point::new(descriptor.to_vec(), id as u64), 3));
        }

        let mut index = Index {
            levels: 1,
            size: 4,
            root,
            scheme: scheme(2, 0.0, ReclusteringPolicy::Absolute),
            metric: Metric::Euclidean,
            dimensionality: 2,
            rng: StdRng::seed_from_u64(3),
        };

        index.insert(&[30.0, 31.0]).unwrap();

        assert_eq!(index.len(), 5);
        assert_eq!(index.levels(), 2);
        assert_eq!(index.root().height(), 2);
        assert!(index.root().children().len() <= 3);
    }
}
