//! Shared helpers for the integration tests.
#![allow(dead_code)]

use ecp::{BuildParams, Index, Metric, Node};

/// Seeded random tabular data in `[-1, 1]`.
pub fn tabular(car: usize, dim: usize, seed: u64) -> Vec<Vec<f32>> {
    symagen::random_data::random_tabular_seedable(car, dim, -1.0, 1.0, seed)
}

/// Seeded random tabular data truncated to whole numbers, so every distance
/// computation is exact and comparisons across metrics are bitwise stable.
pub fn integer_tabular(car: usize, dim: usize, seed: u64) -> Vec<Vec<f32>> {
    symagen::random_data::random_tabular_seedable(car, dim, -100.0_f32, 100.0, seed)
        .into_iter()
        .map(|row| row.into_iter().map(f32::trunc).collect())
        .collect()
}

/// The 12-descriptor dataset used throughout the depth and search tests.
pub fn twelve_descriptors() -> Vec<Vec<f32>> {
    vec![
        vec![1.0, 2.0, 3.0],
        vec![4.0, 5.0, 6.0],
        vec![7.0, 8.0, 9.0],
        vec![10.0, 11.0, 12.0],
        vec![10.0, 11.0, 12.0],
        vec![10.0, 11.0, 12.0],
        vec![2.0, 2.0, 3.0],
        vec![2.0, 5.0, 6.0],
        vec![2.0, 8.0, 9.0],
        vec![2.0, 11.0, 12.0],
        vec![2.0, 11.0, 12.0],
        vec![2.0, 11.0, 12.0],
    ]
}

/// Builds the 12-descriptor index with `sc = 2`, `span = 0.3`.
pub fn twelve_descriptor_index(seed: u64) -> Index {
    let params = BuildParams::new(2).with_span(0.3);
    Index::new(twelve_descriptors(), Metric::Euclidean, &params, Some(seed)).unwrap()
}

/// The number of clusters (leaves) in the subtree of `node`.
pub fn cluster_count(node: &Node) -> usize {
    if node.is_leaf() {
        1
    } else {
        node.children().iter().map(cluster_count).sum()
    }
}

/// The total number of points stored in the clusters of the subtree.
pub fn stored_points(node: &Node) -> usize {
    if node.is_leaf() {
        node.points().len()
    } else {
        node.children().iter().map(stored_points).sum()
    }
}

/// All ids stored in the clusters of the subtree, in traversal order.
pub fn stored_ids(node: &Node) -> Vec<u64> {
    if node.is_leaf() {
        node.points().iter().map(ecp::Point::id).collect()
    } else {
        node.children().iter().flat_map(|child| stored_ids(child)).collect()
    }
}

/// Walks from the root toward `query`, always taking the child with the
/// nearest leader, and returns the number of steps to reach a cluster.
pub fn descent_steps(index: &Index, query: &[f32]) -> usize {
    let metric = index.metric();
    let mut nodes = index.root().children();
    let mut steps = 0;
    loop {
        let nearest = nodes
            .iter()
            .min_by(|a, b| {
                metric
                    .one_to_one(query, a.leader().descriptor())
                    .total_cmp(&metric.one_to_one(query, b.leader().descriptor()))
            })
            .unwrap();
        steps += 1;
        if nearest.is_leaf() {
            return steps;
        }
        nodes = nearest.children();
    }
}

/// A linear-scan k-nearest-neighbors oracle over the raw dataset.
pub fn linear_knn(dataset: &[Vec<f32>], metric: Metric, query: &[f32], k: usize) -> Vec<(u64, f32)> {
    let mut hits = dataset
        .iter()
        .enumerate()
        .map(|(id, descriptor)| (id as u64, metric.one_to_one(query, descriptor)))
        .collect::<Vec<_>>();
    hits.sort_by(|(a_id, a_d), (b_id, b_d)| a_d.total_cmp(b_d).then(a_id.cmp(b_id)));
    hits.truncate(k);
    hits
}
