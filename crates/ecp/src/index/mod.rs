//! The index: construction entry points, maintenance, and search.

mod build;
mod maintenance;
mod search;

use rand::{rngs::StdRng, SeedableRng};
use rayon::prelude::*;

use crate::{BuildParams, Error, Metric, Node, Point, ReclusteringScheme, Result};

/// An extended Cluster Pruning index over fixed-dimension `f32` descriptors.
///
/// The index owns a tree of [`Node`]s under a synthetic root: the root's
/// children form level 1, and the deepest level holds the clusters with the
/// indexed points. The metric, the dimensionality, and the random generator
/// driving leader selection are all bound to the index value, so indices
/// with different metrics or dimensionalities can coexist.
///
/// Operations on one index must not overlap; read-only searches may be
/// issued from several threads at once (see
/// [`par_batch_search`](Self::par_batch_search)). Dropping the index
/// releases the whole tree; individual points cannot be removed.
#[derive(Debug)]
pub struct Index {
    /// Number of levels beneath the root; level `levels` is the cluster
    /// level.
    levels: usize,
    /// Number of descriptors stored in the index. New points take this as
    /// their id.
    size: usize,
    /// The root node; its children are level 1.
    root: Node,
    /// Size bounds and policies for dynamic maintenance.
    scheme: ReclusteringScheme,
    /// The distance metric fixed at creation.
    metric: Metric,
    /// The descriptor dimensionality fixed at creation.
    dimensionality: usize,
    /// Generator behind every random leader selection; seeding it makes the
    /// whole index lifecycle deterministic.
    rng: StdRng,
}

impl Index {
    /// Builds an index from a dataset of descriptors.
    ///
    /// The dimensionality is fixed by the first descriptor. When the
    /// parameters ask for a partial bulk load, the prefix is bulk-built and
    /// the remaining descriptors are inserted one at a time in input order;
    /// either way each descriptor's id is its position in `dataset`.
    ///
    /// Passing a `seed` makes construction and all later maintenance
    /// deterministic.
    ///
    /// # Errors
    ///
    /// * [`Error::InvalidInput`] if the dataset is empty, the first
    ///   descriptor has zero length, or a parameter is out of range.
    /// * [`Error::DimensionMismatch`] if the descriptors are ragged.
    pub fn new(dataset: Vec<Vec<f32>>, metric: Metric, params: &BuildParams, seed: Option<u64>) -> Result<Self> {
        params.validate()?;
        let scheme = ReclusteringScheme::derive(params)?;

        let dimensionality = match dataset.first() {
            None => return Err(Error::invalid_input("cannot build an index from an empty dataset")),
            Some(first) if first.is_empty() => {
                return Err(Error::invalid_input("descriptor dimensionality must be positive"))
            }
            Some(first) => first.len(),
        };
        for descriptor in &dataset {
            if descriptor.len() != dimensionality {
                return Err(Error::DimensionMismatch {
                    expected: dimensionality,
                    actual: descriptor.len(),
                });
            }
        }

        let mut rng = seed.map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);

        let mut bulk = dataset;
        let tail = bulk.split_off(bulk_count(bulk.len(), params.bulk_fraction()));

        let size = bulk.len();
        let (root, levels) = build::bulk_build(bulk, &scheme, metric, &mut rng)?;
        let mut index = Self { levels, size, root, scheme, metric, dimensionality, rng };

        for descriptor in tail {
            index.insert_owned(descriptor)?;
        }

        Ok(index)
    }

    /// Builds the minimal index: one level, one cluster, one point.
    ///
    /// This is the seed of a fully incremental load; every further
    /// descriptor goes through [`insert`](Self::insert).
    ///
    /// # Errors
    ///
    /// As [`Index::new`] for a one-descriptor dataset.
    pub fn new_minimal(descriptor: Vec<f32>, metric: Metric, params: &BuildParams, seed: Option<u64>) -> Result<Self> {
        Self::new(vec![descriptor], metric, params, seed)
    }

    /// Inserts a descriptor, assigning it the next id, and reshapes the tree
    /// if a size policy fires.
    ///
    /// The insertion descends to the nearest cluster and appends there;
    /// reclustering checks then run from that cluster's parent upward, and
    /// the index grows a level when the root itself overflows. The reshaping
    /// completes before this returns, so subsequent searches observe it.
    ///
    /// # Errors
    ///
    /// * [`Error::DimensionMismatch`] if the descriptor has the wrong
    ///   length; the index is unchanged.
    /// * [`Error::EmptyIndex`] if the index has no live root.
    pub fn insert(&mut self, descriptor: &[f32]) -> Result<()> {
        if descriptor.len() != self.dimensionality {
            return Err(Error::DimensionMismatch {
                expected: self.dimensionality,
                actual: descriptor.len(),
            });
        }
        self.insert_owned(descriptor.to_vec())
    }

    /// [`insert`](Self::insert) without the copy, for descriptors we already
    /// own.
    fn insert_owned(&mut self, descriptor: Vec<f32>) -> Result<()> {
        if self.root.children().is_empty() {
            return Err(Error::EmptyIndex);
        }

        let point = Point::new(descriptor, self.size as u64);
        let grew = maintenance::insert(&mut self.root, self.levels, point, &self.scheme, self.metric, &mut self.rng)?;

        self.size += 1;
        if grew {
            self.levels += 1;
        }
        Ok(())
    }

    /// Returns the ids and distances of up to `k` approximate nearest
    /// neighbors of `query`, ascending by distance.
    ///
    /// At every level only the `b` most promising branches are followed, so
    /// at most `b` clusters are scanned; recall is exact only when `b`
    /// covers every branch. Fewer than `k` results are returned only when
    /// the probed clusters hold fewer than `k` points.
    ///
    /// # Errors
    ///
    /// * [`Error::InvalidInput`] if `k` or `b` is zero.
    /// * [`Error::DimensionMismatch`] if the query has the wrong length.
    /// * [`Error::EmptyIndex`] if the index has no live root.
    pub fn search(&self, query: &[f32], k: usize, b: usize) -> Result<Vec<(u64, f32)>> {
        if k == 0 {
            return Err(Error::invalid_input("k must be at least 1"));
        }
        if b == 0 {
            return Err(Error::invalid_input("b must be at least 1"));
        }
        if query.len() != self.dimensionality {
            return Err(Error::DimensionMismatch {
                expected: self.dimensionality,
                actual: query.len(),
            });
        }
        if self.root.children().is_empty() {
            return Err(Error::EmptyIndex);
        }

        Ok(search::k_nearest(self, query, k, b))
    }

    /// Runs [`search`](Self::search) for each query in order.
    ///
    /// # Errors
    ///
    /// See [`search`](Self::search); the first failing query aborts the
    /// batch.
    pub fn batch_search(&self, queries: &[Vec<f32>], k: usize, b: usize) -> Result<Vec<Vec<(u64, f32)>>> {
        queries.iter().map(|query| self.search(query, k, b)).collect()
    }

    /// Parallel version of [`batch_search`](Self::batch_search). Searches
    /// are read-only, so fanning one index out over a thread pool is safe.
    ///
    /// # Errors
    ///
    /// See [`search`](Self::search).
    pub fn par_batch_search(&self, queries: &[Vec<f32>], k: usize, b: usize) -> Result<Vec<Vec<(u64, f32)>>> {
        queries.par_iter().map(|query| self.search(query, k, b)).collect()
    }

    /// The number of levels beneath the root.
    #[must_use]
    pub const fn levels(&self) -> usize {
        self.levels
    }

    /// The number of descriptors stored in the index.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.size
    }

    /// Whether the index is empty. A constructed index always holds at
    /// least one point.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// The distance metric fixed at creation.
    #[must_use]
    pub const fn metric(&self) -> Metric {
        self.metric
    }

    /// The descriptor dimensionality fixed at creation.
    #[must_use]
    pub const fn dimensionality(&self) -> usize {
        self.dimensionality
    }

    /// The size bounds and policies governing maintenance.
    #[must_use]
    pub const fn scheme(&self) -> &ReclusteringScheme {
        &self.scheme
    }

    /// The root node, for inspection and verification. Its children form
    /// level 1 of the index.
    #[must_use]
    pub const fn root(&self) -> &Node {
        &self.root
    }
}

/// How many descriptors of an `n`-descriptor dataset to bulk-load.
///
/// A fraction below 1 bulk-loads `floor(n * fraction)` descriptors, but
/// never fewer than one: the bulk prefix seeds the tree the incremental
/// inserts descend into, so a zero fraction degrades to a minimal index
/// plus inserts.
fn bulk_count(n: usize, fraction: f32) -> usize {
    if fraction < 1.0 {
        let count = (n as f32 * fraction).floor() as usize;
        count.max(1)
    } else {
        n
    }
}
