//! Reclustering policies and the caller-facing build parameters.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// When dynamic maintenance should recluster a level.
///
/// With `Average`, a reclustering fires only when the level below a parent
/// has drifted past its bound as a whole; a single hot node does not trigger
/// a sweep. With `Absolute`, any single node reaching the high mark fires.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReclusteringPolicy {
    /// Recluster when the total under the parent exceeds
    /// `fanout * hi_mark`.
    Average,
    /// Recluster when one node's own size reaches the high mark.
    Absolute,
}

impl ReclusteringPolicy {
    /// Resolves a numeric policy code from the external boundary.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidInput`] if the code is not 1 (average) or 2
    /// (absolute).
    pub fn from_code(code: u32) -> Result<Self> {
        match code {
            1 => Ok(Self::Average),
            2 => Ok(Self::Absolute),
            _ => Err(Error::invalid_input(format!("unknown reclustering policy code {code}"))),
        }
    }

    /// The numeric code of this policy at the external boundary.
    #[must_use]
    pub const fn code(self) -> u32 {
        match self {
            Self::Average => 1,
            Self::Absolute => 2,
        }
    }
}

/// The size bounds and policies that govern dynamic maintenance.
///
/// `lo_mark` is the target fanout/cluster size the index was built with;
/// `hi_mark` is the size tolerated before a reclustering fires. Both are
/// derived from the desired cluster size `sc` and the fractional slack
/// `span`: `lo = ceil(sc * (1 - span))` and `hi = ceil(sc * (1 + span))`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReclusteringScheme {
    /// Lower size boundary of nodes and clusters; the build target.
    lo_mark: usize,
    /// Higher size boundary of nodes and clusters.
    hi_mark: usize,
    /// Policy applied to clusters.
    cluster_policy: ReclusteringPolicy,
    /// Policy applied to internal nodes.
    node_policy: ReclusteringPolicy,
}

impl ReclusteringScheme {
    /// Derives the scheme from validated build parameters.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidInput`] if the derived lower mark is not at least 1.
    pub(crate) fn derive(params: &BuildParams) -> Result<Self> {
        let sc = params.cluster_size as f32;
        let lo_mark = (sc * (1.0 - params.span)).ceil() as usize;
        let hi_mark = (sc * (1.0 + params.span)).ceil() as usize;
        if lo_mark < 1 {
            return Err(Error::invalid_input("derived lower mark must be at least 1"));
        }
        Ok(Self {
            lo_mark,
            hi_mark,
            cluster_policy: params.cluster_policy,
            node_policy: params.node_policy,
        })
    }

    /// The target fanout/cluster size.
    #[must_use]
    pub const fn lo_mark(&self) -> usize {
        self.lo_mark
    }

    /// The size tolerated before a reclustering fires.
    #[must_use]
    pub const fn hi_mark(&self) -> usize {
        self.hi_mark
    }

    /// The policy applied to clusters.
    #[must_use]
    pub const fn cluster_policy(&self) -> ReclusteringPolicy {
        self.cluster_policy
    }

    /// The policy applied to internal nodes.
    #[must_use]
    pub const fn node_policy(&self) -> ReclusteringPolicy {
        self.node_policy
    }
}

/// Configuration for building an index.
///
/// Only the desired cluster size is required; the remaining knobs default to
/// `span = 0`, an average cluster policy, an absolute node policy, and a
/// full bulk load.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BuildParams {
    /// Desired cluster size `sc`; also the internal fanout target.
    cluster_size: u32,
    /// Fractional slack in `[0, 1)` used to derive the lo/hi marks.
    span: f32,
    /// Reclustering policy for clusters.
    cluster_policy: ReclusteringPolicy,
    /// Reclustering policy for internal nodes.
    node_policy: ReclusteringPolicy,
    /// Fraction of the dataset to bulk-load; the remainder is inserted
    /// incrementally in input order.
    bulk_fraction: f32,
}

impl BuildParams {
    /// Creates build parameters with the given cluster size and the default
    /// slack, policies, and bulk fraction.
    #[must_use]
    pub const fn new(cluster_size: u32) -> Self {
        Self {
            cluster_size,
            span: 0.0,
            cluster_policy: ReclusteringPolicy::Average,
            node_policy: ReclusteringPolicy::Absolute,
            bulk_fraction: 1.0,
        }
    }

    /// Sets the fractional slack used to derive the lo/hi marks.
    #[must_use]
    pub const fn with_span(mut self, span: f32) -> Self {
        self.span = span;
        self
    }

    /// Sets the reclustering policy for clusters.
    #[must_use]
    pub const fn with_cluster_policy(mut self, policy: ReclusteringPolicy) -> Self {
        self.cluster_policy = policy;
        self
    }

    /// Sets the reclustering policy for internal nodes.
    #[must_use]
    pub const fn with_node_policy(mut self, policy: ReclusteringPolicy) -> Self {
        self.node_policy = policy;
        self
    }

    /// Sets the fraction of the dataset to bulk-load; the rest is inserted
    /// incrementally.
    #[must_use]
    pub const fn with_bulk_fraction(mut self, bulk_fraction: f32) -> Self {
        self.bulk_fraction = bulk_fraction;
        self
    }

    /// The desired cluster size.
    #[must_use]
    pub const fn cluster_size(&self) -> u32 {
        self.cluster_size
    }

    /// The fractional slack.
    #[must_use]
    pub const fn span(&self) -> f32 {
        self.span
    }

    /// The fraction of the dataset to bulk-load.
    #[must_use]
    pub const fn bulk_fraction(&self) -> f32 {
        self.bulk_fraction
    }

    /// Checks that every parameter is within its valid range.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidInput`] for `cluster_size = 0`, `span` outside
    /// `[0, 1)`, or `bulk_fraction` outside `[0, 1]`.
    pub(crate) fn validate(&self) -> Result<()> {
        if self.cluster_size < 1 {
            return Err(Error::invalid_input("cluster size must be at least 1"));
        }
        if !(0.0..1.0).contains(&self.span) {
            return Err(Error::invalid_input(format!("span must be in [0, 1), got {}", self.span)));
        }
        if !(0.0..=1.0).contains(&self.bulk_fraction) {
            return Err(Error::invalid_input(format!(
                "bulk fraction must be in [0, 1], got {}",
                self.bulk_fraction
            )));
        }
        Ok(())
    }
}
