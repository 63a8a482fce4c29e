//! A descriptor paired with its stable identifier.

use serde::{Deserialize, Serialize};

/// A point stored in the index: an owned feature descriptor and the stable
/// id of that descriptor within the collection.
///
/// Ids are assigned in insertion order: the position within the build-time
/// dataset, then monotonically from the index size for later insertions.
/// Points are value-semantic; cloning deep-copies the descriptor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// The feature descriptor. Always of the index's fixed dimensionality.
    descriptor: Vec<f32>,
    /// Position of the descriptor in insertion order.
    id: u64,
}

impl Point {
    /// Creates a new `Point` from an owned descriptor and its id.
    #[must_use]
    pub fn new(descriptor: Vec<f32>, id: u64) -> Self {
        Self { descriptor, id }
    }

    /// The feature descriptor.
    #[must_use]
    pub fn descriptor(&self) -> &[f32] {
        &self.descriptor
    }

    /// The stable id of the descriptor within the collection.
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }
}
