//! Extended Cluster Pruning (eCP) for approximate nearest neighbor search.
//!
//! An eCP index organizes a collection of fixed-dimension `f32` descriptors
//! into a shallow hierarchy of representative descriptors ("leaders").
//! Queries descend the hierarchy through the `b` most promising branches and
//! scan only the clusters those branches reach, trading recall for speed.
//! The index also supports incremental insertion: size policies trigger
//! bottom-up reclustering (and, eventually, growth of a new root level) so
//! the tree stays shaped close to the parameters it was built with as the
//! collection grows.
//!
//! # Example
//!
//! ```
//! use ecp::{BuildParams, Index, Metric};
//!
//! let dataset = vec![
//!     vec![0.0, 0.0],
//!     vec![1.0, 1.0],
//!     vec![2.0, 2.0],
//!     vec![3.0, 3.0],
//! ];
//! let params = BuildParams::new(2).with_span(0.3);
//! let mut index = Index::new(dataset, Metric::Euclidean, &params, Some(42))?;
//!
//! index.insert(&[0.5, 0.5])?;
//!
//! // With b covering both clusters the search is exact.
//! let hits = index.search(&[0.1, 0.1], 2, 2)?;
//! assert_eq!(hits.len(), 2);
//! assert_eq!(hits[0].0, 0);
//! assert_eq!(hits[1].0, 4);
//! # Ok::<(), ecp::Error>(())
//! ```

mod error;
mod index;
mod metric;
mod node;
mod point;
mod scheme;
mod traversal;
mod utils;

pub use error::{Error, Result};
pub use index::Index;
pub use metric::Metric;
pub use node::Node;
pub use point::Point;
pub use scheme::{BuildParams, ReclusteringPolicy, ReclusteringScheme};
