//! Nodes of the cluster-pruning tree.

use serde::{Deserialize, Serialize};

use crate::Point;

/// A node in the index tree.
///
/// Every node stores its *leader* as the first element of `points`. Internal
/// nodes hold exactly that one point (a clone of a descriptor from the level
/// below) and route by leader distance; a node with no children is a cluster
/// and may hold many points.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Child nodes; empty at the cluster level.
    children: Vec<Node>,
    /// Points held by this node. The first element is always the leader.
    points: Vec<Point>,
}

impl Node {
    /// Creates a node holding only its leader.
    pub(crate) fn new(leader: Point) -> Self {
        Self { children: Vec::new(), points: vec![leader] }
    }

    /// Creates a cluster node with room reserved for `capacity` points.
    pub(crate) fn cluster(leader: Point, capacity: usize) -> Self {
        let mut points = Vec::with_capacity(capacity);
        points.push(leader);
        Self { children: Vec::new(), points }
    }

    /// The representative point of this node.
    #[must_use]
    pub fn leader(&self) -> &Point {
        self.points
            .first()
            .unwrap_or_else(|| unreachable!("every reachable node holds its leader"))
    }

    /// The child nodes of this node.
    #[must_use]
    pub fn children(&self) -> &[Self] {
        &self.children
    }

    /// The points held by this node; the first is the leader.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Whether this node is a cluster, i.e. has no children.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// The number of edges from this node down to its deepest descendant.
    #[must_use]
    pub fn height(&self) -> usize {
        self.children.iter().map(|child| 1 + child.height()).max().unwrap_or(0)
    }

    /// Appends a point to this node.
    pub(crate) fn push_point(&mut self, point: Point) {
        self.points.push(point);
    }

    /// Appends a child node.
    pub(crate) fn push_child(&mut self, child: Self) {
        self.children.push(child);
    }

    /// Mutable access to the child vector.
    pub(crate) fn children_mut(&mut self) -> &mut Vec<Self> {
        &mut self.children
    }

    /// Removes and returns the child vector, leaving this node childless.
    pub(crate) fn take_children(&mut self) -> Vec<Self> {
        std::mem::take(&mut self.children)
    }

    /// Replaces the child vector wholesale. Used by the reclustering
    /// routines to swap a freshly built level in atomically.
    pub(crate) fn set_children(&mut self, children: Vec<Self>) {
        self.children = children;
    }

    /// Consumes the node and returns its points.
    pub(crate) fn into_points(self) -> Vec<Point> {
        self.points
    }
}
