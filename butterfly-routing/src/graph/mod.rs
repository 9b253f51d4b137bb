//! Road graph access
//!
//! The SCC algorithms only enumerate nodes and the edges around a node, so they
//! are written against the [`Graph`] trait. [`RoadGraph`] is the in-memory
//! storage used by the pruner, the CLI and the tests.
//!
//! ## Edge keys
//!
//! A directed traversal of edge `e` is identified by its edge key:
//! `2*e` when walking in storage direction (base -> adj), `2*e + 1` otherwise.
//! Access flags are stored per edge key, so "can profile P drive edge e
//! backwards" is a single bit lookup.

mod random;
mod road_graph;

pub use random::RandomGraphConfig;
pub use road_graph::{ProfileId, RoadGraph};

/// Directed traversal of an edge, see module docs
pub type EdgeKey = u32;

#[inline]
pub fn create_edge_key(edge: u32, reverse: bool) -> EdgeKey {
    debug_assert!(edge < u32::MAX / 2, "edge id {} too large for an edge key", edge);
    (edge << 1) | reverse as u32
}

#[inline]
pub fn edge_from_key(edge_key: EdgeKey) -> u32 {
    edge_key >> 1
}

#[inline]
pub fn is_reverse_key(edge_key: EdgeKey) -> bool {
    edge_key & 1 == 1
}

/// The key of the same edge walked the other way round
#[inline]
pub fn reverse_edge_key(edge_key: EdgeKey) -> EdgeKey {
    edge_key ^ 1
}

/// One step of an edge cursor positioned at `base`
///
/// `reverse` is true when the cursor walks the edge against its storage
/// orientation, i.e. `base` is the stored adjacent node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeState {
    pub edge: u32,
    pub base: u32,
    pub adj: u32,
    pub reverse: bool,
}

impl EdgeState {
    #[inline]
    pub fn edge_key(&self) -> EdgeKey {
        create_edge_key(self.edge, self.reverse)
    }

    #[inline]
    pub fn is_loop(&self) -> bool {
        self.base == self.adj
    }

    /// Same edge, seen from the other end
    #[inline]
    pub fn reversed(&self) -> EdgeState {
        EdgeState {
            edge: self.edge,
            base: self.adj,
            adj: self.base,
            reverse: !self.reverse,
        }
    }
}

/// Read access to a directed multigraph with dense node and edge ids
pub trait Graph {
    fn node_count(&self) -> usize;

    fn edge_count(&self) -> usize;

    /// The edge in storage orientation
    fn edge_state(&self, edge: u32) -> EdgeState;

    /// All edges touching `node`, each with `base == node`.
    ///
    /// Self-loops are yielded once, in storage orientation.
    fn edges_of(&self, node: u32) -> impl Iterator<Item = EdgeState> + '_;
}
