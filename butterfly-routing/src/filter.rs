//! Edge and transition predicates
//!
//! Filters must be pure: the SCC searches may ask about the same edge many
//! times and assume the answer never changes during one computation.

use crate::graph::{edge_from_key, EdgeKey, EdgeState, ProfileId, RoadGraph};
use crate::turn_cost::TurnCostProvider;

/// Decides whether an edge may be traversed in the cursor direction
pub trait EdgeFilter {
    fn accept(&self, edge: &EdgeState) -> bool;
}

impl<F> EdgeFilter for F
where
    F: Fn(&EdgeState) -> bool,
{
    fn accept(&self, edge: &EdgeState) -> bool {
        self(edge)
    }
}

/// Accepts everything
#[derive(Debug, Clone, Copy, Default)]
pub struct AllEdges;

impl EdgeFilter for AllEdges {
    fn accept(&self, _edge: &EdgeState) -> bool {
        true
    }
}

/// Access check for one profile of a [`RoadGraph`]
#[derive(Debug, Clone, Copy)]
pub struct AccessFilter<'a> {
    graph: &'a RoadGraph,
    profile: ProfileId,
    bidirectional: bool,
}

impl<'a> AccessFilter<'a> {
    /// Accepts an edge if the profile may drive it in the cursor direction.
    /// Self-loops are accepted if either direction is open.
    pub fn outgoing(graph: &'a RoadGraph, profile: ProfileId) -> Self {
        Self {
            graph,
            profile,
            bidirectional: false,
        }
    }

    /// Accepts an edge if either direction is open, which turns the directed
    /// graph into its undirected shadow
    pub fn bidirectional(graph: &'a RoadGraph, profile: ProfileId) -> Self {
        Self {
            graph,
            profile,
            bidirectional: true,
        }
    }
}

impl EdgeFilter for AccessFilter<'_> {
    fn accept(&self, edge: &EdgeState) -> bool {
        if self.bidirectional || edge.is_loop() {
            self.graph.is_accessible(self.profile, edge.edge)
        } else {
            self.graph.access(self.profile, edge.edge_key())
        }
    }
}

/// Decides whether the search may continue from the edge behind `prev` onto
/// `edge`. `prev == None` asks whether a search may start on `edge`.
pub trait EdgeTransitionFilter {
    fn accept(&self, prev: Option<EdgeKey>, edge: &EdgeState) -> bool;
}

impl<F> EdgeTransitionFilter for F
where
    F: Fn(Option<EdgeKey>, &EdgeState) -> bool,
{
    fn accept(&self, prev: Option<EdgeKey>, edge: &EdgeState) -> bool {
        self(prev, edge)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AllTransitions;

impl EdgeTransitionFilter for AllTransitions {
    fn accept(&self, _prev: Option<EdgeKey>, _edge: &EdgeState) -> bool {
        true
    }
}

/// Rejects turns with infinite cost
#[derive(Debug, Clone, Copy)]
pub struct TurnCostFilter<T> {
    turn_costs: T,
}

impl<T: TurnCostProvider> TurnCostFilter<T> {
    pub fn new(turn_costs: T) -> Self {
        Self { turn_costs }
    }
}

impl<T: TurnCostProvider> EdgeTransitionFilter for TurnCostFilter<T> {
    fn accept(&self, prev: Option<EdgeKey>, edge: &EdgeState) -> bool {
        match prev {
            None => true,
            Some(key) => self
                .turn_costs
                .turn_cost(edge_from_key(key), edge.base, edge.edge)
                .is_finite(),
        }
    }
}
