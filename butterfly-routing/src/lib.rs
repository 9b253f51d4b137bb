//! Routing graph processing for butterfly-osm
//!
//! - [`graph`]: the [`Graph`] abstraction over nodes, edges and edge keys, and
//!   [`RoadGraph`], an in-memory graph with per-profile access flags
//! - [`subnetwork`]: Tarjan SCC over nodes and over edge keys, subnetwork
//!   pruning and per-node subnetwork tags
//! - [`filter`] / [`turn_cost`]: predicates that restrict the traversal

pub mod filter;
pub mod graph;
pub mod subnetwork;
pub mod turn_cost;

pub use filter::{AccessFilter, AllEdges, AllTransitions, EdgeFilter, EdgeTransitionFilter, TurnCostFilter};
pub use graph::{EdgeKey, EdgeState, Graph, ProfileId, RandomGraphConfig, RoadGraph};
pub use subnetwork::{
    subnetwork_tags, ConnectedComponents, EdgeKeyTarjanScc, NodeTarjanScc, PrepareJob,
    PrepareSubnetworks, ProfileReport, PruneConfig, PruneReport, SubnetworkStorage, TraversalMode,
};
pub use turn_cost::{TurnCostProvider, TurnCostTable};
