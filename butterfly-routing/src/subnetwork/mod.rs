//! Strongly connected components and subnetwork removal

mod components;
mod dfs_stack;
mod edge_tarjan;
mod prepare;
mod storage;
mod tarjan;

pub use components::ConnectedComponents;
pub use edge_tarjan::EdgeKeyTarjanScc;
pub use prepare::{
    mark_nodes_removed_if_unreachable, subnetwork_tags, PrepareJob, PrepareSubnetworks,
    ProfileReport, PruneConfig, PruneReport, TraversalMode,
};
pub use storage::SubnetworkStorage;
pub use tarjan::NodeTarjanScc;
