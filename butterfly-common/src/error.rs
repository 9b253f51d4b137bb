//! Error types for the butterfly-osm toolkit
//!
//! Library crates return [`Result`]; binaries wrap it with `anyhow` context.
//! Broken internal invariants (e.g. a corrupted DFS stack) are not represented
//! here: they panic at the point of detection.

use thiserror::Error;

/// Main error type for butterfly-osm operations
#[derive(Debug, Error)]
pub enum Error {
    /// Subnetwork removal disabled more than half of all edges. Almost always a
    /// misconfigured access profile or threshold rather than real map sparsity.
    #[error(
        "too many edges were removed: {removed} out of {total} (the maximum number of removed edges is {allowed})"
    )]
    TooManyEdgesRemoved {
        removed: usize,
        total: usize,
        allowed: usize,
    },

    /// Subnetwork tags are stored in one byte and must be in `0..=127`
    #[error("invalid subnetwork {value} for node {node}: must be in 0..=127")]
    InvalidSubnetwork { node: u32, value: u32 },

    /// Node id outside of `0..nodes`
    #[error("node {node} out of range (graph has {nodes} nodes)")]
    NodeOutOfRange { node: u32, nodes: usize },

    /// Vehicle profile not registered on the graph
    #[error("unknown profile '{0}'")]
    UnknownProfile(String),

    /// Malformed file or input data
    #[error("invalid format: {0}")]
    InvalidFormat(String),

    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type for butterfly-osm operations
pub type Result<T> = std::result::Result<T, Error>;
