//! Subnetwork preprocessing tool for butterfly-osm road graphs

pub mod cli;
pub mod config;
pub mod graph_file;

pub use config::ToolConfig;
pub use graph_file::GraphFile;
