//! JSON road graph files
//!
//! ```json
//! {
//!   "nodes": 3,
//!   "profiles": ["car"],
//!   "edges": [{ "base": 0, "adj": 1, "access": { "car": [true, false] } }],
//!   "turn_costs": [{ "profile": "car", "from": 0, "via": 1, "to": 1, "cost": null }],
//!   "removed_nodes": []
//! }
//! ```
//!
//! `access` maps a profile to `[forward, backward]`; missing profiles are
//! closed. A turn cost of `null` forbids the turn.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use anyhow::{bail, Context, Result};
use butterfly_routing::graph::{create_edge_key, Graph};
use butterfly_routing::RoadGraph;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphFile {
    pub nodes: usize,
    pub profiles: Vec<String>,
    pub edges: Vec<EdgeRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub turn_costs: Vec<TurnCostRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub removed_nodes: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub base: u32,
    pub adj: u32,
    #[serde(default)]
    pub access: BTreeMap<String, [bool; 2]>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnCostRecord {
    pub profile: String,
    pub from: u32,
    pub via: u32,
    pub to: u32,
    /// `None` for a forbidden turn
    pub cost: Option<f64>,
}

impl GraphFile {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
        serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to parse graph file {}", path.display()))
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let file =
            File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, self)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }

    /// Build the in-memory graph, checking every id
    pub fn to_graph(&self) -> Result<RoadGraph> {
        let mut graph = RoadGraph::new(self.nodes);
        for name in &self.profiles {
            graph.add_profile(name);
        }

        for (idx, record) in self.edges.iter().enumerate() {
            graph
                .check_node(record.base)
                .and_then(|_| graph.check_node(record.adj))
                .with_context(|| format!("edge {}", idx))?;
            let edge = graph.add_edge(record.base, record.adj);
            for (name, [forward, backward]) in &record.access {
                let profile = graph.profile(name).with_context(|| format!("edge {}", idx))?;
                graph.set_access(profile, edge, *forward, *backward);
            }
        }

        for record in &self.turn_costs {
            let profile = graph.profile(&record.profile)?;
            if record.from as usize >= self.edges.len() || record.to as usize >= self.edges.len() {
                bail!(
                    "turn cost {} -> {} at node {} refers to a missing edge",
                    record.from,
                    record.to,
                    record.via
                );
            }
            graph.check_node(record.via)?;
            let cost = record.cost.unwrap_or(f64::INFINITY);
            graph
                .turn_costs_mut(profile)
                .set(record.from, record.via, record.to, cost);
        }

        for &node in &self.removed_nodes {
            graph.check_node(node)?;
            graph.mark_node_removed(node);
        }
        Ok(graph)
    }

    pub fn from_graph(graph: &RoadGraph) -> Self {
        let profiles: Vec<_> = graph.profiles().collect();
        let edges = (0..graph.edge_count() as u32)
            .map(|edge| {
                let (base, adj) = graph.endpoints(edge);
                let access = profiles
                    .iter()
                    .filter(|(profile, _)| graph.is_accessible(*profile, edge))
                    .map(|&(profile, name)| {
                        let forward = graph.access(profile, create_edge_key(edge, false));
                        let backward = graph.access(profile, create_edge_key(edge, true));
                        (name.to_string(), [forward, backward])
                    })
                    .collect();
                EdgeRecord { base, adj, access }
            })
            .collect();

        let mut turn_costs = Vec::new();
        for &(profile, name) in &profiles {
            let mut entries: Vec<_> = graph.turn_costs(profile).iter().collect();
            entries.sort_by_key(|&(turn, _)| turn);
            turn_costs.extend(entries.into_iter().map(|((from, via, to), cost)| TurnCostRecord {
                profile: name.to_string(),
                from,
                via,
                to,
                cost: cost.is_finite().then_some(cost),
            }));
        }

        GraphFile {
            nodes: graph.node_count(),
            profiles: profiles.iter().map(|(_, name)| name.to_string()).collect(),
            edges,
            turn_costs,
            removed_nodes: (0..graph.node_count() as u32)
                .filter(|&node| graph.is_node_removed(node))
                .collect(),
        }
    }
}
