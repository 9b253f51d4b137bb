//! Random road graphs for randomized testing and benchmarking

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{Graph, ProfileId, RoadGraph};

/// Parameters for [`RoadGraph::random`]
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RandomGraphConfig {
    pub nodes: usize,
    /// Target mean degree, edges = 0.5 * mean_degree * nodes
    pub mean_degree: f64,
    pub allow_loops: bool,
    /// Probability that an edge is open in both directions
    pub p_both_directions: f64,
    /// Probability that an edge is closed in both directions
    pub p_blocked: f64,
}

impl Default for RandomGraphConfig {
    fn default() -> Self {
        Self {
            nodes: 500,
            mean_degree: 2.0,
            allow_loops: true,
            p_both_directions: 0.7,
            p_blocked: 0.0,
        }
    }
}

impl RoadGraph {
    /// Random graph with a single profile named `profile`.
    ///
    /// Non-blocked edges are always open forward; the backward direction is
    /// opened with probability `p_both_directions`.
    pub fn random<R: Rng>(rng: &mut R, profile: &str, config: &RandomGraphConfig) -> RoadGraph {
        let mut graph = RoadGraph::new(config.nodes);
        let id = graph.add_profile(profile);
        if config.nodes < 2 {
            return graph;
        }

        let total_edges = (0.5 * config.mean_degree * config.nodes as f64) as usize;
        let mut added = 0;
        while added < total_edges {
            let from = rng.random_range(0..config.nodes) as u32;
            let to = rng.random_range(0..config.nodes) as u32;
            if !config.allow_loops && from == to {
                continue;
            }
            let edge = graph.add_edge(from, to);
            if !rng.random_bool(config.p_blocked) {
                let both = rng.random_bool(config.p_both_directions);
                graph.set_access(id, edge, true, both);
            }
            added += 1;
        }
        graph
    }

    /// Put random turn restrictions on a share of the junctions.
    ///
    /// At roughly 30% of the nodes, each pair of distinct accessible in/out
    /// edges is forbidden with probability `p_restriction`. U-turns are left
    /// alone. Returns the number of restrictions added.
    pub fn add_random_turn_restrictions<R: Rng>(
        &mut self,
        rng: &mut R,
        profile: ProfileId,
        p_restriction: f64,
    ) -> usize {
        let mut added = 0;
        for node in 0..self.node_count() as u32 {
            if !rng.random_bool(0.3) {
                continue;
            }
            let incoming: Vec<u32> = self
                .edges_of(node)
                .filter(|state| {
                    self.access(profile, state.reversed().edge_key())
                        || (state.is_loop() && self.is_accessible(profile, state.edge))
                })
                .map(|state| state.edge)
                .collect();
            let outgoing: Vec<u32> = self
                .edges_of(node)
                .filter(|state| {
                    self.access(profile, state.edge_key())
                        || (state.is_loop() && self.is_accessible(profile, state.edge))
                })
                .map(|state| state.edge)
                .collect();
            for &in_edge in &incoming {
                for &out_edge in &outgoing {
                    if in_edge != out_edge && rng.random_bool(p_restriction) {
                        self.turn_costs_mut(profile).forbid(in_edge, node, out_edge);
                        added += 1;
                    }
                }
            }
        }
        added
    }
}
