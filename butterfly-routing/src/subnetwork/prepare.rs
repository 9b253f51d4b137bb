//! Subnetwork removal
//!
//! Small islands in the road graph (mapping errors, barriers, one-way
//! misconfigurations) make route queries fail far away from the cause.
//! [`PrepareSubnetworks`] finds them per vehicle profile and closes their
//! edges for that profile, keeping the biggest component and every component
//! of at least `min_network_size` nodes.
//!
//! Per job, in order:
//!
//! 1. Dead ends: components of the *directed* graph smaller than
//!    `min_oneway_network_size` are closed, single nodes included. They can
//!    be entered from the main network but never left (or the other way
//!    round). Edge-based jobs run this pass over edge keys with turn
//!    restrictions applied, with a threshold of `2 * min_oneway_network_size`.
//! 2. Main pass. Node-based jobs partition the nodes with both directions of
//!    every open edge counted, so this is plain connectivity. Edge-based jobs
//!    partition the edge keys with turn restrictions applied and use a
//!    threshold of `2 * min_network_size` keys.
//!
//! Finally nodes without an open edge for any job are marked removed.

use std::fmt;
use std::time::Instant;

use butterfly_common::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::components::ConnectedComponents;
use super::edge_tarjan::EdgeKeyTarjanScc;
use super::storage::SubnetworkStorage;
use super::tarjan::NodeTarjanScc;
use crate::filter::{AccessFilter, TurnCostFilter};
use crate::graph::{EdgeKey, Graph, ProfileId, RoadGraph};

/// How a profile is routed, which decides the unit of the main pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TraversalMode {
    #[default]
    NodeBased,
    /// Routing on edge keys with the profile's turn costs
    EdgeBased,
}

impl fmt::Display for TraversalMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraversalMode::NodeBased => write!(f, "node-based"),
            TraversalMode::EdgeBased => write!(f, "edge-based"),
        }
    }
}

/// Subnetwork removal for one profile of the graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrepareJob {
    /// Profile name as registered on the [`RoadGraph`]
    pub name: String,
    pub traversal: TraversalMode,
}

impl PrepareJob {
    pub fn node_based(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            traversal: TraversalMode::NodeBased,
        }
    }

    /// Uses the turn cost table of the profile
    pub fn edge_based(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            traversal: TraversalMode::EdgeBased,
        }
    }
}

impl fmt::Display for PrepareJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}", self.name, self.traversal)
    }
}

/// Size thresholds, in nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PruneConfig {
    /// Components below this size are removed. 0 disables removal.
    pub min_network_size: usize,
    /// Directed components below this size are removed first. 0 disables
    /// the dead-end pass.
    pub min_oneway_network_size: usize,
}

impl Default for PruneConfig {
    fn default() -> Self {
        Self {
            min_network_size: 200,
            min_oneway_network_size: 0,
        }
    }
}

/// What happened to one profile
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProfileReport {
    pub name: String,
    pub traversal: TraversalMode,
    /// Dead-end components closed in the first pass
    pub removed_dead_ends: usize,
    pub removed_dead_end_edges: usize,
    /// Components found by the main pass, single units included
    pub subnetworks: usize,
    pub removed_subnetworks: usize,
    /// Edges closed by the main pass. For edge-based jobs this is half the
    /// number of closed edge keys.
    pub removed_edges: usize,
    /// Size of the biggest component in units (nodes or edge keys)
    pub biggest: usize,
    pub biggest_removed: usize,
    pub smallest_remaining: usize,
}

impl ProfileReport {
    pub fn total_removed_edges(&self) -> usize {
        self.removed_dead_end_edges + self.removed_edges
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PruneReport {
    pub profiles: Vec<ProfileReport>,
    pub removed_edges: usize,
    pub removed_nodes: usize,
    /// Removal was disabled by `min_network_size == 0`
    pub skipped: bool,
}

/// Removes small subnetworks from a [`RoadGraph`], see module docs
#[derive(Debug, Clone)]
pub struct PrepareSubnetworks {
    jobs: Vec<PrepareJob>,
    config: PruneConfig,
}

impl PrepareSubnetworks {
    pub fn new(jobs: Vec<PrepareJob>) -> Self {
        Self {
            jobs,
            config: PruneConfig::default(),
        }
    }

    pub fn with_config(mut self, config: PruneConfig) -> Self {
        self.config = config;
        self
    }

    pub fn set_min_network_size(&mut self, min_network_size: usize) -> &mut Self {
        self.config.min_network_size = min_network_size;
        self
    }

    pub fn set_min_oneway_network_size(&mut self, min_oneway_network_size: usize) -> &mut Self {
        self.config.min_oneway_network_size = min_oneway_network_size;
        self
    }

    pub fn config(&self) -> &PruneConfig {
        &self.config
    }

    pub fn jobs(&self) -> &[PrepareJob] {
        &self.jobs
    }

    /// Run every job, then mark unreachable nodes removed.
    ///
    /// Fails with [`Error::TooManyEdgesRemoved`] as soon as more than half of
    /// all edges have been closed, counted over all jobs so far. The graph is
    /// left partially pruned in that case and should be discarded.
    pub fn do_work(&self, graph: &mut RoadGraph) -> Result<PruneReport> {
        if self.config.min_network_size == 0 {
            info!("Skipping subnetwork removal: min_network_size: 0");
            return Ok(PruneReport {
                skipped: true,
                ..Default::default()
            });
        }

        let profiles = self
            .jobs
            .iter()
            .map(|job| graph.profile(&job.name))
            .collect::<Result<Vec<ProfileId>>>()?;

        let start = Instant::now();
        let jobs: Vec<String> = self.jobs.iter().map(ToString::to_string).collect();
        info!(
            "Start removing subnetworks, min_network_size: {}, min_oneway_network_size: {}",
            self.config.min_network_size, self.config.min_oneway_network_size
        );
        info!(
            "Jobs: {:?}, nodes: {}, edges: {}",
            jobs,
            graph.node_count(),
            graph.edge_count()
        );

        let total = graph.edge_count();
        let allowed = total / 2;
        let mut report = PruneReport::default();
        for (job, &profile) in self.jobs.iter().zip(&profiles) {
            info!("--- profile: '{}'", job);
            let profile_report = self.remove_small_subnetworks(graph, profile, job);
            report.removed_edges += profile_report.total_removed_edges();
            report.profiles.push(profile_report);
            if report.removed_edges > allowed {
                return Err(Error::TooManyEdgesRemoved {
                    removed: report.removed_edges,
                    total,
                    allowed,
                });
            }
        }

        report.removed_nodes = mark_nodes_removed_if_unreachable(graph, &profiles);
        info!(
            "Finished finding and removing subnetworks for {} profiles, took: {:.3}s",
            self.jobs.len(),
            start.elapsed().as_secs_f64()
        );
        Ok(report)
    }

    /// Both passes for one profile. The biggest component is always kept,
    /// even when it is smaller than the threshold.
    fn remove_small_subnetworks(
        &self,
        graph: &mut RoadGraph,
        profile: ProfileId,
        job: &PrepareJob,
    ) -> ProfileReport {
        let mut report = ProfileReport {
            name: job.name.clone(),
            traversal: job.traversal,
            ..Default::default()
        };
        match job.traversal {
            TraversalMode::NodeBased => {
                self.remove_dead_ends(graph, profile, &mut report);
                self.remove_node_based(graph, profile, &mut report);
            }
            TraversalMode::EdgeBased => {
                self.remove_dead_end_keys(graph, profile, &mut report);
                self.remove_edge_based(graph, profile, &mut report);
            }
        }
        report
    }

    /// Close every directed component below `min_oneway_network_size` nodes,
    /// single nodes included. A one-way stub ends in a single node, a one-way
    /// feeder starts in one.
    fn remove_dead_ends(&self, graph: &mut RoadGraph, profile: ProfileId, report: &mut ProfileReport) {
        let min_size = self.config.min_oneway_network_size;
        if min_size == 0 {
            return;
        }
        let start = Instant::now();
        let components = {
            let filter = AccessFilter::outgoing(graph, profile);
            NodeTarjanScc::find_components(&*graph, &filter, false)
        };
        let biggest = components.biggest_index();
        for (idx, component) in components.components().iter().enumerate() {
            if Some(idx) == biggest || component.len() >= min_size {
                continue;
            }
            report.removed_dead_end_edges += block_edges_for_component(graph, profile, component);
            report.removed_dead_ends += 1;
        }
        for node in components.single_units() {
            let removed = block_edges_for_node(graph, profile, node);
            if removed > 0 {
                report.removed_dead_end_edges += removed;
                report.removed_dead_ends += 1;
            }
        }
        log_dead_ends(report, min_size, "nodes", start);
    }

    /// Dead-end pass for edge-based jobs, over the same edge-key graph the
    /// main pass sees. Closing keys outside a component leaves that
    /// component intact, so a second run finds nothing left to close.
    fn remove_dead_end_keys(&self, graph: &mut RoadGraph, profile: ProfileId, report: &mut ProfileReport) {
        let min_size = 2 * self.config.min_oneway_network_size;
        if min_size == 0 {
            return;
        }
        let start = Instant::now();
        let components = {
            let filter = AccessFilter::outgoing(graph, profile);
            let turns = TurnCostFilter::new(graph.turn_costs(profile));
            EdgeKeyTarjanScc::find_components(&*graph, &filter, &turns, false)
        };
        let mut removed_keys = 0;
        let biggest = components.biggest_index();
        for (idx, component) in components.components().iter().enumerate() {
            if Some(idx) == biggest || component.len() >= min_size {
                continue;
            }
            for &key in component {
                removed_keys += close_edge_key(graph, profile, key);
            }
            report.removed_dead_ends += 1;
        }
        for key in components.single_units() {
            let removed = close_edge_key(graph, profile, key);
            if removed > 0 {
                removed_keys += removed;
                report.removed_dead_ends += 1;
            }
        }
        report.removed_dead_end_edges = removed_keys / 2;
        log_dead_ends(report, min_size, "edge keys", start);
    }

    fn remove_node_based(&self, graph: &mut RoadGraph, profile: ProfileId, report: &mut ProfileReport) {
        let start = Instant::now();
        let components = {
            let filter = AccessFilter::bidirectional(graph, profile);
            NodeTarjanScc::find_components(&*graph, &filter, false)
        };
        log_found(&components, "nodes");

        let min_size = self.config.min_network_size;
        report.subnetworks = components.total_components();
        report.biggest = components.biggest_component().len();
        report.smallest_remaining = report.biggest;
        let biggest = components.biggest_index();
        for (idx, component) in components.components().iter().enumerate() {
            if Some(idx) == biggest {
                continue;
            }
            if component.len() < min_size {
                report.removed_edges += block_edges_for_component(graph, profile, component);
                report.removed_subnetworks += 1;
                report.biggest_removed = report.biggest_removed.max(component.len());
            } else {
                report.smallest_remaining = report.smallest_remaining.min(component.len());
            }
        }

        for node in components.single_units() {
            report.removed_edges += block_edges_for_node(graph, profile, node);
            report.removed_subnetworks += 1;
            report.biggest_removed = report.biggest_removed.max(1);
        }
        log_removed(report, "nodes", start);
    }

    fn remove_edge_based(&self, graph: &mut RoadGraph, profile: ProfileId, report: &mut ProfileReport) {
        let start = Instant::now();
        let components = {
            let filter = AccessFilter::outgoing(graph, profile);
            let turns = TurnCostFilter::new(graph.turn_costs(profile));
            EdgeKeyTarjanScc::find_components(&*graph, &filter, &turns, false)
        };
        log_found(&components, "edge keys");

        // n edge keys are roughly n/2 edges, which span roughly n/2 nodes
        let min_size = 2 * self.config.min_network_size;
        report.subnetworks = components.total_components();
        report.biggest = components.biggest_component().len();
        report.smallest_remaining = report.biggest;
        let mut removed_keys = 0;
        let biggest = components.biggest_index();
        for (idx, component) in components.components().iter().enumerate() {
            if Some(idx) == biggest {
                continue;
            }
            if component.len() < min_size {
                for &key in component {
                    removed_keys += close_edge_key(graph, profile, key);
                }
                report.removed_subnetworks += 1;
                report.biggest_removed = report.biggest_removed.max(component.len());
            } else {
                report.smallest_remaining = report.smallest_remaining.min(component.len());
            }
        }

        for key in components.single_units() {
            removed_keys += close_edge_key(graph, profile, key);
            report.removed_subnetworks += 1;
            report.biggest_removed = report.biggest_removed.max(1);
        }
        report.removed_edges = removed_keys / 2;
        debug!("Closed {} edge keys", removed_keys);
        log_removed(report, "edge keys", start);
    }
}

fn log_found(components: &ConnectedComponents, unit: &str) {
    info!(
        "Found {} subnetworks ({} single {} and {} components with more than one, total {}: {})",
        components.total_components(),
        components.single_units().count(),
        unit,
        components.components().len(),
        unit,
        components.units()
    );
}

fn log_dead_ends(report: &ProfileReport, min_size: usize, unit: &str, start: Instant) {
    info!(
        "Removed {} one-way dead ends below {} {}, removed edges: {}",
        report.removed_dead_ends, min_size, unit, report.removed_dead_end_edges
    );
    debug!("Dead-end pass took {:.3}s", start.elapsed().as_secs_f64());
}

fn log_removed(report: &ProfileReport, unit: &str, start: Instant) {
    info!(
        "Removed {} subnetworks (biggest removed: {} {}) -> {} subnetwork(s) left (smallest: {}, biggest: {} {}), removed edges: {}, took: {:.3}s",
        report.removed_subnetworks,
        report.biggest_removed,
        unit,
        report.subnetworks - report.removed_subnetworks,
        report.smallest_remaining,
        report.biggest,
        unit,
        report.removed_edges,
        start.elapsed().as_secs_f64()
    );
}

/// Close every edge around the given nodes, returns the number of edges that
/// had been open in at least one direction
fn block_edges_for_component(graph: &mut RoadGraph, profile: ProfileId, component: &[u32]) -> usize {
    component
        .iter()
        .map(|&node| block_edges_for_node(graph, profile, node))
        .sum()
}

fn block_edges_for_node(graph: &mut RoadGraph, profile: ProfileId, node: u32) -> usize {
    let edges: Vec<u32> = graph.edges_of(node).map(|state| state.edge).collect();
    let mut removed = 0;
    for edge in edges {
        if graph.is_accessible(profile, edge) {
            graph.set_access(profile, edge, false, false);
            removed += 1;
        }
    }
    removed
}

/// Close one direction, returns 1 if it was open
fn close_edge_key(graph: &mut RoadGraph, profile: ProfileId, key: EdgeKey) -> usize {
    if graph.access(profile, key) {
        graph.set_key_access(profile, key, false);
        1
    } else {
        0
    }
}

/// Mark nodes removed that have no open edge for any of `profiles`.
///
/// Returns the number of nodes newly marked.
pub fn mark_nodes_removed_if_unreachable(graph: &mut RoadGraph, profiles: &[ProfileId]) -> usize {
    let mut removed = 0;
    for node in 0..graph.node_count() as u32 {
        if graph.is_node_removed(node) {
            continue;
        }
        let reachable = graph
            .edges_of(node)
            .any(|state| profiles.iter().any(|&p| graph.is_accessible(p, state.edge)));
        if !reachable {
            graph.mark_node_removed(node);
            removed += 1;
        }
    }
    info!(
        "Removed {} nodes from the graph as they aren't used by any profile after removing subnetworks",
        removed
    );
    removed
}

/// Tag the strongly connected components of `profile` with at least
/// `min_size` nodes.
///
/// Tags run from 1 (biggest) to 127 in descending size; nodes in smaller or
/// surplus components stay unassigned (0).
pub fn subnetwork_tags(graph: &RoadGraph, profile: ProfileId, min_size: usize) -> Result<SubnetworkStorage> {
    let components = {
        let filter = AccessFilter::outgoing(graph, profile);
        NodeTarjanScc::find_components(graph, &filter, true)
    };
    let mut selected: Vec<&Vec<u32>> = components
        .components()
        .iter()
        .filter(|component| component.len() >= min_size)
        .collect();
    // stable, so equal sizes keep discovery order
    selected.sort_by(|a, b| b.len().cmp(&a.len()));

    let max_tags = SubnetworkStorage::MAX_SUBNETWORK as usize;
    if selected.len() > max_tags {
        warn!(
            "{} subnetworks with at least {} nodes, only the biggest {} get a tag",
            selected.len(),
            min_size,
            max_tags
        );
        selected.truncate(max_tags);
    }

    let mut storage = SubnetworkStorage::create(graph.node_count());
    for (idx, component) in selected.iter().enumerate() {
        let tag = idx as u32 + 1;
        for &node in component.iter() {
            storage.set_subnetwork(node, tag)?;
        }
    }
    info!(
        "Assigned subnetwork tags to {} subnetworks of '{}'",
        selected.len(),
        graph.profile_name(profile)
    );
    Ok(storage)
}
