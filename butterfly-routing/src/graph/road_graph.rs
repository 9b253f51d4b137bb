//! In-memory road graph with per-profile access flags

use bit_vec::BitVec;
use butterfly_common::{Error, Result};

use super::{create_edge_key, EdgeKey, EdgeState, Graph};
use crate::turn_cost::TurnCostTable;

/// Index of a vehicle profile registered on a [`RoadGraph`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProfileId(usize);

impl ProfileId {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Directed multigraph with dense ids.
///
/// Each profile owns one access bit per edge key and its own turn cost
/// table. Node removal is logical: removed nodes keep their id and edges.
#[derive(Debug, Clone, Default)]
pub struct RoadGraph {
    edges: Vec<[u32; 2]>,
    adjacency: Vec<Vec<u32>>,
    profiles: Vec<String>,
    access: Vec<BitVec>,
    turn_costs: Vec<TurnCostTable>,
    removed_nodes: BitVec,
}

impl RoadGraph {
    pub fn new(nodes: usize) -> Self {
        Self {
            adjacency: vec![Vec::new(); nodes],
            removed_nodes: BitVec::from_elem(nodes, false),
            ..Default::default()
        }
    }

    /// Grow the node space so that `node` is a valid id
    pub fn ensure_node(&mut self, node: u32) {
        let needed = node as usize + 1;
        if needed > self.adjacency.len() {
            self.adjacency.resize(needed, Vec::new());
            self.removed_nodes.grow(needed - self.removed_nodes.len(), false);
        }
    }

    /// Register a profile, or return the existing id if the name is taken
    pub fn add_profile(&mut self, name: &str) -> ProfileId {
        if let Some(idx) = self.profiles.iter().position(|p| p == name) {
            return ProfileId(idx);
        }
        self.profiles.push(name.to_string());
        self.access
            .push(BitVec::from_elem(2 * self.edges.len(), false));
        self.turn_costs.push(TurnCostTable::new());
        ProfileId(self.profiles.len() - 1)
    }

    pub fn profile(&self, name: &str) -> Result<ProfileId> {
        self.profiles
            .iter()
            .position(|p| p == name)
            .map(ProfileId)
            .ok_or_else(|| Error::UnknownProfile(name.to_string()))
    }

    pub fn profile_name(&self, profile: ProfileId) -> &str {
        &self.profiles[profile.0]
    }

    pub fn profiles(&self) -> impl Iterator<Item = (ProfileId, &str)> + '_ {
        self.profiles
            .iter()
            .enumerate()
            .map(|(idx, name)| (ProfileId(idx), name.as_str()))
    }

    pub fn profile_count(&self) -> usize {
        self.profiles.len()
    }

    /// Add an edge stored as `base -> adj`, closed for every profile.
    ///
    /// Returns the new edge id.
    pub fn add_edge(&mut self, base: u32, adj: u32) -> u32 {
        self.ensure_node(base.max(adj));
        let edge = self.edges.len() as u32;
        self.edges.push([base, adj]);
        self.adjacency[base as usize].push(edge);
        if adj != base {
            self.adjacency[adj as usize].push(edge);
        }
        for bits in &mut self.access {
            bits.grow(2, false);
        }
        edge
    }

    /// Set both access directions of `edge` for `profile`
    pub fn set_access(&mut self, profile: ProfileId, edge: u32, forward: bool, backward: bool) {
        let bits = &mut self.access[profile.0];
        bits.set(create_edge_key(edge, false) as usize, forward);
        bits.set(create_edge_key(edge, true) as usize, backward);
    }

    /// Set access for a single direction
    pub fn set_key_access(&mut self, profile: ProfileId, edge_key: EdgeKey, open: bool) {
        self.access[profile.0].set(edge_key as usize, open);
    }

    /// Can `profile` traverse the edge in the direction given by `edge_key`
    #[inline]
    pub fn access(&self, profile: ProfileId, edge_key: EdgeKey) -> bool {
        self.access[profile.0]
            .get(edge_key as usize)
            .unwrap_or(false)
    }

    /// Open in at least one direction
    #[inline]
    pub fn is_accessible(&self, profile: ProfileId, edge: u32) -> bool {
        self.access(profile, create_edge_key(edge, false))
            || self.access(profile, create_edge_key(edge, true))
    }

    pub fn accessible_edge_count(&self, profile: ProfileId) -> usize {
        (0..self.edges.len() as u32)
            .filter(|&edge| self.is_accessible(profile, edge))
            .count()
    }

    /// `(base, adj)` in storage orientation
    pub fn endpoints(&self, edge: u32) -> (u32, u32) {
        let [base, adj] = self.edges[edge as usize];
        (base, adj)
    }

    /// First edge connecting `a` and `b`, in either orientation
    pub fn find_edge(&self, a: u32, b: u32) -> Option<u32> {
        self.adjacency
            .get(a as usize)?
            .iter()
            .copied()
            .find(|&edge| {
                let [base, adj] = self.edges[edge as usize];
                (base == a && adj == b) || (base == b && adj == a)
            })
    }

    pub fn mark_node_removed(&mut self, node: u32) {
        self.removed_nodes.set(node as usize, true);
    }

    pub fn is_node_removed(&self, node: u32) -> bool {
        self.removed_nodes.get(node as usize).unwrap_or(false)
    }

    pub fn removed_node_count(&self) -> usize {
        self.removed_nodes.iter().filter(|removed| *removed).count()
    }

    pub fn turn_costs(&self, profile: ProfileId) -> &TurnCostTable {
        &self.turn_costs[profile.0]
    }

    pub fn turn_costs_mut(&mut self, profile: ProfileId) -> &mut TurnCostTable {
        &mut self.turn_costs[profile.0]
    }

    /// Check that `node` is a valid id
    pub fn check_node(&self, node: u32) -> Result<()> {
        if (node as usize) < self.adjacency.len() {
            Ok(())
        } else {
            Err(Error::NodeOutOfRange {
                node,
                nodes: self.adjacency.len(),
            })
        }
    }
}

impl Graph for RoadGraph {
    #[inline]
    fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    #[inline]
    fn edge_count(&self) -> usize {
        self.edges.len()
    }

    fn edge_state(&self, edge: u32) -> EdgeState {
        let [base, adj] = self.edges[edge as usize];
        EdgeState {
            edge,
            base,
            adj,
            reverse: false,
        }
    }

    fn edges_of(&self, node: u32) -> impl Iterator<Item = EdgeState> + '_ {
        self.adjacency[node as usize].iter().map(move |&edge| {
            let [base, adj] = self.edges[edge as usize];
            if base == node {
                EdgeState {
                    edge,
                    base,
                    adj,
                    reverse: false,
                }
            } else {
                EdgeState {
                    edge,
                    base: adj,
                    adj: base,
                    reverse: true,
                }
            }
        })
    }
}
