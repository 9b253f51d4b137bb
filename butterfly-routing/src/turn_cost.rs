//! Turn costs
//!
//! A turn is identified by `(in_edge, via_node, out_edge)`. An infinite cost
//! means the turn is forbidden, which is how turn restrictions reach the
//! edge-based SCC search.

use rustc_hash::FxHashMap;

pub trait TurnCostProvider {
    /// Cost of continuing from `in_edge` onto `out_edge` at `via_node`
    fn turn_cost(&self, in_edge: u32, via_node: u32, out_edge: u32) -> f64;
}

impl<T: TurnCostProvider + ?Sized> TurnCostProvider for &T {
    fn turn_cost(&self, in_edge: u32, via_node: u32, out_edge: u32) -> f64 {
        (**self).turn_cost(in_edge, via_node, out_edge)
    }
}

/// Sparse turn cost storage
///
/// Only junctions with explicit rules have entries; everything else costs 0,
/// except u-turns (`in_edge == out_edge`) which cost `u_turn_cost`.
#[derive(Debug, Clone, Default)]
pub struct TurnCostTable {
    costs: FxHashMap<(u32, u32, u32), f64>,
    u_turn_cost: f64,
}

impl TurnCostTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `f64::INFINITY` to forbid u-turns everywhere
    pub fn with_u_turn_cost(mut self, cost: f64) -> Self {
        self.u_turn_cost = cost;
        self
    }

    pub fn u_turn_cost(&self) -> f64 {
        self.u_turn_cost
    }

    pub fn set(&mut self, in_edge: u32, via_node: u32, out_edge: u32, cost: f64) {
        self.costs.insert((in_edge, via_node, out_edge), cost);
    }

    /// Turn restriction: no continuation from `in_edge` onto `out_edge` at `via_node`
    pub fn forbid(&mut self, in_edge: u32, via_node: u32, out_edge: u32) {
        self.set(in_edge, via_node, out_edge, f64::INFINITY);
    }

    pub fn is_forbidden(&self, in_edge: u32, via_node: u32, out_edge: u32) -> bool {
        self.turn_cost(in_edge, via_node, out_edge).is_infinite()
    }

    pub fn len(&self) -> usize {
        self.costs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.costs.is_empty()
    }

    /// Explicit entries as `((in_edge, via_node, out_edge), cost)`, unordered
    pub fn iter(&self) -> impl Iterator<Item = ((u32, u32, u32), f64)> + '_ {
        self.costs.iter().map(|(&turn, &cost)| (turn, cost))
    }
}

impl TurnCostProvider for TurnCostTable {
    fn turn_cost(&self, in_edge: u32, via_node: u32, out_edge: u32) -> f64 {
        match self.costs.get(&(in_edge, via_node, out_edge)) {
            Some(&cost) => cost,
            None if in_edge == out_edge => self.u_turn_cost,
            None => 0.0,
        }
    }
}
