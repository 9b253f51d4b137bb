//! Edge-based Tarjan SCC
//!
//! Same algorithm as the node-based search, but the traversal unit is the
//! edge key, so "where may I go next" depends on how a node was entered.
//! That is what lets turn restrictions split a geometrically closed loop
//! into separate components.
//!
//! Every edge accepted by the edge filter contributes both of its keys to
//! the result, even a one-way edge whose backward key can never be entered:
//! such keys simply end up as single-key components.

use bit_vec::BitVec;
use rustc_hash::{FxHashMap, FxHashSet};

use super::components::ConnectedComponents;
use super::dfs_stack::{EdgeDfsStack, EdgeFrame};
use crate::filter::{EdgeFilter, EdgeTransitionFilter};
use crate::graph::{reverse_edge_key, EdgeKey, EdgeState, Graph};

const UNVISITED: u32 = u32::MAX;

/// Discovery index or low-link per edge key
#[derive(Debug)]
enum KeyTable {
    /// Whole graph scans touch every key
    Dense(Vec<u32>),
    /// Start-edge scans usually touch a small region
    Sparse(FxHashMap<EdgeKey, u32>),
}

impl KeyTable {
    fn get(&self, key: EdgeKey) -> Option<u32> {
        match self {
            KeyTable::Dense(values) => match values[key as usize] {
                UNVISITED => None,
                value => Some(value),
            },
            KeyTable::Sparse(values) => values.get(&key).copied(),
        }
    }

    fn set(&mut self, key: EdgeKey, value: u32) {
        match self {
            KeyTable::Dense(values) => values[key as usize] = value,
            KeyTable::Sparse(values) => {
                values.insert(key, value);
            }
        }
    }
}

#[derive(Debug)]
enum KeySet {
    Dense(BitVec),
    Sparse(FxHashSet<EdgeKey>),
}

impl KeySet {
    fn contains(&self, key: EdgeKey) -> bool {
        match self {
            KeySet::Dense(bits) => bits.get(key as usize).unwrap_or(false),
            KeySet::Sparse(keys) => keys.contains(&key),
        }
    }

    fn insert(&mut self, key: EdgeKey) {
        match self {
            KeySet::Dense(bits) => bits.set(key as usize, true),
            KeySet::Sparse(keys) => {
                keys.insert(key);
            }
        }
    }

    fn remove(&mut self, key: EdgeKey) {
        match self {
            KeySet::Dense(bits) => bits.set(key as usize, false),
            KeySet::Sparse(keys) => {
                keys.remove(&key);
            }
        }
    }
}

/// One SCC computation over the edge keys of a graph
pub struct EdgeKeyTarjanScc<'a, G: ?Sized, F: ?Sized, T: ?Sized> {
    graph: &'a G,
    edge_filter: &'a F,
    transition_filter: &'a T,
    key_index: KeyTable,
    key_low_link: KeyTable,
    key_on_stack: KeySet,
    tarjan_stack: Vec<EdgeKey>,
    dfs_stack: EdgeDfsStack,
    components: ConnectedComponents,
    exclude_single_edge_components: bool,
    curr_index: u32,
}

impl<'a, G, F, T> EdgeKeyTarjanScc<'a, G, F, T>
where
    G: Graph + ?Sized,
    F: EdgeFilter + ?Sized,
    T: EdgeTransitionFilter + ?Sized,
{
    /// Find the SCCs over all edge keys using an explicit stack.
    ///
    /// A continuation from key `p` onto edge state `s` is followed only if
    /// `edge_filter` accepts `s` and `transition_filter` accepts `(p, s)`.
    pub fn find_components(
        graph: &'a G,
        edge_filter: &'a F,
        transition_filter: &'a T,
        exclude_single_edge_components: bool,
    ) -> ConnectedComponents {
        let mut scc = Self::for_entire_graph(
            graph,
            edge_filter,
            transition_filter,
            exclude_single_edge_components,
        );
        for edge in 0..graph.edge_count() as u32 {
            let state = graph.edge_state(edge);
            if scc.accepts_either_direction(&state) {
                scc.find_components_for_edge_state(&state);
            }
        }
        scc.components
    }

    /// Recursive reference implementation of
    /// [`find_components`](Self::find_components)
    pub fn find_components_recursive(
        graph: &'a G,
        edge_filter: &'a F,
        transition_filter: &'a T,
        exclude_single_edge_components: bool,
    ) -> ConnectedComponents {
        let mut scc = Self::for_entire_graph(
            graph,
            edge_filter,
            transition_filter,
            exclude_single_edge_components,
        );
        for edge in 0..graph.edge_count() as u32 {
            let state = graph.edge_state(edge);
            if !scc.accepts_either_direction(&state) {
                continue;
            }
            let fwd = state.edge_key();
            if scc.key_index.get(fwd).is_none() {
                scc.find_component_for_edge_key(fwd, state.adj);
            }
            let bwd = reverse_edge_key(fwd);
            if scc.key_index.get(bwd).is_none() {
                scc.find_component_for_edge_key(bwd, state.base);
            }
        }
        scc.components
    }

    /// Like [`find_components`](Self::find_components), but the search only
    /// starts at the given edges. It may still expand to other edges.
    ///
    /// Start edges are skipped unless the transition filter accepts them
    /// with no previous edge. Single-key components are never recorded.
    ///
    /// # Panics
    ///
    /// If a start edge id is not an edge of `graph`.
    pub fn find_components_for_start_edges<I>(
        graph: &'a G,
        edge_filter: &'a F,
        transition_filter: &'a T,
        start_edges: I,
    ) -> ConnectedComponents
    where
        I: IntoIterator<Item = u32>,
    {
        let start_edges = start_edges.into_iter();
        let capacity = 2 * start_edges.size_hint().0;
        let mut scc = Self {
            graph,
            edge_filter,
            transition_filter,
            key_index: KeyTable::Sparse(FxHashMap::with_capacity_and_hasher(
                capacity,
                Default::default(),
            )),
            key_low_link: KeyTable::Sparse(FxHashMap::with_capacity_and_hasher(
                capacity,
                Default::default(),
            )),
            key_on_stack: KeySet::Sparse(FxHashSet::with_capacity_and_hasher(
                capacity,
                Default::default(),
            )),
            tarjan_stack: Vec::new(),
            dfs_stack: EdgeDfsStack::default(),
            components: ConnectedComponents::new(None),
            exclude_single_edge_components: true,
            curr_index: 0,
        };
        for edge in start_edges {
            let state = graph.edge_state(edge);
            if !scc.accepts_either_direction(&state) || !transition_filter.accept(None, &state) {
                continue;
            }
            scc.find_components_for_edge_state(&state);
        }
        scc.components
    }

    fn for_entire_graph(
        graph: &'a G,
        edge_filter: &'a F,
        transition_filter: &'a T,
        exclude_single_edge_components: bool,
    ) -> Self {
        let keys = 2 * graph.edge_count();
        Self {
            graph,
            edge_filter,
            transition_filter,
            key_index: KeyTable::Dense(vec![UNVISITED; keys]),
            key_low_link: KeyTable::Dense(vec![UNVISITED; keys]),
            key_on_stack: KeySet::Dense(BitVec::from_elem(keys, false)),
            tarjan_stack: Vec::new(),
            dfs_stack: EdgeDfsStack::default(),
            components: ConnectedComponents::new((!exclude_single_edge_components).then_some(keys)),
            exclude_single_edge_components,
            curr_index: 0,
        }
    }

    fn accepts_either_direction(&self, state: &EdgeState) -> bool {
        self.edge_filter.accept(state) || self.edge_filter.accept(&state.reversed())
    }

    fn find_component_for_edge_key(&mut self, p: EdgeKey, node: u32) {
        self.setup_next_edge_key(p);
        let graph = self.graph;
        let edge_filter = self.edge_filter;
        let transition_filter = self.transition_filter;
        for state in graph.edges_of(node) {
            if !edge_filter.accept(&state) || !transition_filter.accept(Some(p), &state) {
                continue;
            }
            let q = state.edge_key();
            self.handle_neighbor(p, q, state.adj);
            // a loop is listed once but can be driven both ways round
            if state.is_loop() {
                self.handle_neighbor(p, reverse_edge_key(q), state.adj);
            }
        }
        self.build_component(p);
    }

    fn handle_neighbor(&mut self, p: EdgeKey, q: EdgeKey, node: u32) {
        if self.key_index.get(q).is_none() {
            self.find_component_for_edge_key(q, node);
            let low = self.low_link(q);
            self.lower_low_link(p, low);
        } else if self.key_on_stack.contains(q) {
            let index = self.index(q);
            self.lower_low_link(p, index);
        }
    }

    fn find_components_for_edge_state(&mut self, state: &EdgeState) {
        // Both keys need a search, but the second may already have been found
        // by the first, so they cannot be pushed together.
        let fwd = state.edge_key();
        if self.key_index.get(fwd).is_none() {
            self.dfs_stack.push(EdgeFrame::FindComponent {
                p: fwd,
                node: state.adj,
            });
            self.start_search();
        }
        let bwd = reverse_edge_key(fwd);
        if self.key_index.get(bwd).is_none() {
            self.dfs_stack.push(EdgeFrame::FindComponent {
                p: bwd,
                node: state.base,
            });
            self.start_search();
        }
    }

    fn start_search(&mut self) {
        let graph = self.graph;
        let edge_filter = self.edge_filter;
        let transition_filter = self.transition_filter;
        while let Some(frame) = self.dfs_stack.pop() {
            match frame {
                EdgeFrame::BuildComponent(p) => self.build_component(p),
                EdgeFrame::UpdateLowLink { p, q } => {
                    let low = self.low_link(q);
                    self.lower_low_link(p, low);
                }
                EdgeFrame::HandleNeighbor { p, q, node } => {
                    if self.key_index.get(q).is_none() {
                        // runs after q and everything below it is done
                        self.dfs_stack.push(EdgeFrame::UpdateLowLink { p, q });
                        self.dfs_stack.push(EdgeFrame::FindComponent { p: q, node });
                    } else if self.key_on_stack.contains(q) {
                        let index = self.index(q);
                        self.lower_low_link(p, index);
                    }
                }
                EdgeFrame::FindComponent { p, node } => {
                    self.setup_next_edge_key(p);
                    self.dfs_stack.push(EdgeFrame::BuildComponent(p));
                    for state in graph.edges_of(node) {
                        if !edge_filter.accept(&state) || !transition_filter.accept(Some(p), &state)
                        {
                            continue;
                        }
                        let q = state.edge_key();
                        self.dfs_stack.push(EdgeFrame::HandleNeighbor {
                            p,
                            q,
                            node: state.adj,
                        });
                        if state.is_loop() {
                            self.dfs_stack.push(EdgeFrame::HandleNeighbor {
                                p,
                                q: reverse_edge_key(q),
                                node: state.adj,
                            });
                        }
                    }
                }
            }
        }
    }

    fn index(&self, key: EdgeKey) -> u32 {
        self.key_index
            .get(key)
            .unwrap_or_else(|| panic!("edge key {} has no index", key))
    }

    fn low_link(&self, key: EdgeKey) -> u32 {
        self.key_low_link
            .get(key)
            .unwrap_or_else(|| panic!("edge key {} has no low-link", key))
    }

    fn lower_low_link(&mut self, key: EdgeKey, value: u32) {
        let low = self.low_link(key);
        if value < low {
            self.key_low_link.set(key, value);
        }
    }

    fn setup_next_edge_key(&mut self, p: EdgeKey) {
        self.key_index.set(p, self.curr_index);
        self.key_low_link.set(p, self.curr_index);
        self.curr_index += 1;
        self.tarjan_stack.push(p);
        self.key_on_stack.insert(p);
    }

    fn build_component(&mut self, p: EdgeKey) {
        if self.low_link(p) != self.index(p) {
            return;
        }
        let top = *self
            .tarjan_stack
            .last()
            .unwrap_or_else(|| panic!("tarjan stack empty while closing edge key {}", p));
        if top == p {
            self.tarjan_stack.pop();
            self.key_on_stack.remove(p);
            self.components
                .add_single_unit(p, !self.exclude_single_edge_components);
            return;
        }

        let mut component = Vec::new();
        loop {
            let q = self
                .tarjan_stack
                .pop()
                .unwrap_or_else(|| panic!("edge key {} missing from tarjan stack", p));
            component.push(q);
            self.key_on_stack.remove(q);
            if q == p {
                break;
            }
        }
        component.shrink_to_fit();
        self.components.add_component(component);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{AccessFilter, AllEdges, AllTransitions, TurnCostFilter};
    use crate::graph::{edge_from_key, ProfileId, RandomGraphConfig, RoadGraph};
    use crate::subnetwork::NodeTarjanScc;
    use crate::turn_cost::TurnCostTable;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// Edges as `(base, adj, forward, backward)`
    fn build(edges: &[(u32, u32, bool, bool)]) -> (RoadGraph, ProfileId) {
        let mut graph = RoadGraph::new(0);
        let car = graph.add_profile("car");
        for &(base, adj, fwd, bwd) in edges {
            let edge = graph.add_edge(base, adj);
            graph.set_access(car, edge, fwd, bwd);
        }
        (graph, car)
    }

    fn find_recursive(graph: &RoadGraph, car: ProfileId) -> ConnectedComponents {
        let filter = AccessFilter::outgoing(graph, car);
        EdgeKeyTarjanScc::find_components_recursive(graph, &filter, &AllTransitions, false)
    }

    fn find_explicit(graph: &RoadGraph, car: ProfileId) -> ConnectedComponents {
        let filter = AccessFilter::outgoing(graph, car);
        EdgeKeyTarjanScc::find_components(graph, &filter, &AllTransitions, false)
    }

    fn assert_same(a: &ConnectedComponents, b: &ConnectedComponents) {
        assert_eq!(a.edge_keys(), b.edge_keys());
        assert_eq!(a.total_components(), b.total_components());
        assert_eq!(a.sorted_components(), b.sorted_components());
        assert_eq!(a.single_unit_components(), b.single_unit_components());
        assert_eq!(a.biggest_component().len(), b.biggest_component().len());
    }

    #[test]
    fn test_linear_single() {
        // 0 - 1
        let (graph, car) = build(&[(0, 1, true, true)]);
        let result = find_recursive(&graph, car);
        assert_eq!(result.edge_keys(), 2);
        assert_eq!(result.total_components(), 1);
        assert_eq!(result.sorted_components(), vec![vec![0, 1]]);
        assert_eq!(result.single_units().count(), 0);
        assert_eq!(result.biggest_index(), Some(0));
    }

    #[test]
    fn test_linear_one_way() {
        // 0 -> 1 -> 2
        let (graph, car) = build(&[(0, 1, true, false), (1, 2, true, false)]);
        for result in [find_recursive(&graph, car), find_explicit(&graph, car)] {
            assert_eq!(result.edge_keys(), 4);
            assert_eq!(result.total_components(), 4);
            assert!(result.components().is_empty());
            // the backward keys can never be entered, still they are counted
            assert_eq!(result.single_units().count(), 4);
            assert!(result.biggest_component().is_empty());
        }
    }

    #[test]
    fn test_linear_bidirectional_edge() {
        // 0 -> 1 - 2 <- 3
        let (graph, car) = build(&[(0, 1, true, false), (1, 2, true, true), (3, 2, true, false)]);
        let result = find_recursive(&graph, car);
        assert_eq!(result.edge_keys(), 6);
        assert_eq!(result.total_components(), 5);
        assert_eq!(result.sorted_components(), vec![vec![2, 3]]);
        assert_eq!(result.single_units().collect::<Vec<_>>(), vec![0, 1, 4, 5]);
    }

    #[test]
    fn test_one_way_bridges() {
        // 0 - 1 -> 2 - 3
        //          |   |
        //          4 - 5 -> 6 - 7
        let (graph, car) = build(&[
            (0, 1, true, true),
            (1, 2, true, false),
            (2, 3, true, true),
            (2, 4, true, true),
            (3, 5, true, true),
            (4, 5, true, true),
            (5, 6, true, false),
            (6, 7, true, true),
        ]);
        let result = find_recursive(&graph, car);
        assert_eq!(result.edge_keys(), 16);
        assert_eq!(result.total_components(), 7);
        assert_eq!(
            result.sorted_components(),
            vec![vec![0, 1], vec![4, 5, 6, 7, 8, 9, 10, 11], vec![14, 15]]
        );
        assert_eq!(result.single_units().collect::<Vec<_>>(), vec![2, 3, 12, 13]);
        assert_eq!(result.biggest_component().len(), 8);
        assert_same(&result, &find_explicit(&graph, car));
    }

    #[test]
    fn test_tree() {
        // 0 - 1 - 2 - 4 - 5
        //     |    \- 6 - 7
        //     3        \- 8
        let (graph, car) = build(&[
            (0, 1, true, true),
            (1, 2, true, true),
            (1, 3, true, true),
            (2, 4, true, true),
            (2, 6, true, true),
            (4, 5, true, true),
            (6, 7, true, true),
            (6, 8, true, true),
        ]);
        let result = find_explicit(&graph, car);
        assert_eq!(result.edge_keys(), 16);
        assert_eq!(result.total_components(), 1);
        assert_eq!(result.sorted_components(), vec![(0..16).collect::<Vec<u32>>()]);
        assert!(result.single_unit_components().none());
    }

    #[test]
    fn test_small_graph() {
        // 3 <- 0 -> 2 - 1
        let (graph, car) = build(&[(0, 2, true, false), (0, 3, true, false), (2, 1, true, true)]);
        let result = find_explicit(&graph, car);
        assert_eq!(result.edge_keys(), 6);
        assert_eq!(result.total_components(), 5);
        assert_eq!(result.sorted_components(), vec![vec![4, 5]]);
        assert_eq!(result.single_units().collect::<Vec<_>>(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_bigger_graph() {
        // 0 - 1 < 2 - 4 > 5
        //     |   |       |
        //     |    \< 6 - 7
        //     3        \- 8
        let (graph, car) = build(&[
            (0, 1, true, true),
            (2, 1, true, false),
            (1, 3, true, true),
            (2, 4, true, true),
            (6, 2, true, false),
            (4, 5, true, false),
            (5, 7, true, true),
            (6, 7, true, true),
            (6, 8, true, true),
        ]);
        let recursive = find_recursive(&graph, car);
        assert_eq!(recursive.edge_keys(), 18);
        assert_eq!(recursive.total_components(), 6);
        assert_eq!(
            recursive.sorted_components(),
            vec![vec![0, 1, 4, 5], vec![6, 7, 8, 10, 12, 13, 14, 15, 16, 17]]
        );
        assert_eq!(recursive.biggest_component().len(), 10);
        assert_eq!(recursive.single_units().collect::<Vec<_>>(), vec![2, 3, 9, 11]);
        assert_same(&recursive, &find_explicit(&graph, car));
    }

    #[test]
    fn test_self_loop_keys_form_one_component() {
        let (graph, car) = build(&[(0, 0, true, false)]);
        for result in [find_recursive(&graph, car), find_explicit(&graph, car)] {
            assert_eq!(result.edge_keys(), 2);
            assert_eq!(result.total_components(), 1);
            assert_eq!(result.sorted_components(), vec![vec![0, 1]]);
            assert_eq!(result.single_units().count(), 0);
        }
    }

    #[test]
    fn test_self_loop_attached_to_one_way() {
        // 0 -> 1, loop at 1
        let (graph, car) = build(&[(0, 1, true, false), (1, 1, true, true)]);
        let result = find_explicit(&graph, car);
        assert_eq!(result.edge_keys(), 4);
        assert_eq!(result.sorted_components(), vec![vec![2, 3]]);
        assert_eq!(result.single_units().collect::<Vec<_>>(), vec![0, 1]);
    }

    fn restricted_square() -> (RoadGraph, ProfileId) {
        // 0 -> 1
        // |    |
        // 3 <- 2 -> 4
        build(&[
            (0, 1, true, false),
            (1, 2, true, false),
            (2, 3, true, false),
            (3, 0, true, false),
            (2, 4, true, false),
        ])
    }

    #[test]
    fn test_cycle_without_turn_restriction() {
        let (graph, car) = restricted_square();
        let result = find_recursive(&graph, car);
        assert_eq!(result.total_components(), 7);
        assert_eq!(result.sorted_components(), vec![vec![0, 2, 4, 6]]);
        assert_eq!(
            result.single_units().collect::<Vec<_>>(),
            vec![1, 3, 5, 7, 8, 9]
        );
    }

    #[test]
    fn test_turn_restriction_splits_cycle() {
        let (graph, car) = restricted_square();
        let filter = AccessFilter::outgoing(&graph, car);
        // no turn from edge 1 onto edge 2 at node 2
        let no_turn = |prev: Option<EdgeKey>, state: &EdgeState| {
            !(prev.map(edge_from_key) == Some(1) && state.base == 2 && state.edge == 2)
        };
        let recursive = EdgeKeyTarjanScc::find_components_recursive(&graph, &filter, &no_turn, false);
        assert_eq!(recursive.total_components(), 10);
        assert!(recursive.components().is_empty());
        assert!(recursive.biggest_component().is_empty());
        assert_eq!(recursive.single_units().count(), 10);

        let explicit = EdgeKeyTarjanScc::find_components(&graph, &filter, &no_turn, false);
        assert_same(&recursive, &explicit);
    }

    #[test]
    fn test_turn_cost_table_restriction_on_pure_cycle() {
        // 0 -> 1 -> 2 -> 3 -> 0
        let (mut graph, car) = build(&[
            (0, 1, true, false),
            (1, 2, true, false),
            (2, 3, true, false),
            (3, 0, true, false),
        ]);
        let filter = AccessFilter::outgoing(&graph, car);
        let nodes = NodeTarjanScc::find_components(&graph, &filter, false);
        assert_eq!(nodes.sorted_components(), vec![vec![0, 1, 2, 3]]);

        let free = TurnCostFilter::new(TurnCostTable::new());
        let edges = EdgeKeyTarjanScc::find_components(&graph, &filter, &free, false);
        assert_eq!(edges.sorted_components(), vec![vec![0, 2, 4, 6]]);

        graph.turn_costs_mut(car).forbid(0, 1, 1);
        let filter = AccessFilter::outgoing(&graph, car);
        let restricted = TurnCostFilter::new(graph.turn_costs(car));
        let edges = EdgeKeyTarjanScc::find_components(&graph, &filter, &restricted, false);
        assert!(edges.components().is_empty());
        assert_eq!(edges.total_components(), 8);
        // the directed edges 0, 2, 4 and 6 all degenerate into single keys
        for key in [0, 2, 4, 6] {
            assert!(edges.is_single_unit(key));
        }
    }

    #[test]
    fn test_exclude_single_edge_components() {
        let (graph, car) = restricted_square();
        let filter = AccessFilter::outgoing(&graph, car);
        let result = EdgeKeyTarjanScc::find_components(&graph, &filter, &AllTransitions, true);
        assert_eq!(result.total_components(), 7);
        assert_eq!(result.edge_keys(), 10);
        assert!(result.single_unit_components().is_empty());
    }

    #[test]
    fn test_closed_edges_are_not_counted() {
        // 0 - 1 - 2 with the second edge closed
        let (graph, car) = build(&[(0, 1, true, true), (1, 2, false, false)]);
        let result = find_explicit(&graph, car);
        assert_eq!(result.edge_keys(), 2);
        assert_eq!(result.total_components(), 1);
    }

    #[test]
    fn test_with_start_edges_simple() {
        // 0 - 1   4 - 5 - 6 - 7
        // |   |
        // 3 - 2   8 - 9
        let (graph, _) = build(&[
            (0, 1, true, true),
            (1, 2, true, true),
            (2, 3, true, true),
            (3, 0, true, true),
            (4, 5, true, true),
            (5, 6, true, true),
            (6, 7, true, true),
            (8, 9, true, true),
        ]);

        // just the left island
        let result =
            EdgeKeyTarjanScc::find_components_for_start_edges(&graph, &AllEdges, &AllTransitions, [0]);
        assert_eq!(result.edge_keys(), 8);
        assert_eq!(result.components().len(), 1);

        // all islands
        let result = EdgeKeyTarjanScc::find_components_for_start_edges(
            &graph,
            &AllEdges,
            &AllTransitions,
            [0, 4, 7],
        );
        assert_eq!(result.edge_keys(), 16);
        assert_eq!(result.components().len(), 3);

        // same start edges, but the filter hides part of the graph
        let middle = |_prev: Option<EdgeKey>, state: &EdgeState| state.edge > 3 && state.edge < 7;
        let result =
            EdgeKeyTarjanScc::find_components_for_start_edges(&graph, &AllEdges, &middle, [0, 4, 7]);
        assert_eq!(result.edge_keys(), 6);
        assert_eq!(result.components().len(), 1);
    }

    fn random_graph(seed: u64, restrictions: bool) -> (RoadGraph, ProfileId) {
        let mut rng = StdRng::seed_from_u64(seed);
        let config = RandomGraphConfig {
            nodes: 500,
            mean_degree: 2.0,
            allow_loops: true,
            p_both_directions: 0.7,
            p_blocked: 0.05,
        };
        let mut graph = RoadGraph::random(&mut rng, "car", &config);
        let car = graph.profile("car").unwrap();
        if restrictions {
            graph.add_random_turn_restrictions(&mut rng, car, 0.3);
        }
        (graph, car)
    }

    #[test]
    fn test_recursive_matches_explicit_on_random_graphs() {
        for seed in 0..20u64 {
            for restrictions in [false, true] {
                let (graph, car) = random_graph(seed, restrictions);
                let filter = AccessFilter::outgoing(&graph, car);
                let turns = TurnCostFilter::new(graph.turn_costs(car));
                let accepted = graph.accessible_edge_count(car);
                for exclude_single in [true, false] {
                    let recursive = EdgeKeyTarjanScc::find_components_recursive(
                        &graph,
                        &filter,
                        &turns,
                        exclude_single,
                    );
                    let explicit =
                        EdgeKeyTarjanScc::find_components(&graph, &filter, &turns, exclude_single);
                    assert_eq!(recursive.edge_keys(), 2 * accepted, "seed {}", seed);
                    assert_eq!(explicit.edge_keys(), 2 * accepted, "seed {}", seed);
                    assert_same(&recursive, &explicit);
                }
            }
        }
    }

    #[test]
    fn test_start_edges_match_full_scan() {
        for seed in 100..110u64 {
            let (graph, car) = random_graph(seed, true);
            let filter = AccessFilter::outgoing(&graph, car);
            let turns = TurnCostFilter::new(graph.turn_costs(car));
            let full = EdgeKeyTarjanScc::find_components(&graph, &filter, &turns, true);
            let from_starts = EdgeKeyTarjanScc::find_components_for_start_edges(
                &graph,
                &filter,
                &turns,
                0..graph.edge_count() as u32,
            );
            assert_same(&full, &from_starts);
        }
    }

    #[test]
    fn test_every_edge_key_is_accounted_for() {
        let (graph, car) = random_graph(7, true);
        let result = {
            let filter = AccessFilter::outgoing(&graph, car);
            let turns = TurnCostFilter::new(graph.turn_costs(car));
            EdgeKeyTarjanScc::find_components(&graph, &filter, &turns, false)
        };
        let mut seen = vec![0u32; 2 * graph.edge_count()];
        for component in result.components() {
            for &key in component {
                seen[key as usize] += 1;
            }
        }
        for key in result.single_units() {
            seen[key as usize] += 1;
        }
        for edge in 0..graph.edge_count() as u32 {
            let expected = u32::from(graph.is_accessible(car, edge));
            assert_eq!(seen[2 * edge as usize], expected);
            assert_eq!(seen[2 * edge as usize + 1], expected);
        }
    }
}
