//! Node-based Tarjan SCC
//!
//! Two interchangeable searches over the same state: a recursive one that is
//! easy to follow but needs call-stack depth proportional to the DFS depth,
//! and one driven by an explicit [`NodeDfsStack`] that scales to whole
//! countries. Both return the same partition; only the order in which
//! neighbors are visited (and therefore the order of the component list)
//! differs.

use bit_vec::BitVec;

use super::components::ConnectedComponents;
use super::dfs_stack::{NodeDfsStack, NodeFrame};
use crate::filter::EdgeFilter;
use crate::graph::Graph;

const UNVISITED: u32 = u32::MAX;

/// One SCC computation over the nodes of a graph.
///
/// Instances are single use, see [`NodeTarjanScc::find_components`].
pub struct NodeTarjanScc<'a, G: ?Sized, F: ?Sized> {
    graph: &'a G,
    edge_filter: &'a F,
    node_index: Vec<u32>,
    node_low_link: Vec<u32>,
    node_on_stack: BitVec,
    tarjan_stack: Vec<u32>,
    dfs_stack: NodeDfsStack,
    components: ConnectedComponents,
    exclude_single_node_components: bool,
    curr_index: u32,
}

impl<'a, G, F> NodeTarjanScc<'a, G, F>
where
    G: Graph + ?Sized,
    F: EdgeFilter + ?Sized,
{
    /// Find the SCCs of `graph` restricted to edges accepted by `edge_filter`,
    /// using an explicit stack.
    ///
    /// With `exclude_single_node_components` the single-node bit set stays
    /// empty, which saves memory when only real components matter. Single
    /// nodes are still counted in the totals.
    pub fn find_components(
        graph: &'a G,
        edge_filter: &'a F,
        exclude_single_node_components: bool,
    ) -> ConnectedComponents {
        let mut scc = Self::new(graph, edge_filter, exclude_single_node_components);
        scc.run_explicit();
        scc.components
    }

    /// Same result as [`find_components`](Self::find_components), computed
    /// with plain recursion. Only suitable for small graphs.
    pub fn find_components_recursive(
        graph: &'a G,
        edge_filter: &'a F,
        exclude_single_node_components: bool,
    ) -> ConnectedComponents {
        let mut scc = Self::new(graph, edge_filter, exclude_single_node_components);
        for node in 0..graph.node_count() as u32 {
            if scc.node_index[node as usize] == UNVISITED {
                scc.find_component_for_node(node);
            }
        }
        scc.components
    }

    fn new(graph: &'a G, edge_filter: &'a F, exclude_single_node_components: bool) -> Self {
        let nodes = graph.node_count();
        Self {
            graph,
            edge_filter,
            node_index: vec![UNVISITED; nodes],
            node_low_link: vec![UNVISITED; nodes],
            node_on_stack: BitVec::from_elem(nodes, false),
            tarjan_stack: Vec::new(),
            dfs_stack: NodeDfsStack::default(),
            components: ConnectedComponents::new(
                (!exclude_single_node_components).then_some(nodes),
            ),
            exclude_single_node_components,
            curr_index: 0,
        }
    }

    fn find_component_for_node(&mut self, v: u32) {
        self.setup_next_node(v);
        let graph = self.graph;
        let edge_filter = self.edge_filter;
        for state in graph.edges_of(v).filter(|s| edge_filter.accept(s)) {
            let w = state.adj;
            if self.node_index[w as usize] == UNVISITED {
                self.find_component_for_node(w);
                self.lower_low_link(v, self.node_low_link[w as usize]);
            } else if self.node_on_stack[w as usize] {
                self.lower_low_link(v, self.node_index[w as usize]);
            }
        }
        self.build_component(v);
    }

    fn run_explicit(&mut self) {
        let graph = self.graph;
        let edge_filter = self.edge_filter;
        for node in 0..graph.node_count() as u32 {
            if self.node_index[node as usize] != UNVISITED {
                continue;
            }

            self.dfs_stack.push(NodeFrame::EnterNode(node));
            while let Some(frame) = self.dfs_stack.pop() {
                match frame {
                    NodeFrame::CloseComponent(v) => self.build_component(v),
                    NodeFrame::PropagateLowLink { v, w } => {
                        self.lower_low_link(v, self.node_low_link[w as usize]);
                    }
                    NodeFrame::VisitNeighbor { v, w } => {
                        if self.node_index[w as usize] == UNVISITED {
                            // runs after w and everything below it is done
                            self.dfs_stack.push(NodeFrame::PropagateLowLink { v, w });
                            self.dfs_stack.push(NodeFrame::EnterNode(w));
                        } else if self.node_on_stack[w as usize] {
                            self.lower_low_link(v, self.node_index[w as usize]);
                        }
                    }
                    NodeFrame::EnterNode(v) => {
                        self.setup_next_node(v);
                        self.dfs_stack.push(NodeFrame::CloseComponent(v));
                        for state in graph.edges_of(v).filter(|s| edge_filter.accept(s)) {
                            self.dfs_stack
                                .push(NodeFrame::VisitNeighbor { v, w: state.adj });
                        }
                    }
                }
            }
        }
    }

    #[inline]
    fn lower_low_link(&mut self, v: u32, value: u32) {
        let low = &mut self.node_low_link[v as usize];
        *low = (*low).min(value);
    }

    fn setup_next_node(&mut self, v: u32) {
        self.node_index[v as usize] = self.curr_index;
        self.node_low_link[v as usize] = self.curr_index;
        self.curr_index += 1;
        self.tarjan_stack.push(v);
        self.node_on_stack.set(v as usize, true);
    }

    fn build_component(&mut self, v: u32) {
        if self.node_low_link[v as usize] != self.node_index[v as usize] {
            return;
        }
        let top = *self
            .tarjan_stack
            .last()
            .unwrap_or_else(|| panic!("tarjan stack empty while closing node {}", v));
        if top == v {
            self.tarjan_stack.pop();
            self.node_on_stack.set(v as usize, false);
            self.components
                .add_single_unit(v, !self.exclude_single_node_components);
            return;
        }

        let mut component = Vec::new();
        loop {
            let w = self
                .tarjan_stack
                .pop()
                .unwrap_or_else(|| panic!("node {} missing from tarjan stack", v));
            component.push(w);
            self.node_on_stack.set(w as usize, false);
            if w == v {
                break;
            }
        }
        component.shrink_to_fit();
        self.components.add_component(component);
    }
}
