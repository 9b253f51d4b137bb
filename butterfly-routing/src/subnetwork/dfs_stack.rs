//! Explicit DFS stacks for the iterative Tarjan searches
//!
//! Each pending step of the search is a small tagged frame. Frames are packed
//! into plain integers so pushing one per traversed edge never allocates:
//!
//! - node search: one `u64` holding two `i32` halves `(low, high)`; zero and
//!   sign of the halves select the frame kind
//! - edge-key search: a `u64` holding `(p, q)` plus a parallel `i32` stack
//!   holding the node operand, negative values mark frames without a node
//!
//! An entry that decodes to no known frame means the stack is corrupt, which
//! is a bug, so decoding panics.

#[inline]
fn combine(low: i32, high: i32) -> u64 {
    ((high as u32 as u64) << 32) | (low as u32 as u64)
}

#[inline]
fn split(value: u64) -> (i32, i32) {
    (value as u32 as i32, (value >> 32) as u32 as i32)
}

#[inline]
fn operand(value: u32) -> i32 {
    assert!(value < i32::MAX as u32, "id {} too large for the DFS stack", value);
    value as i32
}

/// Pending step of the node-based search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NodeFrame {
    /// Assign `v` its index and push its neighbors
    EnterNode(u32),
    /// Look at neighbor `w` of `v`
    VisitNeighbor { v: u32, w: u32 },
    /// `w` is finished, fold its low-link into `v`
    PropagateLowLink { v: u32, w: u32 },
    /// All neighbors of `v` are done, close its component if it is a root
    CloseComponent(u32),
}

impl NodeFrame {
    pub(crate) fn encode(self) -> u64 {
        match self {
            NodeFrame::VisitNeighbor { v, w } => combine(operand(v) + 1, operand(w) + 1),
            NodeFrame::PropagateLowLink { v, w } => combine(operand(v) + 1, -(operand(w) + 1)),
            NodeFrame::CloseComponent(v) => combine(0, operand(v) + 1),
            NodeFrame::EnterNode(v) => combine(operand(v) + 1, 0),
        }
    }

    pub(crate) fn decode(entry: u64) -> NodeFrame {
        let (low, high) = split(entry);
        if low > 0 && high > 0 {
            NodeFrame::VisitNeighbor {
                v: (low - 1) as u32,
                w: (high - 1) as u32,
            }
        } else if low > 0 && high < 0 {
            NodeFrame::PropagateLowLink {
                v: (low - 1) as u32,
                w: (-high - 1) as u32,
            }
        } else if low == 0 && high > 0 {
            NodeFrame::CloseComponent((high - 1) as u32)
        } else if low > 0 && high == 0 {
            NodeFrame::EnterNode((low - 1) as u32)
        } else {
            panic!("corrupt node DFS stack entry {:#018x}", entry);
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct NodeDfsStack {
    entries: Vec<u64>,
}

impl NodeDfsStack {
    #[inline]
    pub(crate) fn push(&mut self, frame: NodeFrame) {
        self.entries.push(frame.encode());
    }

    #[inline]
    pub(crate) fn pop(&mut self) -> Option<NodeFrame> {
        self.entries.pop().map(NodeFrame::decode)
    }
}

/// Pending step of the edge-key search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EdgeFrame {
    /// Assign key `p` its index and expand it at `node`, where `p` ends
    FindComponent { p: u32, node: u32 },
    /// Look at continuation `q` of `p`; `node` is where `q` ends
    HandleNeighbor { p: u32, q: u32, node: u32 },
    /// `q` is finished, fold its low-link into `p`
    UpdateLowLink { p: u32, q: u32 },
    /// All continuations of `p` are done
    BuildComponent(u32),
}

const NO_NODE: i32 = -1;
const BUILD_MARKER: i32 = -2;

impl EdgeFrame {
    pub(crate) fn encode(self) -> (u64, i32) {
        match self {
            EdgeFrame::UpdateLowLink { p, q } => (combine(operand(p), operand(q)), NO_NODE),
            EdgeFrame::BuildComponent(p) => (combine(operand(p), BUILD_MARKER), BUILD_MARKER),
            EdgeFrame::FindComponent { p, node } => (combine(operand(p), NO_NODE), operand(node)),
            EdgeFrame::HandleNeighbor { p, q, node } => {
                (combine(operand(p), operand(q)), operand(node))
            }
        }
    }

    pub(crate) fn decode(pq: u64, node: i32) -> EdgeFrame {
        let (low, high) = split(pq);
        if low < 0 {
            panic!("corrupt edge DFS stack entry {:#018x}/{}", pq, node);
        }
        if node == NO_NODE && high >= 0 {
            EdgeFrame::UpdateLowLink {
                p: low as u32,
                q: high as u32,
            }
        } else if node == BUILD_MARKER && high == BUILD_MARKER {
            EdgeFrame::BuildComponent(low as u32)
        } else if high == NO_NODE && node >= 0 {
            EdgeFrame::FindComponent {
                p: low as u32,
                node: node as u32,
            }
        } else if high >= 0 && node >= 0 {
            EdgeFrame::HandleNeighbor {
                p: low as u32,
                q: high as u32,
                node: node as u32,
            }
        } else {
            panic!("corrupt edge DFS stack entry {:#018x}/{}", pq, node);
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct EdgeDfsStack {
    pq: Vec<u64>,
    nodes: Vec<i32>,
}

impl EdgeDfsStack {
    #[inline]
    pub(crate) fn push(&mut self, frame: EdgeFrame) {
        let (pq, node) = frame.encode();
        self.pq.push(pq);
        self.nodes.push(node);
    }

    #[inline]
    pub(crate) fn pop(&mut self) -> Option<EdgeFrame> {
        match (self.pq.pop(), self.nodes.pop()) {
            (Some(pq), Some(node)) => Some(EdgeFrame::decode(pq, node)),
            (None, None) => None,
            _ => panic!("edge DFS stacks out of sync"),
        }
    }
}
