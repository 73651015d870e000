//! Boykov-Kolmogorov s-t min-cut on a directed capacitated graph.
//!
//! The graph is an arena of paired arcs (arc `i` and its sister `i ^ 1`).
//! Terminal capacities are stored net per node: a positive value is residual
//! capacity from the source, a negative one is (negated) residual capacity to
//! the sink; the saturated common part is banked into the flow up front.
//!
//! After [`FlowGraph::max_flow`] the minimum cut is read back per node with
//! [`FlowGraph::is_source_side`]: nodes in the source search tree are on the
//! source side, everything else (sink tree and free nodes) on the sink side.

use std::collections::VecDeque;

pub type Capacity = i64;

/// Large finite capacity for constraint arcs. Kept far below `i64::MAX` so
/// that augmentations can never overflow, and never a path bottleneck in
/// practice because terminal capacities are ordinary cost values.
pub const CAP_INF: Capacity = i64::MAX / 4;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Tree {
    Free,
    Source,
    Sink,
}

const PARENT_NONE: usize = usize::MAX;
const PARENT_TERMINAL: usize = usize::MAX - 1;
const PARENT_ORPHAN: usize = usize::MAX - 2;

struct NodeRec {
    tree: Tree,
    /// Arc from this node to its parent, or one of the `PARENT_*` markers.
    parent: usize,
    /// Net terminal residual: > 0 from source, < 0 (negated) to sink.
    terminal: Capacity,
    active: bool,
}

struct ArcRec {
    head: usize,
    rcap: Capacity,
}

pub struct FlowGraph {
    nodes: Vec<NodeRec>,
    arcs: Vec<ArcRec>,
    adjacency: Vec<Vec<usize>>,
    flow: Capacity,
    active: VecDeque<usize>,
    orphans: VecDeque<usize>,
}

impl FlowGraph {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            arcs: Vec::new(),
            adjacency: Vec::new(),
            flow: 0,
            active: VecDeque::new(),
            orphans: VecDeque::new(),
        }
    }

    pub fn add_node(&mut self) -> usize {
        self.nodes.push(NodeRec {
            tree: Tree::Free,
            parent: PARENT_NONE,
            terminal: 0,
            active: false,
        });
        self.adjacency.push(Vec::new());
        self.nodes.len() - 1
    }

    /// Add a directed arc pair between `u` and `v` with the given residual
    /// capacities in each direction.
    pub fn add_edge(&mut self, u: usize, v: usize, cap_uv: Capacity, cap_vu: Capacity) {
        let a = self.arcs.len();
        self.arcs.push(ArcRec { head: v, rcap: cap_uv });
        self.arcs.push(ArcRec { head: u, rcap: cap_vu });
        self.adjacency[u].push(a);
        self.adjacency[v].push(a + 1);
    }

    /// Connect `v` to the terminals: capacity `source_cap` on the s-edge and
    /// `sink_cap` on the t-edge. The common part is saturated immediately.
    pub fn add_terminal(&mut self, v: usize, source_cap: Capacity, sink_cap: Capacity) {
        self.flow += source_cap.min(sink_cap);
        self.nodes[v].terminal += source_cap - sink_cap;
    }

    /// True when `v` ended on the source side of the minimum cut.
    /// Only meaningful after [`Self::max_flow`].
    pub fn is_source_side(&self, v: usize) -> bool {
        self.nodes[v].tree == Tree::Source
    }

    pub fn max_flow(&mut self) -> Capacity {
        for v in 0..self.nodes.len() {
            match self.nodes[v].terminal {
                t if t > 0 => {
                    self.nodes[v].tree = Tree::Source;
                    self.nodes[v].parent = PARENT_TERMINAL;
                    self.push_active(v);
                }
                t if t < 0 => {
                    self.nodes[v].tree = Tree::Sink;
                    self.nodes[v].parent = PARENT_TERMINAL;
                    self.push_active(v);
                }
                _ => {}
            }
        }

        'grow: while let Some(p) = self.pop_active() {
            let tree = self.nodes[p].tree;
            if tree == Tree::Free {
                continue;
            }
            for idx in 0..self.adjacency[p].len() {
                let a = self.adjacency[p][idx];
                let residual_ok = match tree {
                    Tree::Source => self.arcs[a].rcap > 0,
                    Tree::Sink => self.arcs[a ^ 1].rcap > 0,
                    Tree::Free => unreachable!(),
                };
                if !residual_ok {
                    continue;
                }
                let q = self.arcs[a].head;
                match self.nodes[q].tree {
                    Tree::Free => {
                        self.nodes[q].tree = tree;
                        self.nodes[q].parent = a ^ 1;
                        self.push_active(q);
                    }
                    t if t == tree => {}
                    _ => {
                        // The trees touch: augment along s -> ... -> p -> q
                        // -> ... -> t (or the mirror image), then repair the
                        // search forests and rescan p.
                        let connecting = if tree == Tree::Source { a } else { a ^ 1 };
                        self.augment(connecting);
                        self.adopt_orphans();
                        self.push_active(p);
                        continue 'grow;
                    }
                }
            }
        }

        self.flow
    }

    fn push_active(&mut self, v: usize) {
        if !self.nodes[v].active {
            self.nodes[v].active = true;
            self.active.push_back(v);
        }
    }

    fn pop_active(&mut self) -> Option<usize> {
        let v = self.active.pop_front()?;
        self.nodes[v].active = false;
        Some(v)
    }

    fn make_orphan(&mut self, v: usize) {
        self.nodes[v].parent = PARENT_ORPHAN;
        self.orphans.push_back(v);
    }

    /// Push the path bottleneck through `connecting`, an arc whose tail is in
    /// the source tree and whose head is in the sink tree.
    fn augment(&mut self, connecting: usize) {
        let src_end = self.arcs[connecting ^ 1].head;
        let snk_end = self.arcs[connecting].head;

        // Bottleneck over the connecting arc and both root paths.
        let mut bottleneck = self.arcs[connecting].rcap;
        let mut n = src_end;
        loop {
            let pa = self.nodes[n].parent;
            if pa == PARENT_TERMINAL {
                bottleneck = bottleneck.min(self.nodes[n].terminal);
                break;
            }
            bottleneck = bottleneck.min(self.arcs[pa ^ 1].rcap);
            n = self.arcs[pa].head;
        }
        let mut n = snk_end;
        loop {
            let pa = self.nodes[n].parent;
            if pa == PARENT_TERMINAL {
                bottleneck = bottleneck.min(-self.nodes[n].terminal);
                break;
            }
            bottleneck = bottleneck.min(self.arcs[pa].rcap);
            n = self.arcs[pa].head;
        }

        // Push it; saturated parent arcs orphan their child.
        self.arcs[connecting].rcap -= bottleneck;
        self.arcs[connecting ^ 1].rcap += bottleneck;

        let mut n = src_end;
        loop {
            let pa = self.nodes[n].parent;
            if pa == PARENT_TERMINAL {
                self.nodes[n].terminal -= bottleneck;
                if self.nodes[n].terminal == 0 {
                    self.make_orphan(n);
                }
                break;
            }
            self.arcs[pa ^ 1].rcap -= bottleneck;
            self.arcs[pa].rcap += bottleneck;
            if self.arcs[pa ^ 1].rcap == 0 {
                self.make_orphan(n);
            }
            n = self.arcs[pa].head;
        }
        let mut n = snk_end;
        loop {
            let pa = self.nodes[n].parent;
            if pa == PARENT_TERMINAL {
                self.nodes[n].terminal += bottleneck;
                if self.nodes[n].terminal == 0 {
                    self.make_orphan(n);
                }
                break;
            }
            self.arcs[pa].rcap -= bottleneck;
            self.arcs[pa ^ 1].rcap += bottleneck;
            if self.arcs[pa].rcap == 0 {
                self.make_orphan(n);
            }
            n = self.arcs[pa].head;
        }

        self.flow += bottleneck;
    }

    /// Residual check for `q` adopting a child in tree `tree` through arc `a`
    /// (an arc from the child to `q`): flow runs parent-to-child in the
    /// source tree and child-to-parent in the sink tree.
    fn parent_link_open(&self, tree: Tree, a: usize) -> bool {
        match tree {
            Tree::Source => self.arcs[a ^ 1].rcap > 0,
            Tree::Sink => self.arcs[a].rcap > 0,
            Tree::Free => false,
        }
    }

    fn has_root_path(&self, start: usize) -> bool {
        let mut n = start;
        loop {
            match self.nodes[n].parent {
                PARENT_TERMINAL => return true,
                PARENT_NONE | PARENT_ORPHAN => return false,
                pa => n = self.arcs[pa].head,
            }
        }
    }

    fn adopt_orphans(&mut self) {
        while let Some(p) = self.orphans.pop_front() {
            let tree = self.nodes[p].tree;

            let mut new_parent = PARENT_NONE;
            for idx in 0..self.adjacency[p].len() {
                let a = self.adjacency[p][idx];
                let q = self.arcs[a].head;
                if self.nodes[q].tree != tree || !self.parent_link_open(tree, a) {
                    continue;
                }
                if self.has_root_path(q) {
                    new_parent = a;
                    break;
                }
            }

            if new_parent != PARENT_NONE {
                self.nodes[p].parent = new_parent;
                continue;
            }

            // No valid parent: p leaves the tree. Neighbours that could
            // re-adopt it become active, children become orphans themselves.
            for idx in 0..self.adjacency[p].len() {
                let a = self.adjacency[p][idx];
                let q = self.arcs[a].head;
                if self.nodes[q].tree != tree {
                    continue;
                }
                if self.parent_link_open(tree, a) {
                    self.push_active(q);
                }
                if self.nodes[q].parent == (a ^ 1) {
                    self.make_orphan(q);
                }
            }
            self.nodes[p].tree = Tree::Free;
            self.nodes[p].parent = PARENT_NONE;
        }
    }
}

impl Default for FlowGraph {
    fn default() -> Self {
        Self::new()
    }
}
