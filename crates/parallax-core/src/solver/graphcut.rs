//! Graph-cut disparity via iterated α-expansion.
//!
//! Disparity is solved as a global labelling over pixel correspondences with
//! explicit occlusion, smoothness and uniqueness terms. Each α-expansion
//! decides keep-or-flip for the currently active correspondences plus all
//! candidates at disparity α by a single s-t min-cut; sweeping α over the
//! admissible range and repeating the sweep drives the energy down.
//!
//! A correspondence `(x, y, d)` links left pixel `(x, y)` to right pixel
//! `(x - d, y)`, `d` positive. Stored disparity bytes are the magnitude `d`,
//! with 0 meaning occluded.

use std::collections::HashMap;

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Result, StereoError};
use crate::pair::StereoPair;
use crate::solver::maxflow::{Capacity, FlowGraph, CAP_INF};
use crate::solver::DisparitySolver;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GraphCutParams {
    /// Penalty per occluded pixel (the C_p of the energy).
    pub occlusion_penalty: i32,
    /// Penalty per broken same-disparity neighbour pair (the V of the energy).
    pub smoothness_penalty: i32,
    /// Number of full α sweeps. Two passes already give good results.
    #[serde(default = "default_num_iters")]
    pub num_iters: usize,
}

fn default_num_iters() -> usize {
    2
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Correspondence {
    x: i32,
    y: i32,
    d: i32,
}

/// 4-connected neighbourhood, same disparity.
const NEIGHBOR_OFFSETS: [(i32, i32); 4] = [(0, -1), (0, 1), (1, 0), (-1, 0)];

pub struct GraphCutSolver {
    c_p: Capacity,
    v_smooth: Capacity,
    num_iters: usize,
}

impl GraphCutSolver {
    pub fn new(params: GraphCutParams) -> Result<Self> {
        if params.occlusion_penalty < 0 {
            return Err(StereoError::NegativePenalty {
                name: "occlusion_penalty",
                value: params.occlusion_penalty,
            });
        }
        if params.smoothness_penalty < 0 {
            return Err(StereoError::NegativePenalty {
                name: "smoothness_penalty",
                value: params.smoothness_penalty,
            });
        }
        if params.num_iters == 0 {
            return Err(StereoError::InvalidIterationCount);
        }
        Ok(Self {
            c_p: params.occlusion_penalty as Capacity,
            v_smooth: params.smoothness_penalty as Capacity,
            num_iters: params.num_iters,
        })
    }
}

impl DisparitySolver for GraphCutSolver {
    fn compute(&self, pair: &mut StereoPair) {
        pair.disparity_left = Array2::zeros((pair.rows, pair.cols));
        pair.disparity_right = Array2::zeros((pair.rows, pair.cols));

        let d_min = (pair.min_disparity_left.min(pair.min_disparity_right) - 2).max(1);
        let d_max = (pair.max_disparity_left.max(pair.max_disparity_right) + 2).min(255);

        info!(
            name = %pair.name,
            d_min,
            d_max,
            num_iters = self.num_iters,
            "computing graph-cut disparity"
        );

        // An empty disparity interval leaves the sweep with nothing to do;
        // the all-occluded initial state is the completed result.
        let rows = pair.rows;
        let cols = pair.cols;
        let mut run = GraphCutRun {
            pair,
            c_p: self.c_p,
            v_smooth: self.v_smooth,
            d_min,
            d_max,
            left_occlusion_count: Array2::zeros((rows, cols)),
            right_occlusion_count: Array2::zeros((rows, cols)),
            graph: FlowGraph::new(),
            index: HashMap::new(),
        };

        for iteration in 0..self.num_iters {
            let improved = run.run_iteration();
            info!(iteration, improved, "alpha sweep finished");
        }
    }
}

/// Per-`compute` working state: the pair under exclusive access, the
/// occlusion-count buffers reused across moves, and the per-move flow graph.
struct GraphCutRun<'a> {
    pair: &'a mut StereoPair,
    c_p: Capacity,
    v_smooth: Capacity,
    d_min: i32,
    d_max: i32,
    left_occlusion_count: Array2<u32>,
    right_occlusion_count: Array2<u32>,
    graph: FlowGraph,
    index: HashMap<i64, usize>,
}

impl GraphCutRun<'_> {
    fn run_iteration(&mut self) -> bool {
        let mut improved = false;
        for alpha in self.d_min..=self.d_max {
            let changed = self.run_expansion(alpha);
            debug!(alpha, changed, "alpha-expansion");
            improved = changed || improved;
        }
        improved
    }

    /// One α-expansion: build the move graph, cut it, apply the labelling.
    /// Returns true when any correspondence flipped.
    fn run_expansion(&mut self, alpha: i32) -> bool {
        self.graph = FlowGraph::new();
        self.index.clear();
        self.left_occlusion_count.fill(0);
        self.right_occlusion_count.fill(0);

        let actives = self.collect_active(alpha);
        let candidates = self.collect_alpha_candidates(alpha);

        for &c in actives.iter().chain(candidates.iter()) {
            self.left_occlusion_count[[c.y as usize, c.x as usize]] += 1;
            self.right_occlusion_count[[c.y as usize, (c.x - c.d) as usize]] += 1;
        }

        // Active nodes: cutting towards the source deactivates them (pay the
        // occlusion factor), towards the sink keeps them (pay data plus the
        // smoothness owed to frozen inactive neighbours).
        for &c in &actives {
            let node = self.graph.add_node();
            self.index.insert(self.key(c), node);
            let source_w = self.occlusion_cost(c);
            let sink_w =
                self.data_cost(c) + self.v_smooth * self.inactive_neighbor_count(c, alpha);
            self.graph.add_terminal(node, source_w, sink_w);
        }

        // α-candidate nodes: sink side activates them (pay data), source
        // side leaves them unassigned (pay the occlusion factor).
        for &c in &candidates {
            let node = self.graph.add_node();
            self.index.insert(self.key(c), node);
            let source_w = self.data_cost(c);
            let sink_w = self.occlusion_cost(c);
            self.graph.add_terminal(node, source_w, sink_w);
        }

        // Uniqueness: an active correspondence may not survive alongside an
        // α-candidate claiming one of its pixels.
        for &c in &actives {
            for conflict in self.conflicts(c, alpha) {
                let (u, v) = (self.node(c), self.node(conflict));
                self.graph.add_edge(u, v, CAP_INF, self.c_p);
            }
        }

        // Smoothness between considered same-disparity neighbours, one edge
        // pair per unordered pair (deduplicated by key order).
        for &c in actives.iter().chain(candidates.iter()) {
            for neighbor in self.valid_neighbors(c, alpha) {
                if self.key(c) > self.key(neighbor) {
                    let (u, v) = (self.node(c), self.node(neighbor));
                    self.graph.add_edge(u, v, self.v_smooth, self.v_smooth);
                }
            }
        }

        self.graph.max_flow();
        self.apply_cut(alpha, &actives, &candidates)
    }

    /// Read the cut back into the disparity maps. Deactivations are written
    /// before activations so a replacement claiming a freed pixel wins.
    fn apply_cut(
        &mut self,
        alpha: i32,
        actives: &[Correspondence],
        candidates: &[Correspondence],
    ) -> bool {
        let mut changed = false;
        for &c in actives {
            if self.graph.is_source_side(self.node(c)) {
                continue; // still active
            }
            changed = true;
            self.pair.disparity_left[[c.y as usize, c.x as usize]] = 0;
            self.pair.disparity_right[[c.y as usize, (c.x - c.d) as usize]] = 0;
        }
        for &c in candidates {
            let was_active = self.is_active(c);
            let now_active = !self.graph.is_source_side(self.node(c));
            if was_active != now_active {
                changed = true;
                let value = if now_active { alpha as u8 } else { 0 };
                self.pair.disparity_left[[c.y as usize, c.x as usize]] = value;
                self.pair.disparity_right[[c.y as usize, (c.x - c.d) as usize]] = value;
            }
        }
        changed
    }

    /// Currently active correspondences with a disparity other than α.
    fn collect_active(&self, alpha: i32) -> Vec<Correspondence> {
        let mut out = Vec::new();
        for y in 0..self.pair.rows {
            for x in 0..self.pair.cols {
                let d = self.pair.disparity_left[[y, x]] as i32;
                if d != 0 && d != alpha {
                    out.push(Correspondence {
                        x: x as i32,
                        y: y as i32,
                        d,
                    });
                }
            }
        }
        out
    }

    /// All in-bounds correspondences at disparity α (including ones that are
    /// already active at α).
    fn collect_alpha_candidates(&self, alpha: i32) -> Vec<Correspondence> {
        let mut out = Vec::new();
        for y in 0..self.pair.rows {
            for x in 0..self.pair.cols {
                let c = Correspondence {
                    x: x as i32,
                    y: y as i32,
                    d: alpha,
                };
                if self.within_bounds(c) {
                    out.push(c);
                }
            }
        }
        out
    }

    fn is_active(&self, c: Correspondence) -> bool {
        self.pair.disparity_left[[c.y as usize, c.x as usize]] as i32 == c.d
    }

    /// Both endpoints inside the image pair.
    fn within_bounds(&self, c: Correspondence) -> bool {
        c.x >= 0
            && c.y >= 0
            && (c.x as usize) < self.pair.cols
            && (c.y as usize) < self.pair.rows
            && c.x - c.d >= 0
            && ((c.x - c.d) as usize) < self.pair.cols
    }

    /// In bounds and part of this move's node set.
    fn is_valid(&self, c: Correspondence, alpha: i32) -> bool {
        self.within_bounds(c) && (self.is_active(c) || c.d == alpha)
    }

    /// Compound key identifying a correspondence; injective over the
    /// admissible `(x, y, d)` range and rebuilt into a fresh node index
    /// every move.
    fn key(&self, c: Correspondence) -> i64 {
        let range = (self.d_max - self.d_min + 1) as i64;
        (c.x as i64 * self.pair.rows as i64 + c.y as i64) * range + (c.d - self.d_min) as i64
    }

    fn node(&self, c: Correspondence) -> usize {
        self.index[&self.key(c)]
    }

    /// Squared colour error of the match, truncated to an integer weight.
    fn data_cost(&self, c: Correspondence) -> Capacity {
        let y = c.y as usize;
        let xl = c.x as usize;
        let xr = (c.x - c.d) as usize;
        let dr = (self.pair.left.red[[y, xl]] - self.pair.right.red[[y, xr]]) as f64;
        let dg = (self.pair.left.green[[y, xl]] - self.pair.right.green[[y, xr]]) as f64;
        let db = (self.pair.left.blue[[y, xl]] - self.pair.right.blue[[y, xr]]) as f64;
        let norm = (dr * dr + dg * dg + db * db).sqrt() as Capacity;
        norm * norm
    }

    /// C_p per touched pixel that this correspondence alone keeps unoccluded.
    fn occlusion_cost(&self, c: Correspondence) -> Capacity {
        let mut count = 0;
        if self.left_occlusion_count[[c.y as usize, c.x as usize]] == 1 {
            count += 1;
        }
        if self.right_occlusion_count[[c.y as usize, (c.x - c.d) as usize]] == 1 {
            count += 1;
        }
        self.c_p * count
    }

    /// Same-disparity 4-neighbours that are in bounds but not part of this
    /// move: they stay inactive whatever the cut does, so an active node
    /// pre-pays the smoothness owed to them.
    fn inactive_neighbor_count(&self, c: Correspondence, alpha: i32) -> Capacity {
        NEIGHBOR_OFFSETS
            .iter()
            .filter(|&&(dx, dy)| {
                let n = Correspondence {
                    x: c.x + dx,
                    y: c.y + dy,
                    d: c.d,
                };
                self.within_bounds(n) && !self.is_valid(n, alpha)
            })
            .count() as Capacity
    }

    /// Same-disparity 4-neighbours inside this move's node set.
    fn valid_neighbors(&self, c: Correspondence, alpha: i32) -> Vec<Correspondence> {
        NEIGHBOR_OFFSETS
            .iter()
            .map(|&(dx, dy)| Correspondence {
                x: c.x + dx,
                y: c.y + dy,
                d: c.d,
            })
            .filter(|&n| self.is_valid(n, alpha))
            .collect()
    }

    /// α-candidates sharing the left pixel or the right pixel with an active
    /// correspondence `c` (d ≠ α).
    fn conflicts(&self, c: Correspondence, alpha: i32) -> Vec<Correspondence> {
        let mut out = Vec::new();
        let shared_left = Correspondence {
            x: c.x,
            y: c.y,
            d: alpha,
        };
        if self.is_valid(shared_left, alpha) {
            out.push(shared_left);
        }
        let shared_right = Correspondence {
            x: c.x - c.d + alpha,
            y: c.y,
            d: alpha,
        };
        if self.is_valid(shared_right, alpha) {
            out.push(shared_right);
        }
        out
    }
}
