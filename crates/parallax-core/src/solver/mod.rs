pub mod graphcut;
pub mod maxflow;
pub mod ncc;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::pair::StereoPair;

pub use graphcut::{GraphCutParams, GraphCutSolver};
pub use ncc::{NccParams, NccSolver};

/// A disparity solver transforms a stereo pair in place: it takes exclusive
/// mutable access and writes `disparity_left` / `disparity_right`. Occlusion
/// is a normal outcome (value 0), never an error.
pub trait DisparitySolver {
    fn compute(&self, pair: &mut StereoPair);
}

/// Solver selection plus parameters, as carried by configuration files.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum SolverConfig {
    Ncc(NccParams),
    GraphCut(GraphCutParams),
}

impl SolverConfig {
    /// Validate the parameters and build the selected solver.
    pub fn build(&self) -> Result<Box<dyn DisparitySolver>> {
        match self {
            SolverConfig::Ncc(params) => Ok(Box::new(NccSolver::new(params.clone())?)),
            SolverConfig::GraphCut(params) => Ok(Box::new(GraphCutSolver::new(params.clone())?)),
        }
    }
}
