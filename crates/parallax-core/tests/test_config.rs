mod common;

use common::make_constant_disparity_pair;
use parallax_core::solver::{GraphCutParams, NccParams, SolverConfig};

#[test]
fn test_graph_cut_params_default_iterations() {
    let params: GraphCutParams =
        serde_json::from_str(r#"{"occlusion_penalty":50,"smoothness_penalty":10}"#).unwrap();
    assert_eq!(params.occlusion_penalty, 50);
    assert_eq!(params.smoothness_penalty, 10);
    assert_eq!(params.num_iters, 2);
}

#[test]
fn test_solver_config_round_trip() {
    let config = SolverConfig::GraphCut(GraphCutParams {
        occlusion_penalty: 25,
        smoothness_penalty: 7,
        num_iters: 3,
    });
    let json = serde_json::to_string(&config).unwrap();
    let back: SolverConfig = serde_json::from_str(&json).unwrap();
    match back {
        SolverConfig::GraphCut(p) => {
            assert_eq!(p.occlusion_penalty, 25);
            assert_eq!(p.smoothness_penalty, 7);
            assert_eq!(p.num_iters, 3);
        }
        other => panic!("expected GraphCut, got {other:?}"),
    }
}

#[test]
fn test_build_rejects_invalid_parameters() {
    let config: SolverConfig = serde_json::from_str(r#"{"Ncc":{"window_size":8}}"#).unwrap();
    assert!(config.build().is_err());

    let config: SolverConfig = serde_json::from_str(
        r#"{"GraphCut":{"occlusion_penalty":-5,"smoothness_penalty":10}}"#,
    )
    .unwrap();
    assert!(config.build().is_err());
}

#[test]
fn test_built_solver_runs() {
    let config = SolverConfig::Ncc(NccParams { window_size: 5 });
    let solver = config.build().unwrap();
    let mut pair = make_constant_disparity_pair(16, 48, 6, 31);
    solver.compute(&mut pair);
    // Interior pixels past the occluded strip recover the constant shift.
    assert_eq!(pair.disparity_left[[8, 30]], 6);
}
