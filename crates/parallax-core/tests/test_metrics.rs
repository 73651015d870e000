mod common;

use common::disparity_map;
use parallax_core::metrics::{
    bad_matching_all, bad_matching_unoccluded, bias_unoccluded, correlation_unoccluded,
    occlusion_confusion_matrix, r_squared_unoccluded, rms_error_all, rms_error_unoccluded,
    OcclusionConfusion,
};

const TOLERANCE: f64 = 1e-12;

fn assert_close(actual: f64, expected: f64, what: &str) {
    assert!(
        (actual - expected).abs() < TOLERANCE,
        "{what}: expected {expected}, got {actual}"
    );
}

// ---------------------------------------------------------------------------
// Hand-computed five-pixel fixture
// ---------------------------------------------------------------------------
//
// gold  = [10, 20, 0, 30, 0]
// guess = [12, 20, 5,  0, 0]
//
// Mutually unoccluded set U = {0, 1}, residuals (guess - gold) = [2, 0].

#[test]
fn test_rms_error_unoccluded_hand_value() {
    let gold = disparity_map(&[10, 20, 0, 30, 0], 1, 5);
    let guess = disparity_map(&[12, 20, 5, 0, 0], 1, 5);
    assert_close(
        rms_error_unoccluded(&gold, &guess),
        (4.0f64 / 2.0).sqrt(),
        "rmse",
    );
}

#[test]
fn test_bad_matching_unoccluded_hand_values() {
    let gold = disparity_map(&[10, 20, 0, 30, 0], 1, 5);
    let guess = disparity_map(&[12, 20, 5, 0, 0], 1, 5);
    assert_close(bad_matching_unoccluded(&gold, &guess, 1), 0.5, "thresh 1");
    assert_close(bad_matching_unoccluded(&gold, &guess, 3), 0.0, "thresh 3");
    // Strict comparison: a residual of exactly the threshold is not bad.
    assert_close(bad_matching_unoccluded(&gold, &guess, 2), 0.0, "thresh 2");
}

#[test]
fn test_bias_unoccluded_hand_value() {
    let gold = disparity_map(&[10, 20, 0, 30, 0], 1, 5);
    let guess = disparity_map(&[12, 20, 5, 0, 0], 1, 5);
    assert_close(bias_unoccluded(&gold, &guess), 1.0, "bias");
}

#[test]
fn test_correlation_unoccluded_hand_value() {
    let gold = disparity_map(&[10, 20, 0, 30, 0], 1, 5);
    let guess = disparity_map(&[12, 20, 5, 0, 0], 1, 5);
    // mu_G = 15, mu_H = 16, sigma_G = 5, sigma_H = 4 (N-normalized);
    // num = 10*12 + 20*20 - 2*15*16 = 40, denom = (2-1)*5*4 = 20.
    assert_close(correlation_unoccluded(&gold, &guess), 2.0, "correlation");
}

#[test]
fn test_r_squared_unoccluded_hand_value() {
    let gold = disparity_map(&[10, 20, 0, 30, 0], 1, 5);
    let guess = disparity_map(&[12, 20, 5, 0, 0], 1, 5);
    // ss_res = 4, ss_tot = (10-15)^2 + (20-15)^2 = 50.
    assert_close(r_squared_unoccluded(&gold, &guess), 1.0 - 4.0 / 50.0, "r2");
}

#[test]
fn test_rms_error_all_hand_value() {
    let gold = disparity_map(&[10, 20, 0, 30, 0], 1, 5);
    let guess = disparity_map(&[12, 20, 5, 0, 0], 1, 5);
    // Squared differences: 4 + 0 + 25 + 900 + 0 = 929 over 5 pixels.
    assert_close(rms_error_all(&gold, &guess), (929.0f64 / 5.0).sqrt(), "rmse all");
}

#[test]
fn test_bad_matching_all_hand_value() {
    let gold = disparity_map(&[10, 20, 0, 30, 0], 1, 5);
    let guess = disparity_map(&[12, 20, 5, 0, 0], 1, 5);
    // Only |30 - 0| exceeds the fixed threshold of 5 (|0 - 5| does not).
    assert_close(bad_matching_all(&gold, &guess), 0.2, "bad all");
}

#[test]
fn test_confusion_matrix_hand_counts() {
    let gold = disparity_map(&[10, 20, 0, 30, 0], 1, 5);
    let guess = disparity_map(&[12, 20, 5, 0, 0], 1, 5);
    let counts = occlusion_confusion_matrix(&gold, &guess);
    assert_eq!(
        counts,
        OcclusionConfusion {
            true_negatives: 2,
            false_positives: 1,
            false_negatives: 1,
            true_positives: 1,
        }
    );
    assert_eq!(counts.total(), 5);
}

// ---------------------------------------------------------------------------
// Laws
// ---------------------------------------------------------------------------

#[test]
fn test_unoccluded_metrics_are_translation_invariant() {
    let gold = disparity_map(&[10, 20, 0, 30, 14, 9], 2, 3);
    let guess = disparity_map(&[12, 20, 5, 0, 11, 13], 2, 3);
    let shift = |map: &ndarray::Array2<u8>| map.mapv(|v| if v == 0 { 0 } else { v + 7 });
    let gold_shifted = shift(&gold);
    let guess_shifted = shift(&guess);

    assert_close(
        rms_error_unoccluded(&gold_shifted, &guess_shifted),
        rms_error_unoccluded(&gold, &guess),
        "rmse shift",
    );
    assert_close(
        bad_matching_unoccluded(&gold_shifted, &guess_shifted, 2),
        bad_matching_unoccluded(&gold, &guess, 2),
        "bad shift",
    );
    assert_close(
        bias_unoccluded(&gold_shifted, &guess_shifted),
        bias_unoccluded(&gold, &guess),
        "bias shift",
    );
    assert!(
        (correlation_unoccluded(&gold_shifted, &guess_shifted)
            - correlation_unoccluded(&gold, &guess))
        .abs()
            < 1e-9,
        "correlation shift"
    );
    assert!(
        (r_squared_unoccluded(&gold_shifted, &guess_shifted)
            - r_squared_unoccluded(&gold, &guess))
        .abs()
            < 1e-9,
        "r2 shift"
    );
}

#[test]
fn test_confusion_counts_cover_every_pixel() {
    let gold = disparity_map(&[0, 1, 2, 0, 5, 0, 7, 8, 0, 10, 0, 12], 3, 4);
    let guess = disparity_map(&[1, 0, 2, 0, 0, 6, 7, 0, 9, 10, 0, 12], 3, 4);
    let counts = occlusion_confusion_matrix(&gold, &guess);
    assert_eq!(counts.total(), 12);
}

// ---------------------------------------------------------------------------
// Degenerate inputs
// ---------------------------------------------------------------------------

#[test]
fn test_no_overlap_yields_non_finite() {
    let gold = disparity_map(&[5, 0], 1, 2);
    let guess = disparity_map(&[0, 5], 1, 2);
    assert!(rms_error_unoccluded(&gold, &guess).is_nan());
    assert!(bias_unoccluded(&gold, &guess).is_nan());
    assert!(bad_matching_unoccluded(&gold, &guess, 1).is_nan());
}

#[test]
fn test_zero_spread_correlation_is_non_finite() {
    let gold = disparity_map(&[10, 10], 1, 2);
    let guess = disparity_map(&[12, 13], 1, 2);
    assert!(!correlation_unoccluded(&gold, &guess).is_finite());
}
