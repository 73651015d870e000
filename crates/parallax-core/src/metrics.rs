//! Occlusion-aware scoring of a computed disparity map against ground truth.
//!
//! All metrics take the ground-truth map first and the candidate second.
//! Pixels valued 0 are occluded; the unoccluded family of metrics restricts
//! itself to the pixels nonzero in both maps. Degenerate inputs (no mutually
//! unoccluded pixels, zero spread) produce non-finite values, emitted
//! verbatim for the scoring pipeline to handle downstream.

use ndarray::Array2;

use crate::kernel::stats::masked_mean_stddev;

/// Absolute-difference threshold of the whole-image bad-match rate.
pub const BAD_MATCH_THRESHOLD: i32 = 5;

/// Occlusion classification counts, with "occluded" as the positive class.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OcclusionConfusion {
    /// Unoccluded in both maps.
    pub true_negatives: usize,
    /// Unoccluded in ground truth, occluded in the candidate.
    pub false_positives: usize,
    /// Occluded in ground truth, unoccluded in the candidate.
    pub false_negatives: usize,
    /// Occluded in both maps.
    pub true_positives: usize,
}

impl OcclusionConfusion {
    pub fn total(&self) -> usize {
        self.true_negatives + self.false_positives + self.false_negatives + self.true_positives
    }
}

/// Mask of pixels unoccluded in both maps.
fn unoccluded_mask(gold: &Array2<u8>, guess: &Array2<u8>) -> Array2<bool> {
    let mut mask = Array2::from_elem(gold.dim(), false);
    for ((m, &g), &h) in mask.iter_mut().zip(gold.iter()).zip(guess.iter()) {
        *m = g != 0 && h != 0;
    }
    mask
}

/// `(guess - gold)` residuals over the mutually unoccluded set, and its size.
fn unoccluded_residuals(gold: &Array2<u8>, guess: &Array2<u8>) -> (Vec<f64>, usize) {
    let mut residuals = Vec::new();
    for (&g, &h) in gold.iter().zip(guess.iter()) {
        if g != 0 && h != 0 {
            residuals.push(h as f64 - g as f64);
        }
    }
    let n = residuals.len();
    (residuals, n)
}

/// RMSE in disparity units over the mutually unoccluded pixels.
pub fn rms_error_unoccluded(gold: &Array2<u8>, guess: &Array2<u8>) -> f64 {
    let (residuals, n) = unoccluded_residuals(gold, guess);
    let sum_sq: f64 = residuals.iter().map(|d| d * d).sum();
    sum_sq.sqrt() / (n as f64).sqrt()
}

/// Fraction of mutually unoccluded pixels off by more than `thresh`.
pub fn bad_matching_unoccluded(gold: &Array2<u8>, guess: &Array2<u8>, thresh: i32) -> f64 {
    let (residuals, n) = unoccluded_residuals(gold, guess);
    let bad = residuals.iter().filter(|d| d.abs() > thresh as f64).count();
    bad as f64 / n as f64
}

/// Mean signed error over the mutually unoccluded pixels.
pub fn bias_unoccluded(gold: &Array2<u8>, guess: &Array2<u8>) -> f64 {
    let (residuals, n) = unoccluded_residuals(gold, guess);
    residuals.iter().sum::<f64>() / n as f64
}

/// Correlation coefficient over the mutually unoccluded pixels.
///
/// The means and standard deviations are N-normalized while the denominator
/// scales by `n - 1`; this historical normalization is kept exactly so that
/// recorded scores stay reproducible.
pub fn correlation_unoccluded(gold: &Array2<u8>, guess: &Array2<u8>) -> f64 {
    let mask = unoccluded_mask(gold, guess);
    let n = mask.iter().filter(|&&m| m).count() as f64;

    let (gold_mean, gold_std) = masked_mean_stddev(gold, &mask);
    let (guess_mean, guess_std) = masked_mean_stddev(guess, &mask);

    let mut product_sum = 0.0f64;
    for ((&m, &g), &h) in mask.iter().zip(gold.iter()).zip(guess.iter()) {
        if m {
            product_sum += g as f64 * h as f64;
        }
    }

    let num = product_sum - n * guess_mean * gold_mean;
    let denom = (n - 1.0) * guess_std * gold_std;
    num / denom
}

/// R² over the mutually unoccluded pixels, with the total sum of squares
/// taken around the ground-truth mean on that same set.
pub fn r_squared_unoccluded(gold: &Array2<u8>, guess: &Array2<u8>) -> f64 {
    let mut gold_sum = 0.0f64;
    let mut n = 0usize;
    for (&g, &h) in gold.iter().zip(guess.iter()) {
        if g != 0 && h != 0 {
            gold_sum += g as f64;
            n += 1;
        }
    }
    let mean = gold_sum / n as f64;

    let mut ss_res = 0.0f64;
    let mut ss_tot = 0.0f64;
    for (&g, &h) in gold.iter().zip(guess.iter()) {
        if g != 0 && h != 0 {
            let g = g as f64;
            ss_res += (h as f64 - g) * (h as f64 - g);
            ss_tot += (g - mean) * (g - mean);
        }
    }
    1.0 - ss_res / ss_tot
}

/// RMSE over every pixel, occlusions included.
pub fn rms_error_all(gold: &Array2<u8>, guess: &Array2<u8>) -> f64 {
    let total = gold.len();
    let sum_sq: f64 = gold
        .iter()
        .zip(guess.iter())
        .map(|(&g, &h)| {
            let d = g as f64 - h as f64;
            d * d
        })
        .sum();
    sum_sq.sqrt() / (total as f64).sqrt()
}

/// Fraction of all pixels off by more than [`BAD_MATCH_THRESHOLD`].
pub fn bad_matching_all(gold: &Array2<u8>, guess: &Array2<u8>) -> f64 {
    let total = gold.len();
    let bad = gold
        .iter()
        .zip(guess.iter())
        .filter(|&(&g, &h)| (g as i32 - h as i32).abs() > BAD_MATCH_THRESHOLD)
        .count();
    bad as f64 / total as f64
}

/// Occlusion confusion counts; the four fields sum to the pixel count.
pub fn occlusion_confusion_matrix(gold: &Array2<u8>, guess: &Array2<u8>) -> OcclusionConfusion {
    let mut counts = OcclusionConfusion {
        true_negatives: 0,
        false_positives: 0,
        false_negatives: 0,
        true_positives: 0,
    };
    for (&g, &h) in gold.iter().zip(guess.iter()) {
        match (g == 0, h == 0) {
            (false, false) => counts.true_negatives += 1,
            (false, true) => counts.false_positives += 1,
            (true, false) => counts.false_negatives += 1,
            (true, true) => counts.true_positives += 1,
        }
    }
    counts
}
