//! Window-based normalized cross-correlation disparity.
//!
//! A per-scanline matcher: for every interior pixel, a mean-subtracted
//! template from one view is correlated against a horizontal stripe of the
//! other view, restricted to the column range the ground-truth bounds allow,
//! and normalized by the local signal magnitude of the searched image.

use ndarray::{s, Array2};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Result, StereoError};
use crate::kernel::boxfilter::box_filter;
use crate::kernel::color::luma;
use crate::kernel::correlate::correlate_row;
use crate::kernel::stats::argmax_finite;
use crate::pair::{RgbImage, StereoPair};
use crate::solver::DisparitySolver;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NccParams {
    /// Side length of the square match template and of the local-variance
    /// box. Must be odd and positive.
    pub window_size: usize,
}

pub struct NccSolver {
    window_size: usize,
}

impl NccSolver {
    pub fn new(params: NccParams) -> Result<Self> {
        if params.window_size == 0 || params.window_size % 2 == 0 {
            return Err(StereoError::InvalidWindowSize(params.window_size));
        }
        Ok(Self {
            window_size: params.window_size,
        })
    }
}

impl DisparitySolver for NccSolver {
    fn compute(&self, pair: &mut StereoPair) {
        let window = self.window_size;
        let r = window / 2;

        pair.disparity_left = Array2::zeros((pair.rows, pair.cols));
        pair.disparity_right = Array2::zeros((pair.rows, pair.cols));

        info!(
            name = %pair.name,
            rows = pair.rows,
            cols = pair.cols,
            window_size = window,
            "computing NCC disparity"
        );

        let magnitude_left = local_magnitude(&pair.left, window);
        let magnitude_right = local_magnitude(&pair.right, window);

        let row_end = pair.rows.saturating_sub(r);
        let col_end = pair.cols.saturating_sub(r);
        for i in r..row_end {
            if i % 20 == 0 {
                debug!(row = i, "scanline");
            }
            for j in r..col_end {
                let template_left = mean_subtracted_template(&pair.left, i, j, window);
                let template_right = mean_subtracted_template(&pair.right, i, j, window);

                let d_left = disparity_search(
                    &template_left,
                    &pair.right,
                    &magnitude_right,
                    i,
                    j,
                    window,
                    (pair.min_disparity_left, pair.max_disparity_left),
                    true,
                );
                let d_right = disparity_search(
                    &template_right,
                    &pair.left,
                    &magnitude_left,
                    i,
                    j,
                    window,
                    (pair.min_disparity_right, pair.max_disparity_right),
                    false,
                );

                pair.disparity_left[[i, j]] = d_left;
                pair.disparity_right[[i, j]] = d_right;
            }
        }
    }
}

/// Per-channel local standard deviation over a `window x window` box,
/// `sqrt(E[I^2] - E[I]^2)`: the normalization term of the correlation.
fn local_magnitude(image: &RgbImage, window: usize) -> [Array2<f32>; 3] {
    image.planes().map(|plane| {
        let mean_of_sq = box_filter(&(plane * plane), window);
        let mean = box_filter(plane, window);
        let mut std_dev = mean_of_sq - &(&mean * &mean);
        std_dev.mapv_inplace(f32::sqrt);
        std_dev
    })
}

/// `window x window` patch centred at `(i, j)`, per channel, with the
/// per-channel patch mean subtracted.
fn mean_subtracted_template(image: &RgbImage, i: usize, j: usize, window: usize) -> [Array2<f32>; 3] {
    let r = window / 2;
    image.planes().map(|plane| {
        let mut patch = plane.slice(s![i - r..=i + r, j - r..=j + r]).to_owned();
        let mean = (patch.iter().map(|&v| v as f64).sum::<f64>() / patch.len() as f64) as f32;
        patch -= mean;
        patch
    })
}

/// Search the opposite view's scanline stripe for `template` and report the
/// disparity of the best match, or 0 (occlusion) when the clamped search
/// range cannot hold the template or no detection is finite.
///
/// `search_left_of` is true when the template comes from the left view, so
/// its match lies to the LEFT of column `j` in the right image.
#[allow(clippy::too_many_arguments)]
fn disparity_search(
    template: &[Array2<f32>; 3],
    image: &RgbImage,
    magnitude: &[Array2<f32>; 3],
    i: usize,
    j: usize,
    window: usize,
    disparity_range: (i32, i32),
    search_left_of: bool,
) -> u8 {
    let r = window / 2;
    let cols = image.cols() as i32;
    let (min_d, max_d) = disparity_range;

    let (min_j, max_j) = if search_left_of {
        (j as i32 - max_d - r as i32, j as i32 - min_d + r as i32)
    } else {
        (j as i32 + min_d - r as i32, j as i32 + max_d + r as i32)
    };
    let min_j = min_j.clamp(0, cols - 1);
    let max_j = max_j.clamp(0, cols - 1);

    let width = max_j - min_j + 1;
    if width < window as i32 {
        // Search region too small for the template: occlusion.
        return 0;
    }

    let out_w = (width - window as i32 + 1) as usize;
    let stripe_start = min_j as usize;

    let planes = image.planes();
    let mut detections: [Vec<f32>; 3] = Default::default();
    for channel in 0..3 {
        let stripe = planes[channel]
            .slice(s![i - r..=i + r, stripe_start..=max_j as usize])
            .to_owned();
        let correlation = correlate_row(&stripe, &template[channel], r);
        detections[channel] = (0..out_w)
            .map(|k| correlation[k] / magnitude[channel][[i, stripe_start + k]])
            .collect();
    }

    let merged: Vec<f32> = (0..out_w)
        .map(|k| luma(detections[0][k], detections[1][k], detections[2][k]))
        .collect();

    match argmax_finite(&merged) {
        // Every detection divided down to NaN (zero-variance stripe): the
        // pixel has no measurable counterpart.
        None => 0,
        Some(best) => {
            let match_x = best as i32 + min_j + r as i32;
            let d = if search_left_of {
                j as i32 - match_x
            } else {
                match_x - j as i32
            };
            // The window construction keeps d within [0, max_d] <= 255.
            d as u8
        }
    }
}
