#![allow(dead_code)]

use ndarray::Array2;

use parallax_core::pair::{RgbImage, StereoPair};

/// Deterministic per-pixel noise in [0, 255], whole-valued.
pub fn noise_value(x: usize, y: usize, channel: usize, seed: u32) -> f32 {
    let mut h = seed
        ^ (x as u32).wrapping_mul(0x9E37_79B9)
        ^ (y as u32).wrapping_mul(0x85EB_CA6B)
        ^ (channel as u32).wrapping_mul(0xC2B2_AE35);
    h ^= h >> 16;
    h = h.wrapping_mul(0x7FEB_352D);
    h ^= h >> 15;
    h = h.wrapping_mul(0x846C_A68B);
    h ^= h >> 16;
    (h % 256) as f32
}

pub fn make_noise_image(rows: usize, cols: usize, seed: u32) -> RgbImage {
    RgbImage::new(
        Array2::from_shape_fn((rows, cols), |(y, x)| noise_value(x, y, 0, seed)),
        Array2::from_shape_fn((rows, cols), |(y, x)| noise_value(x, y, 1, seed)),
        Array2::from_shape_fn((rows, cols), |(y, x)| noise_value(x, y, 2, seed)),
    )
}

/// A textured fronto-parallel pair: every left pixel `(x, y)` matches right
/// pixel `(x - disparity, y)` exactly, and both ground-truth maps carry the
/// constant disparity.
pub fn make_constant_disparity_pair(
    rows: usize,
    cols: usize,
    disparity: u8,
    seed: u32,
) -> StereoPair {
    let d = disparity as usize;
    let base = make_noise_image(rows, cols + d, seed);

    let slice_image = |offset: usize| -> RgbImage {
        RgbImage::new(
            Array2::from_shape_fn((rows, cols), |(y, x)| base.red[[y, x + offset]]),
            Array2::from_shape_fn((rows, cols), |(y, x)| base.green[[y, x + offset]]),
            Array2::from_shape_fn((rows, cols), |(y, x)| base.blue[[y, x + offset]]),
        )
    };
    let left = slice_image(0);
    let right = slice_image(d);

    let truth = Array2::from_elem((rows, cols), disparity);
    StereoPair::new(left, right, truth.clone(), truth, 0, "constant").unwrap()
}

/// A uniform (textureless) pair with constant ground truth.
pub fn make_uniform_pair(rows: usize, cols: usize, value: f32, disparity: u8) -> StereoPair {
    let left = RgbImage::from_elem(rows, cols, value);
    let right = RgbImage::from_elem(rows, cols, value);
    let truth = Array2::from_elem((rows, cols), disparity);
    StereoPair::new(left, right, truth.clone(), truth, 0, "uniform").unwrap()
}

pub fn disparity_map(values: &[u8], rows: usize, cols: usize) -> Array2<u8> {
    Array2::from_shape_vec((rows, cols), values.to_vec()).unwrap()
}
