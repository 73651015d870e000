use ndarray::Array2;

use crate::error::{Result, StereoError};
use crate::kernel::resize::{resize_bicubic, resize_bicubic_u8};

/// A three-plane RGB image.
/// Pixel values are f32 on the 0..255 scale, shape = (rows, cols) per plane.
#[derive(Clone, Debug)]
pub struct RgbImage {
    pub red: Array2<f32>,
    pub green: Array2<f32>,
    pub blue: Array2<f32>,
}

impl RgbImage {
    pub fn new(red: Array2<f32>, green: Array2<f32>, blue: Array2<f32>) -> Self {
        Self { red, green, blue }
    }

    /// Uniform gray image, all three channels equal to `value`.
    pub fn from_elem(rows: usize, cols: usize, value: f32) -> Self {
        Self {
            red: Array2::from_elem((rows, cols), value),
            green: Array2::from_elem((rows, cols), value),
            blue: Array2::from_elem((rows, cols), value),
        }
    }

    pub fn rows(&self) -> usize {
        self.red.nrows()
    }

    pub fn cols(&self) -> usize {
        self.red.ncols()
    }

    pub fn planes(&self) -> [&Array2<f32>; 3] {
        [&self.red, &self.green, &self.blue]
    }
}

/// A rectified stereo pair with ground truth and solver outputs.
///
/// Disparity convention, uniform across ground truth and outputs: value 0
/// means occluded/unknown, a positive byte `d` means left pixel `(x, y)`
/// corresponds to right pixel `(x - d, y)`.
#[derive(Clone, Debug)]
pub struct StereoPair {
    pub left: RgbImage,
    pub right: RgbImage,

    pub true_disparity_left: Array2<u8>,
    pub true_disparity_right: Array2<u8>,

    pub disparity_left: Array2<u8>,
    pub disparity_right: Array2<u8>,

    pub rows: usize,
    pub cols: usize,
    pub base_offset: i32,
    pub name: String,

    pub min_disparity_left: i32,
    pub max_disparity_left: i32,
    pub min_disparity_right: i32,
    pub max_disparity_right: i32,
}

impl StereoPair {
    /// Build a pair from two images and their ground-truth disparity maps.
    ///
    /// Ground truth is cross-checked on construction: a pixel whose mapped
    /// counterpart is out of bounds or disagrees by more than two disparity
    /// units is rewritten to 0 (occluded). Search bounds are then derived
    /// from the nonzero entries of each cleaned map.
    pub fn new(
        left: RgbImage,
        right: RgbImage,
        true_disparity_left: Array2<u8>,
        true_disparity_right: Array2<u8>,
        base_offset: i32,
        name: impl Into<String>,
    ) -> Result<Self> {
        let rows = left.rows();
        let cols = left.cols();
        check_dims("right image", rows, cols, right.rows(), right.cols())?;
        check_dims(
            "left ground truth",
            rows,
            cols,
            true_disparity_left.nrows(),
            true_disparity_left.ncols(),
        )?;
        check_dims(
            "right ground truth",
            rows,
            cols,
            true_disparity_right.nrows(),
            true_disparity_right.ncols(),
        )?;

        let mut pair = Self {
            left,
            right,
            true_disparity_left,
            true_disparity_right,
            disparity_left: Array2::zeros((rows, cols)),
            disparity_right: Array2::zeros((rows, cols)),
            rows,
            cols,
            base_offset,
            name: name.into(),
            min_disparity_left: 0,
            max_disparity_left: 0,
            min_disparity_right: 0,
            max_disparity_right: 0,
        };

        pair.cross_check_ground_truth();
        pair.derive_disparity_bounds();
        Ok(pair)
    }

    /// Rewrite ground-truth entries whose counterpart in the other view is
    /// out of bounds or disagrees by more than two disparity units.
    ///
    /// The scan order (rows, then columns, left map checked before right at
    /// each pixel, reading the partially rewritten maps) is part of the
    /// observable behaviour and is kept fixed.
    fn cross_check_ground_truth(&mut self) {
        let cols = self.cols as i32;
        for i in 0..self.rows {
            for j in 0..self.cols {
                let d_left = self.true_disparity_left[[i, j]] as i32;
                let j_right = j as i32 - d_left;
                if !(0..cols).contains(&j_right) {
                    self.true_disparity_left[[i, j]] = 0;
                } else {
                    let twin = self.true_disparity_right[[i, j_right as usize]] as i32;
                    if (twin - d_left).abs() > 2 {
                        self.true_disparity_left[[i, j]] = 0;
                    }
                }

                let d_right = self.true_disparity_right[[i, j]] as i32;
                let j_left = j as i32 + d_right;
                if !(0..cols).contains(&j_left) {
                    self.true_disparity_right[[i, j]] = 0;
                } else {
                    let twin = self.true_disparity_left[[i, j_left as usize]] as i32;
                    if (twin - d_right).abs() > 2 {
                        self.true_disparity_right[[i, j]] = 0;
                    }
                }
            }
        }
    }

    fn derive_disparity_bounds(&mut self) {
        let (min_l, max_l) = nonzero_min_max(&self.true_disparity_left);
        let (min_r, max_r) = nonzero_min_max(&self.true_disparity_right);
        self.min_disparity_left = min_l;
        self.max_disparity_left = max_l;
        self.min_disparity_right = min_r;
        self.max_disparity_right = max_r;
    }

    /// Shrink (or grow) the pair by `scale` using bicubic interpolation.
    ///
    /// Ground-truth disparity values and the search bounds are scaled by the
    /// same factor; solver outputs are reset to all-occluded at the new size.
    pub fn resize(&mut self, scale: f32) {
        let new_rows = (self.rows as f32 * scale).round() as usize;
        let new_cols = (self.cols as f32 * scale).round() as usize;

        self.left = resize_rgb(&self.left, new_rows, new_cols);
        self.right = resize_rgb(&self.right, new_rows, new_cols);

        let scale_u8 = |v: u8| -> u8 {
            let scaled = (v as f32 * scale).round();
            scaled.clamp(0.0, 255.0) as u8
        };
        self.true_disparity_left =
            resize_bicubic_u8(&self.true_disparity_left, new_rows, new_cols).mapv(scale_u8);
        self.true_disparity_right =
            resize_bicubic_u8(&self.true_disparity_right, new_rows, new_cols).mapv(scale_u8);

        self.disparity_left = Array2::zeros((new_rows, new_cols));
        self.disparity_right = Array2::zeros((new_rows, new_cols));

        self.rows = new_rows;
        self.cols = new_cols;
        self.min_disparity_left = (self.min_disparity_left as f32 * scale) as i32;
        self.max_disparity_left = (self.max_disparity_left as f32 * scale) as i32;
        self.min_disparity_right = (self.min_disparity_right as f32 * scale) as i32;
        self.max_disparity_right = (self.max_disparity_right as f32 * scale) as i32;
    }
}

fn check_dims(
    name: &'static str,
    rows: usize,
    cols: usize,
    actual_rows: usize,
    actual_cols: usize,
) -> Result<()> {
    if (actual_rows, actual_cols) != (rows, cols) {
        return Err(StereoError::DimensionMismatch {
            name,
            rows,
            cols,
            actual_rows,
            actual_cols,
        });
    }
    Ok(())
}

/// Min and max over the nonzero entries of a disparity map, (0, 0) if none.
fn nonzero_min_max(map: &Array2<u8>) -> (i32, i32) {
    let mut min = i32::MAX;
    let mut max = 0i32;
    for &v in map.iter() {
        if v != 0 {
            min = min.min(v as i32);
            max = max.max(v as i32);
        }
    }
    if max == 0 {
        (0, 0)
    } else {
        (min, max)
    }
}

fn resize_rgb(image: &RgbImage, rows: usize, cols: usize) -> RgbImage {
    RgbImage {
        red: resize_bicubic(&image.red, rows, cols),
        green: resize_bicubic(&image.green, rows, cols),
        blue: resize_bicubic(&image.blue, rows, cols),
    }
}
