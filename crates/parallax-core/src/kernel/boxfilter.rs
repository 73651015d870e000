use ndarray::Array2;

/// Normalized box filter: mean over a `size x size` window.
///
/// Borders are extended with constant zero and the normalization constant is
/// `size * size` everywhere, so window positions hanging over the edge are
/// averaged against the zero padding rather than a shrunken window.
pub fn box_filter(data: &Array2<f32>, size: usize) -> Array2<f32> {
    let radius = (size / 2) as isize;
    let (h, w) = data.dim();

    // Separable sum: rows first, then columns.
    let mut row_sums = Array2::<f32>::zeros((h, w));
    for row in 0..h {
        for col in 0..w {
            let mut sum = 0.0f32;
            for k in -radius..=radius {
                let c = col as isize + k;
                if c >= 0 && c < w as isize {
                    sum += data[[row, c as usize]];
                }
            }
            row_sums[[row, col]] = sum;
        }
    }

    // True division, not a reciprocal multiply: flat windows must come out
    // as an exact mean so their variance is exactly zero.
    let area = (size * size) as f32;
    let mut result = Array2::<f32>::zeros((h, w));
    for row in 0..h {
        for col in 0..w {
            let mut sum = 0.0f32;
            for k in -radius..=radius {
                let r = row as isize + k;
                if r >= 0 && r < h as isize {
                    sum += row_sums[[r as usize, col]];
                }
            }
            result[[row, col]] = sum / area;
        }
    }
    result
}
