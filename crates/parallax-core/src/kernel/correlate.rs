use ndarray::Array2;

/// 2D correlation of `src` with a small `kernel` (correlation, not
/// convolution: the kernel is not flipped). The anchor is the kernel centre,
/// the output has the size of `src`, and samples outside `src` read as zero.
pub fn correlate2d(src: &Array2<f32>, kernel: &Array2<f32>) -> Array2<f32> {
    let (h, w) = src.dim();
    let mut out = Array2::<f32>::zeros((h, w));
    for row in 0..h {
        let line = correlate_row(src, kernel, row);
        for (col, v) in line.into_iter().enumerate() {
            out[[row, col]] = v;
        }
    }
    out
}

/// One output row of [`correlate2d`], which is all a scanline search needs.
pub fn correlate_row(src: &Array2<f32>, kernel: &Array2<f32>, row: usize) -> Vec<f32> {
    let (h, w) = src.dim();
    let (kh, kw) = kernel.dim();
    let anchor_r = (kh / 2) as isize;
    let anchor_c = (kw / 2) as isize;

    let mut out = vec![0.0f32; w];
    for (col, slot) in out.iter_mut().enumerate() {
        let mut sum = 0.0f32;
        for ky in 0..kh {
            let r = row as isize + ky as isize - anchor_r;
            if r < 0 || r >= h as isize {
                continue;
            }
            for kx in 0..kw {
                let c = col as isize + kx as isize - anchor_c;
                if c < 0 || c >= w as isize {
                    continue;
                }
                sum += src[[r as usize, c as usize]] * kernel[[ky, kx]];
            }
        }
        *slot = sum;
    }
    out
}
