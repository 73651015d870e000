use ndarray::Array2;

/// Sharpness parameter of the Keys cubic kernel (OpenCV's INTER_CUBIC value).
const CUBIC_A: f32 = -0.75;

fn cubic_weight(t: f32) -> f32 {
    let t = t.abs();
    if t <= 1.0 {
        ((CUBIC_A + 2.0) * t - (CUBIC_A + 3.0)) * t * t + 1.0
    } else if t < 2.0 {
        (((t - 5.0) * t + 8.0) * t - 4.0) * CUBIC_A
    } else {
        0.0
    }
}

/// Bicubic resample to `new_rows x new_cols`.
///
/// Destination pixels map to source coordinates through the pixel-centre
/// convention `src = (dst + 0.5) / scale - 0.5`; source taps outside the
/// image clamp to the nearest edge pixel.
pub fn resize_bicubic(data: &Array2<f32>, new_rows: usize, new_cols: usize) -> Array2<f32> {
    let (h, w) = data.dim();
    if new_rows == 0 || new_cols == 0 || h == 0 || w == 0 {
        return Array2::zeros((new_rows, new_cols));
    }

    let scale_y = h as f32 / new_rows as f32;
    let scale_x = w as f32 / new_cols as f32;

    let mut out = Array2::<f32>::zeros((new_rows, new_cols));
    for row in 0..new_rows {
        let src_y = (row as f32 + 0.5) * scale_y - 0.5;
        let y0 = src_y.floor() as isize;
        let fy = src_y - y0 as f32;
        let wy = [
            cubic_weight(1.0 + fy),
            cubic_weight(fy),
            cubic_weight(1.0 - fy),
            cubic_weight(2.0 - fy),
        ];

        for col in 0..new_cols {
            let src_x = (col as f32 + 0.5) * scale_x - 0.5;
            let x0 = src_x.floor() as isize;
            let fx = src_x - x0 as f32;
            let wx = [
                cubic_weight(1.0 + fx),
                cubic_weight(fx),
                cubic_weight(1.0 - fx),
                cubic_weight(2.0 - fx),
            ];

            let mut acc = 0.0f32;
            for (dy, &weight_y) in wy.iter().enumerate() {
                let r = (y0 + dy as isize - 1).clamp(0, h as isize - 1) as usize;
                for (dx, &weight_x) in wx.iter().enumerate() {
                    let c = (x0 + dx as isize - 1).clamp(0, w as isize - 1) as usize;
                    acc += data[[r, c]] * weight_y * weight_x;
                }
            }
            out[[row, col]] = acc;
        }
    }
    out
}

/// Bicubic resample of an 8-bit map, rounding and saturating the result.
pub fn resize_bicubic_u8(data: &Array2<u8>, new_rows: usize, new_cols: usize) -> Array2<u8> {
    let as_f32 = data.mapv(|v| v as f32);
    resize_bicubic(&as_f32, new_rows, new_cols).mapv(|v| v.round().clamp(0.0, 255.0) as u8)
}
