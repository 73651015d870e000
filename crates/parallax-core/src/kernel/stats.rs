use ndarray::Array2;

/// Mean and population standard deviation of `map` over the pixels where
/// `mask` is true. Normalization is by N, not N-1. Returns (NaN, NaN) when
/// the mask selects nothing.
pub fn masked_mean_stddev(map: &Array2<u8>, mask: &Array2<bool>) -> (f64, f64) {
    let mut sum = 0.0f64;
    let mut sum_sq = 0.0f64;
    let mut n = 0usize;
    for (&v, &m) in map.iter().zip(mask.iter()) {
        if m {
            let v = v as f64;
            sum += v;
            sum_sq += v * v;
            n += 1;
        }
    }
    let n = n as f64;
    let mean = sum / n;
    let variance = sum_sq / n - mean * mean;
    (mean, variance.max(0.0).sqrt())
}

/// Index of the largest finite value, first occurrence on ties.
/// `None` when every entry is non-finite (or the slice is empty).
pub fn argmax_finite(values: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &v) in values.iter().enumerate() {
        if !v.is_finite() {
            continue;
        }
        match best {
            Some((_, bv)) if v <= bv => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_masked_mean_stddev_hand_values() {
        let map = Array2::from_shape_vec((1, 4), vec![2u8, 4, 6, 200]).unwrap();
        let mask =
            Array2::from_shape_vec((1, 4), vec![true, true, true, false]).unwrap();
        let (mean, stddev) = masked_mean_stddev(&map, &mask);
        assert!((mean - 4.0).abs() < 1e-12);
        // Population stddev of {2, 4, 6} = sqrt(8/3).
        assert!((stddev - (8.0f64 / 3.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_masked_mean_stddev_empty_mask_is_nan() {
        let map = Array2::from_elem((2, 2), 5u8);
        let mask = Array2::from_elem((2, 2), false);
        let (mean, stddev) = masked_mean_stddev(&map, &mask);
        assert!(mean.is_nan());
        assert!(stddev.is_nan());
    }

    #[test]
    fn test_argmax_skips_non_finite() {
        let values = [f32::NAN, 1.0, f32::INFINITY, 3.0, 3.0];
        assert_eq!(argmax_finite(&values), Some(3));
    }

    #[test]
    fn test_argmax_all_nan_is_none() {
        let values = [f32::NAN, f32::NAN];
        assert_eq!(argmax_finite(&values), None);
        assert_eq!(argmax_finite(&[]), None);
    }
}
