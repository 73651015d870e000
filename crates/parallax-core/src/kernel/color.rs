/// Rec. 601 luma from RGB components (the standard BGR2GRAY weighting).
pub fn luma(red: f32, green: f32, blue: f32) -> f32 {
    0.299 * red + 0.587 * green + 0.114 * blue
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_luma_weights() {
        assert!((luma(255.0, 0.0, 0.0) - 76.245).abs() < 1e-3);
        assert!((luma(0.0, 255.0, 0.0) - 149.685).abs() < 1e-3);
        assert!((luma(0.0, 0.0, 255.0) - 29.07).abs() < 1e-3);
        assert!((luma(100.0, 100.0, 100.0) - 100.0).abs() < 1e-3);
    }
}
