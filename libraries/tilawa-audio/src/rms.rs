//! RMS loudness estimate over byte frequency bins

/// Root mean square of byte frequency bins scaled into [0.0, 1.0]
///
/// Each bin is divided by 255 before squaring, so all-zero bins give
/// 0.0 and all-saturated bins give 1.0. An empty slice gives 0.0.
pub fn rms_level(bins: &[u8]) -> f32 {
    if bins.is_empty() {
        return 0.0;
    }

    let sum_of_squares: f32 = bins
        .iter()
        .map(|&bin| {
            let value = f32::from(bin) / 255.0;
            value * value
        })
        .sum();

    (sum_of_squares / bins.len() as f32).sqrt()
}
