use std::f64::consts::TAU;
use cube_scene::animation::{
    light_sample_at, LIGHT_AMPLITUDE, LIGHT_FREQUENCY, LIGHT_X_CENTER, MAX_INTENSITY,
};

#[cfg(test)]
mod light_path_tests {
    use super::*;

    fn times() -> impl Iterator<Item = f64> {
        (0..5_000).map(|i| i as f64 * 0.037)
    }

    #[test]
    fn test_intensity_stays_within_bounds() {
        for t in times() {
            let sample = light_sample_at(t);
            assert!(sample.intensity >= 0.2 - 1e-6, "t = {t}: {}", sample.intensity);
            assert!(sample.intensity <= MAX_INTENSITY + 1e-6, "t = {t}: {}", sample.intensity);
        }
    }

    #[test]
    fn test_path_repeats_every_period() {
        let period = TAU / LIGHT_FREQUENCY;
        for t in times().take(200) {
            let a = light_sample_at(t);
            let b = light_sample_at(t + period);
            assert!((a.x - b.x).abs() < 1e-3);
            assert!((a.z - b.z).abs() < 1e-3);
            assert!((a.intensity - b.intensity).abs() < 1e-4);
        }
    }

    #[test]
    fn test_path_stays_near_its_centre() {
        // x offset is at most A, z offset at most A*sqrt(2)
        let bound = LIGHT_AMPLITUDE * (1.0 + 2f32.sqrt()) + 1e-3;
        for t in times() {
            let sample = light_sample_at(t);
            let dx = sample.x - LIGHT_X_CENTER;
            assert!(dx.abs() <= LIGHT_AMPLITUDE + 1e-3);
            assert!((dx * dx + sample.z * sample.z).sqrt() <= bound);
        }
    }

    #[test]
    fn test_intensity_tracks_x_offset() {
        for t in times().take(500) {
            let sample = light_sample_at(t);
            let expected = ((sample.x - LIGHT_X_CENTER) * 0.08).abs() + 0.2;
            assert!((sample.intensity - expected).abs() < 1e-4);
        }
    }

    #[test]
    fn test_epoch_timestamps_keep_precision() {
        // Two frames 16ms apart in 2026 must still place the light differently
        let a = cube_scene::animation::light_sample(1_790_000_000_000);
        let b = cube_scene::animation::light_sample(1_790_000_000_016);
        assert_ne!(a, b);
    }
}
