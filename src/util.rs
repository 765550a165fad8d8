//! Shared utilities

use std::collections::VecDeque;
use std::time::Instant;

/// HSV to RGB color conversion
/// h: 0-360, s: 0-1, v: 0-1
pub fn hsv_to_rgb(h: f32, s: f32, v: f32) -> (u8, u8, u8) {
    let c = v * s;
    let h_prime = h / 60.0;
    let x = c * (1.0 - ((h_prime % 2.0) - 1.0).abs());
    let m = v - c;

    let (r1, g1, b1) = match h_prime as i32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    (
        ((r1 + m) * 255.0) as u8,
        ((g1 + m) * 255.0) as u8,
        ((b1 + m) * 255.0) as u8,
    )
}

/// Rainbow palette of `size` entries
pub fn make_palette(size: usize) -> Vec<(u8, u8, u8)> {
    (0..size)
        .map(|i| {
            let t = i as f32 / size as f32;
            hsv_to_rgb(t * 360.0, 0.8, 0.9)
        })
        .collect()
}

// ============================================================================
// Frame Timing
// ============================================================================

/// Frame time tracker with a rolling window
pub struct FpsCounter {
    frame_times: VecDeque<f32>,
    last_frame: Instant,
    sample_count: usize,
}

impl FpsCounter {
    pub fn new(sample_count: usize) -> Self {
        Self {
            frame_times: VecDeque::with_capacity(sample_count),
            last_frame: Instant::now(),
            sample_count,
        }
    }

    /// Record the time since the previous call
    /// Returns (delta_time, average_fps)
    pub fn tick(&mut self) -> (f32, f32) {
        let now = Instant::now();
        let dt = (now - self.last_frame).as_secs_f32();
        self.last_frame = now;
        self.record(dt);

        let avg_dt = self.avg_frame_time_ms() / 1000.0;
        let avg_fps = if avg_dt > 0.0 { 1.0 / avg_dt } else { 0.0 };
        (dt, avg_fps)
    }

    /// Add a measured duration in seconds to the window
    pub fn record(&mut self, dt: f32) {
        self.frame_times.push_back(dt);
        if self.frame_times.len() > self.sample_count {
            self.frame_times.pop_front();
        }
    }

    /// Average of the window in milliseconds
    pub fn avg_frame_time_ms(&self) -> f32 {
        let avg_dt: f32 =
            self.frame_times.iter().sum::<f32>() / self.frame_times.len().max(1) as f32;
        avg_dt * 1000.0
    }

    /// Slowest sample in the window in milliseconds
    pub fn max_frame_time_ms(&self) -> f32 {
        self.frame_times.iter().copied().fold(0.0, f32::max) * 1000.0
    }

    pub fn sample_count(&self) -> usize {
        self.frame_times.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hsv_primaries() {
        assert_eq!(hsv_to_rgb(0.0, 1.0, 1.0), (255, 0, 0));
        assert_eq!(hsv_to_rgb(120.0, 1.0, 1.0), (0, 255, 0));
        assert_eq!(hsv_to_rgb(240.0, 1.0, 1.0), (0, 0, 255));
    }

    #[test]
    fn test_window_is_bounded() {
        let mut fps = FpsCounter::new(3);
        for dt in [0.010, 0.020, 0.030, 0.040] {
            fps.record(dt);
        }
        assert_eq!(fps.sample_count(), 3);
        assert!((fps.avg_frame_time_ms() - 30.0).abs() < 0.01);
        assert!((fps.max_frame_time_ms() - 40.0).abs() < 0.01);
    }

    #[test]
    fn test_empty_window() {
        let fps = FpsCounter::new(10);
        assert!(fps.avg_frame_time_ms().abs() < f32::EPSILON);
        assert!(fps.max_frame_time_ms().abs() < f32::EPSILON);
    }
}
