use std::time::{Duration, Instant};

pub const FPS_UPDATE_INTERVAL: Duration = Duration::from_secs(1);

/// What the overlay shows
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FpsReading {
    pub fps: f32,
    /// Duration of the last bracketed frame
    pub frame_ms: f32,
}

/// Frame-rate meter: bracket each frame with `begin`/`end`.
///
/// Frames per second are recomputed once per `FPS_UPDATE_INTERVAL`, so the
/// readout stays legible instead of flickering every frame.
#[derive(Debug)]
pub struct FpsMeter {
    frame_start: Option<Instant>,
    window_start: Instant,
    frames: u32,
    reading: FpsReading,
}

impl FpsMeter {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    pub fn starting_at(now: Instant) -> Self {
        Self {
            frame_start: None,
            window_start: now,
            frames: 0,
            reading: FpsReading::default(),
        }
    }

    pub fn begin(&mut self) {
        self.begin_at(Instant::now());
    }

    pub fn end(&mut self) -> FpsReading {
        self.end_at(Instant::now())
    }

    pub fn begin_at(&mut self, now: Instant) {
        self.frame_start = Some(now);
    }

    /// Close the current frame. An `end` without `begin` still counts the frame.
    pub fn end_at(&mut self, now: Instant) -> FpsReading {
        if let Some(start) = self.frame_start.take() {
            self.reading.frame_ms = now.saturating_duration_since(start).as_secs_f32() * 1000.0;
        }
        self.frames += 1;

        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed >= FPS_UPDATE_INTERVAL {
            self.reading.fps = self.frames as f32 / elapsed.as_secs_f32();
            log::debug!("FPS: {:.1} ({:.2} ms)", self.reading.fps, self.reading.frame_ms);
            self.frames = 0;
            self.window_start = now;
        }

        self.reading
    }

    pub fn reading(&self) -> FpsReading {
        self.reading
    }
}

impl Default for FpsMeter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meter_reports_frame_time() {
        let start = Instant::now();
        let mut meter = FpsMeter::starting_at(start);

        meter.begin_at(start);
        let reading = meter.end_at(start + Duration::from_millis(4));

        assert!((reading.frame_ms - 4.0).abs() < 0.01);
        // Not a full interval yet
        assert_eq!(reading.fps, 0.0);
    }

    #[test]
    fn test_meter_updates_fps_once_per_interval() {
        let start = Instant::now();
        let mut meter = FpsMeter::starting_at(start);

        for i in 1..=60u64 {
            let t = start + Duration::from_micros(i * 16_667);
            meter.begin_at(t);
            meter.end_at(t + Duration::from_millis(2));
        }

        let fps = meter.reading().fps;
        assert!(fps > 58.0 && fps < 61.0, "fps = {fps}");
    }

    #[test]
    fn test_end_without_begin_keeps_previous_frame_time() {
        let start = Instant::now();
        let mut meter = FpsMeter::starting_at(start);
        meter.begin_at(start);
        meter.end_at(start + Duration::from_millis(3));

        let reading = meter.end_at(start + Duration::from_millis(10));
        assert!((reading.frame_ms - 3.0).abs() < 0.01);
    }
}
