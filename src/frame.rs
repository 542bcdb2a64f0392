/// Frame metadata - carries frame number and timing info
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInfo {
    pub number: u64,
    /// Wall-clock time in milliseconds since the Unix epoch
    pub timestamp_ms: i64,
}

impl FrameInfo {
    pub fn new(number: u64, timestamp_ms: i64) -> Self {
        Self { number, timestamp_ms }
    }
}

/// Source of wall-clock milliseconds
pub trait WallClock {
    fn now_millis(&mut self) -> i64;
}

/// The system clock, via chrono
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl WallClock for SystemClock {
    fn now_millis(&mut self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Any `FnMut() -> i64` works as a clock, which keeps replays deterministic
impl<F: FnMut() -> i64> WallClock for F {
    fn now_millis(&mut self) -> i64 {
        self()
    }
}

/// Infinite iterator that yields frame information
/// Use this in a loop: `for frame in frames { ... }`
pub struct FrameIterator<C: WallClock = SystemClock> {
    clock: C,
    frame_number: u64,
}

impl FrameIterator<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl<C: WallClock> FrameIterator<C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            clock,
            frame_number: 0,
        }
    }

    pub fn frame_number(&self) -> u64 {
        self.frame_number
    }
}

impl Default for FrameIterator<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: WallClock> Iterator for FrameIterator<C> {
    type Item = FrameInfo;

    fn next(&mut self) -> Option<FrameInfo> {
        let info = FrameInfo::new(self.frame_number, self.clock.now_millis());
        self.frame_number += 1;
        Some(info)
    }
}
