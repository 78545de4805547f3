use rand::Rng;
use std::time::Duration;

/// Courtesy pause taken before following a pagination control
pub trait PaginationDelay {
    fn next_delay(&mut self) -> Duration;
}

/// Uniformly random pause within `[min, max]`
#[derive(Debug, Clone, Copy)]
pub struct JitterDelay {
    min: Duration,
    max: Duration,
}

impl JitterDelay {
    /// Bounds are swapped if given in the wrong order
    pub fn new(min: Duration, max: Duration) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    pub fn from_millis(min_ms: u64, max_ms: u64) -> Self {
        Self::new(Duration::from_millis(min_ms), Duration::from_millis(max_ms))
    }
}

impl Default for JitterDelay {
    fn default() -> Self {
        Self::new(Duration::from_secs(2), Duration::from_secs(5))
    }
}

impl PaginationDelay for JitterDelay {
    fn next_delay(&mut self) -> Duration {
        let mut rng = rand::thread_rng();
        let micros = rng.gen_range(self.min.as_micros()..=self.max.as_micros());
        Duration::from_micros(micros as u64)
    }
}

/// No pause at all, for tests and local fixtures
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelay;

impl PaginationDelay for NoDelay {
    fn next_delay(&mut self) -> Duration {
        Duration::ZERO
    }
}
