//! Timeout value helpers.

use std::fmt;
use std::time::{Duration, Instant};

/// A lock acquisition timeout.
///
/// - negative seconds: wait indefinitely
/// - zero: exactly one attempt
/// - positive: retry until the elapsed wall-clock time reaches the timeout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeoutValue {
    micros: i64, // -1 for infinite
}

impl TimeoutValue {
    pub const INFINITE: Self = Self { micros: -1 };
    pub const ZERO: Self = Self { micros: 0 };

    /// Builds a timeout from floating-point seconds.
    ///
    /// Negative values and NaN mean "wait forever".
    pub fn from_secs_f64(secs: f64) -> Self {
        if secs.is_nan() || secs < 0.0 {
            return Self::INFINITE;
        }
        let micros = (secs * 1_000_000.0).round();
        if micros >= i64::MAX as f64 {
            Self { micros: i64::MAX }
        } else {
            Self {
                micros: micros as i64,
            }
        }
    }

    /// Reconstructs a value previously produced by [`TimeoutValue::as_micros`].
    pub const fn from_micros(micros: i64) -> Self {
        if micros < 0 {
            Self::INFINITE
        } else {
            Self { micros }
        }
    }

    pub fn is_infinite(&self) -> bool {
        self.micros < 0
    }

    pub fn is_zero(&self) -> bool {
        self.micros == 0
    }

    /// Raw microseconds, `-1` for infinite.
    pub const fn as_micros(&self) -> i64 {
        self.micros
    }

    pub fn as_duration(&self) -> Option<Duration> {
        if self.is_infinite() {
            None
        } else {
            Some(Duration::from_micros(self.micros as u64))
        }
    }

    /// Seconds as a float, negative for infinite.
    pub fn as_secs_f64(&self) -> f64 {
        if self.is_infinite() {
            -1.0
        } else {
            self.micros as f64 / 1_000_000.0
        }
    }

    /// Whether a wait that began at `start` has used up this timeout.
    pub fn has_elapsed(&self, start: Instant) -> bool {
        match self.as_duration() {
            None => false,
            Some(limit) => start.elapsed() >= limit,
        }
    }
}

impl Default for TimeoutValue {
    fn default() -> Self {
        Self::INFINITE
    }
}

impl From<Duration> for TimeoutValue {
    fn from(duration: Duration) -> Self {
        Self {
            micros: i64::try_from(duration.as_micros()).unwrap_or(i64::MAX),
        }
    }
}

impl From<Option<Duration>> for TimeoutValue {
    fn from(timeout: Option<Duration>) -> Self {
        match timeout {
            None => Self::INFINITE,
            Some(d) => d.into(),
        }
    }
}

impl From<f64> for TimeoutValue {
    fn from(secs: f64) -> Self {
        Self::from_secs_f64(secs)
    }
}

impl fmt::Display for TimeoutValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_duration() {
            None => f.write_str("infinite"),
            Some(d) => write!(f, "{d:?}"),
        }
    }
}
