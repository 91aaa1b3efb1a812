//! Time types for BRANCHFLOW.
//!
//! The flow engine never reads the wall clock. Deferred work is scheduled
//! against a logical millisecond clock that the host advances explicitly,
//! which keeps navigation deterministic under test.

use serde::{Deserialize, Serialize};

/// Logical time - milliseconds on the engine clock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LogicalTime(u64);

impl LogicalTime {
    /// Create a new logical time at zero
    #[must_use]
    pub const fn zero() -> Self {
        Self(0)
    }

    /// Create from raw milliseconds
    #[must_use]
    pub const fn from_millis(value: u64) -> Self {
        Self(value)
    }

    /// Get raw milliseconds
    #[must_use]
    pub const fn as_millis(&self) -> u64 {
        self.0
    }

    /// Advance by a duration
    pub fn advance(&mut self, by: Duration) {
        self.0 = self.0.saturating_add(by.as_millis());
    }

    /// Time after a duration has elapsed
    #[must_use]
    pub const fn after(&self, by: Duration) -> Self {
        Self(self.0.saturating_add(by.as_millis()))
    }

    /// Duration since an earlier time (zero if `earlier` is later)
    #[must_use]
    pub const fn since(&self, earlier: LogicalTime) -> Duration {
        Duration::from_millis(self.0.saturating_sub(earlier.0))
    }
}

impl Default for LogicalTime {
    fn default() -> Self {
        Self::zero()
    }
}

impl std::fmt::Display for LogicalTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "T{}ms", self.0)
    }
}

/// Duration on the logical clock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Duration(u64);

impl Duration {
    /// Zero duration
    pub const ZERO: Self = Self(0);

    /// Create from milliseconds
    #[must_use]
    pub const fn from_millis(millis: u64) -> Self {
        Self(millis)
    }

    /// Get milliseconds
    #[must_use]
    pub const fn as_millis(&self) -> u64 {
        self.0
    }

    /// Convert to a standard library duration
    #[must_use]
    pub const fn to_std(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.0)
    }
}

impl From<std::time::Duration> for Duration {
    fn from(value: std::time::Duration) -> Self {
        Self(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }
}

impl std::fmt::Display for Duration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logical_time_advance() {
        let mut t = LogicalTime::zero();
        t.advance(Duration::from_millis(1500));
        assert_eq!(t.as_millis(), 1500);
        assert_eq!(t.after(Duration::from_millis(1)), LogicalTime::from_millis(1501));
    }

    #[test]
    fn test_logical_time_saturates() {
        let mut t = LogicalTime::from_millis(u64::MAX - 1);
        t.advance(Duration::from_millis(10));
        assert_eq!(t.as_millis(), u64::MAX);
    }

    #[test]
    fn test_since() {
        let a = LogicalTime::from_millis(100);
        let b = LogicalTime::from_millis(400);
        assert_eq!(b.since(a), Duration::from_millis(300));
        assert_eq!(a.since(b), Duration::ZERO);
    }

    #[test]
    fn test_duration_std_conversion() {
        let d = Duration::from(std::time::Duration::from_secs(2));
        assert_eq!(d.as_millis(), 2000);
        assert_eq!(d.to_std(), std::time::Duration::from_millis(2000));
        assert_eq!(d.to_string(), "2000ms");
    }
}
