//! Engine configuration.
//!
//! The only tunable with behavioral weight is the write-time offset applied
//! to `InsertedDateTime`. The original deployment stamped records five hours
//! ahead of UTC with inline arithmetic; here it is a named, deployment-wide
//! constant so tests can inject a zero offset.

use chrono::Duration;

/// Default `InsertedDateTime` offset, in hours ahead of UTC.
pub const DEFAULT_INSERTED_TIME_OFFSET_HOURS: i64 = 5;

/// Deployment-wide engine configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Fixed offset added to wall-clock UTC when stamping `InsertedDateTime`.
    ///
    /// This is not per-column configuration; every write in the process uses
    /// the same offset.
    pub inserted_time_offset: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            inserted_time_offset: Duration::hours(DEFAULT_INSERTED_TIME_OFFSET_HOURS),
        }
    }
}

impl EngineConfig {
    /// Configuration with a zero `InsertedDateTime` offset.
    ///
    /// Useful in tests that compare stamped timestamps against `Utc::now()`.
    pub fn zero_offset() -> Self {
        EngineConfig {
            inserted_time_offset: Duration::zero(),
        }
    }

    /// Configuration with an `InsertedDateTime` offset of whole hours.
    pub fn with_offset_hours(hours: i64) -> Self {
        EngineConfig {
            inserted_time_offset: Duration::hours(hours),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_offset_is_five_hours() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.inserted_time_offset, Duration::hours(5));
    }

    #[test]
    fn zero_offset_is_zero() {
        assert_eq!(EngineConfig::zero_offset().inserted_time_offset, Duration::zero());
    }
}
