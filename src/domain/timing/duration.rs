//! Duration value object

use std::fmt;
use std::str::FromStr;
use std::time::Duration as StdDuration;

use crate::domain::error::DurationParseError;

/// Default time allowed for a freshly launched ASR service to come up
pub const DEFAULT_STARTUP_TIMEOUT_SECS: u64 = 120;

/// Default delay between readiness probes
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 2;

/// Human-friendly duration used for service timeouts and poll intervals.
/// Parsed from strings like "30s", "2m" or "1m30s". Never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Duration {
    milliseconds: u64,
}

impl Duration {
    /// Create a Duration from milliseconds
    pub const fn from_millis(ms: u64) -> Self {
        Self { milliseconds: ms }
    }

    /// Create a Duration from seconds
    pub const fn from_secs(secs: u64) -> Self {
        Self {
            milliseconds: secs * 1000,
        }
    }

    pub const fn default_startup_timeout() -> Self {
        Self::from_secs(DEFAULT_STARTUP_TIMEOUT_SECS)
    }

    pub const fn default_poll_interval() -> Self {
        Self::from_secs(DEFAULT_POLL_INTERVAL_SECS)
    }

    /// Get duration in whole seconds
    pub const fn as_secs(&self) -> u64 {
        self.milliseconds / 1000
    }

    /// Get duration in milliseconds
    pub const fn as_millis(&self) -> u64 {
        self.milliseconds
    }

    /// Convert to std::time::Duration
    pub const fn as_std(&self) -> StdDuration {
        StdDuration::from_millis(self.milliseconds)
    }
}

impl FromStr for Duration {
    type Err = DurationParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim().to_lowercase();
        let invalid = || DurationParseError {
            input: s.to_string(),
        };

        let mut minutes: u64 = 0;
        let mut seconds: u64 = 0;
        let mut current_num = String::new();
        let mut seen_minutes = false;
        let mut seen_seconds = false;

        for ch in input.chars() {
            match ch {
                '0'..='9' => current_num.push(ch),
                // minutes must come before seconds and each unit appears once
                'm' if !current_num.is_empty() && !seen_minutes && !seen_seconds => {
                    minutes = current_num.parse().map_err(|_| invalid())?;
                    current_num.clear();
                    seen_minutes = true;
                }
                's' if !current_num.is_empty() && !seen_seconds => {
                    seconds = current_num.parse().map_err(|_| invalid())?;
                    current_num.clear();
                    seen_seconds = true;
                }
                _ => return Err(invalid()),
            }
        }

        if !current_num.is_empty() || !(seen_minutes || seen_seconds) {
            return Err(invalid());
        }

        let total_ms = minutes
            .checked_mul(60)
            .and_then(|m| m.checked_add(seconds))
            .and_then(|s| s.checked_mul(1000))
            .ok_or_else(invalid)?;

        if total_ms == 0 {
            return Err(invalid());
        }

        Ok(Self {
            milliseconds: total_ms,
        })
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total_secs = self.as_secs();
        let minutes = total_secs / 60;
        let seconds = total_secs % 60;

        if minutes == 0 {
            write!(f, "{}s", seconds)
        } else if seconds == 0 {
            write!(f, "{}m", minutes)
        } else {
            write!(f, "{}m{}s", minutes, seconds)
        }
    }
}

impl From<Duration> for StdDuration {
    fn from(d: Duration) -> Self {
        d.as_std()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_seconds_only() {
        let d: Duration = "30s".parse().unwrap();
        assert_eq!(d.as_secs(), 30);
        assert_eq!(d.as_millis(), 30000);
    }

    #[test]
    fn parse_minutes_and_seconds() {
        let d: Duration = "1m30s".parse().unwrap();
        assert_eq!(d.as_secs(), 90);
    }

    #[test]
    fn parse_is_case_and_whitespace_insensitive() {
        let d: Duration = "  2M  ".parse().unwrap();
        assert_eq!(d.as_secs(), 120);
    }

    #[test]
    fn parse_rejects_zero_and_garbage() {
        assert!("".parse::<Duration>().is_err());
        assert!("0s".parse::<Duration>().is_err());
        assert!("30".parse::<Duration>().is_err());
        assert!("soon".parse::<Duration>().is_err());
    }

    #[test]
    fn parse_rejects_out_of_order_units() {
        assert!("30s1m".parse::<Duration>().is_err());
        assert!("1m2m".parse::<Duration>().is_err());
    }

    #[test]
    fn display_round_trips_common_values() {
        assert_eq!(Duration::from_secs(2).to_string(), "2s");
        assert_eq!(Duration::from_secs(120).to_string(), "2m");
        assert_eq!(Duration::from_secs(150).to_string(), "2m30s");
    }

    #[test]
    fn defaults() {
        assert_eq!(Duration::default_startup_timeout().as_secs(), 120);
        assert_eq!(Duration::default_poll_interval().as_std(), StdDuration::from_secs(2));
    }
}
