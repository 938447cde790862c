//! Wall-clock time-of-day arithmetic for alarm matching.
//!
//! Alarms fire at minute granularity: seconds never enter a comparison, so
//! a given `ClockTime` matches the wall clock for exactly one minute per day.

use anyhow::{Result, bail};
use chrono::{DateTime, TimeZone, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An hour:minute pair with no date component, persisted as `"HH:MM"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClockTime {
    hour: u32,
    minute: u32,
}

impl ClockTime {
    pub fn new(hour: u32, minute: u32) -> Result<Self> {
        if hour > 23 {
            bail!("hour out of range: {hour}");
        }
        if minute > 59 {
            bail!("minute out of range: {minute}");
        }
        Ok(Self { hour, minute })
    }

    /// Parse `"HH:MM"` (leading zeros optional).
    pub fn parse(s: &str) -> Result<Self> {
        let (h, m) = s
            .split_once(':')
            .ok_or_else(|| anyhow::anyhow!("invalid clock time '{s}': expected HH:MM"))?;
        let hour: u32 = h
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("invalid hour in '{s}'"))?;
        let minute: u32 = m
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("invalid minute in '{s}'"))?;
        Self::new(hour, minute)
    }

    /// The current minute of a zoned wall-clock instant. Seconds are dropped.
    pub fn from_datetime<Tz: TimeZone>(dt: &DateTime<Tz>) -> Self {
        Self {
            hour: dt.hour(),
            minute: dt.minute(),
        }
    }

    /// Add minutes, wrapping at midnight (`23:55 + 10 == 00:05`).
    pub fn plus_minutes(self, minutes: u32) -> Self {
        let total = (self.hour * 60 + self.minute + minutes) % (24 * 60);
        Self {
            hour: total / 60,
            minute: total % 60,
        }
    }

    pub fn hour(&self) -> u32 {
        self.hour
    }

    pub fn minute(&self) -> u32 {
        self.minute
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl TryFrom<String> for ClockTime {
    type Error = anyhow::Error;

    fn try_from(s: String) -> Result<Self> {
        Self::parse(&s)
    }
}

impl From<ClockTime> for String {
    fn from(t: ClockTime) -> String {
        t.to_string()
    }
}
