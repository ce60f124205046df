//! Compact duration strings (`24h`, `1h30m`, `90s`, `2d`)

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

use crate::{Error, Result};

const UNITS: &[(char, u64)] = &[('d', 86_400), ('h', 3_600), ('m', 60), ('s', 1)];

/// Parse a duration made of `<number><unit>` segments.
///
/// Units are `d`, `h`, `m` and `s`; segments may be combined (`1h30m`).
/// A bare `0` is accepted as zero.
pub fn parse_duration(value: &str) -> Result<Duration> {
    let invalid = |reason: &str| Error::InvalidDuration {
        value: value.to_string(),
        reason: reason.to_string(),
    };

    let text = value.trim();
    if text.is_empty() {
        return Err(invalid("empty duration"));
    }
    if text == "0" {
        return Ok(Duration::ZERO);
    }

    let mut total: u64 = 0;
    let mut digits = String::new();

    for c in text.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
            continue;
        }

        let Some(&(_, scale)) = UNITS.iter().find(|(unit, _)| *unit == c) else {
            return Err(invalid(&format!("unknown unit '{c}'")));
        };
        if digits.is_empty() {
            return Err(invalid(&format!("unit '{c}' has no number")));
        }

        let amount: u64 = digits
            .parse()
            .map_err(|_| invalid("number out of range"))?;
        total = amount
            .checked_mul(scale)
            .and_then(|secs| total.checked_add(secs))
            .ok_or_else(|| invalid("number out of range"))?;
        digits.clear();
    }

    if !digits.is_empty() {
        return Err(invalid("missing unit after number"));
    }

    Ok(Duration::from_secs(total))
}

/// Render a duration in the same notation, using hours as the largest unit.
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs == 0 {
        return "0s".to_string();
    }

    let (h, m, s) = (secs / 3_600, (secs % 3_600) / 60, secs % 60);
    let mut out = String::new();
    if h > 0 {
        out.push_str(&format!("{h}h"));
    }
    if m > 0 {
        out.push_str(&format!("{m}m"));
    }
    if s > 0 {
        out.push_str(&format!("{s}s"));
    }
    out
}

/// A [`Duration`] that (de)serializes as a compact duration string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Interval(pub Duration);

impl Interval {
    pub fn from_hours(hours: u64) -> Self {
        Self(Duration::from_secs(hours * 3_600))
    }

    pub fn as_duration(&self) -> Duration {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl Default for Interval {
    fn default() -> Self {
        Self::from_hours(24)
    }
}

impl FromStr for Interval {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        parse_duration(s).map(Self)
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_duration(self.0))
    }
}

impl Serialize for Interval {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Interval {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}
