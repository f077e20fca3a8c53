/// Seconds <-> display/input conversions shared by every view of the timeline
use serde::{Deserialize, Serialize};

use crate::{EditError, Result, Seconds};

/// Format seconds as `M:SS` (whole minutes, whole seconds, no hours).
///
/// Panics on negative, NaN or infinite input: callers clamp before formatting.
pub fn to_display(seconds: Seconds) -> String {
    assert!(
        seconds.is_finite() && seconds >= 0.0,
        "to_display called with unclamped time {seconds}"
    );
    let whole = seconds.floor() as u64;
    format!("{}:{:02}", whole / 60, whole % 60)
}

/// Parse the `M:SS` form produced by [`to_display`] back into seconds.
pub fn parse_display(text: &str) -> Result<Seconds> {
    let (minutes, seconds) = text
        .trim()
        .split_once(':')
        .ok_or_else(|| EditError::InvalidTimeInput(format!("expected M:SS, got {text:?}")))?;
    let minutes = minutes
        .parse::<u64>()
        .map_err(|_| EditError::InvalidTimeInput(format!("invalid minutes in {text:?}")))?;
    let seconds = seconds
        .parse::<u64>()
        .map_err(|_| EditError::InvalidTimeInput(format!("invalid seconds in {text:?}")))?;
    if seconds >= 60 {
        return Err(EditError::InvalidTimeInput(format!(
            "seconds must be < 60 in {text:?}"
        )));
    }
    let total = minutes
        .checked_mul(60)
        .and_then(|m| m.checked_add(seconds))
        .ok_or_else(|| EditError::InvalidTimeInput(format!("{text:?} is out of range")))?;
    Ok(total as Seconds)
}

pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    debug_assert!(min <= max, "clamp bounds crossed: {min} > {max}");
    value.min(max).max(min)
}

/// Round to the nearest millisecond, never below zero.
pub fn to_millis_clamped(seconds: Seconds) -> u64 {
    (seconds * 1000.0).round().max(0.0) as u64
}

pub fn from_millis(ms: u64) -> Seconds {
    ms as Seconds / 1000.0
}

/// A typed minutes + seconds pair from a manual time row.
///
/// Fields are kept as the raw text the user entered so a rejected commit
/// hands them back untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManualTime {
    pub minutes: String,
    pub seconds: String,
}

impl ManualTime {
    pub fn new(minutes: impl Into<String>, seconds: impl Into<String>) -> Self {
        Self {
            minutes: minutes.into(),
            seconds: seconds.into(),
        }
    }

    /// Seed the row from a live time (whole minutes, whole seconds).
    pub fn from_seconds(seconds: Seconds) -> Self {
        let whole = seconds.max(0.0).floor() as u64;
        Self {
            minutes: (whole / 60).to_string(),
            seconds: (whole % 60).to_string(),
        }
    }

    /// Accepts the `M:SS` display form.
    pub fn from_display(text: &str) -> Result<Self> {
        let total = parse_display(text)?;
        Ok(Self::from_seconds(total))
    }

    /// Convert to seconds, clamped to `[0, duration]` and quantised to whole
    /// milliseconds.
    pub fn resolve(&self, duration: Seconds) -> Result<Seconds> {
        let minutes = parse_field(&self.minutes, "minutes")?;
        let seconds = parse_field(&self.seconds, "seconds")?;
        let total = clamp(minutes * 60.0 + seconds, 0.0, duration);
        Ok(from_millis(to_millis_clamped(total)).min(duration))
    }
}

fn parse_field(text: &str, what: &str) -> Result<f64> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(0.0);
    }
    match text.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => Ok(v),
        _ => Err(EditError::InvalidTimeInput(format!(
            "{what} must be a non-negative number, got {text:?}"
        ))),
    }
}
