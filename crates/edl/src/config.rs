use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::{EditError, Result, Seconds};

/// What an end-handle drag does to a cursor left outside the new window.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndDragCursor {
    /// Leave the cursor where it is (shipping behaviour)
    Preserve,
    /// Pull the cursor back inside `[start + ε, end − ε]`
    Reclamp,
}

impl Default for EndDragCursor {
    fn default() -> Self {
        Self::Preserve
    }
}

/// Tunables for one editing session
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditConfig {
    /// Minimum gap between selection start and end, and between the cursor
    /// and either handle
    pub min_separation: Seconds,

    /// Length of an inserted clip for Add commits
    pub default_insert_span: Seconds,

    /// Narrowest band drawn on the rail, in percent of the rail width
    pub min_band_width_pct: f64,

    pub end_drag_cursor: EndDragCursor,

    /// Pointer samples buffered before moves start coalescing
    pub pointer_queue_capacity: usize,

    pub initial_start: Seconds,
    pub initial_end: Seconds,
    pub initial_cursor: Seconds,
}

impl Default for EditConfig {
    fn default() -> Self {
        Self {
            min_separation: 0.1,
            default_insert_span: 2.0,
            min_band_width_pct: 0.5,
            end_drag_cursor: EndDragCursor::Preserve,
            pointer_queue_capacity: 64,
            initial_start: 10.0,
            initial_end: 40.0,
            initial_cursor: 10.0,
        }
    }
}

impl EditConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        positive("min_separation", self.min_separation)?;
        positive("default_insert_span", self.default_insert_span)?;
        positive("min_band_width_pct", self.min_band_width_pct)?;
        if self.min_band_width_pct > 100.0 {
            return Err(EditError::InvalidConfig(
                "min_band_width_pct must be at most 100".to_string(),
            ));
        }
        if self.pointer_queue_capacity == 0 {
            return Err(EditError::InvalidConfig(
                "pointer_queue_capacity must be at least 1".to_string(),
            ));
        }
        for (name, v) in [
            ("initial_start", self.initial_start),
            ("initial_end", self.initial_end),
            ("initial_cursor", self.initial_cursor),
        ] {
            if !v.is_finite() || v < 0.0 {
                return Err(EditError::InvalidConfig(format!(
                    "{name} must be a non-negative number, got {v}"
                )));
            }
        }
        Ok(())
    }

    pub fn with_end_drag_cursor(mut self, policy: EndDragCursor) -> Self {
        self.end_drag_cursor = policy;
        self
    }
}

fn positive(name: &str, v: f64) -> Result<()> {
    if v.is_finite() && v > 0.0 {
        Ok(())
    } else {
        Err(EditError::InvalidConfig(format!(
            "{name} must be a positive number, got {v}"
        )))
    }
}
