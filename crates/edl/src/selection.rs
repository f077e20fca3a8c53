/// Selection window and playback cursor over the base media
/// All three scalars move only through the drag transitions below.

use serde::{Deserialize, Serialize};

use crate::{clamp, EditConfig, EditError, EndDragCursor, Result, Seconds};

/// Slack for float rounding when checking a window built as `end − ε`.
const SEPARATION_TOLERANCE: Seconds = 1e-9;

/// One of the three grabbable handles on the rail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DragHandle {
    Start,
    End,
    Cursor,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectionState {
    duration: Seconds,
    min_separation: Seconds,
    start: Seconds,
    end: Seconds,
    cursor: Seconds,
}

impl SelectionState {
    pub fn new(
        duration: Seconds,
        start: Seconds,
        end: Seconds,
        cursor: Seconds,
        min_separation: Seconds,
    ) -> Result<Self> {
        if !duration.is_finite() || duration < 0.0 {
            return Err(EditError::InvalidDuration(duration));
        }
        if !(min_separation.is_finite() && min_separation > 0.0) {
            return Err(EditError::InvalidSelection(format!(
                "minimum separation must be positive, got {min_separation}"
            )));
        }
        if duration < min_separation {
            return Err(EditError::InvalidSelection(format!(
                "duration {duration} is shorter than the minimum selection {min_separation}"
            )));
        }
        let spans = start + min_separation <= end + SEPARATION_TOLERANCE;
        if !(start >= 0.0 && end <= duration && spans) {
            return Err(EditError::InvalidSelection(format!(
                "selection {start}..{end} must lie in 0..{duration} and span at least {min_separation}"
            )));
        }
        if !(cursor >= start && cursor <= end) {
            return Err(EditError::InvalidSelection(format!(
                "cursor {cursor} outside selection {start}..{end}"
            )));
        }
        Ok(Self {
            duration,
            min_separation,
            start,
            end,
            cursor,
        })
    }

    /// Initial window from configuration, pulled inside a short media.
    pub fn from_config(duration: Seconds, config: &EditConfig) -> Result<Self> {
        let eps = config.min_separation;
        if !duration.is_finite() || duration < 0.0 {
            return Err(EditError::InvalidDuration(duration));
        }
        if duration < eps {
            return Err(EditError::InvalidSelection(format!(
                "duration {duration} is shorter than the minimum selection {eps}"
            )));
        }
        let end = clamp(config.initial_end, eps, duration);
        let start = clamp(config.initial_start, 0.0, end - eps);
        let cursor = clamp(config.initial_cursor, start, end);
        Self::new(duration, start, end, cursor, eps)
    }

    pub fn duration(&self) -> Seconds {
        self.duration
    }

    pub fn min_separation(&self) -> Seconds {
        self.min_separation
    }

    pub fn start(&self) -> Seconds {
        self.start
    }

    pub fn end(&self) -> Seconds {
        self.end
    }

    pub fn cursor(&self) -> Seconds {
        self.cursor
    }

    pub fn position_of(&self, handle: DragHandle) -> Seconds {
        match handle {
            DragHandle::Start => self.start,
            DragHandle::End => self.end,
            DragHandle::Cursor => self.cursor,
        }
    }

    /// Percent of the rail for a media time. Shared by layout and pointer math.
    pub fn pct(&self, x: Seconds) -> f64 {
        pct(x, self.duration)
    }

    pub fn start_pct(&self) -> f64 {
        self.pct(self.start)
    }

    pub fn end_pct(&self) -> f64 {
        self.pct(self.end)
    }

    pub fn cursor_pct(&self) -> f64 {
        self.pct(self.cursor)
    }

    pub fn cursor_in_selection(&self) -> bool {
        self.cursor >= self.start && self.cursor <= self.end
    }

    /// Move `handle` toward `t`. Candidates are clamped, never rejected.
    pub fn apply_drag(&mut self, handle: DragHandle, t: Seconds, end_policy: EndDragCursor) {
        if t.is_nan() {
            return;
        }
        let t = clamp(t, 0.0, self.duration);
        match handle {
            DragHandle::Start => self.drag_start(t),
            DragHandle::End => self.drag_end(t, end_policy),
            DragHandle::Cursor => self.drag_cursor(t),
        }
    }

    fn drag_start(&mut self, t: Seconds) {
        self.start = t.min(self.end - self.min_separation).max(0.0);
        // the cursor rides the start handle while trimming
        self.cursor = self.start;
    }

    fn drag_end(&mut self, t: Seconds, end_policy: EndDragCursor) {
        self.end = t.max(self.start + self.min_separation).min(self.duration);
        self.cursor = cursor_after_end_drag(
            self.cursor,
            self.start,
            self.end,
            self.min_separation,
            end_policy,
        );
    }

    fn drag_cursor(&mut self, t: Seconds) {
        self.cursor = clamp_cursor(t, self.start, self.end, self.min_separation);
    }
}

pub fn pct(x: Seconds, duration: Seconds) -> f64 {
    if duration > 0.0 {
        100.0 * x / duration
    } else {
        0.0
    }
}

/// Cursor position after the end handle moves.
///
/// `Preserve` keeps the cursor where it was even when the new end lands
/// before it; `Reclamp` pulls it back inside the window.
pub fn cursor_after_end_drag(
    cursor: Seconds,
    start: Seconds,
    end: Seconds,
    min_separation: Seconds,
    policy: EndDragCursor,
) -> Seconds {
    match policy {
        EndDragCursor::Preserve => cursor,
        EndDragCursor::Reclamp => clamp_cursor(cursor, start, end, min_separation),
    }
}

/// Clamp into `[start + ε, end − ε]`; a window narrower than `2ε` puts the
/// cursor at its midpoint.
fn clamp_cursor(t: Seconds, start: Seconds, end: Seconds, min_separation: Seconds) -> Seconds {
    let lo = start + min_separation;
    let hi = end - min_separation;
    if lo > hi {
        (start + end) / 2.0
    } else {
        clamp(t, lo, hi)
    }
}
