/// Drawable rail layout: edit bands, dimmed outside regions, handles and labels

use serde::Serialize;

use crate::{duration_of, pct, to_display, EditId, EditKind, EditOperation, Seconds, SelectionState};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EditBand {
    pub id: EditId,
    pub kind: EditKind,
    pub left_pct: f64,
    pub width_pct: f64,
    pub color_class: &'static str,
    pub fill_color: &'static str,
    pub border_color: &'static str,
    /// Hover text, e.g. `ADD: 0:10 → 0:12`
    pub title: String,
}

/// A horizontal stretch of the rail in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RailSpan {
    pub left_pct: f64,
    pub width_pct: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HandlePositions {
    pub start_pct: f64,
    pub end_pct: f64,
    pub cursor_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeLabels {
    pub cursor: String,
    pub start: String,
    pub end: String,
    pub duration: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineLayout {
    /// Draw order: later bands paint over earlier ones
    pub bands: Vec<EditBand>,
    pub dim_before: RailSpan,
    pub dim_after: RailSpan,
    pub selection: RailSpan,
    pub handles: HandlePositions,
    pub labels: TimeLabels,
}

pub fn color_class(kind: EditKind) -> &'static str {
    match kind {
        EditKind::Add => "edit-add",
        EditKind::Replace => "edit-replace",
        EditKind::Remove => "edit-remove",
    }
}

impl TimelineLayout {
    /// Lay out `sorted` (start-ascending) over the rail. Overlapping bands are
    /// kept as-is; none are merged or reordered.
    pub fn compute(
        duration: Seconds,
        selection: &SelectionState,
        sorted: &[EditOperation],
        min_band_width_pct: f64,
    ) -> Self {
        let bands = sorted
            .iter()
            .map(|op| {
                let left_pct = pct(op.start(), duration);
                EditBand {
                    id: op.id(),
                    kind: op.kind(),
                    left_pct,
                    // widened slivers still stop at the rail's right edge
                    width_pct: pct(duration_of(op), duration)
                        .max(min_band_width_pct)
                        .min(100.0 - left_pct),
                    color_class: color_class(op.kind()),
                    fill_color: op.kind().fill_color(),
                    border_color: op.kind().border_color(),
                    title: format!(
                        "{}: {} → {}",
                        op.kind().label(),
                        to_display(op.start()),
                        to_display(op.end())
                    ),
                }
            })
            .collect();

        let start_pct = pct(selection.start(), duration);
        let end_pct = pct(selection.end(), duration);
        let cursor_pct = pct(selection.cursor(), duration);

        Self {
            bands,
            dim_before: RailSpan {
                left_pct: 0.0,
                width_pct: start_pct,
            },
            dim_after: RailSpan {
                left_pct: end_pct,
                width_pct: 100.0 - end_pct,
            },
            selection: RailSpan {
                left_pct: start_pct,
                width_pct: (end_pct - start_pct).max(0.0),
            },
            handles: HandlePositions {
                start_pct,
                end_pct,
                cursor_pct,
            },
            labels: TimeLabels {
                cursor: to_display(selection.cursor()),
                start: to_display(selection.start()),
                end: to_display(selection.end()),
                duration: to_display(duration),
            },
        }
    }
}
