use serde::Serialize;

use crate::{duration_of, to_display, EditError, EditId, EditKind, EditList, EditOperation, Result};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangeRow {
    /// 1-based position in start order
    pub index: usize,
    pub op: EditOperation,
    pub display_start: String,
    pub display_end: String,
    pub display_duration: String,
    pub expanded: bool,
    /// Add and Replace rows show the uploaded media when expanded
    pub has_preview: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InspectorSummary {
    pub count: usize,
    pub heading: String,
    pub button_label: String,
    pub button_enabled: bool,
    /// Shown under the preview once anything has been edited
    pub preview_caption: Option<String>,
}

/// Changes drawer state. Only the expanded row lives here; rows are derived.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChangesInspector {
    expanded: Option<EditId>,
}

fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

impl ChangesInspector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expanded(&self) -> Option<EditId> {
        self.expanded
    }

    /// Expand `id`, or collapse it if it is already open. Opening one row
    /// closes any other.
    pub fn toggle(&mut self, id: EditId, edits: &EditList) -> Result<()> {
        if edits.get(id).is_none() {
            return Err(EditError::EditNotFound(id));
        }
        self.expanded = if self.expanded == Some(id) { None } else { Some(id) };
        Ok(())
    }

    pub fn rows(&self, sorted: &[EditOperation]) -> Vec<ChangeRow> {
        sorted
            .iter()
            .enumerate()
            .map(|(i, op)| ChangeRow {
                index: i + 1,
                op: op.clone(),
                display_start: to_display(op.start()),
                display_end: to_display(op.end()),
                display_duration: to_display(duration_of(op)),
                expanded: self.expanded == Some(op.id()),
                has_preview: matches!(op.kind(), EditKind::Add | EditKind::Replace),
            })
            .collect()
    }

    pub fn summary(count: usize) -> InspectorSummary {
        InspectorSummary {
            count,
            heading: if count == 0 {
                "No changes yet".to_string()
            } else {
                format!("{} change{} made", count, plural(count))
            },
            button_label: format!("Show Changes ({})", count),
            button_enabled: count > 0,
            preview_caption: (count > 0)
                .then(|| format!("{} change{} applied to edited video", count, plural(count))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PayloadRef;

    #[test]
    fn test_rows_follow_start_order() {
        let mut edits = EditList::new(300.0).unwrap();
        edits.append(EditKind::Remove, 70.0, 135.5, None).unwrap();
        edits.append(EditKind::Replace, 5.0, 9.0, Some(PayloadRef::new("r"))).unwrap();

        let inspector = ChangesInspector::new();
        let rows = inspector.rows(&edits.list_sorted_by_start());
        assert_eq!(rows[0].index, 1);
        assert_eq!(rows[0].op.kind(), EditKind::Replace);
        assert!(rows[0].has_preview);
        assert_eq!(rows[1].display_start, "1:10");
        assert_eq!(rows[1].display_end, "2:15");
        assert_eq!(rows[1].display_duration, "1:05");
        assert!(!rows[1].has_preview);
    }

    #[test]
    fn test_toggle_single_expanded_row() {
        let mut edits = EditList::new(60.0).unwrap();
        let a = edits.append(EditKind::Remove, 1.0, 2.0, None).unwrap();
        let b = edits.append(EditKind::Remove, 3.0, 4.0, None).unwrap();
        let mut inspector = ChangesInspector::new();

        inspector.toggle(a.id(), &edits).unwrap();
        assert_eq!(inspector.expanded(), Some(a.id()));
        inspector.toggle(b.id(), &edits).unwrap();
        assert_eq!(inspector.expanded(), Some(b.id()));
        inspector.toggle(b.id(), &edits).unwrap();
        assert_eq!(inspector.expanded(), None);

        assert!(matches!(
            inspector.toggle(EditId::new(), &edits),
            Err(EditError::EditNotFound(_))
        ));
    }

    #[test]
    fn test_summary_text() {
        let empty = ChangesInspector::summary(0);
        assert_eq!(empty.heading, "No changes yet");
        assert!(!empty.button_enabled);
        assert!(empty.preview_caption.is_none());

        let one = ChangesInspector::summary(1);
        assert_eq!(one.heading, "1 change made");
        assert_eq!(one.button_label, "Show Changes (1)");

        let many = ChangesInspector::summary(3);
        assert_eq!(many.preview_caption.as_deref(), Some("3 changes applied to edited video"));
    }
}
