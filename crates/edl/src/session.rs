/// One editing session over a single base media
/// Owns the edit list, selection, pointer state, dialogs and changes drawer,
/// and applies intents against them in arrival order.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    ChangeRow, ChangesInspector, DragController, DragHandle, EditConfig, EditForms, EditId,
    EditKind, EditList, EditOperation, InspectorSummary, ManualTime, PayloadRef, PointerEvent,
    PointerQueue, PointerSample, ResolvedSegment, Result, Seconds, SelectionState, TimelineLayout,
};

/// Which typed row of a dialog a manual edit targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeField {
    Start,
    End,
}

/// Everything a user (or a script) can ask a session to do.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "intent", rename_all = "snake_case")]
pub enum Intent {
    SetRailWidth {
        width_px: f64,
    },
    /// Handled immediately, bypassing the queue
    Pointer {
        event: PointerEvent,
    },
    EnqueuePointer {
        at_ms: u64,
        event: PointerEvent,
    },
    DrainPointers,
    /// Move a handle to a media time directly (keyboard, scripted input)
    Drag {
        handle: DragHandle,
        to: Seconds,
    },
    OpenActionMenu,
    CloseActionMenu,
    ChooseAction {
        kind: EditKind,
    },
    OpenDialog {
        kind: EditKind,
    },
    CloseDialog {
        kind: EditKind,
    },
    ToggleManual {
        kind: EditKind,
    },
    SetManualTime {
        kind: EditKind,
        field: TimeField,
        minutes: String,
        seconds: String,
    },
    AttachPayload {
        kind: EditKind,
        payload: PayloadRef,
    },
    DetachPayload {
        kind: EditKind,
    },
    Commit {
        kind: EditKind,
    },
    ToggleChange {
        id: EditId,
    },
}

/// What an accepted intent did.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "applied", rename_all = "snake_case")]
pub enum Applied {
    Unchanged,
    SelectionChanged,
    FormUpdated,
    Queued { pending: usize },
    Drained { changed: usize },
    Committed { op: EditOperation },
    InspectorUpdated,
}

/// Snapshot of every derived view, as printed by the replay tool.
#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    pub edits: Vec<EditOperation>,
    pub selection: SelectionState,
    pub layout: TimelineLayout,
    pub changes: Vec<ChangeRow>,
    pub summary: InspectorSummary,
    pub segments: Vec<ResolvedSegment>,
}

#[derive(Debug, Clone)]
pub struct EditSession {
    config: EditConfig,
    edits: EditList,
    selection: SelectionState,
    drag: DragController,
    queue: PointerQueue,
    forms: EditForms,
    inspector: ChangesInspector,
}

impl EditSession {
    pub fn new(duration: Seconds, config: EditConfig) -> Result<Self> {
        config.validate()?;
        let edits = EditList::new(duration)?;
        let selection = SelectionState::from_config(duration, &config)?;
        debug!(
            "session over {:.3}s, selection {:.3}..{:.3}",
            duration,
            selection.start(),
            selection.end()
        );
        Ok(Self {
            queue: PointerQueue::new(config.pointer_queue_capacity),
            config,
            edits,
            selection,
            drag: DragController::default(),
            forms: EditForms::default(),
            inspector: ChangesInspector::new(),
        })
    }

    pub fn with_defaults(duration: Seconds) -> Result<Self> {
        Self::new(duration, EditConfig::default())
    }

    pub fn config(&self) -> &EditConfig {
        &self.config
    }

    pub fn duration(&self) -> Seconds {
        self.edits.duration()
    }

    pub fn edits(&self) -> &EditList {
        &self.edits
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn drag(&self) -> &DragController {
        &self.drag
    }

    pub fn queue(&self) -> &PointerQueue {
        &self.queue
    }

    pub fn forms(&self) -> &EditForms {
        &self.forms
    }

    pub fn inspector(&self) -> &ChangesInspector {
        &self.inspector
    }

    /// Apply one intent. A rejected intent leaves the session as it was.
    pub fn apply(&mut self, intent: Intent) -> Result<Applied> {
        let policy = self.config.end_drag_cursor;
        let applied = match intent {
            Intent::SetRailWidth { width_px } => {
                self.drag.set_rail_width(width_px);
                Applied::Unchanged
            }
            Intent::Pointer { event } => {
                if self.drag.handle_event(&mut self.selection, event, policy) {
                    Applied::SelectionChanged
                } else {
                    Applied::Unchanged
                }
            }
            Intent::EnqueuePointer { at_ms, event } => {
                self.queue.push(PointerSample { at_ms, event });
                Applied::Queued {
                    pending: self.queue.len(),
                }
            }
            Intent::DrainPointers => {
                let changed = self
                    .queue
                    .drain_into(&mut self.drag, &mut self.selection, policy);
                Applied::Drained { changed }
            }
            Intent::Drag { handle, to } => {
                let before = self.selection.clone();
                self.selection.apply_drag(handle, to, policy);
                if self.selection != before {
                    Applied::SelectionChanged
                } else {
                    Applied::Unchanged
                }
            }
            Intent::OpenActionMenu => {
                self.forms.action_menu_open = true;
                Applied::FormUpdated
            }
            Intent::CloseActionMenu => {
                self.forms.action_menu_open = false;
                Applied::FormUpdated
            }
            Intent::ChooseAction { kind } => {
                self.forms.choose_action(kind, &self.selection);
                Applied::FormUpdated
            }
            Intent::OpenDialog { kind } => {
                self.forms.form_mut(kind).open(&self.selection);
                Applied::FormUpdated
            }
            Intent::CloseDialog { kind } => {
                self.forms.form_mut(kind).close();
                Applied::FormUpdated
            }
            Intent::ToggleManual { kind } => {
                self.forms.form_mut(kind).toggle_manual();
                Applied::FormUpdated
            }
            Intent::SetManualTime {
                kind,
                field,
                minutes,
                seconds,
            } => {
                let form = self.forms.form_mut(kind);
                let row = ManualTime { minutes, seconds };
                match field {
                    TimeField::Start => form.start = row,
                    TimeField::End => form.end = row,
                }
                Applied::FormUpdated
            }
            Intent::AttachPayload { kind, payload } => {
                self.forms.form_mut(kind).attach_payload(payload);
                Applied::FormUpdated
            }
            Intent::DetachPayload { kind } => {
                self.forms.form_mut(kind).detach_payload();
                Applied::FormUpdated
            }
            Intent::Commit { kind } => {
                let op = self.forms.commit(
                    kind,
                    &self.selection,
                    &mut self.edits,
                    self.config.default_insert_span,
                )?;
                Applied::Committed { op }
            }
            Intent::ToggleChange { id } => {
                self.inspector.toggle(id, &self.edits)?;
                Applied::InspectorUpdated
            }
        };
        Ok(applied)
    }

    /// Apply intents in order, continuing past rejections. Returns the
    /// rejected intents' positions with their errors.
    pub fn apply_all(
        &mut self,
        intents: impl IntoIterator<Item = Intent>,
    ) -> Vec<(usize, crate::EditError)> {
        let mut rejected = Vec::new();
        for (i, intent) in intents.into_iter().enumerate() {
            if let Err(err) = self.apply(intent) {
                warn!("intent #{} rejected: {}", i, err);
                rejected.push((i, err));
            }
        }
        rejected
    }

    pub fn layout(&self) -> TimelineLayout {
        TimelineLayout::compute(
            self.duration(),
            &self.selection,
            &self.edits.list_sorted_by_start(),
            self.config.min_band_width_pct,
        )
    }

    pub fn changes(&self) -> Vec<ChangeRow> {
        self.inspector.rows(&self.edits.list_sorted_by_start())
    }

    pub fn summary(&self) -> InspectorSummary {
        ChangesInspector::summary(self.edits.len())
    }

    pub fn segments(&self) -> Vec<ResolvedSegment> {
        self.edits.resolve_segments()
    }

    pub fn export_json(&self) -> Result<String> {
        self.edits.to_json()
    }

    pub fn report(&self) -> SessionReport {
        SessionReport {
            edits: self.edits.iter().cloned().collect(),
            selection: self.selection.clone(),
            layout: self.layout(),
            changes: self.changes(),
            summary: self.summary(),
            segments: self.segments(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EditError, EndDragCursor};

    #[test]
    fn test_new_uses_configured_window() {
        let session = EditSession::with_defaults(120.0).unwrap();
        assert_eq!(session.selection().start(), 10.0);
        assert_eq!(session.selection().end(), 40.0);
        assert_eq!(session.selection().cursor(), 10.0);
        assert!(session.edits().is_empty());
        assert!(!session.summary().button_enabled);
    }

    #[test]
    fn test_new_rejects_bad_setup() {
        assert!(matches!(
            EditSession::with_defaults(-1.0),
            Err(EditError::InvalidDuration(_))
        ));
        let mut config = EditConfig::default();
        config.default_insert_span = 0.0;
        assert!(matches!(
            EditSession::new(120.0, config),
            Err(EditError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_commit_through_intents() {
        let mut session = EditSession::with_defaults(120.0).unwrap();
        session.apply(Intent::OpenActionMenu).unwrap();
        session
            .apply(Intent::ChooseAction { kind: EditKind::Add })
            .unwrap();
        assert!(session.forms().add.open);
        session
            .apply(Intent::AttachPayload {
                kind: EditKind::Add,
                payload: PayloadRef::new("intro.mp4"),
            })
            .unwrap();
        let op = match session.apply(Intent::Commit { kind: EditKind::Add }).unwrap() {
            Applied::Committed { op } => op,
            other => panic!("expected a commit, got {other:?}"),
        };
        assert_eq!((op.start(), op.end()), (10.0, 12.0));
        assert_eq!(session.summary().heading, "1 change made");
        assert_eq!(session.layout().bands.len(), 1);
    }

    #[test]
    fn test_rejected_commit_leaves_session_untouched() {
        let mut session = EditSession::with_defaults(120.0).unwrap();
        session.apply(Intent::OpenDialog { kind: EditKind::Remove }).unwrap();
        session.apply(Intent::ToggleManual { kind: EditKind::Remove }).unwrap();
        session
            .apply(Intent::SetManualTime {
                kind: EditKind::Remove,
                field: TimeField::Start,
                minutes: "0".into(),
                seconds: "5".into(),
            })
            .unwrap();
        session
            .apply(Intent::SetManualTime {
                kind: EditKind::Remove,
                field: TimeField::End,
                minutes: "0".into(),
                seconds: "3".into(),
            })
            .unwrap();
        let forms_before = session.forms().clone();
        let selection_before = session.selection().clone();

        let err = session
            .apply(Intent::Commit { kind: EditKind::Remove })
            .unwrap_err();
        assert!(matches!(err, EditError::ManualInputNonsensical { .. }));
        assert!(session.edits().is_empty());
        assert_eq!(session.forms(), &forms_before);
        assert_eq!(session.selection(), &selection_before);
    }

    #[test]
    fn test_pointer_intents_move_handles() {
        let mut session = EditSession::with_defaults(120.0).unwrap();
        session.apply(Intent::SetRailWidth { width_px: 1200.0 }).unwrap();
        session
            .apply(Intent::Pointer {
                event: PointerEvent::Down { handle: DragHandle::End, x: 400.0 },
            })
            .unwrap();
        let applied = session
            .apply(Intent::Pointer {
                event: PointerEvent::Move { x: 600.0, y: 0.0 },
            })
            .unwrap();
        assert_eq!(applied, Applied::SelectionChanged);
        assert!((session.selection().end() - 60.0).abs() < 1e-9);
        session.apply(Intent::Pointer { event: PointerEvent::Up }).unwrap();
        assert!(!session.drag().is_dragging());
    }

    #[test]
    fn test_queued_pointer_samples() {
        let mut session = EditSession::with_defaults(120.0).unwrap();
        session.apply(Intent::SetRailWidth { width_px: 120.0 }).unwrap();
        let events = [
            PointerEvent::Down { handle: DragHandle::Cursor, x: 10.0 },
            PointerEvent::Move { x: 20.0, y: 0.0 },
            PointerEvent::Up,
        ];
        for (i, event) in events.into_iter().enumerate() {
            session
                .apply(Intent::EnqueuePointer { at_ms: i as u64 * 16, event })
                .unwrap();
        }
        assert_eq!(session.queue().len(), 3);
        assert_eq!(
            session.apply(Intent::DrainPointers).unwrap(),
            Applied::Drained { changed: 1 }
        );
        assert!((session.selection().cursor() - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_direct_drag_respects_policy() {
        let config = EditConfig::default().with_end_drag_cursor(EndDragCursor::Reclamp);
        let mut session = EditSession::new(120.0, config).unwrap();
        session
            .apply(Intent::Drag { handle: DragHandle::Cursor, to: 35.0 })
            .unwrap();
        session
            .apply(Intent::Drag { handle: DragHandle::End, to: 20.0 })
            .unwrap();
        assert!(session.selection().cursor_in_selection());
    }

    #[test]
    fn test_commit_after_close_is_rejected() {
        let mut session = EditSession::with_defaults(120.0).unwrap();
        session.apply(Intent::OpenDialog { kind: EditKind::Remove }).unwrap();
        session.apply(Intent::CloseDialog { kind: EditKind::Remove }).unwrap();
        assert!(matches!(
            session.apply(Intent::Commit { kind: EditKind::Remove }),
            Err(EditError::DialogClosed(EditKind::Remove))
        ));
        assert!(session.edits().is_empty());
    }

    #[test]
    fn test_toggle_unknown_change_is_rejected() {
        let mut session = EditSession::with_defaults(120.0).unwrap();
        assert!(matches!(
            session.apply(Intent::ToggleChange { id: EditId::new() }),
            Err(EditError::EditNotFound(_))
        ));
        assert_eq!(session.inspector().expanded(), None);
    }

    #[test]
    fn test_intents_deserialize_from_script() {
        let script = r#"[
            { "intent": "set_rail_width", "width_px": 800 },
            { "intent": "drag", "handle": "start", "to": 20.5 },
            { "intent": "enqueue_pointer", "at_ms": 5,
              "event": { "pointer": "move", "x": 3.0, "y": 1.0 } },
            { "intent": "open_dialog", "kind": "replace" },
            { "intent": "attach_payload", "kind": "replace", "payload": "clip-7" },
            { "intent": "commit", "kind": "replace" }
        ]"#;
        let intents: Vec<Intent> = serde_json::from_str(script).unwrap();
        assert_eq!(
            intents[1],
            Intent::Drag { handle: DragHandle::Start, to: 20.5 }
        );
        assert_eq!(intents[5], Intent::Commit { kind: EditKind::Replace });

        let mut session = EditSession::with_defaults(120.0).unwrap();
        let rejected = session.apply_all(intents);
        assert!(rejected.is_empty());
        let edits: Vec<_> = session.edits().iter().cloned().collect();
        assert_eq!(edits.len(), 1);
        assert_eq!((edits[0].start(), edits[0].end()), (20.5, 40.0));
    }

    #[test]
    fn test_export_json_lists_insertion_order() {
        let mut session = EditSession::with_defaults(60.0).unwrap();
        for start in [30.0, 0.0] {
            session.apply(Intent::Drag { handle: DragHandle::Start, to: start }).unwrap();
            session.apply(Intent::OpenDialog { kind: EditKind::Remove }).unwrap();
            session.apply(Intent::Commit { kind: EditKind::Remove }).unwrap();
        }

        let restored = EditList::from_json(60.0, &session.export_json().unwrap()).unwrap();
        let starts: Vec<_> = restored.iter().map(|op| op.start()).collect();
        assert_eq!(starts, vec![30.0, 0.0]);
        assert_eq!(session.changes()[0].op.start(), 0.0);
    }
}
