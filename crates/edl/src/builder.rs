/// Add / Replace / Remove dialogs and the edits they commit

use serde::Serialize;
use tracing::{info, warn};

use crate::{
    EditError, EditKind, EditList, EditOperation, ManualTime, PayloadRef, Result, Seconds,
    SelectionState,
};

/// Transient state of one edit dialog.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EditForm {
    pub kind: EditKind,
    pub open: bool,
    pub manual: bool,
    pub start: ManualTime,
    /// Unused by Add, whose end is derived from the insert span
    pub end: ManualTime,
    pub payload: Option<PayloadRef>,
}

impl EditForm {
    pub fn new(kind: EditKind) -> Self {
        Self {
            kind,
            open: false,
            manual: false,
            start: ManualTime::default(),
            end: ManualTime::default(),
            payload: None,
        }
    }

    /// Open the dialog with its time rows seeded from the live selection.
    pub fn open(&mut self, selection: &SelectionState) {
        match self.kind {
            EditKind::Add => {
                self.start = ManualTime::from_seconds(selection.cursor());
            }
            EditKind::Replace | EditKind::Remove => {
                self.start = ManualTime::from_seconds(selection.start());
                self.end = ManualTime::from_seconds(selection.end());
            }
        }
        self.open = true;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn toggle_manual(&mut self) {
        self.manual = !self.manual;
    }

    /// Remove dialogs have no upload box, so attaching is ignored there.
    pub fn attach_payload(&mut self, payload: PayloadRef) {
        if self.kind.requires_payload() {
            self.payload = Some(payload);
        }
    }

    pub fn detach_payload(&mut self) {
        self.payload = None;
    }

    /// Whether the submit button would be enabled.
    pub fn can_submit(&self) -> bool {
        !self.kind.requires_payload() || self.payload.is_some()
    }

    fn reset_after_commit(&mut self) {
        self.open = false;
        self.manual = false;
        self.payload = None;
    }
}

/// Range an auto-mode commit takes from the live selection.
pub fn auto_range(kind: EditKind, selection: &SelectionState, insert_span: Seconds) -> (Seconds, Seconds) {
    match kind {
        EditKind::Add => {
            let start = selection.cursor();
            (start, (start + insert_span).min(selection.duration()))
        }
        EditKind::Replace | EditKind::Remove => (selection.start(), selection.end()),
    }
}

/// Range a manual-mode commit takes from the typed rows.
///
/// Add derives its end and is never rejected here; Replace and Remove reject
/// a typed end at or before the typed start.
pub fn manual_range(
    kind: EditKind,
    start: &ManualTime,
    end: &ManualTime,
    duration: Seconds,
    insert_span: Seconds,
) -> Result<(Seconds, Seconds)> {
    let start = start.resolve(duration)?;
    match kind {
        EditKind::Add => Ok((start, (start + insert_span).min(duration))),
        EditKind::Replace | EditKind::Remove => {
            let end = end.resolve(duration)?;
            if end <= start {
                return Err(EditError::ManualInputNonsensical { start, end });
            }
            Ok((start, end))
        }
    }
}

/// The three edit dialogs plus the "choose action" menu.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EditForms {
    pub action_menu_open: bool,
    pub add: EditForm,
    pub replace: EditForm,
    pub remove: EditForm,
}

impl Default for EditForms {
    fn default() -> Self {
        Self {
            action_menu_open: false,
            add: EditForm::new(EditKind::Add),
            replace: EditForm::new(EditKind::Replace),
            remove: EditForm::new(EditKind::Remove),
        }
    }
}

impl EditForms {
    pub fn form(&self, kind: EditKind) -> &EditForm {
        match kind {
            EditKind::Add => &self.add,
            EditKind::Replace => &self.replace,
            EditKind::Remove => &self.remove,
        }
    }

    pub fn form_mut(&mut self, kind: EditKind) -> &mut EditForm {
        match kind {
            EditKind::Add => &mut self.add,
            EditKind::Replace => &mut self.replace,
            EditKind::Remove => &mut self.remove,
        }
    }

    /// Picking an action from the menu closes the menu and opens that dialog.
    pub fn choose_action(&mut self, kind: EditKind, selection: &SelectionState) {
        self.action_menu_open = false;
        self.form_mut(kind).open(selection);
    }

    /// Build the edit the `kind` dialog describes and append it.
    ///
    /// Only an open dialog can be submitted. On success the dialog closes and
    /// its payload and manual toggle reset. On failure nothing changes: the
    /// dialog stays as it was, with its input.
    pub fn commit(
        &mut self,
        kind: EditKind,
        selection: &SelectionState,
        edits: &mut EditList,
        insert_span: Seconds,
    ) -> Result<EditOperation> {
        let form = self.form_mut(kind);
        if !form.open {
            warn!("rejected {} commit: dialog is closed", kind);
            return Err(EditError::DialogClosed(kind));
        }
        let result = build_range(form, selection, edits.duration(), insert_span)
            .and_then(|(start, end)| edits.append(kind, start, end, form.payload.clone()));
        match result {
            Ok(op) => {
                info!(
                    "committed {} edit {} ({} mode) over {:.3}..{:.3}",
                    kind,
                    op.id(),
                    if form.manual { "manual" } else { "auto" },
                    op.start(),
                    op.end()
                );
                form.reset_after_commit();
                Ok(op)
            }
            Err(err) => {
                warn!("rejected {} commit: {}", kind, err);
                Err(err)
            }
        }
    }
}

fn build_range(
    form: &EditForm,
    selection: &SelectionState,
    duration: Seconds,
    insert_span: Seconds,
) -> Result<(Seconds, Seconds)> {
    if form.manual {
        manual_range(form.kind, &form.start, &form.end, duration, insert_span)
    } else {
        Ok(auto_range(form.kind, selection, insert_span))
    }
}
