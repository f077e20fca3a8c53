/// Pointer handling for the selection rail
/// Translates pixel samples into selection transitions without snapping the grabbed handle.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::debug;

use crate::{clamp, DragHandle, EndDragCursor, SelectionState};

/// What the pointer is holding between down and up.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragTarget {
    #[default]
    None,
    Grabbed {
        handle: DragHandle,
        /// Pointer x minus the handle's x at grab time
        offset_px: f64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "pointer", rename_all = "snake_case")]
pub enum PointerEvent {
    Down { handle: DragHandle, x: f64 },
    Move { x: f64, y: f64 },
    Up,
}

impl PointerEvent {
    pub fn is_move(&self) -> bool {
        matches!(self, Self::Move { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerSample {
    pub at_ms: u64,
    pub event: PointerEvent,
}

#[derive(Debug, Clone, Default)]
pub struct DragController {
    target: DragTarget,
    rail_width_px: f64,
}

impl DragController {
    pub fn new(rail_width_px: f64) -> Self {
        Self {
            target: DragTarget::None,
            rail_width_px,
        }
    }

    pub fn target(&self) -> DragTarget {
        self.target
    }

    pub fn active_handle(&self) -> Option<DragHandle> {
        match self.target {
            DragTarget::Grabbed { handle, .. } => Some(handle),
            DragTarget::None => None,
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.active_handle().is_some()
    }

    pub fn rail_width_px(&self) -> f64 {
        self.rail_width_px
    }

    pub fn set_rail_width(&mut self, width_px: f64) {
        self.rail_width_px = width_px;
    }

    fn rail_usable(&self) -> bool {
        self.rail_width_px.is_finite() && self.rail_width_px > 0.0
    }

    pub fn handle_position_px(&self, selection: &SelectionState, handle: DragHandle) -> f64 {
        selection.pct(selection.position_of(handle)) / 100.0 * self.rail_width_px
    }

    /// Rail x to media seconds, using the same percent mapping as layout.
    pub fn seconds_at(&self, selection: &SelectionState, x: f64) -> Option<f64> {
        if !self.rail_usable() || !x.is_finite() {
            return None;
        }
        let pct = clamp(100.0 * x / self.rail_width_px, 0.0, 100.0);
        let duration = selection.duration();
        Some(clamp(pct / 100.0 * duration, 0.0, duration))
    }

    pub fn pointer_down(&mut self, selection: &SelectionState, handle: DragHandle, x: f64) {
        let offset_px = if x.is_finite() {
            x - self.handle_position_px(selection, handle)
        } else {
            0.0
        };
        debug!("grabbed {:?} handle, offset {:.2}px", handle, offset_px);
        self.target = DragTarget::Grabbed { handle, offset_px };
    }

    /// Returns true when the selection changed.
    pub fn pointer_move(
        &mut self,
        selection: &mut SelectionState,
        x: f64,
        end_policy: EndDragCursor,
    ) -> bool {
        let DragTarget::Grabbed { handle, offset_px } = self.target else {
            return false;
        };
        let Some(t) = self.seconds_at(selection, x - offset_px) else {
            return false;
        };
        let before = selection.clone();
        selection.apply_drag(handle, t, end_policy);
        *selection != before
    }

    /// Releases wherever the pointer is; the last applied transition stands.
    pub fn pointer_up(&mut self) {
        if let Some(handle) = self.active_handle() {
            debug!("released {:?} handle", handle);
        }
        self.target = DragTarget::None;
    }

    pub fn handle_event(
        &mut self,
        selection: &mut SelectionState,
        event: PointerEvent,
        end_policy: EndDragCursor,
    ) -> bool {
        match event {
            PointerEvent::Down { handle, x } => {
                self.pointer_down(selection, handle, x);
                false
            }
            PointerEvent::Move { x, .. } => self.pointer_move(selection, x, end_policy),
            PointerEvent::Up => {
                self.pointer_up();
                false
            }
        }
    }
}

/// Bounded FIFO of pointer samples; `len()` never exceeds the capacity.
///
/// Once full, a new Move replaces a trailing Move, otherwise the oldest
/// queued Move makes room. A queue holding only presses drops its oldest
/// press: with no Move between them, presses change no selection and only
/// the newest decides the grab.
#[derive(Debug, Clone)]
pub struct PointerQueue {
    capacity: usize,
    samples: VecDeque<PointerSample>,
    coalesced: u64,
}

impl PointerQueue {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            samples: VecDeque::with_capacity(capacity),
            coalesced: 0,
        }
    }

    pub fn push(&mut self, sample: PointerSample) {
        if self.samples.len() < self.capacity {
            self.samples.push_back(sample);
            return;
        }
        if sample.event.is_move() {
            if let Some(last) = self.samples.back_mut() {
                if last.event.is_move() {
                    *last = sample;
                    self.coalesced += 1;
                    return;
                }
            }
        }
        match self.samples.iter().position(|s| s.event.is_move()) {
            Some(idx) => {
                self.samples.remove(idx);
                self.coalesced += 1;
                self.samples.push_back(sample);
            }
            None if !sample.event.is_move() => {
                self.samples.pop_front();
                self.coalesced += 1;
                self.samples.push_back(sample);
            }
            None => {
                // only presses queued; a stray move carries no information yet
                self.coalesced += 1;
            }
        }
        debug!("pointer queue full, {} samples coalesced so far", self.coalesced);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn coalesced(&self) -> u64 {
        self.coalesced
    }

    pub fn pop(&mut self) -> Option<PointerSample> {
        self.samples.pop_front()
    }

    /// Feed every queued sample to the controller in arrival order.
    /// Returns how many samples changed the selection.
    pub fn drain_into(
        &mut self,
        controller: &mut DragController,
        selection: &mut SelectionState,
        end_policy: EndDragCursor,
    ) -> usize {
        let mut changed = 0;
        while let Some(sample) = self.samples.pop_front() {
            if controller.handle_event(selection, sample.event, end_policy) {
                changed += 1;
            }
        }
        changed
    }
}
