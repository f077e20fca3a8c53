//! Property-based tests for the selection state machine, the edit list and
//! display formatting.

use edl::{
    parse_display, to_display, DragHandle, EditConfig, EditKind, EditList, EndDragCursor,
    PayloadRef, SelectionState,
};
use proptest::prelude::*;

const TOLERANCE: f64 = 1e-9;

fn handle() -> impl Strategy<Value = DragHandle> {
    prop_oneof![
        Just(DragHandle::Start),
        Just(DragHandle::End),
        Just(DragHandle::Cursor),
    ]
}

fn kind() -> impl Strategy<Value = EditKind> {
    prop_oneof![
        Just(EditKind::Add),
        Just(EditKind::Replace),
        Just(EditKind::Remove),
    ]
}

/// Drag targets deliberately overshoot both ends of the media.
fn drags() -> impl Strategy<Value = Vec<(DragHandle, f64)>> {
    prop::collection::vec((handle(), -100.0f64..800.0), 0..60)
}

fn selection(duration: f64) -> SelectionState {
    SelectionState::from_config(duration, &EditConfig::default()).unwrap()
}

// =============================================================================
// Selection invariants
// =============================================================================

proptest! {
    /// Start and end never come closer than the minimum separation.
    #[test]
    fn separation_holds_after_any_drags(duration in 1.0f64..600.0, drags in drags()) {
        for policy in [EndDragCursor::Preserve, EndDragCursor::Reclamp] {
            let mut state = selection(duration);
            for &(handle, t) in &drags {
                state.apply_drag(handle, t, policy);
                prop_assert!(state.start() + state.min_separation() <= state.end() + TOLERANCE);
                prop_assert!(state.start() >= 0.0);
                prop_assert!(state.end() <= duration);
            }
        }
    }

    /// With re-clamping on end drags the cursor never leaves the window.
    #[test]
    fn cursor_contained_when_reclamping(duration in 1.0f64..600.0, drags in drags()) {
        let mut state = selection(duration);
        for &(handle, t) in &drags {
            state.apply_drag(handle, t, EndDragCursor::Reclamp);
            prop_assert!(state.cursor() >= state.start() - TOLERANCE);
            prop_assert!(state.cursor() <= state.end() + TOLERANCE);
        }
    }

    /// The two policies only ever differ in where the cursor ends up.
    #[test]
    fn policies_agree_on_window(duration in 1.0f64..600.0, drags in drags()) {
        let mut kept = selection(duration);
        let mut pulled = selection(duration);
        for &(handle, t) in &drags {
            kept.apply_drag(handle, t, EndDragCursor::Preserve);
            pulled.apply_drag(handle, t, EndDragCursor::Reclamp);
            if handle != DragHandle::Cursor {
                prop_assert_eq!(kept.start(), pulled.start());
                prop_assert_eq!(kept.end(), pulled.end());
            }
        }
    }
}

#[test]
fn cursor_escapes_window_when_preserving() {
    let mut state = selection(120.0);
    state.apply_drag(DragHandle::Cursor, 35.0, EndDragCursor::Preserve);
    state.apply_drag(DragHandle::End, 20.0, EndDragCursor::Preserve);
    assert!(state.cursor() > state.end());
}

// =============================================================================
// Edit list
// =============================================================================

proptest! {
    /// Appending never disturbs what was already listed, valid or not.
    #[test]
    fn append_keeps_previous_listing(
        attempts in prop::collection::vec(
            (kind(), -10.0f64..130.0, 0.0f64..40.0, any::<bool>()),
            1..40,
        )
    ) {
        let mut list = EditList::new(120.0).unwrap();
        for (kind, start, len, with_payload) in attempts {
            let before = list.list_sorted_by_start();
            let payload = with_payload.then(|| PayloadRef::new("clip"));
            match list.append(kind, start, start + len, payload) {
                Ok(op) => {
                    let after: Vec<_> = list
                        .list_sorted_by_start()
                        .into_iter()
                        .filter(|o| o.id() != op.id())
                        .collect();
                    prop_assert_eq!(&after, &before);
                    prop_assert_eq!(list.len(), before.len() + 1);
                }
                Err(_) => prop_assert_eq!(list.list_sorted_by_start(), before),
            }
        }
    }

    /// Listing is a pure read.
    #[test]
    fn listing_is_idempotent(
        ranges in prop::collection::vec((0.0f64..100.0, 0.1f64..20.0), 0..30)
    ) {
        let mut list = EditList::new(120.0).unwrap();
        for (start, len) in ranges {
            list.append(EditKind::Remove, start, start + len, None).unwrap();
        }
        let first = list.list_sorted_by_start();
        let second = list.list_sorted_by_start();
        prop_assert_eq!(&first, &second);
        prop_assert!(first.windows(2).all(|w| w[0].start() <= w[1].start()));
    }

    /// Resolved segments tile the whole media without gaps.
    #[test]
    fn segments_tile_media(
        ranges in prop::collection::vec((0.0f64..100.0, 0.1f64..20.0), 0..20)
    ) {
        let mut list = EditList::new(120.0).unwrap();
        for (start, len) in ranges {
            list.append(EditKind::Remove, start, start + len, None).unwrap();
        }
        let segments = list.resolve_segments();
        prop_assert_eq!(segments.first().map(|s| s.start), Some(0.0));
        prop_assert_eq!(segments.last().map(|s| s.end), Some(120.0));
        for pair in segments.windows(2) {
            prop_assert_eq!(pair[0].end, pair[1].start);
        }
    }
}

// =============================================================================
// Display formatting
// =============================================================================

proptest! {
    /// Formatting then parsing lands on the whole second below.
    #[test]
    fn display_round_trip_within_a_second(seconds in 0.0f64..360_000.0) {
        let parsed = parse_display(&to_display(seconds)).unwrap();
        prop_assert!((parsed - seconds.floor()).abs() < 1.0);
        prop_assert!(parsed <= seconds);
    }
}
