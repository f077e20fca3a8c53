/// Append-only edit decision list
/// Operations are immutable once appended; overlaps are kept and resolved at read time.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::{EditError, EditId, EditKind, Result, Seconds};

/// Opaque handle to externally uploaded media.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PayloadRef(pub String);

impl PayloadRef {
    pub fn new(handle: impl Into<String>) -> Self {
        Self(handle.into())
    }
}

impl fmt::Display for PayloadRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditOperation {
    id: EditId,
    kind: EditKind,
    start: Seconds,
    end: Seconds,
    has_payload: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    payload: Option<PayloadRef>,
    #[serde(default)]
    created_at: i64,
}

impl EditOperation {
    pub fn id(&self) -> EditId {
        self.id
    }

    pub fn kind(&self) -> EditKind {
        self.kind
    }

    pub fn start(&self) -> Seconds {
        self.start
    }

    pub fn end(&self) -> Seconds {
        self.end
    }

    pub fn has_payload(&self) -> bool {
        self.has_payload
    }

    pub fn payload(&self) -> Option<&PayloadRef> {
        self.payload.as_ref()
    }

    pub fn created_at(&self) -> i64 {
        self.created_at
    }

    /// Half-open coverage: an edit ending at `t` no longer covers `t`.
    pub fn covers(&self, t: Seconds) -> bool {
        t >= self.start && t < self.end
    }
}

pub fn duration_of(op: &EditOperation) -> Seconds {
    op.end - op.start
}

/// Who owns a stretch of the flattened timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum SegmentSource {
    Base,
    Edit { id: EditId, kind: EditKind },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedSegment {
    pub start: Seconds,
    pub end: Seconds,
    #[serde(flatten)]
    pub source: SegmentSource,
}

#[derive(Debug, Clone, Serialize)]
pub struct EditList {
    duration: Seconds,
    ops: Vec<EditOperation>,
}

impl EditList {
    pub fn new(duration: Seconds) -> Result<Self> {
        if !duration.is_finite() || duration < 0.0 {
            return Err(EditError::InvalidDuration(duration));
        }
        Ok(Self {
            duration,
            ops: Vec::new(),
        })
    }

    /// Rebuild a list from previously exported operations, re-checking every
    /// invariant `append` enforces.
    pub fn from_operations(duration: Seconds, ops: Vec<EditOperation>) -> Result<Self> {
        let mut list = Self::new(duration)?;
        let mut seen = HashSet::new();
        for op in ops {
            // an export may drop the handle but never invent one
            if op.payload.is_some() && !op.has_payload {
                return Err(EditError::InconsistentPayload(op.id));
            }
            list.validate(op.kind, op.start, op.end, op.has_payload)?;
            if !seen.insert(op.id) {
                return Err(EditError::DuplicateEdit(op.id));
            }
            list.ops.push(op);
        }
        Ok(list)
    }

    pub fn from_json(duration: Seconds, json: &str) -> Result<Self> {
        let ops: Vec<EditOperation> = serde_json::from_str(json)?;
        Self::from_operations(duration, ops)
    }

    /// Operations in insertion order.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.ops)?)
    }

    pub fn duration(&self) -> Seconds {
        self.duration
    }

    pub fn append(
        &mut self,
        kind: EditKind,
        start: Seconds,
        end: Seconds,
        payload: Option<PayloadRef>,
    ) -> Result<EditOperation> {
        self.validate(kind, start, end, payload.is_some())?;
        let op = EditOperation {
            id: EditId::new(),
            kind,
            start,
            end,
            has_payload: payload.is_some(),
            payload,
            created_at: chrono::Utc::now().timestamp(),
        };
        tracing::debug!("appended {} edit {} over {}..{}", kind, op.id, start, end);
        self.ops.push(op.clone());
        Ok(op)
    }

    fn validate(&self, kind: EditKind, start: Seconds, end: Seconds, has_payload: bool) -> Result<()> {
        let in_bounds = start.is_finite()
            && end.is_finite()
            && start >= 0.0
            && start < end
            && end <= self.duration;
        if !in_bounds {
            return Err(EditError::InvalidRange {
                start,
                end,
                duration: self.duration,
            });
        }
        match (kind.requires_payload(), has_payload) {
            (true, false) => return Err(EditError::MissingPayload(kind)),
            (false, true) => return Err(EditError::UnexpectedPayload(kind)),
            _ => {}
        }
        Ok(())
    }

    /// Stable sort by start; equal starts keep insertion order.
    pub fn list_sorted_by_start(&self) -> Vec<EditOperation> {
        let mut sorted = self.ops.clone();
        sorted.sort_by(|a, b| a.start.total_cmp(&b.start));
        sorted
    }

    pub fn iter(&self) -> impl Iterator<Item = &EditOperation> {
        self.ops.iter()
    }

    pub fn get(&self, id: EditId) -> Option<&EditOperation> {
        self.ops.iter().find(|op| op.id == id)
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// The edit in effect at `t`: greatest start wins, ties go to the later
    /// insertion.
    pub fn winner_at(&self, t: Seconds) -> Option<&EditOperation> {
        let mut winner: Option<&EditOperation> = None;
        for op in self.ops.iter().filter(|op| op.covers(t)) {
            match winner {
                Some(w) if op.start < w.start => {}
                _ => winner = Some(op),
            }
        }
        winner
    }

    /// Flatten the list over `[0, duration]` into contiguous segments, each
    /// owned by the base media or by the winning edit.
    pub fn resolve_segments(&self) -> Vec<ResolvedSegment> {
        let mut cuts = Vec::with_capacity(self.ops.len() * 2 + 2);
        cuts.push(0.0);
        cuts.push(self.duration);
        for op in &self.ops {
            cuts.push(op.start);
            cuts.push(op.end);
        }
        cuts.sort_by(|a, b| a.total_cmp(b));
        cuts.dedup();

        let mut segments: Vec<ResolvedSegment> = Vec::new();
        for pair in cuts.windows(2) {
            let (start, end) = (pair[0], pair[1]);
            if end <= start {
                continue;
            }
            // coverage only changes at cut points
            let source = match self.winner_at(start) {
                Some(op) => SegmentSource::Edit {
                    id: op.id,
                    kind: op.kind,
                },
                None => SegmentSource::Base,
            };
            match segments.last_mut() {
                Some(last) if last.source == source && last.end == start => last.end = end,
                _ => segments.push(ResolvedSegment { start, end, source }),
            }
        }
        segments
    }
}
