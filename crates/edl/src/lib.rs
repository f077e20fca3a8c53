use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

mod time;
pub use time::*;
mod config;
pub use config::*;
mod edit_list;
pub use edit_list::*;
mod selection;
pub use selection::*;
mod drag;
pub use drag::*;
mod builder;
pub use builder::*;
mod layout;
pub use layout::*;
mod inspector;
pub use inspector::*;
mod session;
pub use session::*;

#[derive(Debug, Error)]
pub enum EditError {
    #[error("invalid range {start}..{end} for duration {duration}")]
    InvalidRange { start: f64, end: f64, duration: f64 },
    #[error("{0} requires an attached payload")]
    MissingPayload(EditKind),
    #[error("{0} dialog is not open")]
    DialogClosed(EditKind),
    #[error("{0} takes no payload")]
    UnexpectedPayload(EditKind),
    #[error("edit {0} has a payload that contradicts its hasPayload flag")]
    InconsistentPayload(EditId),
    #[error("typed end {end} is not after typed start {start}")]
    ManualInputNonsensical { start: f64, end: f64 },
    #[error("invalid time input: {0}")]
    InvalidTimeInput(String),
    #[error("invalid duration: {0}")]
    InvalidDuration(f64),
    #[error("invalid selection: {0}")]
    InvalidSelection(String),
    #[error("edit not found: {0}")]
    EditNotFound(EditId),
    #[error("duplicate edit id: {0}")]
    DuplicateEdit(EditId),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EditError>;

pub type Seconds = f64; // media time, never rounded internally

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct EditId(pub Uuid);

impl EditId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EditId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EditId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What an edit does to the base media over its range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditKind {
    Add,
    Replace,
    Remove,
}

impl EditKind {
    /// Add and Replace carry uploaded media, Remove does not.
    pub fn requires_payload(&self) -> bool {
        matches!(self, Self::Add | Self::Replace)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Replace => "replace",
            Self::Remove => "remove",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Add => "ADD",
            Self::Replace => "REPLACE",
            Self::Remove => "REMOVE",
        }
    }

    pub fn border_color(&self) -> &'static str {
        match self {
            Self::Add => "#22c55e",     // Green
            Self::Replace => "#3b82f6", // Blue
            Self::Remove => "#ef4444",  // Red
        }
    }

    pub fn fill_color(&self) -> &'static str {
        match self {
            Self::Add => "rgba(34, 197, 94, 0.3)",
            Self::Replace => "rgba(59, 130, 246, 0.3)",
            Self::Remove => "rgba(239, 68, 68, 0.3)",
        }
    }
}

impl fmt::Display for EditKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
