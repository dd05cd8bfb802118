use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use uuid::Uuid;

use crate::error::StoreError;

/// Time bounds of a segment, in seconds. `start < end`, both within
/// `[0, clip duration]`; enforced at construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeRange {
    pub start: f64,
    pub end: f64,
}

impl TimeRange {
    pub fn new(start: f64, end: f64, duration: f64) -> Result<Self, StoreError> {
        if !start.is_finite() || !end.is_finite() || start < 0.0 || end > duration || start >= end {
            return Err(StoreError::InvalidRange {
                start,
                end,
                duration,
            });
        }
        Ok(Self { start, end })
    }

    pub fn length(&self) -> f64 {
        self.end - self.start
    }
}

/// The recorded answer for one label on one segment. Single-choice labels
/// hold one value id; multi-choice labels hold the full set the control
/// last reported (always a replacement, never a delta).
#[derive(Debug, Clone, PartialEq)]
pub enum AnnotationChoice {
    Single(u64),
    Multi(BTreeSet<u64>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationEntry {
    pub label_id: u64,
    pub choice: AnnotationChoice,
}

/// Backend-facing operation currently in flight for a record. The store
/// rejects overlapping save/delete on the same record while one is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingOp {
    Save,
    Delete,
}

impl fmt::Display for PendingOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PendingOp::Save => write!(f, "save"),
            PendingOp::Delete => write!(f, "delete"),
        }
    }
}

/// The unit of work: one time-bounded region with its transcription and
/// annotations. `backend_id` absent means the segment has never been
/// persisted; present means it mirrors a backend row.
///
/// Records are created and mutated only through the store, which is the
/// sole owner of the collection.
#[derive(Debug, Clone)]
pub struct SegmentRecord {
    /// Stable in-memory identity. Never sent to the backend; used to match
    /// late transport results to a record that may already be gone.
    pub local_id: Uuid,
    pub time_range: TimeRange,
    pub transcription: String,
    pub annotations: BTreeMap<String, AnnotationEntry>,
    pub(crate) backend_id: Option<u64>,
    pub(crate) pending: Option<PendingOp>,
}

impl SegmentRecord {
    /// A freshly drawn region: no backend id, empty payload.
    pub(crate) fn unsynced(time_range: TimeRange) -> Self {
        Self {
            local_id: Uuid::new_v4(),
            time_range,
            transcription: String::new(),
            annotations: BTreeMap::new(),
            backend_id: None,
            pending: None,
        }
    }

    /// A record hydrated from a backend row.
    pub(crate) fn hydrated(
        time_range: TimeRange,
        backend_id: u64,
        transcription: String,
        annotations: BTreeMap<String, AnnotationEntry>,
    ) -> Self {
        Self {
            local_id: Uuid::new_v4(),
            time_range,
            transcription,
            annotations,
            backend_id: Some(backend_id),
            pending: None,
        }
    }

    pub fn backend_id(&self) -> Option<u64> {
        self.backend_id
    }

    /// True once the record mirrors a backend row.
    pub fn is_synced(&self) -> bool {
        self.backend_id.is_some()
    }

    pub fn pending(&self) -> Option<PendingOp> {
        self.pending
    }
}
