use thiserror::Error;

use crate::segment::record::PendingOp;

/// Violations of the Segment Store's own rules: selection, range,
/// catalog, and per-record in-flight invariants.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no segment is selected")]
    NoSelection,

    #[error("a {0} is already in flight for this segment")]
    OperationInFlight(PendingOp),

    #[error("invalid time range {start}..{end} for a clip of {duration}s")]
    InvalidRange {
        start: f64,
        end: f64,
        duration: f64,
    },

    #[error("duplicate backend segment id {0} in segmentation list")]
    DuplicateBackendId(u64),

    #[error("unknown label `{0}`")]
    UnknownLabel(String),

    #[error("label `{label}` does not allow value {value_id}")]
    UnknownValue { label: String, value_id: u64 },

    #[error("label `{label}` expects a {expected} choice")]
    ChoiceShape {
        label: String,
        expected: &'static str,
    },

    #[error("label `{label}` id mismatch: payload says {got}, catalog says {expected}")]
    LabelIdMismatch {
        label: String,
        got: u64,
        expected: u64,
    },
}

/// Transport-level failures. The store never sees these directly; the
/// session maps them into its taxonomy below.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("backend request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("backend returned status {0}")]
    Status(reqwest::StatusCode),
}

/// Session-level taxonomy. `Load` and `Malformed` are fatal to the editing
/// session; the rest are transient and retried only by the user repeating
/// the action.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to load audio item: {0}")]
    Load(#[source] BackendError),

    #[error("malformed segmentation payload: {0}")]
    Malformed(#[source] StoreError),

    #[error("segment save failed: {0}")]
    Save(#[source] BackendError),

    #[error("segment delete failed: {0}")]
    Delete(#[source] BackendError),

    #[error("review flag update failed: {0}")]
    ReviewFlag(#[source] BackendError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
