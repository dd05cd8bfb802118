use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::BackendError;
use crate::sync::payload::{AudioItemPayload, LabelPayload, SegmentBody};

/// The transport seam for the synchronization protocol. One implementation
/// speaks HTTP (`HttpBackend`); tests plug in in-memory fakes.
///
/// None of these calls are cancellable, and none are retried here; every
/// retry is the user repeating the action.
#[async_trait]
pub trait SegmentBackend {
    /// Segmentation list plus item-level context for one audio item.
    async fn load_item(&self, audio_id: u64) -> Result<AudioItemPayload, BackendError>;

    /// The label catalog, fetched once per editing session.
    async fn load_labels(&self) -> Result<HashMap<String, LabelPayload>, BackendError>;

    /// Creates a segment and returns the backend-assigned id.
    async fn create_segment(
        &self,
        audio_id: u64,
        body: &SegmentBody,
    ) -> Result<u64, BackendError>;

    /// Overwrites the segment at `segmentation_id` with `body`.
    async fn update_segment(
        &self,
        audio_id: u64,
        segmentation_id: u64,
        body: &SegmentBody,
    ) -> Result<(), BackendError>;

    async fn delete_segment(&self, audio_id: u64, segmentation_id: u64)
        -> Result<(), BackendError>;

    /// Persists the review flag and returns the value the backend stored.
    async fn set_review_flag(&self, audio_id: u64, flag: bool) -> Result<bool, BackendError>;
}
