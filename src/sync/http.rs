use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use tracing::debug;

use crate::error::BackendError;
use crate::sync::backend::SegmentBackend;
use crate::sync::payload::{
    AudioItemPayload, CreateResponse, LabelPayload, ReviewFlagBody, SegmentBody,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP implementation of the synchronization protocol. Segments live
/// under `{base}/audios/{id}/segmentations`, the review flag is patched on
/// the item itself, and the label catalog hangs off `{base}/labels`.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_default(),
            base_url: base_url.into(),
        }
    }

    fn item_url(&self, audio_id: u64) -> String {
        format!("{}/audios/{}", self.base_url, audio_id)
    }

    fn segments_url(&self, audio_id: u64) -> String {
        format!("{}/audios/{}/segmentations", self.base_url, audio_id)
    }

    fn segment_url(&self, audio_id: u64, segmentation_id: u64) -> String {
        format!(
            "{}/audios/{}/segmentations/{}",
            self.base_url, audio_id, segmentation_id
        )
    }

    fn check_status(response: Response) -> Result<Response, BackendError> {
        if !response.status().is_success() {
            return Err(BackendError::Status(response.status()));
        }
        Ok(response)
    }
}

#[async_trait]
impl SegmentBackend for HttpBackend {
    async fn load_item(&self, audio_id: u64) -> Result<AudioItemPayload, BackendError> {
        let response = self.client.get(self.item_url(audio_id)).send().await?;
        let response = Self::check_status(response)?;
        Ok(response.json().await?)
    }

    async fn load_labels(&self) -> Result<HashMap<String, LabelPayload>, BackendError> {
        let response = self
            .client
            .get(format!("{}/labels", self.base_url))
            .send()
            .await?;
        let response = Self::check_status(response)?;
        Ok(response.json().await?)
    }

    async fn create_segment(
        &self,
        audio_id: u64,
        body: &SegmentBody,
    ) -> Result<u64, BackendError> {
        let response = self
            .client
            .post(self.segments_url(audio_id))
            .json(body)
            .send()
            .await?;
        let response = Self::check_status(response)?;
        let created: CreateResponse = response.json().await?;
        debug!(audio_id, segmentation_id = created.segmentation_id, "segment created");
        Ok(created.segmentation_id)
    }

    async fn update_segment(
        &self,
        audio_id: u64,
        segmentation_id: u64,
        body: &SegmentBody,
    ) -> Result<(), BackendError> {
        let response = self
            .client
            .put(self.segment_url(audio_id, segmentation_id))
            .json(body)
            .send()
            .await?;
        // No identifier is required in the response body.
        Self::check_status(response)?;
        Ok(())
    }

    async fn delete_segment(
        &self,
        audio_id: u64,
        segmentation_id: u64,
    ) -> Result<(), BackendError> {
        let response = self
            .client
            .delete(self.segment_url(audio_id, segmentation_id))
            .send()
            .await?;
        Self::check_status(response)?;
        Ok(())
    }

    async fn set_review_flag(&self, audio_id: u64, flag: bool) -> Result<bool, BackendError> {
        let response = self
            .client
            .patch(self.item_url(audio_id))
            .json(&ReviewFlagBody {
                is_marked_for_review: flag,
            })
            .send()
            .await?;
        let response = Self::check_status(response)?;
        let echoed: ReviewFlagBody = response.json().await?;
        Ok(echoed.is_marked_for_review)
    }
}
