use std::sync::Arc;

use tracing::{info, warn};

use crate::error::SessionError;
use crate::segment::store::{DeleteAction, SaveRequest, SegmentStore};
use crate::sync::backend::SegmentBackend;
use crate::sync::payload::{self, SegmentBody};

/// One audio item's editing session: the segment store, the label catalog
/// handle, the read-only reference transcription, and the review flag.
///
/// The session is the driver: the store decides *what* backend work to do
/// (`SyncRequest`), the session performs it and reports the outcome back.
/// All calls run on one logical flow; backend calls are async but nothing
/// here is shared across tasks.
#[derive(Debug)]
pub struct AnnotationSession<B: SegmentBackend> {
    backend: B,
    audio_id: u64,
    store: SegmentStore,
    filename: String,
    reference_transcription: String,
    marked_for_review: bool,
}

impl<B: SegmentBackend> AnnotationSession<B> {
    /// Fetches the label catalog and the item payload, then hydrates the
    /// store. Any transport or validation failure here is fatal to the
    /// editing session and no partial state is kept.
    ///
    /// `duration_secs` comes from the playback engine, which owns decoding;
    /// the item payload does not carry it.
    pub async fn load(
        backend: B,
        audio_id: u64,
        duration_secs: f64,
    ) -> Result<Self, SessionError> {
        let labels = backend.load_labels().await.map_err(SessionError::Load)?;
        let catalog = Arc::new(payload::catalog_from_payload(labels));

        let item = backend
            .load_item(audio_id)
            .await
            .map_err(SessionError::Load)?;

        let seeds = item
            .segmentations
            .into_iter()
            .map(payload::seed_from_payload)
            .collect();

        let mut store = SegmentStore::new(catalog, duration_secs);
        store.hydrate(seeds).map_err(SessionError::Malformed)?;

        info!(
            audio_id,
            segments = store.records().len(),
            filename = %item.filename,
            "audio item loaded"
        );

        Ok(Self {
            backend,
            audio_id,
            store,
            filename: item.filename,
            reference_transcription: item.reference_transcription,
            marked_for_review: item.is_marked_for_review,
        })
    }

    pub fn store(&self) -> &SegmentStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut SegmentStore {
        &mut self.store
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Backend-supplied, never edited by this core.
    pub fn reference_transcription(&self) -> &str {
        &self.reference_transcription
    }

    pub fn is_marked_for_review(&self) -> bool {
        self.marked_for_review
    }

    /// Persists the selected record: one create per never-synced record,
    /// an update at the existing id otherwise. On failure the local edits
    /// stay as they are and the record remains unsynced/dirty.
    pub async fn save_selected(&mut self) -> Result<(), SessionError> {
        match self.store.begin_save()? {
            SaveRequest::Create { local_id, draft } => {
                let body = SegmentBody::from(&draft);
                match self.backend.create_segment(self.audio_id, &body).await {
                    Ok(assigned) => {
                        self.store.commit_save(local_id, Some(assigned));
                        Ok(())
                    }
                    Err(err) => {
                        warn!(%local_id, %err, "segment create failed");
                        self.store.abort_save(local_id);
                        Err(SessionError::Save(err))
                    }
                }
            }
            SaveRequest::Update {
                local_id,
                backend_id,
                draft,
            } => {
                let body = SegmentBody::from(&draft);
                match self
                    .backend
                    .update_segment(self.audio_id, backend_id, &body)
                    .await
                {
                    Ok(()) => {
                        self.store.commit_save(local_id, None);
                        Ok(())
                    }
                    Err(err) => {
                        warn!(%local_id, backend_id, %err, "segment update failed");
                        self.store.abort_save(local_id);
                        Err(SessionError::Save(err))
                    }
                }
            }
        }
    }

    /// Removes the selected record. Unsynced records go synchronously;
    /// synced ones leave the collection only after the backend confirms.
    /// On failure the record is still present and still selected.
    pub async fn delete_selected(&mut self) -> Result<(), SessionError> {
        match self.store.begin_delete()? {
            DeleteAction::Removed => Ok(()),
            DeleteAction::Pending {
                local_id,
                backend_id,
            } => match self.backend.delete_segment(self.audio_id, backend_id).await {
                Ok(()) => {
                    self.store.commit_delete(local_id);
                    Ok(())
                }
                Err(err) => {
                    warn!(%local_id, backend_id, %err, "segment delete failed");
                    self.store.abort_delete(local_id);
                    Err(SessionError::Delete(err))
                }
            },
        }
    }

    /// Persists the review flag. The user's value is displayed
    /// immediately; on success it is replaced by whatever the backend
    /// echoed, on failure it stays as the user set it and the error is
    /// surfaced.
    pub async fn set_review_flag(&mut self, flag: bool) -> Result<bool, SessionError> {
        self.marked_for_review = flag;
        match self.backend.set_review_flag(self.audio_id, flag).await {
            Ok(echoed) => {
                self.marked_for_review = echoed;
                Ok(echoed)
            }
            Err(err) => {
                warn!(audio_id = self.audio_id, flag, %err, "review flag update failed");
                Err(SessionError::ReviewFlag(err))
            }
        }
    }
}
