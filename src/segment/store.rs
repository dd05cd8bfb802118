use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use tracing::{debug, warn};
use uuid::Uuid;

use crate::catalog::LabelCatalog;
use crate::error::StoreError;
use crate::segment::record::{
    AnnotationChoice, AnnotationEntry, PendingOp, SegmentRecord, TimeRange,
};

/// One backend segmentation row, already decoded from the wire but not yet
/// validated. The store validates the whole batch before touching its
/// collection.
#[derive(Debug, Clone)]
pub struct SegmentSeed {
    pub backend_id: u64,
    pub start: f64,
    pub end: f64,
    pub transcription: String,
    pub annotations: BTreeMap<String, AnnotationEntry>,
}

/// Snapshot of a record's payload at the moment a save was begun.
/// Annotations are always the full current mapping: the backend row is a
/// complete overwrite, never a merge.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentDraft {
    pub start: f64,
    pub end: f64,
    pub transcription: String,
    pub annotations: BTreeMap<String, AnnotationEntry>,
}

/// Backend work a save wants done. The store never performs I/O itself;
/// the session executes the request and reports back through
/// `commit_save` / `abort_save`.
#[derive(Debug, Clone, PartialEq)]
pub enum SaveRequest {
    Create {
        local_id: Uuid,
        draft: SegmentDraft,
    },
    Update {
        local_id: Uuid,
        backend_id: u64,
        draft: SegmentDraft,
    },
}

/// Outcome of `begin_delete`: unsynced records are removed on the spot,
/// synced records wait for the backend to confirm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteAction {
    Removed,
    Pending { local_id: Uuid, backend_id: u64 },
}

/// Owns the in-memory collection of segment records for one audio item and
/// the single selection pointer. Every creation, mutation, deletion, and
/// persistence flows through here.
#[derive(Debug, Clone)]
pub struct SegmentStore {
    catalog: Arc<LabelCatalog>,
    duration_secs: f64,
    records: Vec<SegmentRecord>,
    selected: Option<Uuid>,
}

impl SegmentStore {
    pub fn new(catalog: Arc<LabelCatalog>, duration_secs: f64) -> Self {
        Self {
            catalog,
            duration_secs,
            records: Vec::new(),
            selected: None,
        }
    }

    pub fn duration_secs(&self) -> f64 {
        self.duration_secs
    }

    pub fn records(&self) -> &[SegmentRecord] {
        &self.records
    }

    pub fn get(&self, local_id: Uuid) -> Option<&SegmentRecord> {
        self.records.iter().find(|r| r.local_id == local_id)
    }

    pub fn selected(&self) -> Option<&SegmentRecord> {
        self.selected.and_then(|id| self.get(id))
    }

    pub fn selected_id(&self) -> Option<Uuid> {
        self.selected
    }

    fn get_mut(&mut self, local_id: Uuid) -> Option<&mut SegmentRecord> {
        self.records.iter_mut().find(|r| r.local_id == local_id)
    }

    fn selected_mut(&mut self) -> Option<&mut SegmentRecord> {
        let id = self.selected?;
        self.get_mut(id)
    }

    /// Replaces the collection with one record per backend row. The whole
    /// batch (ranges, duplicate backend ids, every annotation against the
    /// catalog) is validated first, so a malformed list leaves the
    /// store untouched. An empty list auto-creates one full-duration
    /// record so the item is never left without a segment to annotate.
    /// The first record becomes the selection.
    pub fn hydrate(&mut self, seeds: Vec<SegmentSeed>) -> Result<(), StoreError> {
        let mut incoming = Vec::with_capacity(seeds.len());
        let mut seen_ids = BTreeSet::new();

        for seed in seeds {
            let range = TimeRange::new(seed.start, seed.end, self.duration_secs)?;
            if !seen_ids.insert(seed.backend_id) {
                return Err(StoreError::DuplicateBackendId(seed.backend_id));
            }
            for (label, entry) in &seed.annotations {
                self.catalog.check_entry(label, entry)?;
            }
            incoming.push(SegmentRecord::hydrated(
                range,
                seed.backend_id,
                seed.transcription,
                seed.annotations,
            ));
        }

        self.records = incoming;
        self.selected = None;

        if self.records.is_empty() {
            // Zero segments at load time: one full-duration region, selected.
            let range = TimeRange::new(0.0, self.duration_secs, self.duration_secs)?;
            let record = SegmentRecord::unsynced(range);
            self.selected = Some(record.local_id);
            self.records.push(record);
        } else {
            self.selected = Some(self.records[0].local_id);
        }

        Ok(())
    }

    /// Appends a new unsynced record for a freshly drawn region and
    /// selects it.
    pub fn create_from_region(&mut self, start: f64, end: f64) -> Result<Uuid, StoreError> {
        let range = TimeRange::new(start, end, self.duration_secs)?;
        let record = SegmentRecord::unsynced(range);
        let local_id = record.local_id;
        self.records.push(record);
        self.selected = Some(local_id);
        Ok(local_id)
    }

    /// Sets or clears the selection pointer. An id that is no longer in
    /// the collection clears selection instead of dangling.
    pub fn select(&mut self, local_id: Option<Uuid>) {
        match local_id {
            Some(id) if self.get(id).is_some() => self.selected = Some(id),
            Some(id) => {
                debug!(%id, "selected segment no longer exists, clearing selection");
                self.selected = None;
            }
            None => self.selected = None,
        }
    }

    /// Sets the selected record's transcription. Silent no-op with no
    /// selection: the UI only shows edit controls while something is
    /// selected, but a delete can land in between.
    pub fn update_transcription(&mut self, text: &str) {
        if let Some(record) = self.selected_mut() {
            record.transcription = text.to_string();
        }
    }

    /// Replaces the selected record's answer for `label` wholesale. A
    /// multi-choice control reports its full state each time, so the
    /// stored set is always the latest report; an empty multi set means
    /// "unanswered" and removes the entry.
    pub fn update_annotation(
        &mut self,
        label: &str,
        choice: AnnotationChoice,
    ) -> Result<(), StoreError> {
        if self.selected().is_none() {
            return Ok(());
        }

        let def = self.catalog.check_choice(label, &choice)?;
        let label_id = def.id;

        let record = self.selected_mut().ok_or(StoreError::NoSelection)?;
        if matches!(&choice, AnnotationChoice::Multi(set) if set.is_empty()) {
            record.annotations.remove(label);
        } else {
            record
                .annotations
                .insert(label.to_string(), AnnotationEntry { label_id, choice });
        }
        Ok(())
    }

    /// Starts persisting the selected record: marks it save-pending and
    /// returns the backend request to perform. A record that was never
    /// synced yields a create, a synced one an update at its backend id.
    pub fn begin_save(&mut self) -> Result<SaveRequest, StoreError> {
        let record = self.selected_mut().ok_or(StoreError::NoSelection)?;
        if let Some(op) = record.pending {
            return Err(StoreError::OperationInFlight(op));
        }
        record.pending = Some(PendingOp::Save);

        let draft = SegmentDraft {
            start: record.time_range.start,
            end: record.time_range.end,
            transcription: record.transcription.clone(),
            annotations: record.annotations.clone(),
        };

        Ok(match record.backend_id {
            None => SaveRequest::Create {
                local_id: record.local_id,
                draft,
            },
            Some(backend_id) => SaveRequest::Update {
                local_id: record.local_id,
                backend_id,
                draft,
            },
        })
    }

    /// Applies a successful save. `assigned` is the id the backend handed
    /// back for a create; it attaches only if the record had none, since an
    /// already-synced record keeps its id no matter what the response
    /// body said. A result for a record that has since vanished is
    /// discarded.
    pub fn commit_save(&mut self, local_id: Uuid, assigned: Option<u64>) {
        let Some(record) = self.get_mut(local_id) else {
            debug!(%local_id, "save result for vanished segment, discarding");
            return;
        };
        record.pending = None;
        match (record.backend_id, assigned) {
            (None, Some(id)) => record.backend_id = Some(id),
            (None, None) => warn!(%local_id, "create resolved without a backend id"),
            (Some(_), _) => {}
        }
    }

    /// Save failed: the record stays unsynced/dirty with its local edits
    /// intact, ready for the user to retry.
    pub fn abort_save(&mut self, local_id: Uuid) {
        if let Some(record) = self.get_mut(local_id) {
            record.pending = None;
        } else {
            debug!(%local_id, "save failure for vanished segment, discarding");
        }
    }

    /// Starts deleting the selected record. Unsynced records are removed
    /// immediately with no network involvement; synced records stay put
    /// (and stay selected) until the backend confirms.
    pub fn begin_delete(&mut self) -> Result<DeleteAction, StoreError> {
        let record = self.selected_mut().ok_or(StoreError::NoSelection)?;
        if let Some(op) = record.pending {
            return Err(StoreError::OperationInFlight(op));
        }

        match record.backend_id {
            None => {
                let local_id = record.local_id;
                self.remove(local_id);
                Ok(DeleteAction::Removed)
            }
            Some(backend_id) => {
                record.pending = Some(PendingOp::Delete);
                Ok(DeleteAction::Pending {
                    local_id: record.local_id,
                    backend_id,
                })
            }
        }
    }

    /// Backend confirmed the delete: the record leaves the collection.
    pub fn commit_delete(&mut self, local_id: Uuid) {
        if self.get(local_id).is_some() {
            self.remove(local_id);
        } else {
            debug!(%local_id, "delete result for vanished segment, discarding");
        }
    }

    /// Backend rejected the delete: the record remains in the collection
    /// and selected, exactly as before the attempt.
    pub fn abort_delete(&mut self, local_id: Uuid) {
        if let Some(record) = self.get_mut(local_id) {
            record.pending = None;
        } else {
            debug!(%local_id, "delete failure for vanished segment, discarding");
        }
    }

    fn remove(&mut self, local_id: Uuid) {
        self.records.retain(|r| r.local_id != local_id);
        // Selection is a pointer, never an owner: it cannot outlive the record.
        if self.selected == Some(local_id) {
            self.selected = None;
        }
    }
}
