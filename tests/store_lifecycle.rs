use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use clipnote::catalog::{LabelCatalog, LabelDef, LabelKind, LabelValue};
use clipnote::error::StoreError;
use clipnote::segment::record::{AnnotationChoice, AnnotationEntry};
use clipnote::segment::store::{SegmentSeed, SegmentStore};

const CLIP_SECS: f64 = 30.0;

fn catalog() -> Arc<LabelCatalog> {
    let mut labels = BTreeMap::new();
    labels.insert(
        "mood".to_string(),
        LabelDef {
            id: 11,
            kind: LabelKind::SingleChoice,
            values: vec![
                LabelValue { id: 1, text: "calm".into() },
                LabelValue { id: 2, text: "tense".into() },
                LabelValue { id: 3, text: "happy".into() },
            ],
        },
    );
    labels.insert(
        "noise".to_string(),
        LabelDef {
            id: 12,
            kind: LabelKind::MultiChoice,
            values: vec![
                LabelValue { id: 2, text: "traffic".into() },
                LabelValue { id: 5, text: "wind".into() },
                LabelValue { id: 7, text: "crowd".into() },
            ],
        },
    );
    Arc::new(LabelCatalog::new(labels))
}

fn store() -> SegmentStore {
    SegmentStore::new(catalog(), CLIP_SECS)
}

fn seed(backend_id: u64, start: f64, end: f64) -> SegmentSeed {
    SegmentSeed {
        backend_id,
        start,
        end,
        transcription: String::new(),
        annotations: BTreeMap::new(),
    }
}

fn multi(ids: &[u64]) -> AnnotationChoice {
    AnnotationChoice::Multi(ids.iter().copied().collect::<BTreeSet<u64>>())
}

#[test]
fn hydration_mirrors_each_backend_row() {
    let mut store = store();
    store
        .hydrate(vec![seed(4, 0.0, 2.5), seed(9, 2.5, 10.0), seed(2, 12.0, 20.0)])
        .unwrap();

    assert_eq!(store.records().len(), 3, "one record per backend row");
    let ids: Vec<_> = store.records().iter().map(|r| r.backend_id()).collect();
    assert_eq!(ids, vec![Some(4), Some(9), Some(2)]);

    // No auto-created full-duration record when the list is non-empty.
    assert!(store.records().iter().all(|r| r.is_synced()));

    // First record becomes the selection.
    assert_eq!(
        store.selected().map(|r| r.backend_id()),
        Some(Some(4)),
        "first hydrated record should be selected"
    );
}

#[test]
fn empty_hydration_auto_creates_full_duration_record() {
    let mut store = store();
    store.hydrate(Vec::new()).unwrap();

    assert_eq!(store.records().len(), 1);
    let record = &store.records()[0];
    assert_eq!(record.backend_id(), None, "auto record was never persisted");
    assert_eq!(record.time_range.start, 0.0);
    assert_eq!(record.time_range.end, CLIP_SECS);
    assert_eq!(
        store.selected_id(),
        Some(record.local_id),
        "auto record becomes the selection"
    );
}

#[test]
fn malformed_hydration_leaves_previous_collection_untouched() {
    let mut store = store();
    store.hydrate(vec![seed(1, 0.0, 5.0), seed(2, 5.0, 9.0)]).unwrap();

    // Inverted range
    let err = store
        .hydrate(vec![seed(3, 8.0, 3.0)])
        .expect_err("inverted range must fail");
    assert!(matches!(err, StoreError::InvalidRange { .. }));
    assert_eq!(store.records().len(), 2, "no partial hydration");

    // Range past the clip end
    let err = store
        .hydrate(vec![seed(3, 0.0, CLIP_SECS + 1.0)])
        .expect_err("range past clip end must fail");
    assert!(matches!(err, StoreError::InvalidRange { .. }));

    // Duplicate backend ids
    let err = store
        .hydrate(vec![seed(7, 0.0, 1.0), seed(7, 2.0, 3.0)])
        .expect_err("duplicate backend id must fail");
    assert!(matches!(err, StoreError::DuplicateBackendId(7)));
    assert_eq!(store.records().len(), 2);
}

#[test]
fn hydration_validates_annotations_against_catalog() {
    let mut store = store();

    let mut bad_label = seed(1, 0.0, 1.0);
    bad_label.annotations.insert(
        "speaker".to_string(),
        AnnotationEntry { label_id: 99, choice: AnnotationChoice::Single(1) },
    );
    assert!(matches!(
        store.hydrate(vec![bad_label]),
        Err(StoreError::UnknownLabel(_))
    ));

    let mut bad_value = seed(1, 0.0, 1.0);
    bad_value.annotations.insert(
        "mood".to_string(),
        AnnotationEntry { label_id: 11, choice: AnnotationChoice::Single(42) },
    );
    assert!(matches!(
        store.hydrate(vec![bad_value]),
        Err(StoreError::UnknownValue { .. })
    ));

    let mut bad_shape = seed(1, 0.0, 1.0);
    bad_shape.annotations.insert(
        "mood".to_string(),
        AnnotationEntry { label_id: 11, choice: multi(&[1]) },
    );
    assert!(matches!(
        store.hydrate(vec![bad_shape]),
        Err(StoreError::ChoiceShape { .. })
    ));

    let mut bad_id = seed(1, 0.0, 1.0);
    bad_id.annotations.insert(
        "mood".to_string(),
        AnnotationEntry { label_id: 12, choice: AnnotationChoice::Single(1) },
    );
    assert!(matches!(
        store.hydrate(vec![bad_id]),
        Err(StoreError::LabelIdMismatch { .. })
    ));
}

#[test]
fn drawn_region_starts_unsynced_and_selected() {
    let mut store = store();
    store.hydrate(vec![seed(1, 0.0, 5.0)]).unwrap();

    let local_id = store.create_from_region(6.0, 9.5).unwrap();

    let record = store.get(local_id).unwrap();
    assert_eq!(record.backend_id(), None);
    assert!(record.transcription.is_empty());
    assert!(record.annotations.is_empty());
    assert_eq!(store.selected_id(), Some(local_id), "new region is selected");

    assert!(matches!(
        store.create_from_region(5.0, 5.0),
        Err(StoreError::InvalidRange { .. })
    ));
}

#[test]
fn selecting_a_vanished_record_clears_selection() {
    let mut store = store();
    store.hydrate(vec![seed(1, 0.0, 5.0)]).unwrap();

    let ghost = uuid::Uuid::new_v4();
    store.select(Some(ghost));
    assert_eq!(store.selected_id(), None, "unknown id clears selection");

    // Idempotent: clearing twice stays cleared.
    store.select(None);
    store.select(None);
    assert_eq!(store.selected_id(), None);
}

#[test]
fn edits_without_selection_are_silent_noops() {
    let mut store = store();
    store.hydrate(vec![seed(1, 0.0, 5.0)]).unwrap();
    store.select(None);

    store.update_transcription("lost words");
    // Even an invalid label is ignored when nothing is selected: the
    // selection check runs before validation.
    store
        .update_annotation("no-such-label", AnnotationChoice::Single(1))
        .unwrap();

    assert!(store.records()[0].transcription.is_empty());
    assert!(store.records()[0].annotations.is_empty());
}

#[test]
fn multi_choice_updates_replace_the_full_set() {
    let mut store = store();
    store.hydrate(Vec::new()).unwrap();

    store.update_annotation("noise", multi(&[2, 5])).unwrap();
    store.update_annotation("noise", multi(&[5])).unwrap();

    let record = store.selected().unwrap();
    let entry = record.annotations.get("noise").unwrap();
    assert_eq!(
        entry.choice,
        multi(&[5]),
        "second report replaces the set, it is not merged"
    );
    assert_eq!(entry.label_id, 12, "label id comes from the catalog");
}

#[test]
fn empty_multi_choice_set_means_unanswered() {
    let mut store = store();
    store.hydrate(Vec::new()).unwrap();

    store.update_annotation("noise", multi(&[2, 5])).unwrap();
    store.update_annotation("noise", multi(&[])).unwrap();

    assert!(
        store.selected().unwrap().annotations.get("noise").is_none(),
        "deselecting everything removes the entry"
    );
}

#[test]
fn annotation_edits_are_validated_at_the_boundary() {
    let mut store = store();
    store.hydrate(Vec::new()).unwrap();

    assert!(matches!(
        store.update_annotation("speaker", AnnotationChoice::Single(1)),
        Err(StoreError::UnknownLabel(_))
    ));
    assert!(matches!(
        store.update_annotation("mood", AnnotationChoice::Single(42)),
        Err(StoreError::UnknownValue { .. })
    ));
    assert!(matches!(
        store.update_annotation("mood", multi(&[1])),
        Err(StoreError::ChoiceShape { .. })
    ));
    assert!(matches!(
        store.update_annotation("noise", AnnotationChoice::Single(2)),
        Err(StoreError::ChoiceShape { .. })
    ));
    assert!(store.selected().unwrap().annotations.is_empty());
}

#[test]
fn transcription_edit_lands_on_the_selected_record() {
    let mut store = store();
    store.hydrate(vec![seed(1, 0.0, 5.0), seed(2, 5.0, 9.0)]).unwrap();

    let second = store.records()[1].local_id;
    store.select(Some(second));
    store.update_transcription("hello there");

    assert!(store.records()[0].transcription.is_empty());
    assert_eq!(store.records()[1].transcription, "hello there");
}
