use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::catalog::{LabelCatalog, LabelDef, LabelKind, LabelValue};
use crate::segment::record::{AnnotationChoice, AnnotationEntry};
use crate::segment::store::{SegmentDraft, SegmentSeed};

/// GET response for one audio item. The clip duration is not part of this
/// payload; the playback engine supplies it.
#[derive(Debug, Clone, Deserialize)]
pub struct AudioItemPayload {
    pub segmentations: Vec<SegmentationPayload>,
    #[serde(default)]
    pub reference_transcription: String,
    pub is_marked_for_review: bool,
    pub filename: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentationPayload {
    pub segmentation_id: u64,
    pub start_time: f64,
    pub end_time: f64,
    #[serde(default)]
    pub transcription: String,
    #[serde(default)]
    pub annotations: HashMap<String, AnnotationPayload>,
}

/// One label's answer on the wire: the label id plus either a bare value
/// id (single-choice) or an array of value ids (multi-choice).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotationPayload {
    pub label_id: u64,
    pub values: AnnotationValues,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnnotationValues {
    One(u64),
    Many(Vec<u64>),
}

/// POST/PUT body for a single segment. Annotations are the full current
/// mapping; the backend row is a complete overwrite.
#[derive(Debug, Clone, Serialize)]
pub struct SegmentBody {
    pub start: f64,
    pub end: f64,
    pub transcription: String,
    pub annotations: HashMap<String, AnnotationPayload>,
}

/// Create response. Only the assigned id matters; anything else the
/// backend echoes is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateResponse {
    pub segmentation_id: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewFlagBody {
    pub is_marked_for_review: bool,
}

/// GET response for the label catalog: label name -> definition.
#[derive(Debug, Clone, Deserialize)]
pub struct LabelPayload {
    pub label_id: u64,
    #[serde(rename = "type")]
    pub kind: String,
    pub values: Vec<LabelValuePayload>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LabelValuePayload {
    pub value_id: u64,
    pub value: String,
}

pub fn catalog_from_payload(payload: HashMap<String, LabelPayload>) -> LabelCatalog {
    let labels = payload
        .into_iter()
        .map(|(name, label)| {
            let def = LabelDef {
                id: label.label_id,
                kind: LabelKind::from_wire(&label.kind),
                values: label
                    .values
                    .into_iter()
                    .map(|v| LabelValue {
                        id: v.value_id,
                        text: v.value,
                    })
                    .collect(),
            };
            (name, def)
        })
        .collect();
    LabelCatalog::new(labels)
}

/// Structural decode of one segmentation row. Semantic validation (ranges,
/// catalog membership) belongs to the store's hydrate.
pub fn seed_from_payload(payload: SegmentationPayload) -> SegmentSeed {
    let annotations = payload
        .annotations
        .into_iter()
        .map(|(label, ann)| {
            let choice = match ann.values {
                AnnotationValues::One(id) => AnnotationChoice::Single(id),
                AnnotationValues::Many(ids) => AnnotationChoice::Multi(ids.into_iter().collect()),
            };
            (
                label,
                AnnotationEntry {
                    label_id: ann.label_id,
                    choice,
                },
            )
        })
        .collect();

    SegmentSeed {
        backend_id: payload.segmentation_id,
        start: payload.start_time,
        end: payload.end_time,
        transcription: payload.transcription,
        annotations,
    }
}

fn annotations_to_wire(
    annotations: &BTreeMap<String, AnnotationEntry>,
) -> HashMap<String, AnnotationPayload> {
    annotations
        .iter()
        .map(|(label, entry)| {
            let values = match &entry.choice {
                AnnotationChoice::Single(id) => AnnotationValues::One(*id),
                AnnotationChoice::Multi(ids) => {
                    AnnotationValues::Many(ids.iter().copied().collect())
                }
            };
            (
                label.clone(),
                AnnotationPayload {
                    label_id: entry.label_id,
                    values,
                },
            )
        })
        .collect()
}

impl From<&SegmentDraft> for SegmentBody {
    fn from(draft: &SegmentDraft) -> Self {
        SegmentBody {
            start: draft.start,
            end: draft.end,
            transcription: draft.transcription.clone(),
            annotations: annotations_to_wire(&draft.annotations),
        }
    }
}
