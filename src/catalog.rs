use std::collections::BTreeMap;

use crate::error::StoreError;
use crate::segment::record::{AnnotationChoice, AnnotationEntry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelKind {
    SingleChoice,
    MultiChoice,
}

impl LabelKind {
    /// Wire `type` mapping: "multiselect" means multi-choice, anything
    /// else is single-choice.
    pub fn from_wire(kind: &str) -> Self {
        if kind == "multiselect" {
            LabelKind::MultiChoice
        } else {
            LabelKind::SingleChoice
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LabelValue {
    pub id: u64,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LabelDef {
    pub id: u64,
    pub kind: LabelKind,
    /// Allowed values, in the order the backend lists them.
    pub values: Vec<LabelValue>,
}

impl LabelDef {
    pub fn allows(&self, value_id: u64) -> bool {
        self.values.iter().any(|v| v.id == value_id)
    }
}

/// Immutable mapping from label name to its definition, loaded once per
/// editing session. Every annotation entering the store is validated here.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabelCatalog {
    labels: BTreeMap<String, LabelDef>,
}

impl LabelCatalog {
    pub fn new(labels: BTreeMap<String, LabelDef>) -> Self {
        Self { labels }
    }

    pub fn get(&self, name: &str) -> Option<&LabelDef> {
        self.labels.get(name)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &LabelDef)> {
        self.labels.iter()
    }

    /// Checks a user-supplied choice against the catalog: the label must
    /// exist, the choice shape must match the label kind, and every chosen
    /// value id must be in the allowed set.
    pub fn check_choice(
        &self,
        label: &str,
        choice: &AnnotationChoice,
    ) -> Result<&LabelDef, StoreError> {
        let def = self
            .labels
            .get(label)
            .ok_or_else(|| StoreError::UnknownLabel(label.to_string()))?;

        match (def.kind, choice) {
            (LabelKind::SingleChoice, AnnotationChoice::Single(value_id)) => {
                if !def.allows(*value_id) {
                    return Err(StoreError::UnknownValue {
                        label: label.to_string(),
                        value_id: *value_id,
                    });
                }
            }
            (LabelKind::MultiChoice, AnnotationChoice::Multi(value_ids)) => {
                for value_id in value_ids {
                    if !def.allows(*value_id) {
                        return Err(StoreError::UnknownValue {
                            label: label.to_string(),
                            value_id: *value_id,
                        });
                    }
                }
            }
            (LabelKind::SingleChoice, AnnotationChoice::Multi(_)) => {
                return Err(StoreError::ChoiceShape {
                    label: label.to_string(),
                    expected: "single",
                });
            }
            (LabelKind::MultiChoice, AnnotationChoice::Single(_)) => {
                return Err(StoreError::ChoiceShape {
                    label: label.to_string(),
                    expected: "multi",
                });
            }
        }

        Ok(def)
    }

    /// Full validation for a hydrated entry: the choice rules above plus
    /// the payload's label id matching the catalog's.
    pub fn check_entry(&self, label: &str, entry: &AnnotationEntry) -> Result<(), StoreError> {
        let def = self.check_choice(label, &entry.choice)?;
        if def.id != entry.label_id {
            return Err(StoreError::LabelIdMismatch {
                label: label.to_string(),
                got: entry.label_id,
                expected: def.id,
            });
        }
        Ok(())
    }
}
