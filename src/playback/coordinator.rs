use tracing::debug;
use uuid::Uuid;

use crate::segment::store::SegmentStore;

/// Events the waveform engine emits about its regions. Regions are keyed
/// by the backing record's `local_id`: the engine holds an identifier
/// back-reference, never ownership of the record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegionEvent {
    /// Playback position crossed into a region.
    Entered(Uuid),
    /// Playback position left the current region.
    Exited,
    /// The user clicked a region.
    Clicked(Uuid),
}

/// Instructions back to the embedding UI / waveform engine.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEffect {
    /// Show this transcription as read-only context while playback scans
    /// through the region.
    ShowPreview { transcription: String },
    ClearPreview,
    /// Play just this region; the engine auto-pauses at `end`.
    PlayRegion { start: f64, end: f64 },
}

/// Thin adapter between the waveform engine and the store.
///
/// Auto-scan during playback drives only the read-only preview; the
/// editable selection used by save/delete moves on clicks alone, so a
/// passing playhead can never silently retarget the user's edits.
#[derive(Debug, Default)]
pub struct PlaybackCoordinator {
    preview: Option<Uuid>,
}

impl PlaybackCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// The record currently shown as read-only playback context, if any.
    pub fn preview(&self) -> Option<Uuid> {
        self.preview
    }

    pub fn handle(&mut self, event: RegionEvent, store: &mut SegmentStore) -> Vec<EngineEffect> {
        match event {
            RegionEvent::Entered(local_id) => match store.get(local_id) {
                Some(record) => {
                    self.preview = Some(local_id);
                    vec![EngineEffect::ShowPreview {
                        transcription: record.transcription.clone(),
                    }]
                }
                None => {
                    // The engine can report a region whose record was just
                    // deleted; treat it as silence.
                    debug!(%local_id, "entered region with no backing segment");
                    self.preview = None;
                    vec![EngineEffect::ClearPreview]
                }
            },
            RegionEvent::Exited => {
                self.preview = None;
                vec![EngineEffect::ClearPreview]
            }
            RegionEvent::Clicked(local_id) => {
                store.select(Some(local_id));
                match store.selected() {
                    Some(record) => vec![EngineEffect::PlayRegion {
                        start: record.time_range.start,
                        end: record.time_range.end,
                    }],
                    // Clicking a vanished region cleared the selection.
                    None => Vec::new(),
                }
            }
        }
    }
}
