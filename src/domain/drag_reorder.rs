//! Pairwise swap reordering driven by drag gestures on tiles

use super::SelectionStore;
use crate::error::{PdfStackError, Result};

/// Response to a drag passing over a tile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragOver {
    /// A drag is active and the tile will accept the drop
    Accept,
    /// Nothing is being dragged
    Reject,
}

/// What a drop gesture did to the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropOutcome {
    /// The source and target tiles were exchanged
    Swapped { from: usize, to: usize },
    /// No tile was being dragged
    NoSource,
    /// A stale index was dropped on; the store is unchanged
    OutOfRange,
}

impl DropOutcome {
    /// Whether the store changed and tiles must be redrawn
    pub fn needs_render(&self) -> bool {
        matches!(self, DropOutcome::Swapped { .. })
    }
}

/// Tracks the single tile being dragged.
///
/// Indices are positional and only valid until the next render, so the
/// source is cleared after every drop or cancel.
#[derive(Debug, Default, Clone)]
pub struct DragReorder {
    source: Option<usize>,
}

impl DragReorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts dragging the tile currently at `index`
    pub fn drag_start(&mut self, index: usize) {
        if let Some(previous) = self.source.replace(index) {
            tracing::debug!(previous, index, "drag restarted on another tile");
        }
    }

    /// Drag passing over a tile; no mutation happens here
    pub fn drag_over(&self, _index: usize) -> DragOver {
        if self.source.is_some() {
            DragOver::Accept
        } else {
            DragOver::Reject
        }
    }

    /// Drops the active tile onto the tile at `target`
    pub fn drop_on(&mut self, store: &mut SelectionStore, target: usize) -> Result<DropOutcome> {
        let Some(source) = self.source.take() else {
            return Ok(DropOutcome::NoSource);
        };

        match store.swap(source, target) {
            Ok(()) => Ok(DropOutcome::Swapped {
                from: source,
                to: target,
            }),
            Err(PdfStackError::IndexOutOfRange { index, len }) => {
                tracing::debug!(index, len, "ignored drop with stale index");
                Ok(DropOutcome::OutOfRange)
            }
            Err(e) => Err(e),
        }
    }

    /// Ends the gesture without a drop
    pub fn drag_end(&mut self) {
        self.source = None;
    }

    pub fn active_source(&self) -> Option<usize> {
        self.source
    }

    pub fn is_dragging(&self) -> bool {
        self.source.is_some()
    }
}
