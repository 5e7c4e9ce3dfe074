//! Drag-selection state machine behind the availability grid.
//!
//! Pointer, mouse and touch input are all translated into the same three
//! [`GestureCommand`]s. A gesture runs from `Begin` to `End`; the first
//! cell decides whether the gesture adds or removes, and every cell is
//! applied at most once per gesture. Only `End` hands the full selection
//! back to the caller, so a drag across forty cells commits once.

use std::collections::HashSet;

use crate::models::selection::SelectionSet;
use crate::models::slot::SlotKey;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GestureMode {
    Add,
    Remove,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GestureCommand {
    Begin(SlotKey),
    Move(SlotKey),
    End,
}

/// Ephemeral state of one drag, discarded when the drag ends.
#[derive(Clone, Debug)]
pub struct DragGesture {
    pub mode: GestureMode,
    visited: HashSet<SlotKey>,
}

impl DragGesture {
    fn new(mode: GestureMode) -> Self {
        Self {
            mode,
            visited: HashSet::new(),
        }
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    pub fn has_visited(&self, cell: SlotKey) -> bool {
        self.visited.contains(&cell)
    }
}

#[derive(Clone, Debug, Default)]
pub struct SlotGrid {
    selection: SelectionSet,
    gesture: Option<DragGesture>,
}

impl SlotGrid {
    pub fn new(value: SelectionSet) -> Self {
        Self {
            selection: value,
            gesture: None,
        }
    }

    /// The selection including any in-progress drag. Render from this.
    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn is_dragging(&self) -> bool {
        self.gesture.is_some()
    }

    pub fn mode(&self) -> Option<GestureMode> {
        self.gesture.as_ref().map(|g| g.mode)
    }

    pub fn gesture(&self) -> Option<&DragGesture> {
        self.gesture.as_ref()
    }

    /// Replaces the selection from the host (e.g. restoring a saved
    /// session). Ignored mid-drag so the gesture is never reset under the
    /// user's finger. Returns whether the value was taken.
    pub fn set_value(&mut self, value: SelectionSet) -> bool {
        if self.is_dragging() {
            log::debug!("Ignoring selection restore during an active drag");
            return false;
        }

        self.selection = value;
        true
    }

    /// Starts a gesture on `cell`.
    ///
    /// A `begin` while already dragging means the platform lost the
    /// release event; the earlier gesture is ended first and its commit
    /// is returned so the caller can still deliver it.
    pub fn begin(&mut self, cell: SlotKey) -> Option<SelectionSet> {
        let previous = if self.is_dragging() {
            log::debug!("Gesture began while dragging, ending previous gesture");
            self.end()
        } else {
            None
        };

        let mode = if self.selection.contains(cell) {
            GestureMode::Remove
        } else {
            GestureMode::Add
        };
        log::debug!("Gesture {:?} started at {}", mode, cell);

        self.gesture = Some(DragGesture::new(mode));
        self.apply_cell(cell);
        previous
    }

    pub fn move_to(&mut self, cell: SlotKey) {
        if self.is_dragging() {
            self.apply_cell(cell);
        }
    }

    /// Finishes the gesture and returns the committed selection, or `None`
    /// when no gesture was active.
    pub fn end(&mut self) -> Option<SelectionSet> {
        let gesture = self.gesture.take()?;
        log::debug!(
            "Gesture {:?} ended after {} cells, {} selected",
            gesture.mode,
            gesture.visited_count(),
            self.selection.len()
        );
        Some(self.selection.clone())
    }

    pub fn apply(&mut self, command: GestureCommand) -> Option<SelectionSet> {
        match command {
            GestureCommand::Begin(cell) => self.begin(cell),
            GestureCommand::Move(cell) => {
                self.move_to(cell);
                None
            }
            GestureCommand::End => self.end(),
        }
    }

    fn apply_cell(&mut self, cell: SlotKey) {
        let Some(gesture) = self.gesture.as_mut() else {
            return;
        };

        if !gesture.visited.insert(cell) {
            return;
        }

        match gesture.mode {
            GestureMode::Add => {
                self.selection.insert(cell);
            }
            GestureMode::Remove => {
                self.selection.remove(cell);
            }
        }
    }
}
