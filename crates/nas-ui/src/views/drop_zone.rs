//! Drag-and-drop target.

use nas_transfer::FileHandle;

/// What a drop does on the current page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropMode {
    /// Group page: dropped files go straight into the upload queue.
    Enqueue,
    /// Main page: a drop opens the upload dialog.
    OpenDialog,
}

/// Drag events delivered by the front end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragEvent {
    /// Pointer entered the zone.
    Enter,
    /// Pointer moved over the zone.
    Over,
    /// Pointer left the zone.
    Leave,
    /// Files were released over the zone.
    Drop(Vec<FileHandle>),
}

/// Action requested by a drop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropAction {
    /// Nothing to do.
    None,
    /// Append the files to the upload queue.
    Enqueue(Vec<FileHandle>),
    /// Show the upload dialog so the user picks the file there.
    OpenUploadDialog,
}

/// Drop zone with its highlight state.
#[derive(Debug, Clone)]
pub struct DropZone {
    mode: DropMode,
    highlighted: bool,
}

impl DropZone {
    /// Zone for a page.
    #[must_use]
    pub const fn new(mode: DropMode) -> Self {
        Self {
            mode,
            highlighted: false,
        }
    }

    /// Feed a drag event.
    pub fn handle(&mut self, event: DragEvent) -> DropAction {
        match event {
            DragEvent::Enter | DragEvent::Over => {
                self.highlighted = true;
                DropAction::None
            }
            DragEvent::Leave => {
                self.highlighted = false;
                DropAction::None
            }
            DragEvent::Drop(files) => {
                self.highlighted = false;
                if files.is_empty() {
                    return DropAction::None;
                }
                match self.mode {
                    DropMode::Enqueue => DropAction::Enqueue(files),
                    DropMode::OpenDialog => DropAction::OpenUploadDialog,
                }
            }
        }
    }

    /// Whether the zone shows its drag-over highlight.
    #[must_use]
    pub const fn is_highlighted(&self) -> bool {
        self.highlighted
    }
}
