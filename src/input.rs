//! Input model: the pointer drag gesture state machine.
//!
//! The active gesture is tracked between pointer-down on a post and
//! pointer-up, carrying the pointer-to-post offset needed to compute
//! positions on every move event. At most one post may be dragging at a
//! time (single active pointer); the engine ignores a second drag start
//! while a gesture is in progress.

use crate::post::{Point, PostId};

/// The drag gesture being tracked, if any.
#[derive(Debug, Clone, Copy)]
pub enum DragState {
    /// No gesture in progress; waiting for the next pointer-down.
    Idle,
    /// The user is moving a post across the canvas.
    Dragging {
        /// Id of the post being dragged.
        id: PostId,
        /// Pointer-to-post offset captured at drag start, so the post does
        /// not jump to the pointer position.
        offset: Point,
    },
}

impl DragState {
    /// The id of the post currently dragging, if any.
    #[must_use]
    pub fn dragging_id(&self) -> Option<PostId> {
        match self {
            Self::Idle => None,
            Self::Dragging { id, .. } => Some(*id),
        }
    }
}

impl Default for DragState {
    fn default() -> Self {
        Self::Idle
    }
}
