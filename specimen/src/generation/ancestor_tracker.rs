//! Runtime record of which instance is being built inside which
//!
//! The walker enters a frame for every struct instance it starts and leaves it once the fields are
//! done. Back-reference nodes query the live frames for the nearest ancestor of their type.

use crate::generation::instance_graph::InstanceId;
use crate::schema::TypeExpr;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Frame {
    instance: InstanceId,
    ty:       TypeExpr,
}

/// Frames live at one point of the walk; restored when a delayed node is retried
pub(crate) type AncestorSnapshot = Vec<Frame>;

/// Stack of struct instances under construction
#[derive(Debug, Default)]
pub struct AncestorTracker {
    frames: Vec<Frame>,
}

impl AncestorTracker {
    /// Tracker with no live frames
    pub fn new() -> Self { Self::default() }

    /// Start building `instance`
    pub fn enter(&mut self, instance: InstanceId, ty: &TypeExpr) {
        self.frames.push(Frame {
            instance,
            ty: ty.clone(),
        });
    }

    /// Finish the innermost instance
    pub fn exit(&mut self) { self.frames.pop(); }

    /// Innermost live instance whose type is exactly `ty`
    pub fn nearest_ancestor(&self, ty: &TypeExpr) -> Option<InstanceId> {
        self.frames
            .iter()
            .rev()
            .find(|frame| &frame.ty == ty)
            .map(|frame| frame.instance)
    }

    pub(crate) fn snapshot(&self) -> AncestorSnapshot { self.frames.clone() }

    pub(crate) fn restore(&mut self, snapshot: AncestorSnapshot) { self.frames = snapshot; }
}
