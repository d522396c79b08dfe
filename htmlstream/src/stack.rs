//! Nesting stack of open elements.

use std::sync::Arc;

use smallvec::SmallVec;

use crate::error::{Result, WriteError};
use crate::render::RenderedTags;
use crate::tracing_macros::trace;

/// One level of nesting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frame {
    /// Tags of the open element; `None` for the root.
    pub tags: Option<Arc<RenderedTags>>,
    pub indent_level: usize,
    /// Sticky: once set on a frame, every frame above it has it too.
    pub contents_same_line: bool,
    /// The opener asked for its children to stay on its line.
    pub child_same_line: bool,
}

/// Stack of [`Frame`]s mirroring the currently open elements.
///
/// The root frame is implicit and can't be popped. Uses
/// `SmallVec<[Frame; 16]>` so typical nesting depths stay off the heap.
/// Cloning takes a snapshot that can later be put back wholesale.
#[derive(Debug, Clone, Default)]
pub struct NestingStack {
    root: Frame,
    frames: SmallVec<[Frame; 16]>,
}

impl NestingStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// The innermost open frame, or the root.
    pub fn current(&self) -> &Frame {
        self.frames.last().unwrap_or(&self.root)
    }

    /// Open a frame for `tags` on top of the current one.
    ///
    /// With `child_same_line` the new frame keeps its parent's indent level.
    /// `contents_same_line` is OR'd with the parent's.
    pub fn push(
        &mut self,
        tags: Arc<RenderedTags>,
        child_same_line: bool,
        contents_same_line: bool,
    ) -> &Frame {
        let parent = self.current();
        let frame = Frame {
            indent_level: if child_same_line {
                parent.indent_level
            } else {
                parent.indent_level + 1
            },
            contents_same_line: parent.contents_same_line || contents_same_line,
            child_same_line,
            tags: Some(tags),
        };
        trace!(
            name = frame.tags.as_deref().map(RenderedTags::name),
            level = frame.indent_level,
            contents_same_line = frame.contents_same_line,
            child_same_line,
            "push frame"
        );
        self.frames.push(frame);
        self.current()
    }

    /// Close the innermost frame.
    pub fn pop(&mut self) -> Result<Frame> {
        let frame = self.frames.pop().ok_or(WriteError::StackUnderflow)?;
        trace!(
            name = frame.tags.as_deref().map(RenderedTags::name),
            depth = self.frames.len(),
            "pop frame"
        );
        Ok(frame)
    }

    /// Number of open elements; 0 when only the root is left.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Drop frames until `depth` remain.
    pub fn truncate(&mut self, depth: usize) {
        self.frames.truncate(depth);
    }
}
