use log::trace;
use wrapper_tags::block::BlockId;
use wrapper_tags::tag::TagToken;

/// One currently open scope.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    /// A wrapper start of some other element type, identified only by kind.
    Singleton { id: BlockId, kind: String },
    /// An opening group whose tags are not all closed yet. `remaining` is
    /// never empty while the frame is on the stack.
    Group {
        id: BlockId,
        remaining: Vec<TagToken>,
    },
}

impl Frame {
    pub fn id(&self) -> BlockId {
        match self {
            Frame::Singleton { id, .. } | Frame::Group { id, .. } => *id,
        }
    }
}

/// What a closing tag consumed from the top of the stack.
#[derive(Debug, Clone, PartialEq)]
pub enum Popped {
    /// The innermost tag of a group frame. `emptied` is set when that was the
    /// frame's last tag and the frame is gone.
    Tag {
        frame: BlockId,
        tag: TagToken,
        emptied: bool,
    },
    /// A singleton frame sat on top; it has been removed whole.
    Singleton { id: BlockId, kind: String },
}

/// Open scopes of one validation pass, innermost last.
#[derive(Debug, Default)]
pub struct FrameStack {
    frames: Vec<Frame>,
}

impl FrameStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_singleton(&mut self, id: BlockId, kind: &str) {
        trace!("open {} (id {})", kind, id);
        self.frames.push(Frame::Singleton {
            id,
            kind: kind.to_string(),
        });
    }

    /// Push an opening group. An empty tag list opens nothing.
    /// Returns `false` when `tags` is empty and nothing was pushed.
    pub fn push_group(&mut self, id: BlockId, tags: &[TagToken]) -> bool {
        if tags.is_empty() {
            return false;
        }
        trace!("open {} tag(s) (id {})", tags.len(), id);
        self.frames.push(Frame::Group {
            id,
            remaining: tags.to_vec(),
        });
        true
    }

    pub fn pop(&mut self) -> Option<Frame> {
        let frame = self.frames.pop();
        if let Some(frame) = &frame {
            trace!("close frame (id {})", frame.id());
        }
        frame
    }

    pub fn top(&self) -> Option<&Frame> {
        self.frames.last()
    }

    /// Consume the innermost open tag. A group frame whose last tag is taken
    /// is removed in the same step; a singleton frame is removed whole.
    pub fn pop_tag(&mut self) -> Option<Popped> {
        let popped = match self.frames.last_mut()? {
            Frame::Singleton { .. } => match self.frames.pop() {
                Some(Frame::Singleton { id, kind }) => Popped::Singleton { id, kind },
                _ => return None,
            },
            Frame::Group { id, remaining } => {
                let frame = *id;
                let tag = remaining.pop()?;
                let emptied = remaining.is_empty();
                if emptied {
                    self.frames.pop();
                }
                Popped::Tag {
                    frame,
                    tag,
                    emptied,
                }
            }
        };
        trace!("pop {:?}", popped);
        Some(popped)
    }

    /// The innermost group frame with its innermost open tag.
    pub fn innermost_group(&self) -> Option<(BlockId, &TagToken)> {
        self.frames.iter().rev().find_map(|frame| match frame {
            Frame::Group { id, remaining } => remaining.last().map(|tag| (*id, tag)),
            Frame::Singleton { .. } => None,
        })
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}
