use std::collections::HashSet;

use log::{debug, trace};
use wrapper_tags::block::{Block, BlockId, Role, RoleClass};
use wrapper_tags::tag::{TagPayload, TagToken};

use crate::error::{Fault, Status};
use crate::frame::{Frame, FrameStack, Popped};
use crate::indent::IndentMap;

/// Result of one pass: the first fault (or success) and the raw indent
/// level of every block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validation {
    pub status: Status,
    pub indents: IndentMap,
}

/// Walk the blocks of one scope in order, pair every opening with its
/// closing and record each block's nesting depth.
pub fn validate(blocks: &[Block]) -> Validation {
    let mut pass = Pass::default();
    for block in blocks {
        pass.visit(block);
    }
    pass.finish()
}

#[derive(Default)]
struct Pass {
    stack: FrameStack,
    level: usize,
    fault: Option<Fault>,
    indents: IndentMap,
}

impl Pass {
    /// Keep the first fault only.
    fn report(&mut self, fault: Fault) {
        match &self.fault {
            None => {
                debug!("validation fault: {}", fault);
                self.fault = Some(fault);
            }
            Some(_) => debug!("suppressed later fault: {}", fault),
        }
    }

    fn close_level(&mut self, frames: usize) {
        self.level = self.level.saturating_sub(frames);
    }

    fn visit(&mut self, block: &Block) {
        trace!(
            "block {} ({}) at level {}, {} open frame(s)",
            block.id,
            block.element,
            self.level,
            self.stack.len()
        );

        let class = block.role.class();
        if !block.visible {
            // unpublished blocks neither open nor close anything
            self.indents.record(block.id, class, self.level);
            return;
        }

        match &block.role {
            Role::Plain => self.indents.record(block.id, class, self.level),
            Role::WrapperStart => {
                self.stack.push_singleton(block.id, &block.element);
                self.indents.record(block.id, class, self.level);
                self.level += 1;
            }
            Role::WrapperStop => self.wrapper_stop(block),
            Role::OpeningGroup(payload) => self.opening_group(block, payload),
            Role::ClosingGroup(payload) => self.closing_group(block, payload),
        }
    }

    fn opening_group(&mut self, block: &Block, payload: &TagPayload) {
        self.indents.record(block.id, RoleClass::Wrapper, self.level);
        match payload.tokens() {
            Ok(tags) => {
                if self.stack.push_group(block.id, tags) {
                    self.level += 1;
                }
            }
            Err(reason) => self.report(Fault::CorruptData {
                block: block.id,
                reason: reason.to_string(),
            }),
        }
    }

    fn wrapper_stop(&mut self, block: &Block) {
        if let Some(frame) = self.stack.pop() {
            if let Frame::Group { id, remaining } = frame {
                let tag = remaining.last().map(|t| t.name.clone()).unwrap_or_default();
                self.report(Fault::StopPairedWithGroupInstead {
                    tag,
                    opening: id,
                    element: block.element.clone(),
                    stop: block.id,
                });
            }
        }
        self.close_level(1);
        self.indents.record(block.id, RoleClass::NonWrapper, self.level);
    }

    fn closing_group(&mut self, block: &Block, payload: &TagPayload) {
        let tags = match payload.tokens() {
            Ok(tags) => tags,
            Err(reason) => {
                self.indents.record(block.id, RoleClass::Wrapper, self.level);
                self.report(Fault::CorruptData {
                    block: block.id,
                    reason: reason.to_string(),
                });
                return;
            }
        };

        // Assume one frame ends here; the many-to-one path corrects this.
        self.indents
            .record(block.id, RoleClass::Wrapper, self.level.saturating_sub(1));

        match self.stack.top() {
            None => {
                let tag = tags.last().map(|t| t.name.clone()).unwrap_or_default();
                self.report(Fault::ClosingWithNoOpening {
                    tag,
                    closing: block.id,
                });
            }
            Some(Frame::Singleton { .. }) => {
                if let Some(Frame::Singleton { id, kind }) = self.stack.pop() {
                    self.close_level(1);
                    self.report(Fault::ClosingPairedWithSingletonInstead {
                        tag: tags.first().map(|t| t.name.clone()).unwrap_or_default(),
                        closing: block.id,
                        element: kind,
                        start: id,
                    });
                }
            }
            Some(Frame::Group { remaining, .. }) => {
                if remaining.len() >= tags.len() {
                    self.close_one_to_many(block.id, tags);
                } else {
                    self.close_many_to_one(block.id, tags);
                }
            }
        }
    }

    /// One opening group closed by this and possibly further closing groups.
    fn close_one_to_many(&mut self, closing: BlockId, tags: &[TagToken]) {
        let mut closed_frame = false;

        for tag in tags {
            match self.stack.pop_tag() {
                None => {
                    self.report(Fault::ClosingWithNoOpening {
                        tag: tag.name.clone(),
                        closing,
                    });
                    break;
                }
                Some(Popped::Singleton { id, kind }) => {
                    self.close_level(1);
                    closed_frame = true;
                    self.report(Fault::ClosingPairedWithSingletonInstead {
                        tag: tag.name.clone(),
                        closing,
                        element: kind,
                        start: id,
                    });
                }
                Some(Popped::Tag {
                    frame,
                    tag: opening,
                    emptied,
                }) => {
                    if let Some(fault) = name_mismatch(frame, &opening, closing, tag) {
                        self.report(fault);
                    }
                    if emptied {
                        self.close_level(1);
                        closed_frame = true;
                    }
                }
            }
        }

        if !closed_frame {
            self.indents.mark_middle(closing);
        }
    }

    /// Several opening groups closed together by this one closing group.
    ///
    /// A closing group that ends inside an opening group is reported as
    /// needing a split ahead of any name mismatch found in the same block.
    fn close_many_to_one(&mut self, closing: BlockId, tags: &[TagToken]) {
        let mut closed = 0;
        let mut outermost = None;
        let mut ended_on_boundary = false;
        let mut paired = HashSet::new();
        let mut pending: Option<Fault> = None;

        for tag in tags {
            match self.stack.pop_tag() {
                None => {
                    pending.get_or_insert(Fault::ClosingWithNoOpening {
                        tag: tag.name.clone(),
                        closing,
                    });
                    break;
                }
                Some(Popped::Singleton { id, kind }) => {
                    pending.get_or_insert(Fault::ClosingPairedWithSingletonInstead {
                        tag: tag.name.clone(),
                        closing,
                        element: kind,
                        start: id,
                    });
                    outermost = Some(id);
                    paired.insert(id);
                    closed += 1;
                    ended_on_boundary = true;
                }
                Some(Popped::Tag {
                    frame,
                    tag: opening,
                    emptied,
                }) => {
                    outermost = Some(frame);
                    if let Some(fault) = name_mismatch(frame, &opening, closing, tag) {
                        pending.get_or_insert(fault);
                    }
                    ended_on_boundary = emptied;
                    if emptied {
                        paired.insert(frame);
                        closed += 1;
                    }
                }
            }
        }

        if !ended_on_boundary {
            if let Some(opening) = outermost {
                self.report(Fault::ClosingNeedsSplit { closing, opening });
            }
            // the partly closed frame still ends visually here
            closed += 1;
        }
        if let Some(fault) = pending {
            self.report(fault);
        }

        self.close_level(closed);
        self.indents.set_level(closing, self.level);
        self.indents
            .relevel_before(closing, outermost, closed, &paired);
    }

    fn finish(mut self) -> Validation {
        if self.fault.is_none() {
            if let Some((opening, tag)) = self.stack.innermost_group() {
                let tag = tag.name.clone();
                self.report(Fault::OpeningWithNoClosing { tag, opening });
            }
        }

        let status = match self.fault {
            Some(fault) => Status::Fault(fault),
            None => Status::Ok,
        };
        Validation {
            status,
            indents: self.indents,
        }
    }
}

fn name_mismatch(
    frame: BlockId,
    opening: &TagToken,
    closing: BlockId,
    tag: &TagToken,
) -> Option<Fault> {
    (opening.name != tag.name).then(|| Fault::TagNamePairingMismatch {
        opening_tag: opening.name.clone(),
        opening: frame,
        closing_tag: tag.name.clone(),
        closing,
    })
}
