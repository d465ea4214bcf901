pub mod attributes;
pub mod block;
pub mod source;
pub mod tag;

use crate::block::Block;
use crate::source::ParentScope;

/// The ordered content blocks of one parent scope (an article, a news item, ...).
#[derive(Debug, Clone)]
pub struct Sequence {
    /// The scope the blocks belong to.
    pub scope: ParentScope,
    /// Blocks in sorting order.
    pub blocks: Vec<Block>,
}

impl Sequence {
    pub fn new(scope: ParentScope, blocks: Vec<Block>) -> Self {
        Sequence { scope, blocks }
    }

    pub fn has_visible_groups(&self) -> bool {
        block::has_visible_groups(&self.blocks)
    }
}
