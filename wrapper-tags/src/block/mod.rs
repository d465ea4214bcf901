pub mod registry;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::tag::TagPayload;

pub use registry::WrapperRegistry;

/// Identity of a content block, as assigned by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(pub u64);

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for BlockId {
    fn from(id: u64) -> Self {
        BlockId(id)
    }
}

/// What a block does to the scope structure of its sequence.
#[derive(Debug, Clone, PartialEq)]
pub enum Role {
    /// Ordinary content, no scope effect.
    Plain,
    /// Opens a singleton wrapper scope. The block's element type is the wrapper kind.
    WrapperStart,
    /// Closes a singleton wrapper scope.
    WrapperStop,
    /// Opens one scope per carried tag.
    OpeningGroup(TagPayload),
    /// Closes one scope per carried tag, possibly spanning several opening blocks.
    ClosingGroup(TagPayload),
}

impl Role {
    pub fn is_group(&self) -> bool {
        matches!(self, Role::OpeningGroup(_) | Role::ClosingGroup(_))
    }

    pub fn class(&self) -> RoleClass {
        if self.is_group() {
            RoleClass::Wrapper
        } else {
            RoleClass::NonWrapper
        }
    }
}

/// Coarse role used for rendering: group blocks are drawn as wrapper rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RoleClass {
    Wrapper,
    NonWrapper,
}

/// One entry of the ordered content sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub id: BlockId,
    /// Element type name as known to the host (`text`, `accordionStart`, `openingTags`, ...).
    pub element: String,
    pub role: Role,
    /// Unpublished blocks never open or close anything.
    pub visible: bool,
}

impl Block {
    pub fn new(id: impl Into<BlockId>, element: impl Into<String>, role: Role) -> Self {
        Block {
            id: id.into(),
            element: element.into(),
            role,
            visible: true,
        }
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    /// Back-office wildcard text for the block.
    ///
    /// Group blocks list their tags as markup under a headline; other blocks
    /// only show their element type and id.
    pub fn preview(&self) -> String {
        let (headline, payload, closing) = match &self.role {
            Role::OpeningGroup(payload) => ("Opening tags", payload, false),
            Role::ClosingGroup(payload) => ("Closing tags", payload, true),
            _ => return format!("{} (id:{})", self.element, self.id),
        };

        let mut out = format!("### {} (id:{}) ###", headline, self.id);
        match payload {
            TagPayload::Tags(tags) => {
                for tag in tags {
                    out.push('\n');
                    if closing {
                        out.push_str(&tag.closing_markup());
                    } else {
                        out.push_str(&tag.opening_markup());
                    }
                }
            }
            TagPayload::Corrupt(reason) => {
                out.push_str("\ndata corrupted: ");
                out.push_str(reason);
            }
        }
        out
    }
}

/// True if at least one published block carries a tag group.
pub fn has_visible_groups(blocks: &[Block]) -> bool {
    blocks.iter().any(|b| b.visible && b.role.is_group())
}
