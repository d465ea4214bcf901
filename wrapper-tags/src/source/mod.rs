pub mod error;
pub mod fixture;

use std::collections::BTreeMap;
use std::convert::Infallible;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::block::Block;

pub use error::LoadError;
pub use fixture::{Fixture, Loader};

/// The parent record whose children form one ordered sequence.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ParentScope {
    pub pid: u64,
    #[serde(default = "default_table")]
    pub table: String,
}

fn default_table() -> String {
    "tl_article".to_string()
}

impl ParentScope {
    pub fn new(pid: u64, table: impl Into<String>) -> Self {
        ParentScope {
            pid,
            table: table.into(),
        }
    }
}

impl Default for ParentScope {
    fn default() -> Self {
        ParentScope {
            pid: 0,
            table: default_table(),
        }
    }
}

impl fmt::Display for ParentScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.table, self.pid)
    }
}

/// Supplies the blocks of a scope ordered by their sorting key.
///
/// Validation needs every block of the scope, so implementations must not page.
pub trait SequenceSource {
    type Error;

    fn fetch(&self, scope: &ParentScope) -> Result<Vec<Block>, Self::Error>;
}

/// A store holding blocks in memory, keyed by scope and sorting value.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    scopes: BTreeMap<ParentScope, Vec<(i64, Block)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, scope: ParentScope, sorting: i64, block: Block) {
        self.scopes.entry(scope).or_default().push((sorting, block));
    }

    pub fn len(&self, scope: &ParentScope) -> usize {
        self.scopes.get(scope).map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.values().all(Vec::is_empty)
    }
}

impl SequenceSource for MemoryStore {
    type Error = Infallible;

    fn fetch(&self, scope: &ParentScope) -> Result<Vec<Block>, Infallible> {
        let Some(entries) = self.scopes.get(scope) else {
            return Ok(Vec::new());
        };
        let mut ordered: Vec<&(i64, Block)> = entries.iter().collect();
        // stable: equal sorting keys keep insertion order
        ordered.sort_by_key(|(sorting, _)| *sorting);
        Ok(ordered.into_iter().map(|(_, block)| block.clone()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::Role;

    fn ids(blocks: &[Block]) -> Vec<u64> {
        blocks.iter().map(|b| b.id.0).collect()
    }

    #[test]
    fn fetch_orders_by_sorting_key() {
        let scope = ParentScope::new(4, "tl_article");
        let mut store = MemoryStore::new();
        store.insert(scope.clone(), 256, Block::new(1, "text", Role::Plain));
        store.insert(scope.clone(), 128, Block::new(2, "text", Role::Plain));
        store.insert(scope.clone(), 256, Block::new(3, "text", Role::Plain));
        store.insert(ParentScope::new(5, "tl_article"), 0, Block::new(4, "text", Role::Plain));

        assert_eq!(ids(&store.fetch(&scope).unwrap()), vec![2, 1, 3]);
        assert_eq!(store.len(&scope), 3);
    }

    #[test]
    fn unknown_scope_is_empty() {
        let store = MemoryStore::new();
        assert!(store.fetch(&ParentScope::new(9, "tl_news")).unwrap().is_empty());
        assert!(store.is_empty());
    }

    #[test]
    fn scope_display() {
        assert_eq!(ParentScope::new(12, "tl_news").to_string(), "tl_news.12");
    }
}
