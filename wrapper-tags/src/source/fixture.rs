use std::collections::HashMap;
use std::convert::Infallible;
use std::ops::Range;

use serde::Deserialize;
use toml::Spanned;

use crate::Sequence;
use crate::block::{Block, BlockId, WrapperRegistry};
use crate::source::error::LoadError;
use crate::source::{MemoryStore, ParentScope, SequenceSource};
use crate::tag::TagPayload;

/// Distance between default sorting values, as the host assigns them.
const SORTING_STEP: i64 = 128;

#[derive(Debug, Deserialize)]
struct FixtureFile {
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    scope: Option<ParentScope>,
    #[serde(default)]
    blocks: Vec<BlockRecord>,
}

/// One row of the content table.
#[derive(Debug, Deserialize)]
struct BlockRecord {
    id: Spanned<u64>,
    #[serde(default)]
    sorting: Option<i64>,
    #[serde(rename = "type")]
    element: String,
    #[serde(default)]
    invisible: bool,
    #[serde(default)]
    tags: Option<toml::Value>,
}

/// A block sequence loaded from a TOML file, with the source location of
/// every block id for diagnostics.
#[derive(Debug, Clone)]
pub struct Fixture {
    pub description: Option<String>,
    pub sequence: Sequence,
    pub file_id: usize,
    spans: HashMap<BlockId, Range<usize>>,
}

impl Fixture {
    pub fn blocks(&self) -> &[Block] {
        &self.sequence.blocks
    }

    /// Byte span of the block's `id` value in the source file.
    pub fn span_of(&self, id: BlockId) -> Option<Range<usize>> {
        self.spans.get(&id).cloned()
    }
}

impl SequenceSource for Fixture {
    type Error = Infallible;

    fn fetch(&self, scope: &ParentScope) -> Result<Vec<Block>, Infallible> {
        if *scope == self.sequence.scope {
            Ok(self.sequence.blocks.clone())
        } else {
            Ok(Vec::new())
        }
    }
}

/// Fixture entry point.
pub struct Loader<'a> {
    source: &'a str,
    file_id: usize,
    registry: WrapperRegistry,
}

impl<'a> Loader<'a> {
    pub fn new(source: &'a str, file_id: usize) -> Self {
        Loader {
            source,
            file_id,
            registry: WrapperRegistry::default(),
        }
    }

    pub fn with_registry(mut self, registry: WrapperRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Parse the file and order its blocks by sorting value.
    pub fn load(&self) -> Result<Fixture, Vec<LoadError>> {
        let file: FixtureFile = toml::from_str(self.source)
            .map_err(|e| vec![LoadError::from_toml(&e, self.file_id)])?;

        let scope = file.scope.unwrap_or_default();
        let mut errors = Vec::new();
        let mut spans: HashMap<BlockId, Range<usize>> = HashMap::new();
        let mut store = MemoryStore::new();

        for (position, record) in file.blocks.into_iter().enumerate() {
            let id = BlockId(*record.id.get_ref());
            let span = record.id.span();

            if let Some(first) = spans.get(&id) {
                errors.push(
                    LoadError::new(format!("duplicate block id {}", id), Some(span), self.file_id)
                        .with_note(format!("first defined at byte {}", first.start)),
                );
                continue;
            }
            spans.insert(id, span);

            let tags = record.tags;
            let role = self.registry.classify(&record.element, || TagPayload::decode(tags));
            let sorting = record.sorting.unwrap_or(position as i64 * SORTING_STEP);
            let block = Block {
                id,
                element: record.element,
                role,
                visible: !record.invisible,
            };
            store.insert(scope.clone(), sorting, block);
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        let blocks = match store.fetch(&scope) {
            Ok(blocks) => blocks,
            Err(never) => match never {},
        };

        Ok(Fixture {
            description: file.description,
            sequence: Sequence::new(scope, blocks),
            file_id: self.file_id,
            spans,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::Role;
    use crate::tag::TagToken;
    use pretty_assertions::assert_eq;

    fn load(source: &str) -> Result<Fixture, Vec<LoadError>> {
        Loader::new(source, 0).load()
    }

    #[test]
    fn loads_roles_and_visibility() {
        let fixture = load(
            r#"
[[blocks]]
id = 1
type = "openingTags"
tags = [{ tag = "div" }]

[[blocks]]
id = 2
type = "text"
invisible = true

[[blocks]]
id = 3
type = "accordionStop"
"#,
        )
        .unwrap();

        let blocks = fixture.blocks();
        assert_eq!(
            blocks[0].role,
            Role::OpeningGroup(TagPayload::Tags(vec![TagToken::new("div")]))
        );
        assert_eq!(blocks[1].role, Role::Plain);
        assert!(!blocks[1].visible);
        assert_eq!(blocks[2].role, Role::WrapperStop);
        assert_eq!(fixture.sequence.scope, ParentScope::default());
    }

    #[test]
    fn orders_by_sorting_value() {
        let fixture = load(
            r#"
[[blocks]]
id = 1
sorting = 300
type = "text"

[[blocks]]
id = 2
sorting = 100
type = "text"
"#,
        )
        .unwrap();
        let ids: Vec<u64> = fixture.blocks().iter().map(|b| b.id.0).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn span_points_at_id_value() {
        let source = "[[blocks]]\nid = 42\ntype = \"text\"\n";
        let fixture = load(source).unwrap();
        let span = fixture.span_of(BlockId(42)).unwrap();
        assert_eq!(&source[span], "42");
    }

    #[test]
    fn group_without_tags_is_corrupt() {
        let fixture = load("[[blocks]]\nid = 1\ntype = \"closingTags\"\n").unwrap();
        assert_eq!(
            fixture.blocks()[0].role,
            Role::ClosingGroup(TagPayload::Corrupt("missing tag list".into()))
        );
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let errors = load(
            "[[blocks]]\nid = 1\ntype = \"text\"\n\n[[blocks]]\nid = 1\ntype = \"text\"\n",
        )
        .unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "duplicate block id 1");
        assert!(errors[0].span.is_some());
    }

    #[test]
    fn syntax_errors_carry_a_span() {
        let errors = load("[[blocks]\nid = 1").unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].span.is_some());
    }

    #[test]
    fn fetch_only_serves_own_scope() {
        let fixture = load("[scope]\npid = 2\n\n[[blocks]]\nid = 1\ntype = \"text\"\n").unwrap();
        assert_eq!(fixture.fetch(&ParentScope::new(2, "tl_article")).unwrap().len(), 1);
        assert!(fixture.fetch(&ParentScope::new(3, "tl_article")).unwrap().is_empty());
    }

    #[test]
    fn registry_decides_singleton_roles() {
        let source = r#"
[[blocks]]
id = 1
type = "tabStart"

[[blocks]]
id = 2
type = "tabStop"
"#;
        let plain = load(source).unwrap();
        assert_eq!(plain.blocks()[0].role, Role::Plain);

        let registry = WrapperRegistry::default().with_pair("tabStart", "tabStop");
        let fixture = Loader::new(source, 0).with_registry(registry).load().unwrap();
        assert_eq!(fixture.blocks()[0].role, Role::WrapperStart);
        assert_eq!(fixture.blocks()[1].role, Role::WrapperStop);
    }

    #[test]
    fn keeps_scope_and_ignores_other_tables() {
        let fixture = load(
            r#"
description = "news item"

[scope]
pid = 7
table = "tl_news"

[settings]
colorize = true
"#,
        )
        .unwrap();
        assert_eq!(fixture.description.as_deref(), Some("news item"));
        assert_eq!(fixture.sequence.scope, ParentScope::new(7, "tl_news"));
        assert!(fixture.blocks().is_empty());
    }
}
