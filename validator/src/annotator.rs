use wrapper_tags::block::{BlockId, RoleClass};

use crate::indent::{IndentMap, IndentRecord};

/// Indentation as handed to the list renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnnotatedIndent {
    pub role_class: RoleClass,
    pub value: usize,
    pub middle: bool,
    pub colorize: bool,
}

impl AnnotatedIndent {
    fn new(record: &IndentRecord, value: usize, colorize: bool) -> Self {
        AnnotatedIndent {
            role_class: record.role_class,
            value,
            middle: record.middle,
            colorize: colorize && value > 0,
        }
    }

    /// Row class string, e.g. `clear-indent wrapper-tag indent indent_2 colorize-wrapper-tags`.
    pub fn css_class(&self) -> String {
        let mut classes = vec!["clear-indent".to_string()];
        if self.role_class == RoleClass::Wrapper {
            classes.push("wrapper-tag".to_string());
        }
        if self.value > 0 {
            classes.push("indent".to_string());
        }
        classes.push(format!("indent_{}", self.value));
        if self.middle {
            classes.push("indent-tags-closing-middle".to_string());
        }
        if self.colorize {
            classes.push("colorize-wrapper-tags".to_string());
        }
        classes.join(" ")
    }
}

/// A window of the list view. `page_size == 0` means "to the end".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Page {
    pub offset: usize,
    pub page_size: usize,
}

impl Page {
    pub fn new(offset: usize, page_size: usize) -> Self {
        Page { offset, page_size }
    }

    fn contains(&self, position: usize) -> bool {
        position >= self.offset && (self.page_size == 0 || position - self.offset < self.page_size)
    }
}

/// Annotated rows of one page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Annotations {
    /// Indentation of the first row on the page at its own depth. The
    /// renderer applies each annotation one row late, so nothing else
    /// reaches that row.
    pub leading: Option<AnnotatedIndent>,
    pub rows: Vec<(BlockId, AnnotatedIndent)>,
}

impl Annotations {
    pub fn get(&self, id: BlockId) -> Option<&AnnotatedIndent> {
        self.rows.iter().find(|(row, _)| *row == id).map(|(_, a)| a)
    }

    pub fn values(&self) -> Vec<usize> {
        self.rows.iter().map(|(_, a)| a.value).collect()
    }
}

/// Shift raw levels one block early: each block carries its successor's
/// depth, the last block keeps its own.
pub fn annotate(raw: &IndentMap, colorize: bool) -> Vec<(BlockId, AnnotatedIndent)> {
    let records = raw.records();
    records
        .iter()
        .enumerate()
        .map(|(position, record)| {
            let value = records
                .get(position + 1)
                .map_or(record.level, |next| next.level);
            (record.id, AnnotatedIndent::new(record, value, colorize))
        })
        .collect()
}

/// [`annotate`] restricted to one page of the list view.
pub fn annotate_page(raw: &IndentMap, colorize: bool, page: Option<Page>) -> Annotations {
    let page = page.unwrap_or_default();
    let leading = raw
        .records()
        .get(page.offset)
        .map(|record| AnnotatedIndent::new(record, record.level, colorize));
    let rows = annotate(raw, colorize)
        .into_iter()
        .enumerate()
        .filter(|(position, _)| page.contains(*position))
        .map(|(_, row)| row)
        .collect();
    Annotations { leading, rows }
}
