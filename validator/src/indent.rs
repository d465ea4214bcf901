use std::collections::{HashMap, HashSet};

use wrapper_tags::block::{BlockId, RoleClass};

/// Nesting depth recorded for one block, before the late-by-one shift.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndentRecord {
    pub id: BlockId,
    pub role_class: RoleClass,
    pub level: usize,
    /// A closing group that closed only part of the tags it targets.
    pub middle: bool,
}

/// Raw indent levels in sequence order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndentMap {
    records: Vec<IndentRecord>,
    positions: HashMap<BlockId, usize>,
}

impl IndentMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a block's level. Recording an id again overwrites its entry in place.
    pub fn record(&mut self, id: BlockId, role_class: RoleClass, level: usize) {
        let record = IndentRecord {
            id,
            role_class,
            level,
            middle: false,
        };
        match self.positions.get(&id) {
            Some(&position) => self.records[position] = record,
            None => {
                self.positions.insert(id, self.records.len());
                self.records.push(record);
            }
        }
    }

    pub fn set_level(&mut self, id: BlockId, level: usize) {
        if let Some(record) = self.get_mut(id) {
            record.level = level;
        }
    }

    pub fn mark_middle(&mut self, id: BlockId) {
        if let Some(record) = self.get_mut(id) {
            record.middle = true;
        }
    }

    pub fn get(&self, id: BlockId) -> Option<&IndentRecord> {
        self.positions.get(&id).map(|&position| &self.records[position])
    }

    fn get_mut(&mut self, id: BlockId) -> Option<&mut IndentRecord> {
        let position = *self.positions.get(&id)?;
        self.records.get_mut(position)
    }

    pub fn levels(&self) -> Vec<usize> {
        self.records.iter().map(|r| r.level).collect()
    }

    pub fn records(&self) -> &[IndentRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Repair levels recorded between the outermost opening group a closing
    /// block reached and the closing block itself.
    ///
    /// Walks backwards from just before `closing`, stopping at `stop` or at
    /// the start of the sequence. Each block is lowered to account for the
    /// `closed` frames that ended after it, less the one the closing block
    /// itself is shown inside of. Passing an opening group in `paired` means
    /// one frame fewer applies to everything before it.
    pub fn relevel_before(
        &mut self,
        closing: BlockId,
        stop: Option<BlockId>,
        mut closed: usize,
        paired: &HashSet<BlockId>,
    ) {
        let Some(&end) = self.positions.get(&closing) else {
            return;
        };
        for record in self.records[..end].iter_mut().rev() {
            if Some(record.id) == stop {
                break;
            }
            record.level = (record.level + 1).saturating_sub(closed);
            if paired.contains(&record.id) {
                closed = closed.saturating_sub(1);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn map(levels: &[(u64, usize)]) -> IndentMap {
        let mut map = IndentMap::new();
        for (id, level) in levels {
            map.record(BlockId(*id), RoleClass::NonWrapper, *level);
        }
        map
    }

    #[test]
    fn rerecording_keeps_position() {
        let mut indents = map(&[(1, 0), (2, 1), (3, 2)]);
        indents.record(BlockId(2), RoleClass::Wrapper, 5);
        assert_eq!(indents.levels(), vec![0, 5, 2]);
        assert_eq!(indents.get(BlockId(2)).unwrap().role_class, RoleClass::Wrapper);
    }

    #[test]
    fn relevel_stops_at_outermost_frame() {
        // open[a] open[b] text close[b,a]
        let mut indents = map(&[(1, 0), (2, 1), (3, 2), (4, 0)]);
        let paired = HashSet::from([BlockId(1), BlockId(2)]);
        indents.relevel_before(BlockId(4), Some(BlockId(1)), 2, &paired);
        assert_eq!(indents.levels(), vec![0, 0, 1, 0]);
    }

    #[test]
    fn relevel_without_stop_is_bounded_by_sequence_start() {
        let mut indents = map(&[(1, 3), (2, 3), (3, 0)]);
        indents.relevel_before(BlockId(3), None, 2, &HashSet::new());
        assert_eq!(indents.levels(), vec![2, 2, 0]);
    }

    #[test]
    fn relevel_ignores_unknown_closing_block() {
        let mut indents = map(&[(1, 1)]);
        indents.relevel_before(BlockId(9), None, 1, &HashSet::new());
        assert_eq!(indents.levels(), vec![1]);
    }
}
