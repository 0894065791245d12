use std::collections::HashMap;

use crate::block::BlockId;

/// What dropping onto a row would mean.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropZone {
    /// The row is an expanded container; a drop lands inside it.
    Container,
    /// A drop lands next to the row.
    Sibling,
}

/// Structural context of a row as of the last render pass.
#[derive(Debug, Clone, PartialEq)]
pub struct RowPosition {
    /// Flattened, zero-based row index.
    pub row: usize,
    pub depth: usize,
    pub parent: Option<BlockId>,
    pub zone: DropZone,
    pub is_first_child: bool,
    pub is_last_child: bool,
    /// Rows taken by the block and its visible descendants.
    pub span: usize,
}

/// Last rendered geometry of every row, keyed by block id and by row.
///
/// Entries are overwritten, never removed. Lookups for blocks that are no
/// longer rendered simply stop happening.
#[derive(Debug, Clone, Default)]
pub struct PositionLedger {
    by_id: HashMap<BlockId, RowPosition>,
    by_row: HashMap<usize, BlockId>,
}

impl PositionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_position(&mut self, id: BlockId, position: RowPosition) {
        self.by_row.insert(position.row, id.clone());
        self.by_id.insert(id, position);
    }

    pub fn get(&self, id: &BlockId) -> Option<&RowPosition> {
        self.by_id.get(id)
    }

    /// The block last rendered at `row`, if its own entry still agrees.
    pub fn at_row(&self, row: usize) -> Option<(&BlockId, &RowPosition)> {
        let id = self.by_row.get(&row)?;
        let position = self.by_id.get(id)?;
        (position.row == row).then_some((id, position))
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position(row: usize) -> RowPosition {
        RowPosition {
            row,
            depth: 0,
            parent: None,
            zone: DropZone::Sibling,
            is_first_child: row == 0,
            is_last_child: false,
            span: 1,
        }
    }

    #[test]
    fn last_write_wins() {
        let mut ledger = PositionLedger::new();
        let id = BlockId::from("a");
        ledger.set_position(id.clone(), position(0));
        ledger.set_position(
            id.clone(),
            RowPosition {
                parent: Some("p".into()),
                ..position(3)
            },
        );

        let entry = ledger.get(&id).unwrap();
        assert_eq!(entry.row, 3);
        assert_eq!(entry.parent, Some("p".into()));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn stale_row_lookups_are_ignored() {
        let mut ledger = PositionLedger::new();
        ledger.set_position("a".into(), position(0));
        ledger.set_position("a".into(), position(2));

        assert!(ledger.at_row(0).is_none());
        assert_eq!(ledger.at_row(2).map(|(id, _)| id.as_str()), Some("a"));
        assert!(ledger.get(&"missing".into()).is_none());
    }
}
