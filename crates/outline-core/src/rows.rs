use std::sync::Arc;

use crate::block::{Block, BlockId};
use crate::expansion::ExpansionState;
use crate::ledger::{DropZone, PositionLedger, RowPosition};
use crate::store::Selection;

/// One visible row of the outline.
#[derive(Debug, Clone, PartialEq)]
pub struct OutlineRow {
    pub block: Arc<Block>,
    /// Flattened, zero-based row index.
    pub row: usize,
    pub depth: usize,
    /// 1-based position among siblings.
    pub position: usize,
    pub set_size: usize,
    pub parent: Option<BlockId>,
    pub is_last: bool,
    /// Depths whose branch has already ended above this row; no connector
    /// line is drawn at these depths.
    pub terminated_levels: Vec<usize>,
    pub expanded: bool,
    pub selected: bool,
    pub in_selected_branch: bool,
}

impl OutlineRow {
    pub fn id(&self) -> &BlockId {
        &self.block.id
    }

    pub fn has_children(&self) -> bool {
        self.block.has_children()
    }

    /// 1-based row index for assistive technology.
    pub fn row_index(&self) -> usize {
        self.row + 1
    }

    /// 1-based nesting level for assistive technology.
    pub fn level(&self) -> usize {
        self.depth + 1
    }
}

struct Walk<'a> {
    expansion: &'a ExpansionState,
    selection: &'a Selection,
    connector_lines: bool,
    ledger: &'a mut PositionLedger,
    rows: Vec<OutlineRow>,
    next_row: usize,
}

/// Walk the visible rows of `tree`, writing each row's position into the
/// ledger as it goes.
///
/// Children of collapsed blocks are not visited; a collapsed block takes a
/// single row.
pub fn walk_rows(
    tree: &[Arc<Block>],
    expansion: &ExpansionState,
    selection: &Selection,
    connector_lines: bool,
    ledger: &mut PositionLedger,
) -> Vec<OutlineRow> {
    let mut walk = Walk {
        expansion,
        selection,
        connector_lines,
        ledger,
        rows: Vec::new(),
        next_row: 0,
    };
    walk.branch(tree, 0, None, &[], false);
    walk.rows
}

impl Walk<'_> {
    fn branch(
        &mut self,
        blocks: &[Arc<Block>],
        depth: usize,
        parent: Option<&BlockId>,
        terminated_levels: &[usize],
        parent_in_selected_branch: bool,
    ) {
        let set_size = blocks.len();
        for (ix, block) in blocks.iter().enumerate() {
            let position = ix + 1;
            let is_last = position == set_size;
            let expanded = block.has_children() && self.expansion.is_expanded(&block.id);
            let selected = self.selection.contains(&block.id);
            let in_selected_branch = selected || parent_in_selected_branch;
            let row = self.next_row;
            self.next_row += 1;

            self.rows.push(OutlineRow {
                block: Arc::clone(block),
                row,
                depth,
                position,
                set_size,
                parent: parent.cloned(),
                is_last,
                terminated_levels: terminated_levels.to_vec(),
                expanded,
                selected,
                in_selected_branch,
            });

            if expanded {
                let mut child_levels = terminated_levels.to_vec();
                if self.connector_lines && is_last {
                    child_levels.push(depth);
                }
                self.branch(
                    &block.inner_blocks,
                    depth + 1,
                    Some(&block.id),
                    &child_levels,
                    in_selected_branch,
                );
            }

            // Written once the subtree is walked, so the span is known.
            self.ledger.set_position(
                block.id.clone(),
                RowPosition {
                    row,
                    depth,
                    parent: parent.cloned(),
                    zone: if expanded {
                        DropZone::Container
                    } else {
                        DropZone::Sibling
                    },
                    is_first_child: ix == 0,
                    is_last_child: is_last,
                    span: self.next_row - row,
                },
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::tree;

    fn doc() -> Vec<Arc<Block>> {
        tree([
            Block::new("A", "core/group").children([
                Block::new("B", "core/group").child(Block::new("B1", "core/paragraph")),
                Block::new("C", "core/paragraph"),
            ]),
            Block::new("D", "core/paragraph"),
        ])
    }

    #[test]
    fn sibling_positions_and_levels() {
        let mut ledger = PositionLedger::new();
        let rows = walk_rows(
            &doc(),
            &ExpansionState::new(),
            &Selection::None,
            true,
            &mut ledger,
        );

        let summary: Vec<_> = rows
            .iter()
            .map(|r| (r.id().as_str(), r.row_index(), r.level(), r.position, r.set_size))
            .collect();
        assert_eq!(
            summary,
            [
                ("A", 1, 1, 1, 2),
                ("B", 2, 2, 1, 2),
                ("B1", 3, 3, 1, 1),
                ("C", 4, 2, 2, 2),
                ("D", 5, 1, 2, 2),
            ]
        );
        assert_eq!(ledger.get(&"A".into()).unwrap().span, 4);
        assert_eq!(ledger.get(&"A".into()).unwrap().zone, DropZone::Container);
        assert_eq!(ledger.get(&"C".into()).unwrap().zone, DropZone::Sibling);
    }

    #[test]
    fn spans_count_visible_subtree_rows() {
        let doc = doc();
        let mut expansion = ExpansionState::new();
        expansion.collapse(&"B".into());
        let mut ledger = PositionLedger::new();
        let rows = walk_rows(&doc, &expansion, &Selection::None, true, &mut ledger);

        let spans: Vec<_> = rows
            .iter()
            .map(|r| (r.id().as_str(), ledger.get(r.id()).unwrap().span))
            .collect();
        assert_eq!(spans, [("A", 3), ("B", 1), ("C", 1), ("D", 1)]);
        for row in &rows {
            assert_eq!(
                ledger.get(row.id()).unwrap().span,
                crate::tree::visible_row_count(&row.block, &expansion)
            );
        }
    }

    #[test]
    fn terminated_levels_follow_last_rows() {
        let doc = tree([Block::new("A", "core/group")
            .child(Block::new("B", "core/group").child(Block::new("B1", "core/paragraph")))]);
        let mut ledger = PositionLedger::new();
        let rows = walk_rows(
            &doc,
            &ExpansionState::new(),
            &Selection::None,
            true,
            &mut ledger,
        );
        assert_eq!(rows[1].terminated_levels, vec![0]);
        assert_eq!(rows[2].terminated_levels, vec![0, 1]);

        let rows = walk_rows(
            &doc,
            &ExpansionState::new(),
            &Selection::None,
            false,
            &mut ledger,
        );
        assert!(rows.iter().all(|r| r.terminated_levels.is_empty()));
    }

    #[test]
    fn selected_branch_covers_descendants() {
        let mut ledger = PositionLedger::new();
        let rows = walk_rows(
            &doc(),
            &ExpansionState::new(),
            &Selection::Single("B".into()),
            true,
            &mut ledger,
        );
        let flags: Vec<_> = rows
            .iter()
            .map(|r| (r.id().as_str(), r.selected, r.in_selected_branch))
            .collect();
        assert_eq!(
            flags,
            [
                ("A", false, false),
                ("B", true, true),
                ("B1", false, true),
                ("C", false, false),
                ("D", false, false),
            ]
        );
    }
}
