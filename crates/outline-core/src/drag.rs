use std::sync::Arc;

use log::{debug, trace};

use crate::block::{Block, BlockId, Tree};
use crate::ledger::{PositionLedger, RowPosition};
use crate::tree::{InsertSide, insert_block, remove_block};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    TowardStart,
    TowardEnd,
}

impl Direction {
    /// `None` for a zero velocity: the gesture has no direction yet.
    pub fn from_velocity(velocity: f32) -> Option<Self> {
        if velocity > 0. {
            Some(Self::TowardEnd)
        } else if velocity < 0. {
            Some(Self::TowardStart)
        } else {
            None
        }
    }
}

/// One drag update: instantaneous velocity and translation since the drag
/// began, both along the list axis (positive toward the end).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragTick {
    pub velocity: f32,
    pub translation: f32,
}

impl DragTick {
    pub fn new(velocity: f32, translation: f32) -> Self {
        Self {
            velocity,
            translation,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReorderKind {
    /// Leave the parent container and land next to it.
    EscapeToParent,
    /// Swap places with a sibling row.
    SiblingSwap,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReorderDecision {
    pub kind: ReorderKind,
    pub target: BlockId,
    pub side: InsertSide,
}

/// The placement a drop would commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingPlacement {
    pub block: BlockId,
    /// Parent before the drag began.
    pub from_parent: Option<BlockId>,
    pub to_parent: Option<BlockId>,
    pub to_index: usize,
}

/// Turns drag ticks for one block into candidate trees.
///
/// The layout is captured when the drag begins, so every tick is measured
/// against the rows of the tree the drag edits.
#[derive(Debug, Clone)]
pub struct DragController {
    block: BlockId,
    origin: RowPosition,
    layout: PositionLedger,
    row_height: f32,
    pending: Option<PendingPlacement>,
}

impl DragController {
    /// `None` if the block has no row in `ledger`.
    pub fn begin(block: BlockId, ledger: &PositionLedger, row_height: f32) -> Option<Self> {
        let origin = ledger.get(&block)?.clone();
        Some(Self {
            block,
            origin,
            layout: ledger.clone(),
            row_height,
            pending: None,
        })
    }

    pub fn block(&self) -> &BlockId {
        &self.block
    }

    pub fn origin(&self) -> &RowPosition {
        &self.origin
    }

    pub fn pending(&self) -> Option<&PendingPlacement> {
        self.pending.as_ref()
    }

    pub fn into_pending(self) -> Option<PendingPlacement> {
        self.pending
    }

    /// Decide where the block would go for this tick, without touching any
    /// tree.
    pub fn decide(&self, tick: DragTick) -> Option<ReorderDecision> {
        let Some(direction) = Direction::from_velocity(tick.velocity) else {
            trace!("drag {}: no velocity, skipping tick", self.block);
            return None;
        };

        let distance = tick.translation.abs();
        if distance < self.row_height {
            return None;
        }

        if let Some(parent) = self.origin.parent.as_ref() {
            let escape_side = match direction {
                Direction::TowardStart if self.origin.is_first_child => Some(InsertSide::Before),
                Direction::TowardEnd if self.origin.is_last_child => Some(InsertSide::After),
                _ => None,
            };
            if let Some(side) = escape_side {
                return Some(ReorderDecision {
                    kind: ReorderKind::EscapeToParent,
                    target: parent.clone(),
                    side,
                });
            }
        }

        let rows = (distance / self.row_height).floor() as usize;
        let (row, side) = match direction {
            Direction::TowardEnd => (
                self.origin.row + self.origin.span.max(1) - 1 + rows,
                InsertSide::After,
            ),
            Direction::TowardStart => (self.origin.row.checked_sub(rows)?, InsertSide::Before),
        };

        let Some((target, position)) = self.layout.at_row(row) else {
            trace!("drag {}: no row at {row}", self.block);
            return None;
        };
        if position.parent != self.origin.parent {
            trace!(
                "drag {}: row {row} ({target}) belongs to another parent",
                self.block
            );
            return None;
        }

        Some(ReorderDecision {
            kind: ReorderKind::SiblingSwap,
            target: target.clone(),
            side,
        })
    }

    /// Apply this tick to `base`, the tree the drag edits. Returns the
    /// candidate tree when the tick produced a placement, and records that
    /// placement.
    pub fn update(&mut self, base: &[Arc<Block>], tick: DragTick) -> Option<Tree> {
        let decision = self.decide(tick)?;

        let removed = remove_block(base, &self.block);
        let (block, _) = removed.removed?;
        let inserted = insert_block(&removed.tree, &decision.target, block, decision.side);
        let location = inserted.location?;

        debug!(
            "drag {}: {:?} {:?} {} -> parent {:?} index {}",
            self.block,
            decision.kind,
            decision.side,
            decision.target,
            location.parent.as_ref().map(BlockId::as_str),
            location.index
        );

        self.pending = Some(PendingPlacement {
            block: self.block.clone(),
            from_parent: self.origin.parent.clone(),
            to_parent: location.parent,
            to_index: location.index,
        });
        Some(inserted.tree)
    }
}
