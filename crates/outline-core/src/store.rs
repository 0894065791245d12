use std::sync::Arc;

use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::block::{Block, BlockId, Tree};
use crate::drag::PendingPlacement;
use crate::tree::{ancestors, find_block, find_location, insert_at, remove_block, subtree_contains};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Selection {
    #[default]
    None,
    Single(BlockId),
    Multiple(Vec<BlockId>),
}

impl Selection {
    pub fn contains(&self, id: &BlockId) -> bool {
        match self {
            Selection::None => false,
            Selection::Single(selected) => selected == id,
            Selection::Multiple(selected) => selected.contains(id),
        }
    }

    pub fn ids(&self) -> &[BlockId] {
        match self {
            Selection::None => &[],
            Selection::Single(selected) => std::slice::from_ref(selected),
            Selection::Multiple(selected) => selected,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.ids().is_empty()
    }
}

/// Which part of the document the outline shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeScope {
    /// Show only the children of this block.
    pub root: Option<BlockId>,
    /// Keep only the selection, its ancestors and its descendants.
    pub selected_branch_only: bool,
}

/// "Move `block` from `from_parent` to child `to_index` of `to_parent`".
/// `None` parents mean the document's root level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRequest {
    pub block: BlockId,
    pub from_parent: Option<BlockId>,
    pub to_parent: Option<BlockId>,
    pub to_index: usize,
}

impl From<PendingPlacement> for MoveRequest {
    fn from(placement: PendingPlacement) -> Self {
        Self {
            block: placement.block,
            from_parent: placement.from_parent,
            to_parent: placement.to_parent,
            to_index: placement.to_index,
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("block `{0}` not found")]
    NotFound(BlockId),
    #[error("block `{block}` is no longer a child of {expected}")]
    ParentMismatch { block: BlockId, expected: String },
    #[error("cannot move `{0}` into its own subtree")]
    Cycle(BlockId),
}

/// The document store the outline reads from and sends moves to.
pub trait DocumentStore {
    fn tree(&self, scope: &TreeScope) -> Tree;

    fn selection(&self) -> Selection;

    /// Top-level ancestor of `id` (the block itself when it is a root).
    fn root_of(&self, id: &BlockId) -> Option<BlockId>;

    /// Select a block; `extend` adds to the selection when the store
    /// supports multiple selection.
    fn select(&mut self, id: &BlockId, extend: bool);

    /// Must succeed without change when the block already sits at the
    /// requested position.
    fn move_block(&mut self, request: &MoveRequest) -> Result<(), StoreError>;
}

/// In-memory [`DocumentStore`].
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    blocks: Tree,
    selection: Selection,
    multi_selection: bool,
    revision: u64,
}

impl MemoryStore {
    pub fn new(blocks: Tree) -> Self {
        Self {
            blocks,
            ..Self::default()
        }
    }

    pub fn multi_selection(mut self, multi_selection: bool) -> Self {
        self.multi_selection = multi_selection;
        self
    }

    pub fn blocks(&self) -> &[Arc<Block>] {
        &self.blocks
    }

    pub fn set_blocks(&mut self, blocks: Tree) {
        self.blocks = blocks;
        self.revision += 1;
    }

    /// Incremented on every structural change.
    pub fn revision(&self) -> u64 {
        self.revision
    }
}

impl DocumentStore for MemoryStore {
    fn tree(&self, scope: &TreeScope) -> Tree {
        let tree = match scope.root.as_ref() {
            Some(root) => find_block(&self.blocks, root)
                .map(|block| block.inner_blocks.clone())
                .unwrap_or_default(),
            None => self.blocks.clone(),
        };

        if scope.selected_branch_only && !self.selection.is_empty() {
            filter_to_branch(&tree, &self.selection)
        } else {
            tree
        }
    }

    fn selection(&self) -> Selection {
        self.selection.clone()
    }

    fn root_of(&self, id: &BlockId) -> Option<BlockId> {
        find_block(&self.blocks, id)?;
        Some(
            ancestors(&self.blocks, id)
                .into_iter()
                .next()
                .unwrap_or_else(|| id.clone()),
        )
    }

    fn select(&mut self, id: &BlockId, extend: bool) {
        self.selection = match std::mem::take(&mut self.selection) {
            Selection::Single(current) if extend && self.multi_selection && current != *id => {
                Selection::Multiple(vec![current, id.clone()])
            }
            Selection::Multiple(mut current) if extend && self.multi_selection => {
                if !current.contains(id) {
                    current.push(id.clone());
                }
                Selection::Multiple(current)
            }
            _ => Selection::Single(id.clone()),
        };
    }

    fn move_block(&mut self, request: &MoveRequest) -> Result<(), StoreError> {
        let location =
            find_location(&self.blocks, &request.block).ok_or_else(|| StoreError::NotFound(request.block.clone()))?;
        // A repeated request finds the block already moved.
        if location.parent == request.to_parent && location.index == request.to_index {
            debug!("move {}: already in place", request.block);
            return Ok(());
        }
        if location.parent != request.from_parent {
            return Err(StoreError::ParentMismatch {
                block: request.block.clone(),
                expected: request
                    .from_parent
                    .as_ref()
                    .map_or_else(|| "the root".to_string(), |p| format!("`{p}`")),
            });
        }

        let removed = remove_block(&self.blocks, &request.block);
        let Some((block, _)) = removed.removed else {
            return Err(StoreError::NotFound(request.block.clone()));
        };
        if let Some(parent) = request.to_parent.as_ref() {
            if subtree_contains(&block, parent) {
                return Err(StoreError::Cycle(request.block.clone()));
            }
        }

        let tree = insert_at(
            &removed.tree,
            request.to_parent.as_ref(),
            request.to_index,
            block,
        )
        .ok_or_else(|| {
            StoreError::NotFound(request.to_parent.clone().unwrap_or_else(|| request.block.clone()))
        })?;
        self.set_blocks(tree);
        Ok(())
    }
}

/// Keep the selected blocks with their full subtrees, plus the ancestors
/// leading to them.
fn filter_to_branch(tree: &[Arc<Block>], selection: &Selection) -> Tree {
    tree.iter()
        .filter_map(|block| {
            if selection.contains(&block.id) {
                return Some(Arc::clone(block));
            }
            let inner = filter_to_branch(&block.inner_blocks, selection);
            (!inner.is_empty()).then(|| Arc::new(block.with_inner_blocks(inner)))
        })
        .collect()
}
