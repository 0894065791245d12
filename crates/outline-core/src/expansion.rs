use std::collections::HashMap;
use std::sync::Arc;

use crate::block::{Block, BlockId};
use crate::tree::ancestors;

/// Expanded/collapsed flags per block. Blocks without an entry are expanded.
#[derive(Debug, Clone, Default)]
pub struct ExpansionState {
    entries: HashMap<BlockId, bool>,
}

impl ExpansionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expand(&mut self, id: &BlockId) {
        self.entries.insert(id.clone(), true);
    }

    pub fn collapse(&mut self, id: &BlockId) {
        self.entries.insert(id.clone(), false);
    }

    /// Flip the block's state and return the new one.
    pub fn toggle(&mut self, id: &BlockId) -> bool {
        let expanded = !self.is_expanded(id);
        self.entries.insert(id.clone(), expanded);
        expanded
    }

    pub fn is_expanded(&self, id: &BlockId) -> bool {
        self.entries.get(id).copied().unwrap_or(true)
    }

    /// Expand every ancestor of `id` so its row becomes visible.
    pub fn expand_ancestors(&mut self, tree: &[Arc<Block>], id: &BlockId) {
        for ancestor in ancestors(tree, id) {
            self.entries.insert(ancestor, true);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::tree;

    #[test]
    fn absent_entries_read_as_expanded() {
        let state = ExpansionState::new();
        assert!(state.is_expanded(&"a".into()));
        assert!(state.is_empty());
    }

    #[test]
    fn transitions_only_add_entries() {
        let mut state = ExpansionState::new();
        let id = BlockId::from("a");
        state.collapse(&id);
        assert!(!state.is_expanded(&id));
        state.expand(&id);
        assert!(state.is_expanded(&id));
        assert_eq!(state.len(), 1);

        assert!(!state.toggle(&id));
        assert!(state.toggle(&id));
        assert_eq!(state.len(), 1);
    }

    #[test]
    fn expand_ancestors_reveals_nested_block() {
        let doc = tree([Block::new("a", "core/group")
            .child(Block::new("b", "core/group").child(Block::new("c", "core/paragraph")))]);
        let mut state = ExpansionState::new();
        state.collapse(&"a".into());
        state.collapse(&"b".into());

        state.expand_ancestors(&doc, &"c".into());
        assert!(state.is_expanded(&"a".into()));
        assert!(state.is_expanded(&"b".into()));
    }
}
