//! Pure lookups and structural edits over a [`Tree`].
//!
//! Edits never touch their input. Only the blocks on the path from the root
//! to the edited child list are rebuilt; every other subtree is shared with
//! the input snapshot.

use std::sync::Arc;

use crate::block::{Block, BlockId, Tree};
use crate::expansion::ExpansionState;

/// Where a block sits: its parent (`None` for root level) and its index
/// among that parent's children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub parent: Option<BlockId>,
    pub index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertSide {
    Before,
    After,
}

/// Result of [`remove_block`].
#[derive(Debug, Clone)]
pub struct Removed {
    pub tree: Tree,
    pub removed: Option<(Arc<Block>, Location)>,
}

impl Removed {
    /// Parent the block was removed from; `None` for root level or when the
    /// block was not found.
    pub fn former_parent(&self) -> Option<&BlockId> {
        self.removed
            .as_ref()
            .and_then(|(_, location)| location.parent.as_ref())
    }
}

/// Result of [`insert_block`].
#[derive(Debug, Clone)]
pub struct Inserted {
    pub tree: Tree,
    pub location: Option<Location>,
}

/// Remove `id` from the tree. An absent id leaves the tree as it was.
pub fn remove_block(tree: &[Arc<Block>], id: &BlockId) -> Removed {
    match remove_in(tree, id, None) {
        Some((tree, block, location)) => Removed {
            tree,
            removed: Some((block, location)),
        },
        None => Removed {
            tree: tree.to_vec(),
            removed: None,
        },
    }
}

fn remove_in(
    items: &[Arc<Block>],
    id: &BlockId,
    parent: Option<&BlockId>,
) -> Option<(Tree, Arc<Block>, Location)> {
    if let Some(index) = items.iter().position(|block| block.id == *id) {
        let mut next = items.to_vec();
        let block = next.remove(index);
        return Some((
            next,
            block,
            Location {
                parent: parent.cloned(),
                index,
            },
        ));
    }

    for (ix, node) in items.iter().enumerate() {
        if let Some((inner, block, location)) = remove_in(&node.inner_blocks, id, Some(&node.id)) {
            let mut next = items.to_vec();
            next[ix] = Arc::new(node.with_inner_blocks(inner));
            return Some((next, block, location));
        }
    }

    None
}

/// Insert `block` next to `target` among the target's siblings.
///
/// When `target` is absent the tree is returned unchanged with no location.
pub fn insert_block(
    tree: &[Arc<Block>],
    target: &BlockId,
    block: Arc<Block>,
    side: InsertSide,
) -> Inserted {
    let mut block = Some(block);
    match insert_beside(tree, target, &mut block, side, None) {
        Some((tree, location)) => Inserted {
            tree,
            location: Some(location),
        },
        None => Inserted {
            tree: tree.to_vec(),
            location: None,
        },
    }
}

fn insert_beside(
    items: &[Arc<Block>],
    target: &BlockId,
    block: &mut Option<Arc<Block>>,
    side: InsertSide,
    parent: Option<&BlockId>,
) -> Option<(Tree, Location)> {
    if let Some(target_ix) = items.iter().position(|node| node.id == *target) {
        let index = match side {
            InsertSide::Before => target_ix,
            InsertSide::After => target_ix + 1,
        };
        let mut next = items.to_vec();
        next.insert(index, block.take()?);
        return Some((
            next,
            Location {
                parent: parent.cloned(),
                index,
            },
        ));
    }

    for (ix, node) in items.iter().enumerate() {
        if let Some((inner, location)) =
            insert_beside(&node.inner_blocks, target, block, side, Some(&node.id))
        {
            let mut next = items.to_vec();
            next[ix] = Arc::new(node.with_inner_blocks(inner));
            return Some((next, location));
        }
    }

    None
}

/// Insert `block` as child `index` of `parent` (root level for `None`).
/// The index is clamped to the child count. Returns `None` when `parent`
/// is not in the tree.
pub fn insert_at(
    tree: &[Arc<Block>],
    parent: Option<&BlockId>,
    index: usize,
    block: Arc<Block>,
) -> Option<Tree> {
    match parent {
        None => {
            let mut next = tree.to_vec();
            next.insert(index.min(next.len()), block);
            Some(next)
        }
        Some(parent) => {
            let mut block = Some(block);
            insert_into(tree, parent, index, &mut block)
        }
    }
}

fn insert_into(
    items: &[Arc<Block>],
    parent: &BlockId,
    index: usize,
    block: &mut Option<Arc<Block>>,
) -> Option<Tree> {
    for (ix, node) in items.iter().enumerate() {
        let inner = if node.id == *parent {
            let mut inner = node.inner_blocks.clone();
            inner.insert(index.min(inner.len()), block.take()?);
            Some(inner)
        } else {
            insert_into(&node.inner_blocks, parent, index, block)
        };

        if let Some(inner) = inner {
            let mut next = items.to_vec();
            next[ix] = Arc::new(node.with_inner_blocks(inner));
            return Some(next);
        }
    }
    None
}

pub fn find_block<'a>(tree: &'a [Arc<Block>], id: &BlockId) -> Option<&'a Arc<Block>> {
    for node in tree {
        if node.id == *id {
            return Some(node);
        }
        if let Some(found) = find_block(&node.inner_blocks, id) {
            return Some(found);
        }
    }
    None
}

pub fn find_location(tree: &[Arc<Block>], id: &BlockId) -> Option<Location> {
    fn walk(items: &[Arc<Block>], id: &BlockId, parent: Option<&BlockId>) -> Option<Location> {
        for (index, node) in items.iter().enumerate() {
            if node.id == *id {
                return Some(Location {
                    parent: parent.cloned(),
                    index,
                });
            }
            if let Some(found) = walk(&node.inner_blocks, id, Some(&node.id)) {
                return Some(found);
            }
        }
        None
    }

    walk(tree, id, None)
}

/// Ids from the root down to, but excluding, `id`. Empty for root-level or
/// absent blocks.
pub fn ancestors(tree: &[Arc<Block>], id: &BlockId) -> Vec<BlockId> {
    fn walk(items: &[Arc<Block>], id: &BlockId, path: &mut Vec<BlockId>) -> bool {
        for node in items {
            if node.id == *id {
                return true;
            }
            path.push(node.id.clone());
            if walk(&node.inner_blocks, id, path) {
                return true;
            }
            path.pop();
        }
        false
    }

    let mut path = Vec::new();
    if walk(tree, id, &mut path) {
        path
    } else {
        Vec::new()
    }
}

pub fn subtree_contains(block: &Block, id: &BlockId) -> bool {
    block.id == *id
        || block
            .inner_blocks
            .iter()
            .any(|child| subtree_contains(child, id))
}

/// Every id in the tree, sorted. Two trees hold the same multiset of
/// blocks exactly when these lists are equal.
pub fn block_ids(tree: &[Arc<Block>]) -> Vec<BlockId> {
    fn walk(items: &[Arc<Block>], out: &mut Vec<BlockId>) {
        for node in items {
            out.push(node.id.clone());
            walk(&node.inner_blocks, out);
        }
    }

    let mut out = Vec::new();
    walk(tree, &mut out);
    out.sort();
    out
}

/// Number of rows the block occupies when rendered: itself plus every
/// visible descendant. A collapsed block is a single row.
pub fn visible_row_count(block: &Block, expansion: &ExpansionState) -> usize {
    if !block.has_children() || !expansion.is_expanded(&block.id) {
        return 1;
    }
    1 + block
        .inner_blocks
        .iter()
        .map(|child| visible_row_count(child, expansion))
        .sum::<usize>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::tree;

    fn item(id: &str, children: Vec<Block>) -> Block {
        Block::new(id, "core/group").children(children)
    }

    fn dump(items: &[Arc<Block>], depth: usize, out: &mut String) {
        for node in items {
            out.push_str(&"  ".repeat(depth));
            out.push_str(node.id.as_str());
            out.push('\n');
            dump(&node.inner_blocks, depth + 1, out);
        }
    }

    fn render(items: &[Arc<Block>]) -> String {
        let mut s = String::new();
        dump(items, 0, &mut s);
        s.trim_end().to_string()
    }

    #[test]
    fn remove_nested_reports_former_parent() {
        let root = tree([item("A", vec![item("B", vec![]), item("C", vec![])]), item("D", vec![])]);
        let removed = remove_block(&root, &"C".into());

        assert_eq!(removed.former_parent(), Some(&"A".into()));
        assert_eq!(removed.removed.as_ref().unwrap().1.index, 1);
        assert_eq!(render(&removed.tree), "A\n  B\nD");
        assert_eq!(render(&root), "A\n  B\n  C\nD");
    }

    #[test]
    fn remove_shares_untouched_subtrees() {
        let root = tree([item("A", vec![item("B", vec![])]), item("D", vec![item("E", vec![])])]);
        let removed = remove_block(&root, &"B".into());

        assert!(!Arc::ptr_eq(&root[0], &removed.tree[0]));
        assert!(Arc::ptr_eq(&root[1], &removed.tree[1]));
    }

    #[test]
    fn remove_absent_is_a_no_op() {
        let root = tree([item("A", vec![item("B", vec![])])]);
        let removed = remove_block(&root, &"Z".into());

        assert!(removed.removed.is_none());
        assert_eq!(removed.former_parent(), None);
        assert_eq!(removed.tree, root);
    }

    #[test]
    fn insert_after_parent_promotes_block() {
        let root = tree([item("A", vec![item("B", vec![]), item("C", vec![])]), item("D", vec![])]);
        let removed = remove_block(&root, &"C".into());
        let (block, _) = removed.removed.unwrap();
        let inserted = insert_block(&removed.tree, &"A".into(), block, InsertSide::After);

        assert_eq!(
            inserted.location,
            Some(Location {
                parent: None,
                index: 1
            })
        );
        assert_eq!(render(&inserted.tree), "A\n  B\nC\nD");
    }

    #[test]
    fn insert_before_nested_target() {
        let root = tree([item("A", vec![item("B", vec![])]), item("D", vec![])]);
        let removed = remove_block(&root, &"D".into());
        let (block, _) = removed.removed.unwrap();
        let inserted = insert_block(&removed.tree, &"B".into(), block, InsertSide::Before);

        assert_eq!(
            inserted.location,
            Some(Location {
                parent: Some("A".into()),
                index: 0
            })
        );
        assert_eq!(render(&inserted.tree), "A\n  D\n  B");
    }

    #[test]
    fn insert_next_to_absent_target_is_a_no_op() {
        let root = tree([item("A", vec![])]);
        let inserted = insert_block(
            &root,
            &"Z".into(),
            Arc::new(item("N", vec![])),
            InsertSide::After,
        );
        assert!(inserted.location.is_none());
        assert_eq!(inserted.tree, root);
    }

    #[test]
    fn insert_at_clamps_index() {
        let root = tree([item("A", vec![item("B", vec![])])]);
        let next = insert_at(&root, Some(&"A".into()), 9, Arc::new(item("N", vec![]))).unwrap();
        assert_eq!(render(&next), "A\n  B\n  N");
        assert!(insert_at(&root, Some(&"Z".into()), 0, Arc::new(item("N", vec![]))).is_none());
    }

    #[test]
    fn ancestors_and_locations() {
        let root = tree([item("A", vec![item("B", vec![item("C", vec![])])]), item("D", vec![])]);
        assert_eq!(ancestors(&root, &"C".into()), vec![BlockId::from("A"), "B".into()]);
        assert!(ancestors(&root, &"D".into()).is_empty());
        assert_eq!(
            find_location(&root, &"D".into()),
            Some(Location {
                parent: None,
                index: 1
            })
        );
        assert!(subtree_contains(&root[0], &"C".into()));
        assert!(!subtree_contains(&root[0], &"D".into()));
    }

    #[test]
    fn collapsed_block_is_one_row() {
        let root = tree([item("A", vec![item("B", vec![item("C", vec![])])])]);
        let mut expansion = ExpansionState::default();
        assert_eq!(visible_row_count(&root[0], &expansion), 3);
        expansion.collapse(&"A".into());
        assert_eq!(visible_row_count(&root[0], &expansion), 1);
    }
}
