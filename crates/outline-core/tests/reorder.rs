use std::sync::Arc;

use gpui_outline_core::{
    Block, BlockId, DragController, DragTick, ExpansionState, InsertSide, PositionLedger,
    ReorderKind, Selection, Tree, block_ids, insert_block, remove_block, tree, walk_rows,
};
use proptest::prelude::*;

const ROW: f32 = 36.;

fn sample() -> Tree {
    tree([
        Block::new("A", "core/group").children([
            Block::new("B", "core/paragraph"),
            Block::new("C", "core/paragraph"),
        ]),
        Block::new("D", "core/paragraph"),
    ])
}

fn layout(tree: &[Arc<Block>]) -> PositionLedger {
    let mut ledger = PositionLedger::new();
    walk_rows(
        tree,
        &ExpansionState::new(),
        &Selection::None,
        true,
        &mut ledger,
    );
    ledger
}

fn shape(items: &[Arc<Block>]) -> String {
    items
        .iter()
        .map(|block| {
            if block.inner_blocks.is_empty() {
                block.id.to_string()
            } else {
                format!("{}[{}]", block.id, shape(&block.inner_blocks))
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

#[test]
fn dragging_into_another_parent_is_ignored() {
    let doc = sample();
    let mut controller = DragController::begin("B".into(), &layout(&doc), ROW).unwrap();

    // Two rows down from B is D, a root-level block; B is not A's last child.
    assert!(controller.update(&doc, DragTick::new(1., ROW * 2.)).is_none());
    assert!(controller.pending().is_none());
}

#[test]
fn last_child_escapes_to_parent_level() {
    let doc = sample();
    let mut controller = DragController::begin("C".into(), &layout(&doc), ROW).unwrap();

    let decision = controller.decide(DragTick::new(1., ROW)).unwrap();
    assert_eq!(decision.kind, ReorderKind::EscapeToParent);
    assert_eq!(decision.target.as_str(), "A");
    assert_eq!(decision.side, InsertSide::After);

    let candidate = controller.update(&doc, DragTick::new(1., ROW)).unwrap();
    assert_eq!(shape(&candidate), "A[B], C, D");

    let pending = controller.pending().unwrap();
    assert_eq!(pending.from_parent, Some("A".into()));
    assert_eq!(pending.to_parent, None);
    assert_eq!(pending.to_index, 1);
}

#[test]
fn every_tick_starts_from_canonical_tree() {
    let doc = sample();
    let mut controller = DragController::begin("C".into(), &layout(&doc), ROW).unwrap();

    let first = controller.update(&doc, DragTick::new(1., ROW)).unwrap();
    let second = controller.update(&doc, DragTick::new(1., ROW * 1.5)).unwrap();
    assert_eq!(shape(&first), shape(&second));
    assert_eq!(shape(&doc), "A[B, C], D");
}

#[test]
fn remove_of_absent_block_keeps_shape() {
    let doc = sample();
    let removed = remove_block(&doc, &"missing".into());
    assert_eq!(shape(&removed.tree), shape(&doc));
    assert_eq!(block_ids(&removed.tree), block_ids(&doc));
}

fn arb_tree() -> impl Strategy<Value = Tree> {
    // Shapes are generated first, then ids are assigned in walk order so
    // they stay unique.
    let leaf = Just(Vec::<Shape>::new()).prop_map(Shape);
    let shape = leaf.prop_recursive(4, 24, 4, |inner| {
        prop::collection::vec(inner, 0..4).prop_map(Shape)
    });
    prop::collection::vec(shape, 1..5).prop_map(|roots| {
        let mut next = 0;
        roots.iter().map(|s| Arc::new(s.build(&mut next))).collect()
    })
}

#[derive(Clone, Debug)]
struct Shape(Vec<Shape>);

impl Shape {
    fn build(&self, next: &mut usize) -> Block {
        let id = BlockId::new(format!("b{next}"));
        *next += 1;
        let mut block = Block::new(id, "core/group");
        for child in &self.0 {
            block.inner_blocks.push(Arc::new(child.build(next)));
        }
        block
    }
}

proptest! {
    #[test]
    fn remove_then_insert_preserves_blocks(
        doc in arb_tree(),
        pick in any::<prop::sample::Index>(),
        target_pick in any::<prop::sample::Index>(),
        after in any::<bool>(),
    ) {
        let ids = block_ids(&doc);
        let id = ids[pick.index(ids.len())].clone();

        let removed = remove_block(&doc, &id);
        let (block, _) = removed.removed.clone().expect("id is in the tree");

        let remaining = block_ids(&removed.tree);
        prop_assume!(!remaining.is_empty());
        let target = remaining[target_pick.index(remaining.len())].clone();
        let side = if after { InsertSide::After } else { InsertSide::Before };

        let inserted = insert_block(&removed.tree, &target, block, side);
        prop_assert!(inserted.location.is_some());
        prop_assert_eq!(block_ids(&inserted.tree), ids);
    }
}
