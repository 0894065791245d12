use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

pub type Attrs = serde_json::Map<String, serde_json::Value>;

/// A snapshot of the document: ordered root blocks, each sharing its
/// subtrees by reference with older snapshots.
pub type Tree = Vec<Arc<Block>>;

/// Stable identity of a block, assigned by the document store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(Arc<str>);

impl BlockId {
    pub fn new(id: impl Into<Arc<str>>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for BlockId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for BlockId {
    fn from(id: String) -> Self {
        Self::new(id)
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub id: BlockId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub attrs: Arc<Attrs>,
    #[serde(default)]
    pub inner_blocks: Tree,
}

impl Block {
    pub fn new(id: impl Into<BlockId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            attrs: Arc::default(),
            inner_blocks: Vec::new(),
        }
    }

    pub fn child(mut self, child: Block) -> Self {
        self.inner_blocks.push(Arc::new(child));
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = Block>) -> Self {
        self.inner_blocks
            .extend(children.into_iter().map(Arc::new));
        self
    }

    pub fn attr(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        Arc::make_mut(&mut self.attrs).insert(key.into(), value);
        self
    }

    pub fn has_children(&self) -> bool {
        !self.inner_blocks.is_empty()
    }

    /// Copy of this block with a different child list. Attributes and the
    /// untouched child subtrees stay shared.
    pub fn with_inner_blocks(&self, inner_blocks: Tree) -> Self {
        Self {
            id: self.id.clone(),
            name: self.name.clone(),
            attrs: Arc::clone(&self.attrs),
            inner_blocks,
        }
    }
}

/// Wrap root blocks into a [`Tree`].
pub fn tree(blocks: impl IntoIterator<Item = Block>) -> Tree {
    blocks.into_iter().map(Arc::new).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocks_round_trip_through_json() {
        let doc = tree([Block::new("group", "core/group")
            .attr("tagName", serde_json::json!("section"))
            .child(Block::new("p", "core/paragraph"))]);

        let json = serde_json::to_string(&doc).unwrap();
        let parsed: Tree = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, doc);
        assert!(json.contains("\"inner_blocks\""));
    }

    #[test]
    fn with_inner_blocks_shares_attrs() {
        let block = Block::new("a", "core/group").attr("x", serde_json::json!(1));
        let copy = block.with_inner_blocks(Vec::new());
        assert!(Arc::ptr_eq(&block.attrs, &copy.attrs));
    }
}
