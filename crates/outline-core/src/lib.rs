//! UI-agnostic core of the block outline: tree edits, expansion and row
//! bookkeeping, and the drag-to-reorder lifecycle.

mod block;
mod config;
mod drag;
mod expansion;
mod ledger;
mod options;
mod outline;
mod rows;
mod store;
mod tree;

pub use crate::block::*;
pub use crate::config::*;
pub use crate::drag::*;
pub use crate::expansion::*;
pub use crate::ledger::*;
pub use crate::options::*;
pub use crate::outline::*;
pub use crate::rows::*;
pub use crate::store::*;
pub use crate::tree::*;
