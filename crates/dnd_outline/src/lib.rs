mod gesture;
mod outline;

pub use gpui_outline_core as core;
pub use outline::{
    DndOutline, DndOutlineRowState, DndOutlineState, MoveBlockDown, MoveBlockUp,
    ToggleBlockExpanded, dnd_outline, init,
};
