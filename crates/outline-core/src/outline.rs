use std::sync::Arc;

use log::{debug, warn};

use crate::block::{Block, BlockId, Tree};
use crate::config::OutlineConfig;
use crate::drag::{Direction, DragController, DragTick, PendingPlacement};
use crate::expansion::ExpansionState;
use crate::ledger::PositionLedger;
use crate::options::{OptionItem, OptionsError, OutlineOption, OutlineOptions};
use crate::rows::{OutlineRow, walk_rows};
use crate::store::{DocumentStore, MoveRequest, Selection, TreeScope};
use crate::tree::{find_block, find_location};

/// Identifies one settling window. Only the ticket of the current window
/// can end it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SettleTicket(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragPhase {
    Idle,
    Dragging,
    /// A move was sent; the dropped tree stays on screen until the window
    /// ends.
    Settling,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropOutcome {
    /// The drag never crossed the threshold; nothing is sent.
    Unchanged,
    Committed {
        request: MoveRequest,
        ticket: SettleTicket,
    },
}

#[derive(Debug)]
enum Phase {
    Idle,
    Dragging {
        controller: DragController,
        /// Tree the drag edits: the canonical tree, or the dropped tree of
        /// an abandoned settling window whose move may still be in flight.
        base: Tree,
        speculative: Option<Tree>,
    },
    Settling {
        tree: Tree,
        ticket: SettleTicket,
    },
}

/// Outline state for one mounted view: the canonical tree mirrored from the
/// store, expansion and layout bookkeeping, and the drag lifecycle.
#[derive(Debug)]
pub struct Outline {
    config: OutlineConfig,
    canonical: Tree,
    selection: Selection,
    expansion: ExpansionState,
    ledger: PositionLedger,
    options: OutlineOptions,
    scope_root: Option<BlockId>,
    phase: Phase,
    next_ticket: u64,
}

impl Outline {
    pub fn new(config: OutlineConfig) -> Self {
        let config = config.with_defaults();
        Self {
            options: OutlineOptions::new(&config),
            config,
            canonical: Vec::new(),
            selection: Selection::None,
            expansion: ExpansionState::new(),
            ledger: PositionLedger::new(),
            scope_root: None,
            phase: Phase::Idle,
            next_ticket: 0,
        }
    }

    pub fn config(&self) -> &OutlineConfig {
        &self.config
    }

    pub fn scope(&self) -> TreeScope {
        TreeScope {
            root: self.scope_root.clone(),
            selected_branch_only: self.options.is_enabled(OutlineOption::SelectedBranchOnly),
        }
    }

    /// Limit the outline to the children of `root`. Takes effect on the
    /// next [`Outline::sync`].
    pub fn set_scope_root(&mut self, root: Option<BlockId>) {
        self.scope_root = root;
    }

    pub fn scope_root(&self) -> Option<&BlockId> {
        self.scope_root.as_ref()
    }

    /// Show the top-level block that contains `id`, with its descendants as
    /// the outline's rows. Returns `false` (and keeps the current scope) when
    /// `id` is unknown or its top-level block has no children.
    pub fn focus_hierarchy(&mut self, store: &impl DocumentStore, id: &BlockId) -> bool {
        let Some(root) = store.root_of(id) else {
            return false;
        };
        let scope = TreeScope {
            root: Some(root.clone()),
            ..self.scope()
        };
        if store.tree(&scope).is_empty() {
            return false;
        }
        debug!("outline: focusing hierarchy of {root}");
        self.scope_root = Some(root);
        self.sync(store);
        true
    }

    /// Re-read the canonical tree and selection from the store.
    pub fn sync(&mut self, store: &impl DocumentStore) {
        self.canonical = store.tree(&self.scope());
        self.selection = store.selection();
    }

    pub fn set_canonical(&mut self, tree: Tree) {
        self.canonical = tree;
    }

    pub fn set_selection(&mut self, selection: Selection) {
        self.selection = selection;
    }

    pub fn canonical(&self) -> &[Arc<Block>] {
        &self.canonical
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// The tree rows should be rendered from right now.
    pub fn tree(&self) -> &[Arc<Block>] {
        displayed(&self.phase, &self.canonical)
    }

    /// Compute the visible rows and record their positions in the ledger.
    pub fn rows(&mut self) -> Vec<OutlineRow> {
        walk_rows(
            displayed(&self.phase, &self.canonical),
            &self.expansion,
            &self.selection,
            self.options.is_enabled(OutlineOption::ConnectorLines),
            &mut self.ledger,
        )
    }

    pub fn ledger(&self) -> &PositionLedger {
        &self.ledger
    }

    pub fn phase(&self) -> DragPhase {
        match self.phase {
            Phase::Idle => DragPhase::Idle,
            Phase::Dragging { .. } => DragPhase::Dragging,
            Phase::Settling { .. } => DragPhase::Settling,
        }
    }

    pub fn dragged_block(&self) -> Option<&BlockId> {
        match &self.phase {
            Phase::Dragging { controller, .. } => Some(controller.block()),
            _ => None,
        }
    }

    pub fn pending_placement(&self) -> Option<&PendingPlacement> {
        match &self.phase {
            Phase::Dragging { controller, .. } => controller.pending(),
            _ => None,
        }
    }

    /// Start dragging `id`. An open settling window is abandoned.
    ///
    /// The drag edits the tree on screen: during a settling window that is
    /// the dropped tree, whose move may not have reached the store yet.
    ///
    /// Returns `false` when the block is hidden in a collapsed branch, or
    /// when the outline only shows the selected branch (indices there do not
    /// match the document).
    pub fn begin_drag(&mut self, id: &BlockId) -> bool {
        if self.options.is_enabled(OutlineOption::SelectedBranchOnly) {
            debug!("drag {id}: reordering is off while showing the selected branch");
            return false;
        }
        let base = self.tree().to_vec();
        // Measure the drag on the rows of the tree it will edit.
        let mut layout = PositionLedger::new();
        walk_rows(
            &base,
            &self.expansion,
            &self.selection,
            self.options.is_enabled(OutlineOption::ConnectorLines),
            &mut layout,
        );
        let Some(controller) = DragController::begin(id.clone(), &layout, self.config.row_height)
        else {
            debug!("drag {id}: block has no row");
            return false;
        };

        if let Phase::Settling { ticket, .. } = &self.phase {
            debug!("drag {id}: abandoning settling window {ticket:?}");
        }
        self.phase = Phase::Dragging {
            controller,
            base,
            speculative: None,
        };
        true
    }

    /// Feed one drag tick. Returns `true` when a new speculative tree was
    /// published.
    pub fn drag_update(&mut self, tick: DragTick) -> bool {
        let Phase::Dragging {
            controller,
            base,
            speculative,
        } = &mut self.phase
        else {
            return false;
        };

        match controller.update(base, tick) {
            Some(candidate) => {
                *speculative = Some(candidate);
                true
            }
            None => false,
        }
    }

    /// Abandon the drag without touching the store.
    pub fn cancel_drag(&mut self) {
        if let Phase::Dragging { controller, .. } = &self.phase {
            debug!("drag {}: cancelled", controller.block());
            self.phase = Phase::Idle;
        }
    }

    /// End the drag. With a pending placement this yields the single move
    /// request to send and opens a settling window; otherwise the canonical
    /// tree is shown again right away.
    pub fn drop_block(&mut self) -> DropOutcome {
        let (controller, speculative) = match std::mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Dragging {
                controller,
                speculative,
                ..
            } => (controller, speculative),
            other => {
                self.phase = other;
                return DropOutcome::Unchanged;
            }
        };

        let (Some(placement), Some(tree)) = (controller.into_pending(), speculative) else {
            return DropOutcome::Unchanged;
        };

        let ticket = SettleTicket(self.next_ticket);
        self.next_ticket += 1;
        self.phase = Phase::Settling { tree, ticket };

        let request = self.request_for(placement);
        debug!(
            "drop {}: to {:?} at {}",
            request.block,
            request.to_parent.as_ref().map(BlockId::as_str),
            request.to_index
        );
        DropOutcome::Committed { request, ticket }
    }

    /// Drop and send the move to `store` in one step. A failed move is
    /// logged; the settling window still ends normally and the canonical
    /// tree comes back unchanged.
    pub fn commit(&mut self, store: &mut impl DocumentStore) -> DropOutcome {
        let outcome = self.drop_block();
        if let DropOutcome::Committed { request, .. } = &outcome {
            if let Err(err) = store.move_block(request) {
                warn!("move {} failed: {err}", request.block);
            }
            self.sync(store);
        }
        outcome
    }

    /// Close the settling window opened by `ticket`. Stale tickets are
    /// ignored.
    pub fn finish_settling(&mut self, ticket: SettleTicket) -> bool {
        if !matches!(&self.phase, Phase::Settling { ticket: current, .. } if *current == ticket) {
            return false;
        }
        self.phase = Phase::Idle;
        true
    }

    /// Move request that shifts `id` one place among its siblings.
    pub fn keyboard_move(&self, id: &BlockId, direction: Direction) -> Option<MoveRequest> {
        let location = find_location(&self.canonical, id)?;
        let sibling_count = match location.parent.as_ref() {
            Some(parent) => find_block(&self.canonical, parent)?.inner_blocks.len(),
            None => self.canonical.len(),
        };

        let to_index = match direction {
            Direction::TowardStart => location.index.checked_sub(1)?,
            Direction::TowardEnd if location.index + 1 < sibling_count => location.index + 1,
            Direction::TowardEnd => return None,
        };

        Some(self.request_for(PendingPlacement {
            block: id.clone(),
            from_parent: location.parent.clone(),
            to_parent: location.parent,
            to_index,
        }))
    }

    /// Select `id` in the store and reveal its row.
    pub fn select(&mut self, store: &mut impl DocumentStore, id: &BlockId, extend: bool) {
        store.select(id, extend);
        self.selection = store.selection();
        self.expansion.expand_ancestors(&self.canonical, id);
    }

    pub fn expansion(&self) -> &ExpansionState {
        &self.expansion
    }

    pub fn expand(&mut self, id: &BlockId) {
        self.expansion.expand(id);
    }

    pub fn collapse(&mut self, id: &BlockId) {
        self.expansion.collapse(id);
    }

    pub fn toggle_expanded(&mut self, id: &BlockId) -> bool {
        self.expansion.toggle(id)
    }

    pub fn options(&self) -> &OutlineOptions {
        &self.options
    }

    pub fn option_items(&self) -> Vec<OptionItem> {
        self.options.items()
    }

    pub fn toggle_option(&mut self, option: OutlineOption) -> bool {
        self.options.toggle(option)
    }

    /// Toggle an option by its key, as named in settings or on the command
    /// line.
    pub fn toggle_option_key(&mut self, key: &str) -> Result<bool, OptionsError> {
        self.options.toggle_key(key)
    }

    pub fn reset_options(&mut self) {
        self.options.reset_all();
    }

    /// Root-level parents inside a scoped outline belong to the scope root.
    fn request_for(&self, placement: PendingPlacement) -> MoveRequest {
        let mut request = MoveRequest::from(placement);
        if request.from_parent.is_none() {
            request.from_parent = self.scope_root.clone();
        }
        if request.to_parent.is_none() {
            request.to_parent = self.scope_root.clone();
        }
        request
    }
}

fn displayed<'a>(phase: &'a Phase, canonical: &'a [Arc<Block>]) -> &'a [Arc<Block>] {
    match phase {
        Phase::Dragging {
            speculative: Some(tree),
            ..
        }
        | Phase::Dragging { base: tree, .. }
        | Phase::Settling { tree, .. } => tree,
        Phase::Idle => canonical,
    }
}

impl Default for Outline {
    fn default() -> Self {
        Self::new(OutlineConfig::default())
    }
}
