use std::ops::Range;
use std::rc::Rc;

use gpui::{
    App, AppContext as _, Context, ElementId, Entity, EntityId, FocusHandle,
    InteractiveElement as _, IntoElement, KeyBinding, ListSizingBehavior, ParentElement as _,
    Render, RenderOnce, SharedString, StatefulInteractiveElement as _, StyleRefinement, Styled,
    Subscription, UniformListScrollHandle, Window, actions, div, px, uniform_list,
};
use gpui_component::list::ListItem;
use gpui_component::{ActiveTheme as _, StyledExt as _};
use gpui_outline_core::{
    BlockId, Direction, DocumentStore, DragPhase, DropOutcome, DropZone, MoveRequest, OptionItem,
    Outline, OutlineConfig, OutlineOption, OutlineRow, SettleTicket,
};
use log::warn;

use crate::gesture::GestureTracker;

const CONTEXT: &str = "DndOutline";

actions!(dnd_outline, [MoveBlockUp, MoveBlockDown, ToggleBlockExpanded]);

/// Register the outline key bindings.
pub fn init(cx: &mut App) {
    cx.bind_keys([
        KeyBinding::new("alt-up", MoveBlockUp, Some(CONTEXT)),
        KeyBinding::new("alt-down", MoveBlockDown, Some(CONTEXT)),
        KeyBinding::new("space", ToggleBlockExpanded, Some(CONTEXT)),
    ]);
}

type RenderRow = dyn Fn(usize, &OutlineRow, DndOutlineRowState, &mut Window, &mut App) -> ListItem;

/// Create a [`DndOutline`].
pub fn dnd_outline<S, R>(state: &Entity<DndOutlineState<S>>, render_item: R) -> DndOutline<S>
where
    S: DocumentStore + 'static,
    R: Fn(usize, &OutlineRow, DndOutlineRowState, &mut Window, &mut App) -> ListItem + 'static,
{
    DndOutline::new(state, render_item)
}

#[derive(Clone)]
struct OutlineDrag {
    outline_id: EntityId,
    block_id: BlockId,
    label: SharedString,
}

struct DragGhost {
    label: SharedString,
}

impl Render for DragGhost {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.theme();
        div()
            .px(px(10.))
            .py(px(6.))
            .rounded(px(8.))
            .bg(theme.popover)
            .border_1()
            .border_color(theme.border)
            .shadow_md()
            .text_color(theme.popover_foreground)
            .text_sm()
            .child(self.label.clone())
    }
}

#[derive(Clone, Copy, Debug)]
pub struct DndOutlineRowState {
    pub selected: bool,
    pub in_selected_branch: bool,
    pub dragging: bool,
    pub drop_zone: DropZone,
}

/// View state of a block outline over a document store entity.
pub struct DndOutlineState<S: DocumentStore + 'static> {
    focus_handle: FocusHandle,
    store: Entity<S>,
    outline: Outline,
    rows: Vec<OutlineRow>,
    scroll_handle: UniformListScrollHandle,
    gesture: Option<GestureTracker>,
    render_item: Rc<RenderRow>,
    _subscriptions: Vec<Subscription>,
}

impl<S: DocumentStore + 'static> DndOutlineState<S> {
    pub fn new(store: Entity<S>, config: OutlineConfig, cx: &mut Context<Self>) -> Self {
        let mut outline = Outline::new(config);
        outline.sync(store.read(cx));
        let rows = outline.rows();

        let subscription = cx.observe(&store, |this, store, cx| {
            this.outline.sync(store.read(cx));
            this.refresh_rows();
            cx.notify();
        });

        Self {
            focus_handle: cx.focus_handle(),
            store,
            outline,
            rows,
            scroll_handle: UniformListScrollHandle::default(),
            gesture: None,
            render_item: Rc::new(|_, _, _, _, _| ListItem::new("dnd-outline-empty")),
            _subscriptions: vec![subscription],
        }
    }

    /// Show only the children of `root`.
    pub fn set_scope_root(&mut self, root: Option<BlockId>, cx: &mut Context<Self>) {
        self.outline.set_scope_root(root);
        self.resync(cx);
    }

    /// Scope the outline to the top-level block holding the selection.
    pub fn focus_selected_hierarchy(&mut self, cx: &mut Context<Self>) -> bool {
        let Some(id) = self.outline.selection().ids().first().cloned() else {
            return false;
        };
        let focused = self.outline.focus_hierarchy(self.store.read(cx), &id);
        if focused {
            self.refresh_rows();
            cx.notify();
        }
        focused
    }

    /// Toggle an option by key; unknown keys are logged and ignored.
    pub fn toggle_option_key(&mut self, key: &str, cx: &mut Context<Self>) {
        match self.outline.toggle_option_key(key) {
            Ok(_) => self.resync(cx),
            Err(err) => warn!("{err}"),
        }
    }

    pub fn outline(&self) -> &Outline {
        &self.outline
    }

    pub fn rows(&self) -> &[OutlineRow] {
        &self.rows
    }

    pub fn option_items(&self) -> Vec<OptionItem> {
        self.outline.option_items()
    }

    pub fn toggle_option(&mut self, option: OutlineOption, cx: &mut Context<Self>) {
        self.outline.toggle_option(option);
        self.resync(cx);
    }

    pub fn reset_options(&mut self, cx: &mut Context<Self>) {
        self.outline.reset_options();
        self.resync(cx);
    }

    pub fn toggle_expanded(&mut self, id: &BlockId, cx: &mut Context<Self>) {
        self.outline.toggle_expanded(id);
        self.refresh_rows();
        cx.notify();
    }

    pub fn select(&mut self, id: &BlockId, extend: bool, cx: &mut Context<Self>) {
        let store = self.store.clone();
        store.update(cx, |store, cx| {
            self.outline.select(store, id, extend);
            cx.notify();
        });
        self.refresh_rows();
        cx.notify();
    }

    /// Move the first selected block one place among its siblings.
    pub fn move_selected(&mut self, direction: Direction, cx: &mut Context<Self>) {
        let Some(id) = self.outline.selection().ids().first().cloned() else {
            return;
        };
        if let Some(request) = self.outline.keyboard_move(&id, direction) {
            self.dispatch_move(request, cx);
        }
    }

    fn toggle_selected(&mut self, cx: &mut Context<Self>) {
        if let Some(id) = self.outline.selection().ids().first().cloned() {
            self.toggle_expanded(&id, cx);
        }
    }

    fn resync(&mut self, cx: &mut Context<Self>) {
        self.outline.sync(self.store.read(cx));
        self.refresh_rows();
        cx.notify();
    }

    fn refresh_rows(&mut self) {
        self.rows = self.outline.rows();
    }

    /// Send the move to the store without waiting for it.
    fn dispatch_move(&mut self, request: MoveRequest, cx: &mut Context<Self>) {
        let store = self.store.clone();
        cx.spawn(async move |_, cx| {
            let result = store.update(cx, |store, cx| {
                let result = store.move_block(&request);
                cx.notify();
                result
            });
            match result {
                Ok(Ok(())) => {}
                Ok(Err(err)) => warn!("move {} failed: {err}", request.block),
                Err(err) => warn!("move {}: store is gone: {err}", request.block),
            }
        })
        .detach();
    }

    fn schedule_settle(&mut self, ticket: SettleTicket, cx: &mut Context<Self>) {
        let settle = self.outline.config().settle_duration();
        cx.spawn(async move |this, cx| {
            cx.background_executor().timer(settle).await;
            this.update(cx, |this, cx| {
                if this.outline.finish_settling(ticket) {
                    this.refresh_rows();
                    cx.notify();
                }
            })
            .ok();
        })
        .detach();
    }

    fn on_row_click(&mut self, ix: usize, window: &mut Window, cx: &mut Context<Self>) {
        let Some(row) = self.rows.get(ix) else {
            return;
        };
        let id = row.id().clone();
        let has_children = row.has_children();

        // Shift-click extends the selection when the store allows several.
        let extend = window.modifiers().shift;
        window.focus(&self.focus_handle);
        self.select(&id, extend, cx);
        if has_children && !extend {
            self.toggle_expanded(&id, cx);
        }
    }

    fn on_drag_start(&mut self, drag: &OutlineDrag, window: &mut Window, cx: &mut Context<Self>) {
        if self.outline.begin_drag(&drag.block_id) {
            self.gesture = Some(GestureTracker::new(window.mouse_position().y));
            self.refresh_rows();
        }
        cx.notify();
    }

    fn on_drag_move(
        &mut self,
        event: &gpui::DragMoveEvent<OutlineDrag>,
        _window: &mut Window,
        cx: &mut Context<Self>,
    ) {
        if !cx.has_active_drag() {
            return;
        }
        if event.drag(cx).outline_id != cx.entity_id() {
            return;
        }
        let Some(gesture) = self.gesture.as_mut() else {
            return;
        };

        let tick = gesture.tick(event.event.position.y);
        if self.outline.drag_update(tick) {
            self.refresh_rows();
            cx.notify();
        }
    }

    fn on_drop(&mut self, drag: &OutlineDrag, _window: &mut Window, cx: &mut Context<Self>) {
        self.gesture = None;
        if drag.outline_id != cx.entity_id() {
            self.outline.cancel_drag();
        } else if let DropOutcome::Committed { request, ticket } = self.outline.drop_block() {
            self.dispatch_move(request, cx);
            self.schedule_settle(ticket, cx);
        }
        self.refresh_rows();
        cx.notify();
    }
}

impl<S: DocumentStore + 'static> Render for DndOutlineState<S> {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        // Released outside the outline: no drop event arrives.
        if self.outline.phase() == DragPhase::Dragging && !cx.has_active_drag() {
            self.gesture = None;
            self.outline.cancel_drag();
            self.refresh_rows();
        }

        let render_item = Rc::clone(&self.render_item);
        let state_entity = cx.entity();
        let row_height = px(self.outline.config().row_height);

        div().id("dnd-outline-state").size_full().relative().child(
            uniform_list("rows", self.rows.len(), {
                cx.processor(move |state, visible_range: Range<usize>, window, cx| {
                    let dragged_id = state.outline.dragged_block().cloned();
                    let mut items = Vec::with_capacity(visible_range.len());
                    for ix in visible_range {
                        let row = &state.rows[ix];
                        let drop_zone = state
                            .outline
                            .ledger()
                            .get(row.id())
                            .map(|position| position.zone)
                            .unwrap_or(DropZone::Sibling);
                        let row_state = DndOutlineRowState {
                            selected: row.selected,
                            in_selected_branch: row.in_selected_branch,
                            dragging: dragged_id.as_ref() == Some(row.id()),
                            drop_zone,
                        };

                        let item = (render_item)(ix, row, row_state, window, cx);
                        let drag_value = OutlineDrag {
                            outline_id: cx.entity_id(),
                            block_id: row.id().clone(),
                            label: SharedString::from(row.block.name.clone()),
                        };

                        let state_entity = state_entity.clone();
                        let element = div()
                            .id(ix)
                            .h(row_height)
                            .child(item.selected(row.selected))
                            .on_click(cx.listener(move |this, _: &gpui::ClickEvent, window, cx| {
                                this.on_row_click(ix, window, cx);
                            }))
                            .on_drag(drag_value, move |drag, _cursor_offset, window, cx| {
                                state_entity.update(cx, |state, cx| {
                                    state.on_drag_start(drag, window, cx);
                                });
                                let label = drag.label.clone();
                                cx.new(|_| DragGhost { label })
                            });
                        items.push(element);
                    }
                    items
                })
            })
            .on_drag_move::<OutlineDrag>(cx.listener(Self::on_drag_move))
            .on_drop::<OutlineDrag>(cx.listener(Self::on_drop))
            .flex_grow()
            .size_full()
            .track_scroll(self.scroll_handle.clone())
            .with_sizing_behavior(ListSizingBehavior::Auto)
            .into_any_element(),
        )
    }
}

/// A block outline whose rows can be dragged to reorder the document.
#[derive(IntoElement)]
pub struct DndOutline<S: DocumentStore + 'static> {
    id: ElementId,
    state: Entity<DndOutlineState<S>>,
    style: StyleRefinement,
    render_item: Rc<RenderRow>,
}

impl<S: DocumentStore + 'static> DndOutline<S> {
    pub fn new<R>(state: &Entity<DndOutlineState<S>>, render_item: R) -> Self
    where
        R: Fn(usize, &OutlineRow, DndOutlineRowState, &mut Window, &mut App) -> ListItem + 'static,
    {
        Self {
            id: ElementId::Name(format!("dnd-outline-{}", state.entity_id()).into()),
            state: state.clone(),
            style: StyleRefinement::default(),
            render_item: Rc::new(render_item),
        }
    }
}

impl<S: DocumentStore + 'static> Styled for DndOutline<S> {
    fn style(&mut self) -> &mut StyleRefinement {
        &mut self.style
    }
}

impl<S: DocumentStore + 'static> RenderOnce for DndOutline<S> {
    fn render(self, _window: &mut Window, cx: &mut App) -> impl IntoElement {
        let focus_handle = self.state.read(cx).focus_handle.clone();
        self.state
            .update(cx, |state, _| state.render_item = self.render_item);

        let up = self.state.clone();
        let down = self.state.clone();
        let toggle = self.state.clone();

        div()
            .id(self.id)
            .key_context(CONTEXT)
            .track_focus(&focus_handle)
            .size_full()
            .on_action(move |_: &MoveBlockUp, _window, cx| {
                up.update(cx, |state, cx| state.move_selected(Direction::TowardStart, cx));
            })
            .on_action(move |_: &MoveBlockDown, _window, cx| {
                down.update(cx, |state, cx| state.move_selected(Direction::TowardEnd, cx));
            })
            .on_action(move |_: &ToggleBlockExpanded, _window, cx| {
                toggle.update(cx, |state, cx| state.toggle_selected(cx));
            })
            .child(self.state)
            .refine_style(&self.style)
    }
}
