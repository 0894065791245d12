use gpui::prelude::FluentBuilder as _;
use gpui::*;
use gpui_component::button::{Button, ButtonVariants as _};
use gpui_component::checkbox::Checkbox;
use gpui_component::list::ListItem;
use gpui_component::{ActiveTheme as _, Sizable as _, h_flex, v_flex};
use gpui_dnd_outline::core::{
    Block, DocumentStore as _, DropZone, MemoryStore, OutlineConfig, OutlineRow, Tree, tree,
};
use gpui_dnd_outline::{DndOutlineRowState, DndOutlineState, dnd_outline};
use log::info;
use serde_json::json;

const INDENT: f32 = 18.;

pub struct OutlineStory {
    store: Entity<MemoryStore>,
    outline: Entity<DndOutlineState<MemoryStore>>,
}

impl OutlineStory {
    /// `option_keys` are options to flip at startup, by key.
    pub fn view(
        config: OutlineConfig,
        option_keys: Vec<String>,
        _window: &mut Window,
        cx: &mut App,
    ) -> Entity<Self> {
        let multi_selection = config.multi_selection;
        let store = cx.new(|_| MemoryStore::new(demo_document()).multi_selection(multi_selection));
        let outline = cx.new(|cx| {
            let mut outline = DndOutlineState::new(store.clone(), config, cx);
            for key in &option_keys {
                outline.toggle_option_key(key, cx);
            }
            outline
        });
        cx.new(|_| Self { store, outline })
    }
}

impl Render for OutlineStory {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.theme();
        let store = self.store.read(cx);
        let dump = format_tree(store.blocks());
        let revision = store.revision();
        let selected = store
            .selection()
            .ids()
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>();
        let selected = if selected.is_empty() {
            "<none>".to_string()
        } else {
            selected.join(", ")
        };

        let options = self
            .outline
            .read(cx)
            .option_items()
            .into_iter()
            .enumerate()
            .map(|(ix, item)| {
                let outline = self.outline.clone();
                Checkbox::new(("outline-option", ix))
                    .label(item.label)
                    .checked(item.checked)
                    .small()
                    .on_click(move |_, _window, cx| {
                        outline.update(cx, |outline, cx| outline.toggle_option(item.option, cx));
                    })
            })
            .collect::<Vec<_>>();

        v_flex()
            .size_full()
            .p(px(16.))
            .gap_y_3()
            .child(
                v_flex()
                    .gap_y_1()
                    .child(div().text_xl().font_weight(FontWeight::BOLD).child("Block Outline"))
                    .child(
                        div()
                            .text_sm()
                            .text_color(theme.muted_foreground)
                            .child("Drag a block up or down to swap it with a sibling. The first or last child of a group leaves the group when dragged past its edge. Shift-click adds to the selection when multi-selection is on. Alt+Up and Alt+Down move the selected block, Space expands or collapses it."),
                    )
                    .child(
                        div()
                            .text_sm()
                            .text_color(theme.muted_foreground)
                            .child(format!("Selected: {selected}  Revision: {revision}")),
                    ),
            )
            .child(
                h_flex()
                    .gap_x_3()
                    .items_center()
                    .children(options)
                    .child(
                        Button::new("outline-options-reset")
                            .label("Reset options")
                            .ghost()
                            .small()
                            .on_click(cx.listener(|this, _, _window, cx| {
                                this.outline.update(cx, |outline, cx| outline.reset_options(cx));
                            })),
                    )
                    .child(
                        Button::new("outline-focus-selected")
                            .label("Focus selected group")
                            .ghost()
                            .small()
                            .on_click(cx.listener(|this, _, _window, cx| {
                                let focused = this
                                    .outline
                                    .update(cx, |outline, cx| outline.focus_selected_hierarchy(cx));
                                if !focused {
                                    info!("nothing to focus: select a block inside a group");
                                }
                            })),
                    )
                    .child(
                        Button::new("outline-show-all")
                            .label("Whole document")
                            .ghost()
                            .small()
                            .on_click(cx.listener(|this, _, _window, cx| {
                                this.outline
                                    .update(cx, |outline, cx| outline.set_scope_root(None, cx));
                            })),
                    ),
            )
            .child(
                h_flex()
                    .flex_1()
                    .min_h(px(0.))
                    .gap_x_3()
                    .child(
                        v_flex()
                            .w(px(420.))
                            .min_w(px(0.))
                            .h_full()
                            .gap_y_2()
                            .child(div().text_sm().font_weight(FontWeight::MEDIUM).child("Outline"))
                            .child(
                                div()
                                    .flex_1()
                                    .min_h(px(0.))
                                    .rounded(px(12.))
                                    .border_1()
                                    .border_color(theme.border)
                                    .bg(theme.background)
                                    .child(dnd_outline(&self.outline, |ix, row, row_state, _window, cx| {
                                        render_outline_row(ix, row, row_state, cx)
                                    })),
                            ),
                    )
                    .child(
                        v_flex()
                            .flex_1()
                            .min_w(px(0.))
                            .h_full()
                            .gap_y_2()
                            .child(
                                div()
                                    .text_sm()
                                    .font_weight(FontWeight::MEDIUM)
                                    .child("Document"),
                            )
                            .child(
                                div()
                                    .flex_1()
                                    .min_h(px(0.))
                                    .rounded(px(12.))
                                    .border_1()
                                    .border_color(theme.border)
                                    .bg(theme.background)
                                    .p(px(12.))
                                    .child(render_tree_dump(dump)),
                            ),
                    ),
            )
    }
}

fn render_outline_row(
    ix: usize,
    row: &OutlineRow,
    row_state: DndOutlineRowState,
    cx: &mut App,
) -> ListItem {
    let theme = cx.theme();
    let connectors = (0..row.depth).map(|level| {
        let line = !row.terminated_levels.contains(&level);
        div()
            .w(px(INDENT))
            .h_full()
            .flex_shrink_0()
            .when(line, |this| {
                this.border_l_1().border_color(theme.border)
            })
    });
    let chevron = match (row.has_children(), row.expanded) {
        (false, _) => " ",
        (true, true) => "▾",
        (true, false) => "▸",
    };
    let content = row
        .block
        .attrs
        .get("content")
        .and_then(|value| value.as_str())
        .unwrap_or_default()
        .to_string();
    let weight = match row_state.drop_zone {
        DropZone::Container => FontWeight::MEDIUM,
        DropZone::Sibling => FontWeight::NORMAL,
    };
    let text_color = if row_state.in_selected_branch || row_state.selected {
        theme.foreground
    } else {
        theme.muted_foreground
    };

    ListItem::new(ix)
        .pl(px(6.))
        .when(row_state.dragging, |this| this.opacity(0.4))
        .child(
            h_flex()
                .h_full()
                .gap_x_1()
                .items_center()
                .children(connectors)
                .child(div().w(px(12.)).child(chevron))
                .child(
                    div()
                        .text_color(text_color)
                        .font_weight(weight)
                        .child(row.block.name.clone()),
                )
                .child(div().text_sm().text_color(theme.muted_foreground).child(content))
                .child(
                    div()
                        .text_xs()
                        .text_color(theme.muted_foreground)
                        .child(format!("{} of {}", row.position, row.set_size)),
                ),
        )
}

fn render_tree_dump(text: String) -> impl IntoElement {
    let lines = text
        .lines()
        .map(|line| div().text_sm().child(line.to_string()));
    v_flex().gap_y_0p5().children(lines)
}

fn format_tree(blocks: &[std::sync::Arc<Block>]) -> String {
    fn walk(blocks: &[std::sync::Arc<Block>], depth: usize, out: &mut String) {
        for block in blocks {
            out.push_str(&"  ".repeat(depth));
            out.push_str(block.id.as_str());
            out.push_str("  ");
            out.push_str(&block.name);
            out.push('\n');
            walk(&block.inner_blocks, depth + 1, out);
        }
    }

    let mut out = String::new();
    walk(blocks, 0, &mut out);
    out
}

fn demo_document() -> Tree {
    let paragraph = |id: &str, content: &str| {
        Block::new(id, "core/paragraph").attr("content", json!(content))
    };

    tree([
        Block::new("heading", "core/heading").attr("content", json!("Release notes")),
        paragraph("intro", "What changed this cycle."),
        Block::new("columns", "core/columns").children([
            Block::new("column-left", "core/column").children([
                paragraph("left-1", "Faster startup"),
                paragraph("left-2", "Smaller binaries"),
            ]),
            Block::new("column-right", "core/column").children([
                paragraph("right-1", "New outline view"),
                Block::new("quote", "core/quote").child(paragraph("quote-1", "It just works.")),
            ]),
        ]),
        Block::new("list", "core/list").children([
            Block::new("item-1", "core/list-item").attr("content", json!("Drag to reorder")),
            Block::new("item-2", "core/list-item").attr("content", json!("Keyboard moves")),
            Block::new("item-3", "core/list-item").attr("content", json!("Settling window")),
        ]),
        paragraph("outro", "Thanks for reading."),
    ])
}
