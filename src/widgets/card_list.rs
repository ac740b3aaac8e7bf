//! List widget for variable-height post cards.
//!
//! Ratatui's `List` skips items that do not fit entirely; a post card is often
//! taller than half the screen, so this widget renders partial cards at the
//! viewport edges and keeps the selected card centred.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::Line,
    widgets::{Block, StatefulWidget, Widget},
};

#[derive(Default)]
pub struct CardListState {
    selected: Option<usize>,
}

impl CardListState {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn select(&mut self, index: Option<usize>) {
        self.selected = index;
    }
}

/// One card: a run of lines that scrolls as a unit.
pub struct CardListItem<'a> {
    lines: Vec<Line<'a>>,
}

impl<'a> CardListItem<'a> {
    pub const fn new(lines: Vec<Line<'a>>) -> Self {
        Self { lines }
    }

    pub const fn height(&self) -> usize {
        self.lines.len()
    }
}

pub struct CardList<'a> {
    items: Vec<CardListItem<'a>>,
    block: Option<Block<'a>>,
    highlight_style: Style,
    highlight_symbol: &'a str,
}

impl<'a> CardList<'a> {
    pub fn new(items: Vec<CardListItem<'a>>) -> Self {
        Self {
            items,
            block: None,
            highlight_style: Style::default(),
            highlight_symbol: "",
        }
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    pub const fn highlight_style(mut self, style: Style) -> Self {
        self.highlight_style = style;
        self
    }

    pub const fn highlight_symbol(mut self, symbol: &'a str) -> Self {
        self.highlight_symbol = symbol;
        self
    }
}

impl StatefulWidget for CardList<'_> {
    type State = CardListState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let inner = match &self.block {
            Some(block) => {
                let inner = block.inner(area);
                block.clone().render(area, buf);
                inner
            }
            None => area,
        };

        if inner.width == 0 || inner.height == 0 || self.items.is_empty() {
            return;
        }

        let item_heights: Vec<usize> = self.items.iter().map(CardListItem::height).collect();
        let viewport_height = inner.height as usize;
        let line_offset = state
            .selected
            .map_or(0, |s| centering_offset(s, &item_heights, viewport_height));

        let symbol_width = self.highlight_symbol.chars().count() as u16;
        let content_x = inner.left() + symbol_width;
        let content_width = inner.width.saturating_sub(symbol_width);
        let mut current_line = 0;
        let mut y = inner.top();

        for (item_idx, item) in self.items.iter().enumerate() {
            let is_selected = state.selected == Some(item_idx);

            for line in &item.lines {
                if current_line < line_offset {
                    current_line += 1;
                    continue;
                }
                if y >= inner.bottom() {
                    return;
                }
                if is_selected {
                    buf.set_style(
                        Rect {
                            x: inner.left(),
                            y,
                            width: inner.width,
                            height: 1,
                        },
                        self.highlight_style,
                    );
                    // The gutter marks every visible line of the selected card.
                    buf.set_string(inner.left(), y, self.highlight_symbol, Style::default());
                }
                buf.set_line(content_x, y, line, content_width);
                y += 1;
                current_line += 1;
            }
        }
    }
}

fn centering_offset(selected: usize, item_heights: &[usize], viewport_height: usize) -> usize {
    let total_lines: usize = item_heights.iter().sum();
    if total_lines <= viewport_height {
        return 0;
    }
    let selected_start: usize = item_heights.iter().take(selected).sum();
    let selected_height = item_heights.get(selected).copied().unwrap_or(0);
    // A card taller than the viewport is pinned to its top line.
    let ideal_offset = if selected_height >= viewport_height {
        selected_start
    } else {
        (selected_start + selected_height / 2).saturating_sub(viewport_height / 2)
    };
    let max_offset = total_lines.saturating_sub(viewport_height);
    ideal_offset.min(max_offset)
}
