//! The scrolling feed: one card per mounted post plus a trailing status line.

use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders},
};

use crate::app::{App, Mode};
use crate::help;
use crate::keys;
use crate::post::PostState;
use crate::theme::ResolvedTheme;
use crate::views::comment_row::CommentRow;
use crate::views::common::{render_error, render_notice};
use crate::views::like_control::LikeControl;
use crate::views::spinner::spinner_frame;
use crate::views::status_bar::StatusBar;
use crate::widgets::card_list::{CardList, CardListItem, CardListState};

pub const CAUGHT_UP: &str = "You're all caught up";
const HIGHLIGHT_SYMBOL: &str = "▌ ";

/// Which parts of a card the viewer is focused on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CardFocus {
    pub comment: Option<usize>,
    pub composing: bool,
}

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).split(area);
    render_cards(frame, app, chunks[0]);
    render_status_bar(frame, app, chunks[1]);
}

fn render_cards(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let state = app.feed.state();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.border_style())
        .title(" Feed ");

    if app.feed.posts().is_empty() {
        match &state.error {
            Some(error) if !state.loaded => {
                render_error(frame, &format!("Could not load feed: {error}"), theme, area);
            }
            _ if state.is_caught_up() => {
                render_notice(frame, CAUGHT_UP, theme.dim_style(), block, area);
            }
            _ => {
                let text = format!("{} Loading feed...", spinner_frame(app.loading_start));
                render_notice(frame, &text, theme.spinner_style(), block, area);
            }
        }
        return;
    }

    let width = block
        .inner(area)
        .width
        .saturating_sub(HIGHLIGHT_SYMBOL.chars().count() as u16);
    let mut items: Vec<CardListItem> = app
        .feed
        .posts()
        .iter()
        .enumerate()
        .map(|(i, post)| CardListItem::new(card_lines(post.state(), app.focus_for(i), theme, width)))
        .collect();
    if let Some(footer) = footer_line(app) {
        items.push(CardListItem::new(vec![footer]));
    }

    let mut list_state = CardListState::new();
    list_state.select(Some(app.selected_index));
    let list = CardList::new(items)
        .block(block)
        .highlight_style(theme.selection_style())
        .highlight_symbol(HIGHLIGHT_SYMBOL);
    frame.render_stateful_widget(list, area, &mut list_state);
}

fn footer_line(app: &App) -> Option<Line<'static>> {
    let state = app.feed.state();
    if state.is_fetching_more() {
        Some(Line::from(Span::styled(
            format!("{} Loading more...", spinner_frame(app.loading_start)),
            app.theme.spinner_style(),
        )))
    } else if state.is_caught_up() {
        Some(Line::from(Span::styled(CAUGHT_UP, app.theme.dim_style())))
    } else {
        None
    }
}

/// Lines for one post card, ending with a blank separator.
pub fn card_lines(
    state: &PostState,
    focus: CardFocus,
    theme: &ResolvedTheme,
    width: u16,
) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    if !state.loaded {
        let status = match &state.error {
            Some(error) => Span::styled(format!("could not load: {error}"), theme.error_style()),
            None => Span::styled("loading...", theme.dim_style()),
        };
        lines.push(Line::from(vec![
            Span::styled(format!("post {}", state.post_id), theme.dim_style()),
            Span::styled(" · ", theme.dim_style()),
            status,
        ]));
        lines.push(Line::default());
        return lines;
    }

    let detail = &state.detail;
    lines.push(Line::from(vec![
        Span::styled(detail.owner.clone(), theme.owner_style()),
        Span::styled(" · ", theme.dim_style()),
        Span::styled(
            detail.created_label.clone(),
            Style::default().fg(theme.post_time),
        ),
    ]));
    lines.push(Line::from(vec![
        Span::styled("  img ", theme.dim_style()),
        Span::styled(
            detail.image_url.clone(),
            Style::default().fg(theme.post_media),
        ),
    ]));

    let mut like = vec![Span::raw("  ")];
    like.extend(LikeControl::new(&detail.like, state.like_phase(), theme).spans());
    lines.push(Line::from(like));

    for (i, comment) in detail.comments.iter().enumerate() {
        lines.extend(
            CommentRow::new(comment, theme)
                .selected(focus.comment == Some(i))
                .deleting(state.deleting.contains(&comment.comment_id))
                .lines(width),
        );
    }

    if let Some(draft) = draft_line(state, focus, theme) {
        lines.push(draft);
    }
    if let Some(error) = &state.error {
        lines.push(Line::from(Span::styled(
            format!("  ! {error}"),
            theme.error_style(),
        )));
    }
    lines.push(Line::default());
    lines
}

fn draft_line(state: &PostState, focus: CardFocus, theme: &ResolvedTheme) -> Option<Line<'static>> {
    if state.comment_pending {
        return Some(Line::from(Span::styled(
            "  posting comment...",
            theme.dim_style(),
        )));
    }
    if focus.composing {
        return Some(Line::from(vec![
            Span::styled("  comment: ", Style::default().fg(theme.primary)),
            Span::styled(state.draft.clone(), Style::default().fg(theme.foreground)),
            Span::styled("█", Style::default().fg(theme.primary)),
        ]));
    }
    (!state.draft.is_empty()).then(|| {
        Line::from(Span::styled(
            format!("  draft: {}", state.draft),
            theme.dim_style(),
        ))
    })
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let keymap = keys::keymap_for(app.mode);
    let (label, help) = match app.mode {
        Mode::Browse => ("Feed", help::feed_help()),
        Mode::Compose => ("Compose", help::compose_help()),
    };
    let help_text = help.format(&keymap, app.show_help);
    let loading = format!("{} Loading...", spinner_frame(app.loading_start));

    let mut bar = StatusBar::new(&app.theme).label(label).help(&help_text);
    if app.feed.state().is_fetching() {
        bar = bar.loading(&loading);
    }
    let total = app.feed.posts().len();
    if total > 0 {
        bar = bar.position(app.selected_index + 1, total);
    }
    if let Some(banner) = &app.banner {
        bar = bar.banner(banner);
    }
    bar.render(frame, area);
}
