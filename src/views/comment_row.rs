//! One comment: owner, text and, for the viewer's own comments, a delete action.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};
use unicode_width::UnicodeWidthStr;

use crate::api::Comment;
use crate::post::PostIntent;
use crate::theme::ResolvedTheme;

const SELECTED_MARKER: &str = "> ";
const MARKER: &str = "  ";

pub struct CommentRow<'a> {
    comment: &'a Comment,
    theme: &'a ResolvedTheme,
    selected: bool,
    deleting: bool,
}

impl<'a> CommentRow<'a> {
    pub const fn new(comment: &'a Comment, theme: &'a ResolvedTheme) -> Self {
        Self {
            comment,
            theme,
            selected: false,
            deleting: false,
        }
    }

    pub const fn selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }

    pub const fn deleting(mut self, deleting: bool) -> Self {
        self.deleting = deleting;
        self
    }

    /// Only the viewer's own comments offer delete, and only once.
    pub const fn intent(&self) -> Option<PostIntent> {
        if self.comment.owned_by_viewer && !self.deleting {
            Some(PostIntent::CommentDeleteRequested {
                comment_id: self.comment.comment_id,
            })
        } else {
            None
        }
    }

    fn action_label(&self) -> Option<&'static str> {
        match (self.comment.owned_by_viewer, self.deleting) {
            (true, false) => Some("[delete]"),
            (true, true) => Some("[deleting...]"),
            (false, _) => None,
        }
    }

    /// The row wrapped to `width`, owner on the first line.
    pub fn lines(&self, width: u16) -> Vec<Line<'static>> {
        let marker = if self.selected { SELECTED_MARKER } else { MARKER };
        let owner = format!("{} ", self.comment.owner);
        let indent = " ".repeat(owner.width());
        let available = (width as usize).saturating_sub(marker.width()).max(1);
        let options = textwrap::Options::new(available).initial_indent(&indent);

        let owner_style = Style::default()
            .fg(self.theme.comment_owner)
            .add_modifier(Modifier::BOLD);
        let text_style = self.theme.comment_text_style();

        let mut lines: Vec<Line<'static>> = textwrap::wrap(&self.comment.text, options)
            .into_iter()
            .enumerate()
            .map(|(i, piece)| {
                if i == 0 {
                    let text = piece.strip_prefix(indent.as_str()).unwrap_or(&piece);
                    Line::from(vec![
                        Span::raw(marker),
                        Span::styled(owner.clone(), owner_style),
                        Span::styled(text.to_string(), text_style),
                    ])
                } else {
                    Line::from(vec![
                        Span::raw(MARKER),
                        Span::styled(piece.into_owned(), text_style),
                    ])
                }
            })
            .collect();

        if lines.is_empty() {
            lines.push(Line::from(vec![
                Span::raw(marker),
                Span::styled(owner, owner_style),
            ]));
        }
        if let (Some(label), Some(last)) = (self.action_label(), lines.last_mut()) {
            let style = if self.deleting {
                self.theme.dim_style()
            } else {
                self.theme.error_style()
            };
            last.spans.push(Span::raw(" "));
            last.spans.push(Span::styled(label, style));
        }
        lines
    }
}

impl Widget for CommentRow<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Paragraph::new(self.lines(area.width)).render(area, buf);
    }
}
