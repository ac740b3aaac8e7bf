//! The like button and count for one post.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use crate::api::LikeState;
use crate::post::{LikeAction, LikePhase, PostIntent};
use crate::theme::ResolvedTheme;

pub struct LikeControl<'a> {
    like: &'a LikeState,
    phase: LikePhase,
    theme: &'a ResolvedTheme,
}

impl<'a> LikeControl<'a> {
    pub const fn new(like: &'a LikeState, phase: LikePhase, theme: &'a ResolvedTheme) -> Self {
        Self { like, phase, theme }
    }

    /// What activating the button asks for. Disabled while a request is pending.
    pub const fn intent(&self) -> Option<PostIntent> {
        match self.phase {
            LikePhase::Pending(_) => None,
            LikePhase::Liked | LikePhase::Unliked => Some(PostIntent::LikeToggled),
        }
    }

    pub const fn button_label(&self) -> &'static str {
        match self.phase {
            LikePhase::Unliked => "like",
            LikePhase::Liked => "unlike",
            LikePhase::Pending(LikeAction::Create) => "liking...",
            LikePhase::Pending(LikeAction::Delete) => "unliking...",
        }
    }

    pub fn spans(&self) -> Vec<Span<'static>> {
        let button_style = match self.phase {
            LikePhase::Unliked => Style::default().fg(self.theme.primary),
            LikePhase::Liked => Style::default()
                .fg(self.theme.like_active)
                .add_modifier(Modifier::BOLD),
            LikePhase::Pending(_) => self.theme.dim_style(),
        };
        vec![
            Span::styled(format!("[{}]", self.button_label()), button_style),
            Span::raw(" "),
            Span::styled(
                count_label(self.like.count),
                Style::default().fg(self.theme.like_count),
            ),
        ]
    }
}

pub fn count_label(count: u64) -> String {
    let noun = if count == 1 { "like" } else { "likes" };
    format!("{count} {noun}")
}

impl Widget for LikeControl<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Paragraph::new(Line::from(self.spans())).render(area, buf);
    }
}
