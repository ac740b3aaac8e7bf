use ratatui::{
    Frame,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::app::App;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;

    let block = Block::default()
        .title(" Debug ")
        .borders(Borders::ALL)
        .border_style(theme.dim_style());

    let mut lines = Vec::new();

    let in_flight = app.feed.in_flight();
    lines.push(Line::from(vec![
        Span::styled("In flight: ", theme.dim_style()),
        Span::styled(
            in_flight.to_string(),
            Style::default().fg(if in_flight > 0 {
                theme.spinner
            } else {
                theme.foreground
            }),
        ),
        Span::styled(
            format!("  posts: {}", app.feed.posts().len()),
            theme.dim_style(),
        ),
    ]));

    // Newest first; 3 rows go to the border and the header.
    let log_lines = area.height.saturating_sub(3) as usize;
    for entry in app.debug.log.iter().rev().take(log_lines) {
        lines.push(Line::from(Span::styled(
            format!("  {}", entry.message),
            theme.dim_style(),
        )));
    }

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
