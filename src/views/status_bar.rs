use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::theme::ResolvedTheme;

/// Builder for rendering a consistent status bar across views.
///
/// The status bar has a standard layout:
/// `[Label] [Loading?] Position | [Banner?] | Help Text`
pub struct StatusBar<'a> {
    theme: &'a ResolvedTheme,
    label: &'a str,
    loading_text: Option<&'a str>,
    position: Option<(usize, usize)>,
    banner: Option<&'a str>,
    help_text: &'a str,
}

impl<'a> StatusBar<'a> {
    pub fn new(theme: &'a ResolvedTheme) -> Self {
        Self {
            theme,
            label: "",
            loading_text: None,
            position: None,
            banner: None,
            help_text: "",
        }
    }

    pub fn label(mut self, label: &'a str) -> Self {
        self.label = label;
        self
    }

    pub fn loading(mut self, text: &'a str) -> Self {
        self.loading_text = Some(text);
        self
    }

    pub fn position(mut self, current: usize, total: usize) -> Self {
        self.position = Some((current, total));
        self
    }

    /// The last failure, shown until the next key press.
    pub fn banner(mut self, text: &'a str) -> Self {
        self.banner = Some(text);
        self
    }

    pub fn help(mut self, text: &'a str) -> Self {
        self.help_text = text;
        self
    }

    pub fn render(self, frame: &mut Frame, area: Rect) {
        let mut spans = vec![
            Span::styled(
                format!(" {} ", self.label),
                self.theme.status_bar_style(),
            ),
            Span::raw(" "),
        ];

        if let Some(loading) = self.loading_text {
            spans.push(Span::styled(
                loading.to_string(),
                self.theme.spinner_style(),
            ));
            spans.push(Span::raw(" | "));
        }

        if let Some((current, total)) = self.position {
            spans.push(Span::styled(
                format!("{}/{}", current, total),
                self.theme.dim_style(),
            ));
            spans.push(Span::raw(" | "));
        }

        if let Some(banner) = self.banner {
            spans.push(Span::styled(banner.to_string(), self.theme.error_style()));
            spans.push(Span::raw(" | "));
        }

        spans.push(Span::styled(
            self.help_text.to_string(),
            self.theme.dim_style(),
        ));

        let status = Line::from(spans);
        frame.render_widget(Paragraph::new(status), area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::{ThemeVariant, default_for_variant};
    use crate::views::tests::render_to_string;

    #[test]
    fn status_bar_full() {
        let theme = default_for_variant(ThemeVariant::Dark);
        let output = render_to_string(60, 1, |frame| {
            StatusBar::new(&theme)
                .label("Feed")
                .position(5, 100)
                .help("j/k:nav  ?:help")
                .render(frame, frame.area());
        });

        assert!(output.contains("Feed"));
        assert!(output.contains("5/100"));
        assert!(output.contains("j/k:nav"));
    }

    #[test]
    fn status_bar_with_loading() {
        let theme = default_for_variant(ThemeVariant::Dark);
        let output = render_to_string(60, 1, |frame| {
            StatusBar::new(&theme)
                .label("Feed")
                .loading("Loading...")
                .position(1, 50)
                .help("?:help")
                .render(frame, frame.area());
        });

        assert!(output.contains("Loading"));
        assert!(output.contains("1/50"));
    }

    #[test]
    fn status_bar_shows_banner_before_help() {
        let theme = default_for_variant(ThemeVariant::Dark);
        let output = render_to_string(80, 1, |frame| {
            StatusBar::new(&theme)
                .label("Feed")
                .banner("Server error. Please try again later.")
                .help("q:quit")
                .render(frame, frame.area());
        });

        let banner = output.find("Server error").unwrap();
        let help = output.find("q:quit").unwrap();
        assert!(banner < help);
    }

    #[test]
    fn status_bar_minimal() {
        let theme = default_for_variant(ThemeVariant::Dark);
        let output = render_to_string(40, 1, |frame| {
            StatusBar::new(&theme)
                .label("Compose")
                .help("Esc:done")
                .render(frame, frame.area());
        });

        assert_eq!(output, " Compose  Esc:done");
    }
}
