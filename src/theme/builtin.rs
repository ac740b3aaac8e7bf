use ratatui::style::Color;

use super::{ResolvedTheme, ThemeVariant};

pub fn default_for_variant(variant: ThemeVariant) -> ResolvedTheme {
    match variant {
        ThemeVariant::Dark => dark(),
        ThemeVariant::Light => light(),
    }
}

fn dark() -> ResolvedTheme {
    ResolvedTheme {
        name: "feed-dark",
        variant: ThemeVariant::Dark,
        foreground: Color::White,
        foreground_dim: Color::Rgb(0x6A, 0x9A, 0x9A),
        border: Color::Rgb(0x6A, 0x9A, 0x9A),
        selection_bg: Color::Rgb(0x2D, 0x33, 0x3B),
        primary: Color::Rgb(0x66, 0xD9, 0xEF),
        error: Color::Rgb(0xF9, 0x26, 0x72),
        post_owner: Color::White,
        post_time: Color::Rgb(0x6A, 0x9A, 0x9A),
        post_media: Color::Rgb(0xAE, 0x81, 0xFF),
        like_active: Color::Rgb(0xF9, 0x26, 0x72),
        like_count: Color::Rgb(0xE6, 0xDB, 0x74),
        comment_owner: Color::Rgb(0x66, 0xD9, 0xEF),
        comment_text: Color::Rgb(0xF8, 0xF8, 0xF2),
        status_bar_bg: Color::Rgb(0x3E, 0x3D, 0x32),
        status_bar_fg: Color::Rgb(0xF8, 0xF8, 0xF2),
        spinner: Color::Rgb(0xE6, 0xDB, 0x74),
    }
}

fn light() -> ResolvedTheme {
    ResolvedTheme {
        name: "feed-light",
        variant: ThemeVariant::Light,
        foreground: Color::Black,
        foreground_dim: Color::Rgb(0x5C, 0x6A, 0x72),
        border: Color::Rgb(0x93, 0xA1, 0xA1),
        selection_bg: Color::Rgb(0xE8, 0xE8, 0xE8),
        primary: Color::Rgb(0x00, 0x5F, 0xAF),
        error: Color::Rgb(0xCC, 0x00, 0x00),
        post_owner: Color::Black,
        post_time: Color::Rgb(0x5C, 0x6A, 0x72),
        post_media: Color::Rgb(0x6C, 0x71, 0xC4),
        like_active: Color::Rgb(0xED, 0x49, 0x56),
        like_count: Color::Rgb(0xB5, 0x89, 0x00),
        comment_owner: Color::Rgb(0x00, 0x5F, 0xAF),
        comment_text: Color::Rgb(0x26, 0x26, 0x26),
        status_bar_bg: Color::Rgb(0xEE, 0xE8, 0xD5),
        status_bar_fg: Color::Rgb(0x07, 0x36, 0x42),
        spinner: Color::Rgb(0xB5, 0x89, 0x00),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variants_resolve_to_matching_palette() {
        assert_eq!(default_for_variant(ThemeVariant::Dark).variant, ThemeVariant::Dark);
        assert_eq!(default_for_variant(ThemeVariant::Light).variant, ThemeVariant::Light);
        assert_ne!(
            default_for_variant(ThemeVariant::Dark).name,
            default_for_variant(ThemeVariant::Light).name
        );
    }
}
