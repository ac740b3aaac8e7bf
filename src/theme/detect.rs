use super::ThemeVariant;

/// Luma above which the terminal background counts as light.
const LIGHT_THRESHOLD: f32 = 0.6;

/// Guess the variant from the terminal background. Falls back to dark when the
/// terminal does not answer.
pub fn detect_terminal_theme() -> ThemeVariant {
    match terminal_light::luma() {
        Ok(luma) => {
            tracing::debug!(luma, "detected terminal background");
            variant_for_luma(luma)
        }
        Err(e) => {
            tracing::debug!(error = %e, "terminal background detection failed");
            ThemeVariant::Dark
        }
    }
}

fn variant_for_luma(luma: f32) -> ThemeVariant {
    if luma > LIGHT_THRESHOLD {
        ThemeVariant::Light
    } else {
        ThemeVariant::Dark
    }
}
