//! Visual state derived from a widget config.

use crate::config::WidgetConfig;

/// Scale applied while hovered when `hover_scale` is on.
pub const HOVER_SCALE: f64 = 1.05;

/// Stacking layer a widget lives in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Layer {
    /// Below application windows, on the desktop background.
    #[default]
    Background,
    /// Above application windows.
    Chrome,
}

/// Computed chrome style for the host renderer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WidgetStyle {
    /// CSS-like declaration block.
    pub css: String,
    /// 0..=255, `transparency * 2.55` truncated.
    pub opacity: u8,
    /// Background blur radius, 0 when disabled.
    pub blur_radius: u32,
}

impl WidgetStyle {
    pub fn from_config(config: &WidgetConfig) -> Self {
        let mut css = format!(
            "background-color: {}; border-radius: {}px; border: {}px solid {};",
            config.background_color, config.corner_radius, config.border_width, config.border_color,
        );
        if config.shadow_blur > 0 {
            css.push_str(&format!(
                " box-shadow: 0 4px {}px {};",
                config.shadow_blur, config.shadow_color
            ));
        }

        Self {
            css,
            opacity: (u32::from(config.transparency.min(100)) * 255 / 100) as u8,
            blur_radius: if config.background_blur { config.blur_radius } else { 0 },
        }
    }
}

impl Layer {
    pub fn from_config(config: &WidgetConfig) -> Self {
        if config.always_on_top {
            Layer::Chrome
        } else {
            Layer::Background
        }
    }
}
