//! Colours for the interactive item table.
//!
//! Muted Tokyo Night base with saturated accents reserved for severity, so
//! a critical row stands out without the rest of the table competing.

use ratatui::style::{Color, Modifier, Style};

pub mod colors {
    use ratatui::style::Color;

    pub const BG_DEEP: Color = Color::Rgb(26, 27, 38); // #1a1b26
    pub const BG_HIGHLIGHT: Color = Color::Rgb(41, 46, 66); // #292e42
    pub const BORDER: Color = Color::Rgb(59, 66, 97); // #3b4261

    pub const TEXT_PRIMARY: Color = Color::Rgb(192, 202, 245); // #c0caf5
    /// Lightened from #565f89 for WCAG AA-large contrast
    pub const TEXT_MUTED: Color = Color::Rgb(105, 114, 158); // #696e9e

    pub const ACCENT_PRIMARY: Color = Color::Rgb(122, 162, 247); // #7aa2f7

    pub const LEVEL_CRITICAL: Color = Color::Rgb(255, 85, 110); // #ff556e
    pub const LEVEL_ERROR: Color = Color::Rgb(247, 118, 142); // #f7768e
    pub const LEVEL_WARNING: Color = Color::Rgb(224, 175, 104); // #e0af68
    pub const LEVEL_INFO: Color = Color::Rgb(125, 207, 255); // #7dcfff
    pub const LEVEL_DEBUG: Color = Color::Rgb(105, 114, 158); // #696e9e

    pub const STATUS_RESOLVED: Color = Color::Rgb(115, 218, 202); // #73daca
}

#[derive(Clone, Copy)]
pub struct ThemePalette {
    pub accent: Color,
    pub bg: Color,
    pub fg: Color,
    pub hint: Color,
    pub border: Color,
    pub selected_bg: Color,
}

impl Default for ThemePalette {
    fn default() -> Self {
        Self::dark()
    }
}

impl ThemePalette {
    pub fn dark() -> Self {
        Self {
            accent: colors::ACCENT_PRIMARY,
            bg: colors::BG_DEEP,
            fg: colors::TEXT_PRIMARY,
            hint: colors::TEXT_MUTED,
            border: colors::BORDER,
            selected_bg: colors::BG_HIGHLIGHT,
        }
    }

    pub fn header(self) -> Style {
        Style::default()
            .fg(self.accent)
            .add_modifier(Modifier::BOLD)
    }

    pub fn hint_style(self) -> Style {
        Style::default().fg(self.hint)
    }

    pub fn border_style(self) -> Style {
        Style::default().fg(self.border)
    }

    pub fn selected_style(self) -> Style {
        Style::default()
            .bg(self.selected_bg)
            .add_modifier(Modifier::BOLD)
    }

    /// Foreground for a level cell; unknown levels use the body colour.
    pub fn level_style(self, level: &str) -> Style {
        let fg = match level {
            "critical" => colors::LEVEL_CRITICAL,
            "error" => colors::LEVEL_ERROR,
            "warning" => colors::LEVEL_WARNING,
            "info" => colors::LEVEL_INFO,
            "debug" => colors::LEVEL_DEBUG,
            _ => self.fg,
        };
        let style = Style::default().fg(fg);
        if level == "critical" {
            style.add_modifier(Modifier::BOLD)
        } else {
            style
        }
    }

    pub fn status_style(self, status: &str) -> Style {
        match status {
            "resolved" => Style::default().fg(colors::STATUS_RESOLVED),
            "muted" => self.hint_style(),
            _ => Style::default().fg(self.fg),
        }
    }
}
