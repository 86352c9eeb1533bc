// Color palette for the TUI
use ratatui::style::Color;

pub const BG_DARK: Color = Color::Rgb(24, 24, 32);
pub const BORDER_COLOR: Color = Color::Rgb(88, 91, 112);

pub const TEXT_PRIMARY: Color = Color::Rgb(205, 214, 244);
pub const TEXT_SECONDARY: Color = Color::Rgb(147, 153, 178);

/// Errors and the tile being dragged
pub const ACCENT_PRIMARY: Color = Color::Rgb(243, 139, 168);
/// Progress and successful operations
pub const ACCENT_SECONDARY: Color = Color::Rgb(166, 227, 161);
/// Titles, cursor and drop targets
pub const ACCENT_HIGHLIGHT: Color = Color::Rgb(137, 180, 250);
