use ratatui::style::Color;

// Centralized theme colors for triggers and floating panels.

pub const ACCENT_RGB: (u8, u8, u8) = (200, 100, 0);

pub fn accent() -> Color {
    Color::Rgb(ACCENT_RGB.0, ACCENT_RGB.1, ACCENT_RGB.2)
}

// Triggers
pub fn trigger_fg() -> Color {
    Color::White
}
pub fn trigger_bg() -> Color {
    Color::DarkGray
}
pub fn trigger_focused_bg() -> Color {
    Color::Blue
}

// Floating panels
pub fn panel_bg() -> Color {
    Color::Black
}
pub fn panel_fg() -> Color {
    Color::White
}
pub fn panel_border() -> Color {
    Color::Gray
}

// Menu items
pub fn menu_selected_bg() -> Color {
    Color::Gray
}
pub fn menu_selected_fg() -> Color {
    Color::Black
}

// Tooltip
pub fn tooltip_bg() -> Color {
    Color::Yellow
}
pub fn tooltip_fg() -> Color {
    Color::Black
}

// Event log highlight
pub fn log_highlight() -> Color {
    accent()
}
