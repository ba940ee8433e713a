//! Terminal styling for chat output
//!
//! Defines colors and styling consistent with the design system.

use console::{Color, Style};

/// Unicode symbols
pub mod symbols {
    pub const AI_ICON: &str = "◆";
    pub const USER_ICON: &str = ">";
    pub const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
    pub const SUCCESS: &str = "✓";
    pub const ERROR: &str = "✗";
    pub const INFO: &str = "ℹ";
    pub const DIVIDER: &str = "─";
}

/// Styles used across the chat screen
pub struct ChatTheme {
    pub primary: Style,
    pub accent: Style,
    pub muted: Style,
    pub success: Style,
    pub error: Style,
    pub heading: Style,
}

impl Default for ChatTheme {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatTheme {
    pub fn new() -> Self {
        // Color256 approximations of #64B5F6, #FFCA28, #546E7A, #A5D6A7, #EF9A9A
        Self {
            primary: Style::new().fg(Color::Color256(117)),          // light blue
            accent: Style::new().fg(Color::Color256(220)).bold(),    // gold
            muted: Style::new().fg(Color::Color256(242)),            // gray
            success: Style::new().fg(Color::Color256(114)),          // light green
            error: Style::new().fg(Color::Color256(210)),            // light red
            heading: Style::new().fg(Color::Color256(117)).bold(),
        }
    }
}
