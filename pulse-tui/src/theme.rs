//! Pulse theme and color utilities.

use pulse_cache::QueryStatus;
use ratatui::style::Color;

use crate::notifications::NotificationLevel;

/// Names accepted by `[theme] name`.
pub const THEME_NAMES: &[&str] = &["pulse"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PulseTheme {
    pub bg: Color,
    pub bg_highlight: Color,
    pub primary: Color,
    pub primary_dim: Color,
    pub secondary: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub info: Color,
    pub text: Color,
    pub text_dim: Color,
    pub border: Color,
    pub border_focus: Color,
    /// Series colors for charts, cycled by index.
    pub series: [Color; 5],
}

impl PulseTheme {
    pub fn pulse() -> Self {
        Self {
            bg: Color::Rgb(15, 17, 26),
            bg_highlight: Color::Rgb(36, 40, 59),
            primary: Color::Rgb(136, 132, 216),
            primary_dim: Color::Rgb(86, 82, 150),
            secondary: Color::Rgb(130, 202, 157),
            success: Color::Rgb(130, 202, 157),
            warning: Color::Rgb(255, 198, 88),
            error: Color::Rgb(255, 99, 99),
            info: Color::Rgb(125, 207, 255),
            text: Color::Rgb(220, 223, 228),
            text_dim: Color::Rgb(130, 135, 150),
            border: Color::Rgb(65, 72, 104),
            border_focus: Color::Rgb(136, 132, 216),
            series: [
                Color::Rgb(136, 132, 216),
                Color::Rgb(130, 202, 157),
                Color::Rgb(255, 198, 88),
                Color::Rgb(255, 128, 66),
                Color::Rgb(0, 196, 159),
            ],
        }
    }

    /// Look up a theme by its configured name, ignoring case.
    pub fn by_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "pulse" => Some(Self::pulse()),
            _ => None,
        }
    }

    pub fn series_color(&self, index: usize) -> Color {
        self.series[index % self.series.len()]
    }
}

impl Default for PulseTheme {
    fn default() -> Self {
        Self::pulse()
    }
}

pub fn notification_color(level: NotificationLevel, theme: &PulseTheme) -> Color {
    match level {
        NotificationLevel::Info => theme.info,
        NotificationLevel::Warning => theme.warning,
        NotificationLevel::Error => theme.error,
        NotificationLevel::Success => theme.success,
    }
}

pub fn query_status_color(status: QueryStatus, theme: &PulseTheme) -> Color {
    match status {
        QueryStatus::Idle => theme.text_dim,
        QueryStatus::Loading => theme.info,
        QueryStatus::Success => theme.text,
        QueryStatus::Error => theme.error,
    }
}
