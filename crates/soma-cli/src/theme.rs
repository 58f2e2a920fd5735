//! Color palette for console output.

use crossterm::style::Color;

// ── Color palette ─────────────────────────────────────────────────────────────

pub const C_ACCENT: Color = Color::Rgb { r: 255, g: 95, b: 95 };
pub const C_PLAYING: Color = Color::Rgb { r: 80, g: 200, b: 120 };
pub const C_ERROR: Color = Color::Rgb { r: 255, g: 80, b: 80 };
pub const C_WARNING: Color = Color::Rgb { r: 255, g: 184, b: 80 };
pub const C_SECONDARY: Color = Color::Rgb { r: 115, g: 115, b: 138 };
pub const C_PRIMARY: Color = Color::Rgb { r: 210, g: 210, b: 225 };
pub const C_LABEL: Color = Color::Rgb { r: 80, g: 190, b: 210 };
pub const C_TAG: Color = Color::Rgb { r: 80, g: 140, b: 200 };
pub const C_STATION_ID: Color = Color::Rgb { r: 255, g: 210, b: 50 };
pub const C_TOTAL: Color = Color::Rgb { r: 255, g: 200, b: 80 };

pub const SEPARATOR: &str = "--------------------------";
