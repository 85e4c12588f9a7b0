// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Kanflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Kanflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::{error::Error, fmt};

use ratatui::style::{Color, Modifier, Style};

pub(crate) const PALETTE_ENV: &str = "KANFLOW_PALETTE";

/// Styles for the editor. Without a palette override the terminal's own colors are used.
#[derive(Debug, Clone, Default)]
pub(crate) struct TuiTheme {
    palette: Option<TuiPalette>,
}

impl TuiTheme {
    pub(crate) fn from_env() -> Result<Self, ThemeError> {
        let palette = match std::env::var(PALETTE_ENV) {
            Ok(value) => palette_override(&value)?,
            Err(std::env::VarError::NotPresent) => None,
            Err(std::env::VarError::NotUnicode(_)) => {
                return Err(ThemeError::InvalidEnv {
                    name: PALETTE_ENV.to_owned(),
                    value: "<non-unicode>".to_owned(),
                });
            }
        };
        Ok(Self { palette })
    }

    pub(crate) fn base_style(&self) -> Style {
        match &self.palette {
            Some(palette) => Style::default().fg(palette.fg).bg(palette.bg),
            None => Style::default(),
        }
    }

    fn ansi_color(&self, color: Ansi16) -> Color {
        match &self.palette {
            Some(palette) => palette.ansi[color as usize],
            None => color.into(),
        }
    }

    pub(crate) fn panel_border_style(&self, focused: bool) -> Style {
        if focused {
            self.base_style().fg(self.ansi_color(Ansi16::Yellow))
        } else {
            self.base_style()
        }
    }

    pub(crate) fn selection_style(&self) -> Style {
        self.base_style().add_modifier(Modifier::REVERSED | Modifier::BOLD)
    }

    /// The state a connect gesture starts from.
    pub(crate) fn connect_source_style(&self) -> Style {
        self.base_style()
            .fg(self.ansi_color(Ansi16::Black))
            .bg(self.ansi_color(Ansi16::Cyan))
            .add_modifier(Modifier::BOLD)
    }

    pub(crate) fn pending_edge_style(&self) -> Style {
        self.base_style()
            .fg(self.ansi_color(Ansi16::Yellow))
            .add_modifier(Modifier::DIM)
    }

    pub(crate) fn connected_style(&self) -> Style {
        self.base_style().fg(self.ansi_color(Ansi16::Green))
    }

    pub(crate) fn muted_style(&self) -> Style {
        self.base_style().fg(self.ansi_color(Ansi16::BrightBlack))
    }

    pub(crate) fn warning_style(&self) -> Style {
        self.base_style().fg(self.ansi_color(Ansi16::Yellow))
    }

    pub(crate) fn error_style(&self) -> Style {
        self.base_style().fg(self.ansi_color(Ansi16::Red))
    }

    /// Node border color taken from the state's `#RRGGBB` color. Unparseable colors fall back
    /// to the base style.
    pub(crate) fn state_style(&self, color: &str) -> Style {
        match parse_palette_color(color) {
            Ok(color) => self.base_style().fg(color),
            Err(_) => self.base_style(),
        }
    }
}

#[derive(Debug, Clone)]
struct TuiPalette {
    fg: Color,
    bg: Color,
    ansi: [Color; 16],
}

impl TuiPalette {
    const CSV_LEN: usize = 18;

    fn parse_csv(value: &str) -> Result<Self, String> {
        let parts: Vec<&str> = value.split(',').map(str::trim).collect();
        if parts.len() != Self::CSV_LEN {
            return Err(format!(
                "expected {} comma-separated colors (fg,bg and the 16 ansi colors), got {}",
                Self::CSV_LEN,
                parts.len()
            ));
        }

        let fg = parse_palette_color(parts[0])?;
        let bg = parse_palette_color(parts[1])?;
        let mut ansi = [Color::Reset; 16];
        for (slot, part) in ansi.iter_mut().zip(parts.iter().skip(2)) {
            *slot = parse_palette_color(part)?;
        }

        Ok(Self { fg, bg, ansi })
    }
}

fn palette_override(value: &str) -> Result<Option<TuiPalette>, ThemeError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    TuiPalette::parse_csv(trimmed)
        .map(Some)
        .map_err(|error| ThemeError::InvalidEnv {
            name: PALETTE_ENV.to_owned(),
            value: format!("{trimmed} ({error})"),
        })
}

fn parse_palette_color(value: &str) -> Result<Color, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err("empty color".to_owned());
    }

    let hex = trimmed
        .strip_prefix('#')
        .or_else(|| trimmed.strip_prefix("0x"))
        .unwrap_or(trimmed);
    if hex.len() != 6 || !hex.chars().all(|ch| ch.is_ascii_hexdigit()) {
        return Err(format!("invalid hex color: {trimmed} (expected #RRGGBB)"));
    }

    let rgb = u32::from_str_radix(hex, 16).map_err(|_| format!("invalid hex color: {trimmed}"))?;
    Ok(Color::Rgb((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(dead_code)]
enum Ansi16 {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
    BrightBlack,
    BrightRed,
    BrightGreen,
    BrightYellow,
    BrightBlue,
    BrightMagenta,
    BrightCyan,
    BrightWhite,
}

impl From<Ansi16> for Color {
    fn from(value: Ansi16) -> Self {
        match value {
            Ansi16::Black => Color::Black,
            Ansi16::Red => Color::Red,
            Ansi16::Green => Color::Green,
            Ansi16::Yellow => Color::Yellow,
            Ansi16::Blue => Color::Blue,
            Ansi16::Magenta => Color::Magenta,
            Ansi16::Cyan => Color::Cyan,
            Ansi16::White => Color::Gray,
            Ansi16::BrightBlack => Color::DarkGray,
            Ansi16::BrightRed => Color::LightRed,
            Ansi16::BrightGreen => Color::LightGreen,
            Ansi16::BrightYellow => Color::LightYellow,
            Ansi16::BrightBlue => Color::LightBlue,
            Ansi16::BrightMagenta => Color::LightMagenta,
            Ansi16::BrightCyan => Color::LightCyan,
            Ansi16::BrightWhite => Color::White,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) enum ThemeError {
    InvalidEnv { name: String, value: String },
}

impl fmt::Display for ThemeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidEnv { name, value } => write!(f, "invalid env {name}={value}"),
        }
    }
}

impl Error for ThemeError {}
