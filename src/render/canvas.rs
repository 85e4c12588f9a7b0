// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Kanflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Kanflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;

pub const BOX_HORIZONTAL: char = '─';
pub const BOX_VERTICAL: char = '│';
pub const BOX_TOP_LEFT: char = '┌';
pub const BOX_TOP_RIGHT: char = '┐';
pub const BOX_BOTTOM_LEFT: char = '└';
pub const BOX_BOTTOM_RIGHT: char = '┘';

pub const DASHED_HORIZONTAL: char = '┄';
pub const DASHED_VERTICAL: char = '┆';

/// Line directions leaving a cell. Box-drawing glyphs are derived from these at render time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct Arms(u8);

impl Arms {
    const LEFT: u8 = 1 << 0;
    const RIGHT: u8 = 1 << 1;
    const UP: u8 = 1 << 2;
    const DOWN: u8 = 1 << 3;

    fn has(self, arm: u8) -> bool {
        self.0 & arm != 0
    }

    fn of(ch: char) -> Option<Self> {
        let bits = match ch {
            '─' => Self::LEFT | Self::RIGHT,
            '│' => Self::UP | Self::DOWN,
            '┌' => Self::RIGHT | Self::DOWN,
            '┐' => Self::LEFT | Self::DOWN,
            '└' => Self::RIGHT | Self::UP,
            '┘' => Self::LEFT | Self::UP,
            '├' => Self::UP | Self::DOWN | Self::RIGHT,
            '┤' => Self::UP | Self::DOWN | Self::LEFT,
            '┬' => Self::LEFT | Self::RIGHT | Self::DOWN,
            '┴' => Self::LEFT | Self::RIGHT | Self::UP,
            '┼' => Self::LEFT | Self::RIGHT | Self::UP | Self::DOWN,
            _ => return None,
        };
        Some(Self(bits))
    }

    fn glyph(self) -> char {
        match self.0 {
            0 => ' ',
            1..=3 => '─',
            4 | 8 | 12 => '│',
            10 => '┌',
            9 => '┐',
            6 => '└',
            5 => '┘',
            14 => '├',
            13 => '┤',
            11 => '┬',
            7 => '┴',
            _ => '┼',
        }
    }
}

/// A fixed-size character grid.
///
/// Plain characters overwrite. Box-drawing characters accumulate their arms in the cell and are
/// rendered as the junction formed with neighbouring arms, so crossing lines become `┼`, `├`, `┬`
/// and so on instead of overwriting each other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canvas {
    width: usize,
    height: usize,
    cells: Vec<char>,
    arms: Vec<Arms>,
}

impl Canvas {
    pub fn new(width: usize, height: usize) -> Result<Self, CanvasError> {
        let len = width
            .checked_mul(height)
            .ok_or(CanvasError::AreaOverflow { width, height })?;

        Ok(Self {
            width,
            height,
            cells: vec![' '; len],
            arms: vec![Arms::default(); len],
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn get(&self, x: usize, y: usize) -> Result<char, CanvasError> {
        let idx = self.index_of(x, y)?;
        Ok(self.glyph_at(x, y, idx))
    }

    pub fn set(&mut self, x: usize, y: usize, ch: char) -> Result<(), CanvasError> {
        let idx = self.index_of(x, y)?;
        match Arms::of(ch) {
            Some(arms) => self.arms[idx] = Arms(self.arms[idx].0 | arms.0),
            None => {
                self.cells[idx] = ch;
                self.arms[idx] = Arms::default();
            }
        }
        Ok(())
    }

    /// Writes `text` starting at `(x, y)`, clipped at the right edge.
    pub fn write_str(&mut self, x: usize, y: usize, text: &str) -> Result<(), CanvasError> {
        if y >= self.height {
            return Err(CanvasError::OutOfBounds { x, y, width: self.width, height: self.height });
        }
        for (offset, ch) in text.chars().enumerate() {
            if x + offset >= self.width {
                break;
            }
            self.set(x + offset, y, ch)?;
        }
        Ok(())
    }

    /// Fills `x0..=x1` on row `y` with `ch`. Box characters join their neighbours.
    pub fn hline(&mut self, x0: usize, x1: usize, y: usize, ch: char) -> Result<(), CanvasError> {
        let (lo, hi) = (x0.min(x1), x0.max(x1));
        self.index_of(lo, y)?;
        self.index_of(hi, y)?;
        for x in lo..=hi {
            self.set(x, y, ch)?;
        }
        Ok(())
    }

    /// Fills `y0..=y1` in column `x` with `ch`.
    pub fn vline(&mut self, x: usize, y0: usize, y1: usize, ch: char) -> Result<(), CanvasError> {
        let (lo, hi) = (y0.min(y1), y0.max(y1));
        self.index_of(x, lo)?;
        self.index_of(x, hi)?;
        for y in lo..=hi {
            self.set(x, y, ch)?;
        }
        Ok(())
    }

    /// Draws a single-line box with corners at `(x0, y0)` and `(x1, y1)`. Nothing is drawn if
    /// any corner is out of bounds.
    pub fn draw_box(&mut self, x0: usize, y0: usize, x1: usize, y1: usize) -> Result<(), CanvasError> {
        let (left, right) = (x0.min(x1), x0.max(x1));
        let (top, bottom) = (y0.min(y1), y0.max(y1));
        self.index_of(right, bottom)?;
        if left == right || top == bottom {
            return Err(CanvasError::DegenerateBox { x0, y0, x1, y1 });
        }

        if right - left > 1 {
            self.hline(left + 1, right - 1, top, BOX_HORIZONTAL)?;
            self.hline(left + 1, right - 1, bottom, BOX_HORIZONTAL)?;
        }
        if bottom - top > 1 {
            self.vline(left, top + 1, bottom - 1, BOX_VERTICAL)?;
            self.vline(right, top + 1, bottom - 1, BOX_VERTICAL)?;
        }
        self.set(left, top, BOX_TOP_LEFT)?;
        self.set(right, top, BOX_TOP_RIGHT)?;
        self.set(left, bottom, BOX_BOTTOM_LEFT)?;
        self.set(right, bottom, BOX_BOTTOM_RIGHT)
    }

    /// Rows as strings with trailing blanks removed and trailing empty rows dropped.
    pub fn to_trimmed_string(&self) -> String {
        let mut lines = (0..self.height)
            .map(|y| {
                let row = (0..self.width)
                    .map(|x| self.glyph_at(x, y, y * self.width + x))
                    .collect::<String>();
                row.trim_end_matches(' ').to_owned()
            })
            .collect::<Vec<_>>();

        while lines.last().is_some_and(|line| line.is_empty()) {
            lines.pop();
        }
        lines.join("\n")
    }

    fn index_of(&self, x: usize, y: usize) -> Result<usize, CanvasError> {
        if x >= self.width || y >= self.height {
            return Err(CanvasError::OutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        Ok(y * self.width + x)
    }

    fn glyph_at(&self, x: usize, y: usize, idx: usize) -> char {
        let own = self.arms[idx];
        if own.0 == 0 {
            return self.cells[idx];
        }

        let neighbour = |dx: isize, dy: isize| -> Arms {
            let (Some(nx), Some(ny)) = (x.checked_add_signed(dx), y.checked_add_signed(dy)) else {
                return Arms::default();
            };
            if nx >= self.width || ny >= self.height {
                return Arms::default();
            }
            self.arms[ny * self.width + nx]
        };

        let mut joined = 0;
        if own.has(Arms::LEFT) && neighbour(-1, 0).has(Arms::RIGHT) {
            joined |= Arms::LEFT;
        }
        if own.has(Arms::RIGHT) && neighbour(1, 0).has(Arms::LEFT) {
            joined |= Arms::RIGHT;
        }
        if own.has(Arms::UP) && neighbour(0, -1).has(Arms::DOWN) {
            joined |= Arms::UP;
        }
        if own.has(Arms::DOWN) && neighbour(0, 1).has(Arms::UP) {
            joined |= Arms::DOWN;
        }

        // An isolated stroke keeps its own shape.
        if joined == 0 {
            own.glyph()
        } else {
            Arms(joined).glyph()
        }
    }
}

impl fmt::Display for Canvas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use std::fmt::Write as _;

        for y in 0..self.height {
            if y > 0 {
                f.write_char('\n')?;
            }
            for x in 0..self.width {
                f.write_char(self.glyph_at(x, y, y * self.width + x))?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CanvasError {
    AreaOverflow { width: usize, height: usize },
    OutOfBounds { x: usize, y: usize, width: usize, height: usize },
    DegenerateBox { x0: usize, y0: usize, x1: usize, y1: usize },
}

impl fmt::Display for CanvasError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AreaOverflow { width, height } => {
                write!(f, "canvas area overflow: {width}*{height}")
            }
            Self::OutOfBounds { x, y, width, height } => {
                write!(f, "out of bounds: ({x},{y}) for {width}x{height} canvas")
            }
            Self::DegenerateBox { x0, y0, x1, y1 } => {
                write!(f, "box ({x0},{y0})-({x1},{y1}) has no interior")
            }
        }
    }
}

impl std::error::Error for CanvasError {}
