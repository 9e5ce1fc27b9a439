//! RGB colors as they appear in design specifications and computed CSS.
//!
//! Design documents use `#RRGGBB`; browsers report `rgb(r, g, b)` or
//! `rgba(r, g, b, a)`. Both map onto [`Color`], and comparisons allow a
//! per-channel tolerance because rendering rarely lands on exact values.

use crate::result::{ProofError, ProofResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Per-channel tolerance for specific color assertions
pub const DEFAULT_TOLERANCE: u8 = 10;

/// Per-channel tolerance when matching against the whole palette
pub const PALETTE_TOLERANCE: u8 = 20;

/// Channel floor for a color to count as "near white"
pub const NEAR_WHITE_FLOOR: u8 = 250;

/// Maximum pairwise channel spread for a color to count as gray
pub const GRAYSCALE_SPREAD: u8 = 10;

/// An opaque RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    /// Red channel
    pub r: u8,
    /// Green channel
    pub g: u8,
    /// Blue channel
    pub b: u8,
}

impl Color {
    /// Pure white
    pub const WHITE: Self = Self::new(255, 255, 255);
    /// Pure black
    pub const BLACK: Self = Self::new(0, 0, 0);

    /// Create a color from channels
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#RRGGBB` (case-insensitive).
    pub fn from_hex(hex: &str) -> ProofResult<Self> {
        let digits = hex
            .trim()
            .strip_prefix('#')
            .ok_or_else(|| ProofError::parse(format!("color {hex:?} must start with '#'")))?;
        if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ProofError::parse(format!(
                "color {hex:?} must have exactly six hex digits"
            )));
        }
        let channel = |start: usize| {
            u8::from_str_radix(&digits[start..start + 2], 16)
                .map_err(|e| ProofError::parse(format!("color {hex:?}: {e}")))
        };
        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Format as uppercase `#RRGGBB`
    #[must_use]
    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// Parse a computed CSS color such as `rgb(0, 74, 173)` or
    /// `rgba(0, 74, 173, 0.5)`.
    ///
    /// The first three numeric components are the channels; alpha is
    /// ignored. Returns `None` for keywords, hex and anything with fewer
    /// than three channels or a channel above 255.
    #[must_use]
    pub fn from_css(css: &str) -> Option<Self> {
        let lower = css.trim().to_ascii_lowercase();
        let body = lower
            .strip_prefix("rgba(")
            .or_else(|| lower.strip_prefix("rgb("))?
            .strip_suffix(')')?;

        let mut channels = body
            .split(|c: char| c == ',' || c == '/' || c.is_whitespace())
            .filter(|token| !token.is_empty())
            .take(3)
            .map(parse_channel);

        let r = channels.next()??;
        let g = channels.next()??;
        let b = channels.next()??;
        Some(Self::new(r, g, b))
    }

    /// Largest absolute per-channel difference
    #[must_use]
    pub const fn max_channel_delta(self, other: Self) -> u8 {
        let dr = self.r.abs_diff(other.r);
        let dg = self.g.abs_diff(other.g);
        let db = self.b.abs_diff(other.b);
        let max = if dr > dg { dr } else { dg };
        if max > db {
            max
        } else {
            db
        }
    }

    /// True iff every channel differs by at most `tolerance`
    #[must_use]
    pub const fn matches(self, other: Self, tolerance: u8) -> bool {
        self.max_channel_delta(other) <= tolerance
    }

    /// True iff all channels lie within [`GRAYSCALE_SPREAD`] of each other
    #[must_use]
    pub const fn is_grayscale(self) -> bool {
        self.r.abs_diff(self.g) <= GRAYSCALE_SPREAD
            && self.g.abs_diff(self.b) <= GRAYSCALE_SPREAD
            && self.r.abs_diff(self.b) <= GRAYSCALE_SPREAD
    }

    /// True iff every channel is at least [`NEAR_WHITE_FLOOR`]
    #[must_use]
    pub const fn is_near_white(self) -> bool {
        self.r >= NEAR_WHITE_FLOOR && self.g >= NEAR_WHITE_FLOOR && self.b >= NEAR_WHITE_FLOOR
    }
}

fn parse_channel(token: &str) -> Option<u8> {
    let value: f64 = token.parse().ok()?;
    if !(0.0..=255.0).contains(&value) {
        return None;
    }
    Some(value.round() as u8)
}

/// Whether a computed CSS color is fully transparent
#[must_use]
pub fn is_transparent_css(css: &str) -> bool {
    let normalized: String = css
        .trim()
        .to_ascii_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    normalized == "transparent" || normalized == "rgba(0,0,0,0)"
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Color {
    type Err = ProofError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}
