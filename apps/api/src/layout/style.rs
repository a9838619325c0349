//! Frequency → style mapping for word-cloud terms.
//!
//! Every parameter is linear in `count / max_count`, clamped to `[0, 1]`.
//! Styles must be applied to a term's box before the box is measured, because
//! font size and letter spacing change its geometry.

use serde::{Deserialize, Serialize};

const FONT_SIZE_BASE_EM: f32 = 0.5;
const FONT_SIZE_RANGE_EM: f32 = 2.25;
const OPACITY_BASE: f32 = 0.7;
const OPACITY_RANGE: f32 = 0.3;
const LETTER_SPACING_BASE_EM: f32 = 0.02;
const LETTER_SPACING_RANGE_EM: f32 = 0.04;

/// Fixed font weight; not frequency-dependent.
pub const FONT_WEIGHT: u16 = 700;

/// Colour palette, assigned to term slots round-robin.
pub const WORD_CLOUD_COLORS: &[&str] = &[
    "#f43f5e", // rose-500
    "#0891b2", // cyan-600
    "#84cc16", // lime-500
    "#c026d3", // fuchsia-600
    "#4b5563", // slate-600
    "#14b8a6", // teal-500
];

/// Interpolated style for one term.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TermStyle {
    pub font_size_em: f32,
    pub opacity: f32,
    /// May go negative for the most frequent terms.
    pub letter_spacing_em: f32,
    pub font_weight: u16,
}

impl TermStyle {
    /// Style used for a box that has never been styled (count 0).
    pub fn minimum() -> Self {
        style_for_ratio(0.0)
    }
}

/// Maps a term's count to its style. A `max_count` of 0 is treated as 1.
pub fn style_for(count: u64, max_count: u64) -> TermStyle {
    let max_count = max_count.max(1);
    style_for_ratio(count as f32 / max_count as f32)
}

fn style_for_ratio(ratio: f32) -> TermStyle {
    let r = ratio.clamp(0.0, 1.0);
    TermStyle {
        font_size_em: FONT_SIZE_BASE_EM + FONT_SIZE_RANGE_EM * r,
        opacity: OPACITY_BASE + OPACITY_RANGE * r,
        letter_spacing_em: LETTER_SPACING_BASE_EM - LETTER_SPACING_RANGE_EM * r,
        font_weight: FONT_WEIGHT,
    }
}

/// Palette colour for a term slot.
pub fn color_for_slot(slot: usize) -> &'static str {
    WORD_CLOUD_COLORS[slot % WORD_CLOUD_COLORS.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn test_max_count_term_gets_largest_style() {
        let s = style_for(20, 20);
        assert!(approx(s.font_size_em, 2.75));
        assert!(approx(s.opacity, 1.0));
        assert!(approx(s.letter_spacing_em, -0.02));
        assert_eq!(s.font_weight, FONT_WEIGHT);
    }

    #[test]
    fn test_half_count_interpolates_linearly() {
        let s = style_for(10, 20);
        assert!(approx(s.font_size_em, 1.625));
        assert!(approx(s.opacity, 0.85));
        assert!(approx(s.letter_spacing_em, 0.0));
    }

    #[test]
    fn test_zero_count_is_minimum_style() {
        assert_eq!(style_for(0, 7), TermStyle::minimum());
        assert!(approx(TermStyle::minimum().font_size_em, 0.5));
    }

    #[test]
    fn test_zero_max_count_does_not_divide_by_zero() {
        let s = style_for(0, 0);
        assert!(s.font_size_em.is_finite());
        assert!(approx(s.font_size_em, 0.5));
    }

    #[test]
    fn test_stale_max_count_is_clamped() {
        // count larger than max_count must not exceed the top of the scale
        assert_eq!(style_for(50, 20), style_for(20, 20));
    }

    #[test]
    fn test_color_for_slot_wraps() {
        assert_eq!(color_for_slot(0), "#f43f5e");
        assert_eq!(color_for_slot(WORD_CLOUD_COLORS.len()), "#f43f5e");
        assert_eq!(color_for_slot(1), "#0891b2");
    }
}
