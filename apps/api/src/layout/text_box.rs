//! Server-side term boxes measured with static font metrics.
//!
//! `TextBoxPool` plays the role of the rendering surface's element pool: one
//! box per term slot, reused across layout passes. Each box remembers the frame
//! it had before the latest pass so a client can animate from old to new.

use serde::{Deserialize, Serialize};

use crate::layout::font_metrics::{get_metrics, FontFamily, FontMetricTable};
use crate::layout::packer::{BoxPool, BoxSize, Position, TermBox};
use crate::layout::style::{color_for_slot, TermStyle};

/// Converts em-based styles into pixel geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TypeScale {
    pub font: FontFamily,
    /// Pixel size of 1em.
    pub base_font_px: f32,
    /// Line box height as a multiple of the font size.
    pub line_height: f32,
}

impl Default for TypeScale {
    fn default() -> Self {
        TypeScale {
            font: FontFamily::Inter,
            base_font_px: 16.0,
            line_height: 1.25,
        }
    }
}

/// The visual state of a box at one point in time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoxFrame {
    pub position: Option<Position>,
    pub font_size_em: f32,
    pub opacity: f32,
    pub visible: bool,
}

/// A positionable box for one term slot.
#[derive(Debug, Clone)]
pub struct TextBox {
    slot: usize,
    text: String,
    style: TermStyle,
    color: &'static str,
    metrics: &'static FontMetricTable,
    scale: TypeScale,
    position: Option<Position>,
    visible: bool,
    previous: Option<BoxFrame>,
}

impl TextBox {
    fn new(slot: usize, scale: TypeScale) -> Self {
        TextBox {
            slot,
            text: String::new(),
            style: TermStyle::minimum(),
            color: color_for_slot(slot),
            metrics: get_metrics(&scale.font),
            scale,
            position: None,
            visible: false,
            previous: None,
        }
    }

    pub fn position(&self) -> Option<Position> {
        self.position
    }

    pub fn frame(&self) -> BoxFrame {
        BoxFrame {
            position: self.position,
            font_size_em: self.style.font_size_em,
            opacity: self.style.opacity,
            visible: self.visible,
        }
    }

    pub fn rendered(&self) -> RenderedTerm {
        let size = self.measure();
        RenderedTerm {
            slot: self.slot,
            text: self.text.clone(),
            left: self.position.map(|p| p.left),
            top: self.position.map(|p| p.top),
            width: size.width,
            height: size.height,
            visible: self.visible,
            style: self.style,
            color: self.color,
            previous: self.previous,
        }
    }
}

impl TermBox for TextBox {
    fn apply_style(&mut self, text: &str, style: TermStyle) {
        self.previous = Some(self.frame());
        if self.text != text {
            self.text = text.to_string();
        }
        self.style = style;
    }

    fn measure(&self) -> BoxSize {
        let font_px = self.style.font_size_em * self.scale.base_font_px;
        let width_em = self
            .metrics
            .measure_spaced(&self.text, self.style.letter_spacing_em);
        BoxSize {
            width: width_em * font_px,
            height: font_px * self.scale.line_height,
        }
    }

    fn set_position(&mut self, position: Position) {
        self.position = Some(position);
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }
}

/// What a rendering surface needs to draw one term.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedTerm {
    pub slot: usize,
    pub text: String,
    /// `None` until the box has been placed at least once.
    pub left: Option<f32>,
    pub top: Option<f32>,
    pub width: f32,
    pub height: f32,
    pub visible: bool,
    pub style: TermStyle,
    pub color: &'static str,
    /// Frame before the latest layout pass, for transitions.
    pub previous: Option<BoxFrame>,
}

/// Slot-indexed pool of `TextBox`es. Boxes are created on first use and never
/// dropped, so a slot keeps its identity for the pool's lifetime.
#[derive(Debug, Clone)]
pub struct TextBoxPool {
    scale: TypeScale,
    boxes: Vec<TextBox>,
}

impl TextBoxPool {
    pub fn new(scale: TypeScale) -> Self {
        TextBoxPool {
            scale,
            boxes: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn get(&self, slot: usize) -> Option<&TextBox> {
        self.boxes.get(slot)
    }

    pub fn rendered(&self) -> Vec<RenderedTerm> {
        self.boxes.iter().map(TextBox::rendered).collect()
    }
}

impl BoxPool for TextBoxPool {
    type Box = TextBox;

    fn get_or_create(&mut self, slot: usize) -> &mut TextBox {
        while self.boxes.len() <= slot {
            let next = self.boxes.len();
            self.boxes.push(TextBox::new(next, self.scale));
        }
        &mut self.boxes[slot]
    }

    fn hide_from(&mut self, slot: usize) {
        for b in self.boxes.iter_mut().skip(slot) {
            b.visible = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::packer::{Container, Gaps, LayoutOutcome, WordCloudPacker};
    use crate::layout::style::style_for;
    use crate::models::stats::{Stats, Term};

    fn mono_scale() -> TypeScale {
        TypeScale {
            font: FontFamily::Monospace,
            base_font_px: 10.0,
            line_height: 1.5,
        }
    }

    #[test]
    fn test_measure_uses_style_font_size() {
        let mut pool = TextBoxPool::new(mono_scale());
        let b = pool.get_or_create(0);
        b.apply_style("abcd", style_for(10, 20));

        // 1.625em × 10px; 4 × (0.6 + 0.0) em
        let size = b.measure();
        assert!((size.width - 4.0 * 0.6 * 16.25).abs() < 1e-3);
        assert!((size.height - 16.25 * 1.5).abs() < 1e-3);
    }

    #[test]
    fn test_restyle_changes_geometry() {
        let mut pool = TextBoxPool::new(mono_scale());
        let b = pool.get_or_create(0);
        b.apply_style("poll", style_for(1, 10));
        let small = b.measure();
        b.apply_style("poll", style_for(10, 10));
        let big = b.measure();
        assert!(big.width > small.width);
        assert!(big.height > small.height);
    }

    #[test]
    fn test_get_or_create_fills_gaps_with_stable_slots() {
        let mut pool = TextBoxPool::new(TypeScale::default());
        pool.get_or_create(3);
        assert_eq!(pool.len(), 4);
        assert_eq!(pool.get(2).map(|b| b.rendered().slot), Some(2));
        assert_eq!(pool.get(1).map(|b| b.rendered().color), Some("#0891b2"));
    }

    #[test]
    fn test_previous_frame_tracks_last_pass() {
        let packer = WordCloudPacker::default();
        let container = Container::new(800.0, 400.0);
        let gaps = Gaps {
            horizontal: 24.0,
            vertical: 12.0,
        };
        let mut pool = TextBoxPool::new(TypeScale::default());

        let first = Stats::new(vec![Term::new("rust", 2), Term::new("go", 1)]);
        packer.layout(container, &first, gaps, &mut pool);
        let placed = pool.get(1).and_then(TextBox::position);
        assert!(placed.is_some());

        let second = Stats::new(vec![Term::new("rust", 2), Term::new("go", 4)]);
        packer.layout(container, &second, gaps, &mut pool);
        let go = pool.get(1).map(TextBox::rendered);
        let previous = go.as_ref().and_then(|t| t.previous);
        assert_eq!(previous.and_then(|f| f.position), placed);
        assert!(go.is_some_and(|t| t.style.font_size_em > previous.map_or(0.0, |f| f.font_size_em)));
    }

    #[test]
    fn test_rendered_pool_after_layout() {
        let mut pool = TextBoxPool::new(TypeScale::default());
        let stats = Stats::new(vec![Term::new("svoote", 20), Term::new("poll", 10)]);
        let outcome = WordCloudPacker::default().layout(
            Container::new(600.0, 300.0),
            &stats,
            Gaps {
                horizontal: 24.0,
                vertical: 12.0,
            },
            &mut pool,
        );
        assert!(matches!(outcome, LayoutOutcome::Completed(_)));

        let rendered = pool.rendered();
        assert_eq!(rendered.len(), 2);
        assert!(rendered.iter().all(|t| t.visible && t.left.is_some() && t.top.is_some()));
        assert_eq!(rendered[0].text, "svoote");
        assert!(rendered[0].height > rendered[1].height);
    }
}
