//! Word-Cloud Packer: greedy row packing of frequency-weighted terms.
//!
//! # Pass structure
//! 1. Style every term's box, then measure it (`style_and_measure`). Styling
//!    changes geometry, so all styles are applied before any measurement.
//! 2. Pack the measured terms into rows (`WordCloudPacker::pack`). Pure.
//! 3. Write positions and visibility back to the boxes.
//!
//! # Packing heuristic
//! Terms are placed by descending count. Each term goes into the least-filled
//! row that still has room, inserted alternately at the front and back of the
//! row so rows grow from their centre. Rows are finally stacked with the tallest
//! ones in the middle. This is a deliberate greedy heuristic, not optimal bin
//! packing: the visual result depends on its bias.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::layout::style::{style_for, TermStyle};
use crate::models::stats::Stats;

// ────────────────────────────────────────────────────────────────────────────
// Geometry
// ────────────────────────────────────────────────────────────────────────────

/// Pixel size of the container the cloud is drawn into.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Container {
    pub width: f32,
    pub height: f32,
}

impl Container {
    pub fn new(width: f32, height: f32) -> Self {
        Container { width, height }
    }

    /// True while the container has no measurable area (e.g. not yet attached).
    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }
}

/// Horizontal gap between terms in a row, vertical gap between rows (pixels).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Gaps {
    pub horizontal: f32,
    pub vertical: f32,
}

/// Top-left offset of a box inside the container (pixels).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub left: f32,
    pub top: f32,
}

/// Rendered size of a box after its style was applied (pixels).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoxSize {
    pub width: f32,
    pub height: f32,
}

// ────────────────────────────────────────────────────────────────────────────
// Caller-owned boxes
// ────────────────────────────────────────────────────────────────────────────

/// A positionable element that draws one term.
///
/// The packer never creates or destroys boxes; it styles them, reads their
/// measured size and writes position and visibility.
pub trait TermBox {
    fn apply_style(&mut self, text: &str, style: TermStyle);
    fn measure(&self) -> BoxSize;
    fn set_position(&mut self, position: Position);
    fn set_visible(&mut self, visible: bool);
}

/// Pool of boxes indexed by term slot, owned by the caller.
///
/// Reusing the same box for the same slot across passes keeps element
/// identity stable so only `top`/`left` change between updates.
pub trait BoxPool {
    type Box: TermBox;

    fn get_or_create(&mut self, slot: usize) -> &mut Self::Box;

    /// Hides every box whose slot is `>= slot`.
    fn hide_from(&mut self, slot: usize);
}

// ────────────────────────────────────────────────────────────────────────────
// Tuning
// ────────────────────────────────────────────────────────────────────────────

/// Density-guard thresholds.
///
/// Early in a pass the packer refuses to reuse rows, which spreads the
/// highest-frequency terms over several rows instead of crowding one. The
/// defaults were tuned for clouds of roughly 10–30 terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackerTuning {
    /// Rows must exist before any row may be reused.
    pub min_rows_for_reuse: usize,
    /// Below this many rows, the first `early_terms` terms always open a new row.
    pub settled_rows: usize,
    pub early_terms: usize,
}

impl Default for PackerTuning {
    fn default() -> Self {
        PackerTuning {
            min_rows_for_reuse: 2,
            settled_rows: 3,
            early_terms: 6,
        }
    }
}

impl PackerTuning {
    /// Whether the term at `term_index` (in placement order) may join an existing row.
    pub fn allows_reuse(&self, row_count: usize, term_index: usize) -> bool {
        if row_count < self.min_rows_for_reuse {
            return false;
        }
        !(row_count < self.settled_rows && term_index < self.early_terms)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Results
// ────────────────────────────────────────────────────────────────────────────

/// A term's box after it was styled and measured.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeasuredTerm {
    pub slot: usize,
    pub count: u64,
    pub size: BoxSize,
}

/// Where a term ended up.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Placement {
    Shown(Position),
    /// No row could take the term. The box keeps its last position.
    Hidden,
}

impl Placement {
    pub fn position(&self) -> Option<Position> {
        match self {
            Placement::Shown(p) => Some(*p),
            Placement::Hidden => None,
        }
    }

    pub fn is_shown(&self) -> bool {
        matches!(self, Placement::Shown(_))
    }
}

/// Result of one packing pass. `placements[i]` belongs to slot `i`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutReport {
    pub placements: Vec<Placement>,
    pub rows: usize,
    pub placed: usize,
    pub hidden: usize,
    /// Height of all rows stacked, gaps included.
    pub stacked_height: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    NoTerms,
    EmptyContainer,
}

/// Outcome of `WordCloudPacker::layout`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LayoutOutcome {
    /// Nothing was touched.
    Skipped { reason: SkipReason },
    Completed(LayoutReport),
}

impl LayoutOutcome {
    pub fn report(&self) -> Option<&LayoutReport> {
        match self {
            LayoutOutcome::Completed(report) => Some(report),
            LayoutOutcome::Skipped { .. } => None,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Rows
// ────────────────────────────────────────────────────────────────────────────

/// A horizontal band of terms. `terms` holds indices into the measured list.
#[derive(Debug)]
struct Row {
    terms: VecDeque<usize>,
    width: f32,
    height: f32,
}

impl Row {
    fn open(index: usize, size: BoxSize, gaps: Gaps) -> Self {
        Row {
            terms: VecDeque::from([index]),
            width: size.width,
            height: size.height + gaps.vertical,
        }
    }

    fn push(&mut self, index: usize, size: BoxSize, gaps: Gaps) {
        // Alternate sides so the row stays balanced around its centre.
        if self.terms.len() % 2 == 0 {
            self.terms.push_front(index);
        } else {
            self.terms.push_back(index);
        }
        self.width += gaps.horizontal + size.width;
        self.height = self.height.max(size.height + gaps.vertical);
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Packer
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WordCloudPacker {
    pub tuning: PackerTuning,
}

impl WordCloudPacker {
    pub fn new(tuning: PackerTuning) -> Self {
        WordCloudPacker { tuning }
    }

    /// Runs a full packing pass against the caller's boxes.
    ///
    /// A container without area or an empty term list is a no-op: no box is
    /// styled, measured or moved. The caller re-invokes once the container is
    /// visible.
    pub fn layout<P: BoxPool>(
        &self,
        container: Container,
        stats: &Stats,
        gaps: Gaps,
        pool: &mut P,
    ) -> LayoutOutcome {
        if container.is_empty() {
            debug!(
                width = container.width,
                height = container.height,
                "Word cloud layout skipped: container has no area"
            );
            return LayoutOutcome::Skipped {
                reason: SkipReason::EmptyContainer,
            };
        }
        if stats.is_empty() {
            return LayoutOutcome::Skipped {
                reason: SkipReason::NoTerms,
            };
        }

        let measured = style_and_measure(stats, pool);
        let report = self.pack(container, &measured, gaps);

        for (term, placement) in measured.iter().zip(&report.placements) {
            let term_box = pool.get_or_create(term.slot);
            match placement {
                Placement::Shown(position) => {
                    term_box.set_position(*position);
                    term_box.set_visible(true);
                }
                Placement::Hidden => term_box.set_visible(false),
            }
        }
        pool.hide_from(measured.len());

        debug!(
            terms = measured.len(),
            rows = report.rows,
            placed = report.placed,
            hidden = report.hidden,
            "Word cloud layout pass complete"
        );

        LayoutOutcome::Completed(report)
    }

    /// Packs already-measured terms. `measured[i]` must describe slot `i`.
    pub fn pack(&self, container: Container, measured: &[MeasuredTerm], gaps: Gaps) -> LayoutReport {
        // Highest count first; sort_by is stable so ties keep input order.
        let mut order: Vec<usize> = (0..measured.len()).collect();
        order.sort_by(|&a, &b| measured[b].count.cmp(&measured[a].count));

        let mut rows: Vec<Row> = Vec::new();
        let mut stacked_height = 0.0_f32;
        let mut placements = vec![Placement::Hidden; measured.len()];

        for (term_index, &index) in order.iter().enumerate() {
            let size = measured[index].size;
            let band = size.height + gaps.vertical;

            rows.sort_by(|a, b| a.width.total_cmp(&b.width));

            let reusable = if self.tuning.allows_reuse(rows.len(), term_index) {
                rows.iter_mut().find(|row| {
                    let grown = stacked_height - row.height + row.height.max(band);
                    row.width + size.width + gaps.horizontal <= container.width
                        && grown <= container.height
                })
            } else {
                None
            };

            match reusable {
                Some(row) => {
                    stacked_height += (band - row.height).max(0.0);
                    row.push(index, size, gaps);
                }
                None if stacked_height + band <= container.height => {
                    rows.push(Row::open(index, size, gaps));
                    stacked_height += band;
                }
                None => {}
            }
        }

        // Tallest rows end up in the middle: back, front, back, front, ...
        rows.sort_by(|a, b| b.height.total_cmp(&a.height));
        let row_count = rows.len();
        let mut sequence: VecDeque<Row> = VecDeque::with_capacity(row_count);
        for (i, row) in rows.into_iter().enumerate() {
            if i % 2 == 0 {
                sequence.push_back(row);
            } else {
                sequence.push_front(row);
            }
        }

        let total_height: f32 = sequence.iter().map(|row| row.height).sum();
        let mut top = (container.height - total_height) / 2.0;
        for row in &sequence {
            let mut left = container.width / 2.0 - row.width / 2.0;
            for &index in &row.terms {
                let size = measured[index].size;
                placements[index] = Placement::Shown(Position {
                    left,
                    top: top + (row.height - size.height) / 2.0,
                });
                left += size.width + gaps.horizontal;
            }
            top += row.height;
        }

        let placed = placements.iter().filter(|p| p.is_shown()).count();
        LayoutReport {
            hidden: placements.len() - placed,
            placed,
            rows: row_count,
            stacked_height: total_height,
            placements,
        }
    }
}

/// Styles every term's box, then measures all of them, in input order.
pub fn style_and_measure<P: BoxPool>(stats: &Stats, pool: &mut P) -> Vec<MeasuredTerm> {
    let max_count = stats.effective_max_count();

    for (slot, term) in stats.terms.iter().enumerate() {
        pool.get_or_create(slot)
            .apply_style(&term.text, style_for(term.count, max_count));
    }

    stats
        .terms
        .iter()
        .enumerate()
        .map(|(slot, term)| MeasuredTerm {
            slot,
            count: term.count,
            size: pool.get_or_create(slot).measure(),
        })
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
