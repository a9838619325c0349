// Word-cloud layout: style mapping, box measurement and the greedy row packer.
// Layout passes are synchronous and run to completion; the layout endpoint and
// live clouds run them inside tokio::task::spawn_blocking.

pub mod font_metrics;
pub mod handlers;
pub mod packer;
pub mod style;
pub mod text_box;

// Re-export the public API consumed by other modules (cloud, handlers).
pub use font_metrics::FontFamily;
pub use packer::{
    BoxPool, Container, Gaps, LayoutOutcome, SkipReason, WordCloudPacker,
};
pub use text_box::{RenderedTerm, TextBoxPool, TypeScale};
