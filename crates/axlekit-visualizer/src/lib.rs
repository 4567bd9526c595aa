//! # AxleKit Visualizer
//!
//! Console rendering of cutting plans: proportional bar drawings, compact
//! sequence notation and the full planning report.

pub mod report;
pub mod text;

pub use report::{render_report, ReportFormatter};
pub use text::{bracket, render_bar, short_sequence, sub_sequences, Legend, WASTE_GLYPH};
