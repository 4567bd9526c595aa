//! Text primitives
//!
//! Every type gets a fill glyph; a bar is drawn as a fixed-width strip where
//! each piece (cut included) takes a share proportional to its length and
//! the leftover is drawn with [`WASTE_GLYPH`].

use axlekit_core::{Catalog, MachineParameters, TypeIndex};
use axlekit_optimizer::{Segment, Segmentation};

/// Fill used for the leftover of a bar
pub const WASTE_GLYPH: char = '.';

const GLYPHS: [char; 8] = ['#', '=', '+', '*', 'o', 'x', '%', '@'];

/// Glyph assignment for the types of one catalog
#[derive(Debug, Clone)]
pub struct Legend {
    entries: Vec<(String, char)>,
}

impl Legend {
    pub fn new(catalog: &Catalog) -> Self {
        Self {
            entries: catalog
                .iter()
                .enumerate()
                .map(|(i, axle)| (axle.name.clone(), GLYPHS[i % GLYPHS.len()]))
                .collect(),
        }
    }

    /// Glyph of a type, waste glyph for unknown indices
    pub fn glyph(&self, index: TypeIndex) -> char {
        self.entries.get(index).map_or(WASTE_GLYPH, |e| e.1)
    }

    /// Name of a type, `?` for unknown indices
    pub fn name(&self, index: TypeIndex) -> &str {
        self.entries.get(index).map_or("?", |e| e.0.as_str())
    }

    /// One line per type plus the waste marker
    pub fn lines(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|(name, glyph)| format!("{}: {}", name, glyph.to_string().repeat(4)))
            .chain(std::iter::once(format!(
                "waste: {}",
                WASTE_GLYPH.to_string().repeat(4)
            )))
            .collect()
    }
}

/// Draw one bar `width` characters wide
pub fn render_bar(
    segment: &Segment,
    catalog: &Catalog,
    params: &MachineParameters,
    legend: &Legend,
    width: usize,
) -> String {
    let bar = u64::from(params.bar_length).max(1);
    let boundary = |used: u64| -> usize { ((used.min(bar) * width as u64 + bar / 2) / bar) as usize };

    let mut out = String::with_capacity(width);
    let mut used = 0u64;
    let mut drawn = 0usize;

    for &index in &segment.pieces {
        let length = catalog
            .get(index)
            .map_or(0, |axle| params.adjusted_length(axle.unit_length));
        used += length;
        let end = boundary(used);
        out.extend(std::iter::repeat_n(legend.glyph(index), end.saturating_sub(drawn)));
        drawn = drawn.max(end);
    }

    out.extend(std::iter::repeat_n(WASTE_GLYPH, width.saturating_sub(drawn)));
    out
}

/// Names of a sequence in brackets, e.g. `[AAB]`
pub fn bracket(sequence: &[TypeIndex], legend: &Legend) -> String {
    let names: String = sequence.iter().map(|&i| legend.name(i)).collect();
    format!("[{}]", names)
}

/// Run-length form, e.g. `[ 6xA 3xB A 3xB ]`
pub fn short_sequence(sequence: &[TypeIndex], legend: &Legend) -> String {
    let mut out = String::from("[");
    for run in sequence.chunk_by(|a, b| a == b) {
        let name = legend.name(run[0]);
        if run.len() == 1 {
            out.push_str(&format!(" {}", name));
        } else {
            out.push_str(&format!(" {}x{}", run.len(), name));
        }
    }
    out.push_str(" ]");
    out
}

/// One bracketed line per bar
pub fn sub_sequences(segmentation: &Segmentation, legend: &Legend) -> Vec<String> {
    segmentation
        .iter()
        .map(|segment| bracket(&segment.pieces, legend))
        .collect()
}
