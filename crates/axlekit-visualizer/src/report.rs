//! Planning report
//!
//! Renders a [`PlanningReport`] as console text: the legend, the bulk
//! patterns, the comparison with the type-by-type baseline and the
//! residual sequence.

use crate::text::{bracket, render_bar, short_sequence, sub_sequences, Legend};
use axlekit_core::Quantity;
use axlekit_optimizer::{PlanningReport, ResidualPlan, Segment};

fn percent(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 * 100.0 / whole as f64
    }
}

/// Text renderer for one planning report
pub struct ReportFormatter<'a> {
    report: &'a PlanningReport,
    legend: Legend,
    width: usize,
}

impl<'a> ReportFormatter<'a> {
    pub fn new(report: &'a PlanningReport, width: usize) -> Self {
        Self {
            legend: Legend::new(&report.catalog),
            report,
            width: width.max(10),
        }
    }

    fn rule(&self) -> String {
        "=".repeat(self.width)
    }

    fn bar(&self, segment: &Segment) -> String {
        render_bar(
            segment,
            &self.report.catalog,
            &self.report.params,
            &self.legend,
            self.width,
        )
    }

    /// Run id, seed and the glyph legend
    pub fn header(&self) -> String {
        let mut out = format!(
            "Planning run {} (seed {}, {} ms)\n",
            self.report.run_id, self.report.seed, self.report.elapsed_ms
        );
        for line in self.legend.lines() {
            out.push_str(&line);
            out.push('\n');
        }
        out
    }

    /// One block per committed pattern plus the bulk totals
    pub fn bulk(&self) -> String {
        let report = self.report;
        let bar_length = u64::from(report.params.bar_length);

        if report.allocation.entries.is_empty() {
            return "No bulk patterns, every piece goes to the sequence search.\n".to_string();
        }

        let mut out = String::from("Results of bulk allocation:\n");
        let mut left: Vec<Quantity> = report.catalog.demand().as_slice().to_vec();

        for entry in &report.allocation.entries {
            let used: Vec<String> = entry
                .total_used_per_type
                .iter()
                .zip(&left)
                .enumerate()
                .map(|(i, (used, left))| format!("{}[{}/{}]", self.legend.name(i), used, left))
                .collect();

            out.push_str(&format!(
                "\n{}\n",
                self.bar(&Segment::from_entry(entry, &report.params))
            ));
            out.push_str(&format!(
                "{} x {} => Total waste = {} mm\n",
                entry.repeat_count,
                bracket(&entry.sequence, &self.legend),
                entry.total_waste
            ));
            out.push_str(&format!(
                "Waste per bar: {} mm ({:.1}%)\n",
                entry.waste_per_bar,
                percent(entry.waste_per_bar, bar_length)
            ));
            out.push_str(&format!("Used: {}\n", used.join(", ")));

            for (slot, &count) in left.iter_mut().zip(&entry.total_used_per_type) {
                *slot = slot.saturating_sub(count);
            }
        }

        let waste = report.allocation.total_waste();
        let material = report.allocation.total_bars() * bar_length;
        out.push_str(&format!(
            "\nTotal waste: {}/{} mm ({:.1}%)\n",
            waste,
            material,
            percent(waste, material)
        ));
        out
    }

    /// Savings over cutting every type on its own bars
    pub fn baseline(&self) -> String {
        let c = &self.report.comparison;
        let bar_length = u64::from(self.report.params.bar_length);
        format!(
            "Plan reduced waste by {} mm compared with cutting each type on its own bars \
             ({} -> {} bars, {:.1}% of {}x{} mm)\n",
            c.waste_reduced,
            c.baseline_bars,
            c.plan_bars,
            c.reduction_percent(bar_length),
            c.baseline_bars,
            bar_length
        )
    }

    /// Best residual sequence, its bars and the restart summary
    pub fn residual(&self, residual: &ResidualPlan) -> String {
        let report = self.report;
        let bar_length = u64::from(report.params.bar_length);
        let search = &residual.search;

        let pieces: Vec<String> = residual
            .demand
            .as_slice()
            .iter()
            .zip(report.catalog.iter())
            .enumerate()
            .map(|(i, (left, axle))| format!("{}[{}/{}]", self.legend.name(i), left, axle.demand))
            .collect();
        let mut out = format!(
            "Sequence search for the remaining pieces: {}\n",
            pieces.join(", ")
        );

        for outcome in &search.restarts {
            out.push_str(&format!(
                "  restart #{}: cost {} -> {} mm, {} sweeps, {} swaps, {} runs, overlap {}, {} ms{}\n",
                outcome.restart,
                outcome.initial_cost,
                outcome.cost,
                outcome.sweeps,
                outcome.swaps,
                outcome.run_count,
                outcome.overlap,
                outcome.elapsed_ms,
                if outcome.converged { "" } else { " (sweep limit)" }
            ));
        }

        match search.best_restart {
            Some(restart) => out.push_str(&format!("\nBest sequence (restart #{}):\n", restart)),
            None => out.push_str("\nSequence:\n"),
        }
        out.push_str(&format!(
            "{}\n\n",
            short_sequence(&search.sequence, &self.legend)
        ));

        for (segment, line) in residual
            .segmentation
            .iter()
            .zip(sub_sequences(&residual.segmentation, &self.legend))
        {
            out.push_str(&format!(
                "{}\n{} => {} mm left, {} mm waste\n",
                self.bar(segment),
                line,
                segment.remainder,
                segment.waste
            ));
        }

        let product = report.catalog.product_length(&search.sequence);
        let waste = residual.segmentation.total_waste();
        out.push_str(&format!(
            "\nTotal cost: {} mm ({}x{} mm)\n",
            search.cost,
            residual.segmentation.len(),
            bar_length
        ));
        out.push_str(&format!(
            "Total waste: {} mm ({:.1}% of cost, {:.1}% of product length)\n",
            waste,
            percent(waste, search.cost),
            percent(waste, product)
        ));
        out.push_str(&format!(
            "Runs: {}, overlap score: {}\n",
            axlekit_optimizer::run_count(&search.sequence),
            search.overlap
        ));
        out
    }

    /// The whole report
    pub fn render(&self) -> String {
        let mut sections = vec![self.header(), self.bulk(), self.baseline()];
        if let Some(residual) = &self.report.residual {
            sections.push(self.residual(residual));
        }

        let rule = self.rule();
        let mut out = String::new();
        for section in sections {
            out.push_str(&rule);
            out.push('\n');
            out.push_str(section.trim_end());
            out.push('\n');
        }
        out.push_str(&rule);
        out
    }
}

/// Render a planning report `width` characters wide
pub fn render_report(report: &PlanningReport, width: usize) -> String {
    ReportFormatter::new(report, width).render()
}
