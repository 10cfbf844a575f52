use std::fmt::Write;
use tempora_core::config::AveragePolicy;
use tempora_eval::{AnalysisOutput, MisclassifiedSet, ModeAnalysis, TimedRates};

const NOT_AVAILABLE: &str = "n/a";
const COLUMNS: [&str; 6] = ["Time", "FAR (%)", "FRR (%)", "HTER (%)", "Real", "Attack"];

/// Labels describing where a run came from. Only used for presentation.
#[derive(Debug, Clone, Default)]
pub struct ReportContext {
    pub run_dir: String,
    pub score_dir: String,
    pub protocol: Option<String>,
    pub support: Option<String>,
}

pub fn report_title(analysis: &AnalysisOutput, ctx: &ReportContext) -> String {
    format!(
        "Time Analysis, Window *{}*, Overlap *{}*, Protocol *{}*, Support *{}*",
        analysis.window.window_size(),
        analysis.window.overlap(),
        ctx.protocol.as_deref().unwrap_or("unknown"),
        ctx.support.as_deref().unwrap_or("unknown"),
    )
}

/// reStructuredText report with one table per aggregation mode.
pub fn render_table_report(analysis: &AnalysisOutput, ctx: &ReportContext) -> String {
    let title = report_title(analysis, ctx);
    let bar = "=".repeat(title.chars().count() + 2);
    let mut out = String::new();
    let _ = writeln!(out, "{bar}\n {title} \n{bar}\n");
    let _ = writeln!(out, "Run directory\n  {}\n", ctx.run_dir);
    let _ = writeln!(out, "Score directory\n  {}\n", ctx.score_dir);

    let t = &analysis.threshold;
    push_heading(&mut out, "Development Threshold");
    let _ = writeln!(
        out,
        "- criterion: {}\n- threshold: {:.6}\n- FAR: {}\n- FRR: {}\n- HTER: {}\n- samples: {} real, {} attack\n",
        t.criterion,
        t.value,
        percent(Some(t.dev_far)),
        percent(Some(t.dev_frr)),
        percent(Some(t.dev_hter)),
        t.genuine_count,
        t.attack_count,
    );

    push_heading(&mut out, "Instantaneous Analysis");
    push_table(&mut out, &analysis.instantaneous.rates);

    let averaged_title = match analysis.averaging {
        AveragePolicy::Scores => "Thresholded Averaged Analysis",
        AveragePolicy::Votes => "Averaged Analysis",
    };
    out.push('\n');
    push_heading(&mut out, averaged_title);
    push_table(&mut out, &analysis.averaged.rates);
    out
}

/// Plain-text listing of misclassified samples per mode.
pub fn render_misclassified(analysis: &AnalysisOutput) -> String {
    let mut out = String::new();
    for (label, mode) in [
        ("instantaneous", &analysis.instantaneous),
        ("averaged", &analysis.averaged),
    ] {
        push_mode_listing(&mut out, label, mode);
    }
    out
}

fn push_mode_listing(out: &mut String, label: &str, mode: &ModeAnalysis) {
    let MisclassifiedSet {
        horizon,
        false_rejects,
        false_accepts,
    } = &mode.misclassified;
    let _ = writeln!(
        out,
        "# {label}: {} misclassified at window {horizon} (threshold {:.6})",
        mode.misclassified.len(),
        mode.decision_threshold
    );
    let _ = writeln!(out, "## real rejected as attack ({})", false_rejects.len());
    for id in false_rejects {
        let _ = writeln!(out, "{id}");
    }
    let _ = writeln!(out, "## attack accepted as real ({})", false_accepts.len());
    for id in false_accepts {
        let _ = writeln!(out, "{id}");
    }
    out.push('\n');
}

fn push_heading(out: &mut String, text: &str) {
    let _ = writeln!(out, "{text}\n{}\n", "-".repeat(text.chars().count()));
}

fn push_table(out: &mut String, rates: &[TimedRates]) {
    if rates.is_empty() {
        out.push_str("No windows available.\n");
        return;
    }
    let rows: Vec<[String; 6]> = rates
        .iter()
        .map(|r| {
            [
                r.elapsed.to_string(),
                percent(r.far),
                percent(r.frr),
                percent(r.hter),
                r.genuine.to_string(),
                r.attack.to_string(),
            ]
        })
        .collect();

    let mut widths = COLUMNS.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.len());
        }
    }

    let rule = widths
        .iter()
        .map(|w| "=".repeat(*w))
        .collect::<Vec<_>>()
        .join("  ");
    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "{}", join_row(&COLUMNS.map(String::from), &widths));
    let _ = writeln!(out, "{rule}");
    for row in &rows {
        let _ = writeln!(out, "{}", join_row(row, &widths));
    }
    let _ = writeln!(out, "{rule}");
}

fn join_row(cells: &[String; 6], widths: &[usize; 6]) -> String {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{cell:>width$}"))
        .collect::<Vec<_>>()
        .join("  ");
    line.trim_end().to_string()
}

fn percent(rate: Option<f64>) -> String {
    match rate {
        Some(value) => format!("{:.2}", value * 100.0),
        None => NOT_AVAILABLE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempora_core::config::AnalysisConfig;
    use tempora_eval::{run_analysis, AnalysisSettings, WindowConfig};
    use tempora_scores::{Bounds, Group, SampleClass, SampleRecord, ScoreSet};

    fn analysis(averaging: AveragePolicy) -> AnalysisOutput {
        let set = ScoreSet::from_records(
            vec![
                SampleRecord::new("dev-r", Group::Devel, SampleClass::Real, vec![0.9]),
                SampleRecord::new("dev-a", Group::Devel, SampleClass::Attack, vec![0.1]),
                SampleRecord::new("r-long", Group::Test, SampleClass::Real, vec![0.9, 0.2, 0.9]),
                SampleRecord::new("a-short", Group::Test, SampleClass::Attack, vec![0.8]),
            ],
            &Bounds::default(),
        )
        .unwrap();
        let config = AnalysisConfig {
            averaging,
            ..AnalysisConfig::default()
        };
        let settings = AnalysisSettings::new(WindowConfig::new(20, 10).unwrap(), &config);
        run_analysis(&set, settings).unwrap()
    }

    fn ctx() -> ReportContext {
        ReportContext {
            run_dir: "results/run1".to_string(),
            score_dir: "scores/run1".to_string(),
            protocol: Some("grandtest".to_string()),
            support: None,
        }
    }

    #[test]
    fn report_has_framed_title_and_both_tables() {
        let text = render_table_report(&analysis(AveragePolicy::Scores), &ctx());
        let mut lines = text.lines();
        let bar = lines.next().unwrap();
        let title = lines.next().unwrap();
        assert_eq!(bar.len(), title.len());
        assert!(title.contains("Window *20*, Overlap *10*, Protocol *grandtest*"));
        assert!(title.contains("Support *unknown*"));
        assert!(text.contains("Instantaneous Analysis\n----------------------"));
        assert!(text.contains("\nThresholded Averaged Analysis\n-----"));
    }

    #[test]
    fn missing_population_prints_not_available() {
        let text = render_table_report(&analysis(AveragePolicy::Scores), &ctx());
        let row = text
            .lines()
            .find(|line| line.trim_start().starts_with("40 "))
            .unwrap();
        assert!(row.contains("n/a"), "{row}");
        assert!(row.contains("0.00"), "{row}");
    }

    #[test]
    fn vote_policy_drops_the_thresholded_prefix() {
        let text = render_table_report(&analysis(AveragePolicy::Votes), &ctx());
        assert!(text.contains("\nAveraged Analysis\n-----"));
        assert!(!text.contains("Thresholded"));
    }

    #[test]
    fn misclassified_listing_names_samples() {
        let text = render_misclassified(&analysis(AveragePolicy::Scores));
        assert!(text.contains("# instantaneous: 1 misclassified at window 220"));
        assert!(text.contains("## attack accepted as real (1)\na-short\n"));
        assert!(text.contains("## real rejected as attack (0)"));
    }
}
