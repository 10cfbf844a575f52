use std::fs;
use std::path::{Path, PathBuf};
use tempora_core::config::{AnalysisConfig, AveragePolicy, Config, DevReduction, ThresholdCriterion};
use tempora_core::json::canonical_json_bytes;
use tempora_core::{AppError, AppResult};
use tempora_eval::{run_analysis, AnalysisSettings, WindowConfig};
use tempora_report::{
    render_misclassified, render_svg, render_table_report, report_title, PlotRequest,
    ReportContext,
};
use tempora_scores::{infer_run_layout, Bounds, RunLayout, ScoreDir, MANIFEST_FILE};

pub struct AnalyzeArgs {
    pub run_dir: PathBuf,
    pub scores: Option<PathBuf>,
    pub protocol: Option<String>,
    pub support: Option<String>,
    pub window_size: Option<i64>,
    pub overlap: Option<i64>,
    pub min_hter: bool,
    pub average_votes: bool,
    pub dev_reduction: Option<String>,
    pub horizon: Option<usize>,
    pub overwrite: bool,
    pub stdout: bool,
}

struct OutputPaths {
    table: PathBuf,
    misclassified: PathBuf,
    plot: PathBuf,
    json: PathBuf,
}

impl OutputPaths {
    fn new(run_dir: &Path, horizon: usize) -> Self {
        Self {
            table: run_dir.join("time-analysis-table.rst"),
            misclassified: run_dir.join(format!("time-analysis-misclassified-at-{horizon}.txt")),
            plot: run_dir.join("time-analysis.svg"),
            json: run_dir.join("time-analysis.json"),
        }
    }

    fn all(&self) -> [&Path; 4] {
        [&self.table, &self.misclassified, &self.plot, &self.json]
    }
}

pub fn analyze_command(args: AnalyzeArgs, config: &Config) -> AppResult<()> {
    if let (Some(window_size), Some(overlap)) = (args.window_size, args.overlap) {
        WindowConfig::new(window_size, overlap)?;
    }
    if !args.run_dir.is_dir() {
        return Err(AppError::usage(format!(
            "run directory {} does not exist",
            args.run_dir.display()
        )));
    }
    let layout = infer_run_layout(&args.run_dir.to_string_lossy());
    if let Some(layout) = &layout {
        tracing::debug!(?layout, "run directory follows the results layout");
    }

    let score_dir = resolve_score_dir(&args, layout.as_ref())?;
    let store = ScoreDir::open(&score_dir, Bounds::default())?;
    let manifest = store.manifest();

    let window = resolve_window(&args, manifest.window(), layout.as_ref())?;
    let analysis = resolve_analysis_config(&args, &config.analysis)?;
    let settings = AnalysisSettings::new(window, &analysis);

    let outputs = OutputPaths::new(&args.run_dir, settings.horizon);
    for path in outputs.all() {
        if path.is_dir() {
            return Err(AppError::validation(format!(
                "output path {} is a directory",
                path.display()
            )));
        }
        if path.exists() && !args.overwrite {
            return Err(AppError::usage(format!(
                "{} already exists; use --overwrite to replace",
                path.display()
            )));
        }
    }

    let output = run_analysis(store.set(), settings)?;

    let ctx = ReportContext {
        run_dir: args.run_dir.display().to_string(),
        score_dir: score_dir.display().to_string(),
        protocol: args
            .protocol
            .clone()
            .or_else(|| manifest.protocol.clone())
            .or_else(|| layout.as_ref().map(|l| l.protocol.clone())),
        support: args
            .support
            .clone()
            .or_else(|| manifest.support.clone())
            .or_else(|| layout.as_ref().map(|l| l.support.clone())),
    };
    let table = render_table_report(&output, &ctx);
    let listing = render_misclassified(&output);
    let plot = render_svg(&PlotRequest::hter(
        &output,
        &report_title(&output, &ctx),
        config.plot.width,
        config.plot.height,
    ));
    let json = canonical_json_bytes(&output)?;

    write_output(&outputs.table, table.as_bytes())?;
    write_output(&outputs.misclassified, listing.as_bytes())?;
    write_output(&outputs.plot, plot.as_bytes())?;
    write_output(&outputs.json, &json)?;
    tracing::info!(
        run_dir = %args.run_dir.display(),
        determinism_hash = %output.determinism_hash,
        "time analysis written"
    );

    if args.stdout {
        print!("{table}");
    }
    Ok(())
}

fn resolve_score_dir(args: &AnalyzeArgs, layout: Option<&RunLayout>) -> AppResult<PathBuf> {
    if let Some(dir) = &args.scores {
        return Ok(dir.clone());
    }
    if args.run_dir.join(MANIFEST_FILE).is_file() {
        return Ok(args.run_dir.clone());
    }
    match layout {
        Some(layout) => {
            let dir = layout.default_score_dir();
            tracing::info!(score_dir = %dir.display(), "score directory inferred from run layout");
            Ok(dir)
        }
        None => Err(AppError::usage(format!(
            "cannot infer score directory from {}; pass --scores",
            args.run_dir.display()
        ))),
    }
}

fn resolve_window(
    args: &AnalyzeArgs,
    declared: Option<(u32, u32)>,
    layout: Option<&RunLayout>,
) -> AppResult<WindowConfig> {
    let window_size = args
        .window_size
        .or_else(|| declared.map(|(ws, _)| i64::from(ws)))
        .or_else(|| layout.map(|l| i64::from(l.window_size)))
        .ok_or_else(|| AppError::usage("window size unknown; pass --window-size"))?;
    let overlap = args
        .overlap
        .or_else(|| declared.map(|(_, ol)| i64::from(ol)))
        .or_else(|| layout.map(|l| i64::from(l.overlap)))
        .ok_or_else(|| AppError::usage("overlap unknown; pass --overlap"))?;
    if let Some((ws, ol)) = declared {
        if i64::from(ws) != window_size || i64::from(ol) != overlap {
            tracing::warn!(
                declared_window_size = ws,
                declared_overlap = ol,
                window_size,
                overlap,
                "window parameters differ from the score manifest"
            );
        }
    }
    WindowConfig::new(window_size, overlap)
}

fn resolve_analysis_config(args: &AnalyzeArgs, base: &AnalysisConfig) -> AppResult<AnalysisConfig> {
    let mut analysis = base.clone();
    if args.min_hter {
        analysis.criterion = ThresholdCriterion::MinHter;
    }
    if args.average_votes {
        analysis.averaging = AveragePolicy::Votes;
    }
    if let Some(value) = &args.dev_reduction {
        analysis.dev_reduction = parse_dev_reduction(value)?;
    }
    if let Some(horizon) = args.horizon {
        analysis.horizon = horizon;
    }
    Ok(analysis)
}

fn parse_dev_reduction(value: &str) -> AppResult<DevReduction> {
    match value {
        "mean" => Ok(DevReduction::Mean),
        "last" => Ok(DevReduction::Last),
        "windows" => Ok(DevReduction::Windows),
        _ => Err(AppError::usage(format!(
            "invalid --dev-reduction '{value}'; expected mean|last|windows"
        ))),
    }
}

fn write_output(path: &Path, bytes: &[u8]) -> AppResult<()> {
    fs::write(path, bytes)
        .map_err(|e| AppError::internal(format!("failed to write {}: {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(run_dir: &str) -> AnalyzeArgs {
        AnalyzeArgs {
            run_dir: PathBuf::from(run_dir),
            scores: None,
            protocol: None,
            support: None,
            window_size: None,
            overlap: None,
            min_hter: false,
            average_votes: false,
            dev_reduction: None,
            horizon: None,
            overwrite: false,
            stdout: false,
        }
    }

    #[test]
    fn cli_window_beats_manifest_and_layout() {
        let mut a = args("r/window_20/overlap_10/face/p/s/run");
        a.window_size = Some(8);
        let layout = infer_run_layout(&a.run_dir.to_string_lossy());
        let window = resolve_window(&a, Some((30, 5)), layout.as_ref()).unwrap();
        assert_eq!(window.window_size(), 8);
        assert_eq!(window.overlap(), 5);
    }

    #[test]
    fn layout_fills_missing_window() {
        let a = args("r/window_20/overlap_10/face/p/s/run");
        let layout = infer_run_layout(&a.run_dir.to_string_lossy());
        let window = resolve_window(&a, None, layout.as_ref()).unwrap();
        assert_eq!((window.window_size(), window.overlap()), (20, 10));
    }

    #[test]
    fn unknown_window_is_usage_error() {
        let err = resolve_window(&args("out/run"), None, None).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn flags_override_config() {
        let mut a = args("out/run");
        a.min_hter = true;
        a.average_votes = true;
        a.dev_reduction = Some("windows".to_string());
        a.horizon = Some(3);
        let analysis = resolve_analysis_config(&a, &AnalysisConfig::default()).unwrap();
        assert_eq!(analysis.criterion, ThresholdCriterion::MinHter);
        assert_eq!(analysis.averaging, AveragePolicy::Votes);
        assert_eq!(analysis.dev_reduction, DevReduction::Windows);
        assert_eq!(analysis.horizon, 3);

        a.dev_reduction = Some("median".to_string());
        assert!(resolve_analysis_config(&a, &AnalysisConfig::default()).is_err());
    }
}
