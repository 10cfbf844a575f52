use std::fmt::Write;
use tempora_eval::AnalysisOutput;

const MARGIN_LEFT: f64 = 64.0;
const MARGIN_RIGHT: f64 = 24.0;
const MARGIN_TOP: f64 = 48.0;
const MARGIN_BOTTOM: f64 = 56.0;
const PALETTE: [&str; 4] = ["#1f77b4", "#d62728", "#2ca02c", "#9467bd"];
const Y_TICKS: usize = 5;

#[derive(Debug, Clone)]
pub struct PlotSeries {
    pub label: String,
    /// `(elapsed, rate)`; a `None` rate breaks the line.
    pub points: Vec<(u64, Option<f64>)>,
}

/// Line chart of rates over elapsed observation time.
#[derive(Debug, Clone)]
pub struct PlotRequest {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub width: u32,
    pub height: u32,
    pub series: Vec<PlotSeries>,
}

impl PlotRequest {
    pub fn hter(analysis: &AnalysisOutput, title: &str, width: u32, height: u32) -> Self {
        Self {
            title: title.to_string(),
            x_label: "Time (frames)".to_string(),
            y_label: "HTER (%)".to_string(),
            width,
            height,
            series: vec![
                PlotSeries {
                    label: "instantaneous".to_string(),
                    points: analysis.instantaneous.hter_series(),
                },
                PlotSeries {
                    label: "averaged".to_string(),
                    points: analysis.averaged.hter_series(),
                },
            ],
        }
    }

    fn x_range(&self) -> (u64, u64) {
        let xs = self.series.iter().flat_map(|s| s.points.iter().map(|p| p.0));
        let (lo, hi) = xs.fold((u64::MAX, 0), |(lo, hi), x| (lo.min(x), hi.max(x)));
        if lo > hi {
            (0, 1)
        } else if lo == hi {
            (lo, lo + 1)
        } else {
            (lo, hi)
        }
    }
}

pub fn render_svg(request: &PlotRequest) -> String {
    let width = f64::from(request.width);
    let height = f64::from(request.height);
    let plot_w = width - MARGIN_LEFT - MARGIN_RIGHT;
    let plot_h = height - MARGIN_TOP - MARGIN_BOTTOM;
    let (x_lo, x_hi) = request.x_range();
    let x_of = |x: u64| MARGIN_LEFT + (x - x_lo) as f64 / (x_hi - x_lo) as f64 * plot_w;
    // rates are fractions, drawn on a 0..100 % axis
    let y_of = |rate: f64| MARGIN_TOP + (1.0 - rate.clamp(0.0, 1.0)) * plot_h;

    let mut out = String::new();
    let _ = writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}" font-family="sans-serif" font-size="12">"#,
        request.width, request.height, request.width, request.height
    );
    let _ = writeln!(out, r#"<rect width="100%" height="100%" fill="white"/>"#);
    let _ = writeln!(
        out,
        r#"<text x="{:.1}" y="24" text-anchor="middle" font-size="14">{}</text>"#,
        width / 2.0,
        escape(&request.title)
    );

    for tick in 0..=Y_TICKS {
        let rate = tick as f64 / Y_TICKS as f64;
        let y = y_of(rate);
        let _ = writeln!(
            out,
            r##"<line x1="{MARGIN_LEFT:.1}" y1="{y:.1}" x2="{:.1}" y2="{y:.1}" stroke="#dddddd"/>"##,
            MARGIN_LEFT + plot_w
        );
        let _ = writeln!(
            out,
            r#"<text x="{:.1}" y="{:.1}" text-anchor="end">{:.0}</text>"#,
            MARGIN_LEFT - 6.0,
            y + 4.0,
            rate * 100.0
        );
    }
    let _ = writeln!(
        out,
        r#"<text x="{:.1}" y="{:.1}" text-anchor="middle">{}</text>"#,
        MARGIN_LEFT + plot_w / 2.0,
        height - 16.0,
        escape(&request.x_label)
    );
    let _ = writeln!(
        out,
        r#"<text x="{:.1}" y="{:.1}" text-anchor="middle" transform="rotate(-90 16 {:.1})">{}</text>"#,
        16.0,
        MARGIN_TOP + plot_h / 2.0,
        MARGIN_TOP + plot_h / 2.0,
        escape(&request.y_label)
    );
    for (x, anchor) in [(x_lo, "start"), (x_hi, "end")] {
        let _ = writeln!(
            out,
            r#"<text x="{:.1}" y="{:.1}" text-anchor="{anchor}">{x}</text>"#,
            x_of(x),
            MARGIN_TOP + plot_h + 16.0
        );
    }

    for (idx, series) in request.series.iter().enumerate() {
        let color = PALETTE[idx % PALETTE.len()];
        for run in segments(&series.points) {
            let coords = run
                .iter()
                .map(|(x, rate)| format!("{:.1},{:.1}", x_of(*x), y_of(*rate)))
                .collect::<Vec<_>>()
                .join(" ");
            let _ = writeln!(
                out,
                r#"<polyline fill="none" stroke="{color}" stroke-width="1.5" points="{coords}"/>"#
            );
        }
        let legend_y = MARGIN_TOP + 14.0 + idx as f64 * 16.0;
        let legend_x = MARGIN_LEFT + plot_w - 120.0;
        let _ = writeln!(
            out,
            r#"<line x1="{legend_x:.1}" y1="{:.1}" x2="{:.1}" y2="{:.1}" stroke="{color}" stroke-width="2"/>"#,
            legend_y - 4.0,
            legend_x + 18.0,
            legend_y - 4.0
        );
        let _ = writeln!(
            out,
            r#"<text x="{:.1}" y="{legend_y:.1}">{}</text>"#,
            legend_x + 24.0,
            escape(&series.label)
        );
    }

    out.push_str("</svg>\n");
    out
}

/// Splits a series into runs of available points.
fn segments(points: &[(u64, Option<f64>)]) -> Vec<Vec<(u64, f64)>> {
    let mut runs = Vec::new();
    let mut current = Vec::new();
    for (x, rate) in points {
        match rate {
            Some(rate) => current.push((*x, *rate)),
            None if !current.is_empty() => runs.push(std::mem::take(&mut current)),
            None => {}
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
