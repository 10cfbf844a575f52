pub mod plot;
pub mod report;

pub use plot::{render_svg, PlotRequest, PlotSeries};
pub use report::{render_misclassified, render_table_report, report_title, ReportContext};
