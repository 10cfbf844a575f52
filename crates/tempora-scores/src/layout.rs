use regex::Regex;
use std::path::PathBuf;

const RUN_DIR_PATTERN: &str = r"^(?P<prefix>.+)/window_(?P<ws>\d+)/overlap_(?P<ol>\d+)/(?P<roi>[^/]+)/(?P<protocol>[^/]+)/(?P<support>[^/]+)/(?P<run>.+)$";
const SCORES_ROOT: &str = "scores";

/// Run parameters encoded in a conventional results directory path:
/// `<prefix>/window_<N>/overlap_<M>/<roi>/<protocol>/<support>/<run>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunLayout {
    pub prefix: String,
    pub window_size: u32,
    pub overlap: u32,
    pub roi: String,
    pub protocol: String,
    pub support: String,
    pub run: String,
}

impl RunLayout {
    /// Score directory that conventionally sits next to the run: the prefix's first
    /// component is swapped for `scores` and the protocol, support and run are dropped.
    pub fn default_score_dir(&self) -> PathBuf {
        let mut path = PathBuf::from(SCORES_ROOT);
        for part in self.prefix.split('/').skip(1).filter(|p| !p.is_empty()) {
            path.push(part);
        }
        path.push(format!("window_{}", self.window_size));
        path.push(format!("overlap_{}", self.overlap));
        path.push(&self.roi);
        path
    }
}

/// Returns `None` when the path does not follow the layout.
pub fn infer_run_layout(run_dir: &str) -> Option<RunLayout> {
    let normalized = run_dir.replace('\\', "/");
    let normalized = normalized.trim_end_matches('/');
    let re = Regex::new(RUN_DIR_PATTERN).ok()?;
    let caps = re.captures(normalized)?;
    Some(RunLayout {
        prefix: caps["prefix"].to_string(),
        window_size: caps["ws"].parse().ok()?,
        overlap: caps["ol"].parse().ok()?,
        roi: caps["roi"].to_string(),
        protocol: caps["protocol"].to_string(),
        support: caps["support"].to_string(),
        run: caps["run"].to_string(),
    })
}
