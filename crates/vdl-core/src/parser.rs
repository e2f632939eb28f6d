//! Extract progress fields from one line of downloader output.
//!
//! Every pattern is optional and independent; a line that matches nothing
//! yields an empty `LineUpdate`. Parsing never fails.

use regex::Regex;
use std::sync::LazyLock;

static PERCENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[download\]\s+([\d.]+)%").expect("valid regex"));
static SPEED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"at\s+([\d.]+\s*[KMGT]?iB/s)").expect("valid regex"));
static ETA_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"ETA\s+([\d:]+)").expect("valid regex"));
static SIZE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"of\s+~?\s*([\d.]+\s*[KMGT]?iB)").expect("valid regex"));
static DOWNLOADED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([\d.]+\s*[KMGT]?iB)\s+at").expect("valid regex"));
static DESTINATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Destination:\s+(.+)").expect("valid regex"));
static ALREADY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[download\]\s+(.+?)\s+has already been downloaded").expect("valid regex")
});
static MERGER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\[Merger\]\s+Merging formats into\s+"(.+)""#).expect("valid regex")
});
static COMPLETE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[download\]\s+100(?:\.0+)?%").expect("valid regex"));

/// Fields found on a single output line. `None` means "not present on this line".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineUpdate {
    pub percentage: Option<f64>,
    pub speed: Option<String>,
    pub eta: Option<String>,
    pub size: Option<String>,
    pub downloaded: Option<String>,
    pub filename: Option<String>,
    /// Explicit `[download] 100%` marker.
    pub completed: bool,
}

impl LineUpdate {
    /// True when the line carried nothing we track.
    pub fn is_empty(&self) -> bool {
        *self == LineUpdate::default()
    }
}

fn capture(re: &Regex, line: &str) -> Option<String> {
    re.captures(line)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
}

/// Parse one raw line. Trailing whitespace and carriage returns are ignored.
pub fn parse_line(line: &str) -> LineUpdate {
    let line = line.trim();
    let mut update = LineUpdate::default();
    if line.is_empty() {
        return update;
    }

    update.percentage = PERCENT_RE
        .captures(line)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .filter(|p| p.is_finite())
        .map(|p| p.clamp(0.0, 100.0));

    update.speed = capture(&SPEED_RE, line);
    update.eta = capture(&ETA_RE, line);

    let size_match = SIZE_RE.captures(line).and_then(|c| c.get(1));
    update.size = size_match.map(|m| m.as_str().trim().to_string());

    // "of 120.00MiB at ..." would otherwise report the total as the downloaded amount.
    update.downloaded = DOWNLOADED_RE
        .captures(line)
        .and_then(|c| c.get(1))
        .filter(|m| size_match.map_or(true, |s| s.start() != m.start()))
        .map(|m| m.as_str().trim().to_string());

    update.filename = capture(&DESTINATION_RE, line)
        .or_else(|| capture(&MERGER_RE, line))
        .or_else(|| capture(&ALREADY_RE, line));

    update.completed = COMPLETE_RE.is_match(line);
    update
}
