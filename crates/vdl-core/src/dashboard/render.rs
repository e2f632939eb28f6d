//! Text frames for the live view and the final summary.

use colored::Colorize;
use std::fmt::Write as _;

use crate::progress::{SlotView, TaskState};

const RULE: &str = "══════════════════════════════════════════════════════════════════════";
const THIN_RULE: &str = "──────────────────────────────────────────────────────────────────────";
const LIVE_NAME_WIDTH: usize = 30;
const SUMMARY_NAME_WIDTH: usize = 40;

/// Keep the tail of long names: `...` plus the last `max - 3` characters.
pub fn shorten(name: &str, max: usize) -> String {
    let count = name.chars().count();
    if count <= max {
        return name.to_string();
    }
    let keep = max.saturating_sub(3);
    let tail: String = name.chars().skip(count - keep).collect();
    format!("...{tail}")
}

fn status_label(state: TaskState, live: bool) -> String {
    let padded = |s: &str| format!("{s:<13}");
    match state {
        TaskState::Completed => padded("✓ COMPLETED").green().to_string(),
        TaskState::Failed => padded("✗ ERROR").red().to_string(),
        TaskState::Running if live => padded("↓ DOWNLOADING").yellow().to_string(),
        TaskState::Running => padded("? UNKNOWN").yellow().to_string(),
    }
}

fn header(out: &mut String, title: &str) {
    let _ = writeln!(out, "╔{RULE}╗");
    let _ = writeln!(out, "║{title:^70}║");
    let _ = writeln!(out, "╠{RULE}╣");
}

/// One block per task: status, position, name, percentage, sizes, speed, ETA.
pub fn render_live(views: &[SlotView]) -> String {
    let mut out = String::new();
    header(&mut out, "VIDEO DOWNLOAD PROGRESS");
    for v in views {
        let p = &v.progress;
        let _ = writeln!(
            out,
            "║ {} {:2}/{:2} {:<width$}",
            status_label(p.state, true),
            v.index,
            v.total,
            shorten(&p.filename, LIVE_NAME_WIDTH),
            width = LIVE_NAME_WIDTH
        );
        let _ = writeln!(
            out,
            "║    Progress: {:6.1}% | {}/{} | Speed: {:>10}",
            p.percentage, p.downloaded, p.size, p.speed
        );
        let _ = writeln!(out, "║    ETA: {:>8}", p.eta);
        if let Some(err) = &p.error {
            let _ = writeln!(out, "║    {}", err);
        }
        let _ = writeln!(out, "╠{THIN_RULE}╣");
    }
    let _ = writeln!(out, "║ Press Ctrl+C to stop");
    let _ = writeln!(out, "╚{RULE}╝");
    out
}

/// Counts of (completed, failed) across the views.
pub fn tally(views: &[SlotView]) -> (usize, usize) {
    views.iter().fold((0, 0), |(c, f), v| match v.progress.state {
        TaskState::Completed => (c + 1, f),
        TaskState::Failed => (c, f + 1),
        TaskState::Running => (c, f),
    })
}

/// Final view: totals, then each task with its size when completed.
pub fn render_summary(views: &[SlotView]) -> String {
    let mut out = String::new();
    header(&mut out, "DOWNLOAD SUMMARY");
    let (completed, failed) = tally(views);
    let _ = writeln!(
        out,
        "║ Completed: {:2} | Failed: {:2} | Total: {:2}",
        completed,
        failed,
        views.len()
    );
    let _ = writeln!(out, "╠{RULE}╣");
    for v in views {
        let p = &v.progress;
        let _ = writeln!(
            out,
            "║ {} {:2}/{:2} {:<width$}",
            status_label(p.state, false),
            v.index,
            v.total,
            shorten(&p.filename, SUMMARY_NAME_WIDTH),
            width = SUMMARY_NAME_WIDTH
        );
        if p.state == TaskState::Completed {
            let _ = writeln!(out, "║    Size: {}", p.size);
        }
        let _ = writeln!(out, "╠{THIN_RULE}╣");
    }
    let _ = writeln!(out, "╚{RULE}╝");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::ProgressSnapshot;

    fn view(index: usize, state: TaskState, filename: &str) -> SlotView {
        SlotView {
            index,
            total: 3,
            progress: ProgressSnapshot {
                state,
                filename: filename.to_string(),
                size: "10.00MiB".to_string(),
                ..ProgressSnapshot::default()
            },
        }
    }

    #[test]
    fn shorten_keeps_tail() {
        assert_eq!(shorten("short.mp4", 30), "short.mp4");
        let long = "a".repeat(20) + "_the_end_of_name.mp4";
        let s = shorten(&long, 30);
        assert_eq!(s.chars().count(), 30);
        assert!(s.starts_with("...") && s.ends_with("_the_end_of_name.mp4"));
    }

    #[test]
    fn shorten_is_char_safe() {
        let name = "видео_с_очень_длинным_названием_файла.mp4";
        let s = shorten(name, 30);
        assert_eq!(s.chars().count(), 30);
    }

    #[test]
    fn live_frame_shows_each_task() {
        let mut running = view(1, TaskState::Running, "a.mp4");
        running.progress.percentage = 45.2;
        running.progress.speed = "3.50MiB/s".into();
        running.progress.eta = "00:30".into();
        let mut failed = view(2, TaskState::Failed, "Unknown");
        failed.progress.error = Some("FAILED: https://e.x/2 - downloader returned code 1".into());
        let frame = render_live(&[running, failed, view(3, TaskState::Completed, "c.mp4")]);
        assert!(frame.contains("VIDEO DOWNLOAD PROGRESS"));
        assert!(frame.contains("↓ DOWNLOADING"));
        assert!(frame.contains("✗ ERROR"));
        assert!(frame.contains("✓ COMPLETED"));
        assert!(frame.contains(" 1/ 3 a.mp4"));
        assert!(frame.contains("  45.2%"));
        assert!(frame.contains("3.50MiB/s"));
        assert!(frame.contains("ETA:    00:30"));
        assert!(frame.contains("returned code 1"));
    }

    #[test]
    fn summary_counts_and_sizes() {
        let views = [
            view(1, TaskState::Completed, "a.mp4"),
            view(2, TaskState::Failed, "b.mp4"),
            view(3, TaskState::Completed, "c.mp4"),
        ];
        assert_eq!(tally(&views), (2, 1));
        let frame = render_summary(&views);
        assert!(frame.contains("Completed:  2 | Failed:  1 | Total:  3"));
        assert_eq!(frame.matches("Size: 10.00MiB").count(), 2);
        assert!(frame.contains("DOWNLOAD SUMMARY"));
    }

    #[test]
    fn summary_marks_unfinished_as_unknown() {
        let frame = render_summary(&[view(1, TaskState::Running, "a.mp4")]);
        assert!(frame.contains("? UNKNOWN"));
        assert!(!frame.contains("Size:"));
    }
}
