use std::io::{IsTerminal, Write};
use std::time::Duration;

use crossterm::{
    cursor, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{Clear, ClearType},
};

use crate::dispatch::DispatcherHandle;
use crate::metrics::Aggregate;

const BAR_WIDTH: u64 = 30;

/// Redraws a one-line progress bar on stderr until the run finishes. Does
/// nothing when stderr is not a terminal.
pub fn spawn_progress_reporter(
    handle: DispatcherHandle,
    interval: Duration,
    no_color: bool,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        if !std::io::stderr().is_terminal() {
            return;
        }

        let mut ticker = tokio::time::interval(interval);
        loop {
            tokio::select! {
                _ = handle.finished() => {
                    let snapshot = handle.snapshot();
                    if render_progress_line(&snapshot, no_color).is_ok() {
                        drop(finish_progress_line());
                    }
                    break;
                }
                _ = ticker.tick() => {
                    if render_progress_line(&handle.snapshot(), no_color).is_err() {
                        break;
                    }
                }
            }
        }
    })
}

fn render_progress_line(snapshot: &Aggregate, no_color: bool) -> Result<(), std::io::Error> {
    let mut out = std::io::stderr();
    queue!(out, cursor::MoveToColumn(0), Clear(ClearType::CurrentLine))?;
    for (text, color) in progress_segments(snapshot) {
        match color {
            Some(color) if !no_color => {
                queue!(out, SetForegroundColor(color), Print(text), ResetColor)?;
            }
            Some(_) | None => queue!(out, Print(text))?,
        }
    }
    out.flush()
}

fn finish_progress_line() -> Result<(), std::io::Error> {
    let mut out = std::io::stderr();
    out.write_all(b"\n")?;
    out.flush()
}

pub(super) fn progress_segments(snapshot: &Aggregate) -> Vec<(String, Option<Color>)> {
    let total = snapshot.total_requested.max(1);
    let done = snapshot.attempted.min(total);
    let filled = done
        .saturating_mul(BAR_WIDTH)
        .checked_div(total)
        .unwrap_or(0)
        .min(BAR_WIDTH);
    let percent_x100 = done
        .saturating_mul(10_000)
        .checked_div(total)
        .unwrap_or(0);

    let bar = format!(
        "[{}{}]",
        "#".repeat(usize::try_from(filled).unwrap_or(0)),
        "-".repeat(usize::try_from(BAR_WIDTH.saturating_sub(filled)).unwrap_or(0))
    );
    vec![
        (bar, None),
        (
            format!(" {}.{:02}%", percent_x100 / 100, percent_x100 % 100),
            Some(Color::Cyan),
        ),
        (
            format!(
                " | {}/{} requests",
                snapshot.attempted, snapshot.total_requested
            ),
            None,
        ),
        (format!(" | ok {}", snapshot.successful), Some(Color::Green)),
        (format!(" | failed {}", snapshot.failed), Some(Color::Red)),
    ]
}
