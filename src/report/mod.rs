//! Human and machine renderings of a finished run, plus the live progress line.
mod json;
mod progress;
mod text;

#[cfg(test)]
mod tests;

pub use json::render_json;
pub use progress::spawn_progress_reporter;
pub use text::render_text;

/// Divisor for values stored as hundredths.
const PERCENT_DIVISOR: u64 = 100;
