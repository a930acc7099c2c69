//! Text rendering of the clock state.
use crate::clock::TimerState;

const BAR_WIDTH: usize = 20;

/// `MM:SS`; minutes are not wrapped into hours.
pub fn format_time(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

pub fn start_stop_label(is_running: bool) -> &'static str {
    if is_running { "Pause" } else { "Start" }
}

pub fn format_minutes(minutes: u32) -> String {
    format!("{} minute{}", minutes, if minutes == 1 { "" } else { "s" })
}

pub fn progress_bar(elapsed: u32, total: u32) -> String {
    let ratio = if total == 0 {
        1.0
    } else {
        (elapsed as f64 / total as f64).clamp(0.0, 1.0)
    };
    let filled = (ratio * BAR_WIDTH as f64) as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled))
}

pub fn status_line(state: &TimerState) -> String {
    let total = state.phase_seconds();
    let elapsed = total.saturating_sub(state.time_left);
    format!(
        "⏱️  {:<7} {} [{}]  break {:>2}m  session {:>2}m  [{}]",
        state.mode.to_string(),
        format_time(state.time_left),
        progress_bar(elapsed, total),
        state.break_length,
        state.session_length,
        start_stop_label(state.is_running),
    )
}

pub const HELP: &str = "\
Commands (press Enter after each):
  <Enter>, t, toggle   start or pause
  start / pause, p     start / pause
  r, reset             back to 25/5, stopped
  b+ b- [N]            break length up/down (1-60)
  s+ s- [N]            session length up/down (1-60)
  h, help, ?           this help
  q, quit              exit";
