use std::time::{Duration, Instant};

use console::style;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use crate::models::{ProgressPhase, ProgressState};

/// Terminal rendering of progress snapshots: a per-target bar plus a status spinner.
pub struct GenerationProgress {
    multi: MultiProgress,
    targets_bar: Option<ProgressBar>,
    status_bar: ProgressBar,
    printed_outcomes: usize,
    start_time: Instant,
}

impl GenerationProgress {
    pub fn new() -> Self {
        let multi = MultiProgress::new();
        let status_bar = multi.add(ProgressBar::new_spinner());
        status_bar.set_style(
            ProgressStyle::default_spinner()
                .template("  {spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        status_bar.set_message("Preparing...");
        status_bar.enable_steady_tick(Duration::from_millis(120));

        Self {
            multi,
            targets_bar: None,
            status_bar,
            printed_outcomes: 0,
            start_time: Instant::now(),
        }
    }

    pub fn handle_snapshot(&mut self, state: &ProgressState) {
        if state.outcomes.len() < self.printed_outcomes {
            self.printed_outcomes = 0;
        }
        for outcome in &state.outcomes[self.printed_outcomes..] {
            let line = if outcome.success {
                format!("  {} {}", style("✓").green(), outcome.name)
            } else {
                format!(
                    "  {} {}: {}",
                    style("✗").red(),
                    outcome.name,
                    outcome.error.as_deref().unwrap_or("failed")
                )
            };
            let _ = self.multi.println(line);
        }
        self.printed_outcomes = state.outcomes.len();

        match state.phase {
            ProgressPhase::Idle => {}
            ProgressPhase::Validating => self.status_bar.set_message("Waiting for the server..."),
            ProgressPhase::SingleRequestInFlight => self.status_bar.set_message(format!(
                "Requesting report for {}",
                state.current_target_name.as_deref().unwrap_or("target")
            )),
            ProgressPhase::Streaming => {
                let bar = self.targets_bar(state.total_targets as u64);
                bar.set_position(state.processed() as u64);
                bar.set_message(current_label(state));
                self.status_bar.set_message(format!(
                    "{} | {} ok, {} failed",
                    format_elapsed(self.start_time.elapsed()),
                    state.success_count,
                    state.failed_count
                ));
            }
            ProgressPhase::Completed => {
                if let Some(bar) = self.targets_bar.take() {
                    bar.set_position(state.processed() as u64);
                    bar.finish_with_message("done");
                }
                self.status_bar.finish_with_message(format!(
                    "{} {} ({})",
                    style("Completed:").green().bold(),
                    state.message.as_deref().unwrap_or("Report generation finished"),
                    format_elapsed(self.start_time.elapsed())
                ));
            }
            ProgressPhase::Failed => {
                if let Some(bar) = self.targets_bar.take() {
                    bar.abandon_with_message("stopped");
                }
                self.status_bar.finish_with_message(format!(
                    "{} {}",
                    style("Failed:").red().bold(),
                    state.message.as_deref().unwrap_or("Report generation failed")
                ));
            }
        }
    }

    fn targets_bar(&mut self, total: u64) -> &ProgressBar {
        let multi = &self.multi;
        let status_bar = &self.status_bar;
        self.targets_bar.get_or_insert_with(|| {
            let bar = multi.insert_before(status_bar, ProgressBar::new(total));
            bar.set_style(
                ProgressStyle::default_bar()
                    .template("  {bar:30.cyan/dark_gray} {pos}/{len} reports | {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("█▓░"),
            );
            bar
        })
    }
}

impl Default for GenerationProgress {
    fn default() -> Self {
        Self::new()
    }
}

fn current_label(state: &ProgressState) -> String {
    match (&state.current_target_name, &state.current_step) {
        (Some(name), Some(step)) => format!("{}: {}", name, step),
        (Some(name), None) => name.clone(),
        (None, _) => String::new(),
    }
}

fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    if secs >= 60 {
        format!("{}m{}s", secs / 60, secs % 60)
    } else {
        format!("{}s", secs)
    }
}
