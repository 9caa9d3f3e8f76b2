//! Progress reporting for council runs

use colored::Colorize;
use council_application::CouncilEventSink;
use council_domain::CouncilEvent;
use council_domain::council::record::count_answered;
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

/// Pipeline stage a bar belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Stage {
    Collect,
    Rank,
    Synthesize,
}

impl Stage {
    fn display_name(&self) -> &'static str {
        match self {
            Stage::Collect => "Stage 1: Responses",
            Stage::Rank => "Stage 2: Rankings",
            Stage::Synthesize => "Stage 3: Synthesis",
        }
    }

    fn short_name(&self) -> &'static str {
        match self {
            Stage::Collect => "Stage 1",
            Stage::Rank => "Stage 2",
            Stage::Synthesize => "Stage 3",
        }
    }
}

/// Reports progress with one indicatif bar per stage
///
/// In quorum mode a stage's completion arrives after later stages started,
/// so every stage keeps its own bar until it completes.
pub struct ProgressReporter {
    multi: MultiProgress,
    bars: Mutex<HashMap<Stage, ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self::with_target(ProgressDrawTarget::stderr())
    }

    fn with_target(target: ProgressDrawTarget) -> Self {
        Self {
            multi: MultiProgress::with_draw_target(target),
            bars: Mutex::new(HashMap::new()),
        }
    }

    fn stage_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {prefix:.bold.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn start(&self, stage: Stage, total: Option<usize>) {
        let pb = match total {
            Some(total) => {
                let pb = self.multi.add(ProgressBar::new(total as u64));
                pb.set_style(Self::stage_style());
                pb
            }
            None => {
                let pb = self.multi.add(ProgressBar::new_spinner());
                pb.set_style(Self::spinner_style());
                pb.enable_steady_tick(Duration::from_millis(100));
                pb
            }
        };
        pb.set_prefix(stage.display_name());
        pb.set_message("Starting...");

        if let Ok(mut bars) = self.bars.lock()
            && let Some(previous) = bars.insert(stage, pb)
        {
            previous.finish_and_clear();
        }
    }

    fn tick(&self, stage: Stage, worker: &str, success: bool, completed: usize) {
        if let Ok(bars) = self.bars.lock()
            && let Some(pb) = bars.get(&stage)
        {
            let status = if success {
                format!("{} {}", "v".green(), worker)
            } else {
                format!("{} {}", "x".red(), worker)
            };
            pb.set_position(completed as u64);
            pb.set_message(status);
        }
    }

    fn note(&self, stage: Stage, message: String) {
        if let Ok(bars) = self.bars.lock()
            && let Some(pb) = bars.get(&stage)
        {
            pb.set_message(message);
        }
    }

    fn finish(&self, stage: Stage, message: String) {
        let pb = self.bars.lock().ok().and_then(|mut bars| bars.remove(&stage));
        if let Some(pb) = pb {
            if let Some(len) = pb.length() {
                pb.set_position(len);
            }
            pb.finish_with_message(message);
        }
    }

    fn println(&self, line: String) {
        let _ = self.multi.println(line);
    }

    #[cfg(test)]
    fn active(&self) -> Vec<Stage> {
        self.bars
            .lock()
            .map(|bars| bars.keys().copied().collect())
            .unwrap_or_default()
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl CouncilEventSink for ProgressReporter {
    fn emit(&self, event: &CouncilEvent) {
        match event {
            CouncilEvent::Stage1Start { total } => self.start(Stage::Collect, Some(*total)),
            CouncilEvent::Stage1ModelComplete {
                worker, completed, ..
            } => self.tick(Stage::Collect, worker.as_str(), true, *completed),
            CouncilEvent::Stage1ModelFailed {
                worker, completed, ..
            } => self.tick(Stage::Collect, worker.as_str(), false, *completed),
            CouncilEvent::Stage1Majority {
                completed, total, ..
            } => self.note(
                Stage::Collect,
                format!("majority reached ({}/{})", completed, total),
            ),
            CouncilEvent::Stage1Complete { results } => self.finish(
                Stage::Collect,
                format!(
                    "{} complete! ({}/{} answered)",
                    Stage::Collect.short_name().green(),
                    count_answered(results),
                    results.len()
                ),
            ),
            CouncilEvent::AllModelsFailed { .. } => {
                self.finish(Stage::Collect, "all models failed".red().to_string())
            }
            CouncilEvent::Stage2Start { total } => self.start(Stage::Rank, Some(*total)),
            CouncilEvent::Stage2ModelComplete {
                worker, completed, ..
            } => self.tick(Stage::Rank, worker.as_str(), true, *completed),
            CouncilEvent::Stage2ModelFailed {
                worker, completed, ..
            } => self.tick(Stage::Rank, worker.as_str(), false, *completed),
            CouncilEvent::Stage2Majority {
                completed, total, ..
            } => self.note(
                Stage::Rank,
                format!("majority reached ({}/{})", completed, total),
            ),
            CouncilEvent::Stage2Complete { results, .. } => self.finish(
                Stage::Rank,
                format!(
                    "{} complete! ({} ranking(s))",
                    Stage::Rank.short_name().green(),
                    results.len()
                ),
            ),
            CouncilEvent::Stage3Start => self.start(Stage::Synthesize, None),
            CouncilEvent::Stage3Complete { result } => self.finish(
                Stage::Synthesize,
                format!("{} complete! ({})", Stage::Synthesize.short_name().green(), result.worker),
            ),
            CouncilEvent::TitleComplete { title } => {
                self.println(format!("{} {}", "Title:".cyan().bold(), title))
            }
            CouncilEvent::TimingComplete {
                elapsed_running_time,
                total_cost,
                ..
            } => self.println(format!(
                "{} {:.2}s, ${:.4}",
                "Done in".dimmed(),
                elapsed_running_time,
                total_cost
            )),
            CouncilEvent::Complete => {}
            CouncilEvent::Error { message } => {
                self.println(format!("{} {}", "Error:".red().bold(), message))
            }
        }
    }
}

/// Simple text-based progress (no fancy UI)
pub struct SimpleProgress;

impl SimpleProgress {
    fn line(event: &CouncilEvent) -> Option<String> {
        let line = match event {
            CouncilEvent::Stage1Start { total } => format!(
                "{} {} ({} models)",
                "->".cyan(),
                Stage::Collect.display_name().bold(),
                total
            ),
            CouncilEvent::Stage2Start { total } => format!(
                "{} {} ({} judges)",
                "->".cyan(),
                Stage::Rank.display_name().bold(),
                total
            ),
            CouncilEvent::Stage3Start => {
                format!("{} {}", "->".cyan(), Stage::Synthesize.display_name().bold())
            }
            CouncilEvent::Stage1ModelComplete { worker, .. }
            | CouncilEvent::Stage2ModelComplete { worker, .. } => {
                format!("  {} {}", "v".green(), worker)
            }
            CouncilEvent::Stage1ModelFailed { worker, .. }
            | CouncilEvent::Stage2ModelFailed { worker, .. } => {
                format!("  {} {} (failed)", "x".red(), worker)
            }
            CouncilEvent::Stage1Majority {
                completed, total, ..
            }
            | CouncilEvent::Stage2Majority {
                completed, total, ..
            } => format!("  majority reached ({}/{})", completed, total),
            CouncilEvent::Stage1Complete { results } => format!(
                "  {}/{} answered",
                count_answered(results),
                results.len()
            ),
            CouncilEvent::AllModelsFailed { .. } => {
                format!("  {}", "all models failed".red())
            }
            CouncilEvent::Stage2Complete { results, .. } => {
                format!("  {} ranking(s)", results.len())
            }
            CouncilEvent::Stage3Complete { result } => format!("  {} {}", "v".green(), result.worker),
            CouncilEvent::TitleComplete { title } => format!("{} {}", "Title:".cyan(), title),
            CouncilEvent::TimingComplete {
                elapsed_running_time,
                total_cost,
                ..
            } => format!("Done in {:.2}s, ${:.4}", elapsed_running_time, total_cost),
            CouncilEvent::Error { message } => format!("{} {}", "Error:".red(), message),
            CouncilEvent::Complete => return None,
        };
        Some(line)
    }
}

impl CouncilEventSink for SimpleProgress {
    fn emit(&self, event: &CouncilEvent) {
        if let Some(line) = Self::line(event) {
            eprintln!("{}", line);
        }
    }
}
