//! Console output formatter for council outcomes

use crate::output::formatter::OutputFormatter;
use colored::Colorize;
use council_domain::{Attempt, CouncilOutcome, JudgmentRecord, LabelMap, ResponseRecord};

/// Formats council outcomes for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format the complete outcome
    pub fn format(outcome: &CouncilOutcome) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("LLM Council Results"));
        output.push('\n');

        if let Some(title) = &outcome.title {
            output.push_str(&format!("{} {}\n", "Title:".cyan().bold(), title));
        }
        output.push_str(&format!(
            "{} {}\n",
            "Question:".cyan().bold(),
            outcome.question
        ));
        output.push_str(&format!(
            "{} {}{}\n",
            "Mode:".cyan().bold(),
            outcome.mode,
            Self::feature_suffix(outcome)
        ));

        output.push_str(&Self::section_header("Stage 1: Responses"));
        let labels = &outcome.metadata.label_to_model;
        for record in &outcome.stage1 {
            output.push_str(&Self::format_response(record, labels));
        }

        if outcome.is_failed() {
            output.push_str(&Self::section_header("Result"));
            output.push_str(&format!("\n{}\n", outcome.stage3.content.red()));
            output.push_str(&Self::footer(outcome));
            return output;
        }

        if !outcome.stage2.is_empty() {
            output.push_str(&Self::section_header("Stage 2: Peer Rankings"));
            for judgment in &outcome.stage2 {
                output.push_str(&Self::format_judgment(judgment, labels));
            }
        }

        if !outcome.metadata.aggregate_rankings.is_empty() {
            output.push_str(&Self::section_header("Aggregate Rankings"));
            output.push_str(&Self::format_aggregate(outcome));
        }

        output.push_str(&Self::section_header("Stage 3: Chairman Synthesis"));
        let chairman = format!("Chairman: {}", outcome.stage3.worker);
        let synthesis = if outcome.stage3.is_fallback() {
            outcome.stage3.content.red().to_string()
        } else {
            outcome.stage3.content.clone()
        };
        output.push_str(&format!(
            "\n{}{}\n\n{}\n",
            chairman.yellow().bold(),
            Self::spend(outcome.stage3.elapsed_time, outcome.stage3.cost),
            synthesis
        ));

        output.push_str(&Self::footer(outcome));
        output
    }

    /// Format as JSON
    pub fn format_json(outcome: &CouncilOutcome) -> String {
        serde_json::to_string_pretty(outcome).unwrap_or_else(|_| "{}".to_string())
    }

    /// Format synthesis only (concise output)
    pub fn format_synthesis_only(outcome: &CouncilOutcome) -> String {
        let mut output = String::new();

        let heading = match &outcome.title {
            Some(title) => format!("=== {} ===", title),
            None => "=== LLM Council Conclusion ===".to_string(),
        };
        output.push_str(&format!("{}\n\n", heading.cyan().bold()));
        output.push_str(&format!("{} {}\n\n", "Q:".bold(), outcome.question));

        let consulted: Vec<&str> = outcome
            .answered_responses()
            .map(|r| r.worker.as_str())
            .collect();
        if !consulted.is_empty() {
            output.push_str(&format!(
                "{} {}\n\n",
                "Models consulted:".dimmed(),
                consulted.join(", ")
            ));
        }

        output.push_str(&outcome.stage3.content);
        output.push('\n');

        output
    }

    fn format_response(record: &ResponseRecord, labels: &LabelMap) -> String {
        let label = labels
            .label_of(&record.worker)
            .map(|l| format!(" ({})", l))
            .unwrap_or_default();
        let heading = format!("── {}{} ──", record.worker, label);

        match record.attempt {
            Attempt::Placeholder => format!(
                "\n{}\n{}\n",
                heading.red().bold(),
                record.content.dimmed()
            ),
            Attempt::First | Attempt::Second => {
                let retried = if record.attempt == Attempt::Second {
                    format!(" {}", "[retried]".dimmed())
                } else {
                    String::new()
                };
                format!(
                    "\n{}{}{}\n{}\n",
                    heading.yellow().bold(),
                    retried,
                    Self::spend(record.elapsed_time, record.cost),
                    record.content
                )
            }
        }
    }

    fn format_judgment(judgment: &JudgmentRecord, labels: &LabelMap) -> String {
        let heading = format!("── {} ──", judgment.judge);
        let mut output = format!(
            "\n{}{}\n{}\n",
            heading.yellow().bold(),
            Self::spend(judgment.elapsed_time, judgment.cost),
            judgment.raw_text
        );

        if judgment.parsed_ranking.is_empty() {
            output.push_str(&format!("{}\n", "No ranking could be extracted.".dimmed()));
        } else {
            let ranking: Vec<String> = judgment
                .parsed_ranking
                .iter()
                .map(|label| match labels.resolve(label) {
                    Some(worker) => format!("{} ({})", label, worker),
                    None => format!("{} (unknown)", label),
                })
                .collect();
            output.push_str(&format!(
                "{} {}\n",
                "Parsed ranking:".cyan(),
                ranking.join(" > ")
            ));
        }
        output
    }

    fn format_aggregate(outcome: &CouncilOutcome) -> String {
        let width = outcome
            .metadata
            .aggregate_rankings
            .iter()
            .map(|e| e.worker.as_str().len())
            .max()
            .unwrap_or(5)
            .max(5);

        let mut output = format!(
            "\n{:>3}  {:<width$}  {:>8}  {:>5}  {:>8}  {:>8}\n",
            "#",
            "Model",
            "Avg rank",
            "Votes",
            "Time",
            "Cost",
            width = width
        );
        for (i, entry) in outcome.metadata.aggregate_rankings.iter().enumerate() {
            output.push_str(&format!(
                "{:>3}  {:<width$}  {:>8.2}  {:>5}  {:>7.2}s  {:>8}\n",
                i + 1,
                entry.worker.as_str(),
                entry.average_rank,
                entry.rankings_count,
                entry.total_elapsed_time,
                format!("${:.4}", entry.total_cost),
                width = width
            ));
        }
        output
    }

    fn feature_suffix(outcome: &CouncilOutcome) -> String {
        let mut features = Vec::new();
        if outcome.features.web_search {
            features.push("web search");
        }
        if outcome.features.coding_mode {
            features.push("coding");
        }
        if features.is_empty() {
            String::new()
        } else {
            format!(" ({})", features.join(", "))
        }
    }

    fn spend(elapsed: Option<f64>, cost: Option<f64>) -> String {
        match (elapsed, cost) {
            (Some(e), Some(c)) => format!(" {}", format!("{:.2}s, ${:.4}", e, c).dimmed()),
            (Some(e), None) => format!(" {}", format!("{:.2}s", e).dimmed()),
            (None, Some(c)) => format!(" {}", format!("${:.4}", c).dimmed()),
            (None, None) => String::new(),
        }
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer(outcome: &CouncilOutcome) -> String {
        format!(
            "\n{} {:.2}s   {} ${:.4}\n{}\n",
            "Elapsed:".dimmed(),
            outcome.elapsed_running_time,
            "Total cost:".dimmed(),
            outcome.total_cost,
            "=".repeat(60).cyan()
        )
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format(&self, outcome: &CouncilOutcome) -> String {
        Self::format(outcome)
    }

    fn format_json(&self, outcome: &CouncilOutcome) -> String {
        Self::format_json(outcome)
    }

    fn format_synthesis_only(&self, outcome: &CouncilOutcome) -> String {
        Self::format_synthesis_only(outcome)
    }
}
