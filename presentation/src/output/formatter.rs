//! Output formatter trait

use council_domain::{CouncilOutcome, OutputFormat};

/// Trait for formatting council outcomes
pub trait OutputFormatter {
    /// Format every stage of the outcome
    fn format(&self, outcome: &CouncilOutcome) -> String;

    /// Format as JSON
    fn format_json(&self, outcome: &CouncilOutcome) -> String;

    /// Format the chairman's answer only (concise output)
    fn format_synthesis_only(&self, outcome: &CouncilOutcome) -> String;

    /// Dispatch on the configured format.
    fn render(&self, outcome: &CouncilOutcome, format: OutputFormat) -> String {
        match format {
            OutputFormat::Full => self.format(outcome),
            OutputFormat::Synthesis => self.format_synthesis_only(outcome),
            OutputFormat::Json => self.format_json(outcome),
        }
    }
}
