//! Presentation-level configuration
//!
//! Resolves how a run is displayed from CLI flags and the `[output]`
//! section of the config file. CLI flags win.

use crate::cli::commands::Cli;
use council_domain::OutputFormat;

/// How progress is shown while a run is in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressMode {
    /// indicatif progress bars
    Bars,
    /// Plain text lines on stderr
    Lines,
    /// Nothing
    Hidden,
}

/// Output configuration for the presentation layer
#[derive(Debug, Clone, PartialEq)]
pub struct OutputConfig {
    pub format: OutputFormat,
    /// Enable colored terminal output
    pub color: bool,
    pub progress: ProgressMode,
    /// Stream events as JSON lines instead of formatting the outcome
    pub events: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            color: true,
            progress: ProgressMode::Bars,
            events: false,
        }
    }
}

impl OutputConfig {
    /// Merge CLI flags over file settings.
    ///
    /// `stderr_is_terminal` picks between bars and plain lines; the event
    /// stream and `--quiet` hide progress entirely.
    pub fn resolve(
        cli: &Cli,
        file_format: Option<OutputFormat>,
        file_color: bool,
        file_show_progress: bool,
        stderr_is_terminal: bool,
    ) -> Self {
        let progress = if cli.quiet || cli.events || !file_show_progress {
            ProgressMode::Hidden
        } else if stderr_is_terminal {
            ProgressMode::Bars
        } else {
            ProgressMode::Lines
        };

        Self {
            format: cli
                .output
                .map(OutputFormat::from)
                .or(file_format)
                .unwrap_or_default(),
            color: file_color,
            progress,
            events: cli.events,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn cli(args: &[&str]) -> Cli {
        let mut argv = vec!["llm-council"];
        argv.extend_from_slice(args);
        argv.push("question");
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_cli_format_overrides_file() {
        let config = OutputConfig::resolve(
            &cli(&["-o", "json"]),
            Some(OutputFormat::Full),
            true,
            true,
            true,
        );
        assert_eq!(config.format, OutputFormat::Json);
    }

    #[test]
    fn test_file_format_used_when_flag_absent() {
        let config = OutputConfig::resolve(&cli(&[]), Some(OutputFormat::Full), true, true, true);
        assert_eq!(config.format, OutputFormat::Full);

        let config = OutputConfig::resolve(&cli(&[]), None, true, true, true);
        assert_eq!(config.format, OutputFormat::Synthesis);
    }

    #[test]
    fn test_progress_style() {
        let bars = OutputConfig::resolve(&cli(&[]), None, true, true, true);
        assert_eq!(bars.progress, ProgressMode::Bars);

        let lines = OutputConfig::resolve(&cli(&[]), None, true, true, false);
        assert_eq!(lines.progress, ProgressMode::Lines);

        let quiet = OutputConfig::resolve(&cli(&["-q"]), None, true, true, true);
        assert_eq!(quiet.progress, ProgressMode::Hidden);

        let disabled = OutputConfig::resolve(&cli(&[]), None, true, false, true);
        assert_eq!(disabled.progress, ProgressMode::Hidden);
    }

    #[test]
    fn test_events_hide_progress() {
        let config = OutputConfig::resolve(&cli(&["--events"]), None, true, true, true);
        assert!(config.events);
        assert_eq!(config.progress, ProgressMode::Hidden);
    }
}
