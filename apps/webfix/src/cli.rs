//! CLI argument parsing via `clap`.

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "webfix",
    version,
    about = "Heuristic HTML/JS/CSS syntax fixer",
    long_about = "webfix walks a web UI tree, repairs common syntax slips in .html/.js/.css files in place, and writes JSON and HTML reports plus a run log.\n\nConfiguration precedence: CLI > webfix.toml > defaults.",
    after_help = "Examples:\n  webfix\n  webfix fix --root ui --check\n  webfix fix --output json --report-json out/report.json\n  webfix chat hello \"how do I open the console\"\n  webfix metrics --samples 5 --interval-secs 2 --export reports"
)]
/// Top-level CLI options and subcommands. No subcommand runs `fix`.
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Option<Commands>,
}

#[derive(Args, Debug, Default, Clone)]
pub struct FixArgs {
    #[arg(long, help = "Directory to scan (default: config root or current dir)")]
    pub root: Option<String>,
    #[arg(long, help = "Where to look for webfix.toml (default: current dir)")]
    pub config_dir: Option<String>,
    #[arg(long, help = "Directory for run logs (default: logs/webfix)")]
    pub log_dir: Option<String>,
    #[arg(long, help = "JSON report path (default: ui_syntax_report.json)")]
    pub report_json: Option<String>,
    #[arg(long, help = "HTML report path (default: ui_syntax_fixed.html)")]
    pub report_html: Option<String>,
    #[arg(long, help = "Output mode: human|json (default: human)")]
    pub output: Option<String>,
    #[arg(long, action = clap::ArgAction::SetTrue, help = "Exit non-zero if any file would change (implies no writes)")]
    pub check: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show version
    #[command(about = "Show version", long_about = "Print the current webfix version.")]
    Version,
    /// Fix syntax in place and write reports
    #[command(
        about = "Fix HTML/JS/CSS files",
        long_about = "Walk the root, apply per-extension heuristics, rewrite changed files, and save the JSON/HTML reports and the run log. With --check nothing under the root is rewritten.",
        after_help = "Examples:\n  webfix fix --root ui\n  webfix fix --check --output json"
    )]
    Fix(FixArgs),
    /// Talk to the dashboard assistant
    #[command(
        about = "Chat with the assistant",
        long_about = "Send each message in turn and print the replies. Replies are paced by the simulated delay unless --no-delay is set."
    )]
    Chat {
        #[arg(required = true, help = "Messages to send, in order")]
        messages: Vec<String>,
        #[arg(long, action = clap::ArgAction::SetTrue, help = "Do not wait the simulated reply delay")]
        no_delay: bool,
        #[arg(long, action = clap::ArgAction::SetTrue, help = "Show the greeting before the first message")]
        greet: bool,
        #[arg(long, help = "Output mode: human|json (default: human)")]
        output: Option<String>,
        #[arg(long, help = "Where to look for webfix.toml (default: current dir)")]
        config_dir: Option<String>,
    },
    /// Poll performance metrics
    #[command(
        about = "Poll performance metrics",
        long_about = "Poll a metrics source (a JSON file shaped like GET /api/metrics), falling back to mock values when it is unavailable, and print each sample with its status."
    )]
    Metrics {
        #[arg(long, default_value_t = 1, help = "Number of polls")]
        samples: usize,
        #[arg(long, help = "Seconds between polls (default: config or 10)")]
        interval_secs: Option<u64>,
        #[arg(long, help = "Metrics response JSON file (default: mock values)")]
        source: Option<String>,
        #[arg(long, help = "Directory to write the metrics report into")]
        export: Option<String>,
        #[arg(long, help = "Output mode: human|json (default: human)")]
        output: Option<String>,
        #[arg(long, help = "Where to look for webfix.toml (default: current dir)")]
        config_dir: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_means_fix() {
        let cli = Cli::try_parse_from(["webfix"]).unwrap();
        assert!(cli.cmd.is_none());
    }

    #[test]
    fn test_fix_flags() {
        let cli =
            Cli::try_parse_from(["webfix", "fix", "--root", "ui", "--check", "--output", "json"])
                .unwrap();
        match cli.cmd {
            Some(Commands::Fix(args)) => {
                assert_eq!(args.root.as_deref(), Some("ui"));
                assert!(args.check);
                assert_eq!(args.output.as_deref(), Some("json"));
            }
            _ => panic!("expected fix"),
        }
    }

    #[test]
    fn test_chat_requires_a_message() {
        assert!(Cli::try_parse_from(["webfix", "chat"]).is_err());
        let cli = Cli::try_parse_from(["webfix", "chat", "hi", "bye", "--no-delay"]).unwrap();
        match cli.cmd {
            Some(Commands::Chat {
                messages, no_delay, ..
            }) => {
                assert_eq!(messages, vec!["hi", "bye"]);
                assert!(no_delay);
            }
            _ => panic!("expected chat"),
        }
    }
}
