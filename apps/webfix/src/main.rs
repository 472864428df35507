//! webfix CLI binary entry point.
//! Resolves configuration, delegates to the library and prints results.

use clap::Parser;
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};
use webfix::assistant::{Assistant, AssistantConfig, MockResponder, SYSTEM_CHECK_INTERVAL};
use webfix::autofix::{run_autofix, AutofixOptions};
use webfix::cli::{Cli, Commands, FixArgs};
use webfix::config::{self, Effective, Overrides};
use webfix::fix::Registry;
use webfix::monitor::{FileSource, MetricsSource, MockMetrics, Monitor, MonitorConfig};
use webfix::output;
use webfix::utils::{error_prefix, info_prefix, note_prefix, warn_prefix};

fn resolve_or_exit(overrides: &Overrides) -> Effective {
    match config::resolve_effective(overrides) {
        Ok(eff) => eff,
        Err(e) => {
            eprintln!("{} {}", error_prefix(), e);
            std::process::exit(2);
        }
    }
}

fn run_fix(args: FixArgs) {
    let eff = resolve_or_exit(&Overrides {
        start_dir: args.config_dir,
        root: args.root,
        log_dir: args.log_dir,
        report_json: args.report_json,
        report_html: args.report_html,
        output: args.output,
        check: args.check,
    });
    if !eff.config_found && eff.output != "json" {
        eprintln!("{} No webfix.toml found; using defaults.", note_prefix());
    }
    let outcome = match run_autofix(&AutofixOptions::from(&eff), &Registry::builtin()) {
        Ok(o) => o,
        Err(e) => {
            eprintln!("{} {}", error_prefix(), e);
            std::process::exit(2);
        }
    };
    output::print_fix(&outcome, &eff.output, eff.check);
    // In check mode, exit non-zero when any file would be rewritten
    if eff.check && outcome.any_changed() {
        std::process::exit(1);
    }
}

fn run_chat(
    messages: Vec<String>,
    no_delay: bool,
    greet: bool,
    output: Option<String>,
    config_dir: Option<String>,
) {
    let eff = resolve_or_exit(&Overrides {
        start_dir: config_dir,
        output,
        ..Default::default()
    });
    let mut assistant = Assistant::new(
        AssistantConfig {
            max_messages: eff.max_messages,
            seed: eff.assistant_seed,
        },
        Box::new(MockResponder::new(eff.assistant_seed)),
    );
    log::debug!("chat session {}", assistant.session_id());
    if greet && assistant.auto_greeting() {
        for m in assistant.history() {
            println!("{}", m.message);
        }
    }
    let mut last_check = Instant::now();
    if assistant.check_system_status(true) {
        print_last(&assistant);
    }
    for message in &messages {
        if last_check.elapsed() >= SYSTEM_CHECK_INTERVAL {
            last_check = Instant::now();
            if assistant.check_system_status(true) {
                print_last(&assistant);
            }
        }
        let Some(pending) = assistant.submit(message) else {
            continue;
        };
        if !no_delay {
            thread::sleep(pending.delay);
        }
        let reply = assistant.resolve(pending);
        output::print_reply(message.trim(), &reply, &eff.output);
    }
}

fn print_last(assistant: &Assistant) {
    if let Some(m) = assistant.history().last() {
        println!("{}", m.message);
    }
}

fn run_metrics(
    samples: usize,
    interval_secs: Option<u64>,
    source: Option<String>,
    export: Option<String>,
    output: Option<String>,
    config_dir: Option<String>,
) {
    let eff = resolve_or_exit(&Overrides {
        start_dir: config_dir,
        output,
        ..Default::default()
    });
    let mut monitor = Monitor::new(MonitorConfig {
        max_data_points: eff.max_data_points,
        theme: eff.theme.clone(),
        seed: eff.monitor_seed,
    });
    let mut source: Box<dyn MetricsSource> = match source {
        Some(p) => Box::new(FileSource::new(p)),
        None => Box::new(MockMetrics::new(eff.monitor_seed)),
    };
    let interval = Duration::from_secs(interval_secs.unwrap_or(eff.interval_secs));
    for i in 0..samples.max(1) {
        if i > 0 {
            thread::sleep(interval);
        }
        let polled = monitor.poll(source.as_mut());
        if polled.fallback && eff.output != "json" {
            eprintln!("{} metrics source unavailable; showing mock values.", warn_prefix());
        }
        output::print_metrics(&monitor, &eff.output);
    }
    if let Some(dir) = export {
        match monitor.write_report(Path::new(&dir)) {
            Ok(p) => eprintln!("{} metrics report saved to {}", info_prefix(), p.display()),
            Err(e) => {
                eprintln!("{} {}", error_prefix(), e);
                std::process::exit(1);
            }
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    match cli.cmd.unwrap_or(Commands::Fix(FixArgs::default())) {
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
        }
        Commands::Fix(args) => run_fix(args),
        Commands::Chat {
            messages,
            no_delay,
            greet,
            output,
            config_dir,
        } => run_chat(messages, no_delay, greet, output, config_dir),
        Commands::Metrics {
            samples,
            interval_secs,
            source,
            export,
            output,
            config_dir,
        } => run_metrics(samples, interval_secs, source, export, output, config_dir),
    }
}
