//! `arena` binary: run, check, and inspect the prop controller.

mod cli;
mod error_fmt;
mod run;

use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;
use eyre::WrapErr;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use cli::{Cli, Commands, FILE_GUARD};
use error_fmt::{humanize, to_json_line};

fn init_tracing(logging: &arena_config::Logging, override_level: Option<&str>, json: bool) {
    let level = override_level
        .or(logging.level.as_deref())
        .unwrap_or("info");
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));

    let console_pretty = (!json).then(|| fmt::layer().with_target(false));
    let console_json = json.then(|| fmt::layer().json().with_writer(std::io::stderr));

    let file_layer = logging.file.as_deref().map(|file| {
        let path = Path::new(file);
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let name = path
            .file_name()
            .map_or_else(|| "arena.log".into(), |n| n.to_string_lossy().into_owned());
        let appender = match logging.rotation.as_deref() {
            Some("daily") => tracing_appender::rolling::daily(dir, name),
            Some("hourly") => tracing_appender::rolling::hourly(dir, name),
            _ => tracing_appender::rolling::never(dir, name),
        };
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let _ = FILE_GUARD.set(guard);
        fmt::layer().json().with_writer(writer).with_ansi(false)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(console_pretty)
        .with(console_json)
        .with(file_layer)
        .init();
}

fn load_config(path: &Path, required: bool) -> eyre::Result<arena_config::Config> {
    if !path.exists() && !required {
        tracing::debug!(path = %path.display(), "config file absent, using defaults");
        return Ok(arena_config::Config::default());
    }
    let cfg = arena_config::load_file(path)?;
    cfg.validate()?;
    Ok(cfg)
}

fn real_main(args: Cli) -> eyre::Result<()> {
    match args.cmd {
        Commands::Run {
            target,
            seed,
            hit_at,
            runtime_ms,
            no_wait,
        } => {
            let cfg = load_config(&args.config, false)?;
            init_tracing(&cfg.logging, args.log_level.as_deref(), args.json);

            let shutdown = Arc::new(AtomicBool::new(false));
            let flag = shutdown.clone();
            ctrlc::set_handler(move || {
                flag.store(true, Ordering::Relaxed);
            })
            .wrap_err("installing signal handler")?;

            let opts = run::RunOpts {
                target,
                seed,
                hit_at,
                runtime_ms,
                no_wait,
            };
            let summary = run::run_match(&cfg, &opts, shutdown)?;
            run::print_summary(&summary, args.json);
            Ok(())
        }
        Commands::Check => {
            init_tracing(&arena_config::Logging::default(), args.log_level.as_deref(), args.json);
            let _cfg = load_config(&args.config, true)?;
            if args.json {
                println!(
                    "{}",
                    serde_json::json!({ "config": "ok", "path": args.config.display().to_string() })
                );
            } else {
                println!("config ok: {}", args.config.display());
            }
            Ok(())
        }
        Commands::Patterns => {
            for (idx, row) in arena_core::duel::FIGHTING_PATTERNS.iter().enumerate() {
                let secs: Vec<String> = row
                    .iter()
                    .take_while(|&&s| s != 0)
                    .map(ToString::to_string)
                    .collect();
                println!("{idx}: {}", secs.join(" "));
            }
            Ok(())
        }
    }
}

fn main() -> ExitCode {
    let _ = color_eyre::install();
    let args = Cli::parse();
    let json = args.json;
    match real_main(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if json {
                eprintln!("{}", to_json_line(&err));
            } else {
                eprintln!("error: {}", humanize(&err));
            }
            ExitCode::FAILURE
        }
    }
}
