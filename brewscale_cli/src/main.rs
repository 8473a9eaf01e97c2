#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! `brewscale`: device wrapper around `brewscale_core`.

mod cli;
mod error_fmt;
mod session;
mod sink;

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use brewscale_config::Config;
use brewscale_core::ScaleError;
use clap::Parser;
use eyre::{Result, WrapErr};
use serde_json::json;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};

use crate::cli::{Cli, Commands, DEFAULT_CONFIG_PATH, JSON_MODE, json_mode};
use crate::error_fmt::{exit_code_for_error, format_error_json, humanize};

fn main() {
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);

    let mut log_guard = None;
    let result = real_main(cli, &mut log_guard);
    if let Err(e) = &result {
        tracing::error!(error = %format!("{e:#}"), "brewscale failed");
        if json_mode() {
            println!("{}", format_error_json(e));
        } else {
            eprintln!("{}", humanize(e));
        }
    }
    // flush the file appender before exiting
    drop(log_guard);
    if let Err(e) = result {
        std::process::exit(exit_code_for_error(&e));
    }
}

fn real_main(cli: Cli, log_guard: &mut Option<WorkerGuard>) -> Result<()> {
    color_eyre::install()?;
    let cfg = load_config(cli.config.as_deref())?;
    *log_guard = init_tracing(&cfg, cli.log_level.as_deref(), cli.json)?;

    match cli.cmd {
        Commands::Run { cycles } => {
            let shutdown = Arc::new(AtomicBool::new(false));
            {
                let flag = Arc::clone(&shutdown);
                ctrlc::set_handler(move || flag.store(true, Ordering::Relaxed))
                    .wrap_err("install Ctrl-C handler")?;
            }
            let stats = session::run_scale(&cfg, cycles, cli.json, &shutdown)?;
            if cli.json {
                println!(
                    "{}",
                    json!({
                        "result": "stopped",
                        "cycles": stats.cycles,
                        "frames": stats.frames,
                        "timeouts": stats.timeouts,
                        "tares": stats.tares,
                    })
                );
            } else {
                println!(
                    "Stopped after {} cycles ({} timeouts, {} tares).",
                    stats.cycles, stats.timeouts, stats.tares
                );
            }
        }
        Commands::SelfCheck => {
            let raw = session::self_check(&cfg)?;
            if cli.json {
                println!("{}", json!({ "result": "ok", "raw": raw }));
            } else {
                println!("self-check ok (raw {raw})");
            }
        }
        Commands::Tare { samples } => {
            let offset = session::tare_offset(&cfg, samples)?;
            if cli.json {
                println!("{}", json!({ "result": "ok", "offset": offset }));
            } else {
                println!("tare offset: {offset}");
            }
        }
    }
    Ok(())
}

/// Explicit path, then ./brewscale.toml, then built-in defaults.
fn load_config(path: Option<&Path>) -> Result<Config> {
    let default_path = Path::new(DEFAULT_CONFIG_PATH);
    let loaded = match path {
        Some(p) => brewscale_config::load_file(p),
        None if default_path.exists() => brewscale_config::load_file(default_path),
        None => Ok(Config::default()),
    };
    loaded.map_err(|e| eyre::Report::new(ScaleError::Config(format!("{e:#}"))))
}

/// Console logs go to stderr so stdout carries only frames and results.
/// Precedence for the filter: RUST_LOG, --log-level, logging.level, "info".
/// Returns the file appender's guard, if one was installed.
fn init_tracing(
    cfg: &Config,
    cli_level: Option<&str>,
    json: bool,
) -> Result<Option<WorkerGuard>> {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let level = cli_level
        .or(cfg.logging.level.as_deref())
        .unwrap_or("info");
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .wrap_err_with(|| format!("invalid log level {level:?}"))?;

    let console_json = json.then(|| fmt::layer().json().with_writer(std::io::stderr));
    let console_text = (!json).then(|| {
        fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
    });

    let mut guard = None;
    let file_layer = match cfg.logging.file.as_deref() {
        Some(path) => {
            let appender = file_appender(Path::new(path), cfg.logging.rotation.as_deref())?;
            let (writer, g) = tracing_appender::non_blocking(appender);
            guard = Some(g);
            Some(fmt::layer().json().with_ansi(false).with_writer(writer))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console_json)
        .with(console_text)
        .with(file_layer)
        .try_init()
        .wrap_err("install tracing subscriber")?;
    Ok(guard)
}

fn file_appender(path: &Path, rotation: Option<&str>) -> Result<RollingFileAppender> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let name = path
        .file_name()
        .ok_or_else(|| eyre::eyre!("logging.file {path:?} has no file name"))?
        .to_string_lossy()
        .into_owned();
    let rotation = match rotation {
        Some("daily") => Rotation::DAILY,
        Some("hourly") => Rotation::HOURLY,
        _ => Rotation::NEVER,
    };
    RollingFileAppender::builder()
        .rotation(rotation)
        .filename_prefix(name)
        .build(dir)
        .wrap_err_with(|| format!("open log file {path:?}"))
}
