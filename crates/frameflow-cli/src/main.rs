//! `frameflow` – interactive shell over a streaming coordinate-frame tree.
//!
//! 1. Loads `~/.frameflow/config.toml` (defaults when absent) and applies
//!    `FRAMEFLOW_*` environment overrides.
//! 2. Builds one [`FrameGraph`][frameflow_graph::FrameGraph] owned by the
//!    shell.
//! 3. With a script argument, executes its lines and exits; otherwise drops
//!    into the interactive prompt.
//! 4. Intercepts **Ctrl-C** to stop the loop cleanly.

mod config;
mod repl;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use colored::Colorize;
use tracing::{info, warn};

fn main() -> ExitCode {
    // ── Structured logging ────────────────────────────────────────────────
    // RUST_LOG selects the filter (default "info"); FRAMEFLOW_LOG_FORMAT=json
    // switches to newline-delimited JSON.  Shell replies still go to stdout.
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level));

    if std::env::var("FRAMEFLOW_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .compact()
            .init();
    }

    // ── Configuration ─────────────────────────────────────────────────────
    let mut cfg = match config::load() {
        Ok(Some(cfg)) => {
            info!(path = %config::config_path().display(), "config loaded");
            cfg
        }
        Ok(None) => config::Config::default(),
        Err(e) => {
            warn!(error = %e, "config unreadable; using defaults");
            config::Config::default()
        }
    };
    config::apply_env_overrides(&mut cfg);

    // ── Ctrl-C handler ────────────────────────────────────────────────────
    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_clone = shutdown.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        shutdown_clone.store(true, Ordering::SeqCst);
    }) {
        warn!(error = %e, "Failed to install Ctrl-C handler; graceful shutdown on Ctrl-C will not be available");
    }

    let mut shell = repl::Shell::new(cfg);

    if let Some(script) = std::env::args_os().nth(1).map(PathBuf::from) {
        if let Err(e) = repl::run_script(&mut shell, &script, &shutdown) {
            eprintln!("{}: {}: {}", "Script error".red(), script.display(), e);
            return ExitCode::FAILURE;
        }
        return ExitCode::SUCCESS;
    }

    print_banner();
    repl::run(&mut shell, shutdown);
    ExitCode::SUCCESS
}

fn print_banner() {
    println!();
    println!(
        "  {} {}",
        "frameflow".bold().cyan(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
    println!("  Streaming coordinate-frame tree");
    println!("  Type {} for a list of commands.\n", "/help".bold().cyan());
}
