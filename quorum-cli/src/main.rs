// SPDX-FileCopyrightText: © 2026 PrivKey LLC
// SPDX-License-Identifier: AGPL-3.0-or-later

#![deny(unsafe_code)]

mod cli;
mod commands;
mod config;
mod output;
mod store;

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use clap::Parser;
use tracing::debug;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

use quorum_core::error::Result;

use crate::cli::*;
use crate::config::{Config, LogLevel};
use crate::output::Output;

static REQUEST_COUNTER: AtomicU64 = AtomicU64::new(0);

fn next_request_id() -> String {
    let id = REQUEST_COUNTER.fetch_add(1, Ordering::SeqCst);
    format!("req-{id:08x}")
}

fn init_logging(level: LogLevel) {
    let use_json = std::env::var("QUORUM_LOG_JSON").is_ok();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string()));

    if use_json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_span_events(FmtSpan::CLOSE)
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .without_time()
            .with_span_events(FmtSpan::CLOSE)
            .init();
    }
}

fn main() {
    let out = Output::new();

    let cfg = match Config::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            out.error(&e.to_string());
            std::process::exit(1);
        }
    };
    init_logging(cfg.log_level);

    if let Err(e) = run(&out, &cfg) {
        out.error(&e.to_string());
        std::process::exit(1);
    }
}

#[tracing::instrument(skip(out, cfg), fields(request_id = %next_request_id()))]
fn run(out: &Output, cfg: &Config) -> Result<()> {
    let cli = Cli::parse();

    let path = match cli.path {
        Some(p) => p,
        None => cfg.data_dir()?,
    };

    debug!(path = %path.display(), "starting command");

    match cli.command {
        Commands::Init {
            threshold,
            shares,
            key_len,
        } => commands::master::cmd_init(out, &path, threshold, shares, key_len),
        Commands::GenerateOtp => commands::otp::cmd_generate_otp(out),
        Commands::Keygen { out: key_out } => commands::recipient::cmd_keygen(out, &key_out),
        Commands::GenerateRoot { output } => {
            commands::root::cmd_generate_root(out, &path, &output)
        }
        Commands::Decode { otp, encoded } => commands::otp::cmd_decode(out, &otp, &encoded),
        Commands::Decrypt { key, encoded } => {
            commands::recipient::cmd_decrypt(out, &key, &encoded)
        }
        Commands::Tokens => commands::tokens::cmd_tokens(out, &path),
        Commands::Revoke { accessor } => commands::tokens::cmd_revoke(out, &path, &accessor),
        Commands::Config { command } => dispatch_config(out, cfg, &path, command),
    }
}

fn dispatch_config(out: &Output, cfg: &Config, path: &Path, command: ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Show => {
            let config_path = Config::default_path()?;
            out.header("Configuration");
            out.field("Config file", &config_path.display().to_string());
            out.field("Exists", &config_path.exists().to_string());
            out.newline();
            out.field("data_dir", &path.display().to_string());
            out.field("log_level", &cfg.log_level.to_string());
            Ok(())
        }
        ConfigCommands::Path => {
            let config_path = Config::default_path()?;
            out.emit(&config_path.display().to_string());
            Ok(())
        }
    }
}
