//! `tipster`, the command-line client for the Tipster server.
//!
//! # Usage
//!
//! ```text
//! tipster --url http://localhost:8080 --user admin --password secret ingest tips.json
//! tipster plans
//! tipster plan-tips 3
//! tipster packages alice@example.com
//! tipster free --date 2025-01-01
//! ```

mod client;
mod render;

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use client::{ApiClient, ApiConfig};
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "tipster", about = "Command-line client for the Tipster server")]
struct Args {
  /// Path to a TOML config file (url, username, password).
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Base URL of the tipster server (default: http://localhost:8080).
  #[arg(long, env = "TIPSTER_URL")]
  url: Option<String>,

  /// Admin username.
  #[arg(long, env = "TIPSTER_USER")]
  user: Option<String>,

  /// Admin password (plaintext).
  #[arg(long, env = "TIPSTER_PASSWORD")]
  password: Option<String>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Upload a bucketed match/tip payload.
  Ingest {
    /// JSON file to upload; `-` reads stdin.
    file: PathBuf,
  },
  /// List subscription plans.
  Plans,
  /// Show the tips in a plan.
  PlanTips { plan_id: i64 },
  /// Show a user's packages.
  Packages { email: String },
  /// Show the free tips for a day.
  Free {
    /// Day as YYYY-MM-DD; the server defaults to today.
    #[arg(long)]
    date: Option<NaiveDate>,
  },
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  url:      String,
  #[serde(default)]
  username: String,
  #[serde(default)]
  password: String,
}

fn non_empty(s: &str) -> Option<String> { (!s.is_empty()).then(|| s.to_owned()) }

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .init();

  let args = Args::parse();

  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  // CLI flags override config file, which overrides defaults.
  let api_config = ApiConfig {
    base_url: args
      .url
      .or_else(|| non_empty(&file_cfg.url))
      .unwrap_or_else(|| "http://localhost:8080".to_string()),
    username: args.user.or_else(|| non_empty(&file_cfg.username)).unwrap_or_default(),
    password: args.password.or_else(|| non_empty(&file_cfg.password)).unwrap_or_default(),
  };

  let client = ApiClient::new(api_config)?;

  let output = match args.command {
    Command::Ingest { file } => {
      let body = if file.as_os_str() == "-" {
        let mut buf = Vec::new();
        std::io::Read::read_to_end(&mut std::io::stdin(), &mut buf).context("reading stdin")?;
        buf
      } else {
        std::fs::read(&file).with_context(|| format!("reading {}", file.display()))?
      };
      render::ingest(&client.ingest(body).await?)
    }
    Command::Plans => render::plans(&client.plans().await?),
    Command::PlanTips { plan_id } => render::tips(&client.plan_tips(plan_id).await?),
    Command::Packages { email } => render::packages(&client.packages(&email).await?),
    Command::Free { date } => render::tips(&client.free_tips(date).await?),
  };

  print!("{output}");
  Ok(())
}
