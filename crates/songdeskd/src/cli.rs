//! CLI argument definitions

use anyhow::{Context, Result};
use clap::Parser;
use songdesk_core::{ConfigFile, ServerConfig};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "songdeskd")]
#[command(version, about = "Song order intake server with daily spreadsheet logs")]
pub struct Cli {
    /// Config file (.toml, .yaml, .yml or .json); default: songdesk.* in the working directory
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Address to bind, e.g. 127.0.0.1:8000
    #[arg(long)]
    pub bind: Option<String>,

    /// Directory of the daily order spreadsheets
    #[arg(long)]
    pub log_dir: Option<PathBuf>,

    /// Filename prefix of the daily order spreadsheets
    #[arg(long)]
    pub file_prefix: Option<String>,

    /// Single allowed CORS origin (default: any)
    #[arg(long)]
    pub cors_origin: Option<String>,

    /// Serve a static frontend from this directory
    #[arg(long)]
    pub static_dir: Option<PathBuf>,

    /// Print the resolved configuration as JSON and exit
    #[arg(long)]
    pub print_config: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Defaults, then config file, then environment, then flags
    pub fn resolve_config(&self, cwd: &Path) -> Result<ServerConfig> {
        let mut config = ServerConfig::default();

        let path = match &self.config {
            Some(path) => Some(path.clone()),
            None => ConfigFile::find(cwd),
        };
        if let Some(path) = path {
            let file = ConfigFile::load(&path)
                .with_context(|| format!("Failed to load config {}", path.display()))?;
            config = config.merge_file(file);
        }

        let config = self.apply_flags(config.merge_process_env());
        config.validate()?;
        Ok(config)
    }

    /// Overlay the flags that were given
    pub fn apply_flags(&self, mut config: ServerConfig) -> ServerConfig {
        if let Some(bind) = &self.bind {
            config.bind = bind.clone();
        }
        if let Some(dir) = &self.log_dir {
            config.log_dir = dir.clone();
        }
        if let Some(prefix) = &self.file_prefix {
            config.file_prefix = prefix.clone();
        }
        if let Some(origin) = &self.cors_origin {
            config.cors_origin = Some(origin.clone());
        }
        if let Some(dir) = &self.static_dir {
            config.static_dir = Some(dir.clone());
        }
        config
    }

    /// Default tracing filter for the verbosity level
    pub fn log_filter(&self) -> String {
        let level = match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        };
        format!(
            "songdeskd={level},songdesk_web={level},songdesk_logs={level},songdesk_compose={level},tower_http={level}",
            level = level
        )
    }
}
