use crate::config::toml_config::RollcallConfig;
use crate::utils::error::Result;
use clap::{Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "rollcall")]
#[command(about = "Fair, history-aware random roll call")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Roster source (JSON/CSV file or http(s) URL)
    #[arg(long)]
    pub roster: Option<String>,

    /// Seating config source (JSON file or http(s) URL)
    #[arg(long)]
    pub seating: Option<String>,

    /// JSON file used to persist pick history
    #[arg(long)]
    pub history: Option<String>,

    /// Students picked per roll
    #[arg(long)]
    pub count: Option<usize>,

    /// Exclude already-picked students until everyone has been picked
    #[arg(long)]
    pub no_repeat: Option<bool>,

    /// Size of the recent-picks list
    #[arg(long)]
    pub recent_limit: Option<usize>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Run one or more roll-call requests
    Pick {
        #[arg(long, default_value = "1")]
        rounds: usize,
    },
    /// Show recent pick statistics for a student
    Stats { name: String },
    /// Locate a student in the seating grid
    Seat { name: String },
    /// Print the settings and external page URLs
    Links,
}

impl CliConfig {
    /// 讀取設定檔（若有）並套用命令列覆蓋
    pub fn resolve(&self) -> Result<RollcallConfig> {
        let mut config = match &self.config {
            Some(path) => RollcallConfig::from_file(path)?,
            None => RollcallConfig::default(),
        };

        if let Some(roster) = &self.roster {
            config.sources.roster = Some(roster.clone());
        }
        if let Some(seating) = &self.seating {
            config.sources.seating = Some(seating.clone());
        }
        if let Some(history) = &self.history {
            config.history.path = history.clone();
        }
        if let Some(count) = self.count {
            config.selection.pick_count = count;
        }
        if let Some(no_repeat) = self.no_repeat {
            config.selection.no_repeat = no_repeat;
        }
        if let Some(limit) = self.recent_limit {
            config.selection.recent_limit = limit;
        }

        Ok(config)
    }
}
