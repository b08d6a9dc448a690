use clap::Parser;
use rollcall_random::adapters::StdoutEventSink;
use rollcall_random::config::Command;
use rollcall_random::utils::{logger, validation::Validate};
use rollcall_random::{
    CliConfig, JsonFileStore, RollcallConfig, RollcallEngine, RosterSource, SeatingSource,
    SelectionEngine,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.log_json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting rollcall");
    tracing::debug!("CLI config: {:?}", cli);

    let config = match cli.resolve() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }

    run(&config, &cli.command).await
}

async fn run(config: &RollcallConfig, command: &Command) -> anyhow::Result<()> {
    let mut engine = RollcallEngine::init(
        RosterSource::from_config(config.sources.roster.as_deref()),
        SeatingSource::from_config(config.sources.seating.as_deref()),
        JsonFileStore::new(&config.history.path),
        StdoutEventSink,
        SelectionEngine::new(config.selection_state()),
        config.host_options()?,
    )
    .await;

    match command {
        Command::Pick { rounds } => {
            for round in 1..=*rounds {
                let outcome = engine.start_roll().await;
                if outcome.picks.is_empty() {
                    tracing::warn!("⚠️ Round {}: nobody to pick", round);
                }
            }
        }
        Command::Stats { name } => {
            let now = chrono::Utc::now().timestamp_millis();
            let stats = engine.stats_for(name.trim(), now);
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        Command::Links => {
            for url in [engine.settings_url(), engine.external_url()].into_iter().flatten() {
                println!("{}", url);
            }
        }
        Command::Seat { name } => {
            let context = engine.locate(name).await;
            println!("{}", serde_json::to_string_pretty(&context)?);
        }
    }

    Ok(())
}
