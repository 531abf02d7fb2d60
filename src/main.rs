use anyhow::Result;
use apple_eater::game::GameConfig;
use apple_eater::logging;
use apple_eater::modes::HumanMode;
use clap::Parser;
use std::path::PathBuf;
use tracing::Level;

#[derive(Parser)]
#[command(name = "apple_eater")]
#[command(version, about = "Snake in the terminal")]
struct Cli {
    /// YAML file with any subset of the game settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// Grid width (overrides the config file)
    #[arg(long)]
    width: Option<usize>,

    /// Grid height (overrides the config file)
    #[arg(long)]
    height: Option<usize>,

    /// Milliseconds between ticks
    #[arg(long)]
    tick_ms: Option<u64>,

    /// Seed for food placement, for reproducible games
    #[arg(long)]
    seed: Option<u64>,

    /// Append diagnostics to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Verbosity of the log file
    #[arg(long, default_value = "info")]
    log_level: Level,

    /// Print the effective settings as YAML and exit
    #[arg(long)]
    print_config: bool,
}

impl Cli {
    fn game_config(&self) -> Result<GameConfig> {
        let mut config = match &self.config {
            Some(path) => GameConfig::load(path)?,
            None => GameConfig::default(),
        };

        // A new grid size re-derives the start and food cells
        if self.width.is_some() || self.height.is_some() {
            config = GameConfig {
                initial_direction: config.initial_direction,
                tick_interval_ms: config.tick_interval_ms,
                food_reward: config.food_reward,
                ..GameConfig::new(
                    self.width.unwrap_or(config.grid_width),
                    self.height.unwrap_or(config.grid_height),
                )
            };
        }
        if let Some(tick_ms) = self.tick_ms {
            config.tick_interval_ms = tick_ms;
        }

        config.validate()?;
        Ok(config)
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.log_file.as_deref(), cli.log_level)?;

    let config = cli.game_config()?;
    if cli.print_config {
        print!("{}", config.to_yaml_string()?);
        return Ok(());
    }
    tracing::debug!(?config, seed = ?cli.seed, "starting");

    let mut human_mode = HumanMode::new(config, cli.seed);
    human_mode.run().await?;

    Ok(())
}
