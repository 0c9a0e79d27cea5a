#[cfg(not(feature = "std"))]
fn main() {}

#[cfg(feature = "std")]
use battleship_lobby::{client::run_client, init_logging, run_server, GameConfig, ServerConfig};

#[cfg(feature = "std")]
use clap::{Parser, ValueEnum};
#[cfg(feature = "std")]
use log::LevelFilter;
#[cfg(feature = "std")]
use tokio::time::Duration;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[cfg(feature = "std")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
#[cfg(feature = "std")]
enum Fleet {
    /// 10x10 board, five ships.
    Classic,
    /// 3x3 board, one destroyer.
    Skirmish,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
#[cfg(feature = "std")]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[cfg(feature = "std")]
impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

#[derive(Parser)]
#[cfg(feature = "std")]
enum Commands {
    /// Run the lobby server: players queue up, two play while the rest spectate.
    Serve {
        #[arg(long, default_value = battleship_lobby::DEFAULT_BIND)]
        bind: String,
        #[arg(long, value_enum, default_value_t = Fleet::Classic)]
        fleet: Fleet,
        #[arg(long, help = "Override the board side length (1-26)")]
        board_size: Option<usize>,
        #[arg(long, default_value_t = 30, help = "Seconds a player has to fire")]
        turn_timeout: u64,
        #[arg(long, default_value_t = 60, help = "Seconds per placement answer")]
        placement_timeout: u64,
        #[arg(long, default_value_t = 15, help = "Seconds between next-match previews")]
        announce_interval: u64,
        #[arg(long, help = "Fix RNG seed for reproducible placement (e.g., --seed 12345)")]
        seed: Option<u64>,
        #[arg(long, default_value_t = battleship_lobby::DEFAULT_MAX_LINE_LEN, help = "Longest accepted input line in bytes")]
        max_line_len: usize,
        #[arg(long, value_enum, default_value_t = LogLevel::Info)]
        log_level: LogLevel,
    },
    /// Connect to a lobby server as a line client.
    Connect {
        #[arg(long, default_value = battleship_lobby::DEFAULT_BIND)]
        connect: String,
    },
}

#[cfg(feature = "std")]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            bind,
            fleet,
            board_size,
            turn_timeout,
            placement_timeout,
            announce_interval,
            seed,
            max_line_len,
            log_level,
        } => {
            init_logging(log_level.into());
            let preset = match fleet {
                Fleet::Classic => GameConfig::classic(),
                Fleet::Skirmish => GameConfig::skirmish(),
            };
            let game = GameConfig::new(board_size.unwrap_or(preset.board_size), preset.fleet)
                .map_err(|e| anyhow::anyhow!("invalid game configuration: {}", e))?;
            if let Some(s) = seed {
                println!("Using fixed seed: {} (placement will be reproducible)", s);
            }
            let config = ServerConfig {
                bind,
                game,
                turn_timeout: Duration::from_secs(turn_timeout),
                placement_timeout: Duration::from_secs(placement_timeout),
                announce_interval: Duration::from_secs(announce_interval),
                seed,
                max_line_len,
            };
            run_server(config).await?;
        }
        Commands::Connect { connect } => {
            init_logging(LevelFilter::Warn);
            println!("Connecting to {}...", connect);
            run_client(connect.as_str()).await?;
        }
    }
    Ok(())
}
