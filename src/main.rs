//! Binary entrypoint for the lobbybot CLI.
//!
//! Commands:
//! - `start` - run the lobby bot
//! - `init` - create a starter `config.toml`
//! - `status` - print the effective configuration summary
//!
//! See the library crate docs for module-level details: `lobbybot::`.
use anyhow::Result;
use clap::{Parser, Subcommand};
use log::info;
use tokio::sync::mpsc;

use lobbybot::config::Config;
use lobbybot::lobby::LobbyServer;

#[derive(Parser)]
#[command(name = "lobbybot")]
#[command(about = "A game-listing bot for chat-based multiplayer lobbies")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path (can be used before or after subcommand)
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: String,

    /// Verbose logging (-v, -vv for more; may appear before or after subcommand)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the lobby bot
    Start {
        /// Override the lobby room from the config file
        #[arg(short, long)]
        room: Option<String>,
    },
    /// Initialize a new bot configuration
    Init,
    /// Show the effective configuration
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load config early to configure logging (except for Init which writes it)
    let pre_config = match cli.command {
        Commands::Init => None,
        _ => Config::load(&cli.config).await.ok(),
    };
    init_logging(&pre_config, cli.verbose);

    match cli.command {
        Commands::Start { room } => {
            let mut config = pre_config.unwrap_or(Config::load(&cli.config).await?);
            if let Some(room) = room {
                config.lobby.room = room;
            }
            info!("Starting lobbybot v{}", env!("CARGO_PKG_VERSION"));
            info!(
                "Joining room {} at {} as {}",
                config.lobby.room, config.lobby.domain, config.lobby.nickname
            );

            // Channel pairs handed to the messaging substrate; the bot core
            // only ever sees events and payloads, never the wire.
            let (_events_tx, events_rx) = mpsc::unbounded_channel();
            let (outbound_tx, mut outbound_rx) =
                mpsc::unbounded_channel::<lobbybot::lobby::wire::OutboundMessage>();

            // Drain outbound publications; a substrate backend replaces
            // this with actual delivery to the room.
            tokio::spawn(async move {
                while let Some(message) = outbound_rx.recv().await {
                    log::debug!(
                        "Game list ready for delivery ({} entries, to {})",
                        message.payload.games.len(),
                        message
                            .to
                            .as_ref()
                            .map_or("room".to_string(), |jid| jid.to_string())
                    );
                }
            });

            let mut server = LobbyServer::new(config, events_rx, outbound_tx);
            server.run().await?;
        }
        Commands::Init => {
            info!("Initializing new bot configuration");
            Config::create_default(&cli.config).await?;
            info!("Configuration file created at {}", cli.config);
        }
        Commands::Status => {
            let config = pre_config.unwrap_or(Config::load(&cli.config).await?);
            println!("lobbybot v{}", env!("CARGO_PKG_VERSION"));
            println!("  domain:   {}", config.lobby.domain);
            println!("  login:    {}", config.lobby.login);
            println!("  room:     {}", config.lobby.room);
            println!("  nickname: {}", config.lobby.nickname);
            println!(
                "  logging:  {} ({})",
                config.logging.level,
                config.logging.file.as_deref().unwrap_or("console")
            );
        }
    }

    Ok(())
}

fn init_logging(config: &Option<Config>, verbosity: u8) {
    use std::io::Write;
    let mut builder = env_logger::Builder::new();
    // Base level from CLI verbosity overrides config
    let base_level = match verbosity {
        0 => log::LevelFilter::Info,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    builder.filter_level(base_level);
    if let Some(cfg) = config {
        if let Some(ref file) = cfg.logging.file {
            if let Ok(f) = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(file)
            {
                let write_mutex = std::sync::Arc::new(std::sync::Mutex::new(f));

                // If stdout is a terminal, echo to console as well as the file
                let is_tty = atty::is(atty::Stream::Stdout);

                builder.format(move |fmt, record| {
                    let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
                    let line = format!("{} [{}] {}", ts, record.level(), record.args());

                    if let Ok(mut guard) = write_mutex.lock() {
                        let _ = writeln!(guard, "{}", line);
                    }

                    if is_tty {
                        writeln!(fmt, "{}", line)
                    } else {
                        Ok(())
                    }
                });
            } else {
                builder.format(|fmt, record| {
                    writeln!(
                        fmt,
                        "{} [{}] {}",
                        chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ"),
                        record.level(),
                        record.args()
                    )
                });
            }
        } else {
            builder.format(|fmt, record| {
                let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
                writeln!(fmt, "{} [{}] {}", ts, record.level(), record.args())
            });
        }
    } else {
        builder.format(|fmt, record| {
            writeln!(
                fmt,
                "{} [{}] {}",
                chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ"),
                record.level(),
                record.args()
            )
        });
    }
    let _ = builder.try_init();
}
