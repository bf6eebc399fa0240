//! Binary entrypoint for the milsim-toolbox CLI.
//!
//! Commands:
//! - `init` - write a starter `toolbox.toml`
//! - `status` - print a JSON summary of the configuration and mailbox
//! - `console [--player <name>]` - type chat commands against an in-memory host
//!
//! See the library crate docs for module-level details: `milsim_toolbox::`.
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use tokio::io::{AsyncBufReadExt, BufReader};

use milsim_toolbox::config::Config;
use milsim_toolbox::host::local::LocalPlayer;
use milsim_toolbox::host::{Connections, LocalHost, Position, Rotation};
use milsim_toolbox::inventory::{Inventory, Item};
use milsim_toolbox::mailbox::Mailbox;
use milsim_toolbox::toolbox::Toolbox;

#[derive(Parser)]
#[command(name = "milsim-toolbox")]
#[command(about = "Chat commands for milsim game servers")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path (can be used before or after subcommand)
    #[arg(short, long, default_value = "toolbox.toml", global = true)]
    config: String,

    /// Verbose logging (-v, -vv for more; may appear before or after subcommand)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration file
    Init,
    /// Show configuration and mailbox summary
    Status,
    /// Read chat commands from stdin and run them against a local host
    Console {
        /// Nickname of the console player (defaults to server.console_player)
        #[arg(short, long)]
        player: Option<String>,
    },
}

const CONSOLE_ID: u32 = 1;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Init writes the config, every other command needs one
    let pre_config = match cli.command {
        Commands::Init => None,
        _ => Config::load(&cli.config).await.ok(),
    };
    init_logging(&pre_config, cli.verbose);

    match cli.command {
        Commands::Init => {
            info!("Initializing new toolbox configuration");
            Config::create_default(&cli.config).await?;
            info!("Configuration file created at {}", cli.config);
        }
        Commands::Status => {
            let config = match pre_config {
                Some(config) => config,
                None => Config::load(&cli.config).await?,
            };
            let mailbox = Mailbox::new(&config.mailbox.file, config.mailbox.cooldown());
            let mail_count = mailbox
                .read_log()
                .with_context(|| format!("reading {}", config.mailbox.file))?
                .len();
            let payload = serde_json::json!({
                "server": config.server.name,
                "maps": config.rotation.maps.iter().map(|m| &m.name).collect::<Vec<_>>(),
                "advance_delay_ms": config.rotation.advance_delay_ms,
                "mailbox": config.mailbox.file,
                "mail_delay_seconds": config.mailbox.delay,
                "mail_count": mail_count,
            });
            println!("{}", serde_json::to_string_pretty(&payload)?);
        }
        Commands::Console { player } => {
            let config = match pre_config {
                Some(config) => config,
                None => Config::load(&cli.config).await?,
            };
            run_console(&config, player).await?;
        }
    }

    Ok(())
}

/// Seed a local host with the console player, a starter backpack and a nearby crate.
fn console_host(config: &Config, player: Option<String>) -> LocalHost {
    let mut host = LocalHost::from_config(config);
    let name = player.unwrap_or_else(|| config.server.console_player.clone());
    let mut me = LocalPlayer::new(CONSOLE_ID, &name);
    me.info.admin = config.server.console_admin;
    me.backpack = Inventory::from(vec![
        Item::new("r1", "Rifle", "rifle"),
        Item::new("b1", "Bandage", "bandage"),
        Item::new("t1", "Tourniquet", "tourniquet"),
        Item::new("c1", "Compass", "compass"),
        Item::new("rd", "Field radio", "radio"),
    ]);
    host.add_player(me);
    host.add_container(
        Position::new(1.0, 0.5, 0.5),
        Inventory::from(vec![
            Item::new("s1", "Splint", "splint"),
            Item::new("g1", "Grenade", "grenade"),
            Item::new("g2", "Grenade", "grenade"),
            Item::new("gl", "Grenade launcher", "grenade launcher"),
            Item::new("rf", "Rangefinder", "rangefinder"),
        ]),
    );
    host
}

async fn run_console(config: &Config, player: Option<String>) -> Result<()> {
    let mut host = console_host(config, player);
    let mut toolbox = Toolbox::from_config(config);
    toolbox.on_connect(CONSOLE_ID);
    toolbox.on_position_update(&host, CONSOLE_ID);
    info!(
        "Console ready on {} ({} players, current map {})",
        config.server.name,
        Toolbox::player_count(&host),
        host.current_map().name
    );

    let mut seen = 0;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line == "quit" || line == "exit" {
            break;
        }
        if let Some(reply) = toolbox.handle_line(&mut host, CONSOLE_ID, line).await {
            println!("{}", reply);
        }
        let broadcasts = host.broadcasts();
        for message in broadcasts.iter().skip(seen) {
            println!("* {}", message);
        }
        seen = broadcasts.len();
    }

    toolbox.on_disconnect(CONSOLE_ID);
    info!(
        "Console closed ({} connections left)",
        host.connections().len().saturating_sub(1)
    );
    Ok(())
}

fn init_logging(config: &Option<Config>, verbosity: u8) {
    use std::io::Write;
    let mut builder = env_logger::Builder::new();
    // CLI verbosity wins over the configured level
    let base_level = match verbosity {
        0 => config
            .as_ref()
            .and_then(|c| c.logging.level.parse().ok())
            .unwrap_or(log::LevelFilter::Info),
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    builder.filter_level(base_level);
    let file = config.as_ref().and_then(|c| c.logging.file.clone());
    let security_path = config.as_ref().and_then(|c| c.logging.security_file.clone());
    match file.and_then(|f| {
        std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(f)
            .ok()
    }) {
        Some(f) => {
            let write_mutex = std::sync::Arc::new(std::sync::Mutex::new(f));
            // Console replies go to stdout; only echo log lines there when attached to a terminal
            let is_tty = atty::is(atty::Stream::Stderr);
            builder.format(move |fmt, record| {
                let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
                let line = format!("{} [{}] {}", ts, record.level(), record.args());
                if let Ok(mut guard) = write_mutex.lock() {
                    let _ = writeln!(guard, "{}", line);
                }
                if record.target() == "security" {
                    if let Some(ref sec_path) = security_path {
                        if let Ok(mut sf) = std::fs::OpenOptions::new()
                            .create(true)
                            .append(true)
                            .open(sec_path)
                        {
                            let _ = writeln!(sf, "{}", line);
                        }
                    }
                }
                if is_tty {
                    writeln!(fmt, "{}", line)
                } else {
                    Ok(())
                }
            });
        }
        None => {
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
    }
    let _ = builder.try_init();
}
