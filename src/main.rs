//! Binary entrypoint for the autobattler CLI.
//!
//! Commands:
//! - `init` - write a default `config.toml`
//! - `catalog [--path <file>]` - load and validate a catalog, print a summary
//! - `simulate [--seed <n>] [--turns <n>]` - run greedy agents through the shop phase
//!
//! See the library crate docs for module-level details: `autobattler::`.
use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use log::{info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

use autobattler::config::Config;
use autobattler::shop::{Agent, Catalog, GreedyAgent, LoggingResolver, Versus};

#[derive(Parser)]
#[command(name = "autobattler")]
#[command(about = "Shop phase simulator for a creature-collection auto battler")]
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
    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Load and validate a catalog file
    Catalog {
        /// Catalog JSON (defaults to the configured path)
        #[arg(short, long)]
        path: Option<String>,
    },
    /// Run greedy agents through the shop phase of a versus match
    Simulate {
        /// Random seed for reproducible runs
        #[arg(short, long)]
        seed: Option<u64>,
        /// Number of turns (defaults to the configured value)
        #[arg(short, long)]
        turns: Option<u32>,
        /// Rerolls each agent may spend per turn
        #[arg(long, default_value_t = 2)]
        rerolls: u32,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Commands::Init { force } = cli.command {
        init_logging(&None, cli.verbose);
        if !force && tokio::fs::try_exists(&cli.config).await.unwrap_or(false) {
            bail!("{} already exists (use --force to overwrite)", cli.config);
        }
        Config::create_default(&cli.config).await?;
        info!("Configuration file created at {}", cli.config);
        return Ok(());
    }

    let (config, load_error) = match Config::load(&cli.config).await {
        Ok(config) => (config, None),
        // Defaults are enough to run against the bundled catalog.
        Err(e) => (Config::default(), Some(e)),
    };
    init_logging(&Some(config.clone()), cli.verbose);
    if let Some(e) = load_error {
        warn!("{}; using defaults", e);
    }

    match cli.command {
        Commands::Init { .. } => {}
        Commands::Catalog { path } => {
            let path = path.unwrap_or_else(|| config.catalog.path.clone());
            let catalog = Catalog::load_from_json(&path)?;
            println!(
                "{}: {} creatures, {} items, {} configured turns",
                path,
                catalog.creatures().count(),
                catalog.items().count(),
                catalog.turn_count()
            );
            let obtainable = catalog
                .creatures()
                .filter(|t| t.tier.value().is_some())
                .count();
            println!("{} creatures obtainable in some shop", obtainable);
        }
        Commands::Simulate {
            seed,
            turns,
            rerolls,
        } => {
            let catalog = Catalog::load_from_json(&config.catalog.path)?;
            let mut versus_cfg = config.versus.clone();
            if let Some(turns) = turns {
                versus_cfg.turns = turns;
            }
            let rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };

            let mut agents: Vec<Box<dyn Agent>> = (0..versus_cfg.players)
                .map(|_| Box::new(GreedyAgent::new(rerolls)) as Box<dyn Agent>)
                .collect();
            let mut resolver = LoggingResolver::default();
            let mut game = Versus::new(catalog, config.shop.clone(), versus_cfg, rng);

            info!("Starting simulation v{}", env!("CARGO_PKG_VERSION"));
            let reports = game.play(&mut agents, &mut resolver)?;

            for report in &reports {
                for seat in &report.seats {
                    println!(
                        "turn {:>2} seat {}: {} applied, {} declined{}",
                        report.turn,
                        seat.seat,
                        seat.applied,
                        seat.declined,
                        if seat.forced_end { " (forced end)" } else { "" }
                    );
                }
            }
            for player in game.players() {
                println!("seat {} roster:", player.seat());
                for creature in player.roster() {
                    println!(
                        "  {} L{} ({} xp) {}/{}",
                        creature.template().name,
                        creature.level(),
                        creature.experience(),
                        creature.base_attack(),
                        creature.base_health()
                    );
                }
            }
            println!("{} trigger(s) resolved", resolver.resolved.len());
        }
    }

    Ok(())
}

fn init_logging(config: &Option<Config>, verbosity: u8) {
    use std::io::Write;
    let mut builder = env_logger::Builder::new();
    // CLI verbosity overrides the configured level
    let configured = config
        .as_ref()
        .and_then(|c| c.logging.level.parse::<log::LevelFilter>().ok())
        .unwrap_or(log::LevelFilter::Info);
    let base_level = match verbosity {
        0 => configured,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    builder.filter_level(base_level);

    let log_file = config
        .as_ref()
        .and_then(|c| c.logging.file.as_ref())
        .and_then(|file| {
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(file)
                .ok()
        });

    if let Some(f) = log_file {
        let write_mutex = std::sync::Arc::new(std::sync::Mutex::new(f));
        // Mirror to the console only when someone is watching
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
            let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
            writeln!(fmt, "{} [{}] {}", ts, record.level(), record.args())
        });
    }
    let _ = builder.try_init();
}
