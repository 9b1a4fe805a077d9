use std::error::Error;
use std::path::PathBuf;

use clap::Parser;
use heuristic_chess::engine::EngineConfig;
use heuristic_chess::game::PlayerMode;
use heuristic_chess::piece::Color;
use heuristic_chess::session::Session;
use tracing_subscriber::EnvFilter;

/// Plays one automated game and reports the result.
#[derive(Parser, Debug)]
#[command(author, version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("BUILD_TIMESTAMP"), ")"), about, long_about = None)]
struct Args {
    /// Start from this save file instead of the initial position.
    #[arg(short, long)]
    load: Option<PathBuf>,

    /// Write the final position to this save file.
    #[arg(short, long)]
    save: Option<PathBuf>,

    /// Engine configuration as JSON.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Overrides the configured seed.
    #[arg(long)]
    seed: Option<u64>,

    #[arg(short, long, default_value_t = 300)]
    max_plies: u32,

    /// Print the final game state as JSON.
    #[arg(long)]
    json: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let args = Args::parse();

    let mut config: EngineConfig = match &args.config {
        Some(path) => serde_json::from_str(&std::fs::read_to_string(path)?)?,
        None => EngineConfig::default(),
    };
    if args.seed.is_some() {
        config.seed = args.seed;
    }

    let mut session = match &args.load {
        Some(path) => Session::open(path, config)?,
        None => Session::new(config),
    };
    session.state_mut().set_player_mode(PlayerMode::Demo, Color::White);

    let mut plies = 0;
    while plies < args.max_plies {
        let side = session.state().side_to_move();
        let Some(decision) = session.automated_turn() else {
            break;
        };
        plies += 1;
        println!("{plies:>4}. {:<5} {:<6} ({})", side.to_string(), decision.mv.to_string(), decision.strategy);
    }

    let status = session.state().status();
    eprintln!("Stopped after {plies} plies: {status}");

    if let Some(path) = &args.save {
        session.save(path)?;
    }
    if args.json {
        println!("{}", serde_json::to_string_pretty(session.state())?);
    }
    Ok(())
}
