use std::collections::BTreeMap;

use clap::Parser;
use heuristic_chess::engine::{Engine, EngineConfig, Strategy};
use heuristic_chess::game::{GameState, PlayerMode};
use heuristic_chess::piece::Color;
use heuristic_chess::status::GameStatus;
use tracing_subscriber::EnvFilter;

/// Plays many engine-vs-engine games and tallies how they end.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value_t = 100)]
    games: u32,

    /// Games still running after this many plies count as unfinished.
    #[arg(short, long, default_value_t = 300)]
    max_plies: u32,

    /// Seed for the first game; each later game adds one.
    #[arg(long)]
    seed: Option<u64>,

    #[arg(long, default_value_t = 13)]
    material_threshold: u32,
}

#[derive(Default)]
struct Tally {
    results: BTreeMap<String, u32>,
    strategies: BTreeMap<Strategy, u32>,
    plies: u64,
}

fn play_game(engine: &mut Engine, max_plies: u32, tally: &mut Tally) -> GameStatus {
    let mut game = GameState::new(PlayerMode::Demo, Color::White);
    for _ in 0..max_plies {
        let Some(decision) = engine.compute_automated_move(&game) else {
            break;
        };
        if game.play(&decision.mv).is_err() {
            break;
        }
        *tally.strategies.entry(decision.strategy).or_default() += 1;
        tally.plies += 1;
    }
    game.status()
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();
    let args = Args::parse();

    println!("=== Heuristic engine self-play: {} games, max {} plies ===\n", args.games, args.max_plies);

    let mut tally = Tally::default();
    for i in 0..args.games {
        let config = EngineConfig {
            material_threshold: args.material_threshold,
            seed: args.seed.map(|s| s.wrapping_add(u64::from(i))),
            ..EngineConfig::default()
        };
        let mut engine = Engine::new(config);
        let status = play_game(&mut engine, args.max_plies, &mut tally);
        let label = match status {
            GameStatus::InProgress => "unfinished".to_string(),
            other => other.to_string(),
        };
        *tally.results.entry(label).or_default() += 1;
    }

    println!("--- Results ---\n");
    for (label, count) in &tally.results {
        println!("  {count:>5}  {label}");
    }

    let total: u32 = tally.strategies.values().sum();
    println!("\n--- Strategy usage ({total} moves, {:.1} plies/game) ---\n", tally.plies as f64 / f64::from(args.games.max(1)));
    for (strategy, count) in &tally.strategies {
        let share = 100.0 * f64::from(*count) / f64::from(total.max(1));
        println!("  {count:>7}  {share:>5.1}%  {strategy}");
    }
}
