// ═══════════════════════════════════════════════════════════════════════
// Runner — CLI entry point for running games and tournaments
// ═══════════════════════════════════════════════════════════════════════

use clap::{Parser, Subcommand};
use std::collections::HashMap;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;
use wonders_agents::{Agent, AgentKind};
use wonders_engine::catalog::Catalog;
use wonders_engine::config::GameConfig;
use wonders_tournament::{run_batch, run_game, Database, GameResult};

const MAX_DECISIONS: usize = 10_000;

#[derive(Parser)]
#[command(name = "wonders-runner", about = "Seven Wonders simulator")]
struct Cli {
    /// Raise log verbosity (-v info, -vv debug, -vvv trace). RUST_LOG wins if set.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single game and print the action log and scores
    Play {
        /// Seed; random if neither this nor the config file sets one
        #[arg(short, long)]
        seed: Option<u64>,
        #[arg(short, long)]
        players: Option<usize>,
        /// "random", "heuristic", "mixed", or a comma list per seat
        #[arg(short, long, default_value = "random")]
        agent: String,
        /// JSON file with GameConfig fields
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Print the full result as JSON instead of the log
        #[arg(long)]
        json: bool,
    },
    /// Run a tournament of N games in parallel and store the results
    Tournament {
        #[arg(short, long, default_value_t = 100)]
        games: u32,
        #[arg(short, long)]
        players: Option<usize>,
        #[arg(short, long, default_value_t = 42)]
        seed: u64,
        #[arg(short, long, default_value = "results.db")]
        db: String,
        /// "random", "heuristic", "mixed", or a comma list per seat
        #[arg(short, long, default_value = "mixed")]
        agent: String,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Show leaderboard from database
    Leaderboard {
        #[arg(short, long, default_value = "results.db")]
        db: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let outcome = match cli.command {
        Commands::Play { seed, players, agent, config, json } => {
            cmd_play(seed, players, &agent, config, json)
        }
        Commands::Tournament { games, players, seed, db, agent, config } => {
            cmd_tournament(games, players, seed, &db, &agent, config)
        }
        Commands::Leaderboard { db } => cmd_leaderboard(&db),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Config file first, then flags on top.
fn load_config(path: Option<PathBuf>, seed: Option<u64>, players: Option<usize>) -> Result<GameConfig, String> {
    let mut config = match &path {
        Some(p) => {
            let text = std::fs::read_to_string(p).map_err(|e| format!("{}: {}", p.display(), e))?;
            GameConfig::from_json(&text).map_err(|e| format!("{}: {}", p.display(), e))?
        }
        None => GameConfig::default(),
    };
    match seed {
        Some(seed) => config.seed = seed,
        None if path.is_none() => config.seed = rand::random(),
        None => {}
    }
    if let Some(players) = players {
        config.player_count = players;
    }
    Ok(config)
}

/// Expand an agent choice into one kind per seat.
fn lineup(choice: &str, players: usize) -> Result<Vec<AgentKind>, String> {
    match choice {
        "mixed" => Ok((0..players)
            .map(|i| if i % 2 == 0 { AgentKind::Heuristic } else { AgentKind::Random })
            .collect()),
        s if s.contains(',') => {
            let kinds = s.split(',').map(|k| k.trim().parse()).collect::<Result<Vec<AgentKind>, _>>()?;
            if kinds.len() != players {
                return Err(format!("{} agents listed for {} players", kinds.len(), players));
            }
            Ok(kinds)
        }
        s => Ok(vec![s.parse()?; players]),
    }
}

fn catalog() -> Result<Arc<Catalog>, String> {
    Catalog::standard().map(Arc::new).map_err(|e| e.to_string())
}

fn cmd_play(
    seed: Option<u64>,
    players: Option<usize>,
    agent_choice: &str,
    config_path: Option<PathBuf>,
    json: bool,
) -> Result<(), String> {
    let config = load_config(config_path, seed, players)?;
    let kinds = lineup(agent_choice, config.player_count)?;
    info!(seed = config.seed, players = config.player_count, "starting game");

    let mut agents: Vec<Box<dyn Agent>> = kinds
        .iter()
        .enumerate()
        .map(|(seat, kind)| kind.build(config.seed.wrapping_add(seat as u64)))
        .collect();
    let result = run_game(&mut agents, &config, catalog()?, MAX_DECISIONS).map_err(|e| e.to_string())?;

    if json {
        println!("{}", result.to_json().map_err(|e| e.to_string())?);
    } else {
        print_log(&result);
        print_scores(&result);
    }
    Ok(())
}

fn print_log(result: &GameResult) {
    println!("=== Seven Wonders: seed {} ===\n", result.seed);
    let mut last_age = 0;
    for entry in &result.log {
        if entry.age != last_age {
            println!("--- Age {} ---", entry.age);
            last_age = entry.age;
        }
        let player = &result.players[entry.seat];
        println!(
            "  r{} {:<10} {:<32} {}",
            entry.round,
            player.name,
            entry.event.to_string(),
            entry.resources
        );
    }
    println!();
}

fn print_scores(result: &GameResult) {
    println!(
        "{:<4} {:<10} {:<12} {:<34} {:>4} {:>4} {:>4} {:>4} {:>4} {:>4} {:>4} {:>6}",
        "Rank", "Player", "Agent", "Wonder", "Mil", "Gold", "Wndr", "Civ", "Com", "Gld", "Sci", "Total"
    );
    println!("{}", "-".repeat(110));
    for p in result.standings() {
        let s = &p.score;
        println!(
            "{:<4} {:<10} {:<12} {:<34} {:>4} {:>4} {:>4} {:>4} {:>4} {:>4} {:>4} {:>6}",
            p.rank, p.name, p.agent_name, p.wonder,
            s.military, s.treasury, s.wonder, s.civic, s.commerce, s.guilds, s.science, s.total,
        );
    }
}

fn cmd_tournament(
    num_games: u32,
    players: Option<usize>,
    seed: u64,
    db_path: &str,
    agent_choice: &str,
    config_path: Option<PathBuf>,
) -> Result<(), String> {
    let config = load_config(config_path, Some(seed), players)?;
    let kinds = lineup(agent_choice, config.player_count)?;
    let names: Vec<String> = kinds.iter().map(|k| k.to_string()).collect();
    println!(
        "=== Tournament: {} games, {} players, seats: {} ===\n",
        num_games, config.player_count, names.join(", ")
    );

    let mut db = Database::new(db_path).map_err(|e| e.to_string())?;
    let results = run_batch(&kinds, &config, catalog()?, num_games, MAX_DECISIONS);

    let mut wins: HashMap<String, u32> = HashMap::new();
    let mut errors = 0u32;
    for (g, result) in results.into_iter().enumerate() {
        match result {
            Ok(result) => {
                let winner = &result.players[result.winner];
                *wins.entry(winner.agent_name.clone()).or_insert(0) += 1;
                db.store_game(&result).map_err(|e| e.to_string())?;
            }
            Err(e) => {
                errors += 1;
                eprintln!("Game {}: ERROR -- {}", g + 1, e);
            }
        }
    }

    println!("--- Summary ({} games, {} errors) ---", num_games, errors);
    let mut agents: Vec<(&String, &u32)> = wins.iter().collect();
    agents.sort();
    for (agent, w) in agents {
        let pct = if num_games > 0 { *w as f64 / num_games as f64 * 100.0 } else { 0.0 };
        println!("  {:12}: {:>4} wins ({:.1}%)", agent, w, pct);
    }
    println!("\nResults saved to: {}", db_path);
    println!("Total games in DB: {}", db.game_count().map_err(|e| e.to_string())?);
    Ok(())
}

fn cmd_leaderboard(db_path: &str) -> Result<(), String> {
    let db = Database::new(db_path).map_err(|e| e.to_string())?;
    let board = db.leaderboard().map_err(|e| e.to_string())?;
    if board.is_empty() {
        println!("No agents found. Run some tournaments first.");
        return Ok(());
    }
    println!("=== Leaderboard ===\n");
    println!("{:<20} {:>8} {:>8} {:>8} {:>10}", "Agent", "ELO", "Games", "Wins", "Avg score");
    println!("{}", "-".repeat(58));
    for s in &board {
        println!("{:<20} {:>8.1} {:>8} {:>8} {:>10.1}", s.name, s.elo, s.games, s.wins, s.average_score);
    }
    Ok(())
}
