use anyhow::{anyhow, Context, Result};
use clap::Parser;
use elemental::board::Board;
use elemental::components::can_make_coin;
use elemental::engine::GameEngine;
use elemental::levels::{LevelCatalog, LevelConfig};
use elemental::rules::{can_extinguish_fire, can_make_clay, can_make_fire, can_make_pot};
use elemental::store::MemoryStore;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Check Elemental boards for remaining reactions", long_about = None)]
struct Args {
    /// Seed used when a level samples a random board
    #[clap(short, long, default_value_t = 0)]
    seed: u64,

    /// JSON level catalog to check; the built-in levels are used otherwise
    #[clap(long, conflicts_with = "board_file")]
    catalog: Option<PathBuf>,

    /// Board file, one row per line using the element glyphs
    board_file: Option<PathBuf>,
}

fn read_board_file(path: &Path) -> Result<LevelConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;

    let lines: Vec<&str> = content
        .lines()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();

    if lines.is_empty() {
        return Err(anyhow!("Board file {} has no rows", path.display()));
    }

    LevelConfig::from_rows(0, path.display().to_string(), &lines)
        .with_context(|| format!("Invalid board format in {}", path.display()))
}

/// Number of cells for which each rule has a partner, in the order
/// fire, extinguish, clay, pot, coin.
fn rule_counts(board: &Board) -> [usize; 5] {
    let mut counts = [0; 5];
    for p in board.positions() {
        let flags = [
            can_make_fire(board, p),
            can_extinguish_fire(board, p),
            can_make_clay(board, p),
            can_make_pot(board, p),
            can_make_coin(board, p),
        ];
        for (count, hit) in counts.iter_mut().zip(flags) {
            *count += usize::from(hit);
        }
    }
    counts
}

fn report(level: &LevelConfig, seed: u64) -> Result<bool> {
    let mut rng = SmallRng::seed_from_u64(seed);
    let engine = GameEngine::new(level.clone(), Box::new(MemoryStore::new()), &mut rng)
        .with_context(|| format!("Level {} cannot start", level.id))?;
    let [fire, extinguish, clay, pot, coin] = rule_counts(engine.board());

    println!(
        "Level {} ({}x{}): {}",
        level.id,
        level.rows,
        level.cols,
        level.name.lines().next().unwrap_or("")
    );
    println!("{}", engine.board());
    println!(
        "  cells able to react: fire {}, extinguish {}, clay {}, pot {}, coin {}",
        fire, extinguish, clay, pot, coin
    );
    if engine.is_game_over() {
        println!("  status: no reactions possible\n");
    } else {
        println!("  status: playable\n");
    }
    Ok(engine.is_game_over())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let levels: Vec<LevelConfig> = match (&args.board_file, &args.catalog) {
        (Some(path), _) => vec![read_board_file(path)?],
        (None, Some(path)) => LevelCatalog::load(path)
            .with_context(|| format!("Failed to load level catalog {}", path.display()))?
            .iter()
            .cloned()
            .collect(),
        (None, None) => LevelCatalog::builtin()?.iter().cloned().collect(),
    };

    let mut terminal = 0;
    for level in &levels {
        if report(level, args.seed)? {
            terminal += 1;
        }
    }
    println!(
        "{} of {} boards have no reactions left.",
        terminal,
        levels.len()
    );
    Ok(())
}
