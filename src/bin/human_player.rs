use anyhow::{anyhow, Context, Result};
use clap::Parser;
use elemental::board::Position;
use elemental::engine::{GameEngine, Pacing};
use elemental::events::Update;
use elemental::levels::{LevelCatalog, LevelConfig};
use elemental::store::JsonFileStore;
use elemental::EngineError;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::io::{self, Write};
use std::path::PathBuf;
use std::thread;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Play Elemental in the terminal", long_about = None)]
struct Args {
    /// Level to start on
    #[clap(short, long, default_value_t = 1)]
    level: u32,

    /// JSON level catalog to use instead of the built-in levels
    #[clap(long)]
    catalog: Option<PathBuf>,

    /// File the best score per level is kept in
    #[clap(long, default_value = "elemental_scores.json")]
    scores: PathBuf,

    /// Seed for random boards; a fresh seed is drawn when omitted
    #[clap(long)]
    seed: Option<u64>,

    /// Pause between staged steps and redraw the board after each one
    #[clap(long)]
    animate: bool,

    /// Log engine events to stderr
    #[clap(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "elemental=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn start_level(args: &Args, level: &LevelConfig, rng: &mut SmallRng) -> Result<GameEngine> {
    let store = JsonFileStore::open(&args.scores)
        .with_context(|| format!("Failed to open score file {}", args.scores.display()))?;
    let pacing = if args.animate {
        Pacing::animated()
    } else {
        Pacing::default()
    };
    let mut engine = GameEngine::new(level.clone(), Box::new(store), rng)
        .with_context(|| format!("Failed to start level {}", level.id))?
        .with_pacing(pacing);
    engine.subscribe(|update: &Update| {
        if update.score_delta > 0 {
            println!("  +{} (score {})", update.score_delta, update.score);
        }
        if update.entered_game_over {
            println!("  No more reactions possible.");
        }
    });
    Ok(engine)
}

fn print_status(engine: &GameEngine, last_tap: Option<Position>) {
    let level = engine.level();
    println!("---------------------");
    println!("Level {}: {}", level.id, level.name.replace('\n', " "));
    println!(
        "Score: {}, High score: {}",
        engine.score(),
        engine.high_score()
    );
    println!("{}", engine.board().to_string_with_highlight(last_tap));
}

fn run_staged_steps(engine: &mut GameEngine, animate: bool) {
    while let Some(delay) = engine.next_step_delay() {
        if animate {
            thread::sleep(delay);
        }
        engine.advance();
        if animate && engine.has_pending_steps() {
            println!("{}", engine.board());
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let catalog = match &args.catalog {
        Some(path) => LevelCatalog::load(path)
            .with_context(|| format!("Failed to load level catalog {}", path.display()))?,
        None => LevelCatalog::builtin()?,
    };
    let mut rng = match args.seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_entropy(),
    };

    let mut level = catalog
        .get(args.level)
        .ok_or_else(|| anyhow!("No level {} in the catalog", args.level))?
        .clone();
    let mut game = start_level(&args, &level, &mut rng)?;
    let mut last_tap = None;
    println!("Welcome to Elemental!");

    loop {
        print_status(&game, last_tap);
        last_tap = None;

        if game.is_game_over() {
            println!("🎉 GAME OVER! Final score: {} 🎉", game.score());
            print!("'u' undo, 'r' restart, ");
            if level.offers_new_game() {
                print!("'n' new board, ");
            }
            println!("'[' / ']' change level, 'q' quit");
        }

        print!("Enter a cell (row col), 'u' undo, 'r' reset, 'n' new, '[' ']' level, 'q' quit: ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            println!();
            break;
        }

        match input.trim() {
            "q" => {
                println!("Thanks for playing!");
                break;
            }
            "u" => match game.undo()? {
                Some(_) => println!("Last tap undone."),
                None => println!("Nothing to undo."),
            },
            "r" => {
                game.reset_game()?;
                println!("Level restarted.");
            }
            "n" => {
                game.new_game(&mut rng)?;
                println!("New board.");
            }
            cmd @ ("]" | "[") => {
                let target = if cmd == "]" {
                    catalog.next(level.id)
                } else {
                    catalog.previous(level.id)
                };
                match target {
                    Some(next) => {
                        level = next.clone();
                        game = start_level(&args, &level, &mut rng)?;
                    }
                    None => println!("No level in that direction."),
                }
            }
            other => {
                let parts: Vec<&str> = other.split_whitespace().collect();
                let coords = match parts.as_slice() {
                    [r, c] => r.parse::<usize>().ok().zip(c.parse::<usize>().ok()),
                    _ => None,
                };
                let Some((r, c)) = coords else {
                    println!("Invalid input. Use 'row col', 'u', 'r', 'n', '[', ']' or 'q'.");
                    continue;
                };
                match game.tap(r, c) {
                    Ok(update) if update.is_noop() && update.pending_steps == 0 => {
                        println!("Nothing reacts at ({}, {}).", r, c)
                    }
                    Ok(_) => {
                        last_tap = Some(Position::new(r, c));
                        run_staged_steps(&mut game, args.animate);
                    }
                    Err(e @ (EngineError::OutOfBounds { .. } | EngineError::GameOver)) => {
                        println!("{}", e)
                    }
                    Err(e) => return Err(e.into()),
                }
            }
        }
    }

    Ok(())
}
