use std::io::{self, BufRead};
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use env_logger::Env;
use log::{info, warn};

use twenty48_core::engine::Move;
use twenty48_game::session::GameSession;
use twenty48_game::store::{MemoryStore, ScorePersistence, ScoreStore};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Play 2048 in the terminal; the best score persists across sessions"
)]
struct Cli {
    /// Directory for the score database
    #[arg(long, value_name = "DIR", default_value = "twenty48-data")]
    data_dir: PathBuf,

    /// Seed the tile sequence for a reproducible game
    #[arg(long, value_name = "N")]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let store: Box<dyn ScorePersistence> = match ScoreStore::new(&cli.data_dir) {
        Ok(store) => Box::new(store),
        Err(err) => {
            warn!("score store unavailable ({err}); best score will not persist");
            Box::new(MemoryStore::default())
        }
    };
    let mut session = match cli.seed {
        Some(seed) => GameSession::seeded(store, seed),
        None => GameSession::new(store),
    };

    println!("Controls: w/a/s/d move, n new game, h history, q quit");
    render(&session);

    let mut won_announced = false;
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        let direction = match line.trim().to_ascii_lowercase().as_str() {
            "w" | "up" => Move::Up,
            "s" | "down" => Move::Down,
            "a" | "left" => Move::Left,
            "d" | "right" => Move::Right,
            "n" | "new" => {
                session.new_game();
                won_announced = false;
                render(&session);
                continue;
            }
            "h" | "history" => {
                print_history(&mut session);
                continue;
            }
            "q" | "quit" => break,
            "" => continue,
            other => {
                println!("unrecognized command {other:?} (w/a/s/d, n, h, q)");
                continue;
            }
        };

        let outcome = session.apply_move(direction);
        if !outcome.moved {
            println!("no tiles moved");
            continue;
        }
        render(&session);
        if !won_announced && session.has_won() {
            won_announced = true;
            println!("You made 2048! Keep going, or start over with 'n'.");
        }
        if outcome.game_over {
            let (score, best) = session.scores();
            println!(
                "Game over after {} moves. Final score {score} (best {best}). 'n' for a new game, 'q' to quit.",
                session.steps()
            );
        }
    }

    let (score, best) = session.scores();
    info!("exiting with score {score}, best {best}");
    Ok(())
}

fn render(session: &GameSession) {
    let (score, best) = session.scores();
    println!("{}", session.board());
    println!("Score: {score}    Best: {best}");
}

fn print_history(session: &mut GameSession) {
    let runs = session.history(10);
    if runs.is_empty() {
        println!("no finished games recorded");
        return;
    }
    for run in runs {
        println!(
            "score {:>8}  highest tile {:>6}  moves {:>6}",
            run.score, run.highest_tile, run.steps
        );
    }
}
