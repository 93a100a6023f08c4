use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use rand::seq::SliceRandom;

use ch_core::priors::PriorWeights;
use ch_core::structs::GuessRecommendation;
use ch_core::{Engine, EngineConfig, EngineError, Hints, TurnOutcome, WORD_LENGTH};
use cheatdle_core as ch_core;

type Priors = PriorWeights<WORD_LENGTH>;

/// Plays and solves Wordle by maximizing expected information.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// JSON file with engine settings. Missing fields use the defaults.
    #[clap(short, long)]
    config: Option<PathBuf>,

    /// Directory holding the word lists, frequencies and caches.
    #[clap(short, long)]
    data_dir: Option<PathBuf>,

    /// Number of most common words that get a prior above one half.
    #[clap(long)]
    n_common: Option<usize>,

    /// Width of the sigmoid the ranked words are spread over.
    #[clap(long)]
    width: Option<f64>,

    /// How many ranked guesses to show.
    #[clap(long)]
    top_k: Option<usize>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Guess a random hidden word, with suggestions after every guess.
    Play,
    /// Get suggestions for a game played elsewhere by entering each guess and its hints.
    Assist,
    /// Let the engine solve for the given answer.
    Solve { answer: String },
    /// Solve random answers and report the average number of turns.
    Simulate {
        #[clap(short, long, default_value_t = 100)]
        games: usize,
    },
    /// Build the pattern matrix and frequency caches.
    BuildCache,
}

fn config(args: &Args) -> Result<EngineConfig> {
    let mut config = match (&args.config, &args.data_dir) {
        (Some(path), _) => EngineConfig::load(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        (None, Some(dir)) => EngineConfig::in_dir(dir),
        (None, None) => EngineConfig::default(),
    };
    if let Some(n_common) = args.n_common {
        config.priors.n_common = n_common;
    }
    if let Some(width) = args.width {
        config.priors.width = width;
    }
    if let Some(top_k) = args.top_k {
        config.top_k = top_k;
    }
    Ok(config)
}

fn print_recommendation(recommendation: &GuessRecommendation<WORD_LENGTH>) {
    println!("Top picks:");
    for scored in &recommendation.alternatives {
        println!(
            "  {}  {:.3} bits",
            scored.word.to_string().to_lowercase(),
            scored.entropy
        );
    }
}

fn print_turn(turn: &TurnOutcome<WORD_LENGTH>) {
    println!(
        "{} {}  {} possibilities left",
        turn.guess, turn.hints, turn.remaining
    );
}

fn prompt(text: &str) -> Result<Option<String>> {
    print!("{text}");
    io::stdout().flush()?;
    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

fn play(engine: &Engine<WORD_LENGTH>, priors: Arc<Priors>) -> Result<()> {
    let mut session = engine.start_game(priors)?;
    print_recommendation(&*engine.recommend(&mut session)?);

    let mut turns = 0;
    while turns < engine.max_turns() {
        let guess = match prompt("guess> ")? {
            Some(guess) => guess,
            None => return Ok(()),
        };
        let turn = match engine.submit_guess(&mut session, &guess) {
            Ok(turn) => turn,
            Err(err @ (EngineError::UnknownWord(_) | EngineError::InvalidWord(_))) => {
                println!("{err}");
                continue;
            }
            Err(err) => return Err(err.into()),
        };
        turns += 1;
        print_turn(&turn);
        if turn.solved {
            println!("Solved in {turns}/{}", engine.max_turns());
            return Ok(());
        }
        print_recommendation(&turn.recommendation);
    }

    let answer = session
        .answer()
        .map(|i| engine.corpus().answers()[i].to_string())
        .unwrap_or_default();
    println!("Out of guesses, the word was {answer}");
    Ok(())
}

fn assist(engine: &Engine<WORD_LENGTH>, priors: Arc<Priors>) -> Result<()> {
    let mut session = engine.start_assisted(priors);
    print_recommendation(&*engine.recommend(&mut session)?);

    while let Some(line) = prompt("guess hints (e.g. crane wocww)> ")? {
        let mut parts = line.split_whitespace();
        let (guess, hints) = match (parts.next(), parts.next()) {
            (Some(guess), Some(hints)) => (guess, hints),
            _ => continue,
        };
        let hints = match Hints::from_str(hints) {
            Ok(hints) => hints,
            Err(err) => {
                println!("{err}");
                continue;
            }
        };

        let turn = match engine.submit_feedback(&mut session, guess, &hints) {
            Ok(turn) => turn,
            Err(err @ EngineError::EmptyPossibilitySet { .. }) => {
                println!("{err}");
                continue;
            }
            Err(err @ (EngineError::UnknownWord(_) | EngineError::InvalidWord(_))) => {
                println!("{err}");
                continue;
            }
            Err(err) => return Err(err.into()),
        };
        print_turn(&turn);
        if turn.solved {
            return Ok(());
        }
        print_recommendation(&turn.recommendation);
    }

    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let config = config(&args)?;

    let engine = Engine::<WORD_LENGTH>::from_config(&config).context("loading word lists")?;
    let priors = Engine::<WORD_LENGTH>::priors_from_config(&config).context("loading frequencies")?;
    let priors = Arc::new(priors);
    info!("{} words carry a prior", priors.len());

    match args.command {
        Command::Play => play(&engine, priors)?,
        Command::Assist => assist(&engine, priors)?,
        Command::Solve { answer } => {
            for turn in engine.solve(priors, &answer)? {
                print_turn(&turn);
            }
        }
        Command::Simulate { games } => {
            let answers = engine
                .corpus()
                .answers()
                .iter()
                .filter(|w| priors.get(w) > 0.)
                .collect::<Vec<_>>();
            let chosen = answers
                .choose_multiple(&mut rand::thread_rng(), games)
                .collect::<Vec<_>>();
            if chosen.is_empty() {
                return Err(anyhow!("No answer has a nonzero prior"));
            }

            let mut total = 0;
            let mut failed = 0;
            for answer in &chosen {
                let turns = engine.solve(Arc::clone(&priors), &answer.to_string())?;
                let solved = turns.last().map(|t| t.solved).unwrap_or(false);
                let guesses = turns
                    .iter()
                    .map(|t| t.guess.to_string())
                    .collect::<Vec<_>>()
                    .join(" ");
                println!("{answer}: {guesses}");
                if solved {
                    total += turns.len();
                } else {
                    failed += 1;
                }
            }

            let solved = chosen.len() - failed;
            if solved > 0 {
                println!(
                    "mean turns: {:.3} over {solved} games, {failed} unsolved",
                    total as f64 / solved as f64
                );
            } else {
                println!("no game solved within {} turns", engine.max_turns());
            }
        }
        Command::BuildCache => {
            let (rows, cols) = engine.matrix().dim();
            println!(
                "pattern matrix {rows}x{cols} at {}, frequencies at {}",
                config.pattern_matrix.display(),
                config.frequency_cache.display()
            );
        }
    }

    Ok(())
}
