use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use minesleuth_core::*;
use rand::prelude::*;
use rand::rngs::StdRng;

mod play;

use play::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Preset {
    Beginner,
    Intermediate,
    Expert,
}

impl Preset {
    fn config(self) -> GameConfig {
        match self {
            Self::Beginner => GameConfig::beginner(),
            Self::Intermediate => GameConfig::intermediate(),
            Self::Expert => GameConfig::expert(),
        }
    }
}

/// What the first revealed cell is guaranteed to be.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Opening {
    /// No guarantee, the first move may hit a mine
    Random,
    /// The first cell is never a mine
    Safe,
    /// The first cell has no neighboring mines
    Zero,
}

impl From<Opening> for StartTile {
    fn from(opening: Opening) -> Self {
        match opening {
            Opening::Random => StartTile::Random,
            Opening::Safe => StartTile::SimpleSafe,
            Opening::Zero => StartTile::AlwaysZero,
        }
    }
}

/// Let the automated player deduce its way through randomly generated boards.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// What log level to use
    #[command(flatten)]
    verbose: clap_verbosity_flag::Verbosity,

    /// Board preset, individual dimensions override it (default is 8x8 with 8 mines)
    #[arg(short, long, value_enum)]
    preset: Option<Preset>,

    /// Number of rows
    #[arg(long)]
    height: Option<Coord>,

    /// Number of columns
    #[arg(long)]
    width: Option<Coord>,

    /// Number of mines
    #[arg(short, long)]
    mines: Option<CellCount>,

    /// How many games to play
    #[arg(short = 'n', long, default_value_t = 1)]
    games: u32,

    /// Force a seed instead of random
    #[arg(short, long)]
    seed: Option<u64>,

    /// What the first revealed cell is guaranteed to be
    #[arg(long, value_enum, default_value_t = Opening::Zero)]
    opening: Opening,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,
}

impl Args {
    fn game_config(&self) -> Result<GameConfig> {
        let base = self.preset.map(Preset::config).unwrap_or_default();
        let size = (
            self.height.unwrap_or(base.size.0),
            self.width.unwrap_or(base.size.1),
        );
        let mines = self.mines.unwrap_or(base.mines);
        GameConfig::new(size, mines).with_context(|| {
            format!("cannot place {mines} mines on a {}x{} board", size.0, size.1)
        })
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(args.verbose.tracing_level_filter())
        .with_writer(std::io::stderr)
        .init();

    let config = args.game_config()?;
    let seed = args.seed.unwrap_or_else(rand::random);
    log::info!(
        "playing {} games on {}x{} with {} mines, seed: {}",
        args.games,
        config.size.0,
        config.size.1,
        config.mines,
        seed
    );

    let mut rng = StdRng::seed_from_u64(seed);
    let mut summary = Summary::new(config, seed);
    let mut last = None;

    for round in 0..args.games {
        let game_seed: u64 = rng.random();
        let start = (
            rng.random_range(0..config.size.0),
            rng.random_range(0..config.size.1),
        );
        let layout = RandomMineGenerator::new(game_seed, start, args.opening.into()).generate(config);
        let opening = (args.opening != Opening::Random).then_some(start);

        let played = play_game(layout, opening, &mut rng)
            .with_context(|| format!("game {round} with seed {game_seed} failed"))?;
        let report = played.report(game_seed);
        log::debug!("game {}: {:?}", round, report);
        summary.record(report);
        last = Some(played);
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    if let (1, Some(played)) = (args.games, &last) {
        println!("{}", played.game.mine_layout());
        print!("{}", played.game);
        println!(
            "{:?} after {} moves ({} guesses), {} mines proven",
            played.outcome(),
            played.knowledge.moves_made().len(),
            played.guesses,
            played.knowledge.mine_cells().len()
        );
    }
    println!(
        "games: {}, won: {}, lost: {}, stuck: {}, guesses: {}, win rate: {:.1}%",
        summary.games.len(),
        summary.wins,
        summary.losses,
        summary.stuck,
        summary.guesses,
        summary.win_rate() * 100.0
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(["minesleuth"].iter().chain(args)).unwrap()
    }

    #[test]
    fn dimensions_override_the_preset() {
        let config = parse(&["--preset", "expert", "--height", "10"])
            .game_config()
            .unwrap();

        assert_eq!(config, GameConfig::new_unchecked((10, 30), 99));
    }

    #[test]
    fn more_mines_than_cells_is_rejected() {
        let err = parse(&["--height", "2", "--width", "2", "--mines", "5"])
            .game_config()
            .unwrap_err();

        assert_eq!(err.downcast_ref::<GameError>(), Some(&GameError::TooManyMines));
    }

    #[test]
    fn empty_board_is_rejected() {
        let err = parse(&["--width", "0"]).game_config().unwrap_err();

        assert_eq!(err.downcast_ref::<GameError>(), Some(&GameError::InvalidCoords));
    }
}
