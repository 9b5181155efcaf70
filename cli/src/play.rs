use anyhow::{Context, Result, bail};
use minesleuth_core::*;
use rand::Rng;
use serde::Serialize;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Won,
    Lost,
    /// The player ran out of legal moves before the game ended.
    Stuck,
}

/// Everything left over once the automated player is done with a board.
#[derive(Clone, Debug)]
pub struct Playthrough {
    pub game: Game,
    pub knowledge: KnowledgeBase,
    pub guesses: usize,
}

impl Playthrough {
    pub fn outcome(&self) -> Outcome {
        match self.game.state() {
            GameState::Won => Outcome::Won,
            GameState::Lost => Outcome::Lost,
            GameState::Ready | GameState::Active => Outcome::Stuck,
        }
    }

    pub fn report(&self, seed: u64) -> GameReport {
        GameReport {
            seed,
            outcome: self.outcome(),
            moves: self.knowledge.moves_made().len(),
            guesses: self.guesses,
            known_mines: self.knowledge.mine_cells().len(),
            triggered_mine: self.game.triggered_mine(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GameReport {
    pub seed: u64,
    pub outcome: Outcome,
    pub moves: usize,
    pub guesses: usize,
    pub known_mines: usize,
    pub triggered_mine: Option<Coord2>,
}

#[derive(Clone, Debug, Serialize)]
pub struct Summary {
    pub config: GameConfig,
    pub seed: u64,
    pub wins: usize,
    pub losses: usize,
    pub stuck: usize,
    pub guesses: usize,
    pub games: Vec<GameReport>,
}

impl Summary {
    pub fn new(config: GameConfig, seed: u64) -> Self {
        Self {
            config,
            seed,
            wins: 0,
            losses: 0,
            stuck: 0,
            guesses: 0,
            games: Vec::new(),
        }
    }

    pub fn record(&mut self, report: GameReport) {
        match report.outcome {
            Outcome::Won => self.wins += 1,
            Outcome::Lost => self.losses += 1,
            Outcome::Stuck => self.stuck += 1,
        }
        self.guesses += report.guesses;
        self.games.push(report);
    }

    pub fn win_rate(&self) -> f64 {
        if self.games.is_empty() {
            0.0
        } else {
            self.wins as f64 / self.games.len() as f64
        }
    }
}

/// Lets the knowledge base play `layout` until the game ends or no move is left.
///
/// `opening` is revealed first when given, otherwise the first move is a guess like any other.
/// Every mine the knowledge base proves is flagged on the board as soon as it is known.
pub fn play_game<R: Rng + ?Sized>(
    layout: MineLayout,
    opening: Option<Coord2>,
    rng: &mut R,
) -> Result<Playthrough> {
    let mut game = Game::new(layout);
    let mut knowledge = KnowledgeBase::new(game.size());
    let mut guesses = 0;
    let mut next = opening.map(Move::Guess);

    while !game.is_finished() {
        let Some(chosen) = next.take().or_else(|| knowledge.next_move(&mut *rng)) else {
            log::info!("no moves left");
            break;
        };
        let cell = chosen.coords();
        if chosen.is_guess() {
            guesses += 1;
            log::debug!("guessing {:?}", cell);
        } else {
            log::trace!("safe move {:?}", cell);
        }

        match game.reveal(cell)? {
            RevealOutcome::Revealed(count) => {
                let stats = knowledge
                    .record_observation(cell, count)
                    .with_context(|| format!("could not record {cell:?} = {count}"))?;
                if stats.has_update() {
                    log::debug!(
                        "{:?} = {}: {} new safe, {} new mines",
                        cell,
                        count,
                        stats.safes,
                        stats.mines
                    );
                }
                for &mine in knowledge.mine_cells() {
                    if game.is_finished() {
                        break;
                    }
                    game.flag(mine)?;
                }
            }
            RevealOutcome::Won => {
                if let CellView::Revealed(count) = game.cell_at(cell) {
                    knowledge
                        .record_observation(cell, count)
                        .with_context(|| format!("could not record {cell:?} = {count}"))?;
                }
                log::info!("revealed the last safe cell {:?}", cell);
            }
            RevealOutcome::HitMine => log::info!("hit a mine at {:?}", cell),
            RevealOutcome::NoChange => bail!("{cell:?} was already revealed"),
        }
    }

    Ok(Playthrough {
        game,
        knowledge,
        guesses,
    })
}
