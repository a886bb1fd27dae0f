use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::engine::{self, Board, Move, Spawn};

/// Whole-game phase. A session starts `Idle`, enters `Playing` on `reset`,
/// and reaches `GameOver` when no move remains; only `reset` leaves it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Idle,
    Playing,
    GameOver,
}

/// Discrete notifications for feedback collaborators (sound, haptics).
///
/// `Started` corresponds to a `reset` call; the per-turn events are derived
/// from a [`TurnReport`] via [`TurnReport::events`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    Started,
    Moved,
    Merged { cells: Vec<(usize, usize)> },
    GameOver,
}

/// Everything collaborators need after one directional input: the renderer
/// reads the changed/merged/spawned cells, the persistence layer reads
/// `best_score_updated`, the feedback layer derives its cues via `events`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnReport {
    pub changed: bool,
    pub score_delta: u64,
    pub merged: Vec<(usize, usize)>,
    pub spawned: Vec<Spawn>,
    pub game_over: bool,
    /// New best score to persist, when this turn crossed the stored best.
    pub best_score_updated: Option<u64>,
}

impl TurnReport {
    fn inert() -> Self {
        TurnReport {
            changed: false,
            score_delta: 0,
            merged: Vec::new(),
            spawned: Vec::new(),
            game_over: false,
            best_score_updated: None,
        }
    }

    /// Derive the discrete feedback events for this turn. An unchanged board
    /// produces none: only a legitimate slide triggers downstream cues.
    pub fn events(&self) -> Vec<GameEvent> {
        let mut events = Vec::new();
        if !self.changed {
            return events;
        }
        if self.merged.is_empty() {
            events.push(GameEvent::Moved);
        } else {
            events.push(GameEvent::Merged {
                cells: self.merged.clone(),
            });
        }
        if self.game_over {
            events.push(GameEvent::GameOver);
        }
        events
    }
}

/// A single game session: board, score, best score, and phase, exclusively
/// owned by the caller. All randomness comes from the session's seeded RNG,
/// so equal seeds replay identical games.
pub struct Game {
    board: Board,
    score: u64,
    best_score: u64,
    phase: Phase,
    rng: StdRng,
}

impl Game {
    /// Create an idle session. Call [`reset`](Game::reset) to start playing.
    ///
    /// ```
    /// use twenty48_core::game::{Game, Phase};
    /// let game = Game::new(42);
    /// assert_eq!(game.phase(), Phase::Idle);
    /// assert_eq!(game.score(), 0);
    /// ```
    pub fn new(seed: u64) -> Self {
        engine::new();
        Game {
            board: Board::EMPTY,
            score: 0,
            best_score: 0,
            phase: Phase::Idle,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Seed the best score the host persisted in an earlier session.
    pub fn with_best_score(mut self, best: u64) -> Self {
        self.best_score = best;
        self
    }

    /// Start (or restart) a game: fresh board and score, two spawned tiles.
    /// The returned spawns are the "game started" notification.
    ///
    /// ```
    /// use twenty48_core::game::{Game, Phase};
    /// let mut game = Game::new(42);
    /// let spawned = game.reset();
    /// assert_eq!(spawned.len(), 2);
    /// assert_eq!(game.phase(), Phase::Playing);
    /// assert_eq!(game.board().count_empty(), 14);
    /// ```
    pub fn reset(&mut self) -> Vec<Spawn> {
        self.score = 0;
        self.phase = Phase::Playing;
        let (board, spawned) = Board::EMPTY.spawn_tiles(2, &mut self.rng);
        self.board = board;
        spawned
    }

    /// Apply one directional input: slide, and if the board changed, score
    /// the merges, spawn one tile, and check for game over. An unchanged
    /// board spawns nothing, scores nothing, and reports an inert turn.
    ///
    /// # Panics
    ///
    /// If the session is not `Playing`; call `reset` first.
    pub fn step(&mut self, dir: Move) -> TurnReport {
        assert_eq!(
            self.phase,
            Phase::Playing,
            "step called outside Playing; call reset first"
        );
        let outcome = self.board.slide(dir);
        if !outcome.changed {
            return TurnReport::inert();
        }

        self.board = outcome.board;
        self.score += outcome.score_delta;
        let best_score_updated = if self.score > self.best_score {
            self.best_score = self.score;
            Some(self.best_score)
        } else {
            None
        };

        let (board, spawned) = self.board.spawn_tiles(1, &mut self.rng);
        self.board = board;

        let game_over = self.board.is_game_over();
        if game_over {
            self.phase = Phase::GameOver;
        }

        TurnReport {
            changed: true,
            score_delta: outcome.score_delta,
            merged: outcome.merged,
            spawned,
            game_over,
            best_score_updated,
        }
    }

    /// Which directions would change the current board. Useful for policies
    /// and for input layers that grey out dead gestures.
    pub fn legal_moves(&self) -> [bool; 4] {
        let mut mask = [false; 4];
        for (slot, &dir) in Move::ALL.iter().enumerate() {
            mask[slot] = self.board.shift(dir) != self.board;
        }
        mask
    }

    pub fn board(&self) -> Board {
        self.board
    }

    /// Snapshot of the grid as rows of tile values, for renderers.
    pub fn rows(&self) -> [[u16; 4]; 4] {
        self.board.rows()
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn best_score(&self) -> u64 {
        self.best_score
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }
}
