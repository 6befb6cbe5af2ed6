use std::time::Duration;

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, info};

use crate::clock::Stopwatch;
use crate::config::GameConfig;
use crate::direction::Direction;
use crate::dot::{Dot, Tint};
use crate::error::{Error, Result};
use crate::generator;
use crate::maze::{Maze, Pos};
use crate::pursuer::{Pursuer, Strategy};

/// One round of the game: the maze, every dot, the stopwatch and the AI pace.
///
/// A single owner drives it; restarting replaces the whole state.
#[derive(Debug, Clone)]
pub struct Session {
    config: GameConfig,
    maze: Option<Maze>,
    player: Dot,
    pursuers: Vec<Pursuer>,
    last_player_move: Option<Direction>,
    held: [bool; 4],
    stopwatch: Stopwatch,
    move_delay: Duration,
    ramp_ticks: u32,
    game_over: bool,
}

impl Session {
    /// A session with no maze yet. Movement and AI ticks fail with
    /// [`Error::MazeUnbound`] until [`Session::regenerate`] or
    /// [`Session::bind`] is called.
    pub fn new(config: GameConfig) -> Self {
        Self {
            config,
            maze: None,
            player: Dot::new(Pos::default(), Tint::Black),
            pursuers: Strategy::ALL
                .into_iter()
                .map(|s| Pursuer::new(s, Pos::default()))
                .collect(),
            last_player_move: None,
            held: [false; 4],
            stopwatch: Stopwatch::default(),
            move_delay: config.initial_move_delay,
            ramp_ticks: 0,
            game_over: false,
        }
    }

    /// Creates a session and generates its first maze.
    pub fn start(config: GameConfig, rng: &mut impl Rng) -> Result<Self> {
        let mut session = Self::new(config);
        session.regenerate(config.height, config.width, rng)?;
        Ok(session)
    }

    /// Throws the current round away: new maze, new starting positions,
    /// fresh stopwatch and AI pace.
    pub fn regenerate(
        &mut self,
        height: usize,
        width: usize,
        rng: &mut impl Rng,
    ) -> Result<()> {
        let maze = generator::generate(height, width, &self.config.generator, rng)?;
        let (player, pursuers) = starting_positions(&maze, rng);
        let config = GameConfig {
            height,
            width,
            ..self.config
        };
        *self = Self::new(config);
        self.bind(maze);
        self.place(player, &pursuers)?;
        info!(height, width, ?player, "new round");
        Ok(())
    }

    /// Uses `maze` for navigation from now on.
    pub fn bind(&mut self, maze: Maze) {
        self.maze = Some(maze);
    }

    /// Puts the player and pursuers on the given cells, in strategy order.
    /// `pursuers` must hold exactly one cell per pursuer.
    pub fn place(&mut self, player: Pos, pursuers: &[Pos]) -> Result<()> {
        let maze = self.maze()?;
        if pursuers.len() != self.pursuers.len() {
            return Err(Error::PursuerCount {
                expected: self.pursuers.len(),
                got: pursuers.len(),
            });
        }
        maze.check(player)?;
        for &pos in pursuers {
            maze.check(pos)?;
        }
        self.player.place(player);
        for (pursuer, &pos) in self.pursuers.iter_mut().zip(pursuers) {
            pursuer.place(pos);
        }
        self.game_over = self.is_overlapping();
        Ok(())
    }

    pub fn maze(&self) -> Result<&Maze> {
        self.maze.as_ref().ok_or(Error::MazeUnbound)
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn player(&self) -> &Dot {
        &self.player
    }

    pub fn pursuers(&self) -> &[Pursuer] {
        &self.pursuers
    }

    pub fn last_player_move(&self) -> Option<Direction> {
        self.last_player_move
    }

    pub fn elapsed(&self) -> Stopwatch {
        self.stopwatch
    }

    pub fn move_delay(&self) -> Duration {
        self.move_delay
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn is_occupied(&self, pos: Pos) -> bool {
        occupied(&self.pursuers, pos)
    }

    pub fn is_overlapping(&self) -> bool {
        self.is_occupied(self.player.pos())
    }

    /// Handles a direction key going down. The player moves one cell unless
    /// the key is already held, a wall is in the way, or the round is over.
    /// Returns whether the player moved.
    pub fn press(&mut self, dir: Direction) -> Result<bool> {
        if self.game_over || self.held[dir.index()] {
            return Ok(false);
        }
        self.move_player(dir)
    }

    pub fn release(&mut self, dir: Direction) {
        self.held[dir.index()] = false;
    }

    fn move_player(&mut self, dir: Direction) -> Result<bool> {
        let maze = self.maze.as_ref().ok_or(Error::MazeUnbound)?;
        let from = self.player.pos();
        if !maze.can_move(from, dir) {
            return Ok(false);
        }
        let Some(to) = maze.neighbor(from, dir) else {
            return Ok(false);
        };
        self.player.place(to);
        self.last_player_move = Some(dir);
        self.held[dir.index()] = true;
        self.check_caught();
        Ok(true)
    }

    /// Advances every pursuer by one step, in strategy order.
    pub fn tick_ai(&mut self) -> Result<()> {
        let maze = self.maze.as_ref().ok_or(Error::MazeUnbound)?;
        if self.game_over {
            return Ok(());
        }
        let player = self.player.pos();
        for i in 0..self.pursuers.len() {
            let pursuers = &self.pursuers;
            let dir = pursuers[i].decide(maze, player, self.last_player_move, |pos| {
                occupied(pursuers, pos)
            })?;
            if let Some(dir) = dir {
                self.pursuers[i].apply(maze, dir);
            }
        }
        self.check_caught();
        Ok(())
    }

    /// One 10 ms clock tick. Every `ramp_every` ticks the AI speeds up until
    /// it reaches the configured floor.
    pub fn tick_clock(&mut self) {
        if self.game_over {
            return;
        }
        self.stopwatch.tick();
        self.ramp_ticks += 1;
        if self.ramp_ticks >= self.config.ramp_every {
            self.ramp_ticks = 0;
            self.move_delay = self
                .move_delay
                .saturating_sub(self.config.move_delay_step)
                .max(self.config.min_move_delay);
            debug!(delay_ms = self.move_delay.as_millis() as u64, "ai speed-up");
        }
    }

    fn check_caught(&mut self) {
        if !self.game_over && self.is_overlapping() {
            self.game_over = true;
            info!(time = %self.stopwatch, "player caught");
        }
    }
}

/// Occupancy rule shared by catch detection and pursuer moves.
fn occupied(pursuers: &[Pursuer], pos: Pos) -> bool {
    pursuers.iter().any(|p| p.pos() == pos)
}

/// Player in one corner, pursuers shuffled over the 2x2 block in the
/// opposite corner.
fn starting_positions(maze: &Maze, rng: &mut impl Rng) -> (Pos, Vec<Pos>) {
    let right = maze.width() - 1;
    let bottom = maze.height() - 1;
    let block_right = maze.width().saturating_sub(2);
    let block_bottom = maze.height().saturating_sub(2);
    let (player, block) = match rng.gen_range(0..4) {
        0 => (Pos::new(right, bottom), Pos::new(0, 0)),
        1 => (Pos::new(0, bottom), Pos::new(block_right, 0)),
        2 => (Pos::new(0, 0), Pos::new(block_right, block_bottom)),
        _ => (Pos::new(right, 0), Pos::new(0, block_bottom)),
    };
    let mut offsets = [(0, 0), (0, 1), (1, 0), (1, 1)];
    offsets.shuffle(rng);
    let pursuers = offsets
        .iter()
        .map(|&(dx, dy)| Pos::new((block.x + dx).min(right), (block.y + dy).min(bottom)))
        .collect();
    (player, pursuers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// 1x6 corridor, all interior walls open.
    fn corridor_session() -> Session {
        let mut maze = Maze::new(1, 6).unwrap();
        for x in 0..5 {
            maze.set_wall(Pos::new(x, 0), Direction::East, false).unwrap();
        }
        let mut session = Session::new(GameConfig::default());
        session.bind(maze);
        session
    }

    #[test]
    fn unbound_session_refuses_to_run() {
        let mut session = Session::new(GameConfig::default());
        assert_eq!(session.tick_ai(), Err(Error::MazeUnbound));
        assert_eq!(session.press(Direction::East), Err(Error::MazeUnbound));
        assert!(session.maze().is_err());
    }

    #[test]
    fn placement_is_bounds_checked() {
        let mut session = corridor_session();
        let err = session
            .place(Pos::new(0, 1), &[Pos::new(5, 0); 4])
            .unwrap_err();
        assert!(matches!(err, Error::OutOfBounds { row: 1, col: 0, .. }));
    }

    #[test]
    fn placement_needs_one_cell_per_pursuer() {
        let mut session = corridor_session();
        session.place(Pos::new(0, 0), &[Pos::new(5, 0); 4]).unwrap();
        assert_eq!(
            session.place(Pos::new(1, 0), &[Pos::new(4, 0); 3]),
            Err(Error::PursuerCount {
                expected: 4,
                got: 3
            })
        );
        assert_eq!(
            session.place(Pos::new(1, 0), &[]),
            Err(Error::PursuerCount {
                expected: 4,
                got: 0
            })
        );
        assert!(session
            .place(Pos::new(1, 0), &[Pos::new(4, 0); 5])
            .is_err());
        // Rejected placements leave everyone where they were.
        assert_eq!(session.player().pos(), Pos::new(0, 0));
        assert!(session.pursuers().iter().all(|p| p.pos() == Pos::new(5, 0)));
    }

    #[test]
    fn held_key_does_not_repeat() {
        let mut session = corridor_session();
        session.place(Pos::new(0, 0), &[Pos::new(5, 0); 4]).unwrap();
        assert_eq!(session.press(Direction::East), Ok(true));
        assert_eq!(session.press(Direction::East), Ok(false));
        session.release(Direction::East);
        assert_eq!(session.press(Direction::East), Ok(true));
        assert_eq!(session.player().pos(), Pos::new(2, 0));
        assert_eq!(session.last_player_move(), Some(Direction::East));
    }

    #[test]
    fn walls_reject_player_moves() {
        let mut session = corridor_session();
        session.place(Pos::new(0, 0), &[Pos::new(5, 0); 4]).unwrap();
        assert_eq!(session.press(Direction::North), Ok(false));
        assert_eq!(session.press(Direction::West), Ok(false));
        assert_eq!(session.player().pos(), Pos::new(0, 0));
        assert_eq!(session.last_player_move(), None);
    }

    #[test]
    fn walking_into_pursuer_ends_round() {
        let mut session = corridor_session();
        session.place(Pos::new(0, 0), &[Pos::new(1, 0); 4]).unwrap();
        assert!(!session.is_game_over());
        assert_eq!(session.press(Direction::East), Ok(true));
        assert!(session.is_overlapping());
        assert!(session.is_game_over());
        session.release(Direction::East);
        assert_eq!(session.press(Direction::West), Ok(false));
    }

    #[test]
    fn pursuers_do_not_stack() {
        let mut session = corridor_session();
        session
            .place(
                Pos::new(0, 0),
                &[Pos::new(3, 0), Pos::new(4, 0), Pos::new(5, 0), Pos::new(5, 0)],
            )
            .unwrap();
        session.tick_ai().unwrap();
        let xs: Vec<usize> = session.pursuers().iter().map(|p| p.pos().x).collect();
        // Each pursuer steps into the cell the one ahead just left; the last
        // is blocked behind the third.
        assert_eq!(xs[0], 2);
        assert_eq!(xs[1], 3);
        assert_eq!(xs[2], 4);
        assert_eq!(xs[3], 5);
    }

    #[test]
    fn pursuer_catches_player_in_corridor() {
        let mut session = corridor_session();
        session
            .place(
                Pos::new(0, 0),
                &[Pos::new(2, 0), Pos::new(5, 0), Pos::new(5, 0), Pos::new(5, 0)],
            )
            .unwrap();
        session.tick_ai().unwrap();
        assert!(!session.is_game_over());
        session.tick_ai().unwrap();
        assert!(session.is_game_over());
        let frozen: Vec<Pos> = session.pursuers().iter().map(|p| p.pos()).collect();
        session.tick_ai().unwrap();
        let after: Vec<Pos> = session.pursuers().iter().map(|p| p.pos()).collect();
        assert_eq!(frozen, after);
    }

    #[test]
    fn clock_ramps_ai_delay_down_to_floor() {
        let config = GameConfig {
            ramp_every: 10,
            ..GameConfig::default()
        };
        let mut session = Session::new(config);
        assert_eq!(session.move_delay(), Duration::from_millis(500));
        for _ in 0..10 {
            session.tick_clock();
        }
        assert_eq!(session.move_delay(), Duration::from_millis(475));
        for _ in 0..10_000 {
            session.tick_clock();
        }
        assert_eq!(session.move_delay(), config.min_move_delay);
        assert_eq!(session.elapsed().ticks(), 10_010);
    }

    #[test]
    fn regenerate_resets_round() {
        let mut rng = StdRng::seed_from_u64(21);
        let mut session = Session::start(GameConfig::default(), &mut rng).unwrap();
        for _ in 0..2000 {
            session.tick_clock();
        }
        session.regenerate(9, 11, &mut rng).unwrap();
        let maze = session.maze().unwrap();
        assert_eq!((maze.height(), maze.width()), (9, 11));
        assert_eq!(session.elapsed().ticks(), 0);
        assert_eq!(session.move_delay(), Duration::from_millis(500));
        assert_eq!(session.last_player_move(), None);
        assert!(!session.is_game_over());
    }

    #[test]
    fn starting_layout_is_corner_against_block() {
        for seed in 0..16 {
            let mut rng = StdRng::seed_from_u64(seed);
            let session = Session::start(GameConfig::default(), &mut rng).unwrap();
            let player = session.player().pos();
            assert!(player.x == 0 || player.x == 14);
            assert!(player.y == 0 || player.y == 14);

            let mut cells: Vec<Pos> = session.pursuers().iter().map(|p| p.pos()).collect();
            cells.sort_by_key(|p| (p.y, p.x));
            cells.dedup();
            assert_eq!(cells.len(), 4);
            for pos in cells {
                assert!(pos.manhattan(player) >= 26);
            }
        }
    }

    #[test]
    fn strategies_keep_their_tints() {
        let session = Session::new(GameConfig::default());
        let tints: Vec<Tint> = session.pursuers().iter().map(|p| p.tint()).collect();
        assert_eq!(tints, vec![Tint::Red, Tint::Blue, Tint::Pink, Tint::Orange]);
        assert_eq!(session.player().tint(), Tint::Black);
    }
}
