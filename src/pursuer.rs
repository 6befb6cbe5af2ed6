use tracing::trace;

use crate::direction::Direction;
use crate::dot::{Dot, Tint};
use crate::error::Result;
use crate::maze::{Maze, Pos};
use crate::pathfinder::{Candidates, Pathfinder};

/// Manhattan distance above which the flanker stops patrolling and chases.
const FLANK_CHASE_DISTANCE: usize = 8;
const AMBUSH_LOOKAHEAD: isize = 2;
const DELAYED_LOOKAHEAD: isize = 4;

/// How a pursuer picks the cell it heads for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Heads straight for the player.
    Direct,
    /// Projects the player two steps ahead and doubles the offset from the
    /// pursuer to cut the player off.
    Ambush,
    /// Projects the player four steps ahead.
    Lookahead,
    /// Chases while far away, falls back to the bottom-left corner when near.
    Flank,
}

impl Strategy {
    pub const ALL: [Strategy; 4] = [
        Strategy::Direct,
        Strategy::Ambush,
        Strategy::Lookahead,
        Strategy::Flank,
    ];

    pub fn tint(self) -> Tint {
        match self {
            Strategy::Direct => Tint::Red,
            Strategy::Ambush => Tint::Blue,
            Strategy::Lookahead => Tint::Pink,
            Strategy::Flank => Tint::Orange,
        }
    }

    /// The cell this strategy aims for. Projections are clamped at zero and
    /// wrapped around the maze dimensions, so the result is always in the grid.
    pub fn target(self, me: Pos, player: Pos, heading: Option<Direction>, maze: &Maze) -> Pos {
        match self {
            Strategy::Direct => player,
            Strategy::Ambush => {
                let (px, py) = project(player, heading, AMBUSH_LOOKAHEAD);
                let x = 2 * px - me.x as isize;
                let y = 2 * py - me.y as isize;
                wrap(x, y, maze)
            }
            Strategy::Lookahead => {
                let (x, y) = project(player, heading, DELAYED_LOOKAHEAD);
                wrap(x, y, maze)
            }
            Strategy::Flank => {
                if me.manhattan(player) > FLANK_CHASE_DISTANCE {
                    player
                } else {
                    Pos::new(0, maze.height() - 1)
                }
            }
        }
    }
}

fn project(from: Pos, heading: Option<Direction>, units: isize) -> (isize, isize) {
    let (dx, dy) = heading.map_or((0, 0), Direction::delta);
    (from.x as isize + dx * units, from.y as isize + dy * units)
}

fn wrap(x: isize, y: isize, maze: &Maze) -> Pos {
    Pos::new(
        x.max(0) as usize % maze.width(),
        y.max(0) as usize % maze.height(),
    )
}

/// A dot driven by a target-selection strategy and the shared
/// pathfinding policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pursuer {
    dot: Dot,
    strategy: Strategy,
    last_move: Option<Direction>,
}

impl Pursuer {
    pub fn new(strategy: Strategy, pos: Pos) -> Self {
        Self {
            dot: Dot::new(pos, strategy.tint()),
            strategy,
            last_move: None,
        }
    }

    pub fn pos(&self) -> Pos {
        self.dot.pos()
    }

    pub fn tint(&self) -> Tint {
        self.dot.tint()
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn last_move(&self) -> Option<Direction> {
        self.last_move
    }

    /// Teleports the pursuer and forgets its heading.
    pub fn place(&mut self, pos: Pos) {
        self.dot.place(pos);
        self.last_move = None;
    }

    /// The step that would undo the previous one.
    pub fn avoid(&self) -> Option<Direction> {
        self.last_move.map(Direction::opposite)
    }

    /// Picks a direction from ranked candidates.
    ///
    /// The first unoccupied direction that does not reverse the last move
    /// wins, scanning tiers shortest first. Failing that the first unoccupied
    /// direction is taken even if it reverses. `None` when every destination
    /// is occupied.
    pub fn resolve(
        &self,
        maze: &Maze,
        candidates: &Candidates,
        occupied: impl Fn(Pos) -> bool,
    ) -> Option<Direction> {
        let avoid = self.avoid();
        let mut first_free = None;
        for dirs in candidates.values() {
            for &dir in dirs {
                let Some(dest) = maze.neighbor(self.pos(), dir) else {
                    continue;
                };
                if occupied(dest) {
                    continue;
                }
                if Some(dir) != avoid {
                    return Some(dir);
                }
                first_free.get_or_insert(dir);
            }
        }
        first_free
    }

    /// Runs target selection, ranking and resolution for one tick.
    pub fn decide(
        &self,
        maze: &Maze,
        player: Pos,
        heading: Option<Direction>,
        occupied: impl Fn(Pos) -> bool,
    ) -> Result<Option<Direction>> {
        let target = self.strategy.target(self.pos(), player, heading, maze);
        let candidates = Pathfinder::new(maze).best_move_candidates(self.pos(), target)?;
        let dir = self.resolve(maze, &candidates, occupied);
        trace!(
            strategy = ?self.strategy,
            pos = ?self.pos(),
            ?target,
            ?dir,
            "pursuer decision"
        );
        Ok(dir)
    }

    /// Steps one cell in `dir`. Returns `false` without moving when the maze
    /// does not allow the step.
    pub fn apply(&mut self, maze: &Maze, dir: Direction) -> bool {
        if !maze.can_move(self.pos(), dir) {
            return false;
        }
        let Some(next) = maze.neighbor(self.pos(), dir) else {
            return false;
        };
        self.dot.place(next);
        self.last_move = Some(dir);
        true
    }
}
