use std::collections::{BTreeMap, VecDeque};

use crate::direction::Direction;
use crate::error::Result;
use crate::maze::{Maze, Pos};

/// Directions out of a cell grouped by the path length they leave to the
/// target, shortest first. Within a tier the directions keep the order they
/// were found in.
pub type Candidates = BTreeMap<usize, Vec<Direction>>;

/// Breadth-first queries over the open passages of a maze.
#[derive(Debug, Clone, Copy)]
pub struct Pathfinder<'a> {
    maze: &'a Maze,
}

impl<'a> Pathfinder<'a> {
    pub fn new(maze: &'a Maze) -> Self {
        Self { maze }
    }

    /// Number of steps on the shortest path from `from` to `to`, or `None`
    /// when the target cannot be reached.
    pub fn shortest_path_length(&self, from: Pos, to: Pos) -> Result<Option<usize>> {
        self.maze.check(from)?;
        self.maze.check(to)?;

        let mut seen = vec![vec![false; self.maze.width()]; self.maze.height()];
        let mut q = VecDeque::new();
        seen[from.y][from.x] = true;
        q.push_back((from, 0));

        while let Some((pos, dist)) = q.pop_front() {
            if pos == to {
                return Ok(Some(dist));
            }
            for dir in Direction::ALL {
                if !self.maze.can_move(pos, dir) {
                    continue;
                }
                let Some(next) = self.maze.neighbor(pos, dir) else {
                    continue;
                };
                if !seen[next.y][next.x] {
                    seen[next.y][next.x] = true;
                    q.push_back((next, dist + 1));
                }
            }
        }
        Ok(None)
    }

    /// Ranks every legal step out of `from` by the distance it leaves to `to`.
    ///
    /// Runs one search per open direction.
    pub fn best_move_candidates(&self, from: Pos, to: Pos) -> Result<Candidates> {
        self.maze.check(from)?;
        self.maze.check(to)?;

        let mut candidates = Candidates::new();
        for dir in Direction::ALL {
            if !self.maze.can_move(from, dir) {
                continue;
            }
            let Some(next) = self.maze.neighbor(from, dir) else {
                continue;
            };
            if let Some(dist) = self.shortest_path_length(next, to)? {
                candidates.entry(dist).or_default().push(dir);
            }
        }
        Ok(candidates)
    }
}
