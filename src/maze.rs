use crate::direction::Direction;
use crate::error::{Error, Result};

/// Grid coordinates: `x` is the column, `y` the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Pos {
    pub x: usize,
    pub y: usize,
}

impl Pos {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    pub fn manhattan(self, other: Pos) -> usize {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pos: Pos,
    walls: [bool; 4],
    visited: bool,
}

impl Cell {
    fn new(pos: Pos) -> Self {
        Self {
            pos,
            walls: [true; 4],
            visited: false,
        }
    }

    pub fn pos(&self) -> Pos {
        self.pos
    }

    /// Whether the wall on the given side is solid.
    pub fn wall(&self, dir: Direction) -> bool {
        self.walls[dir.index()]
    }

    pub fn is_visited(&self) -> bool {
        self.visited
    }

    pub fn solid_walls(&self) -> usize {
        self.walls.iter().filter(|&&solid| solid).count()
    }

    pub fn is_dead_end(&self) -> bool {
        self.solid_walls() >= 3
    }

    pub(crate) fn set_wall(&mut self, dir: Direction, solid: bool) {
        self.walls[dir.index()] = solid;
    }

    pub(crate) fn set_visited(&mut self, visited: bool) {
        self.visited = visited;
    }
}

/// A rectangular maze of `height` rows by `width` columns.
///
/// Walls are stored on both cells they separate and are always written in
/// pairs through [`Maze::set_wall`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Maze {
    height: usize,
    width: usize,
    grid: Vec<Vec<Cell>>,
    origin: Pos,
}

impl Maze {
    /// Allocates a maze with every wall solid and every cell unvisited.
    pub fn new(height: usize, width: usize) -> Result<Self> {
        if height == 0 || width == 0 {
            return Err(Error::InvalidDimensions { height, width });
        }
        let grid = (0..height)
            .map(|y| (0..width).map(|x| Cell::new(Pos { x, y })).collect())
            .collect();
        Ok(Self {
            height,
            width,
            grid,
            origin: Pos::default(),
        })
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// The cell generation started from.
    pub fn origin(&self) -> Pos {
        self.origin
    }

    pub(crate) fn set_origin(&mut self, origin: Pos) {
        self.origin = origin;
    }

    pub fn contains(&self, pos: Pos) -> bool {
        pos.x < self.width && pos.y < self.height
    }

    pub fn check(&self, pos: Pos) -> Result<()> {
        if self.contains(pos) {
            Ok(())
        } else {
            Err(Error::OutOfBounds {
                row: pos.y,
                col: pos.x,
                height: self.height,
                width: self.width,
            })
        }
    }

    pub fn cell(&self, pos: Pos) -> Result<&Cell> {
        self.check(pos)?;
        Ok(&self.grid[pos.y][pos.x])
    }

    pub(crate) fn cell_mut(&mut self, pos: Pos) -> Result<&mut Cell> {
        self.check(pos)?;
        Ok(&mut self.grid[pos.y][pos.x])
    }

    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.grid.iter().flat_map(|row| row.iter())
    }

    /// The in-grid cell adjacent to `pos` in `dir`, ignoring walls.
    pub fn neighbor(&self, pos: Pos, dir: Direction) -> Option<Pos> {
        let (dx, dy) = dir.delta();
        let nx = pos.x.checked_add_signed(dx)?;
        let ny = pos.y.checked_add_signed(dy)?;
        let next = Pos { x: nx, y: ny };
        self.contains(next).then_some(next)
    }

    /// Sets the wall on side `dir` of `pos` and the facing wall of the
    /// neighbour, if there is one.
    pub fn set_wall(&mut self, pos: Pos, dir: Direction, solid: bool) -> Result<()> {
        self.cell_mut(pos)?.set_wall(dir, solid);
        if let Some(next) = self.neighbor(pos, dir) {
            self.grid[next.y][next.x].set_wall(dir.opposite(), solid);
        }
        Ok(())
    }

    /// Whether a token on `pos` may step in `dir`.
    pub fn can_move(&self, pos: Pos, dir: Direction) -> bool {
        match self.cell(pos) {
            Ok(cell) => !cell.wall(dir) && self.neighbor(pos, dir).is_some(),
            Err(_) => false,
        }
    }

    pub fn dead_ends(&self) -> usize {
        self.cells().filter(|c| c.is_dead_end()).count()
    }
}
