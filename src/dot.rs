use crate::maze::Pos;

/// Colour tag a frontend uses to tell dots apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tint {
    Black,
    Red,
    Blue,
    Pink,
    Orange,
}

/// A token on the grid. The maze never tracks dots; they only carry their
/// own coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dot {
    pos: Pos,
    tint: Tint,
}

impl Dot {
    pub fn new(pos: Pos, tint: Tint) -> Self {
        Self { pos, tint }
    }

    pub fn pos(&self) -> Pos {
        self.pos
    }

    pub fn tint(&self) -> Tint {
        self.tint
    }

    pub fn place(&mut self, pos: Pos) {
        self.pos = pos;
    }
}
