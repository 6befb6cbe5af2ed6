//! Maze survival: outlast four pursuers in a braided, procedurally generated
//! maze.
//!
//! The core is the growing-tree [`generator`], the breadth-first
//! [`pathfinder`] and the [`pursuer`] policies. [`session::Session`] ties
//! them into one round of play, and [`tui`] is a thin terminal frontend.

pub mod clock;
pub mod config;
pub mod direction;
pub mod dot;
pub mod error;
pub mod generator;
pub mod maze;
pub mod pathfinder;
pub mod pursuer;
pub mod session;
pub mod tui;

pub use config::{GameConfig, GeneratorConfig};
pub use direction::Direction;
pub use error::{Error, Result};
pub use maze::{Cell, Maze, Pos};
pub use pathfinder::{Candidates, Pathfinder};
pub use pursuer::{Pursuer, Strategy};
pub use session::Session;
