//! Terminal frontend: key translation, a diffing crossterm renderer and
//! the guard that owns the game screen.

pub mod input;
pub mod render;
pub mod terminal;

pub use input::{translate, Command};
pub use render::{render, Renderer};
pub use terminal::TerminalGuard;
