use std::time::Duration;

pub const DEFAULT_HEIGHT: usize = 15;
pub const DEFAULT_WIDTH: usize = 15;
pub const BRAIDING_FACTOR: f64 = 0.6;
pub const INITIAL_MOVE_DELAY: Duration = Duration::from_millis(500);
pub const MOVE_DELAY_STEP: Duration = Duration::from_millis(25);
pub const MIN_MOVE_DELAY: Duration = Duration::from_millis(100);
pub const CLOCK_TICK: Duration = Duration::from_millis(10);
pub const RAMP_EVERY_TICKS: u32 = 1000;

/// Tuning of the growing-tree generator.
///
/// A uniform draw `u` above `newest_above` grows from the newest active cell,
/// above `middle_above` from the middle one, otherwise from a random one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeneratorConfig {
    pub newest_above: f64,
    pub middle_above: f64,
    pub braiding_factor: f64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            newest_above: 0.25,
            middle_above: 0.05,
            braiding_factor: BRAIDING_FACTOR,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GameConfig {
    pub height: usize,
    pub width: usize,
    pub generator: GeneratorConfig,
    pub initial_move_delay: Duration,
    pub move_delay_step: Duration,
    pub min_move_delay: Duration,
    /// Clock ticks between two AI speed-ups.
    pub ramp_every: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            height: DEFAULT_HEIGHT,
            width: DEFAULT_WIDTH,
            generator: GeneratorConfig::default(),
            initial_move_delay: INITIAL_MOVE_DELAY,
            move_delay_step: MOVE_DELAY_STEP,
            min_move_delay: MIN_MOVE_DELAY,
            ramp_every: RAMP_EVERY_TICKS,
        }
    }
}
