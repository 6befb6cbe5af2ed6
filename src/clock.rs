use std::fmt;

/// Survival time, counted in 10 ms clock ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Stopwatch {
    ticks: u64,
}

impl Stopwatch {
    pub fn tick(&mut self) {
        self.ticks += 1;
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

impl fmt::Display for Stopwatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let centis = self.ticks % 100;
        let secs = self.ticks / 100;
        write!(
            f,
            "{:02}:{:02}:{:02}.{:02}",
            secs / 3600,
            secs / 60 % 60,
            secs % 60,
            centis
        )
    }
}
