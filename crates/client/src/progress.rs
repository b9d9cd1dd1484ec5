//! Terminal progress for the analysis task.

use std::time::Duration;

const FRAMES: [char; 8] = ['⣷', '⣯', '⣟', '⡿', '⢿', '⣻', '⣽', '⣾'];

/// Braille spinner. Owned by whoever drives the wait loop.
#[derive(Debug, Clone, Default)]
pub struct Spinner {
    index: Option<usize>,
}

impl Spinner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance and return the next frame. The first call yields the first frame.
    pub fn tick(&mut self) -> char {
        let next = match self.index {
            Some(i) if i + 1 < FRAMES.len() => i + 1,
            _ => 0,
        };
        self.index = Some(next);
        FRAMES[next]
    }

    /// `\r[<frame>] Episodes analyzed: <pct>%`
    pub fn render(&mut self, percent: u8) -> String {
        format!("\r[{}] Episodes analyzed: {}%", self.tick(), percent)
    }
}

/// Timing of the task wait loop.
#[derive(Debug, Clone, Copy)]
pub struct PollSchedule {
    /// Minimum time between two task status requests.
    pub interval: Duration,
    /// Spinner redraw period.
    pub tick: Duration,
}

impl PollSchedule {
    pub fn every(interval: Duration) -> Self {
        Self {
            interval,
            ..Self::default()
        }
    }
}

impl Default for PollSchedule {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(10),
            tick: Duration::from_millis(500),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spinner_cycles_through_frames() {
        let mut spinner = Spinner::new();
        let first: Vec<char> = (0..FRAMES.len()).map(|_| spinner.tick()).collect();
        assert_eq!(first, FRAMES.to_vec());
        assert_eq!(spinner.tick(), '⣷');
    }

    #[test]
    fn spinners_are_independent() {
        let mut a = Spinner::new();
        let mut b = Spinner::new();
        a.tick();
        a.tick();
        assert_eq!(b.tick(), '⣷');
        assert_eq!(a.tick(), '⣟');
    }

    #[test]
    fn render_line() {
        let mut spinner = Spinner::new();
        assert_eq!(spinner.render(0), "\r[⣷] Episodes analyzed: 0%");
        assert_eq!(spinner.render(42), "\r[⣯] Episodes analyzed: 42%");
    }

    #[test]
    fn default_schedule() {
        let schedule = PollSchedule::every(Duration::from_secs(20));
        assert_eq!(schedule.interval, Duration::from_secs(20));
        assert_eq!(schedule.tick, Duration::from_millis(500));
    }
}
